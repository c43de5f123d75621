//! Interactive tour guide in the terminal.

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, Result};
use guidebot::ai::config::ChatConfig;
use guidebot::ai::prompts::tour_guide_prompt;
use guidebot::ChatClient;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    guidebot::init_tracing();

    let config = ChatConfig::from_env().ok_or_else(|| anyhow!("GROQ_API_KEY is not set"))?;
    let client = ChatClient::new(config);

    println!("Welcome to the AI Tour Guide!");
    print!("Where are you currently (e.g., Taj Mahal, Eiffel Tower)?\n> ");
    io::stdout().flush()?;

    let mut location = String::new();
    io::stdin().lock().read_line(&mut location)?;
    let location = location.trim();
    if location.is_empty() {
        return Err(anyhow!("no location given"));
    }

    println!("\nThinking...\n");
    match client.ask(&tour_guide_prompt(location)).await {
        Ok(answer) => {
            println!("Tour Guide Says:\n");
            println!("{answer}");
        }
        Err(err) => eprintln!("Error: {err}"),
    }
    Ok(())
}
