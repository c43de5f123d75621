use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    guidebot::run().await
}
