//! Image captioning.
//!
//! Handlers only see the [`Captioner`] trait; [`BlipCaptioner`] runs a BLIP
//! captioning model locally with candle.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::blip;
use thiserror::Error;
use tokenizers::Tokenizer;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, trace, warn};

use crate::ai::config::CaptionConfig;

const IMAGE_SIZE: u32 = 384;
const IMAGE_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];
const IMAGE_STD: [f32; 3] = [0.268_629_54, 0.261_302_6, 0.275_777_1];
/// `[DEC]` starts decoding, `[SEP]` ends it.
const BOS_TOKEN_ID: u32 = 30522;
const SEP_TOKEN_ID: u32 = 102;
const MAX_CAPTION_TOKENS: usize = 20;

#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("unreadable image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("caption model unavailable: {0}")]
    Load(String),
    #[error("caption inference failed: {0}")]
    Inference(String),
}

impl From<candle_core::Error> for CaptionError {
    fn from(err: candle_core::Error) -> Self {
        CaptionError::Inference(err.to_string())
    }
}

#[async_trait]
pub trait Captioner: Send + Sync {
    /// Describe the image in `image` (any format the `image` crate decodes).
    async fn caption(&self, image: &[u8]) -> Result<String, CaptionError>;
}

struct LoadedModel {
    model: blip::BlipForConditionalGeneration,
    tokenizer: Tokenizer,
}

/// A value built at most once on the blocking pool and shared behind a mutex.
///
/// Concurrent first callers wait for the one load in flight. A failed load
/// leaves the cell empty so the next caller tries again.
pub(crate) struct LoadOnce<T> {
    cell: OnceCell<Arc<Mutex<T>>>,
}

impl<T: Send + 'static> LoadOnce<T> {
    pub(crate) fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub(crate) async fn get_or_load<F>(&self, load: F) -> Result<Arc<Mutex<T>>, CaptionError>
    where
        F: FnOnce() -> Result<T, CaptionError> + Send + 'static,
    {
        self.cell
            .get_or_try_init(|| async move {
                let loaded = tokio::task::spawn_blocking(load)
                    .await
                    .map_err(|e| CaptionError::Load(e.to_string()))??;
                Ok::<_, CaptionError>(Arc::new(Mutex::new(loaded)))
            })
            .await
            .cloned()
    }
}

/// BLIP captioner with weights loaded once, on first use or via [`preload`].
///
/// [`preload`]: BlipCaptioner::preload
pub struct BlipCaptioner {
    model_path: PathBuf,
    tokenizer_path: PathBuf,
    device: Device,
    loaded: LoadOnce<LoadedModel>,
}

impl BlipCaptioner {
    pub fn new(config: &CaptionConfig) -> Self {
        let device = select_device(config.force_cpu);
        info!(device = ?device, "caption device selected");
        Self {
            model_path: config.model_path.clone(),
            tokenizer_path: config.tokenizer_path.clone(),
            device,
            loaded: LoadOnce::new(),
        }
    }

    pub async fn preload(&self) -> Result<(), CaptionError> {
        self.model().await.map(|_| ())
    }

    async fn model(&self) -> Result<Arc<Mutex<LoadedModel>>, CaptionError> {
        let model_path = self.model_path.clone();
        let tokenizer_path = self.tokenizer_path.clone();
        let device = self.device.clone();
        self.loaded
            .get_or_load(move || load_model(&model_path, &tokenizer_path, &device))
            .await
    }
}

/// First CUDA or Metal device the build supports, else the CPU.
///
/// Accelerators are only compiled in with the `cuda` or `metal` feature.
fn select_device(force_cpu: bool) -> Device {
    if force_cpu {
        return Device::Cpu;
    }
    if candle_core::utils::cuda_is_available() {
        match Device::new_cuda(0) {
            Ok(device) => return device,
            Err(err) => warn!(error = %err, "CUDA device unavailable, using CPU"),
        }
    }
    if candle_core::utils::metal_is_available() {
        match Device::new_metal(0) {
            Ok(device) => return device,
            Err(err) => warn!(error = %err, "Metal device unavailable, using CPU"),
        }
    }
    Device::Cpu
}

#[async_trait]
impl Captioner for BlipCaptioner {
    #[instrument(level = "debug", skip_all, fields(size = image.len()))]
    async fn caption(&self, image: &[u8]) -> Result<String, CaptionError> {
        let bytes = image.to_vec();
        let pixels = tokio::task::spawn_blocking(move || preprocess(&bytes))
            .await
            .map_err(|e| CaptionError::Inference(e.to_string()))??;
        let loaded = self.model().await?;
        let device = self.device.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = loaded
                .lock()
                .map_err(|_| CaptionError::Inference("caption model lock poisoned".to_string()))?;
            generate_caption(&mut guard, &pixels, &device)
        })
        .await
        .map_err(|e| CaptionError::Inference(e.to_string()))?
    }
}

fn load_model(
    model_path: &std::path::Path,
    tokenizer_path: &std::path::Path,
    device: &Device,
) -> Result<LoadedModel, CaptionError> {
    debug!(?model_path, ?tokenizer_path, "loading caption model");
    let tokenizer = Tokenizer::from_file(tokenizer_path)
        .map_err(|e| CaptionError::Load(format!("{}: {e}", tokenizer_path.display())))?;
    let weights = std::fs::read(model_path)
        .map_err(|e| CaptionError::Load(format!("{}: {e}", model_path.display())))?;
    let config = blip::Config::image_captioning_large();
    let vb = VarBuilder::from_buffered_safetensors(weights, DType::F32, device)
        .map_err(|e| CaptionError::Load(e.to_string()))?;
    let model = blip::BlipForConditionalGeneration::new(&config, vb)
        .map_err(|e| CaptionError::Load(e.to_string()))?;
    info!(?model_path, "caption model loaded");
    Ok(LoadedModel { model, tokenizer })
}

/// Decode, convert to RGB, resize and normalize into a `(3, 384, 384)` tensor
/// on the CPU.
pub fn preprocess(bytes: &[u8]) -> Result<Tensor, CaptionError> {
    let img = image::load_from_memory(bytes)?
        .resize_to_fill(
            IMAGE_SIZE,
            IMAGE_SIZE,
            image::imageops::FilterType::Triangle,
        )
        .to_rgb8();
    let side = IMAGE_SIZE as usize;
    let data = Tensor::from_vec(img.into_raw(), (side, side, 3), &Device::Cpu)?.permute((2, 0, 1))?;
    let mean = Tensor::new(&IMAGE_MEAN, &Device::Cpu)?.reshape((3, 1, 1))?;
    let std = Tensor::new(&IMAGE_STD, &Device::Cpu)?.reshape((3, 1, 1))?;
    let pixels = (data.to_dtype(DType::F32)? / 255.)?
        .broadcast_sub(&mean)?
        .broadcast_div(&std)?;
    Ok(pixels)
}

fn generate_caption(
    loaded: &mut LoadedModel,
    pixels: &Tensor,
    device: &Device,
) -> Result<String, CaptionError> {
    let LoadedModel { model, tokenizer } = loaded;
    model.reset_kv_cache();

    let pixels = pixels.to_device(device)?.unsqueeze(0)?;
    let image_embeds = model.vision_model().forward(&pixels)?;

    let mut logits_processor = LogitsProcessor::new(0, None, None);
    let mut token_ids = vec![BOS_TOKEN_ID];
    for index in 0..MAX_CAPTION_TOKENS {
        let context_size = if index > 0 { 1 } else { token_ids.len() };
        let start_pos = token_ids.len().saturating_sub(context_size);
        let input_ids = Tensor::new(&token_ids[start_pos..], device)?.unsqueeze(0)?;
        let logits = model.text_decoder().forward(&input_ids, &image_embeds)?;
        let logits = logits.squeeze(0)?;
        let logits = logits.get(logits.dim(0)? - 1)?;
        let token = logits_processor.sample(&logits)?;
        if token == SEP_TOKEN_ID {
            break;
        }
        token_ids.push(token);
    }
    model.reset_kv_cache();
    trace!(tokens = token_ids.len() - 1, "caption generated");

    let caption = tokenizer
        .decode(&token_ids[1..], true)
        .map_err(|e| CaptionError::Inference(e.to_string()))?;
    Ok(caption.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 128]));
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn preprocess_produces_three_channel_square() {
        let pixels = preprocess(&png_bytes(40, 20)).unwrap();
        assert_eq!(pixels.dims(), &[3, 384, 384]);
        assert_eq!(pixels.dtype(), DType::F32);
    }

    #[test]
    fn preprocess_rejects_garbage() {
        let err = preprocess(b"definitely not an image").unwrap_err();
        assert!(matches!(err, CaptionError::Decode(_)));
    }

    #[tokio::test]
    async fn missing_weights_surface_as_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let captioner = BlipCaptioner::new(&CaptionConfig {
            model_path: dir.path().join("model.safetensors"),
            tokenizer_path: dir.path().join("tokenizer.json"),
            force_cpu: true,
            preload: false,
        });
        let err = captioner.caption(&png_bytes(8, 8)).await.unwrap_err();
        assert!(matches!(err, CaptionError::Load(_)));
    }

    #[test]
    fn forced_cpu_ignores_accelerators() {
        assert!(select_device(true).is_cpu());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_use_loads_once() {
        let cell = Arc::new(LoadOnce::<usize>::new());
        let loads = Arc::new(AtomicUsize::new(0));
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let cell = cell.clone();
            let loads = loads.clone();
            tasks.spawn(async move {
                let model = cell
                    .get_or_load(move || {
                        std::thread::sleep(Duration::from_millis(50));
                        Ok(loads.fetch_add(1, Ordering::SeqCst))
                    })
                    .await?;
                let value = *model.lock().unwrap();
                Ok::<_, CaptionError>(value)
            });
        }
        while let Some(joined) = tasks.join_next().await {
            assert_eq!(joined.unwrap().unwrap(), 0);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_load_is_retried() {
        let cell = LoadOnce::<&'static str>::new();
        let err = cell
            .get_or_load(|| Err(CaptionError::Load("weights missing".to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, CaptionError::Load(_)));

        let model = cell.get_or_load(|| Ok("ready")).await.unwrap();
        assert_eq!(*model.lock().unwrap(), "ready");
    }
}
