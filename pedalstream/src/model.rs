//! Causal conv pedal models on candle.
//!
//! A model directory holds `config.json` (the layer stack) and
//! `model.safetensors` (the weights). The stack is a chain of dilated 1-D
//! convolutions with tanh nonlinearities and a 1x1 output projection, no
//! padding anywhere, so a full-window input row collapses to exactly one
//! output sample. The stack's receptive field is the window size the
//! streaming engine must feed it.

use std::path::Path;

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{Conv1d, Conv1dConfig, VarBuilder};
use serde::Deserialize;
use tracing::debug;

use crate::driver::InferenceEngine;
use crate::{PedalStreamError, Result};

fn default_hidden_channels() -> usize {
    16
}

fn default_dilation() -> usize {
    1
}

/// One conv layer of the stack.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvLayerConfig {
    pub kernel_size: usize,
    #[serde(default = "default_dilation")]
    pub dilation: usize,
}

/// On-disk model description, `config.json` in the model directory.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_hidden_channels")]
    pub hidden_channels: usize,
    pub layers: Vec<ConvLayerConfig>,
}

impl ModelConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PedalStreamError::ModelError(format!("read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| PedalStreamError::ModelError(format!("parse model config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(PedalStreamError::ModelError(
                "model config has no conv layers".to_string(),
            ));
        }
        if self.hidden_channels == 0 {
            return Err(PedalStreamError::ModelError(
                "hidden_channels must be positive".to_string(),
            ));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.kernel_size == 0 || layer.dilation == 0 {
                return Err(PedalStreamError::ModelError(format!(
                    "layer {}: kernel_size and dilation must be positive",
                    i
                )));
            }
        }
        Ok(())
    }

    /// Receptive field of the whole stack, in samples. This is the window
    /// size the streaming engine must use with this model.
    pub fn receptive_field(&self) -> usize {
        1 + self
            .layers
            .iter()
            .map(|l| l.dilation * (l.kernel_size - 1))
            .sum::<usize>()
    }
}

/// A loaded pedal model, fixed to one batch size for its lifetime.
pub struct PedalModel {
    convs: Vec<Conv1d>,
    project: Conv1d,
    batch_size: usize,
    window_size: usize,
    device: Device,
}

impl PedalModel {
    /// Load a model directory (`config.json` + `model.safetensors`).
    pub fn load(dir: impl AsRef<Path>, batch_size: usize, device: &Device) -> Result<Self> {
        let dir = dir.as_ref();
        let config = ModelConfig::from_file(&dir.join("config.json"))?;

        let weights = dir.join("model.safetensors");
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights.clone()], DType::F32, device).map_err(
                |e| PedalStreamError::ModelError(format!("load {}: {}", weights.display(), e)),
            )?
        };

        let model = Self::build(&config, batch_size, vb, device)?;
        debug!(
            layers = config.layers.len(),
            hidden_channels = config.hidden_channels,
            window = model.window_size,
            batch = model.batch_size,
            "loaded pedal model"
        );
        Ok(model)
    }

    fn build(
        config: &ModelConfig,
        batch_size: usize,
        vb: VarBuilder,
        device: &Device,
    ) -> Result<Self> {
        config.validate()?;
        if batch_size == 0 {
            return Err(PedalStreamError::ModelError(
                "batch size must be positive".to_string(),
            ));
        }

        let mut convs = Vec::with_capacity(config.layers.len());
        let mut in_channels = 1;
        for (i, layer) in config.layers.iter().enumerate() {
            let cfg = Conv1dConfig {
                padding: 0,
                stride: 1,
                dilation: layer.dilation,
                groups: 1,
                ..Default::default()
            };
            let conv = candle_nn::conv1d(
                in_channels,
                config.hidden_channels,
                layer.kernel_size,
                cfg,
                vb.pp(format!("layers.{}", i)),
            )
            .map_err(|e| PedalStreamError::ModelError(e.to_string()))?;
            convs.push(conv);
            in_channels = config.hidden_channels;
        }

        let project = candle_nn::conv1d(
            in_channels,
            1,
            1,
            Conv1dConfig::default(),
            vb.pp("project"),
        )
        .map_err(|e| PedalStreamError::ModelError(e.to_string()))?;

        Ok(Self {
            convs,
            project,
            batch_size,
            window_size: config.receptive_field(),
            device: device.clone(),
        })
    }

    /// Receptive field in samples.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Windows per inference call, fixed at load time.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn forward(&self, input: &Tensor) -> candle_core::Result<Tensor> {
        let mut x = input.clone();
        for conv in &self.convs {
            x = conv.forward(&x)?.tanh()?;
        }
        self.project.forward(&x)
    }
}

impl InferenceEngine for PedalModel {
    fn infer(&mut self, batch: &[f32]) -> Result<Vec<f32>> {
        let expected = self.batch_size * self.window_size;
        if batch.len() != expected {
            return Err(PedalStreamError::InferenceError(format!(
                "batch has {} samples, model expects {}",
                batch.len(),
                expected
            )));
        }

        let input = Tensor::from_slice(
            batch,
            (self.batch_size, 1, self.window_size),
            &self.device,
        )?;
        // each row is one full window, so the valid convs leave length 1
        let output = self.forward(&input)?;
        let samples = output.flatten_all()?.to_vec1::<f32>()?;
        Ok(samples)
    }
}
