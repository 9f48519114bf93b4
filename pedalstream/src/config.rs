//! Stream geometry: how many windows per inference call and how long each
//! window is.

use crate::{PedalStreamError, Result};

/// Windowing parameters for one streaming run.
///
/// `window_size` is the model's receptive field: the number of consecutive
/// input samples that produce one output sample. `batch_size` is the number
/// of stride-1 windows concatenated into one inference call, and therefore
/// also the number of output samples per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    batch_size: usize,
    window_size: usize,
}

impl StreamConfig {
    /// Validate and build a stream configuration.
    ///
    /// `batch_size` must be a positive multiple of `window_size`. The
    /// multiple requirement keeps the derived buffer capacity exact; a
    /// non-multiple would under-allocate and truncate the trailing windows.
    pub fn new(batch_size: usize, window_size: usize) -> Result<Self> {
        if batch_size == 0 || window_size == 0 {
            return Err(PedalStreamError::ConfigError(format!(
                "batch size ({}) and window size ({}) must be positive",
                batch_size, window_size
            )));
        }

        if batch_size % window_size != 0 {
            return Err(PedalStreamError::ConfigError(format!(
                "batch size ({}) must be a multiple of the model window size ({})",
                batch_size, window_size
            )));
        }

        Ok(Self {
            batch_size,
            window_size,
        })
    }

    /// Number of stride-1 windows per inference call.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Model receptive field in samples.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Physical sample-buffer capacity: one batch of fresh samples plus one
    /// window of look-back history.
    pub fn buffer_capacity(&self) -> usize {
        (self.batch_size / self.window_size + 1) * self.window_size
    }

    /// Concatenated length of one model input batch.
    pub fn batch_len(&self) -> usize {
        self.batch_size * self.window_size
    }
}
