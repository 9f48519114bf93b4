//! Concatenates a full sample buffer into one model input batch.

use crate::config::StreamConfig;

/// Slices a buffer into `batch_size` overlapping windows, stride 1, and
/// concatenates them into a scratch vector reused across cycles.
pub(crate) struct WindowBatcher {
    batch_size: usize,
    window_size: usize,
    scratch: Vec<f32>,
}

impl WindowBatcher {
    pub(crate) fn new(config: &StreamConfig) -> Self {
        Self {
            batch_size: config.batch_size(),
            window_size: config.window_size(),
            scratch: Vec::with_capacity(config.batch_len()),
        }
    }

    /// Build the concatenated batch: window `i` is `buffer[i..i + window]`.
    ///
    /// The buffer must hold at least `batch_size - 1 + window_size` samples,
    /// which a full (or padded) buffer always does.
    pub(crate) fn concat<'a>(&'a mut self, buffer: &[f32]) -> &'a [f32] {
        debug_assert!(buffer.len() >= self.batch_size - 1 + self.window_size);

        self.scratch.clear();
        for i in 0..self.batch_size {
            self.scratch.extend_from_slice(&buffer[i..i + self.window_size]);
        }
        &self.scratch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_count_and_length() {
        let config = StreamConfig::new(10, 5).unwrap();
        let mut batcher = WindowBatcher::new(&config);
        let buffer: Vec<f32> = (0..15).map(|i| i as f32).collect();

        let batch = batcher.concat(&buffer);
        assert_eq!(batch.len(), 50);
    }

    #[test]
    fn test_windows_advance_by_one_sample() {
        let config = StreamConfig::new(4, 2).unwrap();
        let mut batcher = WindowBatcher::new(&config);
        let buffer: Vec<f32> = (0..6).map(|i| i as f32).collect();

        let batch = batcher.concat(&buffer).to_vec();
        assert_eq!(
            batch,
            vec![0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0]
        );
    }

    #[test]
    fn test_scratch_is_reset_between_cycles() {
        let config = StreamConfig::new(4, 2).unwrap();
        let mut batcher = WindowBatcher::new(&config);
        let buffer: Vec<f32> = (0..6).map(|i| i as f32).collect();

        batcher.concat(&buffer);
        let second = batcher.concat(&buffer);
        assert_eq!(second.len(), 8);
    }
}
