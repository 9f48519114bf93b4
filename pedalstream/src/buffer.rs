//! Rolling sample buffer with window-aligned refills.
//!
//! The buffer holds one batch of fresh samples plus one window of look-back
//! history. Refills are chunked: a full load starts at offset 0, a mid-stream
//! refill starts one window in, behind the retained history.

use tracing::debug;

use crate::config::StreamConfig;
use crate::driver::SampleSource;
use crate::{PedalStreamError, Result};

/// Fixed-capacity sample buffer owned for the whole streaming run.
///
/// The logical length is always `capacity` (fully loaded or padded) or less
/// (tail of the stream), except transiently inside a refill. Only this type
/// mutates the samples; the batcher and driver borrow read-only views.
pub(crate) struct WindowBuffer {
    samples: Vec<f32>,
    capacity: usize,
    window: usize,
}

impl WindowBuffer {
    /// Allocate an empty buffer of `config.buffer_capacity()` samples.
    pub(crate) fn new(config: &StreamConfig) -> Self {
        Self {
            samples: Vec::with_capacity(config.buffer_capacity()),
            capacity: config.buffer_capacity(),
            window: config.window_size(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub(crate) fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Refill from `source`, writing at a window-aligned offset.
    ///
    /// Requests every sample between `offset_windows * window` and the end of
    /// the buffer, then truncates the logical length to what actually
    /// arrived. The truncation is unconditional: a short or empty load can
    /// never leave stale samples visible past the freshly written region.
    ///
    /// Returns the number of samples delivered by the source. Zero with no
    /// error means the source is cleanly exhausted.
    pub(crate) fn load_segment(
        &mut self,
        source: &mut dyn SampleSource,
        offset_windows: usize,
    ) -> Result<usize> {
        let start = offset_windows * self.window;
        debug_assert!(
            start <= self.samples.len(),
            "refill offset past logical length"
        );

        let request = self.capacity - start;
        let chunk = source.load(request)?;
        if chunk.len() > request {
            return Err(PedalStreamError::SourceError(format!(
                "source returned {} samples, at most {} were requested",
                chunk.len(),
                request
            )));
        }

        self.samples.truncate(start);
        self.samples.extend_from_slice(&chunk);

        debug!(
            loaded = chunk.len(),
            requested = request,
            offset = start,
            "refilled sample buffer"
        );
        Ok(chunk.len())
    }

    /// Copy the last window of samples to the front of the buffer, in place.
    ///
    /// Invoked after a cycle consumed the buffer and before the next
    /// `load_segment(1)`, so the leading windows of the next batch see the
    /// history they overlap.
    pub(crate) fn retain_trailing_window(&mut self) {
        let len = self.samples.len();
        debug_assert!(len >= self.window, "no trailing window to retain");
        self.samples.copy_within(len - self.window.., 0);
    }

    /// Append zero samples until the logical length reaches capacity.
    ///
    /// Only needed when a refill under-delivers near end of stream, so the
    /// final batch can run over the tail plus silence.
    pub(crate) fn pad_to_capacity(&mut self) {
        self.samples.resize(self.capacity, 0.0);
    }
}
