//! End-to-end streaming cycle: load, batch, infer, write, advance.
//!
//! The driver turns an unbounded sample stream into fixed-size overlapping
//! batches, feeds each batch to the model, and writes the outputs back out
//! continuously. Each cycle keeps the last window of the previous buffer as
//! look-back history, so the model never recomputes samples it has already
//! seen. When the source runs dry mid-buffer, one final zero-padded cycle
//! flushes the remaining receptive-field outputs.

use tracing::debug;

use crate::batcher::WindowBatcher;
use crate::buffer::WindowBuffer;
use crate::config::StreamConfig;
use crate::{PedalStreamError, Result};

/// Supplier of input samples.
///
/// `load` returns at most `max_samples` samples. An empty vector with no
/// error signals clean end-of-data; any error is fatal to the pipeline.
pub trait SampleSource {
    fn load(&mut self, max_samples: usize) -> Result<Vec<f32>>;
}

/// Consumer of produced samples.
///
/// Called once per cycle with exactly `batch_size` samples, in production
/// order. Any error is fatal; output already written is not rolled back.
pub trait SampleSink {
    fn write(&mut self, samples: &[f32]) -> Result<()>;
}

/// Fixed-input-size sample-to-sample model.
///
/// `infer` receives `batch_size * window_size` samples (the concatenated
/// overlapping windows) and must return exactly `batch_size` output samples.
pub trait InferenceEngine {
    fn infer(&mut self, batch: &[f32]) -> Result<Vec<f32>>;
}

/// Totals for one completed streaming run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    /// Completed load-batch-infer-write cycles.
    pub cycles: usize,
    /// Samples delivered by the source.
    pub samples_in: usize,
    /// Samples written to the sink.
    pub samples_out: usize,
}

/// Drives the streaming pipeline over owned collaborators.
///
/// The source, sink and engine are passed in at construction and held for
/// the driver's lifetime; there is no ambient model or file state. The
/// driver does not close its collaborators — their owner does, after `run`
/// returns.
pub struct StreamDriver<S, K, M> {
    config: StreamConfig,
    source: S,
    sink: K,
    engine: M,
}

impl<S, K, M> StreamDriver<S, K, M>
where
    S: SampleSource,
    K: SampleSink,
    M: InferenceEngine,
{
    pub fn new(config: StreamConfig, source: S, sink: K, engine: M) -> Self {
        Self {
            config,
            source,
            sink,
            engine,
        }
    }

    /// Give the collaborators back, in construction order.
    pub fn into_parts(self) -> (S, K, M) {
        (self.source, self.sink, self.engine)
    }

    /// Process the whole stream, single pass.
    ///
    /// Runs until the source is exhausted. A source that is empty from the
    /// start produces no output and is not an error. Every collaborator
    /// failure aborts the run and is returned as-is; output already written
    /// stays written.
    pub fn run(&mut self) -> Result<StreamSummary> {
        let batch_size = self.config.batch_size();
        let mut buffer = WindowBuffer::new(&self.config);
        let mut batcher = WindowBatcher::new(&self.config);
        let mut summary = StreamSummary::default();

        let mut fresh = buffer.load_segment(&mut self.source, 0)?;
        if fresh == 0 {
            debug!("source exhausted before the first window");
            return Ok(summary);
        }
        summary.samples_in += fresh;

        loop {
            // A short load means the stream is ending: pad the tail with
            // silence, and if the load brought less than a full batch of
            // fresh samples this cycle flushes the last outputs.
            let final_cycle = if buffer.is_full() {
                false
            } else {
                buffer.pad_to_capacity();
                fresh < batch_size
            };

            let batch = batcher.concat(buffer.samples());
            let output = self.engine.infer(batch)?;
            if output.len() != batch_size {
                return Err(PedalStreamError::OutputLengthMismatch {
                    expected: batch_size,
                    got: output.len(),
                });
            }

            self.sink.write(&output)?;
            summary.cycles += 1;
            summary.samples_out += output.len();
            debug!(
                cycle = summary.cycles,
                drain = final_cycle,
                "wrote one batch of model output"
            );

            if final_cycle {
                break;
            }

            buffer.retain_trailing_window();
            fresh = buffer.load_segment(&mut self.source, 1)?;
            summary.samples_in += fresh;
            if fresh == 0 {
                // End-of-data landed exactly on a refill boundary; every
                // sample that could head a window has been processed.
                break;
            }
        }

        debug!(
            cycles = summary.cycles,
            samples_in = summary.samples_in,
            samples_out = summary.samples_out,
            "stream complete"
        );
        Ok(summary)
    }
}
