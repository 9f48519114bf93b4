//! pedalstream: stream audio through fixed-receptive-field neural pedal
//! models.
//!
//! The engine turns an unbounded sample stream into overlapping stride-1
//! windows, batches them for a causal sample-to-sample model, and
//! re-assembles the outputs continuously — one output sample per window,
//! with the look-back history carried across batch boundaries and a
//! zero-padded drain pass at end of stream.
//!
//! # Quick Start
//!
//! ```no_run
//! use pedalstream::{Device, PedalModel, StreamConfig, StreamDriver, WavSink, WavSource};
//!
//! let source = WavSource::open("input.wav")?;
//! let model = PedalModel::load("models/ts9", 600, &Device::Cpu)?;
//! let config = StreamConfig::new(model.batch_size(), model.window_size())?;
//! let sink = WavSink::create("output.wav", source.spec())?;
//!
//! let mut driver = StreamDriver::new(config, source, sink, model);
//! let summary = driver.run()?;
//! let (_source, sink, _model) = driver.into_parts();
//! sink.finalize()?;
//! println!("{} samples in, {} out", summary.samples_in, summary.samples_out);
//! # Ok::<(), pedalstream::PedalStreamError>(())
//! ```
//!
//! Any [`SampleSource`], [`SampleSink`] and [`InferenceEngine`] can stand in
//! for the WAV codec and the candle model; the driver only sees the traits.

mod audio;
mod batcher;
mod buffer;
mod config;
mod driver;
mod error;
mod model;

pub use audio::{WavSink, WavSource};
pub use candle_core::Device;
pub use config::StreamConfig;
pub use driver::{InferenceEngine, SampleSink, SampleSource, StreamDriver, StreamSummary};
pub use error::{PedalStreamError, Result};
pub use model::{ConvLayerConfig, ModelConfig, PedalModel};
