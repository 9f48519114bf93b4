//! WAV decode and encode for the streaming pipeline.
//!
//! Samples cross the collaborator boundary as f32 normalized to [-1.0, 1.0];
//! integer PCM is rescaled by `2^(bits_per_sample - 1)` on the way in and
//! out. The sink is created with the source's spec, so the output container
//! mirrors the input's sample rate, bit depth and channel count. A
//! multi-channel file is processed as one interleaved stream.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::driver::{SampleSink, SampleSource};
use crate::{PedalStreamError, Result};

/// Streaming WAV decoder implementing [`SampleSource`].
pub struct WavSource<R: Read> {
    reader: WavReader<R>,
    spec: WavSpec,
    norm: f32,
}

impl WavSource<BufReader<File>> {
    /// Open a WAV file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let reader = WavReader::open(path.as_ref())
            .map_err(|e| PedalStreamError::SourceError(e.to_string()))?;
        Ok(Self::wrap(reader))
    }
}

impl<R: Read> WavSource<R> {
    /// Decode WAV data from any reader, e.g. stdin.
    pub fn from_reader(reader: R) -> Result<Self> {
        let reader =
            WavReader::new(reader).map_err(|e| PedalStreamError::SourceError(e.to_string()))?;
        Ok(Self::wrap(reader))
    }

    fn wrap(reader: WavReader<R>) -> Self {
        let spec = reader.spec();
        let norm = (1i64 << (spec.bits_per_sample - 1)) as f32;
        Self { reader, spec, norm }
    }

    /// Container format of the input stream, for creating a matching sink.
    pub fn spec(&self) -> WavSpec {
        self.spec
    }
}

impl<R: Read> SampleSource for WavSource<R> {
    fn load(&mut self, max_samples: usize) -> Result<Vec<f32>> {
        let mut out = Vec::with_capacity(max_samples);
        match self.spec.sample_format {
            SampleFormat::Float => {
                for sample in self.reader.samples::<f32>().take(max_samples) {
                    out.push(sample.map_err(|e| PedalStreamError::SourceError(e.to_string()))?);
                }
            }
            SampleFormat::Int => {
                for sample in self.reader.samples::<i32>().take(max_samples) {
                    let sample =
                        sample.map_err(|e| PedalStreamError::SourceError(e.to_string()))?;
                    out.push(sample as f32 / self.norm);
                }
            }
        }
        Ok(out)
    }
}

/// Streaming WAV encoder implementing [`SampleSink`].
///
/// The driver never closes the sink; call [`WavSink::finalize`] after the
/// run to patch the WAV header.
pub struct WavSink<W: Write + Seek> {
    writer: WavWriter<W>,
    spec: WavSpec,
    scale: f32,
}

impl WavSink<BufWriter<File>> {
    /// Create a WAV file on disk with the given spec.
    pub fn create(path: impl AsRef<Path>, spec: WavSpec) -> Result<Self> {
        let writer = WavWriter::create(path.as_ref(), spec)
            .map_err(|e| PedalStreamError::SinkError(e.to_string()))?;
        Ok(Self::wrap(writer, spec))
    }
}

impl<W: Write + Seek> WavSink<W> {
    /// Encode WAV data into any writer with the given spec.
    pub fn from_writer(writer: W, spec: WavSpec) -> Result<Self> {
        let writer = WavWriter::new(writer, spec)
            .map_err(|e| PedalStreamError::SinkError(e.to_string()))?;
        Ok(Self::wrap(writer, spec))
    }

    fn wrap(writer: WavWriter<W>, spec: WavSpec) -> Self {
        let scale = ((1i64 << (spec.bits_per_sample - 1)) - 1) as f32;
        Self {
            writer,
            spec,
            scale,
        }
    }

    /// Finish the stream and patch the header. Must be called once, after
    /// the driver is done.
    pub fn finalize(self) -> Result<()> {
        self.writer
            .finalize()
            .map_err(|e| PedalStreamError::SinkError(e.to_string()))
    }
}

impl<W: Write + Seek> SampleSink for WavSink<W> {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        match self.spec.sample_format {
            SampleFormat::Float => {
                for &sample in samples {
                    self.writer
                        .write_sample(sample)
                        .map_err(|e| PedalStreamError::SinkError(e.to_string()))?;
                }
            }
            SampleFormat::Int => {
                for &sample in samples {
                    let amplitude = (sample.clamp(-1.0, 1.0) * self.scale) as i32;
                    self.writer
                        .write_sample(amplitude)
                        .map_err(|e| PedalStreamError::SinkError(e.to_string()))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn int_spec() -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    #[test]
    fn test_source_normalizes_int_samples() {
        let mut bytes = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut bytes, int_spec()).unwrap();
            for sample in [0i16, 16_384, -16_384, i16::MAX] {
                writer.write_sample(sample).unwrap();
            }
            writer.finalize().unwrap();
        }
        bytes.set_position(0);

        let mut source = WavSource::from_reader(bytes).unwrap();
        assert_eq!(source.spec(), int_spec());

        let samples = source.load(16).unwrap();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0], 0.0);
        assert!((samples[1] - 0.5).abs() < 1e-6);
        assert!((samples[2] + 0.5).abs() < 1e-6);

        // a further load reports clean exhaustion
        assert!(source.load(16).unwrap().is_empty());
    }

    #[test]
    fn test_load_respects_max_samples() {
        let mut bytes = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut bytes, int_spec()).unwrap();
            for i in 0..10i16 {
                writer.write_sample(i * 100).unwrap();
            }
            writer.finalize().unwrap();
        }
        bytes.set_position(0);

        let mut source = WavSource::from_reader(bytes).unwrap();
        assert_eq!(source.load(4).unwrap().len(), 4);
        assert_eq!(source.load(4).unwrap().len(), 4);
        assert_eq!(source.load(4).unwrap().len(), 2);
    }

    #[test]
    fn test_sink_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        let mut sink = WavSink::create(&path, int_spec()).unwrap();
        sink.write(&[0.0, 0.5, -0.5, 2.0]).unwrap();
        sink.finalize().unwrap();

        let mut source = WavSource::open(&path).unwrap();
        let samples = source.load(16).unwrap();
        assert_eq!(samples.len(), 4);
        assert!((samples[1] - 0.5).abs() < 1e-3);
        assert!((samples[2] + 0.5).abs() < 1e-3);
        // out-of-range input was clamped, not wrapped
        assert!(samples[3] > 0.99);
    }

    #[test]
    fn test_float_spec_passes_through() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48_000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let mut bytes = Cursor::new(Vec::new());
        {
            let mut sink = WavSink::from_writer(&mut bytes, spec).unwrap();
            sink.write(&[0.25, -0.75]).unwrap();
            sink.finalize().unwrap();
        }
        bytes.set_position(0);

        let mut source = WavSource::from_reader(bytes).unwrap();
        assert_eq!(source.load(4).unwrap(), vec![0.25, -0.75]);
    }
}
