use std::io::{self, BufReader, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use pedalstream::{Device, PedalModel, StreamConfig, StreamDriver, WavSink, WavSource};

#[derive(Parser, Debug)]
#[command(name = "pedalstream")]
#[command(
    author,
    version,
    about = "Stream a WAV file through a neural pedal model"
)]
struct Cli {
    /// Input WAV file, "-" for stdin
    #[arg(short, long)]
    input: String,

    /// Output WAV file
    #[arg(short, long)]
    output: PathBuf,

    /// Model directory containing config.json and model.safetensors
    #[arg(short, long)]
    model: PathBuf,

    /// Windows per inference call
    #[arg(long, default_value = "600")]
    batch: usize,

    /// Enable debug-level tracing logs
    #[arg(long)]
    tracing: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.tracing { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_level.into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if cli.input == "-" {
        let source = WavSource::from_reader(BufReader::new(io::stdin()))
            .context("reading WAV stream from stdin")?;
        process(source, &cli)
    } else {
        let source = WavSource::open(&cli.input)
            .with_context(|| format!("opening input file {}", cli.input))?;
        process(source, &cli)
    }
}

fn process<R: Read>(source: WavSource<R>, cli: &Cli) -> Result<()> {
    let model = PedalModel::load(&cli.model, cli.batch, &Device::Cpu)
        .with_context(|| format!("loading model from {}", cli.model.display()))?;
    let config = StreamConfig::new(model.batch_size(), model.window_size())?;

    let spec = source.spec();
    info!(
        window = model.window_size(),
        batch = cli.batch,
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        "starting stream"
    );

    let sink = WavSink::create(&cli.output, spec)
        .with_context(|| format!("creating output file {}", cli.output.display()))?;

    let mut driver = StreamDriver::new(config, source, sink, model);
    let summary = driver.run()?;

    let (_source, sink, _model) = driver.into_parts();
    sink.finalize()?;

    info!(
        cycles = summary.cycles,
        samples_in = summary.samples_in,
        samples_out = summary.samples_out,
        "stream complete"
    );
    Ok(())
}
