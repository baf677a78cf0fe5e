use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use thread_priority::{ThreadBuilder, ThreadPriority, ThreadPriorityValue};
use tracing::{info, warn};

use lambdalisten::constants::DEFAULT_LOG_LEVEL;
use lambdalisten::schedule::{LoadError, ModuleLoader, RenderStats};
use lambdalisten::stream::{CompiledModule, Constant, NativeModule, Sine};
use lambdalisten::{RuntimeConfig, StreamProcessor, link, logger, parse, parse_type};

/// Parser and real-time harness for lambdalisten streams
#[derive(Parser)]
#[command(name = "lambdalisten", version)]
struct Cli {
    /// Runtime configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,

    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Command,
}

/// Settings that take precedence over the config file.
#[derive(clap::Args)]
struct ConfigOverrides {
    /// Frames per render quantum
    #[arg(long, global = true)]
    quantum_size: Option<usize>,
    /// Output channels
    #[arg(long, global = true)]
    channels: Option<usize>,
    #[arg(long, global = true)]
    sample_rate: Option<u32>,
    /// Render thread priority (0-99)
    #[arg(long, global = true)]
    render_priority: Option<u8>,
}

impl ConfigOverrides {
    fn apply(&self, config: &mut RuntimeConfig) {
        if let Some(quantum_size) = self.quantum_size {
            config.quantum_size = quantum_size;
        }
        if let Some(channels) = self.channels {
            config.channels = channels;
        }
        if let Some(sample_rate) = self.sample_rate {
            config.sample_rate = sample_rate;
        }
        if let Some(render_priority) = self.render_priority {
            config.render_priority = render_priority;
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Parse a program and print it back
    Parse {
        /// Source file, stdin when absent
        file: Option<PathBuf>,
        /// Source given inline
        #[arg(short = 'e', long = "expr", conflicts_with = "file")]
        expr: Option<String>,
        /// Parse a type instead of an expression
        #[arg(long = "type")]
        as_type: bool,
        /// Print the syntax tree
        #[arg(long)]
        debug: bool,
    },
    /// Run the harness offline and report what it rendered
    Render {
        #[command(flatten)]
        source: SourceArgs,
        /// Number of quanta to render once the module is ready
        #[arg(short, long, default_value_t = 16)]
        quanta: usize,
    },
    /// Play through the default output device
    #[cfg(feature = "audio")]
    Play {
        #[command(flatten)]
        source: SourceArgs,
        /// Playback duration in seconds
        #[arg(short, long, default_value_t = 5.0)]
        seconds: f32,
    },
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Play a constant sample value
    #[arg(long, conflicts_with = "frequency")]
    constant: Option<f32>,
    /// Play a sine wave at this frequency
    #[arg(long)]
    frequency: Option<f32>,
    /// Load a compiled WebAssembly module
    #[cfg(feature = "wasm")]
    #[arg(long, conflicts_with_all = ["constant", "frequency"])]
    wasm: Option<PathBuf>,
}

/// Built-in streams, shipped to the loader as JSON bytes.
#[derive(Debug, Serialize, Deserialize)]
enum NativeSource {
    Constant(f32),
    Sine(f32),
}

fn native_loader(sample_rate: u32) -> impl ModuleLoader + 'static {
    move |bytes: &[u8]| -> Result<Box<dyn CompiledModule>, LoadError> {
        let source: NativeSource =
            serde_json::from_slice(bytes).map_err(|e| LoadError::Malformed(e.to_string()))?;
        let module: Box<dyn CompiledModule> = match source {
            NativeSource::Constant(v) => Box::new(NativeModule::new(Constant(v))),
            NativeSource::Sine(hz) => Box::new(NativeModule::new(Sine::new(hz, sample_rate))),
        };
        Ok(module)
    }
}

fn native_bytes(source: &SourceArgs) -> Result<Vec<u8>> {
    let native = match (source.constant, source.frequency) {
        (Some(v), _) => NativeSource::Constant(v),
        (None, Some(hz)) => NativeSource::Sine(hz),
        (None, None) => NativeSource::Sine(440.0),
    };
    Ok(serde_json::to_vec(&native)?)
}

fn read_source(file: Option<PathBuf>, expr: Option<String>) -> Result<String> {
    if let Some(expr) = expr {
        return Ok(expr);
    }
    match file {
        Some(path) => {
            fs::read_to_string(&path).with_context(|| format!("cannot read {}", path.display()))
        }
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn run_parse(source: &str, as_type: bool, debug: bool) -> Result<()> {
    let printed = if as_type {
        let ty = parse_type(source).map_err(|e| anyhow!("{}", e.render(source)))?;
        if debug {
            println!("{ty:#?}");
        }
        ty.to_string()
    } else {
        let expr = parse(source).map_err(|e| anyhow!("{}", e.render(source)))?;
        if debug {
            println!("{expr:#?}");
        }
        expr.to_string()
    };
    println!("{printed}");
    Ok(())
}

/// Drives `quanta` quanta on a prioritized render thread, after waiting for
/// the module to become ready.
fn run_render<L: ModuleLoader + 'static>(
    config: &RuntimeConfig,
    loader: L,
    bytes: Vec<u8>,
    quanta: usize,
) -> Result<()> {
    let (mut controller, processor, worker) = link(config, loader);
    let worker_handle = worker.spawn()?;
    controller.load_module(bytes)?;

    let priority = ThreadPriorityValue::try_from(config.render_priority)
        .map_err(|e| anyhow!("invalid render priority: {e}"))?;
    let channels = config.channels;
    let quantum = config.quantum_size;
    let render = ThreadBuilder::default()
        .name("lambdalisten-render")
        .priority(ThreadPriority::Crossplatform(priority))
        .spawn(move |result| {
            if let Err(e) = result {
                warn!("could not raise render thread priority: {e:?}");
            }
            render_offline(processor, channels, quantum, quanta)
        })?;

    controller.wait_ready(Duration::from_secs(5))?;
    let (stats, first) = render.join().map_err(|_| anyhow!("render thread panicked"))?;
    worker_handle.join().map_err(|_| anyhow!("loader thread panicked"))?;

    info!(?stats, "render finished");
    println!(
        "quanta: {} (silent {}, failed {}, dropped loads {})",
        stats.quanta, stats.silent_quanta, stats.failed_quanta, stats.dropped_loads
    );
    println!("first quantum: {first:?}");
    Ok(())
}

fn render_offline(
    mut processor: StreamProcessor,
    channels: usize,
    quantum: usize,
    quanta: usize,
) -> (RenderStats, Vec<f32>) {
    let mut buffers = vec![vec![0.0f32; quantum]; channels];
    let mut first = Vec::new();
    let mut rendered = 0;
    let mut waited = 0;

    while rendered < quanta && waited < 5000 {
        processor.process(&mut buffers);
        if processor.state().is_ready() {
            if rendered == 0 {
                first = buffers.first().cloned().unwrap_or_default();
            }
            rendered += 1;
        } else {
            waited += 1;
            std::thread::sleep(Duration::from_millis(1));
        }
    }
    (processor.stats(), first)
}

#[cfg(feature = "audio")]
fn run_play<L: ModuleLoader + 'static>(
    config: &RuntimeConfig,
    loader: L,
    bytes: Vec<u8>,
    seconds: f32,
) -> Result<()> {
    let (mut controller, processor, worker) = link(config, loader);
    let worker_handle = worker.spawn()?;
    let stream = lambdalisten::audio::start(config, processor)?;

    controller.load_module(bytes)?;
    controller.wait_ready(Duration::from_secs(5))?;
    info!(seconds, "playing");
    std::thread::sleep(Duration::from_secs_f32(seconds.max(0.0)));

    drop(stream);
    worker_handle.join().map_err(|_| anyhow!("loader thread panicked"))?;
    Ok(())
}

/// Config file (or defaults), then command-line overrides, then validation.
fn load_config(cli: &Cli) -> Result<RuntimeConfig> {
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::from_toml_file(path)?,
        None => RuntimeConfig::default(),
    };
    cli.overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(&cli.log_level);

    let config = load_config(&cli)?;

    match cli.command {
        Command::Parse { file, expr, as_type, debug } => {
            let source = read_source(file, expr)?;
            run_parse(&source, as_type, debug)
        }
        Command::Render { source, quanta } => {
            if quanta == 0 {
                bail!("--quanta must be positive");
            }
            #[cfg(feature = "wasm")]
            if let Some(path) = &source.wasm {
                let bytes = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
                return run_render(&config, lambdalisten::stream::wasm::WasmLoader, bytes, quanta);
            }
            let bytes = native_bytes(&source)?;
            run_render(&config, native_loader(config.sample_rate), bytes, quanta)
        }
        #[cfg(feature = "audio")]
        Command::Play { source, seconds } => {
            #[cfg(feature = "wasm")]
            if let Some(path) = &source.wasm {
                let bytes = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
                return run_play(&config, lambdalisten::stream::wasm::WasmLoader, bytes, seconds);
            }
            let bytes = native_bytes(&source)?;
            run_play(&config, native_loader(config.sample_rate), bytes, seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("lambdalisten").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = load_config(&cli(&["--quantum-size", "64", "--channels", "1", "parse", "-e", "x"])).unwrap();
        assert_eq!(config.quantum_size, 64);
        assert_eq!(config.channels, 1);
        assert_eq!(config.sample_rate, RuntimeConfig::default().sample_rate);
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sample_rate = 44100\nchannels = 4").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = load_config(&cli(&["--config", &path, "render", "--channels", "2"])).unwrap();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.channels, 2);
    }

    #[test]
    fn test_overrides_are_validated() {
        assert!(load_config(&cli(&["--channels", "0", "parse", "-e", "x"])).is_err());
        assert!(load_config(&cli(&["--quantum-size", "0", "parse", "-e", "x"])).is_err());
        assert!(load_config(&cli(&["--render-priority", "120", "parse", "-e", "x"])).is_err());
    }
}
