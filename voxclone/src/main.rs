//! voxclone - Voice cloning TTS server with PDF reading and translation

mod audio;
mod config;
mod paths;
mod pdf;
mod registry;
mod server;
mod text;
mod tts;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use config::VoxcloneConfig;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use text::{ChunkMethod, ChunkReport, ChunkingConfig};
use translate_client::Translator;

#[derive(Parser, Debug)]
#[command(name = "voxclone")]
#[command(about = "Voice cloning TTS server with PDF reading and translation", long_about = None)]
#[command(version)]
struct Args {
    /// Config file (default: ~/.config/voxclone/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true, default_value_t = false)]
    debug: bool,

    /// Subcommands (default: serve)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(ServeArgs),
    /// Chunk a PDF or text file and print the result as JSON
    Chunk {
        /// Path to a .pdf or plain text file
        file: PathBuf,

        /// Chunking strategy
        #[arg(long, value_enum, default_value_t = ChunkMethod::Sentences)]
        method: ChunkMethod,

        /// Target chunk size in characters (default: 500 sentences, 800 paragraphs)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        max_chars: Option<u64>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(ClapArgs, Debug, Default)]
struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Directory for voices, generated audio and the registry
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// TTS engine: xtts or silence
    #[arg(long)]
    engine: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => VoxcloneConfig::config_path()?,
    };

    match args.command {
        Some(Commands::Config { action }) => handle_config_command(&action, &config_path),
        Some(Commands::Chunk {
            file,
            method,
            max_chars,
        }) => handle_chunk_command(&file, method, max_chars.map(|n| n as usize)),
        Some(Commands::Serve(serve_args)) => run_server(&config_path, serve_args).await,
        None => run_server(&config_path, ServeArgs::default()).await,
    }
}

async fn run_server(config_path: &Path, overrides: ServeArgs) -> Result<()> {
    let mut config = VoxcloneConfig::load_from(config_path)?;
    if let Some(host) = overrides.host {
        config.host = host;
    }
    if let Some(port) = overrides.port {
        config.port = port;
    }
    if let Some(data_dir) = overrides.data_dir {
        config.data_dir = Some(data_dir);
    }
    if let Some(engine) = overrides.engine {
        config.tts.engine = engine;
    }

    let tts = tts::create_backend(&config.tts).context("Failed to set up TTS engine")?;
    let translator: Arc<dyn Translator> = translate_client::get_translator(&config.translation)
        .context("Failed to set up translation provider")?
        .into();
    if let Err(e) = translator.is_available() {
        warn!("Translation provider {} unavailable: {}", translator.name(), e);
    }

    let addr = config.bind_address();
    let state = server::AppState::new(config, tts, translator)?;

    info!("Data directory: {}", state.paths.root.display());
    info!(
        "TTS engine: {}, translation: {}, {} voices registered",
        state.tts.name(),
        state.translator.name(),
        state.registry.len()
    );

    server::serve(Arc::new(state), &addr).await
}

fn handle_chunk_command(file: &Path, method: ChunkMethod, max_chars: Option<usize>) -> Result<()> {
    let text = pdf::read_document(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let report = ChunkReport::build(&text, method, ChunkingConfig::for_method(method, max_chars));
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn handle_config_command(action: &ConfigAction, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = VoxcloneConfig::load_from(config_path)?;
            println!("# Configuration file: {}", config_path.display());
            if !config_path.exists() {
                println!("# (not found, showing defaults)");
            }
            println!();
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                anyhow::bail!(
                    "{} already exists. Use --force to overwrite.",
                    config_path.display()
                );
            }
            VoxcloneConfig::default().save_to(config_path)?;
            println!("Wrote default configuration to {}", config_path.display());
        }
    }
    Ok(())
}
