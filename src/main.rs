use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use std::path::PathBuf;

use skill_translator::{
    create_backend, load_documents, BackendKind, BatchRunner, TranslationLibConfig,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliBackend {
    Dictionary,
    Remote,
}

impl From<CliBackend> for BackendKind {
    fn from(backend: CliBackend) -> Self {
        match backend {
            CliBackend::Dictionary => BackendKind::Dictionary,
            CliBackend::Remote => BackendKind::Remote,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliLogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            CliLogLevel::Error => "error",
            CliLogLevel::Warn => "warn",
            CliLogLevel::Info => "info",
            CliLogLevel::Debug => "debug",
            CliLogLevel::Trace => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate all skill documents (default command)
    Run(RunArgs),

    /// Write an example configuration file
    InitConfig {
        #[arg(value_name = "PATH", default_value = "translation-config.toml")]
        path: PathBuf,
    },
}

#[derive(Parser, Debug, Clone)]
struct RunArgs {
    /// Configuration file path (searched in default locations when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input JSON list of skill documents
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output JSON file, rewritten at every checkpoint
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Translation cache file
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Translation backend
    #[arg(short, long, value_enum)]
    backend: Option<CliBackend>,

    /// Documents translated between checkpoints
    #[arg(long)]
    checkpoint: Option<usize>,

    /// Set logging level (overrides RUST_LOG)
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Skill Translator - format-preserving translation of skill descriptors
#[derive(Parser, Debug)]
#[command(name = "skill-translator", version)]
#[command(about = "Translate Markdown skill descriptors while keeping code and structure intact")]
#[command(args_conflicts_with_subcommands = true)]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

fn init_logger(level: Option<CliLogLevel>) {
    let env = env_logger::Env::default().default_filter_or("info");
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(level) = level {
        builder.parse_filters(level.as_filter());
    }
    builder.format_timestamp_secs().init();
}

fn load_config(args: &RunArgs) -> Result<TranslationLibConfig> {
    let mut config = match &args.config {
        Some(path) => TranslationLibConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => TranslationLibConfig::load_from_default_locations(),
    };

    if let Some(input) = &args.input {
        config.paths.input = input.clone();
    }
    if let Some(output) = &args.output {
        config.paths.output = output.clone();
    }
    if let Some(cache) = &args.cache {
        config.paths.cache = cache.clone();
    }
    if let Some(backend) = args.backend {
        config.translation.backend = backend.into();
    }
    if let Some(checkpoint) = args.checkpoint {
        config.batch.checkpoint_size = checkpoint;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn run(args: RunArgs) -> Result<()> {
    let config = load_config(&args)?;

    let documents = load_documents(&config.paths.input)
        .with_context(|| format!("Failed to read input {}", config.paths.input.display()))?;
    info!("加载了 {} 篇文档: {}", documents.len(), config.paths.input.display());

    let mut backend = create_backend(&config).context("Failed to create translation backend")?;
    info!("使用翻译后端: {}", backend.name());

    let runner = BatchRunner::from_config(&config);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let outcome = runner
        .run_until(&documents, backend.as_mut(), shutdown)
        .await
        .with_context(|| format!("Failed to write output {}", runner.output().display()))?;

    if let Some(stats) = backend.cache_stats() {
        info!(
            "缓存命中 {} 次，未命中 {} 次，命中率 {:.1}%，共 {} 条",
            stats.hits,
            stats.misses,
            stats.hit_rate() * 100.0,
            stats.entries
        );
    }

    if outcome.interrupted {
        warn!(
            "翻译已中断：完成 {}/{} 篇，进度已保存到 {}",
            outcome.translated.len(),
            outcome.total,
            runner.output().display()
        );
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::InitConfig { path }) => {
            init_logger(None);
            TranslationLibConfig::generate_example_config(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("示例配置已写入 {}", path.display());
            Ok(())
        }
        Some(Commands::Run(args)) => {
            init_logger(args.log_level);
            run(args).await
        }
        None => {
            init_logger(cli.run.log_level);
            run(cli.run).await
        }
    }
}
