#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use chapterwai::app_config::{self, Config, TranslationProvider};
use chapterwai::app_controller::Controller;

/// `--provider` values
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Gemini,
    Anthropic,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Gemini => TranslationProvider::Gemini,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
        }
    }
}

/// `--log-level` values
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split the raw dump into one file per chapter
    Split(SplitArgs),

    /// Translate every pending chapter file
    Translate(TranslateArgs),

    /// Split, then translate
    Run(RunArgs),

    /// Write chapters.json listing the translated chapters
    Index {
        /// Directory holding translated chapters
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Generate shell completions for chapterwai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct SplitArgs {
    /// Concatenated source text to split
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory receiving ch_<N>.txt files
    #[arg(long)]
    chapters_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
struct TranslateArgs {
    /// Directory holding source chapters
    #[arg(long)]
    chapters_dir: Option<PathBuf>,

    /// Directory receiving translated chapters
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Skip chapters numbered below this value
    #[arg(long)]
    resume_from: Option<u32>,

    /// Override the provider selected in the config
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Override the model of the selected provider
    #[arg(short, long, env = "CHAPTERWAI_MODEL")]
    model: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
struct RunArgs {
    /// Concatenated source text to split
    #[arg(long)]
    input: Option<PathBuf>,

    #[command(flatten)]
    translate: TranslateArgs,
}

/// ChapterWAI - web-novel chapter splitting and translation with AI
///
/// Splits a concatenated novel dump into chapter files and translates them
/// chapter by chapter with glossary and style guidance.
#[derive(Parser, Debug)]
#[command(name = "chapterwai")]
#[command(version)]
#[command(about = "AI-powered web-novel chapter translation tool")]
#[command(long_about = "ChapterWAI splits a raw novel dump into chapters and translates them with AI providers.

EXAMPLES:
    chapterwai split                              # Split untranslated_chapters.txt into cn_chapters/
    chapterwai translate                          # Translate pending chapters into en_chapters/
    chapterwai translate --resume-from 120        # Skip chapters below 120
    chapterwai translate -p ollama -m qwen2.5:14b # Use a specific provider and model
    chapterwai run                                # Split, then translate
    chapterwai index                              # Refresh en_chapters/chapters.json
    chapterwai completions bash > chapterwai.bash # Generate bash completions

CONFIGURATION:
    Settings live in conf.json unless --config-path points elsewhere. A missing
    file is written out with defaults on first use.

SUPPORTED PROVIDERS:
    gemini    - Google Gemini API (requires GEMINI_API_KEY or a configured key)
    anthropic - Anthropic Claude API (requires ANTHROPIC_API_KEY or a configured key)
    ollama    - Local Ollama server")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Path of the JSON config file
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Coloured `HH:MM:SS.mmm LEVEL message` lines on stderr
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Tag and ANSI colour for a log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "\x1B[1;31m"),
            Level::Warn => ("WARN ", "\x1B[1;33m"),
            Level::Info => ("INFO ", "\x1B[1;32m"),
            Level::Debug => ("DEBUG", "\x1B[1;36m"),
            Level::Trace => ("TRACE", "\x1B[1;35m"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (tag, colour) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", colour, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace-capable logger; the effective level is narrowed once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&level));
    }

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "chapterwai", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = load_or_create_config(&cli.config_path)?;

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    match &cli.command {
        Commands::Split(args) => apply_split_args(&mut config, args),
        Commands::Translate(args) => apply_translate_args(&mut config, args),
        Commands::Run(args) => {
            apply_split_args(&mut config, &SplitArgs {
                input: args.input.clone(),
                chapters_dir: args.translate.chapters_dir.clone(),
            });
            apply_translate_args(&mut config, &args.translate);
        }
        Commands::Index { output_dir } => {
            if let Some(dir) = output_dir {
                config.paths.output_dir = dir.clone();
            }
        }
        Commands::Completions { .. } => {}
    }

    // Only translation talks to a provider
    if matches!(cli.command, Commands::Translate(_) | Commands::Run(_)) {
        config.validate().context("Configuration validation failed")?;
    }

    log::set_max_level(level_filter(&config.log_level));

    let controller = Controller::with_config(config)?;

    match cli.command {
        Commands::Split(_) => {
            let chapters = controller.split()?;
            info!("Wrote {} chapter files", chapters.len());
        }
        Commands::Translate(_) => {
            let summary = controller.translate().await?;
            info!(
                "Translated {} chapters ({} already done, {} below resume floor)",
                summary.translated, summary.already_translated, summary.below_resume_floor
            );
        }
        Commands::Run(_) => {
            let summary = controller.run().await?;
            info!(
                "Translated {} chapters ({} already done, {} below resume floor)",
                summary.translated, summary.already_translated, summary.below_resume_floor
            );
        }
        Commands::Index { .. } => {
            controller.index()?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Load the configuration file, writing the defaults first if it is missing
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;

        return Ok(config);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();

    let config_json = serde_json::to_string_pretty(&config)
        .context("Failed to serialize default config to JSON")?;
    std::fs::write(config_path, config_json)
        .context(format!("Failed to write default config to file: {}", config_path))?;

    Ok(config)
}

fn apply_split_args(config: &mut Config, args: &SplitArgs) {
    if let Some(input) = &args.input {
        config.paths.raw_input = input.clone();
    }
    if let Some(dir) = &args.chapters_dir {
        config.paths.chapters_dir = dir.clone();
    }
}

fn apply_translate_args(config: &mut Config, args: &TranslateArgs) {
    if let Some(dir) = &args.chapters_dir {
        config.paths.chapters_dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.paths.output_dir = dir.clone();
    }
    if let Some(resume_from) = args.resume_from {
        config.translation.common.resume_from = resume_from;
    }
    if let Some(provider) = &args.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &args.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }
}
