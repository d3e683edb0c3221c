//! CLI entry point for `msgbody`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};

use msgbody::config::{self, Config};
use msgbody::parser::gmail;
use msgbody::render::preview;
use msgbody::store::cache::ResolvedCache;
use msgbody::Resolver;

#[derive(Parser)]
#[command(
    name = "msgbody",
    version,
    about = "Resolve Gmail API message JSON into a single renderable body"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one message file and print its body
    Resolve {
        /// Message JSON (full message or bare payload)
        path: PathBuf,
        /// Snippet to fall back on when no part decodes
        #[arg(long)]
        snippet: Option<String>,
        /// Print the resolved content as JSON
        #[arg(long, conflicts_with = "preview")]
        json: bool,
        /// Print a one-line text preview instead of markup
        #[arg(long)]
        preview: bool,
    },
    /// Resolve many message files through the cache
    Batch {
        paths: Vec<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config {
        /// Also write it to the config file location
        #[arg(long)]
        save: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Resolve {
            path,
            snippet,
            json,
            preview,
        } => cmd_resolve(&path, snippet.as_deref(), json, preview, &config),
        Commands::Batch { paths, json } => cmd_batch(&paths, json, &config),
        Commands::Config { save } => cmd_config(&config, save),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_path = config::log_file_path(config);
    let log_dir = config::cache_dir(config);
    let log_name = log_path.file_name().unwrap_or_default();
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, log_name);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Resolve a single message file.
fn cmd_resolve(
    path: &Path,
    snippet: Option<&str>,
    json: bool,
    preview: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let mut message = gmail::load_message(path)?;
    if let Some(snippet) = snippet {
        message.snippet = Some(snippet.to_string());
    }

    let resolver = Resolver::new(config.resolve_options());
    let resolved = message.resolve_with(&resolver);
    if resolved.used_fallback {
        tracing::warn!(path = %path.display(), "No part decoded, showing fallback text");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
    } else if preview {
        println!(
            "{}",
            preview::preview_text(&resolved, config.resolve.preview_chars)
        );
    } else {
        println!("{}", resolved.body);
    }
    Ok(())
}

/// Resolve many message files, printing one summary line per message.
fn cmd_batch(paths: &[PathBuf], json: bool, config: &Config) -> anyhow::Result<()> {
    if paths.is_empty() {
        anyhow::bail!("No message files given");
    }

    let resolver = Resolver::new(config.resolve_options());
    let mut cache = ResolvedCache::new(config.performance.lru_cache_size, resolver);
    let mut fallbacks = 0usize;
    let mut failed = 0usize;

    for path in paths {
        let message = match gmail::load_message(path) {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Skipping message");
                failed += 1;
                continue;
            }
        };
        let resolved = cache.get_or_resolve(&message);
        if resolved.used_fallback {
            fallbacks += 1;
        }

        let text = preview::preview_text(&resolved, config.resolve.preview_chars);
        if json {
            let line = serde_json::json!({
                "path": path.display().to_string(),
                "id": &message.id,
                "subject": message.subject(),
                "content_kind": resolved.content_kind,
                "used_fallback": resolved.used_fallback,
                "preview": text,
            });
            println!("{line}");
        } else {
            let kind = if resolved.is_html() { "html " } else { "plain" };
            let flag = if resolved.used_fallback { "*" } else { " " };
            println!(
                "  {kind}{flag} {:<40} {}",
                preview::truncate_chars(message.subject().unwrap_or("(no subject)"), 40),
                text
            );
        }
    }

    if !json {
        println!();
        println!(
            "  {} message(s), {} fallback(s), {} unreadable, {} cache hit(s)",
            paths.len() - failed,
            fallbacks,
            failed,
            cache.hits()
        );
    }
    Ok(())
}

/// Print (and optionally save) the effective configuration.
fn cmd_config(config: &Config, save: bool) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    if save {
        let path = config::save_config(config)?;
        eprintln!("Saved to {}", path.display());
    } else if let Some(path) = config::config_file_path() {
        eprintln!("Config file: {}", path.display());
    }
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "msgbody", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
