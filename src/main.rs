use chat_archive_html::{ExportConfig, FilenameStyle, OutputFormat};
use clap::Parser;
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Convert an exported chat archive into static HTML pages.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Archive JSON (a list of conversations) or a single conversation JSON.
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Directory to write HTML files to.
    /// Defaults to ./chat-archive-html if not set in config.
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Path to a specific configuration file.
    /// Defaults to $XDG_CONFIG_HOME/chat-archive-html/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Show artifact contents inline when the page is printed.
    #[arg(long)]
    print_artifacts: bool,

    /// Also write each conversation as its own pretty-printed JSON file.
    #[arg(long)]
    split_json: bool,

    /// Output format for conversations and the index.
    /// Defaults to html if not set in config.
    #[arg(long, value_enum, value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// Use lowercase hyphenated filenames instead of the sanitized title.
    #[arg(long)]
    slug_filenames: bool,

    /// Print each file written; debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress progress bar and summary.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Deserialize, Default)]
struct FileConfig {
    output_dir: Option<PathBuf>,
    print_artifacts: Option<bool>,
    split_json: Option<bool>,
    slug_filenames: Option<bool>,
    format: Option<OutputFormat>,
}

fn load_file_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    let path = if let Some(p) = explicit_path {
        if !p.exists() {
            return Err(eyre!("Config file not found: {}", p.display()));
        }
        Some(p.to_path_buf())
    } else {
        dirs::config_dir()
            .map(|d| d.join("chat-archive-html/config.toml"))
            .filter(|p| p.exists())
    };

    match path {
        None => Ok(FileConfig::default()),
        Some(p) => {
            let content = fs::read_to_string(&p)
                .wrap_err_with(|| format!("Failed to read config: {}", p.display()))?;
            toml::from_str(&content)
                .wrap_err_with(|| format!("Failed to parse config: {}", p.display()))
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let env = std::env::var("CHAT_ARCHIVE_HTML_LOG").unwrap_or_else(|_| {
        let level = if verbose {
            "debug"
        } else if quiet {
            "error"
        } else {
            "info"
        };
        format!("chat_archive_html={}", level)
    });
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // 1. Load config file (CLI path > default path)
    let file_cfg = load_file_config(cli.config.as_deref())?;

    if !cli.input.exists() {
        return Err(eyre!("Input file not found: {}", cli.input.display()));
    }

    // 2. Resolve output dir (CLI > Config > Default)
    let target_dir = cli
        .output_dir
        .or(file_cfg.output_dir)
        .unwrap_or_else(|| PathBuf::from("chat-archive-html"));

    // 3. Flags: set on the CLI, or enabled in config
    let slug = cli.slug_filenames || file_cfg.slug_filenames.unwrap_or(false);
    let config = ExportConfig {
        input: cli.input,
        target_dir,
        print_artifacts: cli.print_artifacts || file_cfg.print_artifacts.unwrap_or(false),
        split_json: cli.split_json || file_cfg.split_json.unwrap_or(false),
        filename_style: if slug {
            FilenameStyle::Slug
        } else {
            FilenameStyle::Sanitized
        },
        format: cli.format.or(file_cfg.format).unwrap_or_default(),
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    // 4. Run the business logic
    let summary = chat_archive_html::execute(&config)?;
    if !config.quiet {
        eprintln!("{}", summary);
    }
    Ok(())
}
