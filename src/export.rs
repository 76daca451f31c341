use crate::archive::{ChatMessage, Conversation};
use crate::index::{IndexEntry, render_index, render_index_markdown};
use crate::markdown;
use crate::page::Renderer;
use crate::utils::{ExportConfig, FilenameRegistry, OutputFormat};
use eyre::{Context, Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub const INDEX_STEM: &str = "index";

/// What happened to one archive record.
#[derive(Debug)]
pub enum ProcessResult {
    Written(IndexEntry),
    /// No messages, or an empty name.
    Deleted,
    /// Not a conversation object at all.
    Skipped,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub written: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Done. {} written, {} deleted (empty) skipped, {} invalid skipped.",
            self.written, self.deleted, self.skipped
        )?;
        if self.errors > 0 {
            write!(f, " Completed with {} error(s).", self.errors)?;
        }
        Ok(())
    }
}

/// The main entry point for the business logic.
///
/// An input holding a JSON array is exported as a batch with an index page.
/// A single conversation object is rendered to one page named after the input
/// file. `config.format` picks HTML or Markdown for both.
pub fn execute(config: &ExportConfig) -> Result<ExportSummary> {
    let raw = fs::read_to_string(&config.input)
        .wrap_err_with(|| format!("Failed to read input: {}", config.input.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .wrap_err_with(|| format!("Invalid JSON in {}", config.input.display()))?;

    fs::create_dir_all(&config.target_dir).wrap_err_with(|| {
        format!(
            "Failed to create target directory: {}",
            config.target_dir.display()
        )
    })?;

    match value {
        Value::Array(records) => run_batch(&records, config),
        Value::Object(_) => run_single(&raw, config),
        _ => Err(eyre!(
            "Expected a list of conversations or a single conversation in {}",
            config.input.display()
        )),
    }
}

// ── Batch ─────────────────────────────────────────────────────────────────────

fn run_batch(records: &[Value], config: &ExportConfig) -> Result<ExportSummary> {
    let pb = if config.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(records.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)",
            )
            .map(|s| s.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.println(format!("Found {} conversations.", records.len()));
        bar
    };

    // One renderer for the whole run keeps artifact ids unique across pages.
    let mut renderer = Renderer::new(config.print_artifacts);
    let mut registry = FilenameRegistry::new(config.filename_style);
    registry.reserve(INDEX_STEM);

    let mut entries: Vec<IndexEntry> = Vec::new();
    let mut summary = ExportSummary::default();

    for (i, record) in records.iter().enumerate() {
        let position = i + 1;
        match export_conversation(record, position, config, &mut renderer, &mut registry, &pb) {
            Ok(ProcessResult::Written(entry)) => {
                summary.written += 1;
                entries.push(entry);
            }
            Ok(ProcessResult::Deleted) => summary.deleted += 1,
            Ok(ProcessResult::Skipped) => summary.skipped += 1,
            Err(e) => {
                summary.errors += 1;
                pb.suspend(|| error!(position, "Failed to export conversation: {:#}", e));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    let index_body = match config.format {
        OutputFormat::Html => render_index(&entries),
        OutputFormat::Markdown => render_index_markdown(&entries),
    };
    let index_path = config
        .target_dir
        .join(format!("{}.{}", INDEX_STEM, config.format.extension()));
    match fs::write(&index_path, index_body) {
        Ok(()) => info!(path = %index_path.display(), entries = entries.len(), "Wrote index"),
        Err(e) => {
            summary.errors += 1;
            error!(path = %index_path.display(), "Failed to write index: {}", e);
        }
    }

    debug!(
        artifacts = renderer.artifacts_issued(),
        "Artifact ids handed out"
    );
    Ok(summary)
}

/// A record counts as deleted when it has no messages or an empty name.
fn is_deleted(record: &serde_json::Map<String, Value>) -> bool {
    let no_messages = !matches!(
        record.get("chat_messages"),
        Some(Value::Array(messages)) if !messages.is_empty()
    );
    let empty_name = matches!(record.get("name"), Some(Value::String(name)) if name.is_empty());
    no_messages || empty_name
}

fn export_conversation(
    record: &Value,
    position: usize,
    config: &ExportConfig,
    renderer: &mut Renderer,
    registry: &mut FilenameRegistry,
    pb: &ProgressBar,
) -> Result<ProcessResult> {
    let Some(object) = record.as_object() else {
        pb.suspend(|| warn!(position, "Found a non-object element in the conversation list"));
        return Ok(ProcessResult::Skipped);
    };
    if is_deleted(object) {
        debug!(position, "Skipping deleted conversation");
        return Ok(ProcessResult::Deleted);
    }

    let conversation: Conversation = serde_json::from_value(record.clone())
        .wrap_err("Record does not match the conversation schema")?;

    let name = object.get("name").and_then(Value::as_str);
    if name.is_none() {
        pb.suspend(|| {
            warn!(
                position,
                "Conversation is missing a string 'name'; using a generic filename"
            )
        });
    }
    let stem = registry.allocate(name, position);
    let title = name.map_or_else(|| stem.clone(), str::to_owned);
    let filename = format!("{}.{}", stem, config.format.extension());

    // Sorted once; the page and the index entry both read this order.
    let sorted = conversation.sorted_messages();
    let path = config.target_dir.join(&filename);
    match config.format {
        OutputFormat::Html => {
            let html = renderer.render_page(conversation.title(), &sorted);
            fs::write(&path, html)
                .wrap_err_with(|| format!("Failed to write: {}", path.display()))?;
        }
        OutputFormat::Markdown => write_markdown(&path, conversation.title(), &sorted)?,
    }

    if config.split_json {
        let json_path = config.target_dir.join(format!("{}.json", stem));
        write_json(&json_path, record)?;
    }

    if config.verbose {
        pb.println(format!("Written: {}", filename));
    }

    Ok(ProcessResult::Written(IndexEntry::from_conversation(
        &conversation,
        &sorted,
        &title,
        &filename,
    )))
}

fn write_markdown(path: &Path, title: &str, messages: &[&ChatMessage]) -> Result<()> {
    let file =
        File::create(path).wrap_err_with(|| format!("Failed to create: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    markdown::write_conversation_markdown(&mut writer, title, messages)
        .and_then(|()| writer.flush())
        .wrap_err_with(|| format!("Failed to write: {}", path.display()))
}

fn write_json(path: &Path, record: &Value) -> Result<()> {
    let pretty = serde_json::to_string_pretty(record).wrap_err("Failed to serialize JSON")?;
    fs::write(path, pretty).wrap_err_with(|| format!("Failed to write: {}", path.display()))
}

// ── Single conversation ───────────────────────────────────────────────────────

fn run_single(raw: &str, config: &ExportConfig) -> Result<ExportSummary> {
    let body = match config.format {
        OutputFormat::Html => Renderer::new(config.print_artifacts).render_json(raw),
        OutputFormat::Markdown => markdown::render_json(raw),
    };
    let mut summary = ExportSummary::default();

    if body.is_empty() {
        warn!(input = %config.input.display(), "Input holds no renderable conversation");
        summary.skipped += 1;
        return Ok(summary);
    }

    let path = single_output_path(&config.input, &config.target_dir, config.format);
    fs::write(&path, body).wrap_err_with(|| format!("Failed to write: {}", path.display()))?;
    if config.verbose {
        eprintln!("Written: {}", path.display());
    }
    summary.written += 1;
    Ok(summary)
}

/// `<target_dir>/<input stem>.html`, or `.md`
fn single_output_path(input: &Path, target_dir: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "conversation".to_string());
    target_dir.join(format!("{}.{}", stem, format.extension()))
}
