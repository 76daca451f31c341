use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration required to run the export process.
/// This decouples the logic from how the arguments were parsed (CLI/Config file).
#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub input: PathBuf,
    pub target_dir: PathBuf,
    pub print_artifacts: bool,
    pub split_json: bool,
    pub filename_style: FilenameStyle,
    pub format: OutputFormat,
    pub verbose: bool,
    pub quiet: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilenameStyle {
    /// Keep alphanumerics, `.`, `_`, `-` and spaces from the conversation name.
    #[default]
    Sanitized,
    /// Lowercase ASCII, hyphen separated.
    Slug,
}

/// What each conversation is written as.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Standalone pages with artifact panels, linked from `index.html`.
    #[default]
    Html,
    /// Plain Markdown documents, linked from `index.md`.
    Markdown,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Markdown => "md",
        }
    }
}

/// Escape the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 8);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Strip a conversation name down to characters safe in a filename.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | ' '))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Hands out unique filename stems for one export run.
///
/// The first claimant of a stem gets it verbatim; later ones get `-2`, `-3`, …
/// Comparison is case-insensitive so exports stay distinct on case-folding
/// filesystems. Values hold the last suffix handed out for a base stem.
#[derive(Default)]
pub struct FilenameRegistry {
    style: FilenameStyle,
    taken: HashMap<String, usize>,
}

impl FilenameRegistry {
    pub fn new(style: FilenameStyle) -> Self {
        Self {
            style,
            taken: HashMap::new(),
        }
    }

    /// Keep `stem` from ever being handed out, e.g. `index`.
    pub fn reserve(&mut self, stem: &str) {
        self.taken.insert(stem.to_lowercase(), 1);
    }

    /// `position` is the 1-based index of the record in the archive and names
    /// conversations whose title is missing or sanitizes to nothing.
    pub fn allocate(&mut self, name: Option<&str>, position: usize) -> String {
        let base = name
            .map(|n| match self.style {
                FilenameStyle::Sanitized => sanitize_filename(n),
                FilenameStyle::Slug => {
                    let raw_slug = slug::slugify(n);
                    // Slug output is ASCII-only, so byte == char
                    raw_slug[..raw_slug.len().min(80)]
                        .trim_end_matches('-')
                        .to_string()
                }
            })
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("conversation_{}", position));

        let key = base.to_lowercase();
        let stem = match self.taken.get(&key).copied() {
            None => base,
            Some(mut n) => loop {
                n += 1;
                let candidate = format!("{}-{}", base, n);
                // A suffixed stem may itself collide with a literal title like "notes-2"
                if !self.taken.contains_key(&candidate.to_lowercase()) {
                    self.taken.insert(key, n);
                    break candidate;
                }
            },
        };
        self.taken.entry(stem.to_lowercase()).or_insert(1);
        stem
    }
}
