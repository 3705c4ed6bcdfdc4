
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use scraper::{Html, Selector};
use tracing::debug;

use crate::{EngineError, Result};

/// A format-specific text extractor for one source file.
///
/// Adapters are reconstructed on every index reload from the current
/// directory listing; they read files and nothing else. Chunking and
/// embedding happen downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceAdapter {
    Text { path: PathBuf },
    Pdf { path: PathBuf },
    Html { path: PathBuf },
}

impl SourceAdapter {
    /// Build an adapter for a path based on its extension, or `None` for
    /// unrecognized formats.
    #[inline]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        let path = path.to_path_buf();
        match extension.as_str() {
            "txt" | "md" => Some(Self::Text { path }),
            "pdf" => Some(Self::Pdf { path }),
            "html" | "htm" => Some(Self::Html { path }),
            _ => None,
        }
    }

    /// The file name identifying this source in fragment records and logs.
    #[inline]
    pub fn source_name(&self) -> String {
        self.path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path().display().to_string())
    }

    #[inline]
    pub fn path(&self) -> &Path {
        match self {
            Self::Text { path } | Self::Pdf { path } | Self::Html { path } => path,
        }
    }

    /// Extract the raw text of this source.
    #[inline]
    pub fn extract(&self) -> Result<String> {
        match self {
            Self::Text { path } => read_file(path),
            Self::Pdf { path } => extract_pdf(path),
            Self::Html { path } => Ok(extract_html(&read_file(path)?)),
        }
    }
}

/// List the recognized document files in a directory, one adapter each,
/// in file-name order. Unrecognized extensions are skipped without error.
#[inline]
pub fn scan_directory(dir: &Path) -> Result<Vec<SourceAdapter>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut adapters = Vec::new();
    for path in paths {
        match SourceAdapter::from_path(&path) {
            Some(adapter) => adapters.push(adapter),
            None => debug!("ignoring unrecognized file: {}", path.display()),
        }
    }
    Ok(adapters)
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            EngineError::NotFound(path.to_path_buf())
        } else {
            EngineError::Io(e)
        }
    })
}

/// Page texts arrive from the extractor separated by line breaks. An
/// unparseable document is reported as corrupt rather than skipped here;
/// the index decides what to do with a failing source.
fn extract_pdf(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            EngineError::NotFound(path.to_path_buf())
        } else {
            EngineError::Io(e)
        }
    })?;

    pdf_extract::extract_text_from_mem(&bytes).map_err(|e| EngineError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Best-effort text extraction from HTML markup; never fails.
///
/// Script, style and noscript subtrees are dropped, remaining text nodes
/// are collected depth-first, each line is trimmed, blank lines are
/// removed, and the rest is rejoined with newlines.
fn extract_html(markup: &str) -> String {
    let mut document = Html::parse_document(markup);

    let skipped = Selector::parse("script, style, noscript").expect("valid selector");
    let skipped_ids: Vec<_> = document
        .select(&skipped)
        .map(|element| element.id())
        .collect();
    for id in skipped_ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    let text = document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join("\n");

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
