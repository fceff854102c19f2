//! PDF Provider for extracting text from local PDF files

use crate::error::{AgentRagError, Result};
use crate::providers::{Source, SourceItem, SourceProvider};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Pattern used when a directory of PDFs is supplied
const DIRECTORY_PATTERN: &str = "**/*.pdf";

/// Provider for extracting text from PDF files
pub struct PDFProvider;

impl Default for PDFProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PDFProvider {
    /// Create a new PDFProvider
    pub fn new() -> Self {
        Self
    }

    fn extract_text_from_pdf(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| {
            AgentRagError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read PDF file {}: {}", path.display(), e),
            ))
        })?;

        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            AgentRagError::Parse(format!(
                "Failed to extract text from PDF {}: {}",
                path.display(),
                e
            ))
        })?;

        if text.trim().is_empty() {
            return Err(AgentRagError::Parse(format!(
                "PDF file {} contains no extractable text (may be image-based)",
                path.display()
            )));
        }

        Ok(text)
    }

    /// First short non-empty line, else a title derived from the file name
    fn extract_title(&self, content: &str, filename: &str) -> String {
        let first_line = content
            .lines()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
            .unwrap_or("");

        if !first_line.is_empty() && first_line.len() < 200 {
            return first_line.to_string();
        }

        Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.replace(['_', '-'], " "))
            .unwrap_or_else(|| "Untitled PDF".to_string())
    }

    fn scan_directory(&self, base_path: &Path) -> Result<Vec<PathBuf>> {
        let glob_pattern = glob::Pattern::new(DIRECTORY_PATTERN)?;
        let mut pdf_files = Vec::new();

        for entry in WalkDir::new(base_path)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let is_pdf = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
            if !is_pdf {
                continue;
            }

            if let Ok(relative) = path.strip_prefix(base_path) {
                let relative = relative.to_string_lossy().to_ascii_lowercase();
                if glob_pattern.matches(&relative) || !relative.contains('/') {
                    pdf_files.push(path.to_path_buf());
                }
            }
        }

        Ok(pdf_files)
    }

    fn to_item(&self, path: &Path, uri: String, content: String) -> SourceItem {
        let title = self.extract_title(&content, &uri);
        SourceItem::new(uri, title, content, "pdf")
            .with_metadata("file_path", path.to_string_lossy())
    }
}

#[async_trait]
impl SourceProvider for PDFProvider {
    fn provider_type(&self) -> &'static str {
        "pdf"
    }

    async fn load(&self, source: &Source) -> Result<Vec<SourceItem>> {
        let Source::Pdf(path) = source else {
            return Err(AgentRagError::InvalidInput(format!(
                "pdf provider cannot load {}",
                source.label()
            )));
        };

        if !path.exists() {
            return Err(AgentRagError::InvalidInput(format!(
                "Path does not exist: {}",
                path.display()
            )));
        }

        if path.is_file() {
            let is_pdf = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
            if !is_pdf {
                return Err(AgentRagError::InvalidInput(format!(
                    "File is not a PDF: {}",
                    path.display()
                )));
            }
            let content = self.extract_text_from_pdf(path)?;
            let uri = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            return Ok(vec![self.to_item(path, uri, content)]);
        }

        let mut items = Vec::new();
        for pdf_path in self.scan_directory(path)? {
            match self.extract_text_from_pdf(&pdf_path) {
                Ok(content) => {
                    let uri = pdf_path
                        .strip_prefix(path)
                        .unwrap_or(&pdf_path)
                        .to_string_lossy()
                        .to_string();
                    items.push(self.to_item(&pdf_path, uri, content));
                }
                Err(e) => tracing::warn!("Skipping PDF {}: {}", pdf_path.display(), e),
            }
        }

        Ok(items)
    }
}
