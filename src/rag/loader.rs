//! Corpus loading.
//!
//! Walks the documents directory and extracts plain text from the formats
//! the corpus actually contains: `.txt`/`.md`/`.csv` read as-is, `.pdf`
//! extracted page by page so citations can carry page numbers. Files that
//! fail to parse are skipped with a warning rather than failing the whole
//! index build.

use std::path::Path;

use walkdir::WalkDir;

use crate::core::errors::ApiError;

const TEXT_EXTENSIONS: [&str; 3] = ["txt", "md", "csv"];

/// One unit of extractable text. `page` is set for paginated formats.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub page: Option<u32>,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Path relative to the documents directory.
    pub source: String,
    pub pages: Vec<LoadedPage>,
}

pub fn load_corpus(docs_dir: &Path) -> Result<Vec<LoadedDocument>, ApiError> {
    if !docs_dir.is_dir() {
        return Err(ApiError::NotFound(format!(
            "documents directory {} does not exist",
            docs_dir.display()
        )));
    }

    let mut paths: Vec<_> = WalkDir::new(docs_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    paths.sort();

    let mut documents = Vec::new();

    for path in paths {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let pages = if TEXT_EXTENSIONS.contains(&extension.as_str()) {
            load_text_file(&path)
        } else if extension == "pdf" {
            load_pdf_file(&path)
        } else {
            tracing::debug!("Skipping unsupported file {}", path.display());
            continue;
        };

        let Some(pages) = pages else { continue };
        if pages.is_empty() {
            continue;
        }

        documents.push(LoadedDocument {
            source: relative_source(docs_dir, &path),
            pages,
        });
    }

    Ok(documents)
}

pub fn is_supported(path: &Path) -> bool {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    TEXT_EXTENSIONS.contains(&extension.as_str()) || extension == "pdf"
}

fn relative_source(docs_dir: &Path, path: &Path) -> String {
    path.strip_prefix(docs_dir)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn load_text_file(path: &Path) -> Option<Vec<LoadedPage>> {
    match std::fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => Some(vec![LoadedPage { page: None, text }]),
        Ok(_) => None,
        Err(err) => {
            tracing::warn!("Failed to read {}: {}", path.display(), err);
            None
        }
    }
}

fn load_pdf_file(path: &Path) -> Option<Vec<LoadedPage>> {
    match pdf_extract::extract_text_by_pages(path) {
        Ok(pages) => {
            let pages: Vec<LoadedPage> = pages
                .into_iter()
                .enumerate()
                .filter(|(_, text)| !text.trim().is_empty())
                .map(|(idx, text)| LoadedPage {
                    page: Some(idx as u32 + 1),
                    text,
                })
                .collect();
            Some(pages)
        }
        Err(err) => {
            tracing::warn!("Failed to extract PDF {}: {}", path.display(), err);
            None
        }
    }
}
