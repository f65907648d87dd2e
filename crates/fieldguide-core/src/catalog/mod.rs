//! Case-study catalog built from the notebook corpus.
//!
//! Every notebook matched under the content root contributes one row, derived from the front
//! matter of its first cell. Notebooks that cannot be read are skipped and counted.

mod front_matter;
mod links;

pub use front_matter::{parse_front_matter, FrontMatter};
pub use links::SiteLinks;

use globset::Glob;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::CatalogError;
use crate::markup::escape_html;
use crate::table::{Column, ColumnRole, Row, TableRecord};

const NOTEBOOK_EXTENSION: &str = "ipynb";
const PAGE_EXTENSION: &str = "html";

pub(crate) const COL_TITLE: &str = "Title";
pub(crate) const COL_DESCRIPTION: &str = "Description";
pub(crate) const COL_IMAGE: &str = "Image";
pub(crate) const COL_KEYWORDS: &str = "Keywords";
pub(crate) const COL_LINK: &str = "Link";
pub(crate) const COL_SOURCE: &str = "Source";

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseStudyRecord {
    pub title: String,
    pub description: String,
    pub image: String,
    pub keywords: String,
    /// File name of the rendered page (`.ipynb` rewritten to `.html`).
    pub link: String,
    /// Path of the notebook as discovered under the content root.
    pub source: String,
}

impl CaseStudyRecord {
    pub fn from_front_matter(front_matter: FrontMatter, source: &Path) -> Self {
        Self {
            title: front_matter.title,
            description: front_matter.description,
            image: front_matter.image,
            keywords: front_matter.keywords,
            link: page_link(source),
            source: source.to_string_lossy().into_owned(),
        }
    }
}

/// Page file name for a notebook path: `a/b/demo.ipynb` -> `demo.html`.
pub(crate) fn page_link(source: &Path) -> String {
    let file_name = Path::new(source.file_name().unwrap_or_default());
    match file_name.extension() {
        Some(ext) if ext == NOTEBOOK_EXTENSION => file_name
            .with_extension(PAGE_EXTENSION)
            .to_string_lossy()
            .into_owned(),
        _ => file_name.to_string_lossy().into_owned(),
    }
}

impl TableRecord for CaseStudyRecord {
    fn columns() -> Vec<Column> {
        vec![
            Column::new(COL_TITLE, ColumnRole::Display),
            Column::new(COL_DESCRIPTION, ColumnRole::Display),
            Column::new(COL_IMAGE, ColumnRole::Display),
            Column::new(COL_KEYWORDS, ColumnRole::Tags),
            Column::new(COL_LINK, ColumnRole::Internal),
            Column::new(COL_SOURCE, ColumnRole::Internal),
        ]
    }

    /// Title and image stay plain here; the filter turns them into markup per page.
    fn into_row(self) -> Row {
        let keywords = (!self.keywords.trim().is_empty()).then_some(self.keywords);
        Row::new(vec![
            Some(escape_html(&self.title)),
            Some(escape_html(&self.description)),
            Some(self.image),
            keywords,
            Some(self.link),
            Some(self.source),
        ])
    }
}

/// Result of a corpus scan.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub records: Vec<CaseStudyRecord>,
    /// Notebooks that matched the glob but could not be read or had no cells.
    pub skipped: usize,
}

#[derive(Deserialize)]
struct Notebook {
    #[serde(default)]
    cells: Vec<NotebookCell>,
}

#[derive(Deserialize)]
struct NotebookCell {
    #[serde(default)]
    source: CellSource,
}

/// nbformat stores cell sources either as one string or as a list of lines.
#[derive(Deserialize)]
#[serde(untagged)]
enum CellSource {
    Text(String),
    Lines(Vec<String>),
}

impl Default for CellSource {
    fn default() -> Self {
        CellSource::Text(String::new())
    }
}

impl CellSource {
    fn into_text(self) -> String {
        match self {
            CellSource::Text(text) => text,
            CellSource::Lines(lines) => lines.concat(),
        }
    }
}

/// Raw source of the first cell of a notebook document.
fn first_cell_source(document: &str) -> Result<String, String> {
    let notebook: Notebook = serde_json::from_str(document).map_err(|e| e.to_string())?;
    notebook
        .cells
        .into_iter()
        .next()
        .map(|cell| cell.source.into_text())
        .ok_or_else(|| "notebook has no cells".to_string())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

/// Notebook paths under `root` whose root-relative path matches `pattern`, sorted by name.
fn discover_notebooks(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, CatalogError> {
    if !root.is_dir() {
        return Err(CatalogError::ContentRoot(root.to_path_buf()));
    }
    let matcher = Glob::new(pattern)
        .map_err(|source| CatalogError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?
        .compile_matcher();

    let paths = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .strip_prefix(root)
                .map(|rel| matcher.is_match(rel))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect();
    Ok(paths)
}

/// Scans `content_root` for notebooks matching `notebook_glob` and parses the first cell of each.
pub fn extract_case_studies(
    content_root: impl AsRef<Path>,
    notebook_glob: &str,
) -> Result<Catalog, CatalogError> {
    let root = content_root.as_ref();
    let mut catalog = Catalog::default();
    for path in discover_notebooks(root, notebook_glob)? {
        let source = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|doc| first_cell_source(&doc));
        match source {
            Ok(cell) => {
                let record = CaseStudyRecord::from_front_matter(parse_front_matter(&cell), &path);
                if record.title.is_empty() {
                    tracing::debug!(
                        target: "fieldguide::catalog",
                        notebook = %path.display(),
                        "No title heading in first cell"
                    );
                }
                catalog.records.push(record);
            }
            Err(reason) => {
                tracing::warn!(
                    target: "fieldguide::catalog",
                    notebook = %path.display(),
                    error = %reason,
                    "Skipping unreadable notebook"
                );
                catalog.skipped += 1;
            }
        }
    }
    tracing::info!(
        target: "fieldguide::catalog",
        root = %root.display(),
        case_studies = catalog.records.len(),
        skipped = catalog.skipped,
        "Catalog scanned {} notebooks",
        catalog.records.len() + catalog.skipped
    );
    Ok(catalog)
}
