//! Page manifest: which tables land on which topic page.

use std::collections::HashSet;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use fieldguide_core::{
    ConfigError, ContentCache, DisplayOptions, FilterError, Table, TableKind, TableRenderer,
    TagFilterEngine,
};
use serde::Deserialize;

/// One filtered table written to `{out}/{name}.html`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageEntry {
    pub name: String,
    pub table: TableKind,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageManifest {
    /// Also write `all-{table}.html` for every table.
    #[serde(default)]
    pub listings: bool,
    #[serde(default)]
    pub pages: Vec<PageEntry>,
}

impl PageManifest {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let manifest_error = |reason: String| ConfigError::Manifest {
            path: path.to_path_buf(),
            reason,
        };
        let manifest: Self = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| manifest_error(e.to_string()))?;

        let mut seen = HashSet::new();
        for page in &manifest.pages {
            let name = page.name.trim();
            if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
                return Err(manifest_error(format!("invalid page name '{}'", page.name)));
            }
            if !seen.insert(name) {
                return Err(manifest_error(format!("duplicate page name '{}'", name)));
            }
        }
        Ok(manifest)
    }
}

/// Filtered view of `kind`, or the unfiltered listing with tag buttons when `tags` is empty.
pub fn view(
    cache: &ContentCache,
    engine: &TagFilterEngine,
    kind: TableKind,
    tags: &[String],
) -> Result<Table, FilterError> {
    let table = cache.table(kind);
    if tags.is_empty() {
        Ok(engine.listing(table))
    } else {
        engine.filter(table, tags)
    }
}

pub fn render(table: &Table) -> String {
    TableRenderer::new(DisplayOptions::for_kind(table.kind())).render(table)
}

/// Writes every manifest page (and the listings, when enabled) under `out`. Returns the files
/// written, in manifest order.
pub fn write_pages(
    cache: &ContentCache,
    engine: &TagFilterEngine,
    manifest: &PageManifest,
    out: &Path,
) -> Result<Vec<PathBuf>, Box<dyn Error + Send + Sync>> {
    fs::create_dir_all(out)?;
    let mut written = Vec::new();

    for page in &manifest.pages {
        let table = view(cache, engine, page.table, &page.tags)
            .map_err(|e| format!("page '{}': {}", page.name, e))?;
        let path = out.join(format!("{}.html", page.name.trim()));
        fs::write(&path, render(&table))?;
        tracing::info!(
            target: "fieldguide::builder",
            page = %page.name,
            table = %page.table,
            rows = table.len(),
            "Page written"
        );
        written.push(path);
    }

    if manifest.listings {
        for kind in TableKind::all() {
            let table = view(cache, engine, kind, &[])?;
            let path = out.join(format!("all-{}.html", kind));
            fs::write(&path, render(&table))?;
            tracing::info!(
                target: "fieldguide::builder",
                table = %kind,
                rows = table.len(),
                "Listing written"
            );
            written.push(path);
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldguide_core::{OnlineResourceRecord, SiteLinks, SoftwareToolRecord, ToolMatchStrategy};
    use scraper::{Html, Selector};

    fn cache() -> ContentCache {
        let resources = Table::from_records(
            TableKind::OnlineResources,
            vec![
                OnlineResourceRecord {
                    name: "Image.sc".into(),
                    link: "https://forum.image.sc".into(),
                    keywords: vec!["Community".into()],
                    favourite: false,
                },
                OnlineResourceRecord {
                    name: "Cellpose docs".into(),
                    link: "https://cellpose.readthedocs.io".into(),
                    keywords: vec!["Segmentation".into()],
                    favourite: true,
                },
            ],
        );
        let tools = Table::from_records(
            TableKind::SoftwareTools,
            vec![SoftwareToolRecord {
                name: "napari".into(),
                homepage: "https://napari.org".into(),
                description: "Multi-dimensional viewer".into(),
                used_for: vec!["Visualization".into()],
                keywords: vec!["Python".into()],
                favourite: false,
            }],
        );
        let studies = Table::empty::<fieldguide_core::CaseStudyRecord>(TableKind::CaseStudies);
        ContentCache::from_tables(resources, tools, studies)
    }

    fn engine() -> TagFilterEngine {
        TagFilterEngine::new(
            ToolMatchStrategy::UsedForOrKeywords,
            SiteLinks::new(None, "_build/html", "src", "../_images/", 150),
        )
    }

    fn manifest_file(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("pages.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_pages_and_listing_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = manifest_file(
            dir.path(),
            r#"
listings = true

[[pages]]
name = "segmentation-resources"
table = "online_resources"
tags = ["Segmentation"]

[[pages]]
name = "viewers"
table = "software_tools"
tags = ["Visualization", "Python"]
"#,
        );
        let manifest = PageManifest::load(&path).unwrap();
        assert!(manifest.listings);
        assert_eq!(manifest.pages.len(), 2);
        assert_eq!(manifest.pages[1].table, TableKind::SoftwareTools);
        assert_eq!(manifest.pages[1].tags, vec!["Visualization", "Python"]);
    }

    #[test]
    fn duplicate_page_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = manifest_file(
            dir.path(),
            r#"
[[pages]]
name = "a"
table = "online_resources"
tags = ["x"]

[[pages]]
name = "a"
table = "software_tools"
tags = ["y"]
"#,
        );
        let err = PageManifest::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Manifest { .. }));
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn missing_manifest_is_a_manifest_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PageManifest::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Manifest { .. }));
    }

    #[test]
    fn writes_filtered_pages_and_listings() {
        let out = tempfile::tempdir().unwrap();
        let manifest = PageManifest {
            listings: true,
            pages: vec![PageEntry {
                name: "segmentation".into(),
                table: TableKind::OnlineResources,
                tags: vec!["Segmentation".into()],
            }],
        };
        let written = write_pages(&cache(), &engine(), &manifest, out.path()).unwrap();
        assert_eq!(written.len(), 4);
        assert!(out.path().join("all-software-tools.html").is_file());

        let page = fs::read_to_string(out.path().join("segmentation.html")).unwrap();
        let doc = Html::parse_fragment(&page);
        let links: Vec<String> = doc
            .select(&Selector::parse("tbody a").unwrap())
            .map(|a| a.text().collect())
            .collect();
        assert_eq!(links, vec!["Cellpose docs"]);
        assert!(!page.contains("<button"));

        let listing = fs::read_to_string(out.path().join("all-online-resources.html")).unwrap();
        let doc = Html::parse_fragment(&listing);
        assert_eq!(doc.select(&Selector::parse("tbody tr").unwrap()).count(), 2);
        assert_eq!(doc.select(&Selector::parse("button").unwrap()).count(), 2);
    }

    #[test]
    fn blank_tags_fail_the_page() {
        let out = tempfile::tempdir().unwrap();
        let manifest = PageManifest {
            listings: false,
            pages: vec![PageEntry {
                name: "blank".into(),
                table: TableKind::SoftwareTools,
                tags: vec!["  ".into()],
            }],
        };
        let err = write_pages(&cache(), &engine(), &manifest, out.path()).unwrap_err();
        assert!(err.to_string().contains("blank"));
    }

    #[test]
    fn case_study_listing_links_to_notebook_pages() {
        let out = tempfile::tempdir().unwrap();
        let studies = Table::from_records(
            TableKind::CaseStudies,
            vec![fieldguide_core::CaseStudyRecord {
                title: "Grains".into(),
                description: "Label grains.".into(),
                image: "grains.png".into(),
                keywords: "Segmentation".into(),
                link: "grains.html".into(),
                source: "src/sections/segmentation/grains.ipynb".into(),
            }],
        );
        let base = cache();
        let cache = ContentCache::from_tables(
            base.table(TableKind::OnlineResources).clone(),
            base.table(TableKind::SoftwareTools).clone(),
            studies,
        );
        let manifest = PageManifest {
            listings: true,
            pages: Vec::new(),
        };
        write_pages(&cache, &engine(), &manifest, out.path()).unwrap();

        let listing = fs::read_to_string(out.path().join("all-case-studies.html")).unwrap();
        let doc = Html::parse_fragment(&listing);
        let link = doc.select(&Selector::parse("tbody a").unwrap()).next().unwrap();
        assert_eq!(
            link.value().attr("href"),
            Some("_build/html/sections/segmentation/grains.html")
        );
        let img = doc.select(&Selector::parse("tbody img").unwrap()).next().unwrap();
        assert_eq!(img.value().attr("src"), Some("../_images/grains.png"));
    }
}
