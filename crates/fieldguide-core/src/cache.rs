//! Process-wide content cache, built once before any page is rendered.

use std::path::Path;

use crate::catalog::{extract_case_studies, CaseStudyRecord};
use crate::knowledge::{
    normalize_online_resources, normalize_software_tools, KnowledgeBase, Normalized, RawResultSet,
};
use crate::shared::CoreConfig;
use crate::table::{Table, TableKind, TableRecord};

/// What degraded while the cache was built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Datasets that could not be fetched or scanned and are served as empty tables.
    pub unavailable: Vec<TableKind>,
    /// Knowledge-base records dropped for missing properties.
    pub skipped_records: usize,
    /// Notebooks that could not be read.
    pub skipped_notebooks: usize,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.unavailable.is_empty() && self.skipped_records == 0 && self.skipped_notebooks == 0
    }
}

/// Immutable tables shared by every page of a build.
#[derive(Debug, Clone)]
pub struct ContentCache {
    online_resources: Table,
    software_tools: Table,
    case_studies: Table,
    report: BuildReport,
}

impl ContentCache {
    /// Fetches online resources, then software tools, then scans the notebook corpus. Failures
    /// never abort the build: the affected dataset becomes an empty table and is listed in the
    /// [`BuildReport`].
    pub async fn build(kb: &dyn KnowledgeBase, config: &CoreConfig) -> Self {
        let mut report = BuildReport::default();

        let online_resources = fetch_dataset(
            kb,
            TableKind::OnlineResources,
            &config.online_resources_database,
            normalize_online_resources,
            &mut report,
        )
        .await;
        let software_tools = fetch_dataset(
            kb,
            TableKind::SoftwareTools,
            &config.software_tools_database,
            normalize_software_tools,
            &mut report,
        )
        .await;

        let case_studies = match extract_case_studies(Path::new(&config.content_root), &config.notebook_glob) {
            Ok(catalog) => {
                report.skipped_notebooks = catalog.skipped;
                Table::from_records(TableKind::CaseStudies, catalog.records)
            }
            Err(e) => {
                tracing::error!(
                    target: "fieldguide::cache",
                    dataset = %TableKind::CaseStudies,
                    error = %e,
                    "Dataset unavailable, using an empty table"
                );
                report.unavailable.push(TableKind::CaseStudies);
                Table::empty::<CaseStudyRecord>(TableKind::CaseStudies)
            }
        };

        tracing::info!(
            target: "fieldguide::cache",
            site = %config.site_name,
            online_resources = online_resources.len(),
            software_tools = software_tools.len(),
            case_studies = case_studies.len(),
            skipped_records = report.skipped_records,
            skipped_notebooks = report.skipped_notebooks,
            "Content cache ready"
        );

        Self {
            online_resources,
            software_tools,
            case_studies,
            report,
        }
    }

    /// Assembles a cache from prebuilt tables.
    pub fn from_tables(online_resources: Table, software_tools: Table, case_studies: Table) -> Self {
        Self {
            online_resources,
            software_tools,
            case_studies,
            report: BuildReport::default(),
        }
    }

    pub fn table(&self, kind: TableKind) -> &Table {
        match kind {
            TableKind::OnlineResources => &self.online_resources,
            TableKind::SoftwareTools => &self.software_tools,
            TableKind::CaseStudies => &self.case_studies,
        }
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }
}

/// Queries one database and normalizes it into a table of `kind`. An upstream failure is logged
/// and yields an empty table with the record's columns.
async fn fetch_dataset<R, F>(
    kb: &dyn KnowledgeBase,
    kind: TableKind,
    database_id: &str,
    normalize: F,
    report: &mut BuildReport,
) -> Table
where
    R: TableRecord,
    F: FnOnce(&RawResultSet) -> Normalized<R>,
{
    match kb.query_database(database_id).await {
        Ok(raw) => {
            let normalized = normalize(&raw);
            report.skipped_records += normalized.skipped();
            Table::from_records(kind, normalized.records)
        }
        Err(e) => {
            tracing::error!(
                target: "fieldguide::cache",
                dataset = %kind,
                source = kb.name(),
                status = ?e.status(),
                error = %e,
                "Dataset unavailable, using an empty table"
            );
            report.unavailable.push(kind);
            Table::empty::<R>(kind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::filter::TagFilterEngine;
    use crate::knowledge::RawResultSet;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned responses keyed by database id; unknown ids answer 403.
    struct StubKnowledgeBase {
        responses: HashMap<String, RawResultSet>,
        calls: Mutex<Vec<String>>,
    }

    impl StubKnowledgeBase {
        fn new(responses: Vec<(&str, RawResultSet)>) -> Self {
            Self {
                responses: responses.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl KnowledgeBase for StubKnowledgeBase {
        fn name(&self) -> &str {
            "stub"
        }

        async fn query_database(&self, database_id: &str) -> Result<RawResultSet, ApiError> {
            self.calls.lock().unwrap().push(database_id.to_string());
            self.responses
                .get(database_id)
                .cloned()
                .ok_or_else(|| ApiError::Status {
                    status: 403,
                    body: "{\"code\":\"restricted_resource\"}".to_string(),
                })
        }
    }

    fn config(content_root: &Path) -> CoreConfig {
        let mut config = CoreConfig::load_from(&content_root.join("no-config")).unwrap();
        config.content_root = content_root.to_string_lossy().into_owned();
        config.online_resources_database = "resources-db".into();
        config.software_tools_database = "tools-db".into();
        config
    }

    fn resources() -> RawResultSet {
        RawResultSet {
            results: vec![
                json!({
                    "id": "r1",
                    "properties": {
                        "Name": { "title": [ { "plain_text": "Image.sc", "href": "https://forum.image.sc" } ] },
                        "Keywords": { "multi_select": [ { "name": "Community" } ] }
                    }
                }),
                json!({ "id": "r2", "properties": {} }),
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn upstream_failure_degrades_to_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let kb = StubKnowledgeBase::new(vec![("resources-db", resources())]);
        let cache = ContentCache::build(&kb, &config(dir.path())).await;

        assert_eq!(
            *kb.calls.lock().unwrap(),
            vec!["resources-db".to_string(), "tools-db".to_string()]
        );
        assert_eq!(cache.table(TableKind::OnlineResources).len(), 1);
        assert!(cache.table(TableKind::SoftwareTools).is_empty());
        assert_eq!(cache.report().unavailable, vec![TableKind::SoftwareTools]);
        assert_eq!(cache.report().skipped_records, 1);
        assert!(!cache.report().is_clean());

        let engine = TagFilterEngine::from_config(&config(dir.path()));
        let filtered = engine
            .filter(cache.table(TableKind::SoftwareTools), &["Segmentation", "Community"])
            .unwrap();
        assert!(filtered.is_empty());
    }

    #[tokio::test]
    async fn missing_content_root_marks_case_studies_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.content_root = dir.path().join("missing").to_string_lossy().into_owned();
        let kb = StubKnowledgeBase::new(vec![
            ("resources-db", RawResultSet::default()),
            ("tools-db", RawResultSet::default()),
        ]);
        let cache = ContentCache::build(&kb, &cfg).await;
        assert_eq!(cache.report().unavailable, vec![TableKind::CaseStudies]);
        assert_eq!(cache.table(TableKind::CaseStudies).columns().len(), 6);
    }

    #[tokio::test]
    async fn each_failed_dataset_keeps_its_own_columns() {
        let dir = tempfile::tempdir().unwrap();
        let kb = StubKnowledgeBase::new(Vec::new());
        let cache = ContentCache::build(&kb, &config(dir.path())).await;

        assert_eq!(
            cache.report().unavailable,
            vec![TableKind::OnlineResources, TableKind::SoftwareTools]
        );
        assert_eq!(cache.report().skipped_records, 0);
        let names = |kind| -> Vec<String> {
            cache.table(kind).columns().iter().map(|c| c.name.clone()).collect()
        };
        assert_eq!(names(TableKind::OnlineResources), vec!["Name", "Keywords", "Favourite"]);
        assert_eq!(
            names(TableKind::SoftwareTools),
            vec!["Software tool", "Description", "Used for", "Keywords", "Favourite"]
        );
    }
}
