//! Per-page tag filtering over cached tables.

use regex::Regex;

use crate::catalog::{self, SiteLinks};
use crate::error::FilterError;
use crate::knowledge::records::{COL_KEYWORDS, COL_USED_FOR};
use crate::markup::{escape_html, slugify};
use crate::shared::{CoreConfig, ToolMatchStrategy};
use crate::table::{Column, ColumnRole, Row, Table, TableKind};

/// Stateless filter: identical inputs always give identical output, and the source table is never
/// modified.
#[derive(Debug, Clone)]
pub struct TagFilterEngine {
    tool_match: ToolMatchStrategy,
    links: SiteLinks,
}

impl TagFilterEngine {
    pub fn new(tool_match: ToolMatchStrategy, links: SiteLinks) -> Self {
        Self { tool_match, links }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.tool_match, SiteLinks::from_config(config))
    }

    /// Tag columns consulted for `kind`.
    fn match_columns(&self, kind: TableKind) -> &'static [&'static str] {
        match (kind, self.tool_match) {
            (TableKind::SoftwareTools, ToolMatchStrategy::UsedFor) => &[COL_USED_FOR],
            (TableKind::SoftwareTools, ToolMatchStrategy::UsedForOrKeywords) => {
                &[COL_USED_FOR, COL_KEYWORDS]
            }
            (TableKind::OnlineResources, _) | (TableKind::CaseStudies, _) => &[COL_KEYWORDS],
        }
    }

    /// Rows whose tag cells contain any of `tags` (case-sensitive substring), display columns
    /// only, in table order. Blank tags are ignored; at least one usable tag is required.
    pub fn filter<S: AsRef<str>>(&self, table: &Table, tags: &[S]) -> Result<Table, FilterError> {
        let tags: Vec<&str> = tags
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .collect();
        let first_tag = *tags.first().ok_or(FilterError::NoTags)?;
        let pattern = Regex::new(
            &tags
                .iter()
                .map(|t| regex::escape(t))
                .collect::<Vec<_>>()
                .join("|"),
        )?;

        let matched: Vec<usize> = self
            .match_columns(table.kind())
            .iter()
            .filter_map(|name| table.column_index(name))
            .collect();
        let display: Vec<usize> = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.role == ColumnRole::Display)
            .map(|(i, _)| i)
            .collect();
        let columns: Vec<Column> = display.iter().map(|&i| table.columns()[i].clone()).collect();

        let case_study = (table.kind() == TableKind::CaseStudies).then(|| CaseStudyColumns::locate(table));
        let slug = slugify(first_tag);

        let rows = table
            .rows()
            .iter()
            .filter(|row| {
                matched
                    .iter()
                    .any(|&i| row.cell(i).map(|v| pattern.is_match(v)).unwrap_or(false))
            })
            .map(|row| {
                let mut cells: Vec<Option<String>> =
                    display.iter().map(|&i| row.cells.get(i).cloned().flatten()).collect();
                if let Some(cs) = &case_study {
                    self.decorate_case_study(cs, row, &display, Some(slug.as_str()), &mut cells);
                }
                Row::new(cells)
            })
            .collect();

        Ok(Table::new(table.kind(), columns, rows))
    }

    /// Unfiltered presentation of `table`: tag cells become tag buttons and internal columns are
    /// dropped. Case-study titles link to their page and images become `<img>` tags, as in
    /// filtered views.
    pub fn listing(&self, table: &Table) -> Table {
        let listing = table.with_tag_buttons();
        if table.kind() != TableKind::CaseStudies {
            return listing;
        }
        let cs = CaseStudyColumns::locate(table);
        let kept: Vec<usize> = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.role != ColumnRole::Internal)
            .map(|(i, _)| i)
            .collect();
        let rows = table
            .rows()
            .iter()
            .zip(listing.rows())
            .map(|(source, shown)| {
                let mut cells = shown.cells.clone();
                self.decorate_case_study(&cs, source, &kept, None, &mut cells);
                Row::new(cells)
            })
            .collect();
        Table::new(table.kind(), listing.columns().to_vec(), rows)
    }

    /// `shown` maps output positions to source column indices. The title anchor is `#{slug}` when
    /// a slug is given.
    fn decorate_case_study(
        &self,
        cs: &CaseStudyColumns,
        row: &Row,
        shown: &[usize],
        slug: Option<&str>,
        cells: &mut [Option<String>],
    ) {
        let out_index = |src: Option<usize>| src.and_then(|s| shown.iter().position(|&d| d == s));

        if let (Some(out), Some(title_idx)) = (out_index(cs.title), cs.title) {
            let title = row.cell(title_idx).unwrap_or_default();
            let link = cs.link.and_then(|i| row.cell(i)).unwrap_or_default();
            let source = cs.source.and_then(|i| row.cell(i)).unwrap_or(link);
            let href = self.links.page_href(source, link);
            let anchor = slug
                .map(|slug| format!("#{}", escape_html(slug)))
                .unwrap_or_default();
            cells[out] = Some(format!(
                "<a href=\"{}{}\">{}</a>",
                escape_html(&href),
                anchor,
                title
            ));
        }
        if let (Some(out), Some(image_idx)) = (out_index(cs.image), cs.image) {
            cells[out] = Some(self.links.image(row.cell(image_idx).unwrap_or_default()));
        }
    }
}

/// Column positions the case-study decoration reads.
struct CaseStudyColumns {
    title: Option<usize>,
    image: Option<usize>,
    link: Option<usize>,
    source: Option<usize>,
}

impl CaseStudyColumns {
    fn locate(table: &Table) -> Self {
        Self {
            title: table.column_index(catalog::COL_TITLE),
            image: table.column_index(catalog::COL_IMAGE),
            link: table.column_index(catalog::COL_LINK),
            source: table.column_index(catalog::COL_SOURCE),
        }
    }
}
