//! Column-oriented table model shared by every dataset.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::markup::tag_buttons;

/// The three datasets the pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    OnlineResources,
    SoftwareTools,
    CaseStudies,
}

impl TableKind {
    /// Stable identifier, also used for listing file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::OnlineResources => "online-resources",
            TableKind::SoftwareTools => "software-tools",
            TableKind::CaseStudies => "case-studies",
        }
    }

    /// Returns all kinds in cache construction order.
    pub fn all() -> [Self; 3] {
        [Self::OnlineResources, Self::SoftwareTools, Self::CaseStudies]
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('_', "-").as_str() {
            "online-resources" => Ok(Self::OnlineResources),
            "software-tools" => Ok(Self::SoftwareTools),
            "case-studies" => Ok(Self::CaseStudies),
            other => Err(format!(
                "unknown table '{}' (expected online-resources, software-tools or case-studies)",
                other
            )),
        }
    }
}

/// How a column participates in filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Shown to readers.
    Display,
    /// Comma-joined tag text. Matched by filters, never part of a filtered view.
    Tags,
    /// Bookkeeping only (flags, source paths).
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub role: ColumnRole,
}

impl Column {
    pub fn new(name: impl Into<String>, role: ColumnRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// One row; `None` is a null cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<Option<String>>,
}

impl Row {
    pub fn new(cells: Vec<Option<String>>) -> Self {
        Self { cells }
    }

    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|c| c.as_deref())
    }
}

/// A record type that knows its column layout.
pub trait TableRecord {
    fn columns() -> Vec<Column>;

    /// Cells in the order of [`TableRecord::columns`].
    fn into_row(self) -> Row;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    kind: TableKind,
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(kind: TableKind, columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self {
            kind,
            columns,
            rows,
        }
    }

    /// A table with the record layout and no rows.
    pub fn empty<R: TableRecord>(kind: TableKind) -> Self {
        Self::new(kind, R::columns(), Vec::new())
    }

    pub fn from_records<R, I>(kind: TableKind, records: I) -> Self
    where
        R: TableRecord,
        I: IntoIterator<Item = R>,
    {
        let rows = records.into_iter().map(TableRecord::into_row).collect();
        Self::new(kind, R::columns(), rows)
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Values of a column by name, in row order.
    pub fn column_values(&self, name: &str) -> Vec<Option<&str>> {
        match self.column_index(name) {
            Some(idx) => self.rows.iter().map(|r| r.cell(idx)).collect(),
            None => Vec::new(),
        }
    }

    /// Unfiltered presentation copy: tag columns become clickable tag buttons and internal
    /// columns are dropped.
    pub fn with_tag_buttons(&self) -> Table {
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.role != ColumnRole::Internal)
            .map(|(i, _)| i)
            .collect();
        let columns = keep
            .iter()
            .map(|&i| Column::new(self.columns[i].name.clone(), ColumnRole::Display))
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let cells = keep
                    .iter()
                    .map(|&i| match self.columns[i].role {
                        ColumnRole::Tags => Some(tag_buttons(row.cell(i).unwrap_or_default())),
                        _ => row.cells.get(i).cloned().flatten(),
                    })
                    .collect();
                Row::new(cells)
            })
            .collect();
        Table::new(self.kind, columns, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            TableKind::OnlineResources,
            vec![
                Column::new("Name", ColumnRole::Display),
                Column::new("Keywords", ColumnRole::Tags),
                Column::new("Favourite", ColumnRole::Internal),
            ],
            vec![
                Row::new(vec![
                    Some("<a href=\"https://a\">A</a>".into()),
                    Some("Segmentation, Python".into()),
                    Some("true".into()),
                ]),
                Row::new(vec![Some("<a href=\"https://b\">B</a>".into()), None, Some("false".into())]),
            ],
        )
    }

    #[test]
    fn table_kind_parses_dashes_and_underscores() {
        assert_eq!("software-tools".parse::<TableKind>(), Ok(TableKind::SoftwareTools));
        assert_eq!("case_studies".parse::<TableKind>(), Ok(TableKind::CaseStudies));
        assert!("notebooks".parse::<TableKind>().is_err());
    }

    #[test]
    fn column_values_follow_row_order() {
        let table = sample();
        assert_eq!(
            table.column_values("Keywords"),
            vec![Some("Segmentation, Python"), None]
        );
        assert!(table.column_values("Missing").is_empty());
    }

    #[test]
    fn tag_buttons_view_drops_internal_columns() {
        let view = sample().with_tag_buttons();
        let names: Vec<&str> = view.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Name", "Keywords"]);
        let first = view.rows()[0].cell(1).unwrap();
        assert_eq!(first.matches("<button").count(), 2);
        assert_eq!(view.rows()[1].cell(1), Some(""));
    }
}
