//! HTML table widget adapter.
//!
//! Rows are emitted as a plain `<table>`; the DataTables options travel as JSON in the
//! `data-options` attribute and are applied client-side.

use serde::{Deserialize, Serialize};

use crate::markup::escape_html;
use crate::table::{ColumnRole, Table};

/// Columns a [`ColumnDef`] applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Targets {
    Indices(Vec<usize>),
    /// DataTables' `"_all"`.
    All(String),
}

impl Targets {
    pub fn all() -> Self {
        Targets::All("_all".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub targets: Targets,
}

/// Display options recognized by the table widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    pub classes: String,
    pub style: String,
    pub column_defs: Vec<ColumnDef>,
    pub paging: bool,
    pub show_index: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            classes: "display compact".to_string(),
            style: "width:100%;margin:auto".to_string(),
            column_defs: vec![ColumnDef {
                width: None,
                class_name: Some("dt-left".to_string()),
                targets: Targets::all(),
            }],
            paging: false,
            show_index: false,
        }
    }
}

impl DisplayOptions {
    /// Single name column stretched to full width, left-aligned.
    pub fn online_resources() -> Self {
        Self {
            column_defs: vec![
                ColumnDef {
                    width: Some("100%".to_string()),
                    class_name: None,
                    targets: Targets::Indices(vec![0]),
                },
                ColumnDef {
                    width: None,
                    class_name: Some("dt-left".to_string()),
                    targets: Targets::Indices(vec![0]),
                },
            ],
            ..Self::default()
        }
    }

    /// Every column left-aligned.
    pub fn software_tools() -> Self {
        Self::default()
    }

    pub fn case_studies() -> Self {
        Self::default()
    }

    pub fn for_kind(kind: crate::table::TableKind) -> Self {
        use crate::table::TableKind::*;
        match kind {
            OnlineResources => Self::online_resources(),
            SoftwareTools => Self::software_tools(),
            CaseStudies => Self::case_studies(),
        }
    }

    /// Client-side options serialized into the `data-options` attribute.
    fn widget_json(&self) -> String {
        serde_json::json!({
            "columnDefs": self.column_defs,
            "paging": self.paging,
        })
        .to_string()
    }
}

/// Renders tables with one fixed set of [`DisplayOptions`].
#[derive(Debug, Clone, Default)]
pub struct TableRenderer {
    options: DisplayOptions,
}

impl TableRenderer {
    pub fn new(options: DisplayOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DisplayOptions {
        &self.options
    }

    /// Cells are already display markup and are written verbatim; headers are escaped.
    /// Internal columns are never emitted.
    pub fn render(&self, table: &Table) -> String {
        let visible: Vec<usize> = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.role != ColumnRole::Internal)
            .map(|(i, _)| i)
            .collect();

        let mut html = format!(
            "<table class=\"{}\" style=\"{}\" data-options=\"{}\">\n<thead>\n<tr>",
            escape_html(&self.options.classes),
            escape_html(&self.options.style),
            escape_html(&self.options.widget_json()),
        );
        if self.options.show_index {
            html.push_str("<th></th>");
        }
        for &i in &visible {
            html.push_str(&format!("<th>{}</th>", escape_html(&table.columns()[i].name)));
        }
        html.push_str("</tr>\n</thead>\n<tbody>\n");
        for (n, row) in table.rows().iter().enumerate() {
            html.push_str("<tr>");
            if self.options.show_index {
                html.push_str(&format!("<td>{}</td>", n));
            }
            for &i in &visible {
                html.push_str(&format!("<td>{}</td>", row.cell(i).unwrap_or_default()));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>\n");
        html
    }
}
