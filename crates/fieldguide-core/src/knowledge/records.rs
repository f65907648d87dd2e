use serde::{Deserialize, Serialize};

use crate::markup::{escape_html, hyperlink};
use crate::table::{Column, ColumnRole, Row, TableRecord};

pub(crate) const COL_NAME: &str = "Name";
pub(crate) const COL_KEYWORDS: &str = "Keywords";
pub(crate) const COL_FAVOURITE: &str = "Favourite";
pub(crate) const COL_SOFTWARE_TOOL: &str = "Software tool";
pub(crate) const COL_DESCRIPTION: &str = "Description";
pub(crate) const COL_USED_FOR: &str = "Used for";

/// Online resource page (tutorial, course, paper...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineResourceRecord {
    pub name: String,
    pub link: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub favourite: bool,
}

/// Software tool page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareToolRecord {
    pub name: String,
    pub homepage: String,
    pub description: String,
    pub used_for: Vec<String>,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub favourite: bool,
}

/// Comma-joined tag cell; no tags is a null cell.
fn tag_cell(tags: &[String]) -> Option<String> {
    let joined = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    (!joined.is_empty()).then_some(joined)
}

impl TableRecord for OnlineResourceRecord {
    fn columns() -> Vec<Column> {
        vec![
            Column::new(COL_NAME, ColumnRole::Display),
            Column::new(COL_KEYWORDS, ColumnRole::Tags),
            Column::new(COL_FAVOURITE, ColumnRole::Internal),
        ]
    }

    fn into_row(self) -> Row {
        Row::new(vec![
            Some(hyperlink(&self.link, &self.name)),
            tag_cell(&self.keywords),
            Some(self.favourite.to_string()),
        ])
    }
}

impl TableRecord for SoftwareToolRecord {
    fn columns() -> Vec<Column> {
        vec![
            Column::new(COL_SOFTWARE_TOOL, ColumnRole::Display),
            Column::new(COL_DESCRIPTION, ColumnRole::Display),
            Column::new(COL_USED_FOR, ColumnRole::Tags),
            Column::new(COL_KEYWORDS, ColumnRole::Tags),
            Column::new(COL_FAVOURITE, ColumnRole::Internal),
        ]
    }

    fn into_row(self) -> Row {
        Row::new(vec![
            Some(hyperlink(&self.homepage, &self.name)),
            Some(escape_html(&self.description)),
            tag_cell(&self.used_for),
            tag_cell(&self.keywords),
            Some(self.favourite.to_string()),
        ])
    }
}
