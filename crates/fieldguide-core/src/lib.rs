//! fieldguide-core: content pipeline for the field guide site.
//!
//! Knowledge-base records and notebook front matter are normalized into [`Table`]s, held in an
//! immutable [`ContentCache`], and filtered per page by [`TagFilterEngine`] before
//! [`TableRenderer`] turns them into HTML widgets.

mod cache;
mod catalog;
mod error;
mod filter;
mod knowledge;
mod markup;
mod render;
mod shared;
mod table;

pub use cache::{BuildReport, ContentCache};
pub use catalog::{
    extract_case_studies, parse_front_matter, Catalog, CaseStudyRecord, FrontMatter, SiteLinks,
};
pub use error::{ApiError, CatalogError, ConfigError, FilterError, IntegrityError};
pub use filter::TagFilterEngine;
pub use knowledge::{
    normalize_online_resources, normalize_software_tools, KnowledgeBase, Normalized,
    OnlineResourceRecord, RawResultSet, SoftwareToolRecord,
};
pub use markup::{escape_html, hyperlink, image_tag, slugify, tag_buttons};
pub use render::{ColumnDef, DisplayOptions, TableRenderer, Targets};
pub use shared::{
    CoreConfig, Secrets, ToolMatchStrategy, ENV_BASE_URL, ENV_CONFIG_PATH, ENV_NOTION_KEY,
    ENV_SHARED_DATA,
};
pub use table::{Column, ColumnRole, Row, Table, TableKind, TableRecord};
