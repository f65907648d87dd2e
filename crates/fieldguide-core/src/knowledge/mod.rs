//! Knowledge-base access and record normalization.
//!
//! | Dataset          | Title property  | Link property      | Tag properties          |
//! |------------------|-----------------|--------------------|-------------------------|
//! | Online resources | `Name`          | `Name` title href  | `Keywords`              |
//! | Software tools   | `Software tool` | `Homepage` url     | `Used for`, `Keywords`  |

mod normalize;
pub(crate) mod records;

pub use normalize::{normalize_online_resources, normalize_software_tools, Normalized};
pub use records::{OnlineResourceRecord, SoftwareToolRecord};

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Raw pages returned by a database query, in API order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawResultSet {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl RawResultSet {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// A hosted structured database the pipeline reads from.
#[async_trait::async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Human-readable name for log lines.
    fn name(&self) -> &str;

    /// Returns every page of the database. Non-success responses are reported, not panicked on.
    async fn query_database(&self, database_id: &str) -> Result<RawResultSet, ApiError>;
}
