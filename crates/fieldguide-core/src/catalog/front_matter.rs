//! Convention-based front matter of a notebook's first cell.
//!
//! ```text
//! # Title
//! ![](thumbnail.png)
//! ---
//! Description, possibly over several lines.
//! Tags:
//! `tag one`, `tag two`
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// First line starting with a single `#` marker; the space after it is optional.
static RE_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^#[ \t]*([^#\s][^\r\n]*?)[ \t]*\r?$").expect("title regex")
});

static RE_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9_-]+\.(?:png|jpg|jpeg|gif)\b").expect("image regex")
});

static RE_DESCRIPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)---(.*?)Tags:").expect("description regex"));

static RE_KEYWORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Tags:(.*?)\s*\z").expect("keywords regex"));

/// Fields mined from the first cell. A pattern that does not match leaves its field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontMatter {
    pub title: String,
    pub description: String,
    pub image: String,
    pub keywords: String,
}

fn capture(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

pub fn parse_front_matter(source: &str) -> FrontMatter {
    FrontMatter {
        title: capture(&RE_TITLE, source),
        description: capture(&RE_DESCRIPTION, source),
        image: RE_IMAGE
            .find(source)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        keywords: capture(&RE_KEYWORDS, source).replace('`', ""),
    }
}
