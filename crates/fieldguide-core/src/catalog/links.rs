use std::path::{Component, Path};

use crate::markup::image_tag;
use crate::shared::CoreConfig;

/// Resolves case-study links and images against the deployment layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLinks {
    base_url: Option<String>,
    build_subdir: String,
    path_marker: String,
    image_prefix: String,
    image_width: u32,
}

impl SiteLinks {
    pub fn new(
        base_url: Option<String>,
        build_subdir: impl Into<String>,
        path_marker: impl Into<String>,
        image_prefix: impl Into<String>,
        image_width: u32,
    ) -> Self {
        Self {
            base_url: base_url.map(|b| b.trim_end_matches('/').to_string()),
            build_subdir: build_subdir.into().trim_matches('/').to_string(),
            path_marker: path_marker.into(),
            image_prefix: image_prefix.into(),
            image_width,
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            config.build_subdir.clone(),
            config.path_marker.clone(),
            config.image_prefix.clone(),
            config.image_width,
        )
    }

    /// Splits `source` at the first `path_marker` component into (repository root, directory of
    /// the notebook below the marker). Without a marker the whole parent is the root.
    fn split_source(&self, source: &str) -> (String, String) {
        let parent = Path::new(source).parent().unwrap_or_else(|| Path::new(""));
        let parts: Vec<Component<'_>> = parent.components().collect();
        let marker = parts
            .iter()
            .position(|c| c.as_os_str() == self.path_marker.as_str());
        let join = |slice: &[Component<'_>]| {
            slice
                .iter()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .filter(|s| s != "/")
                .collect::<Vec<_>>()
                .join("/")
        };
        let (root, rel_dir) = match marker {
            Some(idx) => (join(&parts[..idx]), join(&parts[idx + 1..])),
            None => (join(&parts), String::new()),
        };
        if parent.has_root() {
            (format!("/{}", root), rel_dir)
        } else {
            (root, rel_dir)
        }
    }

    /// Base against which rendered pages are addressed: the configured deployment URL or the
    /// local build directory under the repository root.
    fn base_for(&self, root: &str) -> String {
        match &self.base_url {
            Some(base) => base.clone(),
            None if root.is_empty() => self.build_subdir.clone(),
            None => format!("{}/{}", root.trim_end_matches('/'), self.build_subdir),
        }
    }

    /// Address of the rendered page for a notebook at `source` whose page file name is `link`.
    pub fn page_href(&self, source: &str, link: &str) -> String {
        let (root, rel_dir) = self.split_source(source);
        let base = self.base_for(&root);
        if rel_dir.is_empty() {
            format!("{}/{}", base, link)
        } else {
            format!("{}/{}/{}", base, rel_dir, link)
        }
    }

    /// `<img>` for a case-study thumbnail; empty when the notebook names no image.
    pub fn image(&self, file_name: &str) -> String {
        if file_name.is_empty() {
            String::new()
        } else {
            image_tag(&format!("{}{}", self.image_prefix, file_name), self.image_width)
        }
    }
}
