//! List item display data.

use std::path::PathBuf;

/// One row's display data.
///
/// Items are immutable once handed to a display session. When the backing list
/// changes the caller passes a fresh slice; rows are never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListItem {
    pub title: String,
    /// Secondary line, e.g. `"1985 | Nintendo | Platform"`.
    pub subtitle: String,
    pub description: String,
    pub cover_image_path: Option<PathBuf>,
    /// External page opened by the inline "Read More" link.
    pub detail_link: Option<String>,
}

impl ListItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn cover(mut self, path: impl Into<PathBuf>) -> Self {
        self.cover_image_path = Some(path.into());
        self
    }

    pub fn detail_link(mut self, url: impl Into<String>) -> Self {
        self.detail_link = Some(url.into());
        self
    }

    pub fn has_cover(&self) -> bool {
        self.cover_image_path.is_some()
    }
}

/// Join the non-empty subtitle fields with `" | "`.
pub fn join_subtitle<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    fields
        .into_iter()
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}
