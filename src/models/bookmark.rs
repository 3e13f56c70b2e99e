// src/models/bookmark.rs

use serde::Serialize;

/// Result of flipping a bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookmarkToggle {
    Added,
    Removed,
}

impl BookmarkToggle {
    pub fn as_str(self) -> &'static str {
        match self {
            BookmarkToggle::Added => "added",
            BookmarkToggle::Removed => "removed",
        }
    }
}

/// JSON body returned to XHR callers.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub status: BookmarkToggle,
}
