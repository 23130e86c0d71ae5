//! Polymorphic tool associations and tool catalogs.
//!
//! # Responsibility
//! - Identify tool content by `(content_type, content_id)`.
//! - Describe the tool catalogs (bookmarks, projects, stories, terrain providers).

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Content-type string for bookmark tools.
pub const CONTENT_TYPE_BOOKMARK: &str = "bookmark";
/// Content-type string for project tools.
pub const CONTENT_TYPE_PROJECT: &str = "project";
/// Content-type string for story tools.
pub const CONTENT_TYPE_STORY: &str = "story";
/// Content-type string for terrain provider tools.
pub const CONTENT_TYPE_TERRAIN_PROVIDER: &str = "terrain_provider";

/// Tool catalog category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ToolKind {
    Bookmark,
    Project,
    Story,
    TerrainProvider,
}

impl ToolKind {
    /// All tool kinds in display order.
    pub const ALL: [ToolKind; 4] = [
        ToolKind::Bookmark,
        ToolKind::Project,
        ToolKind::Story,
        ToolKind::TerrainProvider,
    ];

    /// Stable content-type string used in tool associations.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Bookmark => CONTENT_TYPE_BOOKMARK,
            Self::Project => CONTENT_TYPE_PROJECT,
            Self::Story => CONTENT_TYPE_STORY,
            Self::TerrainProvider => CONTENT_TYPE_TERRAIN_PROVIDER,
        }
    }

    /// Catalog collection path on the remote API.
    pub fn catalog_path(self) -> &'static str {
        match self {
            Self::Bookmark => "bookmarks",
            Self::Project => "projects",
            Self::Story => "stories",
            Self::TerrainProvider => "terrain-providers",
        }
    }

    /// Parses a content-type string.
    pub fn from_content_type(value: &str) -> Option<Self> {
        match value.trim() {
            CONTENT_TYPE_BOOKMARK => Some(Self::Bookmark),
            CONTENT_TYPE_PROJECT => Some(Self::Project),
            CONTENT_TYPE_STORY => Some(Self::Story),
            CONTENT_TYPE_TERRAIN_PROVIDER => Some(Self::TerrainProvider),
            _ => None,
        }
    }
}

impl Display for ToolKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.content_type())
    }
}

/// Identity of one tool association.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ToolKey {
    pub content_type: String,
    pub content_id: i64,
}

impl ToolKey {
    pub fn new(content_type: impl Into<String>, content_id: i64) -> Self {
        Self {
            content_type: content_type.into(),
            content_id,
        }
    }
}

impl Display for ToolKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.content_type, self.content_id)
    }
}

/// Link between a digital twin and one tool content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolAssociation {
    pub content_type: String,
    pub content_id: i64,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub is_default: bool,
}

impl ToolAssociation {
    pub fn key(&self) -> ToolKey {
        ToolKey::new(self.content_type.clone(), self.content_id)
    }
}

/// One entry of a tool catalog listing.
///
/// Catalogs label their entries differently (`title` for bookmarks and
/// terrain providers, `name` for projects and stories).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCatalogItem {
    pub id: i64,
    #[serde(alias = "title", alias = "name", default)]
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::{ToolCatalogItem, ToolKind};

    #[test]
    fn content_type_round_trips_for_every_kind() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_content_type(kind.content_type()), Some(kind));
        }
        assert_eq!(ToolKind::from_content_type("viewer"), None);
    }

    #[test]
    fn catalog_items_accept_each_label_field() {
        let bookmark: ToolCatalogItem =
            serde_json::from_str(r#"{"id": 1, "title": "Harbour"}"#).unwrap();
        let project: ToolCatalogItem =
            serde_json::from_str(r#"{"id": 2, "name": "Bridge", "description": "west"}"#).unwrap();
        let terrain: ToolCatalogItem =
            serde_json::from_str(r#"{"id": 3, "title": "Terrain", "url": "https://x"}"#).unwrap();

        assert_eq!(bookmark.label, "Harbour");
        assert_eq!(project.label, "Bridge");
        assert_eq!(project.description.as_deref(), Some("west"));
        assert_eq!(terrain.label, "Terrain");
    }
}
