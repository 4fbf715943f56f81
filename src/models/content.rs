//! Nodes of the content tree: sector > topic > subtopic > module > submodule > lesson.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Level of a node in the content tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum NodeKind {
    Sector,
    Topic,
    Subtopic,
    Module,
    Submodule,
    Lesson,
}

impl NodeKind {
    pub const ALL: [NodeKind; 6] = [
        NodeKind::Sector,
        NodeKind::Topic,
        NodeKind::Subtopic,
        NodeKind::Module,
        NodeKind::Submodule,
        NodeKind::Lesson,
    ];

    /// The level a node of this kind must hang under. Sectors are roots.
    pub fn parent(self) -> Option<NodeKind> {
        match self {
            NodeKind::Sector => None,
            NodeKind::Topic => Some(NodeKind::Sector),
            NodeKind::Subtopic => Some(NodeKind::Topic),
            NodeKind::Module => Some(NodeKind::Subtopic),
            NodeKind::Submodule => Some(NodeKind::Module),
            NodeKind::Lesson => Some(NodeKind::Submodule),
        }
    }

    /// The level directly below. Lessons are leaves.
    pub fn child(self) -> Option<NodeKind> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.parent() == Some(self))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Sector => "sector",
            NodeKind::Topic => "topic",
            NodeKind::Subtopic => "subtopic",
            NodeKind::Module => "module",
            NodeKind::Submodule => "submodule",
            NodeKind::Lesson => "lesson",
        }
    }

    /// Collection name used in URLs (`/api/content/sectors`).
    pub fn collection(self) -> &'static str {
        match self {
            NodeKind::Sector => "sectors",
            NodeKind::Topic => "topics",
            NodeKind::Subtopic => "subtopics",
            NodeKind::Module => "modules",
            NodeKind::Submodule => "submodules",
            NodeKind::Lesson => "lessons",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts either the singular kind or its collection name.
impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s || kind.collection() == s)
            .ok_or_else(|| format!("unknown content kind `{}`", s))
    }
}

/// A single node of the content tree.
///
/// Every kind shares the same record; `body` and `video_url` are only ever
/// set on lessons.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct ContentNode {
    pub id: Uuid,

    pub kind: NodeKind,

    /// Parent node, `None` only for sectors.
    pub parent_id: Option<Uuid>,

    pub title: String,

    pub description: Option<String>,

    /// Lesson text (markdown or HTML as authored).
    pub body: Option<String>,

    pub video_url: Option<String>,

    /// Sort order among siblings, starting at 0.
    pub position: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Payload for creating or replacing a node.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeInput {
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub body: Option<String>,
    pub video_url: Option<String>,
}

/// Payload for rewriting sibling order.
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderInput {
    pub parent_id: Option<Uuid>,
    pub ids: Vec<Uuid>,
}
