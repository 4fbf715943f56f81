//! ContentService: CRUD over the content tree.
//!
//! All six levels share the `content_nodes` table. A node's parent must be of
//! the level directly above it, deletes cascade to descendants, and siblings
//! are ordered by an explicit `position`.

use super::{ServiceError, ServiceResult, optional_text, required_text, row_or_not_found};
use crate::models::content::{ContentNode, NodeInput, NodeKind, ReorderInput};
use chrono::Utc;
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, info};
use uuid::Uuid;

const MAX_TITLE_LEN: usize = 200;
const NODE_COLUMNS: &str = "id, kind, parent_id, title, description, body, video_url, \
                            position, created_at, updated_at";

#[derive(Clone)]
pub struct ContentService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl ContentService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Validate and normalize a node payload for the given kind.
    fn normalize(kind: NodeKind, input: &NodeInput) -> ServiceResult<NodeInput> {
        let title = required_text("title", &input.title, MAX_TITLE_LEN)?;
        let body = optional_text(input.body.as_deref());
        let video_url = optional_text(input.video_url.as_deref());

        if kind != NodeKind::Lesson && (body.is_some() || video_url.is_some()) {
            return Err(ServiceError::validation(format!(
                "only lessons carry a body or video_url, not a {}",
                kind
            )));
        }

        Ok(NodeInput {
            parent_id: input.parent_id,
            title,
            description: optional_text(input.description.as_deref()),
            body,
            video_url,
        })
    }

    /// Fetch a node of any kind.
    async fn fetch_node(&self, id: Uuid) -> ServiceResult<ContentNode> {
        sqlx::query_as::<_, ContentNode>(&format!(
            "SELECT {} FROM content_nodes WHERE id = ?",
            NODE_COLUMNS
        ))
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(row_or_not_found("content node", id))
    }

    /// Check that `parent_id` is a valid parent for a node of `kind`.
    async fn ensure_parent(&self, kind: NodeKind, parent_id: Option<Uuid>) -> ServiceResult<()> {
        match (kind.parent(), parent_id) {
            (None, None) => Ok(()),
            (None, Some(_)) => Err(ServiceError::validation("a sector cannot have a parent")),
            (Some(expected), None) => Err(ServiceError::validation(format!(
                "a {} needs a parent {}",
                kind, expected
            ))),
            (Some(expected), Some(parent_id)) => {
                let parent = self.fetch_node(parent_id).await.map_err(|err| match err {
                    ServiceError::NotFound { .. } => ServiceError::validation(format!(
                        "parent {} `{}` does not exist",
                        expected, parent_id
                    )),
                    other => other,
                })?;
                if parent.kind != expected {
                    return Err(ServiceError::validation(format!(
                        "a {} must belong to a {}, got a {}",
                        kind, expected, parent.kind
                    )));
                }
                Ok(())
            }
        }
    }

    async fn next_position(&self, kind: NodeKind, parent_id: Option<Uuid>) -> ServiceResult<i64> {
        let next = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM content_nodes
             WHERE kind = ? AND parent_id IS ?",
        )
        .bind(kind)
        .bind(parent_id)
        .fetch_one(&*self.db)
        .await?;
        Ok(next)
    }

    /// Fetch a node, treating a kind mismatch as not found.
    pub async fn get(&self, kind: NodeKind, id: Uuid) -> ServiceResult<ContentNode> {
        let node = self.fetch_node(id).await?;
        if node.kind != kind {
            return Err(ServiceError::not_found(kind.as_str(), id));
        }
        Ok(node)
    }

    /// List nodes of a kind, optionally restricted to one parent.
    pub async fn list(
        &self,
        kind: NodeKind,
        parent_id: Option<Uuid>,
    ) -> ServiceResult<Vec<ContentNode>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM content_nodes WHERE kind = ",
            NODE_COLUMNS
        ));
        builder.push_bind(kind);
        if let Some(parent_id) = parent_id {
            builder.push(" AND parent_id = ");
            builder.push_bind(parent_id);
        }
        builder.push(" ORDER BY position ASC, title ASC");

        let nodes: Vec<ContentNode> = builder.build_query_as().fetch_all(&*self.db).await?;
        Ok(nodes)
    }

    pub async fn create(&self, kind: NodeKind, input: NodeInput) -> ServiceResult<ContentNode> {
        let input = Self::normalize(kind, &input)?;
        self.ensure_parent(kind, input.parent_id).await?;
        let position = self.next_position(kind, input.parent_id).await?;
        let now = Utc::now();

        let node = sqlx::query_as::<_, ContentNode>(&format!(
            "INSERT INTO content_nodes ({})
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {}",
            NODE_COLUMNS, NODE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(kind)
        .bind(input.parent_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.body)
        .bind(&input.video_url)
        .bind(position)
        .bind(now)
        .bind(now)
        .fetch_one(&*self.db)
        .await?;

        info!(kind = %kind, id = %node.id, "created content node");
        Ok(node)
    }

    /// Replace a node's fields. Moving it under another parent appends it
    /// to the new sibling list.
    pub async fn update(
        &self,
        kind: NodeKind,
        id: Uuid,
        input: NodeInput,
    ) -> ServiceResult<ContentNode> {
        let current = self.get(kind, id).await?;
        let input = Self::normalize(kind, &input)?;
        self.ensure_parent(kind, input.parent_id).await?;

        let position = if input.parent_id == current.parent_id {
            current.position
        } else {
            self.next_position(kind, input.parent_id).await?
        };

        let node = sqlx::query_as::<_, ContentNode>(&format!(
            "UPDATE content_nodes
             SET parent_id = ?, title = ?, description = ?, body = ?, video_url = ?,
                 position = ?, updated_at = ?
             WHERE id = ?
             RETURNING {}",
            NODE_COLUMNS
        ))
        .bind(input.parent_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.body)
        .bind(&input.video_url)
        .bind(position)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(row_or_not_found(kind.as_str(), id))?;

        Ok(node)
    }

    /// Delete a node and, through the foreign key cascade, its whole subtree.
    pub async fn delete(&self, kind: NodeKind, id: Uuid) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM content_nodes WHERE id = ? AND kind = ?")
            .bind(id)
            .bind(kind)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found(kind.as_str(), id));
        }
        info!(kind = %kind, id = %id, "deleted content node");
        Ok(())
    }

    /// Direct children of a node, in sibling order.
    pub async fn children(&self, kind: NodeKind, id: Uuid) -> ServiceResult<Vec<ContentNode>> {
        self.get(kind, id).await?;
        match kind.child() {
            Some(child) => self.list(child, Some(id)).await,
            None => Ok(Vec::new()),
        }
    }

    /// Breadcrumb from the root sector down to the node itself.
    pub async fn path(&self, kind: NodeKind, id: Uuid) -> ServiceResult<Vec<ContentNode>> {
        let node = self.get(kind, id).await?;
        let mut parent_id = node.parent_id;
        let mut path = vec![node];

        while let Some(pid) = parent_id {
            if path.len() > NodeKind::ALL.len() {
                return Err(ServiceError::Unprocessable(format!(
                    "content tree above `{}` is deeper than the hierarchy allows",
                    id
                )));
            }
            let parent = self.fetch_node(pid).await?;
            parent_id = parent.parent_id;
            path.push(parent);
        }

        path.reverse();
        Ok(path)
    }

    /// Move the listed siblings to the front, in the given order. Siblings
    /// left out keep their relative order after them.
    pub async fn reorder(
        &self,
        kind: NodeKind,
        input: ReorderInput,
    ) -> ServiceResult<Vec<ContentNode>> {
        if input.ids.is_empty() {
            return Err(ServiceError::validation("ids must not be empty"));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = input.ids.iter().find(|id| !seen.insert(**id)) {
            return Err(ServiceError::validation(format!("id `{}` listed twice", dup)));
        }

        let siblings: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM content_nodes
             WHERE kind = ? AND parent_id IS ?
             ORDER BY position ASC, title ASC",
        )
        .bind(kind)
        .bind(input.parent_id)
        .fetch_all(&*self.db)
        .await?;

        let sibling_set: HashSet<Uuid> = siblings.iter().copied().collect();
        if let Some(stranger) = input.ids.iter().find(|id| !sibling_set.contains(*id)) {
            return Err(ServiceError::validation(format!(
                "{} `{}` is not a child of the given parent",
                kind, stranger
            )));
        }

        let order: Vec<Uuid> = input
            .ids
            .iter()
            .copied()
            .chain(siblings.into_iter().filter(|id| !seen.contains(id)))
            .collect();

        let now = Utc::now();
        let mut tx = self.db.begin().await?;
        for (position, id) in order.iter().enumerate() {
            sqlx::query("UPDATE content_nodes SET position = ?, updated_at = ? WHERE id = ?")
                .bind(position as i64)
                .bind(now)
                .bind(*id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        debug!(kind = %kind, count = order.len(), "reordered siblings");

        self.list(kind, input.parent_id).await
    }
}

/// Check that `id` names an existing lesson.
pub(crate) async fn ensure_lesson_exists(db: &SqlitePool, id: Uuid) -> ServiceResult<()> {
    let kind = sqlx::query_scalar::<_, NodeKind>("SELECT kind FROM content_nodes WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;
    match kind {
        Some(NodeKind::Lesson) => Ok(()),
        Some(other) => Err(ServiceError::validation(format!(
            "`{}` is a {}, not a lesson",
            id, other
        ))),
        None => Err(ServiceError::validation(format!(
            "lesson `{}` does not exist",
            id
        ))),
    }
}
