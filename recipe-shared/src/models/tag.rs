/// Tag model
///
/// A short label (e.g. "Vegan", "Dessert") that an account attaches to its
/// recipes. Storage goes through the ownership-scoped functions in
/// [`super::owned`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL CHECK (name <> '')
/// );
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::owned::Owned;

/// Tag owned by one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,

    /// Owning account, never exposed on the wire
    #[serde(skip)]
    pub user_id: Uuid,

    pub name: String,
}

impl Owned for Tag {
    const TABLE: &'static str = "tags";
    const COLUMNS: &'static str = "id, user_id, name";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}
