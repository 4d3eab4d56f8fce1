/// Ingredient model
///
/// Same shape as a tag: an owned, named row that recipes reference.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE ingredients (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL CHECK (name <> '')
/// );
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::owned::Owned;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingredient {
    pub id: Uuid,

    #[serde(skip)]
    pub user_id: Uuid,

    pub name: String,
}

impl Owned for Ingredient {
    const TABLE: &'static str = "ingredients";
    const COLUMNS: &'static str = "id, user_id, name";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}
