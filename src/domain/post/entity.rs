use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::category::entity::Category;

#[derive(Clone, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
	pub id: String,
	pub title: String,
	pub content: String,
	pub slug: String,
	pub published: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Association row joined with the category it points at.
#[derive(Clone, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCategory {
	pub post_id: String,
	pub category_id: i32,
	pub category: Category,
}

/// Fields overwritten by an update. `created_at` is never part of it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PostRevision {
	pub title: String,
	pub content: String,
	pub slug: String,
	pub published: bool,
	pub updated_at: DateTime<Utc>,
}
