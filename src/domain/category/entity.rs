use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
	pub id: i32,
	pub name: String,
	pub description: Option<String>,
	pub slug: String,
}

/// Category row that has not been assigned an id yet.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NewCategory {
	pub name: String,
	pub description: Option<String>,
	pub slug: String,
}
