use serde::Deserialize;

use crate::domain::ValidationError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
	pub title: String,
	pub content: String,
	pub category_ids: Vec<i32>,
	pub published: bool,
}

impl CreatePost {
	pub fn validate(&self) -> Result<(), ValidationError> {
		ValidationError::require_non_empty("title", &self.title)
	}
}

/// Filters for listing posts. Without `category_id` every category matches.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPosts {
	#[serde(default)]
	pub category_id: Option<i32>,
	#[serde(default)]
	pub include_drafts: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetPostById {
	pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePost {
	pub id: String,
	pub title: String,
	pub content: String,
	pub category_ids: Vec<i32>,
	pub published: bool,
}

impl UpdatePost {
	pub fn validate(&self) -> Result<(), ValidationError> {
		ValidationError::require_non_empty("title", &self.title)
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeletePost {
	pub id: String,
}
