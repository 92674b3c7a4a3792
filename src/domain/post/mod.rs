use std::ops::Deref;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use self::{
	commands::{CreatePost, UpdatePost},
	entity::{Post, PostCategory, PostRevision},
};
use crate::domain::slug::post_slug;

pub mod commands;
pub mod entity;

/// A post together with its category memberships, as served to readers.
#[derive(Clone, Default, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAggregate {
	#[serde(flatten)]
	pub(crate) post: Post,
	pub(crate) posts_to_categories: Vec<PostCategory>,
}

impl PostAggregate {
	pub fn new(
		post: Post,
		posts_to_categories: Vec<PostCategory>,
	) -> Self {
		Self { post, posts_to_categories }
	}

	pub fn categories(&self) -> &[PostCategory] {
		&self.posts_to_categories
	}

	pub fn category_ids(&self) -> Vec<i32> {
		self.posts_to_categories.iter().map(|pc| pc.category_id).collect()
	}
}

impl Deref for PostAggregate {
	type Target = Post;
	fn deref(&self) -> &Self::Target {
		&self.post
	}
}

impl CreatePost {
	/// Builds the row to insert. The id is generated here so it is known
	/// before anything is committed.
	pub(crate) fn to_post(
		&self,
		now: DateTime<Utc>,
	) -> Post {
		Post {
			id: Uuid::new_v4().to_string(),
			title: self.title.clone(),
			content: self.content.clone(),
			slug: post_slug(&self.title),
			published: self.published,
			created_at: now,
			updated_at: now,
		}
	}
}

impl UpdatePost {
	pub(crate) fn to_revision(
		&self,
		now: DateTime<Utc>,
	) -> PostRevision {
		PostRevision {
			title: self.title.clone(),
			content: self.content.clone(),
			slug: post_slug(&self.title),
			published: self.published,
			updated_at: now,
		}
	}
}
