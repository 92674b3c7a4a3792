//! In-process tables with the same referential rules as the PostgreSQL
//! schema: association rows need both parents and `(post_id, category_id)` is
//! unique. Every operation holds the lock for its whole duration, so
//! multi-row writes are all-or-nothing.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use super::{Connectable, TCategoryRepository, TPostRepository};
use crate::{
	domain::{
		category::entity::{Category, NewCategory},
		post::{
			entity::{Post, PostCategory, PostRevision},
			PostAggregate,
		},
	},
	services::response::ServiceError,
};

#[derive(Debug, Error)]
pub enum MemoryStoreError {
	#[error("duplicate key value violates primary key of {table}")]
	DuplicateKey { table: &'static str },
	#[error("insert on posts_to_categories violates foreign key to {table}")]
	ForeignKey { table: &'static str },
}

impl From<MemoryStoreError> for ServiceError {
	fn from(err: MemoryStoreError) -> Self {
		ServiceError::PersistenceError(Box::new(err))
	}
}

#[derive(Default)]
struct Tables {
	posts: Vec<Post>,
	categories: Vec<Category>,
	posts_to_categories: Vec<(String, i32)>,
	category_sequence: i32,
}

impl Tables {
	fn check_memberships(
		&self,
		post_id: &str,
		category_ids: &[i32],
	) -> Result<(), MemoryStoreError> {
		if !self.posts.iter().any(|post| post.id == post_id) {
			return Err(MemoryStoreError::ForeignKey { table: "posts" });
		}
		for (i, category_id) in category_ids.iter().enumerate() {
			if !self.categories.iter().any(|category| category.id == *category_id) {
				return Err(MemoryStoreError::ForeignKey { table: "categories" });
			}
			if category_ids[..i].contains(category_id) {
				return Err(MemoryStoreError::DuplicateKey {
					table: "posts_to_categories",
				});
			}
		}
		Ok(())
	}

	fn aggregate(
		&self,
		post: &Post,
	) -> PostAggregate {
		let mut categories: Vec<PostCategory> = self
			.posts_to_categories
			.iter()
			.filter(|(post_id, _)| *post_id == post.id)
			.filter_map(|(post_id, category_id)| {
				self.categories.iter().find(|category| category.id == *category_id).map(|category| PostCategory {
					post_id: post_id.clone(),
					category_id: *category_id,
					category: category.clone(),
				})
			})
			.collect();
		categories.sort_by(|a, b| a.category.name.cmp(&b.category.name));
		PostAggregate::new(post.clone(), categories)
	}
}

#[derive(Clone, Default)]
pub struct MemoryStore {
	tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn membership_count(
		&self,
		post_id: &str,
	) -> usize {
		self.tables.lock().await.posts_to_categories.iter().filter(|(id, _)| id == post_id).count()
	}
}

impl Connectable for MemoryStore {
	type Posts = MemoryStore;
	type Categories = MemoryStore;

	fn posts(&self) -> Self::Posts {
		self.clone()
	}
	fn categories(&self) -> Self::Categories {
		self.clone()
	}
}

#[async_trait]
impl TPostRepository for MemoryStore {
	async fn add(
		&self,
		post: &Post,
		category_ids: &[i32],
	) -> Result<(), ServiceError> {
		let mut tables = self.tables.lock().await;
		if tables.posts.iter().any(|existing| existing.id == post.id) {
			return Err(MemoryStoreError::DuplicateKey { table: "posts" }.into());
		}
		tables.posts.push(post.clone());
		if let Err(err) = tables.check_memberships(&post.id, category_ids) {
			tables.posts.pop();
			return Err(err.into());
		}
		tables.posts_to_categories.extend(category_ids.iter().map(|id| (post.id.clone(), *id)));
		Ok(())
	}

	async fn post_ids_in_category(
		&self,
		category_id: i32,
	) -> Result<Vec<String>, ServiceError> {
		let tables = self.tables.lock().await;
		Ok(tables
			.posts_to_categories
			.iter()
			.filter(|(_, id)| *id == category_id)
			.map(|(post_id, _)| post_id.clone())
			.collect())
	}

	async fn list(
		&self,
		include_drafts: bool,
		post_ids: Option<&[String]>,
	) -> Result<Vec<PostAggregate>, ServiceError> {
		let tables = self.tables.lock().await;
		// Newest insert first so equal timestamps still come out newest first.
		let mut posts: Vec<&Post> = tables
			.posts
			.iter()
			.rev()
			.filter(|post| include_drafts || post.published)
			.filter(|post| post_ids.map_or(true, |ids| ids.contains(&post.id)))
			.collect();
		posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(posts.into_iter().map(|post| tables.aggregate(post)).collect())
	}

	async fn get(
		&self,
		id: &str,
	) -> Result<Option<PostAggregate>, ServiceError> {
		let tables = self.tables.lock().await;
		Ok(tables.posts.iter().find(|post| post.id == id).map(|post| tables.aggregate(post)))
	}

	async fn update(
		&self,
		id: &str,
		revision: &PostRevision,
		category_ids: &[i32],
	) -> Result<u64, ServiceError> {
		let mut tables = self.tables.lock().await;
		if !tables.posts.iter().any(|post| post.id == id) {
			return Ok(0);
		}
		tables.check_memberships(id, category_ids)?;

		if let Some(post) = tables.posts.iter_mut().find(|post| post.id == id) {
			post.title = revision.title.clone();
			post.content = revision.content.clone();
			post.slug = revision.slug.clone();
			post.published = revision.published;
			post.updated_at = revision.updated_at;
		}
		tables.posts_to_categories.retain(|(post_id, _)| post_id != id);
		tables.posts_to_categories.extend(category_ids.iter().map(|category_id| (id.to_string(), *category_id)));
		Ok(1)
	}

	async fn delete(
		&self,
		id: &str,
	) -> Result<u64, ServiceError> {
		let mut tables = self.tables.lock().await;
		tables.posts_to_categories.retain(|(post_id, _)| post_id != id);
		let before = tables.posts.len();
		tables.posts.retain(|post| post.id != id);
		Ok((before - tables.posts.len()) as u64)
	}
}

#[async_trait]
impl TCategoryRepository for MemoryStore {
	async fn list(&self) -> Result<Vec<Category>, ServiceError> {
		let tables = self.tables.lock().await;
		let mut categories = tables.categories.clone();
		categories.sort_by(|a, b| a.name.cmp(&b.name));
		Ok(categories)
	}

	async fn add(
		&self,
		category: &NewCategory,
	) -> Result<Category, ServiceError> {
		let mut tables = self.tables.lock().await;
		tables.category_sequence += 1;
		let created = Category {
			id: tables.category_sequence,
			name: category.name.clone(),
			description: category.description.clone(),
			slug: category.slug.clone(),
		};
		tables.categories.push(created.clone());
		Ok(created)
	}
}
