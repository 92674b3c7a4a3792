use chrono::Utc;

use super::response::{ServiceError, Success};
use crate::{
	adapters::repositories::{TCategoryRepository, TPostRepository},
	domain::{
		category::{
			commands::CreateCategory,
			entity::{Category, NewCategory},
		},
		post::{
			commands::{CreatePost, DeletePost, GetPostById, GetPosts, UpdatePost},
			PostAggregate,
		},
	},
};

pub struct CategoryHandler;
impl CategoryHandler {
	pub async fn get_all(repository: &impl TCategoryRepository) -> Result<Vec<Category>, ServiceError> {
		repository.list().await.map_err(|err| {
			tracing::error!("database error listing categories: {}", err);
			err
		})
	}

	pub async fn create_category(
		cmd: CreateCategory,
		repository: &impl TCategoryRepository,
	) -> Result<Category, ServiceError> {
		cmd.validate()?;
		tracing::info!(name = %cmd.name, "creating category");

		let new_category = NewCategory::from(cmd);
		let category = repository.add(&new_category).await.map_err(|err| {
			tracing::error!(name = %new_category.name, "database error creating category: {}", err);
			err
		})?;

		tracing::info!(id = category.id, slug = %category.slug, "category created");
		Ok(category)
	}
}

pub struct PostHandler;
impl PostHandler {
	pub async fn create_post(
		cmd: CreatePost,
		repository: &impl TPostRepository,
	) -> Result<Success, ServiceError> {
		cmd.validate()?;

		let post = cmd.to_post(Utc::now());
		repository.add(&post, &cmd.category_ids).await.map_err(|err| {
			tracing::error!(slug = %post.slug, "database error creating post: {}", err);
			err
		})?;

		tracing::info!(id = %post.id, categories = cmd.category_ids.len(), "post created");
		Ok(Success::ok())
	}

	pub async fn get_all(
		query: GetPosts,
		repository: &impl TPostRepository,
	) -> Result<Vec<PostAggregate>, ServiceError> {
		let post_ids = match query.category_id {
			Some(category_id) => {
				let ids = repository.post_ids_in_category(category_id).await.map_err(|err| {
					tracing::error!(category_id, "database error resolving posts in category: {}", err);
					err
				})?;
				// Nothing to match against; skip the posts query entirely.
				if ids.is_empty() {
					return Ok(vec![]);
				}
				Some(ids)
			}
			None => None,
		};

		repository.list(query.include_drafts, post_ids.as_deref()).await.map_err(|err| {
			tracing::error!("database error listing posts: {}", err);
			err
		})
	}

	pub async fn get_by_id(
		query: GetPostById,
		repository: &impl TPostRepository,
	) -> Result<Option<PostAggregate>, ServiceError> {
		repository.get(&query.id).await.map_err(|err| {
			tracing::error!(id = %query.id, "database error fetching post: {}", err);
			err
		})
	}

	/// A missing id is not an error: nothing is written and success is
	/// returned.
	pub async fn update(
		cmd: UpdatePost,
		repository: &impl TPostRepository,
	) -> Result<Success, ServiceError> {
		cmd.validate()?;

		let revision = cmd.to_revision(Utc::now());
		let affected = repository.update(&cmd.id, &revision, &cmd.category_ids).await.map_err(|err| {
			tracing::error!(id = %cmd.id, "database error updating post: {}", err);
			err
		})?;

		if affected == 0 {
			tracing::warn!(id = %cmd.id, "update matched no post");
		}
		Ok(Success::ok())
	}

	/// Same no-op semantics as [`PostHandler::update`] for a missing id.
	pub async fn delete(
		cmd: DeletePost,
		repository: &impl TPostRepository,
	) -> Result<Success, ServiceError> {
		let affected = repository.delete(&cmd.id).await.map_err(|err| {
			tracing::error!(id = %cmd.id, "database error deleting post: {}", err);
			err
		})?;

		if affected == 0 {
			tracing::warn!(id = %cmd.id, "delete matched no post");
		}
		Ok(Success::ok())
	}
}
