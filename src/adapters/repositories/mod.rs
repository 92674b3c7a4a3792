pub(crate) mod category_repository;
#[cfg(any(test, feature = "test"))]
pub mod memory;
pub(crate) mod post_repository;

use std::{marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::{
	database::DatabaseExecutor,
	domain::{
		category::entity::{Category, NewCategory},
		post::{
			entity::{Post, PostRevision},
			PostAggregate,
		},
	},
	services::response::ServiceError,
};

#[async_trait]
pub trait TPostRepository: Send + Sync {
	/// Inserts the post and one association row per category id, atomically.
	async fn add(
		&self,
		post: &Post,
		category_ids: &[i32],
	) -> Result<(), ServiceError>;

	async fn post_ids_in_category(
		&self,
		category_id: i32,
	) -> Result<Vec<String>, ServiceError>;

	/// Newest first. `post_ids`, when given, restricts the result to those ids.
	async fn list(
		&self,
		include_drafts: bool,
		post_ids: Option<&[String]>,
	) -> Result<Vec<PostAggregate>, ServiceError>;

	async fn get(
		&self,
		id: &str,
	) -> Result<Option<PostAggregate>, ServiceError>;

	/// Overwrites the post and replaces its category set. Returns the number of
	/// post rows touched; memberships are left alone when that is zero.
	async fn update(
		&self,
		id: &str,
		revision: &PostRevision,
		category_ids: &[i32],
	) -> Result<u64, ServiceError>;

	/// Removes association rows, then the post. Returns post rows deleted.
	async fn delete(
		&self,
		id: &str,
	) -> Result<u64, ServiceError>;
}

#[async_trait]
pub trait TCategoryRepository: Send + Sync {
	/// Ordered by name.
	async fn list(&self) -> Result<Vec<Category>, ServiceError>;

	async fn add(
		&self,
		category: &NewCategory,
	) -> Result<Category, ServiceError>;
}

// * `Connectable` hands out repositories bound to shared state such as a
// * connection pool. Each call gets its own executor.
pub trait Connectable: Clone + Send + Sync + 'static {
	type Posts: TPostRepository;
	type Categories: TCategoryRepository;

	fn posts(&self) -> Self::Posts;
	fn categories(&self) -> Self::Categories;
}

pub struct Repository<A> {
	pub executor: Arc<Mutex<DatabaseExecutor>>,
	pub _phantom: PhantomData<A>,
}

impl<A> Repository<A> {
	pub fn new(executor: Arc<Mutex<DatabaseExecutor>>) -> Self {
		Self {
			executor,
			_phantom: Default::default(),
		}
	}
}

impl Connectable for PgPool {
	type Posts = Repository<PostAggregate>;
	type Categories = Repository<Category>;

	fn posts(&self) -> Self::Posts {
		Repository::new(DatabaseExecutor::new(self.clone()).into())
	}
	fn categories(&self) -> Self::Categories {
		Repository::new(DatabaseExecutor::new(self.clone()).into())
	}
}
