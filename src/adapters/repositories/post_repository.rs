use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use super::{Repository, TPostRepository};
use crate::{
	database::DatabaseExecutor,
	domain::{
		category::entity::Category,
		post::{
			entity::{Post, PostCategory, PostRevision},
			PostAggregate,
		},
	},
	services::response::ServiceError,
};

#[derive(sqlx::FromRow)]
struct PostCategoryRow {
	post_id: String,
	category_id: i32,
	name: String,
	description: Option<String>,
	slug: String,
}

impl From<PostCategoryRow> for PostCategory {
	fn from(row: PostCategoryRow) -> Self {
		PostCategory {
			post_id: row.post_id,
			category_id: row.category_id,
			category: Category {
				id: row.category_id,
				name: row.name,
				description: row.description,
				slug: row.slug,
			},
		}
	}
}

/// Loads the association rows for `posts` in one round-trip and nests them.
async fn with_categories(
	pool: &PgPool,
	posts: Vec<Post>,
) -> Result<Vec<PostAggregate>, ServiceError> {
	if posts.is_empty() {
		return Ok(vec![]);
	}
	let ids: Vec<String> = posts.iter().map(|post| post.id.clone()).collect();

	let rows = sqlx::query_as::<_, PostCategoryRow>(
		r#"
		SELECT pc.post_id, pc.category_id, c.name, c.description, c.slug
		FROM posts_to_categories pc
		JOIN categories c ON c.id = pc.category_id
		WHERE pc.post_id = ANY($1)
		ORDER BY c.name ASC
		"#,
	)
	.bind(&ids)
	.fetch_all(pool)
	.await?;

	let mut by_post: HashMap<String, Vec<PostCategory>> = HashMap::new();
	for row in rows {
		by_post.entry(row.post_id.clone()).or_default().push(row.into());
	}

	Ok(posts
		.into_iter()
		.map(|post| {
			let categories = by_post.remove(&post.id).unwrap_or_default();
			PostAggregate::new(post, categories)
		})
		.collect())
}

async fn insert_memberships(
	executor: &mut DatabaseExecutor,
	post_id: &str,
	category_ids: &[i32],
) -> Result<(), ServiceError> {
	if category_ids.is_empty() {
		return Ok(());
	}
	sqlx::query(
		r#"
		INSERT INTO posts_to_categories (post_id, category_id)
		SELECT $1::VARCHAR, UNNEST($2::INTEGER[])
		"#,
	)
	.bind(post_id)
	.bind(category_ids)
	.execute(&mut **executor.transaction()?)
	.await?;
	Ok(())
}

async fn delete_memberships(
	executor: &mut DatabaseExecutor,
	post_id: &str,
) -> Result<(), ServiceError> {
	sqlx::query("DELETE FROM posts_to_categories WHERE post_id = $1")
		.bind(post_id)
		.execute(&mut **executor.transaction()?)
		.await?;
	Ok(())
}

async fn insert_post(
	executor: &mut DatabaseExecutor,
	post: &Post,
	category_ids: &[i32],
) -> Result<(), ServiceError> {
	sqlx::query(
		r#"
		INSERT INTO posts (id, title, content, slug, published, created_at, updated_at)
		VALUES ($1, $2, $3, $4, $5, $6, $7)
		"#,
	)
	.bind(&post.id)
	.bind(&post.title)
	.bind(&post.content)
	.bind(&post.slug)
	.bind(post.published)
	.bind(post.created_at)
	.bind(post.updated_at)
	.execute(&mut **executor.transaction()?)
	.await?;

	insert_memberships(executor, &post.id, category_ids).await
}

async fn revise_post(
	executor: &mut DatabaseExecutor,
	id: &str,
	revision: &PostRevision,
	category_ids: &[i32],
) -> Result<u64, ServiceError> {
	let affected = sqlx::query(
		r#"
		UPDATE posts
		SET title = $2, content = $3, slug = $4, published = $5, updated_at = $6
		WHERE id = $1
		"#,
	)
	.bind(id)
	.bind(&revision.title)
	.bind(&revision.content)
	.bind(&revision.slug)
	.bind(revision.published)
	.bind(revision.updated_at)
	.execute(&mut **executor.transaction()?)
	.await?
	.rows_affected();

	if affected == 0 {
		return Ok(0);
	}

	delete_memberships(executor, id).await?;
	insert_memberships(executor, id, category_ids).await?;
	Ok(affected)
}

async fn remove_post(
	executor: &mut DatabaseExecutor,
	id: &str,
) -> Result<u64, ServiceError> {
	delete_memberships(executor, id).await?;
	let affected = sqlx::query("DELETE FROM posts WHERE id = $1")
		.bind(id)
		.execute(&mut **executor.transaction()?)
		.await?
		.rows_affected();
	Ok(affected)
}

#[async_trait]
impl TPostRepository for Repository<PostAggregate> {
	async fn add(
		&self,
		post: &Post,
		category_ids: &[i32],
	) -> Result<(), ServiceError> {
		let mut executor = self.executor.lock().await;
		executor.begin().await?;
		let result = insert_post(&mut executor, post, category_ids).await;
		executor.finish(result).await
	}

	async fn post_ids_in_category(
		&self,
		category_id: i32,
	) -> Result<Vec<String>, ServiceError> {
		let executor = self.executor.lock().await;
		let ids = sqlx::query_scalar::<_, String>("SELECT post_id FROM posts_to_categories WHERE category_id = $1")
			.bind(category_id)
			.fetch_all(executor.connection())
			.await?;
		Ok(ids)
	}

	async fn list(
		&self,
		include_drafts: bool,
		post_ids: Option<&[String]>,
	) -> Result<Vec<PostAggregate>, ServiceError> {
		let executor = self.executor.lock().await;
		let posts = sqlx::query_as::<_, Post>(
			r#"
			SELECT id, title, content, slug, published, created_at, updated_at
			FROM posts
			WHERE ($1 OR published = TRUE)
			  AND ($2::TEXT[] IS NULL OR id = ANY($2))
			ORDER BY created_at DESC
			"#,
		)
		.bind(include_drafts)
		.bind(post_ids)
		.fetch_all(executor.connection())
		.await?;

		with_categories(executor.connection(), posts).await
	}

	async fn get(
		&self,
		id: &str,
	) -> Result<Option<PostAggregate>, ServiceError> {
		let executor = self.executor.lock().await;
		let post = sqlx::query_as::<_, Post>(
			r#"
			SELECT id, title, content, slug, published, created_at, updated_at
			FROM posts
			WHERE id = $1
			"#,
		)
		.bind(id)
		.fetch_optional(executor.connection())
		.await?;

		match post {
			Some(post) => Ok(with_categories(executor.connection(), vec![post]).await?.pop()),
			None => Ok(None),
		}
	}

	async fn update(
		&self,
		id: &str,
		revision: &PostRevision,
		category_ids: &[i32],
	) -> Result<u64, ServiceError> {
		let mut executor = self.executor.lock().await;
		executor.begin().await?;
		let result = revise_post(&mut executor, id, revision, category_ids).await;
		executor.finish(result).await
	}

	async fn delete(
		&self,
		id: &str,
	) -> Result<u64, ServiceError> {
		let mut executor = self.executor.lock().await;
		executor.begin().await?;
		let result = remove_post(&mut executor, id).await;
		executor.finish(result).await
	}
}

#[cfg(test)]
mod test {
	use chrono::{DateTime, TimeZone, Utc};
	use sqlx::PgPool;

	use crate::{
		adapters::repositories::{Connectable, TCategoryRepository, TPostRepository},
		domain::{
			category::entity::{Category, NewCategory},
			post::{
				commands::GetPosts,
				entity::{Post, PostRevision},
			},
		},
		services::{handlers::PostHandler, response::ServiceError},
	};

	// Whole seconds, so values survive the microsecond precision of TIMESTAMPTZ.
	fn at(secs: i64) -> DateTime<Utc> {
		Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
	}

	fn post(
		title: &str,
		published: bool,
		created_at: DateTime<Utc>,
	) -> Post {
		Post {
			id: uuid::Uuid::new_v4().to_string(),
			title: title.to_string(),
			content: format!("# {title}"),
			slug: title.to_lowercase().replace(' ', "-"),
			published,
			created_at,
			updated_at: created_at,
		}
	}

	async fn category(
		pool: &PgPool,
		name: &str,
	) -> Category {
		pool.categories()
			.add(&NewCategory {
				name: name.to_string(),
				description: None,
				slug: name.to_lowercase(),
			})
			.await
			.unwrap()
	}

	async fn membership_count(
		pool: &PgPool,
		post_id: &str,
	) -> i64 {
		sqlx::query_scalar("SELECT COUNT(*) FROM posts_to_categories WHERE post_id = $1")
			.bind(post_id)
			.fetch_one(pool)
			.await
			.unwrap()
	}

	#[sqlx::test(migrator = "crate::database::MIGRATOR")]
	#[ignore = "requires DATABASE_URL"]
	async fn test_add_then_get_loads_categories_by_name(pool: PgPool) {
		'_given: {
			let tech = category(&pool, "Tech").await;
			let rust = category(&pool, "Rust").await;
			let hello = post("Hello World", true, at(0));

			'_when: {
				pool.posts().add(&hello, &[tech.id, rust.id]).await.unwrap();
				let fetched = pool.posts().get(&hello.id).await.unwrap().unwrap();

				assert_eq!(fetched.post, hello);
				let names: Vec<&str> = fetched.categories().iter().map(|pc| pc.category.name.as_str()).collect();
				assert_eq!(names, vec!["Rust", "Tech"]);
				assert!(fetched.categories().iter().all(|pc| pc.post_id == hello.id));
			}
		}
	}

	#[sqlx::test(migrator = "crate::database::MIGRATOR")]
	#[ignore = "requires DATABASE_URL"]
	async fn test_get_missing_id_is_none(pool: PgPool) {
		assert!(pool.posts().get("no-such-post").await.unwrap().is_none());
	}

	#[sqlx::test(migrator = "crate::database::MIGRATOR")]
	#[ignore = "requires DATABASE_URL"]
	async fn test_list_filters_drafts_and_orders_newest_first(pool: PgPool) {
		'_given: {
			let older = post("Older", true, at(0));
			let draft = post("Draft", false, at(10));
			let newer = post("Newer", true, at(20));
			for p in [&older, &draft, &newer] {
				pool.posts().add(p, &[]).await.unwrap();
			}

			'_when: {
				let published: Vec<String> = pool.posts().list(false, None).await.unwrap().into_iter().map(|p| p.id.clone()).collect();
				assert_eq!(published, vec![newer.id.clone(), older.id.clone()]);

				let everything: Vec<String> = pool.posts().list(true, None).await.unwrap().into_iter().map(|p| p.id.clone()).collect();
				assert_eq!(everything, vec![newer.id.clone(), draft.id.clone(), older.id.clone()]);

				let restricted = pool.posts().list(true, Some(&[draft.id.clone()][..])).await.unwrap();
				assert_eq!(restricted.len(), 1);
				assert_eq!(restricted[0].id, draft.id);
			}
		}
	}

	#[sqlx::test(migrator = "crate::database::MIGRATOR")]
	#[ignore = "requires DATABASE_URL"]
	async fn test_category_filter_through_handler(pool: PgPool) {
		'_given: {
			let tech = category(&pool, "Tech").await;
			let empty = category(&pool, "Empty").await;
			let tagged = post("Tagged", true, at(0));
			let untagged = post("Untagged", true, at(1));
			pool.posts().add(&tagged, &[tech.id]).await.unwrap();
			pool.posts().add(&untagged, &[]).await.unwrap();

			'_when: {
				assert_eq!(pool.posts().post_ids_in_category(tech.id).await.unwrap(), vec![tagged.id.clone()]);

				let in_tech = PostHandler::get_all(
					GetPosts {
						category_id: Some(tech.id),
						include_drafts: false,
					},
					&pool.posts(),
				)
				.await
				.unwrap();
				assert_eq!(in_tech.len(), 1);
				assert_eq!(in_tech[0].id, tagged.id);

				let in_empty = PostHandler::get_all(
					GetPosts {
						category_id: Some(empty.id),
						include_drafts: true,
					},
					&pool.posts(),
				)
				.await
				.unwrap();
				assert!(in_empty.is_empty());
			}
		}
	}

	#[sqlx::test(migrator = "crate::database::MIGRATOR")]
	#[ignore = "requires DATABASE_URL"]
	async fn test_add_with_unknown_category_rolls_back_post(pool: PgPool) {
		let tech = category(&pool, "Tech").await;
		let orphan = post("Orphan", true, at(0));

		let err = pool.posts().add(&orphan, &[tech.id, 999]).await.unwrap_err();
		assert!(matches!(err, ServiceError::PersistenceError(_)));

		assert!(pool.posts().get(&orphan.id).await.unwrap().is_none());
		assert_eq!(membership_count(&pool, &orphan.id).await, 0);
	}

	#[sqlx::test(migrator = "crate::database::MIGRATOR")]
	#[ignore = "requires DATABASE_URL"]
	async fn test_update_replaces_fields_and_categories(pool: PgPool) {
		'_given: {
			let tech = category(&pool, "Tech").await;
			let rust = category(&pool, "Rust").await;
			let original = post("First Draft", false, at(0));
			pool.posts().add(&original, &[tech.id]).await.unwrap();

			'_when: {
				let revision = PostRevision {
					title: "Final Cut".into(),
					content: "done".into(),
					slug: "final-cut".into(),
					published: true,
					updated_at: at(60),
				};
				let affected = pool.posts().update(&original.id, &revision, &[rust.id]).await.unwrap();
				assert_eq!(affected, 1);

				let fetched = pool.posts().get(&original.id).await.unwrap().unwrap();
				assert_eq!(fetched.title, "Final Cut");
				assert_eq!(fetched.slug, "final-cut");
				assert!(fetched.published);
				assert_eq!(fetched.created_at, at(0));
				assert_eq!(fetched.updated_at, at(60));
				assert_eq!(fetched.category_ids(), vec![rust.id]);
			}
		}
	}

	#[sqlx::test(migrator = "crate::database::MIGRATOR")]
	#[ignore = "requires DATABASE_URL"]
	async fn test_failed_update_keeps_prior_state(pool: PgPool) {
		let tech = category(&pool, "Tech").await;
		let original = post("Stable", true, at(0));
		pool.posts().add(&original, &[tech.id]).await.unwrap();

		let revision = PostRevision {
			title: "Broken".into(),
			content: String::new(),
			slug: "broken".into(),
			published: false,
			updated_at: at(60),
		};
		let err = pool.posts().update(&original.id, &revision, &[999]).await.unwrap_err();
		assert!(matches!(err, ServiceError::PersistenceError(_)));

		let fetched = pool.posts().get(&original.id).await.unwrap().unwrap();
		assert_eq!(fetched.post, original);
		assert_eq!(fetched.category_ids(), vec![tech.id]);
	}

	#[sqlx::test(migrator = "crate::database::MIGRATOR")]
	#[ignore = "requires DATABASE_URL"]
	async fn test_missing_id_writes_nothing(pool: PgPool) {
		let tech = category(&pool, "Tech").await;
		let revision = PostRevision {
			title: "Ghost".into(),
			content: String::new(),
			slug: "ghost".into(),
			published: true,
			updated_at: at(0),
		};

		assert_eq!(pool.posts().update("no-such-post", &revision, &[tech.id]).await.unwrap(), 0);
		assert_eq!(membership_count(&pool, "no-such-post").await, 0);
		assert_eq!(pool.posts().delete("no-such-post").await.unwrap(), 0);
	}

	#[sqlx::test(migrator = "crate::database::MIGRATOR")]
	#[ignore = "requires DATABASE_URL"]
	async fn test_delete_removes_memberships(pool: PgPool) {
		let tech = category(&pool, "Tech").await;
		let rust = category(&pool, "Rust").await;
		let doomed = post("Doomed", true, at(0));
		pool.posts().add(&doomed, &[tech.id, rust.id]).await.unwrap();
		assert_eq!(membership_count(&pool, &doomed.id).await, 2);

		assert_eq!(pool.posts().delete(&doomed.id).await.unwrap(), 1);

		assert!(pool.posts().get(&doomed.id).await.unwrap().is_none());
		assert_eq!(membership_count(&pool, &doomed.id).await, 0);
		assert_eq!(pool.categories().list().await.unwrap().len(), 2);
	}
}
