use async_trait::async_trait;

use super::{Repository, TCategoryRepository};
use crate::{
	domain::category::entity::{Category, NewCategory},
	services::response::ServiceError,
};

#[async_trait]
impl TCategoryRepository for Repository<Category> {
	async fn list(&self) -> Result<Vec<Category>, ServiceError> {
		let executor = self.executor.lock().await;
		let categories = sqlx::query_as::<_, Category>(
			r#"
			SELECT id, name, description, slug
			FROM categories
			ORDER BY name ASC
			"#,
		)
		.fetch_all(executor.connection())
		.await?;
		Ok(categories)
	}

	async fn add(
		&self,
		category: &NewCategory,
	) -> Result<Category, ServiceError> {
		let executor = self.executor.lock().await;
		let created = sqlx::query_as::<_, Category>(
			r#"
			INSERT INTO categories (name, description, slug)
			VALUES ($1, $2, $3)
			RETURNING id, name, description, slug
			"#,
		)
		.bind(&category.name)
		.bind(&category.description)
		.bind(&category.slug)
		.fetch_one(executor.connection())
		.await?;
		Ok(created)
	}
}

#[cfg(test)]
mod test {
	use sqlx::PgPool;

	use crate::{
		adapters::repositories::{Connectable, TCategoryRepository},
		domain::category::{commands::CreateCategory, entity::NewCategory},
		services::{handlers::CategoryHandler, response::ServiceError},
	};

	#[sqlx::test(migrator = "crate::database::MIGRATOR")]
	#[ignore = "requires DATABASE_URL"]
	async fn test_add_returns_generated_id(pool: PgPool) {
		let first = pool
			.categories()
			.add(&NewCategory {
				name: "Tech".into(),
				description: Some("Gadgets".into()),
				slug: "tech".into(),
			})
			.await
			.unwrap();
		let second = CategoryHandler::create_category(
			CreateCategory {
				name: "Open Source".into(),
				description: None,
			},
			&pool.categories(),
		)
		.await
		.unwrap();

		assert!(first.id > 0);
		assert!(second.id > first.id);
		assert_eq!(first.description.as_deref(), Some("Gadgets"));
		assert_eq!(second.slug, "open-source");
		assert_eq!(second.description, None);
	}

	#[sqlx::test(migrator = "crate::database::MIGRATOR")]
	#[ignore = "requires DATABASE_URL"]
	async fn test_list_is_ordered_by_name(pool: PgPool) {
		for name in ["Rust", "Databases", "Networking"] {
			CategoryHandler::create_category(
				CreateCategory {
					name: name.into(),
					description: None,
				},
				&pool.categories(),
			)
			.await
			.unwrap();
		}

		let listed = CategoryHandler::get_all(&pool.categories()).await.unwrap();
		let names: Vec<&str> = listed.iter().map(|c| c.name.as_str()).collect();
		assert_eq!(names, vec!["Databases", "Networking", "Rust"]);
		assert!(listed.iter().all(|c| c.slug == c.name.to_lowercase()));
	}

	#[sqlx::test(migrator = "crate::database::MIGRATOR")]
	#[ignore = "requires DATABASE_URL"]
	async fn test_empty_name_never_reaches_the_table(pool: PgPool) {
		let err = CategoryHandler::create_category(
			CreateCategory {
				name: String::new(),
				description: None,
			},
			&pool.categories(),
		)
		.await
		.unwrap_err();

		assert!(matches!(err, ServiceError::ValidationError(_)));
		assert!(pool.categories().list().await.unwrap().is_empty());
	}
}
