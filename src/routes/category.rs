use axum::{
	extract::State,
	routing::{get, post},
	Router,
};

use super::{extract::MutationInput, method_not_supported};
use crate::{
	adapters::repositories::Connectable,
	domain::category::commands::CreateCategory,
	services::{
		handlers::CategoryHandler,
		response::{ServiceError, ServiceResponse},
	},
};

async fn get_all<C: Connectable>(State(connection): State<C>) -> Result<ServiceResponse, ServiceError> {
	Ok(CategoryHandler::get_all(&connection.categories()).await?.into())
}

async fn create_category<C: Connectable>(
	State(connection): State<C>,
	MutationInput(cmd): MutationInput<CreateCategory>,
) -> Result<ServiceResponse, ServiceError> {
	Ok(CategoryHandler::create_category(cmd, &connection.categories()).await?.into())
}

pub fn procedures<C: Connectable>() -> Router<C> {
	Router::new()
		.route("/category.getAll", get(get_all::<C>).fallback(method_not_supported))
		.route("/category.createCategory", post(create_category::<C>).fallback(method_not_supported))
}
