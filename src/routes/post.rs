use axum::{
	extract::State,
	routing::{get, post},
	Router,
};

use super::{
	extract::{MutationInput, QueryInput},
	method_not_supported,
};
use crate::{
	adapters::repositories::Connectable,
	domain::post::commands::{CreatePost, DeletePost, GetPostById, GetPosts, UpdatePost},
	services::{
		handlers::PostHandler,
		response::{ServiceError, ServiceResponse},
	},
};

async fn create_post<C: Connectable>(
	State(connection): State<C>,
	MutationInput(cmd): MutationInput<CreatePost>,
) -> Result<ServiceResponse, ServiceError> {
	Ok(PostHandler::create_post(cmd, &connection.posts()).await?.into())
}

async fn get_all<C: Connectable>(
	State(connection): State<C>,
	QueryInput(query): QueryInput<GetPosts>,
) -> Result<ServiceResponse, ServiceError> {
	Ok(PostHandler::get_all(query, &connection.posts()).await?.into())
}

async fn get_by_id<C: Connectable>(
	State(connection): State<C>,
	QueryInput(query): QueryInput<GetPostById>,
) -> Result<ServiceResponse, ServiceError> {
	Ok(PostHandler::get_by_id(query, &connection.posts()).await?.into())
}

async fn update<C: Connectable>(
	State(connection): State<C>,
	MutationInput(cmd): MutationInput<UpdatePost>,
) -> Result<ServiceResponse, ServiceError> {
	Ok(PostHandler::update(cmd, &connection.posts()).await?.into())
}

async fn delete<C: Connectable>(
	State(connection): State<C>,
	MutationInput(cmd): MutationInput<DeletePost>,
) -> Result<ServiceResponse, ServiceError> {
	Ok(PostHandler::delete(cmd, &connection.posts()).await?.into())
}

pub fn procedures<C: Connectable>() -> Router<C> {
	Router::new()
		.route("/post.createPost", post(create_post::<C>).fallback(method_not_supported))
		.route("/post.getAll", get(get_all::<C>).fallback(method_not_supported))
		.route("/post.getById", get(get_by_id::<C>).fallback(method_not_supported))
		.route("/post.update", post(update::<C>).fallback(method_not_supported))
		.route("/post.delete", post(delete::<C>).fallback(method_not_supported))
}
