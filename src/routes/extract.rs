use async_trait::async_trait;
use axum::{
	body::HttpBody,
	extract::{FromRequest, FromRequestParts, Query},
	http::{request::Parts, Request},
	BoxError, Json,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{domain::ValidationError, services::response::ServiceError};

#[derive(Deserialize)]
struct RawInput {
	input: Option<String>,
}

/// Query procedure input, taken from the JSON-encoded `input` query
/// parameter. An absent parameter is read as `{}`.
pub struct QueryInput<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryInput<T>
where
	S: Send + Sync,
	T: DeserializeOwned + Send,
{
	type Rejection = ServiceError;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let Query(raw) = Query::<RawInput>::from_request_parts(parts, state)
			.await
			.map_err(|rejection| ValidationError::Malformed { reason: rejection.body_text() })?;

		let input = serde_json::from_str::<T>(raw.input.as_deref().unwrap_or("{}")).map_err(ValidationError::from)?;
		Ok(QueryInput(input))
	}
}

/// Mutation procedure input, taken from the JSON request body.
pub struct MutationInput<T>(pub T);

#[async_trait]
impl<S, B, T> FromRequest<S, B> for MutationInput<T>
where
	S: Send + Sync,
	B: HttpBody + Send + 'static,
	B::Data: Send,
	B::Error: Into<BoxError>,
	T: DeserializeOwned + Send,
{
	type Rejection = ServiceError;

	async fn from_request(
		req: Request<B>,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let Json(input) = Json::<T>::from_request(req, state)
			.await
			.map_err(|rejection| ValidationError::Malformed { reason: rejection.body_text() })?;
		Ok(MutationInput(input))
	}
}
