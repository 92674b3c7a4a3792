use axum::{
	http::{Method, StatusCode},
	response::{IntoResponse, Response},
	Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::domain::{category::entity::Category, post::PostAggregate, ValidationError};

pub type AnyError = dyn std::error::Error + Send + Sync + 'static;

/// Acknowledgement returned by mutations that do not echo the entity back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Success {
	pub success: bool,
}

impl Success {
	pub fn ok() -> Self {
		Self { success: true }
	}
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ServiceResponse {
	Post(Option<PostAggregate>),
	Posts(Vec<PostAggregate>),
	Category(Category),
	Categories(Vec<Category>),
	Success(Success),
}

impl From<Option<PostAggregate>> for ServiceResponse {
	fn from(value: Option<PostAggregate>) -> Self {
		ServiceResponse::Post(value)
	}
}

impl From<Vec<PostAggregate>> for ServiceResponse {
	fn from(value: Vec<PostAggregate>) -> Self {
		ServiceResponse::Posts(value)
	}
}

impl From<Category> for ServiceResponse {
	fn from(value: Category) -> Self {
		ServiceResponse::Category(value)
	}
}

impl From<Vec<Category>> for ServiceResponse {
	fn from(value: Vec<Category>) -> Self {
		ServiceResponse::Categories(value)
	}
}

impl From<Success> for ServiceResponse {
	fn from(value: Success) -> Self {
		ServiceResponse::Success(value)
	}
}

/// tRPC success envelope.
impl IntoResponse for ServiceResponse {
	fn into_response(self) -> Response {
		(StatusCode::OK, Json(json!({ "result": { "data": self } }))).into_response()
	}
}

#[derive(Debug, Error)]
pub enum ServiceError {
	#[error(transparent)]
	ValidationError(#[from] ValidationError),

	#[error("persistence error: {0}")]
	PersistenceError(Box<AnyError>),

	#[error("transaction error: {0}")]
	TransactionError(&'static str),

	#[error("configuration error: {0}")]
	ConfigError(String),

	#[error("migration error: {0}")]
	MigrationError(#[from] sqlx::migrate::MigrateError),

	#[error("no procedure named '{0}'")]
	ProcedureNotFound(String),

	#[error("procedure '{procedure}' does not accept {method}")]
	MethodNotSupported { procedure: String, method: Method },
}

impl From<sqlx::Error> for ServiceError {
	fn from(err: sqlx::Error) -> Self {
		ServiceError::PersistenceError(Box::new(err))
	}
}

impl ServiceError {
	fn code(&self) -> (StatusCode, &'static str, i32) {
		match self {
			ServiceError::ValidationError(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", -32600),
			ServiceError::ProcedureNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", -32004),
			ServiceError::MethodNotSupported { .. } => (StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_SUPPORTED", -32005),
			ServiceError::PersistenceError(_)
			| ServiceError::TransactionError(_)
			| ServiceError::ConfigError(_)
			| ServiceError::MigrationError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR", -32603),
		}
	}

	/// Message shown to the client. Internal causes are never exposed.
	fn public_message(&self) -> String {
		match self {
			ServiceError::ValidationError(_) | ServiceError::ProcedureNotFound(_) | ServiceError::MethodNotSupported { .. } => {
				self.to_string()
			}
			_ => "an internal error occurred".to_string(),
		}
	}
}

/// tRPC error envelope.
impl IntoResponse for ServiceError {
	fn into_response(self) -> Response {
		let (status, code, rpc_code) = self.code();
		let body = json!({
			"error": {
				"message": self.public_message(),
				"code": rpc_code,
				"data": {
					"code": code,
					"httpStatus": status.as_u16(),
				}
			}
		});
		(status, Json(body)).into_response()
	}
}
