mod category;
mod extract;
mod post;

use axum::{
	http::{Method, Uri},
	Router,
};

use crate::{adapters::repositories::Connectable, services::response::ServiceError};

pub const TRPC_PREFIX: &str = "/api/trpc";

fn procedure_name(uri: &Uri) -> String {
	uri.path().trim_start_matches(TRPC_PREFIX).trim_start_matches('/').to_string()
}

async fn unknown_procedure(uri: Uri) -> ServiceError {
	ServiceError::ProcedureNotFound(procedure_name(&uri))
}

// Queries are GET and mutations are POST; anything else lands here.
async fn method_not_supported(
	method: Method,
	uri: Uri,
) -> ServiceError {
	ServiceError::MethodNotSupported {
		procedure: procedure_name(&uri),
		method,
	}
}

pub fn create_routes<C: Connectable>(connection: C) -> Router {
	let procedures = Router::new().merge(category::procedures::<C>()).merge(post::procedures::<C>());

	Router::new().nest(TRPC_PREFIX, procedures).fallback(unknown_procedure).with_state(connection)
}
