use anyhow::Context;
use axum::http::{HeaderValue, Method};
use blog::{
	database::run_migrations,
	dependencies::{config, connection_pool},
	routes::create_routes,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	dotenv::dotenv().ok();
	let config = config()?;

	// ! Tracing
	tracing_subscriber::registry()
		.with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			// axum logs rejections from built-in extractors with the `axum::rejection`
			// target, at `TRACE` level. `axum::rejection=trace` enables showing those events
			format!("{},blog=info,tower_http=debug,axum::rejection=trace", config.log_level).into()
		}))
		.with(tracing_subscriber::fmt::layer())
		.init();

	// ! Connection
	tracing::info!("connections are being pooled...");
	let pool = connection_pool().await?;
	run_migrations(pool).await?;

	let origins = config
		.allow_origins
		.iter()
		.map(|origin| origin.parse::<HeaderValue>())
		.collect::<Result<Vec<_>, _>>()
		.context("ALLOW_ORIGINS contains an invalid origin")?;

	let app = create_routes(pool.clone())
		.layer(
			CorsLayer::new()
				.allow_origin(origins)
				.allow_methods([Method::GET, Method::POST])
				.allow_headers([axum::http::header::CONTENT_TYPE]),
		)
		.layer(TraceLayer::new_for_http());

	tracing::info!("start web server on {}", config.server_ip_port);
	axum::Server::bind(&config.server_ip_port)
		.serve(app.into_make_service())
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	tracing::info!("server shutdown complete");
	Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(err) = tokio::signal::ctrl_c().await {
			tracing::error!("failed to install Ctrl+C handler: {}", err);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			}
			Err(err) => {
				tracing::error!("failed to install SIGTERM handler: {}", err);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => tracing::info!("received Ctrl+C, starting shutdown"),
		_ = terminate => tracing::info!("received SIGTERM, starting shutdown"),
	}
}
