use std::net::SocketAddr;

use crate::services::response::ServiceError;

pub struct Config {
	/// Tracing filter used when `RUST_LOG` is not set
	pub log_level: String,

	/// Address the server is listening on
	pub server_ip_port: SocketAddr,
	pub database_url: String,
	pub database_max_connections: u32,
	pub allow_origins: Vec<String>,
}

impl Config {
	pub fn new() -> Result<Config, ServiceError> {
		dotenv::dotenv().ok();
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ServiceError> {
		let database_url = lookup("DATABASE_URL").ok_or_else(|| ServiceError::ConfigError("DATABASE_URL must be set".into()))?;
		let log_level = lookup("LOG_LEVEL").unwrap_or("warn".to_string());
		let server_ip_port = lookup("SERVER_IP_PORT")
			.unwrap_or("0.0.0.0:80".into())
			.parse::<SocketAddr>()
			.map_err(|err| ServiceError::ConfigError(format!("SERVER_IP_PORT: {err}")))?;
		let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
			Some(value) => value
				.parse::<u32>()
				.map_err(|err| ServiceError::ConfigError(format!("DATABASE_MAX_CONNECTIONS: {err}")))?,
			None => 30,
		};
		let allow_origins = lookup("ALLOW_ORIGINS")
			.unwrap_or("http://localhost:3000,http://localhost:3001".to_string())
			.split(',')
			.map(str::trim)
			.filter(|origin| !origin.is_empty())
			.map(String::from)
			.collect();

		Ok(Config {
			log_level,
			server_ip_port,
			database_url,
			database_max_connections,
			allow_origins,
		})
	}
}
