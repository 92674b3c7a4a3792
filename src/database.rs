use std::{mem, sync::Arc};

use sqlx::{postgres::PgPool, Postgres, Transaction};
use tokio::sync::Mutex;

use crate::services::response::ServiceError;

/// Per-request handle on the pool, holding at most one open transaction.
pub struct DatabaseExecutor {
	pool: PgPool,
	transaction: Option<Transaction<'static, Postgres>>,
}

impl DatabaseExecutor {
	pub fn new(pool: PgPool) -> Self {
		Self { pool, transaction: None }
	}
	pub fn transaction(&mut self) -> Result<&mut Transaction<'static, Postgres>, ServiceError> {
		self.transaction.as_mut().ok_or(ServiceError::TransactionError("transaction has not begun"))
	}
	pub fn connection(&self) -> &PgPool {
		&self.pool
	}

	pub(crate) async fn begin(&mut self) -> Result<(), ServiceError> {
		match self.transaction.as_mut() {
			None => {
				self.transaction = Some(self.pool.begin().await?);
				Ok(())
			}
			Some(_trx) => {
				tracing::warn!("transaction begun already");
				Err(ServiceError::TransactionError("transaction begun already"))
			}
		}
	}

	pub(crate) async fn commit(&mut self) -> Result<(), ServiceError> {
		let trx = mem::take(&mut self.transaction).ok_or(ServiceError::TransactionError("transaction has not begun"))?;
		trx.commit().await.map_err(|err| {
			tracing::error!("error occurred during commit operation : {:?}", err);
			ServiceError::from(err)
		})
	}
	pub(crate) async fn rollback(&mut self) -> Result<(), ServiceError> {
		let trx = mem::take(&mut self.transaction).ok_or(ServiceError::TransactionError("transaction has not begun"))?;
		Ok(trx.rollback().await?)
	}

	/// Commits on success, rolls back on failure and hands back the first
	/// error. A failed rollback is logged; the connection is dropped either way.
	pub(crate) async fn finish<T>(
		&mut self,
		result: Result<T, ServiceError>,
	) -> Result<T, ServiceError> {
		match result {
			Ok(value) => {
				self.commit().await?;
				Ok(value)
			}
			Err(err) => {
				if let Err(rollback_err) = self.rollback().await {
					tracing::error!("rollback failed: {:?}", rollback_err);
				}
				Err(err)
			}
		}
	}
}

impl From<DatabaseExecutor> for Arc<Mutex<DatabaseExecutor>> {
	fn from(value: DatabaseExecutor) -> Self {
		Arc::new(Mutex::new(value))
	}
}

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub async fn run_migrations(pool: &PgPool) -> Result<(), ServiceError> {
	MIGRATOR.run(pool).await?;
	Ok(())
}
