//! Database connection handling.
//!
//! [`DatabaseHandle`] owns a lazily created pool bound to the target
//! database. Recreating the database uses a separate server-level
//! connection, since the target may not exist yet.

use sqlx::mysql::{MySqlConnection, MySqlPool, MySqlPoolOptions};
use sqlx::pool::PoolConnection;
use sqlx::{Connection, MySql};
use tracing::{debug, info, warn};

use crate::error::FixtureResult;

/// Quotes an identifier with backticks, doubling embedded backticks.
///
/// # Example
///
/// ```
/// # use seedbed_fixtures::database::quote_ident;
/// assert_eq!(quote_ident("users"), "`users`");
/// assert_eq!(quote_ident("we`ird"), "`we``ird`");
/// ```
pub fn quote_ident(ident: &str) -> String {
	format!("`{}`", ident.replace('`', "``"))
}

/// Lazily connected pool for the target database.
#[derive(Debug)]
pub struct DatabaseHandle {
	url: String,
	max_connections: u32,
	pool: Option<MySqlPool>,
}

impl DatabaseHandle {
	/// Creates a handle; nothing is connected until [`connect`](Self::connect).
	pub fn new(url: impl Into<String>, max_connections: usize) -> Self {
		Self {
			url: url.into(),
			max_connections: u32::try_from(max_connections).unwrap_or(u32::MAX),
			pool: None,
		}
	}

	/// Pool size used for the next connection.
	pub fn max_connections(&self) -> u32 {
		self.max_connections
	}

	/// Changes the pool size. Takes effect on the next connect.
	pub fn set_max_connections(&mut self, max_connections: usize) {
		self.max_connections = u32::try_from(max_connections).unwrap_or(u32::MAX);
	}

	/// Returns true while a pool is open.
	pub fn is_connected(&self) -> bool {
		self.pool.is_some()
	}

	/// Returns the open pool, connecting first if needed.
	pub async fn connect(&mut self) -> FixtureResult<MySqlPool> {
		if let Some(pool) = &self.pool {
			return Ok(pool.clone());
		}

		debug!(max_connections = self.max_connections, "Connecting to test database");
		let pool = MySqlPoolOptions::new()
			.max_connections(self.max_connections)
			.connect(&self.url)
			.await?;
		self.pool = Some(pool.clone());
		Ok(pool)
	}

	/// Closes the pool if one is open.
	pub async fn disconnect(&mut self) {
		if let Some(pool) = self.pool.take() {
			debug!("Disconnecting from test database");
			pool.close().await;
		}
	}
}

/// Drops and creates `database` over a connection to `server_url`, which
/// must not select a database itself.
pub async fn recreate_database(server_url: &str, database: &str) -> FixtureResult<()> {
	let mut conn = MySqlConnection::connect(server_url).await?;
	let name = quote_ident(database);

	info!(database, "Dropping database");
	sqlx::raw_sql(&format!("DROP DATABASE IF EXISTS {}", name))
		.execute(&mut conn)
		.await?;

	info!(database, "Creating database");
	sqlx::raw_sql(&format!("CREATE DATABASE {}", name))
		.execute(&mut conn)
		.await?;

	conn.close().await?;
	Ok(())
}

/// Toggles `FOREIGN_KEY_CHECKS` for the session of `conn`.
pub async fn set_foreign_key_checks(conn: &mut MySqlConnection, enabled: bool) -> FixtureResult<()> {
	let sql = if enabled {
		"SET FOREIGN_KEY_CHECKS=1"
	} else {
		"SET FOREIGN_KEY_CHECKS=0"
	};
	sqlx::raw_sql(sql).execute(&mut *conn).await?;
	Ok(())
}

/// A pooled connection with foreign key checks disabled.
///
/// Call [`restore`](Self::restore) when done. A guard dropped without a
/// successful restore closes its connection instead of returning it to the
/// pool, so no pooled session keeps the checks off.
pub struct ForeignKeyChecksOff {
	conn: PoolConnection<MySql>,
	restored: bool,
}

impl ForeignKeyChecksOff {
	/// Acquires a connection from `pool` and disables foreign key checks on it.
	pub async fn acquire(pool: &MySqlPool) -> FixtureResult<Self> {
		let mut conn = pool.acquire().await?;
		set_foreign_key_checks(&mut conn, false).await?;
		Ok(Self {
			conn,
			restored: false,
		})
	}

	/// The guarded connection.
	pub fn connection(&mut self) -> &mut MySqlConnection {
		&mut self.conn
	}

	/// Re-enables foreign key checks.
	pub async fn restore(mut self) -> FixtureResult<()> {
		set_foreign_key_checks(&mut self.conn, true).await?;
		self.restored = true;
		Ok(())
	}

	/// Restores the checks after work done on [`connection`](Self::connection)
	/// and hands back the work's outcome.
	///
	/// An error from the work wins over a restore error; the latter is only
	/// logged in that case.
	pub async fn finish<T>(self, outcome: FixtureResult<T>) -> FixtureResult<T> {
		let restored = self.restore().await;
		match (outcome, restored) {
			(Ok(value), Ok(())) => Ok(value),
			(Ok(_), Err(error)) => Err(error),
			(Err(error), Err(restore_error)) => {
				warn!(error = %restore_error, "Failed to re-enable foreign key checks");
				Err(error)
			}
			(Err(error), Ok(())) => Err(error),
		}
	}
}

impl Drop for ForeignKeyChecksOff {
	fn drop(&mut self) {
		if !self.restored {
			self.conn.close_on_drop();
		}
	}
}

impl std::fmt::Debug for ForeignKeyChecksOff {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ForeignKeyChecksOff")
			.field("restored", &self.restored)
			.finish_non_exhaustive()
	}
}
