//! Transactional fixture loading.
//!
//! Loading happens on one pooled connection with foreign key checks off:
//! every table loaded so far is cleared, then each row of each batch is
//! inserted with its own parameterized statement, then the transaction is
//! committed. Statements run one after the other; nothing inside the
//! transaction is parallel.

use std::sync::Arc;

use sea_query::{Alias, Expr, MysqlQueryBuilder, Query, Table, Value, Values};
use seedbed_conf::{ErrorPolicy, TableClearMode};
use sqlx::mysql::{MySqlArguments, MySqlConnection, MySqlPool};
use sqlx::{Connection, MySql};
use tracing::{debug, info, warn};

use crate::database::{ForeignKeyChecksOff, quote_ident};
use crate::error::{FixtureError, FixtureResult};
use crate::fixtures::{BatchRow, TableBatch};

/// A single-row insert ready to execute.
#[derive(Debug, Clone)]
pub struct InsertStatement {
	/// Target table.
	pub table: String,
	/// SQL with `?` placeholders; absent columns render as `DEFAULT`.
	pub sql: String,
	/// Placeholder values in order.
	pub values: Values,
}

/// Builds the insert for one row of `batch`.
///
/// # Errors
///
/// Returns [`FixtureError::StatementError`] if the row does not match the
/// batch's columns.
pub fn build_insert(batch: &TableBatch, row: &BatchRow) -> FixtureResult<InsertStatement> {
	let table = batch.table();
	if row.len() != batch.columns().len() {
		return Err(FixtureError::StatementError {
			table: table.to_string(),
			message: format!(
				"row has {} values for {} columns",
				row.len(),
				batch.columns().len()
			),
		});
	}

	if batch.columns().is_empty() {
		return Ok(InsertStatement {
			table: table.to_string(),
			sql: format!("INSERT INTO {} () VALUES ()", quote_ident(table)),
			values: Values(Vec::new()),
		});
	}

	let columns: Vec<Alias> = batch
		.columns()
		.iter()
		.map(|column| Alias::new(column.clone()))
		.collect();
	let exprs: Vec<Expr> = row
		.iter()
		.map(|cell| match cell {
			Some(value) => Expr::val(value.to_sea_value()),
			None => Expr::cust("DEFAULT"),
		})
		.collect();

	let mut stmt = Query::insert()
		.into_table(Alias::new(table.to_string()))
		.to_owned();
	stmt.columns(columns)
		.values(exprs)
		.map_err(|e| FixtureError::StatementError {
			table: table.to_string(),
			message: e.to_string(),
		})?;
	let (sql, values) = stmt.build(MysqlQueryBuilder);

	Ok(InsertStatement {
		table: table.to_string(),
		sql,
		values,
	})
}

/// Statement that empties `table`.
///
/// # Example
///
/// ```
/// # use seedbed_fixtures::loader::clear_statement;
/// # use seedbed_conf::TableClearMode;
/// assert_eq!(clear_statement("users", TableClearMode::Delete), "DELETE FROM `users`");
/// assert_eq!(clear_statement("users", TableClearMode::Truncate), "TRUNCATE TABLE `users`");
/// ```
pub fn clear_statement(table: &str, mode: TableClearMode) -> String {
	match mode {
		TableClearMode::Delete => Query::delete()
			.from_table(Alias::new(table.to_string()))
			.to_string(MysqlQueryBuilder),
		TableClearMode::Truncate => Table::truncate()
			.table(Alias::new(table.to_string()))
			.to_string(MysqlQueryBuilder),
	}
}

type MySqlQuery<'q> = sqlx::query::Query<'q, MySql, MySqlArguments>;

fn bind_value<'q>(query: MySqlQuery<'q>, table: &str, value: Value) -> FixtureResult<MySqlQuery<'q>> {
	let query = match value {
		Value::Bool(b) => query.bind(b),
		Value::BigInt(i) => query.bind(i),
		Value::BigUnsigned(u) => query.bind(u),
		Value::Double(f) => query.bind(f),
		Value::String(s) => query.bind(s.map(|s| s.to_string())),
		other => {
			return Err(FixtureError::StatementError {
				table: table.to_string(),
				message: format!("unsupported value {:?}", other),
			});
		}
	};
	Ok(query)
}

/// Executes one insert on `conn`.
pub async fn execute_insert(conn: &mut MySqlConnection, stmt: InsertStatement) -> FixtureResult<u64> {
	let InsertStatement { table, sql, values } = stmt;
	let mut query = sqlx::query(&sql);
	for value in values.0 {
		query = bind_value(query, &table, value)?;
	}
	let result = query
		.execute(&mut *conn)
		.await
		.map_err(|e| FixtureError::StatementError {
			table: table.clone(),
			message: e.to_string(),
		})?;
	Ok(result.rows_affected())
}

/// Outcome of one load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
	/// Tables emptied before inserting.
	pub tables_cleared: Vec<String>,
	/// Rows inserted.
	pub rows_inserted: u64,
	/// Rows whose insert failed and was skipped.
	pub rows_failed: u64,
}

/// Clears and seeds tables inside one transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionalLoader {
	clear_mode: TableClearMode,
	policy: ErrorPolicy,
}

impl TransactionalLoader {
	/// Creates a loader that deletes rows and skips failing inserts.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets how tables are emptied.
	pub fn with_clear_mode(mut self, mode: TableClearMode) -> Self {
		self.clear_mode = mode;
		self
	}

	/// Sets how failing inserts are treated.
	pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
		self.policy = policy;
		self
	}

	/// Clears `clear` and inserts every row of `batches`.
	///
	/// Foreign key checks are switched back on afterwards whether or not the
	/// load succeeded. Any error before the commit leaves the tables as they
	/// were, except that [`TableClearMode::Truncate`] cannot be undone.
	///
	/// # Errors
	///
	/// Fails on connection, clear and commit errors. A failing insert fails
	/// the load only under [`ErrorPolicy::Strict`]; otherwise it is logged and
	/// counted in [`LoadReport::rows_failed`].
	pub async fn load(
		&self,
		pool: &MySqlPool,
		clear: &[String],
		batches: &[Arc<TableBatch>],
	) -> FixtureResult<LoadReport> {
		let mut guard = ForeignKeyChecksOff::acquire(pool).await?;
		let outcome = self.load_on(guard.connection(), clear, batches).await;
		guard.finish(outcome).await
	}

	async fn load_on(
		&self,
		conn: &mut MySqlConnection,
		clear: &[String],
		batches: &[Arc<TableBatch>],
	) -> FixtureResult<LoadReport> {
		let mut report = LoadReport::default();

		// TRUNCATE commits implicitly, so it cannot share the transaction
		if self.clear_mode == TableClearMode::Truncate {
			self.clear_tables(&mut *conn, clear, &mut report).await?;
		}

		let mut tx = conn.begin().await?;
		if self.clear_mode == TableClearMode::Delete {
			self.clear_tables(&mut tx, clear, &mut report).await?;
		}

		for batch in batches {
			for row in batch.rows() {
				let inserted = match build_insert(batch, row) {
					Ok(stmt) => execute_insert(&mut tx, stmt).await,
					Err(error) => Err(error),
				};
				match inserted {
					Ok(affected) => report.rows_inserted += affected,
					Err(error) if !self.policy.is_strict() => {
						warn!(table = %batch.table(), error = %error, "Skipping fixture row");
						report.rows_failed += 1;
					}
					Err(error) => return Err(error),
				}
			}
			debug!(table = %batch.table(), rows = batch.len(), "Inserted fixture rows");
		}

		tx.commit().await?;
		info!(
			tables = batches.len(),
			rows = report.rows_inserted,
			failed = report.rows_failed,
			"Fixtures loaded"
		);
		Ok(report)
	}

	async fn clear_tables(
		&self,
		conn: &mut MySqlConnection,
		tables: &[String],
		report: &mut LoadReport,
	) -> FixtureResult<()> {
		for table in tables {
			sqlx::raw_sql(&clear_statement(table, self.clear_mode))
				.execute(&mut *conn)
				.await?;
			report.tables_cleared.push(table.clone());
		}
		Ok(())
	}
}
