//! Per-table insertion batches.
//!
//! A [`TableBatch`] aligns records with heterogeneous field sets onto one
//! column list: the union of every field name seen, in first-seen order.
//! Rows that omit a column hold `None` in that slot, which the loader turns
//! into the SQL `DEFAULT` keyword.

use indexmap::IndexSet;

use super::{FixtureRecord, FixtureValue};

/// One row of a batch, aligned to the batch's columns. `None` marks a column
/// the record did not supply.
pub type BatchRow = Vec<Option<FixtureValue>>;

/// Canonical columns and aligned rows for one table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableBatch {
	table: String,
	columns: IndexSet<String>,
	rows: Vec<BatchRow>,
}

impl TableBatch {
	/// Creates an empty batch for `table`.
	pub fn new(table: impl Into<String>) -> Self {
		Self {
			table: table.into(),
			columns: IndexSet::new(),
			rows: Vec::new(),
		}
	}

	/// Builds a batch from all records of one table.
	///
	/// # Example
	///
	/// ```
	/// # use seedbed_fixtures::fixtures::{FixtureRecord, FixtureValue, TableBatch};
	/// let first: FixtureRecord = [("id".to_string(), FixtureValue::Int(1))].into_iter().collect();
	/// let second: FixtureRecord = [
	///     ("id".to_string(), FixtureValue::Int(2)),
	///     ("note".to_string(), FixtureValue::from("x")),
	/// ]
	/// .into_iter()
	/// .collect();
	///
	/// let batch = TableBatch::from_records("users", [first, second]);
	///
	/// assert_eq!(batch.column_names(), vec!["id", "note"]);
	/// assert_eq!(batch.rows()[0], vec![Some(FixtureValue::Int(1)), None]);
	/// ```
	pub fn from_records(
		table: impl Into<String>,
		records: impl IntoIterator<Item = FixtureRecord>,
	) -> Self {
		let mut batch = Self::new(table);
		for record in records {
			batch.push_record(record);
		}
		batch
	}

	/// Adds one record, widening the column list when it brings new fields.
	///
	/// Rows already in the batch get an absent slot for each new column, so
	/// every row always has exactly one slot per column.
	pub fn push_record(&mut self, record: FixtureRecord) {
		let before = self.columns.len();
		for key in record.keys() {
			if !self.columns.contains(key.as_str()) {
				self.columns.insert(key.clone());
			}
		}
		let added = self.columns.len() - before;
		if added > 0 {
			for row in &mut self.rows {
				row.resize(self.columns.len(), None);
			}
		}

		let mut row: BatchRow = vec![None; self.columns.len()];
		for (key, value) in record {
			if let Some(idx) = self.columns.get_index_of(key.as_str()) {
				row[idx] = Some(value);
			}
		}
		self.rows.push(row);
	}

	/// Target table.
	pub fn table(&self) -> &str {
		&self.table
	}

	/// Canonical columns in first-seen order.
	pub fn columns(&self) -> &IndexSet<String> {
		&self.columns
	}

	/// Column names as string slices.
	pub fn column_names(&self) -> Vec<&str> {
		self.columns.iter().map(String::as_str).collect()
	}

	/// Rows aligned to [`columns`](Self::columns).
	pub fn rows(&self) -> &[BatchRow] {
		&self.rows
	}

	/// Number of rows.
	pub fn len(&self) -> usize {
		self.rows.len()
	}

	/// Returns true if the batch has no rows.
	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// Value of `column` in row `row`; `None` when absent or out of range.
	pub fn value(&self, row: usize, column: &str) -> Option<&FixtureValue> {
		let idx = self.columns.get_index_of(column)?;
		self.rows.get(row)?.get(idx)?.as_ref()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn record(fields: &[(&str, FixtureValue)]) -> FixtureRecord {
		fields
			.iter()
			.map(|(k, v)| (k.to_string(), v.clone()))
			.collect()
	}

	#[rstest]
	fn test_union_in_first_seen_order() {
		let batch = TableBatch::from_records(
			"users",
			[
				record(&[("id", 1i64.into()), ("name", "a".into())]),
				record(&[("id", 2i64.into()), ("name", "a".into()), ("note", "x".into())]),
			],
		);

		assert_eq!(batch.column_names(), vec!["id", "name", "note"]);
		assert_eq!(
			batch.rows(),
			&[
				vec![Some(FixtureValue::Int(1)), Some("a".into()), None],
				vec![
					Some(FixtureValue::Int(2)),
					Some("a".into()),
					Some("x".into())
				],
			]
		);
	}

	#[rstest]
	fn test_rows_are_aligned_when_record_order_differs() {
		let batch = TableBatch::from_records(
			"posts",
			[
				record(&[("title", "first".into()), ("id", 1i64.into())]),
				record(&[("id", 2i64.into()), ("title", "second".into())]),
			],
		);

		assert_eq!(batch.column_names(), vec!["title", "id"]);
		assert_eq!(batch.value(1, "title"), Some(&FixtureValue::from("second")));
		assert_eq!(batch.value(1, "id"), Some(&FixtureValue::Int(2)));
	}

	#[rstest]
	fn test_every_row_has_one_slot_per_column() {
		let batch = TableBatch::from_records(
			"events",
			[
				record(&[("a", 1i64.into())]),
				record(&[("b", 2i64.into())]),
				record(&[("c", 3i64.into()), ("a", 4i64.into())]),
				record(&[]),
			],
		);

		assert_eq!(batch.columns().len(), 3);
		assert!(batch.rows().iter().all(|row| row.len() == 3));
		assert_eq!(batch.rows()[0], vec![Some(FixtureValue::Int(1)), None, None]);
		assert_eq!(batch.rows()[3], vec![None, None, None]);
	}

	#[rstest]
	fn test_explicit_null_is_not_absent() {
		let batch = TableBatch::from_records(
			"users",
			[
				record(&[("id", 1i64.into()), ("note", FixtureValue::Null)]),
				record(&[("id", 2i64.into())]),
			],
		);

		assert_eq!(batch.rows()[0][1], Some(FixtureValue::Null));
		assert_eq!(batch.rows()[1][1], None);
	}

	#[rstest]
	fn test_empty_batch() {
		let batch = TableBatch::from_records("empty", Vec::new());
		assert!(batch.is_empty());
		assert_eq!(batch.len(), 0);
		assert!(batch.columns().is_empty());
		assert_eq!(batch.table(), "empty");
	}
}
