//! Parsing a fixture directory end to end, without a database.

use std::sync::Arc;

use rstest::rstest;
use seedbed_fixtures::prelude::*;
use seedbed_test::{FixtureDir, fixture_dir};

#[rstest]
#[tokio::test]
async fn test_each_file_yields_its_table_with_column_union(fixture_dir: FixtureDir) {
	fixture_dir.write_yaml("users", "- id: 1\n  name: a\n- id: 2\n  name: a\n  note: x\n");
	fixture_dir.write_yaml("tags", "- id: 1\n- label: untitled\n");
	fixture_dir.write_json(
		"settings",
		&serde_json::json!([
			{"key": "theme", "value": {"dark": true}},
			{"key": "langs", "value": ["en", "ja"], "locked": false}
		]),
	);
	fixture_dir.write_schema("CREATE TABLE users (id INT);");

	let importer = FixtureImporter::new(Arc::new(ImportCache::new()));
	let parsed = importer.prepare(fixture_dir.path()).await.unwrap();

	let tables: Vec<&str> = parsed.batches.iter().map(|b| b.table()).collect();
	assert_eq!(tables, vec!["settings", "tags", "users"]);

	let settings = &parsed.batches[0];
	assert_eq!(settings.column_names(), vec!["key", "value", "locked"]);
	assert_eq!(
		settings.value(0, "value"),
		Some(&FixtureValue::Structured(serde_json::json!({"dark": true})))
	);
	assert_eq!(settings.value(0, "locked"), None);

	let tags = &parsed.batches[1];
	assert_eq!(tags.column_names(), vec!["id", "label"]);
	assert!(tags.rows().iter().all(|row| row.len() == 2));
}

#[rstest]
#[tokio::test]
async fn test_same_table_in_two_formats_is_rejected(fixture_dir: FixtureDir) {
	fixture_dir.write_yaml("users", "- id: 1\n");
	fixture_dir.write_json("users", &serde_json::json!([{"id": 2}]));

	let importer = FixtureImporter::new(Arc::new(ImportCache::new()));
	let result = importer.prepare(fixture_dir.path()).await;

	assert!(matches!(result, Err(FixtureError::DuplicateTable { .. })));
	assert!(importer.cache().loaded_tables().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_removed_file_is_still_served_from_cache(fixture_dir: FixtureDir) {
	fixture_dir.write_yaml("users", "- id: 1\n");

	let importer = FixtureImporter::new(Arc::new(ImportCache::new()));
	importer.prepare(fixture_dir.path()).await.unwrap();
	fixture_dir.remove("users.yml");

	let parsed = importer.prepare(fixture_dir.path()).await.unwrap();

	assert!(parsed.reused);
	assert_eq!(parsed.row_count(), 1);
}
