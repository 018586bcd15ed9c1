//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Tally.
//! The Tally project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.


//! # Tally Core Tests - Schema Enforcer
//!
//! Tests for the canonical Silver column set, column order, lenient
//! coercion, and idempotence.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test schema
//! ```

use proptest::prelude::*;
use tally::{TlColumnType, TlRow, TlSchemaEnforcer, TlValue, SILVER_SCHEMA};

const CANONICAL: [&str; 15] = [
    "show_id",
    "title",
    "original_title",
    "popularity",
    "vote_average",
    "vote_count",
    "first_air_date",
    "genre_ids",
    "origin_country",
    "poster_path",
    "backdrop_path",
    "overview",
    "original_language",
    "ingestion_date",
    "data_type",
];

fn row(fields: &[(&str, TlValue)]) -> TlRow {
    fields
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

/// Tests the declared schema matches the canonical field list.
#[test]
fn test_schema_order_and_types() {
    let names: Vec<_> = SILVER_SCHEMA.iter().map(|c| c.name).collect();
    assert_eq!(names, CANONICAL);
    assert_eq!(SILVER_SCHEMA[0].column_type, TlColumnType::Int64);
    assert_eq!(SILVER_SCHEMA[7].column_type, TlColumnType::Int64List);
    assert_eq!(SILVER_SCHEMA[8].column_type, TlColumnType::Utf8List);
}

/// Tests an empty input still yields every canonical column.
#[test]
fn test_empty_input_has_all_columns() {
    let table = TlSchemaEnforcer::default().enforce(&[]);
    assert_eq!(table.column_names(), CANONICAL);
    assert_eq!(table.num_rows(), 0);
    assert!(table.is_empty());
    assert!(table.uncoerced_columns().is_empty());
}

/// Tests missing fields become null and extra fields are dropped.
#[test]
fn test_missing_filled_extra_dropped() {
    let input = row(&[
        ("title", TlValue::Text("A".into())),
        ("show_id", TlValue::Int(9)),
        ("adult", TlValue::Bool(false)),
        ("rank", TlValue::Int(1)),
    ]);
    let table = TlSchemaEnforcer::default().enforce(&[input]);

    assert_eq!(table.column_names(), CANONICAL);
    assert!(table.column("adult").is_none());
    assert_eq!(table.column("show_id").unwrap().values, vec![TlValue::Int(9)]);
    assert_eq!(table.column("overview").unwrap().values, vec![TlValue::Null]);

    let rows = table.to_rows();
    assert_eq!(rows[0].len(), 15);
}

/// Tests the coercion-succeeds path.
///
/// Convertible values take their declared type.
#[test]
fn test_convertible_values_are_coerced() {
    let input = row(&[
        ("show_id", TlValue::Text("42".into())),
        ("popularity", TlValue::Int(3)),
        ("vote_count", TlValue::Float(12.0)),
        ("original_language", TlValue::Int(1)),
        ("genre_ids", TlValue::List(vec![TlValue::Float(18.0), TlValue::Text("35".into())])),
        ("origin_country", TlValue::List(vec![TlValue::Text("US".into())])),
    ]);
    let table = TlSchemaEnforcer::default().enforce(&[input]);

    assert!(table.uncoerced_columns().is_empty());
    assert_eq!(table.column("show_id").unwrap().values, vec![TlValue::Int(42)]);
    assert_eq!(table.column("popularity").unwrap().values, vec![TlValue::Float(3.0)]);
    assert_eq!(table.column("vote_count").unwrap().values, vec![TlValue::Int(12)]);
    assert_eq!(
        table.column("original_language").unwrap().values,
        vec![TlValue::Text("1".into())]
    );
    assert_eq!(
        table.column("genre_ids").unwrap().values,
        vec![TlValue::List(vec![TlValue::Int(18), TlValue::Int(35)])]
    );
}

/// Tests the coercion-leaves-as-is path.
///
/// One bad value leaves its whole column uncoerced; other columns are cast.
#[test]
fn test_unconvertible_column_is_left_as_is() {
    let rows = vec![
        row(&[("vote_count", TlValue::Text("7".into())), ("popularity", TlValue::Int(1))]),
        row(&[("vote_count", TlValue::Text("lots".into())), ("popularity", TlValue::Int(2))]),
    ];
    let table = TlSchemaEnforcer::default().enforce(&rows);

    assert_eq!(table.uncoerced_columns(), vec!["vote_count"]);
    let votes = table.column("vote_count").unwrap();
    assert!(!votes.coerced);
    assert_eq!(
        votes.values,
        vec![TlValue::Text("7".into()), TlValue::Text("lots".into())]
    );
    assert_eq!(
        table.column("popularity").unwrap().values,
        vec![TlValue::Float(1.0), TlValue::Float(2.0)]
    );
}

/// Tests that a scalar in a list column leaves the column as-is.
#[test]
fn test_scalar_in_list_column_is_left_as_is() {
    let table = TlSchemaEnforcer::default()
        .enforce(&[row(&[("genre_ids", TlValue::Text("18,35".into()))])]);
    assert_eq!(table.uncoerced_columns(), vec!["genre_ids"]);
}

fn arb_value() -> impl Strategy<Value = TlValue> {
    let leaf = prop_oneof![
        Just(TlValue::Null),
        any::<bool>().prop_map(TlValue::Bool),
        (-1000i64..1000).prop_map(TlValue::Int),
        (-1000.0f64..1000.0).prop_map(TlValue::Float),
        "[a-z0-9. ]{0,6}".prop_map(TlValue::Text),
    ];
    leaf.prop_recursive(2, 8, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(TlValue::List)
    })
}

fn arb_rows() -> impl Strategy<Value = Vec<TlRow>> {
    let names: Vec<String> = CANONICAL
        .iter()
        .map(|n| n.to_string())
        .chain(["extra_a".to_string(), "extra_b".to_string()])
        .collect();
    prop::collection::vec(
        prop::collection::hash_map(prop::sample::select(names), arb_value(), 0..17),
        0..6,
    )
}

proptest! {
    /// Output always has the canonical columns in order, one value per row.
    #[test]
    fn prop_output_shape_is_canonical(rows in arb_rows()) {
        let table = TlSchemaEnforcer::default().enforce(&rows);
        prop_assert_eq!(table.column_names(), CANONICAL.to_vec());
        prop_assert_eq!(table.num_rows(), rows.len());
        for column in table.columns() {
            prop_assert_eq!(column.values.len(), rows.len());
        }
    }

    /// Enforcing twice gives the same table as enforcing once.
    #[test]
    fn prop_enforcement_is_idempotent(rows in arb_rows()) {
        let enforcer = TlSchemaEnforcer::default();
        let once = enforcer.enforce(&rows);
        let twice = enforcer.enforce(&once.to_rows());
        prop_assert_eq!(once, twice);
    }
}
