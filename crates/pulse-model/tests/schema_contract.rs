// SPDX-License-Identifier: Apache-2.0

use pulse_model::{ColumnType, Family, KEY_COLUMNS};

#[test]
fn every_family_has_a_distinct_table() {
    let mut names: Vec<&str> = Family::ALL.iter().map(|f| f.schema().name).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), 9);
}

#[test]
fn every_table_leads_with_state_year_quarter() {
    for family in Family::ALL {
        let cols = family.schema().columns();
        assert_eq!(&cols[..3], &KEY_COLUMNS[..], "{family}");
        assert_eq!(cols[3].ty, ColumnType::Text, "{family} label column");
    }
}

#[test]
fn count_column_is_an_integer_metric() {
    for family in Family::ALL {
        let schema = family.schema();
        let col = schema
            .metrics
            .iter()
            .find(|c| c.name == schema.count_column)
            .unwrap_or_else(|| panic!("{family} count column missing"));
        assert_eq!(col.ty, ColumnType::Integer, "{family}");
    }
}

#[test]
fn aggregated_transaction_sql_keeps_historic_column_names() {
    let schema = Family::AggregatedTransaction.schema();
    assert_eq!(
        schema.insert_sql(),
        "INSERT INTO aggregated_transaction (State, Year, Quarter, Transacion_type, Transacion_count, Transacion_amount) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
    );
    let ddl = schema.create_table_sql();
    assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS aggregated_transaction"));
    assert!(ddl.contains("State TEXT NOT NULL"));
    assert!(ddl.contains("Transacion_amount REAL"));
}

#[test]
fn source_dirs_follow_country_state_layout() {
    for family in Family::ALL {
        assert!(
            family.source_dir().ends_with("country/india/state"),
            "{family}"
        );
    }
    assert!(Family::MapUser.source_dir().contains("/hover/"));
    assert!(!Family::MapInsurance.source_dir().contains("/hover/"));
}
