// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::Path;

use pulse_ingest::{ingest_families, ingest_family, IngestErrorCode, IngestOptions, LoadMode};
use pulse_model::Family;
use rusqlite::Connection;
use serde_json::json;
use tempfile::tempdir;

fn write_quarter(root: &Path, family: Family, state: &str, year: &str, file: &str, body: &str) {
    let dir = root.join(family.source_dir()).join(state).join(year);
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(dir.join(file), body).expect("write");
}

fn transaction_doc(entries: &[(&str, i64, f64)]) -> String {
    let list: Vec<_> = entries
        .iter()
        .map(|(name, count, amount)| {
            json!({"name": name, "paymentInstruments": [{"type": "TOTAL", "count": count, "amount": amount}]})
        })
        .collect();
    json!({"success": true, "data": {"from": 1, "to": 2, "transactionData": list}}).to_string()
}

#[test]
fn aggregated_transaction_round_trip_matches_source_sum() {
    let tmp = tempdir().expect("tmp");
    let data = tmp.path().join("data");
    write_quarter(
        &data,
        Family::AggregatedTransaction,
        "telangana",
        "2022",
        "3.json",
        &transaction_doc(&[("Recharge & bill payments", 1200, 550_000.0), ("Merchant payments", 300, 12.5)]),
    );
    write_quarter(
        &data,
        Family::AggregatedTransaction,
        "goa",
        "2021",
        "1.json",
        &transaction_doc(&[("Others", 7, 1.0)]),
    );
    let db = tmp.path().join("pulse.sqlite");
    let report = ingest_family(&IngestOptions::new(&data, &db), Family::AggregatedTransaction)
        .expect("ingest");
    assert_eq!(report.rows_inserted, 3);
    assert_eq!(report.files_loaded, 2);
    assert_eq!(report.count_sum, 1507);
    assert!(report.skipped_files.is_empty());

    let conn = Connection::open(&db).expect("open");
    let (rows, sum): (i64, i64) = conn
        .query_row(
            "SELECT COUNT(*), SUM(Transacion_count) FROM aggregated_transaction",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .expect("totals");
    assert_eq!((rows, sum), (3, 1507));

    let (year, quarter, amount): (String, i64, f64) = conn
        .query_row(
            "SELECT Year, Quarter, Transacion_amount FROM aggregated_transaction
             WHERE State='telangana' AND Transacion_type='Recharge & bill payments'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .expect("telangana row");
    assert_eq!((year.as_str(), quarter, amount), ("2022", 3, 550_000.0));
}

#[test]
fn map_user_defaults_app_opens_to_zero() {
    let tmp = tempdir().expect("tmp");
    let data = tmp.path().join("data");
    let body = json!({"data": {"hoverData": {"hyderabad district": {"registeredUsers": 100}}}});
    write_quarter(&data, Family::MapUser, "telangana", "2018", "1.json", &body.to_string());
    let db = tmp.path().join("pulse.sqlite");
    ingest_family(&IngestOptions::new(&data, &db), Family::MapUser).expect("ingest");

    let conn = Connection::open(&db).expect("open");
    let row: (String, i64, i64) = conn
        .query_row(
            "SELECT District, RegisteredUsers, AppOpens FROM map_user WHERE State='telangana'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .expect("row");
    assert_eq!(row, ("hyderabad district".to_string(), 100, 0));
}

#[test]
fn malformed_file_is_skipped_while_siblings_load() {
    let tmp = tempdir().expect("tmp");
    let data = tmp.path().join("data");
    write_quarter(
        &data,
        Family::AggregatedInsurance,
        "kerala",
        "2021",
        "1.json",
        &transaction_doc(&[("Insurance", 10, 100.0)]),
    );
    write_quarter(&data, Family::AggregatedInsurance, "kerala", "2021", "2.json", "{not json");
    write_quarter(
        &data,
        Family::AggregatedInsurance,
        "kerala",
        "2021",
        "3.json",
        &json!({"data": {"transactionData": null}}).to_string(),
    );
    let db = tmp.path().join("pulse.sqlite");
    let report =
        ingest_family(&IngestOptions::new(&data, &db), Family::AggregatedInsurance).expect("ingest");
    assert_eq!(report.files_seen, 3);
    assert_eq!(report.files_loaded, 1);
    assert_eq!(report.rows_inserted, 1);
    assert_eq!(report.skipped_files.len(), 2);
    assert!(report.skipped_files[0].reason.contains("invalid JSON"));
}

#[test]
fn missing_root_fails_only_that_family() {
    let tmp = tempdir().expect("tmp");
    let data = tmp.path().join("data");
    let body = json!({"data": {"districts": [{"name": "pune", "registeredUsers": 5, "appOpens": 9}]}});
    write_quarter(&data, Family::TopUser, "maharashtra", "2022", "4.json", &body.to_string());
    let db = tmp.path().join("pulse.sqlite");

    let report = ingest_families(
        &IngestOptions::new(&data, &db),
        &[Family::TopTransaction, Family::TopUser],
    )
    .expect("run");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].family, Family::TopTransaction);
    assert_eq!(report.failures[0].code, IngestErrorCode::MissingRoot);
    assert_eq!(report.families.len(), 1);
    assert_eq!(report.total_rows(), 1);
    assert!(!report.is_clean());
}

#[test]
fn replace_mode_does_not_duplicate_rows() {
    let tmp = tempdir().expect("tmp");
    let data = tmp.path().join("data");
    write_quarter(
        &data,
        Family::AggregatedTransaction,
        "bihar",
        "2020",
        "2.json",
        &transaction_doc(&[("Others", 5, 5.0)]),
    );
    let db = tmp.path().join("pulse.sqlite");
    let append = IngestOptions::new(&data, &db);
    ingest_family(&append, Family::AggregatedTransaction).expect("first");
    ingest_family(&append, Family::AggregatedTransaction).expect("second");
    let replace = append.clone().with_mode(LoadMode::Replace);
    ingest_family(&replace, Family::AggregatedTransaction).expect("replace");

    let conn = Connection::open(&db).expect("open");
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM aggregated_transaction", [], |r| r.get(0))
        .expect("count");
    assert_eq!(rows, 1);
}

#[test]
fn report_serializes_with_events() {
    let tmp = tempdir().expect("tmp");
    let data = tmp.path().join("data");
    let body = json!({"data": {"columns": ["lat", "lng", "metric", "label"], "data": [[1.0, 2.0, 3, "x"]]}});
    write_quarter(&data, Family::MapInsurance, "goa", "2022", "1.json", &body.to_string());
    let db = tmp.path().join("pulse.sqlite");
    let run = ingest_families(&IngestOptions::new(&data, &db), &[Family::MapInsurance]).expect("run");
    let out = tmp.path().join("reports/run.json");
    pulse_ingest::write_report_json(&out, &run).expect("write report");

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).expect("read")).expect("json");
    assert_eq!(parsed["families"][0]["family"], "map_insurance");
    assert_eq!(parsed["families"][0]["rows_inserted"], 1);
    let stages: Vec<&str> = parsed["families"][0]["events"]
        .as_array()
        .expect("events")
        .iter()
        .filter_map(|e| e["stage"].as_str())
        .collect();
    assert_eq!(stages, vec!["prepare", "walk", "extract", "persist", "finalize"]);
}

#[test]
fn overflowing_count_sum_fails_before_the_store_is_touched() {
    let tmp = tempdir().expect("tmp");
    let data = tmp.path().join("data");
    write_quarter(
        &data,
        Family::AggregatedTransaction,
        "punjab",
        "2023",
        "1.json",
        &transaction_doc(&[
            ("Peer-to-peer payments", 9_000_000_000_000_000_000, 1.0),
            ("Merchant payments", 9_000_000_000_000_000_000, 1.0),
        ]),
    );
    let db = tmp.path().join("pulse.sqlite");
    let err = ingest_family(&IngestOptions::new(&data, &db), Family::AggregatedTransaction)
        .expect_err("sum must overflow");
    assert_eq!(err.code, IngestErrorCode::Validation);
    assert!(err.message.contains("overflows"));
    assert!(!db.exists());
}
