// SPDX-License-Identifier: Apache-2.0

use pulse_model::{ExtractionRule, FlatRecord, Metrics, PeriodKey, RankedShape};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

pub const UNKNOWN_ENTITY: &str = "Unknown";

/// The document as a whole does not have the shape the rule expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractError(pub String);

impl Display for ExtractError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ExtractError {}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    pub rows: Vec<FlatRecord>,
    /// One reason per sub-entry that was skipped because a required field was absent.
    pub dropped: Vec<String>,
}

impl Extracted {
    fn keep(&mut self, row: FlatRecord) {
        self.rows.push(row);
    }

    fn drop_entry(&mut self, container: &str, idx: impl Display, reason: &str) {
        self.dropped.push(format!("{container}[{idx}]: {reason}"));
    }
}

/// Flattens one parsed quarter document into rows. Pure: no I/O, no logging.
pub fn extract_rows(
    rule: ExtractionRule,
    document: &Value,
    key: &PeriodKey,
) -> Result<Extracted, ExtractError> {
    let data = document
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| ExtractError("document has no `data` object".to_string()))?;

    match rule {
        ExtractionRule::NamedMetrics { list } => {
            named_metrics(required_array(data, list)?, list, "paymentInstruments", key)
        }
        ExtractionRule::DeviceRows { list } => device_rows(optional_array(data, list)?, list, key),
        ExtractionRule::DistrictMetrics { list } => {
            named_metrics(required_array(data, list)?, list, "metric", key)
        }
        ExtractionRule::DistrictMapping { map } => district_mapping(data, map, key),
        ExtractionRule::RankedEntities {
            list,
            name_key,
            shape,
        } => ranked_entities(optional_array(data, list)?, list, name_key, shape, key),
        ExtractionRule::ColumnZip { columns, rows } => column_zip(data, columns, rows, key),
    }
}

fn required_array<'a>(data: &'a Map<String, Value>, name: &str) -> Result<&'a [Value], ExtractError> {
    match data.get(name) {
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Null) | None => Err(ExtractError(format!("missing `data.{name}` list"))),
        Some(other) => Err(ExtractError(format!(
            "`data.{name}` must be a list, found {}",
            type_name(other)
        ))),
    }
}

fn optional_array<'a>(data: &'a Map<String, Value>, name: &str) -> Result<&'a [Value], ExtractError> {
    match data.get(name) {
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Null) | None => Ok(&[]),
        Some(other) => Err(ExtractError(format!(
            "`data.{name}` must be a list or null, found {}",
            type_name(other)
        ))),
    }
}

/// Variants 1 and 3: `{name, <metrics_key>: [{count, amount}, ..]}`, first element wins.
fn named_metrics(
    entries: &[Value],
    container: &str,
    metrics_key: &str,
    key: &PeriodKey,
) -> Result<Extracted, ExtractError> {
    let mut out = Extracted::default();
    for (idx, entry) in entries.iter().enumerate() {
        let Some(name) = entry.get("name").and_then(Value::as_str) else {
            out.drop_entry(container, idx, "missing `name`");
            continue;
        };
        let Some(first) = entry
            .get(metrics_key)
            .and_then(Value::as_array)
            .and_then(|m| m.first())
        else {
            out.drop_entry(container, idx, &format!("missing `{metrics_key}[0]`"));
            continue;
        };
        let count = first.get("count").and_then(as_count);
        let amount = first.get("amount").and_then(Value::as_f64);
        let (Some(count), Some(amount)) = (count, amount) else {
            out.drop_entry(container, idx, "missing numeric `count`/`amount`");
            continue;
        };
        out.keep(FlatRecord::new(
            key.clone(),
            name,
            Metrics::CountAmount { count, amount },
        ));
    }
    Ok(out)
}

fn device_rows(entries: &[Value], container: &str, key: &PeriodKey) -> Result<Extracted, ExtractError> {
    let mut out = Extracted::default();
    for (idx, entry) in entries.iter().enumerate() {
        let brand = entry.get("brand").and_then(Value::as_str);
        let count = entry.get("count").and_then(as_count);
        let percentage = entry.get("percentage").and_then(Value::as_f64);
        let (Some(brand), Some(count), Some(percentage)) = (brand, count, percentage) else {
            out.drop_entry(container, idx, "missing `brand`/`count`/`percentage`");
            continue;
        };
        out.keep(FlatRecord::new(
            key.clone(),
            brand,
            Metrics::DeviceShare { count, percentage },
        ));
    }
    Ok(out)
}

fn district_mapping(
    data: &Map<String, Value>,
    map: &str,
    key: &PeriodKey,
) -> Result<Extracted, ExtractError> {
    let districts = match data.get(map) {
        Some(Value::Object(districts)) => districts,
        Some(Value::Null) | None => {
            return Err(ExtractError(format!("missing `data.{map}` mapping")));
        }
        Some(other) => {
            return Err(ExtractError(format!(
                "`data.{map}` must be a mapping, found {}",
                type_name(other)
            )));
        }
    };
    let mut out = Extracted::default();
    for (district, values) in districts {
        let Some(values) = values.as_object() else {
            out.drop_entry(map, district, "value is not an object");
            continue;
        };
        match (
            defaulted_count(values, "registeredUsers"),
            defaulted_count(values, "appOpens"),
        ) {
            (Ok(registered_users), Ok(app_opens)) => out.keep(FlatRecord::new(
                key.clone(),
                district.as_str(),
                Metrics::Engagement {
                    registered_users,
                    app_opens,
                },
            )),
            (Err(reason), _) | (_, Err(reason)) => out.drop_entry(map, district, &reason),
        }
    }
    Ok(out)
}

fn ranked_entities(
    entries: &[Value],
    container: &str,
    name_key: &str,
    shape: RankedShape,
    key: &PeriodKey,
) -> Result<Extracted, ExtractError> {
    let mut out = Extracted::default();
    for (idx, entry) in entries.iter().enumerate() {
        let Some(obj) = entry.as_object() else {
            out.drop_entry(container, idx, "entry is not an object");
            continue;
        };
        let name = obj
            .get(name_key)
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_ENTITY);
        let metrics = match shape {
            RankedShape::NestedCountAmount => {
                let empty = Map::new();
                let metric = match obj.get("metric") {
                    Some(Value::Object(m)) => m,
                    Some(Value::Null) | None => &empty,
                    Some(other) => {
                        out.drop_entry(
                            container,
                            idx,
                            &format!("`metric` is {}", type_name(other)),
                        );
                        continue;
                    }
                };
                match (
                    defaulted_count(metric, "count"),
                    defaulted_amount(metric, "amount"),
                ) {
                    (Ok(count), Ok(amount)) => Metrics::CountAmount { count, amount },
                    (Err(reason), _) | (_, Err(reason)) => {
                        out.drop_entry(container, idx, &reason);
                        continue;
                    }
                }
            }
            RankedShape::FlatEngagement => match (
                defaulted_count(obj, "registeredUsers"),
                defaulted_count(obj, "appOpens"),
            ) {
                (Ok(registered_users), Ok(app_opens)) => Metrics::Engagement {
                    registered_users,
                    app_opens,
                },
                (Err(reason), _) | (_, Err(reason)) => {
                    out.drop_entry(container, idx, &reason);
                    continue;
                }
            },
        };
        out.keep(FlatRecord::new(key.clone(), name, metrics));
    }
    Ok(out)
}

fn column_zip(
    data: &Map<String, Value>,
    columns: &str,
    rows: &str,
    key: &PeriodKey,
) -> Result<Extracted, ExtractError> {
    let names: Vec<Option<&str>> = optional_array(data, columns)?
        .iter()
        .map(Value::as_str)
        .collect();
    let mut out = Extracted::default();
    for (idx, row) in optional_array(data, rows)?.iter().enumerate() {
        let Some(cells) = row.as_array() else {
            out.drop_entry(rows, idx, "row is not a list");
            continue;
        };
        let lookup = |wanted: &str| {
            names
                .iter()
                .zip(cells)
                .find(|(name, _)| **name == Some(wanted))
                .map(|(_, value)| value)
                .filter(|value| !value.is_null())
        };
        let latitude = lookup("lat").and_then(Value::as_f64);
        let longitude = lookup("lng").and_then(Value::as_f64);
        let count = lookup("metric").and_then(as_count);
        let label = lookup("label").and_then(Value::as_str);
        let (Some(latitude), Some(longitude), Some(count), Some(label)) =
            (latitude, longitude, count, label)
        else {
            out.drop_entry(rows, idx, "missing one of `lat`/`lng`/`metric`/`label`");
            continue;
        };
        out.keep(FlatRecord::new(
            key.clone(),
            label,
            Metrics::GeoCount {
                latitude,
                longitude,
                count,
            },
        ));
    }
    Ok(out)
}

/// Integral counts; fractional values are truncated toward zero. Values
/// outside the `i64` range are rejected rather than saturated.
fn as_count(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    if n.is_i64() || n.is_u64() {
        return n.as_i64();
    }
    // 2^63 is exactly representable; i64::MAX is not.
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    n.as_f64()
        .map(f64::trunc)
        .filter(|f| (-I64_BOUND..I64_BOUND).contains(f))
        .map(|f| f as i64)
}

fn defaulted_count(obj: &Map<String, Value>, field: &str) -> Result<i64, String> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(0),
        Some(value @ Value::Number(_)) => {
            as_count(value).ok_or_else(|| format!("`{field}` is out of the 64-bit integer range"))
        }
        Some(value) => Err(format!("`{field}` is {}, expected a number", type_name(value))),
    }
}

fn defaulted_amount(obj: &Map<String, Value>, field: &str) -> Result<f64, String> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(0.0),
        Some(value) => value
            .as_f64()
            .ok_or_else(|| format!("`{field}` is {}, expected a number", type_name(value))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
