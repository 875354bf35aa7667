//! Row decoding and wire normalization.
//!
//! Rows come back from MySQL as [`RawRow`]s holding native values. Before a
//! row leaves the service every temporal value becomes an ISO-8601 string;
//! everything else passes through as the matching JSON scalar.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde_json::{Map, Number, Value};
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
}

/// One result row as ordered `(column, value)` pairs.
pub type RawRow = Vec<(String, RawValue)>;

pub type JsonRow = Map<String, Value>;

impl RawValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawValue::Int(i) => Some(*i),
            RawValue::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            RawValue::Null => Value::Null,
            RawValue::Int(i) => Value::Number(i.into()),
            RawValue::UInt(u) => Value::Number(u.into()),
            RawValue::Float(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
            RawValue::Text(s) => Value::String(s),
            RawValue::Bytes(b) => Value::String(String::from_utf8_lossy(&b).into_owned()),
            RawValue::DateTime(dt) => Value::String(iso_datetime(&dt)),
            RawValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            RawValue::Time(t) => Value::String(iso_time(&t)),
        }
    }
}

/// `YYYY-MM-DDTHH:MM:SS`, with microseconds only when present.
pub fn iso_datetime(dt: &NaiveDateTime) -> String {
    if dt.nanosecond() == 0 {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

fn iso_time(t: &NaiveTime) -> String {
    if t.nanosecond() == 0 {
        t.format("%H:%M:%S").to_string()
    } else {
        t.format("%H:%M:%S%.6f").to_string()
    }
}

pub fn normalize_row(row: RawRow) -> JsonRow {
    row.into_iter()
        .map(|(column, value)| (column, value.into_json()))
        .collect()
}

pub fn normalize_rows(rows: Vec<RawRow>) -> Vec<JsonRow> {
    rows.into_iter().map(normalize_row).collect()
}

/// Decode every column of a MySQL row.
pub fn decode_row(row: &MySqlRow) -> RawRow {
    row.columns()
        .iter()
        .map(|column| (column.name().to_string(), decode_column(row, column.ordinal())))
        .collect()
}

pub fn decode_column(row: &MySqlRow, index: usize) -> RawValue {
    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return RawValue::Null,
        Ok(_) => {}
        Err(_) => return RawValue::Null,
    }

    let type_name = row.column(index).type_info().name();
    let typed = match type_name {
        "DATETIME" | "TIMESTAMP" => temporal(row.try_get::<NaiveDateTime, _>(index), RawValue::DateTime),
        "DATE" => temporal(row.try_get::<NaiveDate, _>(index), RawValue::Date),
        "TIME" => temporal(row.try_get::<NaiveTime, _>(index), RawValue::Time),
        "BOOLEAN" => row.try_get::<bool, _>(index).ok().map(|b| RawValue::Int(i64::from(b))),
        name if name.ends_with("UNSIGNED") => row.try_get::<u64, _>(index).ok().map(RawValue::UInt),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            row.try_get::<i64, _>(index).ok().map(RawValue::Int)
        }
        "FLOAT" => row.try_get::<f32, _>(index).ok().map(|f| RawValue::Float(f64::from(f))),
        "DOUBLE" => row.try_get::<f64, _>(index).ok().map(RawValue::Float),
        _ => None,
    };

    typed.or_else(|| decode_fallback(row, index)).unwrap_or(RawValue::Null)
}

/// Temporal columns never fall through to text: values chrono cannot
/// represent, such as MySQL zero dates, become null.
fn temporal<T>(decoded: Result<T, sqlx::Error>, wrap: impl FnOnce(T) -> RawValue) -> Option<RawValue> {
    Some(decoded.map(wrap).unwrap_or(RawValue::Null))
}

// Try different types if the column type was not recognized
fn decode_fallback(row: &MySqlRow, index: usize) -> Option<RawValue> {
    if let Ok(s) = row.try_get::<String, _>(index) {
        Some(RawValue::Text(s))
    } else if let Ok(i) = row.try_get::<i64, _>(index) {
        Some(RawValue::Int(i))
    } else if let Ok(u) = row.try_get::<u64, _>(index) {
        Some(RawValue::UInt(u))
    } else if let Ok(f) = row.try_get::<f64, _>(index) {
        Some(RawValue::Float(f))
    } else if let Ok(b) = row.try_get::<Vec<u8>, _>(index) {
        Some(RawValue::Bytes(b))
    } else {
        row.try_get_unchecked::<String, _>(index).ok().map(RawValue::Text)
    }
}
