//! Decoding of the `citydata` JSON document into a [`CongestionRecord`].
//!
//! Field access mirrors a lenient tree walk: a missing or `null` text field
//! reads as an empty string, numbers are rendered as text, a list that is not
//! an array reads as empty, and an entry that is not an object reads as all
//! defaults. Only three things are fatal: invalid JSON, a missing `CITYDATA`
//! object, and a forecast timestamp that is present but not exactly in
//! `yyyy-MM-dd HH:mm` form. Forecast entries with no timestamp are skipped.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::{error::CongestionError, model::CongestionRecord};

const FORECAST_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Default, Deserialize)]
struct CityData {
    #[serde(rename = "AREA_NM", default, deserialize_with = "text")]
    area_name: String,
    #[serde(rename = "LIVE_PPLTN_STTS", default, deserialize_with = "list")]
    live_status: Vec<LiveStatus>,
    #[serde(rename = "ROAD_TRAFFIC_STTS", default, deserialize_with = "object")]
    road_traffic: Option<RoadTraffic>,
}

#[derive(Debug, Default, Deserialize)]
struct LiveStatus {
    #[serde(rename = "PPLTN_TIME", default, deserialize_with = "text")]
    population_time: String,
    #[serde(rename = "AREA_CONGEST_LVL", default, deserialize_with = "text")]
    congest_level: String,
    #[serde(rename = "AREA_CONGEST_MSG", default, deserialize_with = "text")]
    congest_msg: String,
    #[serde(rename = "FCST_PPLTN", default, deserialize_with = "list")]
    forecast: Vec<ForecastEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct ForecastEntry {
    #[serde(rename = "FCST_TIME", default, deserialize_with = "text")]
    time: String,
    #[serde(rename = "FCST_CONGEST_LVL", default, deserialize_with = "text")]
    congest_level: String,
}

#[derive(Debug, Default, Deserialize)]
struct RoadTraffic {
    #[serde(rename = "AVG_ROAD_DATA", default, deserialize_with = "present")]
    average: Option<RoadSummary>,
}

#[derive(Debug, Default, Deserialize)]
struct RoadSummary {
    #[serde(rename = "ROAD_MSG", default, deserialize_with = "text")]
    message: String,
    #[serde(rename = "ROAD_TRAFFIC_IDX", default, deserialize_with = "text")]
    index: String,
}

/// Decode `raw_json` and check that it describes `expected_area_name`.
///
/// The returned record has unknown coordinates; enrichment happens in the
/// caller.
pub fn parse(
    raw_json: &str,
    expected_area_name: &str,
) -> Result<CongestionRecord, CongestionError> {
    let root: Value = serde_json::from_str(raw_json).map_err(|e| {
        error!(error = %e, "Error processing JSON data");
        CongestionError::ParseFailed
    })?;

    let city = match root.get("CITYDATA") {
        Some(city) if city.is_object() => city,
        _ => {
            error!("Invalid JSON structure: missing or invalid 'CITYDATA' field");
            return Err(CongestionError::InvalidJsonStructure);
        }
    };

    debug!("Parsing CITYDATA as object");

    let reported = city.get("AREA_NM").map(as_text).unwrap_or_default();
    let expected = expected_area_name.trim();
    if reported != expected {
        error!(reported = %reported, expected, "Seoul API returned data for a different area");
        return Err(CongestionError::FetchFailed);
    }

    build_record(lenient(city))
}

fn build_record(city: CityData) -> Result<CongestionRecord, CongestionError> {
    let CityData { area_name, live_status, road_traffic } = city;

    // The API sends a single live entry in practice; if several arrive the last one wins.
    let record = live_status.into_iter().try_fold(
        CongestionRecord::new(area_name),
        |record, live| -> Result<CongestionRecord, CongestionError> {
            let (forecast_times, forecast_congestions) = forecast_series(live.forecast)?;
            Ok(CongestionRecord {
                population_time: live.population_time,
                area_congest_level: live.congest_level,
                area_congest_msg: live.congest_msg,
                forecast_times,
                forecast_congestions,
                ..record
            })
        },
    )?;

    let (road_congest_msg, road_congest_idx) = match road_traffic.and_then(|road| road.average) {
        Some(summary) => (Some(summary.message), Some(summary.index)),
        None => (None, None),
    };

    Ok(CongestionRecord { road_congest_msg, road_congest_idx, ..record })
}

fn forecast_series(
    entries: Vec<ForecastEntry>,
) -> Result<(Vec<String>, Vec<String>), CongestionError> {
    let mut times = Vec::with_capacity(entries.len());
    let mut levels = Vec::with_capacity(entries.len());

    for entry in entries {
        if entry.time.is_empty() {
            warn!(congest_level = %entry.congest_level, "Invalid forecast time, skipping entry");
            continue;
        }

        times.push(time_of_day(&entry.time)?);
        levels.push(entry.congest_level);
    }

    Ok((times, levels))
}

/// `"2024-01-01 09:00"` -> `"09:00:00"`. A malformed timestamp fails the whole parse.
///
/// chrono accepts single-digit fields and extra whitespace, so the parsed value
/// must format back to exactly the input.
fn time_of_day(raw: &str) -> Result<String, CongestionError> {
    match NaiveDateTime::parse_from_str(raw, FORECAST_TIME_FORMAT) {
        Ok(dt) if dt.format(FORECAST_TIME_FORMAT).to_string() == raw => {
            Ok(dt.time().format(TIME_OF_DAY_FORMAT).to_string())
        }
        Ok(_) => {
            error!(raw, "Forecast time is not in yyyy-MM-dd HH:mm layout");
            Err(CongestionError::ParseFailed)
        }
        Err(e) => {
            error!(error = %e, raw, "Failed to parse forecast time");
            Err(CongestionError::ParseFailed)
        }
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Objects decode field by field; anything else becomes `T::default()`.
fn lenient<T: DeserializeOwned + Default>(value: &Value) -> T {
    if value.is_object() {
        // every field is read through a tolerant helper, so this only falls
        // back to the default for shapes serde itself rejects
        T::deserialize(value).unwrap_or_default()
    } else {
        T::default()
    }
}

fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| as_text(&value))
}

/// Array items decoded leniently; any non-array reads as empty.
fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.iter().map(lenient::<T>).collect(),
        _ => Vec::new(),
    })
}

/// `Some` only for an object; any other value reads as absent.
fn object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.is_object().then(|| lenient(&value)))
}

/// `Some` for any non-null value; non-objects read as all defaults.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok((!value.is_null()).then(|| lenient(&value)))
}
