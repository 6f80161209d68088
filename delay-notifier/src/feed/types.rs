//! Schedule feed DTOs.
//!
//! These types map to the JSON document carried inside the feed's XML
//! envelope. The document is an XML-to-JSON conversion, so it has the usual
//! quirks: numbers arrive as strings, a one-element list arrives as a bare
//! object, and an empty list arrives as `null`, `""` or not at all. The
//! deserializers here absorb those quirks so the filter sees plain vectors.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Top level of the schedule document.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleDocument {
    #[serde(rename = "STATION")]
    pub station: StationSchedule,
}

/// Departures at one station.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationSchedule {
    /// Station code echoed by the feed.
    #[serde(rename = "STATION_2CHAR", default)]
    pub code: Option<String>,

    /// Station display name echoed by the feed.
    #[serde(rename = "STATIONNAME", default)]
    pub name: Option<String>,

    /// Trains departing this station, in feed order.
    #[serde(rename = "ITEMS", default, deserialize_with = "items_list")]
    pub items: Vec<TrainItem>,
}

/// One train on the departure board.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainItem {
    #[serde(rename = "TRAIN_ID", default)]
    pub train_id: String,

    /// Free-text status, e.g. "On Time", "in 5 Min", "Canceled".
    #[serde(rename = "STATUS", default)]
    pub status: String,

    /// Seconds behind schedule.
    #[serde(rename = "SEC_LATE", default, deserialize_with = "lenient_seconds")]
    pub seconds_late: i64,

    /// Scheduled departure from this station, as the feed formats it.
    #[serde(rename = "SCHED_DEP_DATE", default)]
    pub scheduled_departure: Option<String>,

    /// Calling points in travel order.
    #[serde(rename = "STOPS", default, deserialize_with = "stops_list")]
    pub stops: Vec<Stop>,
}

impl TrainItem {
    /// Whether the status text says the train is canceled.
    pub fn is_canceled(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("canceled")
    }
}

/// A calling point of a train.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Stop {
    #[serde(rename = "NAME", default)]
    pub name: String,

    /// Whether the train has already left this stop.
    #[serde(rename = "DEPARTED", default, deserialize_with = "yes_no")]
    pub departed: bool,
}

impl Stop {
    /// Compare this stop's name against a canonical (lowercase) name.
    pub fn is_named(&self, canonical: &str) -> bool {
        self.name.trim().to_lowercase() == canonical
    }
}

/// A list that the feed may flatten to a single object.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(v: OneOrMany<T>) -> Self {
        match v {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Unwrap `{"<key>": [...]}` containers, treating blank containers as empty.
fn wrapped_list<'de, D, T>(deserializer: D, key: &str) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    let inner = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(Vec::new()),
        Some(Value::Object(mut map)) => map.remove(key),
        Some(other) => {
            return Err(de::Error::custom(format!(
                "expected an object holding {key}, got {other}"
            )));
        }
    };

    match inner {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(Vec::new()),
        Some(value) => serde_json::from_value::<OneOrMany<T>>(value)
            .map(Vec::from)
            .map_err(de::Error::custom),
    }
}

fn items_list<'de, D>(deserializer: D) -> Result<Vec<TrainItem>, D::Error>
where
    D: Deserializer<'de>,
{
    wrapped_list(deserializer, "ITEM")
}

fn stops_list<'de, D>(deserializer: D) -> Result<Vec<Stop>, D::Error>
where
    D: Deserializer<'de>,
{
    wrapped_list(deserializer, "STOP")
}

/// Accept seconds as a JSON number or a numeric string; blank means zero.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| de::Error::custom(format!("SEC_LATE out of range: {n}"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(0),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("SEC_LATE is not a number: {s:?}"))),
        Some(other) => Err(de::Error::custom(format!(
            "SEC_LATE has unexpected type: {other}"
        ))),
    }
}

fn yes_no<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Ok(s.trim().eq_ignore_ascii_case("YES")),
        Some(Value::Bool(b)) => Ok(b),
        _ => Ok(false),
    }
}
