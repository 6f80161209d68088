//! XML envelope decoding.
//!
//! The schedule endpoint wraps its JSON payload in a single XML element,
//! e.g. `<string xmlns="...">{"STATION": ...}</string>`, with the JSON
//! entity-escaped or carried in a CDATA section.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::error::FeedError;
use super::types::{ScheduleDocument, StationSchedule};

/// Extract the concatenated text content of an XML envelope.
pub fn envelope_text(xml: &str) -> Result<String, FeedError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e.into_inner())),
            Event::Eof => break,
            _ => {}
        }
    }

    let text = text.trim();
    if text.is_empty() {
        return Err(FeedError::EmptyEnvelope);
    }
    Ok(text.to_string())
}

/// Decode a raw feed response into the station schedule it carries.
pub fn decode_schedule(xml: &str) -> Result<StationSchedule, FeedError> {
    let json = envelope_text(xml)?;
    let document: ScheduleDocument = serde_json::from_str(&json).map_err(|e| FeedError::Json {
        message: e.to_string(),
        body: Some(json.chars().take(500).collect()),
    })?;
    Ok(document.station)
}
