//! Notification synthesis.
//!
//! Turns the anomalies found on a route into notification records. This is
//! a pure transform: the caller supplies the current time, and nothing here
//! touches the network.

use chrono::{DateTime, Duration, Local, SubsecRound};
use tracing::warn;

use crate::anomaly::Anomaly;
use crate::domain::{DEFAULT_DISPLAY_MINUTES, NewNotification};

/// Source tag carried by every notification this feed produces.
pub const TRANSIT_SOURCE: &str = "njtransit";

/// Display names of a route's endpoints, as canonical lowercase names.
#[derive(Debug, Clone, Copy)]
pub struct RouteNames<'a> {
    pub origin: &'a str,
    pub destination: &'a str,
}

/// Why a train is being reported.
pub fn reason(anomaly: &Anomaly, threshold_secs: i64) -> String {
    if anomaly.seconds_late >= threshold_secs {
        format_lateness(anomaly.seconds_late)
    } else if anomaly.is_canceled() {
        "canceled".to_string()
    } else {
        "unknown status".to_string()
    }
}

fn format_lateness(seconds_late: i64) -> String {
    match seconds_late / 60 {
        1 => "1 minute late".to_string(),
        minutes => format!("{minutes} minutes late"),
    }
}

/// Capitalise the first letter of every alphabetic run, lowercase the rest.
///
/// ```
/// use delay_notifier::synth::title_case;
///
/// assert_eq!(title_case("new york penn station"), "New York Penn Station");
/// assert_eq!(title_case("aberdeen-matawan"), "Aberdeen-Matawan");
/// ```
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;

    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }

    out
}

/// Title for one anomaly on a route.
pub fn title(anomaly: &Anomaly, names: RouteNames<'_>, threshold_secs: i64) -> String {
    let subject = match &anomaly.scheduled_departure {
        Some(departure) => format!("{departure} train"),
        None => format!("Train {}", anomaly.train_id),
    };

    format!(
        "{subject} from {} to {} is {}",
        title_case(names.origin),
        title_case(names.destination),
        reason(anomaly, threshold_secs)
    )
}

/// Build one notification per anomaly.
///
/// Every record starts at `now` (whole seconds) and stays visible for
/// `display`.
pub fn synthesize(
    anomalies: &[Anomaly],
    names: RouteNames<'_>,
    display: Duration,
    threshold_secs: i64,
    now: DateTime<Local>,
) -> Vec<NewNotification> {
    let start = now.trunc_subsecs(0).fixed_offset();
    let end = start.checked_add_signed(display).unwrap_or_else(|| {
        let requested = display;
        warn!(display = ?requested, "display duration out of range; using the default");
        start + Duration::minutes(DEFAULT_DISPLAY_MINUTES)
    });

    anomalies
        .iter()
        .map(|anomaly| NewNotification {
            title: title(anomaly, names, threshold_secs),
            message: None,
            start_time: start,
            end_time: end,
            source: Some(TRANSIT_SOURCE.to_string()),
        })
        .collect()
}
