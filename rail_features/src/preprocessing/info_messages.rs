//! Normalization of free-text disruption messages.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Placeholder text for stops without a message.
pub const NO_MESSAGE: &str = "No message";

/// A period followed by a parenthesized clause, e.g. `". (Quelle: DB)"`.
static ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\s*\(.*?\)").expect("annotation pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedMessage {
    pub present: bool,
    pub text: String,
}

/// Strips trailing annotations from a message; absent messages become [`NO_MESSAGE`].
///
/// # Examples
///
/// ```
/// use rail_features::preprocessing::info_messages::normalize_message;
///
/// let message = normalize_message(Some("Bauarbeiten. (Quelle: zuginfo.nrw)"));
/// assert!(message.present);
/// assert_eq!(message.text, "Bauarbeiten");
///
/// let empty = normalize_message(None);
/// assert!(!empty.present);
/// assert_eq!(empty.text, "No message");
/// ```
pub fn normalize_message(info: Option<&str>) -> NormalizedMessage {
    match info {
        Some(text) => NormalizedMessage {
            present: true,
            text: ANNOTATION.replace_all(text, "").into_owned(),
        },
        None => NormalizedMessage {
            present: false,
            text: NO_MESSAGE.to_string(),
        },
    }
}

/// Mean arrival delay and row count per normalized message.
pub fn mean_delay_by_message<'a, I>(rows: I) -> BTreeMap<String, (f64, usize)>
where
    I: IntoIterator<Item = (&'a NormalizedMessage, Option<f64>)>,
{
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for (message, delay) in rows {
        if let Some(delay) = delay {
            let entry = sums.entry(message.text.clone()).or_insert((0.0, 0));
            entry.0 += delay;
            entry.1 += 1;
        }
    }
    for (sum, count) in sums.values_mut() {
        *sum /= *count as f64;
    }
    sums
}
