//! Composite journey key parsing.
//!
//! Raw records identify a stop visit with a single string of the form
//! `<base_id>-<departure_code>-<stop_number>`. The base id may itself contain
//! dashes (including a leading one), so the key is split from the right and
//! only the last two fields are taken apart.

use chrono::{NaiveDate, NaiveDateTime};

use crate::core::domain::JourneyId;

/// Length of a `YYMMDDHHmm` departure code.
pub const DEPARTURE_CODE_LEN: usize = 10;

/// The three fields of a composite key.
///
/// Every field is `None` when the key does not have three `-`-separated
/// fields. A present `departure_code` is kept verbatim even if it does not
/// parse as a timestamp; [`ParsedJourneyKey::journey_id`] decides usability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedJourneyKey {
    pub base_id: Option<String>,
    pub departure_code: Option<String>,
    pub stop_number: Option<u32>,
}

impl ParsedJourneyKey {
    /// Builds a key from already exploded columns.
    pub fn from_parts(
        base_id: Option<&str>,
        departure_code: Option<&str>,
        stop_number: Option<&str>,
    ) -> Self {
        Self {
            base_id: base_id.filter(|b| !b.is_empty()).map(str::to_string),
            departure_code: departure_code.map(|c| c.trim().to_string()),
            stop_number: stop_number.and_then(parse_stop_number),
        }
    }

    /// Scheduled departure decoded from the departure code.
    pub fn scheduled_departure(&self) -> Option<NaiveDateTime> {
        self.departure_code.as_deref().and_then(parse_departure_code)
    }

    /// Grouping key, or `None` when the base id or departure is unusable.
    pub fn journey_id(&self) -> Option<JourneyId> {
        let base_id = self.base_id.as_ref()?;
        let departure = self.scheduled_departure()?;
        Some(JourneyId::new(base_id.clone(), departure))
    }

    /// A key is usable for windowed computation only when all three parts parse.
    pub fn is_valid(&self) -> bool {
        self.stop_number.is_some() && self.journey_id().is_some()
    }
}

/// Splits a composite key from the right into base id, departure code and stop number.
///
/// # Examples
///
/// ```
/// use rail_features::parsing::journey_id::split_journey_key;
///
/// let key = split_journey_key("-7286928778-2407161544-12");
/// assert_eq!(key.base_id.as_deref(), Some("-7286928778"));
/// assert_eq!(key.departure_code.as_deref(), Some("2407161544"));
/// assert_eq!(key.stop_number, Some(12));
///
/// let broken = split_journey_key("no-dashes");
/// assert!(broken.base_id.is_none() && broken.stop_number.is_none());
/// ```
pub fn split_journey_key(raw: &str) -> ParsedJourneyKey {
    let mut fields = raw.trim().rsplitn(3, '-');
    let stop = fields.next();
    let code = fields.next();
    let base = fields.next();

    match (base, code, stop) {
        (Some(base), Some(code), Some(stop)) => ParsedJourneyKey::from_parts(Some(base), Some(code), Some(stop)),
        _ => ParsedJourneyKey::default(),
    }
}

/// Decodes a `YYMMDDHHmm` departure code, assuming the century is 2000.
///
/// Returns `None` for codes of the wrong length, with non-digit content, or
/// naming an impossible calendar date.
pub fn parse_departure_code(code: &str) -> Option<NaiveDateTime> {
    if code.len() != DEPARTURE_CODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let field = |range: std::ops::Range<usize>| code[range].parse::<u32>().ok();
    let year = 2000 + field(0..2)? as i32;
    let month = field(2..4)?;
    let day = field(4..6)?;
    let hour = field(6..8)?;
    let minute = field(8..10)?;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}

/// Parses a stop number, accepting float renderings such as `"3.0"`.
pub fn parse_stop_number(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<u32>() {
        return Some(value);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 && value.fract() == 0.0 => {
            Some(value as u32)
        }
        _ => None,
    }
}
