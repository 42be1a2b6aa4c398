use polars::prelude::*;

use crate::parsing::csv_parser::text_column;

/// Severity ordering of normalized info messages, least severe first.
pub const MESSAGE_ORDER: [&str; 5] = [
    "No message",
    "Information",
    "Bauarbeiten",
    "Störung",
    "Großstörung",
];

/// Rank of `value` within `order`, or `None` when it is not listed.
pub fn ordinal_code(value: &str, order: &[String]) -> Option<u32> {
    order.iter().position(|o| o == value).map(|p| p as u32)
}

/// Add `target` holding the ordinal code of every `source` value
///
/// Unknown and null values get a null code.
pub fn ordinal_encode(
    df: &DataFrame,
    source: &str,
    target: &str,
    order: &[String],
) -> PolarsResult<DataFrame> {
    let values = text_column(df, source)?.ok_or_else(|| {
        PolarsError::ColumnNotFound(format!("Missing column: {}", source).into())
    })?;

    let codes: Vec<Option<u32>> = values
        .iter()
        .map(|v| v.as_deref().and_then(|v| ordinal_code(v, order)))
        .collect();

    let mut result = df.clone();
    result.with_column(Series::new(target.into(), codes))?;
    Ok(result)
}
