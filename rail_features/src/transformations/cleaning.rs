use polars::prelude::*;

use crate::parsing::csv_parser::{has_column, text_column};
use crate::parsing::schema::output;
use crate::parsing::values::parse_flag;

/// Drop the given columns, ignoring names the frame does not have
pub fn drop_columns(df: &DataFrame, columns: &[String]) -> PolarsResult<DataFrame> {
    let mut result = df.clone();
    for name in columns {
        if has_column(&result, name) {
            result = result.drop(name)?;
        }
    }
    Ok(result)
}

/// Keep rows that are not canceled and drop the `canceled` column
///
/// Null or unreadable flags count as not canceled. Works on boolean columns
/// as well as on text columns read back from CSV.
pub fn filter_canceled(df: &DataFrame) -> PolarsResult<DataFrame> {
    let flags = text_column(df, output::CANCELED)?.ok_or_else(|| {
        PolarsError::ColumnNotFound(format!("Missing column: {}", output::CANCELED).into())
    })?;

    let keep: Vec<bool> = flags
        .iter()
        .map(|flag| !flag.as_deref().and_then(parse_flag).unwrap_or(false))
        .collect();
    let mask = BooleanChunked::from_slice("keep".into(), &keep);

    df.filter(&mask)?.drop(output::CANCELED)
}

/// Validate DataFrame schema (required columns)
pub fn validate_schema(df: &DataFrame, required_columns: &[&str]) -> (bool, Vec<String>) {
    let issues: Vec<String> = required_columns
        .iter()
        .filter(|col| !has_column(df, col))
        .map(|col| format!("Missing required column: {}", col))
        .collect();

    (issues.is_empty(), issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df!(
            "stop_index" => [1u32, 2, 3, 4],
            "canceled" => [Some(false), Some(true), None, Some(false)],
            "lat" => [Some(50.0), Some(50.1), None, Some(50.3)],
            "long" => [Some(7.0), Some(7.1), Some(7.2), Some(7.3)],
            "arrival_delay_m" => [Some(1.0), None, Some(3.0), None],
        )
        .unwrap()
    }

    #[test]
    fn test_drop_columns_ignores_unknown() {
        let df = drop_columns(&frame(), &["lat".to_string(), "nope".to_string()]).unwrap();
        assert_eq!(df.width(), 4);
        assert!(!has_column(&df, "lat"));
    }

    #[test]
    fn test_filter_canceled() {
        let df = filter_canceled(&frame()).unwrap();
        assert_eq!(df.height(), 3);
        assert!(!has_column(&df, "canceled"));
        let stops: Vec<Option<u32>> = df.column("stop_index").unwrap().u32().unwrap().into_iter().collect();
        assert_eq!(stops, vec![Some(1), Some(3), Some(4)]);
    }

    #[test]
    fn test_filter_canceled_on_text_flags() {
        let df = df!(
            "canceled" => ["False", "True", ""],
            "x" => [1, 2, 3],
        )
        .unwrap();
        let df = filter_canceled(&df).unwrap();
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_filter_canceled_requires_column() {
        let df = df!("x" => [1]).unwrap();
        assert!(filter_canceled(&df).is_err());
    }

    #[test]
    fn test_validate_schema() {
        let (ok, issues) = validate_schema(&frame(), &["stop_index", "base_id"]);
        assert!(!ok);
        assert_eq!(issues, vec!["Missing required column: base_id".to_string()]);
    }
}
