use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

use crate::parsing::csv_parser::text_column;

/// Split a table into one frame per distinct value of `column`
///
/// Rows with a null label are left out. Row order is kept within each part.
pub fn split_by_column(df: &DataFrame, column: &str) -> PolarsResult<BTreeMap<String, DataFrame>> {
    let labels = text_column(df, column)?.ok_or_else(|| {
        PolarsError::ColumnNotFound(format!("Missing column: {}", column).into())
    })?;

    let distinct: BTreeSet<&str> = labels.iter().flatten().map(String::as_str).collect();
    let mut parts = BTreeMap::new();
    for label in distinct {
        let keep: Vec<bool> = labels.iter().map(|l| l.as_deref() == Some(label)).collect();
        let mask = BooleanChunked::from_slice("split".into(), &keep);
        parts.insert(label.to_string(), df.filter(&mask)?);
    }
    Ok(parts)
}

/// File-name-safe form of a label: `"RE/RB Prefix"` becomes `"re_rb_prefix"`.
pub fn label_file_stem(label: &str) -> String {
    let mut stem = String::with_capacity(label.len());
    for c in label.trim().chars() {
        if c.is_alphanumeric() {
            stem.extend(c.to_lowercase());
        } else if !stem.ends_with('_') {
            stem.push('_');
        }
    }
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "unlabeled".to_string()
    } else {
        stem.to_string()
    }
}
