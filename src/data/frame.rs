//! DataFrame column helpers.
//! Existence-checked extraction of typed values, plus the lazy filter and
//! grouping expressions the pages share.
//!
//! A missing column is never an error here: extraction yields an empty
//! vector and callers count nothing.
//!
//! `str_values` trims and blanks whitespace-only strings to `None` for
//! display. Filtering, distinct values and counts work on the raw cell
//! values, so `"Judo "` and `"Judo"` stay distinct there.

use polars::prelude::*;

/// Check whether a column exists.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// String values of a column; nulls and blank strings become `None`.
pub fn str_values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    raw_str_values(df, name)
        .into_iter()
        .map(|v| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect()
}

fn raw_str_values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    let Ok(column) = df.column(name) else {
        return Vec::new();
    };
    let Ok(cast) = column.cast(&DataType::String) else {
        return vec![None; df.height()];
    };
    match cast.str() {
        Ok(ca) => ca.into_iter().map(|v| v.map(str::to_string)).collect(),
        Err(_) => vec![None; df.height()],
    }
}

/// Integer values of a column. Floats are truncated, unparsable values are `None`.
pub fn i64_values(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
    let Ok(column) = df.column(name) else {
        return Vec::new();
    };
    let Ok(cast) = column.cast(&DataType::Int64) else {
        return vec![None; df.height()];
    };
    match cast.i64() {
        Ok(ca) => ca.into_iter().collect(),
        Err(_) => vec![None; df.height()],
    }
}

/// Float values of a column, NaN filtered to `None`.
pub fn f64_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    let Ok(column) = df.column(name) else {
        return Vec::new();
    };
    let Ok(cast) = column.cast(&DataType::Float64) else {
        return vec![None; df.height()];
    };
    match cast.f64() {
        Ok(ca) => ca
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect(),
        Err(_) => vec![None; df.height()],
    }
}

/// Sum of an integer column, zero when the column is missing.
pub fn sum_i64(df: &DataFrame, name: &str) -> i64 {
    i64_values(df, name).into_iter().flatten().sum()
}

/// Sorted distinct non-null values of a column.
pub fn unique_sorted(df: &DataFrame, name: &str) -> Vec<String> {
    if !has_column(df, name) {
        return Vec::new();
    }
    df.clone()
        .lazy()
        .select([col(name)
            .cast(DataType::String)
            .drop_nulls()
            .unique()
            .sort(SortOptions::default())])
        .collect()
        .map(|out| raw_str_values(&out, name).into_iter().flatten().collect())
        .unwrap_or_default()
}

/// Number of distinct non-null values in a column.
pub fn n_unique(df: &DataFrame, name: &str) -> usize {
    df.column(name)
        .and_then(|column| column.as_materialized_series().drop_nulls().n_unique())
        .unwrap_or(0)
}

/// Count rows per distinct value, ordered by count descending then value.
pub fn value_counts(df: &DataFrame, name: &str) -> Vec<(String, usize)> {
    if !has_column(df, name) {
        return Vec::new();
    }
    let counts = df
        .clone()
        .lazy()
        .filter(col(name).is_not_null())
        .group_by([col(name).cast(DataType::String)])
        .agg([len().alias("count")])
        .sort(
            ["count", name],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .collect();
    let Ok(counts) = counts else {
        return Vec::new();
    };
    raw_str_values(&counts, name)
        .into_iter()
        .zip(i64_values(&counts, "count"))
        .filter_map(|(value, n)| Some((value?, n? as usize)))
        .collect()
}

/// Expression matching rows whose `name` value is one of `allowed`.
/// Null never matches and an empty list matches nothing.
pub fn one_of(name: &str, allowed: &[String]) -> Expr {
    allowed
        .iter()
        .map(|value| col(name).cast(DataType::String).eq(lit(value.as_str())))
        .reduce(|acc, e| acc.or(e))
        .unwrap_or_else(|| lit(false))
}

/// Keep the rows where `keep` is true.
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> PolarsResult<DataFrame> {
    let mask = Series::new("mask".into(), keep);
    df.filter(mask.bool()?)
}

/// Keep the rows whose value in `name` is one of `allowed`. Null never matches.
pub fn filter_in(df: &DataFrame, name: &str, allowed: &[String]) -> PolarsResult<DataFrame> {
    if !has_column(df, name) {
        return Ok(df.clone());
    }
    df.clone().lazy().filter(one_of(name, allowed)).collect()
}

/// Keep the rows whose value in `name` equals `value`.
pub fn filter_eq(df: &DataFrame, name: &str, value: &str) -> PolarsResult<DataFrame> {
    filter_in(df, name, &[value.to_string()])
}
