//! Grid request → predicate + [`Pageable`].

use crate::ast::{Expr, Value};
use crate::config::DataTablesConfig;
use crate::error::{Error, Result};
use crate::mapping::{Column, DataTablesInput, ALL_ROWS};
use crate::page::{OrderKey, Pageable};
use crate::Predicate;

/// AND of the per-column filters and the global search.
pub fn search_predicate(input: &DataTablesInput, cfg: &DataTablesConfig) -> Predicate {
    column_predicate(input, cfg).and(global_predicate(input, cfg))
}

/// One filter per searchable column carrying a search value, ANDed.
pub fn column_predicate(input: &DataTablesInput, cfg: &DataTablesConfig) -> Predicate {
    Predicate::all(
        input
            .columns
            .iter()
            .filter(|c| is_searchable(c) && c.search.has_text())
            .map(|c| column_filter(c, cfg)),
    )
}

/// Global search: a text match on any searchable column.
pub fn global_predicate(input: &DataTablesInput, cfg: &DataTablesConfig) -> Predicate {
    if !input.search.has_text() {
        return Predicate::none();
    }
    let term = input.search.value.as_str();
    Predicate::any(
        input
            .columns
            .iter()
            .filter(|c| is_searchable(c))
            .map(|c| text_match(&c.data, term, cfg)),
    )
}

/// Offset, limit and sort of the requested page.
///
/// Order entries pointing past the column list or at a non-orderable column
/// are skipped.
pub fn pageable(input: &DataTablesInput, cfg: &DataTablesConfig) -> Result<Pageable> {
    let (offset, limit) = match input.length {
        ALL_ROWS => (0, None),
        l if l < ALL_ROWS => {
            return Err(Error::InvalidRequest(format!(
                "length must be -1 or non-negative, got {l}"
            )))
        }
        l => (input.start, Some(l as u64)),
    };

    let limit = match (limit, cfg.max_page_length) {
        (Some(l), Some(max)) => Some(l.min(max)),
        (None, max) => max,
        (l, None) => l,
    };

    let sort = input
        .order
        .iter()
        .filter_map(|o| {
            let column = input.columns.get(o.column)?;
            (column.orderable && !column.data.is_empty()).then(|| OrderKey {
                field: column.data.clone(),
                dir: o.dir,
            })
        })
        .collect();

    Ok(Pageable::new(offset, limit).with_sort(sort))
}

fn is_searchable(column: &Column) -> bool {
    column.searchable && !column.data.is_empty()
}

fn column_filter(column: &Column, cfg: &DataTablesConfig) -> Option<Expr> {
    let value = column.search.value.as_str();
    let field = column.data.as_str();
    let separator = cfg.value_separator.as_str();

    // An empty separator disables multi-value search.
    if !separator.is_empty() && value.contains(separator) {
        let values: Vec<&str> = value
            .split(separator)
            .filter(|v| !v.is_empty())
            .collect();
        if values.is_empty() {
            return None;
        }
        let bools: Option<Vec<bool>> = values.iter().map(|v| parse_bool(v)).collect();
        return Some(match bools {
            Some(bools) => Expr::field(field).is_in(bools),
            None => Expr::field(field).is_in(values),
        });
    }

    Some(match parse_bool(value) {
        Some(b) => Expr::field(field).equals(Value::Bool(b)),
        None => text_match(field, value, cfg),
    })
}

fn text_match(field: &str, term: &str, cfg: &DataTablesConfig) -> Expr {
    if cfg.case_insensitive {
        Expr::contains_ignore_case(field, term)
    } else {
        Expr::contains(field, term)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
