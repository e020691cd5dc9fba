//! Wire shapes of the DataTables server-side protocol.
//!
//! Field names follow the grid component: `draw`, `start`, `length`,
//! `search.value`, `order[].column`, `order[].dir`, `columns[].data`,
//! `columns[].search.value` on the way in; `draw`, `recordsTotal`,
//! `recordsFiltered`, `data`, `error` on the way out.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;
use crate::page::SortDir;

/// Page length the grid uses when the request does not say.
pub const DEFAULT_LENGTH: i64 = 10;

/// `length` value asking for every row.
pub const ALL_ROWS: i64 = -1;

#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Search {
    #[serde(default)]
    pub value: String,
    /// Accepted for wire compatibility; regular expressions are not evaluated.
    #[serde(default)]
    pub regex: bool,
}

impl Search {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            regex: false,
        }
    }

    /// True when the value holds at least one non-whitespace character.
    pub fn has_text(&self) -> bool {
        !self.value.trim().is_empty()
    }
}

#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Entity field the column displays. Array-backed grids send an index
    /// here; it is kept as text.
    #[serde(default, deserialize_with = "deserialize_data")]
    pub data: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub searchable: bool,
    #[serde(default = "default_true")]
    pub orderable: bool,
    #[serde(default)]
    pub search: Search,
}

impl Column {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            name: String::new(),
            searchable: true,
            orderable: true,
            search: Search::default(),
        }
    }

    #[must_use]
    pub fn not_searchable(mut self) -> Self {
        self.searchable = false;
        self
    }

    #[must_use]
    pub fn not_orderable(mut self) -> Self {
        self.orderable = false;
        self
    }

    #[must_use]
    pub fn with_search(mut self, value: impl Into<String>) -> Self {
        self.search = Search::new(value);
        self
    }
}

#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Index into [`DataTablesInput::columns`].
    pub column: usize,
    #[serde(default)]
    pub dir: SortDir,
}

/// Grid request.
#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTablesInput {
    /// Opaque token echoed back so the grid can drop stale responses.
    #[serde(default)]
    pub draw: u64,
    #[serde(default)]
    pub start: u64,
    /// Rows per page; [`ALL_ROWS`] disables paging.
    #[serde(default = "default_length")]
    pub length: i64,
    #[serde(default)]
    pub search: Search,
    #[serde(default)]
    pub order: Vec<Order>,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Default for DataTablesInput {
    fn default() -> Self {
        Self {
            draw: 0,
            start: 0,
            length: DEFAULT_LENGTH,
            search: Search::default(),
            order: Vec::new(),
            columns: Vec::new(),
        }
    }
}

impl DataTablesInput {
    pub fn new(draw: u64) -> Self {
        Self {
            draw,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_page(mut self, start: u64, length: i64) -> Self {
        self.start = start;
        self.length = length;
        self
    }

    #[must_use]
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn with_order(mut self, column: usize, dir: SortDir) -> Self {
        self.order.push(Order { column, dir });
        self
    }

    #[must_use]
    pub fn with_search(mut self, value: impl Into<String>) -> Self {
        self.search = Search::new(value);
        self
    }

    pub fn column_by_data(&self, data: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.data == data)
    }
}

/// Grid response envelope.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTablesOutput<T> {
    pub draw: u64,
    pub records_total: u64,
    pub records_filtered: u64,
    pub data: Vec<T>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    pub error: Option<Error>,
}

impl<T> DataTablesOutput<T> {
    /// Empty envelope echoing `draw`.
    pub fn new(draw: u64) -> Self {
        Self {
            draw,
            records_total: 0,
            records_filtered: 0,
            data: Vec::new(),
            error: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Map rows while preserving counts and error (Model->DTO mapping convenience)
    pub fn map_data<U>(self, f: impl FnMut(T) -> U) -> DataTablesOutput<U> {
        DataTablesOutput {
            draw: self.draw,
            records_total: self.records_total,
            records_filtered: self.records_filtered,
            data: self.data.into_iter().map(f).collect(),
            error: self.error,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_length() -> i64 {
    DEFAULT_LENGTH
}

fn serialize_error<S: Serializer>(error: &Option<Error>, s: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => s.collect_str(e),
        None => s.serialize_none(),
    }
}

fn deserialize_data<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Data {
        Text(String),
        Index(u64),
    }

    Ok(match Option::<Data>::deserialize(d)? {
        Some(Data::Text(s)) => s,
        Some(Data::Index(i)) => i.to_string(),
        None => String::new(),
    })
}
