use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderKey {
    pub field: String,
    pub dir: SortDir,
}

impl OrderKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDir::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDir::Desc,
        }
    }
}

/// Offset/limit/sort descriptor for one paged query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pageable {
    pub offset: u64,
    /// `None` fetches every remaining row.
    pub limit: Option<u64>,
    pub sort: Vec<OrderKey>,
}

impl Pageable {
    pub fn new(offset: u64, limit: Option<u64>) -> Self {
        Self {
            offset,
            limit,
            sort: Vec::new(),
        }
    }

    pub fn unpaged() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sort(mut self, sort: Vec<OrderKey>) -> Self {
        self.sort = sort;
        self
    }

    pub fn is_unpaged(&self) -> bool {
        self.offset == 0 && self.limit.is_none()
    }
}

/// One page of rows plus the number of rows matching the filter overall.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}
