//! Grid query adapter.
//!
//! [`DataTablesRepository`] wraps an [`EntitySource`] (any backend able to
//! count and page rows under a predicate) and turns one grid request into one
//! response envelope. It never fails: errors end up in
//! [`DataTablesOutput::error`] so the grid can render them.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::ast::Expr;
use crate::config::DataTablesConfig;
use crate::error::Result;
use crate::mapping::{DataTablesInput, DataTablesOutput};
use crate::page::{Page, Pageable};
use crate::translate;

/// Data-access port required by the adapter.
///
/// `None` as filter means every row. Implementations run on whatever
/// connection or transaction they were built with.
#[async_trait]
pub trait EntitySource: Send + Sync {
    type Item: Send;

    async fn count(&self, filter: Option<&Expr>) -> Result<u64>;

    /// Rows matching `filter`, ordered and sliced by `pageable`.
    /// [`Page::total`] counts every matching row, not only the slice.
    async fn find_page(&self, filter: Option<&Expr>, pageable: &Pageable)
        -> Result<Page<Self::Item>>;
}

#[async_trait]
impl<S: EntitySource + ?Sized> EntitySource for std::sync::Arc<S> {
    type Item = S::Item;

    async fn count(&self, filter: Option<&Expr>) -> Result<u64> {
        (**self).count(filter).await
    }

    async fn find_page(
        &self,
        filter: Option<&Expr>,
        pageable: &Pageable,
    ) -> Result<Page<Self::Item>> {
        (**self).find_page(filter, pageable).await
    }
}

pub struct DataTablesRepository<S> {
    source: S,
    config: DataTablesConfig,
}

impl<S: EntitySource> DataTablesRepository<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            config: DataTablesConfig::default(),
        }
    }

    /// Fails with [`Error::InvalidConfig`](crate::Error::InvalidConfig) when
    /// `config` does not validate.
    pub fn with_config(source: S, config: DataTablesConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { source, config })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    pub fn config(&self) -> &DataTablesConfig {
        &self.config
    }

    pub async fn find_all(&self, input: &DataTablesInput) -> DataTablesOutput<S::Item> {
        self.find_all_filtered(input, None, None).await
    }

    /// `additional` narrows the filtered rows only.
    pub async fn find_all_with(
        &self,
        input: &DataTablesInput,
        additional: Option<Expr>,
    ) -> DataTablesOutput<S::Item> {
        self.find_all_filtered(input, additional, None).await
    }

    /// `pre_filter` restricts the baseline: it applies to `recordsTotal` as
    /// well as to the filtered rows.
    #[instrument(
        name = "datatables.find_all",
        skip_all,
        fields(draw = input.draw, start = input.start, length = input.length)
    )]
    pub async fn find_all_filtered(
        &self,
        input: &DataTablesInput,
        additional: Option<Expr>,
        pre_filter: Option<Expr>,
    ) -> DataTablesOutput<S::Item> {
        let mut output = DataTablesOutput::new(input.draw);

        if let Err(e) = self.fill(&mut output, input, additional, pre_filter).await {
            warn!(error = %e, "DataTables query failed");
            output.records_filtered = 0;
            output.error = Some(e);
        }

        output
    }

    async fn fill(
        &self,
        output: &mut DataTablesOutput<S::Item>,
        input: &DataTablesInput,
        additional: Option<Expr>,
        pre_filter: Option<Expr>,
    ) -> Result<()> {
        let records_total = self.source.count(pre_filter.as_ref()).await?;
        if records_total == 0 {
            debug!("No records under pre-filter; skipping data query");
            return Ok(());
        }
        output.records_total = records_total;

        let pageable = translate::pageable(input, &self.config)?;
        let filter = translate::search_predicate(input, &self.config)
            .and(additional)
            .and(pre_filter);

        let page = self.source.find_page(filter.as_ast(), &pageable).await?;
        debug!(
            records_total,
            records_filtered = page.total,
            rows = page.items.len(),
            "DataTables page fetched"
        );

        output.records_filtered = page.total;
        output.data = page.items;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mapping::Column;
    use crate::page::SortDir;
    use std::sync::{Arc, Mutex};
    use tracing_test::traced_test;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Count(Option<Expr>),
        FindPage(Option<Expr>, Pageable),
    }

    /// Canned source recording what the adapter asks for.
    #[derive(Default)]
    struct MockSource {
        total: u64,
        page: Vec<u32>,
        page_total: u64,
        fail_count: bool,
        fail_page: bool,
        calls: Mutex<Vec<Call>>,
    }

    impl MockSource {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EntitySource for MockSource {
        type Item = u32;

        async fn count(&self, filter: Option<&Expr>) -> Result<u64> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Count(filter.cloned()));
            if self.fail_count {
                return Err(Error::Db("connection reset".into()));
            }
            Ok(self.total)
        }

        async fn find_page(
            &self,
            filter: Option<&Expr>,
            pageable: &Pageable,
        ) -> Result<Page<u32>> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::FindPage(filter.cloned(), pageable.clone()));
            if self.fail_page {
                return Err(Error::Db("relation \"people\" does not exist".into()));
            }
            Ok(Page::new(self.page.clone(), self.page_total))
        }
    }

    fn input() -> DataTablesInput {
        DataTablesInput::new(7)
            .with_page(0, 2)
            .with_column(Column::new("name"))
            .with_column(Column::new("city").not_searchable())
    }

    #[tokio::test]
    async fn fills_counts_and_rows() {
        let repo = DataTablesRepository::new(MockSource {
            total: 10,
            page: vec![1, 2],
            page_total: 3,
            ..Default::default()
        });

        let out = repo
            .find_all(&input().with_column(Column::new("age").with_search("ann")))
            .await;

        assert_eq!(out.draw, 7);
        assert_eq!(out.records_total, 10);
        assert_eq!(out.records_filtered, 3);
        assert_eq!(out.data, vec![1, 2]);
        assert!(!out.is_error());
    }

    #[tokio::test]
    async fn zero_total_short_circuits() {
        let repo = DataTablesRepository::new(MockSource::default());
        let pre = Expr::field("tenant").equals("none");

        let out = repo
            .find_all_filtered(&input().with_search("x"), None, Some(pre.clone()))
            .await;

        assert_eq!(out.draw, 7);
        assert_eq!(out.records_total, 0);
        assert_eq!(out.records_filtered, 0);
        assert!(out.data.is_empty());
        assert!(out.error.is_none());
        assert_eq!(repo.source().calls(), vec![Call::Count(Some(pre))]);
    }

    #[tokio::test]
    async fn page_failure_is_folded_into_output() {
        let repo = DataTablesRepository::new(MockSource {
            total: 4,
            page_total: 4,
            fail_page: true,
            ..Default::default()
        });

        let out = repo.find_all(&input()).await;

        assert_eq!(out.draw, 7);
        assert_eq!(out.records_total, 4);
        assert_eq!(out.records_filtered, 0);
        assert!(out.data.is_empty());
        assert!(out.is_error());
        assert!(matches!(out.error, Some(Error::Db(_))));
    }

    #[tokio::test]
    async fn count_failure_is_folded_into_output() {
        let repo = DataTablesRepository::new(MockSource {
            fail_count: true,
            ..Default::default()
        });

        let out = repo.find_all(&input()).await;

        assert_eq!(out.draw, 7);
        assert_eq!(out.records_total, 0);
        assert_eq!(out.records_filtered, 0);
        assert_eq!(out.error, Some(Error::Db("connection reset".into())));
    }

    #[tokio::test]
    async fn invalid_length_reports_error_after_total() {
        let repo = DataTablesRepository::new(MockSource {
            total: 5,
            ..Default::default()
        });

        let out = repo.find_all(&input().with_page(0, -3)).await;

        assert_eq!(out.draw, 7);
        assert_eq!(out.records_total, 5);
        assert_eq!(out.records_filtered, 0);
        assert!(matches!(out.error, Some(Error::InvalidRequest(_))));
        assert_eq!(repo.source().calls().len(), 1);
    }

    #[tokio::test]
    async fn combines_search_additional_and_pre_filter() {
        let repo = DataTablesRepository::new(MockSource {
            total: 10,
            page_total: 1,
            page: vec![9],
            ..Default::default()
        });
        let additional = Expr::field("active").equals(true);
        let pre = Expr::field("tenant").equals("acme");

        let req = input()
            .with_search("Ann")
            .with_order(1, SortDir::Desc)
            .with_order(5, SortDir::Asc);
        let _ = repo
            .find_all_filtered(&req, Some(additional.clone()), Some(pre.clone()))
            .await;

        let expected_filter = Expr::contains_ignore_case("name", "Ann")
            .and(additional)
            .and(pre.clone());
        assert_eq!(
            repo.source().calls(),
            vec![
                Call::Count(Some(pre)),
                Call::FindPage(
                    Some(expected_filter),
                    Pageable::new(0, Some(2)).with_sort(vec![crate::OrderKey::desc("city")]),
                ),
            ]
        );
    }

    #[tokio::test]
    async fn absent_additional_equals_omitted() {
        let source = || MockSource {
            total: 3,
            page: vec![1],
            page_total: 1,
            ..Default::default()
        };
        let a = DataTablesRepository::new(source());
        let b = DataTablesRepository::new(source());

        let req = input().with_search("bob");
        let with_none = a.find_all_with(&req, None).await;
        let omitted = b.find_all(&req).await;

        assert_eq!(with_none, omitted);
        assert_eq!(a.source().calls(), b.source().calls());
    }

    #[tokio::test]
    #[traced_test]
    async fn failure_is_logged_within_request_span() {
        let repo = DataTablesRepository::new(MockSource {
            total: 2,
            fail_page: true,
            ..Default::default()
        });

        let _ = repo.find_all(&DataTablesInput::new(42)).await;

        assert!(logs_contain("datatables.find_all"));
        assert!(logs_contain("draw=42"));
        assert!(logs_contain("DataTables query failed"));
    }

    #[test]
    fn rejects_config_that_does_not_validate() {
        let empty_separator = DataTablesConfig {
            value_separator: String::new(),
            ..DataTablesConfig::default()
        };
        let err = DataTablesRepository::with_config(MockSource::default(), empty_separator).err();
        assert!(matches!(err, Some(Error::InvalidConfig(_))));

        let zero_page = DataTablesConfig {
            max_page_length: Some(0),
            ..DataTablesConfig::default()
        };
        let err = DataTablesRepository::with_config(MockSource::default(), zero_page).err();
        assert!(matches!(err, Some(Error::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn configured_page_cap_reaches_the_source() -> Result<()> {
        let cfg = DataTablesConfig {
            max_page_length: Some(1),
            ..DataTablesConfig::default()
        };
        let repo = DataTablesRepository::with_config(
            MockSource {
                total: 3,
                page: vec![1],
                page_total: 3,
                ..Default::default()
            },
            cfg,
        )?;
        assert_eq!(repo.config().max_page_length, Some(1));

        let _ = repo.find_all(&input().with_page(0, -1)).await;

        assert_eq!(
            repo.source().calls()[1],
            Call::FindPage(None, Pageable::new(0, Some(1)))
        );
        Ok(())
    }

    #[tokio::test]
    async fn shared_source_behind_arc() {
        let source = Arc::new(MockSource {
            total: 2,
            page: vec![4, 5],
            page_total: 2,
            ..Default::default()
        });
        let repo = DataTablesRepository::new(Arc::clone(&source));

        let out = repo.find_all(&input()).await;

        assert_eq!(out.data, vec![4, 5]);
        assert_eq!(source.calls().len(), 2);
    }
}
