//! SeaORM-backed [`EntitySource`].
//!
//! Generic over `C: ConnectionTrait`, so it runs on a `DatabaseConnection`
//! **or** a `DatabaseTransaction`; each grid request sees whatever session the
//! caller built the source with.

use async_trait::async_trait;
use datatables_core::{ast::Expr, EntitySource, Error, Page, Pageable};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, Select};
use tracing::debug;

use crate::fields::FieldMap;
use crate::filter::FilterExt;
use crate::order::PageableExt;

pub struct SeaOrmSource<E, C>
where
    E: EntityTrait,
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
    fields: FieldMap<E>,
}

impl<E, C> SeaOrmSource<E, C>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C, fields: FieldMap<E>) -> Self {
        Self { conn, fields }
    }

    /// Hand back the connection, e.g. to commit or roll back a transaction.
    pub fn into_connection(self) -> C {
        self.conn
    }

    fn select(&self, filter: Option<&Expr>) -> Result<Select<E>, Error> {
        Ok(E::find().apply_predicate(filter, &self.fields)?)
    }
}

#[async_trait]
impl<E, C> EntitySource for SeaOrmSource<E, C>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
    E::Model: Send + Sync,
    C: ConnectionTrait + Send + Sync,
{
    type Item = E::Model;

    async fn count(&self, filter: Option<&Expr>) -> Result<u64, Error> {
        let select = self.select(filter)?;
        select
            .count(&self.conn)
            .await
            .map_err(|e| Error::Db(e.to_string()))
    }

    async fn find_page(
        &self,
        filter: Option<&Expr>,
        pageable: &Pageable,
    ) -> Result<Page<E::Model>, Error> {
        let select = self.select(filter)?;
        let paged = select.clone().apply_pageable(pageable, &self.fields)?;

        let total = select
            .count(&self.conn)
            .await
            .map_err(|e| Error::Db(e.to_string()))?;
        if total == 0 {
            return Ok(Page::empty());
        }

        let rows = paged
            .all(&self.conn)
            .await
            .map_err(|e| Error::Db(e.to_string()))?;
        debug!(total, rows = rows.len(), "Fetched page");

        Ok(Page::new(rows, total))
    }
}
