//! Ordering and offset/limit paging of a SeaORM `Select<E>`.

use datatables_core::{OrderKey, Pageable, SortDir};
use sea_orm::{sea_query::Order, ColumnTrait, EntityTrait, QueryOrder, QuerySelect};

use crate::fields::FieldMap;
use crate::filter::{BuildError, BuildResult};

const UNBOUNDED_LIMIT: u64 = i64::MAX as u64;

pub trait OrderExt<E: EntityTrait>: Sized {
    fn apply_order(self, sort: &[OrderKey], fld_map: &FieldMap<E>) -> BuildResult<Self>;
}

impl<E> OrderExt<E> for sea_orm::Select<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    fn apply_order(self, sort: &[OrderKey], fld_map: &FieldMap<E>) -> BuildResult<Self> {
        let mut query = self;

        for order_key in sort {
            let field = fld_map
                .get(&order_key.field)
                .ok_or_else(|| BuildError::UnknownField(order_key.field.clone()))?;

            let sea_order = match order_key.dir {
                SortDir::Asc => Order::Asc,
                SortDir::Desc => Order::Desc,
            };

            query = query.order_by(field.col, sea_order);
        }

        Ok(query)
    }
}

/// Sort, then slice. OFFSET needs a LIMIT on SQLite and MySQL, so an unbounded
/// page with a non-zero offset gets the largest signed limit.
pub trait PageableExt<E: EntityTrait>: Sized {
    fn apply_pageable(self, pageable: &Pageable, fld_map: &FieldMap<E>) -> BuildResult<Self>;
}

impl<E> PageableExt<E> for sea_orm::Select<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    fn apply_pageable(self, pageable: &Pageable, fld_map: &FieldMap<E>) -> BuildResult<Self> {
        let mut query = self.apply_order(&pageable.sort, fld_map)?;

        match (pageable.offset, pageable.limit) {
            (0, None) => {}
            (0, Some(limit)) => query = query.limit(limit),
            (offset, limit) => {
                query = query
                    .offset(offset)
                    .limit(limit.unwrap_or(UNBOUNDED_LIMIT));
            }
        }

        Ok(query)
    }
}
