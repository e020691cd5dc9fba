//! SeaORM binding for `datatables-core`.
//!
//! Compiles the predicate AST into `sea_orm::Condition`, applies grid sort and
//! paging to a `Select<E>`, and exposes [`SeaOrmSource`] so a
//! [`DataTablesRepository`](datatables_core::DataTablesRepository) can serve
//! grid requests straight from an entity table.
//!
//! # Features
//! - `pg`, `sqlite`: enable SeaORM's SQLx backends (`sqlite` by default)
//!
//! Text search over non-string columns casts them with `CAST(.. AS TEXT)`,
//! which MySQL rejects, so no MySQL backend is offered.
//!
//! # Example
//! ```rust,ignore
//! use datatables_core::DataTablesRepository;
//! use datatables_db::{FieldKind, FieldMap, SeaOrmSource};
//!
//! let fields = FieldMap::<person::Entity>::new()
//!     .insert("name", person::Column::Name, FieldKind::String)
//!     .insert("age", person::Column::Age, FieldKind::I64);
//! let repo = DataTablesRepository::new(SeaOrmSource::new(db.clone(), fields));
//!
//! let output = repo.find_all(&input).await; // never fails; see `output.error`
//! ```

pub mod fields;
pub mod filter;
pub mod order;
pub mod source;

pub use fields::{Field, FieldKind, FieldMap};
pub use filter::{expr_to_condition, BuildError, BuildResult, FilterExt};
pub use order::{OrderExt, PageableExt};
pub use source::SeaOrmSource;
