#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Per-language field translation for `SeaORM` entities.
//!
//! An entity is split in two: a *shared* entity with the language-independent
//! columns, and a *translation* entity with one row per (shared row, language)
//! holding the language-dependent columns plus a foreign key to the shared
//! row and a language code.
//!
//! [`TranslationManager`] lets callers query the pair as if it were one
//! entity. Field names of either side are accepted unqualified; names owned by
//! the shared entity are routed through the join (`isbn` becomes
//! `master__isbn`), reads are scoped to one language, and rows come back as
//! [`Combined`] values exposing both sides.
//!
//! ```ignore
//! use polyglot_db::{FieldValues, Filter, LanguageCtx, TranslationManager};
//!
//! let books = TranslationManager::<book_translation::Entity>::new();
//! let ctx = LanguageCtx::new("en");
//!
//! let created = books
//!     .query(&ctx)
//!     .create(&db, FieldValues::new().set("isbn", "978-0").set("title", "Dune"))
//!     .await?;
//!
//! let cheap = books
//!     .language(&ctx, Some("en"))
//!     .filter(Filter::field("price__lt", 10))
//!     .order_by(["-price", "title"])
//!     .all(&db)
//!     .await?;
//! ```
//!
//! Operations with no meaning on split entities (`exclude`, `values`,
//! `update`, ...) exist on [`TranslationQuery`] but always fail with
//! [`TranslationError::Unsupported`].

pub use sea_orm;

pub mod combined;
pub mod cond;
pub mod config;
pub mod context;
pub mod entity;
pub mod error;
pub mod fields;
pub mod filter;
pub mod manager;
pub mod query;
mod rewrite;

pub use combined::Combined;
pub use config::TranslationConfig;
pub use context::LanguageCtx;
pub use entity::TranslatableEntity;
pub use error::{Result, TranslationError};
pub use fields::{FieldOwner, FieldTable, FieldTranslator, Lookup};
pub use filter::{Connector, FieldValues, Filter, Operand};
pub use manager::{SharedManager, TranslationManager};
pub use query::{TranslationQuery, UNSUPPORTED_OPERATIONS};

#[cfg(feature = "macros")]
pub use polyglot_db_macros::Translatable;
