// Proc-macro crate for polyglot-db translation derives
//
//! # polyglot-db-macros
//!
//! Procedural macros for the `polyglot-db` translation layer.
//!
//! ## `#[derive(Translatable)]`
//!
//! Implements `TranslatableEntity` for the `Entity` generated next to a
//! translation `Model`, binding it to its shared entity.
//!
//! ### Example
//!
//! ```ignore
//! use sea_orm::entity::prelude::*;
//! use polyglot_db::Translatable;
//!
//! #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Translatable)]
//! #[sea_orm(table_name = "book_translations")]
//! #[translatable(shared = "super::book::Entity")]
//! pub struct Model {
//!     #[sea_orm(primary_key)]
//!     pub id: i32,
//!     pub master_id: i32,
//!     pub language_code: String,
//!     pub title: String,
//! }
//! ```
//!
//! ### Attributes
//!
//! - `shared = "path::to::Entity"` (required): the shared entity
//! - `master_col = "column_name"` (default `master_id`): foreign key to the shared row
//! - `language_col = "column_name"` (default `language_code`): language column

use proc_macro::TokenStream;
use proc_macro_error2::proc_macro_error;
use syn::{DeriveInput, parse_macro_input};

mod translatable;

/// Derive macro for implementing `TranslatableEntity`.
///
/// Place this on the translation entity's `Model` struct along with a
/// `#[translatable(...)]` attribute.
///
/// The shared entity must be reachable through `sea_orm::Related`, i.e. the
/// translation entity implements `Related<SharedEntity>`.
#[proc_macro_derive(Translatable, attributes(translatable))]
#[proc_macro_error]
pub fn derive_translatable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    translatable::expand_derive_translatable(input).into()
}
