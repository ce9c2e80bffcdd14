use sea_orm::{EntityTrait, RelationDef};

/// Defines the contract for translation entities: per-language rows that
/// point back to exactly one row of a shared entity.
///
/// Every translation entity carries two mandatory columns:
/// - a foreign key to the shared row (`master_col()`)
/// - the language the row represents (`language_col()`)
///
/// At most one translation row per (shared row, language) is assumed; the
/// schema is expected to enforce it.
///
/// # Example (Manual Implementation)
/// ```rust,ignore
/// impl TranslatableEntity for book_translation::Entity {
///     type Shared = book::Entity;
///
///     fn master_col() -> Self::Column {
///         book_translation::Column::MasterId
///     }
///     fn language_col() -> Self::Column {
///         book_translation::Column::LanguageCode
///     }
///     fn master_relation() -> RelationDef {
///         <Self as Related<book::Entity>>::to()
///     }
/// }
/// ```
///
/// # Example (Using Derive Macro)
/// ```rust,ignore
/// use polyglot_db::Translatable;
///
/// #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Translatable)]
/// #[sea_orm(table_name = "book_translations")]
/// #[translatable(shared = "super::book::Entity")]
/// pub struct Model {
///     #[sea_orm(primary_key)]
///     pub id: i32,
///     pub master_id: i32,
///     pub language_code: String,
///     pub title: String,
/// }
/// ```
pub trait TranslatableEntity: EntityTrait {
    /// The entity holding language-independent fields.
    type Shared: EntityTrait;

    /// Column holding the foreign key to the shared row.
    fn master_col() -> Self::Column;

    /// Column holding the language code of this translation row.
    fn language_col() -> Self::Column;

    /// Join from this entity to the shared entity.
    fn master_relation() -> RelationDef;
}
