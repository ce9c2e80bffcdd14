//! Entry points bound to an entity pair.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    Value,
};

use crate::cond::shared_column;
use crate::config::TranslationConfig;
use crate::context::LanguageCtx;
use crate::entity::TranslatableEntity;
use crate::error::Result;
use crate::fields::{FieldTable, FieldTranslator, PK};
use crate::query::TranslationQuery;

/// Plain manager for the language-independent entity of a pair.
///
/// Used by [`TranslationQuery::create`] to write the shared row and to look
/// up an existing one.
pub struct SharedManager<S> {
    _entity: PhantomData<fn() -> S>,
}

impl<S> Clone for SharedManager<S> {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl<S> Default for SharedManager<S> {
    fn default() -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

impl<S> fmt::Debug for SharedManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedManager")
            .field("entity", &std::any::type_name::<S>())
            .finish()
    }
}

impl<S: EntityTrait> SharedManager<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a shared row from explicit column values.
    ///
    /// # Errors
    /// Returns `TranslationError::Db` if a value does not fit its column or
    /// the insert fails.
    pub async fn create<C>(&self, db: &C, values: Vec<(S::Column, Value)>) -> Result<S::Model>
    where
        C: ConnectionTrait,
        S::Model: IntoActiveModel<S::ActiveModel>,
        S::ActiveModel: Send,
    {
        let mut am = <S::ActiveModel as ActiveModelTrait>::default();
        for (col, value) in values {
            am.try_set(col, value)?;
        }
        Ok(am.insert(db).await?)
    }

    /// Fetch a shared row by its primary key.
    ///
    /// # Errors
    /// Returns `TranslationError::Db` if the query fails.
    pub async fn get_by_pk<C: ConnectionTrait>(&self, db: &C, pk: Value) -> Result<Option<S::Model>> {
        let col = shared_column::<S>(PK, PK)?;
        Ok(S::find()
            .filter(ColumnTrait::eq(&col, pk))
            .one(db)
            .await?)
    }
}

/// Manager for a translation entity `E`, the starting point of every query.
///
/// ```ignore
/// let books = TranslationManager::<book_translation::Entity>::new();
/// let dune = books
///     .language(&ctx, Some("de"))
///     .get(&db, Filter::field("isbn", "978-0441172719"))
///     .await?;
/// ```
pub struct TranslationManager<E: TranslatableEntity> {
    fields: Arc<FieldTable>,
    shared: SharedManager<E::Shared>,
    config: Arc<TranslationConfig>,
}

impl<E: TranslatableEntity> Clone for TranslationManager<E> {
    fn clone(&self) -> Self {
        Self {
            fields: Arc::clone(&self.fields),
            shared: self.shared.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<E: TranslatableEntity> Default for TranslationManager<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: TranslatableEntity> fmt::Debug for TranslationManager<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationManager")
            .field("entity", &std::any::type_name::<E>())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<E: TranslatableEntity> TranslationManager<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TranslationConfig::default())
    }

    /// The field table is computed here, once, and shared by every query.
    #[must_use]
    pub fn with_config(config: TranslationConfig) -> Self {
        Self {
            fields: Arc::new(FieldTable::for_entity::<E>()),
            shared: SharedManager::new(),
            config: Arc::new(config),
        }
    }

    /// Start a new, unscoped query session.
    #[must_use]
    pub fn query(&self, ctx: &LanguageCtx) -> TranslationQuery<E> {
        TranslationQuery::new(
            FieldTranslator::new(Arc::clone(&self.fields)),
            self.shared.clone(),
            ctx.clone(),
            Arc::clone(&self.config),
        )
    }

    /// Start a query session scoped to `code`, or to the context's active
    /// language when `None`.
    #[must_use]
    pub fn language(&self, ctx: &LanguageCtx, code: Option<&str>) -> TranslationQuery<E> {
        self.query(ctx).language(code)
    }

    /// The translation entity this manager targets.
    #[must_use]
    pub fn translations_model(&self) -> E {
        E::default()
    }

    #[must_use]
    pub fn shared_manager(&self) -> &SharedManager<E::Shared> {
        &self.shared
    }

    #[must_use]
    pub fn fields(&self) -> &FieldTable {
        &self.fields
    }

    #[must_use]
    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }
}
