use std::str::FromStr;

use sea_orm::{EntityTrait, Iterable, ModelTrait, PrimaryKeyToColumn, Value};

use crate::entity::TranslatableEntity;
use crate::error::{Result, TranslationError};
use crate::fields::{MASTER, PK};

type SharedModel<E> = <<E as TranslatableEntity>::Shared as EntityTrait>::Model;

/// A translation row merged with its shared row.
///
/// Built fresh for every row read through a [`TranslationQuery`] and never
/// written back; persist changes through the underlying models instead.
///
/// [`TranslationQuery`]: crate::TranslationQuery
#[derive(Debug, Clone)]
pub struct Combined<E: TranslatableEntity> {
    translation: E::Model,
    shared: SharedModel<E>,
}

impl<E: TranslatableEntity> Combined<E> {
    #[must_use]
    pub fn new(translation: E::Model, shared: SharedModel<E>) -> Self {
        Self {
            translation,
            shared,
        }
    }

    /// Build from a joined `(translation, shared)` row.
    ///
    /// # Errors
    /// Returns `MissingShared` if the join produced no shared row.
    pub fn from_row((translation, shared): (E::Model, Option<SharedModel<E>>)) -> Result<Self> {
        let shared = shared.ok_or(TranslationError::MissingShared)?;
        Ok(Self::new(translation, shared))
    }

    #[must_use]
    pub fn translation(&self) -> &E::Model {
        &self.translation
    }

    #[must_use]
    pub fn shared(&self) -> &SharedModel<E> {
        &self.shared
    }

    #[must_use]
    pub fn into_parts(self) -> (E::Model, SharedModel<E>) {
        (self.translation, self.shared)
    }

    /// Value of a field by its bare name, looked up the same way filters
    /// resolve it: shared columns (and `pk`) first, then translation columns.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        if name == PK {
            let col = <E::Shared as EntityTrait>::PrimaryKey::iter()
                .next()?
                .into_column();
            return Some(self.shared.get(col));
        }
        if let Ok(col) = <E::Shared as EntityTrait>::Column::from_str(name) {
            return Some(self.shared.get(col));
        }
        if name == MASTER {
            return Some(self.translation.get(E::master_col()));
        }
        E::Column::from_str(name)
            .ok()
            .map(|col| self.translation.get(col))
    }

    /// Language of the translation row, if stored as a string.
    #[must_use]
    pub fn language_code(&self) -> Option<String> {
        match self.translation.get(E::language_col()) {
            Value::String(Some(code)) => Some(*code),
            _ => None,
        }
    }
}
