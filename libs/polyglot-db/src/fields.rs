//! Field ownership and name resolution for shared/translation entity pairs.
//!
//! Callers address fields by their bare names. A name owned by the shared
//! entity is resolved to `master__<name>`; anything else is left as-is and
//! refers to the translation entity.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use sea_orm::{EntityTrait, IdenStatic, Iterable};

use crate::entity::TranslatableEntity;
use crate::error::{Result, TranslationError};
use crate::filter::base_name;

/// Name of the relation from a translation row to its shared row.
pub const MASTER: &str = "master";

/// Alias for the shared entity's primary key.
pub const PK: &str = "pk";

/// Separator between relation, field and lookup segments of a path.
pub const SEP: &str = "__";

/// Which entity of a pair owns a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldOwner {
    Shared,
    Translation,
}

/// Immutable `{field name: owner}` table, built once per entity pair.
///
/// Shared names win when both entities declare the same column (typically
/// `id`); `pk` is always shared and `master` always belongs to the
/// translation side.
#[derive(Debug, Clone)]
pub struct FieldTable {
    owners: HashMap<String, FieldOwner>,
}

impl FieldTable {
    #[must_use]
    pub fn for_entity<E: TranslatableEntity>() -> Self {
        let mut owners = HashMap::new();
        for col in E::Column::iter() {
            owners.insert(col.as_str().to_owned(), FieldOwner::Translation);
        }
        owners.insert(MASTER.to_owned(), FieldOwner::Translation);
        for col in <E::Shared as EntityTrait>::Column::iter() {
            owners.insert(col.as_str().to_owned(), FieldOwner::Shared);
        }
        owners.insert(PK.to_owned(), FieldOwner::Shared);
        Self { owners }
    }

    #[must_use]
    pub fn owner(&self, name: &str) -> Option<FieldOwner> {
        self.owners.get(name).copied()
    }

    #[must_use]
    pub fn is_shared(&self, name: &str) -> bool {
        self.owner(name) == Some(FieldOwner::Shared)
    }

    /// Names owned by the shared entity, `pk` included, in no particular order.
    pub fn shared_names(&self) -> impl Iterator<Item = &str> {
        self.owners
            .iter()
            .filter(|(_, owner)| **owner == FieldOwner::Shared)
            .map(|(name, _)| name.as_str())
    }
}

/// Resolution cache from bare field paths to join-qualified paths.
///
/// Clones share both the table and the cache; entries are only ever added.
#[derive(Debug, Clone)]
pub struct FieldTranslator {
    table: Arc<FieldTable>,
    cache: Arc<DashMap<String, String>>,
}

impl FieldTranslator {
    #[must_use]
    pub fn new(table: Arc<FieldTable>) -> Self {
        Self {
            table,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Resolve a bare path such as `isbn` or `price__gte`.
    ///
    /// Only the first segment decides ownership, so lookups ride along:
    /// `price__gte` becomes `master__price__gte` when `price` is shared.
    #[must_use]
    pub fn resolve(&self, name: &str) -> String {
        if let Some(hit) = self.cache.get(name) {
            return hit.value().clone();
        }
        let resolved = if self.table.is_shared(base_name(name)) {
            format!("{MASTER}{SEP}{name}")
        } else {
            name.to_owned()
        };
        self.cache.insert(name.to_owned(), resolved.clone());
        resolved
    }

    /// Previously resolved path for `name`, without resolving it.
    #[must_use]
    pub fn cached(&self, name: &str) -> Option<String> {
        self.cache.get(name).map(|hit| hit.value().clone())
    }

    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Whether `other` reads and writes the same cache as `self`.
    #[must_use]
    pub fn shares_cache_with(&self, other: &FieldTranslator) -> bool {
        Arc::ptr_eq(&self.cache, &other.cache)
    }

    #[must_use]
    pub fn table(&self) -> &FieldTable {
        &self.table
    }
}

/// Lookup suffix of a field path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Exact,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    StartsWith,
    EndsWith,
    In,
    IsNull,
}

impl Lookup {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "exact" => Lookup::Exact,
            "ne" => Lookup::Ne,
            "gt" => Lookup::Gt,
            "gte" => Lookup::Gte,
            "lt" => Lookup::Lt,
            "lte" => Lookup::Lte,
            "contains" => Lookup::Contains,
            "startswith" => Lookup::StartsWith,
            "endswith" => Lookup::EndsWith,
            "in" => Lookup::In,
            "isnull" => Lookup::IsNull,
            _ => return None,
        })
    }
}

/// A resolved path split into owner, field and the raw trailing segments.
///
/// The tail is kept unparsed: whether `author__name` is a relation span or
/// `title__regex` a bad lookup depends on whether the field is a column,
/// which only the condition compiler knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef<'a> {
    pub owner: FieldOwner,
    pub field: &'a str,
    pub tail: Option<&'a str>,
}

impl<'a> FieldRef<'a> {
    /// Parse a resolved path (`title`, `master__isbn__startswith`, ...).
    ///
    /// # Errors
    /// Returns `UnknownField` for an empty field segment.
    pub fn parse(path: &'a str) -> Result<Self> {
        let (owner, rest) = match path.strip_prefix(MASTER).and_then(|r| r.strip_prefix(SEP)) {
            Some(rest) => (FieldOwner::Shared, rest),
            None => (FieldOwner::Translation, path),
        };

        let (field, tail) = match rest.split_once(SEP) {
            Some((field, tail)) => (field, Some(tail)),
            None => (rest, None),
        };
        if field.is_empty() {
            return Err(TranslationError::UnknownField(path.to_owned()));
        }

        Ok(Self { owner, field, tail })
    }

    /// Lookup named by the tail, for a field already known to be a column.
    ///
    /// # Errors
    /// - `RelationSpan` when more than one segment follows the column
    /// - `UnsupportedLookup` for an unrecognised single segment
    pub fn lookup(&self, path: &str) -> Result<Lookup> {
        match self.tail {
            None => Ok(Lookup::Exact),
            Some(tail) if tail.contains(SEP) => Err(TranslationError::RelationSpan(path.to_owned())),
            Some(tail) => Lookup::parse(tail).ok_or_else(|| TranslationError::UnsupportedLookup {
                field: self.field.to_owned(),
                lookup: tail.to_owned(),
            }),
        }
    }

    /// Map a failed column lookup: a non-column followed by more segments is
    /// an attempt to traverse a relation.
    pub(crate) fn unknown_column(&self, err: TranslationError, path: &str) -> TranslationError {
        if self.tail.is_some() {
            TranslationError::RelationSpan(path.to_owned())
        } else {
            err
        }
    }
}
