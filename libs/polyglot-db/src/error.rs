/// Errors produced by the translation-aware query layer.
#[derive(thiserror::Error, Debug)]
pub enum TranslationError {
    /// The caller combined arguments in a way that has no single meaning.
    #[error("usage error: {0}")]
    Usage(String),

    /// A single-row lookup matched no rows.
    #[error("{0} matching query does not exist")]
    NotFound(String),

    /// A single-row lookup matched more than one row.
    #[error("get() returned more than one {model} -- it returned {count}")]
    MultipleResults { model: String, count: usize },

    /// The operation has no defined meaning on field-split models.
    #[error("{0}() is not implemented for translated querysets")]
    Unsupported(&'static str),

    /// The field name exists on neither the shared nor the translation entity.
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("unsupported lookup '{lookup}' on field '{field}'")]
    UnsupportedLookup { field: String, lookup: String },

    /// Field paths may cross the shared join once, never further.
    #[error("field path '{0}' spans more than one relation")]
    RelationSpan(String),

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: &'static str },

    /// A joined row came back without its shared side.
    #[error("translation row has no shared row")]
    MissingShared,

    /// Database error reported by the underlying executor.
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    #[error("configuration error: {0}")]
    Config(Box<figment::Error>),
}

impl From<figment::Error> for TranslationError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

/// Library-local result type.
pub type Result<T> = std::result::Result<T, TranslationError>;
