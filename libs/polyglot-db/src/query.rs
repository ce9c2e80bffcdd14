//! Translation-aware query builder.
//!
//! A [`TranslationQuery`] wraps a `SeaORM` select over the translation entity,
//! always inner-joined to its shared entity. Every field name passed in is
//! resolved through the session's [`FieldTranslator`], and reads are scoped to
//! a single language before they execute.
//!
//! The builder is lazy: `filter`, `order_by`, `language`, `limit` and
//! `offset` only record state. Nothing runs until `get`, `first`, `all`,
//! `stream`, `count` or `exists` is awaited.

use std::fmt;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use sea_orm::sea_query::SimpleExpr;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, IdenStatic, IntoActiveModel,
    JoinType, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, SelectTwo,
    StreamTrait, Value,
};

use crate::combined::Combined;
use crate::cond::{build_condition, order_expr, shared_column, translation_column};
use crate::config::TranslationConfig;
use crate::context::LanguageCtx;
use crate::entity::TranslatableEntity;
use crate::error::{Result, TranslationError};
use crate::fields::{FieldTranslator, MASTER, PK};
use crate::filter::{FieldValues, Filter};
use crate::manager::SharedManager;

/// Queryset operations rejected on translated entities.
pub const UNSUPPORTED_OPERATIONS: [&str; 14] = [
    "aggregate",
    "latest",
    "in_bulk",
    "delete",
    "update",
    "values",
    "values_list",
    "dates",
    "exclude",
    "complex_filter",
    "annotate",
    "reverse",
    "defer",
    "only",
];

pub struct TranslationQuery<E: TranslatableEntity> {
    translator: FieldTranslator,
    shared: SharedManager<E::Shared>,
    ctx: LanguageCtx,
    config: Arc<TranslationConfig>,
    language: Option<String>,
    filters: Vec<Filter>,
    ordering: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

/// Clones share the field translator cache; filters and scope are copied.
impl<E: TranslatableEntity> Clone for TranslationQuery<E> {
    fn clone(&self) -> Self {
        Self {
            translator: self.translator.clone(),
            shared: self.shared.clone(),
            ctx: self.ctx.clone(),
            config: Arc::clone(&self.config),
            language: self.language.clone(),
            filters: self.filters.clone(),
            ordering: self.ordering.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

impl<E: TranslatableEntity> fmt::Debug for TranslationQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationQuery")
            .field("model", &model_name::<E>())
            .field("language", &self.language)
            .field("filters", &self.filters)
            .field("ordering", &self.ordering)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

impl<E: TranslatableEntity> TranslationQuery<E> {
    pub(crate) fn new(
        translator: FieldTranslator,
        shared: SharedManager<E::Shared>,
        ctx: LanguageCtx,
        config: Arc<TranslationConfig>,
    ) -> Self {
        Self {
            translator,
            shared,
            ctx,
            config,
            language: None,
            filters: Vec::new(),
            ordering: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Scope the query to `code`, or to the context's active language.
    ///
    /// Replaces any earlier scope.
    #[must_use]
    pub fn language(mut self, code: Option<&str>) -> Self {
        let code = code.unwrap_or_else(|| self.ctx.active_language()).to_owned();
        tracing::debug!(model = %model_name::<E>(), language = %code, "Scoping query to language");
        self.language = Some(code);
        self
    }

    /// Add a filter. Field names are resolved before they are stored, so
    /// `filter(Filter::field("isbn", x))` equals a filter on `master__isbn`.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        let filter = filter.into();
        if !filter.is_empty() {
            let resolved = self.translator.rewrite(&filter);
            tracing::debug!(model = %model_name::<E>(), ?resolved, "Added filter");
            self.filters.push(resolved);
        }
        self
    }

    /// Replace the ordering. Terms are bare field names with an optional
    /// leading `-` for descending order.
    #[must_use]
    pub fn order_by<I, T>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.ordering = terms
            .into_iter()
            .map(|t| self.translator.rewrite_order_term(t.as_ref()))
            .collect();
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Current language scope, if any.
    #[must_use]
    pub fn language_code(&self) -> Option<&str> {
        self.language.as_deref()
    }

    #[must_use]
    pub fn is_language_scoped(&self) -> bool {
        self.language.is_some()
    }

    /// Resolved filters recorded so far.
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Resolved ordering terms.
    #[must_use]
    pub fn ordering(&self) -> &[String] {
        &self.ordering
    }

    #[must_use]
    pub fn translator(&self) -> &FieldTranslator {
        &self.translator
    }

    #[must_use]
    pub fn shared_manager(&self) -> &SharedManager<E::Shared> {
        &self.shared
    }

    /// Condition for the recorded filters plus the language scope.
    fn condition(&self) -> Result<sea_orm::Condition> {
        let mut cond = build_condition::<E>(&self.filters)?;
        if let Some(code) = &self.language {
            cond = cond.add(sea_orm::ColumnTrait::eq(&E::language_col(), code.as_str()));
        }
        Ok(cond)
    }

    fn joined(&self) -> Result<Select<E>> {
        Ok(E::find()
            .join(JoinType::InnerJoin, E::master_relation())
            .filter(self.condition()?))
    }

    /// The select this query executes: translation rows joined to their
    /// shared rows, filtered, ordered and sliced.
    ///
    /// # Errors
    /// Returns a `TranslationError` if a recorded filter or ordering term
    /// does not compile.
    pub fn build_select(&self) -> Result<SelectTwo<E, E::Shared>> {
        let mut select = self.joined()?;
        for term in &self.ordering {
            let (expr, order): (SimpleExpr, _) = order_expr::<E>(term)?;
            select = select.order_by(expr, order);
        }
        Ok(select
            .limit(self.limit)
            .offset(self.offset)
            .select_also(<E::Shared as Default>::default()))
    }

    /// Fetch exactly one combined row matching `filter`.
    ///
    /// A top-level `language_code = x` predicate in `filter` re-scopes the
    /// query to `x`. Without one, and without any language predicate already
    /// recorded, the query is scoped to the context's active language.
    ///
    /// # Errors
    /// - `NotFound` if no row matches
    /// - `MultipleResults` if more than one row matches
    /// - `InvalidValue` if the language predicate is not a string
    /// - `Usage` if `limit` or `offset` was set
    /// - `Db` for database failures
    pub async fn get<C: ConnectionTrait>(&self, db: &C, filter: impl Into<Filter>) -> Result<Combined<E>> {
        if self.limit.is_some() || self.offset.is_some() {
            return Err(TranslationError::Usage(
                "cannot call get() on a sliced query".to_owned(),
            ));
        }
        let language_col = E::language_col();
        let language_field = language_col.as_str();
        let mut filter = filter.into();
        let mut query = self.clone();

        match filter.take_exact(language_field) {
            Some(Value::String(Some(code))) => query = query.language(Some(code.as_str())),
            Some(_) => {
                return Err(TranslationError::InvalidValue {
                    field: language_field.to_owned(),
                    reason: "language code must be a string",
                });
            }
            None => {
                let already_scoped = query.language.is_some()
                    || filter.mentions(language_field)
                    || query.filters.iter().any(|f| f.mentions(language_field));
                if !already_scoped {
                    query = query.language(None);
                }
            }
        }
        let query = query.filter(filter);

        let cap = query.config.get_fetch_limit();
        let rows = query.build_select()?.limit(cap).all(db).await?;
        tracing::debug!(
            model = %model_name::<E>(),
            language = ?query.language,
            op = "get",
            rows = rows.len(),
            "Executed query"
        );

        let mut rows = rows.into_iter();
        match (rows.next(), rows.len()) {
            (None, _) => Err(TranslationError::NotFound(model_name::<E>())),
            (Some(row), 0) => Combined::from_row(row),
            (Some(_), rest) => Err(TranslationError::MultipleResults {
                model: model_name::<E>(),
                count: rest + 1,
            }),
        }
    }

    /// First combined row in query order, if any.
    ///
    /// # Errors
    /// Returns a `TranslationError` if the query fails to compile or execute.
    pub async fn first<C: ConnectionTrait>(&self, db: &C) -> Result<Option<Combined<E>>> {
        let row = self.build_select()?.limit(1).one(db).await?;
        tracing::debug!(model = %model_name::<E>(), language = ?self.language, op = "first", "Executed query");
        row.map(Combined::from_row).transpose()
    }

    /// All combined rows, collected eagerly.
    ///
    /// # Errors
    /// Returns a `TranslationError` if the query fails to compile or execute.
    pub async fn all<C: ConnectionTrait>(&self, db: &C) -> Result<Vec<Combined<E>>> {
        let rows = self.build_select()?.all(db).await?;
        tracing::debug!(
            model = %model_name::<E>(),
            language = ?self.language,
            op = "all",
            rows = rows.len(),
            "Executed query"
        );
        rows.into_iter().map(Combined::from_row).collect()
    }

    /// Lazily yield combined rows in the order the database returns them.
    ///
    /// Single pass: the stream is backed by one database cursor.
    ///
    /// # Errors
    /// Returns a `TranslationError` if the query fails to compile or the
    /// cursor cannot be opened; row errors are yielded by the stream.
    pub async fn stream<'a, C>(self, db: &'a C) -> Result<impl Stream<Item = Result<Combined<E>>> + 'a>
    where
        C: ConnectionTrait + StreamTrait + Send,
    {
        let select = self.build_select()?;
        tracing::debug!(model = %model_name::<E>(), language = ?self.language, op = "stream", "Opening cursor");
        let rows = select.stream(db).await?;
        Ok(rows.map(|row| Combined::from_row(row?)))
    }

    /// Number of translation rows in scope. Limit and offset are ignored.
    ///
    /// # Errors
    /// Returns a `TranslationError` if the query fails to compile or execute.
    pub async fn count<C: ConnectionTrait>(&self, db: &C) -> Result<u64>
    where
        E::Model: Sync,
    {
        let n = self.joined()?.count(db).await?;
        tracing::debug!(model = %model_name::<E>(), language = ?self.language, op = "count", n, "Executed query");
        Ok(n)
    }

    /// Whether any translation row is in scope.
    ///
    /// # Errors
    /// Returns a `TranslationError` if the query fails to compile or execute.
    pub async fn exists<C: ConnectionTrait>(&self, db: &C) -> Result<bool>
    where
        E::Model: Sync,
    {
        Ok(PaginatorTrait::exists(self.joined()?, db).await?)
    }

    /// Create a translation row, and its shared row unless `master` is given.
    ///
    /// `values` holds bare field names of either entity. Shared fields go to
    /// a new shared row; `master` (or the master column name) names an
    /// existing shared row by primary key instead. The language defaults to
    /// the query's scope, then to the context's active language.
    ///
    /// The two inserts are not atomic. Pass a transaction as `db` to make a
    /// failed translation insert roll back the shared row.
    ///
    /// # Errors
    /// - `Usage` if both `master` and shared fields are given
    /// - `NotFound` if `master` names no shared row
    /// - `UnknownField` for names on neither entity
    /// - `Db` for database failures
    pub async fn create<C>(&self, db: &C, values: FieldValues) -> Result<Combined<E>>
    where
        C: ConnectionTrait,
        E::Model: IntoActiveModel<E::ActiveModel>,
        E::ActiveModel: Send,
        <E::Shared as EntityTrait>::Model: IntoActiveModel<<E::Shared as EntityTrait>::ActiveModel>,
        <E::Shared as EntityTrait>::ActiveModel: Send,
    {
        let master_col = E::master_col();
        let master_field = master_col.as_str();
        let language_col = E::language_col();
        let language_field = language_col.as_str();
        let table = self.translator.table();

        let mut master = None;
        let mut shared_values = Vec::new();
        let mut translation_values = Vec::new();
        for (name, value) in values {
            if name == MASTER || name == master_field {
                master = Some(value);
            } else if table.is_shared(&name) {
                shared_values.push((shared_column::<E::Shared>(&name, &name)?, value));
            } else {
                translation_values.push((translation_column::<E>(&name, &name)?, name, value));
            }
        }

        let shared = match master {
            Some(_) if !shared_values.is_empty() => {
                return Err(TranslationError::Usage(
                    "cannot specify both `master` and shared fields in create()".to_owned(),
                ));
            }
            Some(pk) => self
                .shared
                .get_by_pk(db, pk)
                .await?
                .ok_or_else(|| TranslationError::NotFound(model_name::<E::Shared>()))?,
            None => self.shared.create(db, shared_values).await?,
        };
        let master_pk = shared.get(shared_column::<E::Shared>(PK, PK)?);

        let mut am = <E::ActiveModel as ActiveModelTrait>::default();
        let mut has_language = false;
        for (col, name, value) in translation_values {
            has_language |= name == language_field;
            am.try_set(col, value)?;
        }
        am.try_set(E::master_col(), master_pk)?;
        if !has_language {
            let code = self
                .language
                .as_deref()
                .unwrap_or_else(|| self.ctx.active_language());
            am.try_set(E::language_col(), Value::from(code))?;
        }

        let translation = am.insert(db).await?;
        tracing::debug!(model = %model_name::<E>(), op = "create", "Created translation row");
        Ok(Combined::new(translation, shared))
    }

    fn unsupported<T>(op: &'static str) -> Result<T> {
        tracing::warn!(model = %model_name::<E>(), op, "Rejected operation on translated query");
        Err(TranslationError::Unsupported(op))
    }

    /// Always fails with `Unsupported`.
    ///
    /// # Errors
    /// Always.
    pub fn aggregate(&self, _exprs: &[SimpleExpr]) -> Result<FieldValues> {
        Self::unsupported("aggregate")
    }

    /// Always fails with `Unsupported`.
    ///
    /// # Errors
    /// Always.
    pub fn latest(&self, _field: &str) -> Result<Combined<E>> {
        Self::unsupported("latest")
    }

    /// Always fails with `Unsupported`.
    ///
    /// # Errors
    /// Always.
    pub fn in_bulk(&self, _ids: &[Value]) -> Result<Vec<Combined<E>>> {
        Self::unsupported("in_bulk")
    }

    /// Always fails with `Unsupported`.
    ///
    /// # Errors
    /// Always.
    pub fn delete(&self) -> Result<u64> {
        Self::unsupported("delete")
    }

    /// Always fails with `Unsupported`.
    ///
    /// # Errors
    /// Always.
    pub fn update(&self, _values: &FieldValues) -> Result<u64> {
        Self::unsupported("update")
    }

    /// Always fails with `Unsupported`.
    ///
    /// # Errors
    /// Always.
    pub fn values(&self, _fields: &[&str]) -> Result<Vec<FieldValues>> {
        Self::unsupported("values")
    }

    /// Always fails with `Unsupported`.
    ///
    /// # Errors
    /// Always.
    pub fn values_list(&self, _fields: &[&str]) -> Result<Vec<Vec<Value>>> {
        Self::unsupported("values_list")
    }

    /// Always fails with `Unsupported`.
    ///
    /// # Errors
    /// Always.
    pub fn dates(&self, _field: &str, _kind: &str) -> Result<Vec<Value>> {
        Self::unsupported("dates")
    }

    /// Always fails with `Unsupported`.
    ///
    /// # Errors
    /// Always.
    pub fn exclude(&self, _filter: &Filter) -> Result<Self> {
        Self::unsupported("exclude")
    }

    /// Always fails with `Unsupported`.
    ///
    /// # Errors
    /// Always.
    pub fn complex_filter(&self, _filter: &Filter) -> Result<Self> {
        Self::unsupported("complex_filter")
    }

    /// Always fails with `Unsupported`.
    ///
    /// # Errors
    /// Always.
    pub fn annotate(&self, _exprs: &[SimpleExpr]) -> Result<Self> {
        Self::unsupported("annotate")
    }

    /// Always fails with `Unsupported`.
    ///
    /// # Errors
    /// Always.
    pub fn reverse(&self) -> Result<Self> {
        Self::unsupported("reverse")
    }

    /// Always fails with `Unsupported`.
    ///
    /// # Errors
    /// Always.
    pub fn defer(&self, _fields: &[&str]) -> Result<Self> {
        Self::unsupported("defer")
    }

    /// Always fails with `Unsupported`.
    ///
    /// # Errors
    /// Always.
    pub fn only(&self, _fields: &[&str]) -> Result<Self> {
        Self::unsupported("only")
    }
}

fn model_name<E: EntityTrait>() -> String {
    E::default().table_name().to_owned()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use sea_orm::{DbBackend, QueryTrait};

    use super::*;
    use crate::manager::TranslationManager;

    mod book {
        use sea_orm::entity::prelude::*;

        #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "book")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i32,
            pub isbn: String,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    mod book_translation {
        use sea_orm::entity::prelude::*;

        #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "book_translation")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i32,
            pub master_id: i32,
            pub language_code: String,
            pub title: String,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {
            #[sea_orm(
                belongs_to = "super::book::Entity",
                from = "Column::MasterId",
                to = "super::book::Column::Id"
            )]
            Book,
        }

        impl ActiveModelBehavior for ActiveModel {}

        impl crate::TranslatableEntity for Entity {
            type Shared = super::book::Entity;

            fn master_col() -> Column {
                Column::MasterId
            }

            fn language_col() -> Column {
                Column::LanguageCode
            }

            fn master_relation() -> RelationDef {
                Relation::Book.def()
            }
        }
    }

    fn books() -> TranslationManager<book_translation::Entity> {
        TranslationManager::new()
    }

    fn sql(query: &TranslationQuery<book_translation::Entity>) -> String {
        query.build_select().unwrap().build(DbBackend::Sqlite).to_string()
    }

    #[test]
    fn test_select_joins_shared_table() {
        let q = books().query(&LanguageCtx::new("en"));
        let s = sql(&q);
        assert!(
            s.contains(r#"INNER JOIN "book" ON "book_translation"."master_id" = "book"."id""#),
            "{s}"
        );
        assert!(!q.is_language_scoped());
    }

    #[test]
    fn test_filter_on_shared_name_equals_qualified_filter() {
        let ctx = LanguageCtx::new("en");
        let bare = books().query(&ctx).filter(Filter::field("isbn", "978"));
        let qualified = books().query(&ctx).filter(Filter::field("master__isbn", "978"));
        assert_eq!(bare.filters(), qualified.filters());
        assert_eq!(sql(&bare), sql(&qualified));
    }

    #[test]
    fn test_language_scope_defaults_to_context() {
        let q = books().language(&LanguageCtx::new("de"), None);
        assert_eq!(q.language_code(), Some("de"));
        assert!(sql(&q).contains(r#""book_translation"."language_code" = 'de'"#));

        let q = q.language(Some("fr"));
        let s = sql(&q);
        assert!(s.contains("'fr'"), "{s}");
        assert!(!s.contains("'de'"), "{s}");
    }

    #[test]
    fn test_order_by_keeps_direction_and_resolves() {
        let q = books()
            .query(&LanguageCtx::new("en"))
            .order_by(["-isbn", "title"]);
        assert_eq!(q.ordering(), ["-master__isbn", "title"]);
        let s = sql(&q);
        assert!(
            s.contains(r#"ORDER BY "book"."isbn" DESC, "book_translation"."title" ASC"#),
            "{s}"
        );
    }

    #[test]
    fn test_clone_shares_translator_and_scope() {
        let q = books()
            .language(&LanguageCtx::new("en"), Some("de"))
            .filter(Filter::field("isbn", "1"));
        let clone = q.clone();
        assert_eq!(clone.language_code(), Some("de"));
        assert!(clone.translator().shares_cache_with(q.translator()));
        assert_eq!(clone.translator().cached("isbn").as_deref(), Some("master__isbn"));
    }

    #[test]
    fn test_sessions_do_not_share_caches() {
        let manager = books();
        let ctx = LanguageCtx::new("en");
        let a = manager.query(&ctx);
        let b = manager.query(&ctx);
        assert!(!a.translator().shares_cache_with(b.translator()));
    }

    #[test]
    fn test_limit_and_offset() {
        let q = books().query(&LanguageCtx::new("en")).limit(5).offset(10);
        let s = sql(&q);
        assert!(s.contains("LIMIT 5"), "{s}");
        assert!(s.contains("OFFSET 10"), "{s}");
    }

    #[test]
    fn test_unsupported_operations_always_fail() {
        let q = books().query(&LanguageCtx::new("en"));
        let filter = Filter::field("title", "x");
        let results = [
            q.aggregate(&[]).err(),
            q.latest("title").err(),
            q.in_bulk(&[Value::from(1)]).err(),
            q.delete().err(),
            q.update(&FieldValues::new().set("title", "y")).err(),
            q.values(&["title"]).err(),
            q.values_list(&[]).err(),
            q.dates("title", "year").err(),
            q.exclude(&filter).err(),
            q.complex_filter(&filter).err(),
            q.annotate(&[]).err(),
            q.reverse().err(),
            q.defer(&["title"]).err(),
            q.only(&["isbn"]).err(),
        ];
        for (err, op) in results.into_iter().zip(UNSUPPORTED_OPERATIONS) {
            match err {
                Some(TranslationError::Unsupported(name)) => assert_eq!(name, op),
                other => panic!("{op}: expected Unsupported, got {other:?}"),
            }
        }
    }
}
