//! Compilation of resolved filters into `SeaORM` conditions over the
//! translation/shared join.
//!
//! Input paths must already be resolved (see [`FieldTranslator::rewrite`]):
//! `master__`-prefixed leaves are compiled against the shared entity's
//! columns, everything else against the translation entity's.
//!
//! [`FieldTranslator::rewrite`]: crate::FieldTranslator::rewrite

use std::str::FromStr;

use sea_orm::sea_query::{ConditionExpression, Expr, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, EntityTrait, Iterable, Order, PrimaryKeyToColumn, Value};

use crate::entity::TranslatableEntity;
use crate::error::{Result, TranslationError};
use crate::fields::{FieldOwner, FieldRef, Lookup, MASTER, PK, SEP};
use crate::filter::{Connector, Filter, Operand};

/// AND together a list of resolved filters.
///
/// # Errors
/// Returns a `TranslationError` for unknown fields, unsupported lookups,
/// relation spans or operand shapes that do not fit their lookup.
pub fn build_condition<E: TranslatableEntity>(filters: &[Filter]) -> Result<Condition> {
    filters.iter().try_fold(Condition::all(), |cond, f| {
        Ok(cond.add(compile::<E>(f)?))
    })
}

fn compile<E: TranslatableEntity>(filter: &Filter) -> Result<ConditionExpression> {
    Ok(match filter {
        Filter::Field { name, operand } => {
            let target = FieldRef::parse(name)?;
            match target.owner {
                FieldOwner::Translation => {
                    let col = translation_column::<E>(target.field, name)
                        .map_err(|e| target.unknown_column(e, name))?;
                    leaf(col, name, target.lookup(name)?, operand)?.into()
                }
                FieldOwner::Shared => {
                    let col = shared_column::<E::Shared>(target.field, name)
                        .map_err(|e| target.unknown_column(e, name))?;
                    leaf(col, name, target.lookup(name)?, operand)?.into()
                }
            }
        }
        Filter::Group {
            connector,
            negated,
            children,
        } => {
            let base = match connector {
                Connector::And => Condition::all(),
                Connector::Or => Condition::any(),
            };
            let cond = children
                .iter()
                .try_fold(base, |cond, c| Ok::<_, TranslationError>(cond.add(compile::<E>(c)?)))?;
            let cond = if *negated { cond.not() } else { cond };
            cond.into()
        }
        Filter::Raw(expr) => expr.clone().into(),
    })
}

pub(crate) fn translation_column<E: TranslatableEntity>(field: &str, path: &str) -> Result<E::Column> {
    if field == MASTER {
        return Ok(E::master_col());
    }
    E::Column::from_str(field).map_err(|_| TranslationError::UnknownField(path.to_owned()))
}

pub(crate) fn shared_column<S: EntityTrait>(field: &str, path: &str) -> Result<S::Column> {
    if field == PK {
        return S::PrimaryKey::iter()
            .next()
            .map(PrimaryKeyToColumn::into_column)
            .ok_or_else(|| TranslationError::UnknownField(path.to_owned()));
    }
    S::Column::from_str(field).map_err(|_| TranslationError::UnknownField(path.to_owned()))
}

fn leaf<C: ColumnTrait>(col: C, path: &str, lookup: Lookup, operand: &Operand) -> Result<SimpleExpr> {
    let target = Expr::col((col.entity_name(), col));

    let value = match (lookup, operand) {
        (Lookup::In, Operand::List(values)) if values.is_empty() => {
            // IN () never matches
            return Ok(Expr::cust("1=0"));
        }
        (Lookup::In, Operand::List(values)) => return Ok(target.is_in(values.iter().cloned())),
        (_, Operand::List(_)) => return Err(invalid(path, "a list is only accepted by `in`")),
        (_, Operand::Value(value)) => value.clone(),
    };

    Ok(match lookup {
        // `= NULL` never matches
        Lookup::Exact if value == value.as_null() => target.is_null(),
        Lookup::Ne if value == value.as_null() => target.is_not_null(),
        Lookup::Exact => target.eq(value),
        Lookup::Ne => target.ne(value),
        Lookup::Gt => target.gt(value),
        Lookup::Gte => target.gte(value),
        Lookup::Lt => target.lt(value),
        Lookup::Lte => target.lte(value),
        Lookup::Contains => target.like(like(&format!("%{}%", like_escape(&text(path, value)?)))),
        Lookup::StartsWith => target.like(like(&format!("{}%", like_escape(&text(path, value)?)))),
        Lookup::EndsWith => target.like(like(&format!("%{}", like_escape(&text(path, value)?)))),
        Lookup::IsNull => match value {
            Value::Bool(Some(true)) => target.is_null(),
            Value::Bool(Some(false)) => target.is_not_null(),
            _ => return Err(invalid(path, "`isnull` expects a boolean")),
        },
        Lookup::In => return Err(invalid(path, "`in` expects a list of values")),
    })
}

fn text(path: &str, value: Value) -> Result<String> {
    match value {
        Value::String(Some(s)) => Ok(*s),
        _ => Err(invalid(path, "pattern lookups expect a string")),
    }
}

fn like(pattern: &str) -> LikeExpr {
    LikeExpr::new(pattern).escape('\\')
}

fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn invalid(path: &str, reason: &'static str) -> TranslationError {
    TranslationError::InvalidValue {
        field: path.to_owned(),
        reason,
    }
}

/// Compile a resolved ordering term (`title`, `-master__price`) into an
/// expression and direction.
///
/// # Errors
/// Returns `UnknownField`, `RelationSpan` or `UnsupportedLookup` for terms
/// that do not name a single column of either entity.
pub fn order_expr<E: TranslatableEntity>(term: &str) -> Result<(SimpleExpr, Order)> {
    let (path, order) = match term.strip_prefix('-') {
        Some(path) => (path, Order::Desc),
        None => (term, Order::Asc),
    };
    let target = FieldRef::parse(path)?;
    let expr = match target.owner {
        FieldOwner::Translation => {
            let col = translation_column::<E>(target.field, path)
                .map_err(|e| target.unknown_column(e, path))?;
            Expr::col((col.entity_name(), col)).into()
        }
        FieldOwner::Shared => {
            let col = shared_column::<E::Shared>(target.field, path)
                .map_err(|e| target.unknown_column(e, path))?;
            Expr::col((col.entity_name(), col)).into()
        }
    };
    if let Some(tail) = target.tail {
        // ordering takes a bare column
        return Err(if tail.contains(SEP) {
            TranslationError::RelationSpan(path.to_owned())
        } else {
            TranslationError::UnsupportedLookup {
                field: target.field.to_owned(),
                lookup: tail.to_owned(),
            }
        });
    }
    Ok((expr, order))
}
