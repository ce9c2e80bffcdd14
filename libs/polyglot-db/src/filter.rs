//! Filter expressions over bare field names.
//!
//! A [`Filter`] is a boolean tree whose leaves are `(field path, operand)`
//! pairs. Field paths follow the `field__lookup` convention, e.g.
//! `title__contains` or `price__gte`. Leaves are written against the
//! unqualified names of either entity; the translation layer rewrites them
//! before execution.
//!
//! ```
//! use polyglot_db::Filter;
//!
//! let f = Filter::field("isbn", "978-0")
//!     & (Filter::field("title__contains", "Rust") | !Filter::field("price__gt", 10));
//! assert!(f.mentions("title"));
//! ```

use std::ops::{BitAnd, BitOr, Not};

use sea_orm::Value;
use sea_orm::sea_query::SimpleExpr;

use crate::fields::SEP;

/// How the children of a [`Filter::Group`] are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

/// Right-hand side of a leaf predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    /// Used by the `in` lookup.
    List(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Leaf predicate: `name` is a field path, optionally with a lookup suffix.
    Field { name: String, operand: Operand },
    /// Boolean node.
    Group {
        connector: Connector,
        negated: bool,
        children: Vec<Filter>,
    },
    /// Pre-built expression passed through untouched.
    Raw(SimpleExpr),
}

impl Filter {
    /// Leaf predicate `name = value` (or `name__lookup value`).
    pub fn field(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Field {
            name: name.into(),
            operand: Operand::Value(value.into()),
        }
    }

    /// Leaf predicate `name IN (values...)`.
    pub fn is_in<I, V>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::Field {
            name: format!("{name}{SEP}in"),
            operand: Operand::List(values.into_iter().map(Into::into).collect()),
        }
    }

    /// AND of all children.
    #[must_use]
    pub fn all(children: Vec<Filter>) -> Self {
        Filter::Group {
            connector: Connector::And,
            negated: false,
            children,
        }
    }

    /// OR of all children.
    #[must_use]
    pub fn any(children: Vec<Filter>) -> Self {
        Filter::Group {
            connector: Connector::Or,
            negated: false,
            children,
        }
    }

    /// Pass-through expression; its column references are not rewritten.
    #[must_use]
    pub fn raw(expr: SimpleExpr) -> Self {
        Filter::Raw(expr)
    }

    /// True for a group with no children (matches everything).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Filter::Group { children, .. } if children.is_empty())
    }

    /// Whether any leaf in the tree targets `field` (ignoring lookups).
    ///
    /// Raw expressions are opaque and never match.
    #[must_use]
    pub fn mentions(&self, field: &str) -> bool {
        match self {
            Filter::Field { name, .. } => base_name(name) == field,
            Filter::Group { children, .. } => children.iter().any(|c| c.mentions(field)),
            Filter::Raw(_) => false,
        }
    }

    /// Remove a plain `field = value` predicate from the top level of this
    /// filter and return its value.
    ///
    /// Only a bare leaf or a direct child of a non-negated AND group
    /// qualifies; predicates nested deeper stay where they are.
    pub(crate) fn take_exact(&mut self, field: &str) -> Option<Value> {
        match self {
            Filter::Field {
                name,
                operand: Operand::Value(value),
            } if is_exact(name, field) => {
                let value = value.clone();
                *self = Filter::all(Vec::new());
                Some(value)
            }
            Filter::Group {
                connector: Connector::And,
                negated: false,
                children,
            } => {
                let idx = children.iter().position(|c| {
                    matches!(c, Filter::Field { name, operand: Operand::Value(_) } if is_exact(name, field))
                })?;
                match children.remove(idx) {
                    Filter::Field {
                        operand: Operand::Value(value),
                        ..
                    } => Some(value),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// First segment of a field path.
pub(crate) fn base_name(path: &str) -> &str {
    path.split_once(SEP).map_or(path, |(base, _)| base)
}

fn is_exact(path: &str, field: &str) -> bool {
    path == field || path.strip_prefix(field) == Some("__exact")
}

impl Not for Filter {
    type Output = Filter;

    fn not(self) -> Filter {
        match self {
            Filter::Group {
                connector,
                negated,
                children,
            } => Filter::Group {
                connector,
                negated: !negated,
                children,
            },
            other => Filter::Group {
                connector: Connector::And,
                negated: true,
                children: vec![other],
            },
        }
    }
}

impl BitAnd for Filter {
    type Output = Filter;

    fn bitand(self, rhs: Filter) -> Filter {
        combine(self, rhs, Connector::And)
    }
}

impl BitOr for Filter {
    type Output = Filter;

    fn bitor(self, rhs: Filter) -> Filter {
        combine(self, rhs, Connector::Or)
    }
}

fn combine(lhs: Filter, rhs: Filter, connector: Connector) -> Filter {
    if lhs.is_empty() {
        return rhs;
    }
    if rhs.is_empty() {
        return lhs;
    }
    match lhs {
        Filter::Group {
            connector: c,
            negated: false,
            mut children,
        } if c == connector => {
            children.push(rhs);
            Filter::Group {
                connector,
                negated: false,
                children,
            }
        }
        lhs => Filter::Group {
            connector,
            negated: false,
            children: vec![lhs, rhs],
        },
    }
}

/// Ordered field-name to value map, the keyword-argument side of queries.
///
/// Later assignments to the same name replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues(Vec<(String, Value)>);

impl FieldValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.0.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.0.push((name, value));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.0.iter().position(|(n, _)| n == name)?;
        Some(self.0.remove(idx).1)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(n, _)| n == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl IntoIterator for FieldValues {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<N, V> FromIterator<(N, V)> for FieldValues
where
    N: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut values = FieldValues::new();
        for (name, value) in iter {
            values.insert(name, value);
        }
        values
    }
}

/// Keyword arguments become an AND of equality leaves.
impl From<FieldValues> for Filter {
    fn from(values: FieldValues) -> Self {
        Filter::all(
            values
                .into_iter()
                .map(|(name, value)| Filter::Field {
                    name,
                    operand: Operand::Value(value),
                })
                .collect(),
        )
    }
}
