//! Rewriting of filter trees and ordering terms through a [`FieldTranslator`].

use crate::fields::FieldTranslator;
use crate::filter::{FieldValues, Filter};

impl FieldTranslator {
    /// Return a copy of `filter` with every leaf field name resolved.
    ///
    /// Structure, negation and connectors are kept as-is; raw expressions are
    /// copied without inspection.
    #[must_use]
    pub fn rewrite(&self, filter: &Filter) -> Filter {
        match filter {
            Filter::Field { name, operand } => Filter::Field {
                name: self.resolve(name),
                operand: operand.clone(),
            },
            Filter::Group {
                connector,
                negated,
                children,
            } => Filter::Group {
                connector: *connector,
                negated: *negated,
                children: children.iter().map(|c| self.rewrite(c)).collect(),
            },
            Filter::Raw(expr) => Filter::Raw(expr.clone()),
        }
    }

    /// Resolve the keys of a flat field/value map.
    #[must_use]
    pub fn rewrite_values(&self, values: &FieldValues) -> FieldValues {
        values
            .iter()
            .map(|(name, value)| (self.resolve(name), value.clone()))
            .collect()
    }

    /// Resolve an ordering term, keeping a leading `-` (descending) marker.
    #[must_use]
    pub fn rewrite_order_term(&self, term: &str) -> String {
        match term.strip_prefix('-') {
            Some(name) => format!("-{}", self.resolve(name)),
            None => self.resolve(term),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Arc;

    use sea_orm::entity::prelude::*;
    use sea_orm::sea_query::Expr;

    use crate::fields::FieldTable;
    use crate::filter::{Connector, Operand};

    use super::*;

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

        impl Related<super::book::Entity> for Entity {
            fn to() -> RelationDef {
                Relation::Book.def()
            }
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

    fn translator() -> FieldTranslator {
        FieldTranslator::new(Arc::new(FieldTable::for_entity::<book_translation::Entity>()))
    }

    #[test]
    fn test_rewrite_preserves_structure() {
        let t = translator();
        let f = Filter::field("isbn", "1")
            & !(Filter::field("title__contains", "x") | Filter::field("pk", 3));
        let out = t.rewrite(&f);

        let expected = Filter::field("master__isbn", "1")
            & !(Filter::field("title__contains", "x") | Filter::field("master__pk", 3));
        assert_eq!(out, expected);
        // input untouched
        assert!(f.mentions("isbn"));
        assert!(!f.mentions("master"));
    }

    #[test]
    fn test_nested_groups_are_rewritten_once() {
        let t = translator();
        let inner = Filter::all(vec![Filter::all(vec![Filter::field("isbn", "1")])]);
        let out = t.rewrite(&inner);
        let Filter::Group { children, .. } = &out else {
            panic!("expected group");
        };
        let Filter::Group { children, .. } = &children[0] else {
            panic!("expected nested group");
        };
        assert_eq!(
            children[0],
            Filter::Field {
                name: "master__isbn".to_owned(),
                operand: Operand::Value(Value::from("1")),
            }
        );
    }

    #[test]
    fn test_raw_is_passed_through() {
        let t = translator();
        let expr = Expr::col(book::Column::Isbn).eq("x");
        let f = Filter::any(vec![Filter::raw(expr.clone()), Filter::field("isbn", "y")]);
        let Filter::Group {
            connector,
            children,
            ..
        } = t.rewrite(&f)
        else {
            panic!("expected group");
        };
        assert_eq!(connector, Connector::Or);
        assert_eq!(children[0], Filter::Raw(expr));
    }

    #[test]
    fn test_field_values_keys_are_resolved() {
        let t = translator();
        let values = FieldValues::new().set("isbn", "1").set("title", "Dune");
        let out = t.rewrite_values(&values);
        assert!(out.contains("master__isbn"));
        assert!(out.contains("title"));
    }

    #[test]
    fn test_order_terms_keep_direction() {
        let t = translator();
        assert_eq!(t.rewrite_order_term("-isbn"), "-master__isbn");
        assert_eq!(t.rewrite_order_term("title"), "title");
        assert_eq!(t.rewrite_order_term("-title"), "-title");
    }
}
