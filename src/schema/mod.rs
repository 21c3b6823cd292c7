//! # Relation Schemas
//!
//! Column lists backing each queryable view, one module per supported server generation.
//!
//! A [`Specifier`] is what the compiler reads to produce a node's base select list. The
//! generated SQL always qualifies columns with their relation (`pg_locks.pid`), so result
//! columns keep their bare names (`pid`) and can be decoded by name with `sqlx::FromRow`.

use std::fmt;

pub mod postgres13;
pub mod postgres9;

/// Provides the base columns selected for a queryable target.
pub trait Specifier: fmt::Debug + Send + Sync {
    /// Stable identity of the specifier, used in structural signatures.
    fn name(&self) -> &'static str;

    /// Relation the columns belong to.
    fn relation(&self) -> &'static str;

    /// Unqualified column names, in select order.
    fn columns(&self) -> &'static [&'static str];

    /// Qualified column names as they appear in a select query.
    fn selects(&self) -> Vec<String> {
        let relation = self.relation();
        self.columns()
            .iter()
            .map(|column| format!("{relation}.{column}"))
            .collect()
    }
}

/// Declare unit-struct specifiers with their relation and columns.
macro_rules! specifiers {
    ($generation:literal; $( $(#[$meta:meta])* $name:ident => $relation:literal [ $($column:literal),* $(,)? ] )*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $name;

            impl $crate::schema::Specifier for $name {
                fn name(&self) -> &'static str {
                    concat!($generation, "::", stringify!($name))
                }

                fn relation(&self) -> &'static str {
                    $relation
                }

                fn columns(&self) -> &'static [&'static str] {
                    &[$($column),*]
                }
            }
        )*
    };
}

pub(crate) use specifiers;
