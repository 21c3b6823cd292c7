//! # Query Tree Compiler
//!
//! Declarative trees of PostgreSQL internal-state relations, compiled into a single nested
//! SQL statement whose joined children come back as JSON arrays.
//!
//! ## Key Components
//!
//! - [`target`] - Known relations and functions, and their SQL names
//! - [`joins`] - Registry of the ordered target pairs that can be joined
//! - [`queryable`] - Immutable query tree nodes and their builder methods
//! - [`builder`] - Single `SELECT` statement assembly
//! - [`compiler`] - Whole-tree signature check and recursive lowering
//!
//! ## Example Usage
//!
//! ```rust
//! use pgstat_query::query_builder::{compile, Queryable, Target};
//! use pgstat_query::schema::postgres13;
//!
//! let activity = Queryable::new(Target::StatActivity, &postgres13::StatActivity)
//!     .with_child(Queryable::new(Target::Locks, &postgres13::Lock))
//!     .with_child(Queryable::select_only(Target::BlockingPids));
//!
//! let sql = compile(&activity).unwrap();
//! assert!(sql.contains("LEFT JOIN (SELECT pg_locks.locktype"));
//! assert!(sql.contains("AS blocked_by"));
//! ```

pub mod builder;
pub mod compiler;
pub mod joins;
pub mod queryable;
pub mod target;

pub use builder::QueryBuilder;
pub use compiler::{compile, mutual_recursion_detected};
pub use joins::{join_clause, join_spec, supported_pairs, Join, JoinClause, JoinSpec};
pub use queryable::Queryable;
pub use target::Target;
