use std::fmt;
use std::sync::Arc;

use super::Target;
use crate::schema::Specifier;

/// An abstract entity a query can be run against, together with the entities joined
/// under it.
///
/// Nodes are immutable. [`with_children`](Queryable::with_children) and
/// [`with_filter`](Queryable::with_filter) return a new node and leave the receiver as it
/// was; children are shared between the old and new node rather than copied.
#[derive(Clone)]
pub struct Queryable {
    target: Target,
    specifier: Option<&'static dyn Specifier>,
    joins: Arc<[Queryable]>,
    select_only: bool,
    filter: Option<String>,
}

impl Queryable {
    /// A relation backed by `specifier`'s columns.
    pub fn new(target: Target, specifier: &'static dyn Specifier) -> Self {
        Self {
            target,
            specifier: Some(specifier),
            joins: Arc::from(Vec::new()),
            select_only: false,
            filter: None,
        }
    }

    /// A node that only contributes a select expression to its parent.
    pub fn select_only(target: Target) -> Self {
        Self {
            target,
            specifier: None,
            joins: Arc::from(Vec::new()),
            select_only: true,
            filter: None,
        }
    }

    /// A node with no specifier. It cannot be compiled unless it is select-only; views
    /// unavailable in the active version are represented this way.
    pub fn unavailable(target: Target) -> Self {
        Self {
            target,
            specifier: None,
            joins: Arc::from(Vec::new()),
            select_only: false,
            filter: None,
        }
    }

    /// Append children, in order, to a copy of this node.
    pub fn with_children<I>(&self, children: I) -> Self
    where
        I: IntoIterator<Item = Queryable>,
    {
        let joins: Vec<Queryable> = self.joins.iter().cloned().chain(children).collect();
        Self {
            joins: Arc::from(joins),
            ..self.clone()
        }
    }

    /// Append a single child to a copy of this node.
    pub fn with_child(&self, child: Queryable) -> Self {
        self.with_children(std::iter::once(child))
    }

    /// Set the `WHERE` fragment on a copy of this node. An empty fragment clears it.
    ///
    /// The fragment is inlined verbatim into the generated SQL.
    pub fn with_filter(&self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        Self {
            filter: (!filter.is_empty()).then_some(filter),
            ..self.clone()
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn specifier(&self) -> Option<&'static dyn Specifier> {
        self.specifier
    }

    pub fn joins(&self) -> &[Queryable] {
        &self.joins
    }

    pub fn is_select_only(&self) -> bool {
        self.select_only
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Compilable on its own: a specified target with columns, or a select-only node.
    pub fn is_valid(&self) -> bool {
        !self.target.is_unspecified() && (self.select_only || self.specifier.is_some())
    }

    /// Structural signature covering target, specifier, flags, filter, and every child.
    ///
    /// Targets are identified by variant rather than SQL name, since two targets can
    /// share a relation (`pg_locks` joined on pid and on transaction id).
    pub fn signature(&self) -> String {
        let mut signature = String::new();
        self.write_signature(&mut signature);
        signature
    }

    fn write_signature(&self, out: &mut String) {
        out.push_str(&format!(
            "{:?}|{}|{}|{:?}[",
            self.target,
            self.specifier.map_or("none", |s| s.name()),
            self.select_only,
            self.filter.as_deref().unwrap_or(""),
        ));
        for (i, join) in self.joins.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            join.write_signature(out);
        }
        out.push(']');
    }
}

impl fmt::Display for Queryable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let specifier = self.specifier.map_or("none", |s| s.name());
        write!(
            f,
            "Queryable{{target: {}, specifier: {}, select_only: {}, filter: {:?}, joins: [",
            self.target,
            specifier,
            self.select_only,
            self.filter.as_deref().unwrap_or(""),
        )?;
        for (i, join) in self.joins.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{join}")?;
        }
        f.write_str("]}")
    }
}

impl fmt::Debug for Queryable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queryable")
            .field("target", &self.target)
            .field("specifier", &self.specifier.map(|s| s.name()))
            .field("select_only", &self.select_only)
            .field("filter", &self.filter)
            .field("joins", &self.joins)
            .finish()
    }
}

impl PartialEq for Queryable {
    fn eq(&self, other: &Self) -> bool {
        self.signature() == other.signature()
    }
}

impl Eq for Queryable {}
