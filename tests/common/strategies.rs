use pgstat_query::query_builder::supported_pairs;
use pgstat_query::{PostgresVersion, Queryable, Target, Views};
use proptest::prelude::*;

/// The queryable for `target` in `views`, if that generation has one.
pub fn view_for(views: &Views, target: Target) -> Option<Queryable> {
    if target == Target::BlockingPids {
        return Some(views.blocking_pids());
    }
    views
        .all()
        .into_iter()
        .find(|view| view.target() == target && view.is_valid())
        .cloned()
}

/// Children `parent` may join, in registry order, filtered by `mask`.
fn children_for(views: &Views, parent: Target, mask: u32) -> Vec<Queryable> {
    let mut targets: Vec<Target> = supported_pairs()
        .filter(|(from, _)| *from == parent)
        .map(|(_, to)| to)
        .collect();
    targets.sort();

    targets
        .into_iter()
        .enumerate()
        .filter(|(i, _)| mask & (1u32 << *i) != 0)
        .filter_map(|(_, target)| view_for(views, target))
        .collect()
}

/// A compilable tree: a root, some of its joinable children, and optionally some
/// grandchildren under the first child that is a true join.
#[derive(Debug, Clone)]
pub struct TreeSeed {
    pub root: Target,
    pub child_mask: u32,
    pub grandchild_mask: u32,
    pub filter: Option<String>,
}

impl TreeSeed {
    pub fn build(&self, views: &Views) -> Queryable {
        let Some(mut root) = view_for(views, self.root) else {
            return views.locks.clone();
        };
        if let Some(filter) = &self.filter {
            root = root.with_filter(filter.as_str());
        }

        let mut children = children_for(views, self.root, self.child_mask);
        let taken: Vec<Target> = children.iter().map(Queryable::target).collect();
        if let Some(first) = children.iter_mut().find(|child| !child.is_select_only()) {
            // Skip targets already used above so no two nodes share a signature
            let grandchildren: Vec<Queryable> =
                children_for(views, first.target(), self.grandchild_mask)
                    .into_iter()
                    .filter(|g| g.target() != self.root && !taken.contains(&g.target()))
                    .collect();
            *first = first.with_children(grandchildren);
        }
        root.with_children(children)
    }
}

/// Roots that have a specifier in 13.
pub fn root_target_strategy() -> impl Strategy<Value = Target> {
    let roots: Vec<Target> = Target::ALL
        .into_iter()
        .filter(|t| !t.is_unspecified() && *t != Target::BlockingPids)
        .collect();
    prop::sample::select(roots)
}

pub fn filter_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-z_]{1,12} = [0-9]{1,4}")
}

pub fn tree_seed_strategy() -> impl Strategy<Value = TreeSeed> {
    (
        root_target_strategy(),
        any::<u32>(),
        any::<u32>(),
        filter_strategy(),
    )
        .prop_map(|(root, child_mask, grandchild_mask, filter)| TreeSeed {
            root,
            child_mask,
            grandchild_mask,
            filter,
        })
}

pub fn views13() -> Views {
    Views::for_version(PostgresVersion::Postgres13)
}
