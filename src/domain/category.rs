//! Category tree.
//!
//! Flat table with a nullable parent reference. Acyclicity is
//! enforced before every insert/update by walking the ancestor chain
//! (the tree is small, so the walk is cheap).

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Category domain entity.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i32>,
    pub icon: String,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

/// Data for creating or updating a category (seed import path).
#[derive(Debug, Clone)]
pub struct CategorySpec {
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i32>,
    pub icon: String,
}

/// Walk the parent chain of `candidate_parent` and report whether it
/// passes through `category_id` (which would make the edge a cycle).
///
/// `parent_of` resolves a category id to its parent id; the walk
/// stops at roots and defensively at already-visited nodes.
pub fn would_create_cycle<F>(category_id: i32, candidate_parent: Option<i32>, parent_of: F) -> bool
where
    F: Fn(i32) -> Option<i32>,
{
    let mut visited = std::collections::HashSet::new();
    let mut node = candidate_parent;
    while let Some(id) = node {
        if id == category_id {
            return true;
        }
        if !visited.insert(id) {
            // existing circular data; stop rather than loop forever
            return false;
        }
        node = parent_of(id);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn tree(edges: &[(i32, Option<i32>)]) -> HashMap<i32, Option<i32>> {
        edges.iter().copied().collect()
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let parents = tree(&[(1, None)]);
        assert!(would_create_cycle(1, Some(1), |id| {
            parents.get(&id).copied().flatten()
        }));
    }

    #[test]
    fn reparenting_under_own_descendant_is_a_cycle() {
        // 1 -> 2 -> 3; moving 1 under 3 would close the loop
        let parents = tree(&[(1, None), (2, Some(1)), (3, Some(2))]);
        assert!(would_create_cycle(1, Some(3), |id| {
            parents.get(&id).copied().flatten()
        }));
    }

    #[test]
    fn sibling_parent_is_fine() {
        let parents = tree(&[(1, None), (2, Some(1)), (3, Some(1))]);
        assert!(!would_create_cycle(3, Some(2), |id| {
            parents.get(&id).copied().flatten()
        }));
    }
}
