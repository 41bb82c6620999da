//! Category tree construction.
//!
//! The API serves categories as a flat list where each record may name a
//! parent by id. Pages want a forest: roots in alphabetical order, each with
//! its children in alphabetical order, recursively.
//!
//! ## Construction
//!
//! [`build_tree`] works over an id → position table rather than following
//! parent pointers per node, so it is linear in the number of records and its
//! stack use does not grow with tree depth:
//!
//! 1. Index every record by id. A repeated id replaces the earlier record.
//! 2. Attach each record to its parent's child list when the parent id is
//!    present in the index; otherwise the record is a root. Orphans (parent
//!    id not in the input) are promoted to roots on purpose.
//! 3. Sort every child list and the root list by name.
//! 4. Assemble owned [`CategoryNode`]s leaves-first.
//!
//! ## Cycles
//!
//! A record that is its own parent, or a chain of parents that loops, can
//! never be reached from a root. Such input is rejected with
//! [`TaxonomyError::Cycle`] listing the ids involved, instead of being
//! silently dropped or looping forever.

use crate::types::Category;
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TaxonomyError {
    #[error("category parent chain loops through ids {ids:?}")]
    Cycle { ids: Vec<u64> },
}

/// A category with its children materialized. Lives only as long as the
/// forest returned by [`build_tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub parent: Option<u64>,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    fn from_record(record: &Category) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            slug: record.slug.clone(),
            parent: record.parent,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

// Category depth comes from remote data, so a long parent chain must not
// turn into a long chain of nested drop calls.
impl Drop for CategoryNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Case-insensitive name order; exact name then id break ties so the result
/// never depends on input order.
fn compare_names(a: &Category, b: &Category) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
        .then(a.id.cmp(&b.id))
}

/// Build the category forest from flat records.
///
/// Empty input yields an empty forest. Every surviving record (one per
/// distinct id) appears exactly once in the result.
pub fn build_tree(categories: &[Category]) -> Result<Vec<CategoryNode>, TaxonomyError> {
    // Last write wins for duplicate ids.
    let mut position_of: HashMap<u64, usize> = HashMap::with_capacity(categories.len());
    for (pos, record) in categories.iter().enumerate() {
        position_of.insert(record.id, pos);
    }
    let records: Vec<&Category> = categories
        .iter()
        .enumerate()
        .filter(|(pos, record)| position_of.get(&record.id) == Some(pos))
        .map(|(_, record)| record)
        .collect();
    let slot_of: HashMap<u64, usize> = records
        .iter()
        .enumerate()
        .map(|(slot, record)| (record.id, slot))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut roots: Vec<usize> = Vec::new();
    for (slot, record) in records.iter().enumerate() {
        match record.parent.and_then(|p| slot_of.get(&p)) {
            Some(&parent_slot) => children[parent_slot].push(slot),
            None => roots.push(slot),
        }
    }

    let by_name = |a: &usize, b: &usize| compare_names(records[*a], records[*b]);
    roots.sort_by(by_name);
    for list in &mut children {
        list.sort_by(by_name);
    }

    // Breadth-first from the roots. Anything not reached sits on a cycle.
    let mut order: Vec<usize> = Vec::with_capacity(records.len());
    let mut queue: VecDeque<usize> = roots.iter().copied().collect();
    while let Some(slot) = queue.pop_front() {
        order.push(slot);
        queue.extend(children[slot].iter().copied());
    }
    if order.len() < records.len() {
        let mut reached = vec![false; records.len()];
        for &slot in &order {
            reached[slot] = true;
        }
        let mut ids: Vec<u64> = records
            .iter()
            .enumerate()
            .filter(|(slot, _)| !reached[*slot])
            .map(|(_, record)| record.id)
            .collect();
        ids.sort_unstable();
        return Err(TaxonomyError::Cycle { ids });
    }

    // Reverse breadth-first order visits every child before its parent.
    let mut built: Vec<Option<CategoryNode>> = vec![None; records.len()];
    for &slot in order.iter().rev() {
        let mut node = CategoryNode::from_record(records[slot]);
        node.children = children[slot]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[slot] = Some(node);
    }

    Ok(roots
        .iter()
        .filter_map(|&slot| built[slot].take())
        .collect())
}

/// Visit every node depth-first in display order, passing its depth
/// (roots are depth 0). Uses an explicit stack.
pub fn walk<'a>(forest: &'a [CategoryNode], mut visit: impl FnMut(&'a CategoryNode, usize)) {
    let mut stack: Vec<(&'a CategoryNode, usize)> = forest.iter().rev().map(|n| (n, 0)).collect();
    while let Some((node, depth)) = stack.pop() {
        visit(node, depth);
        stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }
}

/// Total number of nodes in the forest.
pub fn node_count(forest: &[CategoryNode]) -> usize {
    let mut count = 0;
    walk(forest, |_, _| count += 1);
    count
}

/// Find a node anywhere in the forest by slug.
pub fn find_by_slug<'a>(forest: &'a [CategoryNode], slug: &str) -> Option<&'a CategoryNode> {
    let mut found = None;
    walk(forest, |node, _| {
        if found.is_none() && node.slug == slug {
            found = Some(node);
        }
    });
    found
}
