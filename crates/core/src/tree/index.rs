//! Adjacency-list index over a flat slice of budget lines.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use cimiento_shared::types::BudgetLineId;

use crate::budget::BudgetLine;

/// Role of a line in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// No children: priced from its unit-price analysis.
    Leaf,
    /// Has children: cost is the sum of its children.
    Title,
}

/// Forest of budget lines borrowed from a flat slice.
///
/// Nodes are addressed by their position in the slice. Children keep the
/// slice order. A line whose parent is absent from the slice (or is itself)
/// is an orphan: it is not a root and is only reached by whole-forest walks.
#[derive(Debug)]
pub struct BudgetTree<'a> {
    lines: &'a [BudgetLine],
    positions: HashMap<BudgetLineId, usize>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl<'a> BudgetTree<'a> {
    /// Indexes `lines`. Duplicate IDs resolve to the first occurrence.
    #[must_use]
    pub fn build(lines: &'a [BudgetLine]) -> Self {
        let mut positions = HashMap::with_capacity(lines.len());
        for (idx, line) in lines.iter().enumerate() {
            positions.entry(line.id).or_insert(idx);
        }

        let mut children = vec![Vec::new(); lines.len()];
        let mut roots = Vec::new();
        for (idx, line) in lines.iter().enumerate() {
            match line.parent_id {
                None => roots.push(idx),
                Some(parent_id) => {
                    if let Some(&parent) = positions.get(&parent_id) {
                        if parent != idx {
                            children[parent].push(idx);
                        }
                    }
                }
            }
        }

        Self {
            lines,
            positions,
            children,
            roots,
        }
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if there are no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line at `idx`.
    #[must_use]
    pub fn line(&self, idx: usize) -> &'a BudgetLine {
        &self.lines[idx]
    }

    /// Position of a line by ID.
    #[must_use]
    pub fn position(&self, id: BudgetLineId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Positions of lines without a parent, in slice order.
    #[must_use]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Positions of the direct children of `idx`.
    #[must_use]
    pub fn children(&self, idx: usize) -> &[usize] {
        &self.children[idx]
    }

    /// Leaf or title.
    #[must_use]
    pub fn kind(&self, idx: usize) -> LineKind {
        if self.children[idx].is_empty() {
            LineKind::Leaf
        } else {
            LineKind::Title
        }
    }

    /// All leaf lines, in slice order.
    pub fn leaves(&self) -> impl Iterator<Item = &'a BudgetLine> + '_ {
        (0..self.lines.len())
            .filter(|&idx| self.kind(idx) == LineKind::Leaf)
            .map(|idx| &self.lines[idx])
    }

    /// Post-order of the subtree rooted at `start`: every child precedes
    /// its parent.
    #[must_use]
    pub fn post_order_from(&self, start: usize) -> Vec<usize> {
        let mut visited = vec![false; self.lines.len()];
        let mut order = Vec::new();
        self.walk(start, &mut visited, &mut order);
        order
    }

    /// Post-order of every subtree hanging from a root.
    #[must_use]
    pub fn post_order_from_roots(&self) -> Vec<usize> {
        let mut visited = vec![false; self.lines.len()];
        let mut order = Vec::with_capacity(self.lines.len());
        for &root in &self.roots {
            self.walk(root, &mut visited, &mut order);
        }
        order
    }

    /// Post-order covering every line exactly once: root subtrees first, then
    /// orphan subtrees. Lines caught in a parent cycle are still emitted, with
    /// the cycle edge that closes back on a visited line ignored.
    #[must_use]
    pub fn post_order(&self) -> Vec<usize> {
        let mut visited = vec![false; self.lines.len()];
        let mut order = Vec::with_capacity(self.lines.len());
        for &root in &self.roots {
            self.walk(root, &mut visited, &mut order);
        }
        for idx in 0..self.lines.len() {
            self.walk(idx, &mut visited, &mut order);
        }
        order
    }

    fn walk(&self, start: usize, visited: &mut [bool], order: &mut Vec<usize>) {
        if visited[start] {
            return;
        }
        visited[start] = true;

        // (node, index of the next child to descend into)
        let mut stack = vec![(start, 0usize)];
        while let Some(&(node, next)) = stack.last() {
            if let Some(&child) = self.children[node].get(next) {
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                if !visited[child] {
                    visited[child] = true;
                    stack.push((child, 0));
                }
            } else {
                stack.pop();
                order.push(node);
            }
        }
    }

    /// Bottom-up fold over `order`, which must list children before parents.
    ///
    /// Leaves are valued by `leaf`; titles by `title` applied to the values
    /// of their already-resolved children. Lines not in `order` stay `None`.
    pub fn roll_up<T, E, L, P>(
        &self,
        order: &[usize],
        mut leaf: L,
        mut title: P,
    ) -> Result<Vec<Option<T>>, E>
    where
        L: FnMut(&'a BudgetLine) -> Result<T, E>,
        P: FnMut(&'a BudgetLine, &[&T]) -> T,
    {
        let mut values: Vec<Option<T>> = std::iter::repeat_with(|| None)
            .take(self.lines.len())
            .collect();

        for &idx in order {
            let line = &self.lines[idx];
            let value = match self.kind(idx) {
                LineKind::Leaf => leaf(line)?,
                LineKind::Title => {
                    let resolved: Vec<&T> = self.children[idx]
                        .iter()
                        .filter_map(|&child| values[child].as_ref())
                        .collect();
                    title(line, &resolved)
                }
            };
            values[idx] = Some(value);
        }

        Ok(values)
    }
}
