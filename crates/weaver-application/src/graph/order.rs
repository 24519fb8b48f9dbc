//! Construction order
//!
//! The order in which a service and its eager dependencies are built is a
//! post-order depth-first walk: every dependency is complete before its
//! dependent. Among the dependencies of one node, the one with the longest
//! chain below it is visited first; ties keep argument order. Lazy edges are
//! not followed, their targets are built on first use.
//!
//! Both walks use an explicit stack, so chain depth is bounded by memory
//! rather than by the thread's stack.

use super::ServiceGraph;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Computes resolution orders over one graph, memoizing node heights
pub struct OrderPlanner<'g> {
    graph: &'g ServiceGraph,
    heights: HashMap<&'g str, usize>,
}

impl<'g> OrderPlanner<'g> {
    /// Create a planner for `graph`
    pub fn new(graph: &'g ServiceGraph) -> Self {
        Self {
            graph,
            heights: HashMap::new(),
        }
    }

    /// Every node `root` needs, deepest first, `root` last
    pub fn resolution_order(&mut self, root: &'g str) -> Vec<String> {
        let order = post_order(root, |node| {
            let mut targets = self.eager_targets(node);
            for target in &targets {
                self.height(target);
            }
            targets.sort_by_key(|target| std::cmp::Reverse(self.heights.get(target).copied()));
            targets
        });
        order.into_iter().map(str::to_string).collect()
    }

    /// Length of the longest eager chain below `node`
    ///
    /// A node reached again while its own chain is being measured counts as
    /// a leaf; eager cycles are rejected before any order is planned.
    pub fn height(&mut self, node: &'g str) -> usize {
        if let Some(height) = self.heights.get(node) {
            return *height;
        }
        let mut in_progress: HashSet<&'g str> = HashSet::new();
        let mut stack = vec![(node, false)];
        while let Some((current, expanded)) = stack.pop() {
            if self.heights.contains_key(current) {
                continue;
            }
            let targets = self.eager_targets(current);
            if expanded {
                let height = targets
                    .iter()
                    .map(|target| self.heights.get(target).map_or(0, |height| height + 1))
                    .max()
                    .unwrap_or(0);
                in_progress.remove(current);
                self.heights.insert(current, height);
            } else if in_progress.insert(current) {
                stack.push((current, true));
                stack.extend(
                    targets
                        .into_iter()
                        .filter(|target| !in_progress.contains(target))
                        .map(|target| (target, false)),
                );
            }
        }
        self.heights.get(node).copied().unwrap_or(0)
    }

    fn eager_targets(&self, node: &'g str) -> Vec<&'g str> {
        let graph = self.graph;
        let mut seen = HashSet::new();
        graph
            .edges(node)
            .iter()
            .filter(|edge| !edge.lazy && seen.insert(edge.target.as_str()))
            .map(|edge| edge.target.as_str())
            .collect()
    }
}

/// Post-order walk from `root`, each node once, `root` last
///
/// `ranked_targets` returns the children of a node in visiting order.
pub fn post_order<N, F>(root: N, mut ranked_targets: F) -> Vec<N>
where
    N: Copy + Eq + Hash,
    F: FnMut(N) -> Vec<N>,
{
    struct Frame<N> {
        node: N,
        targets: Vec<N>,
        next: usize,
    }

    let mut order = Vec::new();
    let mut visited = HashSet::from([root]);
    let mut stack = vec![Frame {
        node: root,
        targets: ranked_targets(root),
        next: 0,
    }];
    while let Some(frame) = stack.last_mut() {
        let target = frame.targets.get(frame.next).copied();
        frame.next += 1;
        match target {
            Some(target) => {
                if visited.insert(target) {
                    let targets = ranked_targets(target);
                    stack.push(Frame {
                        node: target,
                        targets,
                        next: 0,
                    });
                }
            }
            None => {
                let node = frame.node;
                stack.pop();
                order.push(node);
            }
        }
    }
    order
}
