//! Cycle detection
//!
//! Strongly connected components are found with Tarjan's algorithm. A
//! component is harmless when every edge inside it is lazy; otherwise the
//! shortest cycle through one of its eager edges is reported.

use super::ServiceGraph;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

struct Tarjan<'g> {
    graph: &'g ServiceGraph,
    next_index: usize,
    indices: HashMap<&'g str, usize>,
    lowlinks: HashMap<&'g str, usize>,
    stack: Vec<&'g str>,
    on_stack: HashSet<&'g str>,
    components: Vec<Vec<String>>,
}

impl<'g> Tarjan<'g> {
    fn open(&mut self, node: &'g str) {
        self.indices.insert(node, self.next_index);
        self.lowlinks.insert(node, self.next_index);
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack.insert(node);
    }

    /// Depth-first search from `root` with an explicit call stack of
    /// `(node, next edge)` frames
    fn connect(&mut self, root: &'g str) {
        let graph = self.graph;
        self.open(root);
        let mut calls: Vec<(&'g str, usize)> = vec![(root, 0)];
        while let Some(frame) = calls.last_mut() {
            let (node, position) = *frame;
            if let Some(edge) = graph.edges(node).get(position) {
                frame.1 += 1;
                let target = edge.target.as_str();
                if !self.indices.contains_key(target) {
                    self.open(target);
                    calls.push((target, 0));
                } else if self.on_stack.contains(target) {
                    let low = self.lowlink(node).min(self.index(target));
                    self.lowlinks.insert(node, low);
                }
                continue;
            }

            calls.pop();
            if self.lowlinks.get(node) == self.indices.get(node) {
                let mut component = Vec::new();
                while let Some(member) = self.stack.pop() {
                    self.on_stack.remove(member);
                    component.push(member.to_string());
                    if member == node {
                        break;
                    }
                }
                component.sort();
                self.components.push(component);
            }
            if let Some(&(parent, _)) = calls.last() {
                let low = self.lowlink(parent).min(self.lowlink(node));
                self.lowlinks.insert(parent, low);
            }
        }
    }

    fn lowlink(&self, node: &str) -> usize {
        self.lowlinks.get(node).copied().unwrap_or(usize::MAX)
    }

    fn index(&self, node: &str) -> usize {
        self.indices.get(node).copied().unwrap_or(usize::MAX)
    }
}

/// Strongly connected components, each sorted by identifier
pub fn strongly_connected_components(graph: &ServiceGraph) -> Vec<Vec<String>> {
    let mut tarjan = Tarjan {
        graph,
        next_index: 0,
        indices: HashMap::new(),
        lowlinks: HashMap::new(),
        stack: Vec::new(),
        on_stack: HashSet::new(),
        components: Vec::new(),
    };
    for node in graph.node_ids() {
        if !tarjan.indices.contains_key(node) {
            tarjan.connect(node);
        }
    }
    tarjan.components
}

/// The shortest cycle containing at least one eager edge, if any
///
/// The cycle starts at its smallest identifier and repeats it at the end,
/// e.g. `["a", "b", "a"]`.
pub fn find_fatal_cycle(graph: &ServiceGraph) -> Option<Vec<String>> {
    let mut best: Option<Vec<String>> = None;
    for component in strongly_connected_components(graph) {
        let members: BTreeSet<&str> = component.iter().map(String::as_str).collect();
        for source in &component {
            for edge in graph.edges(source) {
                if edge.lazy || !members.contains(edge.target.as_str()) {
                    continue;
                }
                let Some(path) = shortest_path(graph, &edge.target, source, &members) else {
                    continue;
                };
                let mut cycle = Vec::with_capacity(path.len() + 1);
                cycle.push(source.clone());
                if edge.target != *source {
                    cycle.extend(path);
                } else {
                    cycle.push(source.clone());
                }
                let cycle = canonical(cycle);
                let better = best.as_ref().is_none_or(|current| {
                    (cycle.len(), &cycle) < (current.len(), current)
                });
                if better {
                    best = Some(cycle);
                }
            }
        }
    }
    best
}

/// Breadth-first path `from -> ... -> to` inside `members`, both ends included
fn shortest_path(
    graph: &ServiceGraph,
    from: &str,
    to: &str,
    members: &BTreeSet<&str>,
) -> Option<Vec<String>> {
    let mut previous: HashMap<&str, &str> = HashMap::new();
    let mut visited: HashSet<&str> = HashSet::from([from]);
    let mut queue: VecDeque<&str> = VecDeque::from([from]);
    while let Some(node) = queue.pop_front() {
        if node == to {
            let mut path = vec![to.to_string()];
            let mut current = to;
            while let Some(&before) = previous.get(current) {
                path.push(before.to_string());
                current = before;
            }
            path.reverse();
            return Some(path);
        }
        for edge in graph.edges(node) {
            let target = edge.target.as_str();
            if members.contains(target) && visited.insert(target) {
                previous.insert(target, node);
                queue.push_back(target);
            }
        }
    }
    None
}

/// Rotate a closed cycle so it starts at its smallest identifier
fn canonical(mut cycle: Vec<String>) -> Vec<String> {
    cycle.pop();
    let start = cycle
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map_or(0, |(index, _)| index);
    cycle.rotate_left(start);
    if let Some(first) = cycle.first().cloned() {
        cycle.push(first);
    }
    cycle
}
