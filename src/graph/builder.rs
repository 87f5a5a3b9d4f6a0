//! Graph builder with efficient edge handling
//!
//! This module provides a mutable, integer-weighted undirected graph that
//! uses FxHashMap for O(1) edge lookups during construction. Node ids are
//! assigned in insertion order and every derived graph (component
//! restriction, weight pruning) keeps the relative order of its nodes, so
//! all iteration is deterministic.

use rustc_hash::FxHashMap;

/// A node in the graph builder
#[derive(Debug, Clone)]
pub struct BuilderNode {
    /// The word for this node
    pub word: String,
    /// Adjacency list: target node ID -> edge weight (a self-loop appears
    /// once, keyed by the node's own id)
    pub edges: FxHashMap<u32, u64>,
}

impl BuilderNode {
    /// Create a new node
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            edges: FxHashMap::default(),
        }
    }

    /// Neighbours sorted by id
    pub fn sorted_edges(&self) -> Vec<(u32, u64)> {
        let mut edges: Vec<_> = self.edges.iter().map(|(&k, &v)| (k, v)).collect();
        edges.sort_unstable_by_key(|(k, _)| *k);
        edges
    }
}

/// A mutable graph builder optimized for incremental construction
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    /// Maps word -> node ID
    word_to_id: FxHashMap<String, u32>,
    /// Node storage
    nodes: Vec<BuilderNode>,
}

impl GraphBuilder {
    /// Create a new empty graph builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph builder with pre-allocated capacity
    pub fn with_capacity(node_capacity: usize) -> Self {
        Self {
            word_to_id: FxHashMap::with_capacity_and_hasher(node_capacity, Default::default()),
            nodes: Vec::with_capacity(node_capacity),
        }
    }

    /// Get or create a node for the given word, returning its ID
    pub fn get_or_create_node(&mut self, word: &str) -> u32 {
        if let Some(&id) = self.word_to_id.get(word) {
            return id;
        }

        let id = self.nodes.len() as u32;
        self.word_to_id.insert(word.to_string(), id);
        self.nodes.push(BuilderNode::new(word));
        id
    }

    /// Add `weight` to the edge between two nodes, creating it if needed.
    ///
    /// `from == to` records a self-loop.
    pub fn increment_edge(&mut self, from: u32, to: u32, weight: u64) {
        if let Some(node) = self.nodes.get_mut(from as usize) {
            *node.edges.entry(to).or_insert(0) += weight;
        }
        if from == to {
            return;
        }
        if let Some(node) = self.nodes.get_mut(to as usize) {
            *node.edges.entry(from).or_insert(0) += weight;
        }
    }

    /// Add an edge between two words, creating their nodes as needed.
    pub fn add_edge(&mut self, a: &str, b: &str, weight: u64) {
        let id_a = self.get_or_create_node(a);
        let id_b = self.get_or_create_node(b);
        self.increment_edge(id_a, id_b, weight);
    }

    /// Get the number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the total number of edges (each undirected edge and each
    /// self-loop counted once)
    pub fn edge_count(&self) -> usize {
        self.nodes()
            .map(|(id, node)| node.edges.keys().filter(|&&to| to >= id).count())
            .sum()
    }

    /// Every edge once as `(lower id, higher id, weight)`, sorted by ids
    pub fn edges(&self) -> Vec<(u32, u32, u64)> {
        let mut out = Vec::new();
        for (id, node) in self.nodes() {
            for (to, weight) in node.sorted_edges() {
                if to >= id {
                    out.push((id, to, weight));
                }
            }
        }
        out
    }

    /// Weight of the edge between two words, if present
    pub fn weight(&self, a: &str, b: &str) -> Option<u64> {
        let id_a = self.get_node_id(a)?;
        let id_b = self.get_node_id(b)?;
        self.nodes[id_a as usize].edges.get(&id_b).copied()
    }

    /// Largest edge weight, or 0 for a graph without edges
    pub fn max_weight(&self) -> u64 {
        self.nodes
            .iter()
            .flat_map(|n| n.edges.values().copied())
            .max()
            .unwrap_or(0)
    }

    /// Get a node by ID
    pub fn get_node(&self, id: u32) -> Option<&BuilderNode> {
        self.nodes.get(id as usize)
    }

    /// Get a node ID by word
    pub fn get_node_id(&self, word: &str) -> Option<u32> {
        self.word_to_id.get(word).copied()
    }

    /// Get the word for a node ID
    pub fn get_word(&self, id: u32) -> Option<&str> {
        self.nodes.get(id as usize).map(|n| n.word.as_str())
    }

    /// Iterate over all nodes
    pub fn nodes(&self) -> impl Iterator<Item = (u32, &BuilderNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i as u32, n))
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Connected components, each sorted by node id, ordered by their
    /// lowest node id
    pub fn components(&self) -> Vec<Vec<u32>> {
        let mut seen = vec![false; self.nodes.len()];
        let mut components = Vec::new();

        for start in 0..self.nodes.len() {
            if seen[start] {
                continue;
            }
            seen[start] = true;
            let mut stack = vec![start as u32];
            let mut component = Vec::new();
            while let Some(id) = stack.pop() {
                component.push(id);
                for &next in self.nodes[id as usize].edges.keys() {
                    if !seen[next as usize] {
                        seen[next as usize] = true;
                        stack.push(next);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }

    pub fn is_connected(&self) -> bool {
        self.components().len() <= 1
    }

    /// Node ids of the largest component (by node count). Among equally
    /// large components, the one holding the lowest node id wins.
    pub fn largest_component(&self) -> Vec<u32> {
        let mut best: Vec<u32> = Vec::new();
        for component in self.components() {
            if component.len() > best.len() {
                best = component;
            }
        }
        best
    }

    /// The subgraph induced by `keep`, with node order preserved
    pub fn induced_subgraph(&self, keep: &[u32]) -> GraphBuilder {
        let mut keep_mask = vec![false; self.nodes.len()];
        for &id in keep {
            if let Some(slot) = keep_mask.get_mut(id as usize) {
                *slot = true;
            }
        }

        let mut sub = GraphBuilder::with_capacity(keep.len());
        for (id, node) in self.nodes() {
            if keep_mask[id as usize] {
                sub.get_or_create_node(&node.word);
            }
        }
        for (from, to, weight) in self.edges() {
            if keep_mask[from as usize] && keep_mask[to as usize] {
                sub.add_edge(&self.nodes[from as usize].word, &self.nodes[to as usize].word, weight);
            }
        }
        sub
    }

    /// Restrict to the largest connected component.
    pub fn restrict_to_largest_component(&self) -> GraphBuilder {
        if self.is_connected() {
            return self.clone();
        }
        self.induced_subgraph(&self.largest_component())
    }

    /// Rebuild from the edges weighing at least `min_weight`.
    ///
    /// Nodes left without edges are dropped; survivors keep their relative
    /// order.
    pub fn retain_edges(&self, min_weight: u64) -> GraphBuilder {
        let surviving: Vec<_> = self
            .edges()
            .into_iter()
            .filter(|&(_, _, w)| w >= min_weight)
            .collect();

        let mut has_edge = vec![false; self.nodes.len()];
        for &(from, to, _) in &surviving {
            has_edge[from as usize] = true;
            has_edge[to as usize] = true;
        }

        let mut pruned = GraphBuilder::new();
        for (id, node) in self.nodes() {
            if has_edge[id as usize] {
                pruned.get_or_create_node(&node.word);
            }
        }
        for (from, to, weight) in surviving {
            pruned.add_edge(&self.nodes[from as usize].word, &self.nodes[to as usize].word, weight);
        }
        pruned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph() -> GraphBuilder {
        let mut builder = GraphBuilder::new();
        builder.add_edge("a", "b", 5);
        builder.add_edge("b", "c", 1);
        builder
    }

    #[test]
    fn test_graph_builder_basic() {
        let mut builder = GraphBuilder::new();

        let id_a = builder.get_or_create_node("machine");
        let id_b = builder.get_or_create_node("learning");
        let id_c = builder.get_or_create_node("machine"); // duplicate

        assert_eq!(id_a, id_c);
        assert_ne!(id_a, id_b);
        assert_eq!(builder.node_count(), 2);
    }

    #[test]
    fn test_edge_incrementing() {
        let mut builder = GraphBuilder::new();

        let id_a = builder.get_or_create_node("machine");
        let id_b = builder.get_or_create_node("learning");

        builder.increment_edge(id_a, id_b, 1);
        builder.increment_edge(id_b, id_a, 2);

        assert_eq!(builder.get_node(id_a).unwrap().edges.get(&id_b), Some(&3));
        assert_eq!(builder.get_node(id_b).unwrap().edges.get(&id_a), Some(&3));
        assert_eq!(builder.edge_count(), 1);
    }

    #[test]
    fn test_self_loop_recorded_once() {
        let mut builder = GraphBuilder::new();
        builder.add_edge("test", "test", 2);
        builder.add_edge("test", "other", 1);

        assert_eq!(builder.weight("test", "test"), Some(2));
        assert_eq!(builder.edge_count(), 2);
        assert_eq!(builder.edges(), vec![(0, 0, 2), (0, 1, 1)]);
    }

    #[test]
    fn test_components_and_largest() {
        let mut builder = GraphBuilder::new();
        builder.add_edge("a", "b", 1);
        builder.add_edge("c", "d", 1);
        builder.add_edge("d", "e", 1);

        assert_eq!(builder.components(), vec![vec![0, 1], vec![2, 3, 4]]);
        assert!(!builder.is_connected());

        let largest = builder.restrict_to_largest_component();
        assert_eq!(largest.node_count(), 3);
        assert_eq!(largest.get_word(0), Some("c"));
        assert!(largest.is_connected());
    }

    #[test]
    fn test_largest_component_tie_prefers_lowest_id() {
        let mut builder = GraphBuilder::new();
        builder.add_edge("x", "y", 1);
        builder.add_edge("p", "q", 9);

        assert_eq!(builder.largest_component(), vec![0, 1]);
    }

    #[test]
    fn test_retain_edges_drops_isolated_nodes() {
        let pruned = path_graph().retain_edges(2);

        assert_eq!(pruned.node_count(), 2);
        assert_eq!(pruned.weight("a", "b"), Some(5));
        assert_eq!(pruned.get_node_id("c"), None);
        assert_eq!(pruned.max_weight(), 5);
    }

    #[test]
    fn test_induced_subgraph_preserves_order() {
        let graph = path_graph();
        let sub = graph.induced_subgraph(&[2, 1]);

        assert_eq!(sub.get_word(0), Some("b"));
        assert_eq!(sub.get_word(1), Some("c"));
        assert_eq!(sub.weight("b", "c"), Some(1));
        assert_eq!(sub.weight("a", "b"), None);
    }

    #[test]
    fn test_empty_graph() {
        let builder = GraphBuilder::new();
        assert!(builder.is_empty());
        assert!(builder.is_connected());
        assert!(builder.largest_component().is_empty());
        assert_eq!(builder.max_weight(), 0);
    }
}
