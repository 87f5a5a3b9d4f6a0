//! Compressed Sparse Row (CSR) graph representation
//!
//! CSR stores edges contiguously, making iteration over neighbors very fast.
//! Community detection walks every node's neighbourhood repeatedly, so the
//! finished co-occurrence graph is frozen into this layout first.

use super::builder::GraphBuilder;

/// A graph in Compressed Sparse Row format
#[derive(Debug, Clone)]
pub struct CsrGraph {
    /// Number of nodes
    pub num_nodes: usize,
    /// Row pointers: node i's edges are at indices row_ptr[i]..row_ptr[i+1]
    pub row_ptr: Vec<usize>,
    /// Column indices (target nodes) for each edge
    pub col_idx: Vec<u32>,
    /// Edge weights
    pub weights: Vec<f64>,
    /// Weighted degree of each node (a self-loop counts twice)
    pub strength: Vec<f64>,
    /// Words for each node
    pub words: Vec<String>,
}

impl CsrGraph {
    /// Convert a GraphBuilder into CSR format
    pub fn from_builder(builder: &GraphBuilder) -> Self {
        let num_nodes = builder.node_count();
        let mut row_ptr = Vec::with_capacity(num_nodes + 1);
        let mut col_idx = Vec::new();
        let mut weights = Vec::new();
        let mut strength = Vec::with_capacity(num_nodes);
        let mut words = Vec::with_capacity(num_nodes);

        row_ptr.push(0);

        for (id, node) in builder.nodes() {
            words.push(node.word.clone());

            let mut node_strength = 0.0;
            for (target, weight) in node.sorted_edges() {
                let weight = weight as f64;
                node_strength += if target == id { 2.0 * weight } else { weight };
                col_idx.push(target);
                weights.push(weight);
            }
            strength.push(node_strength);

            row_ptr.push(col_idx.len());
        }

        Self {
            num_nodes,
            row_ptr,
            col_idx,
            weights,
            strength,
            words,
        }
    }

    /// Iterate over neighbors of a node
    pub fn neighbors(&self, node: u32) -> impl Iterator<Item = (u32, f64)> + '_ {
        let start = self.row_ptr[node as usize];
        let end = self.row_ptr[node as usize + 1];
        (start..end).map(move |i| (self.col_idx[i], self.weights[i]))
    }

    /// Number of distinct neighbours (a self-loop counts as one)
    pub fn degree(&self, node: u32) -> usize {
        self.row_ptr[node as usize + 1] - self.row_ptr[node as usize]
    }

    /// Weighted degree of a node
    pub fn node_strength(&self, node: u32) -> f64 {
        self.strength[node as usize]
    }

    /// Sum of all edge weights, each undirected edge counted once
    pub fn total_weight(&self) -> f64 {
        self.strength.iter().sum::<f64>() / 2.0
    }

    /// Get the word for a node
    pub fn word(&self, node: u32) -> &str {
        &self.words[node as usize]
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.num_nodes == 0
    }

    /// Number of stored adjacency entries (undirected edges twice,
    /// self-loops once)
    pub fn num_entries(&self) -> usize {
        self.col_idx.len()
    }
}

impl Default for CsrGraph {
    fn default() -> Self {
        Self {
            num_nodes: 0,
            row_ptr: vec![0],
            col_idx: Vec::new(),
            weights: Vec::new(),
            strength: Vec::new(),
            words: Vec::new(),
        }
    }
}
