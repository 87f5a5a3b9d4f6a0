//! Co-occurrence network construction
//!
//! [`NetworkBuilder::build`] turns pair counts into a connected, pruned,
//! community-labelled graph. Every stage is a gate; when one closes, the
//! caller gets an [`InsufficientGraphData`] describing which one and why.
//!
//! 1. drop pairs observed fewer than `min_cooccurrence` times
//! 2. nothing left → [`InsufficientGraphData::NoPairs`]
//! 3. take the `max_edges` most frequent pairs, skipping self-pairs when the
//!    policy removes them
//! 4. no edge added → [`InsufficientGraphData::NoEdges`]
//! 5. keep the largest connected component
//! 6. drop edges lighter than `max(1, max_weight / 5)`
//! 7. fewer than two nodes → [`InsufficientGraphData::TooSmallAfterFiltering`]
//! 8. assign communities by greedy modularity

use serde::Serialize;

use super::builder::GraphBuilder;
use super::community::{greedy_modularity, Partition};
use super::cooccurrence::PairCounts;
use super::csr::CsrGraph;
use crate::error::InsufficientGraphData;
use crate::frequency::FrequencyTable;
use crate::types::{AnalysisConfig, SelfLoopPolicy, WindowMode};

/// Edges lighter than `max_weight / WEAK_EDGE_RATIO` are pruned.
const WEAK_EDGE_RATIO: u64 = 5;

/// A word in the network
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkNode {
    pub word: String,
    /// Occurrences in the token stream (1 when unknown)
    pub frequency: usize,
    pub community: usize,
    /// Number of distinct neighbours
    pub degree: usize,
}

/// A weighted co-occurrence edge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkEdge {
    pub source: String,
    pub target: String,
    /// Raw co-occurrence count
    pub weight: u64,
    /// `weight / max_weight`, in (0, 1]
    pub normalized_weight: f64,
}

impl NetworkEdge {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Headline numbers for a chart title
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSummary {
    pub nodes: usize,
    pub edges: usize,
    pub communities: usize,
    pub window_mode: WindowMode,
    pub self_loops: SelfLoopPolicy,
    /// Pruning threshold applied in stage 6
    pub min_weight: u64,
    pub max_weight: u64,
    pub modularity: f64,
}

/// A connected co-occurrence network with community labels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CooccurrenceNetwork {
    nodes: Vec<NetworkNode>,
    edges: Vec<NetworkEdge>,
    communities: Vec<Vec<String>>,
    summary: NetworkSummary,
}

impl CooccurrenceNetwork {
    pub fn nodes(&self) -> &[NetworkNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[NetworkEdge] {
        &self.edges
    }

    pub fn summary(&self) -> &NetworkSummary {
        &self.summary
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Members of each community, largest first
    pub fn communities(&self) -> &[Vec<String>] {
        &self.communities
    }

    pub fn node(&self, word: &str) -> Option<&NetworkNode> {
        self.nodes.iter().find(|n| n.word == word)
    }

    pub fn community_of(&self, word: &str) -> Option<usize> {
        self.node(word).map(|n| n.community)
    }

    /// Weight of the edge `{a, b}` in either direction
    pub fn weight(&self, a: &str, b: &str) -> Option<u64> {
        self.edges
            .iter()
            .find(|e| (e.source == a && e.target == b) || (e.source == b && e.target == a))
            .map(|e| e.weight)
    }

    /// Whether every node is reachable from every other
    pub fn is_connected(&self) -> bool {
        let mut graph = GraphBuilder::with_capacity(self.nodes.len());
        for node in &self.nodes {
            graph.get_or_create_node(&node.word);
        }
        for edge in &self.edges {
            graph.add_edge(&edge.source, &edge.target, edge.weight);
        }
        graph.is_connected()
    }
}

/// Builds [`CooccurrenceNetwork`]s from pair counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkBuilder {
    pub min_cooccurrence: usize,
    pub max_edges: usize,
    pub self_loops: SelfLoopPolicy,
    /// Only recorded in the summary
    pub window_mode: WindowMode,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl NetworkBuilder {
    pub fn new(min_cooccurrence: usize, max_edges: usize, self_loops: SelfLoopPolicy) -> Self {
        Self {
            min_cooccurrence,
            max_edges,
            self_loops,
            window_mode: WindowMode::default(),
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            min_cooccurrence: config.min_cooccurrence,
            max_edges: config.max_edges,
            self_loops: config.self_loops,
            window_mode: config.window_mode,
        }
    }

    pub fn with_window_mode(mut self, mode: WindowMode) -> Self {
        self.window_mode = mode;
        self
    }

    /// Run stages 1–8 over `pairs`.
    ///
    /// `frequencies` only supplies node sizes; words missing from it get a
    /// frequency of 1.
    pub fn build(
        &self,
        pairs: &PairCounts,
        frequencies: &FrequencyTable,
    ) -> Result<CooccurrenceNetwork, InsufficientGraphData> {
        let retained = pairs.retain_min(self.min_cooccurrence);
        if retained.is_empty() {
            trace_event!(distinct = pairs.len(), "no pair reached the minimum count");
            return Err(InsufficientGraphData::NoPairs {
                min_cooccurrence: self.min_cooccurrence,
                distinct_pairs: pairs.len(),
                max_count: pairs.max_count(),
            });
        }

        let candidates = retained.most_common(self.max_edges);
        let mut self_loops_removed = 0;
        let mut graph = GraphBuilder::with_capacity(candidates.len());
        for &(pair, count) in &candidates {
            if pair.is_self_pair() && self.self_loops == SelfLoopPolicy::Remove {
                self_loops_removed += 1;
                continue;
            }
            if count < self.min_cooccurrence {
                continue;
            }
            graph.add_edge(pair.first(), pair.second(), count as u64);
        }

        if graph.is_empty() {
            return Err(InsufficientGraphData::NoEdges {
                candidate_pairs: candidates.len(),
                self_loops_removed,
            });
        }

        let graph = graph.restrict_to_largest_component();
        let max_weight = graph.max_weight();
        let min_weight = (max_weight / WEAK_EDGE_RATIO).max(1);
        // Pruning can split the graph again; keep it connected.
        let graph = graph
            .retain_edges(min_weight)
            .restrict_to_largest_component();

        trace_event!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            min_weight,
            "network pruned"
        );

        if graph.node_count() < 2 {
            return Err(InsufficientGraphData::TooSmallAfterFiltering {
                nodes: graph.node_count(),
                min_weight,
            });
        }

        let csr = CsrGraph::from_builder(&graph);
        let partition = greedy_modularity(&csr);
        Ok(self.assemble(&graph, &csr, &partition, frequencies, min_weight))
    }

    fn assemble(
        &self,
        graph: &GraphBuilder,
        csr: &CsrGraph,
        partition: &Partition,
        frequencies: &FrequencyTable,
        min_weight: u64,
    ) -> CooccurrenceNetwork {
        let max_weight = graph.max_weight();

        let nodes: Vec<NetworkNode> = graph
            .nodes()
            .map(|(id, node)| NetworkNode {
                word: node.word.clone(),
                frequency: frequencies.get(&node.word).max(1),
                community: partition.community_of(id).unwrap_or(0),
                degree: csr.degree(id),
            })
            .collect();

        let edges: Vec<NetworkEdge> = graph
            .edges()
            .into_iter()
            .map(|(from, to, weight)| NetworkEdge {
                source: csr.word(from).to_string(),
                target: csr.word(to).to_string(),
                weight,
                normalized_weight: weight as f64 / max_weight as f64,
            })
            .collect();

        let communities = partition
            .communities
            .iter()
            .map(|members| members.iter().map(|&id| csr.word(id).to_string()).collect())
            .collect();

        let summary = NetworkSummary {
            nodes: nodes.len(),
            edges: edges.len(),
            communities: partition.len(),
            window_mode: self.window_mode,
            self_loops: self.self_loops,
            min_weight,
            max_weight,
            modularity: partition.modularity,
        };

        CooccurrenceNetwork {
            nodes,
            edges,
            communities,
            summary,
        }
    }
}
