//! Greedy modularity community detection
//!
//! Agglomerative clustering in the style of Clauset, Newman and Moore:
//! start with every node in its own community and repeatedly merge the
//! adjacent pair of communities whose union raises modularity the most,
//! stopping when no merge helps. Equal gains are resolved by the lower
//! community index pair, so the result is fully deterministic.
//!
//! Community ids are relabelled afterwards: largest community first, ties
//! by the lowest node id they contain.

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::csr::CsrGraph;

/// A disjoint cover of the graph's nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition {
    /// Community id of each node, indexed by node id
    pub assignment: Vec<usize>,
    /// Members of each community, sorted by node id
    pub communities: Vec<Vec<u32>>,
    /// Modularity of this partition
    pub modularity: f64,
}

impl Partition {
    fn from_members(graph: &CsrGraph, mut members: Vec<Vec<u32>>) -> Self {
        for group in &mut members {
            group.sort_unstable();
        }
        members.retain(|group| !group.is_empty());
        members.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));

        let mut assignment = vec![0; graph.num_nodes];
        for (community, group) in members.iter().enumerate() {
            for &node in group {
                assignment[node as usize] = community;
            }
        }

        let modularity = modularity(graph, &assignment);
        Self {
            assignment,
            communities: members,
            modularity,
        }
    }

    pub fn len(&self) -> usize {
        self.communities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    /// Community of `node`
    pub fn community_of(&self, node: u32) -> Option<usize> {
        self.assignment.get(node as usize).copied()
    }
}

/// Newman modularity of `assignment` over `graph`.
///
/// Returns 0 for a graph without edge weight.
pub fn modularity(graph: &CsrGraph, assignment: &[usize]) -> f64 {
    let m = graph.total_weight();
    if m <= 0.0 {
        return 0.0;
    }

    let communities = assignment.iter().copied().max().map_or(0, |c| c + 1);
    let mut internal = vec![0.0; communities];
    let mut degree = vec![0.0; communities];

    for node in 0..graph.num_nodes as u32 {
        let c = assignment[node as usize];
        degree[c] += graph.node_strength(node);
        for (target, weight) in graph.neighbors(node) {
            if assignment[target as usize] != c {
                continue;
            }
            // Ordinary edges are stored in both rows, self-loops once.
            internal[c] += if target == node { weight } else { weight / 2.0 };
        }
    }

    internal
        .iter()
        .zip(&degree)
        .map(|(l, d)| l / m - (d / (2.0 * m)).powi(2))
        .sum()
}

/// Partition `graph` by greedy modularity agglomeration.
pub fn greedy_modularity(graph: &CsrGraph) -> Partition {
    let n = graph.num_nodes;
    let mut members: Vec<Vec<u32>> = (0..n as u32).map(|node| vec![node]).collect();

    let m = graph.total_weight();
    if m <= 0.0 {
        return Partition::from_members(graph, members);
    }

    let mut degree = graph.strength.clone();
    // between[c][d]: total weight of edges joining communities c and d
    let mut between: Vec<FxHashMap<usize, f64>> = vec![FxHashMap::default(); n];
    for node in 0..n {
        for (target, weight) in graph.neighbors(node as u32) {
            let target = target as usize;
            if target != node {
                *between[node].entry(target).or_insert(0.0) += weight;
            }
        }
    }

    let mut merges = 0usize;
    loop {
        let mut best: Option<(f64, usize, usize)> = None;
        for (a, links) in between.iter().enumerate() {
            for (&b, &weight) in links {
                if b <= a {
                    continue;
                }
                let gain = weight / m - degree[a] * degree[b] / (2.0 * m * m);
                let better = match best {
                    None => true,
                    Some((best_gain, best_a, best_b)) => {
                        gain > best_gain || (gain == best_gain && (a, b) < (best_a, best_b))
                    }
                };
                if better {
                    best = Some((gain, a, b));
                }
            }
        }

        let Some((gain, a, b)) = best else { break };
        if gain <= 0.0 {
            break;
        }

        // Merge b into a.
        let moved = std::mem::take(&mut members[b]);
        members[a].extend(moved);
        degree[a] += degree[b];
        degree[b] = 0.0;

        let links = std::mem::take(&mut between[b]);
        for (c, weight) in links {
            if c == a {
                continue;
            }
            between[c].remove(&b);
            *between[c].entry(a).or_insert(0.0) += weight;
            *between[a].entry(c).or_insert(0.0) += weight;
        }
        between[a].remove(&b);
        merges += 1;
    }

    trace_event!(nodes = n, merges, "greedy modularity finished");
    Partition::from_members(graph, members)
}
