//! PageRank file ranking over the dependency graph.
//!
//! Files are nodes; every symbol carried by a dependency contributes one
//! parallel edge from the referencing file to the defining file, so a
//! dependency with N symbols pulls N times the weight toward its target.
//! Rank is the stationary distribution of a random walker with teleport
//! probability `1 - DAMPING`, dangling mass redistributed uniformly.
//!
//! The graphs here may be cyclic; power iteration handles that without any
//! topological assumptions.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::types::{Dependency, FileInfo};

/// Damping factor: probability of following an edge vs. teleporting.
pub const DAMPING: f64 = 0.85;
/// Iteration cap for power iteration.
pub const MAX_ITERATIONS: usize = 100;
/// L1 convergence tolerance.
pub const TOLERANCE: f64 = 1e-6;

/// Compute PageRank over the dependency graph, write the scores back onto
/// the file infos, and sort them by descending rank (ties broken by
/// ascending path).
///
/// With zero dependencies every file gets the uniform 1/N; an empty file
/// list is a no-op.
pub fn rank(file_infos: &mut [FileInfo], deps: &[Dependency]) {
    if file_infos.is_empty() {
        return;
    }

    if deps.is_empty() {
        let uniform = 1.0 / file_infos.len() as f64;
        for fi in file_infos.iter_mut() {
            fi.rank = uniform;
        }
        sort_by_rank(file_infos);
        return;
    }

    let mut graph: DiGraph<(), ()> = DiGraph::new();
    let mut node_of: HashMap<String, NodeIndex> = HashMap::new();
    for fi in file_infos.iter() {
        node_of.insert(fi.path.clone(), graph.add_node(()));
    }

    for dep in deps {
        let (Some(&src), Some(&tgt)) = (
            node_of.get(dep.source.as_str()),
            node_of.get(dep.target.as_str()),
        ) else {
            continue;
        };
        // One parallel edge per symbol.
        for _ in &dep.symbols {
            graph.add_edge(src, tgt, ());
        }
    }

    let ranks = pagerank(&graph);

    for fi in file_infos.iter_mut() {
        fi.rank = ranks[node_of[fi.path.as_str()].index()];
    }
    sort_by_rank(file_infos);
}

fn sort_by_rank(file_infos: &mut [FileInfo]) {
    file_infos.sort_by(|a, b| {
        b.rank
            .total_cmp(&a.rank)
            .then_with(|| a.path.cmp(&b.path))
    });
}

/// Power iteration, ranks indexed by node index.
///
/// Per node v each round:
/// `rank'(v) = (1-a)/N + a*D/N + a * sum(rank(u) / out_degree(u))`
/// where D is the rank mass sitting on dangling nodes. Terminates when
/// the L1 change drops below [`TOLERANCE`] or after [`MAX_ITERATIONS`].
fn pagerank(graph: &DiGraph<(), ()>) -> Vec<f64> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }

    let out_degree: Vec<usize> = graph
        .node_indices()
        .map(|v| graph.edges(v).count())
        .collect();

    let teleport = (1.0 - DAMPING) / n as f64;
    let mut ranks = vec![1.0 / n as f64; n];

    for _ in 0..MAX_ITERATIONS {
        let dangling_sum: f64 = graph
            .node_indices()
            .filter(|v| out_degree[v.index()] == 0)
            .map(|v| ranks[v.index()])
            .sum();
        let base = teleport + DAMPING * dangling_sum / n as f64;

        let mut new_ranks = vec![base; n];
        for edge in graph.edge_references() {
            let src = edge.source().index();
            new_ranks[edge.target().index()] += DAMPING * ranks[src] / out_degree[src] as f64;
        }

        let diff: f64 = ranks
            .iter()
            .zip(&new_ranks)
            .map(|(old, new)| (new - old).abs())
            .sum();

        ranks = new_ranks;
        if diff < TOLERANCE {
            break;
        }
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(paths: &[&str]) -> Vec<FileInfo> {
        paths.iter().map(|p| FileInfo::new(*p, "python")).collect()
    }

    fn dep(source: &str, target: &str, symbols: &[&str]) -> Dependency {
        Dependency {
            source: source.into(),
            target: target.into(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn empty_is_noop() {
        let mut infos: Vec<FileInfo> = Vec::new();
        rank(&mut infos, &[]);
        assert!(infos.is_empty());
    }

    #[test]
    fn uniform_without_edges() {
        let mut infos = files(&["a.py", "b.py", "c.py"]);
        rank(&mut infos, &[]);
        for fi in &infos {
            assert!((fi.rank - 1.0 / 3.0).abs() < 1e-9, "{}: {}", fi.path, fi.rank);
        }
        // Equal ranks tie-break by path.
        assert_eq!(infos[0].path, "a.py");
    }

    #[test]
    fn single_file() {
        let mut infos = files(&["only.py"]);
        rank(&mut infos, &[]);
        assert!((infos[0].rank - 1.0).abs() < 1e-9);
    }

    #[test]
    fn referenced_file_ranks_highest() {
        let mut infos = files(&["a.py", "b.py", "c.py"]);
        let deps = vec![
            dep("a.py", "b.py", &["x"]),
            dep("c.py", "b.py", &["y"]),
        ];
        rank(&mut infos, &deps);

        assert_eq!(infos[0].path, "b.py");
        assert!(infos[0].rank > infos[1].rank);

        let total: f64 = infos.iter().map(|fi| fi.rank).sum();
        assert!((total - 1.0).abs() < 0.01, "ranks sum to {}", total);
    }

    #[test]
    fn two_files_one_reference() {
        let mut infos = files(&["a.py", "b.py"]);
        let deps = vec![dep("a.py", "b.py", &["foo"])];
        rank(&mut infos, &deps);

        assert_eq!(infos[0].path, "b.py");
        assert!(infos[0].rank > infos[1].rank);
        let total: f64 = infos.iter().map(|fi| fi.rank).sum();
        assert!((total - 1.0).abs() < 0.01);
    }

    #[test]
    fn symbol_count_weights_edges() {
        // b.py carries three symbols for a.py, d.py only one; b.py should
        // outrank d.py.
        let mut infos = files(&["a.py", "b.py", "d.py"]);
        let deps = vec![
            dep("a.py", "b.py", &["x", "y", "z"]),
            dep("a.py", "d.py", &["w"]),
        ];
        rank(&mut infos, &deps);
        assert_eq!(infos[0].path, "b.py");
        assert_eq!(infos[1].path, "d.py");
    }

    #[test]
    fn cyclic_graph_converges() {
        let mut infos = files(&["a.py", "b.py"]);
        let deps = vec![
            dep("a.py", "b.py", &["x"]),
            dep("b.py", "a.py", &["y"]),
        ];
        rank(&mut infos, &deps);
        let total: f64 = infos.iter().map(|fi| fi.rank).sum();
        assert!((total - 1.0).abs() < 0.01);
        assert!(infos.iter().all(|fi| fi.rank > 0.0));
    }

    #[test]
    fn chain_orders_by_depth() {
        // a -> b -> c: rank flows down the chain.
        let mut infos = files(&["a.py", "b.py", "c.py"]);
        let deps = vec![
            dep("a.py", "b.py", &["f"]),
            dep("b.py", "c.py", &["g"]),
        ];
        rank(&mut infos, &deps);
        let rank_of = |p: &str| infos.iter().find(|fi| fi.path == p).unwrap().rank;
        assert!(rank_of("c.py") >= rank_of("b.py"));
        assert!(rank_of("b.py") >= rank_of("a.py"));
    }
}
