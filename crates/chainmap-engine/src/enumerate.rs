//! Candidate path enumeration.
//!
//! Hand-rolled simple-path DFS from every entry node to every objective
//! node. The graph is a DAG, so traversal terminates; the length and
//! per-pair candidate caps bound the output on adversarially dense graphs.

use crate::graph::AttackGraph;

/// An unscored candidate chain as dense node indices, entry first.
pub type Candidate = Vec<usize>;

/// Enumerate all simple paths from each entry to each objective.
///
/// Enumeration for a pair stops once `max_candidates_per_pair` paths have
/// been found; the returned flag is true iff any pair hit that cap. Paths
/// longer than `max_path_len` nodes are pruned without setting the flag.
/// An entry node that is itself an objective yields a single-node candidate.
pub fn enumerate_candidates(
    graph: &AttackGraph,
    entries: &[usize],
    objectives: &[usize],
    max_path_len: usize,
    max_candidates_per_pair: usize,
) -> (Vec<Candidate>, bool) {
    let mut candidates = Vec::new();
    let mut truncated = false;

    for &entry in entries {
        for &objective in objectives {
            let mut found = 0usize;

            let mut stack: Vec<Candidate> = vec![vec![entry]];
            while let Some(path) = stack.pop() {
                let node = *path.last().expect("path is never empty");

                if node == objective {
                    candidates.push(path);
                    found += 1;
                    if found >= max_candidates_per_pair {
                        truncated = true;
                        break;
                    }
                    continue;
                }

                if path.len() >= max_path_len {
                    continue;
                }

                for &next in &graph.adjacency[node] {
                    if path.contains(&next) {
                        continue;
                    }
                    let mut extended = path.clone();
                    extended.push(next);
                    stack.push(extended);
                }
            }
        }
    }

    tracing::debug!(
        entries = entries.len(),
        objectives = objectives.len(),
        candidates = candidates.len(),
        truncated,
        "enumerated candidate paths"
    );

    (candidates, truncated)
}
