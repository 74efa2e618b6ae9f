//! Cycle detection over the screen dependency graph.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Find the first dependency cycle, if any.
///
/// Nodes are visited in the order given and each node's dependencies in
/// the order listed, so the cycle reported is stable for a given input.
/// The returned path starts and ends on the same screen, e.g. `[a, b, a]`.
///
/// Self-dependencies and dependencies on unknown screens are skipped; they
/// are reported as their own violations.
pub fn find_cycle<'a, I>(nodes: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = (&'a str, &'a [String])>,
{
    let nodes: Vec<(&str, &[String])> = nodes.into_iter().collect();

    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, (id, _)) in nodes.iter().enumerate() {
        index.entry(*id).or_insert(i);
    }

    let mut marks = vec![Mark::Unvisited; nodes.len()];

    for start in 0..nodes.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }

        // Explicit recursion stack: (node, position of the next dependency to follow).
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        marks[start] = Mark::OnStack;

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            let deps = nodes[node].1;

            if next == deps.len() {
                marks[node] = Mark::Done;
                stack.pop();
                continue;
            }
            frame.1 += 1;

            let Some(&dep) = index.get(deps[next].as_str()) else {
                continue;
            };
            if dep == node {
                continue;
            }

            match marks[dep] {
                Mark::Unvisited => {
                    marks[dep] = Mark::OnStack;
                    stack.push((dep, 0));
                }
                Mark::OnStack => {
                    let from = stack.iter().position(|&(n, _)| n == dep).unwrap_or(0);
                    let mut cycle: Vec<String> = stack[from..]
                        .iter()
                        .map(|&(n, _)| nodes[n].0.to_string())
                        .collect();
                    cycle.push(nodes[dep].0.to_string());
                    return Some(cycle);
                }
                Mark::Done => {}
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &[&str])]) -> Vec<(String, Vec<String>)> {
        edges
            .iter()
            .map(|(id, deps)| {
                (
                    (*id).to_string(),
                    deps.iter().map(|d| (*d).to_string()).collect(),
                )
            })
            .collect()
    }

    fn cycle_in(g: &[(String, Vec<String>)]) -> Option<Vec<String>> {
        find_cycle(g.iter().map(|(id, deps)| (id.as_str(), deps.as_slice())))
    }

    #[test]
    fn acyclic_graph_has_no_cycle() {
        let g = graph(&[("a", &[]), ("b", &["a"]), ("c", &["a", "b"])]);
        assert_eq!(cycle_in(&g), None);
    }

    #[test]
    fn two_node_cycle() {
        let g = graph(&[("a", &["b"]), ("b", &["a"])]);
        assert_eq!(cycle_in(&g).unwrap(), ["a", "b", "a"]);
    }

    #[test]
    fn reports_only_the_cycle_not_the_path_into_it() {
        let g = graph(&[("entry", &["x"]), ("x", &["y"]), ("y", &["z"]), ("z", &["x"])]);
        assert_eq!(cycle_in(&g).unwrap(), ["x", "y", "z", "x"]);
    }

    #[test]
    fn first_cycle_in_insertion_order_wins() {
        let g = graph(&[("p", &["q"]), ("q", &["p"]), ("a", &["b"]), ("b", &["a"])]);
        assert_eq!(cycle_in(&g).unwrap(), ["p", "q", "p"]);
    }

    #[test]
    fn self_and_unknown_dependencies_are_skipped() {
        let g = graph(&[("a", &["a", "ghost"]), ("b", &["a"])]);
        assert_eq!(cycle_in(&g), None);
    }
}
