//! Erdős–Rényi edge-list generation for test inputs.

use std::fmt::Write as _;

use rand::Rng;

use crate::edge_list::EdgeList;

/// Sample G(n, p).
///
/// Every unordered pair `{i, j}` with `i < j` is drawn independently with
/// probability `p`; a kept pair contributes both directed arcs. The result
/// is sorted lexicographically by (source, destination), which is exactly
/// the order the edge-list loader expects.
pub fn erdos_renyi<R: Rng>(n: usize, p: f64, rng: &mut R) -> Vec<(usize, usize)> {
    let mut edges = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if rng.gen::<f64>() <= p {
                edges.push((i, j));
                edges.push((j, i));
            }
        }
    }
    edges.sort_unstable();
    edges
}

/// Render pairs one per line in the loader's input format.
pub fn to_edge_lines(edges: &[(usize, usize)]) -> String {
    let mut out = String::new();
    for &(source, dest) in edges {
        let _ = writeln!(out, "{source} {dest}");
    }
    out
}

/// Build an [`EdgeList`] directly, bypassing the text round trip.
pub fn to_edge_list(edges: &[(usize, usize)]) -> EdgeList {
    let mut list = EdgeList::default();
    for &(source, dest) in edges {
        list.push(source, dest);
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;

    #[test]
    fn complete_graph_at_p_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let edges = erdos_renyi(10, 1.0, &mut rng);
        assert_eq!(edges.len(), 10 * 9);
    }

    #[test]
    fn empty_graph_at_p_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(erdos_renyi(10, 0.0, &mut rng).is_empty());
    }

    #[test]
    fn every_edge_emitted_both_ways_and_sorted() {
        let mut rng = StdRng::seed_from_u64(42);
        let edges = erdos_renyi(8, 0.5, &mut rng);
        let mut sorted = edges.clone();
        sorted.sort_unstable();
        assert_eq!(edges, sorted);
        for &(source, dest) in &edges {
            assert_ne!(source, dest);
            assert!(edges.contains(&(dest, source)));
        }
    }

    #[test]
    fn deterministic_under_seed() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(erdos_renyi(12, 0.3, &mut a), erdos_renyi(12, 0.3, &mut b));
    }

    #[test]
    fn lines_round_trip_through_the_loader() {
        let mut rng = StdRng::seed_from_u64(3);
        let edges = erdos_renyi(6, 0.7, &mut rng);
        let text = to_edge_lines(&edges);
        let parsed = EdgeList::from_reader(Cursor::new(text)).unwrap();
        let pairs: Vec<_> = parsed.iter().collect();
        assert_eq!(pairs, edges);
        assert_eq!(parsed, to_edge_list(&edges));
    }
}
