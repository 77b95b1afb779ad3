//! Spring network construction from triangle-mesh topology
//!
//! Every face contributes its three edges as structural constraints. Every
//! unordered pair of faces sharing exactly two vertex indices contributes one
//! bending constraint between the two vertices that are not on the shared
//! edge. Constraints are never deduplicated: an edge shared by two faces is
//! emitted once per face.

use std::collections::{BTreeSet, HashMap};

use super::config::AdjacencyStrategy;
use super::constraint::{ConstraintKind, ConstraintSet};

/// Three particle indices of one triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Face {
    pub indices: [u32; 3],
}

/// Edge shared by two faces, together with the vertex each face has off that edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedEdge {
    pub edge: [u32; 2],
    /// `opposite[0]` belongs to the face `shared_edge` was called on,
    /// `opposite[1]` to the other face
    pub opposite: [u32; 2],
}

impl Face {
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self { indices: [a, b, c] }
    }

    /// Index pairs in emission order: (0,1), (0,2), (1,2)
    pub fn edges(&self) -> [(u32, u32); 3] {
        let [a, b, c] = self.indices;
        [(a, b), (a, c), (b, c)]
    }

    pub fn contains(&self, index: u32) -> bool {
        self.indices.contains(&index)
    }

    /// Returns the shared edge when exactly two distinct indices appear in both faces
    pub fn shared_edge(&self, other: &Face) -> Option<SharedEdge> {
        let mut shared = [0u32; 2];
        let mut count = 0;
        for (i, &index) in self.indices.iter().enumerate() {
            if self.indices[..i].contains(&index) || !other.contains(index) {
                continue;
            }
            if count == 2 {
                return None;
            }
            shared[count] = index;
            count += 1;
        }
        if count != 2 {
            return None;
        }

        Some(SharedEdge {
            edge: shared,
            opposite: [self.off_edge(shared)?, other.off_edge(shared)?],
        })
    }

    /// The single index of this face that is not on `edge`
    fn off_edge(&self, edge: [u32; 2]) -> Option<u32> {
        let mut rest = self.indices.iter().copied().filter(|i| !edge.contains(i));
        match (rest.next(), rest.next()) {
            (Some(vertex), None) => Some(vertex),
            _ => None,
        }
    }
}

/// Counts reported alongside a freshly built constraint set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TopologyStats {
    pub faces: usize,
    pub structural: usize,
    pub bending: usize,
}

/// Groups a flat index list into faces
///
/// # Panics
///
/// Panics if `indices.len()` is not a multiple of 3.
pub fn faces_from_indices(indices: &[u32]) -> Vec<Face> {
    assert!(
        indices.len() % 3 == 0,
        "index count {} is not a multiple of 3",
        indices.len()
    );
    indices
        .chunks_exact(3)
        .map(|tri| Face::new(tri[0], tri[1], tri[2]))
        .collect()
}

/// Builds the structural and bending constraints of a triangle mesh
///
/// Structural constraints come first, face by face. Bending constraints
/// follow in ascending `(i, j)` order of the face pair, whichever
/// strategy discovers the adjacency.
///
/// # Panics
///
/// Panics if `indices.len()` is not a multiple of 3 or if any index is out
/// of range for `positions`.
pub fn build_constraints(
    positions: &[[f32; 4]],
    indices: &[u32],
    strategy: AdjacencyStrategy,
) -> (ConstraintSet, TopologyStats) {
    let faces = faces_from_indices(indices);
    let mut set = ConstraintSet::with_capacity(faces.len() * 3 + faces.len() * 3 / 2);

    for face in &faces {
        for (a, b) in face.edges() {
            set.connect(positions, a, b, ConstraintKind::Structural);
        }
    }

    let mut add_bending = |i: usize, j: usize| {
        if let Some(shared) = faces[i].shared_edge(&faces[j]) {
            let [a, b] = shared.opposite;
            set.connect(positions, a, b, ConstraintKind::Bending);
        }
    };
    match strategy {
        AdjacencyStrategy::AllPairs => {
            for i in 0..faces.len() {
                for j in (i + 1)..faces.len() {
                    add_bending(i, j);
                }
            }
        }
        AdjacencyStrategy::EdgeMap => {
            for (i, j) in candidate_pairs(&faces) {
                add_bending(i, j);
            }
        }
    }

    let stats = TopologyStats {
        faces: faces.len(),
        structural: set.structural_count(),
        bending: set.bending_count(),
    };
    log::debug!(
        "Built {} structural and {} bending constraints from {} faces ({:?})",
        stats.structural,
        stats.bending,
        stats.faces,
        strategy
    );
    (set, stats)
}

/// Face pairs `(i, j)` with `i < j` that have at least one edge in common, sorted
fn candidate_pairs(faces: &[Face]) -> BTreeSet<(usize, usize)> {
    let mut incident: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
    for (face_index, face) in faces.iter().enumerate() {
        let mut seen: Vec<(u32, u32)> = Vec::with_capacity(3);
        for (a, b) in face.edges() {
            if a == b {
                continue;
            }
            let key = (a.min(b), a.max(b));
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);
            incident.entry(key).or_default().push(face_index);
        }
    }

    let mut pairs = BTreeSet::new();
    for bucket in incident.values() {
        for (n, &i) in bucket.iter().enumerate() {
            for &j in &bucket[n + 1..] {
                pairs.insert((i.min(j), i.max(j)));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::constraint::Constraint;
    use rand::seq::SliceRandom;

    fn grid_positions(columns: u32, rows: u32) -> Vec<[f32; 4]> {
        let mut positions = Vec::new();
        for y in 0..=rows {
            for x in 0..=columns {
                positions.push([x as f32, y as f32, 0.0, 1.0]);
            }
        }
        positions
    }

    fn grid_indices(columns: u32, rows: u32) -> Vec<u32> {
        let mut indices = Vec::new();
        for y in 0..rows {
            for x in 0..columns {
                let i = y * (columns + 1) + x;
                let next = i + columns + 1;
                indices.extend_from_slice(&[i, next, i + 1, next, next + 1, i + 1]);
            }
        }
        indices
    }

    fn sorted_tuples(constraints: &[Constraint]) -> Vec<(u32, u32, u32)> {
        let mut tuples: Vec<_> = constraints
            .iter()
            .map(|c| {
                let (a, b) = c.key();
                (a, b, c.rest_length().to_bits())
            })
            .collect();
        tuples.sort_unstable();
        tuples
    }

    #[test]
    fn test_opposite_vertices_with_known_winding() {
        let a = Face::new(0, 1, 2);
        let b = Face::new(3, 2, 1);

        let shared = a.shared_edge(&b).unwrap();
        assert_eq!(shared.edge, [1, 2]);
        assert_eq!(shared.opposite, [0, 3]);

        let reversed = b.shared_edge(&a).unwrap();
        assert_eq!(reversed.opposite, [3, 0]);
    }

    #[test]
    fn test_opposite_vertex_independent_of_rotation() {
        let a = Face::new(2, 0, 1);
        for b in [Face::new(1, 3, 2), Face::new(3, 2, 1), Face::new(2, 1, 3)] {
            assert_eq!(a.shared_edge(&b).unwrap().opposite, [0, 3]);
        }
    }

    #[test]
    fn test_shared_edge_requires_exactly_two_indices() {
        let a = Face::new(0, 1, 2);
        assert!(a.shared_edge(&Face::new(2, 3, 4)).is_none());
        assert!(a.shared_edge(&Face::new(5, 6, 7)).is_none());
        assert!(a.shared_edge(&Face::new(2, 1, 0)).is_none());
    }

    #[test]
    fn test_degenerate_faces_have_no_opposite() {
        // Shares {1, 2} but has no vertex off the edge
        let a = Face::new(0, 1, 2);
        assert!(a.shared_edge(&Face::new(1, 2, 2)).is_none());
        assert!(Face::new(1, 2, 2).shared_edge(&a).is_none());
    }

    #[test]
    fn test_quad_produces_six_structural_one_bending() {
        let positions = grid_positions(1, 1);
        let indices = grid_indices(1, 1);

        let (set, stats) = build_constraints(&positions, &indices, AdjacencyStrategy::AllPairs);

        assert_eq!(stats.faces, 2);
        assert_eq!(stats.structural, 6);
        assert_eq!(stats.bending, 1);
        let bending = set.as_slice()[6];
        assert_eq!(bending.key(), (0, 3));
        assert!((bending.rest_length() - 2.0f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_structural_emitted_per_face_in_edge_order() {
        let positions = grid_positions(1, 1);
        let (set, _) = build_constraints(&positions, &[0, 2, 1], AdjacencyStrategy::AllPairs);
        let endpoints: Vec<_> = set.iter().map(|c| c.endpoints()).collect();
        assert_eq!(endpoints, vec![(0, 2), (0, 1), (2, 1)]);
    }

    #[test]
    fn test_grid_counts() {
        let (columns, rows) = (4, 3);
        let positions = grid_positions(columns, rows);
        let indices = grid_indices(columns, rows);

        let (_, stats) = build_constraints(&positions, &indices, AdjacencyStrategy::AllPairs);

        let quads = (columns * rows) as usize;
        assert_eq!(stats.faces, quads * 2);
        assert_eq!(stats.structural, 3 * stats.faces);
        // diagonals + interior vertical edges + interior horizontal edges
        let interior = quads + ((columns - 1) * rows) as usize + (columns * (rows - 1)) as usize;
        assert_eq!(stats.bending, interior);
    }

    #[test]
    fn test_rest_lengths_match_initial_distances() {
        let positions = grid_positions(3, 3);
        let indices = grid_indices(3, 3);
        let (set, _) = build_constraints(&positions, &indices, AdjacencyStrategy::EdgeMap);

        for constraint in &set {
            let (a, b) = constraint.endpoints();
            let pa = positions[a as usize];
            let pb = positions[b as usize];
            let expected = ((pb[0] - pa[0]).powi(2) + (pb[1] - pa[1]).powi(2)).sqrt();
            assert!((constraint.rest_length() - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_edge_map_matches_all_pairs_in_order() {
        let positions = grid_positions(5, 4);
        let indices = grid_indices(5, 4);

        let (all_pairs, _) = build_constraints(&positions, &indices, AdjacencyStrategy::AllPairs);
        let (edge_map, _) = build_constraints(&positions, &indices, AdjacencyStrategy::EdgeMap);

        assert_eq!(all_pairs.as_slice(), edge_map.as_slice());
    }

    #[test]
    fn test_shuffled_faces_give_same_multiset() {
        let positions = grid_positions(4, 4);
        let indices = grid_indices(4, 4);
        let (reference, _) = build_constraints(&positions, &indices, AdjacencyStrategy::AllPairs);

        let mut faces: Vec<[u32; 3]> = indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
            .collect();
        let mut rng = rand::rng();
        for _ in 0..5 {
            faces.shuffle(&mut rng);
            let shuffled: Vec<u32> = faces.iter().flatten().copied().collect();
            for strategy in [AdjacencyStrategy::AllPairs, AdjacencyStrategy::EdgeMap] {
                let (set, _) = build_constraints(&positions, &shuffled, strategy);
                assert_eq!(sorted_tuples(set.as_slice()), sorted_tuples(reference.as_slice()));
            }
        }
    }

    #[test]
    fn test_split_seam_skips_bending() {
        // Vertices 3 and 4 duplicate 2 and 1 at the same positions
        let positions = vec![
            [0.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 1.0],
            [0.0, 1.0, 0.0, 1.0],
            [0.0, 1.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 1.0],
            [1.0, 1.0, 0.0, 1.0],
        ];
        let indices = [0, 1, 2, 3, 4, 5];
        let (_, stats) = build_constraints(&positions, &indices, AdjacencyStrategy::EdgeMap);
        assert_eq!(stats.structural, 6);
        assert_eq!(stats.bending, 0);
    }

    #[test]
    fn test_non_manifold_edge_bends_every_pair() {
        let positions = vec![
            [0.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 1.0],
            [0.0, 1.0, 0.0, 1.0],
            [0.0, -1.0, 0.0, 1.0],
            [0.0, 0.0, 1.0, 1.0],
        ];
        // Three fins around edge (0, 1)
        let indices = [0, 1, 2, 0, 1, 3, 1, 0, 4];
        for strategy in [AdjacencyStrategy::AllPairs, AdjacencyStrategy::EdgeMap] {
            let (set, stats) = build_constraints(&positions, &indices, strategy);
            assert_eq!(stats.bending, 3);
            let bending: Vec<_> = set.as_slice()[9..].iter().map(|c| c.key()).collect();
            assert_eq!(bending, vec![(2, 3), (2, 4), (3, 4)]);
        }
    }

    #[test]
    fn test_duplicate_faces_are_not_adjacent() {
        let positions = grid_positions(1, 1);
        let (_, stats) =
            build_constraints(&positions, &[0, 1, 2, 0, 1, 2], AdjacencyStrategy::EdgeMap);
        assert_eq!(stats.structural, 6);
        assert_eq!(stats.bending, 0);
    }

    #[test]
    #[should_panic(expected = "not a multiple of 3")]
    fn test_partial_triangle_panics() {
        faces_from_indices(&[0, 1, 2, 3]);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_index_panics() {
        let positions = grid_positions(1, 1);
        build_constraints(&positions, &[0, 1, 9], AdjacencyStrategy::AllPairs);
    }
}
