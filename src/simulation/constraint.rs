//! Distance constraints between particle pairs

use bytemuck::{Pod, Zeroable};
use cgmath::{InnerSpace, Vector3};

/// GPU record for one distance constraint
///
/// Only `particles[0]` and `particles[1]` are meaningful. The rest distance is
/// splatted across all four lanes of `rest_distance` so the record stays
/// 16-byte aligned on the WGSL side.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Constraint {
    pub particles: [u32; 4],
    pub rest_distance: [f32; 4],
}

impl Constraint {
    pub fn new(a: u32, b: u32, rest_length: f32) -> Self {
        Self {
            particles: [a, b, 0, 0],
            rest_distance: [rest_length; 4],
        }
    }

    pub fn endpoints(&self) -> (u32, u32) {
        (self.particles[0], self.particles[1])
    }

    pub fn rest_length(&self) -> f32 {
        self.rest_distance[0]
    }

    /// Endpoints with the smaller index first
    pub fn key(&self) -> (u32, u32) {
        let (a, b) = self.endpoints();
        (a.min(b), a.max(b))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Edge of a triangle
    Structural,
    /// Opposite vertices of two triangles sharing an edge
    Bending,
}

/// Append-only list of constraints with per-kind counters
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
    structural: usize,
    bending: usize,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            constraints: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Appends a constraint between `a` and `b` whose rest length is their
    /// current distance in `positions` (xyz only)
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range for `positions`.
    pub fn connect(&mut self, positions: &[[f32; 4]], a: u32, b: u32, kind: ConstraintKind) {
        let xyz = |i: u32| {
            let [x, y, z, _] = positions[i as usize];
            Vector3::new(x, y, z)
        };
        let rest_length = (xyz(b) - xyz(a)).magnitude();

        self.constraints.push(Constraint::new(a, b, rest_length));
        match kind {
            ConstraintKind::Structural => self.structural += 1,
            ConstraintKind::Bending => self.bending += 1,
        }
    }

    pub fn as_slice(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn structural_count(&self) -> usize {
        self.structural
    }

    pub fn bending_count(&self) -> usize {
        self.bending
    }
}

impl<'a> IntoIterator for &'a ConstraintSet {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_constraint_layout_matches_wgsl() {
        assert_eq!(size_of::<Constraint>(), 32);
        assert_eq!(offset_of!(Constraint, particles), 0);
        assert_eq!(offset_of!(Constraint, rest_distance), 16);
    }

    #[test]
    fn test_connect_measures_xyz_distance() {
        // w differs between the two points and must not contribute
        let positions = [[0.0, 0.0, 0.0, 1.0], [3.0, 4.0, 0.0, 0.0]];
        let mut set = ConstraintSet::new();
        set.connect(&positions, 0, 1, ConstraintKind::Structural);

        assert_eq!(set.len(), 1);
        let constraint = set.as_slice()[0];
        assert_eq!(constraint.endpoints(), (0, 1));
        assert!((constraint.rest_length() - 5.0).abs() < 1e-6);
        assert_eq!(constraint.rest_distance, [constraint.rest_length(); 4]);
        assert_eq!(constraint.particles[2..], [0, 0]);
    }

    #[test]
    fn test_counts_by_kind() {
        let positions = [[0.0; 4], [1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0]];
        let mut set = ConstraintSet::with_capacity(3);
        set.connect(&positions, 0, 1, ConstraintKind::Structural);
        set.connect(&positions, 1, 2, ConstraintKind::Structural);
        set.connect(&positions, 0, 2, ConstraintKind::Bending);

        assert_eq!(set.structural_count(), 2);
        assert_eq!(set.bending_count(), 1);
        assert_eq!(set.iter().count(), 3);
    }

    #[test]
    fn test_key_is_order_independent() {
        assert_eq!(Constraint::new(7, 2, 1.0).key(), (2, 7));
        assert_eq!(Constraint::new(2, 7, 1.0).key(), (2, 7));
    }

    #[test]
    #[should_panic]
    fn test_connect_out_of_range_panics() {
        let positions = [[0.0; 4]; 2];
        let mut set = ConstraintSet::new();
        set.connect(&positions, 0, 2, ConstraintKind::Structural);
    }
}
