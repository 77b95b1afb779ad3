//! CPU-authored initial cloth state: particles, constraints and triangles

use bytemuck::{Pod, Zeroable};

use super::config::{ClothConfig, PinRule};
use super::constraint::{Constraint, ConstraintSet};
use super::error::ClothError;
use super::topology::{self, TopologyStats};

/// GPU record for one cloth particle
///
/// The pin weight lives in `position[3]`: 0 holds the particle fixed,
/// 1 lets it move.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Particle {
    pub position: [f32; 4],
    pub old_position: [f32; 4],
    pub acceleration: [f32; 4],
    pub accumulated_normal: [f32; 4],
}

impl Particle {
    pub const FREE: f32 = 1.0;
    pub const PINNED: f32 = 0.0;

    pub fn from_vertex(position: [f32; 3], normal: [f32; 3]) -> Self {
        let position = [position[0], position[1], position[2], Self::FREE];
        Self {
            position,
            old_position: position,
            acceleration: [0.0; 4],
            accumulated_normal: [normal[0], normal[1], normal[2], 0.0],
        }
    }

    pub fn pin_weight(&self) -> f32 {
        self.position[3]
    }

    pub fn is_pinned(&self) -> bool {
        self.position[3] == Self::PINNED
    }

    pub fn pin(&mut self) {
        self.position[3] = Self::PINNED;
    }

    pub fn xyz(&self) -> [f32; 3] {
        [self.position[0], self.position[1], self.position[2]]
    }
}

/// Triangle mesh handed over by the asset loader
#[derive(Debug, Clone, PartialEq)]
pub struct ClothMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl ClothMesh {
    pub fn new(
        name: impl Into<String>,
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        indices: Vec<u32>,
    ) -> Result<Self, ClothError> {
        let name = name.into();
        if positions.is_empty() {
            return Err(ClothError::invalid_mesh(&name, "mesh has no vertices"));
        }
        if positions.len() != normals.len() {
            return Err(ClothError::invalid_mesh(
                &name,
                format!(
                    "{} positions but {} normals",
                    positions.len(),
                    normals.len()
                ),
            ));
        }
        if indices.is_empty() || indices.len() % 3 != 0 {
            return Err(ClothError::invalid_mesh(
                &name,
                format!("index count {} is not a positive multiple of 3", indices.len()),
            ));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(ClothError::invalid_mesh(
                &name,
                format!("index {} out of range for {} vertices", index, positions.len()),
            ));
        }

        Ok(Self {
            name,
            positions,
            normals,
            indices,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Per-cloth counts shown in the control panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClothStats {
    pub name: String,
    pub particles: usize,
    pub pinned: usize,
    pub structural: usize,
    pub bending: usize,
    pub triangles: usize,
}

/// Initial particle snapshot plus the immutable constraint list of one cloth
#[derive(Debug, Clone)]
pub struct ClothStore {
    name: String,
    particles: Vec<Particle>,
    constraints: ConstraintSet,
    indices: Vec<u32>,
    topology: TopologyStats,
    pinned: usize,
}

impl ClothStore {
    pub fn new(mesh: &ClothMesh, config: &ClothConfig) -> Self {
        let mut particles: Vec<Particle> = mesh
            .positions
            .iter()
            .zip(&mesh.normals)
            .map(|(&position, &normal)| Particle::from_vertex(position, normal))
            .collect();

        let positions: Vec<[f32; 4]> = particles.iter().map(|p| p.position).collect();
        let (constraints, topology) =
            topology::build_constraints(&positions, &mesh.indices, config.adjacency);

        let pinned = match &config.pin_rule {
            Some(rule) => apply_pinning(&mut particles, rule),
            None => 0,
        };

        log::info!(
            "Cloth '{}': {} particles ({} pinned), {} structural + {} bending constraints, {} triangles",
            mesh.name,
            particles.len(),
            pinned,
            topology.structural,
            topology.bending,
            topology.faces
        );

        Self {
            name: mesh.name.clone(),
            particles,
            constraints,
            indices: mesh.indices.clone(),
            topology,
            pinned,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn constraints(&self) -> &[Constraint] {
        self.constraints.as_slice()
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Triangle records for the normal accumulation phase
    pub fn triangles(&self) -> Vec<[u32; 4]> {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2], 0])
            .collect()
    }

    pub fn triangle_count(&self) -> usize {
        self.topology.faces
    }

    pub fn pinned_count(&self) -> usize {
        self.pinned
    }

    pub fn stats(&self) -> ClothStats {
        ClothStats {
            name: self.name.clone(),
            particles: self.particles.len(),
            pinned: self.pinned,
            structural: self.topology.structural,
            bending: self.topology.bending,
            triangles: self.topology.faces,
        }
    }
}

/// Zeroes the pin weight of every particle the rule selects, returning how many
pub fn apply_pinning(particles: &mut [Particle], rule: &PinRule) -> usize {
    let mut pinned = 0;
    for particle in particles.iter_mut() {
        if rule.pins(particle.position) {
            particle.pin();
            pinned += 1;
        }
    }
    pinned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::Axis;
    use std::mem::{offset_of, size_of};

    fn strip_mesh() -> ClothMesh {
        // Four quads along x from 0.0 to 2.0
        let mut positions = Vec::new();
        for x in 0..5 {
            positions.push([x as f32 * 0.5, 0.0, 0.0]);
            positions.push([x as f32 * 0.5, 1.0, 0.0]);
        }
        let normals = vec![[0.0, 0.0, 1.0]; positions.len()];
        let mut indices = Vec::new();
        for quad in 0..4u32 {
            let i = quad * 2;
            indices.extend_from_slice(&[i, i + 2, i + 1, i + 1, i + 2, i + 3]);
        }
        ClothMesh::new("strip_cloth", positions, normals, indices).unwrap()
    }

    #[test]
    fn test_particle_layout_matches_wgsl() {
        assert_eq!(size_of::<Particle>(), 64);
        assert_eq!(offset_of!(Particle, position), 0);
        assert_eq!(offset_of!(Particle, old_position), 16);
        assert_eq!(offset_of!(Particle, acceleration), 32);
        assert_eq!(offset_of!(Particle, accumulated_normal), 48);
    }

    #[test]
    fn test_from_vertex_starts_at_rest() {
        let particle = Particle::from_vertex([1.0, 2.0, 3.0], [0.0, 1.0, 0.0]);
        assert_eq!(particle.position, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(particle.old_position, particle.position);
        assert_eq!(particle.acceleration, [0.0; 4]);
        assert_eq!(particle.accumulated_normal, [0.0, 1.0, 0.0, 0.0]);
        assert!(!particle.is_pinned());
    }

    #[test]
    fn test_mesh_validation() {
        let ok = ClothMesh::new("cloth", vec![[0.0; 3]; 3], vec![[0.0; 3]; 3], vec![0, 1, 2]);
        assert!(ok.is_ok());

        let cases = [
            ClothMesh::new("cloth", vec![[0.0; 3]; 3], vec![[0.0; 3]; 2], vec![0, 1, 2]),
            ClothMesh::new("cloth", vec![[0.0; 3]; 3], vec![[0.0; 3]; 3], vec![0, 1]),
            ClothMesh::new("cloth", vec![[0.0; 3]; 3], vec![[0.0; 3]; 3], vec![0, 1, 3]),
            ClothMesh::new("cloth", vec![], vec![], vec![]),
        ];
        for case in cases {
            assert!(matches!(case, Err(ClothError::InvalidMesh { .. })));
        }
    }

    #[test]
    fn test_default_rule_pins_right_edge() {
        let store = ClothStore::new(&strip_mesh(), &ClothConfig::default());

        // Only x = 1.5 and x = 2.0 exceed 1.2
        assert_eq!(store.pinned_count(), 4);
        for particle in store.particles() {
            assert_eq!(particle.is_pinned(), particle.position[0] > 1.2);
        }
    }

    #[test]
    fn test_pinning_disabled_or_rerouted() {
        let free = ClothStore::new(&strip_mesh(), &ClothConfig::default().without_pinning());
        assert_eq!(free.pinned_count(), 0);
        assert!(free.particles().iter().all(|p| p.pin_weight() == 1.0));

        let top = ClothStore::new(
            &strip_mesh(),
            &ClothConfig::default().with_pin_rule(PinRule::new(Axis::Y, 0.5)),
        );
        assert_eq!(top.pinned_count(), 5);
    }

    #[test]
    fn test_rest_lengths_unaffected_by_pinning() {
        let store = ClothStore::new(&strip_mesh(), &ClothConfig::default());
        for constraint in store.constraints() {
            let (a, b) = constraint.endpoints();
            let pa = store.particles()[a as usize].xyz();
            let pb = store.particles()[b as usize].xyz();
            let distance = ((pb[0] - pa[0]).powi(2) + (pb[1] - pa[1]).powi(2)).sqrt();
            assert!((constraint.rest_length() - distance).abs() < 1e-6);
        }
    }

    #[test]
    fn test_triangles_and_stats() {
        let store = ClothStore::new(&strip_mesh(), &ClothConfig::default());
        let triangles = store.triangles();

        assert_eq!(triangles.len(), 8);
        assert_eq!(triangles[0], [0, 2, 1, 0]);
        let stats = store.stats();
        assert_eq!(stats.name, "strip_cloth");
        assert_eq!(stats.particles, 10);
        assert_eq!(stats.triangles, 8);
        assert_eq!(stats.structural, 24);
        // one diagonal per quad plus three interior rungs
        assert_eq!(stats.bending, 7);
    }
}
