//! Sequential CPU evaluation of the per-frame cloth step
//!
//! Mirrors `shaders/cloth_step.wgsl` phase by phase. The GPU runs phases
//! concurrently within a workgroup, so results match up to the ordering of
//! racing constraint and normal updates.

use cgmath::{InnerSpace, Vector3};

use super::constraint::Constraint;
use super::context::ClothUniforms;
use super::store::Particle;

/// Endpoints closer than this are treated as coincident
const MIN_DISTANCE: f32 = 1e-6;

fn xyz(v: [f32; 4]) -> Vector3<f32> {
    Vector3::new(v[0], v[1], v[2])
}

fn with_w(v: Vector3<f32>, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

/// Step 1: free particles accumulate external force and gravity
pub fn apply_forces(particles: &mut [Particle], uniforms: &ClothUniforms) {
    let total = Vector3::from(uniforms.force) + Vector3::from(uniforms.gravity);
    for particle in particles.iter_mut().filter(|p| !p.is_pinned()) {
        let acceleration = xyz(particle.acceleration) + total;
        particle.acceleration = with_w(acceleration, particle.acceleration[3]);
    }
}

/// Step 2: Verlet integration of free particles; clears every normal
pub fn integrate(particles: &mut [Particle], uniforms: &ClothUniforms) {
    let dt = uniforms.time_step;
    for particle in particles.iter_mut() {
        particle.accumulated_normal = [0.0; 4];
        if particle.is_pinned() {
            continue;
        }
        let current = xyz(particle.position);
        let previous = xyz(particle.old_position);
        let acceleration = xyz(particle.acceleration);
        let next = current + (current - previous) * uniforms.damping + acceleration * dt * dt;

        particle.old_position = particle.position;
        particle.position = with_w(next, particle.position[3]);
        particle.acceleration = [0.0; 4];
    }
}

/// Step 3: moves constraint endpoints towards their rest distance
pub fn relax(particles: &mut [Particle], constraints: &[Constraint], passes: u32) {
    for _ in 0..passes {
        for constraint in constraints {
            relax_one(particles, constraint);
        }
    }
}

fn relax_one(particles: &mut [Particle], constraint: &Constraint) {
    let (a, b) = constraint.endpoints();
    let (a, b) = (a as usize, b as usize);
    if a == b {
        return;
    }
    let first = particles[a];
    let second = particles[b];
    let first_free = !first.is_pinned();
    let second_free = !second.is_pinned();
    if !first_free && !second_free {
        return;
    }

    let p1 = xyz(first.position);
    let p2 = xyz(second.position);
    let delta = p2 - p1;
    let distance = delta.magnitude();
    if distance <= MIN_DISTANCE {
        return;
    }
    let correction = delta * ((distance - constraint.rest_length()) / distance);

    if first_free && second_free {
        particles[a].position = with_w(p1 + correction * 0.5, first.position[3]);
        particles[b].position = with_w(p2 - correction * 0.5, second.position[3]);
    } else if first_free {
        particles[a].position = with_w(p1 + correction, first.position[3]);
    } else {
        particles[b].position = with_w(p2 - correction, second.position[3]);
    }
}

/// Step 4: adds each triangle's unnormalized face normal to its three vertices
pub fn accumulate_normals(particles: &mut [Particle], triangles: &[[u32; 4]]) {
    for triangle in triangles {
        let [i0, i1, i2, _] = triangle.map(|i| i as usize);
        let p0 = xyz(particles[i0].position);
        let p1 = xyz(particles[i1].position);
        let p2 = xyz(particles[i2].position);
        let normal = (p1 - p0).cross(p2 - p0);
        for index in [i0, i1, i2] {
            let accumulated = xyz(particles[index].accumulated_normal) + normal;
            particles[index].accumulated_normal = with_w(accumulated, 0.0);
        }
    }
}

/// All four phases in dispatch order
pub fn step(
    particles: &mut [Particle],
    constraints: &[Constraint],
    triangles: &[[u32; 4]],
    uniforms: &ClothUniforms,
) {
    apply_forces(particles, uniforms);
    integrate(particles, uniforms);
    relax(particles, constraints, uniforms.relaxation_passes);
    accumulate_normals(particles, triangles);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniforms() -> ClothUniforms {
        ClothUniforms {
            relaxation_passes: 1,
            force: [0.0; 3],
            time_step: 0.1,
            gravity: [0.0, -1.0, 0.0],
            damping: 1.0,
            ..Default::default()
        }
    }

    fn particle(x: f32, y: f32, z: f32) -> Particle {
        Particle::from_vertex([x, y, z], [0.0, 0.0, 1.0])
    }

    fn distance(a: &Particle, b: &Particle) -> f32 {
        (xyz(a.position) - xyz(b.position)).magnitude()
    }

    #[test]
    fn test_forces_skip_pinned() {
        let mut particles = vec![particle(0.0, 0.0, 0.0), particle(1.0, 0.0, 0.0)];
        particles[1].pin();
        let mut u = uniforms();
        u.force = [0.5, 0.0, 0.0];

        apply_forces(&mut particles, &u);

        assert_eq!(particles[0].acceleration, [0.5, -1.0, 0.0, 0.0]);
        assert_eq!(particles[1].acceleration, [0.0; 4]);
    }

    #[test]
    fn test_free_fall_from_rest() {
        let mut particles = vec![particle(0.0, 0.0, 0.0)];
        let u = uniforms();

        apply_forces(&mut particles, &u);
        integrate(&mut particles, &u);

        let p = particles[0];
        assert!((p.position[1] + 0.01).abs() < 1e-6);
        assert_eq!(p.old_position, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(p.acceleration, [0.0; 4]);
        assert_eq!(p.pin_weight(), 1.0);
    }

    #[test]
    fn test_damping_scales_carried_velocity() {
        let mut particles = vec![particle(1.0, 0.0, 0.0)];
        particles[0].old_position = [0.0, 0.0, 0.0, 1.0];
        let mut u = uniforms();
        u.gravity = [0.0; 3];
        u.damping = 0.5;

        integrate(&mut particles, &u);

        assert!((particles[0].position[0] - 1.5).abs() < 1e-6);
        assert_eq!(particles[0].old_position, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_integrate_clears_normals_and_holds_pinned() {
        let mut particles = vec![particle(2.0, 3.0, 4.0)];
        particles[0].pin();
        particles[0].acceleration = [1.0, 1.0, 1.0, 0.0];
        let before = particles[0];

        integrate(&mut particles, &uniforms());

        assert_eq!(particles[0].position, before.position);
        assert_eq!(particles[0].old_position, before.old_position);
        assert_eq!(particles[0].accumulated_normal, [0.0; 4]);
    }

    #[test]
    fn test_steps_one_and_two_are_reproducible() {
        let initial: Vec<Particle> = (0..16)
            .map(|i| particle(i as f32 * 0.1, (i % 4) as f32, 0.0))
            .collect();
        let mut u = uniforms();
        u.force = [0.3, 0.1, -0.2];

        let run = || {
            let mut particles = initial.clone();
            for _ in 0..10 {
                apply_forces(&mut particles, &u);
                integrate(&mut particles, &u);
            }
            particles
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_relax_splits_correction_between_free_particles() {
        let mut particles = vec![particle(0.0, 0.0, 0.0), particle(2.0, 0.0, 0.0)];
        let constraints = [Constraint::new(0, 1, 1.0)];

        relax(&mut particles, &constraints, 1);

        assert!((particles[0].position[0] - 0.5).abs() < 1e-6);
        assert!((particles[1].position[0] - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_relax_free_particle_takes_full_correction() {
        let mut particles = vec![particle(0.0, 0.0, 0.0), particle(0.0, -3.0, 0.0)];
        particles[0].pin();
        let constraints = [Constraint::new(0, 1, 1.0)];

        relax(&mut particles, &constraints, 1);

        assert_eq!(particles[0].position, [0.0, 0.0, 0.0, 0.0]);
        assert!((distance(&particles[0], &particles[1]) - 1.0).abs() < 1e-6);
        assert_eq!(particles[1].pin_weight(), 1.0);
    }

    #[test]
    fn test_relax_skips_pinned_pairs_and_coincident_points() {
        let mut particles = vec![
            particle(0.0, 0.0, 0.0),
            particle(5.0, 0.0, 0.0),
            particle(1.0, 1.0, 1.0),
            particle(1.0, 1.0, 1.0),
        ];
        particles[0].pin();
        particles[1].pin();
        let before = particles.clone();
        let constraints = [Constraint::new(0, 1, 1.0), Constraint::new(2, 3, 1.0)];

        relax(&mut particles, &constraints, 3);

        assert_eq!(particles, before);
    }

    #[test]
    fn test_accumulated_normal_follows_winding() {
        let mut particles = vec![
            particle(0.0, 0.0, 0.0),
            particle(1.0, 0.0, 0.0),
            particle(0.0, 1.0, 0.0),
        ];
        for p in &mut particles {
            p.accumulated_normal = [0.0; 4];
        }

        accumulate_normals(&mut particles, &[[0, 1, 2, 0], [0, 1, 2, 0]]);

        for p in &particles {
            assert_eq!(p.accumulated_normal, [0.0, 0.0, 2.0, 0.0]);
        }
    }

    #[test]
    fn test_step_leaves_normals_from_current_frame_only() {
        let mut particles = vec![
            particle(0.0, 0.0, 0.0),
            particle(1.0, 0.0, 0.0),
            particle(0.0, 1.0, 0.0),
        ];
        for p in &mut particles {
            p.pin();
        }
        let triangles = [[0, 1, 2, 0]];

        for _ in 0..3 {
            step(&mut particles, &[], &triangles, &uniforms());
        }

        assert_eq!(particles[0].accumulated_normal, [0.0, 0.0, 1.0, 0.0]);
    }
}
