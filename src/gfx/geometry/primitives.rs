use super::GeometryData;

/// Flat grid in the XY plane centred on the origin, facing +Z
///
/// `width_segments × height_segments` quads, two triangles each.
pub fn generate_plane(
    width: f32,
    height: f32,
    width_segments: u32,
    height_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::default();

    let w_segs = width_segments.max(1);
    let h_segs = height_segments.max(1);

    for y in 0..=h_segs {
        let pos_y = (y as f32 / h_segs as f32 - 0.5) * height;
        for x in 0..=w_segs {
            let pos_x = (x as f32 / w_segs as f32 - 0.5) * width;
            data.vertices.push([pos_x, pos_y, 0.0]);
            data.normals.push([0.0, 0.0, 1.0]);
        }
    }

    for y in 0..h_segs {
        for x in 0..w_segs {
            let i = y * (w_segs + 1) + x;
            let next_row = i + w_segs + 1;
            data.indices.extend_from_slice(&[i, i + 1, next_row]);
            data.indices.extend_from_slice(&[i + 1, next_row + 1, next_row]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0, 2, 2);

        assert_eq!(plane.vertex_count(), 9);
        assert_eq!(plane.triangle_count(), 8);
        assert_eq!(plane.vertices[0], [-1.0, -1.0, 0.0]);
        assert_eq!(plane.vertices[8], [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_plane_winding_faces_normal() {
        let plane = generate_plane(3.0, 2.0, 3, 2);
        for tri in plane.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| plane.vertices[i as usize]);
            let cross_z = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            assert!(cross_z > 0.0);
        }
    }

    #[test]
    fn test_plane_into_cloth_mesh() {
        let mesh = generate_plane(3.0, 3.0, 4, 4)
            .into_cloth_mesh("cloth")
            .unwrap();
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.positions[0], [-1.5, -1.5, 0.0]);
    }

    #[test]
    fn test_zero_segments_clamped() {
        let plane = generate_plane(1.0, 1.0, 0, 0);
        assert_eq!(plane.triangle_count(), 2);
    }
}
