use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use crate::types::PlaneGeometry;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub(crate) const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("a {width_segments}x{height_segments} plane does not fit 32-bit indices")]
    TooLarge {
        width_segments: u32,
        height_segments: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaneMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl PlaneMesh {
    /// Grid in the xy plane centred on the origin, facing +z. Rows run top to
    /// bottom; uv (0,0) is the top-left corner, matching image row order.
    pub fn build(geometry: &PlaneGeometry) -> Result<Self, MeshError> {
        let grid_x = geometry.width_segments.max(1);
        let grid_y = geometry.height_segments.max(1);
        let (vertex_count, index_count) =
            buffer_sizes(grid_x, grid_y).ok_or(MeshError::TooLarge {
                width_segments: geometry.width_segments,
                height_segments: geometry.height_segments,
            })?;
        let columns = grid_x + 1;

        let half_width = geometry.width / 2.0;
        let half_height = geometry.height / 2.0;
        let segment_width = geometry.width / grid_x as f32;
        let segment_height = geometry.height / grid_y as f32;

        let mut vertices = Vec::with_capacity(vertex_count);
        for iy in 0..=grid_y {
            let y = half_height - iy as f32 * segment_height;
            for ix in 0..=grid_x {
                let x = ix as f32 * segment_width - half_width;
                vertices.push(Vertex {
                    position: [x, y, 0.0],
                    uv: [ix as f32 / grid_x as f32, iy as f32 / grid_y as f32],
                });
            }
        }

        let mut indices = Vec::with_capacity(index_count);
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = ix + columns * iy;
                let b = ix + columns * (iy + 1);
                let c = (ix + 1) + columns * (iy + 1);
                let d = (ix + 1) + columns * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Ok(Self { vertices, indices })
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// Vertex and index counts for a grid, or `None` when either exceeds what a
/// `u32` index buffer can address.
fn buffer_sizes(grid_x: u32, grid_y: u32) -> Option<(usize, usize)> {
    let columns = u64::from(grid_x) + 1;
    let rows = u64::from(grid_y) + 1;
    let vertices = columns.checked_mul(rows)?;
    let indices = u64::from(grid_x)
        .checked_mul(u64::from(grid_y))?
        .checked_mul(6)?;
    let limit = u64::from(u32::MAX);
    if vertices > limit || indices > limit {
        return None;
    }
    Some((usize::try_from(vertices).ok()?, usize::try_from(indices).ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plane_has_expected_topology() {
        let mesh = PlaneMesh::build(&PlaneGeometry::default()).unwrap();
        assert_eq!(mesh.vertices.len(), 11 * 2);
        assert_eq!(mesh.index_count(), 10 * 6);
        assert!(mesh
            .indices
            .iter()
            .all(|&index| (index as usize) < mesh.vertices.len()));
    }

    #[test]
    fn corners_span_the_requested_size() {
        let mesh = PlaneMesh::build(&PlaneGeometry::default()).unwrap();
        let first = mesh.vertices.first().unwrap();
        let last = mesh.vertices.last().unwrap();
        assert_eq!(first.position, [-15.0, 10.0, 0.0]);
        assert_eq!(first.uv, [0.0, 0.0]);
        assert_eq!(last.position, [15.0, -10.0, 0.0]);
        assert_eq!(last.uv, [1.0, 1.0]);
    }

    #[test]
    fn triangles_wind_counter_clockwise() {
        let mesh = PlaneMesh::build(&PlaneGeometry {
            width: 2.0,
            height: 2.0,
            width_segments: 1,
            height_segments: 1,
        })
        .unwrap();
        for triangle in mesh.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| mesh.vertices[triangle[i] as usize].position);
            let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            assert!(cross > 0.0);
        }
    }

    #[test]
    fn zero_segments_are_treated_as_one() {
        let mesh = PlaneMesh::build(&PlaneGeometry {
            width: 1.0,
            height: 1.0,
            width_segments: 0,
            height_segments: 0,
        })
        .unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.index_count(), 6);
    }

    #[test]
    fn oversized_grid_is_rejected_before_allocating() {
        let err = PlaneMesh::build(&PlaneGeometry {
            width: 30.0,
            height: 20.0,
            width_segments: 70_000,
            height_segments: 70_000,
        })
        .unwrap_err();
        assert_eq!(
            err,
            MeshError::TooLarge {
                width_segments: 70_000,
                height_segments: 70_000,
            }
        );
    }

    #[test]
    fn buffer_sizes_track_the_grid() {
        assert_eq!(buffer_sizes(10, 1), Some((22, 60)));
        assert_eq!(buffer_sizes(1024, 1024), Some((1025 * 1025, 1024 * 1024 * 6)));
        assert_eq!(buffer_sizes(u32::MAX, 1), None);
    }
}
