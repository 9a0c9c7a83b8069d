use bytemuck::{Pod, Zeroable};
use crossfade::FrameSnapshot;
use glam::Mat4;

/// std140 mirror of the `PlaneUniforms` block declared in the shader header.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct PlaneUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// xyz plane offset, w unused.
    pub offset: [f32; 4],
    /// rgb base color, a unused.
    pub color: [f32; 4],
    pub transition: f32,
    pub time: f32,
    pub strength: f32,
    pub edge_softness: f32,
    pub edge_glow: f32,
    pub _padding: [f32; 3],
}

impl PlaneUniforms {
    pub fn from_snapshot(snapshot: &FrameSnapshot, view_proj: Mat4) -> Self {
        let [x, y, z] = snapshot.plane_position;
        let [r, g, b] = snapshot.color;
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            offset: [x, y, z, 0.0],
            color: [r, g, b, 1.0],
            transition: snapshot.transition,
            time: snapshot.time,
            strength: snapshot.strength,
            edge_softness: snapshot.edge_softness,
            edge_glow: snapshot.edge_glow,
            _padding: [0.0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossfade::TextureSlot;

    fn snapshot() -> FrameSnapshot {
        FrameSnapshot {
            frame: 3,
            plane_position: [0.25, -0.5, -8.0],
            color: [0.0, 0.5, 1.0],
            from: TextureSlot::Secondary,
            to: TextureSlot::Primary,
            transition: 0.4,
            time: 0.015,
            strength: 0.05,
            edge_softness: 0.1,
            edge_glow: 0.0,
        }
    }

    #[test]
    fn layout_matches_std140_block() {
        assert_eq!(std::mem::size_of::<PlaneUniforms>(), 128);
        assert_eq!(std::mem::offset_of!(PlaneUniforms, offset), 64);
        assert_eq!(std::mem::offset_of!(PlaneUniforms, color), 80);
        assert_eq!(std::mem::offset_of!(PlaneUniforms, transition), 96);
        assert_eq!(std::mem::offset_of!(PlaneUniforms, edge_glow), 112);
    }

    #[test]
    fn snapshot_fields_are_copied() {
        let uniforms = PlaneUniforms::from_snapshot(&snapshot(), Mat4::IDENTITY);
        assert_eq!(uniforms.offset, [0.25, -0.5, -8.0, 0.0]);
        assert_eq!(uniforms.color, [0.0, 0.5, 1.0, 1.0]);
        assert_eq!(uniforms.transition, 0.4);
        assert_eq!(uniforms.strength, 0.05);
        assert_eq!(uniforms.view_proj, Mat4::IDENTITY.to_cols_array_2d());
        assert_eq!(bytemuck::bytes_of(&uniforms).len(), 128);
    }
}
