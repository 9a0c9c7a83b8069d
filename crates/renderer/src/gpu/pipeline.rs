use crossfade::TextureSlot;

use crate::compile::{compile_fragment_shader, compile_vertex_shader};
use crate::mesh::Vertex;

use super::textures::TextureSet;

/// Bind group 0 is the uniform block, group 1 the textures. Two texture bind
/// groups exist, one per from/to assignment, so a completed crossfade only
/// switches which group is bound.
pub(crate) struct PlanePipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub uniform_layout: wgpu::BindGroupLayout,
    forward: wgpu::BindGroup,
    reverse: wgpu::BindGroup,
}

impl PlanePipeline {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        sample_count: u32,
        textures: &TextureSet,
    ) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("plane uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("plane texture layout"),
            entries: &texture_layout_entries(),
        });

        let forward = create_texture_bind_group(
            device,
            &texture_layout,
            textures,
            TextureSlot::Primary,
            TextureSlot::Secondary,
        );
        let reverse = create_texture_bind_group(
            device,
            &texture_layout,
            textures,
            TextureSlot::Secondary,
            TextureSlot::Primary,
        );

        let vertex_module = compile_vertex_shader(device);
        let fragment_module = compile_fragment_shader(device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("plane pipeline layout"),
            bind_group_layouts: &[Some(&uniform_layout), Some(&texture_layout)],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("plane pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("main"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_layout,
            forward,
            reverse,
        }
    }

    /// Texture bind group for the current "from" slot.
    pub fn textures_for(&self, from: TextureSlot) -> &wgpu::BindGroup {
        match from {
            TextureSlot::Primary => &self.forward,
            TextureSlot::Secondary => &self.reverse,
        }
    }
}

fn create_texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    textures: &TextureSet,
    from: TextureSlot,
    to: TextureSlot,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("plane textures {from:?} -> {to:?}")),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&textures.slot(from).view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&textures.slot(to).view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(&textures.mask.view),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::Sampler(&textures.sampler),
            },
        ],
    })
}

pub(crate) fn texture_layout_entries() -> Vec<wgpu::BindGroupLayoutEntry> {
    let mut entries: Vec<_> = (0..3)
        .map(|binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        })
        .collect();
    entries.push(wgpu::BindGroupLayoutEntry {
        binding: 3,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_fragment_bindings() {
        let entries = texture_layout_entries();
        assert_eq!(entries.len(), 4);
        assert!(entries[..3]
            .iter()
            .all(|entry| matches!(entry.ty, wgpu::BindingType::Texture { .. })));
        assert!(matches!(entries[3].ty, wgpu::BindingType::Sampler(_)));
        assert_eq!(entries[3].binding, 3);
    }
}
