use std::time::{Duration, Instant};

use anyhow::Result;
use crossfade::FrameSnapshot;
use glam::Mat4;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::{debug, warn};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::assets::DecodedTextureSet;
use crate::mesh::PlaneMesh;
use crate::types::{AdapterProfile, Antialiasing, ColorSpaceMode, PlaneGeometry};
use crate::ui::UiPass;

use super::context::GpuContext;
use super::pipeline::PlanePipeline;
use super::textures::TextureSet;
use super::uniforms::PlaneUniforms;

const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color target"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Frames-per-second bookkeeping for the periodic debug line.
struct RenderStats {
    last_report: Instant,
    frames_since_report: u32,
    frames_per_second: f32,
}

impl RenderStats {
    fn new(now: Instant) -> Self {
        Self {
            last_report: now,
            frames_since_report: 0,
            frames_per_second: 60.0,
        }
    }

    fn record(&mut self, now: Instant, snapshot: &FrameSnapshot) {
        self.frames_since_report += 1;
        let elapsed = now.saturating_duration_since(self.last_report);
        if elapsed >= Duration::from_secs(1) {
            self.frames_per_second = self.frames_since_report as f32 / elapsed.as_secs_f32();
            self.frames_since_report = 0;
            self.last_report = now;
            debug!(
                fps = self.frames_per_second.round(),
                frame = snapshot.frame,
                time = snapshot.time,
                transition = snapshot.transition,
                from = ?snapshot.from,
                "render stats"
            );
        }
    }

    fn frame_budget(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.frames_per_second.max(1.0))
    }
}

pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: PlanePipeline,
    _textures: TextureSet,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    multisample_target: Option<MultisampleTarget>,
    stats: RenderStats,
}

impl GpuState {
    pub(crate) fn new<W>(
        window: W,
        initial_size: PhysicalSize<u32>,
        antialiasing: Antialiasing,
        color_space: ColorSpaceMode,
        images: &DecodedTextureSet,
        geometry: &PlaneGeometry,
    ) -> Result<Self>
    where
        W: HasDisplayHandle + HasWindowHandle + Send + Sync + 'static,
    {
        let context = GpuContext::new(window, initial_size, antialiasing, color_space)?;
        let device = &context.device;

        let textures = TextureSet::upload(
            device,
            &context.queue,
            images,
            context.color_space,
            context.max_texture_dimension,
        )?;
        let pipeline = PlanePipeline::new(
            device,
            context.surface_format,
            context.sample_count,
            &textures,
        );

        let mesh = PlaneMesh::build(geometry)?;
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("plane vertices"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("plane indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("plane uniforms"),
            size: std::mem::size_of::<PlaneUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("plane uniform bind group"),
            layout: &pipeline.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let multisample_target = (context.sample_count > 1).then(|| {
            MultisampleTarget::new(
                device,
                context.surface_format,
                context.size,
                context.sample_count,
            )
        });

        debug!(
            vertices = mesh.vertices.len(),
            indices = mesh.index_count(),
            sample_count = context.sample_count,
            "plane pipeline ready"
        );

        Ok(Self {
            index_count: mesh.index_count(),
            context,
            pipeline,
            _textures: textures,
            vertex_buffer,
            index_buffer,
            uniform_buffer,
            uniform_bind_group,
            multisample_target,
            stats: RenderStats::new(Instant::now()),
        })
    }

    pub(crate) fn device(&self) -> &wgpu::Device {
        &self.context.device
    }

    pub(crate) fn surface_format(&self) -> wgpu::TextureFormat {
        self.context.surface_format
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn aspect_ratio(&self) -> f32 {
        self.context.aspect_ratio()
    }

    pub(crate) fn adapter_profile(&self) -> &AdapterProfile {
        &self.context.adapter_profile
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        if self.context.sample_count > 1 {
            self.multisample_target = Some(MultisampleTarget::new(
                &self.context.device,
                self.context.surface_format,
                self.context.size,
                self.context.sample_count,
            ));
        }
    }

    /// Draws the plane, then the panel overlay on top of the resolved frame.
    pub(crate) fn render(
        &mut self,
        snapshot: &FrameSnapshot,
        view_proj: Mat4,
        ui: &mut UiPass,
    ) -> Result<(), wgpu::SurfaceError> {
        let acquire_start = Instant::now();
        let frame = self.context.surface.get_current_texture()?;
        let acquire_duration = acquire_start.elapsed();
        let budget = self.stats.frame_budget();
        if acquire_duration > budget {
            warn!(
                acquire_ms = acquire_duration.as_millis(),
                budget_ms = budget.as_millis(),
                "acquiring frame took longer than the frame budget"
            );
        }
        self.stats.record(Instant::now(), snapshot);

        let uniforms = PlaneUniforms::from_snapshot(snapshot, view_proj);
        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });

        let (attachment_view, resolve_target) = match self.multisample_target.as_ref() {
            Some(msaa) => (&msaa.view, Some(&view)),
            None => (&view, None),
        };
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("plane pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });
            render_pass.set_pipeline(&self.pipeline.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_bind_group(1, self.pipeline.textures_for(snapshot.from), &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.index_count, 0, 0..1);
        }

        let ui_uploads = ui.prepare(&self.context.device, &self.context.queue, &mut encoder);
        ui.paint(&mut encoder, &view);

        self.context
            .queue
            .submit(ui_uploads.into_iter().chain(std::iter::once(encoder.finish())));
        frame.present();
        ui.release_textures();
        Ok(())
    }
}
