//! egui overlay hosting the crossfade parameter panel.
//!
//! Per frame:
//!
//! ```text
//! handle_input()        // every winit event, before the scene sees it
//! begin_frame(window)
//! show_panel(ctx, ..)   // widget edits become PanelCommands
//! end_frame(window)     // tessellate, capture texture delta
//! prepare(..)           // upload egui textures and buffers
//! paint(..)             // draw over the plane with LoadOp::Load
//! release_textures()    // after the frame is submitted
//! ```

use crossfade::{PanelCommand, ParameterPanel};
use winit::event::{ElementState, WindowEvent};
use winit::window::Window;

/// egui context, winit bridge and wgpu backend for the overlay.
pub(crate) struct UiPass {
    egui_ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    clipped_primitives: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    screen_descriptor: egui_wgpu::ScreenDescriptor,
}

impl UiPass {
    pub fn new(device: &wgpu::Device, output_format: wgpu::TextureFormat, window: &Window) -> Self {
        let size = window.inner_size();
        let egui_ctx = egui::Context::default();
        let viewport = egui_ctx.viewport_id();
        let state = egui_winit::State::new(egui_ctx.clone(), viewport, window, None, None, None);
        let renderer =
            egui_wgpu::Renderer::new(device, output_format, egui_wgpu::RendererOptions::default());

        Self {
            egui_ctx,
            state,
            renderer,
            clipped_primitives: Vec::new(),
            textures_delta: egui::TexturesDelta::default(),
            screen_descriptor: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [size.width, size.height],
                pixels_per_point: window.scale_factor() as f32,
            },
        }
    }

    /// Forwards `event` to egui. Returns true when egui consumed it; button
    /// releases are never reported as consumed so a camera drag can end.
    pub fn handle_input(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);
        if let WindowEvent::MouseInput {
            state: ElementState::Released,
            ..
        } = event
        {
            return false;
        }
        response.consumed
    }

    pub fn begin_frame(&mut self, window: &Window) {
        let raw_input = self.state.take_egui_input(window);
        self.egui_ctx.begin_pass(raw_input);
    }

    pub fn end_frame(&mut self, window: &Window) {
        let egui::FullOutput {
            shapes,
            textures_delta,
            platform_output,
            pixels_per_point,
            ..
        } = self.egui_ctx.end_pass();

        self.state.handle_platform_output(window, platform_output);
        self.textures_delta.append(textures_delta);
        self.screen_descriptor.pixels_per_point = pixels_per_point;
        self.clipped_primitives = self.egui_ctx.tessellate(shapes, pixels_per_point);
    }

    pub fn context(&self) -> &egui::Context {
        &self.egui_ctx
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.screen_descriptor.size_in_pixels = [width, height];
    }

    /// Uploads new egui textures and this frame's geometry. The returned
    /// command buffers must be submitted before `encoder`.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, delta) in &self.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }
        self.textures_delta.set.clear();

        self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &self.clipped_primitives,
            &self.screen_descriptor,
        )
    }

    pub fn paint(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut render_pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("panel pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            })
            .forget_lifetime();

        self.renderer.render(
            &mut render_pass,
            &self.clipped_primitives,
            &self.screen_descriptor,
        );
    }

    /// Frees textures egui dropped this frame. Call after submission.
    pub fn release_textures(&mut self) {
        for id in self.textures_delta.free.drain(..) {
            self.renderer.free_texture(&id);
        }
    }
}

/// Control values as the panel widgets see them for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PanelValues {
    pub transition: f32,
    pub strength: f32,
    pub auto_animate: bool,
}

impl PanelValues {
    pub fn read(panel: &ParameterPanel) -> Self {
        Self {
            transition: panel.transition().value(),
            strength: panel.strength().value(),
            auto_animate: panel.auto_animate().checked(),
        }
    }

    /// One command per control whose value differs in `edited`.
    pub fn changes(self, edited: PanelValues) -> Vec<PanelCommand> {
        let mut commands = Vec::new();
        if edited.transition != self.transition {
            commands.push(PanelCommand::SetTransition(edited.transition));
        }
        if edited.strength != self.strength {
            commands.push(PanelCommand::SetStrength(edited.strength));
        }
        if edited.auto_animate != self.auto_animate {
            commands.push(PanelCommand::AutoAnimate(edited.auto_animate));
        }
        commands
    }
}

/// Draws the parameter window and returns what the user changed in it.
pub(crate) fn show_panel(ctx: &egui::Context, panel: &ParameterPanel) -> Vec<PanelCommand> {
    let shown = PanelValues::read(panel);
    let mut edited = shown;
    let mut buttons = Vec::new();

    egui::Window::new("Crossfade")
        .default_pos([10.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            let transition = panel.transition();
            let (min, max) = transition.range();
            ui.add(
                egui::Slider::new(&mut edited.transition, min..=max)
                    .step_by(f64::from(transition.step()))
                    .text(transition.label()),
            );

            let strength = panel.strength();
            let (min, max) = strength.range();
            ui.add(
                egui::Slider::new(&mut edited.strength, min..=max)
                    .step_by(f64::from(strength.step()))
                    .text(strength.label()),
            );

            ui.checkbox(&mut edited.auto_animate, panel.auto_animate().label());

            ui.horizontal(|ui| {
                if ui.button("Start").clicked() {
                    buttons.push(PanelCommand::Start);
                }
                if ui.button("Stop").clicked() {
                    buttons.push(PanelCommand::Stop);
                }
            });
        });

    let mut commands = shown.changes(edited);
    commands.extend(buttons);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_controls_emit_nothing() {
        let panel = ParameterPanel::new(0.25, 0.05, false);
        let values = PanelValues::read(&panel);
        assert_eq!(values.transition, 0.25);
        assert!(values.changes(values).is_empty());
    }

    #[test]
    fn each_edited_control_maps_to_its_command() {
        let shown = PanelValues::read(&ParameterPanel::new(0.0, 0.05, false));
        let edited = PanelValues {
            transition: 0.6,
            strength: 1.25,
            auto_animate: true,
        };
        assert_eq!(
            shown.changes(edited),
            vec![
                PanelCommand::SetTransition(0.6),
                PanelCommand::SetStrength(1.25),
                PanelCommand::AutoAnimate(true),
            ]
        );

        let unticked = PanelValues {
            auto_animate: false,
            ..edited
        };
        assert_eq!(
            edited.changes(unticked),
            vec![PanelCommand::AutoAnimate(false)]
        );
    }

    #[test]
    fn panel_draws_without_input() {
        let ctx = egui::Context::default();
        let panel = ParameterPanel::new(0.5, 0.05, true);

        for _ in 0..2 {
            ctx.begin_pass(egui::RawInput::default());
            let commands = show_panel(&ctx, &panel);
            ctx.end_pass();
            assert!(commands.is_empty());
        }
    }
}
