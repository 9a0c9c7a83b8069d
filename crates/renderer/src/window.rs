use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use crossfade::{
    normalize_pointer, PanelInput, Scene, SceneCommand, SystemClock, MAX_FRAME_DELTA,
};
use glam::Vec2;
use tracing::{debug, error, info, trace, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, ModifiersState, NamedKey};
use winit::window::{Window, WindowId};

use crate::assets::DecodedTextureSet;
use crate::camera::OrbitCamera;
use crate::gpu::GpuState;
use crate::types::RendererConfig;
use crate::ui::{show_panel, UiPass};

/// Pixel-based wheel deltas are converted to "lines" at this ratio.
const PIXELS_PER_SCROLL_LINE: f32 = 50.0;

/// What a key press asks of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Panel(PanelInput),
    LogReadout,
}

/// Keyboard shortcuts for the parameter panel. Shift multiplies slider nudges by ten.
pub fn key_action(key: &Key, shift: bool) -> Option<KeyAction> {
    let steps = if shift { 10 } else { 1 };
    let action = match key {
        Key::Named(NamedKey::Space) => KeyAction::Panel(PanelInput::Start),
        Key::Named(NamedKey::ArrowLeft) => KeyAction::Panel(PanelInput::NudgeTransition(-steps)),
        Key::Named(NamedKey::ArrowRight) => KeyAction::Panel(PanelInput::NudgeTransition(steps)),
        Key::Named(NamedKey::ArrowDown) => KeyAction::Panel(PanelInput::NudgeStrength(-steps)),
        Key::Named(NamedKey::ArrowUp) => KeyAction::Panel(PanelInput::NudgeStrength(steps)),
        Key::Character(value) => match value.to_ascii_lowercase().as_str() {
            " " => KeyAction::Panel(PanelInput::Start),
            "s" => KeyAction::Panel(PanelInput::Stop),
            "a" => KeyAction::Panel(PanelInput::ToggleAutoAnimate),
            "h" => KeyAction::LogReadout,
            _ => return None,
        },
        _ => return None,
    };
    Some(action)
}

/// Owns everything the event loop touches. `ui` and `gpu` are declared before
/// `window` so the surface is dropped while the window is still alive.
struct WindowState {
    ui: UiPass,
    gpu: GpuState,
    window: Arc<Window>,
    scene: Scene<SystemClock>,
    camera: OrbitCamera,
    mouse: MouseState,
    modifiers: ModifiersState,
    last_camera_update: Option<Instant>,
}

impl WindowState {
    fn create(
        event_loop: &ActiveEventLoop,
        config: &RendererConfig,
        images: &DecodedTextureSet,
    ) -> Result<Self> {
        let attributes = Window::default_attributes()
            .with_title(config.title.as_str())
            .with_inner_size(PhysicalSize::new(
                config.surface_size.0,
                config.surface_size.1,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("failed to create window")?,
        );

        let gpu = GpuState::new(
            window.clone(),
            window.inner_size(),
            config.antialiasing,
            config.color_space,
            images,
            &config.plane,
        )
        .context("failed to initialise GPU state")?;
        let ui = UiPass::new(gpu.device(), gpu.surface_format(), &window);

        Ok(Self {
            ui,
            gpu,
            window,
            scene: Scene::new(config.scene, SystemClock),
            camera: OrbitCamera::new(config.camera),
            mouse: MouseState::default(),
            modifiers: ModifiersState::empty(),
            last_camera_update: None,
        })
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
        self.ui.resize(new_size.width, new_size.height);
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        match key_action(&event.logical_key, self.modifiers.shift_key()) {
            Some(KeyAction::Panel(input)) => {
                trace!(?input, "panel shortcut");
                self.scene.panel_input(input);
            }
            Some(KeyAction::LogReadout) => {
                info!(
                    readout = %self.scene.panel().readout(),
                    state = ?self.scene.controller().state(),
                    active = self.scene.controller().active_index().number(),
                    cycles = self.scene.controller().cycles(),
                    "panel"
                );
            }
            None => {}
        }
    }

    /// The plane follows the cursor even over the panel; the camera only
    /// orbits when egui did not take the drag.
    fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>, over_panel: bool) {
        if let Some(delta) = self.mouse.move_to(position) {
            if self.camera.orbit_enabled() && !over_panel {
                self.camera.drag(delta, self.gpu.size().height as f32);
            }
        }
        let size = self.gpu.size();
        let ndc = normalize_pointer(position.x, position.y, size.width, size.height);
        self.scene.push(SceneCommand::Pointer(ndc));
    }

    fn handle_wheel(&mut self, delta: MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_SCROLL_LINE,
        };
        self.camera.zoom(lines);
    }

    /// Panel edits are queued before the tick so they land on this frame.
    fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.ui.begin_frame(&self.window);
        let commands = show_panel(self.ui.context(), self.scene.panel());
        self.ui.end_frame(&self.window);
        for command in commands {
            debug!(?command, "panel edit");
            self.scene.push(SceneCommand::Panel(command));
        }

        let now = Instant::now();
        let dt = self
            .last_camera_update
            .map(|last| now.saturating_duration_since(last).min(MAX_FRAME_DELTA))
            .unwrap_or_default();
        self.last_camera_update = Some(now);

        let snapshot = self.scene.tick();
        self.camera.update(dt.as_secs_f32());
        let view_proj = self.camera.view_proj(self.gpu.aspect_ratio());
        self.gpu.render(&snapshot, view_proj, &mut self.ui)
    }

    fn handle_event(&mut self, event_loop: &ActiveEventLoop, event: WindowEvent) {
        let consumed = self.ui.handle_input(&self.window, &event);
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                debug!("window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => self.resize(new_size),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor_moved(position, consumed);
            }
            WindowEvent::CursorLeft { .. } => self.mouse.release(),
            WindowEvent::RedrawRequested => match self.render_frame() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = self.gpu.size();
                    self.resize(size);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    error!("surface out of memory; exiting");
                    event_loop.exit();
                }
                Err(wgpu::SurfaceError::Timeout) => {
                    warn!("surface timeout; retrying next frame");
                }
                Err(other) => {
                    warn!(error = ?other, "surface error; retrying next frame");
                }
            },
            _ if consumed => {}
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event),
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => self.mouse.handle_button(button_state),
            WindowEvent::MouseWheel { delta, .. } => self.handle_wheel(delta),
            _ => {}
        }
    }
}

/// winit application: creates the window on the first `resumed` and routes
/// its events into `WindowState`.
struct App {
    config: RendererConfig,
    images: Option<DecodedTextureSet>,
    state: Option<WindowState>,
    failure: Option<anyhow::Error>,
}

impl App {
    fn new(config: RendererConfig, images: DecodedTextureSet) -> Self {
        Self {
            config,
            images: Some(images),
            state: None,
            failure: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let Some(images) = self.images.take() else {
            return;
        };

        match WindowState::create(event_loop, &self.config, &images) {
            Ok(state) => {
                let profile = state.gpu.adapter_profile();
                info!(
                    adapter = %profile.name,
                    backend = ?profile.backend,
                    width = state.gpu.size().width,
                    height = state.gpu.size().height,
                    "window ready"
                );
                if profile.is_software() {
                    warn!(adapter = %profile.name, "software rasterizer detected; expect low frame rates");
                }
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(err) => {
                error!(error = %err, "failed to open window");
                self.failure = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if window_id == state.window.id() {
            state.handle_event(event_loop, event);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            trace!("scheduler: issuing redraw");
            state.window.request_redraw();
        }
    }
}

/// Opens the window on the calling thread and renders until it is closed.
pub(crate) fn run_window(config: RendererConfig, images: DecodedTextureSet) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, images);
    event_loop
        .run_app(&mut app)
        .context("window event loop error")?;

    match app.failure.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Left-button drag tracking for the orbit camera.
#[derive(Debug, Default)]
struct MouseState {
    position: Option<PhysicalPosition<f64>>,
    is_pressed: bool,
}

impl MouseState {
    /// Records the new cursor position, returning the drag delta while the
    /// button is held.
    fn move_to(&mut self, position: PhysicalPosition<f64>) -> Option<Vec2> {
        let previous = self.position.replace(position);
        if !self.is_pressed {
            return None;
        }
        previous.map(|prev| Vec2::new((position.x - prev.x) as f32, (position.y - prev.y) as f32))
    }

    fn handle_button(&mut self, state: ElementState) {
        self.is_pressed = state == ElementState::Pressed;
    }

    fn release(&mut self) {
        self.is_pressed = false;
        self.position = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::SmolStr;

    fn character(value: &str) -> Key {
        Key::Character(SmolStr::new(value))
    }

    #[test]
    fn bindings_cover_panel_controls() {
        assert_eq!(
            key_action(&Key::Named(NamedKey::Space), false),
            Some(KeyAction::Panel(PanelInput::Start))
        );
        assert_eq!(
            key_action(&character("s"), false),
            Some(KeyAction::Panel(PanelInput::Stop))
        );
        assert_eq!(
            key_action(&character("A"), true),
            Some(KeyAction::Panel(PanelInput::ToggleAutoAnimate))
        );
        assert_eq!(key_action(&character("h"), false), Some(KeyAction::LogReadout));
        assert_eq!(key_action(&character("q"), false), None);
        assert_eq!(key_action(&Key::Named(NamedKey::Enter), false), None);
    }

    #[test]
    fn shift_scales_slider_nudges() {
        assert_eq!(
            key_action(&Key::Named(NamedKey::ArrowRight), false),
            Some(KeyAction::Panel(PanelInput::NudgeTransition(1)))
        );
        assert_eq!(
            key_action(&Key::Named(NamedKey::ArrowLeft), true),
            Some(KeyAction::Panel(PanelInput::NudgeTransition(-10)))
        );
        assert_eq!(
            key_action(&Key::Named(NamedKey::ArrowUp), true),
            Some(KeyAction::Panel(PanelInput::NudgeStrength(10)))
        );
        assert_eq!(
            key_action(&Key::Named(NamedKey::ArrowDown), false),
            Some(KeyAction::Panel(PanelInput::NudgeStrength(-1)))
        );
    }

    #[test]
    fn drag_reports_deltas_only_while_pressed() {
        let mut mouse = MouseState::default();
        assert_eq!(mouse.move_to(PhysicalPosition::new(10.0, 10.0)), None);
        mouse.handle_button(ElementState::Pressed);
        assert_eq!(
            mouse.move_to(PhysicalPosition::new(14.0, 7.0)),
            Some(Vec2::new(4.0, -3.0))
        );
        mouse.handle_button(ElementState::Released);
        assert_eq!(mouse.move_to(PhysicalPosition::new(20.0, 20.0)), None);
    }
}
