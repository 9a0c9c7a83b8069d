use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::clock::Clock;
use crate::controller::{CrossfadeController, CrossfadeSettings};
use crate::follow::{FollowSettings, PointerFollower};
use crate::material::{MaterialParams, MaterialUniforms, TextureSlot};
use crate::panel::{PanelCommand, PanelInput, ParameterPanel};

/// Upper bound on the frame delta fed to tweens, so a stalled frame (window
/// drag, debugger) does not jump a fade to its end.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneCommand {
    /// Normalized device coordinates of the cursor.
    Pointer([f32; 2]),
    Panel(PanelCommand),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSettings {
    pub material: MaterialParams,
    pub crossfade: CrossfadeSettings,
    pub follow: FollowSettings,
    /// Elapsed-time increment per tick, independent of wall time.
    pub time_step: f32,
    pub plane_z: f32,
    pub auto_animate: bool,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            material: MaterialParams::default(),
            crossfade: CrossfadeSettings::default(),
            follow: FollowSettings::default(),
            time_step: 0.005,
            plane_z: -8.0,
            auto_animate: false,
        }
    }
}

/// Everything the renderer needs to draw one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub plane_position: [f32; 3],
    pub color: [f32; 3],
    pub from: TextureSlot,
    pub to: TextureSlot,
    pub transition: f32,
    pub time: f32,
    pub strength: f32,
    pub edge_softness: f32,
    pub edge_glow: f32,
}

/// Single owner of all mutable scene state.
///
/// Input handlers only enqueue commands; `tick` applies them in arrival order
/// before advancing time, so every mutation happens on the frame loop.
pub struct Scene<C: Clock> {
    clock: C,
    last_tick: Option<Instant>,
    queue: VecDeque<SceneCommand>,
    material: MaterialUniforms,
    controller: CrossfadeController,
    follower: PointerFollower,
    panel: ParameterPanel,
    time_step: f32,
    plane_z: f32,
    frame: u64,
}

impl<C: Clock> Scene<C> {
    pub fn new(settings: SceneSettings, clock: C) -> Self {
        let mut material = MaterialUniforms::new(settings.material);
        let mut controller = CrossfadeController::new(settings.crossfade);
        if settings.auto_animate {
            controller.set_auto_animate(true, &mut material);
        }
        let panel = ParameterPanel::new(
            material.transition(),
            material.strength(),
            controller.auto_animate(),
        );
        Self {
            clock,
            last_tick: None,
            queue: VecDeque::new(),
            material,
            controller,
            follower: PointerFollower::new(settings.follow),
            panel,
            time_step: settings.time_step,
            plane_z: settings.plane_z,
            frame: 0,
        }
    }

    pub fn push(&mut self, command: SceneCommand) {
        self.queue.push_back(command);
    }

    /// Feeds a panel interaction through the controls and queues the result.
    pub fn panel_input(&mut self, input: PanelInput) {
        let command = self.panel.handle(input);
        self.push(SceneCommand::Panel(command));
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn material(&self) -> &MaterialUniforms {
        &self.material
    }

    pub fn controller(&self) -> &CrossfadeController {
        &self.controller
    }

    pub fn follower(&self) -> &PointerFollower {
        &self.follower
    }

    pub fn panel(&self) -> &ParameterPanel {
        &self.panel
    }

    pub fn tick(&mut self) -> FrameSnapshot {
        let now = self.clock.now();
        let dt = self
            .last_tick
            .map(|last| now.saturating_duration_since(last).min(MAX_FRAME_DELTA))
            .unwrap_or(Duration::ZERO);
        self.last_tick = Some(now);

        while let Some(command) = self.queue.pop_front() {
            self.apply(command);
        }

        self.material.advance_time(self.time_step);
        let [x, y] = self.follower.advance(dt);
        if self.controller.advance(dt, &mut self.material) {
            debug!(
                active = self.controller.active_index().number(),
                cycles = self.controller.cycles(),
                "crossfade completed"
            );
        }
        self.panel
            .sync(self.material.transition(), self.material.strength());

        let snapshot = FrameSnapshot {
            frame: self.frame,
            plane_position: [x, y, self.plane_z],
            color: self.material.color(),
            from: self.material.from_slot(),
            to: self.material.to_slot(),
            transition: self.material.transition(),
            time: self.material.time(),
            strength: self.material.strength(),
            edge_softness: self.material.edge_softness(),
            edge_glow: self.material.edge_glow(),
        };
        self.frame += 1;
        trace!(frame = snapshot.frame, dt_ms = dt.as_millis() as u64, "scene tick");
        snapshot
    }

    fn apply(&mut self, command: SceneCommand) {
        match command {
            SceneCommand::Pointer(ndc) => self.follower.set_pointer(ndc),
            SceneCommand::Panel(PanelCommand::SetTransition(value)) => {
                self.controller
                    .set_manual_transition(value, &mut self.material);
            }
            SceneCommand::Panel(PanelCommand::SetStrength(value)) => {
                self.material.set_strength(value);
            }
            SceneCommand::Panel(PanelCommand::AutoAnimate(enabled)) => {
                self.panel.set_auto_animate(enabled);
                self.controller.set_auto_animate(enabled, &mut self.material);
            }
            SceneCommand::Panel(PanelCommand::Start) => self.controller.start(&mut self.material),
            SceneCommand::Panel(PanelCommand::Stop) => self.controller.stop(&mut self.material),
        }
    }
}
