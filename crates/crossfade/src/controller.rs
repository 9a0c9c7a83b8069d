use std::time::Duration;

use tracing::debug;

use crate::easing::Easing;
use crate::material::{ActiveIndex, MaterialUniforms};
use crate::tween::{Tween, TweenStep};

/// Lifecycle of the crossfade tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossfadeState {
    /// No tween in flight.
    #[default]
    Idle,
    /// A single fade is playing.
    Fading,
    /// A fade exists but is frozen in place.
    Paused,
    /// Auto-animate: every completed fade immediately starts the next one.
    Cycling,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrossfadeEvent {
    Start,
    Stop,
    AutoAnimate(bool),
    Completed,
    ManualTransition(f32),
}

/// Side effect the controller applies after a state change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrossfadeEffect {
    None,
    /// Resume the existing tween, or create one from the current transition.
    Begin,
    Pause,
    /// Flip the active index, swap the texture slots, reset the transition.
    Cycle,
    /// `Cycle`, then `Begin` a fresh fade from zero.
    CycleAndRestart,
    /// Drop any tween and write the value.
    CancelAndSet(f32),
    Set(f32),
}

/// The transition table. Pure, so every edge is testable on its own.
pub fn next_state(
    state: CrossfadeState,
    event: CrossfadeEvent,
) -> (CrossfadeState, CrossfadeEffect) {
    use CrossfadeEffect as E;
    use CrossfadeEvent as Ev;
    use CrossfadeState as S;

    match (state, event) {
        (S::Idle, Ev::Start) => (S::Fading, E::Begin),
        (S::Idle, Ev::AutoAnimate(true)) => (S::Cycling, E::Begin),
        (S::Idle, Ev::ManualTransition(value)) => (S::Idle, E::Set(value)),
        (S::Idle, Ev::Stop | Ev::AutoAnimate(false) | Ev::Completed) => (S::Idle, E::None),

        (S::Fading, Ev::Start) => (S::Fading, E::None),
        (S::Fading, Ev::AutoAnimate(true)) => (S::Cycling, E::None),
        (S::Fading, Ev::Stop | Ev::AutoAnimate(false)) => (S::Paused, E::Pause),
        (S::Fading, Ev::Completed) => (S::Idle, E::Cycle),
        (S::Fading, Ev::ManualTransition(value)) => (S::Idle, E::CancelAndSet(value)),

        (S::Paused, Ev::Start) => (S::Fading, E::Begin),
        (S::Paused, Ev::AutoAnimate(true)) => (S::Cycling, E::Begin),
        (S::Paused, Ev::ManualTransition(value)) => (S::Idle, E::CancelAndSet(value)),
        (S::Paused, Ev::Stop | Ev::AutoAnimate(false) | Ev::Completed) => (S::Paused, E::None),

        (S::Cycling, Ev::Start | Ev::AutoAnimate(true)) => (S::Cycling, E::None),
        (S::Cycling, Ev::Stop | Ev::AutoAnimate(false)) => (S::Paused, E::Pause),
        (S::Cycling, Ev::Completed) => (S::Cycling, E::CycleAndRestart),
        (S::Cycling, Ev::ManualTransition(value)) => (S::Idle, E::CancelAndSet(value)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossfadeSettings {
    pub duration: Duration,
    pub easing: Easing,
}

impl Default for CrossfadeSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(2),
            easing: Easing::CubicInOut,
        }
    }
}

/// Drives the material's transition scalar and texture slots.
///
/// The material is passed into every call instead of being owned, so the
/// scene keeps a single writer for it and tests can inspect it directly.
#[derive(Debug, Clone)]
pub struct CrossfadeController {
    settings: CrossfadeSettings,
    state: CrossfadeState,
    tween: Option<Tween<f32>>,
    active: ActiveIndex,
    cycles: u64,
}

impl CrossfadeController {
    pub fn new(settings: CrossfadeSettings) -> Self {
        Self {
            settings,
            state: CrossfadeState::Idle,
            tween: None,
            active: ActiveIndex::One,
            cycles: 0,
        }
    }

    pub fn state(&self) -> CrossfadeState {
        self.state
    }

    pub fn active_index(&self) -> ActiveIndex {
        self.active
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn auto_animate(&self) -> bool {
        self.state == CrossfadeState::Cycling
    }

    pub fn has_tween(&self) -> bool {
        self.tween.is_some()
    }

    pub fn start(&mut self, material: &mut MaterialUniforms) {
        self.dispatch(CrossfadeEvent::Start, material);
    }

    pub fn stop(&mut self, material: &mut MaterialUniforms) {
        self.dispatch(CrossfadeEvent::Stop, material);
    }

    pub fn set_auto_animate(&mut self, enabled: bool, material: &mut MaterialUniforms) {
        self.dispatch(CrossfadeEvent::AutoAnimate(enabled), material);
    }

    pub fn set_manual_transition(&mut self, value: f32, material: &mut MaterialUniforms) {
        self.dispatch(CrossfadeEvent::ManualTransition(value), material);
    }

    /// Moves the tween forward by `dt` and writes the result into the material.
    /// Returns true when a fade completed on this step.
    pub fn advance(&mut self, dt: Duration, material: &mut MaterialUniforms) -> bool {
        let Some(tween) = self.tween.as_mut() else {
            return false;
        };
        match tween.advance(dt) {
            TweenStep::Held(_) => false,
            TweenStep::Running(value) => {
                material.set_transition(value);
                false
            }
            TweenStep::Completed(value) => {
                material.set_transition(value);
                self.dispatch(CrossfadeEvent::Completed, material);
                true
            }
        }
    }

    fn dispatch(&mut self, event: CrossfadeEvent, material: &mut MaterialUniforms) {
        let (next, effect) = next_state(self.state, event);
        if next != self.state {
            debug!(from = ?self.state, to = ?next, ?event, "crossfade state change");
        }
        self.state = next;
        self.apply(effect, material);
    }

    fn apply(&mut self, effect: CrossfadeEffect, material: &mut MaterialUniforms) {
        match effect {
            CrossfadeEffect::None => {}
            CrossfadeEffect::Begin => self.begin(material),
            CrossfadeEffect::Pause => {
                if let Some(tween) = self.tween.as_mut() {
                    tween.pause();
                }
            }
            CrossfadeEffect::Cycle => self.cycle(material),
            CrossfadeEffect::CycleAndRestart => {
                self.cycle(material);
                self.begin(material);
            }
            CrossfadeEffect::CancelAndSet(value) => {
                if self.tween.take().is_some() {
                    debug!(value, "manual transition cancelled the running fade");
                }
                material.set_transition(value);
            }
            CrossfadeEffect::Set(value) => material.set_transition(value),
        }
    }

    fn begin(&mut self, material: &MaterialUniforms) {
        let settings = self.settings;
        let tween = self.tween.get_or_insert_with(|| {
            Tween::new(
                material.transition(),
                1.0,
                settings.duration,
                settings.easing,
            )
        });
        tween.play();
    }

    fn cycle(&mut self, material: &mut MaterialUniforms) {
        self.active = self.active.flipped();
        material.assign_slots(self.active);
        material.set_transition(0.0);
        self.tween = None;
        self.cycles += 1;
        debug!(
            active = self.active.number(),
            from = ?material.from_slot(),
            cycles = self.cycles,
            "crossfade cycled textures"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{MaterialParams, TextureSlot};

    fn setup() -> (CrossfadeController, MaterialUniforms) {
        (
            CrossfadeController::new(CrossfadeSettings::default()),
            MaterialUniforms::new(MaterialParams::default()),
        )
    }

    const FULL: Duration = Duration::from_secs(2);

    #[test]
    fn start_twice_equals_start_once() {
        let (mut once, mut once_material) = setup();
        once.start(&mut once_material);
        once.advance(Duration::from_millis(700), &mut once_material);

        let (mut twice, mut twice_material) = setup();
        twice.start(&mut twice_material);
        twice.start(&mut twice_material);
        twice.advance(Duration::from_millis(700), &mut twice_material);

        assert_eq!(once.state(), twice.state());
        assert_eq!(once_material, twice_material);
    }

    #[test]
    fn full_fade_cycles_textures() {
        let (mut controller, mut material) = setup();
        assert_eq!(controller.active_index().number(), 1);
        controller.start(&mut material);
        let completed = controller.advance(FULL, &mut material);

        assert!(completed);
        assert_eq!(controller.active_index().number(), 2);
        assert_eq!(material.transition(), 0.0);
        assert_eq!(material.from_slot(), TextureSlot::Secondary);
        assert_eq!(material.to_slot(), TextureSlot::Primary);
        assert_eq!(controller.state(), CrossfadeState::Idle);
        assert_eq!(controller.cycles(), 1);
        assert!(!controller.has_tween());
    }

    #[test]
    fn completion_flips_index_exactly_once() {
        let (mut controller, mut material) = setup();
        controller.start(&mut material);
        controller.advance(FULL, &mut material);
        controller.advance(FULL, &mut material);
        controller.advance(FULL, &mut material);
        assert_eq!(controller.cycles(), 1);
        assert_eq!(controller.active_index(), ActiveIndex::Two);
    }

    #[test]
    fn stop_then_start_resumes_from_frozen_value() {
        let (mut controller, mut material) = setup();
        controller.start(&mut material);
        controller.advance(Duration::from_millis(800), &mut material);
        controller.stop(&mut material);
        let frozen = material.transition();
        assert!(frozen > 0.0 && frozen < 1.0);

        controller.advance(Duration::from_secs(5), &mut material);
        assert_eq!(material.transition(), frozen);
        assert_eq!(controller.state(), CrossfadeState::Paused);

        controller.start(&mut material);
        controller.advance(Duration::from_millis(100), &mut material);
        assert!(material.transition() > frozen);
        assert_eq!(controller.cycles(), 0);
    }

    #[test]
    fn stop_when_idle_is_a_no_op() {
        let (mut controller, mut material) = setup();
        controller.stop(&mut material);
        assert_eq!(controller.state(), CrossfadeState::Idle);
        assert!(!controller.has_tween());
        assert_eq!(material.transition(), 0.0);
    }

    #[test]
    fn resumed_fade_needs_only_the_remaining_time() {
        let (mut controller, mut material) = setup();
        controller.start(&mut material);
        controller.advance(Duration::from_millis(1500), &mut material);
        controller.stop(&mut material);
        controller.start(&mut material);
        assert!(controller.advance(Duration::from_millis(500), &mut material));
        assert_eq!(controller.active_index(), ActiveIndex::Two);
    }

    #[test]
    fn auto_animate_keeps_cycling() {
        let (mut controller, mut material) = setup();
        controller.set_auto_animate(true, &mut material);
        assert!(controller.auto_animate());

        controller.advance(FULL, &mut material);
        assert_eq!(controller.active_index(), ActiveIndex::Two);
        assert_eq!(controller.state(), CrossfadeState::Cycling);
        assert!(controller.has_tween());

        controller.advance(Duration::from_secs(1), &mut material);
        assert!(material.transition() > 0.0);
        controller.advance(Duration::from_secs(1), &mut material);
        assert_eq!(controller.active_index(), ActiveIndex::One);
        assert_eq!(controller.cycles(), 2);
    }

    #[test]
    fn unticking_auto_animate_pauses() {
        let (mut controller, mut material) = setup();
        controller.set_auto_animate(true, &mut material);
        controller.advance(Duration::from_millis(600), &mut material);
        controller.set_auto_animate(false, &mut material);
        assert_eq!(controller.state(), CrossfadeState::Paused);
        assert!(!controller.auto_animate());
        let frozen = material.transition();
        controller.advance(Duration::from_secs(3), &mut material);
        assert_eq!(material.transition(), frozen);
    }

    #[test]
    fn manual_transition_cancels_running_fade() {
        let (mut controller, mut material) = setup();
        controller.start(&mut material);
        controller.advance(Duration::from_millis(500), &mut material);
        controller.set_manual_transition(0.25, &mut material);

        assert_eq!(controller.state(), CrossfadeState::Idle);
        assert!(!controller.has_tween());
        assert_eq!(material.transition(), 0.25);
        controller.advance(Duration::from_secs(3), &mut material);
        assert_eq!(material.transition(), 0.25);
        assert_eq!(controller.active_index(), ActiveIndex::One);
    }

    #[test]
    fn start_after_manual_input_fades_from_that_value() {
        let (mut controller, mut material) = setup();
        controller.set_manual_transition(0.6, &mut material);
        controller.start(&mut material);
        controller.advance(Duration::from_millis(500), &mut material);
        assert!(material.transition() > 0.6);
        assert!(material.transition() < 1.0);
    }

    #[test]
    fn transition_table_covers_completion_edges() {
        use CrossfadeEffect as E;
        use CrossfadeEvent as Ev;
        use CrossfadeState as S;
        assert_eq!(next_state(S::Fading, Ev::Completed), (S::Idle, E::Cycle));
        assert_eq!(
            next_state(S::Cycling, Ev::Completed),
            (S::Cycling, E::CycleAndRestart)
        );
        assert_eq!(next_state(S::Idle, Ev::Completed), (S::Idle, E::None));
        assert_eq!(next_state(S::Paused, Ev::Completed), (S::Paused, E::None));
        assert_eq!(next_state(S::Fading, Ev::Start), (S::Fading, E::None));
        assert_eq!(next_state(S::Paused, Ev::Start), (S::Fading, E::Begin));
    }
}
