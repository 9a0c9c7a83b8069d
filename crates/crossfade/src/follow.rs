use std::time::Duration;

use crate::easing::Easing;
use crate::tween::Tween;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowSettings {
    pub duration: Duration,
    pub easing: Easing,
    /// Plane offset per unit of normalized pointer travel.
    pub scale: f32,
}

impl Default for FollowSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(1),
            easing: Easing::QuadOut,
            scale: 0.5,
        }
    }
}

/// Converts a window-space cursor position into normalized device
/// coordinates: x right and y up, both in `[-1, 1]`.
pub fn normalize_pointer(x: f64, y: f64, width: u32, height: u32) -> [f32; 2] {
    let width = f64::from(width.max(1));
    let height = f64::from(height.max(1));
    let nx = (x / width) * 2.0 - 1.0;
    let ny = -(y / height) * 2.0 + 1.0;
    [nx.clamp(-1.0, 1.0) as f32, ny.clamp(-1.0, 1.0) as f32]
}

/// Eases the plane toward the latest pointer target.
///
/// A new tween starts from wherever the plane currently is whenever the
/// target changes; an unchanged target lets the running tween finish.
#[derive(Debug, Clone)]
pub struct PointerFollower {
    settings: FollowSettings,
    pointer: [f32; 2],
    position: [f32; 2],
    target: [f32; 2],
    tween: Option<Tween<[f32; 2]>>,
}

impl PointerFollower {
    pub fn new(settings: FollowSettings) -> Self {
        Self {
            settings,
            pointer: [0.0, 0.0],
            position: [0.0, 0.0],
            target: [0.0, 0.0],
            tween: None,
        }
    }

    pub fn set_pointer(&mut self, ndc: [f32; 2]) {
        if ndc.iter().all(|value| value.is_finite()) {
            self.pointer = [ndc[0].clamp(-1.0, 1.0), ndc[1].clamp(-1.0, 1.0)];
        }
    }

    pub fn pointer(&self) -> [f32; 2] {
        self.pointer
    }

    pub fn position(&self) -> [f32; 2] {
        self.position
    }

    pub fn target(&self) -> [f32; 2] {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.tween.is_none() && self.position == self.target
    }

    pub fn advance(&mut self, dt: Duration) -> [f32; 2] {
        let wanted = [
            self.pointer[0] * self.settings.scale,
            self.pointer[1] * self.settings.scale,
        ];
        if wanted != self.target {
            self.target = wanted;
            let mut tween = Tween::new(
                self.position,
                wanted,
                self.settings.duration,
                self.settings.easing,
            );
            tween.play();
            self.tween = Some(tween);
        }

        if let Some(tween) = self.tween.as_mut() {
            tween.advance(dt);
            self.position = tween.value();
            if tween.is_finished() {
                self.tween = None;
            }
        }
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_normalizes_to_device_coordinates() {
        assert_eq!(normalize_pointer(0.0, 0.0, 800, 600), [-1.0, 1.0]);
        assert_eq!(normalize_pointer(800.0, 600.0, 800, 600), [1.0, -1.0]);
        assert_eq!(normalize_pointer(400.0, 300.0, 800, 600), [0.0, 0.0]);
        assert_eq!(normalize_pointer(-50.0, 900.0, 800, 600), [-1.0, -1.0]);
    }

    #[test]
    fn plane_reaches_corner_target_smoothly() {
        let mut follower = PointerFollower::new(FollowSettings::default());
        follower.set_pointer([1.0, -1.0]);

        let first = follower.advance(Duration::from_millis(16));
        assert_eq!(follower.target(), [0.5, -0.5]);
        assert!(first[0] > 0.0 && first[0] < 0.5);
        assert!(first[1] < 0.0 && first[1] > -0.5);

        let halfway = follower.advance(Duration::from_millis(484));
        assert!(halfway[0] > first[0] && halfway[0] < 0.5);

        let done = follower.advance(Duration::from_millis(500));
        assert_eq!(done, [0.5, -0.5]);
        assert!(follower.is_settled());
    }

    #[test]
    fn retargeting_starts_from_current_position() {
        let mut follower = PointerFollower::new(FollowSettings::default());
        follower.set_pointer([1.0, 1.0]);
        let mid = follower.advance(Duration::from_millis(300));
        follower.set_pointer([-1.0, 1.0]);
        let next = follower.advance(Duration::ZERO);
        assert_eq!(next, mid);
        assert_eq!(follower.target(), [-0.5, 0.5]);
    }

    #[test]
    fn unchanged_pointer_does_not_restart_the_move() {
        let mut follower = PointerFollower::new(FollowSettings::default());
        follower.set_pointer([0.4, 0.0]);
        for _ in 0..10 {
            follower.set_pointer([0.4, 0.0]);
            follower.advance(Duration::from_millis(100));
        }
        assert_eq!(follower.position(), [0.2, 0.0]);
    }

    #[test]
    fn non_finite_pointer_input_is_ignored() {
        let mut follower = PointerFollower::new(FollowSettings::default());
        follower.set_pointer([0.5, 0.5]);
        follower.set_pointer([f32::NAN, 0.0]);
        assert_eq!(follower.pointer(), [0.5, 0.5]);
    }
}
