//! Crossfade logic for the wipe plane, kept free of GPU and window types so
//! every state change can be driven from tests.
//!
//! ```text
//!   pointer / panel input
//!          │ SceneCommand
//!          ▼
//!   Scene::tick ──▶ PointerFollower ──▶ plane position
//!          │
//!          └──▶ CrossfadeController ──▶ MaterialUniforms ──▶ FrameSnapshot
//! ```
//!
//! `Scene` owns one command queue and is the only writer of the material, the
//! controller and the follower. The renderer reads a `FrameSnapshot` per frame
//! and never mutates scene state directly.

mod clock;
mod controller;
mod easing;
mod follow;
mod material;
mod panel;
mod scene;
mod tween;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{
    next_state, CrossfadeController, CrossfadeEffect, CrossfadeEvent, CrossfadeSettings,
    CrossfadeState,
};
pub use easing::Easing;
pub use follow::{normalize_pointer, FollowSettings, PointerFollower};
pub use material::{
    blend_texel, edge_band, wipe_factor, ActiveIndex, MaterialParams, MaterialUniforms,
    TextureSlot, MAX_STRENGTH, MIN_EDGE_SOFTNESS,
};
pub use panel::{Checkbox, PanelCommand, PanelInput, ParameterPanel, Slider};
pub use scene::{FrameSnapshot, Scene, SceneCommand, SceneSettings, MAX_FRAME_DELTA};
pub use tween::{Lerp, Playback, Tween, TweenStep};
