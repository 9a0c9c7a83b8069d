//! Renderer crate for wipeplane.
//!
//! Glues the winit window, the `wgpu` plane pipeline and the `crossfade`
//! scene together. The overall flow is:
//!
//! ```text
//!   CLI / wipeplane
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ assets::load_texture_set ──▶ window::run_window
//!                                                      │
//!       input events / egui panel ──▶ Scene queue      │ RedrawRequested
//!                                                      ▼
//!                          Scene::tick ──▶ FrameSnapshot ──▶ GpuState::render
//!                                                      (plane pass, then UiPass)
//! ```
//!
//! All three images are decoded before the window opens, so a missing file
//! fails startup with a message naming the slot instead of a blank window.
//! `WindowState` owns every GPU resource and the scene; nothing crosses
//! threads.

mod assets;
mod camera;
mod compile;
mod gpu;
mod mesh;
mod types;
mod ui;
mod window;

use anyhow::Result;
use tracing::info;

pub use assets::{decode_image, load_texture_set, AssetError, DecodedImage, DecodedTextureSet};
pub use camera::OrbitCamera;
pub use mesh::{PlaneMesh, Vertex};
pub use types::{
    AdapterProfile, Antialiasing, CameraSettings, ColorSpaceMode, MissingTexturePolicy,
    PlaneGeometry, RendererConfig, TextureRole, TextureSources,
};
pub use window::{key_action, KeyAction};

/// Entry point used by the binary.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Loads the textures, opens the window and blocks until it closes.
    pub fn run(self) -> Result<()> {
        let images = load_texture_set(&self.config.textures)?;
        info!(
            primary = %self.config.textures.primary.display(),
            secondary = %self.config.textures.secondary.display(),
            mask = %self.config.textures.mask.display(),
            "textures decoded"
        );
        window::run_window(self.config, images)
    }
}
