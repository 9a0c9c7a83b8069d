//! GPU side of the plane renderer.
//!
//! - `context` owns wgpu instance/device/surface wiring and reconfigures the
//!   swapchain when the window resizes.
//! - `textures` uploads the decoded color and mask images with repeat sampling.
//! - `pipeline` compiles the GLSL pair and builds one texture bind group per
//!   from/to assignment.
//! - `uniforms` mirrors the shader's uniform block.
//! - `state` glues everything together and exposes `GpuState` to `window`.

mod context;
mod pipeline;
mod state;
mod textures;
mod uniforms;

pub(crate) use state::GpuState;
