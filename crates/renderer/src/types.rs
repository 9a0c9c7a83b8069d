use std::path::PathBuf;

use crossfade::SceneSettings;

/// The three images a scene samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureRole {
    Primary,
    Secondary,
    Mask,
}

impl TextureRole {
    pub fn label(self) -> &'static str {
        match self {
            TextureRole::Primary => "primary",
            TextureRole::Secondary => "secondary",
            TextureRole::Mask => "mask",
        }
    }
}

impl std::fmt::Display for TextureRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Reaction to a texture that fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingTexturePolicy {
    #[default]
    Fail,
    Placeholder,
}

/// Paths of the images loaded at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSources {
    pub primary: PathBuf,
    pub secondary: PathBuf,
    pub mask: PathBuf,
    pub missing: MissingTexturePolicy,
}

impl TextureSources {
    pub fn path(&self, role: TextureRole) -> &PathBuf {
        match role {
            TextureRole::Primary => &self.primary,
            TextureRole::Secondary => &self.secondary,
            TextureRole::Mask => &self.mask,
        }
    }
}

/// Dimensions and tessellation of the plane mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneGeometry {
    pub width: f32,
    pub height: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for PlaneGeometry {
    fn default() -> Self {
        Self {
            width: 30.0,
            height: 20.0,
            width_segments: 10,
            height_segments: 1,
        }
    }
}

/// Perspective and orbit-control parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Initial distance from the origin along +z.
    pub distance: f32,
    pub damping: f32,
    pub orbit: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            distance: 2.0,
            damping: 0.05,
            orbit: true,
        }
    }
}

/// Output color handling for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    /// Present image bytes unchanged (gamma-encoded swapchain).
    #[default]
    Auto,
    /// Treat textures as gamma-encoded; use non-sRGB surfaces.
    Gamma,
    /// Decode textures to linear and let an sRGB swapchain re-encode them.
    Linear,
}

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Summary of the adapter picked at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
}

impl AdapterProfile {
    pub fn from_wgpu(info: &wgpu::AdapterInfo) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
        }
    }

    pub fn is_software(&self) -> bool {
        matches!(self.device_type, wgpu::DeviceType::Cpu)
            || self.name.to_ascii_lowercase().contains("llvmpipe")
    }
}

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    pub title: String,
    pub textures: TextureSources,
    pub scene: SceneSettings,
    pub plane: PlaneGeometry,
    pub camera: CameraSettings,
    pub antialiasing: Antialiasing,
    pub color_space: ColorSpaceMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, device_type: wgpu::DeviceType) -> AdapterProfile {
        AdapterProfile {
            name: name.to_string(),
            backend: wgpu::Backend::Vulkan,
            device_type,
        }
    }

    #[test]
    fn software_adapters_are_detected() {
        assert!(profile("llvmpipe (LLVM 17.0.6, 256 bits)", wgpu::DeviceType::Other).is_software());
        assert!(profile("SwiftShader", wgpu::DeviceType::Cpu).is_software());
        assert!(!profile("AMD Radeon RX 7800", wgpu::DeviceType::DiscreteGpu).is_software());
    }

    #[test]
    fn sources_map_roles_to_paths() {
        let sources = TextureSources {
            primary: PathBuf::from("a.png"),
            secondary: PathBuf::from("b.png"),
            mask: PathBuf::from("m.png"),
            missing: MissingTexturePolicy::Fail,
        };
        assert_eq!(sources.path(TextureRole::Mask), &PathBuf::from("m.png"));
        assert_eq!(TextureRole::Secondary.to_string(), "secondary");
    }
}
