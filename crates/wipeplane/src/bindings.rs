use anyhow::{Context, Result};
use crossfade::{
    CrossfadeSettings, Easing, FollowSettings, MaterialParams, SceneSettings,
};
use renderer::{
    Antialiasing, CameraSettings, ColorSpaceMode, MissingTexturePolicy, PlaneGeometry,
    RendererConfig, TextureSources,
};
use sceneconfig::{AntialiasSetting, EasingSetting, MissingTexture, SceneConfig};

pub fn map_easing(setting: EasingSetting) -> Easing {
    match setting {
        EasingSetting::Linear => Easing::Linear,
        EasingSetting::Smoothstep => Easing::Smoothstep,
        EasingSetting::QuadInOut => Easing::QuadInOut,
        EasingSetting::CubicInOut => Easing::CubicInOut,
        EasingSetting::QuadOut => Easing::QuadOut,
    }
}

pub fn map_antialias(setting: Option<AntialiasSetting>) -> Antialiasing {
    match setting {
        None | Some(AntialiasSetting::Auto) => Antialiasing::Auto,
        Some(AntialiasSetting::Off) => Antialiasing::Off,
        Some(AntialiasSetting::Samples2) => Antialiasing::Samples(2),
        Some(AntialiasSetting::Samples4) => Antialiasing::Samples(4),
        Some(AntialiasSetting::Samples8) => Antialiasing::Samples(8),
        Some(AntialiasSetting::Samples16) => Antialiasing::Samples(16),
    }
}

fn map_missing_texture(setting: MissingTexture) -> MissingTexturePolicy {
    match setting {
        MissingTexture::Fail => MissingTexturePolicy::Fail,
        MissingTexture::Placeholder => MissingTexturePolicy::Placeholder,
    }
}

pub fn scene_settings(config: &SceneConfig) -> Result<SceneSettings> {
    let color = config.material.rgb().context("invalid material colour")?;
    Ok(SceneSettings {
        material: MaterialParams {
            color,
            strength: config.material.strength,
            edge_softness: config.material.edge_softness,
            edge_glow: config.material.edge_glow,
        },
        crossfade: CrossfadeSettings {
            duration: config.crossfade.duration,
            easing: map_easing(config.crossfade.easing),
        },
        follow: FollowSettings {
            duration: config.follow.duration,
            easing: map_easing(config.follow.easing),
            scale: config.follow.scale,
        },
        time_step: config.frame.time_step,
        plane_z: config.plane.z,
        auto_animate: config.crossfade.auto_animate,
    })
}

pub fn renderer_config(config: &SceneConfig, color_space: ColorSpaceMode) -> Result<RendererConfig> {
    Ok(RendererConfig {
        surface_size: (config.window.width, config.window.height),
        title: config.window.title.clone(),
        textures: TextureSources {
            primary: config.textures.primary.clone(),
            secondary: config.textures.secondary.clone(),
            mask: config.textures.mask.clone(),
            missing: map_missing_texture(config.textures.missing_texture),
        },
        scene: scene_settings(config)?,
        plane: PlaneGeometry {
            width: config.plane.width,
            height: config.plane.height,
            width_segments: config.plane.width_segments,
            height_segments: config.plane.height_segments,
        },
        camera: CameraSettings {
            fov_degrees: config.camera.fov_degrees,
            near: config.camera.near,
            far: config.camera.far,
            distance: config.camera.z,
            damping: config.camera.damping,
            orbit: config.camera.orbit,
        },
        antialiasing: map_antialias(config.window.antialias),
        color_space,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults_map_to_library_defaults() {
        let config = SceneConfig::default();
        let renderer = renderer_config(&config, ColorSpaceMode::Auto).unwrap();
        assert_eq!(renderer.scene, SceneSettings::default());
        assert_eq!(renderer.plane, PlaneGeometry::default());
        assert_eq!(renderer.camera, CameraSettings::default());
        assert_eq!(renderer.antialiasing, Antialiasing::Auto);
        assert_eq!(renderer.textures.missing, MissingTexturePolicy::Fail);
    }

    #[test]
    fn config_values_flow_through() {
        let mut config = SceneConfig::default();
        config.crossfade.duration = Duration::from_millis(1500);
        config.crossfade.easing = EasingSetting::Linear;
        config.crossfade.auto_animate = true;
        config.material.color = "#ff0000".into();
        config.window.antialias = Some(AntialiasSetting::Samples8);
        config.textures.missing_texture = MissingTexture::Placeholder;

        let renderer = renderer_config(&config, ColorSpaceMode::Linear).unwrap();
        assert_eq!(renderer.scene.crossfade.duration, Duration::from_millis(1500));
        assert_eq!(renderer.scene.crossfade.easing, Easing::Linear);
        assert!(renderer.scene.auto_animate);
        assert_eq!(renderer.scene.material.color, [1.0, 0.0, 0.0]);
        assert_eq!(renderer.antialiasing, Antialiasing::Samples(8));
        assert_eq!(renderer.color_space, ColorSpaceMode::Linear);
        assert_eq!(renderer.textures.missing, MissingTexturePolicy::Placeholder);
    }
}
