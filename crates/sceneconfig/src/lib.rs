use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: u32 = 1;

/// Upper end of the strength slider.
pub const MAX_STRENGTH: f32 = 2.0;

/// Per-axis cap on plane subdivisions.
pub const MAX_PLANE_SEGMENTS: u32 = 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialise configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SceneConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub textures: TextureConfig,
    #[serde(default)]
    pub crossfade: CrossfadeConfig,
    #[serde(default)]
    pub material: MaterialConfig,
    #[serde(default)]
    pub follow: FollowConfig,
    #[serde(default)]
    pub frame: FrameConfig,
    #[serde(default)]
    pub plane: PlaneConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub window: WindowConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            textures: TextureConfig::default(),
            crossfade: CrossfadeConfig::default(),
            material: MaterialConfig::default(),
            follow: FollowConfig::default(),
            frame: FrameConfig::default(),
            plane: PlaneConfig::default(),
            camera: CameraConfig::default(),
            window: WindowConfig::default(),
        }
    }
}

/// What to do when a texture cannot be decoded at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingTexture {
    /// Abort startup with the load error.
    #[default]
    Fail,
    /// Substitute a flat placeholder and keep going.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TextureConfig {
    #[serde(default = "default_primary")]
    pub primary: PathBuf,
    #[serde(default = "default_secondary")]
    pub secondary: PathBuf,
    #[serde(default = "default_mask")]
    pub mask: PathBuf,
    #[serde(default)]
    pub missing_texture: MissingTexture,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            secondary: default_secondary(),
            mask: default_mask(),
            missing_texture: MissingTexture::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EasingSetting {
    Linear,
    Smoothstep,
    QuadInOut,
    #[default]
    CubicInOut,
    QuadOut,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CrossfadeConfig {
    #[serde(
        default = "default_crossfade",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub duration: Duration,
    #[serde(default)]
    pub easing: EasingSetting,
    #[serde(default)]
    pub auto_animate: bool,
}

impl Default for CrossfadeConfig {
    fn default() -> Self {
        Self {
            duration: default_crossfade(),
            easing: EasingSetting::CubicInOut,
            auto_animate: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MaterialConfig {
    /// `#rrggbb` hex colour used to tint the wipe edge.
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_strength")]
    pub strength: f32,
    #[serde(default = "default_edge_softness")]
    pub edge_softness: f32,
    #[serde(default)]
    pub edge_glow: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            strength: default_strength(),
            edge_softness: default_edge_softness(),
            edge_glow: 0.0,
        }
    }
}

impl MaterialConfig {
    pub fn rgb(&self) -> Result<[f32; 3], ConfigError> {
        parse_hex_color(&self.color).map_err(ConfigError::Invalid)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FollowConfig {
    #[serde(
        default = "default_follow",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub duration: Duration,
    #[serde(default = "default_follow_easing")]
    pub easing: EasingSetting,
    #[serde(default = "default_follow_scale")]
    pub scale: f32,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            duration: default_follow(),
            easing: default_follow_easing(),
            scale: default_follow_scale(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FrameConfig {
    #[serde(default = "default_time_step")]
    pub time_step: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            time_step: default_time_step(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaneConfig {
    #[serde(default = "default_plane_width")]
    pub width: f32,
    #[serde(default = "default_plane_height")]
    pub height: f32,
    #[serde(default = "default_width_segments")]
    pub width_segments: u32,
    #[serde(default = "default_height_segments")]
    pub height_segments: u32,
    #[serde(default = "default_plane_z")]
    pub z: f32,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            width: default_plane_width(),
            height: default_plane_height(),
            width_segments: default_width_segments(),
            height_segments: default_height_segments(),
            z: default_plane_z(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CameraConfig {
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default = "default_camera_z")]
    pub z: f32,
    /// Fraction of the remaining orbit velocity removed per frame.
    #[serde(default = "default_damping")]
    pub damping: f32,
    #[serde(default = "default_true")]
    pub orbit: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: default_fov(),
            near: default_near(),
            far: default_far(),
            z: default_camera_z(),
            damping: default_damping(),
            orbit: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: u32,
    #[serde(default = "default_window_height")]
    pub height: u32,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "deserialize_antialias_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub antialias: Option<AntialiasSetting>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
            title: default_title(),
            antialias: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_primary() -> PathBuf {
    PathBuf::from("img/fire.png")
}

fn default_secondary() -> PathBuf {
    PathBuf::from("img/wall.png")
}

fn default_mask() -> PathBuf {
    PathBuf::from("img/transition1.png")
}

fn default_crossfade() -> Duration {
    Duration::from_secs(2)
}

fn default_follow() -> Duration {
    Duration::from_secs(1)
}

fn default_follow_easing() -> EasingSetting {
    EasingSetting::QuadOut
}

fn default_follow_scale() -> f32 {
    0.5
}

fn default_color() -> String {
    "#0088ff".to_string()
}

fn default_strength() -> f32 {
    0.05
}

fn default_edge_softness() -> f32 {
    0.1
}

fn default_time_step() -> f32 {
    0.005
}

fn default_plane_width() -> f32 {
    30.0
}

fn default_plane_height() -> f32 {
    20.0
}

fn default_width_segments() -> u32 {
    10
}

fn default_height_segments() -> u32 {
    1
}

fn default_plane_z() -> f32 {
    -8.0
}

fn default_fov() -> f32 {
    75.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    1000.0
}

fn default_camera_z() -> f32 {
    2.0
}

fn default_damping() -> f32 {
    0.05
}

fn default_true() -> bool {
    true
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    720
}

fn default_title() -> String {
    "wipeplane".to_string()
}

fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*duration).to_string())
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be a non-negative number"));
            }
            Duration::try_from_secs_f64(v).map_err(E::custom)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            let raw = value.to_string();
            Some(parse_antialias(&raw).map_err(de::Error::custom)?)
        }
    };
    Ok(result)
}

pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" | "samples2" => Ok(AntialiasSetting::Samples2),
        "4" | "samples4" => Ok(AntialiasSetting::Samples4),
        "8" | "samples8" => Ok(AntialiasSetting::Samples8),
        "16" | "samples16" => Ok(AntialiasSetting::Samples16),
        other => Err(format!("invalid antialias setting '{other}'")),
    }
}

/// Parses `#rrggbb` (leading `#` optional) into linear 0-1 channels.
pub fn parse_hex_color(raw: &str) -> Result<[f32; 3], String> {
    let hex = raw.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(format!("colour '{raw}' must be written as #rrggbb"));
    }
    let mut rgb = [0.0; 3];
    for (index, channel) in rgb.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&hex[index * 2..index * 2 + 2], 16)
            .map_err(|err| format!("colour '{raw}': {err}"))?;
        *channel = f32::from(byte) / 255.0;
    }
    Ok(rgb)
}

impl SceneConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SceneConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads, validates, and anchors relative texture paths to the file's
    /// directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&contents)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.textures.primary,
            &mut self.textures.secondary,
            &mut self.textures.mask,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected {CONFIG_VERSION}",
                self.version
            )));
        }

        for (name, path) in [
            ("textures.primary", &self.textures.primary),
            ("textures.secondary", &self.textures.secondary),
            ("textures.mask", &self.textures.mask),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} may not be empty")));
            }
        }

        if self.crossfade.duration.is_zero() {
            return Err(ConfigError::Invalid(
                "crossfade.duration must be greater than zero".into(),
            ));
        }
        if self.follow.duration.is_zero() {
            return Err(ConfigError::Invalid(
                "follow.duration must be greater than zero".into(),
            ));
        }

        self.material.rgb()?;
        if !(0.0..=MAX_STRENGTH).contains(&self.material.strength) {
            return Err(ConfigError::Invalid(format!(
                "material.strength must lie between 0 and {MAX_STRENGTH}"
            )));
        }
        require_positive("material.edge_softness", self.material.edge_softness)?;
        if !self.material.edge_glow.is_finite() || self.material.edge_glow < 0.0 {
            return Err(ConfigError::Invalid(
                "material.edge_glow must be a non-negative number".into(),
            ));
        }

        require_finite("follow.scale", self.follow.scale)?;
        require_finite("frame.time_step", self.frame.time_step)?;

        require_positive("plane.width", self.plane.width)?;
        require_positive("plane.height", self.plane.height)?;
        require_finite("plane.z", self.plane.z)?;
        for (name, segments) in [
            ("plane.width_segments", self.plane.width_segments),
            ("plane.height_segments", self.plane.height_segments),
        ] {
            if !(1..=MAX_PLANE_SEGMENTS).contains(&segments) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must lie between 1 and {MAX_PLANE_SEGMENTS}"
                )));
            }
        }

        if !(1.0..179.0).contains(&self.camera.fov_degrees) {
            return Err(ConfigError::Invalid(
                "camera.fov_degrees must lie between 1 and 179".into(),
            ));
        }
        require_positive("camera.near", self.camera.near)?;
        if !self.camera.far.is_finite() || self.camera.far <= self.camera.near {
            return Err(ConfigError::Invalid(
                "camera.far must be greater than camera.near".into(),
            ));
        }
        require_finite("camera.z", self.camera.z)?;
        if !(0.0..=1.0).contains(&self.camera.damping) {
            return Err(ConfigError::Invalid(
                "camera.damping must lie between 0 and 1".into(),
            ));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(
                "window dimensions must be non-zero".into(),
            ));
        }

        Ok(())
    }
}

fn require_finite(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be a finite number")))
    }
}

fn require_positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be greater than zero")))
    }
}
