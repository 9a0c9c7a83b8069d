use std::path::PathBuf;

use clap::{Parser, Subcommand};
use renderer::ColorSpaceMode;
use sceneconfig::{AntialiasSetting, SceneConfig};

#[derive(Parser, Debug)]
#[command(
    name = "wipeplane",
    author,
    version,
    about = "Animated plane that crossfades between two textures through a wipe mask"
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Scene configuration file; defaults to `scene.toml` in the config directory.
    #[arg(long, value_name = "PATH", env = "WIPEPLANE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Image shown first.
    #[arg(long, value_name = "PATH")]
    pub primary: Option<PathBuf>,

    /// Image faded in by the first crossfade.
    #[arg(long, value_name = "PATH")]
    pub secondary: Option<PathBuf>,

    /// Greyscale transition mask; darker texels switch first.
    #[arg(long, value_name = "PATH")]
    pub mask: Option<PathBuf>,

    /// Override the window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Initial vertex displacement strength.
    #[arg(long, value_name = "STRENGTH")]
    pub strength: Option<f32>,

    /// Start with auto-animate enabled (repeating crossfades).
    #[arg(long)]
    pub auto: bool,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = sceneconfig::parse_antialias)]
    pub antialias: Option<AntialiasSetting>,

    /// Output color space handling: `auto`, `gamma`, or `linear`.
    #[arg(
        long,
        value_name = "MODE",
        value_parser = parse_color_space,
        default_value = "auto"
    )]
    pub color_space: ColorSpaceMode,
}

impl RunArgs {
    /// Applies flag overrides on top of values read from the config file.
    pub fn apply_overrides(&self, config: &mut SceneConfig) {
        if let Some(path) = &self.primary {
            config.textures.primary = path.clone();
        }
        if let Some(path) = &self.secondary {
            config.textures.secondary = path.clone();
        }
        if let Some(path) = &self.mask {
            config.textures.mask = path.clone();
        }
        if let Some((width, height)) = self.size {
            config.window.width = width;
            config.window.height = height;
        }
        if let Some(strength) = self.strength {
            config.material.strength = strength;
        }
        if self.auto {
            config.crossfade.auto_animate = true;
        }
        if let Some(antialias) = self.antialias {
            config.window.antialias = Some(antialias);
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect the resolved scene configuration.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the configuration after defaults, file values and flags are merged.
    Show {
        /// Emit JSON instead of TOML.
        #[arg(long)]
        json: bool,
    },
    /// Print the config directory and the scene file that would be loaded.
    Where,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(spec: &str) -> Result<(u32, u32), String> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 1280x720".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| "invalid width in size specification".to_string())?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| "invalid height in size specification".to_string())?;

    if width == 0 || height == 0 {
        return Err("window dimensions must be greater than zero".to_string());
    }

    Ok((width, height))
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceMode, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("color space must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" => Ok(ColorSpaceMode::Auto),
        "gamma" | "srgb-off" => Ok(ColorSpaceMode::Gamma),
        "linear" | "srgb" => Ok(ColorSpaceMode::Linear),
        other => Err(format!(
            "unknown color space '{other}'; expected auto, gamma, or linear"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_surface_size("1280x720"), Ok((1280, 720)));
        assert_eq!(parse_surface_size(" 800 X 600 "), Ok((800, 600)));
        assert!(parse_surface_size("0x600").is_err());
        assert!(parse_surface_size("1280").is_err());
    }

    #[test]
    fn parses_color_space_aliases() {
        assert_eq!(parse_color_space("SRGB"), Ok(ColorSpaceMode::Linear));
        assert_eq!(parse_color_space("gamma"), Ok(ColorSpaceMode::Gamma));
        assert!(parse_color_space("hdr").is_err());
    }

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::try_parse_from([
            "wipeplane",
            "--primary",
            "a.png",
            "--size",
            "640x480",
            "--strength",
            "0.4",
            "--auto",
            "--antialias",
            "4",
        ])
        .unwrap();
        let mut config = SceneConfig::default();
        cli.run.apply_overrides(&mut config);
        assert_eq!(config.textures.primary, PathBuf::from("a.png"));
        assert_eq!(config.textures.secondary, PathBuf::from("img/wall.png"));
        assert_eq!((config.window.width, config.window.height), (640, 480));
        assert_eq!(config.material.strength, 0.4);
        assert!(config.crossfade.auto_animate);
        assert_eq!(config.window.antialias, Some(AntialiasSetting::Samples4));
    }

    #[test]
    fn config_subcommand_parses() {
        let cli = Cli::try_parse_from(["wipeplane", "config", "show", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config(ConfigCommand {
                action: ConfigAction::Show { json: true }
            }))
        ));
        assert!(!cli.run.auto);
    }
}
