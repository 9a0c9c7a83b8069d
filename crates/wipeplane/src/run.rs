use anyhow::{Context, Result};
use renderer::Renderer;
use sceneconfig::SceneConfig;
use tracing_subscriber::EnvFilter;

use crate::bindings::renderer_config;
use crate::cli::{Cli, Command, ConfigAction, RunArgs};
use crate::paths::AppPaths;

pub fn run(cli: Cli) -> Result<()> {
    initialise_tracing();

    let paths = AppPaths::discover()?;
    tracing::debug!(config = %paths.config_dir().display(), "resolved wipeplane paths");

    match cli.command {
        Some(Command::Config(command)) => match command.action {
            ConfigAction::Show { json } => {
                let config = resolve_config(&cli.run, &paths)?;
                let rendered = if json {
                    serde_json::to_string_pretty(&config)
                        .context("failed to serialise configuration as JSON")?
                } else {
                    config.to_toml_string()?
                };
                println!("{rendered}");
                Ok(())
            }
            ConfigAction::Where => {
                let scene_file = paths.scene_file();
                println!("config: {}", paths.config_dir().display());
                println!(
                    "scene: {} ({})",
                    scene_file.display(),
                    if scene_file.is_file() { "present" } else { "missing" }
                );
                Ok(())
            }
        },
        None => run_scene(&cli.run, &paths),
    }
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Defaults, then the scene file (explicit `--config` or the discovered
/// one), then command-line flags.
pub fn resolve_config(args: &RunArgs, paths: &AppPaths) -> Result<SceneConfig> {
    let mut config = match &args.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load scene config {}", path.display()))?,
        None => {
            let default_file = paths.scene_file();
            if default_file.is_file() {
                SceneConfig::load(&default_file).with_context(|| {
                    format!("failed to load scene config {}", default_file.display())
                })?
            } else {
                tracing::debug!(
                    path = %default_file.display(),
                    "no scene config found; using built-in defaults"
                );
                SceneConfig::default()
            }
        }
    };

    args.apply_overrides(&mut config);
    config
        .validate()
        .context("invalid configuration after applying command-line overrides")?;
    Ok(config)
}

fn run_scene(args: &RunArgs, paths: &AppPaths) -> Result<()> {
    let config = resolve_config(args, paths)?;
    let settings = renderer_config(&config, args.color_space)?;
    tracing::info!(
        primary = %config.textures.primary.display(),
        secondary = %config.textures.secondary.display(),
        mask = %config.textures.mask.display(),
        fade_ms = config.crossfade.duration.as_millis() as u64,
        auto_animate = config.crossfade.auto_animate,
        "starting wipeplane"
    );
    Renderer::new(settings).run()
}
