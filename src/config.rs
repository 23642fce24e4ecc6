use anyhow::Context;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver},
};

use crate::channels::SpringParams;
use crate::overlay::OverlayMotion;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub ui: UiConfig,
    pub animation: AnimationConfig,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// The file the config came from, if any; watched for hot reload.
    pub source: Option<PathBuf>,
}

impl Config {
    pub fn load() -> anyhow::Result<LoadedConfig> {
        for path in candidate_paths() {
            if path.exists() {
                let config = Config::from_path(&path)?;
                return Ok(LoadedConfig {
                    config,
                    source: Some(path),
                });
            }
        }

        Ok(LoadedConfig {
            config: Config::default(),
            source: None,
        })
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let doc: ConfigDocument = toml::from_str(&data)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(doc.into())
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(current_dir) = env::current_dir() {
        candidates.push(current_dir.join("config.toml"));
        candidates.push(current_dir.join("config").join("neonplayer.toml"));
    }

    if let Ok(exe) = env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.join("config.toml"));
            candidates.push(dir.join("config").join("neonplayer.toml"));
        }
    }

    candidates
}

#[derive(Debug, Clone)]
pub struct UiConfig {
    /// Blob canvas size in logical pixels; the radius ramp tops out at a
    /// third of it.
    pub blob_size: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { blob_size: 200.0 }
    }
}

impl UiConfig {
    pub fn blob_size(&self) -> f32 {
        if self.blob_size.is_finite() {
            self.blob_size.clamp(50.0, 800.0)
        } else {
            200.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnimationConfig {
    pub blob_cycle_ms: u64,
    pub gradient_cycle_ms: u64,
    pub overlay_fade_ms: u64,
    pub spring_damping: f32,
    pub spring_stiffness: f32,
    pub overlay_travel: f32,
    pub row_enter_stagger_ms: u64,
    pub row_exit_stagger_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            blob_cycle_ms: 5000,
            gradient_cycle_ms: 3000,
            overlay_fade_ms: 200,
            spring_damping: 10.0,
            spring_stiffness: 100.0,
            overlay_travel: 100.0,
            row_enter_stagger_ms: 100,
            row_exit_stagger_ms: 10,
        }
    }
}

impl AnimationConfig {
    pub fn blob_cycle_secs(&self) -> f32 {
        clamp_ms(self.blob_cycle_ms, 100, 60_000)
    }

    pub fn gradient_cycle_secs(&self) -> f32 {
        clamp_ms(self.gradient_cycle_ms, 100, 60_000)
    }

    pub fn overlay_fade_secs(&self) -> f32 {
        clamp_ms(self.overlay_fade_ms, 16, 5_000)
    }

    pub fn spring(&self) -> SpringParams {
        SpringParams {
            damping: finite_or(self.spring_damping, 10.0).clamp(0.1, 200.0),
            stiffness: finite_or(self.spring_stiffness, 100.0).clamp(1.0, 2_000.0),
            mass: 1.0,
        }
    }

    pub fn overlay_motion(&self) -> OverlayMotion {
        OverlayMotion {
            spring: self.spring(),
            fade_secs: self.overlay_fade_secs(),
            travel: finite_or(self.overlay_travel, 100.0).clamp(10.0, 1_000.0),
            row_enter_stagger_secs: clamp_ms(self.row_enter_stagger_ms, 0, 1_000),
            row_exit_stagger_secs: clamp_ms(self.row_exit_stagger_ms, 0, 1_000),
        }
    }
}

fn clamp_ms(ms: u64, min: u64, max: u64) -> f32 {
    ms.clamp(min, max) as f32 / 1000.0
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    ui: UiSection,
    #[serde(default)]
    animation: AnimationSection,
}

impl From<ConfigDocument> for Config {
    fn from(value: ConfigDocument) -> Self {
        let ui_defaults = UiConfig::default();
        let anim_defaults = AnimationConfig::default();

        Config {
            ui: UiConfig {
                blob_size: value.ui.blob_size.unwrap_or(ui_defaults.blob_size),
            },
            animation: AnimationConfig {
                blob_cycle_ms: value
                    .animation
                    .blob_cycle_ms
                    .unwrap_or(anim_defaults.blob_cycle_ms),
                gradient_cycle_ms: value
                    .animation
                    .gradient_cycle_ms
                    .unwrap_or(anim_defaults.gradient_cycle_ms),
                overlay_fade_ms: value
                    .animation
                    .overlay_fade_ms
                    .unwrap_or(anim_defaults.overlay_fade_ms),
                spring_damping: value
                    .animation
                    .spring_damping
                    .unwrap_or(anim_defaults.spring_damping),
                spring_stiffness: value
                    .animation
                    .spring_stiffness
                    .unwrap_or(anim_defaults.spring_stiffness),
                overlay_travel: value
                    .animation
                    .overlay_travel
                    .unwrap_or(anim_defaults.overlay_travel),
                row_enter_stagger_ms: value
                    .animation
                    .row_enter_stagger_ms
                    .unwrap_or(anim_defaults.row_enter_stagger_ms),
                row_exit_stagger_ms: value
                    .animation
                    .row_exit_stagger_ms
                    .unwrap_or(anim_defaults.row_exit_stagger_ms),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct UiSection {
    blob_size: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct AnimationSection {
    blob_cycle_ms: Option<u64>,
    gradient_cycle_ms: Option<u64>,
    overlay_fade_ms: Option<u64>,
    spring_damping: Option<f32>,
    spring_stiffness: Option<f32>,
    overlay_travel: Option<f32>,
    row_enter_stagger_ms: Option<u64>,
    row_exit_stagger_ms: Option<u64>,
}

/// Watches the loaded config file and re-parses it when it changes.
/// Polled from the frame loop; the watcher thread never touches app state.
pub struct ConfigWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
    changes_rx: Receiver<notify::Result<notify::Event>>,
}

impl ConfigWatcher {
    pub fn watch(path: &Path) -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        let watch_root = path.parent().unwrap_or(Path::new("."));
        watcher.watch(watch_root, RecursiveMode::NonRecursive)?;

        Ok(Self {
            path: path.to_path_buf(),
            _watcher: watcher,
            changes_rx: rx,
        })
    }

    /// Returns the freshly parsed config if the watched file changed since
    /// the last poll.
    pub fn poll(&mut self) -> Option<Config> {
        let mut relevant = false;
        while let Ok(event) = self.changes_rx.try_recv() {
            match event {
                Ok(evt) => {
                    if evt.paths.iter().any(|p| p.ends_with(
                        self.path.file_name().unwrap_or_default(),
                    )) {
                        relevant = true;
                    }
                }
                Err(err) => eprintln!("Config watcher error: {err}"),
            }
        }

        if !relevant {
            return None;
        }

        match Config::from_path(&self.path) {
            Ok(config) => Some(config),
            Err(err) => {
                eprintln!("Failed to reload config {}: {err:?}", self.path.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_resolves_to_defaults() {
        let doc: ConfigDocument = toml::from_str("").unwrap();
        let config: Config = doc.into();
        assert_eq!(config.ui.blob_size(), 200.0);
        assert_eq!(config.animation.blob_cycle_secs(), 5.0);
        assert_eq!(config.animation.gradient_cycle_secs(), 3.0);
        assert_eq!(config.animation.overlay_fade_secs(), 0.2);
    }

    #[test]
    fn partial_document_keeps_unset_defaults() {
        let doc: ConfigDocument = toml::from_str(
            r#"
            [animation]
            gradient_cycle_ms = 1500
            "#,
        )
        .unwrap();
        let config: Config = doc.into();
        assert_eq!(config.animation.gradient_cycle_secs(), 1.5);
        assert_eq!(config.animation.blob_cycle_secs(), 5.0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let doc: ConfigDocument = toml::from_str(
            r#"
            [ui]
            blob_size = 10000.0

            [animation]
            blob_cycle_ms = 1
            spring_damping = -5.0
            "#,
        )
        .unwrap();
        let config: Config = doc.into();
        assert_eq!(config.ui.blob_size(), 800.0);
        assert_eq!(config.animation.blob_cycle_secs(), 0.1);
        assert_eq!(config.animation.spring().damping, 0.1);
    }

    #[test]
    fn overlay_motion_reflects_settings() {
        let config = Config::default();
        let motion = config.animation.overlay_motion();
        assert_eq!(motion.travel, 100.0);
        assert_eq!(motion.fade_secs, 0.2);
        assert_eq!(motion.spring.damping, 10.0);
        assert_eq!(motion.spring.stiffness, 100.0);
        assert_eq!(motion.row_enter_stagger_secs, 0.1);
        assert_eq!(motion.row_exit_stagger_secs, 0.01);
    }
}
