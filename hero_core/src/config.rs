//! Configuration file support for Hero Workout.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/hero_workout/config.toml`.

use crate::{Catalog, Error, Intensity, Location, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub workout: WorkoutConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub music: MusicConfig,

    #[serde(default)]
    pub speech: SpeechConfig,
}

/// Where exercises come from
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// YAML catalog file; the built-in catalog is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Defaults for planning when the command line does not override them
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutConfig {
    #[serde(default = "default_num_exercises")]
    pub num_exercises: usize,

    #[serde(default = "default_intensity")]
    pub intensity: Intensity,

    #[serde(default = "default_location")]
    pub location: Location,
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            num_exercises: default_num_exercises(),
            intensity: default_intensity(),
            location: default_location(),
        }
    }
}

/// Session pacing
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_prep_seconds")]
    pub prep_seconds: u32,

    /// Countdown before the first exercise, longer to allow heading outside
    #[serde(default = "default_first_countdown")]
    pub first_countdown: u32,

    #[serde(default = "default_countdown")]
    pub countdown: u32,

    #[serde(default = "default_countdown_step_ms")]
    pub countdown_step_ms: u64,

    /// Used for exercises without a duration range
    #[serde(default = "default_duration")]
    pub default_duration: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prep_seconds: default_prep_seconds(),
            first_countdown: default_first_countdown(),
            countdown: default_countdown(),
            countdown_step_ms: default_countdown_step_ms(),
            default_duration: default_duration(),
        }
    }
}

/// Background music
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MusicConfig {
    #[serde(default = "default_music_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_fade_ms")]
    pub fade_ms: u64,

    /// Player command, e.g. `mpv --no-video`; the track path is appended
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Substrings of track paths that are played at `quiet_volume`
    #[serde(default)]
    pub quiet_tracks: Vec<String>,

    #[serde(default = "default_quiet_volume")]
    pub quiet_volume: f32,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            dir: default_music_dir(),
            fade_ms: default_fade_ms(),
            command: None,
            quiet_tracks: Vec::new(),
            quiet_volume: default_quiet_volume(),
        }
    }
}

/// Spoken prompts
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Speech command, e.g. `espeak`; prompts are printed when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Words per minute passed to the speech command
    #[serde(default = "default_speech_rate")]
    pub rate: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            command: None,
            rate: default_speech_rate(),
        }
    }
}

// Default value functions
fn default_num_exercises() -> usize {
    10
}

fn default_intensity() -> Intensity {
    Intensity::Medium
}

fn default_location() -> Location {
    Location::Any
}

fn default_prep_seconds() -> u32 {
    3
}

fn default_first_countdown() -> u32 {
    5
}

fn default_countdown() -> u32 {
    3
}

fn default_countdown_step_ms() -> u64 {
    500
}

fn default_duration() -> u32 {
    30
}

fn default_music_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("hero_workout")
        .join("music")
}

fn default_fade_ms() -> u64 {
    1000
}

fn default_quiet_volume() -> f32 {
    0.3
}

fn default_speech_rate() -> u32 {
    180
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("hero_workout")
            .join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject values the session runner cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.session.default_duration == 0 {
            return Err(Error::Config(
                "session.default_duration must be at least 1 second".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.music.quiet_volume) {
            return Err(Error::Config(format!(
                "music.quiet_volume must be between 0 and 1, got {}",
                self.music.quiet_volume
            )));
        }
        Ok(())
    }

    /// Load the configured catalog, falling back to the built-in one
    ///
    /// `override_path` (from the command line) wins over `catalog.path`.
    pub fn load_catalog(&self, override_path: Option<&Path>) -> Result<Catalog> {
        match override_path.or(self.catalog.path.as_deref()) {
            Some(path) => Catalog::load(path),
            None => {
                tracing::info!("No catalog configured, using built-in exercises");
                Ok(crate::get_default_catalog().clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.catalog.path.is_none());
        assert_eq!(config.workout.num_exercises, 10);
        assert_eq!(config.workout.intensity, Intensity::Medium);
        assert_eq!(config.workout.location, Location::Any);
        assert_eq!(config.session.first_countdown, 5);
        assert_eq!(config.speech.rate, 180);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.music.dir, parsed.music.dir);
        assert_eq!(config.workout.intensity, parsed.workout.intensity);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[workout]
intensity = "heroic"
location = "outdoor"

[music]
quiet_tracks = ["Mekano"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.workout.intensity, Intensity::Heroic);
        assert_eq!(config.workout.location, Location::Outdoor);
        assert_eq!(config.workout.num_exercises, 10); // default
        assert_eq!(config.music.quiet_tracks, vec!["Mekano".to_string()]);
        assert_eq!(config.music.quiet_volume, 0.3);
    }

    #[test]
    fn test_load_from_rejects_bad_volume() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[music]\nquiet_volume = 3.5\n").unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.workout.num_exercises = 6;
        config.catalog.path = Some(temp_dir.path().join("exercises.yaml"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.workout.num_exercises, 6);
        assert_eq!(loaded.catalog.path, config.catalog.path);
    }

    #[test]
    fn test_load_catalog_defaults_to_builtin() {
        let catalog = Config::default().load_catalog(None).unwrap();
        assert_eq!(
            catalog.templates().len(),
            crate::build_default_catalog().templates().len()
        );
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.catalog.path = Some(temp_dir.path().join("missing.yaml"));

        assert!(matches!(config.load_catalog(None), Err(Error::Load(_))));
    }
}
