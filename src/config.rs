use std::{
    fmt,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    notification::NotificationSound,
};

const APP_NAME: &str = "roosty_alarm";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub time_format: String,
    pub snooze_minutes: u32,
    /// ringtone given to alarms created without one
    pub default_ringtone: String,
    pub sounds_dir: Option<PathBuf>,
    pub alarms_file: Option<PathBuf>,
    /// how often the daemon checks for due alarms
    pub tick_millis: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_format: "%l:%M %p".to_string(),
            snooze_minutes: 5,
            default_ringtone: crate::alarm::default_ringtone(),
            sounds_dir: None,
            alarms_file: None,
            tick_millis: 500,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let config = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("couldn't read {}: {e}", path.display())))?;
        toml::from_str(&config)
            .map_err(|e| Error::Config(format!("couldn't parse {}: {e}", path.display())))
    }

    /// missing config file means defaults, a broken one is still an error
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let config = toml::to_string(self)
            .map_err(|e| Error::Config(format!("couldn't serialize config: {e}")))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("couldn't create config dir: {e}")))?;
        }
        std::fs::write(path, config)
            .map_err(|e| Error::Config(format!("couldn't write {}: {e}", path.display())))
    }

    #[must_use]
    pub fn config_path() -> PathBuf {
        project_dirs()
            .map_or_else(|| PathBuf::from("."), |dirs| dirs.config_dir().to_path_buf())
            .join("config.toml")
    }

    #[must_use]
    pub fn data_path() -> PathBuf {
        project_dirs().map_or_else(|| PathBuf::from("."), |dirs| dirs.data_dir().to_path_buf())
    }

    #[must_use]
    pub fn sounds_path(&self) -> PathBuf {
        self.sounds_dir
            .clone()
            .unwrap_or_else(|| Self::data_path().join("sounds"))
    }

    #[must_use]
    pub fn alarms_path(&self) -> PathBuf {
        self.alarms_file
            .clone()
            .unwrap_or_else(|| Self::data_path().join("alarms.toml"))
    }

    #[must_use]
    pub fn sound_library(&self) -> SoundLibrary {
        SoundLibrary::new(self.sounds_path())
    }
}

#[inline]
#[must_use]
pub const fn always_true() -> bool {
    true
}

/// a ringtone resolved to a file on disk
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Sound {
    pub name: String,
    pub path: PathBuf,
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.name,
            self.path
                .file_name()
                .map(|name| name.to_string_lossy())
                .unwrap_or_default()
        )
    }
}

impl Sound {
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// ringtone lookup in the sounds directory
/// `<name>.wav` wins over `<name>.mp3`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundLibrary {
    dir: PathBuf,
}

impl SoundLibrary {
    const EXTENSIONS: [&'static str; 2] = ["wav", "mp3"];

    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn resolve(&self, name: &str) -> Result<Sound> {
        // names are bare asset names, never paths
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(Error::AssetResolution(name.to_string()));
        }
        Self::EXTENSIONS
            .iter()
            .map(|extension| self.dir.join(format!("{name}.{extension}")))
            .find(|path| path.is_file())
            .map(|path| Sound {
                name: name.to_string(),
                path,
            })
            .ok_or_else(|| Error::AssetResolution(name.to_string()))
    }

    /// sound for the notification itself, the platform default when the asset is missing
    #[must_use]
    pub fn notification_sound(&self, name: &str) -> NotificationSound {
        self.resolve(name)
            .map_or(NotificationSound::Default, |sound| {
                NotificationSound::Named(sound.file_name())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            snooze_minutes: 9,
            sounds_dir: Some(dir.path().join("sounds")),
            ..Config::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "snooze_minutes = 10\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.snooze_minutes, 10);
        assert_eq!(config.tick_millis, Config::default().tick_millis);
    }

    #[test]
    fn missing_config_uses_defaults_but_broken_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());
        std::fs::write(&path, "snooze_minutes = \"soon\"").unwrap();
        assert!(matches!(Config::load_or_default(&path), Err(Error::Config(_))));
    }

    #[test]
    fn resolves_wav_before_mp3() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ring.mp3"), b"mp3").unwrap();
        let library = SoundLibrary::new(dir.path());
        assert_eq!(library.resolve("ring").unwrap().file_name(), "ring.mp3");
        std::fs::write(dir.path().join("ring.wav"), b"wav").unwrap();
        assert_eq!(library.resolve("ring").unwrap().file_name(), "ring.wav");
        assert_eq!(
            library.notification_sound("ring"),
            NotificationSound::Named("ring.wav".to_string())
        );
    }

    #[test]
    fn missing_asset_falls_back_to_default_sound() {
        let dir = tempfile::tempdir().unwrap();
        let library = SoundLibrary::new(dir.path());
        assert!(matches!(
            library.resolve("rooster"),
            Err(Error::AssetResolution(_))
        ));
        assert_eq!(library.notification_sound("rooster"), NotificationSound::Default);
        assert!(library.resolve("../rooster").is_err());
    }
}
