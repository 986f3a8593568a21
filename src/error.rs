use thiserror::Error;

/// failures of the persistence layer
/// these are logged by the manager and never abort an operation
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("couldn't access alarm store: {0}")]
    Io(#[from] std::io::Error),
    #[error("couldn't serialize alarms: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("couldn't parse alarms: {0}")]
    Decode(#[from] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    /// the user refused notification permission, callers have to prompt again themselves
    #[error("notification permission was denied")]
    PermissionDenied,

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// a single notification request was rejected, other requests still go through
    #[error("couldn't schedule notification {identifier}: {reason}")]
    Scheduling { identifier: String, reason: String },

    /// ringtone has no matching sound file
    #[error("no sound file found for ringtone {0}")]
    AssetResolution(String),

    #[error("no alarm with id {0}")]
    AlarmNotFound(String),

    #[error("alarm id {0:?} is empty or contains the identifier separator")]
    InvalidAlarmId(String),

    #[error("an alarm with id {0} already exists")]
    DuplicateAlarm(String),

    #[error("couldn't parse time {0:?}")]
    InvalidTime(String),

    #[error("couldn't parse weekday {0:?}")]
    InvalidWeekday(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("audio output error: {0}")]
    Audio(String),
}

impl Error {
    #[must_use]
    pub fn scheduling(identifier: impl Into<String>, reason: impl ToString) -> Self {
        Self::Scheduling {
            identifier: identifier.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
