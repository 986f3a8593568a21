//! Notification identifiers.
//!
//! Every identifier starts with the owning alarm's id:
//!
//! | shape    | format                       |
//! |----------|------------------------------|
//! | one-shot | `<id>`                       |
//! | weekly   | `<id>_<weekday ordinal>`     |
//! | snooze   | `<id>_snooze_<epoch seconds>`|
//!
//! Decoding relies on alarm ids never containing [`SEPARATOR`].
//! [`validate_alarm_id`] checks that and the manager refuses ids that fail it.

use std::fmt;

use crate::{
    alarm::Weekday,
    error::{Error, Result},
};

pub const SEPARATOR: char = '_';
const SNOOZE_TAG: &str = "snooze";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NotificationId {
    OneShot { alarm_id: String },
    Weekly { alarm_id: String, weekday: Weekday },
    Snooze { alarm_id: String, epoch: i64 },
}

impl NotificationId {
    #[must_use]
    pub fn one_shot(alarm_id: &str) -> Self {
        Self::OneShot {
            alarm_id: alarm_id.to_string(),
        }
    }

    #[must_use]
    pub fn weekly(alarm_id: &str, weekday: Weekday) -> Self {
        Self::Weekly {
            alarm_id: alarm_id.to_string(),
            weekday,
        }
    }

    #[must_use]
    pub fn snooze(alarm_id: &str, epoch: i64) -> Self {
        Self::Snooze {
            alarm_id: alarm_id.to_string(),
            epoch,
        }
    }

    #[must_use]
    pub fn alarm_id(&self) -> &str {
        match self {
            Self::OneShot { alarm_id }
            | Self::Weekly { alarm_id, .. }
            | Self::Snooze { alarm_id, .. } => alarm_id,
        }
    }

    /// full decode of a raw identifier, `None` if it isn't one of the three shapes
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(SEPARATOR);
        let alarm_id = parts.next().filter(|id| !id.is_empty())?;
        let id = match (parts.next(), parts.next(), parts.next()) {
            (None, _, _) => Self::one_shot(alarm_id),
            (Some(SNOOZE_TAG), Some(epoch), None) => Self::snooze(alarm_id, epoch.parse().ok()?),
            (Some(day), None, _) => {
                Self::weekly(alarm_id, Weekday::from_ordinal(day.parse().ok()?)?)
            }
            _ => return None,
        };
        Some(id)
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneShot { alarm_id } => write!(f, "{alarm_id}"),
            Self::Weekly { alarm_id, weekday } => {
                write!(f, "{alarm_id}{SEPARATOR}{}", weekday.ordinal())
            }
            Self::Snooze { alarm_id, epoch } => {
                write!(f, "{alarm_id}{SEPARATOR}{SNOOZE_TAG}{SEPARATOR}{epoch}")
            }
        }
    }
}

/// owning alarm id of a raw identifier: everything before the first separator
#[must_use]
pub fn base_alarm_id(raw: &str) -> &str {
    raw.split(SEPARATOR).next().unwrap_or(raw)
}

/// the one-shot id plus all seven weekly ids
/// independent of the alarm's current days so cancelling never needs the old repeat set
#[must_use]
pub fn fixed_identifiers(alarm_id: &str) -> Vec<String> {
    std::iter::once(NotificationId::one_shot(alarm_id))
        .chain(
            Weekday::ALL
                .into_iter()
                .map(|day| NotificationId::weekly(alarm_id, day)),
        )
        .map(|id| id.to_string())
        .collect()
}

pub fn validate_alarm_id(alarm_id: &str) -> Result<()> {
    if alarm_id.is_empty() || alarm_id.contains(SEPARATOR) {
        return Err(Error::InvalidAlarmId(alarm_id.to_string()));
    }
    Ok(())
}
