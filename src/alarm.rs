use std::{collections::BTreeSet, fmt, str::FromStr};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::{config::always_true, error::Error};

/// day of the week, numbered like the calendar does it (1 = Sunday .. 7 = Saturday)
/// the number is used for weekly triggers and for notification identifiers, so never renumber
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Weekday {
    Sunday = 1,
    Monday = 2,
    Tuesday = 3,
    Wednesday = 4,
    Thursday = 5,
    Friday = 6,
    Saturday = 7,
}

impl Weekday {
    pub const ALL: [Self; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            1 => Some(Self::Sunday),
            2 => Some(Self::Monday),
            3 => Some(Self::Tuesday),
            4 => Some(Self::Wednesday),
            5 => Some(Self::Thursday),
            6 => Some(Self::Friday),
            7 => Some(Self::Saturday),
            _ => None,
        }
    }

    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Sunday => "Sun",
            Self::Monday => "Mon",
            Self::Tuesday => "Tue",
            Self::Wednesday => "Wed",
            Self::Thursday => "Thu",
            Self::Friday => "Fri",
            Self::Saturday => "Sat",
        }
    }
}

impl From<Weekday> for u8 {
    fn from(day: Weekday) -> Self {
        day.ordinal()
    }
}

impl TryFrom<u8> for Weekday {
    type Error = Error;

    fn try_from(ordinal: u8) -> Result<Self, Self::Error> {
        Self::from_ordinal(ordinal).ok_or_else(|| Error::InvalidWeekday(ordinal.to_string()))
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        // number_from_sunday is 1..=7 so this always matches
        Self::from_ordinal(day.number_from_sunday() as u8).unwrap_or(Self::Sunday)
    }
}

impl From<Weekday> for chrono::Weekday {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Sunday => Self::Sun,
            Weekday::Monday => Self::Mon,
            Weekday::Tuesday => Self::Tue,
            Weekday::Wednesday => Self::Wed,
            Weekday::Thursday => Self::Thu,
            Weekday::Friday => Self::Fri,
            Weekday::Saturday => Self::Sat,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// accepts the ordinal ("2"), the short name ("mon") or the full name ("monday")
impl FromStr for Weekday {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(ordinal) = trimmed.parse::<u8>() {
            return Self::try_from(ordinal);
        }
        let lower = trimmed.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| {
                let short = day.short_name().to_lowercase();
                lower == short || lower == format!("{day:?}").to_lowercase()
            })
            .ok_or_else(|| Error::InvalidWeekday(s.to_string()))
    }
}

#[must_use]
pub fn default_ringtone() -> String {
    "default".to_string()
}

/// generates a fresh alarm id
/// ids are 32 lowercase hex digits, so they never contain the identifier separator
/// and no id can be a substring of another
#[must_use]
pub fn new_alarm_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// a persisted alarm
/// only the hour and minute of `time` matter, seconds are ignored when scheduling
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Alarm {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(with = "toml_datetime_compat")]
    pub time: NaiveTime,
    /// empty means the alarm rings once
    #[serde(default)]
    pub repeat_days: BTreeSet<Weekday>,
    /// sound asset name without extension
    #[serde(default = "default_ringtone")]
    pub ringtone_name: String,
    #[serde(default = "always_true")]
    pub vibration: bool,
    #[serde(default = "always_true")]
    pub snooze_enabled: bool,
    #[serde(default = "always_true")]
    pub is_enabled: bool,
}

impl Alarm {
    /// new enabled one-shot alarm with a generated id and default preferences
    #[must_use]
    pub fn new(title: impl Into<String>, time: NaiveTime) -> Self {
        Self::with_id(new_alarm_id(), title, time)
    }

    #[must_use]
    pub fn with_id(id: impl Into<String>, title: impl Into<String>, time: NaiveTime) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            time,
            repeat_days: BTreeSet::new(),
            ringtone_name: default_ringtone(),
            vibration: true,
            snooze_enabled: true,
            is_enabled: true,
        }
    }

    #[must_use]
    pub fn repeating(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.repeat_days = days.into_iter().collect();
        self
    }

    #[must_use]
    pub const fn enabled(mut self, is_enabled: bool) -> Self {
        self.is_enabled = is_enabled;
        self
    }

    #[must_use]
    pub fn is_repeating(&self) -> bool {
        !self.repeat_days.is_empty()
    }

    #[must_use]
    pub fn repeat_days_text(&self) -> String {
        match self.repeat_days.len() {
            7 => "Every day".to_string(),
            0 => "Never".to_string(),
            _ => self
                .repeat_days
                .iter()
                .map(|day| day.short_name())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("1", Weekday::Sunday; "ordinal")]
    #[test_case("wed", Weekday::Wednesday; "short name")]
    #[test_case("Saturday", Weekday::Saturday; "full name")]
    #[test_case(" FRI ", Weekday::Friday; "padded upper case")]
    fn parses_weekday(input: &str, expected: Weekday) {
        assert_eq!(input.parse::<Weekday>().unwrap(), expected);
    }

    #[test_case("0"; "ordinal too small")]
    #[test_case("8"; "ordinal too big")]
    #[test_case("someday"; "unknown name")]
    fn rejects_bad_weekday(input: &str) {
        assert!(matches!(
            input.parse::<Weekday>(),
            Err(Error::InvalidWeekday(_))
        ));
    }

    #[test]
    fn ordinals_match_chrono_numbering() {
        for day in Weekday::ALL {
            let chrono_day: chrono::Weekday = day.into();
            assert_eq!(chrono_day.number_from_sunday(), u32::from(day.ordinal()));
            assert_eq!(Weekday::from(chrono_day), day);
        }
    }

    #[test]
    fn duplicate_days_collapse() {
        let alarm = Alarm::new("gym", NaiveTime::from_hms_opt(6, 0, 0).unwrap()).repeating([
            Weekday::Monday,
            Weekday::Monday,
            Weekday::Friday,
        ]);
        assert_eq!(alarm.repeat_days.len(), 2);
    }

    #[test]
    fn repeat_text() {
        let time = NaiveTime::from_hms_opt(7, 30, 0).unwrap();
        assert_eq!(Alarm::new("once", time).repeat_days_text(), "Never");
        assert_eq!(
            Alarm::new("daily", time)
                .repeating(Weekday::ALL)
                .repeat_days_text(),
            "Every day"
        );
        assert_eq!(
            Alarm::new("some", time)
                .repeating([Weekday::Wednesday, Weekday::Monday])
                .repeat_days_text(),
            "Mon, Wed"
        );
    }

    #[test]
    fn generated_ids_are_separator_free_and_fixed_length() {
        let id = new_alarm_id();
        assert_eq!(id.len(), 32);
        assert!(!id.contains('_'));
        assert_ne!(id, new_alarm_id());
    }
}
