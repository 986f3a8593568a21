//! Pure trigger computations. Nothing in here reads the clock, `now` is always passed in.

use std::{collections::BTreeSet, fmt, str::FromStr};

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, NaiveTime, TimeZone, Timelike};

use crate::{alarm::Weekday, error::Error};

/// hour and minute an alarm fires at
/// components can be missing when the input was malformed, they count as 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeOfDay {
    pub hour: Option<u32>,
    pub minute: Option<u32>,
}

impl TimeOfDay {
    #[must_use]
    pub const fn new(hour: u32, minute: u32) -> Self {
        Self {
            hour: Some(hour),
            minute: Some(minute),
        }
    }

    #[must_use]
    pub fn hour(&self) -> u32 {
        self.hour.filter(|hour| *hour < 24).unwrap_or(0)
    }

    #[must_use]
    pub fn minute(&self) -> u32 {
        self.minute.filter(|minute| *minute < 60).unwrap_or(0)
    }

    #[must_use]
    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        Self::new(time.hour(), time.minute())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// parses "7", "7:30", "19:05", "7:30pm" or "12 am"
/// an empty component (":30") is left missing
impl FromStr for TimeOfDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidTime(s.to_string());
        let lower = s.trim().to_lowercase();
        let (clock, pm) = if let Some(rest) = lower.strip_suffix("pm") {
            (rest.trim_end(), Some(true))
        } else if let Some(rest) = lower.strip_suffix("am") {
            (rest.trim_end(), Some(false))
        } else {
            (lower.as_str(), None)
        };
        let (hour, minute) = clock.split_once(':').unwrap_or((clock, ""));
        let component = |part: &str| -> Result<Option<u32>, Error> {
            if part.is_empty() {
                Ok(None)
            } else {
                part.parse().map(Some).map_err(|_| invalid())
            }
        };
        let mut hour = component(hour)?;
        let minute = component(minute)?;
        if let Some(pm) = pm {
            // 12 hour clock, same conversion the alarm editor uses
            hour = match hour {
                Some(h @ 1..=12) => Some(match (h, pm) {
                    (12, false) => 0,
                    (12, true) => 12,
                    (h, true) => h + 12,
                    (h, false) => h,
                }),
                None => None,
                Some(_) => return Err(invalid()),
            };
        }
        if hour.is_some_and(|h| h > 23) || minute.is_some_and(|m| m > 59) {
            return Err(invalid());
        }
        Ok(Self { hour, minute })
    }
}

/// one weekly recurring trigger, recurrence itself is owned by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeeklyTrigger {
    pub weekday: Weekday,
    pub hour: u32,
    pub minute: u32,
}

/// maps a local wall clock time to an instant
/// a time skipped by a forward clock change rings at the first minute after the gap,
/// a repeated one rings at its first occurrence
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    let mut probe = naive;
    for _ in 0..=(24 * 60) {
        if let Some(instant) = tz.from_local_datetime(&probe).earliest() {
            return instant;
        }
        probe += Duration::minutes(1);
    }
    tz.from_utc_datetime(&naive)
}

/// next instant strictly after `now` at the given time of day
/// today if the time is still ahead, otherwise tomorrow
/// exactly `now` counts as already passed
pub fn next_one_shot<Tz: TimeZone>(time: impl Into<TimeOfDay>, now: &DateTime<Tz>) -> DateTime<Tz> {
    let time = time.into().to_naive_time();
    let tz = now.timezone();
    let today = now.date_naive();
    let candidate = resolve_local(&tz, today.and_time(time));
    if candidate > *now {
        return candidate;
    }
    match today.succ_opt() {
        Some(tomorrow) => resolve_local(&tz, tomorrow.and_time(time)),
        None => now.clone() + Duration::days(1),
    }
}

/// one trigger per selected day, empty when there are no days
/// (one-shot alarms go through [`next_one_shot`] instead)
pub fn weekly_triggers(time: impl Into<TimeOfDay>, days: &BTreeSet<Weekday>) -> Vec<WeeklyTrigger> {
    let time = time.into();
    days.iter()
        .map(|&weekday| WeeklyTrigger {
            weekday,
            hour: time.hour(),
            minute: time.minute(),
        })
        .collect()
}

/// next instant strictly after `now` that matches a weekly trigger
pub fn next_weekly<Tz: TimeZone>(trigger: &WeeklyTrigger, now: &DateTime<Tz>) -> DateTime<Tz> {
    let time = TimeOfDay::new(trigger.hour, trigger.minute).to_naive_time();
    let tz = now.timezone();
    let weekday: chrono::Weekday = trigger.weekday.into();
    let mut date = now.date_naive();
    // a week and a day always contains a matching date after now
    for _ in 0..=7 {
        if date.weekday() == weekday {
            let candidate = resolve_local(&tz, date.and_time(time));
            if candidate > *now {
                return candidate;
            }
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    now.clone() + Duration::weeks(1)
}
