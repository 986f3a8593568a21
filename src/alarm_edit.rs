use std::{collections::BTreeSet, ops::AddAssign};

use chrono::Timelike;

use crate::{
    alarm::{default_ringtone, new_alarm_id, Alarm, Weekday},
    error::Result,
    identifier::validate_alarm_id,
    planner::TimeOfDay,
};

/// collects alarm settings before the alarm exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmBuilder {
    id: Option<String>,
    title: String,
    time: TimeOfDay,
    repeat_days: BTreeSet<Weekday>,
    ringtone_name: String,
    vibration: bool,
    snooze_enabled: bool,
    is_enabled: bool,
}

impl Default for AlarmBuilder {
    /// starts at the current minute like a fresh alarm editor does
    fn default() -> Self {
        let time = chrono::Local::now().naive_local().time();
        Self {
            id: None,
            title: String::new(),
            time: TimeOfDay::new(time.hour(), time.minute()),
            repeat_days: BTreeSet::new(),
            ringtone_name: default_ringtone(),
            vibration: true,
            snooze_enabled: true,
            is_enabled: true,
        }
    }
}

impl AlarmBuilder {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub const fn time(mut self, time: TimeOfDay) -> Self {
        self.time = time;
        self
    }

    #[must_use]
    pub fn repeat_on(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.repeat_days.extend(days);
        self
    }

    #[must_use]
    pub fn ringtone(mut self, ringtone_name: impl Into<String>) -> Self {
        self.ringtone_name = ringtone_name.into();
        self
    }

    #[must_use]
    pub const fn vibration(mut self, vibration: bool) -> Self {
        self.vibration = vibration;
        self
    }

    #[must_use]
    pub const fn snooze(mut self, snooze_enabled: bool) -> Self {
        self.snooze_enabled = snooze_enabled;
        self
    }

    #[must_use]
    pub const fn enabled(mut self, is_enabled: bool) -> Self {
        self.is_enabled = is_enabled;
        self
    }

    /// fails only for a caller supplied id that can't be used in notification identifiers
    pub fn build(self) -> Result<Alarm> {
        let id = match self.id {
            Some(id) => {
                validate_alarm_id(&id)?;
                id
            }
            None => new_alarm_id(),
        };
        Ok(Alarm {
            id,
            title: self.title,
            time: self.time.to_naive_time(),
            repeat_days: self.repeat_days,
            ringtone_name: self.ringtone_name,
            vibration: self.vibration,
            snooze_enabled: self.snooze_enabled,
            is_enabled: self.is_enabled,
        })
    }
}

impl From<Alarm> for AlarmBuilder {
    fn from(alarm: Alarm) -> Self {
        Self {
            id: Some(alarm.id),
            title: alarm.title,
            time: alarm.time.into(),
            repeat_days: alarm.repeat_days,
            ringtone_name: alarm.ringtone_name,
            vibration: alarm.vibration,
            snooze_enabled: alarm.snooze_enabled,
            is_enabled: alarm.is_enabled,
        }
    }
}

/// a change to a single field of an existing alarm
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmEdit {
    Title(String),
    Time(TimeOfDay),
    RepeatDays(BTreeSet<Weekday>),
    Ringtone(String),
    Vibration(bool),
    Snooze(bool),
    Enable(bool),
}

impl AddAssign<AlarmEdit> for Alarm {
    /// the id never changes through an edit
    fn add_assign(&mut self, edit: AlarmEdit) {
        match edit {
            AlarmEdit::Title(title) => self.title = title,
            AlarmEdit::Time(time) => self.time = time.to_naive_time(),
            AlarmEdit::RepeatDays(days) => self.repeat_days = days,
            AlarmEdit::Ringtone(ringtone_name) => self.ringtone_name = ringtone_name,
            AlarmEdit::Vibration(vibration) => self.vibration = vibration,
            AlarmEdit::Snooze(snooze_enabled) => self.snooze_enabled = snooze_enabled,
            AlarmEdit::Enable(is_enabled) => self.is_enabled = is_enabled,
        }
    }
}
