use std::collections::HashSet;

use chrono::{DateTime, Local};
use log::{debug, info, warn};

use crate::{
    alarm::Alarm,
    alarm_edit::AlarmEdit,
    config::SoundLibrary,
    error::{Error, Result},
    gateway::SchedulerGateway,
    identifier::{base_alarm_id, validate_alarm_id},
    notification::{LocalNotificationCenter, NotificationCenter, Presentation},
    ringing::{AudioOutput, RingState, Ringer},
    store::{load_alarms, save_alarms, BlobStore},
};

pub const DEFAULT_SNOOZE_MINUTES: u32 = 5;

/// owns the alarm list, the scheduler and the ringing state
///
/// every mutation saves the list first and only then touches the scheduler,
/// so a failure half way leaves at worst a stale schedule that
/// [`Self::reschedule_all`] repairs
#[derive(Debug)]
pub struct AlarmManager<N, S, A>
where
    N: NotificationCenter,
    S: BlobStore,
    A: AudioOutput,
{
    alarms: Vec<Alarm>,
    store: S,
    gateway: SchedulerGateway<N>,
    ringer: Ringer<A>,
    snooze_minutes: u32,
}

impl<N, S, A> AlarmManager<N, S, A>
where
    N: NotificationCenter,
    S: BlobStore,
    A: AudioOutput,
{
    /// loads the saved alarms, a broken or unreadable store starts empty
    /// saved alarms with an unusable or repeated id are dropped
    pub fn new(center: N, store: S, audio: A, sounds: SoundLibrary) -> Self {
        let alarms = match load_alarms(&store) {
            Ok(alarms) => {
                let alarms = usable_alarms(alarms);
                info!("loaded {} alarms", alarms.len());
                alarms
            }
            Err(e) => {
                warn!("{e}, starting without saved alarms");
                Vec::new()
            }
        };
        Self {
            alarms,
            store,
            gateway: SchedulerGateway::new(center, sounds),
            ringer: Ringer::new(audio),
            snooze_minutes: DEFAULT_SNOOZE_MINUTES,
        }
    }

    #[must_use]
    pub fn with_snooze_minutes(mut self, minutes: u32) -> Self {
        self.snooze_minutes = minutes;
        self
    }

    pub fn request_permission(&mut self) -> Result<()> {
        if self.gateway.center_mut().request_permission() {
            Ok(())
        } else {
            warn!("notification permission denied");
            Err(Error::PermissionDenied)
        }
    }

    #[must_use]
    pub fn alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    #[must_use]
    pub fn alarm(&self, id: &str) -> Option<&Alarm> {
        self.alarms.iter().find(|alarm| alarm.id == id)
    }

    pub const fn notifications(&self) -> &N {
        self.gateway.center()
    }

    pub fn notifications_mut(&mut self) -> &mut N {
        self.gateway.center_mut()
    }

    #[must_use]
    pub const fn ring_state(&self) -> &RingState {
        self.ringer.state()
    }

    #[must_use]
    pub fn ringing(&self) -> Option<&str> {
        self.ringer.ringing_id()
    }

    pub fn add(&mut self, alarm: Alarm) -> Result<()> {
        validate_alarm_id(&alarm.id)?;
        if self.alarm(&alarm.id).is_some() {
            return Err(Error::DuplicateAlarm(alarm.id));
        }
        info!("adding alarm {}", alarm.id);
        self.alarms.push(alarm);
        self.persist();
        if let Some(alarm) = self.alarms.last() {
            if alarm.is_enabled {
                self.gateway.schedule(alarm, Local::now());
            }
        }
        Ok(())
    }

    /// replaces the alarm with the same id and schedules it from scratch
    pub fn update(&mut self, alarm: Alarm) -> Result<()> {
        let index = self.position(&alarm.id)?;
        info!("updating alarm {}", alarm.id);
        self.alarms[index] = alarm;
        self.persist();

        let alarm = &self.alarms[index];
        self.gateway.cancel(&alarm.id);
        if alarm.is_enabled {
            self.gateway.schedule(alarm, Local::now());
        } else if self.ringer.ringing_id() == Some(alarm.id.as_str()) {
            self.ringer.stop();
        }
        Ok(())
    }

    /// applies field edits to an alarm, then goes through [`Self::update`]
    pub fn edit(&mut self, id: &str, edits: impl IntoIterator<Item = AlarmEdit>) -> Result<&Alarm> {
        let index = self.position(id)?;
        let mut alarm = self.alarms[index].clone();
        for edit in edits {
            alarm += edit;
        }
        self.update(alarm)?;
        Ok(&self.alarms[index])
    }

    /// removes an alarm, its notifications and its ringing
    /// an unknown or invalid id changes nothing
    pub fn delete(&mut self, id: &str) -> Option<Alarm> {
        if let Err(e) = validate_alarm_id(id) {
            warn!("{e}, nothing deleted");
            return None;
        }
        let Ok(index) = self.position(id) else {
            warn!("no alarm with id {id}, nothing deleted");
            return None;
        };
        let removed = self.alarms.remove(index);
        info!("deleted alarm {id}");
        self.persist();
        self.gateway.cancel(id);
        if self.ringer.ringing_id() == Some(id) {
            self.ringer.stop();
        }
        Some(removed)
    }

    pub fn set_enabled(&mut self, id: &str, is_enabled: bool) -> Result<()> {
        let index = self.position(id)?;
        self.alarms[index].is_enabled = is_enabled;
        self.persist();

        let alarm = &self.alarms[index];
        if is_enabled {
            info!("enabled alarm {id}");
            self.gateway.schedule(alarm, Local::now());
        } else {
            info!("disabled alarm {id}");
            self.gateway.cancel(id);
            if self.ringer.ringing_id() == Some(id) {
                self.ringer.stop();
            }
        }
        Ok(())
    }

    /// stops ringing and snoozes `id` for the configured minutes
    /// `Ok(None)` when the alarm has snoozing turned off
    pub fn snooze(&mut self, id: &str) -> Result<Option<String>> {
        self.snooze_for(id, self.snooze_minutes)
    }

    pub fn snooze_for(&mut self, id: &str, minutes: u32) -> Result<Option<String>> {
        let Some(alarm) = self.alarm(id).cloned() else {
            self.ringer.stop();
            return Err(Error::AlarmNotFound(id.to_string()));
        };
        Ok(self
            .ringer
            .snooze(&alarm, minutes, &mut self.gateway, Local::now()))
    }

    /// snoozes whatever is ringing
    pub fn snooze_ringing(&mut self) -> Option<String> {
        let id = self.ringer.ringing_id()?.to_string();
        self.snooze(&id).ok().flatten()
    }

    /// cancels everything and schedules every enabled alarm again
    pub fn reschedule_all(&mut self) -> usize {
        self.gateway.reschedule_all(&self.alarms, Local::now())
    }

    pub fn play_alarm_sound(&mut self, ringtone: &str, vibration: bool, alarm_id: &str) {
        self.ringer.start(alarm_id, ringtone, vibration);
    }

    pub fn stop_alarm_sound(&mut self) {
        self.ringer.stop();
    }

    /// a notification arrived while in the foreground
    /// the notification keeps its own banner and sound, ringing is on top of it
    pub fn on_foreground_deliver(&mut self, identifier: &str) -> Presentation {
        if self.ringer.is_ringing() {
            self.ringer.stop();
        }
        let id = base_alarm_id(identifier);
        if let Some(alarm) = self.alarm(id) {
            let (ringtone, vibration, id) =
                (alarm.ringtone_name.clone(), alarm.vibration, alarm.id.clone());
            self.ringer.start(&id, &ringtone, vibration);
        } else {
            // alarm was deleted after the notification was scheduled
            debug!("no alarm for delivered notification {identifier}");
            self.ringer.pulse();
        }
        Presentation::ALL
    }

    /// the user tapped a notification
    pub fn on_user_tap(&mut self, identifier: &str) {
        let id = base_alarm_id(identifier);
        if let Some(alarm) = self.alarm(id) {
            let (ringtone, vibration, id) =
                (alarm.ringtone_name.clone(), alarm.vibration, alarm.id.clone());
            self.ringer.start(&id, &ringtone, vibration);
        } else {
            debug!("no alarm for tapped notification {identifier}");
        }
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.alarms
            .iter()
            .position(|alarm| alarm.id == id)
            .ok_or_else(|| Error::AlarmNotFound(id.to_string()))
    }

    fn persist(&mut self) {
        if let Err(e) = save_alarms(&mut self.store, &self.alarms) {
            warn!("{e}, changes will only last for this session");
        }
    }
}

fn usable_alarms(alarms: Vec<Alarm>) -> Vec<Alarm> {
    let mut seen = HashSet::new();
    alarms
        .into_iter()
        .filter(|alarm| {
            if let Err(e) = validate_alarm_id(&alarm.id) {
                warn!("{e}, skipping saved alarm {:?}", alarm.title);
                false
            } else if !seen.insert(alarm.id.clone()) {
                warn!("saved alarm id {} appears twice, keeping the first", alarm.id);
                false
            } else {
                true
            }
        })
        .collect()
}

impl<S, A> AlarmManager<LocalNotificationCenter, S, A>
where
    S: BlobStore,
    A: AudioOutput,
{
    /// delivers due notifications of the in process scheduler as foreground deliveries
    pub fn fire_due(&mut self, now: DateTime<Local>) -> Vec<String> {
        let fired = self.notifications_mut().fire_due(now);
        for identifier in &fired {
            self.on_foreground_deliver(identifier);
        }
        fired
    }
}
