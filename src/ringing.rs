use std::fmt;

use chrono::{DateTime, Local};
use log::{info, warn};

use crate::{
    alarm::Alarm,
    config::Sound,
    error::Result,
    gateway::SchedulerGateway,
    notification::NotificationCenter,
};

/// sound and vibration output used while an alarm rings
pub trait AudioOutput {
    /// a running playback, dropping it stops playback and releases the output
    type Playback;

    fn resolve(&self, ringtone: &str) -> Result<Sound>;
    /// starts playing `sound` on repeat until the returned playback is dropped
    fn play_looped(&mut self, sound: &Sound) -> Result<Self::Playback>;
    /// a single vibration pulse
    fn vibrate(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RingState {
    #[default]
    Idle,
    Ringing(String),
}

/// tracks the one alarm that is ringing right now
/// a new ring always stops the previous one first, last one wins
pub struct Ringer<A: AudioOutput> {
    audio: A,
    state: RingState,
    playback: Option<A::Playback>,
}

impl<A: AudioOutput> fmt::Debug for Ringer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ringer")
            .field("state", &self.state)
            .field("playing", &self.is_playing())
            .finish_non_exhaustive()
    }
}

impl<A: AudioOutput> Ringer<A> {
    #[must_use]
    pub const fn new(audio: A) -> Self {
        Self {
            audio,
            state: RingState::Idle,
            playback: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &RingState {
        &self.state
    }

    #[must_use]
    pub fn ringing_id(&self) -> Option<&str> {
        match &self.state {
            RingState::Ringing(id) => Some(id),
            RingState::Idle => None,
        }
    }

    #[must_use]
    pub const fn is_ringing(&self) -> bool {
        matches!(self.state, RingState::Ringing(_))
    }

    /// true while the ringtone itself plays (not just a vibration fallback)
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    /// rings `alarm_id`, the state becomes ringing even if only the vibration fallback worked
    pub fn start(&mut self, alarm_id: &str, ringtone: &str, vibration: bool) {
        self.stop();

        let playback = self
            .audio
            .resolve(ringtone)
            .and_then(|sound| self.audio.play_looped(&sound));
        match playback {
            Ok(playback) => {
                self.playback = Some(playback);
                if vibration {
                    self.audio.vibrate();
                }
            }
            Err(e) => {
                warn!("{e}, falling back to vibration");
                self.audio.vibrate();
            }
        }
        info!("alarm {alarm_id} ringing");
        self.state = RingState::Ringing(alarm_id.to_string());
    }

    /// safe to call when idle or several times in a row
    pub fn stop(&mut self) {
        // dropping the playback releases the output
        self.playback = None;
        if let RingState::Ringing(id) = std::mem::take(&mut self.state) {
            info!("alarm {id} stopped");
        }
    }

    /// a lone vibration pulse, no state change
    pub fn pulse(&mut self) {
        self.audio.vibrate();
    }

    /// stops whatever is ringing, then schedules a snooze if the alarm allows it
    pub fn snooze<N: NotificationCenter>(
        &mut self,
        alarm: &Alarm,
        minutes: u32,
        gateway: &mut SchedulerGateway<N>,
        now: DateTime<Local>,
    ) -> Option<String> {
        self.stop();
        if !alarm.snooze_enabled {
            info!("snooze is off for alarm {}", alarm.id);
            return None;
        }
        let identifier = gateway.schedule_snooze(alarm, minutes, now);
        if identifier.is_some() {
            info!("alarm {} snoozed for {minutes} minutes", alarm.id);
        }
        identifier
    }
}
