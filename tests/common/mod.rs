//! Fakes shared by the integration tests.
#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet, HashSet},
    path::PathBuf,
    rc::Rc,
};

use chrono::NaiveTime;
use roosty_alarm::{
    config::{Sound, SoundLibrary},
    error::PersistenceError,
    notification::{NotificationRequest, Trigger},
    ringing::AudioOutput,
    Alarm, AlarmManager, BlobStore, Error, NotificationCenter, Result,
};

/// notification center that records everything and can reject chosen identifiers
#[derive(Debug)]
pub struct RecordingCenter {
    pub granted: bool,
    pub pending: BTreeMap<String, NotificationRequest>,
    pub delivered: BTreeSet<String>,
    pub reject: HashSet<String>,
    pub submitted: Vec<String>,
}

impl Default for RecordingCenter {
    fn default() -> Self {
        Self {
            granted: true,
            pending: BTreeMap::new(),
            delivered: BTreeSet::new(),
            reject: HashSet::new(),
            submitted: Vec::new(),
        }
    }
}

impl RecordingCenter {
    /// moves a pending request to delivered, like the platform does when it fires
    pub fn deliver(&mut self, identifier: &str) {
        if let Some(request) = self.pending.get(identifier) {
            if matches!(request.trigger, Trigger::OneShot(_)) {
                self.pending.remove(identifier);
            }
        }
        self.delivered.insert(identifier.to_string());
    }

    pub fn all_identifiers(&self) -> Vec<String> {
        self.pending
            .keys()
            .chain(self.delivered.iter())
            .cloned()
            .collect()
    }
}

impl NotificationCenter for RecordingCenter {
    fn request_permission(&mut self) -> bool {
        self.granted
    }

    fn submit(&mut self, request: NotificationRequest) -> Result<()> {
        if self.reject.contains(&request.identifier) {
            return Err(Error::scheduling(request.identifier, "rejected by test"));
        }
        self.submitted.push(request.identifier.clone());
        self.pending.insert(request.identifier.clone(), request);
        Ok(())
    }

    fn cancel_pending(&mut self, identifiers: &HashSet<String>) {
        self.pending.retain(|identifier, _| !identifiers.contains(identifier));
    }

    fn cancel_delivered(&mut self, identifiers: &HashSet<String>) {
        self.delivered.retain(|identifier| !identifiers.contains(identifier));
    }

    fn pending(&self) -> Vec<String> {
        self.pending.keys().cloned().collect()
    }

    fn delivered(&self) -> Vec<String> {
        self.delivered.iter().cloned().collect()
    }
}

#[derive(Debug, Default)]
pub struct AudioLog {
    pub started: Vec<String>,
    pub released: Vec<String>,
    pub pulses: usize,
}

pub struct Playback {
    name: String,
    log: Rc<RefCell<AudioLog>>,
}

impl Drop for Playback {
    fn drop(&mut self) {
        self.log.borrow_mut().released.push(self.name.clone());
    }
}

/// audio output that counts playbacks, releases and vibration pulses
/// ringtones named `missing` don't resolve
#[derive(Debug, Default, Clone)]
pub struct CountingAudio {
    pub log: Rc<RefCell<AudioLog>>,
}

impl AudioOutput for CountingAudio {
    type Playback = Playback;

    fn resolve(&self, ringtone: &str) -> Result<Sound> {
        if ringtone == "missing" {
            return Err(Error::AssetResolution(ringtone.to_string()));
        }
        Ok(Sound {
            name: ringtone.to_string(),
            path: PathBuf::from(format!("{ringtone}.wav")),
        })
    }

    fn play_looped(&mut self, sound: &Sound) -> Result<Playback> {
        self.log.borrow_mut().started.push(sound.name.clone());
        Ok(Playback {
            name: sound.name.clone(),
            log: Rc::clone(&self.log),
        })
    }

    fn vibrate(&mut self) {
        self.log.borrow_mut().pulses += 1;
    }
}

/// in memory store whose blob stays visible to the test after the manager took it
#[derive(Debug, Default, Clone)]
pub struct SharedStore {
    pub blob: Rc<RefCell<Option<String>>>,
    pub broken: bool,
}

impl BlobStore for SharedStore {
    fn load(&self) -> std::result::Result<Option<String>, PersistenceError> {
        Ok(self.blob.borrow().clone())
    }

    fn save(&mut self, blob: &str) -> std::result::Result<(), PersistenceError> {
        if self.broken {
            return Err(PersistenceError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read only",
            )));
        }
        *self.blob.borrow_mut() = Some(blob.to_string());
        Ok(())
    }
}

pub type TestManager = AlarmManager<RecordingCenter, SharedStore, CountingAudio>;

pub fn manager() -> (TestManager, SharedStore, CountingAudio) {
    let store = SharedStore::default();
    let audio = CountingAudio::default();
    let manager = AlarmManager::new(
        RecordingCenter::default(),
        store.clone(),
        audio.clone(),
        SoundLibrary::new("/nonexistent/sounds"),
    );
    (manager, store, audio)
}

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub fn alarm(id: &str) -> Alarm {
    Alarm::with_id(id, format!("alarm {id}"), time(7, 30))
}

pub fn sorted(mut identifiers: Vec<String>) -> Vec<String> {
    identifiers.sort();
    identifiers
}
