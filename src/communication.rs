//! Messages into the thread that owns the [`AlarmManager`].
//!
//! Notification callbacks and other producers can run anywhere, they only get a
//! [`Handle`] and never touch alarms or ringing state themselves.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{debug, warn};

use crate::{
    alarm::Alarm,
    alarm_edit::AlarmEdit,
    manager::AlarmManager,
    notification::NotificationCenter,
    ringing::AudioOutput,
    store::BlobStore,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// a notification was delivered while the app is in the foreground
    Delivered(String),
    /// the user tapped a notification
    Tapped(String),
    StopRinging,
    /// snooze whatever is ringing
    SnoozeRinging,
    Add(Alarm),
    Edit(String, Vec<AlarmEdit>),
    Delete(String),
    SetEnabled(String, bool),
    RescheduleAll,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Shutdown,
}

/// cloneable sender side, safe to hand to any thread
#[derive(Debug, Clone)]
pub struct Handle {
    sender: Sender<Message>,
}

impl Handle {
    /// false once the owner loop is gone
    pub fn send(&self, message: Message) -> bool {
        self.sender.send(message).is_ok()
    }

    pub fn delivered(&self, identifier: impl Into<String>) -> bool {
        self.send(Message::Delivered(identifier.into()))
    }

    pub fn tapped(&self, identifier: impl Into<String>) -> bool {
        self.send(Message::Tapped(identifier.into()))
    }
}

#[must_use]
pub fn channel() -> (Handle, Receiver<Message>) {
    let (sender, receiver) = crossbeam_channel::unbounded();
    (Handle { sender }, receiver)
}

/// applies one message to the manager
pub fn dispatch<N, S, A>(manager: &mut AlarmManager<N, S, A>, message: Message) -> Flow
where
    N: NotificationCenter,
    S: BlobStore,
    A: AudioOutput,
{
    debug!("handling {message:?}");
    let result = match message {
        Message::Delivered(identifier) => {
            manager.on_foreground_deliver(&identifier);
            Ok(())
        }
        Message::Tapped(identifier) => {
            manager.on_user_tap(&identifier);
            Ok(())
        }
        Message::StopRinging => {
            manager.stop_alarm_sound();
            Ok(())
        }
        Message::SnoozeRinging => {
            manager.snooze_ringing();
            Ok(())
        }
        Message::Add(alarm) => manager.add(alarm),
        Message::Edit(id, edits) => manager.edit(&id, edits).map(|_| ()),
        Message::Delete(id) => {
            manager.delete(&id);
            Ok(())
        }
        Message::SetEnabled(id, is_enabled) => manager.set_enabled(&id, is_enabled),
        Message::RescheduleAll => {
            manager.reschedule_all();
            Ok(())
        }
        Message::Shutdown => return Flow::Shutdown,
    };
    if let Err(e) = result {
        warn!("{e}");
    }
    Flow::Continue
}

/// runs until [`Message::Shutdown`] or until every [`Handle`] is dropped
/// `on_tick` runs at least every `tick` even while messages keep coming
/// ringing is stopped on the way out
pub fn run<N, S, A>(
    manager: &mut AlarmManager<N, S, A>,
    receiver: &Receiver<Message>,
    tick: Duration,
    mut on_tick: impl FnMut(&mut AlarmManager<N, S, A>),
) where
    N: NotificationCenter,
    S: BlobStore,
    A: AudioOutput,
{
    let mut next_tick = Instant::now() + tick;
    loop {
        let timeout = next_tick.saturating_duration_since(Instant::now());
        match receiver.recv_timeout(timeout) {
            Ok(message) => {
                if dispatch(manager, message) == Flow::Shutdown {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        if Instant::now() >= next_tick {
            on_tick(manager);
            next_tick = Instant::now() + tick;
        }
    }
    manager.stop_alarm_sound();
}
