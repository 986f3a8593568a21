use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Local};
use log::debug;

use crate::{
    error::{Error, Result},
    planner::{next_weekly, WeeklyTrigger},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// fires once at the instant
    OneShot(DateTime<Local>),
    /// fires every week on the weekday at hour:minute
    Weekly(WeeklyTrigger),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NotificationSound {
    #[default]
    Default,
    /// file name of a bundled sound, extension included
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub sound: NotificationSound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub identifier: String,
    pub content: NotificationContent,
    pub trigger: Trigger,
}

/// how the notification service should present a notification delivered in the foreground
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub banner: bool,
    pub list: bool,
    pub sound: bool,
}

impl Presentation {
    pub const ALL: Self = Self {
        banner: true,
        list: true,
        sound: true,
    };
}

/// the platform notification service
/// submitting an identifier that is already pending replaces the pending request
pub trait NotificationCenter {
    fn request_permission(&mut self) -> bool;
    fn submit(&mut self, request: NotificationRequest) -> Result<()>;
    fn cancel_pending(&mut self, identifiers: &HashSet<String>);
    fn cancel_delivered(&mut self, identifiers: &HashSet<String>);
    fn pending(&self) -> Vec<String>;
    fn delivered(&self) -> Vec<String>;
}

#[derive(Debug)]
struct Scheduled {
    request: NotificationRequest,
    next_fire: DateTime<Local>,
}

/// in process notification scheduler for the desktop daemon
/// nothing fires on its own, the owner loop calls [`Self::fire_due`] on every tick
#[derive(Debug)]
pub struct LocalNotificationCenter {
    authorized: bool,
    pending: BTreeMap<String, Scheduled>,
    delivered: BTreeMap<String, NotificationContent>,
}

impl Default for LocalNotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalNotificationCenter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            authorized: true,
            pending: BTreeMap::new(),
            delivered: BTreeMap::new(),
        }
    }

    /// a center whose permission prompt is answered with `authorized`
    #[must_use]
    pub fn with_permission(authorized: bool) -> Self {
        Self {
            authorized,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn request(&self, identifier: &str) -> Option<&NotificationRequest> {
        self.pending.get(identifier).map(|scheduled| &scheduled.request)
    }

    #[must_use]
    pub fn next_fire(&self, identifier: &str) -> Option<DateTime<Local>> {
        self.pending.get(identifier).map(|scheduled| scheduled.next_fire)
    }

    /// delivers everything due at `now` and returns the delivered identifiers
    /// one-shot requests leave the pending list, weekly ones move on to their next week
    pub fn fire_due(&mut self, now: DateTime<Local>) -> Vec<String> {
        let mut fired = Vec::new();
        self.pending.retain(|identifier, scheduled| {
            if scheduled.next_fire > now {
                return true;
            }
            debug!("delivering notification {identifier}");
            fired.push(identifier.clone());
            self.delivered
                .insert(identifier.clone(), scheduled.request.content.clone());
            match &scheduled.request.trigger {
                Trigger::OneShot(_) => false,
                Trigger::Weekly(weekly) => {
                    scheduled.next_fire = next_weekly(weekly, &now);
                    true
                }
            }
        });
        fired
    }
}

impl NotificationCenter for LocalNotificationCenter {
    fn request_permission(&mut self) -> bool {
        self.authorized
    }

    fn submit(&mut self, request: NotificationRequest) -> Result<()> {
        if !self.authorized {
            return Err(Error::scheduling(
                request.identifier,
                "notifications are not authorized",
            ));
        }
        let next_fire = match &request.trigger {
            Trigger::OneShot(at) => *at,
            Trigger::Weekly(weekly) => next_weekly(weekly, &Local::now()),
        };
        self.pending.insert(
            request.identifier.clone(),
            Scheduled { request, next_fire },
        );
        Ok(())
    }

    fn cancel_pending(&mut self, identifiers: &HashSet<String>) {
        self.pending.retain(|identifier, _| !identifiers.contains(identifier));
    }

    fn cancel_delivered(&mut self, identifiers: &HashSet<String>) {
        self.delivered
            .retain(|identifier, _| !identifiers.contains(identifier));
    }

    fn pending(&self) -> Vec<String> {
        self.pending.keys().cloned().collect()
    }

    fn delivered(&self) -> Vec<String> {
        self.delivered.keys().cloned().collect()
    }
}
