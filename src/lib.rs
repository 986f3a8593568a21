#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(clippy::use_self, rust_2018_idioms)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

//! Alarm scheduling for roosty clock.
//!
//! [`AlarmManager`] keeps the alarm list, saves it through a [`BlobStore`],
//! turns alarms into notification requests for a [`NotificationCenter`] and
//! rings delivered alarms through an [`AudioOutput`].

pub mod alarm;
/// building and editing alarms
pub mod alarm_edit;
pub mod audio;
pub mod communication;
pub mod config;
pub mod error;
pub mod gateway;
pub mod identifier;
pub mod manager;
pub mod notification;
pub mod planner;
pub mod ringing;
pub mod store;

pub use alarm::{Alarm, Weekday};
pub use alarm_edit::{AlarmBuilder, AlarmEdit};
pub use error::{Error, Result};
pub use manager::AlarmManager;
pub use notification::{LocalNotificationCenter, NotificationCenter};
pub use planner::TimeOfDay;
pub use ringing::AudioOutput;
pub use store::BlobStore;
