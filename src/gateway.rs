use std::collections::HashSet;

use chrono::{DateTime, Duration, Local};
use log::{debug, error, info};

use crate::{
    alarm::Alarm,
    config::SoundLibrary,
    identifier::{fixed_identifiers, NotificationId},
    notification::{NotificationCenter, NotificationContent, NotificationRequest, Trigger},
    planner::{next_one_shot, weekly_triggers},
};

const RINGING_BODY: &str = "⏰ Your reminder is ringing";
const SNOOZED_BODY: &str = "⏰ Snoozed alarm";

/// turns alarms into notification requests
/// every schedule cancels whatever the alarm had before, so rescheduling never duplicates
#[derive(Debug)]
pub struct SchedulerGateway<N> {
    center: N,
    sounds: SoundLibrary,
}

impl<N: NotificationCenter> SchedulerGateway<N> {
    #[must_use]
    pub const fn new(center: N, sounds: SoundLibrary) -> Self {
        Self { center, sounds }
    }

    pub const fn center(&self) -> &N {
        &self.center
    }

    pub fn center_mut(&mut self) -> &mut N {
        &mut self.center
    }

    /// schedules an enabled alarm and returns the identifiers that were accepted
    /// a rejected identifier is logged and the others are still submitted
    pub fn schedule(&mut self, alarm: &Alarm, now: DateTime<Local>) -> Vec<String> {
        if !alarm.is_enabled {
            debug!("alarm {} is disabled, not scheduling", alarm.id);
            return Vec::new();
        }
        self.cancel_fixed(&alarm.id);

        let content = self.content(alarm);
        let requests: Vec<_> = if alarm.is_repeating() {
            weekly_triggers(alarm.time, &alarm.repeat_days)
                .into_iter()
                .map(|weekly| NotificationRequest {
                    identifier: NotificationId::weekly(&alarm.id, weekly.weekday).to_string(),
                    content: content.clone(),
                    trigger: Trigger::Weekly(weekly),
                })
                .collect()
        } else {
            vec![NotificationRequest {
                identifier: NotificationId::one_shot(&alarm.id).to_string(),
                content,
                trigger: Trigger::OneShot(next_one_shot(alarm.time, &now)),
            }]
        };

        requests
            .into_iter()
            .filter_map(|request| self.submit(request))
            .collect()
    }

    /// removes every pending and delivered notification of an alarm
    /// snooze ids carry an unknown timestamp, so after the fixed ids go
    /// everything else that mentions the alarm id is swept up too
    pub fn cancel(&mut self, alarm_id: &str) {
        if alarm_id.is_empty() {
            return;
        }
        self.cancel_fixed(alarm_id);

        let pending: HashSet<String> = self
            .center
            .pending()
            .into_iter()
            .filter(|identifier| identifier.contains(alarm_id))
            .collect();
        if !pending.is_empty() {
            debug!("sweeping pending {pending:?}");
            self.center.cancel_pending(&pending);
        }

        let delivered: HashSet<String> = self
            .center
            .delivered()
            .into_iter()
            .filter(|identifier| identifier.contains(alarm_id))
            .collect();
        if !delivered.is_empty() {
            debug!("sweeping delivered {delivered:?}");
            self.center.cancel_delivered(&delivered);
        }
    }

    /// cancels every alarm then schedules the enabled ones again
    pub fn reschedule_all(&mut self, alarms: &[Alarm], now: DateTime<Local>) -> usize {
        for alarm in alarms {
            self.cancel(&alarm.id);
        }
        let scheduled = alarms
            .iter()
            .filter(|alarm| alarm.is_enabled)
            .map(|alarm| self.schedule(alarm, now).len())
            .sum();
        info!("rescheduled {} alarms ({scheduled} notifications)", alarms.len());
        scheduled
    }

    /// one-off notification `minutes` from `now`
    /// `None` if the scheduler rejected it
    pub fn schedule_snooze(
        &mut self,
        alarm: &Alarm,
        minutes: u32,
        now: DateTime<Local>,
    ) -> Option<String> {
        let identifier = NotificationId::snooze(&alarm.id, now.timestamp()).to_string();
        let request = NotificationRequest {
            identifier,
            content: NotificationContent {
                title: format!("{} (Snoozed)", alarm.title),
                body: SNOOZED_BODY.to_string(),
                sound: self.sounds.notification_sound(&alarm.ringtone_name),
            },
            trigger: Trigger::OneShot(now + Duration::minutes(i64::from(minutes))),
        };
        self.submit(request)
    }

    fn cancel_fixed(&mut self, alarm_id: &str) {
        let identifiers: HashSet<String> = fixed_identifiers(alarm_id).into_iter().collect();
        self.center.cancel_pending(&identifiers);
        self.center.cancel_delivered(&identifiers);
    }

    fn content(&self, alarm: &Alarm) -> NotificationContent {
        NotificationContent {
            title: alarm.title.clone(),
            body: RINGING_BODY.to_string(),
            sound: self.sounds.notification_sound(&alarm.ringtone_name),
        }
    }

    fn submit(&mut self, request: NotificationRequest) -> Option<String> {
        let identifier = request.identifier.clone();
        match self.center.submit(request) {
            Ok(()) => {
                debug!("scheduled notification {identifier}");
                Some(identifier)
            }
            Err(e) => {
                error!("{e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, TimeZone};

    use super::*;
    use crate::{alarm::Weekday, notification::LocalNotificationCenter};

    fn gateway() -> SchedulerGateway<LocalNotificationCenter> {
        SchedulerGateway::new(
            LocalNotificationCenter::new(),
            SoundLibrary::new("/nonexistent/sounds"),
        )
    }

    fn now() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 9, 22, 6, 0, 0)
            .earliest()
            .unwrap()
    }

    fn seven_thirty() -> NaiveTime {
        NaiveTime::from_hms_opt(7, 30, 0).unwrap()
    }

    #[test]
    fn one_shot_gets_base_identifier() {
        let mut gateway = gateway();
        let alarm = Alarm::with_id("a1", "wake", seven_thirty());
        assert_eq!(gateway.schedule(&alarm, now()), vec!["a1".to_string()]);
        let request = gateway.center().request("a1").unwrap();
        assert_eq!(request.trigger, Trigger::OneShot(next_one_shot(seven_thirty(), &now())));
        assert_eq!(request.content.body, RINGING_BODY);
        assert_eq!(request.content.sound, crate::notification::NotificationSound::Default);
    }

    #[test]
    fn repeating_gets_one_identifier_per_day() {
        let mut gateway = gateway();
        let alarm = Alarm::with_id("a1", "gym", seven_thirty())
            .repeating([Weekday::Monday, Weekday::Wednesday]);
        let mut scheduled = gateway.schedule(&alarm, now());
        scheduled.sort();
        assert_eq!(scheduled, vec!["a1_2".to_string(), "a1_4".to_string()]);
        assert!(gateway.center().request("a1").is_none());
        assert!(matches!(
            gateway.center().request("a1_2").unwrap().trigger,
            Trigger::Weekly(_)
        ));
    }

    #[test]
    fn rescheduling_after_repeat_change_leaves_no_stale_days() {
        let mut gateway = gateway();
        let mut alarm = Alarm::with_id("a1", "gym", seven_thirty())
            .repeating([Weekday::Monday, Weekday::Wednesday]);
        gateway.schedule(&alarm, now());
        alarm.repeat_days = [Weekday::Friday].into();
        gateway.schedule(&alarm, now());
        assert_eq!(gateway.center().pending(), vec!["a1_6".to_string()]);
        alarm.repeat_days.clear();
        gateway.schedule(&alarm, now());
        assert_eq!(gateway.center().pending(), vec!["a1".to_string()]);
    }

    #[test]
    fn disabled_alarm_is_not_scheduled() {
        let mut gateway = gateway();
        let alarm = Alarm::with_id("a1", "off", seven_thirty()).enabled(false);
        assert!(gateway.schedule(&alarm, now()).is_empty());
        assert!(gateway.center().pending().is_empty());
    }

    #[test]
    fn cancel_sweeps_snoozes_but_not_other_alarms() {
        let mut gateway = gateway();
        let alarm = Alarm::with_id("a1", "wake", seven_thirty());
        let other = Alarm::with_id("b2", "other", seven_thirty());
        gateway.schedule(&alarm, now());
        gateway.schedule(&other, now());
        let snooze = gateway.schedule_snooze(&alarm, 5, now()).unwrap();
        assert!(snooze.starts_with("a1_snooze_"));

        gateway.cancel("a1");
        assert_eq!(gateway.center().pending(), vec!["b2".to_string()]);
    }

    #[test]
    fn empty_id_cancels_nothing() {
        let mut gateway = gateway();
        let alarm = Alarm::with_id("a1", "wake", seven_thirty()).repeating([Weekday::Monday]);
        gateway.schedule(&alarm, now());
        gateway.cancel("");
        assert_eq!(gateway.center().pending(), vec!["a1_2".to_string()]);
    }

    #[test]
    fn snooze_fires_minutes_from_now() {
        let mut gateway = gateway();
        let alarm = Alarm::with_id("a1", "wake", seven_thirty());
        let identifier = gateway.schedule_snooze(&alarm, 9, now()).unwrap();
        assert_eq!(identifier, format!("a1_snooze_{}", now().timestamp()));
        let request = gateway.center().request(&identifier).unwrap();
        assert_eq!(request.trigger, Trigger::OneShot(now() + Duration::minutes(9)));
        assert_eq!(request.content.title, "wake (Snoozed)");
    }

    #[test]
    fn reschedule_all_only_schedules_enabled() {
        let mut gateway = gateway();
        let alarms = vec![
            Alarm::with_id("a1", "on", seven_thirty()).repeating(Weekday::ALL),
            Alarm::with_id("b2", "off", seven_thirty()).enabled(false),
        ];
        gateway.schedule(&alarms[1].clone().enabled(true), now());
        assert_eq!(gateway.reschedule_all(&alarms, now()), 7);
        assert_eq!(gateway.center().pending().len(), 7);
        assert!(gateway
            .center()
            .pending()
            .iter()
            .all(|identifier| identifier.starts_with("a1_")));
    }
}
