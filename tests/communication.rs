mod common;

use std::{thread, time::Duration};

use chrono::{Days, Local};
use common::{alarm, manager, CountingAudio, SharedStore};
use roosty_alarm::{
    alarm_edit::AlarmEdit,
    communication::{self, dispatch, Flow, Message},
    config::SoundLibrary,
    AlarmManager, LocalNotificationCenter, NotificationCenter, Weekday,
};

#[test]
fn messages_from_other_threads_reach_the_manager() {
    let (mut manager, _, audio) = manager();
    let (handle, receiver) = communication::channel();

    let producer = thread::spawn(move || {
        assert!(handle.send(Message::Add(alarm("a1"))));
        assert!(handle.send(Message::Edit(
            "a1".to_string(),
            vec![AlarmEdit::RepeatDays([Weekday::Tuesday].into())],
        )));
        assert!(handle.delivered("a1_3"));
        assert!(handle.send(Message::StopRinging));
        assert!(handle.tapped("a1_3"));
        assert!(handle.send(Message::Shutdown));
    });

    communication::run(&mut manager, &receiver, Duration::from_millis(5), |_| {});
    producer.join().unwrap();

    assert_eq!(manager.notifications().pending(), vec!["a1_3".to_string()]);
    // the tap rang again and shutting down stopped it
    assert_eq!(manager.ringing(), None);
    assert_eq!(audio.log.borrow().started.len(), 2);
    assert_eq!(audio.log.borrow().released.len(), 2);
}

#[test]
fn loop_ends_when_every_handle_is_gone() {
    let (mut manager, _, _) = manager();
    let (handle, receiver) = communication::channel();
    let producer = thread::spawn(move || {
        handle.send(Message::Add(alarm("a1")));
    });
    communication::run(&mut manager, &receiver, Duration::from_millis(5), |_| {});
    producer.join().unwrap();
    assert_eq!(manager.alarms().len(), 1);
}

#[test]
fn handle_reports_a_closed_loop() {
    let (handle, receiver) = communication::channel();
    drop(receiver);
    assert!(!handle.send(Message::RescheduleAll));
}

#[test]
fn failed_messages_do_not_stop_the_loop() {
    let (mut manager, _, _) = manager();
    assert_eq!(
        dispatch(&mut manager, Message::SetEnabled("ghost".to_string(), true)),
        Flow::Continue
    );
    assert_eq!(
        dispatch(&mut manager, Message::Add(alarm("bad_id"))),
        Flow::Continue
    );
    assert_eq!(dispatch(&mut manager, Message::Shutdown), Flow::Shutdown);
    assert!(manager.alarms().is_empty());
}

#[test]
fn snooze_message_snoozes_the_ringing_alarm() {
    let (mut manager, _, _) = manager();
    dispatch(&mut manager, Message::Add(alarm("a1")));
    dispatch(&mut manager, Message::Delivered("a1".to_string()));
    dispatch(&mut manager, Message::SnoozeRinging);
    assert_eq!(manager.ringing(), None);
    assert!(manager
        .notifications()
        .pending()
        .iter()
        .any(|identifier| identifier.starts_with("a1_snooze_")));

    dispatch(&mut manager, Message::Delete("a1".to_string()));
    assert!(manager.notifications().pending().is_empty());
}

#[test]
fn ticks_fire_due_alarms_on_the_local_scheduler() {
    let mut manager = AlarmManager::new(
        LocalNotificationCenter::new(),
        SharedStore::default(),
        CountingAudio::default(),
        SoundLibrary::new("/nonexistent"),
    );
    manager.add(alarm("a1")).unwrap();
    manager
        .add(alarm("b2").repeating(Weekday::ALL))
        .unwrap();

    let now = Local::now();
    assert!(manager.fire_due(now).is_empty());

    let later = now.checked_add_days(Days::new(1)).unwrap();
    let fired = manager.fire_due(later);
    assert!(fired.contains(&"a1".to_string()));
    assert!(manager.ringing().is_some());
    assert!(!manager.notifications().pending().contains(&"a1".to_string()));
    assert_eq!(manager.notifications().pending().len(), 7);
    assert!(manager.notifications().delivered().contains(&"a1".to_string()));
}
