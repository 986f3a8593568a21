#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(
    clippy::use_self,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::missing_panics_doc
)]

use std::{
    collections::BTreeSet,
    error::Error,
    io::BufRead,
    path::PathBuf,
    thread,
    time::Duration,
};

use chrono::Local;
use clap::{Parser, Subcommand};
use log::{info, warn};
use roosty_alarm::{
    audio::{RodioOutput, SilentOutput},
    communication::{self, Handle, Message},
    config::Config,
    identifier::base_alarm_id,
    store::FileStore,
    AlarmBuilder, AlarmEdit, AlarmManager, AudioOutput, LocalNotificationCenter, TimeOfDay,
    Weekday,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// use this config file instead of the default one
    #[clap(long, short, global = true)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// write the default config and create the sounds directory
    Init {
        #[clap(long, short)]
        force: bool,
    },
    /// add an alarm, e.g. `add wake 7:30am --days mon,wed`
    Add {
        title: String,
        time: String,
        /// comma separated weekdays, leave out for a one time alarm
        #[clap(long, short, value_delimiter = ',')]
        days: Vec<String>,
        #[clap(long, short)]
        ringtone: Option<String>,
        #[clap(long)]
        no_vibration: bool,
        #[clap(long)]
        no_snooze: bool,
        #[clap(long)]
        disabled: bool,
    },
    List,
    Edit {
        id: String,
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        time: Option<String>,
        /// comma separated weekdays, `none` for a one time alarm
        #[clap(long, value_delimiter = ',')]
        days: Option<Vec<String>>,
        #[clap(long)]
        ringtone: Option<String>,
        #[clap(long)]
        vibration: Option<bool>,
        #[clap(long)]
        snooze: Option<bool>,
    },
    Remove {
        id: String,
    },
    Enable {
        id: String,
    },
    Disable {
        id: String,
    },
    /// keep running and ring alarms when they are due
    Run {
        /// don't open an audio device
        #[clap(long)]
        silent: bool,
    },
}

type OfflineManager = AlarmManager<LocalNotificationCenter, FileStore, SilentOutput>;

fn open_manager<A: AudioOutput>(
    config: &Config,
    audio: A,
) -> AlarmManager<LocalNotificationCenter, FileStore, A> {
    AlarmManager::new(
        LocalNotificationCenter::new(),
        FileStore::new(config.alarms_path()),
        audio,
        config.sound_library(),
    )
    .with_snooze_minutes(config.snooze_minutes)
}

fn offline_manager(config: &Config) -> OfflineManager {
    open_manager(config, SilentOutput::new(config.sound_library()))
}

fn parse_days(days: &[String]) -> Result<BTreeSet<Weekday>, roosty_alarm::Error> {
    days.iter()
        .filter(|day| !day.trim().is_empty() && !day.trim().eq_ignore_ascii_case("none"))
        .map(|day| day.parse())
        .collect()
}

fn list(config: &Config, manager: &OfflineManager) {
    if manager.alarms().is_empty() {
        println!("no alarms");
    }
    for alarm in manager.alarms() {
        println!(
            "{} {:>8} {:<20} {:<24} {}{}",
            alarm.id,
            alarm.time.format(&config.time_format).to_string(),
            alarm.title,
            alarm.repeat_days_text(),
            alarm.ringtone_name,
            if alarm.is_enabled { "" } else { " (disabled)" }
        );
    }
}

/// reads `stop`, `snooze`, `reschedule` and `quit` from stdin
fn spawn_input(handle: Handle) {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let message = match line.trim() {
                "s" | "stop" => Message::StopRinging,
                "z" | "snooze" => Message::SnoozeRinging,
                "r" | "reschedule" => Message::RescheduleAll,
                "q" | "quit" => Message::Shutdown,
                "" => continue,
                other => {
                    println!("unknown command {other:?}, try stop, snooze, reschedule or quit");
                    continue;
                }
            };
            if !handle.send(message) {
                break;
            }
        }
    });
}

fn run<A: AudioOutput>(config: &Config, audio: A) -> Result<(), Box<dyn Error>> {
    let mut manager = open_manager(config, audio);
    manager.request_permission()?;
    let scheduled = manager.reschedule_all();
    println!(
        "{} alarms loaded, {scheduled} notifications scheduled",
        manager.alarms().len()
    );

    let (handle, receiver) = communication::channel();
    spawn_input(handle);
    communication::run(
        &mut manager,
        &receiver,
        Duration::from_millis(config.tick_millis),
        |manager| {
            for identifier in manager.fire_due(Local::now()) {
                if let Some(alarm) = manager.alarm(base_alarm_id(&identifier)) {
                    println!(
                        "⏰ {} ({}) is ringing, type `stop` or `snooze`",
                        alarm.title, alarm.id
                    );
                }
            }
        },
    );
    info!("daemon stopped");
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    // initilize the logger
    if let Err(e) = simple_file_logger::init_logger!("roosty_alarm") {
        eprintln!("couldn't initialize logger: {e:?}");
    }

    let args = Args::parse();
    let config_path = args.config.unwrap_or_else(Config::config_path);
    let command = args.command.unwrap_or(Command::Run { silent: false });

    if let Command::Init { force } = command {
        if force || !config_path.exists() {
            let config = Config::new();
            config.save(&config_path)?;
            std::fs::create_dir_all(config.sounds_path())?;
            println!("wrote {}", config_path.display());
            println!("put ringtones (.wav or .mp3) in {}", config.sounds_path().display());
        } else {
            println!("{} already exists, use --force to overwrite", config_path.display());
        }
        return Ok(());
    }

    let config = Config::load_or_default(&config_path)?;
    match command {
        Command::Init { .. } => {}
        Command::Add {
            title,
            time,
            days,
            ringtone,
            no_vibration,
            no_snooze,
            disabled,
        } => {
            let alarm = AlarmBuilder::new(title)
                .time(time.parse::<TimeOfDay>()?)
                .repeat_on(parse_days(&days)?)
                .ringtone(ringtone.unwrap_or_else(|| config.default_ringtone.clone()))
                .vibration(!no_vibration)
                .snooze(!no_snooze)
                .enabled(!disabled)
                .build()?;
            let id = alarm.id.clone();
            offline_manager(&config).add(alarm)?;
            println!("added alarm {id}");
        }
        Command::List => list(&config, &offline_manager(&config)),
        Command::Edit {
            id,
            title,
            time,
            days,
            ringtone,
            vibration,
            snooze,
        } => {
            let mut edits = Vec::new();
            if let Some(title) = title {
                edits.push(AlarmEdit::Title(title));
            }
            if let Some(time) = time {
                edits.push(AlarmEdit::Time(time.parse()?));
            }
            if let Some(days) = days {
                edits.push(AlarmEdit::RepeatDays(parse_days(&days)?));
            }
            if let Some(ringtone) = ringtone {
                edits.push(AlarmEdit::Ringtone(ringtone));
            }
            if let Some(vibration) = vibration {
                edits.push(AlarmEdit::Vibration(vibration));
            }
            if let Some(snooze) = snooze {
                edits.push(AlarmEdit::Snooze(snooze));
            }
            offline_manager(&config).edit(&id, edits)?;
            println!("updated alarm {id}");
        }
        Command::Remove { id } => match offline_manager(&config).delete(&id) {
            Some(alarm) => println!("removed alarm {} ({})", alarm.id, alarm.title),
            None => println!("no alarm with id {id}"),
        },
        Command::Enable { id } => offline_manager(&config).set_enabled(&id, true)?,
        Command::Disable { id } => offline_manager(&config).set_enabled(&id, false)?,
        Command::Run { silent: true } => run(&config, SilentOutput::new(config.sound_library()))?,
        Command::Run { silent: false } => match RodioOutput::open(config.sound_library()) {
            Ok(audio) => run(&config, audio)?,
            Err(e) => {
                warn!("{e}, running without sound");
                run(&config, SilentOutput::new(config.sound_library()))?;
            }
        },
    }
    Ok(())
}
