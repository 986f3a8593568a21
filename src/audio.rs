use std::{fs::File, io::BufReader, time::Duration};

use log::{debug, info};
use rodio::{source::SineWave, Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::{
    config::{Sound, SoundLibrary},
    error::{Error, Result},
    ringing::AudioOutput,
};

/// plays ringtones on the default output device
pub struct RodioOutput {
    stream: OutputStream,
    sounds: SoundLibrary,
}

impl std::fmt::Debug for RodioOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioOutput")
            .field("sounds", &self.sounds)
            .finish_non_exhaustive()
    }
}

impl RodioOutput {
    pub fn open(sounds: SoundLibrary) -> Result<Self> {
        let stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| Error::Audio(format!("couldn't open output device: {e}")))?;
        Ok(Self { stream, sounds })
    }
}

/// a looping ringtone, stops when dropped
pub struct Playback {
    sink: Sink,
    sound: String,
}

impl Drop for Playback {
    fn drop(&mut self) {
        self.sink.stop();
        debug!("released output for {}", self.sound);
    }
}

impl AudioOutput for RodioOutput {
    type Playback = Playback;

    fn resolve(&self, ringtone: &str) -> Result<Sound> {
        self.sounds.resolve(ringtone)
    }

    fn play_looped(&mut self, sound: &Sound) -> Result<Playback> {
        let file = File::open(&sound.path).map_err(|e| {
            Error::Audio(format!(
                "couldn't open sound file {}: {e}",
                sound.path.display()
            ))
        })?;
        // create source that repeatedly plays the sound and play it
        let input = Decoder::new(BufReader::new(file))
            .map_err(|e| Error::Audio(format!("couldn't decode {sound}: {e}")))?
            .repeat_infinite();
        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(input);
        sink.play();
        debug!("playing {sound}");
        Ok(Playback {
            sink,
            sound: sound.name.clone(),
        })
    }

    fn vibrate(&mut self) {
        // desktops have no vibration motor, a short beep stands in for the pulse
        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(
            SineWave::new(880.0)
                .take_duration(Duration::from_millis(300))
                .amplify(0.2),
        );
        sink.detach();
    }
}

/// output for machines without a sound device, only logs what it would play
#[derive(Debug, Clone)]
pub struct SilentOutput {
    sounds: SoundLibrary,
}

impl SilentOutput {
    #[must_use]
    pub const fn new(sounds: SoundLibrary) -> Self {
        Self { sounds }
    }
}

impl AudioOutput for SilentOutput {
    type Playback = ();

    fn resolve(&self, ringtone: &str) -> Result<Sound> {
        self.sounds.resolve(ringtone)
    }

    fn play_looped(&mut self, sound: &Sound) -> Result<()> {
        info!("(silent) playing {sound}");
        Ok(())
    }

    fn vibrate(&mut self) {
        info!("(silent) vibration pulse");
    }
}
