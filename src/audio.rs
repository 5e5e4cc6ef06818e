use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source, source::Buffered};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use tracing::{debug, warn};

use crate::host::Sound;

pub const SOUND_DIR: &str = "assets/sounds";
const MUSIC_CLIP: &str = "music";

type Clip = Buffered<Decoder<BufReader<File>>>;

/// Plays the game's one-shot clips and the looping background music
pub struct AudioManager {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    /// Pre-loaded clips; missing files are simply absent
    clips: HashMap<Sound, Clip>,
    music_path: PathBuf,
    music: Option<Sink>,
    sfx_volume: f32,
    music_volume: f32,
}

fn load_clip(path: &Path) -> Result<Clip> {
    let file =
        File::open(path).wrap_err_with(|| format!("failed to open {}", path.display()))?;
    let source = Decoder::new(BufReader::new(file))
        .wrap_err_with(|| format!("failed to decode {}", path.display()))?;
    Ok(source.buffered())
}

impl AudioManager {
    /// Opens the default output device and pre-loads `<dir>/<clip>.wav` for
    /// every sound. Only a missing output device is an error.
    pub fn new(dir: impl AsRef<Path>, sfx_volume: f32, music_volume: f32) -> Result<Self> {
        let dir = dir.as_ref();
        let (stream, stream_handle) =
            OutputStream::try_default().wrap_err("no audio output device")?;

        let mut clips = HashMap::new();
        for sound in Sound::ALL {
            let path = dir.join(format!("{}.wav", sound.clip_name()));
            match load_clip(&path) {
                Ok(clip) => {
                    clips.insert(sound, clip);
                }
                Err(err) => warn!("skipping sound {:?}: {:#}", sound, err),
            }
        }
        debug!(loaded = clips.len(), "sound clips loaded");

        Ok(Self {
            _stream: stream,
            stream_handle,
            clips,
            music_path: dir.join(format!("{}.wav", MUSIC_CLIP)),
            music: None,
            sfx_volume,
            music_volume,
        })
    }

    pub fn play(&self, sound: Sound) {
        let Some(clip) = self.clips.get(&sound) else {
            return;
        };

        // Playback errors are not worth stopping the game for
        match Sink::try_new(&self.stream_handle) {
            Ok(sink) => {
                sink.set_volume(self.sfx_volume);
                sink.append(clip.clone());
                sink.detach();
            }
            Err(err) => warn!("failed to play {:?}: {}", sound, err),
        }
    }

    /// Starts the background loop, restarting it if it was already playing
    pub fn play_music(&mut self) {
        self.stop_music();

        let clip = match load_clip(&self.music_path) {
            Ok(clip) => clip,
            Err(err) => {
                debug!("no background music: {:#}", err);
                return;
            }
        };

        match Sink::try_new(&self.stream_handle) {
            Ok(sink) => {
                sink.set_volume(self.music_volume);
                sink.append(clip.repeat_infinite());
                self.music = Some(sink);
            }
            Err(err) => warn!("failed to start music: {}", err),
        }
    }

    pub fn stop_music(&mut self) {
        if let Some(sink) = self.music.take() {
            sink.stop();
        }
    }
}
