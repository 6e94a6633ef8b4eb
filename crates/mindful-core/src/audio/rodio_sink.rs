//! [`Playback`] backed by a rodio sink.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::debug;

use super::channel::Playback;
use crate::error::AudioError;

/// Plays one audio file through the default output device.
///
/// The output stream and sink are created lazily on the first `play()`, so
/// construction never needs a device and headless environments only pay
/// when sound is actually requested. Rodio has no mutable loop flag on a
/// queued source; looping is implemented by queueing the decoded file with
/// `repeat_infinite`, and `rewind` by dropping the sink so the next `play`
/// re-decodes from the start.
pub struct RodioPlayback {
    path: PathBuf,
    looping: bool,
    volume: f32,
    stream: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
}

impl RodioPlayback {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            looping: false,
            volume: 1.0,
            stream: None,
            sink: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn handle(&mut self) -> Result<&OutputStreamHandle, AudioError> {
        if self.stream.is_none() {
            let pair = OutputStream::try_default()
                .map_err(|e| AudioError::DeviceUnavailable(e.to_string()))?;
            self.stream = Some(pair);
        }
        match &self.stream {
            Some((_, handle)) => Ok(handle),
            None => Err(AudioError::DeviceUnavailable("no output stream".into())),
        }
    }

    fn queue_from_start(&mut self) -> Result<(), AudioError> {
        let path = self.path.clone();
        let looping = self.looping;
        let volume = self.volume;
        let handle = self.handle()?;

        let sink = Sink::try_new(handle)
            .map_err(|e| AudioError::PlaybackFailed(e.to_string()))?;
        let file = File::open(&path).map_err(|e| AudioError::OpenFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| AudioError::DecodeFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;

        if looping {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }
        sink.set_volume(volume);
        debug!(path = %path.display(), looping, "queued audio source");
        self.sink = Some(sink);
        Ok(())
    }
}

impl Playback for RodioPlayback {
    fn play(&mut self) -> Result<(), AudioError> {
        match &self.sink {
            Some(sink) if !sink.empty() => {
                sink.play();
                Ok(())
            }
            _ => {
                self.queue_from_start()?;
                // Sinks start unpaused; nothing more to do.
                Ok(())
            }
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn rewind(&mut self) {
        // Dropping the sink discards the queued source; the next play
        // re-decodes the file from the start.
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn is_looping(&self) -> bool {
        self.looping
    }

    fn is_paused(&self) -> bool {
        match &self.sink {
            Some(sink) => sink.is_paused() || sink.empty(),
            None => true,
        }
    }
}

impl Drop for RodioPlayback {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        if self.stream.take().is_some() {
            debug!(path = %self.path.display(), "releasing audio output stream");
        }
    }
}
