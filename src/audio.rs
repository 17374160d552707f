use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(feature = "audio-playback")]
use crate::error::ClientError;

/// Handle on the audio element currently in the player area. Cancelling it
/// stops any playback started for that element.
#[derive(Debug, Clone, Default)]
pub struct PlaybackToken(Arc<AtomicBool>);

impl PlaybackToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Play a WAV buffer on the default output device, blocking until it ends
/// or `token` is cancelled.
#[cfg(feature = "audio-playback")]
pub fn play_wav(wav_data: Vec<u8>, token: &PlaybackToken) -> Result<(), ClientError> {
    use std::io::Cursor;
    use std::time::Duration;

    let (_stream, stream_handle) = rodio::OutputStream::try_default()
        .map_err(|e| ClientError::Playback(e.to_string()))?;
    let sink =
        rodio::Sink::try_new(&stream_handle).map_err(|e| ClientError::Playback(e.to_string()))?;
    let source =
        rodio::Decoder::new(Cursor::new(wav_data)).map_err(|e| ClientError::Playback(e.to_string()))?;

    sink.append(source);
    while !sink.empty() {
        if token.is_cancelled() {
            sink.stop();
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    Ok(())
}
