//! Plays cues on the default output device through rodio.

use std::f32::consts::TAU;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

use super::{Cue, Feedback, Tone, Waveform};

const SAMPLE_RATE: u32 = 44_100;

/// Sink that synthesizes each cue's tone and hands it to the mixer.
pub struct ToneFeedback {
    // Dropping the stream closes the device.
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl ToneFeedback {
    pub fn try_new() -> Result<Self, rodio::StreamError> {
        let (stream, handle) = OutputStream::try_default()?;
        log::info!("audio output opened");
        Ok(Self {
            _stream: stream,
            handle,
        })
    }
}

impl Feedback for ToneFeedback {
    fn notify(&mut self, cue: Cue) {
        match Sink::try_new(&self.handle) {
            Ok(sink) => {
                sink.append(ToneSource::new(cue.tone()));
                sink.detach();
            }
            Err(e) => log::debug!("dropped {cue:?} cue: {e}"),
        }
    }
}

/// Mono sample stream for one `Tone`.
pub struct ToneSource {
    tone: Tone,
    index: u32,
    len: u32,
    /// Oscillator phase in cycles, kept in [0, 1).
    phase: f32,
}

impl ToneSource {
    pub fn new(tone: Tone) -> Self {
        Self {
            tone,
            index: 0,
            len: SAMPLE_RATE * tone.duration_ms / 1000,
            phase: 0.0,
        }
    }
}

impl Iterator for ToneSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.index >= self.len {
            return None;
        }
        let elapsed_ms = self.index as f32 * 1000.0 / SAMPLE_RATE as f32;
        let wave = match self.tone.waveform {
            Waveform::Sine => (self.phase * TAU).sin(),
            Waveform::Triangle => 1.0 - 4.0 * (self.phase - 0.5).abs(),
        };
        let sample = wave * self.tone.gain_at(elapsed_ms);

        self.phase = (self.phase + self.tone.frequency_at(elapsed_ms) / SAMPLE_RATE as f32).fract();
        self.index += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.len - self.index) as usize;
        (left, Some(left))
    }
}

impl Source for ToneSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_millis(u64::from(self.tone.duration_ms)))
    }
}
