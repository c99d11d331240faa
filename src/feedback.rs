#[cfg(feature = "audio")]
pub mod audio;

/// Lifecycle and interaction events that get an audible cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Spawn,
    Despawn,
    Hover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
}

/// How the gain falls off over a tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decay {
    /// Exponential ramp down to `floor` at the end of the tone.
    Exponential { floor: f32 },
    /// Straight line down to silence.
    Linear,
}

/// Short synthesized tone: an exponential frequency sweep over `sweep_ms`
/// (held at `end_hz` afterwards) under a decaying gain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub waveform: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    pub sweep_ms: u32,
    pub gain: f32,
    pub decay: Decay,
    pub duration_ms: u32,
}

impl Tone {
    /// Frequency `elapsed_ms` into the tone.
    pub fn frequency_at(&self, elapsed_ms: f32) -> f32 {
        let p = (elapsed_ms / self.sweep_ms.max(1) as f32).clamp(0.0, 1.0);
        self.start_hz * (self.end_hz / self.start_hz).powf(p)
    }

    /// Gain `elapsed_ms` into the tone.
    pub fn gain_at(&self, elapsed_ms: f32) -> f32 {
        let p = (elapsed_ms / self.duration_ms.max(1) as f32).clamp(0.0, 1.0);
        match self.decay {
            Decay::Exponential { floor } => self.gain * (floor / self.gain).powf(p),
            Decay::Linear => self.gain * (1.0 - p),
        }
    }
}

impl Cue {
    pub fn tone(self) -> Tone {
        match self {
            Cue::Spawn => Tone {
                waveform: Waveform::Sine,
                start_hz: 400.0,
                end_hz: 800.0,
                sweep_ms: 100,
                gain: 0.1,
                decay: Decay::Exponential { floor: 0.01 },
                duration_ms: 150,
            },
            Cue::Despawn => Tone {
                waveform: Waveform::Sine,
                start_hz: 600.0,
                end_hz: 200.0,
                sweep_ms: 200,
                gain: 0.1,
                decay: Decay::Linear,
                duration_ms: 200,
            },
            Cue::Hover => Tone {
                waveform: Waveform::Triangle,
                start_hz: 1200.0,
                end_hz: 1200.0,
                sweep_ms: 50,
                gain: 0.02,
                decay: Decay::Exponential { floor: 0.001 },
                duration_ms: 50,
            },
        }
    }
}

/// Fire-and-forget cue sink. Implementations must not block and must
/// swallow their own failures: the simulation runs the same either way.
pub trait Feedback {
    fn notify(&mut self, cue: Cue);
}

/// Open the cue sink for the app: the audio device when one is available,
/// otherwise the log.
pub fn open_default() -> Box<dyn Feedback> {
    #[cfg(feature = "audio")]
    {
        match audio::ToneFeedback::try_new() {
            Ok(sink) => return Box::new(sink),
            Err(e) => log::warn!("no audio output, cues will only be logged: {e}"),
        }
    }
    Box::new(LogFeedback)
}

/// Fallback sink: describes the tone in the log instead of playing it.
#[derive(Debug, Default)]
pub struct LogFeedback;

impl Feedback for LogFeedback {
    fn notify(&mut self, cue: Cue) {
        let tone = cue.tone();
        log::trace!(
            "cue {:?}: {:?} {:.0}->{:.0}Hz gain {:.2} for {}ms",
            cue,
            tone.waveform,
            tone.start_hz,
            tone.end_hz,
            tone.gain,
            tone.duration_ms,
        );
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{Cue, Feedback};

    /// Records every cue into a shared list the test keeps a handle to.
    #[derive(Clone, Default)]
    pub struct Recorder(pub Rc<RefCell<Vec<Cue>>>);

    impl Recorder {
        pub fn count(&self, cue: Cue) -> usize {
            self.0.borrow().iter().filter(|c| **c == cue).count()
        }
    }

    impl Feedback for Recorder {
        fn notify(&mut self, cue: Cue) {
            self.0.borrow_mut().push(cue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_sweeps_up_and_despawn_sweeps_down() {
        let spawn = Cue::Spawn.tone();
        let despawn = Cue::Despawn.tone();
        assert!(spawn.end_hz > spawn.start_hz);
        assert!(despawn.end_hz < despawn.start_hz);
    }

    #[test]
    fn hover_is_the_quietest_cue() {
        let hover = Cue::Hover.tone();
        assert_eq!(hover.waveform, Waveform::Triangle);
        assert!(hover.gain < Cue::Spawn.tone().gain);
        assert!(hover.duration_ms < Cue::Spawn.tone().duration_ms);
    }

    #[test]
    fn spawn_sweep_reaches_target_then_holds() {
        let spawn = Cue::Spawn.tone();
        assert_eq!(spawn.frequency_at(0.0), 400.0);
        // Exponential ramp: halfway in time is the geometric mean.
        assert!((spawn.frequency_at(50.0) - 400.0 * 2f32.sqrt()).abs() < 0.01);
        assert!((spawn.frequency_at(100.0) - 800.0).abs() < 0.01);
        assert!((spawn.frequency_at(140.0) - 800.0).abs() < 0.01);
    }

    #[test]
    fn gain_decays_to_the_envelope_end() {
        let spawn = Cue::Spawn.tone();
        assert!((spawn.gain_at(0.0) - 0.1).abs() < 1e-6);
        assert!((spawn.gain_at(150.0) - 0.01).abs() < 1e-6);

        let despawn = Cue::Despawn.tone();
        assert!((despawn.gain_at(100.0) - 0.05).abs() < 1e-6);
        assert_eq!(despawn.gain_at(200.0), 0.0);
    }
}
