//! What the user is told when a phase ends.
//!
//! Notifiers only observe; they never touch engine state.

use serde::{Deserialize, Serialize};

use crate::events::Completion;
use crate::timer::Phase;

/// A short sine beep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tone {
    pub frequency_hz: u32,
    pub duration_ms: u32,
}

impl Tone {
    /// Played when a work phase ends.
    pub const BREAK_START: Tone = Tone {
        frequency_hz: 800,
        duration_ms: 500,
    };
    /// Played when a break ends.
    pub const WORK_START: Tone = Tone {
        frequency_hz: 600,
        duration_ms: 500,
    };
}

/// Message and optional tone for one completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    pub title: String,
    pub message: String,
    pub tone: Option<Tone>,
}

impl Cue {
    pub fn for_completion(completion: &Completion, sound_enabled: bool) -> Self {
        let (title, message, tone) = if !completion.was_completed {
            (
                format!("{} skipped", completion.phase.label()),
                format!("Up next: {}.", completion.next_phase.label()),
                None,
            )
        } else if completion.was_work() {
            let kind = if completion.next_phase == Phase::LongBreak {
                "long"
            } else {
                "short"
            };
            (
                "Work session complete!".to_string(),
                format!("Work session complete! Time for a {kind} break."),
                Some(Tone::BREAK_START),
            )
        } else {
            (
                "Break time's over!".to_string(),
                "Break time's over! Ready for another focus session?".to_string(),
                Some(Tone::WORK_START),
            )
        };

        Self {
            title,
            message,
            tone: tone.filter(|_| sound_enabled),
        }
    }
}

/// Receives cues and out-of-band notices from the controller.
pub trait Notifier {
    fn cue(&self, cue: &Cue);

    /// Something went wrong that the user should know about but that does
    /// not stop the timer, such as a failed save.
    fn notice(&self, message: &str);
}

/// Writes everything to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn cue(&self, cue: &Cue) {
        tracing::info!(
            tone_hz = cue.tone.map(|t| t.frequency_hz),
            "{}",
            cue.message
        );
    }

    fn notice(&self, message: &str) {
        tracing::warn!("{message}");
    }
}
