//! Encouragement lines shown next to the streak.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;

use crate::streak::Urgency;

const GENERAL: &[&str] = &[
    "Plug in tonight and tomorrow starts at full power.",
    "A charged laptop is one less thing to think about.",
    "Keep the streak alive: charge before bed.",
    "Your battery will thank you later.",
];

const URGENT: &[&str] = &[
    "No charge recorded lately. Plug in now!",
    "The streak is on the line. Find that charger.",
    "Battery anxiety incoming. Charge it today.",
    "Don't let the laptop die mid-sentence tomorrow.",
];

const EVENING: &[&str] = &[
    "Evening is the perfect time to plug in.",
    "Winding down? So is your battery. Charge it.",
    "Before the lights go out, plug the laptop in.",
];

const MORNING: &[&str] = &[
    "Good morning! Did you charge last night?",
    "New day, new chance to keep the streak going.",
    "Morning check: how is the battery doing?",
];

const SUCCESS: &[&str] = &[
    "Charged! Streak now at {streak} days.",
    "Nice work, {streak} days in a row.",
    "Battery happy, streak at {streak}.",
    "Done for today. {streak} and counting.",
];

const RESET: &[&str] = &[
    "Streak reset. Tomorrow is a fresh start.",
    "Missed one. Plug in tonight and start again.",
    "Back to zero, but not for long.",
];

/// What the message is reacting to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageContext {
    /// Idle display, chosen by urgency first and local hour second.
    Greeting { urgency: Urgency, hour: u32 },
    Charged { streak: u32 },
    Forgotten,
}

fn pool(context: MessageContext) -> &'static [&'static str] {
    match context {
        MessageContext::Greeting { urgency, .. } if urgency >= Urgency::Warning => URGENT,
        MessageContext::Greeting { hour, .. } if (18..=23).contains(&hour) => EVENING,
        MessageContext::Greeting { hour, .. } if (6..=12).contains(&hour) => MORNING,
        MessageContext::Greeting { .. } => GENERAL,
        MessageContext::Charged { .. } => SUCCESS,
        MessageContext::Forgotten => RESET,
    }
}

/// Random line picker.
pub struct MessagePicker {
    rng: Mcg128Xsl64,
}

impl MessagePicker {
    /// `None` seeds from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self { rng }
    }

    pub fn pick(&mut self, context: MessageContext) -> String {
        let line = pool(context).choose(&mut self.rng).copied().unwrap_or_default();
        match context {
            MessageContext::Charged { streak } => line.replace("{streak}", &streak.to_string()),
            _ => line.to_string(),
        }
    }
}
