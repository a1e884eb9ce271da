//! Daily charge streak bookkeeping.
//!
//! A streak counts consecutive calendar days with a recorded charge. Dates
//! are local calendar days; the caller supplies "today" so the rules stay
//! pure and testable.
//!
//! ```text
//! last = None        --charge-->  streak 1
//! last = today       --charge-->  unchanged (AlreadyMarked)
//! last = yesterday   --charge-->  streak + 1
//! last <= today - 2  --charge-->  reset to 0, then streak 1
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persisted streak document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub last_charge_date: Option<NaiveDate>,
}

/// Result of a charge attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MarkOutcome {
    Incremented { streak: u32 },
    /// Today was already recorded; nothing changed.
    AlreadyMarked { streak: u32 },
}

/// How worried the user should be, derived from the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Calm,
    Warning,
    Critical,
}

impl Urgency {
    pub fn level(self) -> u8 {
        match self {
            Urgency::Calm => 0,
            Urgency::Warning => 2,
            Urgency::Critical => 3,
        }
    }
}

/// Display tier of the streak counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakTier {
    Low,
    Building,
    Strong,
}

impl StreakState {
    /// Record a charge on `today`.
    ///
    /// A gap of more than one day resets the streak before counting today.
    pub fn mark_charged(&mut self, today: NaiveDate) -> MarkOutcome {
        if self.last_charge_date == Some(today) {
            return MarkOutcome::AlreadyMarked {
                streak: self.streak,
            };
        }
        self.check_daily_reset(today);
        self.streak = self.streak.saturating_add(1);
        self.last_charge_date = Some(today);
        MarkOutcome::Incremented {
            streak: self.streak,
        }
    }

    /// Reset the streak when at least one full day was skipped.
    ///
    /// `last_charge_date` is kept. Returns true if a reset happened.
    pub fn check_daily_reset(&mut self, today: NaiveDate) -> bool {
        let Some(last) = self.last_charge_date else {
            return false;
        };
        let yesterday = today.pred_opt();
        if last == today || Some(last) == yesterday {
            return false;
        }
        if self.streak == 0 {
            return false;
        }
        self.streak = 0;
        true
    }

    /// The user admitted forgetting: streak goes back to zero.
    pub fn mark_forgotten(&mut self) {
        self.streak = 0;
    }

    pub fn charged_on(&self, day: NaiveDate) -> bool {
        self.last_charge_date == Some(day)
    }

    pub fn urgency(&self) -> Urgency {
        match self.streak {
            0 => Urgency::Critical,
            1..=2 => Urgency::Warning,
            _ => Urgency::Calm,
        }
    }

    pub fn tier(&self) -> StreakTier {
        match self.streak {
            s if s >= 7 => StreakTier::Strong,
            s if s >= 3 => StreakTier::Building,
            _ => StreakTier::Low,
        }
    }
}
