mod queue;

pub use queue::{Fired, Recurrence, TimerHandle, TimerQueue};
