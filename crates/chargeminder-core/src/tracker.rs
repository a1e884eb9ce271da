//! The charge tracker service.
//!
//! Owns the store, the collaborators and a [`TimerQueue`]. Front ends call
//! the command methods and drive [`ChargeTracker::tick`] periodically; every
//! state change comes back as an [`Event`].
//!
//! ```text
//! activate ─> check_daily_reset ─> (StreakReset)
//! mark_charged ─> history + streak + battery bump + lastCharged
//! tick ─> TimerQueue::poll ─> ReminderCheck | DailyReminder | Snoozed
//!                             | BatteryPoll | FallbackAlert
//! ```

use chrono::{DateTime, Duration, Local, NaiveTime, Timelike};

use crate::battery::{
    fraction_to_level, BatteryProbe, BatterySimulator, BatterySnapshot, NoBatteryProbe,
    RateSource, SeededRates,
};
use crate::clock::Clock;
use crate::error::{NotifyError, Result, ValidationError};
use crate::events::Event;
use crate::messages::{MessageContext, MessagePicker};
use crate::notify::{
    NotificationAction, NotificationCenter, NotificationResponse, Notifier, Permission,
};
use crate::records::{check_level, AppSettings, ChargeRecord, SettingsPatch};
use crate::reminder::{self, Suppression};
use crate::stats::{charge_stats, ChargeStats};
use crate::storage::{Config, KeyValueStore, Store};
use crate::streak::StreakState;
use crate::timer::{TimerHandle, TimerQueue};

/// Work attached to a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    ReminderCheck,
    DailyReminder,
    Snoozed,
    BatteryPoll,
    FallbackAlert,
}

pub struct ChargeTracker<S> {
    store: Store<S>,
    config: Config,
    clock: Box<dyn Clock>,
    battery: BatterySimulator,
    probe: Box<dyn BatteryProbe>,
    notifications: NotificationCenter,
    messages: MessagePicker,
    timers: TimerQueue<TimerTask>,
    reminder_timer: Option<TimerHandle>,
    poll_timer: Option<TimerHandle>,
}

impl<S: KeyValueStore> ChargeTracker<S> {
    /// Build a tracker with random drain rates and no battery probe.
    ///
    /// The notification permission is restored from the store.
    pub fn new(
        backend: S,
        config: Config,
        clock: Box<dyn Clock>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let store = Store::new(backend);
        let notifications = NotificationCenter::new(notifier, store.permission());
        let battery = BatterySimulator::new(config.battery.clone(), Box::new(SeededRates::new(None)));
        Self {
            store,
            config,
            clock,
            battery,
            probe: Box::new(NoBatteryProbe),
            notifications,
            messages: MessagePicker::new(None),
            timers: TimerQueue::new(),
            reminder_timer: None,
            poll_timer: None,
        }
    }

    pub fn with_rates(mut self, rates: Box<dyn RateSource>) -> Self {
        self.battery = BatterySimulator::new(self.config.battery.clone(), rates);
        self
    }

    pub fn with_probe(mut self, probe: Box<dyn BatteryProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_message_seed(mut self, seed: u64) -> Self {
        self.messages = MessagePicker::new(Some(seed));
        self
    }

    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn history(&self) -> Vec<ChargeRecord> {
        self.store.charge_history()
    }

    pub fn settings(&self) -> AppSettings {
        self.store.settings()
    }

    pub fn streak(&self) -> StreakState {
        self.store.streak()
    }

    pub fn permission(&self) -> Permission {
        self.notifications.permission()
    }

    pub fn stats(&self) -> ChargeStats {
        charge_stats(&self.store.charge_history(), self.now())
    }

    /// Current battery percentage.
    ///
    /// Resolution order: decayed stored snapshot, then the device probe,
    /// then the configured default. The last two are anchored as the new
    /// snapshot.
    pub fn battery_level(&mut self) -> Result<u8> {
        let now_ms = self.clock.now_ms();
        if let Some(snapshot) = self.store.battery_snapshot() {
            return Ok(self.battery.current_level(&snapshot, now_ms));
        }
        let level = match self.probe.read_fraction().and_then(fraction_to_level) {
            Some(level) => level,
            None => {
                tracing::debug!("no battery reading available, using default");
                self.battery.default_level()
            }
        };
        self.anchor_battery(level, now_ms)?;
        Ok(level)
    }

    /// Full status snapshot. Runs the daily reset check first.
    pub fn status(&mut self) -> Result<Event> {
        self.activate()?;
        let now = self.now();
        let streak = self.store.streak();
        let battery_level = self.battery_level()?;
        let history = self.store.charge_history();
        let message = self.messages.pick(MessageContext::Greeting {
            urgency: streak.urgency(),
            hour: now.hour(),
        });
        Ok(Event::StatusSnapshot {
            streak: streak.streak,
            tier: streak.tier(),
            urgency: streak.urgency(),
            urgency_level: streak.urgency().level(),
            charged_today: streak.charged_on(now.date_naive()),
            battery_level,
            settings: self.store.settings(),
            last_charge: history.first().cloned(),
            stats: charge_stats(&history, now),
            permission: self.notifications.permission(),
            message,
            at: now,
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start-of-session check: resets the streak if a day was skipped.
    pub fn activate(&mut self) -> Result<Option<Event>> {
        let mut state = self.store.streak();
        let previous = state.streak;
        if !state.check_daily_reset(self.clock.today()) {
            return Ok(None);
        }
        self.store.set_streak(&state)?;
        tracing::info!(previous, "streak reset after a skipped day");
        Ok(Some(Event::StreakReset {
            previous,
            at: self.now(),
        }))
    }

    /// Append a history record stamped now.
    pub fn add_charge_record(&mut self, battery_level: Option<u8>) -> Result<ChargeRecord> {
        let record = ChargeRecord::new(self.now(), battery_level)?;
        self.store.push_charge_record(record)
    }

    /// Record a charge.
    ///
    /// Every call appends to the history; the streak only moves once per
    /// day. When a battery level is known it is bumped and re-anchored.
    pub fn mark_charged(&mut self) -> Result<Event> {
        let now = self.now();
        let now_ms = now.timestamp_millis();

        let level = self
            .store
            .battery_snapshot()
            .map(|snapshot| self.battery.current_level(&snapshot, now_ms));
        let record = ChargeRecord::new(now, level)?;

        let mut state = self.store.streak();
        let outcome = state.mark_charged(now.date_naive());
        self.store.set_streak(&state)?;
        let record = self.store.push_charge_record(record)?;

        let battery_level = match level {
            Some(level) => {
                let charged = self.battery.charged_level(level);
                self.anchor_battery(charged, now_ms)?;
                Some(charged)
            }
            None => None,
        };

        self.store.update_settings(&SettingsPatch {
            last_charged: Some(now.to_rfc3339()),
            ..Default::default()
        })?;

        tracing::info!(?outcome, "charge recorded");
        let message = self.messages.pick(MessageContext::Charged {
            streak: state.streak,
        });
        Ok(Event::ChargeMarked {
            record,
            outcome,
            battery_level,
            message,
            at: now,
        })
    }

    pub fn mark_forgotten(&mut self) -> Result<Event> {
        let mut state = self.store.streak();
        state.mark_forgotten();
        self.store.set_streak(&state)?;
        tracing::info!("streak reset by user");
        Ok(Event::MarkedForgotten {
            message: self.messages.pick(MessageContext::Forgotten),
            at: self.now(),
        })
    }

    /// Anchor a new battery baseline. Levels above 100 are rejected.
    pub fn set_battery_level(&mut self, level: u32) -> Result<Event> {
        let level = check_level(level)?;
        self.anchor_battery(level, self.clock.now_ms())?;
        Ok(Event::BatteryUpdated {
            level,
            at: self.now(),
        })
    }

    fn anchor_battery(&mut self, level: u8, now_ms: i64) -> Result<()> {
        self.store.set_battery_snapshot(&BatterySnapshot {
            level,
            timestamp: now_ms,
        })?;
        self.store.update_settings(&SettingsPatch {
            current_battery_level: Some(level),
            last_battery_update: Some(now_ms),
            ..Default::default()
        })?;
        Ok(())
    }

    pub fn clear_history(&mut self) -> Result<Event> {
        self.store.clear_history()?;
        tracing::info!("charge history cleared");
        Ok(Event::HistoryCleared { at: self.now() })
    }

    /// Merge `patch` into the settings.
    ///
    /// Disabling notifications cancels the interval reminder; a new interval
    /// re-arms it if it was running.
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<Event> {
        let settings = self.store.update_settings(patch)?;
        self.sync_reminder_timer(&settings);
        Ok(Event::SettingsUpdated {
            settings,
            at: self.now(),
        })
    }

    pub fn reset_settings(&mut self) -> Result<Event> {
        let settings = self.store.reset_settings()?;
        self.sync_reminder_timer(&settings);
        Ok(Event::SettingsUpdated {
            settings,
            at: self.now(),
        })
    }

    fn sync_reminder_timer(&mut self, settings: &AppSettings) {
        let Some(handle) = self.reminder_timer.take() else {
            return;
        };
        self.timers.cancel(handle);
        if settings.notifications && settings.reminder_interval_minutes > 0 {
            let interval_ms = settings.reminder_interval_minutes as i64 * 60_000;
            self.reminder_timer = Some(self.timers.schedule_every(
                self.clock.now_ms(),
                interval_ms,
                TimerTask::ReminderCheck,
            ));
        }
    }

    // ── Notifications ────────────────────────────────────────────────

    /// Prompt for consent if never asked, and persist the result.
    pub fn request_permission(&mut self) -> Result<Event> {
        let permission = self.notifications.request_permission();
        self.store.set_permission(permission)?;
        Ok(Event::PermissionChanged {
            permission,
            at: self.now(),
        })
    }

    /// Forget the consent decision so the next request prompts again.
    pub fn reset_permission(&mut self) -> Result<Event> {
        self.notifications.reset();
        self.store.set_permission(Permission::Unasked)?;
        Ok(Event::PermissionChanged {
            permission: Permission::Unasked,
            at: self.now(),
        })
    }

    /// Arm the recurring reminder check, replacing any previous one.
    ///
    /// Returns `None` without scheduling when notifications are disabled.
    pub fn schedule_reminders(&mut self, interval_minutes: u32) -> Result<Option<Event>> {
        if interval_minutes == 0 {
            return Err(ValidationError::ZeroInterval.into());
        }
        if let Some(handle) = self.reminder_timer.take() {
            self.timers.cancel(handle);
        }
        if !self.store.settings().notifications {
            return Ok(None);
        }
        self.reminder_timer = Some(self.timers.schedule_every(
            self.clock.now_ms(),
            interval_minutes as i64 * 60_000,
            TimerTask::ReminderCheck,
        ));
        Ok(Some(Event::RemindersScheduled {
            interval_minutes,
            at: self.now(),
        }))
    }

    /// Show the interval reminder unless disabled, not permitted, or within
    /// the cooldown of the previous one. Never prompts for consent.
    pub fn maybe_show_reminder(&mut self) -> Result<Event> {
        let now = self.now();
        let now_ms = now.timestamp_millis();
        let suppressed = |reason| Ok(Event::ReminderSuppressed { reason, at: now });

        if !self.store.settings().notifications {
            return suppressed(Suppression::Disabled);
        }
        if !self.notifications.is_supported() {
            return suppressed(Suppression::Unsupported);
        }
        if !self.notifications.permission().is_granted() {
            return suppressed(Suppression::PermissionMissing);
        }
        let cooldown = Duration::minutes(self.config.reminder.cooldown_minutes as i64);
        if let Some(remaining_ms) =
            reminder::cooldown_remaining(self.store.last_notification_time(), now_ms, cooldown)
        {
            return suppressed(Suppression::Cooldown { remaining_ms });
        }

        let notification = reminder::interval_reminder(&self.config.notification);
        self.notifications.deliver(&notification)?;
        self.store.set_last_notification_time(now_ms)?;
        tracing::info!(tag = %notification.tag, "reminder shown");
        Ok(Event::ReminderShown {
            tag: notification.tag,
            at: now,
        })
    }

    /// Arm a one-shot reminder at the next local `at` (configured time when
    /// `None`).
    ///
    /// Asks for consent first if never asked. A denied permission is a
    /// silent no-op; without notification support an in-app alert is
    /// scheduled after the fallback delay instead.
    pub fn schedule_daily_reminder(&mut self, at: Option<NaiveTime>) -> Result<Option<Event>> {
        let target = match at {
            Some(at) => at,
            None => self.config.reminder.daily_time()?,
        };
        let now = self.now();
        let now_ms = now.timestamp_millis();

        if !self.notifications.is_supported() {
            let delay_ms = self.config.reminder.fallback_delay_secs as i64 * 1_000;
            self.timers
                .schedule_once(now_ms, delay_ms, TimerTask::FallbackAlert);
            return Ok(Some(Event::ReminderSuppressed {
                reason: Suppression::Unsupported,
                at: now,
            }));
        }

        if self.notifications.permission() == Permission::Unasked {
            self.request_permission()?;
        }
        if !self.notifications.permission().is_granted() {
            tracing::debug!("daily reminder skipped, permission denied");
            return Ok(None);
        }

        let delay = reminder::delay_until(now, target);
        let delay_ms = delay.num_milliseconds();
        self.timers
            .schedule_once(now_ms, delay_ms, TimerTask::DailyReminder);
        Ok(Some(Event::DailyReminderScheduled {
            delay_ms,
            due: now + delay,
            at: now,
        }))
    }

    /// React to a click on a displayed notification.
    pub fn handle_notification_response(
        &mut self,
        response: NotificationResponse,
    ) -> Result<Vec<Event>> {
        let now = self.now();
        match response {
            NotificationResponse::Opened => Ok(vec![Event::NotificationOpened { at: now }]),
            NotificationResponse::Action(action) => {
                let acted = Event::NotificationActed { action, at: now };
                let follow_up = match action {
                    NotificationAction::Charged => self.mark_charged()?,
                    NotificationAction::Snooze => self.snooze(),
                };
                Ok(vec![acted, follow_up])
            }
        }
    }

    fn snooze(&mut self) -> Event {
        let now = self.now();
        let delay = Duration::minutes(self.config.reminder.snooze_minutes as i64);
        self.timers
            .schedule_once(now.timestamp_millis(), delay.num_milliseconds(), TimerTask::Snoozed);
        Event::Snoozed {
            until: now + delay,
            at: now,
        }
    }

    /// Periodically re-anchor the decayed battery level.
    pub fn start_battery_poll(&mut self) -> TimerHandle {
        if let Some(handle) = self.poll_timer.take() {
            self.timers.cancel(handle);
        }
        let interval_ms = self.config.battery.poll_seconds as i64 * 1_000;
        let handle = self
            .timers
            .schedule_every(self.clock.now_ms(), interval_ms, TimerTask::BatteryPoll);
        self.poll_timer = Some(handle);
        handle
    }

    // ── Timers ───────────────────────────────────────────────────────

    /// Run every timer that came due. Call periodically.
    ///
    /// A task that fails is logged and skipped; the rest still run.
    pub fn tick(&mut self) -> Vec<Event> {
        let fired = self.timers.poll(self.clock.now_ms());
        let mut events = Vec::with_capacity(fired.len());
        for fired in fired {
            match self.run_task(fired.task) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(e) => tracing::warn!(task = ?fired.task, "timer task failed: {e}"),
            }
        }
        events
    }

    fn run_task(&mut self, task: TimerTask) -> Result<Option<Event>> {
        let now = self.now();
        match task {
            TimerTask::ReminderCheck | TimerTask::Snoozed => self.maybe_show_reminder().map(Some),
            TimerTask::DailyReminder => {
                let notification = reminder::daily_reminder(&self.config.notification);
                match self.notifications.deliver(&notification) {
                    Ok(()) => Ok(Some(Event::ReminderShown {
                        tag: notification.tag,
                        at: now,
                    })),
                    Err(NotifyError::NotPermitted) => Ok(Some(Event::ReminderSuppressed {
                        reason: Suppression::PermissionMissing,
                        at: now,
                    })),
                    Err(e) => Err(e.into()),
                }
            }
            TimerTask::FallbackAlert => Ok(Some(Event::FallbackAlert {
                message: self.config.notification.daily_body.clone(),
                at: now,
            })),
            TimerTask::BatteryPoll => {
                let Some(snapshot) = self.store.battery_snapshot() else {
                    return Ok(None);
                };
                // The anchor stays put; only the mirrored level follows the
                // decay. It never rises until the next anchor.
                let settings = self.store.settings();
                let shown = settings
                    .current_battery_level
                    .filter(|_| settings.last_battery_update == Some(snapshot.timestamp))
                    .unwrap_or(snapshot.level);
                let level = self
                    .battery
                    .current_level(&snapshot, now.timestamp_millis())
                    .min(shown);
                if level == shown {
                    return Ok(None);
                }
                self.store.update_settings(&SettingsPatch {
                    current_battery_level: Some(level),
                    ..Default::default()
                })?;
                Ok(Some(Event::BatteryUpdated { level, at: now }))
            }
        }
    }

    /// Earliest pending timer, epoch milliseconds.
    pub fn next_due(&self) -> Option<i64> {
        self.timers.next_due()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Cancel every pending timer.
    pub fn shutdown(&mut self) {
        self.timers.cancel_all();
        self.reminder_timer = None;
        self.poll_timer = None;
        tracing::debug!("tracker timers cancelled");
    }
}
