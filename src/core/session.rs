//! Open/close state machine for the console overlay.
//!
//! The session tracks two flags:
//!
//! - **visible**: what the user sees. Changes immediately on [`ConsoleSession::open`]
//!   and [`ConsoleSession::close`].
//! - **debounce**: what the toggle key reacts to. Flips once per transition,
//!   `toggle_delay` after it, so holding or re-pressing the toggle key during
//!   that window does not bounce the console.
//!
//! Pending flips are never cancelled. Opening and then closing inside the delay
//! window schedules two flips that fire in order; in between, the debounce flag
//! reads "open" while the console is closed and a toggle press is ignored.

use std::time::Duration;

use bevy::prelude::*;

use crate::config::ConsoleConfig;

/// Callback notified with the new open state after every transition.
pub type StateListener = Box<dyn Fn(bool) + Send + Sync>;

/// The console's open/closed state.
#[derive(Resource)]
pub struct ConsoleSession {
    visible: bool,
    interactable: bool,
    debounce_open: bool,
    pending_flips: Vec<Timer>,
    toggle_delay: Duration,
    origin: Vec2,
    position: Vec2,
    reposition_on_close: bool,
    listeners: Vec<StateListener>,
    queue_transitions: bool,
    unsent: Vec<bool>,
}

impl Default for ConsoleSession {
    fn default() -> Self {
        Self::from_config(&ConsoleConfig::default())
    }
}

impl ConsoleSession {
    /// Create a closed session from the console configuration.
    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self {
            visible: false,
            interactable: false,
            debounce_open: false,
            pending_flips: Vec::new(),
            toggle_delay: config.toggle_delay(),
            origin: config.origin,
            position: config.origin,
            reposition_on_close: config.reposition_on_close,
            listeners: Vec::new(),
            queue_transitions: false,
            unsent: Vec::new(),
        }
    }

    /// Take over the delay, origin and reposition settings of `config`.
    ///
    /// Flips already pending keep their old delay. A closed session that
    /// repositions on close moves to the new origin.
    pub fn apply_config(&mut self, config: &ConsoleConfig) {
        self.toggle_delay = config.toggle_delay();
        self.origin = config.origin;
        self.reposition_on_close = config.reposition_on_close;
        if !self.visible && self.reposition_on_close {
            self.position = self.origin;
        }
    }

    /// Record transitions for [`drain_transitions`](Self::drain_transitions).
    ///
    /// Off by default; [`ConsolePlugin`](crate::ConsolePlugin) turns it on and
    /// drains the queue every frame. Turning it off discards queued transitions.
    pub fn set_queue_transitions(&mut self, enabled: bool) {
        self.queue_transitions = enabled;
        if !enabled {
            self.unsent.clear();
        }
    }

    /// Show the console.
    ///
    /// Returns `false` without side effects if it is already visible.
    pub fn open(&mut self) -> bool {
        if self.visible {
            return false;
        }

        self.visible = true;
        self.interactable = true;
        self.transitioned(true);
        true
    }

    /// Hide the console, restoring its origin position if configured to.
    ///
    /// Returns `false` without side effects if it is already hidden.
    pub fn close(&mut self) -> bool {
        if !self.visible {
            return false;
        }

        self.visible = false;
        self.interactable = false;
        self.transitioned(false);

        if self.reposition_on_close {
            self.position = self.origin;
        }
        true
    }

    fn transitioned(&mut self, open: bool) {
        debug!("Console: {}", if open { "opened" } else { "closed" });
        for listener in &self.listeners {
            listener(open);
        }
        if self.queue_transitions {
            self.unsent.push(open);
        }
        self.pending_flips
            .push(Timer::new(self.toggle_delay, TimerMode::Once));
    }

    /// Advance pending debounce flips by `delta`.
    pub fn advance(&mut self, delta: Duration) {
        let mut flips = 0;
        self.pending_flips.retain_mut(|timer| {
            if timer.tick(delta).just_finished() {
                flips += 1;
                false
            } else {
                true
            }
        });
        for _ in 0..flips {
            self.debounce_open = !self.debounce_open;
        }
    }

    /// React to the toggle key for one tick.
    ///
    /// Returns the new open state if a transition happened.
    pub fn poll_toggle(&mut self, held: bool) -> Option<bool> {
        if !held {
            return None;
        }

        let changed = if self.debounce_open {
            self.close()
        } else {
            self.open()
        };
        changed.then_some(self.visible)
    }

    /// Register a listener notified after every open/close transition.
    ///
    /// Listeners run synchronously, in registration order.
    pub fn on_state_change(&mut self, listener: impl Fn(bool) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Take the queued transitions not yet forwarded as [`ConsoleToggleEvent`](super::ConsoleToggleEvent)s.
    pub fn drain_transitions(&mut self) -> impl Iterator<Item = bool> + '_ {
        self.unsent.drain(..)
    }

    /// Whether the console is visible.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.visible
    }

    /// Whether the console accepts input.
    #[inline]
    pub fn is_interactable(&self) -> bool {
        self.interactable
    }

    /// The state the toggle key currently reacts to.
    #[inline]
    pub fn debounce_open(&self) -> bool {
        self.debounce_open
    }

    /// Whether a debounce flip is still pending.
    #[inline]
    pub fn is_transitioning(&self) -> bool {
        !self.pending_flips.is_empty()
    }

    /// Current window position.
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Position captured at startup and restored on close.
    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Report the window position, e.g. after the user dragged it.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn session() -> ConsoleSession {
        ConsoleSession::from_config(&ConsoleConfig::default())
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_starts_closed() {
        let session = session();
        assert!(!session.is_open());
        assert!(!session.is_interactable());
        assert!(!session.debounce_open());
    }

    #[test]
    fn test_open_twice_notifies_once() {
        let mut session = session();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        session.on_state_change(move |open| sink.lock().unwrap().push(open));
        session.set_queue_transitions(true);

        assert!(session.open());
        assert!(!session.open());

        assert_eq!(*seen.lock().unwrap(), vec![true]);
        assert_eq!(session.drain_transitions().collect::<Vec<_>>(), vec![true]);
    }

    #[test]
    fn test_close_when_closed_is_noop() {
        let mut session = session();
        assert!(!session.close());
        assert!(!session.is_transitioning());
        assert_eq!(session.drain_transitions().count(), 0);
    }

    #[test]
    fn test_listeners_run_in_order() {
        let mut session = session();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for id in 0..3 {
            let sink = seen.clone();
            session.on_state_change(move |open| sink.lock().unwrap().push((id, open)));
        }

        session.open();
        session.close();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(0, true), (1, true), (2, true), (0, false), (1, false), (2, false)]
        );
    }

    #[test]
    fn test_debounce_flag_lags_one_delay() {
        let mut session = session();
        session.open();
        assert!(session.is_open());
        assert!(!session.debounce_open());

        session.advance(ms(999));
        assert!(!session.debounce_open());

        session.advance(ms(1));
        assert!(session.debounce_open());
        assert!(!session.is_transitioning());
    }

    #[test]
    fn test_toggle_press_inside_window_is_ignored() {
        let mut session = session();
        session.open();

        session.advance(ms(500));
        assert_eq!(session.poll_toggle(true), None);
        assert!(session.is_open());

        session.advance(ms(500));
        assert_eq!(session.poll_toggle(true), Some(false));
        assert!(!session.is_open());
    }

    #[test]
    fn test_toggle_requires_held_key() {
        let mut session = session();
        assert_eq!(session.poll_toggle(false), None);
        assert_eq!(session.poll_toggle(true), Some(true));
        assert!(session.is_open());
    }

    #[test]
    fn test_open_then_close_inside_window_flips_twice() {
        let mut session = session();
        session.open();
        session.advance(ms(300));
        session.close();

        // First flip lands while the console is already closed.
        session.advance(ms(700));
        assert!(!session.is_open());
        assert!(session.debounce_open());
        assert_eq!(session.poll_toggle(true), None);

        // Second flip brings the flags back in agreement.
        session.advance(ms(300));
        assert!(!session.debounce_open());
        assert_eq!(session.poll_toggle(true), Some(true));
    }

    #[test]
    fn test_close_restores_origin() {
        let config = ConsoleConfig {
            origin: Vec2::new(10.0, 20.0),
            ..default()
        };
        let mut session = ConsoleSession::from_config(&config);
        session.open();
        session.set_position(Vec2::new(300.0, 400.0));
        session.close();
        assert_eq!(session.position(), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_close_keeps_position_when_disabled() {
        let config = ConsoleConfig {
            reposition_on_close: false,
            ..default()
        };
        let mut session = ConsoleSession::from_config(&config);
        session.open();
        session.set_position(Vec2::new(300.0, 400.0));
        session.close();
        assert_eq!(session.position(), Vec2::new(300.0, 400.0));
        assert_eq!(session.origin(), config.origin);
    }

    #[test]
    fn test_transitions_not_queued_by_default() {
        let mut session = session();
        for _ in 0..10 {
            session.open();
            session.close();
        }
        assert_eq!(session.drain_transitions().count(), 0);

        session.set_queue_transitions(true);
        session.open();
        session.close();
        assert_eq!(session.drain_transitions().collect::<Vec<_>>(), vec![true, false]);

        session.open();
        session.set_queue_transitions(false);
        assert_eq!(session.drain_transitions().count(), 0);
    }

    #[test]
    fn test_apply_config() {
        let mut session = session();
        let config = ConsoleConfig {
            toggle_delay_secs: 0.25,
            origin: Vec2::new(5.0, 6.0),
            ..default()
        };
        session.apply_config(&config);
        assert_eq!(session.origin(), Vec2::new(5.0, 6.0));
        assert_eq!(session.position(), Vec2::new(5.0, 6.0));

        session.open();
        session.advance(ms(250));
        assert!(session.debounce_open());
    }

    #[test]
    fn test_apply_config_keeps_open_position() {
        let mut session = session();
        session.open();
        session.set_position(Vec2::new(300.0, 200.0));

        session.apply_config(&ConsoleConfig {
            origin: Vec2::ZERO,
            ..default()
        });
        assert_eq!(session.position(), Vec2::new(300.0, 200.0));

        session.close();
        assert_eq!(session.position(), Vec2::ZERO);
    }
}
