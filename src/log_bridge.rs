//! Mirrors the application's log stream into the console.
//!
//! [`custom_log_layer`] plugs into [`LogPlugin::custom_layer`](bevy::log::LogPlugin::custom_layer)
//! and publishes every captured `tracing` event to the app's [`LogHub`]. The
//! [`LogBridge`] subscribes to the hub, queues events through a channel (they may
//! be emitted on any thread) and writes them to the [`OutputHistory`] from the
//! main schedule.

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, Weak};
use std::time::SystemTime;

use bevy::log::{BoxedLayer, Level};
use bevy::prelude::*;
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::field::Visit;

use crate::config::ConsoleConfig;
use crate::core::{ColorTag, OutputHistory};

/// How the host classified a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostLogKind {
    Log,
    Warning,
    Error,
    Assert,
    Exception,
    /// Anything the console has no severity for, e.g. debug and trace output.
    Other,
}

impl From<Level> for HostLogKind {
    fn from(level: Level) -> Self {
        match level {
            Level::ERROR => HostLogKind::Error,
            Level::WARN => HostLogKind::Warning,
            Level::INFO => HostLogKind::Log,
            _ => HostLogKind::Other,
        }
    }
}

impl HostLogKind {
    /// The console severity, or `None` for unrecognized kinds.
    pub fn severity(self) -> Option<LogSeverity> {
        match self {
            HostLogKind::Log => Some(LogSeverity::Info),
            HostLogKind::Warning => Some(LogSeverity::Warning),
            HostLogKind::Error | HostLogKind::Assert | HostLogKind::Exception => {
                Some(LogSeverity::Error)
            }
            HostLogKind::Other => None,
        }
    }
}

/// Severity of a mirrored log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSeverity {
    Info,
    Warning,
    Error,
}

impl LogSeverity {
    /// Prefix written before the message.
    pub fn prefix(self) -> &'static str {
        match self {
            LogSeverity::Info => "[LOG]",
            LogSeverity::Warning => "[WARN]",
            LogSeverity::Error => "[ERROR]",
        }
    }

    /// Output color for this severity.
    pub fn color(self) -> ColorTag {
        match self {
            LogSeverity::Info => ColorTag::Normal,
            LogSeverity::Warning => ColorTag::Warning,
            LogSeverity::Error => ColorTag::Error,
        }
    }
}

/// A log message emitted by the host application.
#[derive(Debug, Clone)]
pub struct LogEvent {
    /// The message contents.
    pub message: String,
    /// Where the message came from (target and source location when known).
    pub trace: String,
    /// The host's classification.
    pub kind: HostLogKind,
    /// The time the log occurred.
    pub time: SystemTime,
}

impl LogEvent {
    /// Create an event without a trace.
    pub fn new(message: impl Into<String>, kind: HostLogKind) -> Self {
        Self {
            message: message.into(),
            trace: String::new(),
            kind,
            time: SystemTime::now(),
        }
    }
}

/// Format an event for the console, or `None` if it should be ignored.
pub fn format_log_event(event: &LogEvent) -> Option<(String, ColorTag)> {
    if event.message.trim().is_empty() {
        return None;
    }

    Some(match event.kind.severity() {
        Some(severity) => (
            format!("{} {}", severity.prefix(), event.message),
            severity.color(),
        ),
        None => (event.message.clone(), ColorTag::Normal),
    })
}

type LogCallback = Arc<dyn Fn(&LogEvent) + Send + Sync>;

#[derive(Default)]
struct HubSubscribers {
    next_id: u64,
    callbacks: Vec<(u64, LogCallback)>,
}

/// The host's log event stream.
///
/// Cheap to clone; all clones share the same subscribers.
#[derive(Resource, Clone, Default)]
pub struct LogHub {
    subscribers: Arc<Mutex<HubSubscribers>>,
}

impl LogHub {
    /// Create a hub with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every published event.
    ///
    /// The callback stays registered until the returned guard is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&LogEvent) + Send + Sync + 'static) -> LogSubscription {
        let mut id = 0;
        if let Ok(mut subscribers) = self.subscribers.lock() {
            id = subscribers.next_id;
            subscribers.next_id += 1;
            subscribers.callbacks.push((id, Arc::new(callback)));
        }
        LogSubscription {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    /// Deliver an event to every subscriber. Safe to call from any thread.
    pub fn publish(&self, event: &LogEvent) {
        // Callbacks run outside the lock so they may (un)subscribe.
        let callbacks: Vec<LogCallback> = match self.subscribers.lock() {
            Ok(subscribers) => subscribers.callbacks.iter().map(|(_, cb)| cb.clone()).collect(),
            Err(_) => return,
        };
        for callback in callbacks {
            callback(event);
        }
    }

    /// Get the number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .map(|subscribers| subscribers.callbacks.len())
            .unwrap_or_default()
    }
}

/// Guard returned by [`LogHub::subscribe`]. Unsubscribes on drop.
pub struct LogSubscription {
    id: u64,
    subscribers: Weak<Mutex<HubSubscribers>>,
}

impl Drop for LogSubscription {
    fn drop(&mut self) {
        let Some(subscribers) = self.subscribers.upgrade() else {
            return;
        };
        if let Ok(mut subscribers) = subscribers.lock() {
            subscribers.callbacks.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Forwards host log events into the console output.
#[derive(Resource, Default)]
pub struct LogBridge {
    subscription: Option<LogSubscription>,
    receiver: Option<Mutex<Receiver<LogEvent>>>,
}

impl LogBridge {
    /// Start receiving events from `hub`. Does nothing if already active.
    pub fn activate(&mut self, hub: &LogHub) {
        if self.is_active() {
            return;
        }
        debug!("Console: log bridge activated");

        let (sender, receiver) = mpsc::channel();
        let subscription = hub.subscribe(move |event| {
            // The receiver is gone once the bridge deactivates.
            let _ = sender.send(event.clone());
        });
        self.subscription = Some(subscription);
        self.receiver = Some(Mutex::new(receiver));
    }

    /// Stop receiving events. Events not yet drained are discarded.
    pub fn deactivate(&mut self) {
        if self.subscription.take().is_some() {
            debug!("Console: log bridge deactivated");
        }
        self.receiver = None;
    }

    /// Whether the bridge is subscribed.
    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// Take every queued event.
    pub fn drain(&self) -> Vec<LogEvent> {
        self.receiver
            .as_ref()
            .and_then(|receiver| receiver.lock().ok().map(|rx| rx.try_iter().collect()))
            .unwrap_or_default()
    }
}

/// Activates or deactivates the bridge whenever the config changes.
pub(crate) fn sync_log_bridge(
    config: Res<ConsoleConfig>,
    hub: Res<LogHub>,
    mut bridge: ResMut<LogBridge>,
) {
    if !config.is_changed() {
        return;
    }

    match (config.print_log_messages, bridge.is_active()) {
        (true, false) => bridge.activate(&hub),
        (false, true) => bridge.deactivate(),
        _ => {}
    }
}

/// Writes queued log events to the console output.
pub(crate) fn drain_log_bridge(bridge: Res<LogBridge>, mut output: ResMut<OutputHistory>) {
    for event in bridge.drain() {
        if let Some((text, color)) = format_log_event(&event) {
            output.append(text, color);
        }
    }
}

/// A function that implements the log capture for the developer console via
/// [`LogPlugin::custom_layer`](bevy::log::LogPlugin::custom_layer).
pub fn custom_log_layer(app: &mut App) -> Option<BoxedLayer> {
    let hub = match app.world().get_resource::<LogHub>() {
        Some(hub) => hub.clone(),
        None => {
            let hub = LogHub::new();
            app.insert_resource(hub.clone());
            hub
        }
    };
    Some(Box::new(LogCaptureLayer { hub }))
}

/// A [`Layer`] that publishes log events to a [`LogHub`].
struct LogCaptureLayer {
    hub: LogHub,
}

impl<S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>> Layer<S>
    for LogCaptureLayer
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut message = None;
        event.record(&mut LogEventVisitor(&mut message));
        let Some(message) = message else {
            return;
        };

        let metadata = event.metadata();
        let trace = match (metadata.file(), metadata.line()) {
            (Some(file), Some(line)) => format!("{} ({file}:{line})", metadata.target()),
            _ => metadata.target().to_string(),
        };
        self.hub.publish(&LogEvent {
            message,
            trace,
            kind: HostLogKind::from(*metadata.level()),
            time: SystemTime::now(),
        });
    }
}

/// A [`Visit`]or that extracts the `message` field of an event.
struct LogEventVisitor<'a>(&'a mut Option<String>);

impl Visit for LogEventVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = Some(format!("{value:?}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::thread;

    use super::*;

    #[test]
    fn test_format_by_kind() {
        let cases = [
            (HostLogKind::Log, "[LOG] ready", ColorTag::Normal),
            (HostLogKind::Warning, "[WARN] ready", ColorTag::Warning),
            (HostLogKind::Error, "[ERROR] ready", ColorTag::Error),
            (HostLogKind::Assert, "[ERROR] ready", ColorTag::Error),
            (HostLogKind::Exception, "[ERROR] ready", ColorTag::Error),
            (HostLogKind::Other, "ready", ColorTag::Normal),
        ];

        for (kind, text, color) in cases {
            let formatted = format_log_event(&LogEvent::new("ready", kind));
            assert_eq!(formatted, Some((text.to_string(), color)), "{kind:?}");
        }
    }

    #[test]
    fn test_blank_messages_ignored() {
        assert_eq!(format_log_event(&LogEvent::new("   ", HostLogKind::Error)), None);
        assert_eq!(format_log_event(&LogEvent::new("", HostLogKind::Log)), None);
    }

    #[test]
    fn test_tracing_levels() {
        assert_eq!(HostLogKind::from(Level::INFO), HostLogKind::Log);
        assert_eq!(HostLogKind::from(Level::WARN), HostLogKind::Warning);
        assert_eq!(HostLogKind::from(Level::ERROR), HostLogKind::Error);
        assert_eq!(HostLogKind::from(Level::DEBUG).severity(), None);
    }

    #[test]
    fn test_subscription_drop_unsubscribes() {
        let hub = LogHub::new();
        let sub = hub.subscribe(|_| {});
        let other = hub.subscribe(|_| {});
        assert_eq!(hub.subscriber_count(), 2);

        drop(sub);
        assert_eq!(hub.subscriber_count(), 1);
        drop(other);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribes_on_panic() {
        let hub = LogHub::new();
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _sub = hub.subscribe(|_| {});
            panic!("teardown");
        }));

        assert!(result.is_err());
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn test_bridge_receives_events_from_other_threads() {
        let hub = LogHub::new();
        let mut bridge = LogBridge::default();
        bridge.activate(&hub);

        let worker_hub = hub.clone();
        thread::spawn(move || {
            worker_hub.publish(&LogEvent::new("from worker", HostLogKind::Warning));
        })
        .join()
        .unwrap();
        hub.publish(&LogEvent::new("from main", HostLogKind::Log));

        let messages: Vec<_> = bridge.drain().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["from worker", "from main"]);
        assert!(bridge.drain().is_empty());
    }

    #[test]
    fn test_deactivate_keeps_drained_events() {
        let hub = LogHub::new();
        let mut bridge = LogBridge::default();
        bridge.activate(&hub);
        hub.publish(&LogEvent::new("queued", HostLogKind::Log));

        let in_flight = bridge.drain();
        bridge.deactivate();
        assert!(!bridge.is_active());
        assert_eq!(hub.subscriber_count(), 0);

        // Publishing after deactivation is harmless.
        hub.publish(&LogEvent::new("late", HostLogKind::Log));
        assert!(bridge.drain().is_empty());

        let mut output = OutputHistory::default();
        for event in &in_flight {
            if let Some((text, color)) = format_log_event(event) {
                output.append(text, color);
            }
        }
        assert_eq!(output.len(), 1);
    }

    #[test]
    fn test_callback_may_unsubscribe_during_publish() {
        let hub = LogHub::new();
        let slot: Arc<Mutex<Option<LogSubscription>>> = Arc::default();
        let inner = slot.clone();
        let sub = hub.subscribe(move |_| {
            inner.lock().unwrap().take();
        });
        *slot.lock().unwrap() = Some(sub);

        hub.publish(&LogEvent::new("bye", HostLogKind::Log));
        assert_eq!(hub.subscriber_count(), 0);
    }
}
