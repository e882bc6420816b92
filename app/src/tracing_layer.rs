// In app/src/tracing_layer.rs

use chrono::Utc;
use events::{LogMessage, TrainingEvent};
use tokio::sync::broadcast;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;

/// Forwards log events into the training event channel so observers see
/// them next to progress updates.
pub struct EventBroadcastLayer {
    tx: broadcast::Sender<TrainingEvent>,
}

impl EventBroadcastLayer {
    pub fn new(tx: broadcast::Sender<TrainingEvent>) -> Self {
        Self { tx }
    }
}

impl<S> Layer<S> for EventBroadcastLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = LogMessageVisitor::default();
        event.record(&mut visitor);
        let log_message = LogMessage {
            timestamp: Utc::now(),
            level: event.metadata().level().to_string(),
            message: visitor.message,
        };
        // No receivers is fine.
        let _ = self.tx.send(TrainingEvent::Log(log_message));
    }
}

// Captures the `message` field of a log event.
#[derive(Default)]
struct LogMessageVisitor {
    message: String,
}

impl tracing::field::Visit for LogMessageVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}
