//! Shared test helpers for extension integration tests.

#![allow(dead_code)]

pub mod resp;

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use appredis_client::deprecation::DEPRECATION_TARGET;
use appredis_client::{BoundClient, ExtensionResult, ProviderFactory};
use appredis_core::{Application, Settings};

/// Build a test application around `settings`.
pub fn app_with(settings: Settings) -> Application {
    Application::new("test-app", settings)
}

/// Collects deprecation warnings emitted while it is the active subscriber.
#[derive(Clone, Default)]
pub struct DeprecationCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

impl DeprecationCapture {
    /// Messages captured so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("capture lock").clone()
    }
}

impl<S: Subscriber> Layer<S> for DeprecationCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target() != DEPRECATION_TARGET || *metadata.level() != Level::WARN {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.messages
            .lock()
            .expect("capture lock")
            .push(visitor.message);
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

/// Run `f` with a subscriber that records deprecation warnings.
pub fn capture_deprecations<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let capture = DeprecationCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let output = tracing::subscriber::with_default(subscriber, f);
    (output, capture.messages())
}

/// Arguments a [`RecordingProvider`] was called with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCall {
    pub startup_nodes: Vec<String>,
    pub max_connections: usize,
}

/// Custom provider that records its calls and builds a cluster client.
#[derive(Clone, Default)]
pub struct RecordingProvider {
    calls: Arc<Mutex<Vec<ProviderCall>>>,
}

impl RecordingProvider {
    /// Calls recorded so far.
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl fmt::Debug for RecordingProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingProvider").finish()
    }
}

impl ProviderFactory for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    fn build(&self, startup_nodes: &[String], max_connections: usize) -> ExtensionResult<BoundClient> {
        self.calls.lock().expect("calls lock").push(ProviderCall {
            startup_nodes: startup_nodes.to_vec(),
            max_connections,
        });
        BoundClient::cluster(startup_nodes)
    }
}
