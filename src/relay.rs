use crate::protocol::{InspectorRequest, InspectorResponse, StatusUpdate};
use crate::server::InspectorServer;
use std::time::{Duration, Instant};

/// Carries requests into the inspected page. Real embedders bridge isolated
/// execution contexts here; tests and the diagnostic binaries run in-process.
pub trait InspectorTransport {
    fn request(&mut self, request: InspectorRequest) -> Option<InspectorResponse>;

    /// Spontaneous engine-presence transition since the last call, if any.
    fn poll_status(&mut self) -> Option<StatusUpdate>;
}

/// Transport that dispatches straight into an [`InspectorServer`].
pub struct InProcessTransport {
    server: InspectorServer,
}

impl InProcessTransport {
    pub fn new(server: InspectorServer) -> Self {
        Self { server }
    }

    pub fn server(&self) -> &InspectorServer {
        &self.server
    }
}

impl InspectorTransport for InProcessTransport {
    fn request(&mut self, request: InspectorRequest) -> Option<InspectorResponse> {
        self.server.handle(request)
    }

    fn poll_status(&mut self) -> Option<StatusUpdate> {
        self.server.poll_status()
    }
}

/// Bounds every query with a reply window. A reply that never comes, or comes
/// after the window has elapsed, degrades to the request's null placeholder;
/// the in-flight work is abandoned, not cancelled.
pub struct Relay<T: InspectorTransport> {
    transport: T,
    reply_window: Duration,
}

impl<T: InspectorTransport> Relay<T> {
    pub fn new(transport: T, reply_window: Duration) -> Self {
        Self { transport, reply_window }
    }

    /// Sends a fire-and-forget request, dropping any response.
    pub fn send(&mut self, request: InspectorRequest) {
        let _ = self.transport.request(request);
    }

    /// Sends a request and waits for its reply within the window.
    pub fn query(&mut self, request: InspectorRequest) -> Option<InspectorResponse> {
        let placeholder = InspectorResponse::timed_out(&request);
        let started = Instant::now();
        let response = self.transport.request(request);
        if response.is_none() || started.elapsed() > self.reply_window {
            return placeholder;
        }
        response
    }

    pub fn poll_status(&mut self) -> Option<StatusUpdate> {
        self.transport.poll_status()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
