//! Lifecycle of the polling machinery: `uninitialized → polling → stopped`.

use async_trait::async_trait;

/// Something that polls for updates and can be torn down in two steps.
#[async_trait]
pub trait PollingService: Send {
    /// Stop processing updates.
    async fn stop_dispatch(&mut self);

    /// Stop the client's network loop.
    async fn stop_client(&mut self);
}

/// Current lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Polling,
    Stopped,
}

/// Owns the polling service and tears it down at most once.
pub struct Lifecycle<P: PollingService> {
    state: LifecycleState,
    service: Option<P>,
}

impl<P: PollingService> Default for Lifecycle<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PollingService> Lifecycle<P> {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Uninitialized,
            service: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Record that polling has started on `service`.
    pub fn started(&mut self, service: P) {
        self.service = Some(service);
        self.state = LifecycleState::Polling;
    }

    /// Stop dispatch, then the client. A no-op unless polling.
    pub async fn stop(&mut self) {
        if self.state != LifecycleState::Polling {
            tracing::debug!(state = ?self.state, "Nothing to stop");
            return;
        }

        if let Some(mut service) = self.service.take() {
            tracing::info!("Stopping dispatcher");
            service.stop_dispatch().await;
            tracing::info!("Stopping updater");
            service.stop_client().await;
        }

        self.state = LifecycleState::Stopped;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records the order of teardown calls.
    #[derive(Clone, Default)]
    pub struct FakePolling {
        pub calls: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl PollingService for FakePolling {
        async fn stop_dispatch(&mut self) {
            self.calls.lock().unwrap().push("dispatch");
        }

        async fn stop_client(&mut self) {
            self.calls.lock().unwrap().push("client");
        }
    }
}
