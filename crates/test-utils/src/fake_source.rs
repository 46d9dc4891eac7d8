use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use cargo_watch_plus::errors::Result;
use cargo_watch_plus::watch::{EventSource, SourceMessage, SubscriptionOptions, WatchEvent};

#[derive(Default)]
struct Shared {
    senders: Vec<mpsc::UnboundedSender<SourceMessage>>,
    options: Vec<SubscriptionOptions>,
}

/// Event source driven by hand.
///
/// Every `subscribe` call is recorded; the test then pushes events into a
/// subscription through [`ManualSourceHandle`].
#[derive(Clone, Default)]
pub struct ManualSource {
    shared: Arc<Mutex<Shared>>,
}

/// Test-side view of a [`ManualSource`].
#[derive(Clone)]
pub struct ManualSourceHandle {
    shared: Arc<Mutex<Shared>>,
}

impl ManualSource {
    pub fn new() -> (Self, ManualSourceHandle) {
        let source = Self::default();
        let handle = ManualSourceHandle {
            shared: Arc::clone(&source.shared),
        };
        (source, handle)
    }
}

impl EventSource for ManualSource {
    type Handle = ();

    fn subscribe(
        &mut self,
        options: &SubscriptionOptions,
        tx: mpsc::UnboundedSender<SourceMessage>,
    ) -> Result<()> {
        let mut shared = self.shared.lock().unwrap();
        shared.senders.push(tx);
        shared.options.push(options.clone());
        Ok(())
    }
}

impl ManualSourceHandle {
    pub fn subscriptions(&self) -> usize {
        self.shared.lock().unwrap().senders.len()
    }

    pub fn options(&self, index: usize) -> Option<SubscriptionOptions> {
        self.shared.lock().unwrap().options.get(index).cloned()
    }

    /// Wait until at least `count` subscriptions exist.
    pub async fn wait_for_subscriptions(&self, count: usize) {
        while self.subscriptions() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Deliver `event` on subscription `index`. Returns `false` if that
    /// subscription does not exist or its receiver is gone.
    pub fn send(&self, index: usize, event: WatchEvent) -> bool {
        self.send_message(index, Ok(event))
    }

    pub fn send_message(&self, index: usize, message: SourceMessage) -> bool {
        let shared = self.shared.lock().unwrap();
        match shared.senders.get(index) {
            Some(tx) => tx.send(message).is_ok(),
            None => false,
        }
    }
}
