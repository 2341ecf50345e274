use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use tokio::sync::{
    mpsc::{self, error::TrySendError},
    Notify,
};

use crate::simulator::TelemetryGenerator;

/// Subscriber identifier.
pub type SubscriberId = u64;

/// Receiving end of a broadcast subscription.
pub struct Subscriber {
    id: SubscriberId,
    receiver: mpsc::Receiver<Arc<str>>,
}

impl Subscriber {
    #[inline]
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Receive the next serialized packet.
    ///
    /// Returns `None` once the subscriber was removed from the broadcaster
    /// and all queued packets are consumed.
    pub async fn recv(&mut self) -> Option<Arc<str>> {
        self.receiver.recv().await
    }
}

#[derive(Default)]
struct Registry {
    /// Active subscribers.
    subscribers: HashMap<SubscriberId, mpsc::Sender<Arc<str>>>,
    /// Whether the tick loop is running.
    running: bool,
    /// Next subscriber identifier.
    next_id: SubscriberId,
    /// Number of times the tick loop was started.
    epoch: u64,
}

/// Telemetry broadcaster.
///
/// Drives the generator from a single tick loop and fans each packet out to
/// all subscribers. The loop starts with the first subscriber and stops when
/// the last one is removed. Delivery never waits on a subscriber, a subscriber
/// whose queue is full or closed is dropped.
pub struct Broadcaster {
    /// Subscriber registry and loop state.
    registry: Mutex<Registry>,
    /// Telemetry generator, only ticked from the broadcast loop.
    generator: tokio::sync::Mutex<TelemetryGenerator>,
    /// Interval between ticks.
    interval: Duration,
    /// Wakes the loop after a subscriber was removed.
    wakeup: Notify,
}

impl Broadcaster {
    /// Construct a new broadcaster.
    pub fn new(generator: TelemetryGenerator, interval: Duration) -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
            generator: tokio::sync::Mutex::new(generator),
            interval,
            wakeup: Notify::new(),
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.registry().subscribers.len()
    }

    /// Whether the tick loop is running.
    pub fn is_running(&self) -> bool {
        self.registry().running
    }

    /// Number of times the tick loop was started.
    pub fn epoch(&self) -> u64 {
        self.registry().epoch
    }

    /// Register a new subscriber.
    ///
    /// Starts the tick loop if it is not already running.
    pub fn subscribe(self: &Arc<Self>) -> Subscriber {
        let (sender, receiver) = mpsc::channel(crate::consts::QUEUE_SIZE_SUBSCRIBER);

        let mut registry = self.registry();

        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.insert(id, sender);

        log::info!(
            "Subscriber {} connected, total: {}",
            id,
            registry.subscribers.len()
        );

        if !registry.running {
            registry.running = true;
            registry.epoch += 1;

            tokio::spawn(self.clone().run(registry.epoch));
        }

        Subscriber { id, receiver }
    }

    /// Remove a subscriber.
    ///
    /// Removing an unknown subscriber is not an error. Returns whether the
    /// subscriber was registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut registry = self.registry();

        let removed = registry.subscribers.remove(&id).is_some();
        if removed {
            log::info!(
                "Subscriber {} disconnected, total: {}",
                id,
                registry.subscribers.len()
            );
        }

        if registry.subscribers.is_empty() && registry.running {
            self.wakeup.notify_one();
        }

        removed
    }

    /// Mark the loop stopped if no subscribers remain.
    fn try_stop(&self) -> bool {
        let mut registry = self.registry();

        if registry.subscribers.is_empty() {
            registry.running = false;
            true
        } else {
            false
        }
    }

    /// Wait for the next tick.
    ///
    /// Returns `false` if the loop should stop.
    async fn wait_tick(&self) -> bool {
        let deadline = tokio::time::Instant::now() + self.interval;

        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => break,
                _ = self.wakeup.notified() => {}
            }

            if self.try_stop() {
                return false;
            }
        }

        !self.try_stop()
    }

    async fn run(self: Arc<Self>, epoch: u64) {
        log::info!(
            "Starting telemetry broadcast ({}) every {}ms",
            epoch,
            self.interval.as_millis()
        );

        loop {
            if let Err(e) = self.tick().await {
                log::error!("Telemetry broadcast aborted: {}", e);
                self.registry().running = false;
                break;
            }

            if !self.wait_tick().await {
                break;
            }
        }

        log::info!("Telemetry broadcast ({}) stopped", epoch);
    }

    /// Generate one packet and deliver it to every subscriber.
    async fn tick(&self) -> crate::Result {
        let packet = self.generator.lock().await.generate()?;

        log::debug!("Sending packet - {}", packet);

        let payload: Arc<str> = packet.to_json()?.into();

        let dropped: Vec<SubscriberId> = self
            .registry()
            .subscribers
            .iter()
            .filter_map(|(id, sender)| match sender.try_send(payload.clone()) {
                Ok(()) => None,
                Err(TrySendError::Full(_)) => {
                    let e = crate::Error::Transport(format!("subscriber {} is not responding", id));
                    log::warn!("{}", e);
                    Some(*id)
                }
                Err(TrySendError::Closed(_)) => {
                    let e = crate::Error::Transport(format!("subscriber {} is closed", id));
                    log::warn!("{}", e);
                    Some(*id)
                }
            })
            .collect();

        for id in dropped {
            self.unsubscribe(id);
        }

        Ok(())
    }
}
