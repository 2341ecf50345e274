use std::{sync::Arc, time::Duration};

use telemetria::{
    core::VehicleState,
    identity::IdentityProvider,
    rand::{rngs::StdRng, SeedableRng},
    service::Broadcaster,
    simulator::TelemetryGenerator,
};

const IMEI: &str = "352099001761481";
const INTERVAL: Duration = Duration::from_millis(20);

fn broadcaster() -> Arc<Broadcaster> {
    let mut rng = StdRng::seed_from_u64(42);
    let identity = IdentityProvider::new(Some(IMEI), None, false, &mut rng).unwrap();

    let generator = TelemetryGenerator::new(identity);

    Arc::new(Broadcaster::new(generator, INTERVAL))
}

async fn wait_until(f: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if f() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}

#[tokio::test]
async fn test_subscriber_receives_packets() {
    let broadcaster = broadcaster();

    let mut subscriber = broadcaster.subscribe();
    assert!(broadcaster.is_running());

    for _ in 0..3 {
        let payload = tokio::time::timeout(Duration::from_secs(1), subscriber.recv())
            .await
            .unwrap()
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["imei"], IMEI);
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
        assert_eq!(value["data"].as_object().unwrap().len(), 17);
    }

    broadcaster.unsubscribe(subscriber.id());
}

#[tokio::test]
async fn test_loop_restarts_after_drain() {
    let broadcaster = broadcaster();

    let subscriber = broadcaster.subscribe();
    assert_eq!(broadcaster.epoch(), 1);

    assert!(broadcaster.unsubscribe(subscriber.id()));
    assert!(wait_until(|| !broadcaster.is_running()).await);

    let mut subscriber = broadcaster.subscribe();
    assert!(broadcaster.is_running());
    assert_eq!(broadcaster.epoch(), 2);

    let payload = tokio::time::timeout(Duration::from_secs(1), subscriber.recv()).await;
    assert!(matches!(payload, Ok(Some(_))));

    broadcaster.unsubscribe(subscriber.id());
    assert!(wait_until(|| !broadcaster.is_running()).await);
}

#[tokio::test]
async fn test_start_is_idempotent() {
    let broadcaster = broadcaster();

    let subscribers: Vec<_> = (0..3).map(|_| broadcaster.subscribe()).collect();

    assert_eq!(broadcaster.subscriber_count(), 3);
    assert_eq!(broadcaster.epoch(), 1);

    for subscriber in &subscribers {
        broadcaster.unsubscribe(subscriber.id());
    }

    assert!(wait_until(|| !broadcaster.is_running()).await);
}

#[tokio::test]
async fn test_unsubscribe_unknown() {
    let broadcaster = broadcaster();

    assert!(!broadcaster.unsubscribe(1234));
    assert!(!broadcaster.is_running());

    let subscriber = broadcaster.subscribe();
    assert!(broadcaster.unsubscribe(subscriber.id()));
    assert!(!broadcaster.unsubscribe(subscriber.id()));
}

#[tokio::test]
async fn test_slow_subscriber_dropped() {
    let broadcaster = broadcaster();

    let mut slow = broadcaster.subscribe();
    let mut active = broadcaster.subscribe();

    let mut received = 0;
    while broadcaster.subscriber_count() > 1 {
        let payload = tokio::time::timeout(Duration::from_secs(1), active.recv())
            .await
            .unwrap();
        assert!(payload.is_some());
        received += 1;
    }

    assert!(received > telemetria::consts::QUEUE_SIZE_SUBSCRIBER);

    // The active subscriber keeps receiving.
    let payload = tokio::time::timeout(Duration::from_secs(1), active.recv()).await;
    assert!(matches!(payload, Ok(Some(_))));

    // The slow subscriber drains its queue, then sees the end of stream.
    let mut backlog = 0;
    while slow.recv().await.is_some() {
        backlog += 1;
    }
    assert_eq!(backlog, telemetria::consts::QUEUE_SIZE_SUBSCRIBER);

    broadcaster.unsubscribe(active.id());
    assert!(wait_until(|| !broadcaster.is_running()).await);
}

#[tokio::test]
async fn test_generation_fault_stops_loop() {
    let mut rng = StdRng::seed_from_u64(42);
    let identity = IdentityProvider::new(Some(IMEI), None, false, &mut rng).unwrap();

    // Odometer beyond the wire range fails validation on every tick.
    let state = VehicleState {
        odometer_total: u32::MAX,
        ..Default::default()
    };
    let generator = TelemetryGenerator::with_state(identity, state, rng);
    let broadcaster = Arc::new(Broadcaster::new(generator, INTERVAL));

    let mut subscriber = broadcaster.subscribe();
    assert_eq!(broadcaster.epoch(), 1);

    let received = tokio::time::timeout(INTERVAL * 5, subscriber.recv()).await;
    assert!(received.is_err());

    assert!(wait_until(|| !broadcaster.is_running()).await);
    assert_eq!(broadcaster.subscriber_count(), 1);

    let _late = broadcaster.subscribe();
    assert_eq!(broadcaster.epoch(), 2);
    assert!(broadcaster.is_running());
}

#[tokio::test]
async fn test_closed_subscriber_dropped() {
    let broadcaster = broadcaster();

    let mut active = broadcaster.subscribe();
    let closed = broadcaster.subscribe();
    assert_eq!(broadcaster.subscriber_count(), 2);

    drop(closed);

    assert!(wait_until(|| broadcaster.subscriber_count() == 1).await);
    assert!(active.recv().await.is_some());
    assert!(broadcaster.is_running());
}
