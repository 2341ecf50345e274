use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use telemetria::service::Broadcaster;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Clone)]
pub(crate) struct ServerState {
    /// Telemetry broadcaster.
    pub broadcaster: Arc<Broadcaster>,
    /// Connection limiter.
    pub semaphore: Arc<Semaphore>,
}

pub(crate) fn router(state: ServerState) -> Router {
    Router::new()
        .route(telemetria::consts::TELEMETRY_PATH, get(telemetry_upgrade))
        .with_state(state)
}

/// Periodically report the connection and broadcast status.
pub(crate) async fn status_report(state: ServerState, max_connections: usize) {
    let mut interval = tokio::time::interval(telemetria::consts::STATUS_INTERVAL);

    loop {
        interval.tick().await;

        let connections = max_connections.saturating_sub(state.semaphore.available_permits());
        log::debug!(
            "Connections: {}/{}, subscribers: {}, broadcast {}",
            connections,
            max_connections,
            state.broadcaster.subscriber_count(),
            if state.broadcaster.is_running() {
                "running"
            } else {
                "idle"
            }
        );
    }
}

async fn telemetry_upgrade(ws: WebSocketUpgrade, State(state): State<ServerState>) -> Response {
    let permit = match state.semaphore.clone().try_acquire_owned() {
        Ok(permit) => permit,
        Err(_) => {
            log::warn!("Too many connections");
            return StatusCode::SERVICE_UNAVAILABLE.into_response();
        }
    };

    ws.on_upgrade(move |socket| client_session(socket, state.broadcaster, permit))
}

async fn client_session(
    mut socket: WebSocket,
    broadcaster: Arc<Broadcaster>,
    _permit: OwnedSemaphorePermit,
) {
    let mut subscriber = broadcaster.subscribe();

    loop {
        tokio::select! {
            payload = subscriber.recv() => {
                let Some(payload) = payload else {
                    log::debug!("Subscriber {} was dropped by broadcaster", subscriber.id());
                    break;
                };

                let message = Message::Text(payload.to_string().into());

                match tokio::time::timeout(telemetria::consts::SEND_TIMEOUT, socket.send(message)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        log::warn!("Failed to send packet: {}", e);
                        break;
                    }
                    Err(_) => {
                        log::warn!("Send timeout for subscriber {}", subscriber.id());
                        break;
                    }
                }
            }
            message = socket.recv() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        log::debug!("Message received from client: {}", text.as_str());
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        log::debug!("Client disconnected");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        log::warn!("Client connection error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    broadcaster.unsubscribe(subscriber.id());
}

#[cfg(test)]
mod tests {
    use super::*;

    use telemetria::{
        identity::IdentityProvider,
        rand::{rngs::StdRng, SeedableRng},
        simulator::TelemetryGenerator,
        RuntimeContext,
    };

    fn state() -> ServerState {
        let mut rng = StdRng::seed_from_u64(7);
        let identity =
            IdentityProvider::new(Some("352099001761481"), None, false, &mut rng).unwrap();
        let generator = TelemetryGenerator::with_rng(identity, rng);

        ServerState {
            broadcaster: Arc::new(Broadcaster::new(
                generator,
                std::time::Duration::from_millis(20),
            )),
            semaphore: Arc::new(Semaphore::new(2)),
        }
    }

    #[tokio::test]
    async fn test_status_report_stops_on_shutdown() {
        let runtime = RuntimeContext::new();
        let state = state();

        let _permit = state.semaphore.clone().try_acquire_owned().unwrap();
        assert_eq!(state.semaphore.available_permits(), 1);

        let (tx, mut rx) = tokio::sync::mpsc::channel::<()>(1);
        let report = status_report(state.clone(), 2);

        runtime.spawn_background_task(async move {
            let _tx = tx;
            report.await;
        });

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let shutdown = runtime.wait_for_shutdown();
        runtime.shutdown.0.send(()).ok();
        shutdown.await;

        assert!(rx.recv().await.is_none());
        assert!(!state.broadcaster.is_running());
    }
}
