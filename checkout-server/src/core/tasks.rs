//! Background tasks.
//!
//! One periodic worker: the reservation sweep. Expired holds are already
//! invisible to every read path, so the sweep only keeps the table from
//! growing; a missed tick costs nothing but disk.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::core::ServerState;

pub fn spawn_reservation_sweep(state: ServerState) -> JoinHandle<()> {
    let period = Duration::from_secs(state.config.reservation_sweep_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // First tick fires immediately; skip it so startup stays quiet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match state.reservations.purge_expired().await {
                Ok(purged) if purged > 0 => {
                    tracing::info!(purged, "Reservation sweep");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Reservation sweep failed");
                }
            }
        }
    })
}
