//! Фан-аут закоммиченных изменений всем подписчикам.
//!
//! Реестр подписчиков живёт под собственным замком, не связанным с
//! замками мест: публикация никогда не блокирует переходы и наоборот.
//! Доставка at-least-once на время жизни подписки; отключившийся
//! подписчик просто перестаёт получать события, лога повторов нет.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{SeatId, SeatSnapshot, SeatState};

/// Дельта, которую видит каждый подписчик, включая инициатора
/// изменения — его оптимистичный локальный апдейт подтверждается
/// авторитетным эхом.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatDelta {
    pub seat_id: SeatId,
    pub state: SeatState,
    pub version: u64,
    pub at: DateTime<Utc>,
}

#[derive(Default)]
pub struct ChangeBroadcaster {
    subscribers: Mutex<HashMap<Uuid, mpsc::UnboundedSender<SeatDelta>>>,
}

impl ChangeBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Новый подписчик не получает бэклог — свежий снапшот он забирает
    /// отдельным запросом, дальше идут только события с этого момента.
    pub fn subscribe(&self) -> (Uuid, mpsc::UnboundedReceiver<SeatDelta>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        self.subscribers.lock().unwrap().insert(id, tx);
        debug!("subscriber {} registered", id);
        (id, rx)
    }

    pub fn unsubscribe(&self, id: Uuid) {
        if self.subscribers.lock().unwrap().remove(&id).is_some() {
            debug!("subscriber {} removed", id);
        }
    }

    pub fn publish(&self, committed: &SeatSnapshot) {
        let delta = SeatDelta {
            seat_id: committed.id,
            state: committed.state,
            version: committed.version,
            at: Utc::now(),
        };

        let mut subscribers = self.subscribers.lock().unwrap();
        let mut dead: Vec<Uuid> = Vec::new();
        for (id, tx) in subscribers.iter() {
            if tx.send(delta.clone()).is_err() {
                dead.push(*id);
            }
        }
        for id in dead {
            subscribers.remove(&id);
            debug!("subscriber {} pruned after disconnect", id);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeatState;

    fn committed(seat_id: SeatId, version: u64) -> SeatSnapshot {
        SeatSnapshot {
            id: seat_id,
            zone: "Norte".to_string(),
            category: "General".to_string(),
            state: SeatState::Held,
            version,
            holder: Some(Uuid::new_v4()),
        }
    }

    #[tokio::test]
    async fn every_subscriber_receives_each_delta() {
        let broadcaster = ChangeBroadcaster::new();
        let (_a, mut rx_a) = broadcaster.subscribe();
        let (_b, mut rx_b) = broadcaster.subscribe();

        broadcaster.publish(&committed(7, 1));

        let delta_a = rx_a.recv().await.unwrap();
        let delta_b = rx_b.recv().await.unwrap();
        assert_eq!(delta_a.seat_id, 7);
        assert_eq!(delta_a.version, 1);
        assert_eq!(delta_a.seat_id, delta_b.seat_id);
        assert_eq!(delta_a.version, delta_b.version);
    }

    #[tokio::test]
    async fn dropped_receiver_is_pruned_on_next_publish() {
        let broadcaster = ChangeBroadcaster::new();
        let (_a, rx_a) = broadcaster.subscribe();
        let (_b, mut rx_b) = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 2);

        drop(rx_a);
        broadcaster.publish(&committed(7, 1));
        assert_eq!(broadcaster.subscriber_count(), 1);
        assert_eq!(rx_b.recv().await.unwrap().seat_id, 7);
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let broadcaster = ChangeBroadcaster::new();
        let (id, mut rx) = broadcaster.subscribe();
        broadcaster.unsubscribe(id);
        broadcaster.publish(&committed(7, 1));
        assert!(rx.recv().await.is_none());
    }
}
