//! Координатор бронирования.
//!
//! Каждая мутация — цикл read/validate/conditional-update: читаем
//! снимок места, проверяем переход по таблице, пишем с ожидаемой
//! версией. Проигранный CAS повторяется по свежей записи, поэтому из
//! двух одновременных select ровно один получает место, второй —
//! честный `Conflict`. Мутации разных мест не конкурируют вообще.

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{ClientId, SeatId, SeatSnapshot, VenueLayout};

use super::broadcaster::{ChangeBroadcaster, SeatDelta};
use super::recommender::{self, ZoneAvailability};
use super::store::SeatStore;
use super::transitions::{self, Intent, Next};

/// Под нагрузкой проигравший CAS обычно разрешается в терминальный
/// исход (Conflict/Forbidden) уже на второй итерации; лимит — защита
/// от бесконечного живого соперничества.
const MAX_CAS_RETRIES: u32 = 8;

/// Исход одной позиции батч-операции. Никакого неявного
/// всё-или-ничего: каждая строка — независимый compare-and-set.
#[derive(Debug)]
pub struct SeatOutcome {
    pub seat_id: SeatId,
    pub result: Result<SeatSnapshot, EngineError>,
}

pub struct ReservationEngine {
    store: SeatStore,
    venue: VenueLayout,
    broadcaster: ChangeBroadcaster,
}

impl ReservationEngine {
    pub fn new(venue: VenueLayout) -> Self {
        let store = SeatStore::provision(&venue);
        info!("reservation engine provisioned with {} seats", store.seat_count());
        ReservationEngine {
            store,
            venue,
            broadcaster: ChangeBroadcaster::new(),
        }
    }

    /// Попытка Free -> Held. `Conflict`, если место уже у другого.
    pub fn select(&self, seat_id: SeatId, client: ClientId) -> Result<SeatSnapshot, EngineError> {
        self.mutate(seat_id, client, Intent::Select)
    }

    /// Попытка Held -> Free, только для текущего держателя.
    pub fn deselect(&self, seat_id: SeatId, client: ClientId) -> Result<SeatSnapshot, EngineError> {
        self.mutate(seat_id, client, Intent::Release)
    }

    /// Held -> Sold для каждого места независимо. Откатов нет:
    /// компенсация частичного успеха — забота вызывающего слоя.
    pub fn commit_purchase(&self, seat_ids: &[SeatId], client: ClientId) -> Vec<SeatOutcome> {
        self.mutate_batch(seat_ids, client, Intent::Commit)
    }

    /// Best-effort Held -> Free для батча (платёж не прошёл).
    pub fn cancel_hold(&self, seat_ids: &[SeatId], client: ClientId) -> Vec<SeatOutcome> {
        self.mutate_batch(seat_ids, client, Intent::Release)
    }

    pub fn get_seat(&self, seat_id: SeatId) -> Result<SeatSnapshot, EngineError> {
        self.store.get(seat_id)
    }

    pub fn list_seats(&self) -> Vec<SeatSnapshot> {
        self.store.snapshot()
    }

    pub fn recommend(
        &self,
        category: &str,
        quantity: i64,
    ) -> Result<Vec<ZoneAvailability>, EngineError> {
        recommender::recommend(&self.venue, &self.store, category, quantity)
    }

    pub fn subscribe(&self) -> (Uuid, tokio::sync::mpsc::UnboundedReceiver<SeatDelta>) {
        self.broadcaster.subscribe()
    }

    pub fn unsubscribe(&self, id: Uuid) {
        self.broadcaster.unsubscribe(id);
    }

    pub fn venue(&self) -> &VenueLayout {
        &self.venue
    }

    fn mutate(
        &self,
        seat_id: SeatId,
        client: ClientId,
        intent: Intent,
    ) -> Result<SeatSnapshot, EngineError> {
        for attempt in 0..MAX_CAS_RETRIES {
            let seat = self.store.get(seat_id)?;
            match transitions::next(seat.state, seat.holder, intent, client)? {
                // Идемпотентный повтор: успех без записи и без эха.
                Next::Noop => return Ok(seat),
                Next::Apply { state, holder } => {
                    match self.store.conditional_update(seat_id, seat.version, state, holder) {
                        Ok(committed) => {
                            debug!(
                                seat_id,
                                state = committed.state.as_str(),
                                version = committed.version,
                                "seat transition committed"
                            );
                            self.broadcaster.publish(&committed);
                            return Ok(committed);
                        }
                        Err(EngineError::VersionConflict) => {
                            debug!(seat_id, attempt, "lost conditional update, re-reading");
                            continue;
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }
        // Ретраи кончились: кто-то стабильно успевает раньше нас.
        Err(EngineError::Conflict)
    }

    fn mutate_batch(
        &self,
        seat_ids: &[SeatId],
        client: ClientId,
        intent: Intent,
    ) -> Vec<SeatOutcome> {
        seat_ids
            .iter()
            .map(|seat_id| SeatOutcome {
                seat_id: *seat_id,
                result: self.mutate(*seat_id, client, intent),
            })
            .collect()
    }
}
