//! Авторитетное хранилище мест.
//!
//! Единственный способ изменить место — `conditional_update` с ожидаемой
//! версией, как UPDATE ... WHERE version = $n. Прямой read-modify-write
//! снаружи невозможен, поэтому устаревшее чтение никогда молча не
//! перетирает более новую запись.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::EngineError;
use crate::models::{ClientId, SeatId, SeatSnapshot, SeatState, VenueLayout};

/// Изменяемая часть записи. Зона и категория лежат рядом как
/// неизменяемые атрибуты и в блокировке не нуждаются.
#[derive(Debug)]
struct SeatRecord {
    state: SeatState,
    version: u64,
    holder: Option<ClientId>,
}

struct SeatEntry {
    zone: String,
    category: String,
    record: Mutex<SeatRecord>,
}

pub struct SeatStore {
    /// Состав зала фиксируется при загрузке, поэтому внешний замок на
    /// всю таблицу не нужен: запись по месту S конкурирует только с
    /// другими записями по S.
    seats: HashMap<SeatId, SeatEntry>,
    /// Порядок провизии — для стабильного листинга и снапшотов.
    order: Vec<SeatId>,
}

impl SeatStore {
    pub fn provision(layout: &VenueLayout) -> Self {
        let mut seats = HashMap::new();
        let mut order = Vec::new();
        for category in &layout.categories {
            for zone in &category.zones {
                for seat_id in &zone.seats {
                    seats.insert(
                        *seat_id,
                        SeatEntry {
                            zone: zone.name.clone(),
                            category: category.name.clone(),
                            record: Mutex::new(SeatRecord {
                                state: SeatState::Free,
                                version: 0,
                                holder: None,
                            }),
                        },
                    );
                    order.push(*seat_id);
                }
            }
        }
        SeatStore { seats, order }
    }

    pub fn get(&self, seat_id: SeatId) -> Result<SeatSnapshot, EngineError> {
        let entry = self.seats.get(&seat_id).ok_or(EngineError::NotFound)?;
        let record = entry.record.lock().unwrap();
        Ok(snapshot_of(seat_id, entry, &record))
    }

    /// Единственный примитив мутации. Успех только если версия записи
    /// совпала с ожидаемой; версия строго растёт на каждом коммите.
    pub fn conditional_update(
        &self,
        seat_id: SeatId,
        expected_version: u64,
        new_state: SeatState,
        new_holder: Option<ClientId>,
    ) -> Result<SeatSnapshot, EngineError> {
        let entry = self.seats.get(&seat_id).ok_or(EngineError::NotFound)?;
        let mut record = entry.record.lock().unwrap();
        if record.version != expected_version {
            return Err(EngineError::VersionConflict);
        }
        record.state = new_state;
        record.holder = new_holder;
        record.version += 1;
        Ok(snapshot_of(seat_id, entry, &record))
    }

    /// Read-committed снимок всего зала. Не блокирует мутации: каждый
    /// замок держится ровно на время копирования одной записи.
    pub fn snapshot(&self) -> Vec<SeatSnapshot> {
        self.order
            .iter()
            .filter_map(|seat_id| self.get(*seat_id).ok())
            .collect()
    }

    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }
}

fn snapshot_of(seat_id: SeatId, entry: &SeatEntry, record: &SeatRecord) -> SeatSnapshot {
    SeatSnapshot {
        id: seat_id,
        zone: entry.zone.clone(),
        category: entry.category.clone(),
        state: record.state,
        version: record.version,
        holder: record.holder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn store() -> SeatStore {
        SeatStore::provision(&VenueLayout::demo())
    }

    #[test]
    fn provisioned_seats_start_free_at_version_zero() {
        let store = store();
        assert_eq!(store.seat_count(), 360);
        let seat = store.get(1).unwrap();
        assert_eq!(seat.state, SeatState::Free);
        assert_eq!(seat.version, 0);
        assert_eq!(seat.holder, None);
        assert_eq!(seat.category, "General");
        assert_eq!(seat.zone, "Norte");
    }

    #[test]
    fn unknown_seat_is_not_found() {
        let store = store();
        assert_eq!(store.get(9999), Err(EngineError::NotFound));
        assert_eq!(
            store.conditional_update(9999, 0, SeatState::Held, Some(Uuid::new_v4())),
            Err(EngineError::NotFound)
        );
    }

    #[test]
    fn conditional_update_increments_version() {
        let store = store();
        let holder = Uuid::new_v4();

        let committed = store
            .conditional_update(7, 0, SeatState::Held, Some(holder))
            .unwrap();
        assert_eq!(committed.state, SeatState::Held);
        assert_eq!(committed.version, 1);
        assert_eq!(committed.holder, Some(holder));

        let committed = store.conditional_update(7, 1, SeatState::Free, None).unwrap();
        assert_eq!(committed.version, 2);
    }

    #[test]
    fn stale_version_is_rejected_without_mutation() {
        let store = store();
        let holder = Uuid::new_v4();
        store
            .conditional_update(7, 0, SeatState::Held, Some(holder))
            .unwrap();

        // Второй писатель с тем же ожидаемым version = 0 проигрывает.
        let err = store.conditional_update(7, 0, SeatState::Held, Some(Uuid::new_v4()));
        assert_eq!(err, Err(EngineError::VersionConflict));

        let seat = store.get(7).unwrap();
        assert_eq!(seat.holder, Some(holder));
        assert_eq!(seat.version, 1);
    }

    #[test]
    fn snapshot_preserves_provisioning_order() {
        let store = store();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 360);
        let ids: Vec<_> = snapshot.iter().map(|s| s.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted); // demo venue numbers seats sequentially
    }
}
