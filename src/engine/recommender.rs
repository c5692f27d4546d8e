//! Рекомендация зон: "найди мне N свободных мест рядом".
//!
//! Считает свободные места по зонам категории на read-committed снимке,
//! отбрасывает зоны теснее запрошенного количества и сортирует по
//! возрастанию остатка — tightest-fit-first, чтобы добивать почти
//! полные зоны раньше, чем размазывать спрос. Стабильная сортировка:
//! при равенстве остатка зоны сохраняют порядок провизии.

use serde::Serialize;

use crate::error::EngineError;
use crate::models::{SeatState, VenueLayout};

use super::store::SeatStore;

const MAX_SUGGESTIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneAvailability {
    pub zone: String,
    pub available_seats: usize,
}

pub fn recommend(
    venue: &VenueLayout,
    store: &SeatStore,
    category: &str,
    quantity: i64,
) -> Result<Vec<ZoneAvailability>, EngineError> {
    if quantity <= 0 {
        return Err(EngineError::InvalidArgument(
            "quantity must be positive".to_string(),
        ));
    }
    let category = venue.category(category).ok_or(EngineError::NotFound)?;

    let mut zones: Vec<ZoneAvailability> = category
        .zones
        .iter()
        .map(|zone| ZoneAvailability {
            zone: zone.name.clone(),
            available_seats: zone
                .seats
                .iter()
                .filter(|seat_id| {
                    matches!(store.get(**seat_id), Ok(s) if s.state == SeatState::Free)
                })
                .count(),
        })
        .filter(|z| z.available_seats >= quantity as usize)
        .collect();

    // Vec::sort_by_key стабилен — явная, проверяемая деталь контракта.
    zones.sort_by_key(|z| z.available_seats);
    zones.truncate(MAX_SUGGESTIONS);
    Ok(zones)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryLayout, ZoneLayout};
    use uuid::Uuid;

    /// Зал с одной категорией и зонами заданных размеров, в заданном
    /// порядке.
    fn venue(zones: &[(&str, i64)]) -> VenueLayout {
        let mut next_id = 1;
        VenueLayout {
            categories: vec![CategoryLayout {
                name: "General".to_string(),
                zones: zones
                    .iter()
                    .map(|(name, count)| {
                        let seats = (next_id..next_id + count).collect();
                        next_id += count;
                        ZoneLayout { name: name.to_string(), seats }
                    })
                    .collect(),
            }],
        }
    }

    fn hold_seats(store: &SeatStore, seat_ids: &[i64]) {
        let client = Uuid::new_v4();
        for seat_id in seat_ids {
            store
                .conditional_update(*seat_id, 0, SeatState::Held, Some(client))
                .unwrap();
        }
    }

    #[test]
    fn ties_keep_provisioning_order() {
        // A(5 free), B(5 free), C(3 free): C теснее и идёт первой,
        // A и B при равенстве сохраняют исходный порядок.
        let venue = venue(&[("A", 5), ("B", 5), ("C", 3)]);
        let store = SeatStore::provision(&venue);

        let zones = recommend(&venue, &store, "General", 3).unwrap();
        let names: Vec<_> = zones.iter().map(|z| z.zone.as_str()).collect();
        assert_eq!(names, ["C", "A", "B"]);
        assert_eq!(zones[0].available_seats, 3);
        assert_eq!(zones[1].available_seats, 5);
    }

    #[test]
    fn zones_below_quantity_are_discarded() {
        let venue = venue(&[("A", 5), ("B", 2)]);
        let store = SeatStore::provision(&venue);

        let zones = recommend(&venue, &store, "General", 3).unwrap();
        let names: Vec<_> = zones.iter().map(|z| z.zone.as_str()).collect();
        assert_eq!(names, ["A"]);
    }

    #[test]
    fn no_qualifying_zone_is_empty_not_error() {
        let venue = venue(&[("A", 5), ("B", 4)]);
        let store = SeatStore::provision(&venue);
        assert_eq!(recommend(&venue, &store, "General", 10).unwrap(), vec![]);
    }

    #[test]
    fn held_and_sold_seats_do_not_count_as_available() {
        let venue = venue(&[("A", 5)]);
        let store = SeatStore::provision(&venue);
        hold_seats(&store, &[1, 2, 3]);

        let zones = recommend(&venue, &store, "General", 2).unwrap();
        assert_eq!(zones[0].available_seats, 2);
        assert_eq!(recommend(&venue, &store, "General", 3).unwrap(), vec![]);
    }

    #[test]
    fn non_positive_quantity_is_invalid() {
        let venue = venue(&[("A", 5)]);
        let store = SeatStore::provision(&venue);
        assert!(matches!(
            recommend(&venue, &store, "General", 0),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(matches!(
            recommend(&venue, &store, "General", -2),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn unknown_category_is_not_found() {
        let venue = venue(&[("A", 5)]);
        let store = SeatStore::provision(&venue);
        assert_eq!(
            recommend(&venue, &store, "Platea", 1),
            Err(EngineError::NotFound)
        );
    }

    #[test]
    fn at_most_three_zones_are_returned() {
        let venue = venue(&[("A", 9), ("B", 8), ("C", 7), ("D", 6), ("E", 5)]);
        let store = SeatStore::provision(&venue);
        let zones = recommend(&venue, &store, "General", 1).unwrap();
        let names: Vec<_> = zones.iter().map(|z| z.zone.as_str()).collect();
        assert_eq!(names, ["E", "D", "C"]);
    }
}
