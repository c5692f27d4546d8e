use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use super::seat::SeatId;

/// Зал загружается один раз при старте и после этого не меняется:
/// места не создаются, не удаляются и не переезжают между зонами.
#[derive(Debug, Clone, Deserialize)]
pub struct VenueLayout {
    pub categories: Vec<CategoryLayout>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryLayout {
    pub name: String,
    pub zones: Vec<ZoneLayout>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZoneLayout {
    pub name: String,
    /// Порядок мест — порядок блоков в зоне. Важен для рендеринга
    /// и для стабильной сортировки рекомендаций, не для движка.
    pub seats: Vec<SeatId>,
}

impl VenueLayout {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("failed to read venue layout {:?}", path.as_ref()))?;
        let layout: VenueLayout =
            serde_json::from_str(&raw).context("failed to parse venue layout JSON")?;
        layout.validate()?;
        Ok(layout)
    }

    /// Демо-зал: General — четыре зоны по 80 мест (блоки по 20),
    /// VIP — два палко по 20 мест (блоки по 10).
    pub fn demo() -> Self {
        let mut next_id: SeatId = 1;
        let mut zone = |name: &str, count: i64| {
            let seats: Vec<SeatId> = (next_id..next_id + count).collect();
            next_id += count;
            ZoneLayout { name: name.to_string(), seats }
        };

        VenueLayout {
            categories: vec![
                CategoryLayout {
                    name: "General".to_string(),
                    zones: vec![
                        zone("Norte", 80),
                        zone("Sur", 80),
                        zone("Oriente", 80),
                        zone("Poniente", 80),
                    ],
                },
                CategoryLayout {
                    name: "VIP".to_string(),
                    zones: vec![zone("Palco A", 20), zone("Palco B", 20)],
                },
            ],
        }
    }

    /// Каждое место принадлежит ровно одной зоне, каждая зона ровно
    /// одной категории. Дубликат id — ошибка подготовки зала.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen_seats: HashSet<SeatId> = HashSet::new();
        let mut seen_categories: HashSet<&str> = HashSet::new();

        for category in &self.categories {
            if !seen_categories.insert(category.name.as_str()) {
                bail!("duplicate category '{}' in venue layout", category.name);
            }
            let mut seen_zones: HashSet<&str> = HashSet::new();
            for zone in &category.zones {
                if !seen_zones.insert(zone.name.as_str()) {
                    bail!(
                        "duplicate zone '{}' in category '{}'",
                        zone.name,
                        category.name
                    );
                }
                for seat_id in &zone.seats {
                    if !seen_seats.insert(*seat_id) {
                        bail!("seat {} assigned to more than one zone", seat_id);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn category(&self, name: &str) -> Option<&CategoryLayout> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn seat_count(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| &c.zones)
            .map(|z| z.seats.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_layout_is_valid() {
        let layout = VenueLayout::demo();
        assert!(layout.validate().is_ok());
        assert_eq!(layout.seat_count(), 360);
        assert!(layout.category("General").is_some());
        assert!(layout.category("VIP").is_some());
        assert!(layout.category("Platea").is_none());
    }

    #[test]
    fn duplicate_seat_id_is_rejected() {
        let layout = VenueLayout {
            categories: vec![CategoryLayout {
                name: "General".to_string(),
                zones: vec![
                    ZoneLayout { name: "A".to_string(), seats: vec![1, 2] },
                    ZoneLayout { name: "B".to_string(), seats: vec![2, 3] },
                ],
            }],
        };
        assert!(layout.validate().is_err());
    }
}
