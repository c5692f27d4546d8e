pub mod broadcaster;
pub mod coordinator;
pub mod recommender;
pub mod store;
pub mod transitions;

pub use broadcaster::{ChangeBroadcaster, SeatDelta};
pub use coordinator::{ReservationEngine, SeatOutcome};
pub use recommender::ZoneAvailability;
pub use store::SeatStore;
