pub mod seat;
pub mod venue;

pub use seat::{ClientId, SeatId, SeatSnapshot, SeatState};
pub use venue::{CategoryLayout, VenueLayout, ZoneLayout};
