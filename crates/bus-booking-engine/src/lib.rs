//! :bus: Seat reservation for the bus line `A`–`B`–`C`–`D`.
//!
//! The system is made of the [route] model, the [pricing] table, the seat
//! [inventory], the concurrency [gate] guarding it, the reservation [engine],
//! and the request handler, the [balancer].

#![allow(rustdoc::private_intra_doc_links)]

pub mod balancer;
pub mod engine;
pub mod error;
pub mod gate;
pub mod inventory;
pub mod pricing;
pub mod route;

pub use balancer::Balancer;
use bus_booking_core::Config;
pub use engine::{AvailabilityAndPrice, ReservationEngine, TicketReservation};
pub use error::BookingError;
use inventory::SeatInventory;
pub use route::{Direction, Town};

/// Entrypoint of the booking system
///
/// Creates the seats of both directions and hands them to a new engine behind
/// the returned [`Balancer`].
pub fn launch(config: &Config) -> Balancer {
    let engine = ReservationEngine::new(SeatInventory::new());
    Balancer::new(engine, *config)
}
