//! 🏗 Infrastructure for handling booking requests, etc.
#![warn(missing_docs)]

mod request;

pub use request::{
    RawRequest, Request, RequestHandler, RequestKind, RequestMethod, TicketReservationRequest,
};

/// Configuration of the booking system
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    /// Reject reservations whose body does not carry `"priceConfirmation": true`
    pub require_price_confirmation: bool,
}
