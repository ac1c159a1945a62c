//! Implementation of the request handler in front of the engine
use bus_booking_core::{Config, Request, RequestHandler, RequestKind, TicketReservationRequest};
use serde::Serialize;
use tracing::{info, warn};

use crate::engine::ReservationEngine;
use crate::error::BookingError;

/// Maps booking requests onto [`ReservationEngine`] operations
///
/// ⚠️ This struct implements the [`RequestHandler`] trait and is shared by all
/// request handling threads of the server.
pub struct Balancer {
    engine: ReservationEngine,
    config: Config,
}

impl Balancer {
    /// Create a new [`Balancer`]
    pub fn new(engine: ReservationEngine, config: Config) -> Self {
        Self { engine, config }
    }

    /// Get the engine serving the requests
    pub fn engine(&self) -> &ReservationEngine {
        &self.engine
    }

    fn check_availability_and_price(&self, rq: &Request) -> Result<String, BookingError> {
        let passengers = rq
            .query_param("numberOfPassengers")
            .and_then(|v| v.parse::<i64>().ok());
        let origin = rq.query_param("origin").as_deref().and_then(single_char);
        let destination = rq.query_param("destination").as_deref().and_then(single_char);
        let (Some(passengers), Some(origin), Some(destination)) = (passengers, origin, destination)
        else {
            return Err(BookingError::InvalidRequest(String::from(
                "Missing or malformed request parameters",
            )));
        };

        let quote = self
            .engine
            .check_availability_and_price(passengers, origin, destination)?;
        Ok(to_json(&quote))
    }

    fn reserve_tickets(&self, rq: &mut Request) -> Result<String, BookingError> {
        let invalid = || BookingError::InvalidRequest(String::from("Invalid reservation request"));
        let body: TicketReservationRequest = rq.read_json().ok_or_else(invalid)?;
        if self.config.require_price_confirmation && !body.price_confirmation {
            return Err(BookingError::InvalidRequest(String::from(
                "Price must be confirmed before reserving",
            )));
        }

        let reservation =
            self.engine
                .reserve_tickets(body.passenger_count, body.origin, body.destination)?;
        Ok(to_json(&reservation))
    }
}

/// Query values are expected to be a single town letter
fn single_char(value: &str) -> Option<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    // Responses only hold strings and numbers, serializing cannot fail.
    serde_json::to_string(value).unwrap_or_default()
}

impl RequestHandler for Balancer {
    fn handle(&self, mut rq: Request) {
        let result = match rq.kind() {
            RequestKind::CheckAvailabilityAndPrice => self.check_availability_and_price(&rq),
            RequestKind::ReserveTickets => self.reserve_tickets(&mut rq),
            RequestKind::Debug => {
                rq.respond_with_string("Happy Debugging! 🚫🐛");
                return;
            }
        };

        match result {
            Ok(json) => {
                info!(customer = %rq.customer_id(), kind = ?rq.kind(), "Request served");
                rq.respond_with_json(json)
            }
            Err(err) => {
                warn!(customer = %rq.customer_id(), kind = ?rq.kind(), %err, "Request rejected");
                rq.respond_with_err(err.to_string())
            }
        }
    }

    fn shutdown(self) {
        // the inventory is volatile, nothing to flush
        info!("Booking system shut down");
    }
}
