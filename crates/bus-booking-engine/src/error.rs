//! Errors reported to callers of the reservation engine

use thiserror::Error;

/// Reasons for refusing a booking request
///
/// All kinds are caused by the caller's input. None of them leaves a partial
/// reservation behind.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BookingError {
    /// Non-positive passenger count or malformed request
    #[error("{0}")]
    InvalidRequest(String),

    /// Unknown town, or origin equal to destination
    #[error("{0}")]
    InvalidRoute(String),

    /// Fewer seats available than passengers requested
    #[error("{}", capacity_message(.available))]
    InsufficientCapacity {
        /// Number of seats available for the requested journey
        available: usize,
    },

    /// The ticket counter cannot number every requested seat
    #[error("Sorry! No ticket numbers left")]
    TicketsExhausted,
}

fn capacity_message(available: &usize) -> String {
    match available {
        0 => String::from("Sorry! No seats available"),
        n => format!("Sorry! Only {n} seats available"),
    }
}

impl BookingError {
    pub(crate) fn invalid_towns() -> Self {
        Self::InvalidRoute(String::from("Invalid origin or destination"))
    }

    pub(crate) fn same_town() -> Self {
        Self::InvalidRoute(String::from("Invalid origin or destination selection"))
    }
}
