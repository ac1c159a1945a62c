//! Fares between pairs of towns

use crate::error::BookingError;
use crate::route::Town;

/// Fare per passenger for an unordered pair of distinct towns.
pub fn unit_price(origin: Town, destination: Town) -> Result<u32, BookingError> {
    use Town::*;

    let (low, high) = if origin <= destination {
        (origin, destination)
    } else {
        (destination, origin)
    };
    match (low, high) {
        (A, B) | (B, C) | (C, D) => Ok(50),
        (A, C) | (B, D) => Ok(100),
        (A, D) => Ok(150),
        _ => Err(BookingError::InvalidRoute(String::from("Invalid route"))),
    }
}

/// Fare for `passengers` travelling together.
pub fn total_price(
    origin: Town,
    destination: Town,
    passengers: usize,
) -> Result<f64, BookingError> {
    let unit = unit_price(origin, destination)?;
    Ok(unit as f64 * passengers as f64)
}
