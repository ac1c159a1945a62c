//! Towns of the bus line and the direction of a journey

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::BookingError;

/// A stop of the bus line
///
/// Towns are ordered along the line, `A < B < C < D`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Town {
    A,
    B,
    C,
    D,
}

impl Town {
    /// All towns in line order
    pub const ALL: [Town; 4] = [Town::A, Town::B, Town::C, Town::D];

    /// The letter naming this town
    pub fn as_char(self) -> char {
        match self {
            Town::A => 'A',
            Town::B => 'B',
            Town::C => 'C',
            Town::D => 'D',
        }
    }
}

impl TryFrom<char> for Town {
    type Error = BookingError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'A' => Ok(Town::A),
            'B' => Ok(Town::B),
            'C' => Ok(Town::C),
            'D' => Ok(Town::D),
            _ => Err(BookingError::invalid_towns()),
        }
    }
}

impl fmt::Display for Town {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl Serialize for Town {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.as_char())
    }
}

/// Direction of travel, each direction has its own seats
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    /// From `A` towards `D`
    Up,
    /// From `D` towards `A`
    Down,
}

/// Derive the direction of a journey from `origin` to `destination`.
pub fn direction(origin: Town, destination: Town) -> Result<Direction, BookingError> {
    if origin < destination {
        Ok(Direction::Up)
    } else if origin > destination {
        Ok(Direction::Down)
    } else {
        Err(BookingError::same_town())
    }
}

/// A validated journey between two distinct towns
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Route {
    pub origin: Town,
    pub destination: Town,
    pub direction: Direction,
}

impl Route {
    /// Validate a pair of town letters.
    ///
    /// Unknown letters are reported before equal ones.
    pub fn parse(origin: char, destination: char) -> Result<Self, BookingError> {
        let origin = Town::try_from(origin)?;
        let destination = Town::try_from(destination)?;
        Self::new(origin, destination)
    }

    pub fn new(origin: Town, destination: Town) -> Result<Self, BookingError> {
        let direction = direction(origin, destination)?;
        Ok(Self {
            origin,
            destination,
            direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_is_up_iff_origin_precedes_destination() {
        for origin in Town::ALL {
            for destination in Town::ALL {
                let result = direction(origin, destination);
                if origin == destination {
                    assert_eq!(result, Err(BookingError::same_town()));
                } else if origin < destination {
                    assert_eq!(result, Ok(Direction::Up));
                } else {
                    assert_eq!(result, Ok(Direction::Down));
                }
            }
        }
    }

    #[test]
    fn unknown_towns_are_rejected() {
        let err = Route::parse('X', 'Z').unwrap_err();
        assert_eq!(err.to_string(), "Invalid origin or destination");
        assert!(Route::parse('A', 'e').is_err());
        assert!(Route::parse('a', 'B').is_err());
    }

    #[test]
    fn same_town_is_rejected() {
        let err = Route::parse('C', 'C').unwrap_err();
        assert_eq!(err.to_string(), "Invalid origin or destination selection");
    }

    #[test]
    fn route_keeps_towns_and_direction() {
        let route = Route::parse('D', 'B').unwrap();
        assert_eq!(route.origin, Town::D);
        assert_eq!(route.destination, Town::B);
        assert_eq!(route.direction, Direction::Down);
    }
}
