//! Seat inventory of both directions of the bus line

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::BookingError;
use crate::route::{Direction, Route, Town};

/// Number of seat rows, labelled `A` to `D`
pub const ROWS: usize = 4;
/// Number of seats per row, numbered from 1
pub const COLUMNS: usize = 10;
/// Number of seats per direction
pub const SEATS: usize = ROWS * COLUMNS;

const ROW_LABELS: [char; ROWS] = ['A', 'B', 'C', 'D'];

/// Position of a seat in the bus
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Seat {
    row: u8,
    column: u8,
}

impl Seat {
    fn new(row: usize, column: usize) -> Self {
        debug_assert!(row < ROWS && column < COLUMNS);
        Self {
            row: row as u8,
            column: column as u8,
        }
    }

    /// Label of the seat, e.g. `A1`
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ROW_LABELS[self.row as usize], self.column + 1)
    }
}

impl Serialize for Seat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ticket and segment currently occupying a seat
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Reservation {
    /// Always positive
    pub ticket: u64,
    pub origin: Town,
    pub destination: Town,
}

/// Reservation state of one seat in one direction
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Slot {
    seat: Seat,
    reservation: Option<Reservation>,
}

impl Slot {
    fn vacant(seat: Seat) -> Self {
        Self {
            seat,
            reservation: None,
        }
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn reservation(&self) -> Option<&Reservation> {
        self.reservation.as_ref()
    }

    /// Ticket number of the latest reservation, `0` if never reserved
    pub fn ticket_number(&self) -> u64 {
        self.reservation.map_or(0, |r| r.ticket)
    }

    /// Whether a passenger boarding at `route.origin` may take this seat.
    ///
    /// Only the latest segment is compared, and only against the new boarding
    /// town. The seat is free once the previous occupant has left the bus at
    /// or before the new boarding town.
    pub fn is_available_for(&self, route: &Route) -> bool {
        match &self.reservation {
            None => true,
            Some(existing) => match route.direction {
                Direction::Up => existing.destination <= route.origin,
                Direction::Down => route.origin <= existing.destination,
            },
        }
    }
}

/// Both seat matrices plus the ticket counter
///
/// The inventory does no locking of its own; share it behind a
/// [`Gate`](crate::gate::Gate).
#[derive(Clone, Debug)]
pub struct SeatInventory {
    up: [[Slot; COLUMNS]; ROWS],
    down: [[Slot; COLUMNS]; ROWS],
    /// Last ticket number handed out, `0` before the first reservation
    last_ticket: u64,
}

impl Default for SeatInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl SeatInventory {
    /// Create a new [`SeatInventory`] with all seats vacant.
    pub fn new() -> Self {
        let matrix = || -> [[Slot; COLUMNS]; ROWS] {
            std::array::from_fn(|r| std::array::from_fn(|c| Slot::vacant(Seat::new(r, c))))
        };
        Self {
            up: matrix(),
            down: matrix(),
            last_ticket: 0,
        }
    }

    /// Get the last ticket number handed out.
    pub fn last_ticket(&self) -> u64 {
        self.last_ticket
    }

    /// Iterate over the slots of `direction` in scan order (`A1..A10`, `B1..`).
    pub fn all_slots(&self, direction: Direction) -> impl Iterator<Item = &Slot> {
        self.matrix(direction).iter().flatten()
    }

    fn matrix(&self, direction: Direction) -> &[[Slot; COLUMNS]; ROWS] {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        }
    }

    fn matrix_mut(&mut self, direction: Direction) -> &mut [[Slot; COLUMNS]; ROWS] {
        match direction {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
        }
    }

    /// Seats a passenger travelling `route` could take, in scan order.
    pub fn available_seats(&self, route: &Route) -> Vec<Seat> {
        self.all_slots(route.direction)
            .filter(|slot| slot.is_available_for(route))
            .map(Slot::seat)
            .collect()
    }

    /// Reserve the first `passengers` available seats for `route`.
    ///
    /// Each seat takes the next ticket number. Either all seats are reserved
    /// or, if too few seats or ticket numbers are left, none.
    pub fn allocate(
        &mut self,
        route: &Route,
        passengers: usize,
    ) -> Result<Vec<(u64, Seat)>, BookingError> {
        let available = self
            .all_slots(route.direction)
            .filter(|slot| slot.is_available_for(route))
            .count();
        if available < passengers {
            return Err(BookingError::InsufficientCapacity { available });
        }
        if self.last_ticket.checked_add(passengers as u64).is_none() {
            return Err(BookingError::TicketsExhausted);
        }

        let mut ticket = self.last_ticket;
        let mut allocated = Vec::with_capacity(passengers);
        let free = self
            .matrix_mut(route.direction)
            .iter_mut()
            .flatten()
            .filter(|slot| slot.is_available_for(route));
        for slot in free.take(passengers) {
            ticket += 1;
            slot.reservation = Some(Reservation {
                ticket,
                origin: route.origin,
                destination: route.destination,
            });
            allocated.push((ticket, slot.seat));
        }
        self.last_ticket = ticket;
        Ok(allocated)
    }
}
