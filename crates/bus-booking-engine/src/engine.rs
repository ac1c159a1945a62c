//! Implementation of the reservation engine

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::BookingError;
use crate::gate::Gate;
use crate::inventory::{SeatInventory, Slot};
use crate::pricing;
use crate::route::{Direction, Route, Town};

/// Answer to an availability query
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityAndPrice {
    pub available_seat_count: usize,
    /// Seat labels in scan order
    pub available_seats: Vec<String>,
    pub total_price: f64,
}

/// Seats reserved by one request
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketReservation {
    /// One ticket per passenger, consecutive
    pub ticket_numbers: Vec<u64>,
    /// Seat of the ticket at the same position
    #[serde(rename = "seatNumbers")]
    pub seat_labels: Vec<String>,
    pub origin: Town,
    pub destination: Town,
    pub total_price: f64,
}

/// Orchestrates validation, availability, pricing and allocation
///
/// All access to the [`SeatInventory`] goes through a [`Gate`]: availability
/// queries scan with shared access, reservations allocate with exclusive
/// access.
#[derive(Debug)]
pub struct ReservationEngine {
    inventory: Gate<SeatInventory>,
}

impl ReservationEngine {
    /// Create a new [`ReservationEngine`] taking ownership of `inventory`.
    pub fn new(inventory: SeatInventory) -> Self {
        info!("Empty seats allocated for both journeys");
        Self {
            inventory: Gate::new(inventory),
        }
    }

    /// Count the seats available between `origin` and `destination` and price
    /// the journey for `passenger_count` passengers.
    pub fn check_availability_and_price(
        &self,
        passenger_count: i64,
        origin: char,
        destination: char,
    ) -> Result<AvailabilityAndPrice, BookingError> {
        info!(
            passenger_count,
            %origin, %destination, "Checking availability and price"
        );
        let passengers = validate_passengers(
            passenger_count,
            "Number of passengers must be greater than zero",
        )?;
        let route = Route::parse(origin, destination)?;

        let available_seats = self.scan_available(&route);
        if available_seats.len() < passengers {
            let err = BookingError::InsufficientCapacity {
                available: available_seats.len(),
            };
            warn!(%err, "Availability check refused");
            return Err(err);
        }

        let total_price = pricing::total_price(route.origin, route.destination, passengers)?;
        Ok(AvailabilityAndPrice {
            available_seat_count: available_seats.len(),
            available_seats,
            total_price,
        })
    }

    /// Reserve `passenger_count` seats between `origin` and `destination`.
    ///
    /// The first available seats in scan order are taken, each with its own
    /// ticket number. If fewer seats are available than requested, nothing is
    /// reserved.
    pub fn reserve_tickets(
        &self,
        passenger_count: i64,
        origin: char,
        destination: char,
    ) -> Result<TicketReservation, BookingError> {
        let passengers = validate_passengers(passenger_count, "Invalid reservation request")?;
        let route = Route::parse(origin, destination)?;
        let total_price = pricing::total_price(route.origin, route.destination, passengers)?;

        // No other reservation can slip in between the check and the
        // allocation, which recounts the seats under exclusive access.
        let allocated = self
            .inventory
            .check_then_mutate(
                |inventory| match inventory.available_seats(&route).len() {
                    available if available < passengers => {
                        Err(BookingError::InsufficientCapacity { available })
                    }
                    _ => Ok(()),
                },
                |inventory, ()| inventory.allocate(&route, passengers),
            )
            .inspect_err(|err| warn!(%err, "Reservation refused"))?;

        let (ticket_numbers, seat_labels): (Vec<u64>, Vec<String>) = allocated
            .into_iter()
            .map(|(ticket, seat)| (ticket, seat.label()))
            .unzip();
        info!(
            passengers,
            %origin,
            %destination,
            ?ticket_numbers,
            ?seat_labels,
            total_price,
            "Reserved tickets"
        );
        Ok(TicketReservation {
            ticket_numbers,
            seat_labels,
            origin: route.origin,
            destination: route.destination,
            total_price,
        })
    }

    /// Labels of the seats available between `origin` and `destination`, in
    /// scan order.
    pub fn available_seats(
        &self,
        origin: char,
        destination: char,
    ) -> Result<Vec<String>, BookingError> {
        let route = Route::parse(origin, destination)?;
        Ok(self.scan_available(&route))
    }

    /// Copy of all slots of `direction` in scan order.
    pub fn snapshot(&self, direction: Direction) -> Vec<Slot> {
        self.inventory
            .scan(|inventory| inventory.all_slots(direction).copied().collect())
    }

    fn scan_available(&self, route: &Route) -> Vec<String> {
        debug!(direction = ?route.direction, "Scanning seats");
        self.inventory.scan(|inventory| {
            inventory
                .available_seats(route)
                .iter()
                .map(|seat| seat.label())
                .collect()
        })
    }
}

impl Default for ReservationEngine {
    fn default() -> Self {
        Self::new(SeatInventory::new())
    }
}

fn validate_passengers(count: i64, message: &str) -> Result<usize, BookingError> {
    if count <= 0 {
        return Err(BookingError::InvalidRequest(message.into()));
    }
    usize::try_from(count).map_err(|_| BookingError::InvalidRequest(message.into()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use rand::Rng;

    use super::*;
    use crate::inventory::SEATS;

    #[test]
    fn fresh_engine_offers_every_seat() {
        let engine = ReservationEngine::default();
        let quote = engine.check_availability_and_price(1, 'A', 'B').unwrap();
        assert_eq!(quote.available_seat_count, 40);
        assert_eq!(quote.available_seats.len(), 40);
        assert_eq!(quote.available_seats[0], "A1");
        assert_eq!(quote.total_price, 50.0);

        let quote = engine.check_availability_and_price(2, 'A', 'B').unwrap();
        assert_eq!(quote.total_price, 100.0);
    }

    #[test]
    fn reservation_consumes_consecutive_tickets() {
        let engine = ReservationEngine::default();
        let reservation = engine.reserve_tickets(3, 'A', 'B').unwrap();
        assert_eq!(reservation.ticket_numbers, vec![1, 2, 3]);
        assert_eq!(reservation.seat_labels, vec!["A1", "A2", "A3"]);
        assert_eq!(reservation.origin, Town::A);
        assert_eq!(reservation.destination, Town::B);
        assert_eq!(reservation.total_price, 150.0);

        let quote = engine.check_availability_and_price(1, 'A', 'B').unwrap();
        assert_eq!(quote.available_seat_count, 37);
        assert_eq!(quote.available_seats[0], "A4");

        let next = engine.reserve_tickets(2, 'D', 'A').unwrap();
        assert_eq!(next.ticket_numbers, vec![4, 5]);
        assert_eq!(next.seat_labels, vec!["A1", "A2"]);
    }

    #[test]
    fn invalid_passenger_counts_are_rejected() {
        let engine = ReservationEngine::default();
        assert_eq!(
            engine.check_availability_and_price(0, 'A', 'B'),
            Err(BookingError::InvalidRequest(
                "Number of passengers must be greater than zero".into()
            ))
        );
        assert_eq!(
            engine.reserve_tickets(-2, 'A', 'B'),
            Err(BookingError::InvalidRequest(
                "Invalid reservation request".into()
            ))
        );
    }

    #[test]
    fn invalid_routes_are_rejected() {
        let engine = ReservationEngine::default();
        let err = engine.check_availability_and_price(2, 'X', 'Z').unwrap_err();
        assert_eq!(err.to_string(), "Invalid origin or destination");
        let err = engine.reserve_tickets(1, 'X', 'B').unwrap_err();
        assert_eq!(err.to_string(), "Invalid origin or destination");
        let err = engine.check_availability_and_price(1, 'B', 'B').unwrap_err();
        assert_eq!(err.to_string(), "Invalid origin or destination selection");
        let err = engine.available_seats('A', 'A').unwrap_err();
        assert_eq!(err.to_string(), "Invalid origin or destination selection");
    }

    #[test]
    fn passenger_count_is_validated_before_route() {
        let engine = ReservationEngine::default();
        let err = engine.reserve_tickets(0, 'X', 'X').unwrap_err();
        assert!(matches!(err, BookingError::InvalidRequest(_)));
    }

    #[test]
    fn overbooking_reserves_nothing() {
        let engine = ReservationEngine::default();
        let err = engine.reserve_tickets(999, 'A', 'B').unwrap_err();
        assert_eq!(err, BookingError::InsufficientCapacity { available: 40 });
        assert_eq!(err.to_string(), "Sorry! Only 40 seats available");
        assert_eq!(
            engine
                .check_availability_and_price(1, 'A', 'B')
                .unwrap()
                .available_seat_count,
            40
        );
        assert!(engine
            .snapshot(Direction::Up)
            .iter()
            .all(|slot| slot.ticket_number() == 0));
    }

    #[test]
    fn sold_out_journey_reports_no_seats() {
        let engine = ReservationEngine::default();
        engine.reserve_tickets(40, 'B', 'D').unwrap();
        let err = engine.check_availability_and_price(1, 'A', 'C').unwrap_err();
        assert_eq!(err.to_string(), "Sorry! No seats available");
        let err = engine.check_availability_and_price(1, 'C', 'D').unwrap_err();
        assert_eq!(err.to_string(), "Sorry! No seats available");
        assert_eq!(engine.available_seats('D', 'B').unwrap().len(), SEATS);
    }

    #[test]
    fn seat_is_reused_after_drop_off() {
        let engine = ReservationEngine::default();
        let first = engine.reserve_tickets(1, 'A', 'B').unwrap();
        assert_eq!(first.seat_labels, vec!["A1"]);

        let from_a = engine.available_seats('A', 'D').unwrap();
        assert!(!from_a.contains(&"A1".to_string()));
        let from_b = engine.available_seats('B', 'D').unwrap();
        assert_eq!(from_b[0], "A1");

        let second = engine.reserve_tickets(1, 'B', 'C').unwrap();
        assert_eq!(second.seat_labels, vec!["A1"]);
        assert_eq!(second.ticket_numbers, vec![2]);
        assert!(!engine.available_seats('B', 'D').unwrap().contains(&"A1".to_string()));
    }

    #[test]
    fn concurrent_reservations_never_share_a_seat() {
        let engine = &ReservationEngine::default();
        let reservations: Vec<TicketReservation> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(move || engine.reserve_tickets(5, 'A', 'D').unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let tickets: HashSet<u64> = reservations
            .iter()
            .flat_map(|r| r.ticket_numbers.iter().copied())
            .collect();
        let seats: HashSet<&String> = reservations.iter().flat_map(|r| &r.seat_labels).collect();
        assert_eq!(tickets, (1..=40).collect::<HashSet<_>>());
        assert_eq!(seats.len(), 40);
        for reservation in &reservations {
            let first = reservation.ticket_numbers[0];
            assert_eq!(reservation.ticket_numbers, (first..first + 5).collect::<Vec<_>>());
        }
        assert!(engine.reserve_tickets(1, 'A', 'D').is_err());
    }

    #[test]
    fn scans_never_observe_partial_reservations() {
        let engine = ReservationEngine::default();

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    let mut rng = rand::thread_rng();
                    for _ in 0..50 {
                        let origin = Town::ALL[rng.gen_range(0..4)].as_char();
                        let destination = Town::ALL[rng.gen_range(0..4)].as_char();
                        let passengers = rng.gen_range(1..4);
                        let _ = engine.reserve_tickets(passengers, origin, destination);
                    }
                });
            }
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..200 {
                        for direction in [Direction::Up, Direction::Down] {
                            let snapshot = engine.snapshot(direction);
                            let mut tickets: Vec<u64> = snapshot
                                .iter()
                                .map(Slot::ticket_number)
                                .filter(|&t| t > 0)
                                .collect();
                            tickets.sort_unstable();
                            tickets.dedup();
                            let reserved = snapshot
                                .iter()
                                .filter(|slot| slot.reservation().is_some())
                                .count();
                            assert_eq!(tickets.len(), reserved);
                            for slot in &snapshot {
                                if let Some(r) = slot.reservation() {
                                    assert!(r.ticket > 0);
                                    assert_ne!(r.origin, r.destination);
                                    assert_eq!(r.origin < r.destination, direction == Direction::Up);
                                }
                            }
                        }
                    }
                });
            }
        });

        let up = engine.snapshot(Direction::Up);
        let down = engine.snapshot(Direction::Down);
        let live: HashSet<u64> = up
            .iter()
            .chain(down.iter())
            .map(Slot::ticket_number)
            .filter(|&t| t > 0)
            .collect();
        let live_slots = up
            .iter()
            .chain(down.iter())
            .filter(|slot| slot.ticket_number() > 0)
            .count();
        assert_eq!(live.len(), live_slots);
    }
}
