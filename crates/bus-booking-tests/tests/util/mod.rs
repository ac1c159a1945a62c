use bus_booking_tests::TestCtx;
use eyre::Result;

/// Queries availability for one passenger and checks the count of free seats.
#[allow(unused)]
pub async fn assert_available(
    ctx: &TestCtx,
    origin: char,
    destination: char,
    expected: usize,
) -> Result<Vec<String>> {
    let quote = ctx
        .api
        .check_availability_and_price(1, origin, destination, &Default::default())
        .await?
        .result?;
    assert_eq!(
        quote.available_seat_count, expected,
        "Expected {expected} free seats from {origin} to {destination}."
    );
    assert_eq!(quote.available_seats.len(), quote.available_seat_count);
    Ok(quote.available_seats)
}
