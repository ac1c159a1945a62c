use bus_booking_tests::TestCtxBuilder;
use eyre::Result;

mod util;

#[tokio::test] // Every test function needs to be decorated with this attribute
#[ntest::timeout(20_000)] // Test timeout in ms
async fn test_example() -> Result<()> {
    // Create a test context with a fresh seat inventory
    let ctx = TestCtxBuilder::new().build().await?;

    // Create a new user session
    let mut session = ctx.api.create_user_session();

    // Ask for a price first
    let quote = session
        .check_availability_and_price(3, 'A', 'B')
        .await?
        .result?;
    assert_eq!(quote.available_seat_count, 40);
    assert_eq!(quote.total_price, 150.0);

    // Then book the seats
    let reservation = session.reserve_tickets(3, 'A', 'B').await?.result?;
    assert_eq!(reservation.ticket_numbers, vec![1, 2, 3]);
    assert_eq!(reservation.seat_numbers, vec!["A1", "A2", "A3"]);
    assert_eq!(reservation.origin, 'A');
    assert_eq!(reservation.destination, 'B');
    assert_eq!(reservation.total_price, 150.0);

    util::assert_available(&ctx, 'A', 'B', 37).await?;

    assert_eq!(ctx.api.debug().await?, "Happy Debugging! 🚫🐛");

    // Finish the test
    ctx.finish().await;
    Ok(())
}
