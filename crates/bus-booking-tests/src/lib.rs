use eyre::Result;

mod api;
pub use api::{
    Api, ApiError, ApiResponse, AvailabilityAndPrice, RequestOptions, TicketReservation,
    UserSession,
};

pub struct TestCtxBuilder {
    /// Count of request handling threads
    pub handler_threads: u16,
    /// Whether reservations must carry a price confirmation
    pub require_price_confirmation: bool,
}

impl TestCtxBuilder {
    /// Create a new test context builder with default settings
    pub fn new() -> Self {
        TestCtxBuilder {
            handler_threads: 4,
            require_price_confirmation: false,
        }
    }

    /// Set the number of request handling threads to use
    pub fn with_handler_threads(mut self, threads: u16) -> Self {
        assert_ne!(threads, 0);
        self.handler_threads = threads;
        self
    }

    /// Require `"priceConfirmation": true` on reservations
    pub fn with_price_confirmation(mut self) -> Self {
        self.require_price_confirmation = true;
        self
    }

    /// Get the [`bus_booking_core::Config`] for launching the booking system
    fn config(&self) -> bus_booking_core::Config {
        bus_booking_core::Config {
            require_price_confirmation: self.require_price_confirmation,
        }
    }

    /// Build the test context
    pub async fn build(self) -> Result<TestCtx> {
        let config = self.config();
        let (balancer, api) = api::mock::start(self.handler_threads, config).await;

        Ok(TestCtx {
            api,
            balancer,
            handler_threads: self.handler_threads,
            drop_bomb: DropBomb,
        })
    }
}

impl Default for TestCtxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Test context
pub struct TestCtx {
    /// API allowing to interact with the booking system
    pub api: Api,
    balancer: api::mock::MockBalancer,
    /// Number of request handling threads
    pub handler_threads: u16,

    drop_bomb: DropBomb,
}

impl TestCtx {
    /// Engine behind the mock handler threads, for slot-level assertions
    pub fn engine(&self) -> &bus_booking_engine::ReservationEngine {
        self.balancer.engine()
    }

    /// Shut down the booking system and finish the test
    pub async fn finish(self) {
        std::mem::forget(self.drop_bomb);
        drop(self.api);
        self.balancer.shutdown().await;
    }
}

struct DropBomb;

impl Drop for DropBomb {
    fn drop(&mut self) {
        eprintln!("@TestAuthor: You should call `ctx.finish().await` to shut the booking system down");
    }
}
