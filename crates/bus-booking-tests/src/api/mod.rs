use std::sync::Arc;

use bus_booking_core::RequestKind;
use eyre::{eyre, Result};
use flume::Sender;
use nanorand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::oneshot;
use uuid::Uuid;

pub mod mock;

#[derive(Debug, Error)]
#[error("Error 400: {0}")]
pub struct ApiError(pub String);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug)]
enum Response {
    Error { msg: String, customer_id: Uuid },
    Json { json: String, customer_id: Uuid },
    Text { text: String, customer_id: Uuid },
}

impl Response {
    fn into_api_response<T: DeserializeOwned>(self, rq_kind: RequestKind) -> Result<ApiResponse<T>> {
        match self {
            Response::Error { msg, customer_id } => Ok(ApiResponse {
                customer_id: Some(customer_id),
                result: Err(ApiError(msg)),
            }),
            Response::Json { json, customer_id } => Ok(ApiResponse {
                customer_id: Some(customer_id),
                result: Ok(serde_json::from_str(&json)?),
            }),
            resp => Err(eyre!("{rq_kind:?} must not be answered by {resp:?}")),
        }
    }
}

/// Body of a successful availability query
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityAndPrice {
    pub available_seat_count: usize,
    pub available_seats: Vec<String>,
    pub total_price: f64,
}

/// Body of a successful reservation
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketReservation {
    pub ticket_numbers: Vec<u64>,
    pub seat_numbers: Vec<String>,
    pub origin: char,
    pub destination: char,
    pub total_price: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReservationBody {
    passenger_count: i64,
    origin: char,
    destination: char,
    price_confirmation: bool,
}

struct RequestMsg {
    kind: RequestKind,
    url: String,
    body: Option<Vec<u8>>,
    customer_id: Uuid,
    response_channel: oneshot::Sender<Response>,
}

pub struct Api {
    /// One channel per handler thread
    channels: Arc<Vec<Sender<RequestMsg>>>,

    my_channel: Sender<RequestMsg>,
    my_index: usize,
}

impl Api {
    fn new(channels: Vec<Sender<RequestMsg>>) -> Self {
        let my_channel = channels[0].clone();
        Self {
            channels: Arc::new(channels),
            my_channel,
            my_index: 0,
        }
    }
}

impl Clone for Api {
    fn clone(&self) -> Self {
        let my_index = (self.my_index + 1) % self.channels.len();
        Self {
            channels: self.channels.clone(),
            my_channel: self.channels[my_index].clone(),
            my_index,
        }
    }
}

const NO_REQUEST_OPTIONS: RequestOptions = RequestOptions { customer_id: None };

impl Api {
    async fn make_request(
        &self,
        kind: RequestKind,
        url: String,
        body: Option<Vec<u8>>,
        options: &RequestOptions,
    ) -> Result<Response> {
        let (sender, receiver) = oneshot::channel();
        let msg = RequestMsg {
            kind,
            url,
            body,
            customer_id: options.customer_id.unwrap_or_else(random_customer),
            response_channel: sender,
        };
        self.my_channel.send_async(msg).await?;
        Ok(receiver.await?)
    }

    /// Query availability with a hand-written query string
    pub async fn get_availability_and_price_raw(
        &self,
        query: &str,
        options: &RequestOptions,
    ) -> Result<ApiResponse<AvailabilityAndPrice>> {
        let kind = RequestKind::CheckAvailabilityAndPrice;
        let url = format!("/booking/availability-and-price?{query}");
        let response = self.make_request(kind, url, None, options);
        response.await?.into_api_response(kind)
    }

    pub async fn check_availability_and_price(
        &self,
        passengers: i64,
        origin: char,
        destination: char,
        options: &RequestOptions,
    ) -> Result<ApiResponse<AvailabilityAndPrice>> {
        let query =
            format!("numberOfPassengers={passengers}&origin={origin}&destination={destination}");
        self.get_availability_and_price_raw(&query, options).await
    }

    /// Reserve with a hand-written request body
    pub async fn post_tickets_raw(
        &self,
        body: impl Into<Vec<u8>>,
        options: &RequestOptions,
    ) -> Result<ApiResponse<TicketReservation>> {
        let kind = RequestKind::ReserveTickets;
        let url = String::from("/booking/tickets");
        let response = self.make_request(kind, url, Some(body.into()), options);
        response.await?.into_api_response(kind)
    }

    pub async fn reserve_tickets(
        &self,
        passengers: i64,
        origin: char,
        destination: char,
        price_confirmation: bool,
        options: &RequestOptions,
    ) -> Result<ApiResponse<TicketReservation>> {
        let body = serde_json::to_vec(&ReservationBody {
            passenger_count: passengers,
            origin,
            destination,
            price_confirmation,
        })?;
        self.post_tickets_raw(body, options).await
    }

    pub async fn debug(&self) -> Result<String> {
        let kind = RequestKind::Debug;
        let url = String::from("/booking/debug");
        match self.make_request(kind, url, None, &NO_REQUEST_OPTIONS).await? {
            Response::Text { text, .. } => Ok(text),
            resp => Err(eyre!("{kind:?} must not be answered by {resp:?}")),
        }
    }

    pub fn create_user_session(&self) -> UserSession {
        UserSession {
            api: self,
            customer_id: random_customer(),
            state: SessionState::None,
        }
    }
}

fn random_customer() -> Uuid {
    let mut bytes = [0u8; 16];
    nanorand::tls_rng().fill(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

pub struct ApiResponse<T> {
    pub customer_id: Option<Uuid>,
    pub result: ApiResult<T>,
}

pub enum SessionState {
    None,
    Quoted {
        passengers: i64,
        origin: char,
        destination: char,
    },
}

/// A customer who asks for a price before booking
pub struct UserSession<'a> {
    pub api: &'a Api,
    pub customer_id: Uuid,
    pub state: SessionState,
}

impl<'a> UserSession<'a> {
    fn request_options(&self) -> RequestOptions {
        RequestOptions {
            customer_id: Some(self.customer_id),
        }
    }

    pub async fn check_availability_and_price(
        &mut self,
        passengers: i64,
        origin: char,
        destination: char,
    ) -> Result<ApiResponse<AvailabilityAndPrice>> {
        let response = self
            .api
            .check_availability_and_price(passengers, origin, destination, &self.request_options())
            .await?;
        self.state = match &response.result {
            Ok(_) => SessionState::Quoted {
                passengers,
                origin,
                destination,
            },
            Err(_) => SessionState::None,
        };
        Ok(response)
    }

    /// Reserve, confirming the price only if the same journey was quoted before
    pub async fn reserve_tickets(
        &mut self,
        passengers: i64,
        origin: char,
        destination: char,
    ) -> Result<ApiResponse<TicketReservation>> {
        let confirmed = matches!(
            self.state,
            SessionState::Quoted { passengers: p, origin: o, destination: d }
                if p == passengers && o == origin && d == destination
        );
        let response = self
            .api
            .reserve_tickets(
                passengers,
                origin,
                destination,
                confirmed,
                &self.request_options(),
            )
            .await?;
        self.state = SessionState::None;
        Ok(response)
    }
}

#[derive(Copy, Clone, Default)]
pub struct RequestOptions {
    pub customer_id: Option<Uuid>,
}
