//! Mock API implementation directly using the `bus-booking-engine` crate

use std::sync::Arc;

use bus_booking_core::{RawRequest, Request, RequestHandler, RequestKind};
use tokio::sync::oneshot;
use tokio::task::{self, JoinHandle};
use uuid::Uuid;

use super::{Api, RequestMsg, Response};

pub struct MockBalancer {
    balancer: Arc<bus_booking_engine::Balancer>,
    join_handles: Vec<JoinHandle<()>>,
}

struct MockRawRequest {
    url: String,
    body: Option<Vec<u8>>,
    kind: RequestKind,
    response_channel: oneshot::Sender<Response>,
}

pub async fn start(threads: u16, config: bus_booking_core::Config) -> (MockBalancer, Api) {
    let balancer = Arc::new(
        tokio::task::spawn_blocking(move || bus_booking_engine::launch(&config))
            .await
            .unwrap(),
    );

    let it = (0..threads).map(|_| {
        let (sender, receiver) = flume::bounded::<RequestMsg>(65536);
        let balancer = balancer.clone();
        let handle = task::spawn_blocking(move || {
            let balancer = &*balancer;
            for msg in receiver.into_iter() {
                let raw = Box::new(MockRawRequest {
                    url: msg.url,
                    body: msg.body,
                    kind: msg.kind,
                    response_channel: msg.response_channel,
                });
                balancer.handle(Request::from_raw(msg.kind, msg.customer_id, raw))
            }
        });
        (sender, handle)
    });
    let (senders, join_handles) = it.unzip();

    let mock_balancer = MockBalancer {
        balancer,
        join_handles,
    };
    (mock_balancer, Api::new(senders))
}

impl MockBalancer {
    pub fn engine(&self) -> &bus_booking_engine::ReservationEngine {
        self.balancer.engine()
    }

    pub async fn shutdown(self) {
        for handle in self.join_handles {
            handle.await.unwrap()
        }
        task::spawn_blocking(move || Arc::into_inner(self.balancer).unwrap().shutdown())
            .await
            .unwrap();
    }
}

impl RawRequest for MockRawRequest {
    fn url(&self) -> &str {
        &self.url
    }

    fn method(&self) -> bus_booking_core::RequestMethod {
        use bus_booking_core::RequestMethod::*;
        use RequestKind::*;
        match self.kind {
            CheckAvailabilityAndPrice | Debug => Get,
            ReserveTickets => Post,
        }
    }

    fn read_bytes(&mut self) -> std::io::Result<Vec<u8>> {
        Ok(self.body.take().unwrap_or_default())
    }
    fn read_string(&mut self) -> std::io::Result<String> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    }

    fn respond_with_err(self: Box<Self>, msg: String, customer_id: Uuid) {
        let response = Response::Error { msg, customer_id };
        self.response_channel.send(response).unwrap()
    }

    fn respond_with_json(self: Box<Self>, json: String, customer_id: Uuid) {
        let response = Response::Json { json, customer_id };
        self.response_channel.send(response).unwrap()
    }

    fn respond_with_string(self: Box<Self>, text: String, customer_id: Uuid) {
        let response = Response::Text { text, customer_id };
        self.response_channel.send(response).unwrap()
    }
}
