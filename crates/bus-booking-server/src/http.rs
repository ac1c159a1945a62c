//! 🏗 HTTP request implementation

use std::io;
use std::io::{Read, Write};

use bus_booking_core::RequestKind;
use tiny_http::{Header, Response};
use tracing::error;
use uuid::Uuid;

/// Length of any hyphenated UUID
const UUID_LEN: usize = b"a1a2a3a4-b1b2-c1c2-d1d2-d3d4d5d6d7d8".len();

struct HTTPRequest(tiny_http::Request);

impl bus_booking_core::RawRequest for HTTPRequest {
    fn url(&self) -> &str {
        self.0.url()
    }

    fn method(&self) -> bus_booking_core::RequestMethod {
        match self.0.method() {
            tiny_http::Method::Get => bus_booking_core::RequestMethod::Get,
            tiny_http::Method::Post => bus_booking_core::RequestMethod::Post,
            _ => unreachable!(),
        }
    }

    fn read_bytes(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.0.body_length().unwrap_or(0));
        self.0.as_reader().read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn read_string(&mut self) -> io::Result<String> {
        let mut s = String::with_capacity(self.0.body_length().unwrap_or(0));
        self.0.as_reader().read_to_string(&mut s)?;
        Ok(s)
    }

    fn respond_with_err(self: Box<Self>, err: String, customer: Uuid) {
        self.respond(
            Response::from_string(err).with_status_code(400),
            customer,
        )
    }

    fn respond_with_json(self: Box<Self>, json: String, customer: Uuid) {
        let mut res = Response::from_string(json).with_status_code(200);
        res.add_header(header(b"Content-Type", b"application/json"));
        self.respond(res, customer)
    }

    fn respond_with_string(self: Box<Self>, s: String, customer: Uuid) {
        self.respond(Response::from_string(s).with_status_code(200), customer)
    }
}

impl HTTPRequest {
    /// Add HTTP headers (CORS, X-Customer-Id) to `res` and send it
    fn respond<R: Read>(self, mut res: Response<R>, customer: Uuid) {
        add_response_cors_headers(&mut res);

        let mut cid = Vec::<u8>::with_capacity(UUID_LEN);
        let _ = write!(&mut cid, "{}", customer.hyphenated());
        res.add_header(header(b"X-Customer-Id", &cid));

        send(self.0, res);
    }
}

fn header(field: &[u8], value: &[u8]) -> Header {
    // Only called with ASCII field names and values.
    Header::from_bytes(field, value).expect("invalid header")
}

fn send<R: Read>(rq: tiny_http::Request, res: Response<R>) {
    if let Err(err) = rq.respond(res) {
        error!(%err, "HTTP response failed");
    }
}

/// Parse the given HTTP request
///
/// If [`None`] is returned, the request was already answered with a
/// corresponding error message.
pub fn parse(rq: tiny_http::Request) -> Option<bus_booking_core::Request> {
    use tiny_http::Method::*;

    let path = rq.url().split_once('?').map_or(rq.url(), |(path, _)| path);
    let kind = match (rq.method(), path) {
        (Options, _) => {
            let mut res = Response::empty(204);
            add_response_cors_headers(&mut res);
            send(rq, res);
            return None;
        }
        (Get, "/booking/availability-and-price") => RequestKind::CheckAvailabilityAndPrice,
        (Post, "/booking/tickets") => RequestKind::ReserveTickets,
        (Get, path) | (Post, path) => {
            if path.starts_with("/booking/debug") {
                RequestKind::Debug
            } else {
                let mut res = Response::from_string(
                    "🦀 could not find the service you are looking for!

Valid requests are:
  GET  /booking/availability-and-price?numberOfPassengers=N&origin=X&destination=Y
  POST /booking/tickets
  GET  /booking/debug(.*)
  POST /booking/debug(.*)",
                )
                .with_status_code(404);
                add_response_cors_headers(&mut res);
                send(rq, res);
                return None;
            }
        }
        _ => {
            let mut res = Response::empty(405);
            add_response_cors_headers(&mut res);
            send(rq, res);
            return None;
        }
    };

    let mut cid = None;
    for hdr in rq.headers() {
        if hdr.field.equiv("x-customer-id") {
            if let Ok(id) = Uuid::parse_str(hdr.value.as_str()) {
                cid = Some(id);
            }
        }
    }

    Some(bus_booking_core::Request::from_raw(
        kind,
        cid.unwrap_or_else(Uuid::new_v4),
        Box::new(HTTPRequest(rq)),
    ))
}

/// Add CORS headers to `res`
fn add_response_cors_headers<R: Read>(res: &mut Response<R>) {
    res.add_header(header(b"Access-Control-Request-Method", b"*"));
    res.add_header(header(b"Access-Control-Allow-Origin", b"*"));
    res.add_header(header(b"Access-Control-Allow-Headers", b"*"));
    res.add_header(header(b"Access-Control-Expose-Headers", b"*"));
}
