use std::borrow::Cow;
use std::io;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

/// Kind of the request
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(u8)]
pub enum RequestKind {
    /// Query the seats available for a journey and the price for a number of
    /// passengers
    ///
    /// The parameters `numberOfPassengers`, `origin` and `destination` are
    /// passed in the query string.
    CheckAvailabilityAndPrice,

    /// Reserve seats for a number of passengers
    ///
    /// The request body is a JSON encoded [`TicketReservationRequest`].
    ReserveTickets,

    /// Useful for sending information for debugging
    Debug,
}

/// Body of a [`RequestKind::ReserveTickets`] request
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketReservationRequest {
    /// Number of seats to reserve
    pub passenger_count: i64,
    /// Town where the passengers board
    pub origin: char,
    /// Town where the passengers leave the bus
    pub destination: char,
    /// Whether the customer accepted the quoted price
    #[serde(default)]
    pub price_confirmation: bool,
}

/// Request sent from a web browser
pub struct Request {
    kind: RequestKind,
    customer: Uuid,
    raw: Box<dyn RawRequest + Send>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("kind", &self.kind)
            .field("customer", &self.customer)
            .field("raw", &format_args!(".."))
            .finish()
    }
}

/// HTTP request method
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum RequestMethod {
    /// GET request
    Get,
    /// POST request, may have a payload
    Post,
}

/// Interface for handling requests from a web browser
pub trait RequestHandler {
    /// Handle a request from a web browser
    ///
    /// This method may be called concurrently from different threads.
    fn handle(&self, request: Request);

    /// Shut the booking system down
    fn shutdown(self);
}

/// A raw request, implemented by the HTTP server
///
/// 📌 Hint: You should not need to interact with this trait (unless you create
/// your own testing infrastructure).
pub trait RawRequest {
    /// Get the URL, including the query string
    fn url(&self) -> &str;
    /// Get the request method
    fn method(&self) -> RequestMethod;

    /// Read the request body as bytes
    fn read_bytes(&mut self) -> io::Result<Vec<u8>>;
    /// Read the request body as string
    fn read_string(&mut self) -> io::Result<String>;

    /// Respond with an error message
    fn respond_with_err(self: Box<Self>, err: String, customer: Uuid);
    /// Respond with a JSON document
    fn respond_with_json(self: Box<Self>, json: String, customer: Uuid);
    /// Respond with a string
    fn respond_with_string(self: Box<Self>, s: String, customer: Uuid);
}

impl Request {
    /// Get the request's kind
    #[inline]
    pub fn kind(&self) -> &RequestKind {
        &self.kind
    }

    /// Get the customer's id
    ///
    /// If the customer did not send the corresponding HTTP header, it is
    /// randomly generated.
    #[inline]
    pub fn customer_id(&self) -> Uuid {
        self.customer
    }

    /// Get the request URL
    ///
    /// Note that this returns the full URL including the query string, e.g.,
    /// `/booking/availability-and-price?origin=A`.
    #[inline]
    pub fn url(&self) -> &str {
        self.raw.url()
    }

    /// Get the request method
    #[inline]
    #[allow(unused)]
    pub fn method(&self) -> RequestMethod {
        self.raw.method()
    }

    /// Look up the percent-decoded value of a query string parameter
    ///
    /// Returns the first occurrence of `name`, [`None`] if the URL has no such
    /// parameter or its value does not decode to UTF-8.
    pub fn query_param(&self, name: &str) -> Option<Cow<'_, str>> {
        let (_, query) = self.raw.url().split_once('?')?;
        let (_, value) = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == name)?;
        urlencoding::decode(value).ok()
    }

    /// Read the payload provided by the web browser as bytes
    ///
    /// Returns [`Err`] in case of a communication error. See
    /// [`std::io::Read::read_to_end()`] for more details.
    ///
    /// 📌 Hint: This method has side effects and should be called only once per
    /// request.
    #[inline]
    #[allow(unused)]
    pub fn read_bytes(&mut self) -> io::Result<Vec<u8>> {
        self.raw.read_bytes()
    }

    /// Read the payload provided by the web browser as a UTF-8 string
    ///
    /// Returns [`Err`] if the payload is invalid UTF-8 or in case of a
    /// communication error.
    #[inline]
    #[allow(unused)]
    pub fn read_string(&mut self) -> io::Result<String> {
        self.raw.read_string()
    }

    /// Parse the payload as a JSON document of type `T`
    ///
    /// In case the browser did not provide a well-formed document (or some
    /// communication error happened), [`None`] is returned. Like
    /// [`Self::read_bytes()`], this method should be called only once per
    /// request.
    pub fn read_json<T: DeserializeOwned>(&mut self) -> Option<T> {
        let bytes = self.raw.read_bytes().ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Respond with an error indicating an invalid request to the client.
    ///
    /// This method blocks until the response has been sent.
    #[inline]
    pub fn respond_with_err(self, err: impl Into<String>) {
        self.raw.respond_with_err(err.into(), self.customer);
    }

    /// Respond with a JSON document
    ///
    /// This method blocks until the response has been sent.
    #[inline]
    pub fn respond_with_json(self, json: impl Into<String>) {
        self.raw.respond_with_json(json.into(), self.customer);
    }

    /// Respond with an arbitrary string
    ///
    /// This method blocks until the response has been sent.
    #[inline]
    pub fn respond_with_string(self, s: impl Into<String>) {
        self.raw.respond_with_string(s.into(), self.customer);
    }

    /// Create a new request from a [`RawRequest`]
    ///
    /// 📌 Hint: Normally, there should not be a need to use this function
    /// (unless you create your own testing infrastructure).
    #[inline]
    pub fn from_raw(kind: RequestKind, customer: Uuid, raw: Box<dyn RawRequest + Send>) -> Self {
        Self {
            kind,
            customer,
            raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UrlOnly(String);

    impl RawRequest for UrlOnly {
        fn url(&self) -> &str {
            &self.0
        }
        fn method(&self) -> RequestMethod {
            RequestMethod::Get
        }
        fn read_bytes(&mut self) -> io::Result<Vec<u8>> {
            Ok(Vec::new())
        }
        fn read_string(&mut self) -> io::Result<String> {
            Ok(String::new())
        }
        fn respond_with_err(self: Box<Self>, _err: String, _customer: Uuid) {}
        fn respond_with_json(self: Box<Self>, _json: String, _customer: Uuid) {}
        fn respond_with_string(self: Box<Self>, _s: String, _customer: Uuid) {}
    }

    fn request(url: &str) -> Request {
        let raw = Box::new(UrlOnly(url.to_owned()));
        Request::from_raw(RequestKind::CheckAvailabilityAndPrice, Uuid::nil(), raw)
    }

    #[test]
    fn query_values_are_percent_decoded() {
        let rq = request(
            "/booking/availability-and-price?numberOfPassengers=%32&origin=%41&destination=B",
        );
        assert_eq!(rq.query_param("numberOfPassengers").as_deref(), Some("2"));
        assert_eq!(rq.query_param("origin").as_deref(), Some("A"));
        assert_eq!(rq.query_param("destination").as_deref(), Some("B"));
    }

    #[test]
    fn first_occurrence_wins() {
        let rq = request("/booking/availability-and-price?origin=C&origin=A");
        assert_eq!(rq.query_param("origin").as_deref(), Some("C"));
    }

    #[test]
    fn missing_parameters_and_bad_encodings_are_absent() {
        assert_eq!(request("/booking/availability-and-price").query_param("origin"), None);

        let rq = request("/booking/availability-and-price?destination&origin=%FF");
        assert_eq!(rq.query_param("destination"), None);
        assert_eq!(rq.query_param("origin"), None);
    }
}
