use market_pulse_data::{BoundingBox, Coordinate};
use reqwest::{Client, Request, header::ACCEPT};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{GeocodeOutcome, Geocoder, NotFoundReason};
use crate::{config::PulseConfig, error::Result};

/// One entry of a Nominatim `/search` response. Coordinates are strings.
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimMatch {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// OpenStreetMap Nominatim search, bounded to a region.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    region: BoundingBox,
}

impl NominatimGeocoder {
    /// Build a geocoder with its own HTTP client from `config`.
    pub fn new(config: &PulseConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, &config.geocoder_url, config.region))
    }

    pub fn with_client(client: Client, base_url: &str, region: BoundingBox) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            region,
        }
    }

    pub const fn region(&self) -> BoundingBox {
        self.region
    }

    /// The search request for `query`, without sending it.
    pub fn request(&self, query: &str) -> Result<Request> {
        let viewbox = self.region.viewbox();
        let request = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("format", "json"),
                ("limit", "1"),
                ("q", query),
                ("bounded", "1"),
                ("viewbox", viewbox.as_str()),
            ])
            .header(ACCEPT, "application/json")
            .build()?;
        Ok(request)
    }

    async fn lookup(&self, query: &str) -> Result<Option<Coordinate>> {
        let request = self.request(query)?;
        let response = self.client.execute(request).await?.error_for_status()?;
        let body = response.bytes().await?;
        Ok(parse_first_match(&body)?)
    }
}

impl Geocoder for NominatimGeocoder {
    #[instrument(name = "Geocode", skip(self), level = "info")]
    async fn geocode(&self, query: &str) -> GeocodeOutcome {
        let query = query.trim();
        if query.is_empty() {
            return GeocodeOutcome::NotFound(NotFoundReason::NoMatch);
        }
        match self.lookup(query).await {
            Ok(found) => {
                debug!(?found, "Geocoder answered");
                found.into()
            }
            Err(e) => {
                warn!(error = %e, "Geocoding request failed");
                GeocodeOutcome::NotFound(NotFoundReason::ServiceUnavailable(e.to_string()))
            }
        }
    }
}

/// Parse a Nominatim response body into its first usable coordinate.
///
/// An empty array, or a first match whose `lat`/`lon` do not parse into a
/// valid coordinate, is `Ok(None)`. Only malformed JSON is an error.
pub fn parse_first_match(body: &[u8]) -> serde_json::Result<Option<Coordinate>> {
    let matches: Vec<NominatimMatch> = serde_json::from_slice(body)?;
    Ok(matches.first().and_then(|first| {
        let lat = first.lat.trim().parse::<f64>().ok()?;
        let lon = first.lon.trim().parse::<f64>().ok()?;
        Coordinate::new(lat, lon).ok()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Answer one GET with `status_line` and `body`.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            reader.get_mut().write_all(response.as_bytes()).unwrap();
        });
        (base_url, server)
    }

    fn geocoder() -> NominatimGeocoder {
        NominatimGeocoder::with_client(
            Client::new(),
            "https://nominatim.example.org/",
            BoundingBox::BERLIN,
        )
    }

    #[test]
    fn test_request_shape() {
        let request = geocoder().request("Friedrichstraße 123").unwrap();
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/search");
        assert_eq!(request.headers()[ACCEPT], "application/json");

        let params: HashMap<_, _> = request.url().query_pairs().into_owned().collect();
        assert_eq!(params["format"], "json");
        assert_eq!(params["limit"], "1");
        assert_eq!(params["q"], "Friedrichstraße 123");
        assert_eq!(params["bounded"], "1");
        assert_eq!(params["viewbox"], "13.0884,52.6755,13.7612,52.3383");
    }

    #[test]
    fn test_parse_first_match() {
        let body = br#"[{"lat": "52.5219184", "lon": "13.4132147", "display_name": "Alexanderplatz, Mitte, Berlin"},
                        {"lat": "1", "lon": "2"}]"#;
        let coordinate = parse_first_match(body).unwrap().unwrap();
        assert!((coordinate.lat - 52.5219184).abs() < 1e-12);
        assert!((coordinate.lon - 13.4132147).abs() < 1e-12);
    }

    #[test]
    fn test_parse_empty_and_unusable() {
        assert_eq!(parse_first_match(b"[]").unwrap(), None);
        assert_eq!(
            parse_first_match(br#"[{"lat": "north", "lon": "13.4"}]"#).unwrap(),
            None
        );
        assert_eq!(
            parse_first_match(br#"[{"lat": "95.0", "lon": "13.4"}]"#).unwrap(),
            None
        );
        assert!(parse_first_match(b"<html>rate limited</html>").is_err());
    }

    #[tokio::test]
    async fn test_empty_query_sends_nothing() {
        // Unroutable base URL: a request would come back as ServiceUnavailable
        let geocoder =
            NominatimGeocoder::with_client(Client::new(), "http://127.0.0.1:9", BoundingBox::BERLIN);
        assert_eq!(
            geocoder.geocode("   ").await,
            GeocodeOutcome::NotFound(NotFoundReason::NoMatch)
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_found() {
        let geocoder =
            NominatimGeocoder::with_client(Client::new(), "http://127.0.0.1:9", BoundingBox::BERLIN);
        let outcome = geocoder.geocode("Alexanderplatz").await;
        assert!(matches!(
            outcome,
            GeocodeOutcome::NotFound(NotFoundReason::ServiceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_error_status_is_service_unavailable() {
        let (base_url, server) = serve_once("HTTP/1.1 503 Service Unavailable", "[]");
        let geocoder = NominatimGeocoder::with_client(Client::new(), &base_url, BoundingBox::BERLIN);
        let outcome = geocoder.geocode("Alexanderplatz").await;
        server.join().unwrap();
        assert!(matches!(
            outcome,
            GeocodeOutcome::NotFound(NotFoundReason::ServiceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_served_match_is_found() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"[{"lat": "52.5219184", "lon": "13.4132147"}]"#,
        );
        let geocoder = NominatimGeocoder::with_client(Client::new(), &base_url, BoundingBox::BERLIN);
        let outcome = geocoder.geocode("Alexanderplatz").await;
        server.join().unwrap();
        assert!(outcome.is_found());
    }
}
