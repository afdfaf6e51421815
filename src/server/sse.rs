use std::convert::Infallible;
use std::time::Duration;

use axum::http::header::ACCEPT;
use axum::http::HeaderMap;
use axum::response::sse::Event;
use futures_util::stream::{self, Stream};
use tokio::time::{interval_at, Instant};

pub const EVENT_STREAM: &str = "text/event-stream";
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

pub fn accepts_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains(EVENT_STREAM))
}

/// A single `data:` frame carrying one JSON payload.
pub fn data_frame(json: &str) -> String {
    format!("data: {}\n\n", json)
}

/// Empty `data: {}` keep-alive frames, the first one after `period`.
pub fn heartbeat(period: Duration) -> impl Stream<Item = Result<Event, Infallible>> {
    let ticker = interval_at(Instant::now() + period, period);
    stream::unfold(ticker, |mut ticker| async move {
        ticker.tick().await;
        Some((Ok(Event::default().data("{}")), ticker))
    })
}
