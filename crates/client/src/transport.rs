use crate::{
    client::QuarryClientInner,
    constants::{BODY_CHANNEL_CAPACITY, CONTENT_ENCODING_GZIP, CONTENT_TYPE_JSON},
    error::{Error, Result},
};
use bytes::Bytes;
use flate2::{Compression, write::GzEncoder};
use reqwest::{Body, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{
    io::{self, Write},
    sync::atomic::Ordering,
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

impl QuarryClientInner {
    /// POSTs `request` as JSON to `path` under the configured base URL and
    /// decodes the JSON response. With compression enabled the body is
    /// gzip-streamed; the flag is read once so header and body framing
    /// always agree for the whole call.
    pub(crate) async fn send<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|error| Error::InvalidUrl(error.to_string()))?;
        let compress = self.compression.load(Ordering::Relaxed);

        // Serialization failures surface here, before any I/O.
        let value = serde_json::to_value(request)?;

        tracing::debug!(%url, compress, "sending builder API request");

        let builder = self
            .client
            .post(url.clone())
            .header("content-type", CONTENT_TYPE_JSON);
        let builder = if compress {
            builder
                .header("content-encoding", CONTENT_ENCODING_GZIP)
                .body(gzip_stream_body(value))
        } else {
            builder.body(serde_json::to_vec(&value)?)
        };

        let response = builder.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.bytes().await.unwrap_or_default();
            let message = error_message(&body);
            tracing::error!(%url, %status, error = %message, "builder API request failed");
            return Err(Error::Status { status, message });
        }

        Ok(response.json().await?)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Best-effort decode of a `{"error": "..."}` body, falling back to the raw
/// body text.
fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(body) => body.error,
        Err(_) => String::from_utf8_lossy(body).trim().to_string(),
    }
}

/// Streams `value`'s JSON encoding through gzip into the request body.
/// Producer and consumer overlap through a bounded channel, so the encoded
/// body is never materialized in full before the request starts. A producer
/// failure reaches the HTTP client as a broken body, not a truncation.
fn gzip_stream_body(value: serde_json::Value) -> Body {
    Body::wrap_stream(ReceiverStream::new(spawn_gzip_producer(value)))
}

fn spawn_gzip_producer(value: serde_json::Value) -> mpsc::Receiver<io::Result<Bytes>> {
    let (tx, rx) = mpsc::channel(BODY_CHANNEL_CAPACITY);
    tokio::task::spawn_blocking(move || {
        let mut encoder = GzEncoder::new(ChannelWriter { tx: tx.clone() }, Compression::default());
        let written = serde_json::to_writer(&mut encoder, &value).map_err(io::Error::other);
        let finished = written.and_then(|()| encoder.finish().map(|_| ()));
        if let Err(error) = finished {
            // A closed channel means the request was dropped; no one is
            // left to notify.
            let _ = tx.blocking_send(Err(error));
        }
    });
    rx
}

struct ChannelWriter {
    tx: mpsc::Sender<io::Result<Bytes>>,
}

impl Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.tx
            .blocking_send(Ok(Bytes::copy_from_slice(buf)))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "request body dropped"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
