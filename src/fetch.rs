use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use camino::Utf8Path;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, info};

use crate::domain::FetchRequest;
use crate::error::SampleDataError;
use crate::progress::{ProgressEvent, ProgressSink};

pub const CHUNK_SIZE: usize = 1000 * 1024;
const ERROR_BODY_LIMIT: u64 = 4 * 1024;

pub trait Fetcher: Send + Sync {
    fn fetch(&self, request: &FetchRequest, sink: &dyn ProgressSink)
    -> Result<u64, SampleDataError>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, SampleDataError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("mps-sample-data/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| SampleDataError::Http(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| SampleDataError::Http(err.to_string()))?;
        Ok(Self { client })
    }

    fn handle_status(response: Response) -> Result<Response, SampleDataError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let mut body = Vec::new();
        let message = match response.take(ERROR_BODY_LIMIT).read_to_end(&mut body) {
            Ok(_) => String::from_utf8_lossy(&body).trim().to_string(),
            Err(_) => String::new(),
        };
        let message = if message.is_empty() {
            "download request failed".to_string()
        } else {
            message
        };
        Err(SampleDataError::Status { status, message })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(
        &self,
        request: &FetchRequest,
        sink: &dyn ProgressSink,
    ) -> Result<u64, SampleDataError> {
        debug!(url = %request.url, destination = %request.destination, "requesting dataset");
        let start = Instant::now();
        let response = self
            .client
            .get(&request.url)
            .send()
            .map_err(|err| SampleDataError::Http(err.to_string()))?;
        let response = Self::handle_status(response)?;
        let total = response.content_length();
        debug!(?total, "response headers received");

        let written = stream_to_file(response, total, &request.destination, request.label(), sink)?;
        info!(
            destination = %request.destination,
            bytes = written,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "download complete"
        );
        Ok(written)
    }
}

/// Writes to a temp file next to `destination` and persists it only once the body is
/// complete; a body shorter than the declared `total` is a transport failure.
pub fn stream_to_file<R: Read>(
    mut reader: R,
    total: Option<u64>,
    destination: &Utf8Path,
    label: String,
    sink: &dyn ProgressSink,
) -> Result<u64, SampleDataError> {
    let parent = destination
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let mut staged = tempfile::Builder::new()
        .prefix(".mps-sample-data")
        .suffix(".part")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| SampleDataError::Filesystem(format!("stage {destination}: {err}")))?;

    sink.event(ProgressEvent::Started { label, total });

    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut written = 0u64;
    loop {
        let len = read_chunk(&mut reader, &mut buffer)
            .map_err(|err| SampleDataError::Http(format!("reading response body: {err}")))?;
        if len == 0 {
            break;
        }
        staged
            .write_all(&buffer[..len])
            .map_err(|err| SampleDataError::Filesystem(err.to_string()))?;
        written += len as u64;
        sink.event(ProgressEvent::Advanced { written });
    }

    if let Some(total) = total {
        if written < total {
            return Err(SampleDataError::Http(format!(
                "response body ended after {written} of {total} bytes"
            )));
        }
    }

    staged
        .flush()
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|err| SampleDataError::Filesystem(err.to_string()))?;
    staged
        .persist(destination.as_std_path())
        .map_err(|err| SampleDataError::Filesystem(format!("persist {destination}: {}", err.error)))?;

    sink.event(ProgressEvent::Finished { written });
    Ok(written)
}

fn read_chunk<R: Read>(reader: &mut R, buffer: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
