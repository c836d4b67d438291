use std::time::Duration;

use tracing::{debug, instrument};

use crate::image_pipeline::common::error::{AnalysisError, Result};

/// Retrieves encoded image bytes from a remote location.
pub trait ImageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking HTTP(S) fetcher with a hard per-request timeout.
///
/// The whole request (connect, headers and body) must finish within the
/// timeout. Must not be constructed or used from inside an async runtime.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::FetchError(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl ImageFetcher for HttpFetcher {
    #[instrument(skip(self), fields(timeout_ms = self.timeout.as_millis() as u64))]
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let parsed = reqwest::Url::parse(url.trim())
            .map_err(|e| {
                AnalysisError::ValidationError(format!("invalid image URL '{url}': {e}"))
            })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AnalysisError::ValidationError(format!(
                "unsupported URL scheme '{}'",
                parsed.scheme()
            )));
        }

        let response = self.client.get(parsed).send().map_err(|e| {
            if e.is_timeout() {
                AnalysisError::FetchError(format!("{url}: timed out after {:?}", self.timeout))
            } else {
                AnalysisError::FetchError(format!("{url}: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::FetchError(format!("{url}: server returned {status}")));
        }

        let body = response.bytes().map_err(|e| {
            if e.is_timeout() {
                let timeout = self.timeout;
                AnalysisError::FetchError(format!(
                    "{url}: timed out reading body after {timeout:?}"
                ))
            } else {
                AnalysisError::FetchError(format!("{url}: failed to read body: {e}"))
            }
        })?;
        debug!("Fetched {} bytes", body.len());
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::Instant;

    fn read_request_head(stream: &TcpStream) {
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) if line == "\r\n" => break,
                Ok(_) => continue,
                Err(_) => break,
            }
        }
    }

    fn serve_once(response: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                read_request_head(&stream);
                let _ = stream.write_all(response);
                let _ = stream.flush();
            }
        });
        format!("http://{addr}/panel.png")
    }

    #[test]
    fn returns_body_on_success() {
        let url = serve_once(
            b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
        );
        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        assert_eq!(fetcher.fetch(&url).unwrap(), b"hello".to_vec());
    }

    #[test]
    fn non_success_status_is_a_fetch_error() {
        let url = serve_once(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let result = fetcher.fetch(&url);
        assert!(matches!(result, Err(AnalysisError::FetchError(_))));
    }

    #[test]
    fn silent_server_times_out_instead_of_hanging() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                thread::sleep(Duration::from_secs(3));
                drop(stream);
            }
        });

        let fetcher = HttpFetcher::new(Duration::from_millis(300)).unwrap();
        let started = Instant::now();
        let result = fetcher.fetch(&format!("http://{addr}/slow.jpg"));

        assert!(matches!(result, Err(AnalysisError::FetchError(_))));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn malformed_url_is_a_validation_error() {
        let fetcher = HttpFetcher::new(Duration::from_secs(1)).unwrap();
        assert!(matches!(fetcher.fetch("not a url"), Err(AnalysisError::ValidationError(_))));
        assert!(matches!(
            fetcher.fetch("ftp://example.com/a.png"),
            Err(AnalysisError::ValidationError(_))
        ));
    }
}
