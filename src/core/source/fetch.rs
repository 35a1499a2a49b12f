//! Remote image retrieval.

use crate::config::FetchConfig;
use crate::core::pipeline::CancellationToken;
use crate::error::{ConfigError, FetchError};
use reqwest::blocking::Client;
use std::io::Read;
use std::thread;
use std::time::{Duration, Instant};

/// How often a sleeping retry looks at its cancellation token
const CANCEL_POLL: Duration = Duration::from_millis(25);

/// Retrieves the bytes behind a remote image URL.
///
/// Implementations must be safe to call from several hashing workers at once,
/// and should give up with `FetchError::Cancelled` once `cancel` is set.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP fetcher with per-request timeout and bounded retries
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Build the HTTP client from configuration
    pub fn new(config: FetchConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn fetch_once(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let limit = self.config.max_bytes;
        if response.content_length().is_some_and(|len| len > limit) {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                limit,
            });
        }

        // Read one byte past the limit so an oversize body without a
        // Content-Length header is still caught
        let mut body = Vec::new();
        response
            .take(limit + 1)
            .read_to_end(&mut body)
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if body.len() as u64 > limit {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                limit,
            });
        }

        Ok(body)
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<Vec<u8>, FetchError> {
        let mut attempt = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(cancelled(url));
            }

            match self.fetch_once(url) {
                Ok(bytes) => return Ok(bytes),
                Err(error) if attempt < self.config.retries && is_retryable(&error) => {
                    attempt += 1;
                    tracing::debug!(url, attempt, %error, "retrying fetch");
                    let delay =
                        Duration::from_millis(self.config.retry_backoff_ms * u64::from(attempt));
                    if !wait_backoff(delay, cancel) {
                        return Err(cancelled(url));
                    }
                }
                Err(error) => return Err(error),
            }
        }
    }
}

/// Sleep for `delay` in short slices. Returns `false` if cancelled first.
fn wait_backoff(delay: Duration, cancel: &CancellationToken) -> bool {
    let deadline = Instant::now() + delay;
    loop {
        if cancel.is_cancelled() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(CANCEL_POLL.min(deadline - now));
    }
}

fn cancelled(url: &str) -> FetchError {
    FetchError::Cancelled {
        url: url.to_string(),
    }
}

fn classify(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}

/// Transient failures are worth another attempt, client errors are not
pub fn is_retryable(error: &FetchError) -> bool {
    match error {
        FetchError::Timeout { .. } | FetchError::Transport { .. } => true,
        FetchError::Status { status, .. } => *status >= 500 || *status == 429,
        FetchError::TooLarge { .. } | FetchError::Cancelled { .. } => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const UNAVAILABLE: &[u8] =
        b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
    const NOT_FOUND: &[u8] =
        b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

    /// Serve one canned response per connection, in order.
    ///
    /// Returns the base URL and a counter of accepted connections.
    fn serve(responses: Vec<Vec<u8>>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/photo.jpg", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        thread::spawn(move || {
            for response in responses {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                counter.fetch_add(1, Ordering::SeqCst);

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = stream.write_all(&response);
            }
        });

        (url, hits)
    }

    fn fetcher(retries: u32, retry_backoff_ms: u64, max_bytes: u64) -> HttpFetcher {
        HttpFetcher::new(FetchConfig {
            timeout_secs: 5,
            retries,
            retry_backoff_ms,
            max_bytes,
            ..FetchConfig::default()
        })
        .unwrap()
    }

    fn status(code: u16) -> FetchError {
        FetchError::Status {
            url: "https://photos.example/a.jpg".to_string(),
            status: code,
        }
    }

    #[test]
    fn server_errors_are_retryable() {
        assert!(is_retryable(&status(503)));
        assert!(is_retryable(&status(429)));
        assert!(!is_retryable(&status(404)));
    }

    #[test]
    fn oversize_is_not_retryable() {
        let error = FetchError::TooLarge {
            url: "https://photos.example/a.jpg".to_string(),
            limit: 10,
        };
        assert!(!is_retryable(&error));
        assert!(!is_retryable(&cancelled("https://photos.example/a.jpg")));
    }

    #[test]
    fn unreachable_host_fails_without_panicking() {
        let fetcher = fetcher(0, 1, 1024);

        // Port 9 on localhost (discard) is not serving HTTP in test environments
        let result = fetcher.fetch("http://127.0.0.1:9/missing.jpg", &CancellationToken::new());
        assert!(matches!(
            result,
            Err(FetchError::Transport { .. }) | Err(FetchError::Timeout { .. })
        ));
    }

    #[test]
    fn server_error_is_retried_then_succeeds() {
        let ok = b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\nConnection: close\r\n\r\nabc".to_vec();
        let (url, hits) = serve(vec![UNAVAILABLE.to_vec(), ok]);

        let result = fetcher(2, 1, 1024).fetch(&url, &CancellationToken::new());

        assert_eq!(result, Ok(b"abc".to_vec()));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn client_error_is_not_retried() {
        let (url, hits) = serve(vec![NOT_FOUND.to_vec(), NOT_FOUND.to_vec()]);

        let result = fetcher(2, 1, 1024).fetch(&url, &CancellationToken::new());

        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn body_without_length_is_capped() {
        let mut response = b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n".to_vec();
        response.extend_from_slice(&[b'x'; 64]);
        let (url, _) = serve(vec![response]);

        let result = fetcher(0, 1, 10).fetch(&url, &CancellationToken::new());

        assert!(matches!(result, Err(FetchError::TooLarge { limit: 10, .. })));
    }

    #[test]
    fn cancelled_token_skips_request() {
        let (url, hits) = serve(vec![NOT_FOUND.to_vec()]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = fetcher(2, 1, 1024).fetch(&url, &cancel);

        assert!(matches!(result, Err(FetchError::Cancelled { .. })));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn cancel_interrupts_retry_backoff() {
        let (url, hits) = serve(vec![UNAVAILABLE.to_vec(); 10]);
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            canceller.cancel();
        });

        let start = Instant::now();
        let result = fetcher(10, 10_000, 1024).fetch(&url, &cancel);

        assert!(matches!(result, Err(FetchError::Cancelled { .. })));
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
