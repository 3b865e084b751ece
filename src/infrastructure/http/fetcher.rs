use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::errors::ImageError;

/// Downloads remote images, e.g. avatars handed over by an OAuth provider.
#[derive(Clone, Debug)]
pub struct HttpImageFetcher {
    client: Client,
    max_bytes: usize,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self, ImageError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImageError::Transport(e.to_string()))?;

        Ok(HttpImageFetcher { client, max_bytes })
    }

    pub async fn fetch(&self, raw_url: &str) -> Result<Vec<u8>, ImageError> {
        let url = Url::parse(raw_url).map_err(|e| ImageError::InvalidUrl(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ImageError::InvalidUrl(format!("unsupported scheme: {}", url.scheme())));
        }

        let mut response = self.client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;

        if response.content_length().is_some_and(|len| len > self.max_bytes as u64) {
            return Err(ImageError::TooLarge(self.max_bytes));
        }

        // Chunked responses carry no length, so the cap is enforced while reading
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(ImageError::TooLarge(self.max_bytes));
            }
            body.extend_from_slice(&chunk);
        }

        debug!(url = %url, bytes = body.len(), "Fetched remote image");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Read, Write},
        net::TcpListener,
        thread,
    };

    use super::*;

    /// Serves a single chunked 200 response that never ends.
    fn endless_chunked_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request);

            let head = "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nTransfer-Encoding: chunked\r\n\r\n";
            if stream.write_all(head.as_bytes()).is_err() {
                return;
            }
            let chunk = [0u8; 1024];
            // Stops once the client hangs up
            while stream.write_all(b"400\r\n").is_ok()
                && stream.write_all(&chunk).is_ok()
                && stream.write_all(b"\r\n").is_ok()
            {}
        });

        format!("http://{}/avatar.png", addr)
    }

    fn fetcher() -> HttpImageFetcher {
        HttpImageFetcher::new(Duration::from_secs(1), 1024).unwrap()
    }

    #[tokio::test]
    async fn rejects_non_http_schemes() {
        let err = fetcher().fetch("file:///etc/passwd").await.unwrap_err();
        assert!(matches!(err, ImageError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn rejects_malformed_urls() {
        let err = fetcher().fetch("not a url").await.unwrap_err();
        assert!(matches!(err, ImageError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        // Port 9 (discard) on loopback is closed on test machines
        let err = fetcher().fetch("http://127.0.0.1:9/a.png").await.unwrap_err();
        assert!(matches!(err, ImageError::Transport(_)));
    }

    #[tokio::test]
    async fn chunked_body_over_the_cap_is_cut_off() {
        let url = endless_chunked_server();

        let err = fetcher().fetch(&url).await.unwrap_err();

        assert!(matches!(err, ImageError::TooLarge(1024)));
    }
}
