use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use tracing::{debug, error, info, instrument};

use darkroom_core::PhoneNumber;
use darkroom_provider::{ClientDirectory, ProviderError};

use crate::config::YClientsConfig;
use crate::error::YClientsError;
use crate::types::{ClientSearchRequest, ClientSearchResponse};

/// Client directory backed by the YClients company client list.
pub struct YClientsDirectory {
    config: YClientsConfig,
    client: Client,
}

impl YClientsDirectory {
    pub fn new(config: YClientsConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { config, client }
    }

    pub fn with_client(config: YClientsConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Fetch one page. `Ok(None)` means the listing ended: an empty page or
    /// a non-success status.
    async fn fetch_page(&self, page: u32) -> Result<Option<Vec<String>>, YClientsError> {
        let response = self
            .client
            .post(self.config.search_url())
            .header(
                reqwest::header::AUTHORIZATION,
                format!(
                    "Bearer {}, {}",
                    self.config.partner_token.expose_secret(),
                    self.config.user_token.expose_secret()
                ),
            )
            .header(reqwest::header::ACCEPT, "application/vnd.api.v2+json")
            .json(&ClientSearchRequest::page(page, self.config.page_size))
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!(page, status = status.as_u16(), %body, "client search failed");
            return Ok(None);
        }

        let parsed: ClientSearchResponse = response
            .json()
            .await
            .map_err(|e| YClientsError::InvalidResponse(e.to_string()))?;
        if parsed.data.is_empty() {
            return Ok(None);
        }
        Ok(Some(parsed.data.into_iter().map(|c| c.phone).collect()))
    }
}

/// Canonicalize a phone number as stored in the directory.
///
/// Entries come back as `+7...`, `8...` or bare `7...`; anything that does
/// not normalize is skipped.
fn canonical_phone(raw: &str) -> Option<PhoneNumber> {
    let compact: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    let candidate = if compact.len() == 11 && compact.starts_with('7') {
        format!("+{compact}")
    } else {
        compact
    };
    PhoneNumber::normalize(&candidate).ok()
}

#[async_trait]
impl ClientDirectory for YClientsDirectory {
    #[instrument(skip(self), fields(provider = "yclients", company = self.config.company_id))]
    async fn list_known_phone_numbers(&self) -> Result<HashSet<PhoneNumber>, ProviderError> {
        let mut phones = HashSet::new();
        let mut skipped = 0usize;

        for page in 1..=self.config.max_pages {
            let Some(raw) = self.fetch_page(page).await? else {
                break;
            };
            debug!(page, entries = raw.len(), "client page received");
            for entry in raw {
                match canonical_phone(&entry) {
                    Some(phone) => {
                        phones.insert(phone);
                    }
                    None => skipped += 1,
                }
            }
        }

        info!(known = phones.len(), skipped, "client directory loaded");
        Ok(phones)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    struct MockYClientsServer {
        listener: tokio::net::TcpListener,
        base_url: String,
    }

    impl MockYClientsServer {
        async fn start() -> Self {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("failed to bind mock server");
            let port = listener.local_addr().unwrap().port();
            let base_url = format!("http://127.0.0.1:{port}");
            Self { listener, base_url }
        }

        async fn respond_sequence(self, responses: Vec<(u16, &'static str)>) -> Vec<String> {
            let mut requests = Vec::new();
            for (status_code, body) in responses {
                let (mut stream, _) = self.listener.accept().await.unwrap();
                requests.push(read_request(&mut stream).await);

                let response = format!(
                    "HTTP/1.1 {status_code} OK\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\
                     \r\n\
                     {body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
            }
            requests
        }
    }

    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn directory_for(server: &MockYClientsServer) -> YClientsDirectory {
        YClientsDirectory::new(
            YClientsConfig::new("partner", "user", 77)
                .with_api_base_url(&server.base_url)
                .with_page_size(2),
        )
    }

    fn phone(s: &str) -> PhoneNumber {
        PhoneNumber::normalize(s).unwrap()
    }

    #[test]
    fn canonical_phone_forms() {
        assert_eq!(canonical_phone("+79161234567"), Some(phone("+79161234567")));
        assert_eq!(canonical_phone("89161234567"), Some(phone("+79161234567")));
        assert_eq!(canonical_phone("79161234567"), Some(phone("+79161234567")));
        assert_eq!(canonical_phone("+7 (916) 123-45-67"), Some(phone("+79161234567")));
        assert_eq!(canonical_phone(""), None);
        assert_eq!(canonical_phone("12345"), None);
    }

    #[tokio::test]
    async fn paginates_until_empty_page() {
        let server = MockYClientsServer::start().await;
        let directory = directory_for(&server);
        let handle = tokio::spawn(server.respond_sequence(vec![
            (
                200,
                r#"{"data":[{"id":1,"name":"A","phone":"+79160000001"},{"id":2,"name":"B","phone":"79160000002"}]}"#,
            ),
            (200, r#"{"data":[{"id":3,"name":"C","phone":"not a phone"}]}"#),
            (200, r#"{"data":[]}"#),
        ]));

        let phones = directory.list_known_phone_numbers().await.unwrap();
        let requests = handle.await.unwrap();

        assert_eq!(phones.len(), 2);
        assert!(phones.contains(&phone("+79160000001")));
        assert!(phones.contains(&phone("89160000002")));
        assert_eq!(requests.len(), 3);
        assert!(requests[0].starts_with("POST /api/v1/company/77/clients/search"));
        assert!(requests[0].contains(r#""page":1"#));
        assert!(requests[2].contains(r#""page":3"#));
        assert!(requests[0].contains("Bearer partner, user"));
    }

    #[tokio::test]
    async fn non_200_stops_with_partial_result() {
        let server = MockYClientsServer::start().await;
        let directory = directory_for(&server);
        let handle = tokio::spawn(server.respond_sequence(vec![
            (200, r#"{"data":[{"phone":"+79160000001"}]}"#),
            (401, r#"{"success":false}"#),
        ]));

        let phones = directory.list_known_phone_numbers().await.unwrap();
        handle.await.unwrap();
        assert_eq!(phones.len(), 1);
    }

    #[tokio::test]
    async fn is_known_uses_full_listing() {
        let server = MockYClientsServer::start().await;
        let directory = directory_for(&server);
        let handle = tokio::spawn(server.respond_sequence(vec![
            (200, r#"{"data":[{"phone":"+79160000001"}]}"#),
            (200, r#"{"data":[]}"#),
        ]));

        assert!(directory.is_known(&phone("89160000001")).await.unwrap());
        handle.await.unwrap();
    }
}
