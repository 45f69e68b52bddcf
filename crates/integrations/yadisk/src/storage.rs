use std::path::Path;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Body, Client, Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, instrument};

use darkroom_provider::{CloudStorage, FolderStatus, ProviderError};

use crate::config::YandexDiskConfig;
use crate::error::YandexDiskError;
use crate::types::{Resource, UploadLink};

/// Characters escaped inside the `path` query parameter. `+` must be
/// escaped or the server reads it as a space; `:` and `/` stay literal.
const PATH_PARAM: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'=')
    .add(b'?');

/// Cloud storage backed by the Yandex Disk REST API.
pub struct YandexDiskStorage {
    config: YandexDiskConfig,
    client: Client,
}

impl YandexDiskStorage {
    pub fn new(config: YandexDiskConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { config, client }
    }

    pub fn with_client(config: YandexDiskConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn url(&self, endpoint: &str, path: &str) -> String {
        format!(
            "{}/v1/disk/{endpoint}?path={}",
            self.config.api_base_url.trim_end_matches('/'),
            utf8_percent_encode(path, PATH_PARAM)
        )
    }

    fn authorized(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url).header(
            reqwest::header::AUTHORIZATION,
            format!("OAuth {}", self.config.oauth_token.expose_secret()),
        )
    }

    fn transport_error(&self, err: reqwest::Error, timeout: std::time::Duration) -> YandexDiskError {
        if err.is_timeout() {
            YandexDiskError::Timeout(timeout)
        } else {
            YandexDiskError::Http(err)
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, YandexDiskError> {
        request
            .send()
            .await
            .map_err(|e| self.transport_error(e, self.config.request_timeout))
    }

    async fn api_error(response: reqwest::Response) -> YandexDiskError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        YandexDiskError::Api { status, body }
    }
}

#[async_trait]
impl CloudStorage for YandexDiskStorage {
    #[instrument(skip(self), fields(provider = "yadisk"))]
    async fn create_folder(&self, path: &str) -> Result<FolderStatus, ProviderError> {
        let response = self
            .send(self.authorized(Method::PUT, &self.url("resources", path)))
            .await?;

        match response.status() {
            StatusCode::CREATED => {
                info!(path, "cloud folder created");
                Ok(FolderStatus::Created)
            }
            StatusCode::CONFLICT => {
                info!(path, "cloud folder already exists");
                Ok(FolderStatus::AlreadyExists)
            }
            _ => Err(Self::api_error(response).await.into()),
        }
    }

    #[instrument(skip(self), fields(provider = "yadisk"))]
    async fn publish(&self, path: &str) -> Result<(), ProviderError> {
        let response = self
            .send(self.authorized(Method::PUT, &self.url("resources/publish", path)))
            .await?;

        if response.status() != StatusCode::OK {
            return Err(Self::api_error(response).await.into());
        }
        info!(path, "cloud folder published");
        Ok(())
    }

    #[instrument(skip(self), fields(provider = "yadisk"))]
    async fn public_link(&self, path: &str) -> Result<Option<String>, ProviderError> {
        let response = self
            .send(self.authorized(Method::GET, &self.url("resources", path)))
            .await?;

        match response.status() {
            StatusCode::OK => {
                let resource: Resource = response
                    .json()
                    .await
                    .map_err(|e| YandexDiskError::InvalidResponse(e.to_string()))?;
                Ok(resource.public_url)
            }
            StatusCode::NOT_FOUND => Err(YandexDiskError::NotFound(path.to_owned()).into()),
            _ => Err(Self::api_error(response).await.into()),
        }
    }

    #[instrument(skip(self, local_path), fields(provider = "yadisk", local = %local_path.display()))]
    async fn upload(&self, local_path: &Path, remote_path: &str) -> Result<(), ProviderError> {
        let link_url = format!("{}&overwrite=true", self.url("resources/upload", remote_path));
        let response = self
            .send(self.authorized(Method::GET, &link_url))
            .await?;
        if response.status() != StatusCode::OK {
            return Err(Self::api_error(response).await.into());
        }
        let link: UploadLink = response
            .json()
            .await
            .map_err(|e| YandexDiskError::InvalidResponse(e.to_string()))?;

        let method = Method::from_bytes(link.method.as_bytes())
            .map_err(|e| YandexDiskError::InvalidResponse(format!("upload method: {e}")))?;
        let file = tokio::fs::File::open(local_path)
            .await
            .map_err(YandexDiskError::Io)?;
        let size = file.metadata().await.map_err(YandexDiskError::Io)?.len();
        debug!(bytes = size, "streaming file body");

        let response = self
            .client
            .request(method, &link.href)
            .timeout(self.config.upload_timeout)
            .header(CONTENT_LENGTH, size)
            .body(Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await
            .map_err(|e| self.transport_error(e, self.config.upload_timeout))?;

        match response.status() {
            StatusCode::CREATED | StatusCode::ACCEPTED => {
                info!(remote_path, "file uploaded");
                Ok(())
            }
            _ => Err(Self::api_error(response).await.into()),
        }
    }
}
