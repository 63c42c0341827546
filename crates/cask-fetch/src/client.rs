use async_trait::async_trait;

use crate::error::{DownloadError, Result};

/// Minimal HTTP surface the downloader needs. Bodies are fully buffered;
/// artifacts are verified as whole byte slices anyway.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issues a GET and returns the body on a 200 response. Any other
    /// status is an error.
    async fn get(&self, url: &str, authorization: Option<&str>) -> Result<Vec<u8>>;
}

/// Production client backed by `reqwest` with TLS 1.3 as the floor.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .min_tls_version(reqwest::tls::Version::TLS_1_3)
            .build()
            .map_err(|e| DownloadError::InvalidConfiguration(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str, authorization: Option<&str>) -> Result<Vec<u8>> {
        let mut request = self.client.get(url);
        if let Some(authorization) = authorization {
            request = request.header(reqwest::header::AUTHORIZATION, authorization);
        }
        let response = request.send().await.map_err(|source| DownloadError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| DownloadError::Request {
            url: url.to_string(),
            source,
        })?;
        Ok(body.to_vec())
    }
}
