use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::media_api::{AccessToken, MediaApi, MediaApiError, StreamUrl};
use crate::config::MediaApiConfig;

const REMOTE_ADDR_HEADER: &str = "X-Customer-Remote-Addr";

/// RedGifs API client using OAuth client credentials
pub struct RedGifsClient {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    user_agent: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GifResponse {
    gif: Gif,
}

#[derive(Debug, Deserialize)]
struct Gif {
    urls: GifUrls,
}

#[derive(Debug, Deserialize)]
struct GifUrls {
    hd: Option<String>,
    sd: Option<String>,
}

impl RedGifsClient {
    /// Create a new RedGifs client
    pub fn new(config: &MediaApiConfig) -> Result<Self, MediaApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    pub(crate) fn token_url(&self) -> String {
        format!("{}/v2/oauth/client", self.base_url)
    }

    pub(crate) fn gif_url(&self, resource_id: &str) -> String {
        format!("{}/v2/gifs/{}", self.base_url, resource_id)
    }

    async fn error_for_status(response: Response) -> MediaApiError {
        let status = response.status();
        match status {
            StatusCode::NOT_FOUND | StatusCode::GONE => MediaApiError::NotFound {
                status: status.as_u16(),
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => MediaApiError::Unauthorized {
                status: status.as_u16(),
            },
            _ => MediaApiError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            },
        }
    }
}

#[async_trait::async_trait]
impl MediaApi for RedGifsClient {
    async fn request_new_access_token(&self) -> Result<AccessToken, MediaApiError> {
        let url = self.token_url();
        debug!("Requesting new access token from: {}", url);

        let response = self
            .client
            .post(&url)
            .header(USER_AGENT, &self.user_agent)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| MediaApiError::Decode(e.to_string()))?;

        if body.access_token.is_empty() {
            return Err(MediaApiError::MissingToken);
        }

        info!("Obtained new access token");
        Ok(AccessToken::new(body.access_token))
    }

    async fn lookup_stream_url(
        &self,
        host: &str,
        user_agent: &str,
        resource_id: &str,
        token: &AccessToken,
    ) -> Result<StreamUrl, MediaApiError> {
        let url = self.gif_url(resource_id);
        debug!("Looking up stream URL: {}", url);

        let mut request = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", token.expose()))
            .header(USER_AGENT, user_agent);

        if !host.is_empty() {
            request = request.header(REMOTE_ADDR_HEADER, host);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let body: GifResponse = response
            .json()
            .await
            .map_err(|e| MediaApiError::Decode(e.to_string()))?;

        body.gif
            .urls
            .hd
            .or(body.gif.urls.sd)
            .ok_or_else(|| MediaApiError::Decode(format!("gif '{}' has no stream URL", resource_id)))
    }

    fn api_name(&self) -> &'static str {
        "RedGifs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config_for(base_url: &str) -> MediaApiConfig {
        MediaApiConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            probe_id: "probe".to_string(),
            probe_host: String::new(),
            user_agent: "rotator-test".to_string(),
            base_url: base_url.to_string(),
            timeout_seconds: 5,
        }
    }

    #[test]
    fn test_url_construction() {
        let client = RedGifsClient::new(&config_for("https://api.example.com/")).unwrap();
        assert_eq!(client.token_url(), "https://api.example.com/v2/oauth/client");
        assert_eq!(
            client.gif_url("probe"),
            "https://api.example.com/v2/gifs/probe"
        );
    }

    #[tokio::test]
    async fn test_request_new_access_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/oauth/client")
            .match_header("user-agent", "rotator-test")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "client_credentials".into()),
                Matcher::UrlEncoded("client_id".into(), "client-id".into()),
                Matcher::UrlEncoded("client_secret".into(), "client-secret".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"fresh-token","token_type":"Bearer"}"#)
            .create_async()
            .await;

        let client = RedGifsClient::new(&config_for(&server.url())).unwrap();
        let token = client.request_new_access_token().await.unwrap();

        assert_eq!(token.expose(), "fresh-token");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_request_new_access_token_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _rejected = server
            .mock("POST", "/v2/oauth/client")
            .with_status(401)
            .create_async()
            .await;

        let client = RedGifsClient::new(&config_for(&server.url())).unwrap();
        let err = client.request_new_access_token().await.unwrap_err();
        assert!(matches!(err, MediaApiError::Unauthorized { status: 401 }));
    }

    #[tokio::test]
    async fn test_request_new_access_token_empty() {
        let mut server = mockito::Server::new_async().await;
        let _empty = server
            .mock("POST", "/v2/oauth/client")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":""}"#)
            .create_async()
            .await;

        let client = RedGifsClient::new(&config_for(&server.url())).unwrap();
        let err = client.request_new_access_token().await.unwrap_err();
        assert!(matches!(err, MediaApiError::MissingToken));
    }

    #[tokio::test]
    async fn test_lookup_stream_url_prefers_hd() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/gifs/probe")
            .match_header("authorization", "Bearer fresh-token")
            .match_header("user-agent", "probe-agent")
            .match_header(REMOTE_ADDR_HEADER, "203.0.113.7")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"gif":{"urls":{"hd":"https://media/hd.mp4","sd":"https://media/sd.mp4"}}}"#)
            .create_async()
            .await;

        let client = RedGifsClient::new(&config_for(&server.url())).unwrap();
        let url = client
            .lookup_stream_url(
                "203.0.113.7",
                "probe-agent",
                "probe",
                &AccessToken::new("fresh-token"),
            )
            .await
            .unwrap();

        assert_eq!(url, "https://media/hd.mp4");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_lookup_stream_url_falls_back_to_sd() {
        let mut server = mockito::Server::new_async().await;
        let _sd = server
            .mock("GET", "/v2/gifs/probe")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"gif":{"urls":{"sd":"https://media/sd.mp4"}}}"#)
            .create_async()
            .await;

        let client = RedGifsClient::new(&config_for(&server.url())).unwrap();
        let url = client
            .lookup_stream_url("", "probe-agent", "probe", &AccessToken::new("t"))
            .await
            .unwrap();
        assert_eq!(url, "https://media/sd.mp4");
    }

    #[tokio::test]
    async fn test_lookup_omits_remote_addr_when_host_empty() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/gifs/probe")
            .match_header(REMOTE_ADDR_HEADER, Matcher::Missing)
            .with_status(410)
            .create_async()
            .await;

        let client = RedGifsClient::new(&config_for(&server.url())).unwrap();
        let err = client
            .lookup_stream_url("", "probe-agent", "probe", &AccessToken::new("t"))
            .await
            .unwrap_err();

        assert!(matches!(err, MediaApiError::NotFound { status: 410 }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_lookup_status_mapping() {
        let mut server = mockito::Server::new_async().await;
        let _missing = server
            .mock("GET", "/v2/gifs/missing")
            .with_status(404)
            .create_async()
            .await;
        let _forbidden = server
            .mock("GET", "/v2/gifs/forbidden")
            .with_status(403)
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/v2/gifs/broken")
            .with_status(500)
            .with_body("upstream down")
            .create_async()
            .await;

        let client = RedGifsClient::new(&config_for(&server.url())).unwrap();
        let token = AccessToken::new("t");

        let missing = client
            .lookup_stream_url("", "ua", "missing", &token)
            .await
            .unwrap_err();
        assert!(missing.is_not_found());

        let forbidden = client
            .lookup_stream_url("", "ua", "forbidden", &token)
            .await
            .unwrap_err();
        assert!(matches!(forbidden, MediaApiError::Unauthorized { status: 403 }));

        let broken = client
            .lookup_stream_url("", "ua", "broken", &token)
            .await
            .unwrap_err();
        match broken {
            MediaApiError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lookup_transport_error() {
        let client = RedGifsClient::new(&config_for("http://127.0.0.1:1")).unwrap();
        let err = client
            .lookup_stream_url("", "ua", "probe", &AccessToken::new("t"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaApiError::Transport(_)));
    }
}
