use reqwest::{Client, RequestBuilder};

use chirp_types::api::{InteractRequest, InteractResponse};
use chirp_types::models::Post;

use crate::cursor::PageRequest;
use crate::error::FeedError;
use crate::interaction::InteractionTransport;
use crate::pager::FeedSource;

/// HTTP transport for both the feed and interaction endpoints.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// `token` is a session token; without one every request is a guest request.
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, FeedError> {
        if !resp.status().is_success() {
            return Err(FeedError::Status(resp.status().as_u16()));
        }
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl FeedSource for HttpClient {
    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<Post>, FeedError> {
        let resp = self
            .authorized(self.client.get(format!("{}/user/fetch_chirps", self.base_url)))
            .query(&[("offset", i64::from(request.offset)), ("user", request.user)])
            .send()
            .await?;

        Self::read_json(resp).await
    }
}

impl InteractionTransport for HttpClient {
    async fn send(&self, request: InteractRequest) -> Result<InteractResponse, FeedError> {
        let resp = self
            .authorized(self.client.post(format!("{}/interact_chirp", self.base_url)))
            .json(&request)
            .send()
            .await?;

        Self::read_json(resp).await
    }
}
