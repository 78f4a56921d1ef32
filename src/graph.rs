//! Directory graph client
//!
//! Thin pass-through over the Microsoft Graph REST API. The caller supplies a
//! delegated access token; no token exchange happens here.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::AppConfig;

pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Graph API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),
}

/// Collection envelope returned by list endpoints
#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

#[derive(Debug, Serialize)]
struct ChatMessageBody<'a> {
    content: &'a str,
    #[serde(rename = "contentType")]
    content_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GraphClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Result<Self, GraphError> {
        // Keep the version segment when joining relative paths.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)?;
        if base_url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, GraphError> {
        Self::new(reqwest::Client::new(), &config.graph_base_url)
    }

    /// `GET /me`
    pub async fn user_profile(&self, access_token: &str) -> Result<Value, GraphError> {
        let url = self.endpoint(&["me"])?;
        self.get_json(url, access_token).await
    }

    /// `GET /me/drive/root/children`, first `limit` items (default 10)
    pub async fn user_files(
        &self,
        access_token: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Value>, GraphError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let mut url = self.endpoint(&["me", "drive", "root", "children"])?;
        url.query_pairs_mut().append_pair("$top", &limit.to_string());
        let page: Collection<Value> = self.get_json(url, access_token).await?;
        Ok(page.value)
    }

    /// `GET /me/events` ordered by start time, first `limit` items (default 10)
    pub async fn calendar_events(
        &self,
        access_token: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Value>, GraphError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let mut url = self.endpoint(&["me", "events"])?;
        url.query_pairs_mut()
            .append_pair("$top", &limit.to_string())
            .append_pair("$orderby", "start/dateTime");
        let page: Collection<Value> = self.get_json(url, access_token).await?;
        Ok(page.value)
    }

    /// Posts a plain-text message to a Teams channel.
    pub async fn send_channel_message(
        &self,
        access_token: &str,
        team_id: &str,
        channel_id: &str,
        content: &str,
    ) -> Result<Value, GraphError> {
        let url = self.endpoint(&["teams", team_id, "channels", channel_id, "messages"])?;
        let body = json!({
            "body": ChatMessageBody {
                content,
                content_type: "text",
            }
        });
        self.post_json(url, access_token, &body).await
    }

    /// Creates an item in a SharePoint list.
    pub async fn create_list_item(
        &self,
        access_token: &str,
        site_id: &str,
        list_id: &str,
        fields: Value,
    ) -> Result<Value, GraphError> {
        let url = self.endpoint(&["sites", site_id, "lists", list_id, "items"])?;
        self.post_json(url, access_token, &json!({ "fields": fields }))
            .await
    }

    /// Appends `segments` to the base path, percent-encoding each one so ids
    /// cannot introduce extra path segments or a query string.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GraphError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        access_token: &str,
    ) -> Result<T, GraphError> {
        debug!(path = url.path(), "Graph GET");
        let response = self.http.get(url).bearer_auth(access_token).send().await?;
        Self::decode(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: Url,
        access_token: &str,
        body: &Value,
    ) -> Result<T, GraphError> {
        debug!(path = url.path(), "Graph POST");
        let response = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GraphError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Graph API returned an error");
        Err(GraphError::Api {
            status: status.as_u16(),
            body,
        })
    }
}
