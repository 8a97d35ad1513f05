//! HTTPS implementation of [`TrelloApi`] on top of `reqwest`.

use crate::api::TrelloApi;
use crate::error::{Error, Result};
use crate::model::{
    Board, BoardList, Card, CardId, CheckItem, CheckItemId, Checklist, ChecklistId, Label,
    NewCheckItem, NewChecklist, ValueWrapper,
};
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Public Trello REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.trello.com/1";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection settings for [`HttpTrelloClient`].
#[derive(Clone)]
pub struct ClientConfig {
    /// API root, e.g. [`DEFAULT_BASE_URL`].
    pub base_url: String,
    /// Application key issued by Trello.
    pub api_key: String,
    /// Member token obtained from the authorization flow.
    pub token: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Trello client that talks to the REST API over HTTPS.
///
/// Authentication uses the `key` and `token` query parameters on every
/// request. No retry or backoff is performed.
#[derive(Debug, Clone)]
pub struct HttpTrelloClient {
    http: reqwest::Client,
    base_url: Url,
    config: ClientConfig,
}

impl HttpTrelloClient {
    /// Build a client from the given settings.
    ///
    /// # Errors
    ///
    /// - `Error::MissingCredentials` if the key or token is empty
    /// - `Error::InvalidBaseUrl` if `base_url` is not an absolute URL
    /// - `Error::Http` if the underlying client cannot be constructed
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() || config.token.trim().is_empty() {
            return Err(Error::MissingCredentials);
        }

        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| Error::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(config.base_url.clone()));
        }

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    /// Absolute URL for an API path, with credentials attached.
    ///
    /// Each segment is percent-encoded on its own, so an id cannot add path
    /// segments or a query.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("key", &self.config.api_key)
            .append_pair("token", &self.config.token);
        Ok(url)
    }

    async fn send<B, T>(&self, method: Method, path: &[&str], body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let bytes = self.send_raw(method, path, body).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send_raw<B>(
        &self,
        method: Method,
        path: &[&str],
        body: Option<&B>,
    ) -> Result<Vec<u8>>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.endpoint(path)?;
        debug!(method = %method, path = %url.path(), "Trello request");

        let mut request = self.http.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                method: method_name(&method),
                path: url_path(path),
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T> {
        self.send::<(), T>(Method::GET, path, None).await
    }
}

fn url_path(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}

fn method_name(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        _ => "HTTP",
    }
}

#[async_trait]
impl TrelloApi for HttpTrelloClient {
    async fn my_boards(&self) -> Result<Vec<Board>> {
        self.get(&["members", "me", "boards"]).await
    }

    async fn board_lists(&self, board_id: &str) -> Result<Vec<BoardList>> {
        self.get(&["boards", board_id, "lists"]).await
    }

    async fn board_labels(&self, board_id: &str) -> Result<Vec<Label>> {
        self.get(&["boards", board_id, "labels"]).await
    }

    async fn board_short_url(&self, board_id: &str) -> Result<String> {
        let wrapped: ValueWrapper = self.get(&["boards", board_id, "shortUrl"]).await?;
        Ok(wrapped.value)
    }

    async fn list_cards(&self, list_id: &str) -> Result<Vec<Card>> {
        self.get(&["lists", list_id, "cards"]).await
    }

    async fn board_cards(&self, board_id: &str) -> Result<Vec<Card>> {
        self.get(&["boards", board_id, "cards"]).await
    }

    async fn card_checklists(&self, card_id: &CardId) -> Result<Vec<Checklist>> {
        self.get(&["cards", card_id.as_str(), "checklists"]).await
    }

    async fn create_checklist(&self, checklist: NewChecklist) -> Result<Checklist> {
        self.send(Method::POST, &["checklists"], Some(&checklist))
            .await
    }

    async fn create_check_item(
        &self,
        checklist_id: &ChecklistId,
        item: NewCheckItem,
    ) -> Result<CheckItem> {
        self.send(
            Method::POST,
            &["checklists", checklist_id.as_str(), "checkItems"],
            Some(&item),
        )
        .await
    }

    async fn delete_check_item(
        &self,
        checklist_id: &ChecklistId,
        item_id: &CheckItemId,
    ) -> Result<()> {
        self.send_raw::<()>(
            Method::DELETE,
            &[
                "checklists",
                checklist_id.as_str(),
                "checkItems",
                item_id.as_str(),
            ],
            None,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config(base_url: &str) -> ClientConfig {
        ClientConfig {
            base_url: base_url.to_string(),
            api_key: "k3y".to_string(),
            token: "t0ken".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[rstest]
    #[case::missing_key("", "t0ken")]
    #[case::missing_token("k3y", "")]
    #[case::blank_token("k3y", "   ")]
    fn test_missing_credentials_rejected(#[case] key: &str, #[case] token: &str) {
        let result = HttpTrelloClient::new(ClientConfig {
            api_key: key.to_string(),
            token: token.to_string(),
            ..config(DEFAULT_BASE_URL)
        });
        assert!(matches!(result, Err(Error::MissingCredentials)));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = HttpTrelloClient::new(config("not a url"));
        assert!(matches!(result, Err(Error::InvalidBaseUrl(_))));
    }

    #[rstest]
    #[case::default_base(DEFAULT_BASE_URL, &["cards", "c1", "checklists"], "https://api.trello.com/1/cards/c1/checklists")]
    #[case::trailing_slash("https://api.trello.com/1/", &["lists", "l1", "cards"], "https://api.trello.com/1/lists/l1/cards")]
    #[case::host_only("http://localhost:8080", &["checklists"], "http://localhost:8080/checklists")]
    #[case::slash_in_id(DEFAULT_BASE_URL, &["boards", "a/b", "lists"], "https://api.trello.com/1/boards/a%2Fb/lists")]
    #[case::query_in_id(DEFAULT_BASE_URL, &["lists", "l1?x=1#f", "cards"], "https://api.trello.com/1/lists/l1%3Fx=1%23f/cards")]
    fn test_endpoint_joins_path_and_credentials(
        #[case] base: &str,
        #[case] path: &[&str],
        #[case] expected_prefix: &str,
    ) {
        let client = HttpTrelloClient::new(config(base)).unwrap();
        let url = client.endpoint(path).unwrap();
        assert_eq!(url.as_str(), format!("{expected_prefix}?key=k3y&token=t0ken"));
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let rendered = format!("{:?}", config(DEFAULT_BASE_URL));
        assert!(!rendered.contains("t0ken"));
        assert!(!rendered.contains("k3y"));
    }
}
