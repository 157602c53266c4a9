use super::model::{Message, MessageSend, PinnedMessages};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/paschi/discord-date-decider, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request to Discord failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Discord answered {status}: {body}")]
    Status { status: u16, body: String },
}

/// The Discord REST calls the bot relies on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Client: Send + Sync {
    async fn send_message(
        &self,
        channel_id: &str,
        data: &MessageSend,
    ) -> Result<Message, ClientError>;

    async fn pin_message(&self, channel_id: &str, message_id: &str) -> Result<(), ClientError>;

    async fn unpin_message(&self, channel_id: &str, message_id: &str) -> Result<(), ClientError>;

    /// Pinned messages of a channel, most recently pinned first
    async fn pinned_messages(&self, channel_id: &str) -> Result<Vec<Message>, ClientError>;
}

pub struct HttpClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl HttpClient {
    pub fn new(token: &str, api_base: &str) -> Result<HttpClient, ClientError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(HttpClient {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Bot {}", self.token))
    }

    fn pins_url(&self, channel_id: &str) -> String {
        format!("{}/channels/{}/messages/pins", self.api_base, channel_id)
    }

    fn pin_url(&self, channel_id: &str, message_id: &str) -> String {
        format!("{}/{}", self.pins_url(channel_id), message_id)
    }
}

async fn checked(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ClientError::Status {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}

async fn decoded<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    Ok(checked(response).await?.json().await?)
}

#[async_trait]
impl Client for HttpClient {
    async fn send_message(
        &self,
        channel_id: &str,
        data: &MessageSend,
    ) -> Result<Message, ClientError> {
        let url = format!("{}/channels/{}/messages", self.api_base, channel_id);
        debug!(%url, "sending message");
        let request = self.http.post(url).json(data);

        decoded(self.authorized(request).send().await?).await
    }

    async fn pin_message(&self, channel_id: &str, message_id: &str) -> Result<(), ClientError> {
        let request = self
            .http
            .put(self.pin_url(channel_id, message_id))
            .header(CONTENT_LENGTH, 0);

        checked(self.authorized(request).send().await?).await?;
        Ok(())
    }

    async fn unpin_message(&self, channel_id: &str, message_id: &str) -> Result<(), ClientError> {
        let request = self.http.delete(self.pin_url(channel_id, message_id));

        checked(self.authorized(request).send().await?).await?;
        Ok(())
    }

    async fn pinned_messages(&self, channel_id: &str) -> Result<Vec<Message>, ClientError> {
        let request = self.http.get(self.pins_url(channel_id));
        let page: PinnedMessages = decoded(self.authorized(request).send().await?).await?;
        if page.has_more {
            debug!(channel_id, "only the first page of pins is read");
        }

        Ok(page.into_messages())
    }
}
