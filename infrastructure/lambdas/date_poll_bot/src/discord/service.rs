use super::client::{Client, ClientError};
use super::mapper::{to_message_send, to_poll_message, MapError};
use super::model::Message as DiscordMessage;
use chrono::{DateTime, TimeZone, Utc};
use date_decider_libs::{message::Message, poll::DatePoll};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("could not convert poll to a Discord poll: {0}")]
    Map(#[from] MapError),
    #[error("client could not {action}: {source}")]
    Client {
        action: &'static str,
        #[source]
        source: ClientError,
    },
}

fn client_error(action: &'static str) -> impl FnOnce(ClientError) -> ServiceError {
    move |source| ServiceError::Client { action, source }
}

/// Posts, pins and finds date polls through a Discord [`Client`]
pub struct Service<C: Client> {
    client: C,
}

impl<C: Client> Service<C> {
    pub fn new(client: C) -> Service<C> {
        Service { client }
    }

    /// Sends a text message, returning its id
    pub async fn send_message(
        &self,
        channel_id: &str,
        message: &Message,
    ) -> Result<String, ServiceError> {
        let sent = self
            .client
            .send_message(channel_id, &to_message_send(message))
            .await
            .map_err(client_error("send message to channel"))?;

        Ok(sent.id)
    }

    /// Posts a poll, returning the id of the message carrying it.
    /// Nothing is sent if the poll has already expired at `now`.
    pub async fn send_poll<Z: TimeZone>(
        &self,
        channel_id: &str,
        poll: &DatePoll<Z>,
        now: DateTime<Utc>,
    ) -> Result<String, ServiceError> {
        let data = to_poll_message(poll, now)?;
        let sent = self
            .client
            .send_message(channel_id, &data)
            .await
            .map_err(client_error("send poll to channel"))?;

        Ok(sent.id)
    }

    pub async fn pin_poll(&self, channel_id: &str, poll_id: &str) -> Result<(), ServiceError> {
        self.client
            .pin_message(channel_id, poll_id)
            .await
            .map_err(client_error("pin poll in channel"))
    }

    pub async fn unpin_poll(&self, channel_id: &str, poll_id: &str) -> Result<(), ServiceError> {
        self.client
            .unpin_message(channel_id, poll_id)
            .await
            .map_err(client_error("unpin poll in channel"))
    }

    /// The most recently pinned message of the channel that carries a poll
    pub async fn latest_pinned_poll(
        &self,
        channel_id: &str,
    ) -> Result<Option<DiscordMessage>, ServiceError> {
        let pinned = self
            .client
            .pinned_messages(channel_id)
            .await
            .map_err(client_error("list pinned messages of channel"))?;

        Ok(pinned.into_iter().find(|message| message.poll.is_some()))
    }
}
