use crate::config::Config;
use crate::discord::{mapper::to_poll_state, Client, Service, ServiceError};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use date_decider_libs::{
    error::PollError,
    label,
    message::Message,
    poll::DatePoll,
    result::{aggregate_result, PollOutcome},
    time::target_month,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PollRequest {
    pub action: String,
    pub poll_channel_id: String,
    pub announcement_channel_id: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub poll_id: String,
    pub winning_dates: Vec<String>,
    pub finalized: bool,
}

#[derive(Error, Debug)]
pub enum BotError {
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("no pinned poll in channel {channel_id}")]
    NoPinnedPoll { channel_id: String },
    #[error(transparent)]
    Poll(#[from] PollError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

fn logged<T, E: std::fmt::Display>(step: &'static str, result: Result<T, E>) -> Result<T, E> {
    if let Err(err) = &result {
        error!(%err, "could not {}", step);
    }
    result
}

pub struct Bot<C: Client> {
    service: Service<C>,
    config: Config,
}

impl<C: Client> Bot<C> {
    pub fn new(service: Service<C>, config: Config) -> Bot<C> {
        Bot { service, config }
    }

    pub async fn handle(
        &self,
        request: &PollRequest,
        now: DateTime<Utc>,
    ) -> Result<PollResponse, BotError> {
        match request.action.as_str() {
            "startPoll" => {
                let poll_id = self.start_poll(request, now).await?;
                Ok(PollResponse {
                    poll_id,
                    winning_dates: vec![],
                    finalized: false,
                })
            }
            "closePoll" => {
                let outcome = self.close_poll(request).await?;
                Ok(PollResponse {
                    winning_dates: outcome.winning_dates.iter().map(label::encode).collect(),
                    poll_id: outcome.poll_id,
                    finalized: outcome.finalized,
                })
            }
            action => {
                error!(action, "unknown action");
                Err(BotError::UnknownAction(action.to_string()))
            }
        }
    }

    /// Posts and pins next month's poll, then announces it.
    /// Returns the id of the poll message.
    pub async fn start_poll(
        &self,
        request: &PollRequest,
        now: DateTime<Utc>,
    ) -> Result<String, BotError> {
        info!(?request, "executing 'startPoll' request");

        let today = now.with_timezone(&self.config.zone).date_naive();
        let (year, month) = target_month(today);
        let locale = self.config.locale;

        let question = locale.poll_question(year, month);
        let spec = self.config.candidate_spec(year, month);
        let poll = logged(
            "build poll",
            DatePoll::new(&question, &spec, &self.config.zone),
        )?;

        let poll_id = logged(
            "send poll to poll channel",
            self.service
                .send_poll(&request.poll_channel_id, &poll, now)
                .await,
        )?;
        info!(
            channel = %request.poll_channel_id,
            %poll_id,
            answers = poll.answers.len(),
            "sent poll to poll channel"
        );

        logged(
            "pin poll in poll channel",
            self.service
                .pin_poll(&request.poll_channel_id, &poll_id)
                .await,
        )?;
        info!(
            channel = %request.poll_channel_id,
            %poll_id,
            "pinned poll in poll channel"
        );

        let announcement = Message::poll_announcement(month, locale);
        let message_id = logged(
            "send message to announcement channel",
            self.service
                .send_message(&request.announcement_channel_id, &announcement)
                .await,
        )?;
        info!(
            channel = %request.announcement_channel_id,
            %message_id,
            "sent message to announcement channel"
        );

        Ok(poll_id)
    }

    /// Decides the latest pinned poll and announces the winning dates.
    /// A finalized poll is unpinned before the announcement.
    pub async fn close_poll(&self, request: &PollRequest) -> Result<PollOutcome<Tz>, BotError> {
        info!(?request, "executing 'closePoll' request");

        let message = logged(
            "find pinned poll in poll channel",
            self.service
                .latest_pinned_poll(&request.poll_channel_id)
                .await,
        )?;
        let (poll_id, state) = match message.as_ref().and_then(|message| {
            to_poll_state(message).map(|state| (message.id.as_str(), state))
        }) {
            Some(found) => found,
            None => {
                error!(channel = %request.poll_channel_id, "no pinned poll");
                return Err(BotError::NoPinnedPoll {
                    channel_id: request.poll_channel_id.clone(),
                });
            }
        };

        let outcome = logged(
            "decide poll",
            aggregate_result(
                poll_id,
                &state.tally,
                &state.options,
                state.finalized,
                &self.config.zone,
            ),
        )?;
        info!(
            %poll_id,
            winners = outcome.winning_dates.len(),
            finalized = outcome.finalized,
            "decided poll"
        );

        if outcome.finalized {
            logged(
                "unpin poll in poll channel",
                self.service
                    .unpin_poll(&request.poll_channel_id, poll_id)
                    .await,
            )?;
            info!(
                channel = %request.poll_channel_id,
                %poll_id,
                "unpinned poll in poll channel"
            );
        }

        let announcement = Message::result_announcement(&outcome, self.config.locale);
        let message_id = logged(
            "send message to announcement channel",
            self.service
                .send_message(&request.announcement_channel_id, &announcement)
                .await,
        )?;
        info!(
            channel = %request.announcement_channel_id,
            %message_id,
            "sent message to announcement channel"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discord::client::{ClientError, MockClient};
    use crate::discord::mapper::MapError;
    use crate::discord::model::{Message as DiscordMessage, MessageSend};
    use chrono::{TimeZone, Weekday};
    use date_decider_libs::message::Locale;

    const POLL_CHANNEL: &str = "poll-channel";
    const ANNOUNCEMENT_CHANNEL: &str = "announcement-channel";

    fn config() -> Config {
        Config {
            token: "token".to_string(),
            api_base: "http://localhost".to_string(),
            zone: chrono_tz::Europe::Berlin,
            locale: Locale::English,
            weekdays: vec![Weekday::Fri, Weekday::Sat],
            extra_days: vec![],
            excluded_days: vec![],
        }
    }

    fn request(action: &str) -> PollRequest {
        PollRequest {
            action: action.to_string(),
            poll_channel_id: POLL_CHANNEL.to_string(),
            announcement_channel_id: ANNOUNCEMENT_CHANNEL.to_string(),
        }
    }

    fn sent(id: &str) -> DiscordMessage {
        DiscordMessage {
            id: id.to_string(),
            poll: None,
        }
    }

    fn pinned_poll(id: &str, finalized: bool, counts: serde_json::Value) -> DiscordMessage {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "poll": {
                "question": { "text": "Poll for August 2025" },
                "answers": [
                    { "answer_id": 1, "poll_media": { "text": "Friday, 15.08.2025" } },
                    { "answer_id": 2, "poll_media": { "text": "Saturday, 16.08.2025" } },
                    { "answer_id": 3, "poll_media": { "text": "Friday, 22.08.2025" } }
                ],
                "results": { "is_finalized": finalized, "answer_counts": counts }
            }
        }))
        .unwrap()
    }

    fn is_poll_to(channel_id: &str, data: &MessageSend) -> bool {
        channel_id == POLL_CHANNEL && data.poll.is_some()
    }

    fn is_announcement(channel_id: &str, data: &MessageSend) -> bool {
        channel_id == ANNOUNCEMENT_CHANNEL && data.poll.is_none()
    }

    #[tokio::test]
    async fn starts_poll_for_next_month() {
        let mut client = MockClient::new();
        client
            .expect_send_message()
            .withf(|channel_id: &str, data: &MessageSend| {
                is_poll_to(channel_id, data)
                    && data.poll.as_ref().map_or(false, |poll| {
                        poll.question.text.as_deref() == Some("Poll for December 2025")
                            && poll.answers.len() == 8
                            && poll.answers[0].poll_media.text.as_deref()
                                == Some("Friday, 05.12.2025")
                            // 16 days minus Berlin's offset of one hour
                            && poll.duration == 16 * 24 - 1
                    })
            })
            .times(1)
            .returning(|_, _| Ok(sent("poll-id")));
        client
            .expect_pin_message()
            .withf(|channel_id: &str, message_id: &str| {
                channel_id == POLL_CHANNEL && message_id == "poll-id"
            })
            .times(1)
            .returning(|_, _| Ok(()));
        client
            .expect_send_message()
            .withf(|channel_id: &str, data: &MessageSend| {
                is_announcement(channel_id, data)
                    && data.allowed_mentions.is_some()
                    && data
                        .content
                        .as_deref()
                        .map_or(false, |content| content.contains("new poll for December"))
            })
            .times(1)
            .returning(|_, _| Ok(sent("announcement-id")));

        let bot = Bot::new(Service::new(client), config());
        let now = Utc.with_ymd_and_hms(2025, 11, 14, 12, 0, 0).unwrap();

        let response = bot.handle(&request("startPoll"), now).await.unwrap();

        assert_eq!(
            response,
            PollResponse {
                poll_id: "poll-id".to_string(),
                winning_dates: vec![],
                finalized: false,
            }
        );
    }

    #[tokio::test]
    async fn target_month_follows_the_configured_zone() {
        let mut client = MockClient::new();
        client
            .expect_send_message()
            .withf(|channel_id: &str, data: &MessageSend| {
                is_poll_to(channel_id, data)
                    && data.poll.as_ref().and_then(|poll| poll.question.text.as_deref())
                        == Some("Poll for February 2026")
            })
            .times(1)
            .returning(|_, _| Ok(sent("poll-id")));
        client.expect_pin_message().times(1).returning(|_, _| Ok(()));
        client
            .expect_send_message()
            .withf(|channel_id: &str, data: &MessageSend| is_announcement(channel_id, data))
            .times(1)
            .returning(|_, _| Ok(sent("announcement-id")));

        let bot = Bot::new(Service::new(client), config());
        // still December 31st in UTC, but already January in Berlin
        let now = Utc.with_ymd_and_hms(2025, 12, 31, 23, 30, 0).unwrap();

        let poll_id = bot.start_poll(&request("startPoll"), now).await;
        assert_eq!(poll_id.unwrap(), "poll-id");
    }

    #[tokio::test]
    async fn failed_pin_stops_start_poll() {
        let mut client = MockClient::new();
        client
            .expect_send_message()
            .withf(|channel_id: &str, data: &MessageSend| is_poll_to(channel_id, data))
            .times(1)
            .returning(|_, _| Ok(sent("poll-id")));
        client.expect_pin_message().times(1).returning(|_, _| {
            Err(ClientError::Status {
                status: 403,
                body: "Missing Permissions".to_string(),
            })
        });

        let bot = Bot::new(Service::new(client), config());
        let now = Utc.with_ymd_and_hms(2025, 11, 14, 12, 0, 0).unwrap();

        assert!(matches!(
            bot.start_poll(&request("startPoll"), now).await,
            Err(BotError::Service(ServiceError::Client {
                action: "pin poll in channel",
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn expired_poll_is_not_posted() {
        let mut client = MockClient::new();
        client.expect_send_message().never();
        client.expect_pin_message().never();

        let bot = Bot::new(Service::new(client), config());
        // the afternoon of the last day of the month is past noon expiry
        let now = Utc.with_ymd_and_hms(2025, 11, 30, 14, 0, 0).unwrap();

        assert!(matches!(
            bot.start_poll(&request("startPoll"), now).await,
            Err(BotError::Service(ServiceError::Map(MapError::Expired { .. })))
        ));
    }

    #[tokio::test]
    async fn closes_finalized_poll() {
        let pinned = vec![
            sent("rules"),
            pinned_poll(
                "poll-id",
                true,
                serde_json::json!([
                    { "id": 1, "count": 4 },
                    { "id": 3, "count": 4 },
                    { "id": 2, "count": 1 }
                ]),
            ),
        ];

        let mut client = MockClient::new();
        client
            .expect_pinned_messages()
            .withf(|channel_id: &str| channel_id == POLL_CHANNEL)
            .times(1)
            .returning(move |_| Ok(pinned.clone()));
        client
            .expect_unpin_message()
            .withf(|channel_id: &str, message_id: &str| {
                channel_id == POLL_CHANNEL && message_id == "poll-id"
            })
            .times(1)
            .returning(|_, _| Ok(()));
        client
            .expect_send_message()
            .withf(|channel_id: &str, data: &MessageSend| {
                is_announcement(channel_id, data)
                    && data.allowed_mentions.is_some()
                    && data.content.as_deref().map_or(false, |content| {
                        content.contains("**Friday, 15.08.2025** / **Friday, 22.08.2025**")
                    })
            })
            .times(1)
            .returning(|_, _| Ok(sent("announcement-id")));

        let bot = Bot::new(Service::new(client), config());
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap();

        let response = bot.handle(&request("closePoll"), now).await.unwrap();

        assert_eq!(
            response,
            PollResponse {
                poll_id: "poll-id".to_string(),
                winning_dates: vec![
                    "Friday, 15.08.2025".to_string(),
                    "Friday, 22.08.2025".to_string()
                ],
                finalized: true,
            }
        );
    }

    #[tokio::test]
    async fn open_poll_stays_pinned() {
        let pinned = vec![pinned_poll(
            "poll-id",
            false,
            serde_json::json!([{ "id": 2, "count": 2 }]),
        )];

        let mut client = MockClient::new();
        client
            .expect_pinned_messages()
            .times(1)
            .returning(move |_| Ok(pinned.clone()));
        client.expect_unpin_message().never();
        client
            .expect_send_message()
            .withf(|channel_id: &str, data: &MessageSend| {
                is_announcement(channel_id, data) && data.allowed_mentions.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(sent("announcement-id")));

        let bot = Bot::new(Service::new(client), config());
        let outcome = bot.close_poll(&request("closePoll")).await.unwrap();

        assert!(!outcome.finalized);
        assert_eq!(
            outcome.winning_dates,
            vec![chrono_tz::Europe::Berlin
                .with_ymd_and_hms(2025, 8, 16, 20, 0, 0)
                .unwrap()]
        );
    }

    #[tokio::test]
    async fn poll_without_votes_has_no_winner() {
        let pinned = vec![pinned_poll("poll-id", true, serde_json::json!([]))];

        let mut client = MockClient::new();
        client
            .expect_pinned_messages()
            .times(1)
            .returning(move |_| Ok(pinned.clone()));
        client.expect_unpin_message().never();
        client.expect_send_message().never();

        let bot = Bot::new(Service::new(client), config());

        assert!(matches!(
            bot.close_poll(&request("closePoll")).await,
            Err(BotError::Poll(PollError::NoWinner { .. }))
        ));
    }

    #[tokio::test]
    async fn nothing_pinned() {
        let mut client = MockClient::new();
        client
            .expect_pinned_messages()
            .times(1)
            .returning(|_| Ok(vec![sent("rules")]));

        let bot = Bot::new(Service::new(client), config());

        assert!(matches!(
            bot.close_poll(&request("closePoll")).await,
            Err(BotError::NoPinnedPoll { channel_id }) if channel_id == POLL_CHANNEL
        ));
    }

    #[tokio::test]
    async fn unknown_action() {
        let bot = Bot::new(Service::new(MockClient::new()), config());
        let now = Utc.with_ymd_and_hms(2025, 11, 14, 12, 0, 0).unwrap();

        assert!(matches!(
            bot.handle(&request("dancePoll"), now).await,
            Err(BotError::UnknownAction(action)) if action == "dancePoll"
        ));
    }
}
