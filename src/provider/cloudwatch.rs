use crate::config::types::AwsConfig;
use crate::provider::traits::{
    ContinuationToken, EventPage, LogEvent, LogProvider, ProviderError, StreamSummary,
};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_cloudwatchlogs::config::Region;
use aws_sdk_cloudwatchlogs::error::DisplayErrorContext;
use aws_sdk_cloudwatchlogs::operation::get_log_events::GetLogEventsOutput;
use aws_sdk_cloudwatchlogs::types::OrderBy;
use aws_sdk_cloudwatchlogs::Client;
use chrono::{DateTime, Utc};

/// CloudWatch Logs backed provider
///
/// Credentials come from the SDK's standard resolution chain (environment,
/// shared config/credentials files, instance metadata, ...).
#[derive(Debug, Clone)]
pub struct CloudWatchProvider {
    client: Client,
}

impl CloudWatchProvider {
    pub async fn from_config(config: &AwsConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        let sdk_config = loader.load().await;

        tracing::debug!(
            region = ?sdk_config.region().map(ToString::to_string),
            profile = ?config.profile,
            "CloudWatch Logs client configured"
        );

        Self {
            client: Client::new(&sdk_config),
        }
    }

    async fn get_log_events(
        &self,
        group: &str,
        stream: &str,
        token: Option<&ContinuationToken>,
        limit: usize,
    ) -> Result<EventPage, ProviderError> {
        let mut request = self
            .client
            .get_log_events()
            .log_group_name(group)
            .log_stream_name(stream)
            .limit(i32::try_from(limit).unwrap_or(i32::MAX));

        // Oldest-first is only requested once a cursor exists; the first read
        // keeps the service default so it lands on the most recent events.
        if let Some(token) = token {
            request = request.next_token(token.as_str()).start_from_head(true);
        }

        let output = request
            .send()
            .await
            .map_err(|e| ProviderError::Request(DisplayErrorContext(&e).to_string()))?;

        page_from_output(stream, &output)
    }
}

fn page_from_output(stream: &str, output: &GetLogEventsOutput) -> Result<EventPage, ProviderError> {
    let events = output
        .events()
        .iter()
        .map(|event| {
            let millis = event.timestamp().unwrap_or_default();
            Ok(LogEvent {
                timestamp: timestamp_from_millis(stream, millis)?,
                message: event.message().unwrap_or_default().to_string(),
            })
        })
        .collect::<Result<Vec<_>, ProviderError>>()?;

    let next_token = output
        .next_forward_token()
        .map(ContinuationToken::new)
        .ok_or_else(|| ProviderError::MissingToken {
            stream: stream.to_string(),
        })?;

    Ok(EventPage { events, next_token })
}

fn timestamp_from_millis(stream: &str, millis: i64) -> Result<DateTime<Utc>, ProviderError> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| ProviderError::InvalidTimestamp {
        stream: stream.to_string(),
        millis,
    })
}

#[async_trait]
impl LogProvider for CloudWatchProvider {
    async fn list_recent_streams(&self, group: &str) -> Result<Vec<StreamSummary>, ProviderError> {
        // Only the first page is read. Active streams bubble up to it because
        // the listing is ordered by last event time.
        let output = self
            .client
            .describe_log_streams()
            .log_group_name(group)
            .order_by(OrderBy::LastEventTime)
            .descending(true)
            .send()
            .await
            .map_err(|e| ProviderError::Request(DisplayErrorContext(&e).to_string()))?;

        let mut streams = Vec::with_capacity(output.log_streams().len());
        for stream in output.log_streams() {
            let Some(name) = stream.log_stream_name() else {
                continue;
            };
            let last_event = stream
                .last_event_timestamp()
                .map(|millis| timestamp_from_millis(name, millis))
                .transpose()?;
            streams.push(StreamSummary {
                name: name.to_string(),
                last_event,
            });
        }

        tracing::trace!(group = %group, stream_count = streams.len(), "Listed log streams");
        Ok(streams)
    }

    async fn fetch_initial(
        &self,
        group: &str,
        stream: &str,
        limit: usize,
    ) -> Result<EventPage, ProviderError> {
        self.get_log_events(group, stream, None, limit).await
    }

    async fn fetch_from(
        &self,
        group: &str,
        stream: &str,
        token: &ContinuationToken,
        limit: usize,
    ) -> Result<EventPage, ProviderError> {
        self.get_log_events(group, stream, Some(token), limit).await
    }
}
