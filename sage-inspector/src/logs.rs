use std::{collections::BTreeMap, time::Duration};

use anyhow::{ensure, Result};
use aws_config::SdkConfig;
use aws_sdk_cloudwatchlogs::{
  config::{self, retry::RetryConfig},
  operation::get_log_events::GetLogEventsOutput,
  types::OutputLogEvent,
  Client,
};
use tracing::debug;

/// Upper bound accepted by `GetLogEvents` per request
const MAX_EVENTS: i32 = 10_000;

/// Get the CloudWatch Logs client
pub async fn get_client(config: &SdkConfig) -> Result<Client> {
  let client = Client::from_conf(
    config::Builder::from(config)
      .retry_config(RetryConfig::standard().with_max_attempts(3))
      .build(),
  );
  Ok(client)
}

/// Enumerate the stream names of a log group, optionally narrowed by prefix
pub async fn log_stream_names(client: &Client, group: &str, prefix: Option<&str>) -> Result<Vec<String>> {
  let mut names = Vec::new();
  let mut token: Option<String> = None;

  loop {
    let mut request = client.describe_log_streams().log_group_name(group);
    if let Some(prefix) = prefix {
      request = request.log_stream_name_prefix(prefix);
    }
    if let Some(token) = &token {
      request = request.next_token(token);
    }

    let response = request.send().await?;
    for stream in response.log_streams.unwrap_or_default() {
      if let Some(name) = stream.log_stream_name {
        names.push(name);
      }
    }

    token = response.next_token;
    if token.is_none() {
      break;
    }
  }

  debug!("Found {} log stream(s) in {group}", names.len());
  Ok(names)
}

fn into_messages(events: Option<Vec<OutputLogEvent>>) -> impl Iterator<Item = String> {
  events
    .unwrap_or_default()
    .into_iter()
    .filter_map(|event| event.message)
}

/// A single stream within a CloudWatch log group
pub struct LogStream {
  client: Client,
  group: String,
  pub stream_name: String,
}

impl LogStream {
  pub fn new(client: Client, group: &str, stream_name: &str) -> Self {
    Self {
      client,
      group: group.to_string(),
      stream_name: stream_name.to_string(),
    }
  }

  async fn get_page(
    &self,
    token: Option<String>,
    start_from_head: bool,
    limit: Option<i32>,
  ) -> Result<GetLogEventsOutput> {
    let mut request = self
      .client
      .get_log_events()
      .log_group_name(&self.group)
      .log_stream_name(&self.stream_name)
      .start_from_head(start_from_head);
    if let Some(limit) = limit {
      request = request.limit(limit);
    }
    if let Some(token) = token {
      request = request.next_token(token);
    }

    Ok(request.send().await?)
  }

  /// First `n` event messages of the stream
  ///
  /// A page can come back short of `n` on the response size cap, so pages
  /// are concatenated until enough events are collected or the forward
  /// token repeats
  pub async fn head(&self, n: i32) -> Result<Vec<String>> {
    ensure!(n <= MAX_EVENTS, "at most {MAX_EVENTS} events can be requested");

    let mut messages = Vec::new();
    let mut token: Option<String> = None;

    loop {
      let response = self.get_page(token.clone(), true, Some(n)).await?;
      messages.extend(into_messages(response.events));

      let next = response.next_forward_token;
      if messages.len() >= n as usize || next == token {
        break;
      }
      token = next;
    }

    messages.truncate(n as usize);
    Ok(messages)
  }

  /// Last `n` event messages of the stream
  ///
  /// Tail pages move backwards through the stream; events within a page are
  /// oldest first, so each earlier page is spliced in front. Paging stops
  /// once `n` events are collected or the backward token repeats (the start
  /// of the stream)
  pub async fn tail(&self, n: i32) -> Result<Vec<String>> {
    ensure!(n <= MAX_EVENTS, "at most {MAX_EVENTS} events can be requested");

    let mut messages: Vec<String> = Vec::new();
    let mut token: Option<String> = None;

    loop {
      let response = self.get_page(token.clone(), false, Some(n)).await?;
      messages.splice(0..0, into_messages(response.events));

      let next = response.next_backward_token;
      if messages.len() >= n as usize || next == token {
        break;
      }
      token = next;
    }

    if messages.len() > n as usize {
      messages.drain(..messages.len() - n as usize);
    }
    Ok(messages)
  }

  /// Print every event message of the stream, paging from the start
  pub async fn cat(&self) -> Result<()> {
    let mut token: Option<String> = None;

    loop {
      let response = self.get_page(token.clone(), true, None).await?;
      for message in into_messages(response.events) {
        println!("{message}");
      }

      // CloudWatch signals the end of the stream by repeating the token
      let next = response.next_forward_token;
      if next == token {
        return Ok(());
      }
      token = next;
    }
  }

  /// Print event messages and keep polling for new ones
  ///
  /// A repeated forward token means the stream is drained for now; sleep
  /// for `interval` seconds and poll again. Never returns on its own
  pub async fn follow(&self, start_at_top: bool, limit: Option<i32>, interval: u64) -> Result<()> {
    let mut token: Option<String> = None;
    // The limit only shapes the first page, e.g. `tail -n 10 -f`
    let mut limit = limit;

    loop {
      let response = self.get_page(token.clone(), start_at_top, limit.take()).await?;
      for message in into_messages(response.events) {
        println!("{message}");
      }

      let next = response.next_forward_token;
      if next == token {
        tokio::time::sleep(Duration::from_secs(interval)).await;
        continue;
      }
      token = next;
    }
  }
}

/// Filters events across the streams of a log group
pub struct LogFilter {
  client: Client,
  group: String,
  stream_names: Vec<String>,
}

impl LogFilter {
  pub fn new(client: Client, group: &str, stream_names: Vec<String>) -> Self {
    Self {
      client,
      group: group.to_string(),
      stream_names,
    }
  }

  /// Matching event messages grouped by stream name
  pub async fn filter(&self, pattern: &str) -> Result<BTreeMap<String, Vec<String>>> {
    let mut by_stream: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if self.stream_names.is_empty() {
      return Ok(by_stream);
    }

    let mut token: Option<String> = None;

    loop {
      let mut request = self
        .client
        .filter_log_events()
        .log_group_name(&self.group)
        .set_log_stream_names(Some(self.stream_names.clone()))
        .filter_pattern(pattern);
      if let Some(token) = &token {
        request = request.next_token(token);
      }

      let response = request.send().await?;
      for event in response.events.unwrap_or_default() {
        if let (Some(stream), Some(message)) = (event.log_stream_name, event.message) {
          by_stream.entry(stream).or_default().push(message);
        }
      }

      token = response.next_token;
      if token.is_none() {
        break;
      }
    }

    Ok(by_stream)
  }
}

#[cfg(test)]
mod tests {
  use aws_sdk_cloudwatchlogs::config::{BehaviorVersion, Credentials, Region};
  use aws_smithy_runtime::client::http::test_util::{ReplayEvent, StaticReplayClient};
  use aws_smithy_types::body::SdkBody;

  use super::*;

  fn page(body: &str) -> ReplayEvent {
    ReplayEvent::new(
      http::Request::builder()
        .uri("https://logs.us-east-1.amazonaws.com/")
        .body(SdkBody::empty())
        .unwrap(),
      http::Response::builder()
        .status(200)
        .body(SdkBody::from(body))
        .unwrap(),
    )
  }

  fn stream_with_pages(pages: &[&str]) -> LogStream {
    let http_client = StaticReplayClient::new(pages.iter().map(|body| page(body)).collect());
    let config = aws_sdk_cloudwatchlogs::Config::builder()
      .behavior_version(BehaviorVersion::latest())
      .credentials_provider(Credentials::new("akid", "secret", None, None, "test"))
      .region(Region::new("us-east-1"))
      .http_client(http_client)
      .build();

    LogStream::new(
      Client::from_conf(config),
      "/aws/sagemaker/TrainingJobs",
      "my-job/algo-1",
    )
  }

  fn events_body(messages: &[&str], forward: &str, backward: &str) -> String {
    let events: Vec<String> = messages
      .iter()
      .enumerate()
      .map(|(idx, message)| {
        format!(r#"{{"ingestionTime":{idx},"message":"{message}","timestamp":{idx}}}"#)
      })
      .collect();

    format!(
      r#"{{"events":[{}],"nextForwardToken":"{forward}","nextBackwardToken":"{backward}"}}"#,
      events.join(",")
    )
  }

  #[tokio::test]
  async fn head_pages_until_enough_events() {
    // First page comes back short of n (e.g. the response size cap)
    let stream = stream_with_pages(&[
      &events_body(&["a", "b"], "f/1", "b/1"),
      &events_body(&["c", "d"], "f/2", "b/1"),
    ]);

    let result = stream.head(3).await.unwrap();
    assert_eq!(result, vec!["a", "b", "c"]);
  }

  #[tokio::test]
  async fn head_stops_when_token_repeats() {
    let stream = stream_with_pages(&[
      &events_body(&["a", "b"], "f/1", "b/1"),
      &events_body(&[], "f/1", "b/1"),
    ]);

    let result = stream.head(5).await.unwrap();
    assert_eq!(result, vec!["a", "b"]);
  }

  #[tokio::test]
  async fn tail_pages_backwards_and_keeps_last_n() {
    // Backward pages hold progressively older events, oldest first per page
    let stream = stream_with_pages(&[
      &events_body(&["c", "d"], "f/1", "b/1"),
      &events_body(&["a", "b"], "f/1", "b/2"),
    ]);

    let result = stream.tail(3).await.unwrap();
    assert_eq!(result, vec!["b", "c", "d"]);
  }

  #[tokio::test]
  async fn tail_stops_at_stream_start() {
    let stream = stream_with_pages(&[
      &events_body(&["a"], "f/1", "b/1"),
      &events_body(&[], "f/1", "b/1"),
    ]);

    let result = stream.tail(5).await.unwrap();
    assert_eq!(result, vec!["a"]);
  }

  #[tokio::test]
  async fn head_and_tail_reject_oversized_requests() {
    // The guard fires before any request, so no pages are recorded
    let stream = stream_with_pages(&[]);

    let err = stream.head(MAX_EVENTS + 1).await.unwrap_err();
    assert!(err.to_string().contains("at most 10000 events"));

    let err = stream.tail(MAX_EVENTS + 1).await.unwrap_err();
    assert!(err.to_string().contains("at most 10000 events"));
  }

  #[tokio::test]
  async fn head_accepts_the_event_limit_boundary() {
    let stream = stream_with_pages(&[
      &events_body(&["a"], "f/1", "b/1"),
      &events_body(&[], "f/1", "b/1"),
    ]);

    let result = stream.head(MAX_EVENTS).await.unwrap();
    assert_eq!(result, vec!["a"]);
  }
}
