//! The demo run: mixed payloads fed by concurrent producers.

use anyhow::Context;
use rand::Rng;
use scoreboard_core::{RunStatus, Scoreboard, ScoreboardConfig, StopMode, StreamSender, Transaction};
use scoreboard_report::{report, ReportArgs, RunMetadata};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::info;

/// Payload type of the demo streams.
#[derive(Clone, PartialEq)]
pub enum DemoValue {
    Text(String),
    Int(i64),
    List(Vec<i64>),
    Map(BTreeMap<String, String>),
}

impl fmt::Debug for DemoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemoValue::Text(s) => write!(f, "{s:?}"),
            DemoValue::Int(i) => write!(f, "{i}"),
            DemoValue::List(items) => write!(f, "{items:?}"),
            DemoValue::Map(map) => write!(f, "{map:?}"),
        }
    }
}

/// The (actual, expected) pairs of the demo: two mismatches among five pairs.
pub fn demo_streams() -> Vec<(DemoValue, DemoValue)> {
    let map = || BTreeMap::from([("key".to_string(), "value".to_string())]);
    vec![
        (
            DemoValue::Text("data_A".to_string()),
            DemoValue::Text("data_A".to_string()),
        ),
        (DemoValue::Int(123), DemoValue::Int(123)),
        (
            DemoValue::Text("data_B".to_string()),
            DemoValue::Text("data_C".to_string()),
        ),
        (DemoValue::List(vec![1, 2, 3]), DemoValue::List(vec![1, 2, 4])),
        (DemoValue::Map(map()), DemoValue::Map(map())),
    ]
}

/// Run the demo streams through a scoreboard and report to every target.
pub async fn run_demo(
    config: ScoreboardConfig,
    report_args: &ReportArgs,
) -> anyhow::Result<RunStatus> {
    let scoreboard =
        Scoreboard::new(config).context("Failed to create scoreboard")?;
    scoreboard.start()?;

    let (actual, expected): (Vec<_>, Vec<_>) = demo_streams().into_iter().unzip();
    let producers = [
        tokio::spawn(produce(scoreboard.actual(), actual)),
        tokio::spawn(produce(scoreboard.expected(), expected)),
    ];
    for producer in futures::future::join_all(producers).await {
        producer.context("Producer task failed")??;
    }

    let counts = scoreboard.stop(StopMode::Flush).await?;
    info!("[{}] {}", scoreboard.name(), counts.summary_line());

    let snapshot = scoreboard.snapshot();
    let metadata = RunMetadata::from_scoreboard(&scoreboard);
    let mut status = snapshot.status();
    for (destination, format) in report_args.targets() {
        status = report(&snapshot, &metadata, &destination, format)
            .with_context(|| format!("Failed to write {format} report to {destination}"))?;
    }
    Ok(status)
}

/// Submit every value with a small random delay, then close the stream.
async fn produce(
    sender: StreamSender<DemoValue>,
    values: Vec<DemoValue>,
) -> anyhow::Result<()> {
    for value in values {
        let delay = rand::rng().random_range(0..5u64);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        sender
            .submit(Transaction::new(value))
            .await
            .with_context(|| format!("Failed to submit to the {} stream", sender.side()))?;
    }
    sender.close();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_value_debug() {
        let pairs = demo_streams();
        assert_eq!(format!("{:?}", pairs[0].0), "\"data_A\"");
        assert_eq!(format!("{:?}", pairs[1].0), "123");
        assert_eq!(format!("{:?}", pairs[3].1), "[1, 2, 4]");
        assert_eq!(format!("{:?}", pairs[4].0), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_demo_streams_have_two_mismatches() {
        let mismatches = demo_streams().iter().filter(|(a, e)| a != e).count();
        assert_eq!(mismatches, 2);
    }
}
