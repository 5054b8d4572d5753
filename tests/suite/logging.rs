//! Diagnostics emitted while polling, rendered by the decorated formatter

use std::time::Duration;

use observing_poller::{DirectoryRepository, Poller};
use observing_types::parse_obs_id;
use regex::Regex;

use crate::common::{FITS_HEADER, LogCapture, write_exposure};

fn header() -> Regex {
    Regex::new(r"^ \[([TDIWE]) \d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} ([\w:.]+)\] ").unwrap()
}

#[tokio::test]
async fn timeout_logs_attempt_retry_and_error() {
    let (capture, _guard) = LogCapture::install(false);
    let dir = tempfile::tempdir().unwrap();
    let data_id = parse_obs_id("AT_O_20200219_000300").unwrap();
    let repository = DirectoryRepository::new(dir.path());

    let err = Poller::new(Duration::ZERO)
        .with_poll_interval(Duration::from_millis(10))
        .with_span(tracing::info_span!("take_image"))
        .retrieve(&data_id, &repository)
        .await
        .unwrap_err();
    assert!(err.is_deadline_exceeded());

    let lines = capture.lines();
    let poll_lines: Vec<(String, String, &String)> = lines
        .iter()
        .filter_map(|line| {
            let caps = header().captures(line)?;
            Some((caps[1].to_string(), caps[2].to_string(), line))
        })
        .filter(|(_, name, _)| name.starts_with("observing_poller::poll"))
        .collect();

    let levels: Vec<&str> = poll_lines.iter().map(|(level, _, _)| level.as_str()).collect();
    assert_eq!(levels, ["D", "W", "E"], "lines: {lines:#?}");

    for (_, name, _) in &poll_lines {
        assert_eq!(name, "observing_poller::poll.take_image.retrieve");
    }
    assert!(poll_lines[0].2.contains("Fetching LATISS/20200219/000300/det000"));
    assert!(poll_lines[1].2.contains("not available yet"));
    assert!(poll_lines[1].2.contains("remaining_ms="));
    assert!(poll_lines[2].2.contains("Unable to get LATISS/20200219/000300/det000"));
}

#[tokio::test]
async fn success_logs_no_warnings() {
    let (capture, _guard) = LogCapture::install(true);
    let dir = tempfile::tempdir().unwrap();
    let data_id = parse_obs_id("AT_O_20200219_000301").unwrap();
    write_exposure(dir.path(), &data_id, FITS_HEADER);
    let repository = DirectoryRepository::new(dir.path());

    Poller::new(Duration::from_secs(1))
        .retrieve(&data_id, &repository)
        .await
        .unwrap();

    let contents = capture.contents();
    assert!(contents.contains("Fetched LATISS/20200219/000301/det000"));
    // Debug lines are blue, and nothing was logged in warning yellow.
    assert!(contents.contains("\x1b[1;34m ["));
    assert!(!contents.contains("\x1b[1;33m"));
}
