//! Polling a directory repository for exposures

use std::time::{Duration, Instant};

use observing_poller::{
    DirectoryRepository, ImageProvider, Poller, RepositoryError, RetrieveError, retrieve,
};
use observing_types::parse_obs_id;

use crate::common::{FITS_HEADER, write_exposure};

#[tokio::test]
async fn image_already_present_is_returned() {
    let dir = tempfile::tempdir().unwrap();
    let data_id = parse_obs_id("AT_O_20200219_000212").unwrap();
    let path = write_exposure(dir.path(), &data_id, FITS_HEADER);
    let repository = DirectoryRepository::new(dir.path());

    let exposure = retrieve(&data_id, &repository, Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(exposure.path, path);
    assert_eq!(exposure.data, FITS_HEADER);
}

#[tokio::test]
async fn image_arriving_later_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    let data_id = parse_obs_id("AT_O_20200219_000213").unwrap();
    let repository = DirectoryRepository::new(dir.path());

    let root = dir.path().to_path_buf();
    let writer = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        write_exposure(&root, &data_id, FITS_HEADER)
    });

    let exposure = Poller::new(Duration::from_secs(10))
        .with_poll_interval(Duration::from_millis(20))
        .retrieve(&data_id, &repository)
        .await
        .unwrap();

    let written = writer.await.unwrap();
    assert_eq!(exposure.path, written);
    assert_eq!(exposure.len(), FITS_HEADER.len());
}

#[tokio::test]
async fn missing_image_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let data_id = parse_obs_id("AT_O_20200219_000214").unwrap();
    let repository = DirectoryRepository::new(dir.path());
    let start = Instant::now();

    let err = Poller::new(Duration::from_millis(200))
        .with_poll_interval(Duration::from_millis(50))
        .retrieve(&data_id, &repository)
        .await
        .unwrap_err();

    match err {
        RetrieveError::DeadlineExceeded { timeout, attempts } => {
            assert_eq!(timeout, Duration::from_millis(200));
            assert!((1..=5).contains(&attempts), "attempts = {attempts}");
        }
        other => panic!("expected DeadlineExceeded, got {other:?}"),
    }
    assert!(start.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn unreadable_image_is_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let data_id = parse_obs_id("AT_O_20200219_000215").unwrap();
    let repository = DirectoryRepository::new(dir.path());
    // A directory where the file should be fails to read, and never will.
    std::fs::create_dir_all(repository.path_for(&data_id)).unwrap();
    let start = Instant::now();

    let err = Poller::new(Duration::from_secs(30))
        .retrieve(&data_id, &repository)
        .await
        .unwrap_err();

    match err.into_provider_error() {
        Some(RepositoryError::Io { path, .. }) => {
            assert_eq!(path, repository.path_for(&data_id));
        }
        other => panic!("expected Io error, got {other:?}"),
    }
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn zero_length_image_waits_for_contents() {
    let dir = tempfile::tempdir().unwrap();
    let data_id = parse_obs_id("AT_O_20200219_000216").unwrap();
    write_exposure(dir.path(), &data_id, b"");
    let repository = DirectoryRepository::new(dir.path());

    let root = dir.path().to_path_buf();
    let writer = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        write_exposure(&root, &data_id, FITS_HEADER);
    });

    let exposure = Poller::new(Duration::from_secs(10))
        .with_poll_interval(Duration::from_millis(20))
        .retrieve(&data_id, &repository)
        .await
        .unwrap();
    writer.await.unwrap();

    assert!(!exposure.is_empty());
}

#[tokio::test]
async fn repository_usable_as_trait_object() {
    let dir = tempfile::tempdir().unwrap();
    let data_id = parse_obs_id("AT_O_20200219_000217").unwrap();
    write_exposure(dir.path(), &data_id, FITS_HEADER);

    let repository = DirectoryRepository::new(dir.path());
    let provider: &dyn ImageProvider<
        observing_types::DataId,
        Output = observing_poller::Exposure,
        Error = RepositoryError,
    > = &repository;

    let exposure = Poller::new(Duration::from_secs(1))
        .retrieve(&data_id, provider)
        .await
        .unwrap();
    assert_eq!(exposure.data_id, data_id);
}
