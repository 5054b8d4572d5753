//! Deadline-bounded polling for a resource that has not arrived yet.
//!
//! A freshly taken exposure shows up in the repository some time after the
//! camera reports it. The poller bridges that gap with a single fixed policy.
//!
//! # Polling Policy
//!
//! - Poll interval: 100ms by default, fixed, never shortened near the deadline
//! - Deadline: `start + timeout`, computed once at entry and never extended;
//!   a timeout too large to represent as an instant means no deadline
//! - At least one attempt is always made, even with a zero timeout
//! - The deadline is checked only after a transient failure and its sleep, so
//!   total wall time may exceed `timeout` by up to one poll interval
//!
//! # Retryable Conditions
//!
//! - Errors accepted by the transient predicate (by default
//!   [`ImageProvider::is_transient`])
//! - Anything else is returned at once, unmodified, without consulting the
//!   deadline
//!
//! # Cancellation
//!
//! The wait between attempts is `tokio::time::sleep`, which yields to the
//! scheduler. Dropping the future while it waits unwinds immediately; no
//! attempt is made after the drop and nothing is reported as a timeout.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{Instrument, Span};

/// Wait between attempts when the caller does not choose one.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Shortest wait between attempts; smaller intervals are raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Boxed future returned by [`ImageProvider::fetch`].
pub type FetchFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A store that can be asked for the resource identified by `R`.
pub trait ImageProvider<R: ?Sized>: Send + Sync {
    type Output;
    type Error;

    /// Single attempt to fetch the resource.
    fn fetch<'a>(&'a self, request: &'a R) -> FetchFuture<'a, Self::Output, Self::Error>;

    /// Whether `error` means "not there yet" rather than a genuine failure.
    ///
    /// Providers with no notion of a transient failure keep the default, in
    /// which case every error is returned to the caller on first sight.
    fn is_transient(&self, _error: &Self::Error) -> bool {
        false
    }
}

/// Failure of a [`Poller::retrieve`] call.
#[derive(Debug, Error)]
pub enum RetrieveError<E> {
    /// Every attempt failed transiently and the deadline has passed.
    #[error("resource not available after {attempts} attempt(s) within {timeout:?}")]
    DeadlineExceeded { timeout: Duration, attempts: u32 },
    /// The provider failed with a non-transient error; returned verbatim.
    #[error(transparent)]
    Provider(E),
}

impl<E> RetrieveError<E> {
    #[must_use]
    pub const fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded { .. })
    }

    #[must_use]
    pub const fn provider_error(&self) -> Option<&E> {
        match self {
            Self::Provider(error) => Some(error),
            Self::DeadlineExceeded { .. } => None,
        }
    }

    #[must_use]
    pub fn into_provider_error(self) -> Option<E> {
        match self {
            Self::Provider(error) => Some(error),
            Self::DeadlineExceeded { .. } => None,
        }
    }
}

/// Polls a provider until it yields a value or a deadline passes.
///
/// ```ignore
/// let poller = Poller::new(Duration::from_secs(30))
///     .with_poll_interval(Duration::from_millis(250))
///     .with_span(tracing::info_span!("take_image"));
/// let exposure = poller.retrieve(&data_id, &repository).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Poller {
    timeout: Duration,
    poll_interval: Duration,
    span: Option<Span>,
}

impl Poller {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
            span: None,
        }
    }

    /// Wait between attempts, never less than [`MIN_POLL_INTERVAL`].
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Parent span for the diagnostics emitted while polling.
    ///
    /// Without one, the `retrieve` span is a child of whatever span is current
    /// when `retrieve` is called.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Retrieve `request`, retrying on errors the provider reports as transient.
    pub async fn retrieve<R, P>(
        &self,
        request: &R,
        provider: &P,
    ) -> Result<P::Output, RetrieveError<P::Error>>
    where
        R: fmt::Display + Sync + ?Sized,
        P: ImageProvider<R> + ?Sized,
        P::Error: fmt::Display,
    {
        self.retrieve_with(request, provider, |error| provider.is_transient(error))
            .await
    }

    /// Retrieve `request`, retrying only on errors `is_transient` accepts.
    ///
    /// The predicate replaces [`ImageProvider::is_transient`] for this call.
    pub async fn retrieve_with<R, P, F>(
        &self,
        request: &R,
        provider: &P,
        is_transient: F,
    ) -> Result<P::Output, RetrieveError<P::Error>>
    where
        R: fmt::Display + Sync + ?Sized,
        P: ImageProvider<R> + ?Sized,
        P::Error: fmt::Display,
        F: Fn(&P::Error) -> bool,
    {
        let timeout_ms = self.timeout.as_millis();
        let span = match &self.span {
            Some(parent) => tracing::debug_span!(
                parent: parent,
                "retrieve",
                request = %request,
                timeout_ms
            ),
            None => tracing::debug_span!("retrieve", request = %request, timeout_ms),
        };

        self.poll(request, provider, &is_transient)
            .instrument(span)
            .await
    }

    async fn poll<R, P, F>(
        &self,
        request: &R,
        provider: &P,
        is_transient: &F,
    ) -> Result<P::Output, RetrieveError<P::Error>>
    where
        R: fmt::Display + Sync + ?Sized,
        P: ImageProvider<R> + ?Sized,
        P::Error: fmt::Display,
        F: Fn(&P::Error) -> bool,
    {
        let start = Instant::now();
        let deadline = start.checked_add(self.timeout);
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            tracing::debug!(attempt = attempts, "Fetching {request}");

            match provider.fetch(request).await {
                Ok(value) => {
                    tracing::debug!(
                        attempt = attempts,
                        elapsed_ms = start.elapsed().as_millis(),
                        "Fetched {request}"
                    );
                    return Ok(value);
                }
                Err(error) if is_transient(&error) => {
                    let now = Instant::now();
                    tracing::warn!(
                        attempt = attempts,
                        error = %error,
                        elapsed_ms = now.duration_since(start).as_millis(),
                        remaining_ms = deadline.map(|d| d.saturating_duration_since(now).as_millis()),
                        "{request} not available yet; retrying in {:?}",
                        self.poll_interval
                    );
                }
                Err(error) => return Err(RetrieveError::Provider(error)),
            }

            tokio::time::sleep(self.poll_interval).await;

            if deadline.is_some_and(|d| Instant::now() >= d) {
                tracing::error!(
                    attempts,
                    elapsed_ms = start.elapsed().as_millis(),
                    "Unable to get {request} within {:?}",
                    self.timeout
                );
                return Err(RetrieveError::DeadlineExceeded {
                    timeout: self.timeout,
                    attempts,
                });
            }
        }
    }
}

/// [`Poller::retrieve`] with the default poll interval and no injected span.
pub async fn retrieve<R, P>(
    request: &R,
    provider: &P,
    timeout: Duration,
) -> Result<P::Output, RetrieveError<P::Error>>
where
    R: fmt::Display + Sync + ?Sized,
    P: ImageProvider<R> + ?Sized,
    P::Error: fmt::Display,
{
    Poller::new(timeout).retrieve(request, provider).await
}
