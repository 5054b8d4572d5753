//! Retrieval of newly captured images.
//!
//! - **`poll`**: the deadline-bounded [`Poller`] and the [`ImageProvider`]
//!   capability it drives
//! - **`repository`**: [`DirectoryRepository`], an `ImageProvider` over a
//!   directory tree of exposures

pub mod poll;
pub mod repository;

pub use poll::{
    DEFAULT_POLL_INTERVAL, FetchFuture, ImageProvider, MIN_POLL_INTERVAL, Poller, RetrieveError,
    retrieve,
};
pub use repository::{DirectoryRepository, Exposure, RepositoryError};
