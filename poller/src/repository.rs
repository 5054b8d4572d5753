//! Filesystem image repository.
//!
//! Images are laid out by instrument and observing day:
//!
//! ```text
//! {root}/LATISS/20200219/LATISS_O_20200219_000212_det000.fits
//! ```
//!
//! A missing file is the normal state of an exposure that has not been
//! ingested yet, and so is a zero-length file that the ingest process has
//! created but not written.

use std::io;
use std::path::{Path, PathBuf};

use observing_types::DataId;
use thiserror::Error;

use crate::poll::{FetchFuture, ImageProvider};

/// Raw exposure bytes together with where they were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exposure {
    pub data_id: DataId,
    pub path: PathBuf,
    pub data: Vec<u8>,
}

impl Exposure {
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("no image for {data_id} at {}", path.display())]
    NotFound { data_id: DataId, path: PathBuf },
    #[error("image for {data_id} at {} is still being written", path.display())]
    Empty { data_id: DataId, path: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RepositoryError {
    /// `NotFound` and `Empty` clear up on their own once ingest finishes.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Empty { .. })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path, .. } | Self::Empty { path, .. } | Self::Io { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    root: PathBuf,
}

impl DirectoryRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the image for `data_id` lives, whether or not it exists yet.
    #[must_use]
    pub fn path_for(&self, data_id: &DataId) -> PathBuf {
        let instrument = data_id.instrument.as_str();
        let day_obs = data_id.day_obs.to_string();
        let file_name = format!(
            "{instrument}_O_{day_obs}_{:06}_det{:03}.fits",
            data_id.seq_num, data_id.detector
        );
        self.root.join(instrument).join(&day_obs).join(file_name)
    }

    async fn read(&self, data_id: &DataId) -> Result<Exposure, RepositoryError> {
        let path = self.path_for(data_id);

        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(RepositoryError::NotFound {
                    data_id: *data_id,
                    path,
                });
            }
            Err(source) => return Err(RepositoryError::Io { path, source }),
        };

        if data.is_empty() {
            return Err(RepositoryError::Empty {
                data_id: *data_id,
                path,
            });
        }

        tracing::debug!(path = %path.display(), bytes = data.len(), "Read exposure");
        Ok(Exposure {
            data_id: *data_id,
            path,
            data,
        })
    }
}

impl ImageProvider<DataId> for DirectoryRepository {
    type Output = Exposure;
    type Error = RepositoryError;

    fn fetch<'a>(&'a self, request: &'a DataId) -> FetchFuture<'a, Exposure, RepositoryError> {
        Box::pin(self.read(request))
    }

    fn is_transient(&self, error: &RepositoryError) -> bool {
        error.is_transient()
    }
}
