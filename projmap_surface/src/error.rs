// Copyright 2025 the Projmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;

use crate::storage::StorageError;
use crate::surface::SurfaceId;

/// Error returned by fallible [`SurfaceStore`](crate::SurfaceStore) operations.
#[derive(Debug)]
pub enum StoreError {
    /// No surface has this id.
    UnknownSurface(SurfaceId),
    /// A corner update was missing keys or had non-finite positions.
    ///
    /// The previous corners were kept.
    IncompleteCorners {
        /// Surface the update targeted.
        id: SurfaceId,
        /// Corner count the update had to satisfy.
        expected: u8,
    },
    /// The surface list could not be encoded.
    Serialize(serde_json::Error),
    /// The storage backend refused the write.
    Storage(StorageError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSurface(id) => write!(f, "no surface with id `{id}`"),
            Self::IncompleteCorners { id, expected } => write!(
                f,
                "corner update for `{id}` needs {expected} finite corners (point0..point{})",
                expected.saturating_sub(1)
            ),
            Self::Serialize(err) => write!(f, "could not encode surfaces: {err}"),
            Self::Storage(err) => write!(f, "could not persist surfaces: {err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::UnknownSurface(_) | Self::IncompleteCorners { .. } => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err)
    }
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}
