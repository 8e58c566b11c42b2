// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors for index-targeted operations.

/// Misuse of an index-targeted scroll operation.
///
/// These indicate a caller or state bug and are never clamped or retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// The index is not a valid item index.
    #[error("item index {index} is out of range for {len} items")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of items at the time of the request.
        len: usize,
    },
    /// Items per row is not known yet because no measure pass has run.
    #[error("the panel has not been measured yet, items per row is unknown")]
    LayoutNotMeasured,
}
