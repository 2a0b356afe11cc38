// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the tracker SDK.
//!
//! These never reach the embedding host through the emission path; `emit`
//! absorbs every failure. The only fallible public surface is
//! `TrackerBuilder::build`, where misconfiguration must be visible to the
//! embedding developer.

use thiserror::Error;

use crate::storage::StorageError;

/// Tracker SDK errors.
#[derive(Debug, Error)]
pub enum TrackerError {
	/// Collection endpoint is missing or not a valid URL.
	#[error("invalid collection endpoint")]
	InvalidEndpoint,

	/// Tracker was built without a page context.
	#[error("missing page context")]
	MissingPageContext,

	/// A key-value store backend failed.
	#[error(transparent)]
	Storage(#[from] StorageError),

	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Collection endpoint returned a non-success status.
	#[error("server error ({status}): {message}")]
	ServerError { status: u16, message: String },

	/// Envelope serialization failed.
	#[error("serialization error: {0}")]
	Serialization(String),
}

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;
