// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the core tracking types.

use thiserror::Error;

/// Errors raised when parsing wire strings back into core enums.
#[derive(Debug, Error)]
pub enum ParseError {
	/// Unknown event kind string
	#[error("invalid event kind: {0}")]
	InvalidEventKind(String),

	/// Unknown attribution type string
	#[error("invalid attribution type: {0}")]
	InvalidAttributionType(String),
}
