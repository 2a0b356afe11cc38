// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pluggable key-value persistence for tracker state.
//!
//! The SDK never touches a physical medium directly: the embedding host
//! injects one store for each scope. The durable scope outlives browsing
//! sessions (a cookie or equivalent, with a retention TTL); the session
//! scope is cleared when the browsing session ends. Tests substitute
//! [`MemoryStore`] for both.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;

/// Error raised by a key-value store backend.
///
/// Always recovered from: callers degrade to ephemeral values and keep
/// going.
#[derive(Debug, Error)]
#[error("storage unavailable: {0}")]
pub struct StorageError(pub String);

/// A scoped key-value store.
///
/// `ttl` on writes is a retention hint for durable scopes (the max-age of
/// a cookie-equivalent entry); session scopes may ignore it.
pub trait KeyValueStore: Send + Sync {
	fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
	fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StorageError>;
}

/// In-memory store for tests, examples, and hosts without real persistence.
///
/// TTLs are accepted and ignored; entries live until [`MemoryStore::clear`]
/// or drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Drops every entry, simulating the end of a browsing session or an
	/// expired cookie jar.
	pub fn clear(&self) {
		self.lock_entries().clear();
	}

	fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
		self.entries
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
	}
}

impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		Ok(self.lock_entries().get(key).cloned())
	}

	fn put(&self, key: &str, value: &str, _ttl: Option<Duration>) -> Result<(), StorageError> {
		self.lock_entries()
			.insert(key.to_string(), value.to_string());
		Ok(())
	}
}
