// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Visitor and session identity resolution.
//!
//! The resolver owns the only read/write path to the two identity keys. A
//! host-supplied customer identity, when configured, overrides the
//! generated visitor id entirely. Storage failures never surface: the
//! resolver degrades to an ephemeral identifier that stays stable for the
//! life of this resolver.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use beacon_tracker_core::{CustomerIdentity, SessionId, VisitorId};
use tracing::{debug, warn};

use crate::storage::KeyValueStore;

/// Durable-store key for the visitor identifier.
pub const VISITOR_ID_KEY: &str = "visitor_id";

/// Session-store key for the session identifier.
pub const SESSION_ID_KEY: &str = "session_id";

/// Retention window for the durable visitor identifier.
pub const VISITOR_RETENTION: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Resolves and caches the visitor and session identifiers.
pub struct IdentityResolver {
	durable: Arc<dyn KeyValueStore>,
	session: Arc<dyn KeyValueStore>,
	customer: Option<CustomerIdentity>,
	visitor_cache: Mutex<Option<VisitorId>>,
	session_cache: Mutex<Option<SessionId>>,
}

impl IdentityResolver {
	pub fn new(
		durable: Arc<dyn KeyValueStore>,
		session: Arc<dyn KeyValueStore>,
		customer: Option<CustomerIdentity>,
	) -> Self {
		Self {
			durable,
			session,
			customer,
			visitor_cache: Mutex::new(None),
			session_cache: Mutex::new(None),
		}
	}

	/// The host-supplied customer identity, if the visitor is known.
	#[must_use]
	pub fn customer(&self) -> Option<&CustomerIdentity> {
		self.customer.as_ref()
	}

	/// Returns the durable visitor identifier.
	///
	/// The host-supplied customer id is checked first; otherwise the stored
	/// UUID is returned, created and persisted on first resolution.
	/// Idempotent: repeated calls return the same value.
	#[must_use]
	pub fn visitor_id(&self) -> VisitorId {
		if let Some(customer) = &self.customer {
			return VisitorId::from(customer.id.as_str());
		}

		let mut cache = self
			.visitor_cache
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner());
		if let Some(id) = cache.as_ref() {
			return id.clone();
		}

		let id = self.resolve_visitor();
		*cache = Some(id.clone());
		id
	}

	/// Returns the session identifier, creating one if the session store
	/// holds none. A new browsing session (cleared session store) yields a
	/// fresh value.
	#[must_use]
	pub fn session_id(&self) -> SessionId {
		let mut cache = self
			.session_cache
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner());
		if let Some(id) = cache.as_ref() {
			return id.clone();
		}

		let id = self.resolve_session();
		*cache = Some(id.clone());
		id
	}

	fn resolve_visitor(&self) -> VisitorId {
		match self.durable.get(VISITOR_ID_KEY) {
			Ok(Some(existing)) => return VisitorId::from(existing),
			Ok(None) => {}
			Err(error) => {
				warn!(error = %error, "visitor id read failed, using ephemeral id");
				return VisitorId::generate();
			}
		}

		let fresh = VisitorId::generate();
		if let Err(error) = self
			.durable
			.put(VISITOR_ID_KEY, fresh.as_str(), Some(VISITOR_RETENTION))
		{
			warn!(error = %error, "visitor id write failed, id will not persist");
		} else {
			debug!(visitor_id = %fresh, "created visitor id");
		}
		fresh
	}

	fn resolve_session(&self) -> SessionId {
		match self.session.get(SESSION_ID_KEY) {
			Ok(Some(existing)) => return SessionId::from(existing),
			Ok(None) => {}
			Err(error) => {
				warn!(error = %error, "session id read failed, using ephemeral id");
				return SessionId::generate();
			}
		}

		let fresh = SessionId::generate();
		if let Err(error) = self.session.put(SESSION_ID_KEY, fresh.as_str(), None) {
			warn!(error = %error, "session id write failed, id will not persist");
		} else {
			debug!(session_id = %fresh, "created session id");
		}
		fresh
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::storage::{MemoryStore, StorageError};

	/// Store whose every operation fails.
	struct BrokenStore;

	impl KeyValueStore for BrokenStore {
		fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
			Err(StorageError("backend offline".to_string()))
		}

		fn put(
			&self,
			_key: &str,
			_value: &str,
			_ttl: Option<Duration>,
		) -> Result<(), StorageError> {
			Err(StorageError("backend offline".to_string()))
		}
	}

	fn resolver_with_stores(
		durable: Arc<dyn KeyValueStore>,
		session: Arc<dyn KeyValueStore>,
	) -> IdentityResolver {
		IdentityResolver::new(durable, session, None)
	}

	#[test]
	fn visitor_id_is_idempotent() {
		let durable = Arc::new(MemoryStore::new());
		let resolver = resolver_with_stores(durable, Arc::new(MemoryStore::new()));

		assert_eq!(resolver.visitor_id(), resolver.visitor_id());
	}

	#[test]
	fn visitor_id_persists_across_resolvers() {
		let durable: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

		let first = resolver_with_stores(Arc::clone(&durable), Arc::new(MemoryStore::new()))
			.visitor_id();
		let second = resolver_with_stores(Arc::clone(&durable), Arc::new(MemoryStore::new()))
			.visitor_id();

		assert_eq!(first, second);
	}

	#[test]
	fn visitor_id_is_written_with_retention_key() {
		let durable = Arc::new(MemoryStore::new());
		let resolver =
			resolver_with_stores(Arc::clone(&durable) as Arc<dyn KeyValueStore>, Arc::new(MemoryStore::new()));

		let id = resolver.visitor_id();
		assert_eq!(
			durable.get(VISITOR_ID_KEY).unwrap().as_deref(),
			Some(id.as_str())
		);
	}

	#[test]
	fn customer_id_overrides_generated_identity() {
		let durable: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
		durable.put(VISITOR_ID_KEY, "stored-uuid", None).unwrap();

		let resolver = IdentityResolver::new(
			durable,
			Arc::new(MemoryStore::new()),
			Some(CustomerIdentity::new("customer_42")),
		);

		assert_eq!(resolver.visitor_id().as_str(), "customer_42");
	}

	#[test]
	fn session_id_is_idempotent_within_session() {
		let resolver =
			resolver_with_stores(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()));
		assert_eq!(resolver.session_id(), resolver.session_id());
	}

	#[test]
	fn cleared_session_store_yields_fresh_id() {
		let session: Arc<MemoryStore> = Arc::new(MemoryStore::new());

		let first = resolver_with_stores(
			Arc::new(MemoryStore::new()),
			Arc::clone(&session) as Arc<dyn KeyValueStore>,
		)
		.session_id();

		session.clear();

		let second = resolver_with_stores(
			Arc::new(MemoryStore::new()),
			Arc::clone(&session) as Arc<dyn KeyValueStore>,
		)
		.session_id();

		assert_ne!(first, second);
	}

	#[test]
	fn broken_storage_still_yields_valid_ids() {
		let resolver = resolver_with_stores(Arc::new(BrokenStore), Arc::new(BrokenStore));

		let visitor = resolver.visitor_id();
		let session = resolver.session_id();
		assert!(!visitor.as_str().is_empty());
		assert!(!session.as_str().is_empty());

		// Ephemeral ids stay stable for the life of this resolver.
		assert_eq!(resolver.visitor_id(), visitor);
		assert_eq!(resolver.session_id(), session);
	}

	#[test]
	fn broken_storage_yields_different_ids_per_resolver() {
		let first = resolver_with_stores(Arc::new(BrokenStore), Arc::new(BrokenStore)).visitor_id();
		let second =
			resolver_with_stores(Arc::new(BrokenStore), Arc::new(BrokenStore)).visitor_id();
		assert_ne!(first, second);
	}
}
