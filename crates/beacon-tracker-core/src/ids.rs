// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identifier newtypes for visitors and sessions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Durable identifier for a storefront visitor.
///
/// Carries either a generated UUID persisted in the durable store, or a
/// host-supplied customer identifier verbatim when the storefront has
/// already identified the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(pub String);

impl VisitorId {
	/// Generates a fresh random visitor identifier.
	#[must_use]
	pub fn generate() -> Self {
		Self(Uuid::new_v4().to_string())
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for VisitorId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<String> for VisitorId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl From<&str> for VisitorId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

/// Identifier for a single browsing session.
///
/// One per session-store lifetime; a new browsing session yields a new id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
	/// Generates a fresh random session identifier.
	#[must_use]
	pub fn generate() -> Self {
		Self(Uuid::new_v4().to_string())
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for SessionId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<String> for SessionId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl From<&str> for SessionId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn generated_visitor_id_is_uuid_shaped() {
		let id = VisitorId::generate();
		assert_eq!(id.as_str().len(), 36);
		assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
	}

	#[test]
	fn visitor_id_from_customer_string_is_verbatim() {
		let id = VisitorId::from("customer_9981");
		assert_eq!(id.to_string(), "customer_9981");
	}

	#[test]
	fn visitor_id_serde_is_transparent() {
		let id = VisitorId::from("abc");
		let json = serde_json::to_string(&id).unwrap();
		assert_eq!(json, "\"abc\"");
	}

	#[test]
	fn session_id_serde_is_transparent() {
		let id = SessionId::from("s1");
		let json = serde_json::to_string(&id).unwrap();
		assert_eq!(json, "\"s1\"");
	}

	proptest! {
		#[test]
		fn generated_visitor_ids_are_unique(_seed: u64) {
			prop_assert_ne!(VisitorId::generate(), VisitorId::generate());
		}

		#[test]
		fn generated_session_ids_are_unique(_seed: u64) {
			prop_assert_ne!(SessionId::generate(), SessionId::generate());
		}

		#[test]
		fn visitor_id_roundtrips_through_string(id in "[a-zA-Z0-9_-]{1,64}") {
			let visitor = VisitorId::from(id.clone());
			prop_assert_eq!(visitor.to_string(), id);
		}
	}
}
