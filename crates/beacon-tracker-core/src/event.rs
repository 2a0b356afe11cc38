// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The tracking-event envelope and its leaf value objects.
//!
//! One [`TrackingEvent`] is assembled per emission, serialized once, and
//! never mutated afterwards. The collection endpoint relies on the
//! `timestamp` field for sequencing; arrival order carries no meaning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::ids::{SessionId, VisitorId};
use crate::traffic::{FirstTouchContext, ReferrerContext, TrafficSource, UtmParameters};

/// The kind of commerce event being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
	Pageview,
	Click,
	FormSubmit,
	Scroll,
	AddToCart,
	AddToWishlist,
	Purchase,
}

impl EventKind {
	/// Returns the wire string for this event kind.
	#[must_use]
	pub fn as_str(&self) -> &'static str {
		match self {
			EventKind::Pageview => "pageview",
			EventKind::Click => "click",
			EventKind::FormSubmit => "form_submit",
			EventKind::Scroll => "scroll",
			EventKind::AddToCart => "add_to_cart",
			EventKind::AddToWishlist => "add_to_wishlist",
			EventKind::Purchase => "purchase",
		}
	}
}

impl std::fmt::Display for EventKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl std::str::FromStr for EventKind {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pageview" => Ok(EventKind::Pageview),
			"click" => Ok(EventKind::Click),
			"form_submit" => Ok(EventKind::FormSubmit),
			"scroll" => Ok(EventKind::Scroll),
			"add_to_cart" => Ok(EventKind::AddToCart),
			"add_to_wishlist" => Ok(EventKind::AddToWishlist),
			"purchase" => Ok(EventKind::Purchase),
			_ => Err(ParseError::InvalidEventKind(s.to_string())),
		}
	}
}

/// Snapshot of the host environment's ambient properties.
///
/// Supplied once by the embedding host at tracker construction and cloned
/// into every envelope; the SDK never probes the environment itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
	pub language: Option<String>,
	pub timezone: Option<String>,
	pub platform: Option<String>,
	/// Combined resolution string, e.g. "1920x1080".
	pub screen_resolution: Option<String>,
	/// Device memory hint in gigabytes, when the host exposes one.
	pub device_memory: Option<f64>,
	pub user_agent: Option<String>,
}

/// Host-supplied identity of an already-known customer.
///
/// When present, the customer id overrides the generated visitor identity
/// and the full record is carried as `visitor_info` on every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerIdentity {
	pub id: String,
	pub name: Option<String>,
	pub email: Option<String>,
	pub mobile: Option<String>,
}

impl CustomerIdentity {
	/// Creates a customer identity with only the id set.
	#[must_use]
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: None,
			email: None,
			mobile: None,
		}
	}
}

/// The wire envelope delivered to the collection endpoint, one per event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEvent {
	pub visitor_id: VisitorId,
	pub session_id: SessionId,
	/// Origin of the storefront the event was captured on.
	pub store_url: String,
	pub page_url: String,
	pub event_type: EventKind,
	pub event_details: serde_json::Value,
	pub utm_params: UtmParameters,
	pub referrer: ReferrerContext,
	pub traffic_source: TrafficSource,
	pub first_touch_context: Option<FirstTouchContext>,
	pub client_info: ClientInfo,
	pub visitor_info: Option<CustomerIdentity>,
	pub timestamp: DateTime<Utc>,
}
