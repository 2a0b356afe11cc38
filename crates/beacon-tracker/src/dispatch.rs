// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Envelope assembly and fire-and-forget dispatch.
//!
//! The [`Tracker`] is the host's entry point: one instance per page life,
//! cheap to clone, safe to call from any thread. Every trigger routes
//! through [`Tracker::emit`], which assembles a fresh envelope and hands it
//! to the transport on the ambient async runtime without awaiting the
//! outcome. `emit` never returns an error and never panics; a tracking
//! failure of any kind is invisible to the embedding page.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use beacon_tracker_core::{
	ClientInfo, CustomerIdentity, EventKind, LandingContext, OrderSnapshot, ReferrerContext,
	TrackingEvent, UtmParameters,
};

use crate::attribution::AttributionResolver;
use crate::error::{Result, TrackerError};
use crate::hook::PurchaseHook;
use crate::identity::IdentityResolver;
use crate::scroll::ScrollDepthGauge;
use crate::storage::{KeyValueStore, MemoryStore};
use crate::transport::{HttpTransport, Transport};

/// Maximum length, in characters, of the text snippet captured from a
/// click target.
pub const MAX_CLICK_TEXT_LEN: usize = 50;

/// The current navigation as seen by the embedding host.
#[derive(Debug, Clone)]
pub struct PageContext {
	/// Full page URL, including any query string.
	pub url: String,
	/// Raw referrer, when the navigation carried one.
	pub referrer: Option<String>,
}

impl PageContext {
	#[must_use]
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			referrer: None,
		}
	}

	#[must_use]
	pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
		self.referrer = Some(referrer.into());
		self
	}

	/// Origin (scheme + host + port) of the page, used as the store URL.
	fn origin(&self) -> String {
		Url::parse(&self.url)
			.map(|url| url.origin().ascii_serialization())
			.unwrap_or_default()
	}
}

/// Details captured from a DOM click target.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClickDetails {
	pub tag: String,
	pub id: Option<String>,
	pub classes: Option<String>,
	/// Visible text of the target, truncated on emission.
	pub text_snippet: Option<String>,
}

/// Details captured from a form submission.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormSubmitDetails {
	pub form_id: Option<String>,
	pub form_classes: Option<String>,
	pub action: Option<String>,
}

/// Builder for constructing a [`Tracker`].
pub struct TrackerBuilder {
	endpoint: Option<String>,
	page: Option<PageContext>,
	client_info: ClientInfo,
	customer: Option<CustomerIdentity>,
	durable: Option<Arc<dyn KeyValueStore>>,
	session: Option<Arc<dyn KeyValueStore>>,
	transport: Option<Arc<dyn Transport>>,
}

impl TrackerBuilder {
	#[must_use]
	pub fn new() -> Self {
		Self {
			endpoint: None,
			page: None,
			client_info: ClientInfo::default(),
			customer: None,
			durable: None,
			session: None,
			transport: None,
		}
	}

	/// Sets the collection endpoint base URL.
	pub fn endpoint(mut self, url: impl Into<String>) -> Self {
		self.endpoint = Some(url.into());
		self
	}

	/// Sets the current navigation.
	pub fn page(mut self, page: PageContext) -> Self {
		self.page = Some(page);
		self
	}

	/// Sets the host environment snapshot carried on every envelope.
	pub fn client_info(mut self, info: ClientInfo) -> Self {
		self.client_info = info;
		self
	}

	/// Sets the host-identified customer, overriding generated visitor
	/// identity.
	pub fn customer(mut self, customer: CustomerIdentity) -> Self {
		self.customer = Some(customer);
		self
	}

	/// Injects the durable (cookie-equivalent) store.
	pub fn durable_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
		self.durable = Some(store);
		self
	}

	/// Injects the session-scoped store.
	pub fn session_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
		self.session = Some(store);
		self
	}

	/// Replaces the HTTP transport. Intended for tests.
	pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Builds the tracker.
	///
	/// Fails only on misconfiguration: a missing page context, or a
	/// missing/invalid endpoint when no transport was injected. Stores
	/// default to in-memory scopes, so hosts that want identity to outlive
	/// the process must inject their own.
	pub fn build(self) -> Result<Tracker> {
		let page = self.page.ok_or(TrackerError::MissingPageContext)?;

		let transport = match self.transport {
			Some(transport) => transport,
			None => {
				let endpoint = self.endpoint.ok_or(TrackerError::InvalidEndpoint)?;
				Arc::new(HttpTransport::new(endpoint)?)
			}
		};

		let durable = self
			.durable
			.unwrap_or_else(|| Arc::new(MemoryStore::new()));
		let session = self
			.session
			.unwrap_or_else(|| Arc::new(MemoryStore::new()));

		let identity =
			IdentityResolver::new(Arc::clone(&durable), session, self.customer);
		let attribution = AttributionResolver::new(durable);

		Ok(Tracker {
			inner: Arc::new(TrackerInner {
				page,
				client_info: self.client_info,
				identity,
				attribution,
				scroll: Mutex::new(ScrollDepthGauge::new()),
				transport,
			}),
		})
	}
}

impl Default for TrackerBuilder {
	fn default() -> Self {
		Self::new()
	}
}

struct TrackerInner {
	page: PageContext,
	client_info: ClientInfo,
	identity: IdentityResolver,
	attribution: AttributionResolver,
	scroll: Mutex<ScrollDepthGauge>,
	transport: Arc<dyn Transport>,
}

/// The visitor-tracking agent for one page life.
#[derive(Clone)]
pub struct Tracker {
	inner: Arc<TrackerInner>,
}

impl Tracker {
	/// Creates a new builder for constructing a Tracker.
	#[must_use]
	pub fn builder() -> TrackerBuilder {
		TrackerBuilder::new()
	}

	/// Emits one tracking event.
	///
	/// Builds the envelope from identity, attribution, and the environment
	/// snapshot, then hands it to the transport without awaiting delivery.
	/// For [`EventKind::Purchase`] the details are normalized first; a
	/// payload with no order id skips the event entirely.
	pub fn emit(&self, kind: EventKind, details: Value) {
		let details = match kind {
			EventKind::Purchase => match OrderSnapshot::from_raw(&details) {
				Some(snapshot) => match serde_json::to_value(&snapshot) {
					Ok(value) => value,
					Err(error) => {
						warn!(error = %error, "order snapshot serialization failed, event skipped");
						return;
					}
				},
				None => {
					debug!("purchase payload carries no order id, event skipped");
					return;
				}
			},
			_ => details,
		};

		let event = self.assemble(kind, details);
		self.dispatch(event);
	}

	/// Emits a pageview for the current navigation.
	pub fn pageview(&self) {
		self.emit(EventKind::Pageview, json!({}));
	}

	/// Emits a click event, truncating the text snippet.
	pub fn click(&self, mut details: ClickDetails) {
		if let Some(text) = details.text_snippet.as_mut() {
			if text.chars().count() > MAX_CLICK_TEXT_LEN {
				*text = text.chars().take(MAX_CLICK_TEXT_LEN).collect();
			}
		}
		self.emit(EventKind::Click, to_details(&details));
	}

	/// Emits a form-submission event.
	pub fn form_submit(&self, details: FormSubmitDetails) {
		self.emit(EventKind::FormSubmit, to_details(&details));
	}

	/// Records a scroll position, emitting an event only when a new
	/// 25-point depth tier is reached for this page life.
	pub fn scroll(&self, percent: u8) {
		let reported = self
			.inner
			.scroll
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.advance(percent);

		if let Some(depth) = reported {
			self.emit(EventKind::Scroll, json!({ "percent": depth }));
		}
	}

	/// Emits an add-to-cart event with the host's product payload.
	pub fn add_to_cart(&self, product: Value) {
		self.emit(EventKind::AddToCart, product);
	}

	/// Emits an add-to-wishlist event for a product id.
	pub fn add_to_wishlist(&self, product_id: impl Into<String>) {
		self.emit(
			EventKind::AddToWishlist,
			json!({ "product_id": product_id.into() }),
		);
	}

	/// Emits a purchase event. The payload is normalized into a canonical
	/// order snapshot; without an order id nothing is sent.
	pub fn purchase(&self, payload: Value) {
		self.emit(EventKind::Purchase, payload);
	}

	/// Wraps the host's purchase-completion callback, when one exists,
	/// so a purchase event is emitted as a side effect of every call. No
	/// callback means no interception; that is not an error.
	pub fn intercept_purchase<F, R>(&self, original: Option<F>) -> Option<PurchaseHook<R>>
	where
		F: Fn(Value) -> R + Send + Sync + 'static,
	{
		match original {
			Some(original) => Some(PurchaseHook::wrap(self.clone(), original)),
			None => {
				debug!("host purchase callback absent, interception skipped");
				None
			}
		}
	}

	fn assemble(&self, kind: EventKind, details: Value) -> TrackingEvent {
		let inner = &self.inner;

		let utm = UtmParameters::from_page_url(&inner.page.url);
		let referrer = ReferrerContext::derive(
			inner.page.referrer.as_deref(),
			inner.client_info.user_agent.as_deref(),
		);
		let landing = LandingContext::derive(&inner.page.url);
		let resolution = inner.attribution.resolve(&utm, &referrer, &landing);

		TrackingEvent {
			visitor_id: inner.identity.visitor_id(),
			session_id: inner.identity.session_id(),
			store_url: inner.page.origin(),
			page_url: inner.page.url.clone(),
			event_type: kind,
			event_details: details,
			utm_params: utm,
			referrer,
			traffic_source: resolution.current,
			first_touch_context: resolution.first_touch,
			client_info: inner.client_info.clone(),
			visitor_info: inner.identity.customer().cloned(),
			timestamp: Utc::now(),
		}
	}

	fn dispatch(&self, event: TrackingEvent) {
		let transport = Arc::clone(&self.inner.transport);

		match tokio::runtime::Handle::try_current() {
			Ok(handle) => {
				handle.spawn(async move {
					if let Err(error) = transport.deliver(event).await {
						debug!(error = %error, "tracking delivery failed");
					}
				});
			}
			Err(_) => {
				debug!("no async runtime available, tracking event dropped");
			}
		}
	}
}

/// Serializes trigger details, degrading to an empty object rather than
/// failing the emission.
fn to_details<T: Serialize>(details: &T) -> Value {
	serde_json::to_value(details).unwrap_or_else(|_| json!({}))
}
