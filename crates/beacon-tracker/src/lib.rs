// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Beacon storefront visitor-tracking SDK.
//!
//! Embeds in an e-commerce storefront host, resolves a durable
//! visitor/session identity, locks the visitor's first-touch marketing
//! attribution, normalizes commerce events into a canonical envelope, and
//! best-effort-delivers each envelope to the collection endpoint.
//!
//! Design constraints, in order:
//!
//! - **Never break the page.** No public tracking call returns an error,
//!   panics, or blocks on the network. Failures are logged and dropped.
//! - **Write-once attribution.** The first traffic classification ever
//!   computed for a visitor is locked for the life of the durable store.
//! - **Fire-and-forget delivery.** One POST per event, no retries, no
//!   ordering guarantee; the server sequences by envelope timestamp.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use beacon_tracker::{ClientInfo, MemoryStore, PageContext, Tracker};
//!
//! # async fn run() -> Result<(), beacon_tracker::TrackerError> {
//! let tracker = Tracker::builder()
//!     .endpoint("https://collect.example.com")
//!     .page(
//!         PageContext::new("https://shop.example/products/shoe?utm_source=meta")
//!             .with_referrer("https://m.facebook.com/"),
//!     )
//!     .client_info(ClientInfo {
//!         language: Some("ar-SA".to_string()),
//!         ..ClientInfo::default()
//!     })
//!     .durable_store(Arc::new(MemoryStore::new()))
//!     .session_store(Arc::new(MemoryStore::new()))
//!     .build()?;
//!
//! tracker.pageview();
//! tracker.add_to_wishlist("prod_881");
//! # Ok(())
//! # }
//! ```

pub mod attribution;
pub mod dispatch;
pub mod error;
pub mod hook;
pub mod identity;
pub mod scroll;
pub mod storage;
pub mod transport;

pub use attribution::{AttributionResolver, Resolution, FIRST_TOUCH_KEY};
pub use dispatch::{
	ClickDetails, FormSubmitDetails, PageContext, Tracker, TrackerBuilder, MAX_CLICK_TEXT_LEN,
};
pub use error::{Result, TrackerError};
pub use hook::PurchaseHook;
pub use identity::{IdentityResolver, SESSION_ID_KEY, VISITOR_ID_KEY, VISITOR_RETENTION};
pub use scroll::ScrollDepthGauge;
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use transport::{HttpTransport, Transport, COLLECT_PATH};

// The core wire types are part of the SDK's public surface.
pub use beacon_tracker_core::{
	AttributionType, ClientInfo, CustomerIdentity, EventKind, FirstTouchContext, LandingContext,
	OrderSnapshot, ProductSnapshot, ReferrerContext, SessionId, TrackingEvent, TrafficSource,
	UtmParameters, VisitorId,
};
