// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Beacon storefront visitor-tracking system.
//!
//! This crate holds the wire envelope and the pure classification and
//! normalization logic shared by the client SDK (`beacon-tracker`) and any
//! server-side consumer of the collection endpoint's JSON documents:
//!
//! - Visitor/session identifier newtypes
//! - UTM, referrer, and landing-page classification
//! - Traffic-source precedence and the first-touch record
//! - Purchase-payload normalization into canonical order snapshots
//! - The [`TrackingEvent`] envelope itself
//!
//! Nothing in this crate performs I/O; storage and delivery live in the
//! SDK crate.
//!
//! # Example
//!
//! ```
//! use beacon_tracker_core::{ReferrerContext, TrafficSource, UtmParameters};
//!
//! let utm = UtmParameters::from_page_url("https://shop.example/?utm_source=mailer");
//! let referrer = ReferrerContext::derive(Some("https://www.google.com/"), None);
//!
//! // Explicit UTM tagging wins over the referrer.
//! let traffic = TrafficSource::classify(&utm, &referrer);
//! assert_eq!(traffic.source, "mailer");
//! assert_eq!(traffic.medium, "paid");
//! ```

pub mod error;
pub mod event;
pub mod ids;
pub mod order;
pub mod traffic;

pub use error::ParseError;
pub use event::{ClientInfo, CustomerIdentity, EventKind, TrackingEvent};
pub use ids::{SessionId, VisitorId};
pub use order::{OrderSnapshot, ProductSnapshot, DEFAULT_CURRENCY, UNKNOWN_AMOUNT};
pub use traffic::{
	AttributionType, FirstTouchContext, LandingContext, ReferrerContext, TrafficSource,
	UtmParameters,
};
