// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribution resolution and the first-touch write-once lock.
//!
//! Classification itself is pure and lives in `beacon_tracker_core`. This
//! module owns the durable first-touch key: the first classification ever
//! computed for a visitor is persisted once and every later navigation
//! reads it back untouched. The check-and-set is mutex-guarded because a
//! Rust host may emit from multiple threads.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use beacon_tracker_core::{
	FirstTouchContext, LandingContext, ReferrerContext, TrafficSource, UtmParameters,
};
use tracing::{debug, warn};

use crate::storage::KeyValueStore;

/// Durable-store key for the locked first-touch record.
pub const FIRST_TOUCH_KEY: &str = "first_touch_context";

/// Retention window for the first-touch record.
pub const FIRST_TOUCH_RETENTION: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// The outcome of resolving attribution for one navigation.
#[derive(Debug, Clone)]
pub struct Resolution {
	/// Classification of the current navigation.
	pub current: TrafficSource,
	/// The visitor's locked first touch. `None` only when storage is
	/// unavailable or was cleared between lock and read.
	pub first_touch: Option<FirstTouchContext>,
}

/// Resolves traffic attribution and maintains the first-touch lock.
pub struct AttributionResolver {
	durable: Arc<dyn KeyValueStore>,
	// Guards the first-touch check-and-set.
	lock: Mutex<()>,
}

impl AttributionResolver {
	pub fn new(durable: Arc<dyn KeyValueStore>) -> Self {
		Self {
			durable,
			lock: Mutex::new(()),
		}
	}

	/// Returns the locked first-touch record, or `None` when nothing was
	/// ever locked. A corrupted record is treated as absent so a later
	/// navigation can re-lock.
	#[must_use]
	pub fn first_touch(&self) -> Option<FirstTouchContext> {
		let raw = match self.durable.get(FIRST_TOUCH_KEY) {
			Ok(Some(raw)) => raw,
			Ok(None) => return None,
			Err(error) => {
				debug!(error = %error, "first-touch read failed");
				return None;
			}
		};

		match serde_json::from_str(&raw) {
			Ok(ctx) => Some(ctx),
			Err(error) => {
				debug!(error = %error, "corrupt first-touch record treated as absent");
				None
			}
		}
	}

	/// Persists the first-touch record if and only if none exists yet.
	///
	/// Write-once: once a record is present it is never overwritten for
	/// the life of the durable store.
	pub fn lock_first_touch(&self, traffic: &TrafficSource, landing: &LandingContext) {
		let _guard = self
			.lock
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner());

		if self.first_touch().is_some() {
			return;
		}

		let ctx = FirstTouchContext::capture(traffic.clone(), landing.clone());
		let json = match serde_json::to_string(&ctx) {
			Ok(json) => json,
			Err(error) => {
				warn!(error = %error, "first-touch serialization failed");
				return;
			}
		};

		if let Err(error) = self
			.durable
			.put(FIRST_TOUCH_KEY, &json, Some(FIRST_TOUCH_RETENTION))
		{
			warn!(error = %error, "first-touch write failed");
		} else {
			debug!(source = %traffic.source, medium = %traffic.medium, "locked first touch");
		}
	}

	/// Classifies the current navigation, attempts the first-touch lock,
	/// and returns both records.
	#[must_use]
	pub fn resolve(
		&self,
		utm: &UtmParameters,
		referrer: &ReferrerContext,
		landing: &LandingContext,
	) -> Resolution {
		let current = TrafficSource::classify(utm, referrer);
		self.lock_first_touch(&current, landing);
		Resolution {
			current,
			first_touch: self.first_touch(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::storage::MemoryStore;
	use beacon_tracker_core::AttributionType;

	fn utm_with_source(source: &str) -> UtmParameters {
		UtmParameters {
			source: Some(source.to_string()),
			..UtmParameters::default()
		}
	}

	fn landing() -> LandingContext {
		LandingContext::derive("https://shop.example/products/shoe")
	}

	#[test]
	fn resolve_locks_first_touch_on_first_navigation() {
		let resolver = AttributionResolver::new(Arc::new(MemoryStore::new()));

		let resolution = resolver.resolve(
			&utm_with_source("meta"),
			&ReferrerContext::default(),
			&landing(),
		);

		let first_touch = resolution.first_touch.unwrap();
		assert_eq!(first_touch.traffic.source, "meta");
		assert_eq!(resolution.current.source, "meta");
		assert!(first_touch.landing.is_product_page);
	}

	#[test]
	fn second_resolve_keeps_the_original_first_touch() {
		let resolver = AttributionResolver::new(Arc::new(MemoryStore::new()));

		let first = resolver.resolve(
			&utm_with_source("meta"),
			&ReferrerContext::default(),
			&landing(),
		);
		let second = resolver.resolve(
			&utm_with_source("tiktok_ads"),
			&ReferrerContext::default(),
			&landing(),
		);

		assert_eq!(second.current.source, "tiktok_ads");
		assert_eq!(
			second.first_touch.as_ref().unwrap().traffic.source,
			"meta"
		);
		assert_eq!(first.first_touch, second.first_touch);
	}

	#[test]
	fn first_touch_survives_resolver_replacement() {
		let durable: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

		AttributionResolver::new(Arc::clone(&durable)).resolve(
			&utm_with_source("meta"),
			&ReferrerContext::default(),
			&landing(),
		);

		let later = AttributionResolver::new(durable);
		let resolution = later.resolve(
			&UtmParameters::default(),
			&ReferrerContext::default(),
			&landing(),
		);

		assert_eq!(resolution.current.attribution_type, AttributionType::DirectUnverified);
		assert_eq!(resolution.first_touch.unwrap().traffic.source, "meta");
	}

	#[test]
	fn corrupt_record_is_treated_as_absent_and_relocked() {
		let durable: Arc<MemoryStore> = Arc::new(MemoryStore::new());
		durable.put(FIRST_TOUCH_KEY, "{not json", None).unwrap();

		let resolver =
			AttributionResolver::new(Arc::clone(&durable) as Arc<dyn KeyValueStore>);
		assert!(resolver.first_touch().is_none());

		let resolution = resolver.resolve(
			&utm_with_source("snap"),
			&ReferrerContext::default(),
			&landing(),
		);
		assert_eq!(resolution.first_touch.unwrap().traffic.source, "snap");
	}

	#[test]
	fn missing_record_reads_as_none() {
		let resolver = AttributionResolver::new(Arc::new(MemoryStore::new()));
		assert!(resolver.first_touch().is_none());
	}

	#[test]
	fn locked_record_is_valid_json_in_store() {
		let durable: Arc<MemoryStore> = Arc::new(MemoryStore::new());
		let resolver =
			AttributionResolver::new(Arc::clone(&durable) as Arc<dyn KeyValueStore>);

		resolver.lock_first_touch(
			&TrafficSource::classify(&utm_with_source("meta"), &ReferrerContext::default()),
			&landing(),
		);

		let raw = durable.get(FIRST_TOUCH_KEY).unwrap().unwrap();
		let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
		assert_eq!(value["source"], "meta");
		assert_eq!(value["attribution_type"], "explicit_utm");
	}
}
