// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Interception of a host-provided purchase callback.
//!
//! Storefronts often already define their own purchase-completion
//! callback. Instead of observing calls it was never wired into, the
//! tracker wraps that callback in an explicit decorator: tracking happens
//! as a side effect, the original callback always runs with the exact
//! original argument, and its return value passes through untouched. A
//! failure anywhere in the tracking path cannot reach the purchase flow.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::Value;
use tracing::debug;

use crate::dispatch::Tracker;

/// Decorator around the host's purchase-completion callback.
pub struct PurchaseHook<R> {
	tracker: Tracker,
	original: Box<dyn Fn(Value) -> R + Send + Sync>,
}

impl<R> PurchaseHook<R> {
	/// Wraps the host callback.
	pub fn wrap<F>(tracker: Tracker, original: F) -> Self
	where
		F: Fn(Value) -> R + Send + Sync + 'static,
	{
		Self {
			tracker,
			original: Box::new(original),
		}
	}

	/// Invokes the hook with a purchase payload.
	///
	/// Emits the purchase tracking event first, swallowing any panic it
	/// raises, then delegates to the original callback and returns its
	/// exact return value.
	pub fn call(&self, payload: Value) -> R {
		let tracker = self.tracker.clone();
		let tracked = payload.clone();
		if catch_unwind(AssertUnwindSafe(move || tracker.purchase(tracked))).is_err() {
			debug!("purchase tracking panicked, original callback unaffected");
		}

		(self.original)(payload)
	}
}
