// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: embed the Beacon tracker in a storefront host.
//!
//! Run with:
//!   BEACON_ENDPOINT=https://collect.example.com \
//!   cargo run --example embed -p beacon-tracker

use std::sync::Arc;

use beacon_tracker::{ClickDetails, ClientInfo, MemoryStore, PageContext, Tracker};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "debug".into()),
		)
		.init();

	let endpoint = std::env::var("BEACON_ENDPOINT")
		.unwrap_or_else(|_| "http://localhost:8000".to_string());

	println!("Initializing tracker against {endpoint}");

	// A real host injects cookie/session-backed stores; the in-memory
	// store keeps this example self-contained.
	let durable = Arc::new(MemoryStore::new());
	let session = Arc::new(MemoryStore::new());

	let tracker = Tracker::builder()
		.endpoint(&endpoint)
		.page(
			PageContext::new("https://shop.example/products/leather-bag?utm_source=meta&utm_campaign=eid")
				.with_referrer("https://m.facebook.com/"),
		)
		.client_info(ClientInfo {
			language: Some("ar-SA".to_string()),
			timezone: Some("Asia/Riyadh".to_string()),
			platform: Some("Linux x86_64".to_string()),
			screen_resolution: Some("1920x1080".to_string()),
			device_memory: Some(8.0),
			user_agent: Some("Mozilla/5.0 (example)".to_string()),
		})
		.durable_store(durable)
		.session_store(session)
		.build()?;

	// Page lifecycle.
	tracker.pageview();
	tracker.click(ClickDetails {
		tag: "BUTTON".to_string(),
		id: Some("add-to-cart".to_string()),
		text_snippet: Some("Add to cart".to_string()),
		..ClickDetails::default()
	});
	tracker.scroll(30);
	tracker.scroll(85);

	// Host-invoked commerce events.
	tracker.add_to_cart(json!({ "product_id": "prod_881", "price": "349.00" }));
	tracker.add_to_wishlist("prod_552");

	// Wrap the host's existing purchase callback; tracking becomes a side
	// effect and the callback's behavior is untouched.
	let hook = tracker
		.intercept_purchase(Some(|payload: serde_json::Value| {
			println!("host purchase callback ran for {payload}");
			"receipt-rendered"
		}))
		.expect("callback was provided");

	let outcome = hook.call(json!({
		"order": {
			"id": "A-10293",
			"order_total": "349.00",
			"payment_method": "cod",
			"products": [{ "id": "prod_881", "name": "Leather bag", "sale_price": "349.00" }]
		}
	}));
	println!("host callback returned: {outcome}");

	// Give the fire-and-forget deliveries a moment before the process ends.
	tokio::time::sleep(std::time::Duration::from_millis(500)).await;

	Ok(())
}
