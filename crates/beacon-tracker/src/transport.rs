// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Best-effort delivery of tracking envelopes.
//!
//! One POST per event, no retries, no explicit timeout: a slow or failed
//! delivery is the transport's problem and never the page's. The
//! dispatcher discards whatever error comes back.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use beacon_tracker_core::TrackingEvent;

use crate::error::{Result, TrackerError};

/// Path of the collection endpoint, appended to the configured base URL.
pub const COLLECT_PATH: &str = "/save_tracking";

/// User-Agent reported by the SDK's HTTP client.
const USER_AGENT: &str = concat!("beacon-tracker/", env!("CARGO_PKG_VERSION"));

/// Delivery seam for assembled envelopes.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Delivers one envelope. Called once per event; a failure is final.
	async fn deliver(&self, event: TrackingEvent) -> Result<()>;
}

/// HTTP transport posting JSON envelopes to the collection endpoint.
pub struct HttpTransport {
	client: Client,
	collect_url: String,
}

impl HttpTransport {
	/// Creates a transport for the given collection base URL.
	///
	/// A trailing slash on the base URL is normalized away.
	pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
		let base = base_url.as_ref().trim_end_matches('/');
		if reqwest::Url::parse(base).is_err() {
			return Err(TrackerError::InvalidEndpoint);
		}

		let client = Client::builder()
			.user_agent(USER_AGENT)
			.build()
			.map_err(TrackerError::RequestFailed)?;

		Ok(Self {
			client,
			collect_url: format!("{base}{COLLECT_PATH}"),
		})
	}

	/// The fully resolved collection URL.
	#[must_use]
	pub fn collect_url(&self) -> &str {
		&self.collect_url
	}
}

#[async_trait]
impl Transport for HttpTransport {
	async fn deliver(&self, event: TrackingEvent) -> Result<()> {
		debug!(
			url = %self.collect_url,
			event_type = %event.event_type,
			"delivering tracking event"
		);

		let response = self
			.client
			.post(&self.collect_url)
			.json(&event)
			.send()
			.await?;

		if !response.status().is_success() {
			let status = response.status().as_u16();
			let message = response.text().await.unwrap_or_default();
			return Err(TrackerError::ServerError { status, message });
		}

		Ok(())
	}
}
