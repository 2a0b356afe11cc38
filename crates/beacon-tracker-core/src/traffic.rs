// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Traffic-source classification for a single navigation.
//!
//! A navigation is classified from two inputs: the UTM parameters on the
//! page URL and the referrer. Explicit UTM tagging always wins; a referrer
//! host is classified against fixed social/search domain lists; everything
//! else is direct. The first classification ever computed for a visitor is
//! locked as their first-touch context and never overwritten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ParseError;

/// Referrer hosts treated as social traffic.
const SOCIAL_HOSTS: &[&str] = &[
	"instagram", "facebook", "tiktok", "snapchat", "twitter", "linkedin",
];

/// Referrer hosts treated as organic search traffic.
const SEARCH_HOSTS: &[&str] = &["google", "bing", "yahoo", "duckduckgo"];

/// User-agent fragments that indicate an in-app browser.
const IN_APP_UA_HINTS: &[&str] = &["instagram", "fbav", "tiktok", "snapchat"];

/// Campaign-tagging query parameters parsed from the page URL.
///
/// Recomputed on every navigation; never persisted on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmParameters {
	#[serde(rename = "utm_source")]
	pub source: Option<String>,
	#[serde(rename = "utm_medium")]
	pub medium: Option<String>,
	#[serde(rename = "utm_campaign")]
	pub campaign: Option<String>,
	#[serde(rename = "utm_term")]
	pub term: Option<String>,
	#[serde(rename = "utm_content")]
	pub content: Option<String>,
}

impl UtmParameters {
	/// Extracts UTM parameters from a parsed URL's query string.
	#[must_use]
	pub fn from_url(url: &Url) -> Self {
		let mut utm = Self::default();
		for (key, value) in url.query_pairs() {
			if value.is_empty() {
				continue;
			}
			let value = value.into_owned();
			match key.as_ref() {
				"utm_source" => utm.source = Some(value),
				"utm_medium" => utm.medium = Some(value),
				"utm_campaign" => utm.campaign = Some(value),
				"utm_term" => utm.term = Some(value),
				"utm_content" => utm.content = Some(value),
				_ => {}
			}
		}
		utm
	}

	/// Extracts UTM parameters from a raw page URL.
	///
	/// An unparsable URL yields empty parameters.
	#[must_use]
	pub fn from_page_url(page_url: &str) -> Self {
		Url::parse(page_url)
			.map(|url| Self::from_url(&url))
			.unwrap_or_default()
	}

	/// Returns `true` if the navigation carries explicit campaign tagging.
	#[must_use]
	pub fn is_tagged(&self) -> bool {
		self.source.is_some()
	}
}

/// The referrer of the current navigation, classified against fixed lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferrerContext {
	/// Raw referrer URL, if any.
	pub url: Option<String>,
	/// Lowercased referrer host. Absent when the referrer is missing or
	/// unparsable.
	pub host: Option<String>,
	pub is_social: bool,
	pub is_search: bool,
	/// The user agent suggests an in-app browser (Instagram, Facebook,
	/// TikTok, Snapchat webviews).
	pub in_app_browser_hint: bool,
}

impl ReferrerContext {
	/// Derives the referrer context from the raw referrer string and the
	/// user agent.
	///
	/// A malformed referrer URL is treated as no referrer at all.
	#[must_use]
	pub fn derive(referrer: Option<&str>, user_agent: Option<&str>) -> Self {
		let url = referrer
			.filter(|r| !r.is_empty())
			.map(std::string::ToString::to_string);
		let host = url
			.as_deref()
			.and_then(|raw| Url::parse(raw).ok())
			.and_then(|parsed| parsed.host_str().map(str::to_ascii_lowercase));

		let matches = |list: &[&str]| {
			host.as_deref()
				.map(|h| list.iter().any(|needle| h.contains(needle)))
				.unwrap_or(false)
		};
		let is_social = matches(SOCIAL_HOSTS);
		let is_search = matches(SEARCH_HOSTS);

		let ua = user_agent.unwrap_or_default().to_ascii_lowercase();
		let in_app_browser_hint = IN_APP_UA_HINTS.iter().any(|hint| ua.contains(hint));

		Self {
			url,
			host,
			is_social,
			is_search,
			in_app_browser_hint,
		}
	}
}

/// How the current navigation's traffic source was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionType {
	/// The URL carried explicit UTM tagging.
	ExplicitUtm,
	/// Classified from the referrer host.
	Referrer,
	/// No UTM and no referrer; the visit cannot be attributed.
	DirectUnverified,
}

impl AttributionType {
	#[must_use]
	pub fn as_str(&self) -> &'static str {
		match self {
			AttributionType::ExplicitUtm => "explicit_utm",
			AttributionType::Referrer => "referrer",
			AttributionType::DirectUnverified => "direct_unverified",
		}
	}
}

impl std::fmt::Display for AttributionType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl std::str::FromStr for AttributionType {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"explicit_utm" => Ok(AttributionType::ExplicitUtm),
			"referrer" => Ok(AttributionType::Referrer),
			"direct_unverified" => Ok(AttributionType::DirectUnverified),
			_ => Err(ParseError::InvalidAttributionType(s.to_string())),
		}
	}
}

/// The resolved traffic classification for the current navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficSource {
	pub source: String,
	pub medium: String,
	pub campaign: String,
	pub attribution_type: AttributionType,
}

impl TrafficSource {
	/// Classifies the current navigation.
	///
	/// Precedence: explicit UTM tagging, then referrer host, then direct.
	#[must_use]
	pub fn classify(utm: &UtmParameters, referrer: &ReferrerContext) -> Self {
		if let Some(source) = &utm.source {
			return Self {
				source: source.clone(),
				medium: utm.medium.clone().unwrap_or_else(|| "paid".to_string()),
				campaign: utm.campaign.clone().unwrap_or_else(|| "n/a".to_string()),
				attribution_type: AttributionType::ExplicitUtm,
			};
		}

		if let Some(host) = &referrer.host {
			let medium = if referrer.is_search {
				"organic"
			} else if referrer.is_social {
				"social"
			} else {
				"referral"
			};
			return Self {
				source: host.clone(),
				medium: medium.to_string(),
				campaign: "n/a".to_string(),
				attribution_type: AttributionType::Referrer,
			};
		}

		Self {
			source: "direct".to_string(),
			medium: "none".to_string(),
			campaign: "n/a".to_string(),
			attribution_type: AttributionType::DirectUnverified,
		}
	}
}

/// Classification of the page the navigation landed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingContext {
	pub url: String,
	pub path: String,
	pub is_product_page: bool,
	pub is_collection_page: bool,
	pub is_homepage: bool,
}

impl LandingContext {
	/// Derives the landing classification from the page URL.
	#[must_use]
	pub fn derive(page_url: &str) -> Self {
		let path = Url::parse(page_url)
			.map(|url| url.path().to_ascii_lowercase())
			.unwrap_or_default();

		Self {
			url: page_url.to_string(),
			is_product_page: path.contains("/products/"),
			is_collection_page: path.contains("/collections/"),
			is_homepage: path.is_empty() || path == "/",
			path,
		}
	}
}

/// The first traffic classification ever recorded for a visitor.
///
/// Locked into the durable store on first capture and never overwritten
/// for the life of that store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstTouchContext {
	#[serde(flatten)]
	pub traffic: TrafficSource,
	pub landing: LandingContext,
	pub captured_at: DateTime<Utc>,
}

impl FirstTouchContext {
	/// Captures the first-touch record for the current navigation.
	#[must_use]
	pub fn capture(traffic: TrafficSource, landing: LandingContext) -> Self {
		Self {
			traffic,
			landing,
			captured_at: Utc::now(),
		}
	}
}
