// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Normalization of host purchase payloads into canonical order snapshots.
//!
//! Storefront platforms hand the purchase callback whatever shape their
//! checkout produces: sometimes `{ "order": {...} }`, sometimes the order
//! object bare, with string-typed totals and uneven product entries. All of
//! that is resolved here, at the boundary, into one stable [`OrderSnapshot`].
//! The only fatal condition is a missing order id; every other malformed
//! field degrades to a default on its own.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Currency code applied when the raw order does not carry one.
pub const DEFAULT_CURRENCY: &str = "SAR";

/// Display value used when the order total cannot be coerced to a number.
///
/// Deliberately not "0": an unknown total must not read as a free order.
pub const UNKNOWN_AMOUNT: &str = "unknown";

/// A single line item of a normalized order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
	pub product_id: Option<String>,
	pub name: Option<String>,
	pub sku: Option<String>,
	pub price: Option<f64>,
	pub quantity: u32,
}

/// The canonical, schema-stable representation of a purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
	pub order_id: String,
	pub customer_id: Option<String>,
	pub customer_name: Option<String>,
	pub customer_email: Option<String>,
	pub customer_mobile: Option<String>,
	/// `None` when the raw total was absent or non-numeric.
	pub total_amount: Option<f64>,
	pub total_amount_display: String,
	pub currency: String,
	pub issue_date: Option<String>,
	pub payment_method_name: Option<String>,
	pub products: Vec<ProductSnapshot>,
	pub product_count: u64,
}

impl OrderSnapshot {
	/// Normalizes a raw purchase payload.
	///
	/// Accepts `{ "order": {...} }` or a bare order-shaped object. Returns
	/// `None` when no order id can be found anywhere in the payload, in
	/// which case the caller skips the purchase event entirely.
	#[must_use]
	pub fn from_raw(raw: &Value) -> Option<Self> {
		let order = match raw.get("order") {
			Some(inner) if inner.is_object() => inner,
			_ => raw,
		};
		let order_id = coerce_string(order.get("id")?)?;

		let customer = order.get("customer");
		let customer_field = |key: &str| {
			customer
				.and_then(|c| c.get(key))
				.and_then(coerce_string)
				.or_else(|| order.get(format!("customer_{key}")).and_then(coerce_string))
		};

		let total_amount = ["order_total", "total", "order_total_string"]
			.iter()
			.find_map(|key| order.get(*key))
			.and_then(coerce_amount);
		let total_amount_display = total_amount
			.map(|amount| format!("{amount:.2}"))
			.unwrap_or_else(|| UNKNOWN_AMOUNT.to_string());

		let currency = order
			.get("currency")
			.and_then(coerce_string)
			.unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

		let issue_date = order
			.get("issue_date")
			.or_else(|| order.get("created_at"))
			.and_then(coerce_string);

		let payment_method_name = order
			.get("payment_method")
			.and_then(|pm| match pm {
				Value::String(name) => Some(name.clone()),
				Value::Object(_) => pm.get("name").and_then(coerce_string),
				_ => None,
			})
			.or_else(|| order.get("payment_method_name").and_then(coerce_string));

		let products: Vec<ProductSnapshot> = order
			.get("products")
			.and_then(Value::as_array)
			.map(|entries| entries.iter().map(normalize_product).collect())
			.unwrap_or_default();

		let product_count = order
			.get("products_count")
			.and_then(coerce_count)
			.unwrap_or(products.len() as u64);

		Some(Self {
			order_id,
			customer_id: customer_field("id"),
			customer_name: customer_field("name"),
			customer_email: customer_field("email"),
			customer_mobile: customer_field("mobile"),
			total_amount,
			total_amount_display,
			currency,
			issue_date,
			payment_method_name,
			products,
			product_count,
		})
	}
}

/// Maps one raw product entry. Every field degrades independently.
fn normalize_product(raw: &Value) -> ProductSnapshot {
	let product_id = raw
		.get("id")
		.and_then(coerce_string)
		.or_else(|| raw.get("product_id").and_then(coerce_string));

	let price = raw
		.get("sale_price")
		.and_then(coerce_amount)
		.or_else(|| raw.get("price").and_then(coerce_amount));

	let quantity = raw
		.get("quantity")
		.and_then(coerce_count)
		.and_then(|q| u32::try_from(q).ok())
		.unwrap_or(1);

	ProductSnapshot {
		product_id,
		name: raw.get("name").and_then(coerce_string),
		sku: raw.get("sku").and_then(coerce_string),
		price,
		quantity,
	}
}

/// Coerces a raw field to a string; numbers are stringified, other shapes
/// are dropped.
fn coerce_string(value: &Value) -> Option<String> {
	match value {
		Value::String(s) if !s.is_empty() => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

/// Coerces a raw amount to a number. Strings yield their first numeric
/// token, so "SAR 49.99" and "49.99 ريال" both resolve to 49.99.
fn coerce_amount(value: &Value) -> Option<f64> {
	match value {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => first_numeric_token(s),
		_ => None,
	}
}

fn coerce_count(value: &Value) -> Option<u64> {
	match value {
		Value::Number(n) => n.as_u64(),
		Value::String(s) => s.trim().parse().ok(),
		_ => None,
	}
}

fn first_numeric_token(s: &str) -> Option<f64> {
	let start = s.find(|c: char| c.is_ascii_digit())?;
	let token: String = s[start..]
		.chars()
		.take_while(|c| c.is_ascii_digit() || *c == '.')
		.collect();
	token.parse().ok()
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	#[test]
	fn wrapped_order_shape_is_accepted() {
		let raw = json!({
			"order": {
				"id": "A1",
				"order_total": "49.99",
				"products": [{ "name": "Shoe", "sale_price": "49.99" }]
			}
		});
		let snapshot = OrderSnapshot::from_raw(&raw).unwrap();

		assert_eq!(snapshot.order_id, "A1");
		assert_eq!(snapshot.total_amount, Some(49.99));
		assert_eq!(snapshot.total_amount_display, "49.99");
		assert_eq!(snapshot.currency, DEFAULT_CURRENCY);
		assert_eq!(snapshot.products.len(), 1);
		assert_eq!(snapshot.products[0].quantity, 1);
		assert_eq!(snapshot.products[0].price, Some(49.99));
		assert_eq!(snapshot.product_count, 1);
	}

	#[test]
	fn bare_order_shape_is_accepted() {
		let raw = json!({ "id": 12345, "total": 120, "currency": "KWD" });
		let snapshot = OrderSnapshot::from_raw(&raw).unwrap();

		assert_eq!(snapshot.order_id, "12345");
		assert_eq!(snapshot.total_amount, Some(120.0));
		assert_eq!(snapshot.currency, "KWD");
		assert!(snapshot.products.is_empty());
		assert_eq!(snapshot.product_count, 0);
	}

	#[test]
	fn missing_order_id_yields_no_snapshot() {
		assert!(OrderSnapshot::from_raw(&json!({})).is_none());
		assert!(OrderSnapshot::from_raw(&json!({ "order": {} })).is_none());
		assert!(OrderSnapshot::from_raw(&json!({ "order": { "total": 10 } })).is_none());
		assert!(OrderSnapshot::from_raw(&json!("not an object")).is_none());
		assert!(OrderSnapshot::from_raw(&json!(null)).is_none());
	}

	#[test]
	fn non_numeric_total_becomes_unknown_not_zero() {
		let raw = json!({ "id": "A2", "order_total": "call us" });
		let snapshot = OrderSnapshot::from_raw(&raw).unwrap();

		assert_eq!(snapshot.total_amount, None);
		assert_eq!(snapshot.total_amount_display, UNKNOWN_AMOUNT);
	}

	#[test]
	fn string_total_with_currency_noise_is_extracted() {
		let raw = json!({ "id": "A3", "order_total_string": "SAR 1299.50" });
		let snapshot = OrderSnapshot::from_raw(&raw).unwrap();
		assert_eq!(snapshot.total_amount, Some(1299.50));
	}

	#[test]
	fn customer_fields_from_nested_object() {
		let raw = json!({
			"id": "A4",
			"customer": { "id": 77, "name": "Sara", "email": "sara@example.com", "mobile": "+9665xxxxxxx" }
		});
		let snapshot = OrderSnapshot::from_raw(&raw).unwrap();

		assert_eq!(snapshot.customer_id.as_deref(), Some("77"));
		assert_eq!(snapshot.customer_name.as_deref(), Some("Sara"));
		assert_eq!(snapshot.customer_email.as_deref(), Some("sara@example.com"));
		assert_eq!(snapshot.customer_mobile.as_deref(), Some("+9665xxxxxxx"));
	}

	#[test]
	fn customer_fields_from_flat_keys() {
		let raw = json!({ "id": "A5", "customer_name": "Omar" });
		let snapshot = OrderSnapshot::from_raw(&raw).unwrap();
		assert_eq!(snapshot.customer_name.as_deref(), Some("Omar"));
		assert!(snapshot.customer_email.is_none());
	}

	#[test]
	fn payment_method_accepts_string_or_object() {
		let raw = json!({ "id": "A6", "payment_method": "cod" });
		assert_eq!(
			OrderSnapshot::from_raw(&raw).unwrap().payment_method_name.as_deref(),
			Some("cod")
		);

		let raw = json!({ "id": "A6", "payment_method": { "name": "tabby", "code": 4 } });
		assert_eq!(
			OrderSnapshot::from_raw(&raw).unwrap().payment_method_name.as_deref(),
			Some("tabby")
		);

		let raw = json!({ "id": "A6", "payment_method_name": "tap" });
		assert_eq!(
			OrderSnapshot::from_raw(&raw).unwrap().payment_method_name.as_deref(),
			Some("tap")
		);
	}

	#[test]
	fn issue_date_falls_back_to_created_at() {
		let raw = json!({ "id": "A7", "created_at": "2025-06-01T10:00:00Z" });
		let snapshot = OrderSnapshot::from_raw(&raw).unwrap();
		assert_eq!(snapshot.issue_date.as_deref(), Some("2025-06-01T10:00:00Z"));
	}

	#[test]
	fn product_id_falls_back_to_alternate_key_then_absent() {
		let raw = json!({
			"id": "A8",
			"products": [
				{ "id": "p1" },
				{ "product_id": "p2" },
				{ "name": "mystery item" }
			]
		});
		let snapshot = OrderSnapshot::from_raw(&raw).unwrap();

		assert_eq!(snapshot.products[0].product_id.as_deref(), Some("p1"));
		assert_eq!(snapshot.products[1].product_id.as_deref(), Some("p2"));
		assert!(snapshot.products[2].product_id.is_none());
	}

	#[test]
	fn sale_price_wins_over_list_price() {
		let raw = json!({
			"id": "A9",
			"products": [{ "id": "p1", "price": "100", "sale_price": "75" }]
		});
		let snapshot = OrderSnapshot::from_raw(&raw).unwrap();
		assert_eq!(snapshot.products[0].price, Some(75.0));
	}

	#[test]
	fn quantity_defaults_to_one_on_garbage() {
		let raw = json!({
			"id": "B1",
			"products": [
				{ "id": "p1", "quantity": 3 },
				{ "id": "p2", "quantity": "two" },
				{ "id": "p3" }
			]
		});
		let snapshot = OrderSnapshot::from_raw(&raw).unwrap();

		assert_eq!(snapshot.products[0].quantity, 3);
		assert_eq!(snapshot.products[1].quantity, 1);
		assert_eq!(snapshot.products[2].quantity, 1);
	}

	#[test]
	fn explicit_products_count_wins_over_list_length() {
		let raw = json!({
			"id": "B2",
			"products_count": 7,
			"products": [{ "id": "p1" }]
		});
		let snapshot = OrderSnapshot::from_raw(&raw).unwrap();
		assert_eq!(snapshot.product_count, 7);
	}

	#[test]
	fn malformed_products_list_does_not_drop_the_order() {
		let raw = json!({ "id": "B3", "products": "oops" });
		let snapshot = OrderSnapshot::from_raw(&raw).unwrap();
		assert!(snapshot.products.is_empty());
		assert_eq!(snapshot.product_count, 0);
	}

	#[test]
	fn numeric_order_id_is_stringified() {
		let raw = json!({ "order": { "id": 90210 } });
		let snapshot = OrderSnapshot::from_raw(&raw).unwrap();
		assert_eq!(snapshot.order_id, "90210");
	}

	proptest! {
		#[test]
		fn normalization_never_panics_on_arbitrary_totals(total in "\\PC{0,40}") {
			let raw = json!({ "id": "X", "order_total": total });
			let snapshot = OrderSnapshot::from_raw(&raw);
			prop_assert!(snapshot.is_some());
		}

		#[test]
		fn numeric_totals_pass_through(total in 0.01f64..100_000.0) {
			let raw = json!({ "id": "X", "order_total": total });
			let snapshot = OrderSnapshot::from_raw(&raw).unwrap();
			prop_assert_eq!(snapshot.total_amount, Some(total));
		}
	}
}
