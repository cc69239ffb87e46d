//! Canonical payload encoding shared by every signed exchange.
//!
//! Both sides of the wire must produce the exact same bytes before hashing:
//! fields sorted by key, RFC 3986 percent-encoding, `k=v` pairs joined with
//! `&`. Booleans are rendered as `1`/`0` and numbers in their shortest
//! display form so `80.0` and `80` canonicalize identically.

// self
use crate::_prelude::*;

/// Ordered key→value mapping canonicalized into the HMAC message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CanonicalPayload(BTreeMap<String, String>);
impl CanonicalPayload {
	/// Creates an empty payload.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a string field, replacing any previous value for the key.
	pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.insert(key.into(), value.into());

		self
	}

	/// Adds a boolean field rendered as `1`/`0`.
	pub fn flag(self, key: impl Into<String>, value: bool) -> Self {
		self.field(key, if value { "1" } else { "0" })
	}

	/// Adds a numeric field in its shortest display form.
	pub fn number(self, key: impl Into<String>, value: f64) -> Self {
		self.field(key, value.to_string())
	}

	/// Returns the value stored under `key`, if any.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// True when no fields have been added.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates fields in canonical (sorted-key) order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Merges `other` into `self`, with `other` winning on key clashes.
	pub fn merged(mut self, other: &CanonicalPayload) -> Self {
		for (key, value) in other.iter() {
			self.0.insert(key.into(), value.into());
		}

		self
	}

	/// Renders the sorted, percent-encoded query string.
	pub fn canonical_query(&self) -> String {
		let mut buf = String::new();

		for (idx, (key, value)) in self.iter().enumerate() {
			if idx > 0 {
				buf.push('&');
			}

			buf.push_str(&encode_component(key));
			buf.push('=');
			buf.push_str(&encode_component(value));
		}

		buf
	}

	/// Appends the fields to a URL's query, after any existing pairs.
	pub fn append_to(&self, url: &mut Url) {
		let mut pairs = url.query_pairs_mut();

		for (key, value) in self.iter() {
			pairs.append_pair(key, value);
		}

		drop(pairs);
	}
}
impl<K, V> FromIterator<(K, V)> for CanonicalPayload
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

/// Percent-encodes a single component per RFC 3986.
///
/// Unreserved characters (`A-Z a-z 0-9 - . _ ~`) pass through; everything
/// else, including spaces, becomes an uppercase `%XX` escape.
pub fn encode_component(raw: &str) -> String {
	let mut buf = String::with_capacity(raw.len());

	for byte in raw.bytes() {
		if is_unreserved(byte) {
			buf.push(byte as char);
		} else {
			buf.push('%');
			buf.push(HEX_UPPER[(byte >> 4) as usize] as char);
			buf.push(HEX_UPPER[(byte & 0x0f) as usize] as char);
		}
	}

	buf
}

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

fn is_unreserved(byte: u8) -> bool {
	byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn query_sorts_keys() {
		let payload = CanonicalPayload::new()
			.field("ts", "2024-01-01T00:00:00Z")
			.field("accessKeyId", "AK")
			.field("score", "80");

		assert_eq!(payload.canonical_query(), "accessKeyId=AK&score=80&ts=2024-01-01T00%3A00%3A00Z");
	}

	#[test]
	fn encoding_follows_rfc_3986() {
		assert_eq!(encode_component("a b+c"), "a%20b%2Bc");
		assert_eq!(encode_component("~-._"), "~-._");
		assert_eq!(encode_component("https://svc.example/cb"), "https%3A%2F%2Fsvc.example%2Fcb");
	}

	#[test]
	fn numbers_use_shortest_form() {
		let payload = CanonicalPayload::new().number("score", 80.0).number("half", 72.5);

		assert_eq!(payload.get("score"), Some("80"));
		assert_eq!(payload.get("half"), Some("72.5"));
	}

	#[test]
	fn flags_render_as_digits() {
		let payload = CanonicalPayload::new().flag("hasAccess", true).flag("canEdit", false);

		assert_eq!(payload.canonical_query(), "canEdit=0&hasAccess=1");
	}

	#[test]
	fn merged_prefers_the_right_hand_side() {
		let base = CanonicalPayload::new().field("a", "1").field("b", "2");
		let extra = CanonicalPayload::new().field("b", "3");

		assert_eq!(base.merged(&extra).get("b"), Some("3"));
	}
}
