//! Signed-envelope primitives: canonical encoding, action names, and the
//! HMAC signer.
//!
//! Every exchange with the remote platform carries a token computed over a
//! fixed, documented field set for its action. The signed set travels next
//! to optional unsigned display fields; verification recomputes the digest
//! over the signed set alone and compares in constant time.

pub mod action;
pub mod canonical;
pub mod signer;

pub use action::*;
pub use canonical::*;
pub use signer::*;

// self
use crate::_prelude::*;

/// Immutable signed payload ready to travel as a query string.
///
/// `signed` is the token basis — the exact field set the action documents.
/// `extra` carries unsigned companions (display names, consent-gated email)
/// that ride along without participating in the digest.
#[derive(Clone, Debug)]
pub struct SignedEnvelope {
	/// Operation this envelope authorizes.
	pub action: Action,
	/// Protocol generation the action name was drawn from.
	pub version: ProtocolVersion,
	/// Fields covered by the token.
	pub signed: CanonicalPayload,
	/// Unsigned companion fields.
	pub extra: CanonicalPayload,
	/// Digest over `signed`.
	pub token: Token,
}
impl SignedEnvelope {
	/// Signs `signed` and seals the envelope.
	pub fn seal(
		signer: &TokenSigner,
		action: Action,
		version: ProtocolVersion,
		signed: CanonicalPayload,
		extra: CanonicalPayload,
	) -> Self {
		let token = signer.sign(action, version, &signed);

		Self { action, version, signed, extra, token }
	}

	/// Full outgoing field set: signed ∪ extra ∪ `token`.
	pub fn wire_fields(&self) -> CanonicalPayload {
		self.signed
			.clone()
			.merged(&self.extra)
			.field("token", self.token.as_str())
	}

	/// Appends the wire fields to a URL, preserving existing query pairs.
	pub fn append_to(&self, url: &mut Url) {
		self.wire_fields().append_to(url);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn signer() -> TokenSigner {
		TokenSigner::new(SigningSecret::new("secret").expect("Secret should be valid."))
	}

	#[test]
	fn wire_fields_carry_the_token() {
		let signer = signer();
		let signed = CanonicalPayload::new().field("accessKeyId", "AK").field("ts", "t");
		let extra = CanonicalPayload::new().field("displayName", "Ada Lovelace");
		let envelope =
			SignedEnvelope::seal(&signer, Action::Auth, ProtocolVersion::V3, signed, extra);
		let fields = envelope.wire_fields();

		assert_eq!(fields.get("token"), Some(envelope.token.as_str()));
		assert_eq!(fields.get("displayName"), Some("Ada Lovelace"));
	}

	#[test]
	fn unsigned_extras_do_not_affect_the_digest() {
		let signer = signer();
		let signed = CanonicalPayload::new().field("accessKeyId", "AK");
		let a = SignedEnvelope::seal(
			&signer,
			Action::Auth,
			ProtocolVersion::V3,
			signed.clone(),
			CanonicalPayload::new().field("displayName", "Ada"),
		);
		let b = SignedEnvelope::seal(
			&signer,
			Action::Auth,
			ProtocolVersion::V3,
			signed,
			CanonicalPayload::new().field("displayName", "Grace"),
		);

		assert_eq!(a.token, b.token);
	}

	#[test]
	fn append_preserves_existing_query_pairs() {
		let signer = signer();
		let envelope = SignedEnvelope::seal(
			&signer,
			Action::Auth,
			ProtocolVersion::V3,
			CanonicalPayload::new().field("accessKeyId", "AK"),
			CanonicalPayload::new(),
		);
		let mut url = Url::parse("https://svc.example/cb?redirectTo=somewhere")
			.expect("Callback fixture should parse.");

		envelope.append_to(&mut url);

		let query = url.query().expect("Query should be present.");

		assert!(query.starts_with("redirectTo=somewhere&"));
		assert!(query.contains("token="));
	}
}
