//! HMAC-SHA256 token construction and constant-time verification.

// crates.io
use hmac::{Hmac, Mac};
use sha2::Sha256;
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	token::{Action, CanonicalPayload, ProtocolVersion},
};

type HmacSha256 = Hmac<Sha256>;

/// Shared signing secret provisioned alongside the access key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningSecret(String);
impl SigningSecret {
	/// Wraps a secret, rejecting empty or whitespace-only material.
	pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
		let value = value.into();

		if value.trim().is_empty() {
			return Err(ConfigError::MissingSecret);
		}

		Ok(Self(value))
	}

	/// Returns the inner secret. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for SigningSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SigningSecret").field(&"<redacted>").finish()
	}
}
impl Display for SigningSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Lowercase-hex HMAC digest attached to every signed exchange.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token(String);
impl Token {
	/// Returns the hex digest.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for Token {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<Token> for String {
	fn from(token: Token) -> Self {
		token.0
	}
}
impl Display for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Deterministic token signer keyed by the provisioning-time secret.
///
/// The HMAC message is `action_name + "?" + canonical_query(payload)`; the
/// action-name prefix keeps a token minted for one operation from
/// authorizing another.
#[derive(Clone, Debug)]
pub struct TokenSigner {
	secret: SigningSecret,
}
impl TokenSigner {
	/// Creates a signer over the shared secret.
	pub fn new(secret: SigningSecret) -> Self {
		Self { secret }
	}

	/// Signs an action/payload pair, returning the lowercase hex digest.
	pub fn sign(&self, action: Action, version: ProtocolVersion, payload: &CanonicalPayload) -> Token {
		self.sign_message(action.wire_name(version), payload)
	}

	/// Signs an arbitrary action name; exposed for protocol extensions.
	pub fn sign_message(&self, action_name: &str, payload: &CanonicalPayload) -> Token {
		let mut mac = self.mac();

		mac.update(action_name.as_bytes());
		mac.update(b"?");
		mac.update(payload.canonical_query().as_bytes());

		Token(hex::encode(mac.finalize().into_bytes()))
	}

	/// Verifies a candidate token in constant time.
	pub fn verify(
		&self,
		action: Action,
		version: ProtocolVersion,
		payload: &CanonicalPayload,
		candidate: &str,
	) -> Result<()> {
		let rejection = || Error::InvalidToken { action: action.wire_name(version) };
		// Any hex that cannot decode to a 32-byte digest is forged or
		// truncated; rejecting it early does not leak timing about the key.
		let digest = hex::decode(candidate).map_err(|_| rejection())?;
		let mut mac = self.mac();

		mac.update(action.wire_name(version).as_bytes());
		mac.update(b"?");
		mac.update(payload.canonical_query().as_bytes());

		mac.verify_slice(&digest).map_err(|_| rejection())
	}

	fn mac(&self) -> HmacSha256 {
		HmacSha256::new_from_slice(self.secret.expose().as_bytes())
			.expect("HMAC accepts any key length")
	}
}
