//! Bridge configuration: provisioned credentials, URL derivation, and the
//! consent-screen toggle.
//!
//! Every signed operation needs the full credential set; the builder refuses
//! to produce a config with any of it missing so misconfiguration surfaces
//! once, at assembly time, instead of per request.

// self
use crate::{
	_prelude::*,
	domain::{AccessKeyId, CmId, CourseId},
	error::ConfigError,
	token::{ProtocolVersion, SigningSecret, TokenSigner},
};

/// Validated bridge configuration.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
	/// Provisioned access key identifier.
	pub access_key_id: AccessKeyId,
	/// Shared signing secret.
	pub secret: SigningSecret,
	/// Remote platform base URL; also the trusted callback prefix.
	pub platform_url: Url,
	/// Base URL of the embedding host.
	pub host_url: Url,
	/// Whether learners see the email-consent prompt.
	pub show_consent_screen: bool,
	/// Version string advertised in signed payloads and headers.
	pub version: String,
	/// Protocol generation spoken by default.
	pub protocol: ProtocolVersion,
}
impl BridgeConfig {
	/// Starts a builder with consent screen on and the V3 protocol.
	pub fn builder() -> BridgeConfigBuilder {
		BridgeConfigBuilder::default()
	}

	/// Builds a token signer over the configured secret.
	pub fn signer(&self) -> TokenSigner {
		TokenSigner::new(self.secret.clone())
	}

	/// Validates a callback against the trusted platform base.
	///
	/// Prefix comparison against the base URL (sans trailing slash) is the
	/// sole open-redirect guard; it must run before any redirect is built.
	pub fn trusted_callback(&self, callback: Url) -> Result<Url> {
		let base = self.platform_url.as_str().trim_end_matches('/');

		if callback.as_str().starts_with(base) {
			Ok(callback)
		} else {
			Err(Error::InvalidCallback { url: callback.into() })
		}
	}

	/// Remote endpoint for event creation.
	pub fn create_url(&self) -> Result<Url, ConfigError> {
		self.platform_endpoint(match self.protocol {
			ProtocolVersion::Legacy => "api/moodle/events",
			ProtocolVersion::V3 => "api/moodle/v3/events",
		})
	}

	/// Remote endpoint listing the user's existing events.
	pub fn events_list_url(&self) -> Result<Url, ConfigError> {
		self.platform_endpoint(match self.protocol {
			ProtocolVersion::Legacy => "api/moodle/events_list",
			ProtocolVersion::V3 => "api/moodle/v3/events_list",
		})
	}

	/// Remote credential health-check endpoint.
	pub fn ping_url(&self) -> Result<Url, ConfigError> {
		self.platform_endpoint(match self.protocol {
			ProtocolVersion::Legacy => "api/moodle/ping",
			ProtocolVersion::V3 => "api/moodle/v3/ping",
		})
	}

	/// Remote endpoint receiving rename propagation.
	pub fn rename_event_url(&self) -> Result<Url, ConfigError> {
		self.platform_endpoint("api/integration/moodle-plugin/rename-event")
	}

	/// Remote endpoint for step 1 of the id→username migration.
	pub fn upgrade_step_1_url(&self) -> Result<Url, ConfigError> {
		self.platform_endpoint("api/moodle/v3/upgrade-step-1")
	}

	/// Remote endpoint for step 2 of the id→username migration.
	pub fn upgrade_step_2_url(&self) -> Result<Url, ConfigError> {
		self.platform_endpoint("api/moodle/v3/upgrade-step-2")
	}

	/// Host login page anonymous visitors are sent to.
	pub fn login_url(&self) -> Result<Url, ConfigError> {
		self.host_endpoint("login")
	}

	/// Host consent prompt, optionally returning to `redirect_url` afterwards.
	pub fn consent_url(&self, redirect_url: Option<&Url>) -> Result<Url, ConfigError> {
		let mut url = self.host_endpoint("bridge/consent")?;

		if let Some(target) = redirect_url {
			url.query_pairs_mut().append_pair("redirectUrl", target.as_str());
		}

		Ok(url)
	}

	/// Host auth entry point advertised to the platform as `authUrl`.
	pub fn auth_url(&self, course: CourseId, cm: CmId) -> Result<Url, ConfigError> {
		let mut url = self.host_endpoint("bridge/auth")?;

		url.query_pairs_mut()
			.append_pair("course", &course.to_string())
			.append_pair("cm", &cm.to_string());

		Ok(url)
	}

	/// Host report callback advertised to the platform as `reportUrl`.
	pub fn report_url(&self, cm: CmId) -> Result<Url, ConfigError> {
		let mut url = self.host_endpoint("bridge/report")?;

		url.query_pairs_mut().append_pair("cm", &cm.to_string());

		Ok(url)
	}

	/// Host course page advertised to the platform as `courseUrl`.
	pub fn course_url(&self, course: CourseId) -> Result<Url, ConfigError> {
		let mut url = self.host_endpoint("course/view")?;

		url.query_pairs_mut().append_pair("id", &course.to_string());

		Ok(url)
	}

	fn platform_endpoint(&self, rel: &str) -> Result<Url, ConfigError> {
		Self::join(&self.platform_url, rel)
	}

	fn host_endpoint(&self, rel: &str) -> Result<Url, ConfigError> {
		Self::join(&self.host_url, rel)
	}

	// `Url::join` would replace a non-slash-terminated last segment, so the
	// base is normalized to exactly one trailing slash first.
	fn join(base: &Url, rel: &str) -> Result<Url, ConfigError> {
		let mut base = base.as_str().trim_end_matches('/').to_owned();

		base.push('/');

		Ok(Url::parse(&base)?.join(rel)?)
	}
}

/// Builder assembling a [`BridgeConfig`], validating on [`build`](Self::build).
#[derive(Clone, Debug)]
pub struct BridgeConfigBuilder {
	access_key_id: Option<String>,
	secret: Option<String>,
	platform_url: Option<Url>,
	host_url: Option<Url>,
	show_consent_screen: bool,
	version: String,
	protocol: ProtocolVersion,
}
impl BridgeConfigBuilder {
	/// Sets the provisioned access key identifier.
	pub fn access_key_id(mut self, value: impl Into<String>) -> Self {
		self.access_key_id = Some(value.into());

		self
	}

	/// Sets the shared signing secret.
	pub fn secret_access_key(mut self, value: impl Into<String>) -> Self {
		self.secret = Some(value.into());

		self
	}

	/// Sets the remote platform base URL.
	pub fn platform_url(mut self, value: Url) -> Self {
		self.platform_url = Some(value);

		self
	}

	/// Sets the embedding host's base URL.
	pub fn host_url(mut self, value: Url) -> Self {
		self.host_url = Some(value);

		self
	}

	/// Toggles the learner consent prompt.
	pub fn show_consent_screen(mut self, value: bool) -> Self {
		self.show_consent_screen = value;

		self
	}

	/// Overrides the advertised version string.
	pub fn version(mut self, value: impl Into<String>) -> Self {
		self.version = value.into();

		self
	}

	/// Selects the protocol generation.
	pub fn protocol(mut self, value: ProtocolVersion) -> Self {
		self.protocol = value;

		self
	}

	/// Validates and assembles the configuration.
	pub fn build(self) -> Result<BridgeConfig, ConfigError> {
		let access_key_id = AccessKeyId::new(
			self.access_key_id.as_deref().unwrap_or_default(),
		)
		.map_err(|_| ConfigError::MissingAccessKeyId)?;
		let secret = SigningSecret::new(self.secret.unwrap_or_default())?;
		let platform_url = self.platform_url.ok_or(ConfigError::MissingBaseUrl)?;
		let host_url = self.host_url.ok_or(ConfigError::MissingHostUrl)?;

		if self.version.trim().is_empty() {
			return Err(ConfigError::MissingVersion);
		}

		Ok(BridgeConfig {
			access_key_id,
			secret,
			platform_url,
			host_url,
			show_consent_screen: self.show_consent_screen,
			version: self.version,
			protocol: self.protocol,
		})
	}
}
impl Default for BridgeConfigBuilder {
	fn default() -> Self {
		Self {
			access_key_id: None,
			secret: None,
			platform_url: None,
			host_url: None,
			show_consent_screen: true,
			version: env!("CARGO_PKG_VERSION").into(),
			protocol: ProtocolVersion::default(),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config() -> BridgeConfig {
		BridgeConfig::builder()
			.access_key_id("AKID")
			.secret_access_key("secret")
			.platform_url(Url::parse("https://svc.example").expect("Base fixture should parse."))
			.host_url(Url::parse("https://campus.example").expect("Host fixture should parse."))
			.build()
			.expect("Config fixture should build.")
	}

	#[test]
	fn build_requires_the_full_credential_set() {
		let missing_secret = BridgeConfig::builder()
			.access_key_id("AKID")
			.platform_url(Url::parse("https://svc.example").expect("Base fixture should parse."))
			.host_url(Url::parse("https://campus.example").expect("Host fixture should parse."))
			.build();

		assert!(matches!(missing_secret, Err(ConfigError::MissingSecret)));

		let missing_key = BridgeConfig::builder()
			.secret_access_key("secret")
			.platform_url(Url::parse("https://svc.example").expect("Base fixture should parse."))
			.host_url(Url::parse("https://campus.example").expect("Host fixture should parse."))
			.build();

		assert!(matches!(missing_key, Err(ConfigError::MissingAccessKeyId)));
	}

	#[test]
	fn endpoints_normalize_trailing_slashes() {
		let plain = config();
		let slashed = BridgeConfig::builder()
			.access_key_id("AKID")
			.secret_access_key("secret")
			.platform_url(Url::parse("https://svc.example/").expect("Base fixture should parse."))
			.host_url(Url::parse("https://campus.example").expect("Host fixture should parse."))
			.build()
			.expect("Config fixture should build.");

		for cfg in [plain, slashed] {
			assert_eq!(
				cfg.ping_url().expect("Ping URL should derive.").as_str(),
				"https://svc.example/api/moodle/v3/ping",
			);
		}
	}

	#[test]
	fn legacy_protocol_selects_unversioned_paths() {
		let cfg = BridgeConfig::builder()
			.access_key_id("AKID")
			.secret_access_key("secret")
			.platform_url(Url::parse("https://svc.example").expect("Base fixture should parse."))
			.host_url(Url::parse("https://campus.example").expect("Host fixture should parse."))
			.protocol(ProtocolVersion::Legacy)
			.build()
			.expect("Config fixture should build.");

		assert_eq!(
			cfg.events_list_url().expect("Events URL should derive.").as_str(),
			"https://svc.example/api/moodle/events_list",
		);
	}

	#[test]
	fn callbacks_must_share_the_platform_prefix() {
		let cfg = config();
		let good = Url::parse("https://svc.example/cb").expect("Callback fixture should parse.");
		let evil = Url::parse("https://evil.example/cb").expect("Callback fixture should parse.");

		assert!(cfg.trusted_callback(good).is_ok());
		assert!(matches!(cfg.trusted_callback(evil), Err(Error::InvalidCallback { .. })));
	}

	#[test]
	fn host_urls_carry_their_identifiers() {
		let cfg = config();

		assert_eq!(
			cfg.auth_url(CourseId::from(5), CmId::from(9))
				.expect("Auth URL should derive.")
				.as_str(),
			"https://campus.example/bridge/auth?course=5&cm=9",
		);
		assert_eq!(
			cfg.report_url(CmId::from(9)).expect("Report URL should derive.").as_str(),
			"https://campus.example/bridge/report?cm=9",
		);
		assert_eq!(
			cfg.course_url(CourseId::from(5)).expect("Course URL should derive.").as_str(),
			"https://campus.example/course/view?id=5",
		);
	}
}
