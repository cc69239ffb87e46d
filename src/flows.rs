//! Flow orchestrators powered by the bridge facade.

pub mod auth;
pub mod common;
pub mod consent;
pub mod join;
pub mod lifecycle;
pub mod rename;
pub mod report;

pub use auth::*;
pub use common::*;
pub use consent::*;
pub use join::*;
pub use lifecycle::*;
pub use rename::*;
pub use report::*;

// self
use crate::{
	_prelude::*,
	config::BridgeConfig,
	domain::{ActivityId, UserId},
	http::ServiceHttpClient,
	store::{CompletionStore, GradeStore, HostDirectory, SessionStore},
	token::TokenSigner,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Bridge specialized for the crate's default reqwest transport.
pub type ReqwestBridge = Bridge<ReqwestHttpClient>;

/// Coordinates every bridge flow against one provisioned platform account.
///
/// The bridge owns the HTTP client, the signer, and the four host seams so
/// individual flows can focus on their own semantics (callback validation,
/// consent gating, report verification, grade normalization). Signed
/// payloads always draw their credentials from the validated config.
#[derive(Clone)]
pub struct Bridge<C>
where
	C: ?Sized + ServiceHttpClient,
{
	/// HTTP client used for every outbound platform request.
	pub http_client: Arc<C>,
	/// Validated configuration (credentials, URLs, consent toggle).
	pub config: BridgeConfig,
	/// Session store threading auth state across redirects.
	pub sessions: Arc<dyn SessionStore>,
	/// Host directory for activity/user/capability lookups.
	pub directory: Arc<dyn HostDirectory>,
	/// Participation rows owned by the bridge.
	pub completions: Arc<dyn CompletionStore>,
	/// Host gradebook and completion tracker.
	pub grades: Arc<dyn GradeStore>,
	signer: TokenSigner,
	report_guards: Arc<Mutex<HashMap<(ActivityId, UserId), Arc<AsyncMutex<()>>>>>,
}
impl<C> Bridge<C>
where
	C: ?Sized + ServiceHttpClient,
{
	/// Creates a bridge that reuses the caller-provided transport.
	pub fn with_http_client(
		config: BridgeConfig,
		sessions: Arc<dyn SessionStore>,
		directory: Arc<dyn HostDirectory>,
		completions: Arc<dyn CompletionStore>,
		grades: Arc<dyn GradeStore>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		let signer = config.signer();

		Self {
			http_client: http_client.into(),
			config,
			sessions,
			directory,
			completions,
			grades,
			signer,
			report_guards: Default::default(),
		}
	}

	/// Token signer keyed by the configured secret.
	pub fn signer(&self) -> &TokenSigner {
		&self.signer
	}

	pub(crate) fn report_guard(&self, key: (ActivityId, UserId)) -> Arc<AsyncMutex<()>> {
		let mut guards = self.report_guards.lock();

		guards.entry(key).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}
#[cfg(feature = "reqwest")]
impl Bridge<ReqwestHttpClient> {
	/// Creates a bridge over the default reqwest transport.
	pub fn new(
		config: BridgeConfig,
		sessions: Arc<dyn SessionStore>,
		directory: Arc<dyn HostDirectory>,
		completions: Arc<dyn CompletionStore>,
		grades: Arc<dyn GradeStore>,
	) -> Self {
		Self::with_http_client(
			config,
			sessions,
			directory,
			completions,
			grades,
			ReqwestHttpClient::default(),
		)
	}
}
impl<C> Debug for Bridge<C>
where
	C: ?Sized + ServiceHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Bridge")
			.field("access_key_id", &self.config.access_key_id)
			.field("platform_url", &self.config.platform_url.as_str())
			.field("protocol", &self.config.protocol)
			.finish()
	}
}
