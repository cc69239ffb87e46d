//! Bridge-level error types shared across flows, stores, and the remote client.

// self
use crate::_prelude::*;

/// Bridge-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical bridge error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure in a host collaborator.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Outbound remote call failure.
	#[error(transparent)]
	Remote(#[from] RemoteServiceError),
	/// Activity or user lookup missed.
	#[error(transparent)]
	NotFound(#[from] NotFoundError),

	/// Callback URL falls outside the trusted base.
	#[error("Callback URL `{url}` is outside the trusted platform base.")]
	InvalidCallback {
		/// The rejected callback.
		url: String,
	},
	/// Required session or query fields are absent.
	#[error("Required {what} parameters are missing.")]
	MissingParameters {
		/// Which parameter group was incomplete.
		what: &'static str,
	},
	/// Signature mismatch on an inbound call; treated as a forgery attempt.
	#[error("Token verification failed for `{action}`.")]
	InvalidToken {
		/// Wire action name the token was checked against.
		action: &'static str,
	},
	/// The caller used a retired protocol generation.
	#[error("`{action}` is no longer served under the legacy protocol.")]
	DeprecatedEndpoint {
		/// Wire action name of the retired operation.
		action: &'static str,
	},
}
impl Error {
	/// HTTP status the embedding host should answer with.
	pub fn http_status(&self) -> u16 {
		match self {
			Self::InvalidToken { .. } => 403,
			Self::InvalidCallback { .. }
			| Self::MissingParameters { .. }
			| Self::DeprecatedEndpoint { .. } => 400,
			Self::NotFound(_) => 404,
			Self::Remote(_) => 502,
			Self::Storage(_) | Self::Config(_) => 500,
		}
	}
}

/// Configuration and validation failures raised by the bridge.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// The access key identifier is unset or invalid.
	#[error("Access key identifier is missing or invalid.")]
	MissingAccessKeyId,
	/// The shared signing secret is unset or empty.
	#[error("Secret access key is missing or empty.")]
	MissingSecret,
	/// The remote platform base URL is unset.
	#[error("Platform base URL is missing.")]
	MissingBaseUrl,
	/// The host's own base URL is unset.
	#[error("Host base URL is missing.")]
	MissingHostUrl,
	/// A configured URL cannot be parsed or extended.
	#[error("Configured URL is invalid.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The plugin version string is unset.
	#[error("Plugin version is missing.")]
	MissingVersion,
}
impl From<url::ParseError> for ConfigError {
	fn from(source: url::ParseError) -> Self {
		Self::InvalidUrl { source }
	}
}

/// Lookup misses surfaced by host collaborators.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum NotFoundError {
	/// No activity is mounted under the course-module id.
	#[error("No activity is mounted under course-module {cm}.")]
	Activity {
		/// Course-module id that missed.
		cm: crate::domain::CmId,
	},
	/// No user matches the host user id.
	#[error("No user with id {id}.")]
	UserById {
		/// User id that missed.
		id: crate::domain::UserId,
	},
	/// No user matches the wire username.
	#[error("No user named `{username}`.")]
	UserByName {
		/// Username that missed.
		username: String,
	},
}

/// Outbound remote-call failures; every one fails closed.
#[derive(Debug, ThisError)]
pub enum RemoteServiceError {
	/// The platform answered with a non-200 status.
	#[error("`{endpoint}` returned status {status}.")]
	Status {
		/// Remote endpoint label.
		endpoint: &'static str,
		/// HTTP status received.
		status: u16,
	},
	/// The transport failed before a status was received.
	#[error("Transport failure while calling `{endpoint}`.")]
	Transport {
		/// Remote endpoint label.
		endpoint: &'static str,
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
	/// The platform answered 200 with a body that does not decode.
	#[error("`{endpoint}` returned a malformed response body.")]
	Decode {
		/// Remote endpoint label.
		endpoint: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl RemoteServiceError {
	/// Wraps a transport-specific failure for the given endpoint.
	pub fn transport(
		endpoint: &'static str,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Transport { endpoint, source: Box::new(src) }
	}
}
