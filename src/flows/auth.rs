//! Visitor authentication hand-off to the remote platform.
//!
//! The flow spans several independent HTTP round-trips: capture the
//! visitor's intent, wait for host login, wait for consent, then issue the
//! signed redirect. State survives between steps as a
//! [`PendingAuthRequest`] in the session store; the signed redirect
//! consumes it.

// self
use crate::{
	_prelude::*,
	domain::{CmId, CourseId, PendingAuthRequest, Role, UserId},
	error::NotFoundError,
	flows::{Bridge, common::wire_timestamp, consent::ConsentGate},
	http::ServiceHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	token::{Action, CanonicalPayload, SignedEnvelope},
};

/// Query parameters accepted at the auth entry point.
#[derive(Clone, Debug)]
pub struct AuthEntry {
	/// Course the visitor is entering from.
	pub course: CourseId,
	/// Course-module of the target activity.
	pub cm: CmId,
	/// Platform callback the signed payload will be appended to.
	pub callback: Url,
	/// Optional deep-link the platform should continue to afterwards.
	pub redirect_to: Option<Url>,
}

/// Terminal redirect decision of one auth step; the host answers 302.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
	/// Anonymous visitor: send to the host login page first.
	LoginRedirect(Url),
	/// Consent still unresolved: send to the consent prompt.
	ConsentRedirect(Url),
	/// Signed hand-off to the validated platform callback.
	CallbackRedirect(Url),
}
impl AuthOutcome {
	/// Redirect target regardless of which step produced it.
	pub fn target(&self) -> &Url {
		match self {
			Self::LoginRedirect(url) | Self::ConsentRedirect(url) | Self::CallbackRedirect(url) =>
				url,
		}
	}
}

impl<C> Bridge<C>
where
	C: ?Sized + ServiceHttpClient,
{
	/// Entry point for `/auth`: captures intent and routes the visitor.
	///
	/// The callback is validated against the trusted platform base before
	/// anything else happens; an untrusted callback aborts with no redirect
	/// and no session mutation.
	pub async fn begin_auth(
		&self,
		session: &crate::domain::SessionKey,
		entry: AuthEntry,
		visitor: Option<UserId>,
		now: OffsetDateTime,
	) -> Result<AuthOutcome> {
		const KIND: FlowKind = FlowKind::Auth;

		let span = FlowSpan::new(KIND, "begin_auth");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut callback = self.config.trusted_callback(entry.callback)?;

				if let Some(target) = entry.redirect_to {
					callback.query_pairs_mut().append_pair("redirectTo", target.as_str());
				}

				self.sessions
					.set_pending(session, PendingAuthRequest::new(entry.course, entry.cm, callback))
					.await?;

				match visitor {
					None => Ok(AuthOutcome::LoginRedirect(self.config.login_url()?)),
					Some(user) => self.resume_auth(session, user, now).await,
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Continues a captured auth flow for a now-authenticated user.
	///
	/// Invoked directly when the visitor was already logged in, and from the
	/// login-completed signal otherwise. Consumes the pending request when
	/// the signed redirect is issued.
	pub async fn resume_auth(
		&self,
		session: &crate::domain::SessionKey,
		user: UserId,
		now: OffsetDateTime,
	) -> Result<AuthOutcome> {
		let pending = self
			.sessions
			.pending(session)
			.await?
			.ok_or(Error::MissingParameters { what: "session auth" })?;
		// The session may predate a config change, so the stored callback is
		// checked again before the redirect is assembled.
		let mut callback = self.config.trusted_callback(pending.callback.clone())?;
		let activity = self
			.directory
			.activity_by_cm(pending.cm)
			.await?
			.ok_or(NotFoundError::Activity { cm: pending.cm })?;
		let user_record =
			self.directory.user_by_id(user).await?.ok_or(NotFoundError::UserById { id: user })?;
		let role =
			Role::from_capability(self.directory.can_update_course(user, pending.course).await?);
		let consent = match self.consent_gate(session, role, None).await? {
			ConsentGate::Resolved(consent) => consent,
			ConsentGate::Prompt(url) => return Ok(AuthOutcome::ConsentRedirect(url)),
		};
		let has_access = self.directory.activity_visible(pending.cm, user).await?;
		let ts = wire_timestamp(now);
		let signed = CanonicalPayload::new()
			.field("accessKeyId", self.config.access_key_id.as_ref())
			.field("eventSlug", activity.event_slug_value())
			.flag("hasAccess", has_access)
			.field("moodleUsername", user_record.username.as_ref())
			.field("role", role.as_str())
			.field("ts", ts)
			.field("version", &self.config.version);
		let extra = CanonicalPayload::new()
			.field("displayName", user_record.display_name())
			.field("email", user_record.consented_email(consent))
			.field("firstName", &user_record.first_name)
			.field("lastName", &user_record.last_name);
		let envelope = SignedEnvelope::seal(
			self.signer(),
			Action::Auth,
			self.config.protocol,
			signed,
			extra,
		);

		envelope.append_to(&mut callback);
		self.sessions.clear_pending(session).await?;

		Ok(AuthOutcome::CallbackRedirect(callback))
	}
}
