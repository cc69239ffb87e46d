//! Embedded event view for an already-authenticated user.
//!
//! Builds the signed iframe URL the host renders when a user opens an
//! activity whose remote event link is in place.

// self
use crate::{
	_prelude::*,
	domain::{CmId, Role, SessionKey, UserId},
	error::NotFoundError,
	flows::{Bridge, common::wire_timestamp, consent::ConsentGate},
	http::ServiceHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	token::{Action, CanonicalPayload, SignedEnvelope},
};

/// Result of preparing an activity view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewOutcome {
	/// Consent still unresolved: send to the prompt, then back to `page_url`.
	ConsentRedirect(Url),
	/// Signed embed URL ready for the iframe.
	Embed(Url),
}

impl<C> Bridge<C>
where
	C: ?Sized + ServiceHttpClient,
{
	/// Prepares the signed embed URL for an activity view.
	///
	/// `page_url` is the host page rendering the view; the consent prompt
	/// returns there after the learner decides.
	pub async fn event_view(
		&self,
		session: &SessionKey,
		cm: CmId,
		user: UserId,
		page_url: &Url,
		now: OffsetDateTime,
	) -> Result<ViewOutcome> {
		const KIND: FlowKind = FlowKind::Join;

		let span = FlowSpan::new(KIND, "event_view");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let activity = self
					.directory
					.activity_by_cm(cm)
					.await?
					.ok_or(NotFoundError::Activity { cm })?;
				let mut embed_url = activity
					.edit_url
					.clone()
					.ok_or(Error::MissingParameters { what: "event link" })?;
				let user_record = self
					.directory
					.user_by_id(user)
					.await?
					.ok_or(NotFoundError::UserById { id: user })?;
				let role = Role::from_capability(
					self.directory.can_update_course(user, activity.course).await?,
				);
				let consent = match self.consent_gate(session, role, Some(page_url)).await? {
					ConsentGate::Resolved(consent) => consent,
					ConsentGate::Prompt(url) => return Ok(ViewOutcome::ConsentRedirect(url)),
				};
				let has_access = self.directory.activity_visible(cm, user).await?;
				let ts = wire_timestamp(now);
				let signed = CanonicalPayload::new()
					.field("accessKeyId", self.config.access_key_id.as_ref())
					.field("authUrl", self.config.auth_url(activity.course, cm)?)
					.flag("canEdit", role == Role::Teacher)
					.field("courseUrl", self.config.course_url(activity.course)?)
					.field("eventSlug", activity.event_slug_value())
					.field("moodleUsername", user_record.username.as_ref())
					.field("reportUrl", self.config.report_url(cm)?)
					.field("ts", ts)
					.field("version", &self.config.version);
				let extra = CanonicalPayload::new()
					.field("displayName", user_record.display_name())
					.field("email", user_record.consented_email(consent))
					.field("firstName", &user_record.first_name)
					.flag("hasAccess", has_access)
					.field("lastName", &user_record.last_name)
					.field("role", role.as_str());
				let envelope = SignedEnvelope::seal(
					self.signer(),
					Action::Join,
					self.config.protocol,
					signed,
					extra,
				);

				envelope.append_to(&mut embed_url);

				Ok(ViewOutcome::Embed(embed_url))
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
