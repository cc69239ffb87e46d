//! Learner consent capture and gating.
//!
//! Consent controls exactly one thing: whether the visitor's email rides
//! along in signed payloads. The decision is durable for the session.
//! Teachers never see the prompt, and deployments can switch it off
//! entirely, both resolving to an implicit agreement.

// self
use crate::{
	_prelude::*,
	domain::{ConsentState, Role, SessionKey, UserId},
	flows::Bridge,
	http::ServiceHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Prompt URLs the host renders as the accept/decline buttons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsentPrompt {
	/// Button target recording an agreement.
	pub accept_url: Url,
	/// Button target recording a refusal.
	pub decline_url: Url,
}

/// Result of one `/consent` round-trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsentOutcome {
	/// Decision is on file: continue to the given target.
	Redirect(Url),
	/// No decision yet: render the prompt.
	Prompt(ConsentPrompt),
}

/// Internal gate result consulted by flows that require resolved consent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ConsentGate {
	/// Consent resolved (possibly implicitly); proceed with this state.
	Resolved(ConsentState),
	/// Visitor must pass the consent prompt first.
	Prompt(Url),
}

impl<C> Bridge<C>
where
	C: ?Sized + ServiceHttpClient,
{
	/// Resolves the consent requirement for a flow step.
	///
	/// Teachers and consent-screen-off deployments resolve to an implicit
	/// agreement which is written back to the session so later steps and
	/// the prompt skip uniformly.
	pub(crate) async fn consent_gate(
		&self,
		session: &SessionKey,
		role: Role,
		return_to: Option<&Url>,
	) -> Result<ConsentGate> {
		if !self.config.show_consent_screen || role == Role::Teacher {
			self.sessions.set_consent(session, ConsentState::Agreed).await?;

			return Ok(ConsentGate::Resolved(ConsentState::Agreed));
		}

		let consent = self.sessions.consent(session).await?;

		if consent.is_resolved() {
			return Ok(ConsentGate::Resolved(consent));
		}

		Ok(ConsentGate::Prompt(self.config.consent_url(return_to)?))
	}

	/// Entry point for `/consent`: records a decision and routes onward.
	///
	/// With a decision on file the visitor continues to `redirect_url` when
	/// one was supplied, otherwise the captured auth flow resumes. Without
	/// one, the host renders the returned prompt.
	pub async fn handle_consent(
		&self,
		session: &SessionKey,
		decision: Option<bool>,
		redirect_url: Option<Url>,
		user: UserId,
		now: OffsetDateTime,
	) -> Result<ConsentOutcome> {
		const KIND: FlowKind = FlowKind::Consent;

		let span = FlowSpan::new(KIND, "handle_consent");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				if let Some(agreed) = decision {
					self.sessions.set_consent(session, agreed.into()).await?;
				}

				let consent = self.sessions.consent(session).await?;

				if !consent.is_resolved() {
					return Ok(ConsentOutcome::Prompt(
						self.consent_prompt(redirect_url.as_ref())?,
					));
				}
				if let Some(target) = redirect_url {
					return Ok(ConsentOutcome::Redirect(target));
				}

				let outcome = self.resume_auth(session, user, now).await?;

				Ok(ConsentOutcome::Redirect(outcome.target().clone()))
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	fn consent_prompt(&self, redirect_url: Option<&Url>) -> Result<ConsentPrompt> {
		let base = self.config.consent_url(redirect_url)?;
		let with_decision = |agreed: bool| {
			let mut url = base.clone();

			url.query_pairs_mut().append_pair("hasConsented", if agreed { "1" } else { "0" });

			url
		};

		Ok(ConsentPrompt { accept_url: with_decision(true), decline_url: with_decision(false) })
	}
}
