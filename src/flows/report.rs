//! Inbound participation reports: verify, normalize, persist.
//!
//! The platform calls back out-of-band with a completion tag and a 0–100
//! score. The token is checked before anything is looked up; lookups are
//! all-or-nothing; the upsert is serialized per (activity, user) so a
//! replayed report converges on one row.

// self
use crate::{
	_prelude::*,
	domain::{CmId, CompletionRecord, CompletionStatus},
	error::NotFoundError,
	flows::{Bridge, common},
	http::ServiceHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::effective_max_grade,
	token::{Action, CanonicalPayload, ProtocolVersion},
};

/// Wire fields of one `/report` callback.
#[derive(Clone, Debug)]
pub struct ReportRequest {
	/// Course-module of the reported activity.
	pub cm: CmId,
	/// Wire username of the participant.
	pub username: String,
	/// Completion tag (`passed`, `incomplete`, anything else fails).
	pub completion: String,
	/// Score normalized to 0–100 by the platform.
	pub score: f64,
	/// Access key the caller claims; informational, never trusted.
	pub access_key_id: String,
	/// Caller-supplied timestamp, covered by the token.
	pub ts: String,
	/// HMAC token over the signed field set.
	pub token: String,
}

/// What a verified, persisted report amounted to.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportReceipt {
	/// Activity the report landed on.
	pub activity: crate::domain::ActivityId,
	/// Participant the report was about.
	pub user: crate::domain::UserId,
	/// Outcome stored on the participation row.
	pub status: CompletionStatus,
	/// Raw grade pushed to the gradebook (score × max ÷ 100).
	pub raw_grade: f64,
}

impl<C> Bridge<C>
where
	C: ?Sized + ServiceHttpClient,
{
	/// Entry point for `/report`: verifies and persists one callback.
	///
	/// `version` is the protocol generation of the route that received the
	/// call; the legacy report endpoint is retired and refused outright.
	pub async fn handle_report(
		&self,
		version: ProtocolVersion,
		request: ReportRequest,
		now: OffsetDateTime,
	) -> Result<ReportReceipt> {
		const KIND: FlowKind = FlowKind::Report;

		let span = FlowSpan::new(KIND, "handle_report");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.process_report(version, request, now)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn process_report(
		&self,
		version: ProtocolVersion,
		request: ReportRequest,
		now: OffsetDateTime,
	) -> Result<ReportReceipt> {
		if version == ProtocolVersion::Legacy {
			return Err(Error::DeprecatedEndpoint {
				action: Action::Report.wire_name(ProtocolVersion::Legacy),
			});
		}

		// The signed basis uses the *configured* access key; a caller
		// cannot substitute their own and have the digest come out right.
		let signed = CanonicalPayload::new()
			.field("accessKeyId", self.config.access_key_id.as_ref())
			.field("completion", &request.completion)
			.field("moodleUsername", &request.username)
			.number("score", request.score)
			.field("ts", &request.ts);

		self.signer().verify(Action::Report, version, &signed, &request.token)?;

		let activity = self
			.directory
			.activity_by_cm(request.cm)
			.await?
			.ok_or(NotFoundError::Activity { cm: request.cm })?;
		let user = self
			.directory
			.user_by_username(&request.username)
			.await?
			.ok_or_else(|| NotFoundError::UserByName { username: request.username.clone() })?;
		let status = CompletionStatus::from_report_tag(&request.completion);
		let max_grade = effective_max_grade(self.grades.as_ref(), &activity).await?;
		let raw_grade = common::normalized_raw_grade(request.score, max_grade);
		let guard = self.report_guard((activity.id, user.id));
		let _serialized = guard.lock().await;
		let record = match self.completions.fetch(activity.id, user.id).await? {
			Some(mut existing) => {
				existing.apply(status, request.score, now);

				existing
			},
			None => CompletionRecord::new(activity.id, user.id, status, request.score, now),
		};

		self.completions.upsert(record).await?;
		self.grades.push_grade(&activity, user.id, raw_grade).await?;
		self.grades.mark_completed(request.cm, user.id).await?;

		Ok(ReportReceipt { activity: activity.id, user: user.id, status, raw_grade })
	}
}
