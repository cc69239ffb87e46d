//! Inbound activity rename pushed by the platform.

// self
use crate::{
	_prelude::*,
	domain::CmId,
	error::NotFoundError,
	flows::Bridge,
	http::ServiceHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	token::{Action, CanonicalPayload},
};

/// Wire fields of one `/rename` callback.
#[derive(Clone, Debug)]
pub struct RenameRequest {
	/// Course-module of the activity to rename.
	pub cm: CmId,
	/// New display name.
	pub name: String,
	/// Caller-supplied timestamp, covered by the token.
	pub ts: String,
	/// HMAC token over the signed field set.
	pub token: String,
}

impl<C> Bridge<C>
where
	C: ?Sized + ServiceHttpClient,
{
	/// Entry point for `/rename`: verifies the token and applies the new
	/// name to the activity and its grade item.
	pub async fn handle_rename(&self, request: RenameRequest) -> Result<()> {
		const KIND: FlowKind = FlowKind::Rename;

		let span = FlowSpan::new(KIND, "handle_rename");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				if request.name.trim().is_empty() {
					return Err(Error::MissingParameters { what: "rename" });
				}

				let signed = CanonicalPayload::new()
					.field("accessKeyId", self.config.access_key_id.as_ref())
					.field("cmid", request.cm.to_string())
					.field("name", &request.name)
					.field("ts", &request.ts);

				self.signer().verify(
					Action::RenameInbound,
					self.config.protocol,
					&signed,
					&request.token,
				)?;

				let activity = self
					.directory
					.activity_by_cm(request.cm)
					.await?
					.ok_or(NotFoundError::Activity { cm: request.cm })?;

				self.directory.rename_activity(request.cm, &request.name).await?;
				self.grades.rename_grade_item(activity.id, &request.name).await?;

				Ok(())
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
