//! Host lifecycle handlers the embedding system wires to its own events.
//!
//! Explicit methods instead of framework observers: the host calls these
//! when an activity is created or updated, or when a login completes.

// self
use crate::{
	_prelude::*,
	domain::{ActivityRecord, SessionKey, UserId, UserRecord},
	flows::{AuthOutcome, Bridge},
	http::ServiceHttpClient,
	service::CreatedEventLink,
};

impl<C> Bridge<C>
where
	C: ?Sized + ServiceHttpClient,
{
	/// Handles a freshly created activity.
	///
	/// Seeds the grade item, then asks the platform to create the linked
	/// event. If that call fails the local record is deleted again so no
	/// activity points at a non-existent event; the error still propagates.
	pub async fn on_activity_created(
		&self,
		activity: &ActivityRecord,
		author: &UserRecord,
		now: OffsetDateTime,
	) -> Result<CreatedEventLink> {
		self.grades.upsert_grade_item(activity).await?;

		match self.create_event(activity, author, now).await {
			Ok(link) => {
				self.directory
					.set_event_link(activity.id, &link.view_url, Some(&link.event_slug))
					.await?;

				Ok(link)
			},
			Err(error) => {
				self.directory.delete_activity(activity.id).await?;

				Err(error)
			},
		}
	}

	/// Handles an activity settings update by reshaping its grade item.
	pub async fn on_activity_updated(&self, activity: &ActivityRecord) -> Result<()> {
		self.grades.upsert_grade_item(activity).await?;

		Ok(())
	}

	/// Handles a completed host login.
	///
	/// Returns the next redirect when this session has a captured auth
	/// flow waiting; `None` lets the host's normal login flow play out.
	pub async fn on_user_logged_in(
		&self,
		session: &SessionKey,
		user: UserId,
		now: OffsetDateTime,
	) -> Result<Option<AuthOutcome>> {
		if self.sessions.pending(session).await?.is_none() {
			return Ok(None);
		}

		Ok(Some(self.resume_auth(session, user, now).await?))
	}

	/// Evaluates the activity's custom completion rule for a user.
	///
	/// Any participation row counts as completed. `None` means the activity
	/// has no custom rule and the host's default applies.
	pub async fn custom_completion_state(
		&self,
		activity: &ActivityRecord,
		user: UserId,
	) -> Result<Option<bool>> {
		if !activity.custom_completion {
			return Ok(None);
		}

		Ok(Some(self.completions.participated(activity.id, user).await?))
	}
}
