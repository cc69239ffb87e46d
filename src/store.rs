//! Storage contracts the embedding host implements, plus in-memory
//! implementations for tests and demos.
//!
//! The bridge never talks to a database directly; sessions, activities,
//! users, participation rows, and the gradebook are all reached through
//! these seams.

pub mod memory;

pub use memory::{MemoryHost, MemorySessionStore};

// self
use crate::{
	_prelude::*,
	domain::{
		ActivityRecord, CmId, CompletionRecord, ConsentState, CourseId, PendingAuthRequest,
		SessionKey, UserId, UserRecord,
	},
};

/// Boxed future returned by every store operation.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Error type produced by store implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Server-side session state keyed by the visitor's browser correlation.
///
/// Pending auth requests live here between redirects; consent outlives the
/// pending request for the rest of the session.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Fetches the pending auth request for a session, if any.
	fn pending(&self, key: &SessionKey) -> StoreFuture<'_, Option<PendingAuthRequest>>;

	/// Persists (or replaces) the pending auth request for a session.
	fn set_pending(&self, key: &SessionKey, pending: PendingAuthRequest) -> StoreFuture<'_, ()>;

	/// Removes the pending auth request once it has been consumed.
	fn clear_pending(&self, key: &SessionKey) -> StoreFuture<'_, ()>;

	/// Returns the session-scoped consent decision.
	fn consent(&self, key: &SessionKey) -> StoreFuture<'_, ConsentState>;

	/// Records the session-scoped consent decision.
	fn set_consent(&self, key: &SessionKey, consent: ConsentState) -> StoreFuture<'_, ()>;
}

/// Host directory over activities, users, and course capabilities.
pub trait HostDirectory
where
	Self: Send + Sync,
{
	/// Resolves the activity mounted under a course-module id.
	fn activity_by_cm(&self, cm: CmId) -> StoreFuture<'_, Option<ActivityRecord>>;

	/// Resolves a user by host id.
	fn user_by_id(&self, id: UserId) -> StoreFuture<'_, Option<UserRecord>>;

	/// Resolves a user by wire username.
	fn user_by_username<'a>(&'a self, username: &'a str) -> StoreFuture<'a, Option<UserRecord>>;

	/// Whether the user holds the course-update capability (teacher role).
	fn can_update_course(&self, user: UserId, course: CourseId) -> StoreFuture<'_, bool>;

	/// Whether the activity is visible to the user.
	fn activity_visible(&self, cm: CmId, user: UserId) -> StoreFuture<'_, bool>;

	/// Renames an activity; last writer wins.
	fn rename_activity<'a>(&'a self, cm: CmId, name: &'a str) -> StoreFuture<'a, ()>;

	/// Records the remote event link once creation succeeded.
	fn set_event_link<'a>(
		&'a self,
		activity: crate::domain::ActivityId,
		edit_url: &'a Url,
		event_slug: Option<&'a str>,
	) -> StoreFuture<'a, ()>;

	/// Deletes an activity; the compensation path after a failed create.
	fn delete_activity(&self, activity: crate::domain::ActivityId) -> StoreFuture<'_, ()>;
}

/// Participation rows owned by the bridge, unique per (activity, user).
pub trait CompletionStore
where
	Self: Send + Sync,
{
	/// Inserts or overwrites the row for the record's natural key.
	fn upsert(&self, record: CompletionRecord) -> StoreFuture<'_, ()>;

	/// Fetches the row for a key, if present.
	fn fetch(
		&self,
		activity: crate::domain::ActivityId,
		user: UserId,
	) -> StoreFuture<'_, Option<CompletionRecord>>;

	/// Whether any participation exists; drives custom completion rules.
	fn participated(
		&self,
		activity: crate::domain::ActivityId,
		user: UserId,
	) -> StoreFuture<'_, bool>;
}

/// Host gradebook and completion tracker.
pub trait GradeStore
where
	Self: Send + Sync,
{
	/// Creates or reshapes the grade item from the activity's grade spec.
	fn upsert_grade_item<'a>(&'a self, activity: &'a ActivityRecord) -> StoreFuture<'a, ()>;

	/// Pushes a normalized raw grade for one user under the activity's item.
	fn push_grade<'a>(
		&'a self,
		activity: &'a ActivityRecord,
		user: UserId,
		raw_grade: f64,
	) -> StoreFuture<'a, ()>;

	/// Renames the grade item alongside an activity rename.
	fn rename_grade_item<'a>(
		&'a self,
		activity: crate::domain::ActivityId,
		name: &'a str,
	) -> StoreFuture<'a, ()>;

	/// Marks the activity completed for the user in the host tracker.
	fn mark_completed(&self, cm: CmId, user: UserId) -> StoreFuture<'_, ()>;

	/// Configured maximum of the activity's grade item, if one exists.
	fn grade_item_max(
		&self,
		activity: crate::domain::ActivityId,
	) -> StoreFuture<'_, Option<f64>>;

	/// Site-wide default grade maximum, if configured.
	fn site_default_max(&self) -> StoreFuture<'_, Option<f64>>;
}

/// Resolves the grade maximum used to denormalize 0–100 scores.
///
/// Fallback chain: grade item, then the site default, then a hardcoded 100.
/// A points grade spec seeds the grade item, so the first hop usually
/// answers.
pub async fn effective_max_grade(
	grades: &dyn GradeStore,
	activity: &ActivityRecord,
) -> Result<f64, StoreError> {
	if let Some(max) = grades.grade_item_max(activity.id).await? {
		return Ok(max);
	}
	if let Some(max) = grades.site_default_max().await? {
		return Ok(max);
	}

	Ok(100.0)
}
