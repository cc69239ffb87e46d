//! Thread-safe in-memory store implementations for local development and tests.

// self
use crate::{
	_prelude::*,
	domain::{
		ActivityId, ActivityRecord, CmId, CompletionRecord, ConsentState, CourseId,
		PendingAuthRequest, SessionKey, UserId, UserRecord,
	},
	store::{CompletionStore, GradeStore, HostDirectory, SessionStore, StoreFuture},
};

#[derive(Clone, Debug, Default)]
struct SessionSlot {
	pending: Option<PendingAuthRequest>,
	consent: ConsentState,
}

type SessionMap = Arc<RwLock<HashMap<SessionKey, SessionSlot>>>;

/// In-process session store keyed by the visitor's session key.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore(SessionMap);
impl SessionStore for MemorySessionStore {
	fn pending(&self, key: &SessionKey) -> StoreFuture<'_, Option<PendingAuthRequest>> {
		let map = self.0.clone();
		let key = key.clone();

		Box::pin(async move { Ok(map.read().get(&key).and_then(|slot| slot.pending.clone())) })
	}

	fn set_pending(&self, key: &SessionKey, pending: PendingAuthRequest) -> StoreFuture<'_, ()> {
		let map = self.0.clone();
		let key = key.clone();

		Box::pin(async move {
			map.write().entry(key).or_default().pending = Some(pending);

			Ok(())
		})
	}

	fn clear_pending(&self, key: &SessionKey) -> StoreFuture<'_, ()> {
		let map = self.0.clone();
		let key = key.clone();

		Box::pin(async move {
			if let Some(slot) = map.write().get_mut(&key) {
				slot.pending = None;
			}

			Ok(())
		})
	}

	fn consent(&self, key: &SessionKey) -> StoreFuture<'_, ConsentState> {
		let map = self.0.clone();
		let key = key.clone();

		Box::pin(async move {
			Ok(map.read().get(&key).map(|slot| slot.consent).unwrap_or_default())
		})
	}

	fn set_consent(&self, key: &SessionKey, consent: ConsentState) -> StoreFuture<'_, ()> {
		let map = self.0.clone();
		let key = key.clone();

		Box::pin(async move {
			map.write().entry(key).or_default().consent = consent;

			Ok(())
		})
	}
}

#[derive(Clone, Debug)]
struct GradeItem {
	name: String,
	max: Option<f64>,
}

#[derive(Debug, Default)]
struct HostState {
	activities: HashMap<ActivityId, ActivityRecord>,
	users: HashMap<UserId, UserRecord>,
	course_editors: HashMap<CourseId, Vec<UserId>>,
	hidden: Vec<(CmId, UserId)>,
	completions: HashMap<(ActivityId, UserId), CompletionRecord>,
	grade_items: HashMap<ActivityId, GradeItem>,
	pushed_grades: HashMap<(ActivityId, UserId), f64>,
	completed: Vec<(CmId, UserId)>,
	site_default_max: Option<f64>,
}

/// In-process host standing in for the LMS directory, participation table,
/// and gradebook at once.
#[derive(Clone, Debug, Default)]
pub struct MemoryHost(Arc<RwLock<HostState>>);
impl MemoryHost {
	/// Registers an activity.
	pub fn seed_activity(&self, activity: ActivityRecord) {
		self.0.write().activities.insert(activity.id, activity);
	}

	/// Registers a user.
	pub fn seed_user(&self, user: UserRecord) {
		self.0.write().users.insert(user.id, user);
	}

	/// Grants the course-update capability (teacher role) to a user.
	pub fn grant_course_update(&self, user: UserId, course: CourseId) {
		self.0.write().course_editors.entry(course).or_default().push(user);
	}

	/// Hides an activity from a user.
	pub fn hide_activity(&self, cm: CmId, user: UserId) {
		self.0.write().hidden.push((cm, user));
	}

	/// Sets the site-wide default grade maximum.
	pub fn set_site_default_max(&self, max: Option<f64>) {
		self.0.write().site_default_max = max;
	}

	/// Returns the stored activity, if present.
	pub fn activity(&self, id: ActivityId) -> Option<ActivityRecord> {
		self.0.read().activities.get(&id).cloned()
	}

	/// Returns the raw grade last pushed for the key, if any.
	pub fn pushed_grade(&self, activity: ActivityId, user: UserId) -> Option<f64> {
		self.0.read().pushed_grades.get(&(activity, user)).copied()
	}

	/// Whether the host completion tracker was poked for the key.
	pub fn completion_marked(&self, cm: CmId, user: UserId) -> bool {
		self.0.read().completed.contains(&(cm, user))
	}

	/// Returns the grade item name, if one was upserted.
	pub fn grade_item_name(&self, activity: ActivityId) -> Option<String> {
		self.0.read().grade_items.get(&activity).map(|item| item.name.clone())
	}
}
impl HostDirectory for MemoryHost {
	fn activity_by_cm(&self, cm: CmId) -> StoreFuture<'_, Option<ActivityRecord>> {
		let state = self.0.clone();

		Box::pin(async move {
			Ok(state.read().activities.values().find(|a| a.cm == cm).cloned())
		})
	}

	fn user_by_id(&self, id: UserId) -> StoreFuture<'_, Option<UserRecord>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(state.read().users.get(&id).cloned()) })
	}

	fn user_by_username<'a>(&'a self, username: &'a str) -> StoreFuture<'a, Option<UserRecord>> {
		let state = self.0.clone();
		let username = username.to_owned();

		Box::pin(async move {
			Ok(state.read().users.values().find(|u| u.username.as_ref() == username).cloned())
		})
	}

	fn can_update_course(&self, user: UserId, course: CourseId) -> StoreFuture<'_, bool> {
		let state = self.0.clone();

		Box::pin(async move {
			Ok(state
				.read()
				.course_editors
				.get(&course)
				.is_some_and(|editors| editors.contains(&user)))
		})
	}

	fn activity_visible(&self, cm: CmId, user: UserId) -> StoreFuture<'_, bool> {
		let state = self.0.clone();

		Box::pin(async move { Ok(!state.read().hidden.contains(&(cm, user))) })
	}

	fn rename_activity<'a>(&'a self, cm: CmId, name: &'a str) -> StoreFuture<'a, ()> {
		let state = self.0.clone();
		let name = name.to_owned();

		Box::pin(async move {
			if let Some(activity) =
				state.write().activities.values_mut().find(|a| a.cm == cm)
			{
				activity.name = name;
			}

			Ok(())
		})
	}

	fn set_event_link<'a>(
		&'a self,
		activity: ActivityId,
		edit_url: &'a Url,
		event_slug: Option<&'a str>,
	) -> StoreFuture<'a, ()> {
		let state = self.0.clone();
		let edit_url = edit_url.clone();
		let event_slug = event_slug.map(ToOwned::to_owned);

		Box::pin(async move {
			if let Some(record) = state.write().activities.get_mut(&activity) {
				record.edit_url = Some(edit_url);
				record.event_slug = event_slug;
			}

			Ok(())
		})
	}

	fn delete_activity(&self, activity: ActivityId) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move {
			let mut guard = state.write();

			guard.activities.remove(&activity);
			guard.grade_items.remove(&activity);
			guard.completions.retain(|(a, _), _| *a != activity);

			Ok(())
		})
	}
}
impl CompletionStore for MemoryHost {
	fn upsert(&self, record: CompletionRecord) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move {
			state.write().completions.insert((record.activity, record.user), record);

			Ok(())
		})
	}

	fn fetch(
		&self,
		activity: ActivityId,
		user: UserId,
	) -> StoreFuture<'_, Option<CompletionRecord>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(state.read().completions.get(&(activity, user)).cloned()) })
	}

	fn participated(&self, activity: ActivityId, user: UserId) -> StoreFuture<'_, bool> {
		let state = self.0.clone();

		Box::pin(async move { Ok(state.read().completions.contains_key(&(activity, user))) })
	}
}
impl GradeStore for MemoryHost {
	fn upsert_grade_item<'a>(&'a self, activity: &'a ActivityRecord) -> StoreFuture<'a, ()> {
		let state = self.0.clone();
		let id = activity.id;
		let name = activity.name.clone();
		let max = activity.grade.max_points();

		Box::pin(async move {
			state.write().grade_items.insert(id, GradeItem { name, max });

			Ok(())
		})
	}

	fn push_grade<'a>(
		&'a self,
		activity: &'a ActivityRecord,
		user: UserId,
		raw_grade: f64,
	) -> StoreFuture<'a, ()> {
		let state = self.0.clone();
		let id = activity.id;

		Box::pin(async move {
			state.write().pushed_grades.insert((id, user), raw_grade);

			Ok(())
		})
	}

	fn rename_grade_item<'a>(&'a self, activity: ActivityId, name: &'a str) -> StoreFuture<'a, ()> {
		let state = self.0.clone();
		let name = name.to_owned();

		Box::pin(async move {
			if let Some(item) = state.write().grade_items.get_mut(&activity) {
				item.name = name;
			}

			Ok(())
		})
	}

	fn mark_completed(&self, cm: CmId, user: UserId) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move {
			let mut guard = state.write();

			if !guard.completed.contains(&(cm, user)) {
				guard.completed.push((cm, user));
			}

			Ok(())
		})
	}

	fn grade_item_max(&self, activity: ActivityId) -> StoreFuture<'_, Option<f64>> {
		let state = self.0.clone();

		Box::pin(async move {
			Ok(state.read().grade_items.get(&activity).and_then(|item| item.max))
		})
	}

	fn site_default_max(&self) -> StoreFuture<'_, Option<f64>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(state.read().site_default_max) })
	}
}
