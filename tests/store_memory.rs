// crates.io
use time::macros::datetime;
// self
use quiz_bridge::{
	_preludet::*,
	domain::{
		ActivityId, ActivityRecord, CmId, CompletionRecord, CompletionStatus, ConsentState,
		CourseId, GradeSpec, PendingAuthRequest, SessionKey, UserId,
	},
	store::{CompletionStore, GradeStore, HostDirectory, SessionStore},
};

fn session() -> SessionKey {
	SessionKey::new("sess-1").expect("Session key fixture should be valid.")
}

fn activity() -> ActivityRecord {
	ActivityRecord::new(
		ActivityId::from(1),
		CourseId::from(5),
		CmId::from(9),
		"Kick-off quiz",
		GradeSpec::Points(50.0),
	)
}

#[tokio::test]
async fn pending_request_lifecycle() {
	let sessions = MemorySessionStore::default();
	let pending = PendingAuthRequest::new(
		CourseId::from(5),
		CmId::from(9),
		Url::parse("https://svc.example/cb").expect("Callback fixture should parse."),
	);

	assert!(sessions.pending(&session()).await.expect("Store should answer.").is_none());

	sessions
		.set_pending(&session(), pending.clone())
		.await
		.expect("Pending request should persist.");

	assert_eq!(
		sessions.pending(&session()).await.expect("Store should answer."),
		Some(pending)
	);

	sessions.clear_pending(&session()).await.expect("Pending request should clear.");

	assert!(sessions.pending(&session()).await.expect("Store should answer.").is_none());
}

#[tokio::test]
async fn consent_survives_pending_consumption() {
	let sessions = MemorySessionStore::default();

	assert_eq!(
		sessions.consent(&session()).await.expect("Store should answer."),
		ConsentState::Unset
	);

	sessions
		.set_consent(&session(), ConsentState::Agreed)
		.await
		.expect("Consent should persist.");
	sessions.clear_pending(&session()).await.expect("Clearing pending should succeed.");

	assert_eq!(
		sessions.consent(&session()).await.expect("Store should answer."),
		ConsentState::Agreed
	);
}

#[tokio::test]
async fn completion_rows_are_unique_per_key() {
	let host = MemoryHost::default();
	let t0 = datetime!(2024-01-01 00:00:00 UTC);
	let t1 = datetime!(2024-01-01 00:05:00 UTC);

	host.upsert(CompletionRecord::new(
		ActivityId::from(1),
		UserId::from(7),
		CompletionStatus::Incomplete,
		40.0,
		t0,
	))
	.await
	.expect("First upsert should succeed.");

	let mut replacement = host
		.fetch(ActivityId::from(1), UserId::from(7))
		.await
		.expect("Store should answer.")
		.expect("Row should exist.");

	replacement.apply(CompletionStatus::Pass, 80.0, t1);
	host.upsert(replacement).await.expect("Second upsert should succeed.");

	let row = host
		.fetch(ActivityId::from(1), UserId::from(7))
		.await
		.expect("Store should answer.")
		.expect("Row should exist.");

	assert_eq!(row.grade, 80.0);
	assert_eq!(row.created, t0, "Upserts keep the original creation time.");
	assert!(host.participated(ActivityId::from(1), UserId::from(7))
		.await
		.expect("Store should answer."));
}

#[tokio::test]
async fn deleting_an_activity_cascades() {
	let host = MemoryHost::default();

	host.seed_activity(activity());
	host.upsert_grade_item(&activity()).await.expect("Grade item should upsert.");
	host.upsert(CompletionRecord::new(
		ActivityId::from(1),
		UserId::from(7),
		CompletionStatus::Pass,
		80.0,
		datetime!(2024-01-01 00:00:00 UTC),
	))
	.await
	.expect("Completion row should upsert.");

	host.delete_activity(ActivityId::from(1)).await.expect("Delete should succeed.");

	assert!(host.activity(ActivityId::from(1)).is_none());
	assert!(host.grade_item_name(ActivityId::from(1)).is_none());
	assert!(!host.participated(ActivityId::from(1), UserId::from(7))
		.await
		.expect("Store should answer."));
}

#[tokio::test]
async fn visibility_defaults_open_and_honors_hides() {
	let host = MemoryHost::default();

	host.seed_activity(activity());

	assert!(host.activity_visible(CmId::from(9), UserId::from(7))
		.await
		.expect("Store should answer."));

	host.hide_activity(CmId::from(9), UserId::from(7));

	assert!(!host.activity_visible(CmId::from(9), UserId::from(7))
		.await
		.expect("Store should answer."));
}
