// crates.io
use httpmock::prelude::*;
use time::macros::datetime;
// self
use quiz_bridge::{
	_preludet::*,
	domain::{ActivityId, ActivityRecord, CmId, CourseId, GradeSpec, UserId, UserRecord, Username},
};

const NOW: OffsetDateTime = datetime!(2024-03-01 12:00:00 UTC);

fn activity() -> ActivityRecord {
	ActivityRecord::new(
		ActivityId::from(1),
		CourseId::from(5),
		CmId::from(9),
		"Kick-off quiz",
		GradeSpec::Points(50.0),
	)
}

fn ada() -> UserRecord {
	UserRecord {
		id: UserId::from(7),
		username: Username::new("ada").expect("Username fixture should be valid."),
		first_name: "Ada".into(),
		last_name: "Lovelace".into(),
		email: "ada@example.edu".into(),
	}
}

#[tokio::test]
async fn create_success_links_the_remote_event() {
	let server = MockServer::start_async().await;
	let (bridge, _sessions, host) = build_reqwest_test_bridge(test_config(&server.base_url()));

	host.seed_activity(activity());

	let view_url = format!("{}/events/evt-1/edit", server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/moodle/v3/events")
				.header("X-Plugin-Version", env!("CARGO_PKG_VERSION"));
			then.status(200).header("content-type", "application/json").body(format!(
				"{{\"viewUrl\":\"{view_url}\",\"eventSlug\":\"evt-1\"}}"
			));
		})
		.await;
	let link = bridge
		.on_activity_created(&activity(), &ada(), NOW)
		.await
		.expect("A 200 create response should link the event.");

	assert_eq!(link.event_slug, "evt-1");

	mock.assert_async().await;

	let stored = host.activity(ActivityId::from(1)).expect("Activity should survive.");

	assert_eq!(stored.event_slug.as_deref(), Some("evt-1"));
	assert_eq!(stored.edit_url.expect("Edit URL should be recorded.").as_str(), view_url);
}

#[tokio::test]
async fn create_failure_deletes_the_local_activity() {
	let server = MockServer::start_async().await;
	let (bridge, _sessions, host) = build_reqwest_test_bridge(test_config(&server.base_url()));

	host.seed_activity(activity());

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/moodle/v3/events");
			then.status(500);
		})
		.await;
	let error = bridge
		.on_activity_created(&activity(), &ada(), NOW)
		.await
		.expect_err("A failed create call should propagate.");

	assert!(matches!(error, Error::Remote(_)));
	assert_eq!(error.http_status(), 502);

	mock.assert_async().await;

	assert!(
		host.activity(ActivityId::from(1)).is_none(),
		"The local record must be deleted so it never points at a missing event."
	);
}

#[tokio::test]
async fn ping_reports_key_validity() {
	let server = MockServer::start_async().await;
	let (bridge, _sessions, _host) = build_reqwest_test_bridge(test_config(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/moodle/v3/ping");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"keysAreValid\":true}");
		})
		.await;

	assert!(bridge.ping(NOW).await);

	mock.assert_async().await;
}

#[tokio::test]
async fn ping_swallows_rejections_and_failures() {
	let rejected = MockServer::start_async().await;

	rejected
		.mock_async(|when, then| {
			when.method(GET).path("/api/moodle/v3/ping");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"keysAreValid\":false}");
		})
		.await;

	let (bridge, _sessions, _host) = build_reqwest_test_bridge(test_config(&rejected.base_url()));

	assert!(!bridge.ping(NOW).await, "Invalid keys read as disconnected.");

	let broken = MockServer::start_async().await;

	broken
		.mock_async(|when, then| {
			when.method(GET).path("/api/moodle/v3/ping");
			then.status(500);
		})
		.await;

	let (bridge, _sessions, _host) = build_reqwest_test_bridge(test_config(&broken.base_url()));

	assert!(!bridge.ping(NOW).await, "A non-200 ping reads as disconnected, never raises.");
}

#[tokio::test]
async fn events_list_parses_the_picker_entries() {
	let server = MockServer::start_async().await;
	let (bridge, _sessions, _host) = build_reqwest_test_bridge(test_config(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/moodle/v3/events_list");
			then.status(200).header("content-type", "application/json").body(
				"[{\"_id\":\"e1\",\"name\":\"Quiz 1\"},{\"_id\":\"e2\",\"name\":\"Quiz 2\"}]",
			);
		})
		.await;
	let events = bridge
		.events_list(&ada(), NOW)
		.await
		.expect("A 200 events list should parse.");

	assert_eq!(events.len(), 2);
	assert_eq!(events[0].id, "e1");
	assert_eq!(events[1].name, "Quiz 2");

	mock.assert_async().await;
}

#[tokio::test]
async fn events_list_failure_surfaces_as_a_remote_error() {
	let server = MockServer::start_async().await;
	let (bridge, _sessions, _host) = build_reqwest_test_bridge(test_config(&server.base_url()));

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/moodle/v3/events_list");
			then.status(503);
		})
		.await;

	let error = bridge
		.events_list(&ada(), NOW)
		.await
		.expect_err("A non-200 events list should fail closed.");

	assert!(matches!(error, Error::Remote(_)));
	assert_eq!(error.http_status(), 502);
}

#[tokio::test]
async fn rename_propagates_to_the_platform() {
	let server = MockServer::start_async().await;
	let (bridge, _sessions, _host) = build_reqwest_test_bridge(test_config(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/integration/moodle-plugin/rename-event");
			then.status(200);
		})
		.await;

	bridge
		.rename_event("evt-1", "Week 2 quiz", NOW)
		.await
		.expect("A 200 rename should succeed.");

	mock.assert_async().await;
}

#[tokio::test]
async fn upgrade_runs_both_migration_steps() {
	let server = MockServer::start_async().await;
	let (bridge, _sessions, host) = build_reqwest_test_bridge(test_config(&server.base_url()));

	host.seed_user(ada());

	let step1 = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/moodle/v3/upgrade-step-1");
			then.status(200).header("content-type", "application/json").body("[7]");
		})
		.await;
	let step2 = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/moodle/v3/upgrade-step-2");
			then.status(200);
		})
		.await;

	bridge.upgrade_to_v3(NOW).await.expect("Both migration steps should succeed.");

	step1.assert_async().await;
	step2.assert_async().await;
}

#[tokio::test]
async fn upgrade_stops_when_step_1_fails() {
	let server = MockServer::start_async().await;
	let (bridge, _sessions, _host) = build_reqwest_test_bridge(test_config(&server.base_url()));

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/moodle/v3/upgrade-step-1");
			then.status(500);
		})
		.await;

	let step2 = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/moodle/v3/upgrade-step-2");
			then.status(200);
		})
		.await;
	let error = bridge
		.upgrade_to_v3(NOW)
		.await
		.expect_err("A failed step 1 should abort the migration.");

	assert!(matches!(error, Error::Remote(_)));

	step2.assert_calls_async(0).await;
}
