// self
use quiz_bridge::{
	_preludet::*,
	domain::{ActivityId, ActivityRecord, CmId, CourseId, GradeSpec},
	flows::RenameRequest,
	token::{Action, CanonicalPayload, ProtocolVersion},
};

const PLATFORM: &str = "https://svc.example";
const TS: &str = "2024-03-01T11:59:30Z";

fn activity() -> ActivityRecord {
	ActivityRecord::new(
		ActivityId::from(1),
		CourseId::from(5),
		CmId::from(9),
		"Kick-off quiz",
		GradeSpec::Points(50.0),
	)
}

async fn seeded_bridge() -> (ReqwestTestBridge, MemoryHost) {
	let (bridge, _sessions, host) = build_reqwest_test_bridge(test_config(PLATFORM));

	host.seed_activity(activity());
	bridge
		.on_activity_updated(&activity())
		.await
		.expect("Grade item should seed from the activity.");

	(bridge, host)
}

fn signed_rename(bridge: &ReqwestTestBridge, cm: CmId, name: &str) -> RenameRequest {
	let signed = CanonicalPayload::new()
		.field("accessKeyId", "AKID")
		.field("cmid", cm.to_string())
		.field("name", name)
		.field("ts", TS);
	let token = bridge.signer().sign(Action::RenameInbound, ProtocolVersion::V3, &signed);

	RenameRequest { cm, name: name.into(), ts: TS.into(), token: token.into() }
}

#[tokio::test]
async fn verified_rename_updates_activity_and_grade_item() {
	let (bridge, host) = seeded_bridge().await;

	bridge
		.handle_rename(signed_rename(&bridge, CmId::from(9), "Week 2 quiz"))
		.await
		.expect("A correctly signed rename should be applied.");

	assert_eq!(
		host.activity(ActivityId::from(1)).expect("Activity should still exist.").name,
		"Week 2 quiz"
	);
	assert_eq!(host.grade_item_name(ActivityId::from(1)).as_deref(), Some("Week 2 quiz"));
}

#[tokio::test]
async fn forged_rename_is_rejected() {
	let (bridge, host) = seeded_bridge().await;
	let mut request = signed_rename(&bridge, CmId::from(9), "Week 2 quiz");

	request.name = "Hijacked".into();

	let error = bridge
		.handle_rename(request)
		.await
		.expect_err("A tampered rename must not verify.");

	assert!(matches!(error, Error::InvalidToken { .. }));
	assert_eq!(error.http_status(), 403);
	assert_eq!(
		host.activity(ActivityId::from(1)).expect("Activity should still exist.").name,
		"Kick-off quiz",
		"A rejected rename must not change the activity."
	);
}

#[tokio::test]
async fn rename_for_an_unknown_module_misses() {
	let (bridge, _host) = seeded_bridge().await;
	let error = bridge
		.handle_rename(signed_rename(&bridge, CmId::from(404), "Week 2 quiz"))
		.await
		.expect_err("An unknown course-module should miss.");

	assert_eq!(error.http_status(), 404);
}

#[tokio::test]
async fn blank_names_are_refused() {
	let (bridge, _host) = seeded_bridge().await;
	let error = bridge
		.handle_rename(signed_rename(&bridge, CmId::from(9), "  "))
		.await
		.expect_err("A blank name should be refused.");

	assert!(matches!(error, Error::MissingParameters { .. }));
}
