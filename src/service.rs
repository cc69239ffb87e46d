//! Outbound platform calls: event creation, health check, event listing,
//! rename propagation, and the protocol migration.
//!
//! Every call is JSON over HTTPS, carries the plugin version header, and
//! fails closed: transport errors and non-200 statuses surface as
//! [`RemoteServiceError`] (the advisory ping flattens them to `false`).

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	domain::{ActivityRecord, UserId, UserRecord},
	error::RemoteServiceError,
	flows::{Bridge, common::wire_timestamp},
	http::{ServiceHttpClient, ServiceRequest, ServiceResponse},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	token::{Action, CanonicalPayload, SignedEnvelope},
};

/// Header advertising the plugin version on every outbound call.
pub const PLUGIN_VERSION_HEADER: &str = "X-Plugin-Version";

/// Remote event link returned by a successful create call.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CreatedEventLink {
	/// Edit/view URL the host embeds in an iframe.
	#[serde(rename = "viewUrl")]
	pub view_url: Url,
	/// Slug identifying the event in later signed payloads.
	#[serde(rename = "eventSlug")]
	pub event_slug: String,
}

/// One event owned by the user, offered in the duplicate-event picker.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RemoteEvent {
	/// Platform event identifier.
	#[serde(rename = "_id")]
	pub id: String,
	/// Event display name.
	pub name: String,
}

#[derive(Debug, Deserialize)]
struct PingResponse {
	#[serde(rename = "keysAreValid")]
	keys_are_valid: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateEventBody<'a> {
	access_key_id: &'a str,
	auth_url: String,
	course_url: String,
	display_name: String,
	email: &'a str,
	first_name: &'a str,
	last_name: &'a str,
	moodle_username: &'a str,
	name: &'a str,
	report_url: String,
	token: String,
	ts: &'a str,
	version: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RenameEventBody<'a> {
	access_key_id: &'a str,
	name: &'a str,
	slug: &'a str,
	token: String,
	ts: &'a str,
	version: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpgradeStep2Body<'a> {
	access_key_id: &'a str,
	ids_to_usernames_mapping: &'a str,
	token: String,
	ts: &'a str,
	version: &'a str,
}

impl<C> Bridge<C>
where
	C: ?Sized + ServiceHttpClient,
{
	/// Asks the platform to create the event backing a new activity.
	pub async fn create_event(
		&self,
		activity: &ActivityRecord,
		author: &UserRecord,
		now: OffsetDateTime,
	) -> Result<CreatedEventLink> {
		const KIND: FlowKind = FlowKind::Create;
		const ENDPOINT: &str = "create";

		let span = FlowSpan::new(KIND, "create_event");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let ts = wire_timestamp(now);
				let auth_url = self.config.auth_url(activity.course, activity.cm)?;
				let course_url = self.config.course_url(activity.course)?;
				let report_url = self.config.report_url(activity.cm)?;
				let signed = CanonicalPayload::new()
					.field("accessKeyId", self.config.access_key_id.as_ref())
					.field("authUrl", auth_url.clone())
					.field("courseUrl", course_url.clone())
					.field("moodleUsername", author.username.as_ref())
					.field("name", &activity.name)
					.field("reportUrl", report_url.clone())
					.field("ts", &ts)
					.field("version", &self.config.version);
				let token = self.signer().sign(Action::Create, self.config.protocol, &signed);
				let body = CreateEventBody {
					access_key_id: self.config.access_key_id.as_ref(),
					auth_url: auth_url.into(),
					course_url: course_url.into(),
					display_name: author.display_name(),
					email: &author.email,
					first_name: &author.first_name,
					last_name: &author.last_name,
					moodle_username: author.username.as_ref(),
					name: &activity.name,
					report_url: report_url.into(),
					token: token.into(),
					ts: &ts,
					version: &self.config.version,
				};
				let request = self.post_json(ENDPOINT, self.config.create_url()?, &body)?;
				let response = self.call_platform(ENDPOINT, request).await?;

				Ok(decode(ENDPOINT, &response)?)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Checks the provisioned credentials against the platform.
	///
	/// Advisory only: any failure (missing config, transport, non-200,
	/// malformed body) reads as disconnected rather than raising.
	pub async fn ping(&self, now: OffsetDateTime) -> bool {
		const KIND: FlowKind = FlowKind::Ping;
		const ENDPOINT: &str = "ping";

		let span = FlowSpan::new(KIND, "ping");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result: Result<bool> = span
			.instrument(async move {
				let ts = wire_timestamp(now);
				let signed = CanonicalPayload::new()
					.field("accessKeyId", self.config.access_key_id.as_ref())
					.field("ts", &ts)
					.field("version", &self.config.version);
				let envelope = SignedEnvelope::seal(
					self.signer(),
					Action::Ping,
					self.config.protocol,
					signed,
					CanonicalPayload::new(),
				);
				let mut url = self.config.ping_url()?;

				envelope.append_to(&mut url);

				let request = ServiceRequest::get(url)
					.with_header(PLUGIN_VERSION_HEADER, self.config.version.clone());
				let response = self.call_platform(ENDPOINT, request).await?;
				let ping: PingResponse = decode(ENDPOINT, &response)?;

				Ok(ping.keys_are_valid)
			})
			.await;

		match result {
			Ok(valid) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);

				valid
			},
			Err(_) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);

				false
			},
		}
	}

	/// Lists the user's existing events for the duplicate-event picker.
	pub async fn events_list(
		&self,
		user: &UserRecord,
		now: OffsetDateTime,
	) -> Result<Vec<RemoteEvent>> {
		const KIND: FlowKind = FlowKind::EventsList;
		const ENDPOINT: &str = "events_list";

		let span = FlowSpan::new(KIND, "events_list");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let ts = wire_timestamp(now);
				let signed = CanonicalPayload::new()
					.field("accessKeyId", self.config.access_key_id.as_ref())
					.field("email", &user.email)
					.field("moodleUsername", user.username.as_ref())
					.field("ts", &ts)
					.field("version", &self.config.version);
				let envelope = SignedEnvelope::seal(
					self.signer(),
					Action::EventsList,
					self.config.protocol,
					signed,
					CanonicalPayload::new(),
				);
				let mut url = self.config.events_list_url()?;

				envelope.append_to(&mut url);

				let request = ServiceRequest::get(url)
					.with_header(PLUGIN_VERSION_HEADER, self.config.version.clone());
				let response = self.call_platform(ENDPOINT, request).await?;

				Ok(decode(ENDPOINT, &response)?)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Propagates a host-side activity rename to the linked event.
	pub async fn rename_event(
		&self,
		event_slug: &str,
		name: &str,
		now: OffsetDateTime,
	) -> Result<()> {
		const KIND: FlowKind = FlowKind::Rename;
		const ENDPOINT: &str = "rename_event";

		let span = FlowSpan::new(KIND, "rename_event");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let ts = wire_timestamp(now);
				let signed = CanonicalPayload::new()
					.field("accessKeyId", self.config.access_key_id.as_ref())
					.field("name", name)
					.field("slug", event_slug)
					.field("ts", &ts)
					.field("version", &self.config.version);
				let token =
					self.signer().sign(Action::RenameOutbound, self.config.protocol, &signed);
				let body = RenameEventBody {
					access_key_id: self.config.access_key_id.as_ref(),
					name,
					slug: event_slug,
					token: token.into(),
					ts: &ts,
					version: &self.config.version,
				};
				let request = self.post_json(ENDPOINT, self.config.rename_event_url()?, &body)?;

				self.call_platform(ENDPOINT, request).await?;

				Ok(())
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Runs the two-step id→username migration against the platform.
	///
	/// Step 1 fetches the user ids the platform still knows by number;
	/// step 2 posts the id→username mapping so both sides speak V3.
	pub async fn upgrade_to_v3(&self, now: OffsetDateTime) -> Result<()> {
		const KIND: FlowKind = FlowKind::Upgrade;

		let span = FlowSpan::new(KIND, "upgrade_to_v3");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let ts = wire_timestamp(now);
				let step1_signed = CanonicalPayload::new()
					.field("accessKeyId", self.config.access_key_id.as_ref())
					.field("ts", &ts)
					.field("version", &self.config.version);
				let step1 = SignedEnvelope::seal(
					self.signer(),
					Action::UpgradeStep1,
					self.config.protocol,
					step1_signed,
					CanonicalPayload::new(),
				);
				let mut step1_url = self.config.upgrade_step_1_url()?;

				step1.append_to(&mut step1_url);

				let request = ServiceRequest::get(step1_url)
					.with_header(PLUGIN_VERSION_HEADER, self.config.version.clone());
				let response = self.call_platform("upgrade_step_1", request).await?;
				let numeric_ids: Vec<i64> = decode("upgrade_step_1", &response)?;
				let mut mapping = BTreeMap::new();

				for id in numeric_ids {
					if let Some(user) = self.directory.user_by_id(UserId::from(id)).await? {
						mapping.insert(id.to_string(), user.username.as_ref().to_owned());
					}
				}

				let mapping_json = serde_json::to_string(&mapping)
					.map_err(|e| RemoteServiceError::transport("upgrade_step_2", e))?;
				let step2_signed = CanonicalPayload::new()
					.field("accessKeyId", self.config.access_key_id.as_ref())
					.field("idsToUsernamesMapping", &mapping_json)
					.field("ts", &ts)
					.field("version", &self.config.version);
				let token =
					self.signer().sign(Action::UpgradeStep2, self.config.protocol, &step2_signed);
				let body = UpgradeStep2Body {
					access_key_id: self.config.access_key_id.as_ref(),
					ids_to_usernames_mapping: &mapping_json,
					token: token.into(),
					ts: &ts,
					version: &self.config.version,
				};
				let request =
					self.post_json("upgrade_step_2", self.config.upgrade_step_2_url()?, &body)?;

				self.call_platform("upgrade_step_2", request).await?;

				Ok(())
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	fn post_json<T: Serialize>(
		&self,
		endpoint: &'static str,
		url: Url,
		body: &T,
	) -> Result<ServiceRequest, RemoteServiceError> {
		let bytes = serde_json::to_vec(body)
			.map_err(|e| RemoteServiceError::transport(endpoint, e))?;

		Ok(ServiceRequest::post_json(url, bytes)
			.with_header(PLUGIN_VERSION_HEADER, self.config.version.clone()))
	}

	pub(crate) async fn call_platform(
		&self,
		endpoint: &'static str,
		request: ServiceRequest,
	) -> Result<ServiceResponse, RemoteServiceError> {
		let response = self
			.http_client
			.execute(request)
			.await
			.map_err(|e| RemoteServiceError::transport(endpoint, e))?;

		if !response.is_ok() {
			return Err(RemoteServiceError::Status { endpoint, status: response.status });
		}

		Ok(response)
	}
}

fn decode<T>(endpoint: &'static str, response: &ServiceResponse) -> Result<T, RemoteServiceError>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| RemoteServiceError::Decode { endpoint, source })
}
