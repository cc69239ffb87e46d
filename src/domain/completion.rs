//! Participation outcomes reported back by the remote platform.

// self
use crate::_prelude::*;
use crate::domain::{ActivityId, UserId};

/// Tri-state participation outcome tracked per (activity, user).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
	/// The participant has not answered every correctable question.
	Incomplete,
	/// Scored above the pass threshold.
	Pass,
	/// Scored below the pass threshold.
	Fail,
}
impl CompletionStatus {
	/// Maps the wire `completion` tag onto a status.
	///
	/// Closed three-way mapping: `passed` and `incomplete` are recognized,
	/// every other tag counts as a fail.
	pub fn from_report_tag(tag: &str) -> Self {
		match tag {
			"passed" => Self::Pass,
			"incomplete" => Self::Incomplete,
			_ => Self::Fail,
		}
	}

	/// Stable label for logs and storage.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Incomplete => "incomplete",
			Self::Pass => "pass",
			Self::Fail => "fail",
		}
	}
}
impl Display for CompletionStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Per-(activity, user) participation row, unique by its natural key.
///
/// Upserts overwrite grade/status/`modified` but keep identity and
/// `created`, so replaying an identical report converges on one row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
	/// Activity the participation belongs to.
	pub activity: ActivityId,
	/// Participant.
	pub user: UserId,
	/// Latest reported outcome.
	pub status: CompletionStatus,
	/// Reported score, normalized to 0–100 by the platform.
	pub grade: f64,
	/// First time a report arrived for this key.
	pub created: OffsetDateTime,
	/// Most recent report time.
	pub modified: OffsetDateTime,
}
impl CompletionRecord {
	/// Creates the first record for a key.
	pub fn new(
		activity: ActivityId,
		user: UserId,
		status: CompletionStatus,
		grade: f64,
		now: OffsetDateTime,
	) -> Self {
		Self { activity, user, status, grade, created: now, modified: now }
	}

	/// Applies a newer report on top of this record.
	pub fn apply(&mut self, status: CompletionStatus, grade: f64, now: OffsetDateTime) {
		self.status = status;
		self.grade = grade;
		self.modified = now;
	}
}
