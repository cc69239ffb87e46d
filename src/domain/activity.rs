//! Activity records and their grading configuration.

// self
use crate::_prelude::*;
use crate::domain::{ActivityId, CmId, CourseId};

/// Grading configuration for an activity, stored as a signed integer on the
/// host: positive values are a points maximum, negative values reference a
/// scale, zero means text-only feedback.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeSpec {
	/// Numeric grading up to the given maximum.
	Points(f64),
	/// Scale grading referencing the host scale id.
	Scale(i64),
	/// No numeric grade, feedback only.
	TextOnly,
}
impl GradeSpec {
	/// Decodes the host's signed-integer grade convention.
	pub fn from_signed(raw: i64) -> Self {
		match raw {
			n if n > 0 => Self::Points(n as f64),
			n if n < 0 => Self::Scale(-n),
			_ => Self::TextOnly,
		}
	}

	/// Encodes back into the signed-integer convention.
	pub fn as_signed(self) -> i64 {
		match self {
			Self::Points(max) => max as i64,
			Self::Scale(id) => -id,
			Self::TextOnly => 0,
		}
	}

	/// Points maximum, when numeric grading is configured.
	pub fn max_points(self) -> Option<f64> {
		match self {
			Self::Points(max) => Some(max),
			_ => None,
		}
	}
}
impl Default for GradeSpec {
	fn default() -> Self {
		Self::Points(100.0)
	}
}

/// One activity instance embedding a remote event.
///
/// `edit_url` and `event_slug` start empty and are filled in once the
/// remote create call succeeds; renames overwrite `name` last-writer-wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
	/// Instance identifier.
	pub id: ActivityId,
	/// Course the activity belongs to.
	pub course: CourseId,
	/// Course-module the activity is mounted under.
	pub cm: CmId,
	/// Display name, kept in sync with the remote event.
	pub name: String,
	/// Remote event slug linked to this activity.
	pub event_slug: Option<String>,
	/// Remote edit URL for the linked event.
	pub edit_url: Option<Url>,
	/// Grading configuration.
	pub grade: GradeSpec,
	/// Whether participation drives the host's completion rules.
	pub custom_completion: bool,
}
impl ActivityRecord {
	/// Creates a freshly added activity with no remote link yet.
	pub fn new(
		id: ActivityId,
		course: CourseId,
		cm: CmId,
		name: impl Into<String>,
		grade: GradeSpec,
	) -> Self {
		Self {
			id,
			course,
			cm,
			name: name.into(),
			event_slug: None,
			edit_url: None,
			grade,
			custom_completion: false,
		}
	}

	/// Wire value for the `eventSlug` field; blank until linked.
	pub fn event_slug_value(&self) -> &str {
		self.event_slug.as_deref().unwrap_or("")
	}
}
