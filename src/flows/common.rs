//! Shared helpers for flow implementations (timestamps, grade math).

// crates.io
use time::{UtcOffset, format_description::BorrowedFormatItem, macros::format_description};
// self
use crate::_prelude::*;

const TS_FORMAT: &[BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

/// Renders the wire `ts` field: ISO-8601 UTC, second precision.
pub fn wire_timestamp(now: OffsetDateTime) -> String {
	now.to_offset(UtcOffset::UTC)
		.format(&TS_FORMAT)
		.expect("UTC timestamp with fixed components always formats")
}

/// Scales a 0–100 platform score onto the activity's grade maximum.
pub fn normalized_raw_grade(score: f64, max_grade: f64) -> f64 {
	score * max_grade / 100.0
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn timestamps_render_in_utc_with_z_suffix() {
		assert_eq!(
			wire_timestamp(datetime!(2024-03-01 12:30:45 UTC)),
			"2024-03-01T12:30:45Z"
		);
		assert_eq!(
			wire_timestamp(datetime!(2024-03-01 12:30:45 +02:00)),
			"2024-03-01T10:30:45Z"
		);
	}

	#[test]
	fn grade_normalization_scales_by_the_maximum() {
		assert_eq!(normalized_raw_grade(80.0, 50.0), 40.0);
		assert_eq!(normalized_raw_grade(100.0, 20.0), 20.0);
		assert_eq!(normalized_raw_grade(0.0, 50.0), 0.0);
	}
}
