//! Strongly typed identifiers enforced across the bridge domain.

// std
use std::borrow::Borrow;
// self
use crate::_prelude::*;

macro_rules! def_num_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(
			Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
		)]
		#[serde(transparent)]
		pub struct $name(pub i64);
		impl $name {
			/// Returns the raw numeric value.
			pub const fn get(self) -> i64 {
				self.0
			}
		}
		impl From<i64> for $name {
			fn from(value: i64) -> Self {
				Self(value)
			}
		}
		impl From<$name> for i64 {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl FromStr for $name {
			type Err = std::num::ParseIntError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				s.parse().map(Self)
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, "{}", self.0)
			}
		}
	};
}

macro_rules! def_str_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty or whitespace.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (username, access key, session).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (username, access key, session).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (username, access key, session).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_num_id! { CourseId, "Host course identifier.", "Course" }
def_num_id! { CmId, "Course-module identifier an activity is mounted under.", "Cm" }
def_num_id! { ActivityId, "Bridge activity instance identifier.", "Activity" }
def_num_id! { UserId, "Host user identifier.", "User" }

def_str_id! { Username, "Host login name carried on the wire as `moodleUsername`.", "Username" }
def_str_id! { AccessKeyId, "Provisioned API access key identifier.", "AccessKey" }
def_str_id! { SessionKey, "Opaque key correlating a visitor's browser session.", "Session" }

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn numeric_ids_round_trip() {
		let cm = CmId::from(9);

		assert_eq!(cm.get(), 9);
		assert_eq!(cm.to_string(), "9");
		assert_eq!("9".parse::<CmId>().expect("Parse should succeed."), cm);
		assert_eq!(format!("{cm:?}"), "Cm(9)");
	}

	#[test]
	fn string_ids_validate() {
		assert!(Username::new("").is_err());
		assert!(Username::new("with space").is_err());
		assert!(Username::new("a".repeat(IDENTIFIER_MAX_LEN + 1)).is_err());

		let username = Username::new("ada.lovelace").expect("Username fixture should be valid.");

		assert_eq!(username.as_ref(), "ada.lovelace");
	}

	#[test]
	fn serde_enforces_validation() {
		assert!(serde_json::from_str::<Username>("\"with space\"").is_err());

		let key: AccessKeyId =
			serde_json::from_str("\"AKID\"").expect("Access key should deserialize.");

		assert_eq!(key.as_ref(), "AKID");
	}

	#[test]
	fn borrow_supports_map_lookup() {
		let map: HashMap<Username, u8> = HashMap::from_iter([(
			Username::new("ada").expect("Username used for lookup should be valid."),
			1_u8,
		)]);

		assert_eq!(map.get("ada"), Some(&1));
	}
}
