//! Strongly typed identifiers enforced across the gateway domain.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
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
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
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
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
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
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 64;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} cannot be empty.")]
	Empty {
		/// Kind of identifier (member code, org code, issuer, prefix).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (member code, org code, issuer, prefix).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (member code, org code, issuer, prefix).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
	/// The identifier is shorter than required.
	#[error("{kind} needs at least {min} characters.")]
	TooShort {
		/// Kind of identifier (member code, org code, issuer, prefix).
		kind: &'static str,
		/// Minimum required character count.
		min: usize,
	},
}

def_id! { MemberCode, "Member code assigned to the distributor by the platform.", "Member code" }
def_id! { OrgCode, "Organization code sent in the org identity header.", "Org code" }
def_id! { UccIssuer, "Leading issuer segment of every allocated client code.", "UCC issuer" }

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

/// Two-character counter partition derived from an external identifier (e.g. a PAN).
///
/// Derivation is case-insensitive: `"ab1234"` and `"AB9999"` share the `AB` partition. Any
/// character is accepted except whitespace, which would break the space-delimited code.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UccPrefix(String);
impl UccPrefix {
	/// Number of leading identifier characters used as the partition key.
	pub const LEN: usize = 2;

	const KIND: &'static str = "UCC prefix";

	/// Derives the partition prefix from the first two characters of `identifier`.
	pub fn from_identifier(identifier: &str) -> Result<Self, IdentifierError> {
		let head = identifier.chars().take(Self::LEN).collect::<String>();

		if head.is_empty() {
			return Err(IdentifierError::Empty { kind: Self::KIND });
		}
		if head.chars().count() < Self::LEN {
			return Err(IdentifierError::TooShort { kind: Self::KIND, min: Self::LEN });
		}
		if head.chars().any(char::is_whitespace) {
			return Err(IdentifierError::ContainsWhitespace { kind: Self::KIND });
		}

		Ok(Self(head.chars().map(uppercase).collect()))
	}

	/// Returns the normalized (uppercase) prefix.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for UccPrefix {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for UccPrefix {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<UccPrefix> for String {
	fn from(value: UccPrefix) -> Self {
		value.0
	}
}
impl TryFrom<String> for UccPrefix {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		if value.chars().count() > Self::LEN {
			return Err(IdentifierError::TooLong { kind: Self::KIND, max: Self::LEN });
		}

		Self::from_identifier(&value)
	}
}
impl Debug for UccPrefix {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "UccPrefix({})", self.0)
	}
}
impl Display for UccPrefix {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

// Keeps the prefix at two chars when a character has no single-char uppercase form (`ß`).
fn uppercase(character: char) -> char {
	let mut upper = character.to_uppercase();

	match (upper.next(), upper.next()) {
		(Some(single), None) => single,
		_ => character,
	}
}

/// Unique client code of the form `"{ISSUER} {PREFIX} {NNN}"`.
///
/// The sequence is zero-padded to at least three digits; values past 999 widen instead of
/// wrapping.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct ClientCode {
	issuer: UccIssuer,
	prefix: UccPrefix,
	sequence: u64,
}
impl ClientCode {
	/// Assembles a code from its parts.
	pub fn new(issuer: UccIssuer, prefix: UccPrefix, sequence: u64) -> Self {
		Self { issuer, prefix, sequence }
	}

	/// Issuer segment.
	pub fn issuer(&self) -> &UccIssuer {
		&self.issuer
	}

	/// Partition prefix segment.
	pub fn prefix(&self) -> &UccPrefix {
		&self.prefix
	}

	/// Numeric sequence allocated for the prefix.
	pub fn sequence(&self) -> u64 {
		self.sequence
	}
}
impl From<ClientCode> for String {
	fn from(value: ClientCode) -> Self {
		value.to_string()
	}
}
impl Debug for ClientCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "ClientCode({self})")
	}
}
impl Display for ClientCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{} {} {:03}", self.issuer, self.prefix, self.sequence)
	}
}
