//! Newtype domain identifiers.
//!
//! Every name that crosses the tracker or handoff boundary is a distinct newtype
//! wrapping a `String`. This prevents accidentally interchanging a
//! [`ProjectKey`] with a [`VersionName`] even though both are plain text on the
//! wire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: tracker-assigned
// ---------------------------------------------------------------------------

string_id! {
    /// Short tracker-side identifier of a project (e.g. `"ABC"`).
    ///
    /// Derived from the last path segment of the build's issue-browsing URL
    /// (`https://issues.example.com/browse/ABC`). Also keys the handoff record.
    ProjectKey
}

string_id! {
    /// Canonical release version name as stored in the tracker (e.g. `"2.3.0"`).
    ///
    /// Never carries a `-SNAPSHOT` marker; see
    /// [`crate::naming::normalize_release_version`].
    VersionName
}

string_id! {
    /// Opaque handle the tracker hands out for a version.
    ///
    /// For Jira this is the version's `self` URL; it is passed back verbatim
    /// for count and update calls.
    VersionRef
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single CLI invocation of `verify` or `release`.
///
/// Generated fresh for every invocation and attached to the workflow span so
/// all log lines from one run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generates a new random invocation identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_are_rejected() {
        assert!(ProjectKey::new("").is_none());
        assert!(VersionName::new(String::new()).is_none());
        assert_eq!(VersionRef::new("x").map(|r| r.to_string()), Some("x".to_owned()));
    }

    #[test]
    fn invocation_ids_are_unique() {
        assert_ne!(InvocationId::new_random(), InvocationId::new_random());
    }
}
