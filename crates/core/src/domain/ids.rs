use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// Identifiers in this domain are assigned by people (roll numbers, staff codes,
/// course codes), so they wrap a trimmed, non-empty string.
macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                let trimmed = value.trim();

                if trimmed.is_empty() {
                    return Err(DomainError::EmptyIdentifier);
                }

                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.into_inner()
            }
        }
    };
}

define_id_type!(UserId);
define_id_type!(DegreeId);
define_id_type!(CourseId);

impl CourseId {
    /// Course ids are scoped by degree: the same course code offered by two
    /// degrees yields two distinct courses.
    pub fn scoped(code: &str, degree_code: &str) -> Result<Self, DomainError> {
        Self::new(format!("{}_{}", code.trim(), degree_code.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::{CourseId, UserId};
    use crate::domain::DomainError;

    #[test]
    fn user_id_is_trimmed() {
        let id: UserId = "  CSE001 ".parse().expect("id should parse");

        assert_eq!(id.as_str(), "CSE001");
    }

    #[test]
    fn blank_id_is_rejected() {
        let err = UserId::new("   ").expect_err("blank id should be rejected");

        assert_eq!(err, DomainError::EmptyIdentifier);
    }

    #[test]
    fn course_id_is_scoped_by_degree_code() {
        let id = CourseId::scoped("24UCS171", "CSE").expect("scoped id");

        assert_eq!(id.to_string(), "24UCS171_CSE");
    }
}
