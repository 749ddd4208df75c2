use std::fmt;
use std::str::FromStr;

use super::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DegreeType {
    Undergraduate,
    Postgraduate,
}

impl DegreeType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undergraduate => "UG",
            Self::Postgraduate => "PG",
        }
    }

    /// Number of semesters in a program of this type.
    pub const fn semesters(self) -> u8 {
        match self {
            Self::Undergraduate => 8,
            Self::Postgraduate => 4,
        }
    }

    pub const fn years(self) -> u8 {
        self.semesters() / 2
    }
}

impl fmt::Display for DegreeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DegreeType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UG" => Ok(Self::Undergraduate),
            "PG" => Ok(Self::Postgraduate),
            other => Err(DomainError::UnknownDegreeType(other.to_string())),
        }
    }
}
