use std::fmt;
use std::str::FromStr;

use super::{DegreeType, DomainError, Semester};

/// A student's academic year, written `UG-3` or `PG-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AcademicStanding {
    level: DegreeType,
    year: u8,
}

impl AcademicStanding {
    pub fn new(level: DegreeType, year: u8) -> Result<Self, DomainError> {
        if year == 0 || year > level.years() {
            return Err(DomainError::InvalidStanding(format!("{level}-{year}")));
        }

        Ok(Self { level, year })
    }

    pub fn level(&self) -> DegreeType {
        self.level
    }

    pub fn year(&self) -> u8 {
        self.year
    }

    /// The semester a student of this standing registers for.
    pub fn current_semester(&self) -> Semester {
        Semester(self.year * 2)
    }

    /// Semesters already behind the student: `1..current`.
    pub fn historic_semesters(&self) -> impl Iterator<Item = Semester> {
        (Semester::FIRST..self.year * 2).map(Semester)
    }
}

impl fmt::Display for AcademicStanding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.level, self.year)
    }
}

impl FromStr for AcademicStanding {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidStanding(s.to_string());

        let (level, year) = s.trim().split_once('-').ok_or_else(invalid)?;
        let level = level.parse::<DegreeType>().map_err(|_| invalid())?;
        let year = year.parse::<u8>().map_err(|_| invalid())?;

        Self::new(level, year).map_err(|_| invalid())
    }
}
