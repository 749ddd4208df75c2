use super::DomainError;

/// Semester slot within a program, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Semester(pub(super) u8);

impl Semester {
    pub const FIRST: u8 = 1;
    pub const LAST: u8 = 8;

    pub fn new(value: i64) -> Result<Self, DomainError> {
        if (i64::from(Self::FIRST)..=i64::from(Self::LAST)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(DomainError::InvalidSemester(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i32> for Semester {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl From<Semester> for i32 {
    fn from(value: Semester) -> Self {
        i32::from(value.0)
    }
}
