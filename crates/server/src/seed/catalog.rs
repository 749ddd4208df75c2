use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, bail, ensure};
use registrar_core::domain::{DegreeType, Semester};
use serde::Deserialize;

type Result<T> = anyhow::Result<T>;

const BUILTIN_CATALOG: &str = include_str!("catalog.toml");

/// Bootstrap data: staff, degree programs, their curricula and student cohorts.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub admin: StaffEntry,
    #[serde(default)]
    pub faculty: Vec<StaffEntry>,
    #[serde(default)]
    pub degrees: Vec<DegreeEntry>,
    #[serde(default)]
    pub courses: Vec<CourseEntry>,
    #[serde(default)]
    pub cohorts: Vec<CohortEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaffEntry {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub department: String,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DegreeEntry {
    pub id: String,
    pub code: String,
    #[serde(rename = "type")]
    pub degree_type: String,
    pub name: String,
}

impl DegreeEntry {
    pub fn kind(&self) -> Result<DegreeType> {
        self.degree_type
            .parse::<DegreeType>()
            .with_context(|| format!("degree {} has an invalid type", self.id))
    }
}

/// One course definition, offered to every degree listed in `degrees`.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseEntry {
    pub code: String,
    pub name: String,
    pub credits: u32,
    pub sem: u8,
    pub degrees: Vec<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CohortEntry {
    /// Degree code.
    pub degree: String,
    pub department: String,
    pub prefix: String,
    pub password: String,
}

impl Catalog {
    pub fn builtin() -> Result<Self> {
        Self::from_str(BUILTIN_CATALOG).context("built-in catalog is invalid")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("failed to parse catalog file: {}", path.display()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        let catalog: Self = toml::from_str(s).context("failed to deserialize catalog")?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn degree_by_code(&self, code: &str) -> Option<&DegreeEntry> {
        self.degrees.iter().find(|degree| degree.code == code)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.faculty.is_empty(), "catalog lists no faculty");

        let mut user_ids = HashSet::from([self.admin.id.as_str()]);
        let mut emails = HashSet::from([self.admin.email.as_str()]);
        for staff in &self.faculty {
            ensure!(user_ids.insert(staff.id.as_str()), "duplicate staff id {}", staff.id);
            ensure!(emails.insert(staff.email.as_str()), "duplicate staff email {}", staff.email);
        }

        let mut degree_ids = HashSet::new();
        let mut degree_codes = HashSet::new();
        for degree in &self.degrees {
            degree.kind()?;
            ensure!(degree_ids.insert(&degree.id), "duplicate degree id {}", degree.id);
            ensure!(degree_codes.insert(&degree.code), "duplicate degree code {}", degree.code);
        }

        let mut offerings = HashSet::new();
        for course in &self.courses {
            ensure!(course.credits > 0, "course {} has no credits", course.code);
            ensure!(!course.degrees.is_empty(), "course {} is offered to no degree", course.code);
            Semester::new(i64::from(course.sem))
                .with_context(|| format!("course {} has an invalid semester", course.code))?;

            for code in &course.degrees {
                let Some(degree) = self.degree_by_code(code) else {
                    bail!("course {} references unknown degree {code}", course.code);
                };
                let semesters = degree.kind()?.semesters();
                ensure!(
                    course.sem <= semesters,
                    "course {} is in semester {} but {} has {semesters}",
                    course.code,
                    course.sem,
                    degree.code
                );
                ensure!(
                    offerings.insert((course.code.as_str(), code.as_str())),
                    "course {} is offered to {code} twice",
                    course.code
                );
            }
        }

        let mut prefixes = HashSet::new();
        for cohort in &self.cohorts {
            ensure!(
                self.degree_by_code(&cohort.degree).is_some(),
                "cohort {} references unknown degree {}",
                cohort.prefix,
                cohort.degree
            );
            ensure!(!cohort.prefix.trim().is_empty(), "cohort prefix must not be empty");
            ensure!(prefixes.insert(&cohort.prefix), "duplicate cohort prefix {}", cohort.prefix);
        }

        Ok(())
    }
}
