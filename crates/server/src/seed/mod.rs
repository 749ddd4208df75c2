//! One-shot bootstrap of an empty store: catalog, staff, student cohorts,
//! faculty allocation and synthetic enrollment history.

mod catalog;

pub use catalog::{Catalog, CohortEntry, CourseEntry, DegreeEntry, StaffEntry};

use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::anyhow;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use registrar_core::domain::{
    AcademicStanding, CourseId, DegreeId, Grade, GradeRecord, Role, Semester, UserId, round_to,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, PaginatorTrait, TransactionTrait,
};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::auth::CredentialHasher;
use crate::config::SeedConfig;
use crate::entity::{course, degree, enrollment, faculty_course, user};
use crate::error::{RegistrarError, Result};
use crate::repository::{NewCourse, NewDegree, NewEnrollment, NewUser};

const INSERT_CHUNK: usize = 500;

const FIRST_NAMES: &[&str] = &[
    "Aarav", "Aditi", "Akash", "Ananya", "Arjun", "Bhavya", "Deepak", "Divya", "Gautam", "Harini",
    "Ishaan", "Janani", "Karthik", "Kavya", "Lakshmi", "Manoj", "Meera", "Naveen", "Nithya",
    "Pranav", "Priya", "Rahul", "Revathi", "Sanjay", "Shruti", "Surya", "Tara", "Varun", "Vidya",
    "Yash",
];

const LAST_NAMES: &[&str] = &[
    "Anand", "Balaji", "Chandran", "Dinesh", "Ganesan", "Iyer", "Krishnan", "Kumar", "Menon",
    "Murugan", "Nair", "Natarajan", "Pillai", "Raman", "Rao", "Reddy", "Selvam", "Subramanian",
    "Sundaram", "Venkatesh",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedOptions {
    pub backlog_probability: f64,
    pub cohort_size: u32,
    pub default_capacity: u32,
}

impl SeedOptions {
    pub fn from_config(config: &SeedConfig, default_capacity: u32) -> Self {
        Self {
            backlog_probability: config.backlog_probability,
            cohort_size: config.cohort_size,
            default_capacity,
        }
    }
}

/// Row counts written by a seed run. `skipped` is set when the store already
/// held users and nothing was written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub skipped: bool,
    pub users: u64,
    pub degrees: u64,
    pub courses: u64,
    pub allocations: u64,
    pub enrollments: u64,
}

impl SeedReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

struct SeededCourse {
    id: CourseId,
    degree_id: DegreeId,
    sem: Semester,
}

struct SeededStudent {
    id: UserId,
    degree_id: DegreeId,
    standing: AcademicStanding,
}

pub struct Seeder {
    db: DatabaseConnection,
    hasher: CredentialHasher,
    catalog: Catalog,
    options: SeedOptions,
}

impl Seeder {
    pub fn new(
        db: DatabaseConnection,
        hasher: CredentialHasher,
        catalog: Catalog,
        options: SeedOptions,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&options.backlog_probability) {
            return Err(RegistrarError::Validation(format!(
                "backlog probability must be in [0, 1], got {}",
                options.backlog_probability
            )));
        }

        Ok(Self {
            db,
            hasher,
            catalog,
            options,
        })
    }

    /// Writes the whole catalog in a single transaction. Does nothing when any
    /// user already exists.
    pub async fn run(&self) -> Result<SeedReport> {
        let txn = self.db.begin().await?;

        let existing = user::Entity::find().count(&txn).await?;
        if existing > 0 {
            info!(existing, "store already populated, skipping seed");
            return Ok(SeedReport::skipped());
        }

        let hashes = self.hash_passwords().await?;
        let mut report = SeedReport::default();

        let degrees = self.degree_ids()?;
        let degree_rows = self
            .catalog
            .degrees
            .iter()
            .map(|entry| {
                Ok(NewDegree {
                    id: DegreeId::new(entry.id.as_str())?,
                    code: entry.code.clone(),
                    degree_type: entry.kind()?,
                    name: entry.name.clone(),
                }
                .into_active_model())
            })
            .collect::<Result<Vec<_>>>()?;
        report.degrees = insert_chunked::<degree::Entity, _>(&txn, degree_rows).await?;

        let (courses, course_rows) = self.courses(&degrees)?;
        report.courses = insert_chunked::<course::Entity, _>(&txn, course_rows).await?;

        let (students, user_rows) = self.users(&degrees, &hashes)?;
        report.users = insert_chunked::<user::Entity, _>(&txn, user_rows).await?;

        let (on_record, allocation_rows) = self.allocations(&courses)?;
        report.allocations =
            insert_chunked::<faculty_course::Entity, _>(&txn, allocation_rows).await?;

        let enrollment_rows = self.history(&students, &courses, &on_record)?;
        report.enrollments = insert_chunked::<enrollment::Entity, _>(&txn, enrollment_rows).await?;

        txn.commit().await?;

        info!(
            users = report.users,
            degrees = report.degrees,
            courses = report.courses,
            allocations = report.allocations,
            enrollments = report.enrollments,
            "seeded store"
        );
        Ok(report)
    }

    /// Each distinct password is hashed once, off the async runtime.
    async fn hash_passwords(&self) -> Result<HashMap<String, String>> {
        let passwords: BTreeSet<String> = std::iter::once(&self.catalog.admin.password)
            .chain(self.catalog.faculty.iter().map(|staff| &staff.password))
            .chain(self.catalog.cohorts.iter().map(|cohort| &cohort.password))
            .cloned()
            .collect();

        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || {
            passwords
                .into_iter()
                .map(|password| {
                    let hash = hasher.hash(&password)?;
                    Ok((password, hash))
                })
                .collect::<Result<HashMap<_, _>>>()
        })
        .await
        .map_err(|e| anyhow!("password hashing task failed: {e}"))?
    }

    fn degree_ids(&self) -> Result<HashMap<&str, DegreeId>> {
        self.catalog
            .degrees
            .iter()
            .map(|entry| Ok((entry.code.as_str(), DegreeId::new(entry.id.as_str())?)))
            .collect()
    }

    fn courses(
        &self,
        degrees: &HashMap<&str, DegreeId>,
    ) -> Result<(Vec<SeededCourse>, Vec<course::ActiveModel>)> {
        let mut seeded = Vec::new();
        let mut rows = Vec::new();

        for entry in &self.catalog.courses {
            let sem = Semester::new(i64::from(entry.sem))?;
            for degree_code in &entry.degrees {
                let degree_id = degrees
                    .get(degree_code.as_str())
                    .cloned()
                    .ok_or_else(|| RegistrarError::not_found("degree", degree_code))?;
                let new_course = NewCourse {
                    code: entry.code.clone(),
                    degree_id: degree_id.clone(),
                    degree_code: degree_code.clone(),
                    name: entry.name.clone(),
                    credits: entry.credits,
                    capacity: entry.capacity.unwrap_or(self.options.default_capacity),
                    sem,
                };

                seeded.push(SeededCourse {
                    id: new_course.course_id()?,
                    degree_id,
                    sem,
                });
                rows.push(new_course.into_active_model()?);
            }
        }

        Ok((seeded, rows))
    }

    fn users(
        &self,
        degrees: &HashMap<&str, DegreeId>,
        hashes: &HashMap<String, String>,
    ) -> Result<(Vec<SeededStudent>, Vec<user::ActiveModel>)> {
        let hash_of = |password: &str| {
            hashes
                .get(password)
                .cloned()
                .ok_or_else(|| RegistrarError::Internal(anyhow!("password was not hashed")))
        };

        let admin = &self.catalog.admin;
        let mut rows = vec![staff_user(admin, Role::Admin, hash_of(&admin.password)?)?];
        for staff in &self.catalog.faculty {
            rows.push(staff_user(staff, Role::Faculty, hash_of(&staff.password)?)?);
        }

        let mut students = Vec::new();
        for cohort in &self.catalog.cohorts {
            let degree = self
                .catalog
                .degree_by_code(&cohort.degree)
                .ok_or_else(|| RegistrarError::not_found("degree", &cohort.degree))?;
            let level = degree.kind()?;
            let degree_id = degrees
                .get(cohort.degree.as_str())
                .cloned()
                .ok_or_else(|| RegistrarError::not_found("degree", &cohort.degree))?;
            let password_hash = hash_of(&cohort.password)?;

            for n in 1..=self.options.cohort_size {
                let id = UserId::new(format!("{}{n:03}", cohort.prefix.trim()))?;
                let year = u8::try_from((n - 1) % u32::from(level.years()) + 1)
                    .map_err(|e| anyhow!("cohort year out of range: {e}"))?;
                let standing = AcademicStanding::new(level, year)?;
                let name = student_name(&id);

                rows.push(
                    NewUser {
                        id: id.clone(),
                        role: Role::Student,
                        name,
                        email: format!("{}@college.edu", id.as_str().to_lowercase()),
                        password_hash: password_hash.clone(),
                        department: cohort.department.clone(),
                        standing: Some(standing),
                        designation: None,
                        photo_url: Some(avatar_url(id.as_str())),
                        degree_id: Some(degree_id.clone()),
                    }
                    .into_active_model(),
                );
                students.push(SeededStudent {
                    id,
                    degree_id: degree_id.clone(),
                    standing,
                });
            }
        }

        Ok((students, rows))
    }

    /// Gives every course one or two faculty. The lowest allocated id is the
    /// faculty on record for the synthetic history.
    fn allocations(
        &self,
        courses: &[SeededCourse],
    ) -> Result<(HashMap<CourseId, UserId>, Vec<faculty_course::ActiveModel>)> {
        let mut faculty = self
            .catalog
            .faculty
            .iter()
            .map(|staff| UserId::new(staff.id.as_str()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        faculty.sort();
        if faculty.is_empty() {
            return Err(RegistrarError::Validation("catalog lists no faculty".to_string()));
        }

        let mut on_record = HashMap::new();
        let mut rows = Vec::new();
        for course in courses {
            let mut rng = rng_for(course.id.as_str());
            let count = rng.gen_range(1..=faculty.len().min(2));
            let mut picked: Vec<&UserId> = faculty.choose_multiple(&mut rng, count).collect();
            picked.sort();

            if let Some(first) = picked.first() {
                on_record.insert(course.id.clone(), (*first).clone());
            }
            for faculty_id in picked {
                rows.push(faculty_course::ActiveModel {
                    faculty_id: Set(faculty_id.to_string()),
                    course_id: Set(course.id.to_string()),
                });
            }
        }

        Ok((on_record, rows))
    }

    /// Every semester before the current one gets one row per course of the
    /// student's degree: completed with a grade in [2.5, 4.0], or a backlog.
    fn history(
        &self,
        students: &[SeededStudent],
        courses: &[SeededCourse],
        on_record: &HashMap<CourseId, UserId>,
    ) -> Result<Vec<enrollment::ActiveModel>> {
        let mut by_term: BTreeMap<(&DegreeId, Semester), Vec<&CourseId>> = BTreeMap::new();
        for course in courses {
            by_term
                .entry((&course.degree_id, course.sem))
                .or_default()
                .push(&course.id);
        }
        for ids in by_term.values_mut() {
            ids.sort();
        }

        let mut rows = Vec::new();
        for student in students {
            let mut rng = rng_for(student.id.as_str());
            for sem in student.standing.historic_semesters() {
                let Some(term_courses) = by_term.get(&(&student.degree_id, sem)) else {
                    continue;
                };

                for course_id in term_courses {
                    let faculty_id = on_record
                        .get(*course_id)
                        .ok_or_else(|| RegistrarError::not_found("allocation", course_id))?;
                    let record = if rng.gen_bool(self.options.backlog_probability) {
                        GradeRecord::backlog()
                    } else {
                        GradeRecord::completed(Grade::new(round_to(rng.gen_range(2.5..=4.0), 2))?)?
                    };

                    rows.push(
                        NewEnrollment {
                            student_id: student.id.clone(),
                            course_id: (*course_id).clone(),
                            faculty_id: faculty_id.clone(),
                            sem,
                            record,
                        }
                        .into_active_model(),
                    );
                }
            }
            debug!(student = %student.id, standing = %student.standing, "generated history");
        }

        Ok(rows)
    }
}

fn staff_user(entry: &StaffEntry, role: Role, password_hash: String) -> Result<user::ActiveModel> {
    Ok(NewUser {
        id: UserId::new(entry.id.as_str())?,
        role,
        name: entry.name.clone(),
        email: entry.email.clone(),
        password_hash,
        department: entry.department.clone(),
        standing: None,
        designation: entry.designation.clone(),
        photo_url: entry.photo_url.clone(),
        degree_id: None,
    }
    .into_active_model())
}

fn rng_for(key: &str) -> StdRng {
    let digest = Sha256::digest(key.as_bytes());
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&digest[..8]);
    StdRng::seed_from_u64(u64::from_le_bytes(seed))
}

fn student_name(id: &UserId) -> String {
    let mut rng = rng_for(&format!("name:{id}"));
    let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Student");
    let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Unknown");
    format!("{first} {last}")
}

fn avatar_url(seed: &str) -> String {
    format!("https://api.dicebear.com/7.x/avataaars/svg?seed={seed}")
}

async fn insert_chunked<E, A>(txn: &DatabaseTransaction, rows: Vec<A>) -> Result<u64>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<A>,
    A: ActiveModelTrait<Entity = E> + Clone,
{
    let mut inserted = 0;
    for chunk in rows.chunks(INSERT_CHUNK) {
        inserted += E::insert_many(chunk.to_vec())
            .exec_without_returning(txn)
            .await?;
    }
    Ok(inserted)
}
