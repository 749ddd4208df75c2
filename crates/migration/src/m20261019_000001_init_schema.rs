use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Degree::Table)
                    .if_not_exists()
                    .col(string_len(Degree::Id, 64).primary_key())
                    .col(string_len(Degree::Code, 16).unique_key())
                    .col(
                        string_len(Degree::DegreeType, 2)
                            .check(Expr::col(Degree::DegreeType).is_in(["UG", "PG"])),
                    )
                    .col(string_len(Degree::Name, 200))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(string_len(User::Id, 64).primary_key())
                    .col(
                        string_len(User::Role, 16)
                            .check(Expr::col(User::Role).is_in(["student", "faculty", "admin"])),
                    )
                    .col(string_len(User::Name, 200))
                    .col(string_len(User::Email, 255).unique_key())
                    .col(string_len(User::PasswordHash, 255))
                    .col(string_len(User::Department, 200))
                    // Students only, `UG-<n>` / `PG-<n>`.
                    .col(string_len_null(User::Year, 8))
                    // Faculty only.
                    .col(string_len_null(User::Designation, 100))
                    .col(text_null(User::PhotoUrl))
                    .col(string_len_null(User::DegreeId, 64))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user-degree_id")
                            .from(User::Table, User::DegreeId)
                            .to(Degree::Table, Degree::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Course::Table)
                    .if_not_exists()
                    .col(string_len(Course::Id, 64).primary_key())
                    .col(string_len(Course::DegreeId, 64))
                    .col(string_len(Course::Code, 32))
                    .col(string_len(Course::Name, 200))
                    .col(integer(Course::Credits).check(Expr::col(Course::Credits).gt(0)))
                    .col(
                        integer(Course::Capacity)
                            .default(30)
                            .check(Expr::col(Course::Capacity).gte(0)),
                    )
                    .col(
                        integer(Course::Year)
                            .check(Expr::col(Course::Year).gte(1))
                            .check(Expr::col(Course::Year).lte(4)),
                    )
                    .col(
                        integer(Course::Sem)
                            .check(Expr::col(Course::Sem).gte(1))
                            .check(Expr::col(Course::Sem).lte(8)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-course-degree_id")
                            .from(Course::Table, Course::DegreeId)
                            .to(Degree::Table, Degree::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FacultyCourse::Table)
                    .if_not_exists()
                    .col(string_len(FacultyCourse::FacultyId, 64))
                    .col(string_len(FacultyCourse::CourseId, 64))
                    .primary_key(
                        Index::create()
                            .col(FacultyCourse::FacultyId)
                            .col(FacultyCourse::CourseId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-faculty_course-faculty_id")
                            .from(FacultyCourse::Table, FacultyCourse::FacultyId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-faculty_course-course_id")
                            .from(FacultyCourse::Table, FacultyCourse::CourseId)
                            .to(Course::Table, Course::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Enrollment::Table)
                    .if_not_exists()
                    .col(pk_auto(Enrollment::Id))
                    .col(string_len(Enrollment::StudentId, 64))
                    .col(string_len(Enrollment::CourseId, 64))
                    .col(string_len(Enrollment::FacultyId, 64))
                    .col(
                        integer(Enrollment::Sem)
                            .check(Expr::col(Enrollment::Sem).gte(1))
                            .check(Expr::col(Enrollment::Sem).lte(8)),
                    )
                    .col(string_len(Enrollment::Status, 16).check(
                        Expr::col(Enrollment::Status).is_in(["enrolled", "backlog", "completed"]),
                    ))
                    .col(double_null(Enrollment::Grade))
                    // enrolled: no grade; backlog: 0.0; completed: (0.0, 4.0]
                    .check(
                        Expr::col(Enrollment::Status)
                            .eq("enrolled")
                            .and(Expr::col(Enrollment::Grade).is_null())
                            .or(Expr::col(Enrollment::Status)
                                .eq("backlog")
                                .and(Expr::col(Enrollment::Grade).eq(0.0)))
                            .or(Expr::col(Enrollment::Status)
                                .eq("completed")
                                .and(Expr::col(Enrollment::Grade).gt(0.0))
                                .and(Expr::col(Enrollment::Grade).lte(4.0))),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-enrollment-student_id")
                            .from(Enrollment::Table, Enrollment::StudentId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-enrollment-course_id")
                            .from(Enrollment::Table, Enrollment::CourseId)
                            .to(Course::Table, Course::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-enrollment-faculty_id")
                            .from(Enrollment::Table, Enrollment::FacultyId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_course_degree_id_sem")
                    .table(Course::Table)
                    .col(Course::DegreeId)
                    .col(Course::Sem)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enrollment_student_id")
                    .table(Enrollment::Table)
                    .col(Enrollment::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enrollment_course_id_status")
                    .table(Enrollment::Table)
                    .col(Enrollment::CourseId)
                    .col(Enrollment::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enrollment_faculty_id_status")
                    .table(Enrollment::Table)
                    .col(Enrollment::FacultyId)
                    .col(Enrollment::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Enrollment::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(FacultyCourse::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Course::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Degree::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
    Role,
    Name,
    Email,
    PasswordHash,
    Department,
    Year,
    Designation,
    PhotoUrl,
    DegreeId,
}

#[derive(DeriveIden)]
enum Degree {
    Table,
    Id,
    Code,
    DegreeType,
    Name,
}

#[derive(DeriveIden)]
enum Course {
    Table,
    Id,
    DegreeId,
    Code,
    Name,
    Credits,
    Capacity,
    Year,
    Sem,
}

#[derive(DeriveIden)]
enum FacultyCourse {
    Table,
    FacultyId,
    CourseId,
}

#[derive(DeriveIden)]
enum Enrollment {
    Table,
    Id,
    StudentId,
    CourseId,
    FacultyId,
    Sem,
    Status,
    Grade,
}
