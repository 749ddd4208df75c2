use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "course")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub degree_id: String,
    pub code: String,
    pub name: String,
    pub credits: i32,
    pub capacity: i32,
    pub year: i32,
    pub sem: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::degree::Entity",
        from = "Column::DegreeId",
        to = "super::degree::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Degree,
    #[sea_orm(has_many = "super::faculty_course::Entity")]
    FacultyCourse,
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollment,
}

impl Related<super::degree::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Degree.def()
    }
}

impl Related<super::faculty_course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FacultyCourse.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
