use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub role: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub department: String,
    pub year: Option<String>,
    pub designation: Option<String>,
    pub photo_url: Option<String>,
    pub degree_id: Option<String>,
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

impl ActiveModelBehavior for ActiveModel {}
