use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "choices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_type = "Text")]
    pub content: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::correct_answers::Entity")]
    CorrectAnswers,
}

impl Related<super::correct_answers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CorrectAnswers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
