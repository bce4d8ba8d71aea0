use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tl_id: Uuid,
    pub name: String,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::team_leader::Entity",
        from = "Column::TlId",
        to = "super::team_leader::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    TeamLeader,
}

impl Related<super::team_leader::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamLeader.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
