use super::{permission, role};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "permission_role")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub permission_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub role_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "permission::Entity",
        from = "Column::PermissionId",
        to = "permission::Column::Id",
        on_delete = "Cascade"
    )]
    Permission,
    #[sea_orm(
        belongs_to = "role::Entity",
        from = "Column::RoleId",
        to = "role::Column::Id",
        on_delete = "Cascade"
    )]
    Role,
}

impl Related<permission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Permission.def()
    }
}

impl Related<role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
