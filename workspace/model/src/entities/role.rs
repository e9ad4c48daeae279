use sea_orm::entity::prelude::*;

use super::{permission, permission_role, role_user, user};

/// Name of the role that receives every permission when seeding.
pub const ADMIN: &str = "Admin";
/// Name of the role assigned to regular users.
pub const USER: &str = "User";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    /// System roles cannot be deleted.
    pub removable: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::role_user::Entity")]
    RoleUser,
    #[sea_orm(has_many = "super::permission_role::Entity")]
    PermissionRole,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        role_user::Relation::User.def()
    }
    fn via() -> Option<RelationDef> {
        Some(role_user::Relation::Role.def().rev())
    }
}

impl Related<permission::Entity> for Entity {
    fn to() -> RelationDef {
        permission_role::Relation::Permission.def()
    }
    fn via() -> Option<RelationDef> {
        Some(permission_role::Relation::Role.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
