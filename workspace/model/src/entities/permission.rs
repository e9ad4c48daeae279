use sea_orm::entity::prelude::*;

use super::{permission_role, role};

/// View and search the activity log.
pub const USERS_ACTIVITY: &str = "users.activity";
/// Create, edit and delete users.
pub const USERS_MANAGE: &str = "users.manage";
/// Create and edit channels and their logos.
pub const CHANNELS_MANAGE: &str = "channels.manage";
/// Maintain the keyword dictionary.
pub const KEYWORDS_MANAGE: &str = "keywords.manage";

/// Every permission known to the application, with its display name.
pub const ALL: [(&str, &str); 4] = [
    (USERS_MANAGE, "Manage Users"),
    (USERS_ACTIVITY, "View System Activity Log"),
    (CHANNELS_MANAGE, "Manage Channels"),
    (KEYWORDS_MANAGE, "Manage Keywords"),
];

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "permissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub removable: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::permission_role::Entity")]
    PermissionRole,
}

impl Related<role::Entity> for Entity {
    fn to() -> RelationDef {
        permission_role::Relation::Role.def()
    }
    fn via() -> Option<RelationDef> {
        Some(permission_role::Relation::Permission.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
