//! This file serves as the root for all SeaORM entity modules.
//! Pivot tables (`favorite`, `watch_recent`, `role_user`, `permission_role`)
//! are entities of their own so their extra columns stay reachable.

pub mod activity;
pub mod channel;
pub mod country;
pub mod favorite;
pub mod keyword;
pub mod permission;
pub mod permission_role;
pub mod product;
pub mod role;
pub mod role_user;
pub mod user;
pub mod user_social_network;
pub mod watch_recent;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::activity::Entity as Activity;
    pub use super::channel::Entity as Channel;
    pub use super::country::Entity as Country;
    pub use super::favorite::Entity as Favorite;
    pub use super::keyword::Entity as Keyword;
    pub use super::permission::Entity as Permission;
    pub use super::permission_role::Entity as PermissionRole;
    pub use super::product::Entity as Product;
    pub use super::role::Entity as Role;
    pub use super::role_user::Entity as RoleUser;
    pub use super::user::Entity as User;
    pub use super::user_social_network::Entity as UserSocialNetwork;
    pub use super::watch_recent::Entity as WatchRecent;
}
