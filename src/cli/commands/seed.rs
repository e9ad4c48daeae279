use anyhow::Result;
use model::entities::{permission, permission_role, role, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use tracing::{debug, info, trace};

use super::initdb::connect;

pub async fn seed(database_url: &str, email: &str, password: &str) -> Result<()> {
    trace!("Entering seed function");
    info!("Seeding roles, permissions and the administrator account");
    debug!("Database URL: {}", database_url);

    let db = connect(database_url).await?;
    let admin = seed_database(&db, email, password).await?;

    info!("Administrator {} is ready (ID {})", admin.email, admin.id);
    Ok(())
}

/// Create the default roles and permissions and an active administrator.
///
/// Running it again updates the existing rows instead of duplicating them.
pub async fn seed_database(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<user::Model> {
    let admin_role = find_or_create_role(db, role::ADMIN, "System administrator.").await?;
    find_or_create_role(db, role::USER, "Default system user.").await?;

    for (name, display_name) in permission::ALL {
        let granted = find_or_create_permission(db, name, display_name).await?;
        let attached = permission_role::Entity::find_by_id((granted.id, admin_role.id))
            .one(db)
            .await?;
        if attached.is_none() {
            debug!("Granting {} to {}", name, role::ADMIN);
            permission_role::ActiveModel {
                permission_id: Set(granted.id),
                role_id: Set(admin_role.id),
            }
            .insert(db)
            .await?;
        }
    }

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;
    let admin = match existing {
        Some(found) => {
            debug!("Updating existing administrator {}", found.id);
            let mut active: user::ActiveModel = found.into();
            active.password = Set(password.to_string());
            active.status = Set(user::UserStatus::Active);
            active.update(db).await?
        }
        None => {
            user::ActiveModel {
                email: Set(email.to_string()),
                username: Set(Some("admin".to_string())),
                password: Set(password.to_string()),
                first_name: Set(Some("Admin".to_string())),
                status: Set(user::UserStatus::Active),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };

    admin.sync_roles(db, &[admin_role.id]).await?;
    Ok(admin)
}

async fn find_or_create_role<C>(db: &C, name: &str, description: &str) -> Result<role::Model>
where
    C: ConnectionTrait,
{
    if let Some(found) = role::Entity::find()
        .filter(role::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(found);
    }

    debug!("Creating role {}", name);
    Ok(role::ActiveModel {
        name: Set(name.to_string()),
        display_name: Set(Some(name.to_string())),
        description: Set(Some(description.to_string())),
        removable: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

async fn find_or_create_permission<C>(
    db: &C,
    name: &str,
    display_name: &str,
) -> Result<permission::Model>
where
    C: ConnectionTrait,
{
    if let Some(found) = permission::Entity::find()
        .filter(permission::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(found);
    }

    debug!("Creating permission {}", name);
    Ok(permission::ActiveModel {
        name: Set(name.to_string()),
        display_name: Set(Some(display_name.to_string())),
        description: Set(None),
        removable: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await?)
}
