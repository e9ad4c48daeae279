use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create countries table
        manager
            .create_table(
                Table::create()
                    .table(Countries::Table)
                    .if_not_exists()
                    .col(pk_auto(Countries::Id))
                    .col(string(Countries::Name))
                    .col(string_len(Countries::CountryCode, 3))
                    .to_owned(),
            )
            .await?;

        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Email).unique_key())
                    .col(string_null(Users::Username).unique_key())
                    .col(string(Users::Password))
                    .col(string_null(Users::FirstName))
                    .col(string_null(Users::LastName))
                    .col(string_null(Users::Phone))
                    .col(string_null(Users::Avatar))
                    .col(string_null(Users::Address))
                    .col(integer_null(Users::CountryId))
                    .col(date_null(Users::Birthday))
                    .col(date_time_null(Users::LastLogin))
                    .col(string_null(Users::ConfirmationToken))
                    .col(string_len(Users::Status, 20).default("Unconfirmed"))
                    .col(string_null(Users::RememberToken))
                    .col(date_time(Users::CreatedAt))
                    .col(date_time(Users::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_country")
                            .from(Users::Table, Users::CountryId)
                            .to(Countries::Table, Countries::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create user_social_networks table
        manager
            .create_table(
                Table::create()
                    .table(UserSocialNetworks::Table)
                    .if_not_exists()
                    .col(pk_auto(UserSocialNetworks::Id))
                    .col(integer(UserSocialNetworks::UserId).unique_key())
                    .col(string_null(UserSocialNetworks::Facebook))
                    .col(string_null(UserSocialNetworks::Twitter))
                    .col(string_null(UserSocialNetworks::GooglePlus))
                    .col(string_null(UserSocialNetworks::LinkedIn))
                    .col(string_null(UserSocialNetworks::Dribbble))
                    .col(string_null(UserSocialNetworks::Skype))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_social_networks_user")
                            .from(UserSocialNetworks::Table, UserSocialNetworks::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create user_activity table
        manager
            .create_table(
                Table::create()
                    .table(UserActivity::Table)
                    .if_not_exists()
                    .col(pk_auto(UserActivity::Id))
                    .col(integer(UserActivity::UserId))
                    .col(text(UserActivity::Description))
                    .col(string_len(UserActivity::IpAddress, 45))
                    .col(text(UserActivity::UserAgent))
                    .col(date_time(UserActivity::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_activity_user")
                            .from(UserActivity::Table, UserActivity::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_activity_user_created")
                    .table(UserActivity::Table)
                    .col(UserActivity::UserId)
                    .col(UserActivity::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Create products table
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_auto(Products::Id))
                    .col(string(Products::Name))
                    .col(text_null(Products::Description))
                    .col(date_time(Products::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create favorite and watch_recent tables (join tables with timestamps)
        for (table, name) in [
            (Favorite::Table.into_iden(), "favorite"),
            (WatchRecent::Table.into_iden(), "watch_recent"),
        ] {
            manager
                .create_table(
                    Table::create()
                        .table(table.clone())
                        .if_not_exists()
                        .col(integer(ProductPivot::UserId))
                        .col(integer(ProductPivot::ProductId))
                        .col(date_time(ProductPivot::CreatedAt))
                        .col(date_time(ProductPivot::UpdatedAt))
                        .primary_key(
                            Index::create()
                                .name(format!("pk_{}", name))
                                .col(ProductPivot::UserId)
                                .col(ProductPivot::ProductId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name(format!("fk_{}_user", name))
                                .from(table.clone(), ProductPivot::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name(format!("fk_{}_product", name))
                                .from(table.clone(), ProductPivot::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;
        }

        // Create roles table
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(pk_auto(Roles::Id))
                    .col(string(Roles::Name).unique_key())
                    .col(string_null(Roles::DisplayName))
                    .col(string_null(Roles::Description))
                    .col(boolean(Roles::Removable).default(true))
                    .to_owned(),
            )
            .await?;

        // Create role_user table (join table)
        manager
            .create_table(
                Table::create()
                    .table(RoleUser::Table)
                    .if_not_exists()
                    .col(integer(RoleUser::UserId))
                    .col(integer(RoleUser::RoleId))
                    .primary_key(
                        Index::create()
                            .name("pk_role_user")
                            .col(RoleUser::UserId)
                            .col(RoleUser::RoleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_role_user_user")
                            .from(RoleUser::Table, RoleUser::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_role_user_role")
                            .from(RoleUser::Table, RoleUser::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create permissions table
        manager
            .create_table(
                Table::create()
                    .table(Permissions::Table)
                    .if_not_exists()
                    .col(pk_auto(Permissions::Id))
                    .col(string(Permissions::Name).unique_key())
                    .col(string_null(Permissions::DisplayName))
                    .col(string_null(Permissions::Description))
                    .col(boolean(Permissions::Removable).default(true))
                    .to_owned(),
            )
            .await?;

        // Create permission_role table (join table)
        manager
            .create_table(
                Table::create()
                    .table(PermissionRole::Table)
                    .if_not_exists()
                    .col(integer(PermissionRole::PermissionId))
                    .col(integer(PermissionRole::RoleId))
                    .primary_key(
                        Index::create()
                            .name("pk_permission_role")
                            .col(PermissionRole::PermissionId)
                            .col(PermissionRole::RoleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_permission_role_permission")
                            .from(PermissionRole::Table, PermissionRole::PermissionId)
                            .to(Permissions::Table, Permissions::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_permission_role_role")
                            .from(PermissionRole::Table, PermissionRole::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create channels table; the logo column arrives in a later migration
        manager
            .create_table(
                Table::create()
                    .table(Channels::Table)
                    .if_not_exists()
                    .col(pk_auto(Channels::Id))
                    .col(integer(Channels::UserId).unique_key())
                    .col(string(Channels::Name))
                    .col(text_null(Channels::Description))
                    .col(date_time(Channels::CreatedAt))
                    .col(date_time(Channels::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_channels_user")
                            .from(Channels::Table, Channels::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create keyword table; uniqueness arrives in a later migration
        manager
            .create_table(
                Table::create()
                    .table(Keyword::Table)
                    .if_not_exists()
                    .col(pk_auto(Keyword::Id))
                    .col(string(Keyword::Keyword))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to respect foreign key constraints
        manager
            .drop_table(Table::drop().table(Keyword::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Channels::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(PermissionRole::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Permissions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(RoleUser::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(WatchRecent::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Favorite::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(UserActivity::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(UserSocialNetworks::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Countries::Table).to_owned())
            .await?;

        Ok(())
    }
}

// Define identifiers for all tables

#[derive(DeriveIden)]
enum Countries {
    Table,
    Id,
    Name,
    CountryCode,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Username,
    Password,
    FirstName,
    LastName,
    Phone,
    Avatar,
    Address,
    CountryId,
    Birthday,
    LastLogin,
    ConfirmationToken,
    Status,
    RememberToken,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserSocialNetworks {
    Table,
    Id,
    UserId,
    Facebook,
    Twitter,
    GooglePlus,
    LinkedIn,
    Dribbble,
    Skype,
}

#[derive(DeriveIden)]
enum UserActivity {
    Table,
    Id,
    UserId,
    Description,
    IpAddress,
    UserAgent,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Favorite {
    Table,
}

#[derive(DeriveIden)]
enum WatchRecent {
    Table,
}

/// Columns shared by the product pivot tables.
#[derive(DeriveIden)]
enum ProductPivot {
    UserId,
    ProductId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Roles {
    Table,
    Id,
    Name,
    DisplayName,
    Description,
    Removable,
}

#[derive(DeriveIden)]
enum RoleUser {
    Table,
    UserId,
    RoleId,
}

#[derive(DeriveIden)]
enum Permissions {
    Table,
    Id,
    Name,
    DisplayName,
    Description,
    Removable,
}

#[derive(DeriveIden)]
enum PermissionRole {
    Table,
    PermissionId,
    RoleId,
}

#[derive(DeriveIden)]
enum Channels {
    Table,
    Id,
    UserId,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Keyword {
    Table,
    Id,
    Keyword,
}
