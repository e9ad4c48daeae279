use chrono::{NaiveDate, NaiveDateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveValue, ConnectionTrait, JoinType, PaginatorTrait, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

use super::{
    activity, channel, country, favorite, permission, permission_role, product, role, role_user,
    user_social_network, watch_recent,
};

/// Account lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum UserStatus {
    /// Registered but the email address has not been confirmed yet.
    #[sea_orm(string_value = "Unconfirmed")]
    Unconfirmed,
    #[sea_orm(string_value = "Active")]
    Active,
    /// Locked out of the system by an administrator.
    #[sea_orm(string_value = "Banned")]
    Banned,
}

/// A person with access to the back office.
///
/// `password` always holds an Argon2id hash: the active model behavior hashes
/// any value assigned to it before the row is written. The `Debug` output
/// leaves out `password` and `remember_token`.
#[derive(Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: Option<String>,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub address: Option<String>,
    pub country_id: Option<i32>,
    pub birthday: Option<NaiveDate>,
    pub last_login: Option<NaiveDateTime>,
    pub confirmation_token: Option<String>,
    pub status: UserStatus,
    pub remember_token: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::country::Entity",
        from = "Column::CountryId",
        to = "super::country::Column::Id",
        on_delete = "SetNull"
    )]
    Country,
    #[sea_orm(has_one = "super::user_social_network::Entity")]
    SocialNetworks,
    #[sea_orm(has_many = "super::activity::Entity")]
    Activity,
    #[sea_orm(has_one = "super::channel::Entity")]
    Channel,
    #[sea_orm(has_many = "super::favorite::Entity")]
    Favorite,
    #[sea_orm(has_many = "super::watch_recent::Entity")]
    WatchRecent,
    #[sea_orm(has_many = "super::role_user::Entity")]
    RoleUser,
}

impl Related<country::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Country.def()
    }
}

impl Related<user_social_network::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SocialNetworks.def()
    }
}

impl Related<activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activity.def()
    }
}

impl Related<channel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Channel.def()
    }
}

impl Related<role::Entity> for Entity {
    fn to() -> RelationDef {
        role_user::Relation::Role.def()
    }
    fn via() -> Option<RelationDef> {
        Some(role_user::Relation::User.def().rev())
    }
}

/// Products the user marked as favorite.
pub struct FavoriteProducts;

impl Linked for FavoriteProducts {
    type FromEntity = Entity;
    type ToEntity = product::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![
            favorite::Relation::User.def().rev(),
            favorite::Relation::Product.def(),
        ]
    }
}

/// Products the user opened recently.
pub struct RecentlyWatchedProducts;

impl Linked for RecentlyWatchedProducts {
    type FromEntity = Entity;
    type ToEntity = product::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![
            watch_recent::Relation::User.def().rev(),
            watch_recent::Relation::Product.def(),
        ]
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        // Any assigned password is treated as raw input.
        if let ActiveValue::Set(raw) = &self.password {
            let hashed = common::hash_password(raw).map_err(|e| DbErr::Custom(e.to_string()))?;
            self.password = Set(hashed);
        }

        let now = Utc::now().naive_utc();
        if insert {
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
            if self.status.is_not_set() {
                self.status = Set(UserStatus::Unconfirmed);
            }
        }
        self.updated_at = Set(now);

        Ok(self)
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("status", &self.status)
            .field("last_login", &self.last_login)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

impl Model {
    pub fn gravatar(&self) -> String {
        common::gravatar_url(&self.email)
    }

    pub fn is_unconfirmed(&self) -> bool {
        self.status == UserStatus::Unconfirmed
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn is_banned(&self) -> bool {
        self.status == UserStatus::Banned
    }

    /// Name shown in listings: "first last", falling back to username, then email.
    pub fn full_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if !parts.is_empty() {
            return parts.join(" ");
        }

        self.username
            .clone()
            .filter(|username| !username.trim().is_empty())
            .unwrap_or_else(|| self.email.clone())
    }

    pub async fn country<C>(&self, db: &C) -> Result<Option<country::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        self.find_related(country::Entity).one(db).await
    }

    pub async fn social_networks<C>(
        &self,
        db: &C,
    ) -> Result<Option<user_social_network::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        self.find_related(user_social_network::Entity).one(db).await
    }

    pub async fn channel<C>(&self, db: &C) -> Result<Option<channel::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        self.find_related(channel::Entity).one(db).await
    }

    /// Activity history, newest first.
    pub async fn activities<C>(&self, db: &C) -> Result<Vec<activity::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        self.find_related(activity::Entity)
            .order_by_desc(activity::Column::CreatedAt)
            .order_by_desc(activity::Column::Id)
            .all(db)
            .await
    }

    pub async fn roles<C>(&self, db: &C) -> Result<Vec<role::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        self.find_related(role::Entity)
            .order_by_asc(role::Column::Id)
            .all(db)
            .await
    }

    pub async fn has_role<C>(&self, db: &C, name: &str) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let count = self
            .find_related(role::Entity)
            .filter(role::Column::Name.eq(name))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    /// Distinct permission names granted through any of the user's roles.
    pub async fn permissions<C>(&self, db: &C) -> Result<Vec<String>, DbErr>
    where
        C: ConnectionTrait,
    {
        permission::Entity::find()
            .select_only()
            .column(permission::Column::Name)
            .distinct()
            .join(JoinType::InnerJoin, permission::Relation::PermissionRole.def())
            .join(JoinType::InnerJoin, permission_role::Relation::Role.def())
            .join(JoinType::InnerJoin, role::Relation::RoleUser.def())
            .filter(role_user::Column::UserId.eq(self.id))
            .order_by_asc(permission::Column::Name)
            .into_tuple::<String>()
            .all(db)
            .await
    }

    pub async fn has_permission<C>(&self, db: &C, name: &str) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let count = permission::Entity::find()
            .join(JoinType::InnerJoin, permission::Relation::PermissionRole.def())
            .join(JoinType::InnerJoin, permission_role::Relation::Role.def())
            .join(JoinType::InnerJoin, role::Relation::RoleUser.def())
            .filter(role_user::Column::UserId.eq(self.id))
            .filter(permission::Column::Name.eq(name))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    /// Replaces the user's role set. Runs in a transaction so a failed insert
    /// leaves the previous roles in place.
    pub async fn sync_roles<C>(&self, db: &C, role_ids: &[i32]) -> Result<(), DbErr>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let mut role_ids = role_ids.to_vec();
        role_ids.sort_unstable();
        role_ids.dedup();

        let txn = db.begin().await?;

        role_user::Entity::delete_many()
            .filter(role_user::Column::UserId.eq(self.id))
            .exec(&txn)
            .await?;

        if !role_ids.is_empty() {
            let rows = role_ids.iter().map(|role_id| role_user::ActiveModel {
                user_id: Set(self.id),
                role_id: Set(*role_id),
            });
            role_user::Entity::insert_many(rows)
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await
    }

    /// Favorite products with their pivot rows, most recently added first.
    pub async fn favorites<C>(
        &self,
        db: &C,
    ) -> Result<Vec<(favorite::Model, product::Model)>, DbErr>
    where
        C: ConnectionTrait,
    {
        let rows = favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(self.id))
            .order_by_desc(favorite::Column::CreatedAt)
            .order_by_desc(favorite::Column::ProductId)
            .find_also_related(product::Entity)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(pivot, product)| product.map(|product| (pivot, product)))
            .collect())
    }

    /// Marks a product as favorite. Returns `false` when it already was one.
    pub async fn add_favorite<C>(&self, db: &C, product_id: i32) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let existing = favorite::Entity::find_by_id((self.id, product_id))
            .one(db)
            .await?;
        if existing.is_some() {
            return Ok(false);
        }

        favorite::ActiveModel {
            user_id: Set(self.id),
            product_id: Set(product_id),
            ..Default::default()
        }
        .insert(db)
        .await?;
        Ok(true)
    }

    /// Returns `false` when the product was not a favorite.
    pub async fn remove_favorite<C>(&self, db: &C, product_id: i32) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = favorite::Entity::delete_by_id((self.id, product_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Recently watched products, newest view first.
    pub async fn recently_watched<C>(
        &self,
        db: &C,
    ) -> Result<Vec<(watch_recent::Model, product::Model)>, DbErr>
    where
        C: ConnectionTrait,
    {
        let rows = watch_recent::Entity::find()
            .filter(watch_recent::Column::UserId.eq(self.id))
            .order_by_desc(watch_recent::Column::UpdatedAt)
            .order_by_desc(watch_recent::Column::ProductId)
            .find_also_related(product::Entity)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(pivot, product)| product.map(|product| (pivot, product)))
            .collect())
    }

    /// Records a product view, touching the pivot when the product was seen before.
    pub async fn record_watch<C>(&self, db: &C, product_id: i32) -> Result<watch_recent::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        match watch_recent::Entity::find_by_id((self.id, product_id))
            .one(db)
            .await?
        {
            Some(existing) => {
                let mut active: watch_recent::ActiveModel = existing.into();
                active.updated_at = Set(Utc::now().naive_utc());
                active.update(db).await
            }
            None => {
                watch_recent::ActiveModel {
                    user_id: Set(self.id),
                    product_id: Set(product_id),
                    ..Default::default()
                }
                .insert(db)
                .await
            }
        }
    }
}
