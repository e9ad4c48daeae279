use chrono::{NaiveDateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, Set};

/// Logo shown when a channel has not uploaded one yet.
pub const DEFAULT_LOGO: &str = "assets/img/profile.png";

/// A user's channel. Each user owns at most one.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "channels")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Path of the uploaded logo relative to the public root, empty when unset.
    pub relative_logo_link: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now().naive_utc();
        if insert {
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
            if self.relative_logo_link.is_not_set() {
                self.relative_logo_link = Set(String::new());
            }
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}

impl Model {
    pub fn has_logo(&self) -> bool {
        !self.relative_logo_link.trim().is_empty()
    }

    /// Logo path to render, falling back to the placeholder image.
    pub fn logo_path(&self) -> &str {
        if self.has_logo() {
            &self.relative_logo_link
        } else {
            DEFAULT_LOGO
        }
    }
}
