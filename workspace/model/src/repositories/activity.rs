use async_trait::async_trait;
use common::{Page, PageRequest};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select, SelectTwo, Set,
};
use tracing::{debug, instrument, trace};

use super::search::contains as contains_term;
use crate::entities::{activity, user};

/// An activity row together with the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub activity: activity::Model,
    pub user: Option<user::Model>,
}

/// Data for a new log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub user_id: i32,
    pub description: String,
    pub ip_address: String,
    pub user_agent: String,
}

impl NewActivity {
    pub fn new(user_id: i32, description: impl Into<String>) -> Self {
        Self {
            user_id,
            description: description.into(),
            ip_address: String::new(),
            user_agent: String::new(),
        }
    }

    pub fn with_client(mut self, ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        self.ip_address = ip_address.into();
        self.user_agent = user_agent.into();
        self
    }
}

/// Access to the user activity log.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Appends an entry to the log.
    async fn log(&self, entry: NewActivity) -> Result<activity::Model, DbErr>;

    /// Activity of every user, newest first. The search term matches the
    /// description and the owner's username, email, first and last name.
    async fn paginate_activities(
        &self,
        request: PageRequest,
        search: Option<&str>,
    ) -> Result<Page<ActivityEntry>, DbErr>;

    /// Activity of a single user, newest first. The search term matches the
    /// description only.
    async fn paginate_activities_for_user(
        &self,
        user_id: i32,
        request: PageRequest,
        search: Option<&str>,
    ) -> Result<Page<ActivityEntry>, DbErr>;
}

/// sea-orm backed activity repository.
#[derive(Clone, Debug)]
pub struct DbActivityRepository {
    db: DatabaseConnection,
}

impl DbActivityRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn fetch_page(
        &self,
        query: SelectTwo<activity::Entity, user::Entity>,
        request: PageRequest,
        search: Option<String>,
    ) -> Result<Page<ActivityEntry>, DbErr> {
        let paginator = query
            .order_by_desc(activity::Column::CreatedAt)
            .order_by_desc(activity::Column::Id)
            .paginate(&self.db, request.per_page);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(request.index()).await?;
        debug!(
            "Fetched {} of {} activity rows for page {}",
            rows.len(),
            total,
            request.page
        );

        let entries = rows
            .into_iter()
            .map(|(activity, user)| ActivityEntry { activity, user })
            .collect();

        Ok(Page::new(entries, request, total, search))
    }
}

/// Blank search terms mean "no search".
fn normalize_search(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
}

fn with_user(query: Select<activity::Entity>) -> SelectTwo<activity::Entity, user::Entity> {
    query.find_also_related(user::Entity)
}

#[async_trait]
impl ActivityRepository for DbActivityRepository {
    #[instrument(skip(self))]
    async fn log(&self, entry: NewActivity) -> Result<activity::Model, DbErr> {
        trace!("Appending activity for user {}", entry.user_id);

        activity::ActiveModel {
            user_id: Set(entry.user_id),
            description: Set(entry.description),
            ip_address: Set(entry.ip_address),
            user_agent: Set(entry.user_agent),
            ..Default::default()
        }
        .insert(&self.db)
        .await
    }

    #[instrument(skip(self))]
    async fn paginate_activities(
        &self,
        request: PageRequest,
        search: Option<&str>,
    ) -> Result<Page<ActivityEntry>, DbErr> {
        let search = normalize_search(search);
        let mut query = with_user(activity::Entity::find());

        if let Some(term) = &search {
            query = query.filter(
                Condition::any()
                    .add(activity::Column::Description.like(contains_term(term)))
                    .add(user::Column::Username.like(contains_term(term)))
                    .add(user::Column::Email.like(contains_term(term)))
                    .add(user::Column::FirstName.like(contains_term(term)))
                    .add(user::Column::LastName.like(contains_term(term))),
            );
        }

        self.fetch_page(query, request, search).await
    }

    #[instrument(skip(self))]
    async fn paginate_activities_for_user(
        &self,
        user_id: i32,
        request: PageRequest,
        search: Option<&str>,
    ) -> Result<Page<ActivityEntry>, DbErr> {
        let search = normalize_search(search);
        let mut query = activity::Entity::find().filter(activity::Column::UserId.eq(user_id));

        if let Some(term) = &search {
            query = query.filter(activity::Column::Description.like(contains_term(term)));
        }

        self.fetch_page(with_user(query), request, search).await
    }
}
