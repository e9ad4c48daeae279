pub use sea_orm_migration::prelude::*;

mod m20160101_000001_create_table;
mod m20160507_053206_add_relative_logo_link_to_channels;
mod m20160521_090605_add_unique_to_keyword;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20160101_000001_create_table::Migration),
            Box::new(m20160507_053206_add_relative_logo_link_to_channels::Migration),
            Box::new(m20160521_090605_add_unique_to_keyword::Migration),
        ]
    }
}
