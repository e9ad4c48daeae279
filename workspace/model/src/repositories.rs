//! Query layer on top of the entities. Handlers talk to these traits rather
//! than building activity queries themselves.

pub mod activity;
pub mod search;

pub use activity::{ActivityEntry, ActivityRepository, DbActivityRepository, NewActivity};
