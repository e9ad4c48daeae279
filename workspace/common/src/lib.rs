//! Common types shared between the backoffice binary and its library crates.
//! Nothing in here touches the database; entities live in `model`.

mod birthday;
mod gravatar;
mod pagination;
mod password;

pub use birthday::{BirthdayError, normalize_birthday};
pub use gravatar::gravatar_url;
pub use pagination::{Page, PageRequest, DEFAULT_PER_PAGE, MAX_PER_PAGE};
pub use password::{PasswordError, hash_password, verify_password};
