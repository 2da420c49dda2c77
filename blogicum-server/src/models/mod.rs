//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod slug;
pub mod text;
pub mod user;
pub mod publication;
pub mod image;
pub mod pagination;

pub use validation::ValidationError;
pub use slug::CategorySlug;
pub use text::{Body, Title};
pub use user::{Email, NewPassword, PersonName, Username};
pub use publication::{parse_pub_date, Publication};
pub use image::ImageKind;
pub use pagination::{PageParams, Paginated, Pagination, PAGE_SIZE};
