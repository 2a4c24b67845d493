pub mod get;
pub mod list;

pub use get::{GetNotificationError, GetNotificationQuery};
pub use list::ListNotificationsQuery;
