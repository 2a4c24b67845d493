pub mod create;
pub mod delete;
pub mod send_bulk;
pub mod update_status;

pub use create::{CreateNotificationCommand, CreateNotificationError};
pub use delete::{DeleteNotificationCommand, DeleteNotificationError, DeleteNotificationResponse};
pub use update_status::{
    UpdateNotificationStatusCommand, UpdateNotificationStatusError, UpdateStatusBody,
};
