pub mod send;

pub use send::{SendEmailError, SendEmailResponse};
