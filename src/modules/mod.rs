pub mod donors;
pub mod notifications;
pub mod requests;
