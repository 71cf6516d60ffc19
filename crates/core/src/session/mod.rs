mod error;

pub mod merge_coordinator;
pub mod session_service;
pub mod ticket_session;

pub use error::SessionError;
