pub mod feedback;
pub mod request;
pub mod team;
pub mod user;
