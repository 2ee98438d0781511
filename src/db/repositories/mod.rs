pub mod location;
pub mod recommendation;
pub mod user;
