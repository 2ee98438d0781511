pub mod prelude;

pub mod locations;
pub mod play_recommendations;
pub mod users;
