pub use super::locations::Entity as Locations;
pub use super::play_recommendations::Entity as PlayRecommendations;
pub use super::users::Entity as Users;
