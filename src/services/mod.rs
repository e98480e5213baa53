pub mod bootstrap;
pub mod providers;
pub mod recommendations;

pub use recommendations::RecommendationService;
