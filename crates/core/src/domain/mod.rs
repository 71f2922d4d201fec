pub mod allocation;
pub mod glide_path;
pub mod mortality;
pub mod person;
pub mod questionnaire;
pub mod recommendation;
pub mod universe;
