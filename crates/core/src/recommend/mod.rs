pub mod ranker;
pub mod task;

pub use ranker::{rank_universe, Ranker, TOP_N};
pub use task::{RecommendationOutcome, RecommendationTask};
