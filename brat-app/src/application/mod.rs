mod cast_vote;
mod feed;
mod save_creation;
pub mod vote_aggregator;

pub use cast_vote::{CastVote, VoteOutcome};
pub use feed::LoadFeed;
pub use save_creation::SaveCreation;
pub use vote_aggregator::{FeedView, RankedCreation};
