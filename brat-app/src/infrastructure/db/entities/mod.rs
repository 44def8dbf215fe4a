pub mod creation;
pub mod vote;

pub use creation::Entity as BratCreation;
pub use vote::Entity as Vote;
