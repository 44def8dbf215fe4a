use crate::domain::{Creation, Orientation, Vote, VoteChange};
use brat_errors::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub creations: Vec<Creation>,
    pub votes: Vec<Vote>,
}

/// What a live subscriber currently sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    Loading,
    Failed(AppError),
    Ready(Snapshot),
}

impl QueryState {
    pub fn ready(&self) -> Result<&Snapshot, AppError> {
        match self {
            QueryState::Ready(snapshot) => Ok(snapshot),
            QueryState::Loading => Err(AppError::RemoteUnavailable(
                "still loading".to_string(),
            )),
            QueryState::Failed(e) => Err(e.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    InsertCreation(Creation),
    InsertVote(Vote),
    UpdateVote { id: Uuid, orientation: Orientation },
    DeleteVote { id: Uuid },
}

impl From<&VoteChange> for Mutation {
    fn from(change: &VoteChange) -> Self {
        match change {
            VoteChange::Created(vote) => Mutation::InsertVote(vote.clone()),
            VoteChange::Updated(vote) => Mutation::UpdateVote {
                id: vote.id,
                orientation: vote.orientation,
            },
            VoteChange::Deleted(vote) => Mutation::DeleteVote { id: vote.id },
        }
    }
}

impl Snapshot {
    pub fn apply(&mut self, mutation: &Mutation) -> Result<(), AppError> {
        match mutation {
            Mutation::InsertCreation(creation) => {
                if self.creations.iter().any(|c| c.id == creation.id) {
                    return Err(AppError::InvalidInput(format!(
                        "creation {} already exists",
                        creation.id
                    )));
                }
                self.creations.push(creation.clone());
            }
            Mutation::InsertVote(vote) => {
                if self.votes.iter().any(|v| v.id == vote.id) {
                    return Err(AppError::InvalidInput(format!(
                        "vote {} already exists",
                        vote.id
                    )));
                }
                self.votes.push(vote.clone());
            }
            Mutation::UpdateVote { id, orientation } => {
                let vote = self
                    .votes
                    .iter_mut()
                    .find(|v| v.id == *id)
                    .ok_or(AppError::NotFound)?;
                vote.orientation = *orientation;
            }
            Mutation::DeleteVote { id } => {
                let before = self.votes.len();
                self.votes.retain(|v| v.id != *id);
                if self.votes.len() == before {
                    return Err(AppError::NotFound);
                }
            }
        }
        Ok(())
    }
}
