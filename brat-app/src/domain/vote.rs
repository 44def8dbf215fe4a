use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Upvote,
    Downvote,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upvote => "upvote",
            Self::Downvote => "downvote",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = brat_errors::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(Self::Upvote),
            "downvote" => Ok(Self::Downvote),
            other => Err(brat_errors::AppError::InvalidInput(format!(
                "unknown orientation '{}'",
                other
            ))),
        }
    }
}

/// One voter's opinion on one creation. At most one per (voter, creation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: uuid::Uuid,
    pub created_user_id: String,
    pub created_at: i64,
    pub brat_creation_id: uuid::Uuid,
    pub orientation: Orientation,
}

impl Vote {
    pub fn new(
        created_user_id: String,
        brat_creation_id: uuid::Uuid,
        orientation: Orientation,
        created_at: i64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            created_user_id,
            created_at,
            brat_creation_id,
            orientation,
        }
    }
}

/// Vote counts for a single creation, as seen by one viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteTally {
    pub upvotes: usize,
    pub downvotes: usize,
    pub user_orientation: Option<Orientation>,
}

impl VoteTally {
    pub fn score(&self) -> i64 {
        self.upvotes as i64 - self.downvotes as i64
    }
}

/// Outcome of a vote request against the current collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VoteChange {
    Created(Vote),
    Updated(Vote),
    Deleted(Vote),
}

impl VoteChange {
    pub fn vote(&self) -> &Vote {
        match self {
            Self::Created(v) | Self::Updated(v) | Self::Deleted(v) => v,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Deleted(_) => "deleted",
        }
    }

    /// Applies the change to a snapshot of the vote collection.
    pub fn apply(&self, mut votes: Vec<Vote>) -> Vec<Vote> {
        match self {
            Self::Created(vote) => votes.push(vote.clone()),
            Self::Updated(vote) => {
                if let Some(existing) = votes.iter_mut().find(|v| v.id == vote.id) {
                    *existing = vote.clone();
                }
            }
            Self::Deleted(vote) => votes.retain(|v| v.id != vote.id),
        }
        votes
    }
}
