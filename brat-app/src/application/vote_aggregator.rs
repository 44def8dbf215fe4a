//! Vote counting, ranking and the per-(voter, creation) vote state machine.
//!
//! Everything here is pure: the caller passes the current creation and vote
//! snapshots plus the viewer, and decides what to do with the result.

use crate::domain::{Creation, Orientation, Viewer, Vote, VoteChange, VoteTally};
use brat_errors::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

pub fn tally(creation_id: Uuid, votes: &[Vote], viewer: &Viewer) -> VoteTally {
    let mut result = VoteTally::default();
    for vote in votes.iter().filter(|v| v.brat_creation_id == creation_id) {
        match vote.orientation {
            Orientation::Upvote => result.upvotes += 1,
            Orientation::Downvote => result.downvotes += 1,
        }
        if result.user_orientation.is_none() && viewer.id() == Some(vote.created_user_id.as_str()) {
            result.user_orientation = Some(vote.orientation);
        }
    }
    result
}

pub fn score(creation_id: Uuid, votes: &[Vote]) -> i64 {
    tally(creation_id, votes, &Viewer::anonymous()).score()
}

/// Newest first. Equal timestamps keep their input order.
pub fn order_by_recency(creations: &[Creation]) -> Vec<Creation> {
    let mut ordered = creations.to_vec();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    ordered
}

/// Highest score first. Equal scores keep their input order.
pub fn order_by_score(creations: &[Creation], votes: &[Vote]) -> Vec<Creation> {
    let mut scores: HashMap<Uuid, i64> = HashMap::new();
    for vote in votes {
        let delta = match vote.orientation {
            Orientation::Upvote => 1,
            Orientation::Downvote => -1,
        };
        *scores.entry(vote.brat_creation_id).or_insert(0) += delta;
    }

    let mut ordered = creations.to_vec();
    ordered.sort_by_key(|c| std::cmp::Reverse(scores.get(&c.id).copied().unwrap_or(0)));
    ordered
}

/// Decides what a vote request does to the collection.
///
/// No vote yet creates one, the same orientation again removes it, and the
/// opposite orientation flips the existing record (keeping its `created_at`).
/// The creation id is not checked against existing creations.
pub fn apply_vote(
    votes: &[Vote],
    viewer: &Viewer,
    creation_id: Uuid,
    orientation: Orientation,
    now: i64,
) -> Result<VoteChange, AppError> {
    let voter = viewer.id().ok_or(AppError::AuthRequired)?;

    let existing = votes
        .iter()
        .find(|v| v.brat_creation_id == creation_id && v.created_user_id == voter);

    let change = match existing {
        None => VoteChange::Created(Vote::new(voter.to_string(), creation_id, orientation, now)),
        Some(vote) if vote.orientation == orientation => VoteChange::Deleted(vote.clone()),
        Some(vote) => VoteChange::Updated(Vote {
            orientation,
            ..vote.clone()
        }),
    };
    Ok(change)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedView {
    #[default]
    Recent,
    Top,
}

impl FromStr for FeedView {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent" => Ok(Self::Recent),
            "top" => Ok(Self::Top),
            other => Err(AppError::InvalidInput(format!("unknown view '{}'", other))),
        }
    }
}

/// A creation ready for display in a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCreation {
    pub position: usize,
    pub creation: Creation,
    pub tally: VoteTally,
    pub score: i64,
    pub remix_path: String,
}

pub fn rank(
    view: FeedView,
    creations: &[Creation],
    votes: &[Vote],
    viewer: &Viewer,
) -> Vec<RankedCreation> {
    let ordered = match view {
        FeedView::Recent => order_by_recency(creations),
        FeedView::Top => order_by_score(creations, votes),
    };

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, creation)| {
            let tally = tally(creation.id, votes, viewer);
            RankedCreation {
                position: i + 1,
                remix_path: creation.remix_path(),
                score: tally.score(),
                tally,
                creation,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn creation(n: u128, created_at: i64) -> Creation {
        Creation {
            id: id(n),
            text: format!("creation {}", n),
            preset: "brat".to_string(),
            created_at,
            created_by: "author".to_string(),
        }
    }

    fn vote(voter: &str, target: u128, orientation: Orientation) -> Vote {
        Vote::new(voter.to_string(), id(target), orientation, 0)
    }

    fn ids(creations: &[Creation]) -> Vec<Uuid> {
        creations.iter().map(|c| c.id).collect()
    }

    fn sample_votes() -> Vec<Vote> {
        vec![
            vote("a", 1, Orientation::Upvote),
            vote("b", 1, Orientation::Upvote),
            vote("a", 2, Orientation::Downvote),
        ]
    }

    #[test]
    fn test_tally_counts_per_creation() {
        let votes = sample_votes();
        let t = tally(id(1), &votes, &Viewer::anonymous());
        assert_eq!((t.upvotes, t.downvotes), (2, 0));
        assert_eq!(t.user_orientation, None);

        let t = tally(id(2), &votes, &Viewer::signed_in("a"));
        assert_eq!((t.upvotes, t.downvotes), (0, 1));
        assert_eq!(t.user_orientation, Some(Orientation::Downvote));
    }

    #[test]
    fn test_tally_empty_collection() {
        let t = tally(id(9), &[], &Viewer::signed_in("a"));
        assert_eq!(t, VoteTally::default());
    }

    #[test]
    fn test_viewer_who_did_not_vote_has_no_orientation() {
        let t = tally(id(1), &sample_votes(), &Viewer::signed_in("c"));
        assert_eq!(t.user_orientation, None);
    }

    #[test]
    fn test_scores() {
        let votes = sample_votes();
        assert_eq!(score(id(1), &votes), 2);
        assert_eq!(score(id(2), &votes), -1);
        assert_eq!(score(id(3), &votes), 0);
    }

    #[test]
    fn test_order_by_recency_newest_first() {
        let creations = vec![creation(1, 100), creation(2, 200)];
        assert_eq!(ids(&order_by_recency(&creations)), vec![id(2), id(1)]);
    }

    #[test]
    fn test_order_by_recency_is_stable() {
        let creations = vec![
            creation(1, 100),
            creation(2, 300),
            creation(3, 100),
            creation(4, 100),
        ];
        assert_eq!(
            ids(&order_by_recency(&creations)),
            vec![id(2), id(1), id(3), id(4)]
        );
    }

    #[test]
    fn test_order_by_score() {
        let votes = sample_votes();
        let creations = vec![creation(1, 100), creation(2, 200)];
        assert_eq!(ids(&order_by_score(&creations, &votes)), vec![id(1), id(2)]);

        let reversed = vec![creation(2, 200), creation(1, 100)];
        assert_eq!(ids(&order_by_score(&reversed, &votes)), vec![id(1), id(2)]);
    }

    #[test]
    fn test_order_by_score_ties_keep_input_order() {
        let votes = vec![vote("a", 3, Orientation::Upvote)];
        let creations = vec![creation(1, 1), creation(2, 2), creation(3, 3), creation(4, 4)];
        assert_eq!(
            ids(&order_by_score(&creations, &votes)),
            vec![id(3), id(1), id(2), id(4)]
        );
    }

    #[test]
    fn test_first_vote_creates_record() {
        let change = apply_vote(&[], &Viewer::signed_in("a"), id(1), Orientation::Upvote, 500).unwrap();
        let VoteChange::Created(v) = &change else {
            panic!("expected Created, got {:?}", change);
        };
        assert_eq!(v.created_user_id, "a");
        assert_eq!(v.brat_creation_id, id(1));
        assert_eq!(v.created_at, 500);
        assert_eq!(change.apply(Vec::new()).len(), 1);
    }

    #[test]
    fn test_same_vote_twice_toggles_off() {
        let viewer = Viewer::signed_in("a");
        let first = apply_vote(&[], &viewer, id(1), Orientation::Upvote, 1).unwrap();
        let votes = first.apply(Vec::new());

        let second = apply_vote(&votes, &viewer, id(1), Orientation::Upvote, 2).unwrap();
        assert!(matches!(second, VoteChange::Deleted(_)));
        let votes = second.apply(votes);
        assert!(votes
            .iter()
            .all(|v| !(v.created_user_id == "a" && v.brat_creation_id == id(1))));
    }

    #[test]
    fn test_opposite_vote_flips_in_place() {
        let viewer = Viewer::signed_in("u");
        let votes = apply_vote(&[], &viewer, id(7), Orientation::Upvote, 10)
            .unwrap()
            .apply(Vec::new());
        let original_id = votes[0].id;

        let flip = apply_vote(&votes, &viewer, id(7), Orientation::Downvote, 20).unwrap();
        assert!(matches!(flip, VoteChange::Updated(_)));
        let votes = flip.apply(votes);

        let mine: Vec<_> = votes
            .iter()
            .filter(|v| v.created_user_id == "u" && v.brat_creation_id == id(7))
            .collect();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].orientation, Orientation::Downvote);
        assert_eq!(mine[0].id, original_id);
        assert_eq!(mine[0].created_at, 10);
    }

    #[test]
    fn test_votes_of_other_users_untouched() {
        let votes = sample_votes();
        let change = apply_vote(&votes, &Viewer::signed_in("b"), id(1), Orientation::Upvote, 3).unwrap();
        let after = change.apply(votes.clone());
        assert_eq!(after.len(), 2);
        assert!(after.contains(&votes[0]));
        assert!(after.contains(&votes[2]));
    }

    #[test]
    fn test_anonymous_vote_is_rejected() {
        let votes = sample_votes();
        let result = apply_vote(&votes, &Viewer::anonymous(), id(1), Orientation::Upvote, 0);
        assert_eq!(result, Err(AppError::AuthRequired));
    }

    #[test]
    fn test_dangling_creation_id_is_accepted() {
        let change = apply_vote(&[], &Viewer::signed_in("a"), id(404), Orientation::Downvote, 0).unwrap();
        assert_eq!(change.vote().brat_creation_id, id(404));
    }

    #[test]
    fn test_rank_top_view() {
        let votes = sample_votes();
        let creations = vec![creation(2, 200), creation(1, 100)];
        let rows = rank(FeedView::Top, &creations, &votes, &Viewer::signed_in("b"));
        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[0].creation.id, id(1));
        assert_eq!(rows[0].score, 2);
        assert_eq!(rows[0].tally.user_orientation, Some(Orientation::Upvote));
        assert_eq!(rows[1].score, -1);
        assert_eq!(rows[1].tally.user_orientation, None);
    }

    #[test]
    fn test_feed_view_parsing() {
        assert_eq!("top".parse::<FeedView>().unwrap(), FeedView::Top);
        assert_eq!(FeedView::default(), FeedView::Recent);
        assert!("best".parse::<FeedView>().is_err());
    }
}
