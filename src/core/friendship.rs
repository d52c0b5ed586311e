// Friendship state machine: request -> confirm over directed edges.
// Storage variants read the two possible edges for a pair, ask `plan_request`
// what to do, and apply the answer inside their own write scope.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Friendship, FriendshipStatus, UserId};

/// What a storage variant must do for `request_friend(a, b)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendshipAction {
    /// Flip the reverse edge `(b, a)` to CONFIRMED
    ConfirmReverse,
    /// Insert `(a, b)` as UNCONFIRMED
    CreatePending,
    NoChange,
}

/// Reported back to callers of `request_friend`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipOutcome {
    Requested,
    Confirmed,
    Unchanged,
}

impl From<FriendshipAction> for FriendshipOutcome {
    fn from(action: FriendshipAction) -> Self {
        match action {
            FriendshipAction::ConfirmReverse => FriendshipOutcome::Confirmed,
            FriendshipAction::CreatePending => FriendshipOutcome::Requested,
            FriendshipAction::NoChange => FriendshipOutcome::Unchanged,
        }
    }
}

/// `forward` is the status of edge `(a, b)`, `reverse` of `(b, a)`.
///
/// A pending reverse request is confirmed in place. A new pending edge is
/// only created when the pair has no edge in either direction, so a pair is
/// never represented by two rows.
pub fn plan_request(
    forward: Option<FriendshipStatus>,
    reverse: Option<FriendshipStatus>,
) -> FriendshipAction {
    match (forward, reverse) {
        (_, Some(FriendshipStatus::Unconfirmed)) => FriendshipAction::ConfirmReverse,
        (None, None) => FriendshipAction::CreatePending,
        _ => FriendshipAction::NoChange,
    }
}

/// How a wholesale update of a user's friend collection maps onto edges
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingPlan {
    /// Full replacement set of outgoing edges `(user, x)`
    pub outgoing: BTreeSet<UserId>,
    /// Outgoing edges that were CONFIRMED before and stay so
    pub keep_confirmed: BTreeSet<UserId>,
    /// Pending incoming requests `(x, user)` the update accepts
    pub confirm_incoming: BTreeSet<UserId>,
}

/// Plan the replace-all of `user`'s outgoing edges.
///
/// Ids already linked by an incoming edge stay on that edge: a pending one is
/// confirmed (the user asked back), a confirmed one is left alone. Incoming
/// edges missing from `desired` are not touched; `remove_friend` handles those.
pub fn plan_outgoing(
    user: UserId,
    desired: &BTreeSet<UserId>,
    outgoing_confirmed: &BTreeSet<UserId>,
    incoming: &BTreeMap<UserId, FriendshipStatus>,
) -> OutgoingPlan {
    let mut plan = OutgoingPlan::default();
    for &other in desired.iter().filter(|&&other| other != user) {
        match incoming.get(&other) {
            Some(FriendshipStatus::Unconfirmed) => {
                plan.confirm_incoming.insert(other);
            }
            Some(FriendshipStatus::Confirmed) => {}
            None => {
                plan.outgoing.insert(other);
                if outgoing_confirmed.contains(&other) {
                    plan.keep_confirmed.insert(other);
                }
            }
        }
    }
    plan
}

/// Ids connected to `user` by a CONFIRMED edge in either direction
pub fn confirmed_friends<'a, I>(edges: I, user: UserId) -> BTreeSet<UserId>
where
    I: IntoIterator<Item = &'a Friendship>,
{
    edges
        .into_iter()
        .filter(|edge| edge.is_confirmed())
        .filter_map(|edge| edge.other_end(user))
        .collect()
}

/// Ids `user` is linked to from its own side: outgoing edges of any status
/// plus confirmed incoming edges
pub fn linked_from<'a, I>(edges: I, user: UserId) -> BTreeSet<UserId>
where
    I: IntoIterator<Item = &'a Friendship>,
{
    edges
        .into_iter()
        .filter_map(|edge| {
            if edge.user_id == user {
                Some(edge.friend_id)
            } else if edge.friend_id == user && edge.is_confirmed() {
                Some(edge.user_id)
            } else {
                None
            }
        })
        .collect()
}

pub fn mutual_friends(a: &BTreeSet<UserId>, b: &BTreeSet<UserId>) -> BTreeSet<UserId> {
    a.intersection(b).copied().collect()
}
