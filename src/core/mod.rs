// Storage-independent reconciliation logic

pub mod folder;
pub mod friendship;
pub mod ranking;

pub use folder::{fold_rows, FoldAggregate, Folded, Folder};
pub use friendship::{plan_outgoing, plan_request, FriendshipAction, FriendshipOutcome, OutgoingPlan};
pub use ranking::top_films;
