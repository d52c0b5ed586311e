mod common;

use std::sync::Arc;

use common::{create_users, stores, user};
use filmorate_store::core::FriendshipOutcome;
use filmorate_store::infrastructure::SqliteDatabase;
use filmorate_store::models::User;
use filmorate_store::{AppError, Repositories};

fn ids(users: Vec<User>) -> Vec<i64> {
    users.into_iter().filter_map(|u| u.id).collect()
}

#[tokio::test]
async fn test_user_round_trip_and_order() {
    for (backend, repos) in stores().await {
        let first = repos.users.create(user("alice")).await.unwrap();
        let second = repos.users.create(user("bob")).await.unwrap();
        assert!(first.id < second.id, "{}", backend);

        let found = repos.users.get(first.id.unwrap()).await.unwrap();
        assert_eq!(found, first);
        assert_eq!(found.login, "alice");
        assert_eq!(found.name, "ALICE");
        assert!(found.friends.is_empty());

        let all = ids(repos.users.find_all().await.unwrap());
        assert_eq!(all, vec![first.id.unwrap(), second.id.unwrap()], "{}", backend);
    }
}

#[tokio::test]
async fn test_reciprocal_requests_confirm_friendship() {
    for (backend, repos) in stores().await {
        let u = create_users(&repos, 2).await;

        let outcome = repos.users.request_friend(u[0], u[1]).await.unwrap();
        assert_eq!(outcome, FriendshipOutcome::Requested, "{}", backend);
        assert!(repos.users.list_friends(u[0]).await.unwrap().is_empty());
        assert!(repos.users.list_friends(u[1]).await.unwrap().is_empty());

        let outcome = repos.users.request_friend(u[1], u[0]).await.unwrap();
        assert_eq!(outcome, FriendshipOutcome::Confirmed, "{}", backend);
        assert_eq!(ids(repos.users.list_friends(u[0]).await.unwrap()), vec![u[1]]);
        assert_eq!(ids(repos.users.list_friends(u[1]).await.unwrap()), vec![u[0]]);

        // requester sees the pending edge in its collection, the target does not
        let first = repos.users.get(u[0]).await.unwrap();
        let second = repos.users.get(u[1]).await.unwrap();
        assert!(first.friends.contains(&u[1]), "{}", backend);
        assert!(second.friends.contains(&u[0]), "{}", backend);
    }
}

#[tokio::test]
async fn test_confirmation_keeps_a_single_edge() {
    let db = Arc::new(SqliteDatabase::new_in_memory().await.unwrap());
    let repos = Repositories::new(db.clone());
    let u = create_users(&repos, 2).await;

    repos.users.request_friend(u[0], u[1]).await.unwrap();
    repos.users.request_friend(u[1], u[0]).await.unwrap();

    let rows: Vec<(i64, i64, String)> =
        sqlx::query_as("SELECT user_id, friend_id, status FROM friendships")
            .fetch_all(db.pool())
            .await
            .unwrap();
    assert_eq!(rows, vec![(u[0], u[1], "CONFIRMED".to_string())]);
}

#[tokio::test]
async fn test_pending_request_collection_views() {
    for (backend, repos) in stores().await {
        let u = create_users(&repos, 2).await;
        repos.users.request_friend(u[0], u[1]).await.unwrap();

        let requester = repos.users.get(u[0]).await.unwrap();
        let target = repos.users.get(u[1]).await.unwrap();
        assert!(requester.friends.contains(&u[1]), "{}", backend);
        assert!(target.friends.is_empty(), "{}", backend);
    }
}

#[tokio::test]
async fn test_repeated_requests_change_nothing() {
    for (backend, repos) in stores().await {
        let u = create_users(&repos, 2).await;
        repos.users.request_friend(u[0], u[1]).await.unwrap();
        let again = repos.users.request_friend(u[0], u[1]).await.unwrap();
        assert_eq!(again, FriendshipOutcome::Unchanged, "{}", backend);

        repos.users.request_friend(u[1], u[0]).await.unwrap();
        assert_eq!(
            repos.users.request_friend(u[1], u[0]).await.unwrap(),
            FriendshipOutcome::Unchanged
        );
        assert_eq!(
            repos.users.request_friend(u[0], u[1]).await.unwrap(),
            FriendshipOutcome::Unchanged
        );
    }
}

#[tokio::test]
async fn test_remove_pending_request() {
    for (backend, repos) in stores().await {
        let u = create_users(&repos, 2).await;
        repos.users.request_friend(u[0], u[1]).await.unwrap();

        assert!(repos.users.remove_friend(u[1], u[0]).await.unwrap(), "{}", backend);
        assert!(repos.users.list_friends(u[0]).await.unwrap().is_empty());
        assert!(repos.users.list_friends(u[1]).await.unwrap().is_empty());
        assert!(repos.users.get(u[0]).await.unwrap().friends.is_empty());
        assert!(!repos.users.remove_friend(u[0], u[1]).await.unwrap());

        // the pair starts over from scratch
        assert_eq!(
            repos.users.request_friend(u[1], u[0]).await.unwrap(),
            FriendshipOutcome::Requested
        );
    }
}

#[tokio::test]
async fn test_remove_confirmed_friendship_from_either_side() {
    for (backend, repos) in stores().await {
        let u = create_users(&repos, 2).await;
        repos.users.request_friend(u[0], u[1]).await.unwrap();
        repos.users.request_friend(u[1], u[0]).await.unwrap();

        assert!(repos.users.remove_friend(u[1], u[0]).await.unwrap());
        assert!(repos.users.list_friends(u[0]).await.unwrap().is_empty(), "{}", backend);
        assert!(repos.users.list_friends(u[1]).await.unwrap().is_empty(), "{}", backend);
    }
}

#[tokio::test]
async fn test_friendship_rejects_bad_ids() {
    for (backend, repos) in stores().await {
        let u = create_users(&repos, 1).await;

        let err = repos.users.request_friend(u[0], u[0]).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)), "{}", backend);

        let err = repos.users.request_friend(u[0], 999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "{}", backend);
        let err = repos.users.remove_friend(999, u[0]).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "{}", backend);
        let err = repos.users.list_friends(999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "{}", backend);
        let err = repos.users.list_mutual_friends(u[0], 999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "{}", backend);
    }
}

#[tokio::test]
async fn test_friend_lists_are_sorted_and_mutual_friends_intersect() {
    for (backend, repos) in stores().await {
        let u = create_users(&repos, 5).await;
        let befriend = |a: i64, b: i64| {
            let repos = repos.clone();
            async move {
                repos.users.request_friend(a, b).await.unwrap();
                repos.users.request_friend(b, a).await.unwrap();
            }
        };
        befriend(u[0], u[4]).await;
        befriend(u[2], u[0]).await;
        befriend(u[1], u[2]).await;
        befriend(u[0], u[3]).await;
        // pending only, never counted
        repos.users.request_friend(u[1], u[3]).await.unwrap();

        assert_eq!(
            ids(repos.users.list_friends(u[0]).await.unwrap()),
            vec![u[2], u[3], u[4]],
            "{}",
            backend
        );
        assert_eq!(
            ids(repos.users.list_mutual_friends(u[0], u[1]).await.unwrap()),
            vec![u[2]],
            "{}",
            backend
        );
        assert!(repos
            .users
            .list_mutual_friends(u[3], u[4])
            .await
            .unwrap()
            .iter()
            .all(|f| f.id == Some(u[0])));
    }
}

#[tokio::test]
async fn test_update_keeps_confirmed_friendships() {
    for (backend, repos) in stores().await {
        let u = create_users(&repos, 2).await;
        repos.users.request_friend(u[0], u[1]).await.unwrap();
        repos.users.request_friend(u[1], u[0]).await.unwrap();

        let mut first = repos.users.get(u[0]).await.unwrap();
        first.email = "changed@example.com".to_string();
        let updated = repos.users.update(u[0], first.clone()).await.unwrap();
        assert_eq!(updated.email, "changed@example.com");
        assert_eq!(ids(repos.users.list_friends(u[0]).await.unwrap()), vec![u[1]], "{}", backend);

        // same from the target's side, whose collection shows the incoming edge
        let second = repos.users.get(u[1]).await.unwrap();
        repos.users.update(u[1], second).await.unwrap();
        assert_eq!(ids(repos.users.list_friends(u[1]).await.unwrap()), vec![u[0]], "{}", backend);
    }
}

#[tokio::test]
async fn test_update_friends_creates_and_accepts_requests() {
    for (backend, repos) in stores().await {
        let u = create_users(&repos, 3).await;
        // u1 has a pending request towards u0
        repos.users.request_friend(u[1], u[0]).await.unwrap();

        let mut first = repos.users.get(u[0]).await.unwrap();
        first.friends = [u[1], u[2]].into_iter().collect();
        let updated = repos.users.update(u[0], first).await.unwrap();
        assert_eq!(
            updated.friends.iter().copied().collect::<Vec<_>>(),
            vec![u[1], u[2]],
            "{}",
            backend
        );

        // accepted u1's request, only asked u2
        assert_eq!(ids(repos.users.list_friends(u[0]).await.unwrap()), vec![u[1]], "{}", backend);
        assert!(repos.users.get(u[2]).await.unwrap().friends.is_empty());
        assert_eq!(
            repos.users.request_friend(u[2], u[0]).await.unwrap(),
            FriendshipOutcome::Confirmed
        );
    }
}

#[tokio::test]
async fn test_update_with_empty_friends_drops_outgoing_edges() {
    for (backend, repos) in stores().await {
        let u = create_users(&repos, 3).await;
        repos.users.request_friend(u[0], u[1]).await.unwrap();
        repos.users.request_friend(u[2], u[0]).await.unwrap();
        repos.users.request_friend(u[0], u[2]).await.unwrap();

        let mut first = repos.users.get(u[0]).await.unwrap();
        first.friends.clear();
        let updated = repos.users.update(u[0], first).await.unwrap();

        // the incoming confirmed edge from u2 is untouched
        assert_eq!(
            updated.friends.into_iter().collect::<Vec<_>>(),
            vec![u[2]],
            "{}",
            backend
        );
        assert_eq!(
            repos.users.request_friend(u[0], u[1]).await.unwrap(),
            FriendshipOutcome::Requested
        );
    }
}

#[tokio::test]
async fn test_update_with_unknown_friend_rolls_back() {
    for (backend, repos) in stores().await {
        let u = create_users(&repos, 1).await;
        let mut changed = repos.users.get(u[0]).await.unwrap();
        changed.login = "renamed".to_string();
        changed.friends = [999].into_iter().collect();

        let err = repos.users.update(u[0], changed).await.unwrap_err();
        assert!(matches!(err, AppError::IntegrityViolation(_)), "{}: {}", backend, err);
        assert_eq!(repos.users.get(u[0]).await.unwrap().login, "user0", "{}", backend);
    }
}

#[tokio::test]
async fn test_update_unknown_user_is_not_found() {
    for (backend, repos) in stores().await {
        let err = repos.users.update(3, user("ghost")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "{}", backend);
    }
}

#[tokio::test]
async fn test_create_user_with_taken_id_conflicts() {
    for (backend, repos) in stores().await {
        let u = create_users(&repos, 1).await;
        let mut duplicate = user("dup");
        duplicate.id = Some(u[0]);
        let err = repos.users.create(duplicate).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)), "{}", backend);
    }
}

#[tokio::test]
async fn test_deleting_user_removes_friendships() {
    for (backend, repos) in stores().await {
        let u = create_users(&repos, 3).await;
        repos.users.request_friend(u[0], u[1]).await.unwrap();
        repos.users.request_friend(u[1], u[0]).await.unwrap();
        repos.users.request_friend(u[1], u[2]).await.unwrap();

        assert!(repos.users.delete(u[1]).await.unwrap());
        assert!(repos.users.list_friends(u[0]).await.unwrap().is_empty(), "{}", backend);
        assert!(repos.users.get(u[0]).await.unwrap().friends.is_empty(), "{}", backend);
        assert!(!repos.users.delete(u[1]).await.unwrap());
    }
}
