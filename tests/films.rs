mod common;

use common::{create_users, film, stores};
use filmorate_store::models::{Genre, Mpa};
use filmorate_store::AppError;

#[tokio::test]
async fn test_create_then_find_round_trips() {
    for (backend, repos) in stores().await {
        let input = film("The Matrix").with_genres([4, 6]);
        let created = repos.films.create(input.clone()).await.unwrap();
        let id = created.id.expect("assigned id");

        let found = repos.films.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found, created, "{}", backend);
        assert_eq!(found.name, input.name);
        assert_eq!(found.description, input.description);
        assert_eq!(found.release_date, input.release_date);
        assert_eq!(found.duration, input.duration);
        assert_eq!(found.mpa, Some(Mpa::new(4, "R")), "{}", backend);
        assert_eq!(
            found.genres,
            vec![Genre::new(4, "Thriller"), Genre::new(6, "Action")]
        );
        assert!(found.likes.is_empty());
    }
}

#[tokio::test]
async fn test_film_without_children_is_still_found() {
    for (backend, repos) in stores().await {
        let mut bare = film("Bare");
        bare.mpa = None;
        let created = repos.films.create(bare).await.unwrap();

        let found = repos.films.get(created.id.unwrap()).await.unwrap();
        assert_eq!(found.mpa, None, "{}", backend);
        assert!(found.genres.is_empty());
        assert!(found.likes.is_empty());
    }
}

#[tokio::test]
async fn test_find_all_on_empty_store() {
    for (backend, repos) in stores().await {
        assert!(repos.films.find_all().await.unwrap().is_empty(), "{}", backend);
        assert!(repos.users.find_all().await.unwrap().is_empty(), "{}", backend);
        assert!(repos.films.top_films(10).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_find_all_follows_creation_order() {
    for (backend, repos) in stores().await {
        for name in ["First", "Second", "Third"] {
            repos.films.create(film(name).with_genres([1, 2])).await.unwrap();
        }
        let names: Vec<_> = repos
            .films
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["First", "Second", "Third"], "{}", backend);
    }
}

#[tokio::test]
async fn test_update_deduplicates_and_sorts_genres() {
    for (backend, repos) in stores().await {
        let id = repos.films.create(film("Heat")).await.unwrap().id.unwrap();

        let updated = repos
            .films
            .update(id, film("Heat").with_genres([2, 1, 2]))
            .await
            .unwrap();
        let ids: Vec<_> = updated.genres.iter().filter_map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 2], "{}", backend);

        let stored = repos.films.get(id).await.unwrap();
        assert_eq!(stored.genres, updated.genres);
    }
}

#[tokio::test]
async fn test_update_is_idempotent() {
    for (backend, repos) in stores().await {
        let users = create_users(&repos, 2).await;
        let id = repos.films.create(film("Alien")).await.unwrap().id.unwrap();

        let mut payload = film("Alien: Director's Cut").with_genres([4, 3]);
        payload.likes = users.iter().copied().collect();

        let once = repos.films.update(id, payload.clone()).await.unwrap();
        let twice = repos.films.update(id, payload).await.unwrap();
        assert_eq!(once, twice, "{}", backend);
        assert_eq!(repos.films.get(id).await.unwrap(), once);
        assert_eq!(once.like_count(), 2);
    }
}

#[tokio::test]
async fn test_update_replaces_associations_wholesale() {
    for (backend, repos) in stores().await {
        let users = create_users(&repos, 2).await;
        let mut initial = film("Up").with_genres([1, 3]);
        initial.likes = users.iter().copied().collect();
        let id = repos.films.create(initial).await.unwrap().id.unwrap();

        let mut cleared = film("Up");
        cleared.mpa = None;
        let updated = repos.films.update(id, cleared).await.unwrap();
        assert!(updated.genres.is_empty(), "{}", backend);
        assert!(updated.likes.is_empty(), "{}", backend);
        assert_eq!(updated.mpa, None);
    }
}

#[tokio::test]
async fn test_unknown_mpa_rolls_back_whole_update() {
    for (backend, repos) in stores().await {
        let id = repos
            .films
            .create(film("Fargo").with_genres([1, 2]))
            .await
            .unwrap()
            .id
            .unwrap();

        let mut bad = film("Renamed").with_mpa(999).with_genres([5]);
        bad.duration = 10;
        let err = repos.films.update(id, bad).await.unwrap_err();
        assert!(matches!(err, AppError::IntegrityViolation(_)), "{}: {}", backend, err);

        let stored = repos.films.get(id).await.unwrap();
        assert_eq!(stored.name, "Fargo", "{}", backend);
        assert_eq!(stored.duration, 136);
        assert_eq!(stored.mpa_id(), Some(4));
        assert_eq!(stored.genre_ids().into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }
}

#[tokio::test]
async fn test_unknown_genre_rolls_back_whole_update() {
    for (backend, repos) in stores().await {
        let id = repos
            .films
            .create(film("Brazil").with_genres([1]))
            .await
            .unwrap()
            .id
            .unwrap();

        let err = repos
            .films
            .update(id, film("Brazil 2").with_genres([2, 999]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IntegrityViolation(_)), "{}: {}", backend, err);

        let stored = repos.films.get(id).await.unwrap();
        assert_eq!(stored.name, "Brazil", "{}", backend);
        assert_eq!(stored.genre_ids().into_iter().collect::<Vec<_>>(), vec![1]);
    }
}

#[tokio::test]
async fn test_failed_create_leaves_nothing_behind() {
    for (backend, repos) in stores().await {
        let err = repos
            .films
            .create(film("Ghost").with_genres([42]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IntegrityViolation(_)), "{}", backend);
        assert!(repos.films.find_all().await.unwrap().is_empty(), "{}", backend);
    }
}

#[tokio::test]
async fn test_update_unknown_film_is_not_found() {
    for (backend, repos) in stores().await {
        let err = repos.films.update(77, film("Nope")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "{}", backend);
        assert!(repos.films.find_by_id(77).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn test_create_with_taken_id_conflicts() {
    for (backend, repos) in stores().await {
        let id = repos.films.create(film("Original")).await.unwrap().id;

        let mut duplicate = film("Duplicate");
        duplicate.id = id;
        let err = repos.films.create(duplicate).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)), "{}", backend);
        assert_eq!(repos.films.find_all().await.unwrap().len(), 1);

        let mut unused = film("Fresh");
        unused.id = Some(500);
        let created = repos.films.create(unused).await.unwrap();
        assert_ne!(created.id, id, "{}", backend);
    }
}

#[tokio::test]
async fn test_delete_reports_whether_a_row_was_removed() {
    for (backend, repos) in stores().await {
        let id = repos.films.create(film("Once")).await.unwrap().id.unwrap();
        assert!(repos.films.delete(id).await.unwrap(), "{}", backend);
        assert!(!repos.films.delete(id).await.unwrap(), "{}", backend);
        assert!(repos.films.find_by_id(id).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn test_likes_are_a_set() {
    for (backend, repos) in stores().await {
        let users = create_users(&repos, 1).await;
        let id = repos.films.create(film("Liked")).await.unwrap().id.unwrap();

        assert!(repos.films.add_like(id, users[0]).await.unwrap());
        assert!(!repos.films.add_like(id, users[0]).await.unwrap(), "{}", backend);
        assert_eq!(repos.films.get(id).await.unwrap().like_count(), 1);

        assert!(repos.films.remove_like(id, users[0]).await.unwrap());
        assert!(!repos.films.remove_like(id, users[0]).await.unwrap());
        assert_eq!(repos.films.get(id).await.unwrap().like_count(), 0);
    }
}

#[tokio::test]
async fn test_like_with_unknown_ids_is_not_found() {
    for (backend, repos) in stores().await {
        let users = create_users(&repos, 1).await;
        let id = repos.films.create(film("Lonely")).await.unwrap().id.unwrap();

        let err = repos.films.add_like(id, 404).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "{}", backend);
        let err = repos.films.add_like(404, users[0]).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "{}", backend);
        let err = repos.films.remove_like(404, users[0]).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "{}", backend);
    }
}

#[tokio::test]
async fn test_top_films_breaks_ties_by_id() {
    for (backend, repos) in stores().await {
        let users = create_users(&repos, 3).await;
        let a = repos.films.create(film("A")).await.unwrap().id.unwrap();
        let b = repos.films.create(film("B")).await.unwrap().id.unwrap();
        let c = repos.films.create(film("C")).await.unwrap().id.unwrap();

        for &user in &users {
            repos.films.add_like(b, user).await.unwrap();
            repos.films.add_like(a, user).await.unwrap();
        }
        repos.films.add_like(c, users[0]).await.unwrap();

        let top: Vec<_> = repos
            .films
            .top_films(2)
            .await
            .unwrap()
            .into_iter()
            .filter_map(|f| f.id)
            .collect();
        assert_eq!(top, vec![a, b], "{}", backend);

        let all = repos.films.top_films(10).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].id, Some(c));

        assert!(repos.films.top_films(0).await.unwrap().is_empty());
        assert!(repos.films.top_films(-5).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_zero_like_films_rank_by_id() {
    for (backend, repos) in stores().await {
        let mut ids = Vec::new();
        for name in ["X", "Y", "Z"] {
            ids.push(repos.films.create(film(name)).await.unwrap().id.unwrap());
        }
        let ranked: Vec<_> = repos
            .films
            .top_films(3)
            .await
            .unwrap()
            .into_iter()
            .filter_map(|f| f.id)
            .collect();
        assert_eq!(ranked, ids, "{}", backend);
    }
}

#[tokio::test]
async fn test_deleting_user_removes_their_likes() {
    for (backend, repos) in stores().await {
        let users = create_users(&repos, 2).await;
        let id = repos.films.create(film("Shared")).await.unwrap().id.unwrap();
        repos.films.add_like(id, users[0]).await.unwrap();
        repos.films.add_like(id, users[1]).await.unwrap();

        assert!(repos.users.delete(users[0]).await.unwrap());
        let stored = repos.films.get(id).await.unwrap();
        assert_eq!(
            stored.likes.into_iter().collect::<Vec<_>>(),
            vec![users[1]],
            "{}",
            backend
        );
    }
}
