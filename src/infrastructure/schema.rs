// SQLite schema and reference data. Statements are idempotent so a file-backed
// database can be reopened without losing rows.

pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS mpa (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS genres (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS films (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        release_date TEXT NOT NULL,
        duration INTEGER NOT NULL,
        mpa_id INTEGER REFERENCES mpa(id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL,
        login TEXT NOT NULL,
        name TEXT NOT NULL,
        birthday TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS film_genre (
        film_id INTEGER NOT NULL REFERENCES films(id) ON DELETE CASCADE,
        genre_id INTEGER NOT NULL REFERENCES genres(id) ON DELETE CASCADE,
        PRIMARY KEY (film_id, genre_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS likes (
        film_id INTEGER NOT NULL REFERENCES films(id) ON DELETE CASCADE,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        PRIMARY KEY (film_id, user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS friendships (
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        friend_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        status TEXT NOT NULL DEFAULT 'UNCONFIRMED'
            CHECK (status IN ('UNCONFIRMED', 'CONFIRMED')),
        PRIMARY KEY (user_id, friend_id),
        CHECK (user_id <> friend_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_film_genre_genre ON film_genre(genre_id)",
    "CREATE INDEX IF NOT EXISTS idx_likes_user ON likes(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_friendships_friend ON friendships(friend_id)",
];

pub const SEED_MPA: &[(i64, &str)] = &[
    (1, "G"),
    (2, "PG"),
    (3, "PG-13"),
    (4, "R"),
    (5, "NC-17"),
];

pub const SEED_GENRES: &[(i64, &str)] = &[
    (1, "Comedy"),
    (2, "Drama"),
    (3, "Animation"),
    (4, "Thriller"),
    (5, "Documentary"),
    (6, "Action"),
];

/// Film columns plus one column per child group. Each child group is a
/// separate LEFT JOIN, so a film with g genres and l likes yields g x l rows.
pub const FILM_SELECT: &str = r#"
    SELECT f.id, f.name, f.description, f.release_date, f.duration,
           f.mpa_id, m.name AS mpa_name,
           g.id AS genre_id, g.name AS genre_name,
           l.user_id AS like_user_id
    FROM films AS f
    LEFT JOIN mpa AS m ON f.mpa_id = m.id
    LEFT JOIN film_genre AS fg ON f.id = fg.film_id
    LEFT JOIN genres AS g ON fg.genre_id = g.id
    LEFT JOIN likes AS l ON f.id = l.film_id
"#;

/// User columns joined against the ids the user is linked to from its own
/// side (outgoing edges, plus confirmed incoming edges).
pub const USER_SELECT: &str = r#"
    SELECT u.id, u.email, u.login, u.name, u.birthday, fr.friend_id
    FROM users AS u
    LEFT JOIN (
        SELECT user_id AS owner_id, friend_id FROM friendships
        UNION
        SELECT friend_id AS owner_id, user_id AS friend_id FROM friendships
        WHERE status = 'CONFIRMED'
    ) AS fr ON u.id = fr.owner_id
"#;
