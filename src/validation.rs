// Request-body checks run by the HTTP layer before anything reaches a
// repository. Each check fails fast with the first problem found.

use chrono::{NaiveDate, Utc};

use crate::error::{AppError, AppResult};
use crate::models::{Film, Genre, Mpa, User};

pub const MAX_DESCRIPTION_LENGTH: usize = 200;
pub const MAX_GENRE_NAME_LENGTH: usize = 40;
pub const MAX_MPA_NAME_LENGTH: usize = 6;

/// First public film screening; nothing can be released earlier
pub fn earliest_release_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1895, 12, 28).unwrap_or(NaiveDate::MIN)
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::Validation(message.into())
}

pub fn validate_film(film: &Film) -> AppResult<()> {
    if film.name.trim().is_empty() {
        return Err(invalid("Film name must not be blank"));
    }
    if film.description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(invalid(format!(
            "Film description must be at most {} characters",
            MAX_DESCRIPTION_LENGTH
        )));
    }
    if film.release_date < earliest_release_date() {
        return Err(invalid(format!(
            "Release date must not be before {}",
            earliest_release_date()
        )));
    }
    if film.duration <= 0 {
        return Err(invalid("Film duration must be positive"));
    }
    Ok(())
}

pub fn validate_user(user: &User) -> AppResult<()> {
    validate_user_on(user, Utc::now().date_naive())
}

/// Same as `validate_user` with an explicit "today" for the birthday check
pub fn validate_user_on(user: &User, today: NaiveDate) -> AppResult<()> {
    if user.email.trim().is_empty() || !user.email.contains('@') {
        return Err(invalid("Invalid email format"));
    }
    if user.login.trim().is_empty() {
        return Err(invalid("Login must not be blank"));
    }
    if user.login.chars().any(char::is_whitespace) {
        return Err(invalid("Login must not contain spaces"));
    }
    if user.birthday > today {
        return Err(invalid("Birthday must not be in the future"));
    }
    Ok(())
}

/// A blank display name falls back to the login
pub fn normalize_user(mut user: User) -> User {
    if user.name.trim().is_empty() {
        user.name = user.login.clone();
    }
    user
}

pub fn validate_genre(genre: &Genre) -> AppResult<()> {
    validate_catalog_name("Genre", &genre.name, MAX_GENRE_NAME_LENGTH)
}

pub fn validate_mpa(mpa: &Mpa) -> AppResult<()> {
    validate_catalog_name("Mpa", &mpa.name, MAX_MPA_NAME_LENGTH)
}

fn validate_catalog_name(kind: &str, name: &str, max: usize) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(invalid(format!("{} name must not be blank", kind)));
    }
    if name.chars().count() > max {
        return Err(invalid(format!(
            "{} name must be at most {} characters",
            kind, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn film() -> Film {
        Film::new("Nosferatu", "A symphony of horror", date(1922, 3, 4), 94)
    }

    fn user() -> User {
        User::new("mail@example.com", "dolore", "Nick Name", date(1946, 8, 20))
    }

    #[test]
    fn test_valid_film_passes() {
        assert!(validate_film(&film()).is_ok());
    }

    #[test]
    fn test_film_rules() {
        let mut blank = film();
        blank.name = "   ".to_string();
        assert!(matches!(validate_film(&blank), Err(AppError::Validation(_))));

        let mut long = film();
        long.description = "x".repeat(MAX_DESCRIPTION_LENGTH + 1);
        assert!(validate_film(&long).is_err());
        long.description = "x".repeat(MAX_DESCRIPTION_LENGTH);
        assert!(validate_film(&long).is_ok());

        let mut early = film();
        early.release_date = date(1895, 12, 27);
        assert!(validate_film(&early).is_err());
        early.release_date = date(1895, 12, 28);
        assert!(validate_film(&early).is_ok());

        let mut zero = film();
        zero.duration = 0;
        assert!(validate_film(&zero).is_err());
    }

    #[test]
    fn test_user_rules() {
        let today = date(2024, 1, 1);
        assert!(validate_user_on(&user(), today).is_ok());

        let mut email = user();
        email.email = "mail.example.com".to_string();
        assert!(validate_user_on(&email, today).is_err());

        let mut login = user();
        login.login = "dol ore".to_string();
        assert!(validate_user_on(&login, today).is_err());

        let mut future = user();
        future.birthday = date(2024, 1, 2);
        assert!(validate_user_on(&future, today).is_err());
        future.birthday = today;
        assert!(validate_user_on(&future, today).is_ok());
    }

    #[test]
    fn test_blank_name_defaults_to_login() {
        let mut unnamed = user();
        unnamed.name = String::new();
        assert_eq!(normalize_user(unnamed).name, "dolore");
        assert_eq!(normalize_user(user()).name, "Nick Name");
    }

    #[test]
    fn test_catalog_names() {
        assert!(validate_mpa(&Mpa::new(1, "PG-13")).is_ok());
        assert!(validate_mpa(&Mpa::new(1, "TOO-LONG")).is_err());
        assert!(validate_genre(&Genre::new(1, "")).is_err());
    }
}
