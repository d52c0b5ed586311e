use std::cmp::Reverse;

use crate::models::Film;

/// Most-liked films first; equal like counts fall back to ascending id so
/// the order is total. A non-positive `count` yields nothing.
pub fn top_films(mut films: Vec<Film>, count: i64) -> Vec<Film> {
    if count <= 0 {
        return Vec::new();
    }
    films.sort_by_key(|film| (Reverse(film.like_count()), film.id));
    films.truncate(usize::try_from(count).unwrap_or(usize::MAX));
    films
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn film(id: i64, likes: &[i64]) -> Film {
        let mut film = Film::new(
            format!("Film {}", id),
            "",
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            90,
        );
        film.id = Some(id);
        film.likes = likes.iter().copied().collect();
        film
    }

    fn ids(films: &[Film]) -> Vec<i64> {
        films.iter().map(|f| f.id.unwrap()).collect()
    }

    #[test]
    fn test_ties_broken_by_id() {
        let films = vec![film(3, &[1]), film(2, &[1, 2, 3]), film(1, &[4, 5, 6])];
        assert_eq!(ids(&top_films(films, 2)), vec![1, 2]);
    }

    #[test]
    fn test_zero_like_films_are_ordered_by_id() {
        let films = vec![film(7, &[]), film(4, &[]), film(9, &[1])];
        assert_eq!(ids(&top_films(films, 10)), vec![9, 4, 7]);
    }

    #[test]
    fn test_non_positive_count_is_empty() {
        assert!(top_films(vec![film(1, &[])], 0).is_empty());
        assert!(top_films(vec![film(1, &[])], -3).is_empty());
    }

    #[test]
    fn test_count_larger_than_catalog() {
        assert_eq!(top_films(vec![film(1, &[]), film(2, &[])], 50).len(), 2);
    }
}
