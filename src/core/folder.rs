// Folding of flat LEFT JOIN results back into nested aggregates.
//
// A join of one parent table against several child tables yields one row
// per (parent, child-combination). The `Folder` collapses those rows into
// one aggregate per distinct parent id, keeping first-seen order. Every
// child group is keyed on its own identity column, so the Cartesian
// product produced by joining two child tables at once never produces
// duplicated or phantom children.

use std::collections::HashMap;

use crate::models::{Film, FilmRow, Genre, Mpa, User, UserRow};

/// An aggregate that can be rebuilt from repeated join rows.
pub trait FoldAggregate: Sized {
    type Row;

    /// Parent id carried by the row
    fn row_id(row: &Self::Row) -> i64;

    /// Aggregate shell built from the parent columns only
    fn from_parent(row: &Self::Row) -> Self;

    /// Merge the child columns of one row into the aggregate
    fn absorb(&mut self, row: &Self::Row);

    /// Called once after the last row
    fn finish(&mut self) {}
}

/// Treats NULL and zero foreign keys as "no child in this row".
pub fn child_key(value: Option<i64>) -> Option<i64> {
    value.filter(|id| *id != 0)
}

#[derive(Debug)]
pub struct Folder<A> {
    index: HashMap<i64, usize>,
    items: Vec<A>,
}

impl<A: FoldAggregate> Folder<A> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, row: A::Row) {
        let id = A::row_id(&row);
        let slot = match self.index.get(&id) {
            Some(slot) => *slot,
            None => {
                self.items.push(A::from_parent(&row));
                let slot = self.items.len() - 1;
                self.index.insert(id, slot);
                slot
            }
        };
        self.items[slot].absorb(&row);
    }

    pub fn finish(mut self) -> Folded<A> {
        for item in &mut self.items {
            item.finish();
        }
        Folded {
            index: self.index,
            items: self.items,
        }
    }
}

impl<A: FoldAggregate> Default for Folder<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a fold: aggregates in first-seen order, addressable by id.
#[derive(Debug)]
pub struct Folded<A> {
    index: HashMap<i64, usize>,
    items: Vec<A>,
}

impl<A> Folded<A> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&A> {
        self.index.get(&id).map(|slot| &self.items[*slot])
    }

    pub fn into_vec(self) -> Vec<A> {
        self.items
    }

    /// The aggregate for `id`, consuming the fold
    pub fn take(mut self, id: i64) -> Option<A> {
        let slot = self.index.remove(&id)?;
        Some(self.items.swap_remove(slot))
    }
}

pub fn fold_rows<A, I>(rows: I) -> Folded<A>
where
    A: FoldAggregate,
    I: IntoIterator<Item = A::Row>,
{
    let mut folder = Folder::new();
    for row in rows {
        folder.push(row);
    }
    folder.finish()
}

impl FoldAggregate for Film {
    type Row = FilmRow;

    fn row_id(row: &FilmRow) -> i64 {
        row.id
    }

    fn from_parent(row: &FilmRow) -> Self {
        let mpa = child_key(row.mpa_id)
            .map(|id| Mpa::new(id, row.mpa_name.clone().unwrap_or_default()));
        Film {
            id: Some(row.id),
            name: row.name.clone(),
            description: row.description.clone(),
            release_date: row.release_date,
            duration: row.duration,
            mpa,
            genres: Vec::new(),
            likes: Default::default(),
        }
    }

    fn absorb(&mut self, row: &FilmRow) {
        if let Some(genre_id) = child_key(row.genre_id) {
            if !self.genres.iter().any(|g| g.id == Some(genre_id)) {
                self.genres.push(Genre::new(
                    genre_id,
                    row.genre_name.clone().unwrap_or_default(),
                ));
            }
        }
        if let Some(user_id) = child_key(row.like_user_id) {
            self.likes.insert(user_id);
        }
    }

    fn finish(&mut self) {
        self.genres.sort_by_key(|g| g.id);
    }
}

impl FoldAggregate for User {
    type Row = UserRow;

    fn row_id(row: &UserRow) -> i64 {
        row.id
    }

    fn from_parent(row: &UserRow) -> Self {
        User {
            id: Some(row.id),
            email: row.email.clone(),
            login: row.login.clone(),
            name: row.name.clone(),
            birthday: row.birthday,
            friends: Default::default(),
        }
    }

    fn absorb(&mut self, row: &UserRow) {
        if let Some(friend_id) = child_key(row.friend_id) {
            self.friends.insert(friend_id);
        }
    }
}
