use serde::{Deserialize, Serialize};

use super::{GenreId, MpaId};

/// Genre reference entity. Inside a film only the id is authoritative;
/// the name is filled in by the store on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    #[serde(default)]
    pub id: Option<GenreId>,
    #[serde(default)]
    pub name: String,
}

impl Genre {
    pub fn new(id: GenreId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }

    pub fn reference(id: GenreId) -> Self {
        Self {
            id: Some(id),
            name: String::new(),
        }
    }
}

/// Motion-picture rating. A film carries at most one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mpa {
    #[serde(default)]
    pub id: Option<MpaId>,
    #[serde(default)]
    pub name: String,
}

impl Mpa {
    pub fn new(id: MpaId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }

    pub fn reference(id: MpaId) -> Self {
        Self {
            id: Some(id),
            name: String::new(),
        }
    }
}
