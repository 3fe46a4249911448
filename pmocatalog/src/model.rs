//! Enregistrements du catalogue et DTOs associés

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Un morceau du catalogue
///
/// L'identifiant est la clé du store : il n'apparaît pas dans la
/// représentation JSON (`{"name", "artist", "genre"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "pmoserver", derive(utoipa::ToSchema))]
pub struct Song {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub artist: String,
    pub genre: String,
}

impl Song {
    pub(crate) fn new(id: String, song: NewSong) -> Self {
        Self {
            id,
            name: song.name,
            artist: song.artist,
            genre: song.genre,
        }
    }

    /// Valeur du champ utilisé comme clé de tri/recherche
    pub fn field(&self, field: SongField) -> &str {
        match field {
            SongField::Name => &self.name,
            SongField::Artist => &self.artist,
            SongField::Genre => &self.genre,
        }
    }

    /// Fusionne les champs fournis ; les autres restent inchangés
    pub fn apply(&mut self, update: SongUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(artist) = update.artist {
            self.artist = artist;
        }
        if let Some(genre) = update.genre {
            self.genre = genre;
        }
    }
}

/// Requête de création d'un morceau
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "pmoserver", derive(utoipa::ToSchema))]
pub struct NewSong {
    pub name: String,
    pub artist: String,
    pub genre: String,
}

impl NewSong {
    pub fn new(
        name: impl Into<String>,
        artist: impl Into<String>,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            artist: artist.into(),
            genre: genre.into(),
        }
    }
}

/// Mise à jour partielle d'un morceau. Tous les champs sont optionnels.
///
/// Les clés inconnues sont ignorées et `null` équivaut à une clé absente :
/// un morceau garde toujours exactement ses trois champs texte.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "pmoserver", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct SongUpdate {
    pub name: Option<String>,
    pub artist: Option<String>,
    pub genre: Option<String>,
}

/// Champ d'un morceau utilisable comme clé de tri ou de recherche
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SongField {
    Name,
    Artist,
    Genre,
}

impl SongField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SongField::Name => "name",
            SongField::Artist => "artist",
            SongField::Genre => "genre",
        }
    }
}

impl fmt::Display for SongField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SongField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(SongField::Name),
            "artist" => Ok(SongField::Artist),
            "genre" => Ok(SongField::Genre),
            other => Err(Error::MissingField(other.to_string())),
        }
    }
}

/// Une playlist : un nom et une liste ordonnée d'identifiants de morceaux
///
/// Les doublons sont permis et aucune intégrité référentielle n'est
/// maintenue : un identifiant peut survivre à la suppression du morceau.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "pmoserver", derive(utoipa::ToSchema))]
pub struct Playlist {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub songs: Vec<String>,
}

impl Playlist {
    pub(crate) fn new(id: String, playlist: NewPlaylist) -> Self {
        Self {
            id,
            name: playlist.name,
            songs: Vec::new(),
        }
    }

    /// Retire la première occurrence de `song_id` (retourne true si retirée)
    pub(crate) fn remove_first(&mut self, song_id: &str) -> bool {
        match self.songs.iter().position(|id| id == song_id) {
            Some(index) => {
                self.songs.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Requête de création (ou de renommage) d'une playlist
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "pmoserver", derive(utoipa::ToSchema))]
pub struct NewPlaylist {
    pub name: String,
}

impl NewPlaylist {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
