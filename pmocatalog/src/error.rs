//! Types d'erreurs pour pmocatalog

/// Erreurs du catalogue de morceaux et de playlists
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Song not found: {0}")]
    SongNotFound(String),

    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),

    /// La playlist n'existe pas, ou le morceau visé n'est pas utilisable
    /// (absent du catalogue pour un ajout, absent de la playlist pour un retrait)
    #[error("Playlist or Song not found: playlist {playlist_id}, song {song_id}")]
    PlaylistOrSongNotFound {
        playlist_id: String,
        song_id: String,
    },

    /// Clé de tri/recherche ne correspondant à aucun champ d'un morceau
    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Unknown id strategy: {0}")]
    UnknownIdStrategy(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Type Result spécialisé pour pmocatalog
pub type Result<T> = std::result::Result<T, Error>;
