//! Catalog : store en mémoire des morceaux et des playlists
//!
//! Les deux tables sont possédées par un unique état protégé par un
//! `RwLock` tokio. `Catalog` est un handle clonable (`Arc`) injecté dans les
//! handlers HTTP ; chaque opération est une seule section critique, la
//! génération d'identifiant et l'insertion comprises.

use crate::ids::{IdGenerator, IdStrategy};
use crate::model::{NewPlaylist, NewSong, Playlist, Song, SongField, SongUpdate};
use crate::search::{binary_search, merge_sort};
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Une table `id -> enregistrement` qui retient l'ordre d'insertion
struct Table<V> {
    records: HashMap<String, V>,
    order: Vec<String>,
    ids: IdGenerator,
}

impl<V> Table<V> {
    fn new(prefix: &'static str, strategy: IdStrategy) -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
            ids: IdGenerator::new(prefix, strategy),
        }
    }

    fn insert_with(&mut self, build: impl FnOnce(String) -> V) -> String {
        let records = &self.records;
        let id = self
            .ids
            .next_id(records.len(), |candidate| records.contains_key(candidate));
        self.records.insert(id.clone(), build(id.clone()));
        self.order.push(id.clone());
        id
    }

    fn remove(&mut self, id: &str) -> Option<V> {
        let removed = self.records.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(removed)
    }

    fn values(&self) -> impl Iterator<Item = &V> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }
}

struct CatalogState {
    songs: Table<Song>,
    playlists: Table<Playlist>,
}

/// Store central du catalogue
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<RwLock<CatalogState>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(IdStrategy::default())
    }
}

impl Catalog {
    /// Crée un catalogue vide
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CatalogState {
                songs: Table::new("song", strategy),
                playlists: Table::new("playlist", strategy),
            })),
        }
    }

    // ------------------------------------------------------------------
    // Morceaux
    // ------------------------------------------------------------------

    /// Ajoute un morceau et retourne son identifiant
    pub async fn create_song(&self, song: NewSong) -> String {
        let mut state = self.inner.write().await;
        let id = state.songs.insert_with(|id| Song::new(id, song));
        info!(song_id = %id, "Song created");
        id
    }

    /// Récupère un morceau par identifiant
    pub async fn song(&self, id: &str) -> Option<Song> {
        self.inner.read().await.songs.records.get(id).cloned()
    }

    /// Met à jour les champs fournis d'un morceau et retourne le résultat
    pub async fn update_song(&self, id: &str, update: SongUpdate) -> Result<Song> {
        let mut state = self.inner.write().await;
        let song = state
            .songs
            .records
            .get_mut(id)
            .ok_or_else(|| Error::SongNotFound(id.to_string()))?;
        song.apply(update);
        debug!(song_id = %id, "Song updated");
        Ok(song.clone())
    }

    /// Supprime un morceau
    ///
    /// Les playlists qui le référencent gardent son identifiant.
    pub async fn delete_song(&self, id: &str) -> Result<Song> {
        let mut state = self.inner.write().await;
        let song = state
            .songs
            .remove(id)
            .ok_or_else(|| Error::SongNotFound(id.to_string()))?;
        info!(song_id = %id, "Song deleted");
        Ok(song)
    }

    /// Snapshot de tous les morceaux, dans l'ordre de création
    pub async fn songs(&self) -> Vec<Song> {
        self.inner.read().await.songs.values().cloned().collect()
    }

    pub async fn song_count(&self) -> usize {
        self.inner.read().await.songs.records.len()
    }

    /// Snapshot des morceaux trié sur le champ `key`
    pub async fn sorted_songs(&self, key: &str) -> Result<Vec<Song>> {
        let field = key.parse::<SongField>()?;
        let songs = self.songs().await;
        Ok(merge_sort(&songs, field))
    }

    /// Cherche un morceau dont le champ `key` vaut `target`
    pub async fn find_song_by(&self, key: &str, target: &str) -> Result<Option<Song>> {
        let field = key.parse::<SongField>()?;
        let sorted = merge_sort(&self.songs().await, field);
        Ok(binary_search(&sorted, target, field).cloned())
    }

    // ------------------------------------------------------------------
    // Playlists
    // ------------------------------------------------------------------

    /// Crée une playlist vide et retourne son identifiant
    pub async fn create_playlist(&self, playlist: NewPlaylist) -> String {
        let mut state = self.inner.write().await;
        let id = state
            .playlists
            .insert_with(|id| Playlist::new(id, playlist));
        info!(playlist_id = %id, "Playlist created");
        id
    }

    /// Récupère une playlist par identifiant
    pub async fn playlist(&self, id: &str) -> Option<Playlist> {
        self.inner.read().await.playlists.records.get(id).cloned()
    }

    /// Renomme une playlist
    pub async fn rename_playlist(&self, id: &str, name: String) -> Result<()> {
        let mut state = self.inner.write().await;
        let playlist = state
            .playlists
            .records
            .get_mut(id)
            .ok_or_else(|| Error::PlaylistNotFound(id.to_string()))?;
        playlist.name = name;
        debug!(playlist_id = %id, "Playlist renamed");
        Ok(())
    }

    /// Supprime une playlist
    pub async fn delete_playlist(&self, id: &str) -> Result<Playlist> {
        let mut state = self.inner.write().await;
        let playlist = state
            .playlists
            .remove(id)
            .ok_or_else(|| Error::PlaylistNotFound(id.to_string()))?;
        info!(playlist_id = %id, "Playlist deleted");
        Ok(playlist)
    }

    /// Snapshot de toutes les playlists, dans l'ordre de création
    pub async fn playlists(&self) -> Vec<Playlist> {
        self.inner.read().await.playlists.values().cloned().collect()
    }

    pub async fn playlist_count(&self) -> usize {
        self.inner.read().await.playlists.records.len()
    }

    /// Ajoute un morceau en fin de playlist (doublons autorisés)
    pub async fn add_song_to_playlist(&self, playlist_id: &str, song_id: &str) -> Result<()> {
        let mut state = self.inner.write().await;
        let CatalogState { songs, playlists } = &mut *state;

        match playlists.records.get_mut(playlist_id) {
            Some(playlist) if songs.records.contains_key(song_id) => {
                playlist.songs.push(song_id.to_string());
                debug!(playlist_id, song_id, "Song added to playlist");
                Ok(())
            }
            _ => Err(Error::PlaylistOrSongNotFound {
                playlist_id: playlist_id.to_string(),
                song_id: song_id.to_string(),
            }),
        }
    }

    /// Retire la première occurrence d'un morceau d'une playlist
    ///
    /// Le morceau n'a pas besoin d'exister encore dans le catalogue.
    pub async fn remove_song_from_playlist(&self, playlist_id: &str, song_id: &str) -> Result<()> {
        let mut state = self.inner.write().await;
        let removed = state
            .playlists
            .records
            .get_mut(playlist_id)
            .is_some_and(|playlist| playlist.remove_first(song_id));

        if removed {
            debug!(playlist_id, song_id, "Song removed from playlist");
            Ok(())
        } else {
            Err(Error::PlaylistOrSongNotFound {
                playlist_id: playlist_id.to_string(),
                song_id: song_id.to_string(),
            })
        }
    }
}
