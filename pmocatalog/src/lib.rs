//! # pmocatalog - Catalogue en mémoire de morceaux et de playlists
//!
//! Cette crate fournit :
//! - Un store en mémoire de morceaux (nom, artiste, genre) et de playlists
//! - Des identifiants générés côté serveur (`song_1`, `playlist_1`, ...)
//! - Un tri fusion et une recherche dichotomique sur les champs des morceaux
//! - Une API REST (`/song`, `/playlist`) pour `pmoserver`
//!
//! # Architecture
//!
//! - **Catalog** : handle clonable partagé entre les handlers HTTP
//! - **IdGenerator** : génération des identifiants selon une [`IdStrategy`]
//! - **search** : [`merge_sort`] / [`binary_search`] et leurs variantes génériques
//!
//! Une playlist ne contient que des identifiants de morceaux. Supprimer un
//! morceau ne le retire pas des playlists : l'identifiant reste orphelin.
//!
//! # Exemple d'utilisation
//!
//! ```no_run
//! use pmocatalog::{Catalog, NewSong, NewPlaylist};
//!
//! # #[tokio::main]
//! # async fn main() -> pmocatalog::Result<()> {
//! let catalog = Catalog::default();
//!
//! let song_id = catalog.create_song(NewSong::new("A", "X", "Rock")).await;
//! let playlist_id = catalog.create_playlist(NewPlaylist::new("P")).await;
//! catalog.add_song_to_playlist(&playlist_id, &song_id).await?;
//!
//! let by_name = catalog.sorted_songs("name").await?;
//! println!("{} songs", by_name.len());
//! # Ok(())
//! # }
//! ```

mod error;
mod ids;
mod model;
mod search;
mod store;

#[cfg(feature = "pmoconfig")]
mod config_ext;

#[cfg(feature = "pmoserver")]
pub mod api;

#[cfg(feature = "pmoserver")]
pub mod openapi;

#[cfg(feature = "pmoserver")]
mod pmoserver_ext;

// Réexports publics
pub use error::{Error, Result};
pub use ids::{IdGenerator, IdStrategy};
pub use model::{NewPlaylist, NewSong, Playlist, Song, SongField, SongUpdate};
pub use search::{
    binary_search, binary_search_by_key, merge_sort, merge_sort_by_key, search_songs, sort_songs,
};
pub use store::Catalog;

#[cfg(feature = "pmoconfig")]
pub use config_ext::CatalogConfigExt;

#[cfg(feature = "pmoserver")]
pub use api::{catalog_api_router, NotFoundPolicy};

#[cfg(feature = "pmoserver")]
pub use openapi::ApiDoc;

#[cfg(feature = "pmoserver")]
pub use pmoserver_ext::CatalogServerExt;
