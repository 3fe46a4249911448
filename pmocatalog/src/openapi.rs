//! Documentation OpenAPI de l'API catalogue

use utoipa::OpenApi;

/// Documentation OpenAPI pour les endpoints `/song` et `/playlist`
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::create_song,
        crate::api::get_song,
        crate::api::update_song,
        crate::api::delete_song,
        crate::api::create_playlist,
        crate::api::get_playlist,
        crate::api::update_playlist,
        crate::api::delete_playlist,
        crate::api::add_song,
        crate::api::remove_song,
    ),
    components(
        schemas(
            crate::model::Song,
            crate::model::NewSong,
            crate::model::SongUpdate,
            crate::model::Playlist,
            crate::model::NewPlaylist,
            crate::api::MessageResponse,
            crate::api::SongCreatedResponse,
            crate::api::SongUpdatedResponse,
            crate::api::PlaylistCreatedResponse,
            crate::api::PlaylistSongRequest,
            crate::api::ErrorResponse,
        )
    ),
    tags(
        (name = "songs", description = "Création, lecture, mise à jour et suppression des morceaux"),
        (name = "playlists", description = "Gestion des playlists et de leur contenu")
    ),
    info(
        title = "PMO Catalog API",
        version = "0.1.0",
        description = r#"
# Catalogue de morceaux et de playlists

Stockage en mémoire, perdu à l'arrêt du serveur.

- Les identifiants sont générés par le serveur (`song_1`, `playlist_1`, ...)
- Une playlist référence des identifiants de morceaux, doublons autorisés
- Supprimer un morceau ne le retire pas des playlists qui le référencent
- Toutes les erreurs ont la forme `{"error": "..."}`
        "#,
        license(
            name = "MIT",
        ),
    )
)]
pub struct ApiDoc;
