//! API REST du catalogue (`/song`, `/playlist`).
//!
//! Toutes les réponses sont en JSON. Les erreurs ont la forme
//! `{"error": "..."}`. Par compatibilité, un GET sur un identifiant inconnu
//! répond `200` avec le corps d'erreur, sauf en [`NotFoundPolicy::Strict`].

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::model::{NewPlaylist, NewSong, Playlist, Song, SongUpdate};
use crate::{Catalog, Error};

const SONG_NOT_FOUND: &str = "Song not found";
const PLAYLIST_NOT_FOUND: &str = "Playlist not found";
const PLAYLIST_OR_SONG_NOT_FOUND: &str = "Playlist or Song not found";

/// Comportement des GET sur un identifiant inconnu
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotFoundPolicy {
    /// `200 {"error": "... not found"}`
    #[default]
    Legacy,
    /// `404 {"error": "... not found"}`
    Strict,
}

impl NotFoundPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            NotFoundPolicy::Strict
        } else {
            NotFoundPolicy::Legacy
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            NotFoundPolicy::Legacy => StatusCode::OK,
            NotFoundPolicy::Strict => StatusCode::NOT_FOUND,
        }
    }
}

/// État partagé des handlers
#[derive(Clone)]
pub struct ApiState {
    catalog: Catalog,
    not_found: NotFoundPolicy,
}

/// Router combinant les endpoints morceaux et playlists
pub fn catalog_api_router(catalog: Catalog, not_found: NotFoundPolicy) -> Router {
    Router::new()
        .route("/song", post(create_song))
        .route(
            "/song/{song_id}",
            get(get_song).put(update_song).delete(delete_song),
        )
        .route("/playlist", post(create_playlist))
        .route(
            "/playlist/{playlist_id}",
            get(get_playlist)
                .put(update_playlist)
                .delete(delete_playlist),
        )
        .route("/playlist/{playlist_id}/add_song", post(add_song))
        .route("/playlist/{playlist_id}/remove_song", post(remove_song))
        .with_state(ApiState { catalog, not_found })
}

/// Réponse simple portant un message
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Réponse à la création d'un morceau
#[derive(Debug, Serialize, ToSchema)]
pub struct SongCreatedResponse {
    pub message: String,
    pub song_id: String,
}

/// Réponse à la mise à jour d'un morceau
#[derive(Debug, Serialize, ToSchema)]
pub struct SongUpdatedResponse {
    pub message: String,
    pub song: Song,
}

/// Réponse à la création d'une playlist
#[derive(Debug, Serialize, ToSchema)]
pub struct PlaylistCreatedResponse {
    pub message: String,
    pub playlist_id: String,
}

/// Corps des requêtes add_song / remove_song
#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaylistSongRequest {
    pub song_id: String,
}

/// Réponse d'erreur REST
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[utoipa::path(
    post,
    path = "/song",
    tag = "songs",
    request_body = NewSong,
    responses(
        (status = 201, description = "Morceau créé", body = SongCreatedResponse),
        (status = 400, description = "Corps JSON invalide", body = ErrorResponse)
    )
)]
pub async fn create_song(
    State(state): State<ApiState>,
    payload: Result<Json<NewSong>, JsonRejection>,
) -> Response {
    let Json(song) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection),
    };

    let song_id = state.catalog.create_song(song).await;
    (
        StatusCode::CREATED,
        Json(SongCreatedResponse {
            message: "Song added".to_string(),
            song_id,
        }),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/song/{song_id}",
    tag = "songs",
    params(
        ("song_id" = String, Path, description = "Identifiant du morceau")
    ),
    responses(
        (status = 200, description = "Morceau, ou `{\"error\"}` s'il est inconnu", body = Song),
        (status = 404, description = "Morceau introuvable (mode strict)", body = ErrorResponse)
    )
)]
pub async fn get_song(State(state): State<ApiState>, Path(song_id): Path<String>) -> Response {
    match state.catalog.song(&song_id).await {
        Some(song) => (StatusCode::OK, Json(song)).into_response(),
        None => {
            debug!(song_id = %song_id, "Lookup of unknown song");
            error_response(state.not_found.status(), SONG_NOT_FOUND)
        }
    }
}

#[utoipa::path(
    put,
    path = "/song/{song_id}",
    tag = "songs",
    params(
        ("song_id" = String, Path, description = "Identifiant du morceau")
    ),
    request_body = SongUpdate,
    responses(
        (status = 200, description = "Morceau mis à jour", body = SongUpdatedResponse),
        (status = 400, description = "Corps JSON invalide", body = ErrorResponse),
        (status = 404, description = "Morceau introuvable", body = ErrorResponse)
    )
)]
pub async fn update_song(
    State(state): State<ApiState>,
    Path(song_id): Path<String>,
    payload: Result<Json<SongUpdate>, JsonRejection>,
) -> Response {
    // L'existence est vérifiée avant la validité du corps
    if state.catalog.song(&song_id).await.is_none() {
        return map_error(Error::SongNotFound(song_id));
    }
    let Json(update) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection),
    };

    match state.catalog.update_song(&song_id, update).await {
        Ok(song) => (
            StatusCode::OK,
            Json(SongUpdatedResponse {
                message: "Song updated".to_string(),
                song,
            }),
        )
            .into_response(),
        Err(err) => map_error(err),
    }
}

#[utoipa::path(
    delete,
    path = "/song/{song_id}",
    tag = "songs",
    params(
        ("song_id" = String, Path, description = "Identifiant du morceau")
    ),
    responses(
        (status = 200, description = "Morceau supprimé", body = MessageResponse),
        (status = 404, description = "Morceau introuvable", body = ErrorResponse)
    )
)]
pub async fn delete_song(State(state): State<ApiState>, Path(song_id): Path<String>) -> Response {
    match state.catalog.delete_song(&song_id).await {
        Ok(_) => message("Song deleted"),
        Err(err) => map_error(err),
    }
}

#[utoipa::path(
    post,
    path = "/playlist",
    tag = "playlists",
    request_body = NewPlaylist,
    responses(
        (status = 201, description = "Playlist créée", body = PlaylistCreatedResponse),
        (status = 400, description = "Corps JSON invalide", body = ErrorResponse)
    )
)]
pub async fn create_playlist(
    State(state): State<ApiState>,
    payload: Result<Json<NewPlaylist>, JsonRejection>,
) -> Response {
    let Json(playlist) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection),
    };

    let playlist_id = state.catalog.create_playlist(playlist).await;
    (
        StatusCode::CREATED,
        Json(PlaylistCreatedResponse {
            message: "Playlist created".to_string(),
            playlist_id,
        }),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/playlist/{playlist_id}",
    tag = "playlists",
    params(
        ("playlist_id" = String, Path, description = "Identifiant de la playlist")
    ),
    responses(
        (status = 200, description = "Playlist, ou `{\"error\"}` si elle est inconnue", body = Playlist),
        (status = 404, description = "Playlist introuvable (mode strict)", body = ErrorResponse)
    )
)]
pub async fn get_playlist(
    State(state): State<ApiState>,
    Path(playlist_id): Path<String>,
) -> Response {
    match state.catalog.playlist(&playlist_id).await {
        Some(playlist) => (StatusCode::OK, Json(playlist)).into_response(),
        None => {
            debug!(playlist_id = %playlist_id, "Lookup of unknown playlist");
            error_response(state.not_found.status(), PLAYLIST_NOT_FOUND)
        }
    }
}

#[utoipa::path(
    put,
    path = "/playlist/{playlist_id}",
    tag = "playlists",
    params(
        ("playlist_id" = String, Path, description = "Identifiant de la playlist")
    ),
    request_body = NewPlaylist,
    responses(
        (status = 200, description = "Playlist renommée", body = MessageResponse),
        (status = 400, description = "Corps JSON invalide", body = ErrorResponse),
        (status = 404, description = "Playlist introuvable", body = ErrorResponse)
    )
)]
pub async fn update_playlist(
    State(state): State<ApiState>,
    Path(playlist_id): Path<String>,
    payload: Result<Json<NewPlaylist>, JsonRejection>,
) -> Response {
    if state.catalog.playlist(&playlist_id).await.is_none() {
        return map_error(Error::PlaylistNotFound(playlist_id));
    }
    let Json(NewPlaylist { name }) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection),
    };

    match state.catalog.rename_playlist(&playlist_id, name).await {
        Ok(()) => message("Playlist updated"),
        Err(err) => map_error(err),
    }
}

#[utoipa::path(
    delete,
    path = "/playlist/{playlist_id}",
    tag = "playlists",
    params(
        ("playlist_id" = String, Path, description = "Identifiant de la playlist")
    ),
    responses(
        (status = 200, description = "Playlist supprimée", body = MessageResponse),
        (status = 404, description = "Playlist introuvable", body = ErrorResponse)
    )
)]
pub async fn delete_playlist(
    State(state): State<ApiState>,
    Path(playlist_id): Path<String>,
) -> Response {
    match state.catalog.delete_playlist(&playlist_id).await {
        Ok(_) => message("Playlist deleted"),
        Err(err) => map_error(err),
    }
}

#[utoipa::path(
    post,
    path = "/playlist/{playlist_id}/add_song",
    tag = "playlists",
    params(
        ("playlist_id" = String, Path, description = "Identifiant de la playlist")
    ),
    request_body = PlaylistSongRequest,
    responses(
        (status = 200, description = "Morceau ajouté", body = MessageResponse),
        (status = 400, description = "Corps JSON invalide", body = ErrorResponse),
        (status = 404, description = "Playlist ou morceau introuvable", body = ErrorResponse)
    )
)]
pub async fn add_song(
    State(state): State<ApiState>,
    Path(playlist_id): Path<String>,
    payload: Result<Json<PlaylistSongRequest>, JsonRejection>,
) -> Response {
    let Json(PlaylistSongRequest { song_id }) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection),
    };

    match state
        .catalog
        .add_song_to_playlist(&playlist_id, &song_id)
        .await
    {
        Ok(()) => message("Song added to playlist"),
        Err(err) => map_error(err),
    }
}

#[utoipa::path(
    post,
    path = "/playlist/{playlist_id}/remove_song",
    tag = "playlists",
    params(
        ("playlist_id" = String, Path, description = "Identifiant de la playlist")
    ),
    request_body = PlaylistSongRequest,
    responses(
        (status = 200, description = "Morceau retiré", body = MessageResponse),
        (status = 400, description = "Corps JSON invalide", body = ErrorResponse),
        (status = 404, description = "Playlist introuvable ou morceau absent de la playlist", body = ErrorResponse)
    )
)]
pub async fn remove_song(
    State(state): State<ApiState>,
    Path(playlist_id): Path<String>,
    payload: Result<Json<PlaylistSongRequest>, JsonRejection>,
) -> Response {
    let Json(PlaylistSongRequest { song_id }) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection),
    };

    match state
        .catalog
        .remove_song_from_playlist(&playlist_id, &song_id)
        .await
    {
        Ok(()) => message("Song removed from playlist"),
        Err(err) => map_error(err),
    }
}

fn message(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(MessageResponse {
            message: message.to_string(),
        }),
    )
        .into_response()
}

fn error_response<S: Into<String>>(status: StatusCode, error: S) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

fn bad_request(rejection: JsonRejection) -> Response {
    warn!("Rejected request body: {}", rejection.body_text());
    error_response(StatusCode::BAD_REQUEST, rejection.body_text())
}

fn map_error(error: Error) -> Response {
    match error {
        Error::SongNotFound(_) => error_response(StatusCode::NOT_FOUND, SONG_NOT_FOUND),
        Error::PlaylistNotFound(_) => error_response(StatusCode::NOT_FOUND, PLAYLIST_NOT_FOUND),
        Error::PlaylistOrSongNotFound { .. } => {
            error_response(StatusCode::NOT_FOUND, PLAYLIST_OR_SONG_NOT_FOUND)
        }
        Error::MissingField(_) => error_response(StatusCode::BAD_REQUEST, error.to_string()),
        Error::UnknownIdStrategy(_) | Error::Other(_) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
        }
    }
}
