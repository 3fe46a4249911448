#![cfg(feature = "pmoserver")]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use pmocatalog::{catalog_api_router, Catalog, CatalogServerExt, NotFoundPolicy};
use serde_json::{json, Value};
use tower::ServiceExt;

fn router() -> (Catalog, Router) {
    let catalog = Catalog::default();
    let router = catalog_api_router(catalog.clone(), NotFoundPolicy::Legacy);
    (catalog, router)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn create_song(router: &Router, name: &str) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/song",
        Some(json!({"name": name, "artist": "X", "genre": "Rock"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["song_id"].as_str().unwrap().to_string()
}

async fn create_playlist(router: &Router, name: &str) -> String {
    let (status, body) = send(router, Method::POST, "/playlist", Some(json!({"name": name}))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["playlist_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn song_lifecycle() {
    let (_catalog, router) = router();

    let (status, body) = send(
        &router,
        Method::POST,
        "/song",
        Some(json!({"name": "A", "artist": "X", "genre": "Rock"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"message": "Song added", "song_id": "song_1"}));

    let (status, body) = send(&router, Method::GET, "/song/song_1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"name": "A", "artist": "X", "genre": "Rock"}));

    let (status, body) = send(
        &router,
        Method::PUT,
        "/song/song_1",
        Some(json!({"genre": "Pop"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Song updated");
    assert_eq!(body["song"], json!({"name": "A", "artist": "X", "genre": "Pop"}));

    let (status, body) = send(&router, Method::DELETE, "/song/song_1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Song deleted"}));

    let (status, body) = send(&router, Method::DELETE, "/song/song_1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Song not found"}));
}

#[tokio::test]
async fn unknown_ids_on_get_answer_200_with_error_body() {
    let (_catalog, router) = router();

    let (status, body) = send(&router, Method::GET, "/song/song_99", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "Song not found"}));

    let (status, body) = send(&router, Method::GET, "/playlist/playlist_99", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "Playlist not found"}));
}

#[tokio::test]
async fn strict_policy_answers_404_on_get() {
    let router = catalog_api_router(Catalog::default(), NotFoundPolicy::Strict);

    let (status, body) = send(&router, Method::GET, "/song/song_99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Song not found"}));

    let (status, _) = send(&router, Method::GET, "/playlist/playlist_99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn updates_on_unknown_ids_answer_404() {
    let (_catalog, router) = router();

    let (status, body) = send(
        &router,
        Method::PUT,
        "/song/song_99",
        Some(json!({"name": "B"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Song not found"}));

    let (status, body) = send(
        &router,
        Method::PUT,
        "/playlist/playlist_99",
        Some(json!({"name": "Q"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Playlist not found"}));

    let (status, _) = send(&router, Method::DELETE, "/playlist/playlist_99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn playlist_membership_round_trip() {
    let (_catalog, router) = router();
    let song_id = create_song(&router, "A").await;
    let playlist_id = create_playlist(&router, "P").await;
    assert_eq!(playlist_id, "playlist_1");

    let add = format!("/playlist/{}/add_song", playlist_id);
    let (status, body) = send(&router, Method::POST, &add, Some(json!({"song_id": song_id}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Song added to playlist"}));

    // doublons autorisés
    send(&router, Method::POST, &add, Some(json!({"song_id": song_id}))).await;
    let (_, body) = send(&router, Method::GET, "/playlist/playlist_1", None).await;
    assert_eq!(body, json!({"name": "P", "songs": ["song_1", "song_1"]}));

    let remove = format!("/playlist/{}/remove_song", playlist_id);
    let (status, body) = send(&router, Method::POST, &remove, Some(json!({"song_id": song_id}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Song removed from playlist"}));

    let (_, body) = send(&router, Method::GET, "/playlist/playlist_1", None).await;
    assert_eq!(body["songs"], json!(["song_1"]));

    let (status, body) = send(
        &router,
        Method::PUT,
        "/playlist/playlist_1",
        Some(json!({"name": "Renamed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Playlist updated"}));

    let (status, body) = send(&router, Method::DELETE, "/playlist/playlist_1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Playlist deleted"}));
}

#[tokio::test]
async fn membership_errors() {
    let (_catalog, router) = router();
    let playlist_id = create_playlist(&router, "P").await;

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/playlist/{}/add_song", playlist_id),
        Some(json!({"song_id": "song_99"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Playlist or Song not found"}));

    let song_id = create_song(&router, "A").await;
    let (status, body) = send(
        &router,
        Method::POST,
        "/playlist/playlist_99/add_song",
        Some(json!({"song_id": song_id})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Playlist or Song not found"}));

    // morceau absent de la playlist
    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/playlist/{}/remove_song", playlist_id),
        Some(json!({"song_id": song_id})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Playlist or Song not found"}));
}

#[tokio::test]
async fn deleting_a_song_leaves_playlist_references() {
    let (catalog, router) = router();
    let song_id = create_song(&router, "A").await;
    let playlist_id = create_playlist(&router, "P").await;
    catalog
        .add_song_to_playlist(&playlist_id, &song_id)
        .await
        .unwrap();

    send(&router, Method::DELETE, &format!("/song/{}", song_id), None).await;

    let (_, body) = send(&router, Method::GET, &format!("/playlist/{}", playlist_id), None).await;
    assert_eq!(body["songs"], json!([song_id]));

    // l'identifiant orphelin peut toujours être retiré
    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/playlist/{}/remove_song", playlist_id),
        Some(json!({"song_id": song_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_bodies_answer_400() {
    let (catalog, router) = router();

    let (status, body) = send(&router, Method::POST, "/song", Some(json!({"name": "A"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let request = Request::post("/playlist")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(catalog.song_count().await, 0);
    assert_eq!(catalog.playlist_count().await, 0);
}

#[tokio::test]
async fn put_on_existing_song_validates_the_body() {
    let (catalog, router) = router();
    let song_id = create_song(&router, "A").await;
    let uri = format!("/song/{}", song_id);

    let request = Request::put(uri.as_str())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = send(&router, Method::PUT, &uri, Some(json!({"name": 5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // les clés inconnues sont ignorées et `null` vaut champ absent
    let (status, body) = send(
        &router,
        Method::PUT,
        &uri,
        Some(json!({"album": "B", "artist": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["song"], json!({"name": "A", "artist": "X", "genre": "Rock"}));

    let song = catalog.song(&song_id).await.unwrap();
    assert_eq!(song.name, "A");
    assert_eq!(song.artist, "X");
}

#[tokio::test]
async fn server_extension_mounts_routes_and_docs() {
    let mut server = pmoserver::Server::new("Test", "localhost", 0);
    let catalog = Catalog::default();
    server
        .init_catalog_api_with(catalog.clone(), NotFoundPolicy::Legacy)
        .await;
    let router = server.router().await;

    create_song(&router, "A").await;
    assert_eq!(catalog.song_count().await, 1);

    let (status, openapi) = send(&router, Method::GET, "/api-docs/catalog.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(openapi["paths"]["/song"].is_object());
}
