use pmocatalog::CatalogServerExt;
use pmoserver::{LoggingOptions, ServerBuilder};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ========== PHASE 1 : Infrastructure ==========
    let config = pmoconfig::get_config();

    let mut server = ServerBuilder::new_configured().build();
    server
        .init_logging(LoggingOptions::from_config(&config))
        .await;

    server
        .add_route("/info", || async {
            serde_json::json!({"name": "PMOCatalog", "version": env!("CARGO_PKG_VERSION")})
        })
        .await;

    // ========== PHASE 2 : Catalogue ==========
    info!("🎵 Initializing song catalog...");
    server.init_catalog_api().await?;

    // ========== PHASE 3 : Démarrage du serveur ==========
    info!("🌐 Starting HTTP server...");
    server.start().await?;

    let info = server.info();
    info!("✅ PMOCatalog is ready on http://{}:{}", info.base_url, info.http_port);
    info!("Press Ctrl+C to stop...");
    server.wait().await;

    Ok(())
}
