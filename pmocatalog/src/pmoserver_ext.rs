//! # Extension pmoserver pour le catalogue
//!
//! Le trait [`CatalogServerExt`] monte l'API REST du catalogue sur un
//! `pmoserver::Server` sans que `pmoserver` ne connaisse `pmocatalog`.
//!
//! Les routes (`/song`, `/playlist`) sont montées à la racine ; la
//! documentation est servie sous `/swagger-ui/catalog`.
//!
//! ```rust,ignore
//! use pmocatalog::CatalogServerExt;
//! use pmoserver::ServerBuilder;
//!
//! let mut server = ServerBuilder::new_configured().build();
//! let catalog = server.init_catalog_api().await?;
//! server.start().await?;
//! ```

use crate::api::{catalog_api_router, NotFoundPolicy};
use crate::config_ext::CatalogConfigExt;
use crate::openapi::ApiDoc;
use crate::Catalog;
use anyhow::Result;
use tracing::info;
use utoipa::OpenApi;

/// Trait d'extension pour `pmoserver::Server`
#[async_trait::async_trait]
pub trait CatalogServerExt {
    /// Crée un catalogue vide d'après la configuration et monte son API
    ///
    /// Lit `catalog.id_strategy` et `catalog.strict_not_found`.
    /// Retourne le handle du catalogue, partagé avec les handlers.
    async fn init_catalog_api(&mut self) -> Result<Catalog>;

    /// Monte l'API d'un catalogue existant
    async fn init_catalog_api_with(&mut self, catalog: Catalog, not_found: NotFoundPolicy);
}

#[async_trait::async_trait]
impl CatalogServerExt for pmoserver::Server {
    async fn init_catalog_api(&mut self) -> Result<Catalog> {
        let config = pmoconfig::get_config();
        let strategy = config.get_catalog_id_strategy()?;
        let not_found = NotFoundPolicy::from_strict(config.get_catalog_strict_not_found()?);

        let catalog = Catalog::new(strategy);
        self.init_catalog_api_with(catalog.clone(), not_found).await;

        info!(strategy = %strategy, ?not_found, "Catalog API initialized");
        Ok(catalog)
    }

    async fn init_catalog_api_with(&mut self, catalog: Catalog, not_found: NotFoundPolicy) {
        let router = catalog_api_router(catalog, not_found);
        self.add_openapi_at("/", router, ApiDoc::openapi(), "catalog")
            .await;
    }
}
