//! Extension de pmoconfig pour le catalogue
//!
//! Clés gérées (section `catalog`) :
//!
//! - `catalog.id_strategy` : `sequential` (défaut), `cardinality` ou `uuid`
//! - `catalog.strict_not_found` : `false` (défaut) conserve la réponse
//!   historique `200 {"error": ...}` des GET sur un identifiant inconnu,
//!   `true` répond `404`
//!
//! Les getters persistent automatiquement la valeur par défaut si la clé
//! n'existe pas encore.

use crate::ids::IdStrategy;
use anyhow::Result;
use pmoconfig::Config;
use serde_yaml::Value;

const ID_STRATEGY_PATH: &[&str] = &["catalog", "id_strategy"];
const STRICT_NOT_FOUND_PATH: &[&str] = &["catalog", "strict_not_found"];

/// Trait d'extension pour pmoconfig::Config
pub trait CatalogConfigExt {
    /// Stratégie de génération des identifiants
    fn get_catalog_id_strategy(&self) -> Result<IdStrategy>;

    fn set_catalog_id_strategy(&self, strategy: IdStrategy) -> Result<()>;

    /// Répondre 404 (au lieu de 200 + erreur) sur un GET inconnu
    fn get_catalog_strict_not_found(&self) -> Result<bool>;

    fn set_catalog_strict_not_found(&self, strict: bool) -> Result<()>;
}

impl CatalogConfigExt for Config {
    fn get_catalog_id_strategy(&self) -> Result<IdStrategy> {
        match self.get_value(ID_STRATEGY_PATH) {
            Ok(Value::String(s)) => Ok(s.parse::<IdStrategy>()?),
            _ => {
                let strategy = IdStrategy::default();
                self.set_catalog_id_strategy(strategy)?;
                Ok(strategy)
            }
        }
    }

    fn set_catalog_id_strategy(&self, strategy: IdStrategy) -> Result<()> {
        self.set_value(ID_STRATEGY_PATH, Value::String(strategy.to_string()))
    }

    fn get_catalog_strict_not_found(&self) -> Result<bool> {
        match self.get_value(STRICT_NOT_FOUND_PATH) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => {
                self.set_catalog_strict_not_found(false)?;
                Ok(false)
            }
        }
    }

    fn set_catalog_strict_not_found(&self, strict: bool) -> Result<()> {
        self.set_value(STRICT_NOT_FOUND_PATH, Value::Bool(strict))
    }
}
