//! Génération des identifiants de morceaux et de playlists

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stratégie de génération des identifiants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdStrategy {
    /// Compteur monotone par store : `song_1`, `song_2`, … jamais réutilisé
    #[default]
    Sequential,
    /// `prefix_(N+1)` où N est la taille courante du store. Si l'identifiant
    /// est encore pris (suppression puis insertion), on avance jusqu'au
    /// premier suffixe libre.
    Cardinality,
    /// `prefix_<uuid v4>`
    Uuid,
}

impl IdStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdStrategy::Sequential => "sequential",
            IdStrategy::Cardinality => "cardinality",
            IdStrategy::Uuid => "uuid",
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(IdStrategy::Sequential),
            "cardinality" => Ok(IdStrategy::Cardinality),
            "uuid" => Ok(IdStrategy::Uuid),
            other => Err(Error::UnknownIdStrategy(other.to_string())),
        }
    }
}

/// Générateur d'identifiants pour un store (`song` ou `playlist`)
///
/// Doit être utilisé sous le même verrou que l'insertion qui suit.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: &'static str,
    strategy: IdStrategy,
    counter: u64,
}

impl IdGenerator {
    pub fn new(prefix: &'static str, strategy: IdStrategy) -> Self {
        Self {
            prefix,
            strategy,
            counter: 0,
        }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Prochain identifiant libre
    ///
    /// * `len` - nombre d'enregistrements actuellement dans le store
    /// * `is_taken` - indique si un identifiant est déjà utilisé
    pub fn next_id(&mut self, len: usize, is_taken: impl Fn(&str) -> bool) -> String {
        match self.strategy {
            IdStrategy::Sequential => loop {
                self.counter += 1;
                let id = self.format(self.counter);
                if !is_taken(&id) {
                    return id;
                }
            },
            IdStrategy::Cardinality => {
                let mut n = len as u64 + 1;
                loop {
                    let id = self.format(n);
                    if !is_taken(&id) {
                        return id;
                    }
                    n += 1;
                }
            }
            IdStrategy::Uuid => format!("{}_{}", self.prefix, Uuid::new_v4()),
        }
    }

    fn format(&self, n: u64) -> String {
        format!("{}_{}", self.prefix, n)
    }
}
