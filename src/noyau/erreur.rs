// src/noyau/erreur.rs
//
// Erreurs typées du noyau.
// - Classification : découpe ambiguë (plusieurs '='), syntaxe tronquée (d/d, int vide)
// - Analyse        : le texte extrait ne se lit pas dans la table des symboles
// - Calcul         : le backend ne sait pas conclure (forme non polynomiale, séquence FFT invalide…)
// - Budget         : garde-fou anti-gel dépassé (arbre trop gros, degré trop haut…)
//
// Côté utilisateur, tout est ramené à MESSAGE_GENERIQUE (voir traitements.rs).

use thiserror::Error;

/// Message unique montré à l’utilisateur, quelle que soit la cause.
pub const MESSAGE_GENERIQUE: &str = "Entrée mathématique invalide ou non supportée";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurRequete {
    #[error("classification: {0}")]
    Classification(String),

    #[error("analyse: {0}")]
    Analyse(String),

    #[error("calcul: {0}")]
    Calcul(String),

    #[error("budget dépassé: {0}")]
    Budget(String),
}

impl ErreurRequete {
    pub fn classification(msg: impl Into<String>) -> Self {
        Self::Classification(msg.into())
    }

    pub fn analyse(msg: impl Into<String>) -> Self {
        Self::Analyse(msg.into())
    }

    pub fn calcul(msg: impl Into<String>) -> Self {
        Self::Calcul(msg.into())
    }

    pub fn budget(msg: impl Into<String>) -> Self {
        Self::Budget(msg.into())
    }
}
