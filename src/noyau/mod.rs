//! Noyau Q-pur : interprète de requêtes mathématiques
//!
//! Chaîne d’une requête :
//!   normalise -> classe -> traitement (équation, dérivée, intégrale, FFT, expression)
//!
//! Organisation interne :
//! - symboles.rs      : table des symboles (trig en degrés, pi, sqrt, log, exp)
//! - normalise.rs     : réécriture du texte brut (casse, ^, sin 60)
//! - classe.rs        : classification ordonnée en cinq genres
//! - traitements.rs   : Moteur (resoudre / repondre) + Resultat
//! - erreur.rs        : erreurs typées
//! - reglages.rs      : précision ΣLocal + garde-fous
//! - jetons.rs, rpn.rs, eval.rs : lecture texte -> Expr, forme automatique, simplification
//! - expr.rs, canon.rs, trig.rs, identites_trig.rs : AST exact, forme canon, angles, identités
//! - derivee.rs, poly.rs, resolution.rs, integrale.rs, spectre.rs : calcul
//! - lecture.rs       : ΣLocal (décimal tronqué)
//! - format.rs        : affichage exact

pub mod canon;
pub mod classe;
pub mod derivee;
pub mod erreur;
pub mod eval;
pub mod expr;
pub mod format;
pub mod identites_trig;
pub mod integrale;
pub mod jetons;
pub mod lecture;
pub mod normalise;
pub mod poly;
pub mod reglages;
pub mod resolution;
pub mod rpn;
pub mod spectre;
pub mod symboles;
pub mod traitements;
pub mod trig;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use classe::Genre;
pub use reglages::{Reglages, DIGITS_MAX};
pub use traitements::{Moteur, Resultat};
