//! Noyau : lecture et évaluation automatique (pipeline réel)
//!
//! analyse    : tokenize -> produits implicites -> RPN -> Expr (table des symboles)
//! forme_auto : simplify -> trig spéciale (récursive) -> canon (x2 si ça bouge)
//! simplifie  : forme_auto -> identités trig (SAFE) -> forme_auto
//!
//! Remarque : trig spéciale est appliquée ici (pas dans Expr::simplify),
//! pour garder l’AST sans table d’angles.

use tracing::trace;

use super::erreur::ErreurRequete;
use super::expr::Expr;
use super::identites_trig::trig_identites;
use super::jetons::tokenize;
use super::lecture::lecture_decimale;
use super::rpn::{from_rpn, produits_implicites, to_rpn};
use super::symboles::TableSymboles;
use super::trig::applique_trig_speciale;

/// Lit un texte en Expr dans le contexte de la table des symboles.
pub fn analyse(texte: &str, table: &TableSymboles) -> Result<Expr, ErreurRequete> {
    let s = texte.trim();
    if s.is_empty() {
        return Err(ErreurRequete::analyse("entrée vide"));
    }

    // 1) Jetons (+ '*' implicites)
    let jetons = produits_implicites(tokenize(s)?, table);

    // 2) RPN
    let rpn = to_rpn(&jetons, table)?;

    // 3) AST (Expr)
    let e = from_rpn(rpn)?;
    trace!(texte = s, expr = %e, "analyse");
    Ok(e)
}

/// Évaluation automatique : ce qu’un CAS fait sans qu’on le demande
/// (rationnels, angles spéciaux, forme canon). Pas d’identités.
pub fn forme_auto(e: Expr) -> Expr {
    let s0 = e.simplify();
    let s1 = applique_trig_speciale(&s0).canon();

    // la forme canon peut révéler un angle spécial (ex: sin(x - x + 30))
    let s2 = applique_trig_speciale(&s1).canon();
    if s2 == s1 {
        s1
    } else {
        applique_trig_speciale(&s2).canon()
    }
}

/// Simplification complète : évaluation automatique + identités trig.
pub fn simplifie(e: Expr) -> Expr {
    let a = forme_auto(e);
    let b = trig_identites(a);
    forme_auto(b)
}

/// ΣLocal : lecture décimale, None si indéfini OU si symbole libre.
pub fn lecture_si_constante(e: &Expr, digits: usize) -> Option<String> {
    if matches!(e, Expr::Indefini) || !e.variables_libres().is_empty() {
        return None;
    }
    lecture_decimale(e, digits).ok()
}
