//! Réglages du noyau (précision ΣLocal + garde-fous anti-gel).
//!
//! Aucune source externe : pas de fichier, pas de variable d’environnement.
//! Les setters bornent les valeurs, comme le réglage de digits côté UI.

use super::erreur::ErreurRequete;
use super::expr::Expr;

/// Précision ΣLocal par défaut (lecture décimale tronquée).
pub const DIGITS_DEFAUT: usize = 20;

/// Garde-fou : on borne la précision (anti-abus / anti-gel).
pub const DIGITS_MAX: usize = 200;

/// Exposant entier maximal accepté (parseur).
pub const EXPOSANT_MAX: i64 = 1024;

/// Taille maximale (bits) d’un rationnel obtenu par puissance exacte.
/// Au-delà, la puissance reste non évaluée et la requête sort en Budget.
pub const BITS_MAX: u64 = 1 << 16;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reglages {
    /// Chiffres après la virgule pour ΣLocal.
    pub digits: usize,
    /// Longueur maximale d’une requête (caractères).
    pub longueur_max: usize,
    /// Taille maximale d’un arbre d’expression (noeuds).
    pub noeuds_max: usize,
    /// Degré polynomial maximal (résolution, intégration).
    pub degre_max: usize,
    /// Nombre maximal de candidats racines rationnelles essayés.
    pub candidats_max: usize,
    /// Longueur maximale d’une séquence FFT.
    pub echantillons_max: usize,
}

impl Default for Reglages {
    fn default() -> Self {
        Self {
            digits: DIGITS_DEFAUT,
            longueur_max: 1000,
            noeuds_max: 20_000,
            degre_max: 64,
            candidats_max: 20_000,
            echantillons_max: 65_536,
        }
    }
}

impl Reglages {
    pub fn set_digits(&mut self, digits: usize) {
        self.digits = digits.min(DIGITS_MAX);
    }

    pub fn verifie_longueur(&self, requete: &str) -> Result<(), ErreurRequete> {
        let n = requete.chars().count();
        if n > self.longueur_max {
            return Err(ErreurRequete::budget(format!(
                "requête de {n} caractères (max {})",
                self.longueur_max
            )));
        }
        Ok(())
    }

    pub fn verifie_noeuds(&self, noeuds: usize) -> Result<(), ErreurRequete> {
        if noeuds > self.noeuds_max {
            return Err(ErreurRequete::budget(format!(
                "expression de {noeuds} noeuds (max {})",
                self.noeuds_max
            )));
        }
        Ok(())
    }

    /// Une puissance rationnelle restée non évaluée après forme_auto
    /// est une puissance hors budget (cf. BITS_MAX).
    pub fn verifie_puissances(&self, e: &Expr) -> Result<(), ErreurRequete> {
        if e.puissance_non_evaluee() {
            return Err(ErreurRequete::budget(format!(
                "puissance exacte de plus de {BITS_MAX} bits"
            )));
        }
        Ok(())
    }

    pub fn verifie_degre(&self, degre: usize) -> Result<(), ErreurRequete> {
        if degre > self.degre_max {
            return Err(ErreurRequete::budget(format!(
                "degré {degre} (max {})",
                self.degre_max
            )));
        }
        Ok(())
    }
}
