//! Table des symboles : contexte unique de lecture de toutes les requêtes.
//!
//! Construite une fois (`TableSymboles::standard()`), jamais modifiée, passée
//! par référence au parseur. Trois sortes de liaisons :
//! - symboles algébriques libres (x, y, z, t, s, theta)
//! - trig en DEGRÉS : sin/cos/tan convertissent l’argument en radians (·π/180)
//! - constantes / fonctions du noyau : pi, sqrt, log, exp

use std::collections::BTreeMap;

use super::expr::{div, mul, rat_i, Expr};
use super::trig::TrigFn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fonction {
    TrigDegres(TrigFn),
    Racine,
    Log,
    Exp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Liaison {
    Symbole(&'static str),
    Pi,
    Fonction(Fonction),
}

#[derive(Clone, Debug)]
pub struct TableSymboles {
    liaisons: BTreeMap<&'static str, Liaison>,
}

const SYMBOLES: [&str; 6] = ["x", "y", "z", "t", "s", "theta"];

impl TableSymboles {
    pub fn standard() -> Self {
        let mut liaisons = BTreeMap::new();

        for s in SYMBOLES {
            liaisons.insert(s, Liaison::Symbole(s));
        }
        liaisons.insert("θ", Liaison::Symbole("theta"));

        liaisons.insert("pi", Liaison::Pi);
        liaisons.insert("π", Liaison::Pi);

        for f in [TrigFn::Sin, TrigFn::Cos, TrigFn::Tan] {
            liaisons.insert(f.nom(), Liaison::Fonction(Fonction::TrigDegres(f)));
        }
        liaisons.insert("sqrt", Liaison::Fonction(Fonction::Racine));
        liaisons.insert("√", Liaison::Fonction(Fonction::Racine));
        liaisons.insert("log", Liaison::Fonction(Fonction::Log));
        liaisons.insert("exp", Liaison::Fonction(Fonction::Exp));

        Self { liaisons }
    }

    pub fn resout(&self, nom: &str) -> Option<&Liaison> {
        self.liaisons.get(nom)
    }

    pub fn est_fonction(&self, nom: &str) -> bool {
        matches!(self.resout(nom), Some(Liaison::Fonction(_)))
    }
}

impl Liaison {
    /// Valeur d’une liaison utilisée comme atome (symbole ou constante).
    pub fn atome(&self) -> Option<Expr> {
        match self {
            Liaison::Symbole(s) => Some(Expr::Var((*s).to_string())),
            Liaison::Pi => Some(Expr::Pi),
            Liaison::Fonction(_) => None,
        }
    }
}

impl Fonction {
    /// f(arg). Les trig reçoivent des degrés : sin(a) = sin_rad(a·π/180).
    pub fn applique(self, arg: Expr) -> Expr {
        match self {
            Fonction::TrigDegres(f) => f.applique(en_radians(arg)),
            Fonction::Racine => Expr::Sqrt(Box::new(arg)),
            Fonction::Log => Expr::Log(Box::new(arg)),
            Fonction::Exp => Expr::Exp(Box::new(arg)),
        }
    }
}

/// a ↦ a·(π/180)
pub fn en_radians(a: Expr) -> Expr {
    mul(a, div(Expr::Pi, rat_i(180)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn liaisons_standard() {
        let t = TableSymboles::standard();
        assert_eq!(t.resout("x"), Some(&Liaison::Symbole("x")));
        assert_eq!(t.resout("θ"), Some(&Liaison::Symbole("theta")));
        assert_eq!(t.resout("pi"), Some(&Liaison::Pi));
        assert!(t.est_fonction("sin"));
        assert!(t.est_fonction("sqrt"));
        assert!(!t.est_fonction("x"));
        assert_eq!(t.resout("w"), None);
        assert!(t.est_fonction("exp"));
    }

    #[test]
    fn trig_en_degres() {
        let sin = Fonction::TrigDegres(TrigFn::Sin);
        let e = sin.applique(rat_i(60));
        assert_eq!(e, Expr::Sin(Box::new(en_radians(rat_i(60)))));
        assert_eq!(
            Fonction::Log.applique(rat_i(2)),
            Expr::Log(Box::new(rat_i(2)))
        );
    }
}
