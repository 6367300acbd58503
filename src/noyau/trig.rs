// src/noyau/trig.rs
//
// Trig spéciale (angles “exactement reconnus”) pour sin/cos/tan
// -----------------------------------------------------------
// - Extraction coeff·π via as_coeff_pi_ext() (l’argument est déjà en radians :
//   sin(60) de la table des symboles arrive ici comme sin(60·π/180))
// - Réduction modulo période via mod_rationnel() (sin/cos: 2 ; tan: 1)
// - Table angles spéciaux sur n ∈ {1,2,3,4,6}

use num_rational::BigRational;
use num_traits::ToPrimitive;

use super::expr::{div, mod_rationnel, neg, rat, rat_i, Expr};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrigFn {
    Sin,
    Cos,
    Tan,
}

impl TrigFn {
    pub fn nom(self) -> &'static str {
        match self {
            TrigFn::Sin => "sin",
            TrigFn::Cos => "cos",
            TrigFn::Tan => "tan",
        }
    }

    /// Construit f(x) (radians).
    pub fn applique(self, x: Expr) -> Expr {
        match self {
            TrigFn::Sin => Expr::Sin(Box::new(x)),
            TrigFn::Cos => Expr::Cos(Box::new(x)),
            TrigFn::Tan => Expr::Tan(Box::new(x)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrigOutcome {
    Valeur(Expr),
    Indefini,
}

/// Reconnaît les angles spéciaux pour sin/cos/tan lorsque l’entrée est un multiple rationnel de π.
///
/// Retour:
/// - Some(Valeur(expr_exact)) si reconnu
/// - Some(Indefini) si indéfini (tan(π/2), tan(3π/2))
/// - None si non reconnu
pub fn trig_special(x: &Expr, f: TrigFn) -> Option<TrigOutcome> {
    // 1) extraire coeff·π sur domaine étendu (Add/Sub/Mul/Div rationnels)
    let coeff = x.as_coeff_pi_ext()?;

    // 2) réduire modulo période
    let coeff_reduit = match f {
        TrigFn::Sin | TrigFn::Cos => mod_rationnel(&coeff, 2),
        TrigFn::Tan => mod_rationnel(&coeff, 1),
    };

    // 3) convertir en k/n "petit"
    let (k, n) = rational_to_small_kn(&coeff_reduit)?;

    // 4) tables codées sur [0,2π)
    let k_mod = k.rem_euclid(2 * n);

    let racine = |v: i64| Expr::Sqrt(Box::new(rat_i(v)));
    let sqrt2_over_2 = div(racine(2), rat_i(2));
    let sqrt3_over_2 = div(racine(3), rat_i(2));
    let sqrt3_over_3 = div(racine(3), rat_i(3));

    use TrigOutcome::{Indefini, Valeur};

    let out = match f {
        TrigFn::Sin => match (k_mod, n) {
            (0, _) | (1, 1) => Valeur(rat_i(0)),
            (1, 6) | (5, 6) => Valeur(rat(1, 2)),
            (7, 6) | (11, 6) => Valeur(rat(-1, 2)),
            (1, 4) | (3, 4) => Valeur(sqrt2_over_2),
            (5, 4) | (7, 4) => Valeur(neg(sqrt2_over_2)),
            (1, 3) | (2, 3) => Valeur(sqrt3_over_2),
            (4, 3) | (5, 3) => Valeur(neg(sqrt3_over_2)),
            (1, 2) => Valeur(rat_i(1)),
            (3, 2) => Valeur(rat_i(-1)),
            _ => return None,
        },

        TrigFn::Cos => match (k_mod, n) {
            (0, _) => Valeur(rat_i(1)),
            (1, 1) => Valeur(rat_i(-1)),
            (1, 6) | (11, 6) => Valeur(sqrt3_over_2),
            (5, 6) | (7, 6) => Valeur(neg(sqrt3_over_2)),
            (1, 4) | (7, 4) => Valeur(sqrt2_over_2),
            (3, 4) | (5, 4) => Valeur(neg(sqrt2_over_2)),
            (1, 3) | (5, 3) => Valeur(rat(1, 2)),
            (2, 3) | (4, 3) => Valeur(rat(-1, 2)),
            (1, 2) | (3, 2) => Valeur(rat_i(0)),
            _ => return None,
        },

        TrigFn::Tan => match (k_mod, n) {
            (0, _) | (1, 1) => Valeur(rat_i(0)),
            (1, 6) | (7, 6) => Valeur(sqrt3_over_3),
            (5, 6) | (11, 6) => Valeur(neg(sqrt3_over_3)),
            (1, 4) | (5, 4) => Valeur(rat_i(1)),
            (3, 4) | (7, 4) => Valeur(rat_i(-1)),
            (1, 3) | (4, 3) => Valeur(racine(3)),
            (2, 3) | (5, 3) => Valeur(neg(racine(3))),
            (1, 2) | (3, 2) => Indefini,
            _ => return None,
        },
    };

    Some(out)
}

/// Applique trig_special PARTOUT dans l’arbre (descente structurée), puis simplify.
pub fn applique_trig_speciale(expr: &Expr) -> Expr {
    use Expr::*;

    let trig = |x: &Expr, f: TrigFn| match trig_special(x, f) {
        Some(TrigOutcome::Valeur(v)) => v,
        Some(TrigOutcome::Indefini) => Indefini,
        None => f.applique(applique_trig_speciale(x)),
    };
    let descend = |x: &Expr| Box::new(applique_trig_speciale(x));

    let out = match expr {
        Sin(x) => trig(x, TrigFn::Sin),
        Cos(x) => trig(x, TrigFn::Cos),
        Tan(x) => trig(x, TrigFn::Tan),

        Add(a, b) => Add(descend(a), descend(b)),
        Sub(a, b) => Sub(descend(a), descend(b)),
        Mul(a, b) => Mul(descend(a), descend(b)),
        Div(a, b) => Div(descend(a), descend(b)),

        Sqrt(x) => Sqrt(descend(x)),
        PowInt(x, n) => PowInt(descend(x), *n),
        Log(x) => Log(descend(x)),
        Exp(x) => Exp(descend(x)),

        Rat(_) | Pi | I | Indefini | Var(_) => expr.clone(),
    };

    // Un seul simplify à la fin.
    out.simplify()
}

/* ------------------------ Outils ------------------------ */

/// Convertit un rationnel en (k,n) i64 réduit.
/// Accepte seulement n ∈ {1,2,3,4,6}.
fn rational_to_small_kn(r: &BigRational) -> Option<(i64, i64)> {
    // num_rational garde la fraction réduite, dénominateur > 0
    let n = r.denom().to_i64()?;
    let k = r.numer().to_i64()?;

    if [1, 2, 3, 4, 6].contains(&n) {
        Some((k, n))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::expr::mul;

    fn degres(a: i64) -> Expr {
        mul(rat_i(a), div(Expr::Pi, rat_i(180)))
    }

    #[test]
    fn angles_en_degres() {
        assert_eq!(
            trig_special(&degres(30), TrigFn::Sin),
            Some(TrigOutcome::Valeur(rat(1, 2)))
        );
        assert_eq!(
            trig_special(&degres(180), TrigFn::Cos),
            Some(TrigOutcome::Valeur(rat_i(-1)))
        );
        assert_eq!(
            trig_special(&degres(90), TrigFn::Tan),
            Some(TrigOutcome::Indefini)
        );
        assert_eq!(
            trig_special(&degres(-45), TrigFn::Tan),
            Some(TrigOutcome::Valeur(rat_i(-1)))
        );
    }

    #[test]
    fn angle_non_special() {
        assert_eq!(trig_special(&degres(10), TrigFn::Sin), None);
        assert_eq!(trig_special(&Expr::Var("x".into()), TrigFn::Cos), None);
    }

    #[test]
    fn descente_dans_arbre() {
        // 2*cos(60°) + sin(x) : seul le cos est remplacé
        let e = Expr::Add(
            Box::new(mul(rat_i(2), Expr::Cos(Box::new(degres(60))))),
            Box::new(Expr::Sin(Box::new(Expr::Var("x".into())))),
        );
        let r = applique_trig_speciale(&e);
        assert_eq!(
            r,
            Expr::Add(
                Box::new(rat_i(1)),
                Box::new(Expr::Sin(Box::new(Expr::Var("x".into()))))
            )
        );
    }
}
