// src/noyau/derivee.rs
//
// Dérivation symbolique exacte d/dv.
// Règles : somme, produit, quotient, puissance entière, chaîne pour √ sin cos tan log exp.
// Le résultat est brut (non simplifié) : l’appelant passe par forme_auto.
//
// Les trig de la table reçoivent déjà l’argument converti (a·π/180),
// la règle de chaîne fait donc apparaître le facteur π/180 toute seule.

use super::expr::{add, div, mul, neg, pow, rat_i, sub, Expr};

pub fn derive(e: &Expr, v: &str) -> Expr {
    use Expr::*;

    if matches!(e, Indefini) {
        return Indefini;
    }
    if !e.contient_var(v) {
        return rat_i(0);
    }

    match e {
        Var(_) => rat_i(1),

        Add(a, b) => add(derive(a, v), derive(b, v)),
        Sub(a, b) => sub(derive(a, v), derive(b, v)),

        // (ab)' = a'b + ab'
        Mul(a, b) => add(
            mul(derive(a, v), (**b).clone()),
            mul((**a).clone(), derive(b, v)),
        ),

        // (a/b)' = (a'b - ab') / b²
        Div(a, b) => div(
            sub(
                mul(derive(a, v), (**b).clone()),
                mul((**a).clone(), derive(b, v)),
            ),
            pow((**b).clone(), 2),
        ),

        // (u^n)' = n·u^(n-1)·u'
        PowInt(u, n) => mul(
            mul(rat_i(*n), pow((**u).clone(), n.saturating_sub(1))),
            derive(u, v),
        ),

        // (√u)' = u' / (2√u)
        Sqrt(u) => div(derive(u, v), mul(rat_i(2), e.clone())),

        Sin(u) => mul(Cos(u.clone()), derive(u, v)),
        Cos(u) => neg(mul(Sin(u.clone()), derive(u, v))),
        // (tan u)' = u' / cos²u
        Tan(u) => div(derive(u, v), pow(Cos(u.clone()), 2)),

        Log(u) => div(derive(u, v), (**u).clone()),
        Exp(u) => mul(e.clone(), derive(u, v)),

        // sans v : traité plus haut
        Rat(_) | Pi | I | Indefini => rat_i(0),
    }
}
