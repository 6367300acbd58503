// src/noyau/expr.rs
//
// AST exact (sans flottants).
// - Rat : rationnel exact
// - Pi  : symbole π
// - Indefini : résultat exact indéfini (ex: tan(π/2), 1/0)
// - I   : unité imaginaire (√ d’un négatif, racines complexes), i² = -1
// - Var : symbole libre (ex: x), toujours issu de la table des symboles
// - Sin/Cos/Tan : trig en RADIANS (la conversion degrés -> radians est faite
//   par la table des symboles, pas ici)
// - Log/Exp : logarithme népérien / exponentielle
//
// IMPORTANT (SAFE):
// - simplify() ne doit jamais “inventer” une valeur pour Var.
// - ΣLocal (lecture décimale) est bloquée dès qu'il y a Var.

use crate::noyau::canon::canon_expr;
use crate::noyau::reglages::BITS_MAX;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use std::collections::BTreeSet;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Rat(BigRational),
    Pi,
    I,
    Indefini, // ex: tan(pi/2)

    Var(String),

    Sqrt(Box<Expr>),        // √(x)
    PowInt(Box<Expr>, i64), // x^n (n entier)

    Sin(Box<Expr>),
    Cos(Box<Expr>),
    Tan(Box<Expr>),

    Log(Box<Expr>),
    Exp(Box<Expr>),

    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
}

/* ------------------------ Constructeurs courts ------------------------ */

pub fn rat_i(i: i64) -> Expr {
    Expr::Rat(BigRational::from_integer(BigInt::from(i)))
}

pub fn rat(n: i64, d: i64) -> Expr {
    Expr::Rat(BigRational::new(BigInt::from(n), BigInt::from(d)))
}

#[cfg(test)]
pub fn var(nom: &str) -> Expr {
    Expr::Var(nom.to_string())
}

/// 0 - e (forme historique du “moins unaire”).
pub fn neg(e: Expr) -> Expr {
    match e {
        Expr::Rat(r) => Expr::Rat(-r),
        other => Expr::Sub(Box::new(Expr::Rat(BigRational::zero())), Box::new(other)),
    }
}

pub fn add(a: Expr, b: Expr) -> Expr {
    Expr::Add(Box::new(a), Box::new(b))
}

pub fn sub(a: Expr, b: Expr) -> Expr {
    Expr::Sub(Box::new(a), Box::new(b))
}

pub fn mul(a: Expr, b: Expr) -> Expr {
    Expr::Mul(Box::new(a), Box::new(b))
}

pub fn div(a: Expr, b: Expr) -> Expr {
    Expr::Div(Box::new(a), Box::new(b))
}

pub fn pow(a: Expr, n: i64) -> Expr {
    Expr::PowInt(Box::new(a), n)
}

impl Expr {
    /// Canonicalisation forte (déterminisme structurel).
    /// On garde la canonisation hors de l’AST pour éviter les règles cachées.
    pub fn canon(self) -> Expr {
        canon_expr(self)
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Rat(r) if r.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Rat(r) if r.is_one())
    }

    /// Simplification locale (SAFE), sans heuristiques.
    /// Objectif: réduire ce qui est strictement démontrable sans exploser l’arbre.
    pub fn simplify(self) -> Expr {
        use Expr::*;

        match self {
            // Feuilles: aucune simplification à faire
            Rat(_) | Pi | I | Indefini | Var(_) => self,

            Add(a, b) => {
                let a = a.simplify();
                let b = b.simplify();
                match (&a, &b) {
                    (Indefini, _) | (_, Indefini) => Indefini,
                    (Rat(x), Rat(y)) => Rat(x + y),
                    (Rat(x), _) if x.is_zero() => b,
                    (_, Rat(y)) if y.is_zero() => a,
                    _ => Add(Box::new(a), Box::new(b)),
                }
            }

            Sub(a, b) => {
                let a = a.simplify();
                let b = b.simplify();

                if matches!(a, Indefini) || matches!(b, Indefini) {
                    return Indefini;
                }

                // x - x => 0
                if a == b {
                    return Rat(BigRational::zero());
                }

                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x - y),
                    (_, Rat(y)) if y.is_zero() => a,
                    // 0 - (0 - x) => x
                    (Rat(x), Sub(p, q)) if x.is_zero() && p.is_zero() => (**q).clone(),
                    _ => Sub(Box::new(a), Box::new(b)),
                }
            }

            Mul(a, b) => {
                let a = a.simplify();
                let b = b.simplify();

                if matches!(a, Indefini) || matches!(b, Indefini) {
                    return Indefini;
                }

                // √x * √x => x
                if let (Sqrt(x), Sqrt(y)) = (&a, &b) {
                    if x.as_ref() == y.as_ref() {
                        return (*x.clone()).simplify();
                    }
                }

                // √u * √v => √(u*v) si u,v rationnels >= 0
                if let (Sqrt(u), Sqrt(v)) = (&a, &b) {
                    if let (Rat(ru), Rat(rv)) = (u.as_ref(), v.as_ref()) {
                        if !ru.is_negative() && !rv.is_negative() {
                            return Sqrt(Box::new(Rat(ru * rv))).simplify();
                        }
                    }
                }

                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x * y),
                    (Rat(x), _) if x.is_zero() => Rat(BigRational::zero()),
                    (_, Rat(y)) if y.is_zero() => Rat(BigRational::zero()),
                    (Rat(x), _) if x.is_one() => b,
                    (_, Rat(y)) if y.is_one() => a,
                    _ => Mul(Box::new(a), Box::new(b)),
                }
            }

            Div(a, b) => {
                let a = a.simplify();
                let b = b.simplify();

                if matches!(a, Indefini) || matches!(b, Indefini) {
                    return Indefini;
                }

                // division par zéro exacte => indéfini
                if b.is_zero() {
                    return Indefini;
                }

                // √u / √v => √(u/v) si u,v rationnels > 0
                if let (Sqrt(u), Sqrt(v)) = (&a, &b) {
                    if let (Rat(ru), Rat(rv)) = (u.as_ref(), v.as_ref()) {
                        if ru.is_positive() && rv.is_positive() {
                            return Sqrt(Box::new(Rat(ru / rv))).simplify();
                        }
                    }
                }

                if a == b && !a.is_zero() {
                    return Rat(BigRational::one());
                }

                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x / y),
                    (_, Rat(y)) if y.is_one() => a,
                    (Rat(x), _) if x.is_zero() => Rat(BigRational::zero()),

                    // (p/q) / √n  => (p/qn) * √n, si n entier > 0
                    (Rat(x), Sqrt(inner)) => {
                        if let Rat(rn) = &**inner {
                            if rn.is_positive() && rn.denom().is_one() {
                                let x_over_n = x / rn;
                                return Mul(
                                    Box::new(Rat(x_over_n)),
                                    Box::new(Sqrt(Box::new(Rat(rn.clone())))),
                                )
                                .simplify();
                            }
                        }
                        Div(Box::new(a), Box::new(b))
                    }

                    _ => Div(Box::new(a), Box::new(b)),
                }
            }

            PowInt(base, n) => {
                let base = base.simplify();
                if matches!(base, Indefini) {
                    return Indefini;
                }
                if n == 0 {
                    return Rat(BigRational::one());
                }
                if n == 1 {
                    return base;
                }
                if let Rat(r) = &base {
                    if r.is_zero() && n < 0 {
                        return Indefini;
                    }
                    return match puissance_bornee(r, n) {
                        Some(p) => Rat(p),
                        None => PowInt(Box::new(base), n),
                    };
                }
                // (√x)^(2k) => x^k
                if let Sqrt(x) = &base {
                    if n % 2 == 0 {
                        return PowInt(x.clone(), n / 2).simplify();
                    }
                }
                PowInt(Box::new(base), n)
            }

            Sqrt(x) => {
                let x = x.simplify();
                if matches!(x, Indefini) {
                    return Indefini;
                }
                if let Rat(r) = &x {
                    // √(-r) = i·√r
                    if r.is_negative() {
                        return Mul(Box::new(I), Box::new(Sqrt(Box::new(Rat(-r.clone()))))).simplify();
                    }
                    if let Some(s) = rational_sqrt_exact(r) {
                        return Rat(s);
                    }
                }
                Sqrt(Box::new(x))
            }

            Sin(x) => unaire(*x, Sin),
            Cos(x) => unaire(*x, Cos),
            Tan(x) => unaire(*x, Tan),

            Log(x) => {
                let x = x.simplify();
                match x {
                    Indefini => Indefini,
                    Rat(r) if r.is_one() => Rat(BigRational::zero()),
                    Rat(r) if !r.is_positive() => Indefini,
                    Exp(u) => *u,
                    other => Log(Box::new(other)),
                }
            }

            Exp(x) => {
                let x = x.simplify();
                match x {
                    Indefini => Indefini,
                    Rat(r) if r.is_zero() => Rat(BigRational::one()),
                    Log(u) => *u,
                    other => Exp(Box::new(other)),
                }
            }
        }
    }

    /// Variante plus large (itérative), sans flottants.
    /// SAFE: si ça sort du domaine, retourne None.
    pub fn as_coeff_pi_ext(&self) -> Option<BigRational> {
        use Expr::*;

        const MAX_PILE: usize = 8192;
        const MAX_NOEUDS: usize = 200_000;

        #[derive(Copy, Clone)]
        enum Marque<'a> {
            Entrer(&'a Expr),
            Sortir(&'a Expr),
        }

        // Chaque noeud produit (coeff de π, partie rationnelle) : a·π + r.
        type Lin = Option<(BigRational, BigRational)>;

        let mut pile: Vec<Marque<'_>> = Vec::with_capacity(64);
        let mut res: Vec<Lin> = Vec::with_capacity(64);

        pile.push(Marque::Entrer(self));

        let mut visites: usize = 0;

        while let Some(m) = pile.pop() {
            visites += 1;
            if visites > MAX_NOEUDS || pile.len() > MAX_PILE {
                return None;
            }

            match m {
                Marque::Entrer(e) => {
                    pile.push(Marque::Sortir(e));
                    if let Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) = e {
                        pile.push(Marque::Entrer(b.as_ref()));
                        pile.push(Marque::Entrer(a.as_ref()));
                    }
                }

                Marque::Sortir(e) => {
                    let lin: Lin = match e {
                        Pi => Some((BigRational::one(), BigRational::zero())),
                        Rat(r) => Some((BigRational::zero(), r.clone())),

                        Add(_, _) | Sub(_, _) | Mul(_, _) | Div(_, _) => {
                            let rb = res.pop().unwrap_or(None);
                            let ra = res.pop().unwrap_or(None);
                            match (ra, rb) {
                                (Some((pa, qa)), Some((pb, qb))) => match e {
                                    Add(_, _) => Some((pa + pb, qa + qb)),
                                    Sub(_, _) => Some((pa - pb, qa - qb)),
                                    // (a·π + r)(b·π + s) : π² hors domaine
                                    Mul(_, _) if pa.is_zero() => Some((pb * &qa, qb * qa)),
                                    Mul(_, _) if pb.is_zero() => Some((pa * &qb, qa * qb)),
                                    Div(_, _) if pb.is_zero() && !qb.is_zero() => {
                                        Some((pa / &qb, qa / qb))
                                    }
                                    _ => None,
                                },
                                _ => None,
                            }
                        }

                        // On refuse de “pousser” coeff·π à travers trig/racines/etc.
                        _ => None,
                    };
                    res.push(lin);
                }
            }
        }

        // Seuls les multiples purs de π (partie rationnelle nulle) sont retenus.
        match (res.len(), res.pop()) {
            (1, Some(Some((p, r)))) if r.is_zero() => Some(p),
            _ => None,
        }
    }

    /// Nombre de noeuds (garde-fou budget).
    pub fn noeuds(&self) -> usize {
        use Expr::*;

        let mut pile: Vec<&Expr> = vec![self];
        let mut n: usize = 0;
        while let Some(e) = pile.pop() {
            n += 1;
            match e {
                Rat(_) | Pi | I | Indefini | Var(_) => {}
                Sqrt(x) | PowInt(x, _) | Sin(x) | Cos(x) | Tan(x) | Log(x) | Exp(x) => {
                    pile.push(x)
                }
                Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) => {
                    pile.push(a);
                    pile.push(b);
                }
            }
        }
        n
    }

    /// Vrai si une puissance de rationnel est restée non évaluée (hors BITS_MAX).
    pub fn puissance_non_evaluee(&self) -> bool {
        use Expr::*;

        let mut pile: Vec<&Expr> = vec![self];
        while let Some(e) = pile.pop() {
            match e {
                PowInt(b, _) if matches!(**b, Rat(_)) => return true,
                Rat(_) | Pi | I | Indefini | Var(_) => {}
                Sqrt(x) | PowInt(x, _) | Sin(x) | Cos(x) | Tan(x) | Log(x) | Exp(x) => {
                    pile.push(x)
                }
                Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) => {
                    pile.push(a);
                    pile.push(b);
                }
            }
        }
        false
    }

    /// Symboles libres (ordre alphabétique, déterministe).
    pub fn variables_libres(&self) -> BTreeSet<String> {
        use Expr::*;

        let mut out = BTreeSet::new();
        let mut pile: Vec<&Expr> = vec![self];
        while let Some(e) = pile.pop() {
            match e {
                Var(s) => {
                    out.insert(s.clone());
                }
                Rat(_) | Pi | I | Indefini => {}
                Sqrt(x) | PowInt(x, _) | Sin(x) | Cos(x) | Tan(x) | Log(x) | Exp(x) => {
                    pile.push(x)
                }
                Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) => {
                    pile.push(a);
                    pile.push(b);
                }
            }
        }
        out
    }

    pub fn contient_var(&self, nom: &str) -> bool {
        use Expr::*;
        match self {
            Var(s) => s == nom,
            Rat(_) | Pi | I | Indefini => false,
            Sqrt(x) | PowInt(x, _) | Sin(x) | Cos(x) | Tan(x) | Log(x) | Exp(x) => {
                x.contient_var(nom)
            }
            Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) => {
                a.contient_var(nom) || b.contient_var(nom)
            }
        }
    }

    /// Remplace chaque occurrence de `nom` par `valeur` (sans simplifier).
    pub fn substitue(&self, nom: &str, valeur: &Expr) -> Expr {
        use Expr::*;

        let sub1 = |x: &Expr| Box::new(x.substitue(nom, valeur));
        match self {
            Var(s) if s == nom => valeur.clone(),
            Rat(_) | Pi | I | Indefini | Var(_) => self.clone(),
            Sqrt(x) => Sqrt(sub1(x)),
            PowInt(x, n) => PowInt(sub1(x), *n),
            Sin(x) => Sin(sub1(x)),
            Cos(x) => Cos(sub1(x)),
            Tan(x) => Tan(sub1(x)),
            Log(x) => Log(sub1(x)),
            Exp(x) => Exp(sub1(x)),
            Add(a, b) => Add(sub1(a), sub1(b)),
            Sub(a, b) => Sub(sub1(a), sub1(b)),
            Mul(a, b) => Mul(sub1(a), sub1(b)),
            Div(a, b) => Div(sub1(a), sub1(b)),
        }
    }
}

fn unaire(x: Expr, f: fn(Box<Expr>) -> Expr) -> Expr {
    let x = x.simplify();
    if matches!(x, Expr::Indefini) {
        return Expr::Indefini;
    }
    f(Box::new(x))
}

/* ------------------------ Modulo rationnel exact (sans flottants) ------------------------ */

/// Réduction modulo `periode` sur un coefficient rationnel (ex: periode=2 pour sin/cos, 1 pour tan).
/// Retourne un rationnel dans [0, periode).
///
/// Si coeff = n/d, alors coeff mod periode = (n mod (periode*d))/d.
pub(crate) fn mod_rationnel(coeff: &BigRational, periode: i64) -> BigRational {
    if periode <= 0 || coeff.is_zero() {
        return coeff.clone();
    }

    let d = coeff.denom().clone(); // denom > 0 (num_rational)
    let n = coeff.numer().clone();

    let m = BigInt::from(periode) * &d;
    let mut r = &n % &m;
    if r.is_negative() {
        r += &m;
    }
    BigRational::new(r, d)
}

/* ------------------------ Affichage debug (pas “joli” final) ------------------------ */

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expr::*;
        match self {
            Rat(r) => {
                let n = r.numer();
                let d = r.denom();
                if d.is_one() {
                    write!(f, "{n}")
                } else {
                    write!(f, "{n}/{d}")
                }
            }
            Pi => write!(f, "π"),
            I => write!(f, "i"),
            Indefini => write!(f, "indéfini"),
            Var(s) => write!(f, "{s}"),
            Sqrt(x) => write!(f, "√({x})"),
            PowInt(x, n) => write!(f, "({x})^{n}"),
            Sin(x) => write!(f, "sin({x})"),
            Cos(x) => write!(f, "cos({x})"),
            Tan(x) => write!(f, "tan({x})"),
            Log(x) => write!(f, "log({x})"),
            Exp(x) => write!(f, "exp({x})"),
            Add(a, b) => write!(f, "({a}+{b})"),
            Sub(a, b) => write!(f, "({a}-{b})"),
            Mul(a, b) => write!(f, "({a}*{b})"),
            Div(a, b) => write!(f, "({a}/{b})"),
        }
    }
}

/* ------------------------ Outils rationnels ------------------------ */

/// r^n exact si le résultat tient dans BITS_MAX (estimation avant calcul), sinon None.
pub(crate) fn puissance_bornee(r: &BigRational, n: i64) -> Option<BigRational> {
    // 0, 1, -1 : taille constante
    if r.denom().is_one() && r.numer().abs() <= BigInt::one() {
        return Some(rational_pow_int(r.clone(), n));
    }
    let bits = r.numer().bits().max(r.denom().bits());
    if bits.saturating_mul(n.unsigned_abs()) > BITS_MAX {
        return None;
    }
    Some(rational_pow_int(r.clone(), n))
}

fn rational_pow_int(base: BigRational, exp: i64) -> BigRational {
    if exp == 0 {
        return BigRational::one();
    }
    if exp < 0 {
        let pos = rational_pow_int(base, exp.saturating_neg());
        if pos.is_zero() {
            return pos;
        }
        return BigRational::one() / pos;
    }

    let mut e = exp as u64;
    let mut acc = BigRational::one();
    let mut b = base;

    while e > 0 {
        if (e & 1) == 1 {
            acc *= b.clone();
        }
        e >>= 1;
        if e > 0 {
            b *= b.clone();
        }
    }
    acc
}

pub(crate) fn rational_sqrt_exact(r: &BigRational) -> Option<BigRational> {
    if r.is_negative() {
        return None;
    }
    let sn = int_sqrt_exact(r.numer())?;
    let sd = int_sqrt_exact(r.denom())?;
    Some(BigRational::new(sn, sd))
}

fn int_sqrt_exact(x: &BigInt) -> Option<BigInt> {
    if x.is_negative() {
        return None;
    }
    let s = x.sqrt();
    if &s * &s == *x {
        Some(s)
    } else {
        None
    }
}
