// src/noyau/canon.rs
//
// Canonicalisation forte (déterministe) :
// - aplatissement Add/Sub et Mul
// - Div(a, b) => a * b^-1 (une seule forme pour les quotients)
// - regroupement des termes semblables (2x + 3x => 5x) et des facteurs semblables (x*x => x^2)
// - extraction / remontée du signe (Sub(0,x) comme “-x” canon)
// - produit des racines rationnelles (√2*√3 => √6) + extraction des carrés parfaits
// - √ d’un négatif => i·√, puissances de i réduites modulo 4
// - un coefficient seul devant une somme est distribué (2(x+1) => 2x + 2)
// - tri déterministe : facteurs (rationnel d’abord), termes (degré décroissant, constante en dernier)
//
// Note : on reste “local” (les identités trig vivent dans identites_trig.rs).

use crate::noyau::expr::{neg, puissance_bornee, Expr};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;

/// Profondeur max des re-passes de canon_mul (quand une puissance se re-développe).
const MAX_REPASSES: u8 = 4;

/// Borne de la recherche de carrés parfaits dans √n (essais de diviseurs).
const MAX_ESSAIS_CARRES: u64 = 100_000;

pub fn canon_expr(e: Expr) -> Expr {
    use Expr::*;

    match e {
        Rat(_) | Pi | I | Indefini | Var(_) => e,

        Sqrt(x) => canon_sqrt(canon_expr(*x)),
        PowInt(x, n) => canon_pow(canon_expr(*x), n),

        Sin(x) => unaire(canon_expr(*x), Sin),
        Cos(x) => unaire(canon_expr(*x), Cos),
        Tan(x) => unaire(canon_expr(*x), Tan),
        Log(x) => unaire(canon_expr(*x), Log),
        Exp(x) => match canon_expr(*x) {
            Indefini => Indefini,
            x if x.is_zero() => Rat(BigRational::one()),
            x => Exp(Box::new(x)),
        },

        Add(a, b) => canon_addsub(Add(Box::new(canon_expr(*a)), Box::new(canon_expr(*b)))),
        Sub(a, b) => canon_addsub(Sub(Box::new(canon_expr(*a)), Box::new(canon_expr(*b)))),

        Mul(a, b) => canon_mul(Mul(Box::new(canon_expr(*a)), Box::new(canon_expr(*b)))),

        Div(a, b) => canon_div(canon_expr(*a), canon_expr(*b)),
    }
}

fn unaire(x: Expr, f: fn(Box<Expr>) -> Expr) -> Expr {
    if matches!(x, Expr::Indefini) {
        return Expr::Indefini;
    }
    f(Box::new(x))
}

/* ------------------------ clef de tri déterministe ------------------------ */

fn rang(e: &Expr) -> u8 {
    use Expr::*;
    match e {
        Rat(_) => 0,
        Pi => 1,
        Sqrt(_) => 2,
        Var(_) => 3,
        I => 4,
        PowInt(b, _) => rang(b).max(1),
        Sin(_) | Cos(_) | Tan(_) => 5,
        Log(_) | Exp(_) => 6,
        Add(_, _) | Sub(_, _) => 7,
        Mul(_, _) | Div(_, _) => 8,
        Indefini => 255,
    }
}

pub(crate) fn key_string(e: &Expr) -> String {
    use Expr::*;
    match e {
        Rat(r) => {
            let n = r.numer().to_string();
            let d = r.denom().to_string();
            format!("R{n}/{d}")
        }
        Var(s) => format!("VAR({s})"),
        Pi => "PI".to_string(),
        I => "IMAG".to_string(),
        Indefini => "INDEF".to_string(),

        Sqrt(x) => format!("SQRT({})", key_string(x)),
        PowInt(x, n) => format!("POW({},{n})", key_string(x)),

        Sin(x) => format!("SIN({})", key_string(x)),
        Cos(x) => format!("COS({})", key_string(x)),
        Tan(x) => format!("TAN({})", key_string(x)),
        Log(x) => format!("LOG({})", key_string(x)),
        Exp(x) => format!("EXP({})", key_string(x)),

        Add(a, b) => format!("ADD({},{})", key_string(a), key_string(b)),
        Sub(a, b) => format!("SUB({},{})", key_string(a), key_string(b)),
        Mul(a, b) => format!("MUL({},{})", key_string(a), key_string(b)),
        Div(a, b) => format!("DIV({},{})", key_string(a), key_string(b)),
    }
}

fn base_de(e: &Expr) -> &Expr {
    match e {
        Expr::PowInt(b, _) => b,
        other => other,
    }
}

fn cmp_facteur(a: &Expr, b: &Expr) -> Ordering {
    rang(a)
        .cmp(&rang(b))
        .then_with(|| key_string(base_de(a)).cmp(&key_string(base_de(b))))
        .then_with(|| key_string(a).cmp(&key_string(b)))
}

/// Degré “polynomial” total (tri des termes : degré élevé d’abord).
pub(crate) fn degre(e: &Expr) -> i64 {
    use Expr::*;
    match e {
        Var(_) => 1,
        PowInt(b, n) => degre(b).saturating_mul(*n),
        Mul(a, b) => degre(a).saturating_add(degre(b)),
        Sub(a, b) if a.is_zero() => degre(b),
        _ => 0,
    }
}

fn cmp_terme(a: &Expr, b: &Expr) -> Ordering {
    degre(b)
        .cmp(&degre(a))
        .then_with(|| cmp_facteur(a, b))
}

/* ------------------------ Add/Sub : aplatissement + regroupement + reconstruction ------------------------ */

pub(crate) fn collect_addsub(e: Expr, negatif: bool, out: &mut Vec<Expr>) {
    use Expr::*;
    match e {
        Add(a, b) => {
            collect_addsub(*a, negatif, out);
            collect_addsub(*b, negatif, out);
        }
        Sub(a, b) => {
            collect_addsub(*a, negatif, out);
            collect_addsub(*b, !negatif, out);
        }
        other if negatif => out.push(neg(other)),
        other => out.push(other),
    }
}

/// Sépare un terme en (coefficient rationnel, reste non numérique).
pub(crate) fn coeff_et_reste(t: Expr) -> (BigRational, Option<Expr>) {
    use Expr::*;

    let mut c = BigRational::one();
    let mut autres: Vec<Expr> = Vec::new();
    let mut pile: Vec<Expr> = vec![t];

    while let Some(f) = pile.pop() {
        match f {
            Rat(r) => c *= r,
            Sub(a, b) if a.is_zero() => {
                c = -c;
                pile.push(*b);
            }
            Mul(a, b) => {
                pile.push(*b);
                pile.push(*a);
            }
            other => autres.push(other),
        }
    }

    (c, produit_gauche(autres))
}

fn produit_gauche(facteurs: Vec<Expr>) -> Option<Expr> {
    let mut it = facteurs.into_iter();
    let premier = it.next()?;
    Some(it.fold(premier, |acc, f| Expr::Mul(Box::new(acc), Box::new(f))))
}

/// c * reste, avec le rationnel en tête (forme canon d’un terme).
fn fabrique_terme(c: BigRational, reste: Expr) -> Expr {
    if c.is_one() {
        return reste;
    }
    if (-c.clone()).is_one() {
        return neg(reste);
    }
    let mut facteurs = Vec::new();
    collect_mul(reste, &mut facteurs);
    let mut acc = Expr::Rat(c);
    for f in facteurs {
        acc = Expr::Mul(Box::new(acc), Box::new(f));
    }
    acc
}

fn canon_addsub(e: Expr) -> Expr {
    // On reçoit déjà des sous-termes canonisés (canon_expr).
    let mut termes: Vec<Expr> = Vec::new();
    collect_addsub(e, false, &mut termes);

    if termes.iter().any(|t| matches!(t, Expr::Indefini)) {
        return Expr::Indefini;
    }

    let mut constante = BigRational::zero();
    let mut groupes: Vec<(Expr, BigRational)> = Vec::with_capacity(termes.len());

    for t in termes {
        match coeff_et_reste(t) {
            (c, None) => constante += c,
            (c, Some(reste)) => match groupes.iter_mut().find(|(r, _)| *r == reste) {
                Some((_, total)) => *total += c,
                None => groupes.push((reste, c)),
            },
        }
    }

    groupes.retain(|(_, c)| !c.is_zero());
    groupes.sort_by(|(a, _), (b, _)| cmp_terme(a, b));

    let mut morceaux: Vec<(BigRational, Option<Expr>)> = groupes
        .into_iter()
        .map(|(reste, c)| (c, Some(reste)))
        .collect();
    if !constante.is_zero() {
        morceaux.push((constante, None));
    }

    if morceaux.is_empty() {
        return Expr::Rat(BigRational::zero());
    }

    // Reconstruction “jolie” : si le terme suivant est négatif, on utilise Sub(acc, abs).
    let mut acc: Option<Expr> = None;
    for (c, reste) in morceaux {
        let negatif = c.is_negative();
        let terme = |c: BigRational| match reste {
            Some(r) => fabrique_terme(c, r),
            None => Expr::Rat(c),
        };
        acc = Some(match acc {
            None => terme(c),
            Some(a) if negatif => Expr::Sub(Box::new(a), Box::new(terme(-c))),
            Some(a) => Expr::Add(Box::new(a), Box::new(terme(c))),
        });
    }
    acc.unwrap_or_else(|| Expr::Rat(BigRational::zero()))
}

/* ------------------------ Mul : aplatissement + signe + regroupement + tri ------------------------ */

pub(crate) fn collect_mul(e: Expr, out: &mut Vec<Expr>) {
    use Expr::*;
    match e {
        Mul(a, b) => {
            collect_mul(*a, out);
            collect_mul(*b, out);
        }
        other => out.push(other),
    }
}

fn est_somme(e: &Expr) -> bool {
    match e {
        Expr::Add(_, _) => true,
        Expr::Sub(a, _) => !a.is_zero(),
        _ => false,
    }
}

fn canon_mul(e: Expr) -> Expr {
    canon_mul_prof(e, 0)
}

fn ajoute(base: Expr, n: i64, groupes: &mut Vec<(Expr, i64)>) {
    match groupes.iter_mut().find(|(b, _)| *b == base) {
        Some((_, total)) => *total = total.saturating_add(n),
        None => groupes.push((base, n)),
    }
}

fn canon_mul_prof(e: Expr, profondeur: u8) -> Expr {
    use Expr::*;

    let mut pile: Vec<Expr> = Vec::new();
    collect_mul(e, &mut pile);
    pile.reverse();

    let mut coeff = BigRational::one();
    let mut sqrt_rat = BigRational::one();
    let mut exp_args: Vec<Expr> = Vec::new();
    let mut groupes: Vec<(Expr, i64)> = Vec::new();

    while let Some(f) = pile.pop() {
        match f {
            Indefini => return Indefini,
            Rat(r) => {
                if r.is_zero() {
                    return Rat(BigRational::zero());
                }
                coeff *= r;
            }
            Sub(a, b) if a.is_zero() => {
                coeff = -coeff;
                pile.push(*b);
            }
            Mul(a, b) => {
                pile.push(*b);
                pile.push(*a);
            }
            Sqrt(x) => match *x {
                Rat(r) if r.is_positive() => sqrt_rat *= r,
                other => ajoute(Sqrt(Box::new(other)), 1, &mut groupes),
            },
            Exp(u) => exp_args.push(*u),
            PowInt(b, n) => ajoute(*b, n, &mut groupes),
            other => ajoute(other, 1, &mut groupes),
        }
    }

    // √ rationnels : un seul radical, carrés parfaits extraits
    if !sqrt_rat.is_one() {
        match canon_sqrt(Rat(sqrt_rat)) {
            Rat(s) => coeff *= s,
            Mul(a, b) => {
                if let Rat(s) = *a {
                    coeff *= s;
                }
                groupes.push((*b, 1));
            }
            autre => groupes.push((autre, 1)),
        }
    }

    // exp(a) * exp(b) => exp(a + b)
    if !exp_args.is_empty() {
        let somme = exp_args
            .into_iter()
            .reduce(|a, b| Add(Box::new(a), Box::new(b)))
            .map(canon_addsub);
        match somme {
            Some(s) if s.is_zero() => {}
            Some(s) => groupes.push((Exp(Box::new(s)), 1)),
            None => {}
        }
    }

    let mut facteurs: Vec<Expr> = Vec::with_capacity(groupes.len());
    let mut refaire = false;

    for (base, n) in groupes {
        if n == 0 {
            continue;
        }
        let attendu = if n == 1 {
            base.clone()
        } else {
            PowInt(Box::new(base.clone()), n)
        };
        let p = canon_pow(base, n);
        match p {
            Rat(r) => {
                if r.is_zero() {
                    return Rat(BigRational::zero());
                }
                coeff *= r;
            }
            Indefini => return Indefini,
            p if p == attendu => facteurs.push(p),
            p => {
                refaire = true;
                facteurs.push(p);
            }
        }
    }

    if refaire && profondeur < MAX_REPASSES {
        let mut acc = Rat(coeff);
        for f in facteurs {
            acc = Mul(Box::new(acc), Box::new(f));
        }
        return canon_mul_prof(acc, profondeur + 1);
    }

    if coeff.is_zero() {
        return Rat(BigRational::zero());
    }

    facteurs.sort_by(cmp_facteur);

    // Coefficient seul devant une somme : distribution
    if facteurs.len() == 1 && !coeff.is_one() && est_somme(&facteurs[0]) {
        let mut termes = Vec::new();
        if let Some(somme) = facteurs.pop() {
            collect_addsub(somme, false, &mut termes);
        }
        let distribue = termes
            .into_iter()
            .map(|t| Mul(Box::new(Rat(coeff.clone())), Box::new(t)))
            .reduce(|a, b| Add(Box::new(a), Box::new(b)));
        return match distribue {
            Some(s) => canon_addsub(s),
            None => Rat(BigRational::zero()),
        };
    }

    match produit_gauche(facteurs) {
        None => Rat(coeff),
        Some(p) => fabrique_terme(coeff, p),
    }
}

/* ------------------------ Div : a * b^-1 ------------------------ */

fn canon_div(a: Expr, b: Expr) -> Expr {
    use Expr::*;

    if matches!(a, Indefini) || matches!(b, Indefini) || b.is_zero() {
        return Indefini;
    }

    // a/1 => a
    if b.is_one() {
        return a;
    }

    // 0/b => 0
    if a.is_zero() {
        return Rat(BigRational::zero());
    }

    let inverse = match b {
        Rat(r) => Rat(r.recip()),
        other => canon_pow(other, -1),
    };
    canon_mul(Mul(Box::new(a), Box::new(inverse)))
}

/* ------------------------ PowInt / Sqrt ------------------------ */

fn canon_pow(base: Expr, n: i64) -> Expr {
    use Expr::*;

    if matches!(base, Indefini) {
        return Indefini;
    }
    if n == 0 {
        return Rat(BigRational::one());
    }
    if n == 1 {
        return base;
    }

    match base {
        Rat(r) => {
            if r.is_zero() && n < 0 {
                return Indefini;
            }
            match puissance_bornee(&r, n) {
                Some(p) => Rat(p),
                None => PowInt(Box::new(Rat(r)), n),
            }
        }

        // i^n, n modulo 4
        I => match n.rem_euclid(4) {
            0 => Rat(BigRational::one()),
            1 => I,
            2 => Rat(-BigRational::one()),
            _ => neg(I),
        },

        // (√a)^n = a^(n div 2) * √a^(n mod 2)
        Sqrt(a) => {
            let q = n.div_euclid(2);
            let reste = n.rem_euclid(2);
            let p = canon_pow((*a).clone(), q);
            if reste == 0 {
                p
            } else {
                canon_mul(Mul(Box::new(p), Box::new(Sqrt(a))))
            }
        }

        PowInt(b, m) => match m.checked_mul(n) {
            Some(mn) => canon_pow(*b, mn),
            None => PowInt(Box::new(PowInt(b, m)), n),
        },

        // (a*b)^n => a^n * b^n
        Mul(a, b) => {
            let mut facteurs = Vec::new();
            collect_mul(Mul(a, b), &mut facteurs);
            let prod = facteurs
                .into_iter()
                .map(|f| canon_pow(f, n))
                .reduce(|x, y| Mul(Box::new(x), Box::new(y)));
            match prod {
                Some(p) => canon_mul(p),
                None => Rat(BigRational::one()),
            }
        }

        // (-b)^n
        Sub(a, b) if a.is_zero() => {
            let p = canon_pow(*b, n);
            if n % 2 == 0 {
                p
            } else {
                canon_mul(Mul(Box::new(Rat(-BigRational::one())), Box::new(p)))
            }
        }

        // exp(u)^n => exp(n u)
        Exp(u) => Exp(Box::new(canon_mul(Mul(
            Box::new(Rat(BigRational::from_integer(BigInt::from(n)))),
            u,
        )))),

        other => PowInt(Box::new(other), n),
    }
}

fn canon_sqrt(x: Expr) -> Expr {
    use Expr::*;

    if matches!(x, Indefini) {
        return Indefini;
    }

    // √(p/q) = √(p·q)/q, puis √(s²·t) = s·√t
    if let Rat(r) = &x {
        if r.is_zero() {
            return Rat(BigRational::zero());
        }
        if r.is_positive() {
            let q = r.denom().clone();
            let n = r.numer() * &q;
            let (s, t) = extrait_carre_parfait(&n);
            let c = BigRational::new(s, q);
            if t.is_one() {
                return Rat(c);
            }
            let racine = Sqrt(Box::new(Rat(BigRational::from_integer(t))));
            if c.is_one() {
                return racine;
            }
            return Mul(Box::new(Rat(c)), Box::new(racine));
        }
        // √(-r) = i·√r
        return canon_mul(Mul(Box::new(I), Box::new(canon_sqrt(Rat(-r.clone())))));
    }

    // √(c·u) = s·√(±t·u) avec |c| = s²·t : le carré parfait du coefficient sort
    if let (c, Some(u)) = coeff_et_reste(x.clone()) {
        let q = c.denom().clone();
        let (s, t) = extrait_carre_parfait(&(c.numer().abs() * &q));
        let dehors = BigRational::new(s, q);
        if !dehors.is_one() && !dehors.is_zero() {
            let t = if c.is_negative() { -t } else { t };
            let dedans = canon_mul(Mul(Box::new(Rat(BigRational::from_integer(t))), Box::new(u)));
            return canon_mul(Mul(Box::new(Rat(dehors)), Box::new(Sqrt(Box::new(dedans)))));
        }
    }

    Sqrt(Box::new(x))
}

/// Décompose n >= 0 en n = s^2 * t, avec t “sans facteur carré” (essais bornés).
fn extrait_carre_parfait(n: &BigInt) -> (BigInt, BigInt) {
    if n.is_zero() || n.is_one() {
        return (n.clone(), n.clone());
    }

    // Carré parfait direct (gros entiers compris)
    let racine = n.sqrt();
    if &racine * &racine == *n {
        return (racine, BigInt::one());
    }

    let mut reste = n.clone();
    let mut s = BigInt::one();

    let mut p: u64 = 2;
    while p <= MAX_ESSAIS_CARRES {
        let bp = BigInt::from(p);
        let p2 = &bp * &bp;
        if p2 > reste {
            break;
        }

        while (&reste % &p2).is_zero() {
            reste /= &p2;
            s *= &bp;
        }

        p = if p == 2 { 3 } else { p + 2 };
    }

    (s, reste)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::expr::{add, div, mul, pow, rat, rat_i, sub, var};

    #[test]
    fn termes_semblables() {
        // 2x + 3x - x => 4x
        let e = sub(add(mul(rat_i(2), var("x")), mul(rat_i(3), var("x"))), var("x"));
        assert_eq!(e.canon(), mul(rat_i(4), var("x")));

        // x - x => 0
        assert_eq!(sub(var("x"), var("x")).canon(), rat_i(0));
    }

    #[test]
    fn facteurs_semblables() {
        // x * x * x => x^3
        let e = mul(mul(var("x"), var("x")), var("x"));
        assert_eq!(e.canon(), pow(var("x"), 3));

        // x^2 / x => x
        assert_eq!(div(pow(var("x"), 2), var("x")).canon(), var("x"));
    }

    #[test]
    fn racines_rationnelles() {
        let r = |n: i64| Expr::Sqrt(Box::new(rat_i(n)));
        // √2 * √3 => √6
        assert_eq!(mul(r(2), r(3)).canon(), r(6));
        // √12 => 2√3
        assert_eq!(r(12).canon(), mul(rat_i(2), r(3)));
        // 1/√2 => √2/2
        assert_eq!(div(rat_i(1), r(2)).canon(), mul(rat(1, 2), r(2)));
    }

    #[test]
    fn distribution_coefficient() {
        // 2(x + 1) => 2x + 2
        let e = mul(rat_i(2), add(var("x"), rat_i(1)));
        assert_eq!(e.canon(), add(mul(rat_i(2), var("x")), rat_i(2)));
    }

    #[test]
    fn ordre_termes() {
        // 6 - 5x + x^2 => x^2 - 5x + 6
        let e = add(sub(rat_i(6), mul(rat_i(5), var("x"))), pow(var("x"), 2));
        let attendu = add(sub(pow(var("x"), 2), mul(rat_i(5), var("x"))), rat_i(6));
        assert_eq!(e.canon(), attendu);
    }

    #[test]
    fn exp_produit() {
        let ex = |e: Expr| Expr::Exp(Box::new(e));
        let e = mul(ex(var("x")), ex(var("x")));
        assert_eq!(e.canon(), ex(mul(rat_i(2), var("x"))));
    }

    #[test]
    fn idempotence_canon() {
        let e = div(
            add(mul(rat_i(3), pow(var("x"), 2)), Expr::Sin(Box::new(var("y")))),
            mul(rat_i(6), var("x")),
        );
        let c1 = e.canon();
        let c2 = c1.clone().canon();
        assert_eq!(c1, c2);
    }
}
