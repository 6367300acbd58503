// src/noyau/identites_trig.rs
//
// Identités trigonométriques exactes, version SAFE (anti-boucle)
//
// Entrée : une expression déjà canonisée (canon.rs). Les arguments trig sont en
// radians et portent souvent un facteur π/180 (trig en degrés de la table).
//
// Règles incluses :
// B1 Parité (signe du terme de tête de l’argument)
//   sin(-u) -> -sin(u) ; cos(-u) -> cos(u) ; tan(-u) -> -tan(u)
// B2 Décalage par un multiple de π (terme “k·π” isolé dans l’argument)
//   sin(u + π) -> -sin(u) ; cos(u + π) -> -cos(u) ; tan(u + π) -> tan(u)
//   (périodicité : 2π pour sin/cos, π pour tan)
// B3 Quart de tour (u non vide)
//   sin(u + π/2) -> cos(u) ; cos(u + π/2) -> -sin(u)
// B4 Symétrie sur un multiple pur de π (réduction dans [0, π/2])
//   sin(π - a) -> sin(a) ; cos(π - a) -> -cos(a) ; tan(π - a) -> -tan(a)
// B5 Pythagoricienne dans une somme (même cofacteur)
//   a·sin(u)^2 + b·cos(u)^2 -> b + (a - b)·sin(u)^2
// B6 sin(u)^n · cos(u)^-n -> tan(u)^n
//
// IMPORTANT : on N’EXPAND PAS tan(x) -> sin/cos (risque de boucles / indéfinis).

use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::noyau::canon::{coeff_et_reste, collect_addsub, collect_mul};
use crate::noyau::expr::{mod_rationnel, mul, neg, Expr};
use crate::noyau::trig::TrigFn;

pub fn trig_identites(e: Expr) -> Expr {
    // Passes bornées : on réécrit tant que ça n’empire pas le score
    let mut cur = e;
    let mut cur_score = score(&cur);

    for _ in 0..6 {
        let next = rewrite_once(cur.clone()).canon();
        if next == cur {
            break;
        }

        // Garde-fou : accepter si score DIMINUE ou RESTE ÉGAL.
        let next_score = score(&next);
        if next_score <= cur_score {
            cur = next;
            cur_score = next_score;
        } else {
            break;
        }
    }

    cur
}

/* ------------------------ réécriture : 1 passe ------------------------ */

fn rewrite_once(e: Expr) -> Expr {
    use Expr::*;

    match e {
        Rat(_) | Pi | I | Indefini | Var(_) => e,

        Sin(x) => reduit_trig(TrigFn::Sin, rewrite_once(*x)),
        Cos(x) => reduit_trig(TrigFn::Cos, rewrite_once(*x)),
        Tan(x) => reduit_trig(TrigFn::Tan, rewrite_once(*x)),

        Sqrt(x) => Sqrt(Box::new(rewrite_once(*x))),
        PowInt(x, n) => PowInt(Box::new(rewrite_once(*x)), n),
        Log(x) => Log(Box::new(rewrite_once(*x))),
        Exp(x) => Exp(Box::new(rewrite_once(*x))),

        Add(_, _) | Sub(_, _) => {
            let mut termes = Vec::new();
            collect_addsub(e, false, &mut termes);
            // on ne réécrit que le reste non numérique de chaque terme (Sub(0,·) déjà absorbé)
            let termes: Vec<Expr> = termes
                .into_iter()
                .filter(|t| !t.is_zero())
                .map(|t| match coeff_et_reste(t) {
                    (c, None) => Expr::Rat(c),
                    (c, Some(r)) => mul(Expr::Rat(c), rewrite_once(r)),
                })
                .collect();
            somme(pythagore(termes))
        }

        Mul(_, _) => {
            let mut facteurs = Vec::new();
            collect_mul(e, &mut facteurs);
            let facteurs: Vec<Expr> = facteurs.into_iter().map(rewrite_once).collect();
            produit(sin_sur_cos(facteurs))
        }

        Div(a, b) => Div(Box::new(rewrite_once(*a)), Box::new(rewrite_once(*b))),
    }
}

/* ------------------------ B1..B4 : argument d’une trig ------------------------ */

fn reduit_trig(f: TrigFn, u: Expr) -> Expr {
    let mut f = f;
    let mut negatif = false;

    // B1 : parité sur le terme de tête
    let mut termes = Vec::new();
    collect_addsub(u, false, &mut termes);
    termes.retain(|t| !t.is_zero());
    let tete_negative = termes
        .first()
        .map(|t| coeff_et_reste(t.clone()).0.is_negative())
        .unwrap_or(false);
    if tete_negative {
        termes = termes.into_iter().map(neg).collect();
        if f != TrigFn::Cos {
            negatif = !negatif;
        }
    }

    // isole k·π
    let mut k = BigRational::zero();
    let mut reste: Vec<Expr> = Vec::with_capacity(termes.len());
    for t in termes {
        match coeff_et_reste(t.clone()) {
            (c, Some(Expr::Pi)) => k += c,
            _ => reste.push(t),
        }
    }

    if k.is_zero() {
        return signe(negatif, f.applique(somme(reste)));
    }

    // B2 : k ramené dans [0, période)
    let periode = if f == TrigFn::Tan { 1 } else { 2 };
    let mut k = mod_rationnel(&k, periode);
    if k >= BigRational::one() {
        k -= BigRational::one();
        if f != TrigFn::Tan {
            negatif = !negatif;
        }
    }

    let demi = BigRational::new(1.into(), 2.into());

    if reste.is_empty() {
        // B4 : a ∈ (π/2, π) -> π - a
        if k > demi {
            k = BigRational::one() - k;
            if f != TrigFn::Sin {
                negatif = !negatif;
            }
        }
    } else if k == demi && f != TrigFn::Tan {
        // B3 : quart de tour
        k = BigRational::zero();
        f = match f {
            TrigFn::Sin => TrigFn::Cos,
            _ => {
                negatif = !negatif;
                TrigFn::Sin
            }
        };
    }

    if !k.is_zero() {
        reste.push(mul(Expr::Rat(k), Expr::Pi));
    }
    signe(negatif, f.applique(somme(reste)))
}

fn signe(negatif: bool, e: Expr) -> Expr {
    if negatif {
        neg(e)
    } else {
        e
    }
}

/* ------------------------ B5 : pythagore dans une somme ------------------------ */

/// Terme de la forme c · f(u)^2 · cofacteurs.
struct Carre {
    f: TrigFn,
    u: Expr,
    cofacteurs: Vec<Expr>,
    c: BigRational,
}

fn decompose_carre(t: &Expr) -> Option<Carre> {
    let (c, reste) = coeff_et_reste(t.clone());
    let mut facteurs = Vec::new();
    collect_mul(reste?, &mut facteurs);

    let pos = facteurs.iter().position(|f| {
        matches!(f, Expr::PowInt(b, 2) if matches!(**b, Expr::Sin(_) | Expr::Cos(_)))
    })?;
    let (f, u) = match facteurs.remove(pos) {
        Expr::PowInt(b, _) => match *b {
            Expr::Sin(u) => (TrigFn::Sin, *u),
            Expr::Cos(u) => (TrigFn::Cos, *u),
            _ => return None,
        },
        _ => return None,
    };

    Some(Carre {
        f,
        u,
        cofacteurs: facteurs,
        c,
    })
}

fn pythagore(termes: Vec<Expr>) -> Vec<Expr> {
    let carres: Vec<Option<Carre>> = termes.iter().map(decompose_carre).collect();
    let mut pris = vec![false; termes.len()];
    let mut ajouts: Vec<Expr> = Vec::new();

    for i in 0..carres.len() {
        let Some(s) = carres[i].as_ref().filter(|c| c.f == TrigFn::Sin) else {
            continue;
        };
        if pris[i] {
            continue;
        }
        let j = (0..carres.len()).find(|&j| {
            !pris[j]
                && carres[j].as_ref().is_some_and(|c| {
                    c.f == TrigFn::Cos && c.u == s.u && c.cofacteurs == s.cofacteurs
                })
        });
        let Some(j) = j else {
            continue;
        };
        let Some(co) = carres[j].as_ref() else {
            continue;
        };

        pris[i] = true;
        pris[j] = true;

        // a·sin² + b·cos² = b + (a - b)·sin²
        let cofacteur = produit(s.cofacteurs.clone());
        ajouts.push(mul(Expr::Rat(co.c.clone()), cofacteur.clone()));
        let sin2 = Expr::PowInt(Box::new(Expr::Sin(Box::new(s.u.clone()))), 2);
        ajouts.push(mul(
            Expr::Rat(s.c.clone() - co.c.clone()),
            mul(sin2, cofacteur),
        ));
    }

    termes
        .into_iter()
        .zip(pris)
        .filter(|(_, p)| !p)
        .map(|(t, _)| t)
        .chain(ajouts)
        .collect()
}

/* ------------------------ B6 : sin/cos -> tan ------------------------ */

fn puissance_trig(e: &Expr) -> Option<(TrigFn, &Expr, i64)> {
    match e {
        Expr::Sin(u) => Some((TrigFn::Sin, u, 1)),
        Expr::Cos(u) => Some((TrigFn::Cos, u, 1)),
        Expr::PowInt(b, n) => match b.as_ref() {
            Expr::Sin(u) => Some((TrigFn::Sin, u, *n)),
            Expr::Cos(u) => Some((TrigFn::Cos, u, *n)),
            _ => None,
        },
        _ => None,
    }
}

fn sin_sur_cos(facteurs: Vec<Expr>) -> Vec<Expr> {
    let mut facteurs = facteurs;
    let mut i = 0;
    while i < facteurs.len() {
        let paire = match puissance_trig(&facteurs[i]) {
            Some((TrigFn::Sin, u, n)) if n > 0 => facteurs.iter().position(|g| {
                matches!(puissance_trig(g), Some((TrigFn::Cos, v, m)) if v == u && m == -n)
            }),
            _ => None,
        };
        match paire {
            Some(j) => {
                let (u, n) = match puissance_trig(&facteurs[i]) {
                    Some((_, u, n)) => (u.clone(), n),
                    None => break,
                };
                let tan = Expr::Tan(Box::new(u));
                facteurs[i] = if n == 1 {
                    tan
                } else {
                    Expr::PowInt(Box::new(tan), n)
                };
                facteurs.remove(j);
                if j < i {
                    i -= 1;
                }
            }
            None => i += 1,
        }
    }
    facteurs
}

/* ------------------------ reconstruction ------------------------ */

fn somme(termes: Vec<Expr>) -> Expr {
    let mut it = termes.into_iter();
    match it.next() {
        None => Expr::Rat(BigRational::zero()),
        Some(premier) => it.fold(premier, |acc, t| Expr::Add(Box::new(acc), Box::new(t))),
    }
}

fn produit(facteurs: Vec<Expr>) -> Expr {
    let mut it = facteurs.into_iter();
    match it.next() {
        None => Expr::Rat(BigRational::one()),
        Some(premier) => it.fold(premier, mul),
    }
}

/* ------------------------ score anti-boucle ------------------------ */

fn score(e: &Expr) -> (usize, usize) {
    // (noeuds, profondeur)
    fn walk(e: &Expr) -> (usize, usize) {
        use Expr::*;
        match e {
            Rat(_) | Pi | I | Indefini | Var(_) => (1, 1),

            Sqrt(x) | Sin(x) | Cos(x) | Tan(x) | Log(x) | Exp(x) | PowInt(x, _) => {
                let (n, d) = walk(x);
                (n + 1, d + 1)
            }

            Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) => {
                let (na, da) = walk(a);
                let (nb, db) = walk(b);
                (na + nb + 1, 1 + da.max(db))
            }
        }
    }
    walk(e)
}

/* ------------------------ tests ------------------------ */
