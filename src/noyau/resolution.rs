// src/noyau/resolution.rs
//
// solve(f) : racines de f = 0 pour la première inconnue (ordre alphabétique).
// - f lu comme num/den (poly.rs), simplifié par le pgcd quand tout est rationnel
// - degré 1 et 2 : formules fermées (coefficients symboliques acceptés)
// - degré >= 3 : coefficients rationnels, racines rationnelles (p | a0, q | an),
//   déflation jusqu’au degré 2
// - discriminant négatif : racines complexes via i (√ d’un négatif)
// - racines annulant le dénominateur retirées, doublons retirés
// - tri : racines réelles croissantes d’abord, les autres ensuite dans l’ordre trouvé

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use tracing::trace;

use super::erreur::ErreurRequete;
use super::eval::forme_auto;
use super::expr::{div, mul, neg, pow, rat_i, sub, Expr};
use super::lecture::approx_f64;
use super::poly::{division, est_un, evalue_q, fraction, pgcd, Fraction, Poly};
use super::reglages::Reglages;

pub fn resout(e: &Expr, reglages: &Reglages) -> Result<Vec<Expr>, ErreurRequete> {
    let v = e
        .variables_libres()
        .into_iter()
        .next()
        .ok_or_else(|| ErreurRequete::calcul("aucune inconnue"))?;

    let Fraction { num, den } = reduit(fraction(e, &v, reglages)?);
    if num.est_nul() {
        return Err(ErreurRequete::calcul(format!("égalité vraie pour tout {v}")));
    }
    trace!(inconnue = %v, degre = num.degre(), "résolution");

    let mut solutions: Vec<Expr> = Vec::new();
    for r in racines(&num, reglages)? {
        reglages.verifie_noeuds(r.noeuds())?;
        if den.degre() > 0 && den.evalue(&r).is_zero() {
            continue;
        }
        if !solutions.contains(&r) {
            solutions.push(r);
        }
    }

    trie(&mut solutions);
    Ok(solutions)
}

/// num/den rationnels : on retire le facteur commun (racines parasites).
fn reduit(f: Fraction) -> Fraction {
    let (Some(n), Some(d)) = (f.num.rationnels(), f.den.rationnels()) else {
        return f;
    };
    let g = pgcd(&n, &d);
    if g.is_empty() || est_un(&g) {
        return f;
    }
    let (n2, _) = division(&n, &g);
    let (d2, _) = division(&d, &g);
    Fraction {
        num: Poly::depuis_rationnels(&n2),
        den: Poly::depuis_rationnels(&d2),
    }
}

fn trie(solutions: &mut Vec<Expr>) {
    let mut reelles: Vec<(f64, Expr)> = Vec::new();
    let mut autres: Vec<Expr> = Vec::new();
    for r in solutions.drain(..) {
        match approx_f64(&r) {
            Some(a) => reelles.push((a, r)),
            None => autres.push(r),
        }
    }
    reelles.sort_by(|a, b| a.0.total_cmp(&b.0));
    solutions.extend(reelles.into_iter().map(|(_, r)| r));
    solutions.extend(autres);
}

/* ------------------------ racines d’un polynôme ------------------------ */

fn racines(p: &Poly, reglages: &Reglages) -> Result<Vec<Expr>, ErreurRequete> {
    match p.degre() {
        0 => Ok(Vec::new()),
        1 => Ok(vec![forme_auto(div(neg(p.coeff(0)), p.coeff(1)))]),
        2 => Ok(quadratique(&p.coeff(2), &p.coeff(1), &p.coeff(0))),
        _ => {
            let q = p.rationnels().ok_or_else(|| {
                ErreurRequete::calcul("degré >= 3 à coefficients symboliques")
            })?;
            let (trouvees, reste) = racines_rationnelles(q, reglages)?;
            let mut out: Vec<Expr> = trouvees.into_iter().map(Expr::Rat).collect();
            let reste = Poly::depuis_rationnels(&reste);
            if reste.degre() > 2 {
                return Err(ErreurRequete::calcul(format!(
                    "facteur de degré {} sans racine rationnelle",
                    reste.degre()
                )));
            }
            out.extend(racines(&reste, reglages)?);
            Ok(out)
        }
    }
}

/// a·v² + b·v + c = 0 (a non nul).
fn quadratique(a: &Expr, b: &Expr, c: &Expr) -> Vec<Expr> {
    let disc = forme_auto(sub(
        pow(b.clone(), 2),
        mul(mul(rat_i(4), a.clone()), c.clone()),
    ));

    let deux_a = || mul(rat_i(2), a.clone());

    match &disc {
        Expr::Rat(d) if d.is_zero() => vec![forme_auto(div(neg(b.clone()), deux_a()))],
        _ => {
            let racine = Expr::Sqrt(Box::new(disc.clone()));
            vec![
                forme_auto(div(sub(neg(b.clone()), racine.clone()), deux_a())),
                forme_auto(div(sub(racine, b.clone()), deux_a())),
            ]
        }
    }
}

/// Racines rationnelles (avec déflation) ; renvoie aussi le facteur restant.
fn racines_rationnelles(
    q: Vec<BigRational>,
    reglages: &Reglages,
) -> Result<(Vec<BigRational>, Vec<BigRational>), ErreurRequete> {
    let mut p = q;
    let mut trouvees = Vec::new();

    // v = 0
    while p.len() > 1 && p[0].is_zero() {
        trouvees.push(BigRational::zero());
        p.remove(0);
    }

    let mut essais: usize = 0;
    'deflation: while p.len() > 3 {
        let entiers = en_entiers(&p);
        let (Some(a0), Some(an)) = (entiers.first(), entiers.last()) else {
            break;
        };
        let ps = diviseurs(a0, &mut essais, reglages)?;
        let qs = diviseurs(an, &mut essais, reglages)?;

        for num in &ps {
            for den in &qs {
                for positif in [true, false] {
                    essais += 1;
                    if essais > reglages.candidats_max {
                        return Err(ErreurRequete::budget("trop de candidats racines"));
                    }
                    let n = if positif { num.clone() } else { -num.clone() };
                    let x = BigRational::new(n, den.clone());
                    if evalue_q(&p, &x).is_zero() {
                        let facteur = vec![-x.clone(), BigRational::one()];
                        p = division(&p, &facteur).0;
                        trouvees.push(x);
                        continue 'deflation;
                    }
                }
            }
        }
        break;
    }

    Ok((trouvees, p))
}

/// Coefficients entiers proportionnels (multiplication par le ppcm des dénominateurs).
fn en_entiers(p: &[BigRational]) -> Vec<BigInt> {
    // ppcm(a, b) = a · (b / pgcd(a, b)) ; la réduction de a/b donne b / pgcd
    let ppcm = p.iter().fold(BigInt::one(), |acc, c| {
        let reduit = BigRational::new(acc.clone(), c.denom().clone());
        acc * reduit.denom()
    });
    p.iter()
        .map(|c| (c * BigRational::from_integer(ppcm.clone())).to_integer())
        .collect()
}

/// Diviseurs positifs de |n| (essais bornés par le budget).
fn diviseurs(
    n: &BigInt,
    essais: &mut usize,
    reglages: &Reglages,
) -> Result<Vec<BigInt>, ErreurRequete> {
    let n = n.abs();
    let mut petits = Vec::new();
    let mut grands = Vec::new();
    let mut d = BigInt::one();
    while &d * &d <= n {
        *essais += 1;
        if *essais > reglages.candidats_max {
            return Err(ErreurRequete::budget("trop de candidats racines"));
        }
        if (&n % &d).is_zero() {
            let autre = &n / &d;
            if autre != d {
                grands.push(autre);
            }
            petits.push(d.clone());
        }
        d += BigInt::one();
    }
    petits.extend(grands.into_iter().rev());
    Ok(petits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::eval::{analyse, simplifie};
    use crate::noyau::format::{format_expr, format_solutions};
    use crate::noyau::symboles::TableSymboles;

    fn sol(s: &str) -> Result<String, ErreurRequete> {
        let e = simplifie(analyse(s, &TableSymboles::standard()).unwrap());
        resout(&e, &Reglages::default()).map(|v| format_solutions(&v))
    }

    #[test]
    fn degre_1_et_2() {
        assert_eq!(sol("2*x + 4").unwrap(), "[-2]");
        assert_eq!(sol("x**2 - 5*x + 6").unwrap(), "[2, 3]");
        assert_eq!(sol("x**2 - 2").unwrap(), "[-√2, √2]");
        assert_eq!(sol("x**2 - 2*x + 1").unwrap(), "[1]");
        assert_eq!(sol("x**2 + 1").unwrap(), "[-i, i]");
        assert_eq!(sol("x**2 + 2*x + 5").unwrap(), "[-2*i - 1, 2*i - 1]");
    }

    #[test]
    fn degre_3_et_plus() {
        assert_eq!(sol("x**3 - 6*x**2 + 11*x - 6").unwrap(), "[1, 2, 3]");
        // réelles triées d’abord, puis le couple complexe
        assert_eq!(sol("x**4 - 1").unwrap(), "[-1, 1, -i, i]");
        assert_eq!(sol("x**3 - x").unwrap(), "[-1, 0, 1]");
        assert_eq!(sol("2*x**3 - x**2 - 2*x + 1").unwrap(), "[-1, 1/2, 1]");
    }

    #[test]
    fn denominateur_et_inconnue() {
        assert_eq!(sol("(x**2 - 1)/(x - 1)").unwrap(), "[-1]");
        assert_eq!(sol("1/x").unwrap(), "[]");
        // première inconnue alphabétique : x
        let e = simplifie(analyse("x + y", &TableSymboles::standard()).unwrap());
        let r = resout(&e, &Reglages::default()).unwrap();
        assert_eq!(r.len(), 1);
        assert_eq!(format_expr(&r[0]), "-y");
    }

    #[test]
    fn discriminant_symbolique_reduit() {
        // √(-4y)/2 : le carré parfait 4 sort de la racine
        assert_eq!(sol("x**2 + y").unwrap(), "[-√(-y), √(-y)]");
        assert_eq!(sol("x**2 - 9*y").unwrap(), "[-3*√y, 3*√y]");
    }

    #[test]
    fn echecs() {
        assert!(matches!(sol("sin(x) - 1"), Err(ErreurRequete::Calcul(_))));
        assert!(matches!(sol("x**3 - 2"), Err(ErreurRequete::Calcul(_))));
        assert!(matches!(sol("x**3 + y*x"), Err(ErreurRequete::Calcul(_))));
    }
}
