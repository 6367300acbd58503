// src/noyau/integrale.rs
//
// Primitive exacte (sans constante), intégrande à UNE inconnue v.
// Catalogue :
// - linéarité (sommes, coefficients, facteurs sans v)
// - polynômes (développés via poly.rs)
// - u^(h/2), u = a·v + b linéaire, h entier (u^-1 -> log(u)/a)
// - sin cos tan exp log d’une forme linéaire
// - v^n · (sin|cos|exp)(u) : intégration par parties répétée
// - v^n · log(v)
// Hors catalogue => Calcul.

use super::canon::{coeff_et_reste, collect_addsub, collect_mul};
use super::erreur::ErreurRequete;
use super::eval::forme_auto;
use super::expr::{add, div, mul, neg, pow, rat_i, sub, Expr};
use super::poly::fraction;
use super::reglages::Reglages;

pub fn integre(e: &Expr, reglages: &Reglages) -> Result<Expr, ErreurRequete> {
    let libres = e.variables_libres();
    let v = match (libres.len(), libres.iter().next()) {
        (1, Some(v)) => v.clone(),
        (n, _) => {
            return Err(ErreurRequete::calcul(format!(
                "intégrande à {n} inconnues (une attendue)"
            )))
        }
    };

    let f = forme_auto(e.clone());
    if matches!(f, Expr::Indefini) {
        return Err(ErreurRequete::calcul("intégrande indéfini"));
    }
    reglages.verifie_puissances(&f)?;

    let primitive = forme_auto(integre_somme(&f, &v, reglages, 0)?);
    reglages.verifie_noeuds(primitive.noeuds())?;
    Ok(primitive)
}

fn integre_somme(
    f: &Expr,
    v: &str,
    reglages: &Reglages,
    prof: usize,
) -> Result<Expr, ErreurRequete> {
    if prof > reglages.degre_max {
        return Err(ErreurRequete::budget("intégration par parties trop profonde"));
    }

    let mut termes = Vec::new();
    collect_addsub(f.clone(), false, &mut termes);

    let mut acc = rat_i(0);
    for t in termes {
        let morceau = match coeff_et_reste(t) {
            (c, None) => mul(Expr::Rat(c), Expr::Var(v.to_string())),
            (c, Some(reste)) => mul(Expr::Rat(c), integre_terme(&reste, v, reglages, prof)?),
        };
        acc = add(acc, morceau);
    }
    Ok(acc)
}

fn integre_terme(
    t: &Expr,
    v: &str,
    reglages: &Reglages,
    prof: usize,
) -> Result<Expr, ErreurRequete> {
    let x = || Expr::Var(v.to_string());

    if !t.contient_var(v) {
        return Ok(mul(t.clone(), x()));
    }

    // polynôme (dénominateur constant) : terme à terme
    if let Ok(fr) = fraction(t, v, reglages) {
        if fr.den.degre() == 0 {
            let d0 = fr.den.coeff(0);
            let mut acc = rat_i(0);
            for (k, c) in fr.num.coeffs().iter().enumerate() {
                let k1 = i64::try_from(k + 1)
                    .map_err(|_| ErreurRequete::budget("degré trop grand"))?;
                let monome = div(pow(x(), k1), rat_i(k1));
                acc = add(acc, mul(div(c.clone(), d0.clone()), monome));
            }
            return Ok(acc);
        }
    }

    // facteurs constants / facteurs en v
    let mut facteurs = Vec::new();
    collect_mul(t.clone(), &mut facteurs);
    let (avec_v, sans_v): (Vec<Expr>, Vec<Expr>) =
        facteurs.into_iter().partition(|f| f.contient_var(v));
    let k = sans_v.into_iter().fold(rat_i(1), mul);

    let primitive = if avec_v.is_empty() {
        x()
    } else if let Some((u, h, a)) = puissances_lineaires(&avec_v, v, reglages) {
        primitive_puissance(u, h, a)
    } else {
        match avec_v.as_slice() {
            [g] => primitive_fonction(g, v, reglages)?,
            [f1, f2] => {
                let (p, n, g) = match (monome(f1, v), monome(f2, v)) {
                    (Some(n), _) => (f1, n, f2),
                    (None, Some(n)) => (f2, n, f1),
                    _ => return Err(ErreurRequete::calcul("produit hors catalogue")),
                };
                par_parties(p, n, g, v, reglages, prof)?
            }
            _ => return Err(ErreurRequete::calcul("intégrale hors catalogue")),
        }
    };

    Ok(mul(k, primitive))
}

/* ------------------------ formes linéaires ------------------------ */

/// u = a·v + b (a non nul, a et b sans v) => a.
fn lineaire(u: &Expr, v: &str, reglages: &Reglages) -> Option<Expr> {
    let fr = fraction(u, v, reglages).ok()?;
    if fr.den.degre() != 0 || fr.num.degre() != 1 {
        return None;
    }
    Some(forme_auto(div(fr.num.coeff(1), fr.den.coeff(0))))
}

/// v^n (n entier non nul).
fn monome(f: &Expr, v: &str) -> Option<i64> {
    match f {
        Expr::Var(s) if s == v => Some(1),
        Expr::PowInt(b, n) if matches!(&**b, Expr::Var(s) if s == v) => Some(*n),
        _ => None,
    }
}

/// Facteur vu comme u^(h/2), u linéaire en v.
fn demi_puissance(f: &Expr, v: &str, reglages: &Reglages) -> Option<(Expr, i64)> {
    match f {
        Expr::PowInt(b, n) => {
            let (u, h) = demi_puissance(b, v, reglages)?;
            Some((u, h.checked_mul(*n)?))
        }
        Expr::Sqrt(b) => match demi_puissance(b, v, reglages)? {
            (u, 2) => Some((u, 1)),
            _ => None,
        },
        autre => {
            lineaire(autre, v, reglages)?;
            Some((autre.clone(), 2))
        }
    }
}

/// Produit de puissances d’une même forme linéaire u => (u, h total, a).
fn puissances_lineaires(
    facteurs: &[Expr],
    v: &str,
    reglages: &Reglages,
) -> Option<(Expr, i64, Expr)> {
    let mut base: Option<Expr> = None;
    let mut h_total: i64 = 0;
    for f in facteurs {
        let (u, h) = demi_puissance(f, v, reglages)?;
        match &base {
            Some(b) if *b != u => return None,
            Some(_) => {}
            None => base = Some(u),
        }
        h_total = h_total.checked_add(h)?;
    }
    let u = base?;
    let a = lineaire(&u, v, reglages)?;
    Some((u, h_total, a))
}

/// ∫ u^(h/2) dv = 2/(a(h+2)) · (√u)^(h+2), ou log(u)/a si h = -2.
fn primitive_puissance(u: Expr, h: i64, a: Expr) -> Expr {
    if h == -2 {
        return div(Expr::Log(Box::new(u)), a);
    }
    let h2 = h + 2;
    let facteur = div(rat_i(2), mul(a, rat_i(h2)));
    let puissance = if h2 % 2 == 0 {
        pow(u, h2 / 2)
    } else {
        pow(Expr::Sqrt(Box::new(u)), h2)
    };
    mul(facteur, puissance)
}

/* ------------------------ fonctions d’une forme linéaire ------------------------ */

fn primitive_fonction(g: &Expr, v: &str, reglages: &Reglages) -> Result<Expr, ErreurRequete> {
    use Expr::*;

    let u = match g {
        Sin(u) | Cos(u) | Tan(u) | Exp(u) | Log(u) => u,
        _ => return Err(ErreurRequete::calcul("fonction hors catalogue")),
    };
    let a = lineaire(u, v, reglages)
        .ok_or_else(|| ErreurRequete::calcul("argument non linéaire"))?;

    Ok(match g {
        Sin(_) => div(neg(Cos(u.clone())), a),
        Cos(_) => div(Sin(u.clone()), a),
        // ∫ tan = -log(cos)
        Tan(_) => div(neg(Log(Box::new(Cos(u.clone())))), a),
        Exp(_) => div(Exp(u.clone()), a),
        // ∫ log(u) = u·log(u) - u
        _ => div(sub(mul((**u).clone(), Log(u.clone())), (**u).clone()), a),
    })
}

/* ------------------------ produits ------------------------ */

/// ∫ v^n · g : par parties pour g = sin/cos/exp, formule directe pour g = log(v).
fn par_parties(
    p: &Expr,
    n: i64,
    g: &Expr,
    v: &str,
    reglages: &Reglages,
    prof: usize,
) -> Result<Expr, ErreurRequete> {
    let x = || Expr::Var(v.to_string());

    match g {
        Expr::Sin(_) | Expr::Cos(_) | Expr::Exp(_) if n >= 1 => {
            // ∫ P·g = P·G - ∫ P'·G
            let gp = primitive_fonction(g, v, reglages)?;
            let derivee = mul(rat_i(n), pow(x(), n - 1));
            let reste = forme_auto(mul(derivee, gp.clone()));
            let suite = integre_somme(&reste, v, reglages, prof + 1)?;
            Ok(sub(mul(p.clone(), gp), suite))
        }

        Expr::Log(u) if matches!(&**u, Expr::Var(s) if s == v) => {
            if n == -1 {
                // ∫ log(v)/v = log(v)²/2
                return Ok(div(pow(g.clone(), 2), rat_i(2)));
            }
            // v^(n+1)/(n+1) · log(v) - v^(n+1)/(n+1)²
            let m = n + 1;
            let base = div(pow(x(), m), rat_i(m));
            Ok(sub(
                mul(base.clone(), g.clone()),
                div(base, rat_i(m)),
            ))
        }

        _ => Err(ErreurRequete::calcul("produit hors catalogue")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::derivee::derive;
    use crate::noyau::eval::analyse;
    use crate::noyau::format::format_expr;
    use crate::noyau::lecture::lecture_decimale;
    use crate::noyau::symboles::TableSymboles;

    fn lit(s: &str) -> Expr {
        analyse(s, &TableSymboles::standard()).unwrap()
    }

    fn int(s: &str) -> Result<Expr, ErreurRequete> {
        integre(&lit(s), &Reglages::default())
    }

    fn en(e: &Expr, val: Expr) -> String {
        lecture_decimale(&forme_auto(e.substitue("x", &val)), 20).unwrap()
    }

    /// d/dx ∫f = f, vérifié en quelques points rationnels.
    fn verifie_primitive(s: &str) {
        let f = lit(s);
        let primitive = int(s).unwrap_or_else(|e| panic!("∫ {s:?}: {e}"));
        let d = forme_auto(derive(&primitive, "x"));
        for val in [rat_i(2), rat_i(7), Expr::Rat(num_rational::BigRational::new(5.into(), 3.into()))] {
            assert_eq!(en(&d, val.clone()), en(&f, val), "d/dx ∫ {s:?}");
        }
    }

    #[test]
    fn polynomes() {
        assert_eq!(format_expr(&int("x**2").unwrap()), "x^3/3");
        assert_eq!(format_expr(&int("3*x**2 + 2*x").unwrap()), "x^3 + x^2");
        verifie_primitive("(x + 1)*(x - 2)");
    }

    #[test]
    fn sinus_en_degres() {
        assert_eq!(
            format_expr(&int("sin(x)").unwrap()),
            "-180*cos(π*x/180)/π"
        );
        verifie_primitive("cos(x)");
        verifie_primitive("tan(x)");
    }

    #[test]
    fn puissances_et_log() {
        assert_eq!(format_expr(&int("1/x").unwrap()), "log(x)");
        verifie_primitive("1/(2*x + 1)");
        verifie_primitive("sqrt(x)");
        verifie_primitive("1/sqrt(x + 3)");
        verifie_primitive("(2*x + 1)**(-3)");
        verifie_primitive("log(x)");
        verifie_primitive("exp(2*x)");
    }

    #[test]
    fn par_parties_et_monome_log() {
        verifie_primitive("x*exp(x)");
        verifie_primitive("x**2*sin(x)");
        verifie_primitive("x*cos(2*x)");
        verifie_primitive("x**2*log(x)");
        verifie_primitive("log(x)/x");
    }

    #[test]
    fn refus() {
        assert!(matches!(int("5"), Err(ErreurRequete::Calcul(_))));
        assert!(matches!(int("x*y"), Err(ErreurRequete::Calcul(_))));
        assert!(matches!(int("exp(x**2)"), Err(ErreurRequete::Calcul(_))));
        assert!(matches!(int("sin(x)*cos(x)"), Err(ErreurRequete::Calcul(_))));
        assert!(matches!(
            int("x*(2**1024)**1024"),
            Err(ErreurRequete::Budget(_))
        ));
    }
}
