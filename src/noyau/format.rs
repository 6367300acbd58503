// src/noyau/format.rs
//
// Affichage EXACT “joli” d’une expression (forme canon de préférence) :
// - produits lus comme numérateur / dénominateur : x^3/3, √3/2, π*x/180
// - moins unaire et soustractions à plat : x^2 - 5*x + 6
// - parenthèses seulement quand la précédence l’exige
// + rendu des résultats (solutions, verdict, spectre).

use num_bigint::BigInt;
use num_complex::Complex64;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::expr::Expr;

/// Niveaux de précédence (plus grand = lie plus fort).
const P_SOMME: u8 = 1;
const P_PRODUIT: u8 = 2;
const P_PUISSANCE: u8 = 3;
const P_ATOME: u8 = 4;

fn format_rat(r: &BigRational) -> String {
    let n = r.numer();
    let d = r.denom();
    if d.is_one() {
        format!("{n}")
    } else {
        format!("{n}/{d}")
    }
}

/// Formate une expression (point d’entrée).
pub fn format_expr(e: &Expr) -> String {
    ecrit(e).0
}

/// (texte, précédence du noeud racine)
fn ecrit(e: &Expr) -> (String, u8) {
    use Expr::*;

    match e {
        Indefini => ("indéfini".to_string(), P_ATOME),
        Pi => ("π".to_string(), P_ATOME),
        I => ("i".to_string(), P_ATOME),
        Var(s) => (s.clone(), P_ATOME),

        Rat(r) if r.is_negative() || !r.denom().is_one() => (format_rat(r), P_PRODUIT),
        Rat(r) => (format_rat(r), P_ATOME),

        Sqrt(x) => {
            let (s, p) = ecrit(x);
            let entier = matches!(&**x, Rat(r) if r.denom().is_one() && !r.is_negative());
            if entier || (p == P_ATOME && !matches!(&**x, Rat(_))) {
                (format!("√{s}"), P_ATOME)
            } else {
                (format!("√({s})"), P_ATOME)
            }
        }

        Sin(x) => (format!("sin({})", format_expr(x)), P_ATOME),
        Cos(x) => (format!("cos({})", format_expr(x)), P_ATOME),
        Tan(x) => (format!("tan({})", format_expr(x)), P_ATOME),
        Log(x) => (format!("log({})", format_expr(x)), P_ATOME),
        Exp(x) => (format!("exp({})", format_expr(x)), P_ATOME),

        PowInt(_, n) if *n < 0 => (ecrit_produit(e), P_PRODUIT),
        PowInt(b, n) => (format!("{}^{n}", base_puissance(b)), P_PUISSANCE),

        Mul(_, _) | Div(_, _) => (ecrit_produit(e), P_PRODUIT),
        Sub(a, _) if a.is_zero() => (ecrit_somme(e), P_PRODUIT),
        Add(_, _) | Sub(_, _) => (ecrit_somme(e), P_SOMME),
    }
}

fn base_puissance(b: &Expr) -> String {
    let (s, p) = ecrit(b);
    if p == P_ATOME && !matches!(b, Expr::Sqrt(_)) {
        s
    } else {
        format!("({s})")
    }
}

/* ------------------------ sommes ------------------------ */

fn termes<'a>(e: &'a Expr, negatif: bool, out: &mut Vec<(&'a Expr, bool)>) {
    match e {
        Expr::Add(a, b) => {
            termes(a, negatif, out);
            termes(b, negatif, out);
        }
        Expr::Sub(a, b) if a.is_zero() => termes(b, !negatif, out),
        Expr::Sub(a, b) => {
            termes(a, negatif, out);
            termes(b, !negatif, out);
        }
        autre => out.push((autre, negatif)),
    }
}

fn ecrit_somme(e: &Expr) -> String {
    let mut ts = Vec::new();
    termes(e, false, &mut ts);

    let mut out = String::new();
    for (i, (t, negatif)) in ts.into_iter().enumerate() {
        let (s, _) = ecrit(t);
        let (neg_txt, corps) = match s.strip_prefix('-') {
            Some(reste) => (true, reste.to_string()),
            None => (false, s),
        };
        let moins = negatif != neg_txt;
        if i == 0 {
            if moins {
                out.push('-');
            }
        } else if moins {
            out.push_str(" - ");
        } else {
            out.push_str(" + ");
        }
        out.push_str(&corps);
    }
    out
}

/* ------------------------ produits ------------------------ */

/// Aplatit un produit en (coefficient, facteurs du numérateur, facteurs du dénominateur).
fn facteurs<'a>(
    e: &'a Expr,
    inverse: bool,
    coeff: &mut BigRational,
    num: &mut Vec<(&'a Expr, i64)>,
    den: &mut Vec<(&'a Expr, i64)>,
) {
    use Expr::*;
    match e {
        Mul(a, b) => {
            facteurs(a, inverse, coeff, num, den);
            facteurs(b, inverse, coeff, num, den);
        }
        Div(a, b) => {
            facteurs(a, inverse, coeff, num, den);
            facteurs(b, !inverse, coeff, num, den);
        }
        Rat(r) if inverse && !r.is_zero() => *coeff /= r,
        Rat(r) => *coeff *= r,
        Sub(a, b) if a.is_zero() => {
            *coeff = -coeff.clone();
            facteurs(b, inverse, coeff, num, den);
        }
        PowInt(b, n) => {
            let en_haut = (*n > 0) != inverse;
            let k = n.saturating_abs();
            if en_haut {
                num.push((&**b, k));
            } else {
                den.push((&**b, k));
            }
        }
        autre if inverse => den.push((autre, 1)),
        autre => num.push((autre, 1)),
    }
}

fn ecrit_facteur(b: &Expr, k: i64) -> String {
    if k == 1 {
        let (s, p) = ecrit(b);
        if p >= P_PUISSANCE {
            s
        } else {
            format!("({s})")
        }
    } else {
        format!("{}^{k}", base_puissance(b))
    }
}

fn joint(entier: &BigInt, fs: &[(&Expr, i64)]) -> (String, usize) {
    let mut morceaux: Vec<String> = Vec::new();
    if !entier.is_one() || fs.is_empty() {
        morceaux.push(entier.to_string());
    }
    morceaux.extend(fs.iter().map(|(b, k)| ecrit_facteur(b, *k)));
    let n = morceaux.len();
    (morceaux.join("*"), n)
}

fn ecrit_produit(e: &Expr) -> String {
    let mut coeff = BigRational::one();
    let mut num = Vec::new();
    let mut den = Vec::new();
    facteurs(e, false, &mut coeff, &mut num, &mut den);

    if coeff.is_zero() {
        return "0".to_string();
    }

    let signe = if coeff.is_negative() { "-" } else { "" };
    let c = coeff.abs();

    let (haut, _) = joint(c.numer(), &num);
    if den.is_empty() && c.denom().is_one() {
        return format!("{signe}{haut}");
    }

    let (bas, n_bas) = joint(c.denom(), &den);
    if n_bas > 1 {
        format!("{signe}{haut}/({bas})")
    } else {
        format!("{signe}{haut}/{bas}")
    }
}

/* ------------------------ résultats ------------------------ */

/// Liste de solutions : [2, 3]
pub fn format_solutions(solutions: &[Expr]) -> String {
    let items: Vec<String> = solutions.iter().map(format_expr).collect();
    format!("[{}]", items.join(", "))
}

pub fn format_verdict(v: bool) -> String {
    String::from(if v { "TRUE" } else { "FALSE" })
}

/// Nombre réel avec au plus 6 décimales (zéros de queue retirés).
fn format_reel(v: f64) -> String {
    let s = format!("{v:.6}");
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    };
    if s == "-0" {
        "0".to_string()
    } else {
        s
    }
}

/// a + bi
pub fn format_complexe(z: &Complex64) -> String {
    let re = format_reel(z.re);
    let im = format_reel(z.im);
    match im.strip_prefix('-') {
        Some(abs) => format!("{re} - {abs}i"),
        None => format!("{re} + {im}i"),
    }
}

pub fn format_spectre(valeurs: &[Complex64]) -> String {
    let items: Vec<String> = valeurs.iter().map(format_complexe).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::expr::{add, div, mul, neg, pow, rat, rat_i, sub, var};

    fn r(n: i64) -> Expr {
        Expr::Sqrt(Box::new(rat_i(n)))
    }

    #[test]
    fn produits_et_quotients() {
        assert_eq!(format_expr(&mul(rat(1, 3), pow(var("x"), 3))), "x^3/3");
        assert_eq!(format_expr(&mul(rat(1, 2), r(3))), "√3/2");
        assert_eq!(format_expr(&mul(rat(-1, 2), r(2))), "-√2/2");
        assert_eq!(
            format_expr(&mul(mul(rat(1, 180), Expr::Pi), var("x"))),
            "π*x/180"
        );
        assert_eq!(format_expr(&pow(var("x"), -1)), "1/x");
        assert_eq!(
            format_expr(&mul(rat_i(3), pow(mul(rat_i(2), var("x")), -1))),
            "3/(2*x)"
        );
        assert_eq!(format_expr(&div(var("y"), var("x"))), "y/x");
    }

    #[test]
    fn sommes_et_signes() {
        let e = add(sub(pow(var("x"), 2), mul(rat_i(5), var("x"))), rat_i(6));
        assert_eq!(format_expr(&e), "x^2 - 5*x + 6");

        let e = add(mul(rat_i(-2), var("x")), rat_i(1));
        assert_eq!(format_expr(&e), "-2*x + 1");

        assert_eq!(format_expr(&neg(add(var("x"), rat_i(1)))), "-x - 1");
        assert_eq!(
            format_expr(&mul(rat_i(2), pow(add(var("x"), rat_i(1)), 2))),
            "2*(x + 1)^2"
        );
    }

    #[test]
    fn fonctions_et_racines() {
        let e = mul(
            var("x"),
            Expr::Sin(Box::new(mul(rat(1, 180), mul(Expr::Pi, var("x"))))),
        );
        assert_eq!(format_expr(&e), "x*sin(π*x/180)");
        assert_eq!(format_expr(&pow(Expr::Cos(Box::new(var("t"))), 2)), "cos(t)^2");
        assert_eq!(format_expr(&Expr::Sqrt(Box::new(var("x")))), "√x");
        assert_eq!(
            format_expr(&Expr::Sqrt(Box::new(add(var("x"), rat_i(1))))),
            "√(x + 1)"
        );
        assert_eq!(format_expr(&pow(Expr::Sqrt(Box::new(var("x"))), 3)), "(√x)^3");
        assert_eq!(format_expr(&Expr::Indefini), "indéfini");
    }

    #[test]
    fn resultats() {
        assert_eq!(format_solutions(&[rat_i(2), rat_i(3)]), "[2, 3]");
        assert_eq!(format_solutions(&[]), "[]");
        assert_eq!(format_verdict(true), "TRUE");
        assert_eq!(
            format_spectre(&[Complex64::new(10.0, 0.0), Complex64::new(-2.0, -2.0)]),
            "[10 + 0i, -2 - 2i]"
        );
        assert_eq!(format_complexe(&Complex64::new(0.1234567, 1.5)), "0.123457 + 1.5i");
    }
}
