// src/noyau/poly.rs
//
// Vue polynomiale d’une expression en UNE variable v.
// - Poly     : coefficients Expr (forme canon), coeffs[k] devant v^k, pas de zéro en tête
// - Fraction : num / den (quotient de polynômes), pour résoudre f(v) = 0
// - outils rationnels (Q[v]) : division euclidienne, pgcd, évaluation exacte
//
// Garde-fou : tout degré au-delà de Reglages::degre_max => Budget.

use num_rational::BigRational;
use num_traits::{One, Zero};

use super::erreur::ErreurRequete;
use super::eval::forme_auto;
use super::expr::{add, mul, neg, rat_i, Expr};
use super::reglages::Reglages;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly {
    coeffs: Vec<Expr>,
}

impl Poly {
    fn depuis(coeffs: Vec<Expr>) -> Self {
        let mut coeffs: Vec<Expr> = coeffs.into_iter().map(Expr::canon).collect();
        while coeffs.last().is_some_and(Expr::is_zero) {
            coeffs.pop();
        }
        Self { coeffs }
    }

    pub fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    pub fn constante(c: Expr) -> Self {
        Self::depuis(vec![c])
    }

    /// Le polynôme v.
    pub fn variable() -> Self {
        Self::depuis(vec![rat_i(0), rat_i(1)])
    }

    pub fn depuis_rationnels(q: &[BigRational]) -> Self {
        Self::depuis(q.iter().cloned().map(Expr::Rat).collect())
    }

    pub fn est_nul(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degré (0 pour le polynôme nul).
    pub fn degre(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn coeff(&self, k: usize) -> Expr {
        self.coeffs.get(k).cloned().unwrap_or_else(|| rat_i(0))
    }

    pub fn coeffs(&self) -> &[Expr] {
        &self.coeffs
    }

    pub fn add(&self, autre: &Poly) -> Poly {
        let n = self.coeffs.len().max(autre.coeffs.len());
        Self::depuis((0..n).map(|k| add(self.coeff(k), autre.coeff(k))).collect())
    }

    pub fn neg(&self) -> Poly {
        Self::depuis(self.coeffs.iter().cloned().map(neg).collect())
    }

    pub fn sub(&self, autre: &Poly) -> Poly {
        self.add(&autre.neg())
    }

    pub fn mul(&self, autre: &Poly) -> Poly {
        if self.est_nul() || autre.est_nul() {
            return Poly::zero();
        }
        let mut out = vec![rat_i(0); self.coeffs.len() + autre.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in autre.coeffs.iter().enumerate() {
                let terme = mul(a.clone(), b.clone());
                out[i + j] = add(std::mem::replace(&mut out[i + j], rat_i(0)), terme).canon();
            }
        }
        Self::depuis(out)
    }

    pub fn puissance(&self, n: u32, reglages: &Reglages) -> Result<Poly, ErreurRequete> {
        reglages.verifie_degre(self.degre().saturating_mul(n as usize))?;
        let mut acc = Poly::constante(rat_i(1));
        let mut base = self.clone();
        let mut e = n;
        while e > 0 {
            if e & 1 == 1 {
                acc = acc.mul(&base);
            }
            e >>= 1;
            if e > 0 {
                base = base.mul(&base);
            }
        }
        Ok(acc)
    }

    /// p(x) par Horner, puis forme_auto.
    pub fn evalue(&self, x: &Expr) -> Expr {
        let acc = self
            .coeffs
            .iter()
            .rev()
            .fold(rat_i(0), |acc, c| add(mul(acc, x.clone()), c.clone()));
        forme_auto(acc)
    }

    /// Coefficients rationnels (None si un coefficient est symbolique).
    pub fn rationnels(&self) -> Option<Vec<BigRational>> {
        self.coeffs
            .iter()
            .map(|c| match c {
                Expr::Rat(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }
}

/* ------------------------ Fraction num/den ------------------------ */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fraction {
    pub num: Poly,
    pub den: Poly,
}

impl Fraction {
    fn polynome(p: Poly) -> Self {
        Self {
            num: p,
            den: Poly::constante(rat_i(1)),
        }
    }

    fn verifie(self, reglages: &Reglages) -> Result<Self, ErreurRequete> {
        reglages.verifie_degre(self.num.degre())?;
        reglages.verifie_degre(self.den.degre())?;
        Ok(self)
    }
}

/// Lit `e` comme un quotient de polynômes en `v`.
pub fn fraction(e: &Expr, v: &str, reglages: &Reglages) -> Result<Fraction, ErreurRequete> {
    use Expr::*;

    if !e.contient_var(v) {
        return Ok(Fraction::polynome(Poly::constante(e.clone())));
    }

    let f = match e {
        Var(_) => Fraction::polynome(Poly::variable()),

        Add(a, b) | Sub(a, b) => {
            let fa = fraction(a, v, reglages)?;
            let fb = fraction(b, v, reglages)?;
            let moins = matches!(e, Sub(_, _));
            let combine = |p: &Poly, q: &Poly| if moins { p.sub(q) } else { p.add(q) };
            if fa.den == fb.den {
                Fraction {
                    num: combine(&fa.num, &fb.num),
                    den: fa.den,
                }
            } else {
                Fraction {
                    num: combine(&fa.num.mul(&fb.den), &fb.num.mul(&fa.den)),
                    den: fa.den.mul(&fb.den),
                }
            }
        }

        Mul(a, b) => {
            let fa = fraction(a, v, reglages)?;
            let fb = fraction(b, v, reglages)?;
            Fraction {
                num: fa.num.mul(&fb.num),
                den: fa.den.mul(&fb.den),
            }
        }

        Div(a, b) => {
            let fa = fraction(a, v, reglages)?;
            let fb = fraction(b, v, reglages)?;
            if fb.num.est_nul() {
                return Err(ErreurRequete::calcul("division par zéro"));
            }
            Fraction {
                num: fa.num.mul(&fb.den),
                den: fa.den.mul(&fb.num),
            }
        }

        PowInt(b, n) => {
            let fb = fraction(b, v, reglages)?;
            let k = u32::try_from(n.unsigned_abs())
                .map_err(|_| ErreurRequete::budget("exposant trop grand"))?;
            if *n >= 0 {
                Fraction {
                    num: fb.num.puissance(k, reglages)?,
                    den: fb.den.puissance(k, reglages)?,
                }
            } else {
                if fb.num.est_nul() {
                    return Err(ErreurRequete::calcul("division par zéro"));
                }
                Fraction {
                    num: fb.den.puissance(k, reglages)?,
                    den: fb.num.puissance(k, reglages)?,
                }
            }
        }

        _ => {
            return Err(ErreurRequete::calcul(format!(
                "forme non polynomiale en {v}"
            )))
        }
    };

    f.verifie(reglages)
}

/* ------------------------ Q[v] : outils rationnels ------------------------ */

fn nettoie(p: &mut Vec<BigRational>) {
    while p.last().is_some_and(Zero::is_zero) {
        p.pop();
    }
}

/// Division euclidienne a = q·b + r (b non nul).
pub(crate) fn division(a: &[BigRational], b: &[BigRational]) -> (Vec<BigRational>, Vec<BigRational>) {
    let mut r = a.to_vec();
    nettoie(&mut r);
    let mut b = b.to_vec();
    nettoie(&mut b);

    let Some(tete) = b.last().cloned() else {
        return (Vec::new(), r);
    };
    if r.len() < b.len() {
        return (Vec::new(), r);
    }

    let mut q = vec![BigRational::zero(); r.len() - b.len() + 1];
    while r.len() >= b.len() && !r.is_empty() {
        let decal = r.len() - b.len();
        let c = r[r.len() - 1].clone() / &tete;
        for (i, bi) in b.iter().enumerate() {
            r[decal + i] -= &c * bi;
        }
        q[decal] = c;
        r.pop();
        nettoie(&mut r);
    }
    nettoie(&mut q);
    (q, r)
}

/// PGCD unitaire (Euclide).
pub(crate) fn pgcd(a: &[BigRational], b: &[BigRational]) -> Vec<BigRational> {
    let mut x = a.to_vec();
    let mut y = b.to_vec();
    nettoie(&mut x);
    nettoie(&mut y);
    while !y.is_empty() {
        let (_, r) = division(&x, &y);
        x = y;
        y = r;
    }
    if let Some(tete) = x.last().cloned() {
        for c in x.iter_mut() {
            *c /= &tete;
        }
    }
    x
}

pub(crate) fn evalue_q(p: &[BigRational], x: &BigRational) -> BigRational {
    p.iter()
        .rev()
        .fold(BigRational::zero(), |acc, c| acc * x + c)
}

/// Vrai si p (unitaire) vaut 1.
pub(crate) fn est_un(p: &[BigRational]) -> bool {
    p.len() == 1 && p[0].is_one()
}
