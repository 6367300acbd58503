// src/noyau/lecture.rs
//
// ΣLocal : lecture décimale TRONQUÉE d’une expression exacte sans symbole libre.
// Tout se fait en virgule fixe sur BigInt (×10^p), p = digits + GARDE :
// - π par Machin
// - √ par Newton (BigInt::sqrt)
// - sin/cos/tan, exp, log par séries
// Aucun flottant, aucun cache global.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use super::erreur::ErreurRequete;
use super::expr::Expr;

/// Chiffres de garde (troncatures intermédiaires).
const GARDE: usize = 10;

/// Au-delà, exp() produirait des nombres gigantesques.
const EXP_ARG_MAX: i64 = 10_000;

/// Borne du nombre de termes d’une série (anti-gel).
const MAX_TERMES: usize = 100_000;

/* ------------------------ Décimal (scaled -> texte) ------------------------ */

fn pow10(n: usize) -> BigInt {
    BigInt::from(10).pow(n as u32)
}

/// Convertit un entier “scalé” (×10^digits) en texte décimal tronqué.
pub fn scaled_to_decimal(mut scaled: BigInt, digits: usize) -> String {
    let neg = scaled.is_negative();
    if neg {
        scaled = -scaled;
    }

    let scale = pow10(digits);
    let int_part = &scaled / &scale;
    let frac_part = &scaled % &scale;

    let signe = if neg { "-" } else { "" };
    if digits == 0 {
        return format!("{signe}{int_part}");
    }

    let mut frac = frac_part.to_str_radix(10);
    while frac.len() < digits {
        frac.insert(0, '0');
    }

    format!("{signe}{int_part}.{frac}")
}

/// Lecture ΣLocal en texte (digits chiffres après la virgule).
pub fn lecture_decimale(expr: &Expr, digits: usize) -> Result<String, ErreurRequete> {
    Ok(scaled_to_decimal(eval_scaled(expr, digits)?, digits))
}

/// Évalue une expression en entier “scalé” (×10^digits), troncature vers zéro.
/// - Erreur si Indefini ou Var (ΣLocal exige une valeur pour chaque symbole).
pub fn eval_scaled(expr: &Expr, digits: usize) -> Result<BigInt, ErreurRequete> {
    // valeur rationnelle exacte : pas besoin des chiffres de garde
    if let Expr::Rat(r) = expr {
        return Ok(rational_scaled(r, digits));
    }
    let fx = VirguleFixe::new(digits + GARDE);
    let v = fx.eval(expr)?;
    Ok(v / pow10(GARDE))
}

/// r -> entier “scalé” = trunc(r * 10^digits)
fn rational_scaled(r: &BigRational, digits: usize) -> BigInt {
    (r.numer() * pow10(digits)) / r.denom()
}

/* ------------------------ Virgule fixe ------------------------ */

struct VirguleFixe {
    p: usize,
    un: BigInt,
}

impl VirguleFixe {
    fn new(p: usize) -> Self {
        Self { p, un: pow10(p) }
    }

    fn mul(&self, a: &BigInt, b: &BigInt) -> BigInt {
        (a * b) / &self.un
    }

    fn div(&self, a: &BigInt, b: &BigInt) -> Result<BigInt, ErreurRequete> {
        if b.is_zero() {
            return Err(ErreurRequete::calcul("division par zéro"));
        }
        Ok((a * &self.un) / b)
    }

    fn eval(&self, expr: &Expr) -> Result<BigInt, ErreurRequete> {
        use Expr::*;

        match expr {
            Indefini => Err(ErreurRequete::calcul("indéfini")),
            Var(s) => Err(ErreurRequete::calcul(format!(
                "symbole libre {s} : ΣLocal indisponible"
            ))),

            Rat(r) => Ok(rational_scaled(r, self.p)),
            Pi => Ok(self.pi()),
            I => Err(ErreurRequete::calcul("valeur non réelle")),

            Add(a, b) => Ok(self.eval(a)? + self.eval(b)?),
            Sub(a, b) => Ok(self.eval(a)? - self.eval(b)?),
            Mul(a, b) => Ok(self.mul(&self.eval(a)?, &self.eval(b)?)),
            Div(a, b) => self.div(&self.eval(a)?, &self.eval(b)?),

            PowInt(base, n) => {
                // base rationnelle : exact
                if let Rat(r) = &**base {
                    if r.is_zero() && *n < 0 {
                        return Err(ErreurRequete::calcul("division par zéro"));
                    }
                    let rr = super::expr::puissance_bornee(r, *n)
                        .ok_or_else(|| ErreurRequete::budget("puissance exacte hors budget"))?;
                    return Ok(rational_scaled(&rr, self.p));
                }
                let b = self.eval(base)?;
                self.puissance(&b, *n)
            }

            Sqrt(x) => {
                let v = self.eval(x)?;
                if v.is_negative() {
                    return Err(ErreurRequete::calcul("√ d’un négatif"));
                }
                Ok((v * &self.un).sqrt())
            }

            Sin(x) => {
                let v = self.reduit_2pi(self.eval(x)?);
                Ok(self.sin(&v))
            }
            Cos(x) => {
                let v = self.reduit_2pi(self.eval(x)?);
                Ok(self.cos(&v))
            }
            Tan(x) => {
                let v = self.reduit_2pi(self.eval(x)?);
                let c = self.cos(&v);
                if c.is_zero() {
                    return Err(ErreurRequete::calcul("tan : cosinus nul"));
                }
                self.div(&self.sin(&v), &c)
            }

            Exp(x) => {
                let v = self.eval(x)?;
                self.exp(v)
            }
            Log(x) => {
                let v = self.eval(x)?;
                self.log(v)
            }
        }
    }

    fn puissance(&self, b: &BigInt, n: i64) -> Result<BigInt, ErreurRequete> {
        let mut e = n.unsigned_abs();
        let mut acc = self.un.clone();
        let mut base = b.clone();
        while e > 0 {
            if e & 1 == 1 {
                acc = self.mul(&acc, &base);
            }
            e >>= 1;
            if e > 0 {
                base = self.mul(&base, &base);
            }
        }
        if n < 0 {
            return self.div(&self.un, &acc);
        }
        Ok(acc)
    }

    /* --- π (Machin) --- */

    /// arctan(1/q) en entier scalé (troncature) via série:
    /// atan(z) = z - z^3/3 + z^5/5 - ...
    fn arctan_inv(&self, q: i64) -> BigInt {
        let q = BigInt::from(q);
        let q2 = &q * &q;

        let mut k: usize = 0;
        let mut q_pow = q; // q^(2k+1)
        let mut sum = BigInt::zero();

        loop {
            let d = &q_pow * BigInt::from(2 * k + 1);
            let term = &self.un / d;
            if term.is_zero() {
                break;
            }
            if k % 2 == 0 {
                sum += term;
            } else {
                sum -= term;
            }
            q_pow *= &q2;
            k += 1;
        }
        sum
    }

    fn pi(&self) -> BigInt {
        // Machin : π = 16*atan(1/5) - 4*atan(1/239)
        BigInt::from(16) * self.arctan_inv(5) - BigInt::from(4) * self.arctan_inv(239)
    }

    /* --- trig --- */

    /// x ramené dans [-π, π].
    fn reduit_2pi(&self, x: BigInt) -> BigInt {
        let deux_pi = self.pi() * 2;
        let demi = &deux_pi / 2;
        // k = round(x / 2π)
        let k = if x.is_negative() {
            (&x - &demi) / &deux_pi
        } else {
            (&x + &demi) / &deux_pi
        };
        x - k * deux_pi
    }

    /// Série alternée Σ (-1)^k x^(2k+d) / (2k+d)!  (d = 1 : sin, d = 0 : cos)
    fn serie_trig(&self, x: &BigInt, d: u32) -> BigInt {
        let x2 = self.mul(x, x);
        let mut terme = if d == 1 { x.clone() } else { self.un.clone() };
        let mut sum = terme.clone();
        let mut n: u64 = u64::from(d);
        for _ in 0..MAX_TERMES {
            // terme *= -x² / ((n+1)(n+2))
            terme = -self.mul(&terme, &x2) / BigInt::from((n + 1) * (n + 2));
            if terme.is_zero() {
                break;
            }
            sum += &terme;
            n += 2;
        }
        sum
    }

    fn sin(&self, x: &BigInt) -> BigInt {
        self.serie_trig(x, 1)
    }

    fn cos(&self, x: &BigInt) -> BigInt {
        self.serie_trig(x, 0)
    }

    /* --- exp / log --- */

    fn exp(&self, x: BigInt) -> Result<BigInt, ErreurRequete> {
        let borne = BigInt::from(EXP_ARG_MAX) * &self.un;
        if x.abs() > borne {
            return Err(ErreurRequete::budget("exp : argument trop grand"));
        }

        // réduction : exp(x) = exp(x/2^m)^(2^m), |x/2^m| <= 1/2
        let demi = &self.un / 2;
        let mut y = x;
        let mut m: u32 = 0;
        while y.abs() > demi {
            y /= 2;
            m += 1;
        }

        // série de Taylor
        let mut terme = self.un.clone();
        let mut sum = self.un.clone();
        for k in 1..=MAX_TERMES {
            terme = self.mul(&terme, &y) / BigInt::from(k);
            if terme.is_zero() {
                break;
            }
            sum += &terme;
        }

        for _ in 0..m {
            sum = self.mul(&sum, &sum);
        }
        Ok(sum)
    }

    /// 2·atanh(z) = Σ 2 z^(2k+1)/(2k+1)
    fn atanh2(&self, z: &BigInt) -> BigInt {
        let z2 = self.mul(z, z);
        let mut puiss = z.clone();
        let mut sum = BigInt::zero();
        for k in 0..MAX_TERMES {
            let terme = &puiss / BigInt::from(2 * k + 1);
            if terme.is_zero() {
                break;
            }
            sum += terme;
            puiss = self.mul(&puiss, &z2);
        }
        sum * 2
    }

    fn log(&self, x: BigInt) -> Result<BigInt, ErreurRequete> {
        if !x.is_positive() {
            return Err(ErreurRequete::calcul("log d’un nombre non positif"));
        }

        // x = m·2^k avec m ∈ [1/2, 2]
        let deux = &self.un * 2;
        let demi = &self.un / 2;
        let mut m = x;
        let mut k: i64 = 0;
        while m > deux {
            m /= 2;
            k += 1;
        }
        while m < demi {
            m *= 2;
            k -= 1;
        }

        // ln m = 2 atanh((m-1)/(m+1)) ; ln 2 = 2 atanh(1/3)
        let z = self.div(&(&m - &self.un), &(&m + &self.un))?;
        let ln_m = self.atanh2(&z);
        let ln2 = self.atanh2(&(&self.un / 3));
        Ok(ln_m + ln2 * BigInt::from(k))
    }
}

/// Valeur approchée (f64) pour ordonner des racines ; None si non évaluable.
pub fn approx_f64(expr: &Expr) -> Option<f64> {
    const DIGITS: usize = 30;
    let s = eval_scaled(expr, DIGITS).ok()?;
    let r = BigRational::new(s, pow10(DIGITS));
    r.to_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::expr::{div, rat, rat_i};

    fn lit(e: &Expr, digits: usize) -> String {
        lecture_decimale(e, digits).unwrap()
    }

    #[test]
    fn rationnels_tronques() {
        assert_eq!(lit(&rat(1, 3), 5), "0.33333");
        assert_eq!(lit(&rat(-2, 3), 4), "-0.6666");
        assert_eq!(lit(&rat_i(7), 0), "7");
    }

    #[test]
    fn pi_et_racines() {
        assert!(lit(&Expr::Pi, 20).starts_with("3.14159265358979323846"));
        let r2 = Expr::Sqrt(Box::new(rat_i(2)));
        assert_eq!(lit(&r2, 15), "1.414213562373095");
    }

    #[test]
    fn fonctions_transcendantes() {
        let e1 = Expr::Exp(Box::new(rat_i(1)));
        assert_eq!(lit(&e1, 15), "2.718281828459045");

        let l2 = Expr::Log(Box::new(rat_i(2)));
        assert_eq!(lit(&l2, 15), "0.693147180559945");

        // sin(π/6) = 1/2
        let s = Expr::Sin(Box::new(div(Expr::Pi, rat_i(6))));
        let v = approx_f64(&s).unwrap();
        assert!((v - 0.5).abs() < 1e-20);

        // cos(1) = 0.5403023058681397...
        let c = Expr::Cos(Box::new(rat_i(1)));
        assert_eq!(lit(&c, 12), "0.540302305868");
    }

    #[test]
    fn erreurs() {
        assert!(eval_scaled(&Expr::Var("x".into()), 5).is_err());
        assert!(eval_scaled(&Expr::Indefini, 5).is_err());
        assert!(eval_scaled(&Expr::Log(Box::new(rat_i(-1))), 5).is_err());
        assert!(eval_scaled(&Expr::Sqrt(Box::new(rat_i(-4))), 5).is_err());
    }

    #[test]
    fn approximation_pour_tri() {
        let v = approx_f64(&Expr::Sqrt(Box::new(rat_i(2)))).unwrap();
        assert!((v - std::f64::consts::SQRT_2).abs() < 1e-12);
    }
}
