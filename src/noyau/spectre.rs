// src/noyau/spectre.rs
//
// Chemin FFT : AUCUNE évaluation de code.
// Grammaire stricte d’une séquence numérique :
//   [n, n, ...]  |  (n, n, ...)  |  n, n, ...
//   n = décimal signé, fraction et exposant optionnels (-1.5e3)
// Pas d’identifiant, pas d’opérateur, pas d’imbrication ; NaN/inf refusés.
// Puis DFT directe non normalisée (rustfft), même longueur que l’entrée.

use num_complex::Complex64;
use regex_lite::Regex;
use rustfft::FftPlanner;
use tracing::trace;

use super::erreur::ErreurRequete;
use super::reglages::Reglages;

const MOTIF_NOMBRE: &str = r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$";

#[derive(Clone, Debug)]
pub struct LecteurSequence {
    nombre: Regex,
}

impl LecteurSequence {
    pub fn new() -> Result<Self, regex_lite::Error> {
        Ok(Self {
            nombre: Regex::new(MOTIF_NOMBRE)?,
        })
    }

    pub fn lit(&self, texte: &str, reglages: &Reglages) -> Result<Vec<f64>, ErreurRequete> {
        let s = texte.trim();
        let interieur = match (s.chars().next(), s.chars().last()) {
            (Some('['), Some(']')) | (Some('('), Some(')')) if s.len() >= 2 => &s[1..s.len() - 1],
            (Some('[' | '('), _) | (_, Some(']' | ')')) => {
                return Err(ErreurRequete::calcul("délimiteurs de séquence incohérents"))
            }
            _ => s,
        };

        if interieur.trim().is_empty() {
            return Err(ErreurRequete::calcul("séquence vide"));
        }

        let morceaux: Vec<&str> = interieur.split(',').map(str::trim).collect();
        if morceaux.len() > reglages.echantillons_max {
            return Err(ErreurRequete::budget(format!(
                "séquence de {} valeurs (max {})",
                morceaux.len(),
                reglages.echantillons_max
            )));
        }

        morceaux
            .into_iter()
            .map(|m| {
                if !self.nombre.is_match(m) {
                    return Err(ErreurRequete::calcul(format!("valeur invalide: {m:?}")));
                }
                let x: f64 = m
                    .parse()
                    .map_err(|_| ErreurRequete::calcul(format!("valeur invalide: {m:?}")))?;
                if x.is_finite() {
                    Ok(x)
                } else {
                    Err(ErreurRequete::calcul(format!("valeur non finie: {m:?}")))
                }
            })
            .collect()
    }
}

/// DFT directe, non normalisée.
/// Entrées finies mais sommes qui débordent (1e308 + 1e308) : erreur de calcul.
pub fn fft(valeurs: &[f64]) -> Result<Vec<Complex64>, ErreurRequete> {
    let mut tampon: Vec<Complex64> = valeurs.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    if tampon.is_empty() {
        return Ok(tampon);
    }
    let mut planificateur = FftPlanner::<f64>::new();
    let plan = planificateur.plan_fft_forward(tampon.len());
    plan.process(&mut tampon);
    trace!(n = tampon.len(), "fft");

    if tampon.iter().any(|z| !z.re.is_finite() || !z.im.is_finite()) {
        return Err(ErreurRequete::calcul("spectre non fini (dépassement f64)"));
    }
    Ok(tampon)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Result<Vec<f64>, ErreurRequete> {
        LecteurSequence::new().unwrap().lit(s, &Reglages::default())
    }

    fn proche(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-9
    }

    #[test]
    fn grammaire_acceptee() {
        assert_eq!(lit(" [1, 2, 3, 4] ").unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(lit("(1,-2.5)").unwrap(), vec![1.0, -2.5]);
        assert_eq!(lit("1e3, .5, +2.").unwrap(), vec![1000.0, 0.5, 2.0]);
        assert_eq!(lit("[7]").unwrap(), vec![7.0]);
    }

    #[test]
    fn grammaire_refusee() {
        for s in [
            "",
            "[]",
            "[1, 2",
            "1, 2]",
            "[1, [2]]",
            "[1, x]",
            "[1 + 1]",
            "[__import__('os')]",
            "[nan]",
            "[inf]",
            "[1e999]",
            "[1,,2]",
            "[1 2]",
        ] {
            assert!(
                matches!(lit(s), Err(ErreurRequete::Calcul(_))),
                "séquence acceptée à tort: {s:?}"
            );
        }
    }

    #[test]
    fn budget_longueur() {
        let r = Reglages {
            echantillons_max: 3,
            ..Reglages::default()
        };
        let l = LecteurSequence::new().unwrap();
        assert!(matches!(
            l.lit("[1, 2, 3, 4]", &r),
            Err(ErreurRequete::Budget(_))
        ));
    }

    #[test]
    fn fft_quatre_points() {
        let y = fft(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        let attendu = [
            Complex64::new(10.0, 0.0),
            Complex64::new(-2.0, 2.0),
            Complex64::new(-2.0, 0.0),
            Complex64::new(-2.0, -2.0),
        ];
        assert_eq!(y.len(), 4);
        for (a, b) in y.iter().zip(attendu) {
            assert!(proche(*a, b), "{a} != {b}");
        }
    }

    #[test]
    fn fft_longueur_impaire() {
        let y = fft(&[1.0, 1.0, 1.0]).unwrap();
        assert!(proche(y[0], Complex64::new(3.0, 0.0)));
        assert!(proche(y[1], Complex64::new(0.0, 0.0)));
        assert!(proche(y[2], Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn fft_debordement_refuse() {
        // valeurs finies, mais X[0] = 2e308 déborde
        assert!(matches!(
            fft(&[1e308, 1e308]),
            Err(ErreurRequete::Calcul(_))
        ));
        assert!(fft(&[1e300, -1e300]).is_ok());
    }
}
