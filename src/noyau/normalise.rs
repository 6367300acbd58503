// src/noyau/normalise.rs
//
// Normalisation du texte brut (avant classification) :
// 1) minuscules
// 2) '^' -> '**' (le caret est un alias de la puissance)
// 3a) sin**2 30 -> sin(30)**2
// 3) sin 60 -> sin(60) (nom, espaces, chiffres ; les appels parenthésés ne bougent pas)
//
// Fonction pure, jamais en échec, idempotente.

use regex_lite::Regex;

/// `nom**k <espaces> chiffres` (notation sin² 30 des exemples).
const MOTIF_PUISSANCE_TRIG: &str = r"(sin|cos|tan)\*\*(\d+)\s+(\d+)";

/// `nom <espaces> chiffres`.
const MOTIF_APPEL_TRIG: &str = r"(sin|cos|tan)\s+(\d+)";

/// Motifs compilés une seule fois, puis partagés en lecture.
#[derive(Clone, Debug)]
pub struct Normaliseur {
    puissance_trig: Regex,
    appel_trig: Regex,
}

impl Normaliseur {
    pub fn new() -> Result<Self, regex_lite::Error> {
        Ok(Self {
            puissance_trig: Regex::new(MOTIF_PUISSANCE_TRIG)?,
            appel_trig: Regex::new(MOTIF_APPEL_TRIG)?,
        })
    }

    pub fn normalise(&self, brut: &str) -> String {
        let minuscules = brut.to_lowercase();
        let puissances = minuscules.replace('^', "**");
        let carres = self
            .puissance_trig
            .replace_all(&puissances, "${1}(${3})**${2}");
        self.appel_trig
            .replace_all(&carres, "${1}(${2})")
            .into_owned()
    }
}
