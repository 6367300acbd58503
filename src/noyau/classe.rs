// src/noyau/classe.rs
//
// Classification d’une requête normalisée en un des cinq genres.
// Ordre de priorité fixe (le premier qui accepte gagne) :
//   1) contient '='     -> Equation
//   2) préfixe "d/d"    -> Derivee
//   3) préfixe "int"    -> Integrale  (limite connue : "integral x" tombe ici aussi)
//   4) préfixe "fft"    -> Spectre
//   5) sinon            -> Generale
//
// La table REGLES est la seule source de vérité de l’ordre.

use super::erreur::ErreurRequete;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Genre {
    Equation,
    Derivee,
    Integrale,
    Spectre,
    Generale,
}

impl Genre {
    pub fn nom(self) -> &'static str {
        match self {
            Genre::Equation => "équation",
            Genre::Derivee => "dérivée",
            Genre::Integrale => "intégrale",
            Genre::Spectre => "spectre (FFT)",
            Genre::Generale => "expression",
        }
    }
}

/// Genre + sous-chaînes extraites (possédées par la requête en cours).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    Equation { gauche: String, droite: String },
    Derivee { variable: char, expression: String },
    Integrale { expression: String },
    Spectre { sequence: String },
    Generale { expression: String },
}

impl Classification {
    pub fn genre(&self) -> Genre {
        match self {
            Classification::Equation { .. } => Genre::Equation,
            Classification::Derivee { .. } => Genre::Derivee,
            Classification::Integrale { .. } => Genre::Integrale,
            Classification::Spectre { .. } => Genre::Spectre,
            Classification::Generale { .. } => Genre::Generale,
        }
    }
}

/* ------------------------ prédicats ordonnés ------------------------ */

type Predicat = fn(&str) -> bool;

const PREFIXE_DERIVEE: &str = "d/d";
const PREFIXE_INTEGRALE: &str = "int";
const PREFIXE_SPECTRE: &str = "fft";

fn a_egal(s: &str) -> bool {
    s.contains('=')
}

fn est_derivee(s: &str) -> bool {
    s.starts_with(PREFIXE_DERIVEE)
}

fn est_integrale(s: &str) -> bool {
    s.starts_with(PREFIXE_INTEGRALE)
}

fn est_spectre(s: &str) -> bool {
    s.starts_with(PREFIXE_SPECTRE)
}

fn toujours(_: &str) -> bool {
    true
}

const REGLES: [(Genre, Predicat); 5] = [
    (Genre::Equation, a_egal),
    (Genre::Derivee, est_derivee),
    (Genre::Integrale, est_integrale),
    (Genre::Spectre, est_spectre),
    (Genre::Generale, toujours),
];

/// Genre seul (sans extraction), utile pour tester l’ordre isolément.
pub fn genre(s: &str) -> Genre {
    REGLES
        .iter()
        .find(|(_, accepte)| accepte(s))
        .map(|(g, _)| *g)
        .unwrap_or(Genre::Generale)
}

/// Classification complète : genre + extraction des sous-chaînes.
pub fn classe(s: &str) -> Result<Classification, ErreurRequete> {
    match genre(s) {
        Genre::Equation => {
            if s.matches('=').count() > 1 {
                return Err(ErreurRequete::classification("plusieurs '='"));
            }
            let (gauche, droite) = s
                .split_once('=')
                .ok_or_else(|| ErreurRequete::classification("'=' introuvable"))?;
            Ok(Classification::Equation {
                gauche: gauche.to_string(),
                droite: droite.to_string(),
            })
        }

        Genre::Derivee => {
            // "d/d" + variable (1 caractère) + au moins un caractère d’expression
            if s.chars().count() < 5 {
                return Err(ErreurRequete::classification("dérivée tronquée"));
            }
            let variable = s[PREFIXE_DERIVEE.len()..]
                .chars()
                .next()
                .ok_or_else(|| ErreurRequete::classification("variable absente"))?;
            if !variable.is_ascii_alphabetic() {
                return Err(ErreurRequete::classification(format!(
                    "variable de dérivation invalide: {variable:?}"
                )));
            }
            let debut = PREFIXE_DERIVEE.len() + variable.len_utf8();
            Ok(Classification::Derivee {
                variable,
                expression: s[debut..].to_string(),
            })
        }

        Genre::Integrale => {
            let reste = &s[PREFIXE_INTEGRALE.len()..];
            if reste.trim().is_empty() {
                return Err(ErreurRequete::classification("intégrale sans expression"));
            }
            Ok(Classification::Integrale {
                expression: reste.to_string(),
            })
        }

        Genre::Spectre => Ok(Classification::Spectre {
            sequence: s.replace(PREFIXE_SPECTRE, ""),
        }),

        Genre::Generale => Ok(Classification::Generale {
            expression: s.to_string(),
        }),
    }
}
