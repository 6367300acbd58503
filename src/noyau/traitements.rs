// src/noyau/traitements.rs
//
// Point d’entrée unique du noyau :
//   brut -> normalise -> classe -> traitement du genre -> Resultat
//
// - resoudre : erreurs TYPÉES (tests, journal)
// - repondre : frontière ; toute erreur devient Resultat::Erreur(MESSAGE_GENERIQUE)
//
// Le Moteur ne contient que des données immuables (table, motifs, réglages) :
// une requête n’a aucun effet sur la suivante.

use num_complex::Complex64;
use tracing::{debug, trace, warn};

use super::classe::{classe, Classification, Genre};
use super::derivee::derive;
use super::erreur::{ErreurRequete, MESSAGE_GENERIQUE};
use super::eval::{analyse, forme_auto, lecture_si_constante, simplifie};
use super::expr::{sub, Expr};
use super::format::{format_expr, format_solutions, format_spectre, format_verdict};
use super::integrale::integre;
use super::normalise::Normaliseur;
use super::reglages::Reglages;
use super::resolution::resout;
use super::spectre::{fft, LecteurSequence};
use super::symboles::TableSymboles;

#[derive(Clone, Debug, PartialEq)]
pub enum Resultat {
    Solutions(Vec<Expr>),
    Verdict(bool),
    Expression(Expr),
    Spectre(Vec<Complex64>),
    Erreur(String),
}

impl Resultat {
    /// Rendu texte (UI, journal).
    pub fn texte(&self) -> String {
        match self {
            Resultat::Solutions(s) => format_solutions(s),
            Resultat::Verdict(v) => format_verdict(*v),
            Resultat::Expression(e) => format_expr(e),
            Resultat::Spectre(z) => format_spectre(z),
            Resultat::Erreur(msg) => msg.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Reponse {
    /// None si la requête a échoué avant la classification.
    pub genre: Option<Genre>,
    pub resultat: Resultat,
}

#[derive(Clone, Debug)]
pub struct Moteur {
    table: TableSymboles,
    normaliseur: Normaliseur,
    sequences: LecteurSequence,
    reglages: Reglages,
}

impl Moteur {
    pub fn new(reglages: Reglages) -> Result<Self, regex_lite::Error> {
        Ok(Self {
            table: TableSymboles::standard(),
            normaliseur: Normaliseur::new()?,
            sequences: LecteurSequence::new()?,
            reglages,
        })
    }

    pub fn table(&self) -> &TableSymboles {
        &self.table
    }

    pub fn reglages(&self) -> &Reglages {
        &self.reglages
    }

    pub fn set_digits(&mut self, digits: usize) {
        self.reglages.set_digits(digits);
    }

    pub fn normalise(&self, brut: &str) -> String {
        self.normaliseur.normalise(brut)
    }

    /// ΣLocal d’un résultat exact (None si symbole libre ou indéfini).
    pub fn lecture(&self, e: &Expr) -> Option<String> {
        lecture_si_constante(e, self.reglages.digits)
    }

    /// Frontière : jamais d’erreur typée vers l’appelant.
    pub fn repondre(&self, requete: &str) -> Reponse {
        match self.resoudre(requete) {
            Ok(r) => r,
            Err(e) => {
                warn!(requete, erreur = %e, "requête refusée");
                Reponse {
                    genre: None,
                    resultat: Resultat::Erreur(MESSAGE_GENERIQUE.to_string()),
                }
            }
        }
    }

    pub fn resoudre(&self, requete: &str) -> Result<Reponse, ErreurRequete> {
        self.reglages.verifie_longueur(requete)?;

        let normalisee = self.normalise(requete);
        let c = classe(&normalisee)?;
        let genre = c.genre();
        debug!(requete = %normalisee, genre = genre.nom(), "classification");

        let resultat = match c {
            Classification::Equation { gauche, droite } => self.equation(&gauche, &droite)?,
            Classification::Derivee {
                variable,
                expression,
            } => self.derivee(variable, &expression)?,
            Classification::Integrale { expression } => self.integrale(&expression)?,
            Classification::Spectre { sequence } => self.spectre(&sequence)?,
            Classification::Generale { expression } => self.generale(&expression)?,
        };

        Ok(Reponse {
            genre: Some(genre),
            resultat,
        })
    }

    /* ------------------------ traitements par genre ------------------------ */

    fn lit(&self, texte: &str) -> Result<Expr, ErreurRequete> {
        let e = analyse(texte, &self.table)?;
        self.reglages.verifie_noeuds(e.noeuds())?;
        Ok(e)
    }

    fn verifie(&self, e: Expr) -> Result<Expr, ErreurRequete> {
        self.reglages.verifie_noeuds(e.noeuds())?;
        Ok(e)
    }

    /// Après simplification : une puissance encore non évaluée est hors budget.
    fn verifie_forme(&self, e: Expr) -> Result<Expr, ErreurRequete> {
        self.reglages.verifie_puissances(&e)?;
        self.verifie(e)
    }

    fn equation(&self, gauche: &str, droite: &str) -> Result<Resultat, ErreurRequete> {
        let difference = self.verifie_forme(simplifie(sub(self.lit(gauche)?, self.lit(droite)?)))?;
        trace!(difference = %difference, "équation");

        if difference.variables_libres().is_empty() {
            return Ok(Resultat::Verdict(difference.is_zero()));
        }
        Ok(Resultat::Solutions(resout(&difference, &self.reglages)?))
    }

    fn derivee(&self, variable: char, expression: &str) -> Result<Resultat, ErreurRequete> {
        let e = self.lit(expression)?;
        let d = self.verifie(derive(&e, &variable.to_string()))?;
        Ok(Resultat::Expression(self.verifie_forme(forme_auto(d))?))
    }

    fn integrale(&self, expression: &str) -> Result<Resultat, ErreurRequete> {
        let e = self.lit(expression)?;
        Ok(Resultat::Expression(integre(&e, &self.reglages)?))
    }

    fn spectre(&self, sequence: &str) -> Result<Resultat, ErreurRequete> {
        let valeurs = self.sequences.lit(sequence, &self.reglages)?;
        Ok(Resultat::Spectre(fft(&valeurs)?))
    }

    fn generale(&self, expression: &str) -> Result<Resultat, ErreurRequete> {
        let e = self.lit(expression)?;
        Ok(Resultat::Expression(self.verifie_forme(simplifie(e))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moteur() -> Moteur {
        Moteur::new(Reglages::default()).unwrap()
    }

    fn texte(q: &str) -> String {
        moteur()
            .resoudre(q)
            .unwrap_or_else(|e| panic!("{q:?}: {e}"))
            .resultat
            .texte()
    }

    #[test]
    fn un_exemple_par_genre() {
        assert_eq!(texte("x^2-5x+6=0"), "[2, 3]");
        assert_eq!(texte("d/dx x^3"), "3*x^2");
        assert_eq!(texte("int x^2"), "x^3/3");
        assert_eq!(texte("fft [1, 2, 3, 4]"), "[10 + 0i, -2 + 2i, -2 + 0i, -2 - 2i]");
        assert_eq!(texte("sin 60"), "√3/2");
    }

    #[test]
    fn genre_rapporte() {
        let m = moteur();
        assert_eq!(m.repondre("2 = 2").genre, Some(Genre::Equation));
        assert_eq!(m.repondre("int x").genre, Some(Genre::Integrale));
        assert_eq!(m.repondre("a=b=c").genre, None);
    }

    #[test]
    fn verdicts() {
        assert_eq!(texte("2 = 2"), "TRUE");
        assert_eq!(texte("2 = 3"), "FALSE");
        assert_eq!(texte("sin(30) = 1/2"), "TRUE");
        assert_eq!(texte("x - x = 0"), "TRUE");
        assert_eq!(texte("1/0 = 1"), "FALSE");
    }

    #[test]
    fn frontiere_generique() {
        let m = moteur();
        for q in ["a=b=c", "d/d", "w + 1", "fft [1, x]", "int x*y", "x^(1/3)"] {
            let r = m.repondre(q);
            assert_eq!(
                r.resultat,
                Resultat::Erreur(MESSAGE_GENERIQUE.to_string()),
                "{q:?}"
            );
        }
    }

    #[test]
    fn erreurs_typees() {
        let m = moteur();
        assert!(matches!(m.resoudre("a=b=c"), Err(ErreurRequete::Classification(_))));
        assert!(matches!(m.resoudre("w + 1"), Err(ErreurRequete::Analyse(_))));
        assert!(matches!(m.resoudre("fft [1, x]"), Err(ErreurRequete::Calcul(_))));
        assert!(matches!(m.resoudre("x^200 = 1"), Err(ErreurRequete::Budget(_))));
        assert!(matches!(
            m.resoudre("fft [1e308, 1e308]"),
            Err(ErreurRequete::Calcul(_))
        ));
        assert!(matches!(
            m.resoudre("(((2^1024)^1024)^1024)^1024"),
            Err(ErreurRequete::Budget(_))
        ));
    }

    #[test]
    fn unite_imaginaire() {
        assert_eq!(texte("sqrt(-4)"), "2*i");
        assert_eq!(texte("sqrt(-1)^2 = -1"), "TRUE");
        assert_eq!(texte("x^2 + 4 = 0"), "[-2*i, 2*i]");
        // pas de lecture décimale pour un résultat non réel
        let m = moteur();
        let Resultat::Expression(e) = m.resoudre("sqrt(-4)").unwrap().resultat else {
            panic!("expression attendue");
        };
        assert_eq!(m.lecture(&e), None);
    }

    #[test]
    fn budget_longueur() {
        let m = Moteur::new(Reglages {
            longueur_max: 10,
            ..Reglages::default()
        })
        .unwrap();
        assert!(matches!(
            m.resoudre("1+1+1+1+1+1"),
            Err(ErreurRequete::Budget(_))
        ));
    }

    #[test]
    fn lecture_sigma_local() {
        let mut m = moteur();
        m.set_digits(5);
        let Resultat::Expression(e) = m.resoudre("sin 45").unwrap().resultat else {
            panic!("expression attendue");
        };
        assert_eq!(m.lecture(&e).as_deref(), Some("0.70710"));
    }
}
