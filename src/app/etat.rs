//! src/app/etat.rs
//!
//! État UI (sans vue).
//!
//! Rôle : contenir l’état du solveur (entrée, genre détecté, résultat, ΣLocal, erreur)
//! et offrir des opérations simples (C/AC) sans logique d’affichage.
//!
//! Contrats (version UI) :
//! - Aucun calcul ici : une seule porte d’entrée, `Moteur::repondre`.
//! - Actions déterministes, sans effet de bord caché.
//! - Défense en profondeur : la précision ΣLocal est bornée par le Moteur.

use crate::noyau::{Genre, Moteur, Reglages, Resultat};

#[derive(Clone, Debug)]
pub struct AppCalc {
    // --- noyau (immuable entre deux requêtes, sauf la précision) ---
    moteur: Moteur,

    // --- entrée utilisateur ---
    pub entree: String,

    // --- sorties ---
    pub genre: String,       // genre détecté ("équation", "dérivée", ...)
    pub exact: String,       // rendu exact du résultat
    pub lecture: String,     // ΣLocal (décimal tronqué)
    pub erreur: String,      // message générique si la requête échoue
    pub lecture_dispo: bool, // false si indéfini / symbole libre / pas une expression

    // --- UX ---
    // Permet à vue.rs de redonner le focus à l’entrée après un clic sur un bouton.
    pub focus_entree: bool,
}

impl AppCalc {
    pub fn new(moteur: Moteur) -> Self {
        Self {
            moteur,
            entree: String::new(),
            genre: String::new(),
            exact: String::new(),
            lecture: String::new(),
            erreur: String::new(),
            lecture_dispo: false, // au démarrage : rien à lire
            focus_entree: true,   // au lancement, on veut pouvoir taper tout de suite
        }
    }

    pub fn digits(&self) -> usize {
        self.moteur.reglages().digits
    }

    /* ------------------------ Actions “boutons” (état seulement) ------------------------ */

    /// AC : remise à zéro totale (entrée + résultats + digits par défaut).
    pub fn reset_total(&mut self) {
        self.entree.clear();
        self.clear_resultats();
        self.moteur.set_digits(Reglages::default().digits);
        self.focus_entree = true;
    }

    /// C : effacer seulement l’entrée (sans toucher aux résultats).
    pub fn clear_entree(&mut self) {
        self.entree.clear();
        self.focus_entree = true;
    }

    fn clear_resultats(&mut self) {
        self.genre.clear();
        self.exact.clear();
        self.lecture.clear();
        self.erreur.clear();
        self.lecture_dispo = false;
    }

    /// Garde-fou : le Moteur borne digits (0..=DIGITS_MAX).
    pub fn set_digits(&mut self, digits: usize) {
        self.moteur.set_digits(digits);
        self.focus_entree = true;
    }

    /* ------------------------ Soumission ------------------------ */

    /// Soumet l’entrée au noyau puis dépose genre/EXACT/ΣLocal.
    ///
    /// Choix UX : sur une erreur on CONSERVE l’entrée pour pouvoir la corriger,
    /// mais on efface le résultat précédent (il ne correspond plus à l’entrée).
    pub fn soumettre(&mut self) {
        self.clear_resultats();
        self.focus_entree = true;

        let q = self.entree.trim();
        if q.is_empty() {
            return;
        }

        let reponse = self.moteur.repondre(q);
        match &reponse.resultat {
            Resultat::Erreur(msg) => self.erreur = msg.clone(),
            r => {
                self.genre = reponse.genre.map(Genre::nom).unwrap_or_default().to_string();
                self.exact = r.texte();
                if let Resultat::Expression(e) = r {
                    if let Some(v) = self.moteur.lecture(e) {
                        self.lecture = v;
                        self.lecture_dispo = true;
                    }
                }
            }
        }
    }
}
