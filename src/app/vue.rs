// src/app/vue.rs
//
// Vue (UI egui) : natif + web
// ---------------------------
// Objectifs :
// - Même AppCalc (etat.rs) pour natif + wasm
// - Clavier : Enter soumet (quand le champ est focus)
// - Tactile : gros boutons, focus redonné après clic (focus_entree)
// - Panneau d’exemples : un clic remplit l’entrée et soumet
//
// Note :
// - PAS de Key::NumEnter (n’existe pas dans egui 0.33.x)

use eframe::egui;

use super::etat::AppCalc;
use crate::noyau::DIGITS_MAX;

/// Une requête de démonstration par genre (et quelques angles spéciaux).
const EXEMPLES: [(&str, &str); 8] = [
    ("Équation", "x^2 - 5x + 6 = 0"),
    ("Vérification", "sin^2 30 + cos^2 30 = 1"),
    ("Dérivée", "d/dx x^2*sin(x)"),
    ("Intégrale", "int x*exp(x)"),
    ("Spectre", "fft [1, 2, 3, 4]"),
    ("Angle spécial", "sin 60"),
    ("Indéfini", "tan 90"),
    ("Racines", "x^3 - 6x^2 + 11x - 6 = 0"),
];

impl AppCalc {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("Solveur Q-pur");
                ui.add_space(6.0);

                self.ui_entree(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_resultats(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_exemples(ui);
            });
    }

    fn ui_entree(&mut self, ui: &mut egui::Ui) {
        ui.label("Requête :");

        // id stable + focus contrôlé
        let resp = ui.add(
            egui::TextEdit::singleline(&mut self.entree)
                .desired_width(ui.available_width())
                .hint_text("Ex: x^2-5x+6=0, d/dx x^3, int sin(x), fft [1,2,3,4], sin 60")
                .id_source("entree_edit")
                .code_editor(),
        );

        if self.focus_entree {
            resp.request_focus();
            self.focus_entree = false;
        }

        // lost_focus : egui retire le focus d’un singleline sur Enter
        let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
        if (resp.has_focus() || resp.lost_focus()) && enter {
            self.soumettre();
        }

        ui.add_space(6.0);

        ui.horizontal(|ui| {
            let go = ui
                .add_sized([96.0, 30.0], egui::Button::new("Résoudre"))
                .on_hover_text("Enter");
            if go.clicked() {
                self.soumettre();
            }

            // Contrat: C = entrée seulement ; AC = tout
            self.bouton_action(ui, "C", "Efface seulement l’entrée", Action::ClearEntree);
            self.bouton_action(ui, "AC", "Remise à zéro totale", Action::ResetTotal);

            ui.separator();

            ui.label("ΣLocal :");
            let mut d = self.digits();
            let resp = ui.add(
                egui::DragValue::new(&mut d)
                    .speed(1)
                    .range(0..=DIGITS_MAX)
                    .suffix(" chiffres"),
            );
            if resp.changed() {
                self.set_digits(d);
            }
        });

        ui.add_space(8.0);

        // Touches rapides : préfixes de genre + fonctions
        ui.horizontal_wrapped(|ui| {
            self.bouton_insert(ui, "d/dx", "d/dx ", InsertKind::Prefixe);
            self.bouton_insert(ui, "int", "int ", InsertKind::Prefixe);
            self.bouton_insert(ui, "fft", "fft [", InsertKind::Prefixe);

            ui.separator();

            self.bouton_insert(ui, "sin", "sin(", InsertKind::Func);
            self.bouton_insert(ui, "cos", "cos(", InsertKind::Func);
            self.bouton_insert(ui, "tan", "tan(", InsertKind::Func);
            self.bouton_insert(ui, "√", "sqrt(", InsertKind::Func);
            self.bouton_insert(ui, "log", "log(", InsertKind::Func);
            self.bouton_insert(ui, "exp", "exp(", InsertKind::Func);

            ui.separator();

            self.bouton_insert(ui, "π", "pi", InsertKind::Word);
            self.bouton_insert(ui, "x", "x", InsertKind::Word);
            self.bouton_insert(ui, "^", "^", InsertKind::Op);
            self.bouton_insert(ui, "=", "=", InsertKind::Op);
        });

        if !self.erreur.is_empty() {
            ui.add_space(6.0);
            ui.colored_label(ui.visuals().error_fg_color, &self.erreur);
        }
    }

    fn ui_resultats(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Genre :");
            if self.genre.is_empty() {
                ui.weak("-");
            } else {
                ui.strong(&self.genre);
            }
        });

        ui.add_space(4.0);

        ui.label("EXACT :");
        Self::champ_monospace(ui, "exact_out", &self.exact, 2);

        ui.add_space(6.0);

        ui.label("ΣLocal :");
        if self.lecture_dispo {
            Self::champ_monospace(ui, "sigma_out", &self.lecture, 2);
        } else {
            ui.monospace("indisponible");
        }
    }

    fn ui_exemples(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Exemples")
            .default_open(true)
            .show(ui, |ui| {
                egui::Grid::new("exemples_qpur")
                    .num_columns(2)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for (titre, requete) in EXEMPLES {
                            ui.label(titre);
                            if ui.link(requete).clicked() {
                                self.entree = requete.to_string();
                                self.soumettre();
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) {
        // Affichage lecture seule “stable”, sans TextEdit interactif.
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(
                        rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace),
                    );
                    ui.monospace(contenu);
                });
            });
    }

    fn bouton_action(&mut self, ui: &mut egui::Ui, label: &str, tip: &str, action: Action) {
        let resp = ui
            .add_sized([56.0, 30.0], egui::Button::new(label))
            .on_hover_text(tip);

        if resp.clicked() {
            match action {
                Action::ClearEntree => self.clear_entree(),
                Action::ResetTotal => self.reset_total(),
            }
            self.focus_entree = true;
        }
    }

    fn bouton_insert(&mut self, ui: &mut egui::Ui, label: &str, to_insert: &str, kind: InsertKind) {
        let resp = ui.add_sized([46.0, 28.0], egui::Button::new(label));
        if !resp.clicked() {
            return;
        }

        match kind {
            InsertKind::Prefixe => {
                // un seul préfixe de genre, en tête
                let reste = self.entree.trim_start().to_string();
                self.entree = format!("{to_insert}{reste}");
            }
            InsertKind::Func => {
                let last = self.entree.chars().rev().find(|c| !c.is_whitespace());
                if let Some(c) = last {
                    if c.is_ascii_digit() || c.is_ascii_alphabetic() || c == ')' {
                        self.entree.push(' ');
                    }
                }
                self.entree.push_str(to_insert);
            }
            InsertKind::Op => {
                while self.entree.ends_with(' ') {
                    self.entree.pop();
                }
                if !self.entree.is_empty() {
                    self.entree.push(' ');
                }
                self.entree.push_str(to_insert);
                self.entree.push(' ');
            }
            InsertKind::Word => {
                // mots: espace si juste avant c’est un chiffre ou ')'
                if let Some(c) = self.entree.chars().last() {
                    if c.is_ascii_digit() || c == ')' {
                        self.entree.push(' ');
                    }
                }
                self.entree.push_str(to_insert);
            }
        }

        self.focus_entree = true;
    }
}

#[derive(Clone, Copy, Debug)]
enum Action {
    ClearEntree,
    ResetTotal,
}

#[derive(Clone, Copy, Debug)]
enum InsertKind {
    Prefixe,
    Word,
    Func,
    Op,
}
