//! Tests scientifiques (campagne) : propriétés de bout en bout + limites contrôlées.
//!
//! But : valider la chaîne complète (normalise -> classe -> traitement) sans faire
//! chauffer la machine.
//! - budget temps global sur les stress
//! - tailles bornées (profondeur, longueur)
//! - équivalence numérique des résultats symboliques : on substitue une valeur
//!   rationnelle et on compare les lectures décimales (ΣLocal)
//!
//! Convention : tout angle écrit par l’utilisateur est en DEGRÉS.

use std::time::{Duration, Instant};

use super::classe::{genre, Genre};
use super::erreur::{ErreurRequete, MESSAGE_GENERIQUE};
use super::eval::{analyse, forme_auto};
use super::expr::{rat_i, Expr};
use super::format::format_expr;
use super::lecture::lecture_decimale;
use super::reglages::{Reglages, DIGITS_MAX};
use super::traitements::{Moteur, Resultat};

fn moteur() -> Moteur {
    Moteur::new(Reglages::default()).unwrap_or_else(|e| panic!("motifs invalides: {e}"))
}

fn resultat(q: &str) -> Resultat {
    moteur()
        .resoudre(q)
        .unwrap_or_else(|e| panic!("q={q:?} err={e}"))
        .resultat
}

fn expression(q: &str) -> Expr {
    match resultat(q) {
        Resultat::Expression(e) => e,
        autre => panic!("q={q:?} : expression attendue, reçu {autre:?}"),
    }
}

fn assert_exact_eq(q: &str, attendu: &str) {
    assert_eq!(format_expr(&expression(q)), attendu, "q={q:?}");
}

fn assert_indefini(q: &str) {
    let m = moteur();
    let e = expression(q);
    assert_eq!(e, Expr::Indefini, "q={q:?}");
    assert!(m.lecture(&e).is_none(), "ΣLocal devrait être None pour q={q:?}");
}

/// Lecture décimale de `e` en x = val.
fn en(e: &Expr, val: i64) -> String {
    let x = forme_auto(e.substitue("x", &rat_i(val)));
    lecture_decimale(&x, 25).unwrap_or_else(|err| panic!("lecture({x}) : {err}"))
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Normalisation ------------------------ */

#[test]
fn sci_normalisation() {
    let m = moteur();

    let n = m.normalise("x^2");
    assert!(n.contains("**") && !n.contains('^'), "{n:?}");

    assert_eq!(m.normalise("sin 60"), "sin(60)");
    assert_eq!(m.normalise("sin(60)"), "sin(60)");

    for s in ["SIN 60", "x^2-5x+6=0", "d/dx x^2*sin(x)", "sin^2 30", "fft [1,2]"] {
        let une = m.normalise(s);
        assert_eq!(m.normalise(&une), une, "s={s:?}");
    }
}

/* ------------------------ Classification ------------------------ */

#[test]
fn sci_classification_priorite() {
    let m = moteur();
    assert_eq!(genre(&m.normalise("int=5")), Genre::Equation);
    assert_eq!(genre(&m.normalise("INT x")), Genre::Integrale);
    assert_eq!(genre(&m.normalise("FFT [1]")), Genre::Spectre);
    assert_eq!(genre(&m.normalise("D/DX x")), Genre::Derivee);
}

#[test]
fn sci_classification_erreurs() {
    let m = moteur();
    assert!(matches!(
        m.resoudre("a=b=c"),
        Err(ErreurRequete::Classification(_))
    ));
    assert!(matches!(m.resoudre("d/d"), Err(ErreurRequete::Classification(_))));

    for q in ["a=b=c", "d/d"] {
        assert_eq!(
            m.repondre(q).resultat,
            Resultat::Erreur(MESSAGE_GENERIQUE.to_string())
        );
    }
}

/* ------------------------ Équations ------------------------ */

#[test]
fn sci_equation_solutions() {
    let Resultat::Solutions(s) = resultat("x^2 - 5*x + 6 = 0") else {
        panic!("solutions attendues");
    };
    let mut textes: Vec<String> = s.iter().map(format_expr).collect();
    textes.sort();
    assert_eq!(textes, ["2", "3"]);

    assert_eq!(resultat("x^2 = 2").texte(), "[-√2, √2]");
    assert_eq!(resultat("x^2 + 1 = 0").texte(), "[-i, i]");
    assert_eq!(resultat("x^2 + y = 0").texte(), "[-√(-y), √(-y)]");
    assert_eq!(resultat("2x + 3 = x - 1").texte(), "[-4]");
    assert_eq!(resultat("t^3 = t").texte(), "[-1, 0, 1]");
}

#[test]
fn sci_equation_verdicts() {
    assert_eq!(resultat("2 = 2"), Resultat::Verdict(true));
    assert_eq!(resultat("2 = 3"), Resultat::Verdict(false));
    assert_eq!(resultat("sin 30 = cos 60").texte(), "TRUE");
    assert_eq!(resultat("sin^2 30 + cos^2 30 = 1").texte(), "TRUE");
    assert_eq!(resultat("sqrt(2)*sqrt(2) = 3").texte(), "FALSE");
    assert_eq!(resultat("sqrt(-1)^2 = -1").texte(), "TRUE");
    assert_eq!(resultat("sqrt(-9) = 3*sqrt(-1)").texte(), "TRUE");
}

/* ------------------------ Dérivée / intégrale ------------------------ */

#[test]
fn sci_derivee_regle_chaine_degres() {
    let d = expression("d/dx x^2*sin(x)");
    let attendu = analyse("2*x*sin(x) + x**2*(pi/180)*cos(x)", moteur().table())
        .unwrap_or_else(|e| panic!("{e}"));
    for val in [1, 10, 45, 100] {
        assert_eq!(en(&d, val), en(&attendu, val), "x={val}");
    }
}

#[test]
fn sci_integrale() {
    assert_exact_eq("int x^2", "x^3/3");
    assert_exact_eq("int sin(x)", "-180*cos(π*x/180)/π");
    assert!(matches!(
        moteur().resoudre("int 5"),
        Err(ErreurRequete::Calcul(_))
    ));
}

/* ------------------------ Spectre ------------------------ */

#[test]
fn sci_spectre() {
    assert_eq!(
        resultat("fft [1, 0, 0, 0]").texte(),
        "[1 + 0i, 1 + 0i, 1 + 0i, 1 + 0i]"
    );
    let Resultat::Spectre(z) = resultat("fft (1, 2, 3, 4, 5)") else {
        panic!("spectre attendu");
    };
    assert_eq!(z.len(), 5);
    assert!((z[0].re - 15.0).abs() < 1e-9);

    // aucune évaluation de code
    assert!(matches!(
        moteur().resoudre("fft [__import__('os').system('ls')]"),
        Err(ErreurRequete::Calcul(_))
    ));

    // entrées finies, somme hors f64
    assert!(matches!(
        moteur().resoudre("fft [1e308, 1e308]"),
        Err(ErreurRequete::Calcul(_))
    ));
}

/* ------------------------ Trig en degrés (angles spéciaux) ------------------------ */

#[test]
fn sci_convention_degres() {
    assert_exact_eq("sin 60", "√3/2");
    assert_exact_eq("cos 60", "1/2");
    assert_exact_eq("tan 45", "1");
}

#[test]
fn sci_indefinis_tan() {
    assert_indefini("tan(90)");
    assert_indefini("tan(270)");
    assert_indefini("tan(-90)");
}

#[test]
fn sci_identites_symetrie() {
    assert_exact_eq("sin(-45)", "-√2/2");
    assert_exact_eq("cos(-60)", "1/2");
    assert_exact_eq("tan(-30)", "-√3/3");
}

#[test]
fn sci_periodicite_angles() {
    assert_exact_eq("sin(405)", "√2/2");
    assert_exact_eq("cos(420)", "1/2");
    assert_exact_eq("tan(210)", "√3/3");
    assert_exact_eq("sin(45 + 360)", "√2/2");
}

#[test]
fn sci_propagation_indefini() {
    assert_indefini("1 + tan(90)");
    assert_indefini("2 * tan(90)");
    assert_indefini("tan(90) / 3");
}

/* ------------------------ Cohérence algébrique (zéro) ------------------------ */

#[test]
fn sci_zero_algebrique() {
    assert_exact_eq("(1/2 + 1/3) - 5/6", "0");
    assert_exact_eq("sqrt(2)*sqrt(2) - 2", "0");
    assert_exact_eq("1/sqrt(3) - sqrt(3)/3", "0");
    assert_exact_eq("(x + 1) - (1 + x)", "0");
    assert_exact_eq("sin(x)^2 + cos(x)^2", "1");
}

/* ------------------------ Budgets ------------------------ */

#[test]
fn sci_budgets() {
    let m = Moteur::new(Reglages {
        noeuds_max: 20,
        ..Reglages::default()
    })
    .unwrap_or_else(|e| panic!("{e}"));
    let long = vec!["x"; 30].join(" + ");
    assert!(matches!(m.resoudre(&long), Err(ErreurRequete::Budget(_))));

    assert!(matches!(
        moteur().resoudre("x^5000"),
        Err(ErreurRequete::Budget(_))
    ));

    // exposants admis un par un, mais résultat exact démesuré
    let t0 = Instant::now();
    for q in [
        "(((2^1024)^1024)^1024)^1024",
        "((3/7)^1024)^1024 = 1",
        "d/dx x*(10^1024)^1024",
    ] {
        assert!(
            matches!(moteur().resoudre(q), Err(ErreurRequete::Budget(_))),
            "{q:?}"
        );
    }
    assert!(t0.elapsed() < Duration::from_secs(2));
    assert_eq!(resultat("(2^32)^1024 = (2^1024)^32").texte(), "TRUE");

    let mut m = moteur();
    m.set_digits(10_000);
    assert_eq!(m.reglages().digits, DIGITS_MAX);
}

/* ------------------------ Stress contrôlé (sans brûler) ------------------------ */

#[test]
fn sci_stress_profondeur_sqrt_safe() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    // sqrt puis carré, en alternance : la valeur reste 4
    let mut expr = "4".to_string();
    for k in 0..40 {
        expr = if k % 2 == 0 {
            format!("sqrt({expr})")
        } else {
            format!("({expr})^2")
        };
    }
    let e = expression(&expr);
    budget(t0, max);
    assert_eq!(format_expr(&e), "4");
}

#[test]
fn sci_stress_taille_somme_safe() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let expr = vec!["1/2"; 80].join(" + ");
    assert_exact_eq(&expr, "40");
    budget(t0, max);
}

#[test]
fn sci_stress_bigint_safe() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    // gros numérateur contrôlé (100 chiffres)
    let big = "9".repeat(100);
    let q = format!("{big}/7 + 1/7");
    let e = expression(&q);
    budget(t0, max);
    assert!(matches!(e, Expr::Rat(_)));
}

/* ------------------------ ΣLocal : cohérence minimale ------------------------ */

#[test]
fn sci_sigma_local_coherence() {
    let m = moteur();
    let e = expression("sin(45)");
    assert!(m.lecture(&e).is_some());

    let e = expression("x + 1");
    assert!(m.lecture(&e).is_none());
}
