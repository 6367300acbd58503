//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler la frontière `repondre` sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - invariants clés :
//!   * normalise(normalise(s)) == normalise(s)
//!   * repondre ne panique jamais ; une erreur est toujours MESSAGE_GENERIQUE
//!   * si EXACT == indéfini alors ΣLocal == None

use std::time::{Duration, Instant};

use super::erreur::MESSAGE_GENERIQUE;
use super::expr::Expr;
use super::reglages::Reglages;
use super::traitements::{Moteur, Reponse, Resultat};

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
    fn choix<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.pick(items.len() as u32) as usize]
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

fn moteur() -> Moteur {
    Moteur::new(Reglages::default()).unwrap_or_else(|e| panic!("motifs invalides: {e}"))
}

/* ------------------------ Invariants ------------------------ */

fn check_reponse(m: &Moteur, q: &str, r: &Reponse) {
    match &r.resultat {
        Resultat::Erreur(msg) => {
            assert_eq!(msg, MESSAGE_GENERIQUE, "q={q:?}");
            assert_eq!(r.genre, None, "q={q:?}");
        }
        Resultat::Expression(e) => {
            assert!(r.genre.is_some(), "q={q:?}");
            if matches!(e, Expr::Indefini) {
                assert!(m.lecture(e).is_none(), "indéfini => ΣLocal None, q={q:?}");
            }
        }
        Resultat::Spectre(z) => assert!(z.iter().all(|c| c.re.is_finite() && c.im.is_finite())),
        Resultat::Solutions(_) | Resultat::Verdict(_) => assert!(r.genre.is_some()),
    }
}

/* ------------------------ Génération (bornée) ------------------------ */

/// Texte “presque” mathématique : bouts de syntaxe mélangés au hasard.
fn gen_bruit(rng: &mut Rng) -> String {
    const BOUTS: [&str; 24] = [
        "sin", "COS", "tan", " ", "  ", "^", "**", "2", "60", "x", "Y", "(", ")", "=", "d/d",
        "int", "fft", "[", "]", ",", "-", "+", "/", "√",
    ];
    let n = 1 + rng.pick(12);
    (0..n).map(|_| rng.choix(&BOUTS)).collect()
}

fn gen_angle(rng: &mut Rng) -> String {
    // multiples de 15° (beaucoup d’angles spéciaux), parfois négatifs
    let k = rng.pick(49) as i64 - 24;
    format!("{}", k * 15)
}

fn gen_atom(rng: &mut Rng) -> String {
    match rng.pick(6) {
        0 => format!("{}", rng.pick(9)),
        1 => format!("{}/{}", rng.pick(9), 1 + rng.pick(8)),
        2 => "pi".to_string(),
        3 => "x".to_string(),
        4 => format!("sqrt({})", rng.pick(13)),
        _ => "0.5".to_string(),
    }
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atom(rng);
    }
    let op = |rng: &mut Rng, s: &str| {
        format!("({}{s}{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1))
    };
    match rng.pick(9) {
        0 => gen_atom(rng),
        1 => op(rng, "+"),
        2 => op(rng, "-"),
        3 => op(rng, "*"),
        4 => op(rng, "/"),
        5 => format!("sin {}", gen_angle(rng)),
        6 => format!("cos({})", gen_angle(rng)),
        7 => format!("tan({})", gen_angle(rng)),
        _ => format!("({})^{}", gen_expr(rng, depth - 1), rng.pick(4)),
    }
}

fn gen_requete(rng: &mut Rng) -> String {
    let e = gen_expr(rng, 3);
    match rng.pick(6) {
        0 => format!("{e} = {}", gen_expr(rng, 2)),
        1 => format!("d/dx {e}"),
        2 => format!("int {e}"),
        3 => {
            let n = 1 + rng.pick(8);
            let vals: Vec<String> = (0..n).map(|_| format!("{}", rng.pick(20) as i64 - 10)).collect();
            if rng.coin() {
                format!("fft [{}]", vals.join(", "))
            } else {
                format!("fft {}", vals.join(","))
            }
        }
        4 => gen_bruit(rng),
        _ => e,
    }
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_normalisation_idempotente() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);
    let m = moteur();
    let mut rng = Rng::new(0x5EED_u64);

    for _ in 0..500 {
        budget(t0, max);
        let s = gen_bruit(&mut rng);
        let une = m.normalise(&s);
        assert_eq!(m.normalise(&une), une, "s={s:?}");
        assert!(!une.contains('^'), "s={s:?}");
    }
}

#[test]
fn fuzz_safe_frontiere_et_determinisme() {
    let t0 = Instant::now();
    let max = Duration::from_secs(20);
    let m = moteur();

    // Même seed => mêmes requêtes => mêmes réponses
    let mut rng_a = Rng::new(0xC0FFEE_u64);
    let mut rng_b = Rng::new(0xC0FFEE_u64);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..150 {
        budget(t0, max);

        let q = gen_requete(&mut rng_a);
        assert_eq!(q, gen_requete(&mut rng_b));

        let r = m.repondre(&q);
        check_reponse(&m, &q, &r);
        assert_eq!(r, m.repondre(&q), "réponse non déterministe: q={q:?}");

        if matches!(r.resultat, Resultat::Erreur(_)) {
            seen_err += 1;
        } else {
            seen_ok += 1;
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 10, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_angles_trig_dans_domaine() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);
    let m = moteur();
    let mut rng = Rng::new(0xBADC0DE_u64);

    for _ in 0..80 {
        budget(t0, max);

        let q = format!("{}({})", rng.choix(&["sin", "cos", "tan"]), gen_angle(&mut rng));
        let r = m.repondre(&q);
        check_reponse(&m, &q, &r);
        // multiple de 15° : toujours une valeur exacte ou indéfini
        let Resultat::Expression(e) = &r.resultat else {
            panic!("q={q:?} : {r:?}");
        };
        assert!(e.variables_libres().is_empty(), "q={q:?}");
        assert!(
            !matches!(e, Expr::Sin(_) | Expr::Cos(_) | Expr::Tan(_)),
            "angle non réduit: q={q:?}"
        );
    }
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    let q = somme_balancee("1/2", 800);
    let r = moteur().repondre(&q);
    budget(t0, max);

    // 800*(1/2) = 400
    assert_eq!(r.resultat.texte(), "400");
}
