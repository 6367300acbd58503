// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> AST
// Objectif:
// - Insérer les produits implicites (5x, 2(x+1), (x+1)(x-1))
// - Convertir une suite de Tok en RPN (postfix), identifiants résolus par la table
// - Puis reconstruire Expr
//
// Règles:
// - Ident(name):
//    - fonction de la table (sin, cos, tan, sqrt, √, log, exp) => fonction unaire,
//      obligatoirement suivie d’une parenthèse
//    - symbole ou constante de la table => atome
//    - sinon => erreur d’analyse (aucun symbole n’est créé à la volée)
// - Moins unaire : opérateur préfixe Neg, plus fort que * et / mais plus faible que **
//   ("-x**2" => -(x**2), "2*-3" => 2*(-3), "2**-1" => 2**(-1))
// - Exposant : constante rationnelle de dénominateur 1 ou 2 (x**(1/2) => √x)

use num_traits::ToPrimitive;

use super::erreur::ErreurRequete;
use super::expr::{neg, Expr};
use super::jetons::Tok;
use super::reglages::EXPOSANT_MAX;
use super::symboles::{Fonction, Liaison, TableSymboles};

/// Élément de sortie RPN.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rpn {
    Atome(Expr),
    Binaire(Tok),
    Neg,
    Fonction(Fonction),
}

/// Pile d’opérateurs (interne au shunting-yard).
#[derive(Clone, Debug)]
enum Op {
    Binaire(Tok),
    Neg,
    Fonction(Fonction),
    LPar,
}

fn precedence(op: &Op) -> i32 {
    match op {
        Op::Binaire(Tok::Plus | Tok::Minus) => 1,
        Op::Binaire(Tok::Star | Tok::Slash) => 2,
        Op::Neg => 3,
        Op::Binaire(Tok::Caret) => 4,
        _ => 0,
    }
}

fn is_right_associative(op: &Op) -> bool {
    matches!(op, Op::Binaire(Tok::Caret))
}

/// Un jeton qui termine une valeur (nombre, atome, parenthèse fermante).
fn termine_valeur(t: &Tok, table: &TableSymboles) -> bool {
    match t {
        Tok::Num(_) | Tok::RPar => true,
        Tok::Ident(name) => !table.est_fonction(name),
        _ => false,
    }
}

/// Un jeton qui commence une valeur (nombre, identifiant, parenthèse ouvrante).
fn commence_valeur(t: &Tok) -> bool {
    matches!(t, Tok::Num(_) | Tok::Ident(_) | Tok::LPar)
}

/// Insère les '*' implicites. Deux nombres juxtaposés restent une erreur.
pub fn produits_implicites(tokens: Vec<Tok>, table: &TableSymboles) -> Vec<Tok> {
    let mut out: Vec<Tok> = Vec::with_capacity(tokens.len() * 2);
    for tok in tokens {
        if let Some(prev) = out.last() {
            let nombres = matches!((prev, &tok), (Tok::Num(_), Tok::Num(_)));
            if !nombres && termine_valeur(prev, table) && commence_valeur(&tok) {
                out.push(Tok::Star);
            }
        }
        out.push(tok);
    }
    out
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [Ident("sin"), LPar, Num(30), RPar]
///   rpn:    [Atome(30), Fonction(TrigDegres(Sin))]
pub fn to_rpn(tokens: &[Tok], table: &TableSymboles) -> Result<Vec<Rpn>, ErreurRequete> {
    let mut out: Vec<Rpn> = Vec::new();
    let mut ops: Vec<Op> = Vec::new();

    // “valeur” = un atome ou une expression fermée.
    // Sert à détecter le moins unaire.
    let mut prev_was_value = false;

    for (i, tok) in tokens.iter().enumerate() {
        match tok {
            Tok::Num(r) => {
                out.push(Rpn::Atome(Expr::Rat(r.clone())));
                prev_was_value = true;
            }

            Tok::Ident(name) => match table.resout(name) {
                None => {
                    return Err(ErreurRequete::analyse(format!("symbole inconnu: {name}")));
                }
                Some(Liaison::Fonction(f)) => {
                    if tokens.get(i + 1) != Some(&Tok::LPar) {
                        return Err(ErreurRequete::analyse(format!(
                            "fonction sans parenthèses: {name}"
                        )));
                    }
                    // fonction : on la garde sur la pile (elle sortira après son argument)
                    ops.push(Op::Fonction(*f));
                    prev_was_value = false;
                }
                Some(liaison) => {
                    let atome = liaison
                        .atome()
                        .ok_or_else(|| ErreurRequete::analyse(format!("atome invalide: {name}")))?;
                    out.push(Rpn::Atome(atome));
                    prev_was_value = true;
                }
            },

            Tok::LPar => {
                ops.push(Op::LPar);
                prev_was_value = false;
            }

            Tok::RPar => {
                // dépile jusqu’à '('
                let mut ouverte = false;
                while let Some(top) = ops.pop() {
                    match top {
                        Op::LPar => {
                            ouverte = true;
                            break;
                        }
                        autre => out.push(sortie(autre)),
                    }
                }
                if !ouverte {
                    return Err(ErreurRequete::analyse("parenthèse fermante sans ouvrante"));
                }

                // si une fonction est au sommet, on la sort aussi
                if let Some(Op::Fonction(f)) = ops.last() {
                    out.push(Rpn::Fonction(*f));
                    ops.pop();
                }

                prev_was_value = true;
            }

            // plus unaire : neutre
            Tok::Plus if !prev_was_value => {}

            // moins unaire : opérateur préfixe, rien à dépiler
            Tok::Minus if !prev_was_value => {
                ops.push(Op::Neg);
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Caret => {
                if !prev_was_value {
                    return Err(ErreurRequete::analyse("opérateur sans opérande gauche"));
                }

                let op = Op::Binaire(tok.clone());

                // dépile tant que:
                // - on n'est pas bloqué par '(' ou par une fonction (collée à son argument)
                // - et la précédence/associativité exige de sortir l'opérateur du haut
                while let Some(top) = ops.last() {
                    if matches!(top, Op::LPar | Op::Fonction(_)) {
                        break;
                    }

                    let p_top = precedence(top);
                    let p_tok = precedence(&op);

                    let doit_pop = if is_right_associative(&op) {
                        p_top > p_tok
                    } else {
                        p_top >= p_tok
                    };

                    if !doit_pop {
                        break;
                    }
                    if let Some(top) = ops.pop() {
                        out.push(sortie(top));
                    }
                }

                ops.push(op);
                prev_was_value = false;
            }
        }
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        if matches!(op, Op::LPar) {
            return Err(ErreurRequete::analyse("parenthèses non fermées"));
        }
        out.push(sortie(op));
    }

    Ok(out)
}

fn sortie(op: Op) -> Rpn {
    match op {
        Op::Binaire(t) => Rpn::Binaire(t),
        Op::Neg => Rpn::Neg,
        Op::Fonction(f) => Rpn::Fonction(f),
        // filtré par les appelants
        Op::LPar => Rpn::Binaire(Tok::LPar),
    }
}

/// Construit une Expr à partir d’une RPN.
pub fn from_rpn(rpn: Vec<Rpn>) -> Result<Expr, ErreurRequete> {
    let invalide = || ErreurRequete::analyse("expression invalide");
    let mut st: Vec<Expr> = Vec::new();

    for item in rpn {
        match item {
            Rpn::Atome(e) => st.push(e),

            Rpn::Neg => {
                let a = st.pop().ok_or_else(invalide)?;
                st.push(neg(a));
            }

            Rpn::Fonction(f) => {
                let x = st.pop().ok_or_else(|| ErreurRequete::analyse("fonction sans argument"))?;
                st.push(f.applique(x));
            }

            Rpn::Binaire(tok) => {
                let b = st.pop().ok_or_else(invalide)?;
                let a = st.pop().ok_or_else(invalide)?;

                let e = match tok {
                    Tok::Plus => Expr::Add(Box::new(a), Box::new(b)),
                    Tok::Minus => Expr::Sub(Box::new(a), Box::new(b)),
                    Tok::Star => Expr::Mul(Box::new(a), Box::new(b)),
                    Tok::Slash => Expr::Div(Box::new(a), Box::new(b)),
                    Tok::Caret => puissance(a, b)?,
                    _ => return Err(ErreurRequete::analyse("parenthèse inattendue en RPN")),
                };

                st.push(e);
            }
        }
    }

    if st.len() != 1 {
        return Err(invalide());
    }
    st.pop().ok_or_else(invalide)
}

/// a ** b, b constante rationnelle de dénominateur 1 ou 2.
fn puissance(a: Expr, b: Expr) -> Result<Expr, ErreurRequete> {
    let r = match b.simplify() {
        Expr::Rat(r) => r,
        _ => return Err(ErreurRequete::analyse("exposant non constant")),
    };

    let n = r
        .numer()
        .to_i64()
        .filter(|n| n.abs() <= EXPOSANT_MAX)
        .ok_or_else(|| ErreurRequete::budget(format!("exposant {r} hors bornes")))?;

    match r.denom().to_i64() {
        Some(1) => Ok(Expr::PowInt(Box::new(a), n)),
        Some(2) if n == 1 => Ok(Expr::Sqrt(Box::new(a))),
        Some(2) => Ok(Expr::PowInt(Box::new(Expr::Sqrt(Box::new(a))), n)),
        _ => Err(ErreurRequete::analyse(format!(
            "exposant fractionnaire non supporté: {r}"
        ))),
    }
}
