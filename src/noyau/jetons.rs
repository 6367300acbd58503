// src/noyau/jetons.rs

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;

use super::erreur::ErreurRequete;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tok {
    Num(BigRational),

    // Fonctions + symboles + constantes (tout ce qui n’est pas opérateur / nombre)
    // NOTE: c’est la table des symboles qui décide (rpn.rs).
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Caret, // ** ou ^

    LPar,
    RPar,
}

/// Tokenize une chaîne en jetons.
/// Supporte:
/// - entiers (ex: 12) et décimaux exacts (ex: 0.25 -> Num(1/4))
/// - opérateurs + - * / et la puissance ** (ou ^)
/// - parenthèses ( )
/// - identifiants : lettres (y compris π, θ), chiffres, '_' (normalisés en minuscules)
/// - √ (un identifiant d’un seul caractère) ; √2 se lit √(2)
pub fn tokenize(s: &str) -> Result<Vec<Tok>, ErreurRequete> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        match c {
            '(' => {
                out.push(Tok::LPar);
                i += 1;
                continue;
            }
            ')' => {
                out.push(Tok::RPar);
                i += 1;
                continue;
            }
            '+' => {
                out.push(Tok::Plus);
                i += 1;
                continue;
            }
            '-' => {
                out.push(Tok::Minus);
                i += 1;
                continue;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    out.push(Tok::Caret);
                    i += 2;
                } else {
                    out.push(Tok::Star);
                    i += 1;
                }
                continue;
            }
            '/' => {
                out.push(Tok::Slash);
                i += 1;
                continue;
            }
            '^' => {
                out.push(Tok::Caret);
                i += 1;
                continue;
            }
            _ => {}
        }

        // Racine carrée unicode : √x => ident("√") ; √2 => √(2)
        if c == '√' {
            out.push(Tok::Ident("√".to_string()));
            i += 1;
            if i < chars.len() && chars[i].is_ascii_digit() {
                let (r, suite) = lit_nombre(&chars, i)?;
                out.push(Tok::LPar);
                out.push(Tok::Num(r));
                out.push(Tok::RPar);
                i = suite;
            }
            continue;
        }

        // π est toujours un jeton à lui seul (2π, πx)
        if c == 'π' {
            out.push(Tok::Ident("π".to_string()));
            i += 1;
            continue;
        }

        // Identifiants : [lettre_][lettre chiffre _]*
        if c.is_alphabetic() || c == '_' {
            let start = i;
            i += 1;
            while i < chars.len()
                && chars[i] != 'π'
                && (chars[i].is_alphanumeric() || chars[i] == '_')
            {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            out.push(Tok::Ident(word.to_lowercase()));
            continue;
        }

        if c.is_ascii_digit() {
            let (r, suite) = lit_nombre(&chars, i)?;
            out.push(Tok::Num(r));
            i = suite;
            continue;
        }

        return Err(ErreurRequete::analyse(format!("caractère inattendu: '{c}'")));
    }

    Ok(out)
}

/// Lit un entier ou un décimal exact à partir de `debut`.
/// Retourne (valeur, indice suivant).
fn lit_nombre(chars: &[char], debut: usize) -> Result<(BigRational, usize), ErreurRequete> {
    let mut i = debut;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    let entier: String = chars[debut..i].iter().collect();

    // partie décimale : "2.5" ; "2." seul est refusé
    let mut decimales = String::new();
    if i < chars.len() && chars[i] == '.' {
        let start_d = i + 1;
        let mut j = start_d;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
        if j == start_d {
            return Err(ErreurRequete::analyse("nombre décimal incomplet"));
        }
        decimales = chars[start_d..j].iter().collect();
        i = j;
    }

    let chiffres = format!("{entier}{decimales}");
    let n = BigInt::parse_bytes(chiffres.as_bytes(), 10)
        .ok_or_else(|| ErreurRequete::analyse("nombre invalide"))?;

    let mut d = BigInt::one();
    for _ in 0..decimales.len() {
        d *= 10;
    }

    Ok((BigRational::new(n, d), i))
}
