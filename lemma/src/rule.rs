//! Suffix rewrite rules.
//!
//! A rule line is `[<N | >N | +] source [replacement]`. The source is a
//! regular expression anchored at the end of the word, with shorthand for
//! phonological classes:
//!
//! | token | expands to      |
//! |-------|-----------------|
//! | `V`   | `[aeiouy]`      |
//! | `C`   | `[^aeiouy]`     |
//! | `R`   | `r`             |
//! | `A`   | `.*`            |
//! | `CC`  | a doubled consonant |
//!
//! The first run of class tokens is captured and the same run in the
//! replacement is substituted with what it matched, so `Cies Cy` rewrites
//! `flies` to `fly`. `>N` requires at least two characters before the
//! match, `<N` requires the match to start within the first `N - 1`
//! characters, and `+` accepts the result only if it is in the dictionary.

use std::fmt;

use fancy_regex::Regex;
use libadorn_core::{Error, Result};

use crate::dictionary::Dictionary;

const VOWEL_CLASS: &str = "[aeiouy]";
const CONSONANT_CLASS: &str = "[^aeiouy]";
const CLASS_TOKENS: &[char] = &['V', 'C', 'R', 'A'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Group(usize),
}

/// Replacement text with capture group references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Template(Vec<Piece>);

impl Template {
    fn literal(s: &str) -> Self {
        if s.is_empty() {
            Self(Vec::new())
        } else {
            Self(vec![Piece::Literal(s.to_string())])
        }
    }

    fn prepend_group(&mut self, group: usize) {
        self.0.insert(0, Piece::Group(group));
    }

    /// Replace the first literal occurrence of `needle` with a group reference.
    fn substitute_first(&mut self, needle: &str, group: usize) {
        if needle.is_empty() {
            return;
        }
        for i in 0..self.0.len() {
            let Piece::Literal(text) = &self.0[i] else {
                continue;
            };
            let Some(at) = text.find(needle) else {
                continue;
            };
            let before = text[..at].to_string();
            let after = text[at + needle.len()..].to_string();
            let mut pieces = Vec::with_capacity(3);
            if !before.is_empty() {
                pieces.push(Piece::Literal(before));
            }
            pieces.push(Piece::Group(group));
            if !after.is_empty() {
                pieces.push(Piece::Literal(after));
            }
            self.0.splice(i..=i, pieces);
            return;
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in &self.0 {
            match p {
                Piece::Literal(s) => f.write_str(s)?,
                Piece::Group(n) => write!(f, "${n}")?,
            }
        }
        Ok(())
    }
}

/// Byte range of the first run of class tokens in `s`.
fn first_class_run(s: &str) -> Option<(usize, usize)> {
    let start = s.find(CLASS_TOKENS)?;
    let len = s[start..]
        .find(|c: char| !CLASS_TOKENS.contains(&c))
        .unwrap_or(s.len() - start);
    Some((start, start + len))
}

#[derive(Debug, Clone)]
pub struct LemmatizerRule {
    text: String,
    source: String,
    pattern: Regex,
    replacement: Template,
    direction: Direction,
    match_length: usize,
    must_match_dictionary: bool,
}

impl LemmatizerRule {
    pub fn parse(text: &str) -> Result<Self> {
        let tokens: Vec<&str> = text
            .split([' ', '\t'])
            .filter(|t| !t.is_empty())
            .collect();

        let mut direction = Direction::Right;
        let mut match_length = 0usize;
        let mut must_match_dictionary = false;
        let mut i = 0;

        match tokens.first().and_then(|t| t.chars().next()) {
            None => return Err(Error::invalid_rule(text, "empty rule")),
            Some(c @ ('<' | '>')) => {
                direction = if c == '<' { Direction::Left } else { Direction::Right };
                match_length = tokens[0][1..].parse().unwrap_or(0);
                i += 1;
            }
            Some('+') => {
                must_match_dictionary = true;
                i += 1;
            }
            Some(_) => {}
        }

        let mut source = tokens
            .get(i)
            .ok_or_else(|| Error::invalid_rule(text, "missing source pattern"))?
            .to_string();
        let mut replacement = Template::literal(tokens.get(i + 1).copied().unwrap_or(""));
        let mut group = 1;

        if match_length > 0 {
            match direction {
                Direction::Right => source.insert_str(0, "(..)"),
                Direction::Left => {
                    match_length -= 1;
                    source.insert_str(0, &format!("^(.{{1,{match_length}}})"));
                }
            }
            replacement.prepend_group(group);
            group += 1;
        }

        if source.contains("CC") {
            source = source.replace("CC", &format!("({CONSONANT_CLASS})\\{group}"));
            replacement.substitute_first("C", group);
        } else if let Some((start, end)) = first_class_run(&source) {
            let run = source[start..end].to_string();
            source = format!("{}({}){}", &source[..start], run, &source[end..]);
            source = source
                .replace('V', VOWEL_CLASS)
                .replace('C', CONSONANT_CLASS)
                .replace('R', "r")
                .replace('A', ".*");
            replacement.substitute_first(&run, group);
        }
        source.push('$');

        let pattern = Regex::new(&source)
            .map_err(|e| Error::invalid_rule(text, format!("bad pattern `{source}`: {e}")))?;

        Ok(Self {
            text: text.to_string(),
            source,
            pattern,
            replacement,
            direction,
            match_length,
            must_match_dictionary,
        })
    }

    /// Rewrite `s`, or return it unchanged if the rule does not match or a
    /// dictionary-gated result is not a known word.
    pub fn apply(&self, s: &str, dictionary: Option<&Dictionary>) -> String {
        let caps = match self.pattern.captures(s) {
            Ok(Some(caps)) => caps,
            _ => return s.to_string(),
        };
        let Some(m) = caps.get(0) else {
            return s.to_string();
        };

        let mut out = String::with_capacity(s.len() + 4);
        out.push_str(&s[..m.start()]);
        for piece in &self.replacement.0 {
            match piece {
                Piece::Literal(t) => out.push_str(t),
                Piece::Group(n) => {
                    if let Some(g) = caps.get(*n) {
                        out.push_str(g.as_str());
                    }
                }
            }
        }
        out.push_str(&s[m.end()..]);

        if self.must_match_dictionary && !dictionary.is_some_and(|d| d.contains(&out)) {
            return s.to_string();
        }
        out
    }

    /// The rule line as written.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The expanded regular expression.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn match_length(&self) -> usize {
        self.match_length
    }

    pub fn must_match_dictionary(&self) -> bool {
        self.must_match_dictionary
    }
}

impl fmt::Display for LemmatizerRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s/{}/{}/", self.source, self.replacement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(rule: &str, word: &str) -> String {
        LemmatizerRule::parse(rule).unwrap().apply(word, None)
    }

    #[test]
    fn plain_suffix() {
        assert_eq!(apply("sses ss", "glasses"), "glass");
        assert_eq!(apply("sses ss", "glass"), "glass");
        assert_eq!(apply("s", "cats"), "cat");
        assert_eq!(LemmatizerRule::parse("sses ss").unwrap().to_string(), "s/sses$/ss/");
    }

    #[test]
    fn consonant_class_is_carried_over() {
        let r = LemmatizerRule::parse("Cies Cy").unwrap();
        assert_eq!(r.source(), "([^aeiouy])ies$");
        assert_eq!(r.to_string(), "s/([^aeiouy])ies$/$1y/");
        assert_eq!(r.apply("flies", None), "fly");
        assert_eq!(r.apply("plays", None), "plays");
    }

    #[test]
    fn vowel_consonant_run() {
        assert_eq!(apply("VCing VCe", "making"), "make");
        assert_eq!(apply("VCing VCe", "sing"), "sing");
    }

    #[test]
    fn r_and_a_tokens() {
        let any = LemmatizerRule::parse("Ater A").unwrap();
        assert_eq!(any.source(), "(.*)ter$");
        assert_eq!(any.to_string(), "s/(.*)ter$/$1/");
        assert_eq!(any.apply("water", None), "wa");
        assert_eq!(any.apply("waters", None), "waters");

        let r = LemmatizerRule::parse("VRes VRe").unwrap();
        assert_eq!(r.source(), "([aeiouy]r)es$");
        assert_eq!(r.apply("cures", None), "cure");
        assert_eq!(r.apply("boxes", None), "boxes");
    }

    #[test]
    fn doubled_consonant() {
        let r = LemmatizerRule::parse("CCing C").unwrap();
        assert_eq!(r.source(), "([^aeiouy])\\1ing$");
        assert_eq!(r.apply("running", None), "run");
        assert_eq!(r.apply("stopping", None), "stop");
        assert_eq!(r.apply("singing", None), "singing");
    }

    #[test]
    fn anchored_match_lengths() {
        let right = LemmatizerRule::parse(">2 ed").unwrap();
        assert_eq!(right.direction(), Direction::Right);
        assert_eq!(right.source(), "(..)ed$");
        assert_eq!(right.apply("walked", None), "walk");
        assert_eq!(right.apply("red", None), "red");

        let left = LemmatizerRule::parse("<4 s").unwrap();
        assert_eq!(left.match_length(), 3);
        assert_eq!(left.apply("cats", None), "cat");
        assert_eq!(left.apply("horses", None), "horses");
    }

    #[test]
    fn dictionary_gate() {
        let dict = Dictionary::from_words(["bake"]);
        let r = LemmatizerRule::parse("+ ing e").unwrap();
        assert!(r.must_match_dictionary());
        assert_eq!(r.apply("baking", Some(&dict)), "bake");
        assert_eq!(r.apply("singing", Some(&dict)), "singing");
        assert_eq!(r.apply("baking", None), "baking");
    }

    #[test]
    fn malformed_rules_are_errors() {
        assert!(LemmatizerRule::parse("").is_err());
        assert!(LemmatizerRule::parse("+").is_err());
        assert!(LemmatizerRule::parse("(unclosed x").is_err());
    }
}
