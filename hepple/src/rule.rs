//! Context rules of the retagger.
//!
//! A rule line reads `from to ID [param ...]`. `ID` names one of the
//! context tests below; the registry maps it to the test and to the number
//! of parameters the test reads. Extra parameters are kept but ignored.

use std::fmt;
use std::str::FromStr;

use ahash::AHashMap;
use libadorn_core::{Error, Result};
use once_cell::sync::Lazy;

use crate::window::Window;

/// Named boolean tests over a window centred on slot 3.
///
/// `Tag` tests compare chosen tags, `Wd` tests compare spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextTest {
    PrevTag,
    NextTag,
    Prev2Tag,
    Next2Tag,
    Prev1Or2Tag,
    Next1Or2Tag,
    Prev1Or2Or3Tag,
    Next1Or2Or3Tag,
    SurroundTag,
    PrevBigram,
    NextBigram,
    CurWd,
    PrevWd,
    NextWd,
    Prev2Wd,
    Next2Wd,
    Prev1Or2Wd,
    Next1Or2Wd,
    Prev1Or2Or3Wd,
    Next1Or2Or3Wd,
    WdPrevTag,
    WdNextTag,
    WdAnd2Bfr,
    WdAnd2Aft,
    WdAnd2TagBfr,
    WdAnd2TagAft,
    LBigram,
    RBigram,
}

/// (id, parameter count, test)
const RULE_KINDS: &[(&str, usize, ContextTest)] = &[
    ("PREVTAG", 1, ContextTest::PrevTag),
    ("NEXTTAG", 1, ContextTest::NextTag),
    ("PREV2TAG", 1, ContextTest::Prev2Tag),
    ("NEXT2TAG", 1, ContextTest::Next2Tag),
    ("PREV1OR2TAG", 1, ContextTest::Prev1Or2Tag),
    ("NEXT1OR2TAG", 1, ContextTest::Next1Or2Tag),
    ("PREV1OR2OR3TAG", 1, ContextTest::Prev1Or2Or3Tag),
    ("NEXT1OR2OR3TAG", 1, ContextTest::Next1Or2Or3Tag),
    ("SURROUNDTAG", 2, ContextTest::SurroundTag),
    ("PREVBIGRAM", 2, ContextTest::PrevBigram),
    ("NEXTBIGRAM", 2, ContextTest::NextBigram),
    ("CURWD", 1, ContextTest::CurWd),
    ("PREVWD", 1, ContextTest::PrevWd),
    ("NEXTWD", 1, ContextTest::NextWd),
    ("PREV2WD", 1, ContextTest::Prev2Wd),
    ("NEXT2WD", 1, ContextTest::Next2Wd),
    ("PREV1OR2WD", 1, ContextTest::Prev1Or2Wd),
    ("NEXT1OR2WD", 1, ContextTest::Next1Or2Wd),
    ("PREV1OR2OR3WD", 1, ContextTest::Prev1Or2Or3Wd),
    ("NEXT1OR2OR3WD", 1, ContextTest::Next1Or2Or3Wd),
    ("WDPREVTAG", 2, ContextTest::WdPrevTag),
    ("WDNEXTTAG", 2, ContextTest::WdNextTag),
    ("WDAND2BFR", 2, ContextTest::WdAnd2Bfr),
    ("WDAND2AFT", 2, ContextTest::WdAnd2Aft),
    ("WDAND2TAGBFR", 2, ContextTest::WdAnd2TagBfr),
    ("WDAND2TAGAFT", 2, ContextTest::WdAnd2TagAft),
    ("LBIGRAM", 2, ContextTest::LBigram),
    ("RBIGRAM", 2, ContextTest::RBigram),
];

static REGISTRY: Lazy<AHashMap<&'static str, (usize, ContextTest)>> = Lazy::new(|| {
    RULE_KINDS
        .iter()
        .map(|&(id, arity, test)| (id, (arity, test)))
        .collect()
});

impl ContextTest {
    /// Look up a test by rule id.
    pub fn from_id(id: &str) -> Option<Self> {
        REGISTRY.get(id).map(|&(_, test)| test)
    }

    pub fn id(self) -> &'static str {
        RULE_KINDS
            .iter()
            .find(|(_, _, t)| *t == self)
            .map(|(id, _, _)| *id)
            .unwrap_or("")
    }

    /// Number of context parameters the test reads.
    pub fn arity(self) -> usize {
        REGISTRY.get(self.id()).map(|&(n, _)| n).unwrap_or(0)
    }

    /// All registered rule ids.
    pub fn ids() -> impl Iterator<Item = &'static str> {
        RULE_KINDS.iter().map(|(id, _, _)| *id)
    }

    /// Evaluate against `w`. `c` must hold at least `arity()` parameters.
    pub fn holds(self, w: &Window, c: &[String]) -> bool {
        use ContextTest::*;
        let tag = |i: usize, p: usize| w.tag(i) == c[p];
        let word = |i: usize, p: usize| w.word(i) == c[p];
        match self {
            PrevTag => tag(2, 0),
            NextTag => tag(4, 0),
            Prev2Tag => tag(1, 0),
            Next2Tag => tag(5, 0),
            Prev1Or2Tag => tag(1, 0) || tag(2, 0),
            Next1Or2Tag => tag(4, 0) || tag(5, 0),
            Prev1Or2Or3Tag => tag(0, 0) || tag(1, 0) || tag(2, 0),
            Next1Or2Or3Tag => tag(4, 0) || tag(5, 0) || tag(6, 0),
            SurroundTag => tag(2, 0) && tag(4, 1),
            PrevBigram => tag(1, 0) && tag(2, 1),
            NextBigram => tag(4, 0) && tag(5, 1),
            CurWd => word(3, 0),
            PrevWd => word(2, 0),
            NextWd => word(4, 0),
            Prev2Wd => word(1, 0),
            Next2Wd => word(5, 0),
            Prev1Or2Wd => word(1, 0) || word(2, 0),
            Next1Or2Wd => word(4, 0) || word(5, 0),
            Prev1Or2Or3Wd => word(0, 0) || word(1, 0) || word(2, 0),
            Next1Or2Or3Wd => word(4, 0) || word(5, 0) || word(6, 0),
            WdPrevTag => tag(2, 0) && word(3, 1),
            WdNextTag => word(3, 0) && tag(4, 1),
            WdAnd2Bfr => word(1, 0) && word(3, 1),
            WdAnd2Aft => word(3, 0) && word(5, 1),
            WdAnd2TagBfr => tag(1, 0) && word(3, 1),
            WdAnd2TagAft => word(3, 0) && tag(5, 1),
            LBigram => word(2, 0) && word(3, 1),
            RBigram => word(3, 0) && word(4, 1),
        }
    }
}

/// One context rule: retag `from` as `to` when `test` holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub from: String,
    pub to: String,
    pub test: ContextTest,
    pub context: Vec<String>,
}

impl Rule {
    /// Parse a whitespace separated rule line.
    pub fn parse(line: &str) -> Result<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(Error::invalid_rule(line, "expected `from to ID [params]`"));
        }
        let id = parts[2];
        let test = ContextTest::from_id(id)
            .ok_or_else(|| Error::invalid_rule(line, format!("unknown rule id `{id}`")))?;

        let context: Vec<String> = parts[3..].iter().map(|s| s.to_string()).collect();
        if context.len() < test.arity() {
            return Err(Error::invalid_rule(
                line,
                format!("{id} needs {} parameter(s), got {}", test.arity(), context.len()),
            ));
        }

        Ok(Self {
            from: parts[0].to_string(),
            to: parts[1].to_string(),
            test,
            context,
        })
    }

    /// True if the centre word may take `to` and the context test holds.
    pub fn applies(&self, window: &Window) -> bool {
        window.has_candidate(crate::window::CENTER, &self.to) && self.test.holds(window, &self.context)
    }
}

impl FromStr for Rule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.from, self.to, self.test.id())?;
        for c in &self.context {
            write!(f, " {c}")?;
        }
        Ok(())
    }
}
