use super::term::Op;

/// A table of display symbols for the five binary connectives plus negation.
///
/// `Notation::default()` is the only table used by anything that must
/// round-trip through the parser (`normalize`, `equals`, the derivation
/// log): it reproduces the canonical surface syntax exactly (`!`, `*`, `|`,
/// `+`, `=`, `>`). Other tables are for display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notation {
    neg: String,
    conjunction: String,
    disjunction: String,
    xor: String,
    equivalent: String,
    implication: String,
}

impl Notation {
    /// The canonical ascii notation: identical to the parser's own alphabet,
    /// so `to_string_with(&Notation::default())` round-trips through `parse`.
    pub fn ascii() -> Notation {
        Notation {
            neg: "!".into(),
            conjunction: "*".into(),
            disjunction: "|".into(),
            xor: "+".into(),
            equivalent: "=".into(),
            implication: ">".into(),
        }
    }

    /// Mathematical unicode notation, for display only (cannot be fed back
    /// into `Expression::new`, which only accepts the ascii alphabet).
    pub fn mathematical() -> Notation {
        Notation {
            neg: "¬".into(),
            conjunction: "∧".into(),
            disjunction: "∨".into(),
            xor: "⊕".into(),
            equivalent: "↔".into(),
            implication: "→".into(),
        }
    }

    pub fn op(&self, op: Op) -> &str {
        match op {
            Op::Conjunction => &self.conjunction,
            Op::Disjunction => &self.disjunction,
            Op::Xor => &self.xor,
            Op::Equivalent => &self.equivalent,
            Op::Implication => &self.implication,
        }
    }

    pub fn neg(&self) -> &str {
        &self.neg
    }
}

impl Default for Notation {
    fn default() -> Notation {
        Notation::ascii()
    }
}
