//! The derivation log: an append-only record of `(conclusion, rule,
//! premises…)`, keyed by canonical conclusion string with first-write-wins
//! semantics. Held as an in-memory index rather than a reopen-for-read file;
//! `write_to` dumps the same on-disk shape (one record per line,
//! space-separated) for human inspection only.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::expression::Expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Axiom,
    Mp,
}

impl Rule {
    fn as_str(self) -> &'static str {
        match self {
            Rule::Axiom => "axiom",
            Rule::Mp => "mp",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DerivationRecord {
    pub conclusion: String,
    pub rule: Rule,
    pub premises: Vec<String>,
}

#[derive(Debug, Default)]
pub struct DerivationLog {
    records: Vec<DerivationRecord>,
    index: HashMap<String, usize>,
}

impl DerivationLog {
    pub fn new() -> DerivationLog {
        DerivationLog::default()
    }

    pub fn record_axiom(&mut self, conclusion: &Expression) {
        self.append(conclusion.to_string(), Rule::Axiom, Vec::new());
    }

    pub fn record_mp(&mut self, conclusion: &Expression, lhs: &Expression, rhs: &Expression) {
        self.append(
            conclusion.to_string(),
            Rule::Mp,
            vec![lhs.to_string(), rhs.to_string()],
        );
    }

    fn append(&mut self, conclusion: String, rule: Rule, premises: Vec<String>) {
        if self.index.contains_key(&conclusion) {
            return;
        }
        self.index.insert(conclusion.clone(), self.records.len());
        self.records.push(DerivationRecord { conclusion, rule, premises });
    }

    pub fn get(&self, conclusion: &str) -> Option<&DerivationRecord> {
        self.index.get(conclusion).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Dumps the log for human inspection. The solver never reads this back
    /// (`Solver::reconstruct` walks `self`, not the file); flushing before
    /// any external reader opens it is the caller's responsibility.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let mut file = File::create(path)?;
        for record in &self.records {
            write!(file, "{} {}", record.conclusion, record.rule.as_str())?;
            for premise in &record.premises {
                write!(file, " {premise}")?;
            }
            writeln!(file)?;
        }
        file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Expression;

    #[test]
    fn first_record_for_a_conclusion_wins() {
        let mut log = DerivationLog::new();
        let a = Expression::new("a>a").unwrap();
        log.record_axiom(&a);
        let b = Expression::new("c").unwrap();
        log.record_mp(&a, &b, &b);
        let record = log.get(&a.to_string()).unwrap();
        assert_eq!(record.rule, Rule::Axiom);
        assert!(record.premises.is_empty());
    }
}
