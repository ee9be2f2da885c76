//! Shift roster: the operators available for assignment during this run.
//!
//! Collected once at startup and fixed for the process lifetime. Entry 1 is
//! a built-in default so the roster is never empty.

use crate::livelog::LiveLog;
use crate::ui;

pub const DEFAULT_OPERATOR: &str = "Default User";

#[derive(Debug, Clone)]
pub struct ShiftRoster {
    names: Vec<String>,
}

impl ShiftRoster {
    /// Build a roster, guaranteeing it is non-empty.
    pub fn new(names: Vec<String>) -> Self {
        if names.is_empty() {
            Self {
                names: vec![DEFAULT_OPERATOR.to_string()],
            }
        } else {
            Self { names }
        }
    }

    /// Startup prompt: ask how many additional operators are on shift and
    /// their names. Unparsable counts mean none; blank names are skipped.
    pub fn collect(log: &LiveLog) -> Self {
        ui::banner(log, "SHIFT CONFIGURATION");
        println!("\n    1. {DEFAULT_OPERATOR} (default)");

        let mut names = vec![DEFAULT_OPERATOR.to_string()];
        let count: usize = ui::ask_line("    How many additional operators? (0 for none): ")
            .parse()
            .unwrap_or(0);
        for i in 0..count {
            let name = ui::ask_line(&format!("    Name for operator {}: ", i + 2));
            if !name.is_empty() {
                names.push(name);
            }
        }

        let roster = Self::new(names);
        log.add(&format!("    active shift roster: {:?}", roster.names));
        log.add("");
        roster
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// 1-based menu entry lookup, as presented to the operator.
    pub fn pick(&self, entry: usize) -> Option<&str> {
        if entry >= 1 {
            self.names.get(entry - 1).map(String::as_str)
        } else {
            None
        }
    }

    /// Numbered menu lines, one per operator.
    pub fn menu_lines(&self) -> Vec<String> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| format!("[{}] {name}", i + 1))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_roster_gets_the_default_operator() {
        let roster = ShiftRoster::new(Vec::new());
        assert_eq!(roster.names(), [DEFAULT_OPERATOR]);
        assert!(!roster.is_empty());
    }

    #[test]
    fn pick_is_one_based() {
        let roster = ShiftRoster::new(vec!["Alice".into(), "Bob".into()]);
        assert_eq!(roster.pick(1), Some("Alice"));
        assert_eq!(roster.pick(2), Some("Bob"));
        assert_eq!(roster.pick(0), None);
        assert_eq!(roster.pick(3), None);
    }

    #[test]
    fn menu_lines_are_numbered() {
        let roster = ShiftRoster::new(vec!["Alice".into(), "Bob".into()]);
        assert_eq!(roster.menu_lines(), vec!["[1] Alice", "[2] Bob"]);
    }
}
