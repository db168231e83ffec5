use serde::{Deserialize, Serialize};

use crate::enums::Outcome;

/// Pass/warn/fail tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub total: usize,
    pub pass: usize,
    pub warn: usize,
    pub fail: usize,
}

impl Counts {
    /// Count one record with the given verdict.
    pub fn record(&mut self, outcome: Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Pass => self.pass += 1,
            Outcome::Warn => self.warn += 1,
            Outcome::Fail => self.fail += 1,
        }
    }

    pub fn merge(&mut self, other: Counts) {
        self.total += other.total;
        self.pass += other.pass;
        self.warn += other.warn;
        self.fail += other.fail;
    }

    pub fn has_failures(&self) -> bool {
        self.fail > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_adds_each_counter() {
        let mut left = Counts::default();
        left.record(Outcome::Pass);
        left.record(Outcome::Fail);
        let mut right = Counts::default();
        right.record(Outcome::Warn);
        left.merge(right);
        assert_eq!(
            left,
            Counts {
                total: 3,
                pass: 1,
                warn: 1,
                fail: 1
            }
        );
        assert!(left.has_failures());
    }
}
