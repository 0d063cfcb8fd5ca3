//! Selective logic - how secondary keys combine with the primary match.

use serde::{Deserialize, Serialize};

/// Combination rule for an entry's secondary keys.
///
/// Persisted as an integer code. Codes outside `0..=3` are kept as
/// [`SelectiveLogic::Unrecognized`] and never block activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "i64", into = "i64")]
pub enum SelectiveLogic {
    /// At least one secondary key must match.
    #[default]
    AndAny,
    /// No secondary key may match.
    NotAny,
    /// Not every secondary key may match.
    NotAll,
    /// Every secondary key must match.
    AndAll,
    Unrecognized(i64),
}

impl SelectiveLogic {
    /// Decide whether the secondary condition holds, given how many of
    /// `total` secondary keys matched.
    pub fn accepts(&self, matched: usize, total: usize) -> bool {
        match self {
            SelectiveLogic::AndAny => matched > 0,
            SelectiveLogic::NotAny => matched == 0,
            SelectiveLogic::NotAll => matched < total,
            SelectiveLogic::AndAll => matched == total,
            SelectiveLogic::Unrecognized(_) => true,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            SelectiveLogic::AndAny => 0,
            SelectiveLogic::NotAny => 1,
            SelectiveLogic::NotAll => 2,
            SelectiveLogic::AndAll => 3,
            SelectiveLogic::Unrecognized(code) => *code,
        }
    }
}

impl From<i64> for SelectiveLogic {
    fn from(code: i64) -> Self {
        match code {
            0 => SelectiveLogic::AndAny,
            1 => SelectiveLogic::NotAny,
            2 => SelectiveLogic::NotAll,
            3 => SelectiveLogic::AndAll,
            other => SelectiveLogic::Unrecognized(other),
        }
    }
}

impl From<SelectiveLogic> for i64 {
    fn from(logic: SelectiveLogic) -> Self {
        logic.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truth_table() {
        // two secondary keys: none, one, both matched
        let cases = [
            (SelectiveLogic::AndAny, [false, true, true]),
            (SelectiveLogic::NotAny, [true, false, false]),
            (SelectiveLogic::NotAll, [true, true, false]),
            (SelectiveLogic::AndAll, [false, false, true]),
        ];

        for (logic, expected) in cases {
            for (matched, want) in expected.iter().enumerate() {
                assert_eq!(
                    logic.accepts(matched, 2),
                    *want,
                    "{:?} with {} matched",
                    logic,
                    matched
                );
            }
        }
    }

    #[test]
    fn test_unrecognized_is_permissive() {
        let logic = SelectiveLogic::from(7);
        assert_eq!(logic, SelectiveLogic::Unrecognized(7));
        assert!(logic.accepts(0, 2));
        assert!(logic.accepts(2, 2));
        assert_eq!(logic.code(), 7);
    }

    #[test]
    fn test_serde_as_integer() {
        let json = serde_json::to_string(&SelectiveLogic::NotAll).unwrap();
        assert_eq!(json, "2");

        let logic: SelectiveLogic = serde_json::from_str("3").unwrap();
        assert_eq!(logic, SelectiveLogic::AndAll);
    }
}
