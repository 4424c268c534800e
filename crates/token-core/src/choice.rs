//! Shared-choice slot used to correlate selections across tokens.

/// Caller-owned correlation slot for one logical record.
///
/// The first token of a family that sees `Unselected` performs its random
/// selection and stores the result; every later token handed the same slot
/// reuses the stored value verbatim. Choice-style tokens store a list index,
/// timestamp tokens store nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChoiceSlot {
    /// Nothing has been chosen yet for this record
    #[default]
    Unselected,
    /// A previous token already selected this value
    Selected(i64),
}

impl ChoiceSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::Unselected
    }

    /// The stored value, if any.
    pub fn selected(&self) -> Option<i64> {
        match self {
            Self::Unselected => None,
            Self::Selected(value) => Some(*value),
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected(_))
    }

    /// Store a selection, replacing whatever was there.
    pub fn select(&mut self, value: i64) {
        *self = Self::Selected(value);
    }

    /// Return the stored value, or run `select` once and store its result.
    ///
    /// `select` is never invoked when the slot is already set, so it is the
    /// place to consume randomness.
    pub fn get_or_select_with<E>(
        &mut self,
        select: impl FnOnce() -> Result<i64, E>,
    ) -> Result<i64, E> {
        match self {
            Self::Selected(value) => Ok(*value),
            Self::Unselected => {
                let value = select()?;
                *self = Self::Selected(value);
                Ok(value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unselected_runs_selector_once() {
        let mut slot = ChoiceSlot::new();
        let mut calls = 0;

        let first: Result<i64, ()> = slot.get_or_select_with(|| {
            calls += 1;
            Ok(7)
        });
        assert_eq!(first, Ok(7));
        assert_eq!(slot, ChoiceSlot::Selected(7));

        let second: Result<i64, ()> = slot.get_or_select_with(|| {
            calls += 1;
            Ok(99)
        });
        assert_eq!(second, Ok(7));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_index_zero_is_a_real_selection() {
        let mut slot = ChoiceSlot::Selected(0);
        assert!(slot.is_selected());
        let value: Result<i64, ()> = slot.get_or_select_with(|| Ok(3));
        assert_eq!(value, Ok(0));
    }

    #[test]
    fn test_failed_selection_leaves_slot_empty() {
        let mut slot = ChoiceSlot::default();
        let result: Result<i64, &str> = slot.get_or_select_with(|| Err("boom"));
        assert!(result.is_err());
        assert_eq!(slot.selected(), None);
    }
}
