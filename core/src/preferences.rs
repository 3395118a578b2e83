//! Source of the user's sort preference.

use std::sync::RwLock;

use crate::types::SortOrder;

/// Read once at the start of every fetch cycle.
pub trait SortPreference {
    fn get(&self) -> SortOrder;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSortPreference(pub SortOrder);

impl SortPreference for FixedSortPreference {
    fn get(&self) -> SortOrder {
        self.0
    }
}

/// Preference edited by a settings screen while the list screen keeps reading it.
#[derive(Debug, Default)]
pub struct SharedSortPreference {
    current: RwLock<SortOrder>,
}

impl SharedSortPreference {
    pub fn new(order: SortOrder) -> Self {
        Self {
            current: RwLock::new(order),
        }
    }

    pub fn set(&self, order: SortOrder) {
        // A poisoned lock still holds a valid `SortOrder`.
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = order;
    }
}

impl SortPreference for SharedSortPreference {
    fn get(&self) -> SortOrder {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_preference_reflects_latest_setting() {
        let prefs = SharedSortPreference::default();
        assert_eq!(prefs.get(), SortOrder::MostPopular);
        prefs.set(SortOrder::TopRated);
        assert_eq!(prefs.get(), SortOrder::TopRated);
    }
}
