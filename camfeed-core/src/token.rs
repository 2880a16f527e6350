//! Shared token input

use parking_lot::RwLock;
use std::sync::Arc;

/// Editable token value, read fresh by every upload
///
/// Clones share the same value, so an operator can change the token while a
/// capture loop is running and the very next upload carries the new value.
#[derive(Debug, Clone, Default)]
pub struct TokenInput {
    value: Arc<RwLock<String>>,
}

impl TokenInput {
    /// Create an input holding `value`
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Arc::new(RwLock::new(value.into())),
        }
    }

    /// Current token value
    pub fn value(&self) -> String {
        self.value.read().clone()
    }

    /// Replace the token value
    pub fn set(&self, value: impl Into<String>) {
        *self.value.write() = value.into();
    }

    /// Whether no token has been entered
    pub fn is_empty(&self) -> bool {
        self.value.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_value() {
        let input = TokenInput::new("abc");
        let view = input.clone();
        input.set("def");
        assert_eq!(view.value(), "def");
        assert!(!view.is_empty());
        assert!(TokenInput::default().is_empty());
    }
}
