//! Plan and state values for provider-managed attributes.
//!
//! During planning an optional computed attribute can be unknown. After an apply every value
//! stored in state has to be either null or known.

/// A single attribute value as seen by the provider host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Value<T> {
    /// Not yet known at plan time
    Unknown,
    #[default]
    Null,
    Known(T),
}

impl<T> Value<T> {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn known(&self) -> Option<&T> {
        match self {
            Value::Known(value) => Some(value),
            _ => None,
        }
    }

    /// Replaces an unknown value with null, leaving null and known values alone.
    pub fn resolve_unknown(&mut self) {
        if self.is_unknown() {
            *self = Value::Null;
        }
    }
}

impl<T: Clone> Value<T> {
    /// The known value, or `fallback` when unknown or null.
    pub fn or_default_from(&self, fallback: &T) -> T {
        self.known().cloned().unwrap_or_else(|| fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_unknown_only_touches_unknown() {
        let mut unknown: Value<bool> = Value::Unknown;
        let mut known = Value::Known(true);

        unknown.resolve_unknown();
        known.resolve_unknown();

        assert_eq!(unknown, Value::Null);
        assert_eq!(known, Value::Known(true));
    }

    #[test]
    fn test_fallback_applies_to_unknown_and_null() {
        let fallback = "provider".to_string();

        assert_eq!(Value::<String>::Unknown.or_default_from(&fallback), "provider");
        assert_eq!(Value::<String>::Null.or_default_from(&fallback), "provider");
        assert_eq!(Value::Known("resource".to_string()).or_default_from(&fallback), "resource");
    }
}
