//! A value that is a single item or an ordered list, serialised as the item
//! itself or as an array.

use serde::Serialize;

/// One item, or several in order.
///
/// ```rust
/// use rollup_confgen::OneOrMany;
///
/// assert_eq!(OneOrMany::collapse(vec![1]), OneOrMany::One(1));
/// assert_eq!(OneOrMany::collapse(vec![1, 2]).len(), 2);
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// Exactly one item.
    One(T),
    /// Zero or more items.
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Wrap `items`, unwrapping a one-element list.
    #[must_use]
    pub fn collapse(mut items: Vec<T>) -> Self {
        if items.len() == 1
            && let Some(item) = items.pop()
        {
            return Self::One(item);
        }
        Self::Many(items)
    }

    /// All items, in order.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }

    /// Borrow all items as a slice.
    #[must_use]
    pub const fn as_slice(&self) -> &[T] {
        match self {
            Self::One(item) => std::slice::from_ref(item),
            Self::Many(items) => items.as_slice(),
        }
    }

    /// Iterate over the items.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Number of items.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether there are no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// The item, when there is exactly one.
    #[must_use]
    pub const fn one(&self) -> Option<&T> {
        match self {
            Self::One(item) => Some(item),
            Self::Many(_) => None,
        }
    }
}

impl<'a, T> IntoIterator for &'a OneOrMany<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_lists_stay_lists() {
        let empty: OneOrMany<u8> = OneOrMany::collapse(Vec::new());
        assert_eq!(empty, OneOrMany::Many(Vec::new()));
        assert!(empty.is_empty());
        assert!(empty.one().is_none());
    }

    #[test]
    fn serialises_without_a_wrapper() {
        let one = serde_json::to_value(OneOrMany::collapse(vec!["a"])).expect("serialise");
        let many = serde_json::to_value(OneOrMany::collapse(vec!["a", "b"])).expect("serialise");
        assert_eq!(one, json!("a"));
        assert_eq!(many, json!(["a", "b"]));
    }
}
