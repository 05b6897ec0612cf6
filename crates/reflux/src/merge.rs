//! Field-wise merging of partially known values

/// Combine two versions of the same entity
///
/// `self` wins wherever it has data; `incoming` only fills what is missing.
pub trait Merge {
    fn merge(self, incoming: Self) -> Self;
}

impl<T> Merge for Option<T> {
    fn merge(self, incoming: Self) -> Self {
        self.or(incoming)
    }
}

impl Merge for String {
    fn merge(self, incoming: Self) -> Self {
        if self.is_empty() {
            incoming
        } else {
            self
        }
    }
}

impl<T> Merge for Vec<T> {
    fn merge(self, incoming: Self) -> Self {
        if self.is_empty() {
            incoming
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_fills_missing() {
        assert_eq!(Some(1).merge(Some(2)), Some(1));
        assert_eq!(None.merge(Some(2)), Some(2));
        assert_eq!(None::<u8>.merge(None), None);
    }

    #[test]
    fn test_empty_collections_are_missing() {
        assert_eq!(String::new().merge("filled".to_string()), "filled");
        assert_eq!("kept".to_string().merge("other".to_string()), "kept");
        assert_eq!(Vec::<u8>::new().merge(vec![1]), vec![1]);
    }
}
