//! Event name lists.
//!
//! The subscribe family accepts several event names in one string, separated by
//! any run of spaces and/or commas: `"open close, resize"`.

/// Splits a name list into individual event names, skipping empty fragments.
///
/// ```
/// use eventvisor::split_names;
///
/// let names: Vec<&str> = split_names("event1 event2  event3 , event4").collect();
/// assert_eq!(names, ["event1", "event2", "event3", "event4"]);
/// ```
pub fn split_names(names: &str) -> impl Iterator<Item = &str> {
    names
        .split(|c: char| c == ' ' || c == ',')
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_name_is_kept_verbatim() {
        let names: Vec<&str> = split_names("event:context1").collect();
        assert_eq!(names, ["event:context1"]);
    }

    #[test]
    fn test_leading_and_trailing_separators_are_ignored() {
        let names: Vec<&str> = split_names(" ,a,,b , ").collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(split_names(" , ").count(), 0);
    }

    proptest! {
        #[test]
        fn prop_join_then_split_recovers_names(
            names in prop::collection::vec("[a-z:]{1,8}", 1..6),
            sep in prop::sample::select(vec![" ", ",", " , ", "  ", ",,"]),
        ) {
            let joined = names.join(sep);
            let split: Vec<&str> = split_names(&joined).collect();
            prop_assert_eq!(split, names.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}
