//! Property-based tests for the list splitter.
//!
//! Escaping then splitting must give back the original value, and runs of
//! escapes in front of a delimiter pair off left to right.

use converter::{escape, escape_with, split, split_with_escape, LIST_ESCAPE};
use proptest::prelude::*;

/// Any delimiter other than the escape character
fn delimiter_strategy() -> impl Strategy<Value = char> {
    any::<char>().prop_filter("delimiter must differ from the escape", |c| *c != LIST_ESCAPE)
}

/// Text without escapes or the delimiters used below
fn plain_text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9 .=]{0,12}").expect("valid regex")
}

proptest! {
    /// An escaped value always splits back into exactly itself
    #[test]
    fn escape_then_split_roundtrip(value in any::<String>(), delimiter in delimiter_strategy()) {
        let escaped = escape_with(&value, delimiter, LIST_ESCAPE);
        let tokens = split_with_escape(Some(&escaped), delimiter, LIST_ESCAPE, false);
        prop_assert_eq!(tokens, vec![value.clone()], "escaped form: {:?}", escaped);
    }

    /// Same round trip through the default escape character
    #[test]
    fn escape_then_split_roundtrip_default_escape(value in any::<String>()) {
        let escaped = escape(&value, ',');
        prop_assert_eq!(split(Some(&escaped), ',', false), vec![value]);
    }

    /// `k` escapes before a delimiter: pairs become literal escapes, and an
    /// odd one left over keeps the delimiter inside the token
    #[test]
    fn escape_run_before_delimiter(
        head in plain_text_strategy(),
        tail in plain_text_strategy(),
        k in 0usize..8,
        delimiter in prop_oneof![Just(','), Just(';'), Just('|'), Just(':')],
    ) {
        let escape = LIST_ESCAPE.to_string();
        let input = format!("{}{}{}{}", head, escape.repeat(k), delimiter, tail);
        let tokens = split_with_escape(Some(&input), delimiter, LIST_ESCAPE, false);

        let literal = escape.repeat(k / 2);
        if k % 2 == 0 {
            prop_assert_eq!(tokens, vec![format!("{}{}", head, literal), tail]);
        } else {
            prop_assert_eq!(tokens, vec![format!("{}{}{}{}", head, literal, delimiter, tail)]);
        }
    }
}
