//! Delimiter-aware tokenizing of list-valued properties

/// Default separator between list elements
pub const LIST_DELIMITER: char = ',';

/// Default escape character for delimiters inside list elements
pub const LIST_ESCAPE: char = '\\';

/// Split a string on a delimiter, honoring backslash escapes.
///
/// Absent input yields no tokens; an empty string yields a single empty
/// token, so that `split(escape(s))` always gives back `[s]`.
pub fn split(input: Option<&str>, delimiter: char, trim: bool) -> Vec<String> {
    split_with_escape(input, delimiter, LIST_ESCAPE, trim)
}

/// Split a string on a delimiter using an explicit escape character.
///
/// An escape followed by the delimiter or by another escape emits that
/// character literally. An escape followed by anything else, or standing at
/// the end of the input, is kept as is. Pairs are consumed left to right.
pub fn split_with_escape(
    input: Option<&str>,
    delimiter: char,
    escape: char,
    trim: bool,
) -> Vec<String> {
    let Some(input) = input else {
        return Vec::new();
    };

    let mut tokens = Vec::new();
    let mut token = String::new();
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c == escape {
            match chars.next() {
                Some(next) if next == delimiter || next == escape => token.push(next),
                Some(next) => {
                    token.push(c);
                    token.push(next);
                }
                None => token.push(c),
            }
        } else if c == delimiter {
            tokens.push(finish_token(std::mem::take(&mut token), trim));
        } else {
            token.push(c);
        }
    }
    tokens.push(finish_token(token, trim));

    tokens
}

fn finish_token(token: String, trim: bool) -> String {
    if trim {
        token.trim().to_string()
    } else {
        token
    }
}

/// Escape a single value so that `split` returns it as one token.
pub fn escape(input: &str, delimiter: char) -> String {
    escape_with(input, delimiter, LIST_ESCAPE)
}

/// Escape a single value using an explicit escape character.
pub fn escape_with(input: &str, delimiter: char, escape: char) -> String {
    let mut escaped = String::with_capacity(input.len() + 4);
    for c in input.chars() {
        if c == escape || c == delimiter {
            escaped.push(escape);
        }
        escaped.push(c);
    }
    escaped
}
