/// Whitespace-tolerant pattern compilation.
///
/// A find pattern is split into runs of word characters, runs of
/// punctuation, and runs of whitespace:
///
///   - an explicit whitespace run matches one or more whitespace characters
///   - a boundary between two non-whitespace runs matches zero or more
///   - everything else matches literally
///
/// So `foo(a, b)` still finds `foo( a,\n    b )` after a reformat, while
/// `foo bar` never matches `foobar`.
use std::sync::LazyLock;

use regex::Regex;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\w+|[^\w\s]+|\s+").expect("token pattern is valid")
});

/// Compile `text` into a regex source string. Empty input yields `""`.
pub fn to_regex(text: &str) -> String {
    let tokens: Vec<&str> = TOKEN.find_iter(text).map(|m| m.as_str()).collect();

    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if token.starts_with(char::is_whitespace) {
            out.push_str(r"\s+");
            continue;
        }
        out.push_str(&regex::escape(token));
        if let Some(next) = tokens.get(i + 1)
            && !next.starts_with(char::is_whitespace)
        {
            out.push_str(r"\s*");
        }
    }
    out
}
