/// Compact locate strings.
///
/// Agents often find it easier to write a single string than a nested
/// request object. The accepted form is `<file>[:<scope>][@<find>]`:
///
///   - `src/app.py@self.<|>value` searches the whole file
///   - `src/app.py:42@return <|>x` searches line 42 (`L42` also works)
///   - `src/app.py:10-20` or `src/app.py:10,20` selects lines 10 to 20;
///     an end of `0` runs to the end of the file
///   - `src/app.py:Outer.Inner.run` scopes to a symbol path
///
/// The find part is split at the last `@`, the scope at the first `:`.
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{EngineError, Result};
use crate::symbols::SymbolPath;
use crate::types::{LineScope, Locate, Scope, SymbolScope};

static LINE_SCOPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^L?(\d+)(?:[-,](\d+))?$").expect("line scope pattern is valid")
});

pub fn parse_locate(input: &str) -> Result<Locate> {
    let (path_scope, find) = match input.rsplit_once('@') {
        Some((head, find)) => (head, Some(find.to_string())),
        None => (input, None),
    };

    let (file_path, scope) = match path_scope.split_once(':') {
        Some((file, scope)) => (file, Some(parse_scope(input, scope)?)),
        None => (path_scope, None),
    };

    if file_path.trim().is_empty() {
        return Err(EngineError::InvalidLocate {
            input: input.to_string(),
            reason: "missing file path".to_string(),
        });
    }

    Locate::new(file_path, scope, find)
}

fn parse_scope(input: &str, scope: &str) -> Result<Scope> {
    let invalid = |reason: &str| EngineError::InvalidLocate {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    if let Some(caps) = LINE_SCOPE.captures(scope) {
        let start: u32 = caps[1]
            .parse()
            .map_err(|_| invalid("line number out of range"))?;
        let end: u32 = match caps.get(2) {
            Some(end) => end
                .as_str()
                .parse()
                .map_err(|_| invalid("line number out of range"))?,
            None => start,
        };
        if start == 0 {
            return Err(invalid("line numbers start at 1"));
        }
        if end != 0 && end < start {
            return Err(invalid("line range ends before it starts"));
        }
        return Ok(Scope::Line(LineScope::lines(start, end)));
    }

    let symbol_path = SymbolPath::parse(scope);
    if symbol_path.is_empty() {
        return Err(invalid("empty scope"));
    }
    Ok(Scope::Symbol(SymbolScope { symbol_path }))
}
