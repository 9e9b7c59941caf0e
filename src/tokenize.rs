//! Command-line splitting for `# ADD` and `# PROP` lines.
//!
//! Tokens are separated by spaces and tabs.  A double-quoted run never splits
//! a token, so `/I "..\Program Files\inc"` yields two tokens and
//! `/Fo"Debug dir/"` one.  An unterminated quote runs to the end of the line.
//!
//! ```text
//! line    = ws* (token ws*)*
//! token   = (quoted | plain)+
//! quoted  = '"' [^"]* '"'?
//! plain   = [^" \t]
//! ```

use chumsky::prelude::*;

fn line_parser<'a>() -> impl Parser<'a, &'a str, Vec<&'a str>, extra::Err<Simple<'a, char>>> {
    let quoted = just('"')
        .then(none_of('"').repeated())
        .then(just('"').or_not())
        .ignored();

    let plain = none_of("\" \t").ignored();

    let token = quoted.or(plain).repeated().at_least(1).to_slice();

    text::whitespace().ignore_then(
        token
            .then_ignore(text::whitespace())
            .repeated()
            .collect::<Vec<_>>(),
    )
}

/// Split `line` into tokens, quotes kept.
pub fn tokenize(line: &str) -> Vec<&str> {
    line_parser()
        .parse(line)
        .into_result()
        .unwrap_or_else(|_| line.split_whitespace().collect())
}

/// Strip the surrounding double quotes of an argument value.
pub fn unquote(value: &str) -> &str {
    value.trim_matches('"')
}
