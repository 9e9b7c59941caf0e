//! Decoders for the four tool command lines of a `.dsp` file.
//!
//! Each decoder walks the tokens of one `# ADD <tool>` line and writes the
//! MSBuild equivalent of every flag into the bags selected by
//! [`Targets`](crate::targets::Targets).  A flag that equals the MSBuild
//! default writes nothing.  Errors are detected before any broadcast, so a
//! rejected flag leaves the bags as they were.

/// Assign a scalar on every bag a `Targets` broadcast reaches.
macro_rules! set {
    ($targets:ident . $each:ident, $field:ident, $value:expr) => {{
        let value = $value;
        $targets.$each(|bag| bag.$field = Some(value.clone().into()));
    }};
}

/// Append to a set on every bag a `Targets` broadcast reaches.
macro_rules! add {
    ($targets:ident . $each:ident, $field:ident, $value:expr) => {{
        let value = $value;
        $targets.$each(|bag| {
            bag.$field.insert(value.clone());
        });
    }};
}

pub mod compiler;
pub mod librarian;
pub mod linker;
pub mod resource;

use crate::error::{ConvertError, ConvertResult, Tool};
use crate::tokenize::unquote;

/// One token of a command line, split into switch and bare forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'t> {
    /// `/name` or `-name`; holds the text after the switch character and the
    /// complete original token.
    Switch { flag: &'t str, raw: &'t str },
    /// Anything without a leading switch character.
    Bare(&'t str),
}

/// Sequential access to the tokens of one line.  Some flags take their
/// argument from the following token (`/I dir`, `/D NAME`).
#[derive(Debug)]
pub(crate) struct Cursor<'t> {
    tokens: std::vec::IntoIter<&'t str>,
    tool: Tool,
    line: usize,
}

impl<'t> Cursor<'t> {
    pub(crate) fn new(tokens: Vec<&'t str>, tool: Tool, line: usize) -> Self {
        Self { tokens: tokens.into_iter(), tool, line }
    }

    pub(crate) fn line(&self) -> usize {
        self.line
    }

    pub(crate) fn next_token(&mut self) -> Option<Token<'t>> {
        let raw = self.tokens.next()?;
        let token = match raw.strip_prefix('/').or_else(|| raw.strip_prefix('-')) {
            Some(flag) => Token::Switch { flag, raw },
            None => Token::Bare(raw),
        };
        Some(token)
    }

    /// The unquoted argument of `flag`: `inline` when non-empty, else the
    /// next token.
    pub(crate) fn argument(&mut self, flag: &str, inline: &'t str) -> ConvertResult<&'t str> {
        if !unquote(inline).is_empty() {
            return Ok(unquote(inline));
        }
        match self.tokens.next() {
            Some(next) => Ok(unquote(next)),
            None => Err(ConvertError::InvalidFlagArgument {
                tool: self.tool,
                flag: flag.to_string(),
                argument: String::new(),
                line: self.line,
            }),
        }
    }

    /// Skip the next token, if any.
    pub(crate) fn skip(&mut self) {
        self.tokens.next();
    }

    /// The raw next token, if any.
    pub(crate) fn next_raw(&mut self) -> Option<&'t str> {
        self.tokens.next()
    }

    pub(crate) fn invalid(&self, prefix: Option<&'static str>, flag: &str) -> ConvertError {
        ConvertError::flag(self.tool, prefix, flag, self.line)
    }
}

/// `value` with `prefix` removed, compared ASCII case-insensitively.
pub(crate) fn strip_prefix_ci<'v>(value: &'v str, prefix: &str) -> Option<&'v str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &value[prefix.len()..])
}

/// Like [`strip_prefix_ci`] but only matches when an argument follows.
pub(crate) fn value_ci<'v>(value: &'v str, prefix: &str) -> Option<&'v str> {
    strip_prefix_ci(value, prefix).filter(|rest| !rest.is_empty())
}

/// Split `reserve[,commit]`.
pub(crate) fn split_sizes(value: &str) -> (String, Option<String>) {
    match value.split_once(',') {
        Some((reserve, commit)) => (unquote(reserve).to_string(), Some(unquote(commit).to_string())),
        None => (unquote(value).to_string(), None),
    }
}

/// `/machine:` value shared by the linker and the librarian.  An x86 target
/// on the default platform is the toolset default and yields `None`.
pub(crate) fn machine(
    value: &str,
    default_platform: bool,
    cursor: &Cursor<'_>,
) -> ConvertResult<Option<&'static str>> {
    let machine = match value.to_ascii_lowercase().as_str() {
        "arm" => Some("MachineARM"),
        "ix86" | "i386" | "x86" => (!default_platform).then_some("MachineX86"),
        "mips" => Some("MachineMIPS"),
        "mips16" => Some("MachineMIPS16"),
        "sh4" => Some("MachineSH4"),
        "alpha" | "mipsr41xx" | "ppc" | "sh3" => None,
        _ => return Err(cursor.invalid(Some("/machine:"), value)),
    };
    Ok(machine)
}

/// Result of a `/subsystem:` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Subsystem {
    /// A plain subsystem name.
    Named(&'static str),
    /// `name,major.minor`; MSBuild has no property for the version, so the
    /// original switch is kept as an additional option.
    Versioned,
}

pub(crate) fn subsystem(value: &str, cursor: &Cursor<'_>) -> ConvertResult<Subsystem> {
    let (name, versioned) = match value.split_once(',') {
        Some((name, _)) => (name, true),
        None => (value, false),
    };
    let named = match name.to_ascii_lowercase().as_str() {
        "console" => "Console",
        "native" => "Native",
        "posix" => "POSIX",
        "windows" => "Windows",
        "windowsce" => "WindowsCE",
        _ => return Err(cursor.invalid(Some("/subsystem:"), name)),
    };
    Ok(if versioned { Subsystem::Versioned } else { Subsystem::Named(named) })
}

/// Result of a `/nodefaultlib[:name]` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DefaultLibraries<'v> {
    IgnoreAll,
    Ignore(&'v str),
}

/// `rest` is the text after `nodefaultlib`.
pub(crate) fn nodefaultlib<'v>(rest: &'v str, cursor: &Cursor<'_>) -> ConvertResult<DefaultLibraries<'v>> {
    if rest.is_empty() {
        return Ok(DefaultLibraries::IgnoreAll);
    }
    match rest.strip_prefix(':').map(unquote) {
        Some(name) if !name.is_empty() => Ok(DefaultLibraries::Ignore(name)),
        _ => Err(cursor.invalid(Some("/nodefaultlib"), rest)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(tokens: &[&'static str]) -> Cursor<'static> {
        Cursor::new(tokens.to_vec(), Tool::Linker, 7)
    }

    #[test]
    fn switch_and_bare_tokens() {
        let mut c = cursor(&["/nologo", "-W3", "kernel32.lib"]);
        assert_eq!(c.next_token(), Some(Token::Switch { flag: "nologo", raw: "/nologo" }));
        assert_eq!(c.next_token(), Some(Token::Switch { flag: "W3", raw: "-W3" }));
        assert_eq!(c.next_token(), Some(Token::Bare("kernel32.lib")));
        assert_eq!(c.next_token(), None);
    }

    #[test]
    fn argument_inline_or_next() {
        let mut c = cursor(&[r#""..\include""#, "/c"]);
        assert_eq!(c.argument("I", "inc").ok(), Some("inc"));
        assert_eq!(c.argument("I", "").ok(), Some(r"..\include"));
        assert_eq!(c.argument("I", r#""""#).ok(), Some("/c"));
        let err = c.argument("I", "").err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("Invalid link.exe I argument [] - Line 7"));
    }

    #[test]
    fn case_insensitive_prefixes() {
        assert_eq!(strip_prefix_ci("LIBPATH:dir", "libpath:"), Some("dir"));
        assert_eq!(strip_prefix_ci("lib", "libpath:"), None);
        assert_eq!(value_ci("out:", "out:"), None);
        assert_eq!(value_ci("OUT:a.exe", "out:"), Some("a.exe"));
        // Multi-byte text must not panic on a char boundary.
        assert_eq!(strip_prefix_ci("ä", "a"), None);
    }

    #[test]
    fn sizes() {
        assert_eq!(split_sizes("0x100000"), ("0x100000".to_string(), None));
        assert_eq!(
            split_sizes("0x100000,0x1000"),
            ("0x100000".to_string(), Some("0x1000".to_string()))
        );
    }

    #[test]
    fn machine_values() {
        let c = cursor(&[]);
        assert_eq!(machine("IX86", true, &c).ok(), Some(None));
        assert_eq!(machine("I386", false, &c).ok(), Some(Some("MachineX86")));
        assert_eq!(machine("ARM", true, &c).ok(), Some(Some("MachineARM")));
        assert_eq!(machine("ALPHA", false, &c).ok(), Some(None));
        let err = machine("vax", true, &c).err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("Invalid link.exe /machine: flag [vax] - Line 7"));
    }

    #[test]
    fn subsystem_values() {
        let c = cursor(&[]);
        assert_eq!(subsystem("windows", &c).ok(), Some(Subsystem::Named("Windows")));
        assert_eq!(subsystem("CONSOLE", &c).ok(), Some(Subsystem::Named("Console")));
        assert_eq!(subsystem("windows,4.0", &c).ok(), Some(Subsystem::Versioned));
        assert!(subsystem("efi,1.0", &c).is_err());
    }

    #[test]
    fn nodefaultlib_forms() {
        let c = cursor(&[]);
        assert_eq!(nodefaultlib("", &c).ok(), Some(DefaultLibraries::IgnoreAll));
        assert_eq!(
            nodefaultlib(":\"libc.lib\"", &c).ok(),
            Some(DefaultLibraries::Ignore("libc.lib"))
        );
        assert!(nodefaultlib("x", &c).is_err());
        assert!(nodefaultlib(":", &c).is_err());
    }
}
