//! Errors raised while converting a `.dsp` file.
//!
//! Every decode error names the tool (or `# PROP` property) that rejected the
//! input, the offending text, and the 1-based line it was found on.  The
//! rendered message keeps the familiar shape
//! `Invalid cl.exe /EH flag [q] - Line 12`.

use thiserror::Error;

/// Name of a flag-decoding tool, as it appears in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Compiler,
    Linker,
    Librarian,
    ResourceCompiler,
}

impl Tool {
    pub fn program(self) -> &'static str {
        match self {
            Tool::Compiler => "cl.exe",
            Tool::Linker => "link.exe",
            Tool::Librarian => "lib.exe",
            Tool::ResourceCompiler => "rc.exe",
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program())
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("The given file did not appear to be a DSP file.")]
    InvalidInputFile,

    #[error("Invalid target type [{value}] - Line {line}")]
    InvalidTargetType { value: String, line: usize },

    #[error("Invalid configuration label [{label}] - Line {line}")]
    InvalidConfigurationLabel { label: String, line: usize },

    /// A bare token where a flag was required, or a bad `# PROP` value.
    #[error("Invalid {name} argument [{argument}] - Line {line}")]
    InvalidArgument {
        name: String,
        argument: String,
        line: usize,
    },

    #[error("Invalid {tool}{} flag [{flag}] - Line {line}", display_prefix(.prefix))]
    InvalidFlag {
        tool: Tool,
        prefix: Option<&'static str>,
        flag: String,
        line: usize,
    },

    #[error("Invalid {tool} {flag} argument [{argument}] - Line {line}")]
    InvalidFlagArgument {
        tool: Tool,
        flag: String,
        argument: String,
        line: usize,
    },

    #[error("generated {document} document is not well-formed XML: {source}")]
    MalformedOutput {
        document: &'static str,
        #[source]
        source: roxmltree::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    pub(crate) fn flag(
        tool: Tool,
        prefix: Option<&'static str>,
        flag: impl Into<String>,
        line: usize,
    ) -> Self {
        Self::InvalidFlag { tool, prefix, flag: flag.into(), line }
    }

    pub(crate) fn argument(name: impl Into<String>, argument: impl Into<String>, line: usize) -> Self {
        Self::InvalidArgument { name: name.into(), argument: argument.into(), line }
    }

    /// The 1-based source line the error refers to, when there is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidTargetType { line, .. }
            | Self::InvalidConfigurationLabel { line, .. }
            | Self::InvalidArgument { line, .. }
            | Self::InvalidFlag { line, .. }
            | Self::InvalidFlagArgument { line, .. } => Some(*line),
            Self::InvalidInputFile | Self::MalformedOutput { .. } | Self::Io(_) => None,
        }
    }
}

fn display_prefix(prefix: &Option<&'static str>) -> String {
    prefix.map(|p| format!(" {p}")).unwrap_or_default()
}

pub type ConvertResult<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_message_with_prefix() {
        let err = ConvertError::flag(Tool::Compiler, Some("/EH"), "q", 12);
        assert_eq!(err.to_string(), "Invalid cl.exe /EH flag [q] - Line 12");
    }

    #[test]
    fn flag_message_without_prefix() {
        let err = ConvertError::flag(Tool::Linker, None, "/bogus", 3);
        assert_eq!(err.to_string(), "Invalid link.exe flag [/bogus] - Line 3");
    }

    #[test]
    fn argument_message_names_property() {
        let err = ConvertError::argument("Use_MFC", "9", 40);
        assert_eq!(err.to_string(), "Invalid Use_MFC argument [9] - Line 40");
        assert_eq!(err.line(), Some(40));
    }

    #[test]
    fn input_file_error_has_no_line() {
        assert_eq!(ConvertError::InvalidInputFile.line(), None);
    }
}
