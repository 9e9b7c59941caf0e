pub mod directive;
pub mod error;
pub mod filters;
pub mod flags;
pub mod ids;
pub mod logging;
pub mod model;
pub mod options;
pub mod parser;
pub mod targets;
pub mod tokenize;
pub mod writer;

use std::borrow::Cow;
use std::path::{Path, PathBuf};

pub use error::{ConvertError, ConvertResult};
pub use ids::{GuidSource, RandomGuids, SequentialGuids};
pub use model::Project;
pub use options::{ConvertOptions, DecodePolicy};
pub use parser::parse;
pub use writer::ConvertedProject;

/// Parse `source` and render both output documents.
///
/// # Example
/// ```
/// use dsp2vcxproj::{ConvertOptions, SequentialGuids, convert};
///
/// let dsp = [
///     r#"# Microsoft Developer Studio Project File - Name="demo" - Package Owner=<4>"#,
///     r#"# TARGTYPE "Win32 (x86) Console Application" 0x0103"#,
///     r#"!MESSAGE "demo - Win32 Release" (based on "Win32 (x86) Console Application")"#,
/// ]
/// .join("\r\n");
/// let out = convert(&dsp, &ConvertOptions::default(), &mut SequentialGuids::new()).unwrap();
/// assert!(out.project.contains("<ProjectConfiguration Include=\"Release|Win32\">"));
/// ```
pub fn convert(source: &str, options: &ConvertOptions, guids: &mut dyn GuidSource) -> ConvertResult<ConvertedProject> {
    let project = parse(source, options)?;
    writer::render(&project, options, guids)
}

/// Descriptor text from raw file bytes.  Bytes that are not UTF-8 (files
/// saved in an ANSI code page) are replaced, and a warning says so.
fn decode_source<'b>(bytes: &'b [u8], input: &Path) -> Cow<'b, str> {
    let source = String::from_utf8_lossy(bytes);
    if let Cow::Owned(_) = source {
        tracing::warn!(
            input = %input.display(),
            "file is not valid UTF-8; invalid bytes were replaced and paths may be damaged"
        );
    }
    source
}

/// `<dir>/<stem>.vcxproj` and `<dir>/<stem>.vcxproj.filters` for an input
/// descriptor path.
pub fn output_paths(input: impl AsRef<Path>) -> (PathBuf, PathBuf) {
    let project = input.as_ref().with_extension("vcxproj");
    let mut filters = project.clone().into_os_string();
    filters.push(".filters");
    (project, PathBuf::from(filters))
}

/// Convert the descriptor at `input` and write both documents beside it.
/// Nothing is written unless the whole conversion succeeds.
pub fn convert_file(input: impl AsRef<Path>, options: &ConvertOptions) -> ConvertResult<(PathBuf, PathBuf)> {
    let input = input.as_ref();
    let bytes = std::fs::read(input)?;
    let source = decode_source(&bytes, input);
    let converted = convert(&source, options, &mut RandomGuids)?;

    let (project, filters) = output_paths(input);
    converted.save(&project)?;
    tracing::info!(project = %project.display(), "wrote project");
    Ok((project, filters))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    #[test]
    fn output_paths_replace_extension() {
        let (project, filters) = output_paths(Path::new("legacy").join("calc.dsp"));
        assert_eq!(project, Path::new("legacy").join("calc.vcxproj"));
        assert_eq!(filters, Path::new("legacy").join("calc.vcxproj.filters"));
    }

    #[test]
    fn convert_file_writes_beside_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("calc.dsp");
        std::fs::copy("example.dsp", &input).expect("copy fixture");

        let (project, filters) = convert_file(&input, &ConvertOptions::default()).expect("convert");
        let project = std::fs::read_to_string(project).expect("project");
        let filters = std::fs::read_to_string(filters).expect("filters");
        assert!(roxmltree::Document::parse(&project).is_ok());
        assert!(filters.contains(r#"<Filter Include="Source Files\Parser">"#));
    }

    #[test]
    fn failed_conversion_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("notes.dsp");
        std::fs::write(&input, "just some text\r\n").expect("write");

        let err = convert_file(&input, &ConvertOptions::default()).expect_err("not a descriptor");
        assert!(matches!(err, ConvertError::InvalidInputFile));
        let (project, filters) = output_paths(&input);
        assert!(!project.exists());
        assert!(!filters.exists());
    }

    #[test]
    fn ansi_bytes_are_replaced_not_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("calc.dsp");
        let fixture = std::fs::read("example.dsp").expect("fixture");
        let marker = b"SOURCE=.\\ReadMe.txt";
        let at = fixture.windows(marker.len()).position(|w| w == marker).expect("marker");
        // `SOURCE=.\Übersicht.txt` saved in Windows-1252.
        let ansi: &[u8] = b"SOURCE=.\\\xdcbersicht.txt";
        let bytes = [&fixture[..at], ansi, &fixture[at + marker.len()..]].concat();
        std::fs::write(&input, &bytes).expect("write");

        let (project, _) = convert_file(&input, &ConvertOptions::default()).expect("convert");
        let project = std::fs::read_to_string(project).expect("project");
        assert!(project.contains("<Text Include=\".\\\u{fffd}bersicht.txt\" />"));
    }

    #[test]
    fn source_decoding_borrows_valid_utf8() {
        let path = Path::new("calc.dsp");
        assert!(matches!(decode_source("SOURCE=.\\\u{dc}bersicht.cpp".as_bytes(), path), Cow::Borrowed(_)));
        assert!(matches!(decode_source(b"SOURCE=.\\\xdcbersicht.cpp", path), Cow::Owned(_)));
    }

    /// Counts events whose message is `parsed project`.
    struct ParsedProjectEvents(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for ParsedProjectEvents {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
            struct Message(bool);
            impl tracing::field::Visit for Message {
                fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                    if field.name() == "message" && format!("{value:?}") == "parsed project" {
                        self.0 = true;
                    }
                }
            }
            let mut message = Message(false);
            event.record(&mut message);
            if message.0 {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn parse_summary_logged_once_per_conversion() {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(ParsedProjectEvents(Arc::clone(&count)));
        let source = std::fs::read_to_string("example.dsp").expect("fixture");

        tracing::subscriber::with_default(subscriber, || {
            convert(&source, &ConvertOptions::default(), &mut SequentialGuids::new()).expect("convert");
        });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_input_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = convert_file(dir.path().join("absent.dsp"), &ConvertOptions::default()).expect_err("missing");
        assert!(matches!(err, ConvertError::Io(_)));
    }
}
