//! Line-level grammar of `.dsp` files.
//!
//! Each non-blank line outside a custom-build body is classified into one
//! [`Directive`].  Lines that match nothing are meaningless to the converter
//! (NMAKE boilerplate, `# Name` lines, `CFG=` assignments ...) and yield
//! `None`.
//!
//! ```text
//! signature   = "# Microsoft Developer Studio Project File - Name=" quoted ANY*
//! targtype    = "# TARGTYPE" ANY*
//! message     = "!MESSAGE " quoted ANY*
//! branch      = ("!IF" | "!ELSEIF") ws '"$(CFG)"' ws "==" ws quoted
//! endif       = "!ENDIF" ANY*
//! prop        = "# PROP" ws ANY+
//! add         = "# ADD" ws ("BASE" ws)? tool ws? ANY*
//! event       = ("PreLink_Desc=" | "PreLink_Cmds=" | "PostBuild_Desc=" | "PostBuild_Cmds=") ANY*
//! custom      = "# Begin Custom Build" (" - " ANY*)?
//! group       = "# Begin Group " ANY*
//! source      = "SOURCE=" ANY*
//! ```

use chumsky::prelude::*;

/// Which tool an `# ADD` line configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolLine {
    Cpp,
    Link32,
    Lib32,
    Rsc,
}

/// Pre-link and post-build event fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventField {
    PreLinkDescription,
    PreLinkCommands,
    PostBuildDescription,
    PostBuildCommands,
}

/// A classified `.dsp` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
    /// Root namespace from the header line.
    Signature(&'a str),
    /// Last token of a `# TARGTYPE` line, e.g. `0x0101`.
    TargetType(&'a str),
    /// Configuration label of an enumeration line: `Foo - Win32 Debug`.
    Message(&'a str),
    /// Label of an `!IF` or `!ELSEIF` branch.
    Branch(&'a str),
    EndIf,
    /// Everything after `# PROP `.
    Prop(&'a str),
    /// A tool line and its flag text.
    Add { tool: ToolLine, flags: &'a str },
    Event { field: EventField, text: &'a str },
    /// `# Begin Custom Build`, with the text after ` - ` if present.
    BeginCustomBuild(Option<&'a str>),
    EndCustomBuild,
    BeginTarget,
    /// Group name with surrounding quotes removed.
    BeginGroup(&'a str),
    EndGroup,
    /// Path of a `SOURCE=` line, quotes removed.
    Source(&'a str),
    EndSourceFile,
}

type Extra<'a> = extra::Err<Simple<'a, char>>;

fn rest<'a>() -> impl Parser<'a, &'a str, &'a str, Extra<'a>> + Clone {
    any().repeated().to_slice()
}

fn quoted<'a>() -> impl Parser<'a, &'a str, &'a str, Extra<'a>> + Clone {
    just('"')
        .ignore_then(none_of('"').repeated().to_slice())
        .then_ignore(just('"'))
}

fn directive_parser<'a>() -> impl Parser<'a, &'a str, Directive<'a>, Extra<'a>> {
    let signature = just("# Microsoft Developer Studio Project File - Name=")
        .ignore_then(quoted())
        .then_ignore(rest())
        .map(Directive::Signature);

    let target_type = just("# TARGTYPE")
        .ignore_then(rest())
        .map(|r: &str| Directive::TargetType(r.split_whitespace().last().unwrap_or("")));

    let message = just("!MESSAGE ")
        .ignore_then(quoted())
        .then_ignore(rest())
        .map(Directive::Message);

    let branch = choice((just("!IF"), just("!ELSEIF")))
        .then(text::inline_whitespace())
        .then(just("\"$(CFG)\""))
        .then(text::inline_whitespace())
        .then(just("=="))
        .then(text::inline_whitespace())
        .ignore_then(quoted())
        .then_ignore(rest())
        .map(Directive::Branch);

    let end_if = just("!ENDIF").then(rest()).to(Directive::EndIf);

    let prop = just("# PROP")
        .then(text::inline_whitespace().at_least(1))
        .ignore_then(rest().filter(|r: &&str| !r.trim().is_empty()))
        .map(Directive::Prop);

    let tool = choice((
        just("CPP").to(ToolLine::Cpp),
        just("LINK32").to(ToolLine::Link32),
        just("LIB32").to(ToolLine::Lib32),
        just("RSC").to(ToolLine::Rsc),
    ));
    let add = just("# ADD")
        .then(text::inline_whitespace().at_least(1))
        .then(just("BASE").then(text::inline_whitespace().at_least(1)).or_not())
        .ignore_then(tool)
        .then(
            text::inline_whitespace()
                .at_least(1)
                .ignore_then(rest())
                .or_not(),
        )
        .map(|(tool, flags)| Directive::Add { tool, flags: flags.unwrap_or("") });

    let event = choice((
        just("PreLink_Desc=").to(EventField::PreLinkDescription),
        just("PreLink_Cmds=").to(EventField::PreLinkCommands),
        just("PostBuild_Desc=").to(EventField::PostBuildDescription),
        just("PostBuild_Cmds=").to(EventField::PostBuildCommands),
    ))
    .then(rest())
    .map(|(field, text)| Directive::Event { field, text });

    let begin_custom = just("# Begin Custom Build")
        .ignore_then(just(" - ").ignore_then(rest()).or_not())
        .then_ignore(rest())
        .map(Directive::BeginCustomBuild);

    let end_custom = just("# End Custom Build").then(end()).to(Directive::EndCustomBuild);
    let begin_target = just("# Begin Target").then(end()).to(Directive::BeginTarget);

    let begin_group = just("# Begin Group ")
        .ignore_then(rest())
        .map(|name: &str| Directive::BeginGroup(name.trim_matches('"')));
    let end_group = just("# End Group").then(end()).to(Directive::EndGroup);

    let source = just("SOURCE=")
        .ignore_then(rest())
        .map(|path: &str| Directive::Source(path.trim_matches('"')));
    let end_source = just("# End Source File").then(end()).to(Directive::EndSourceFile);

    choice((
        signature,
        target_type,
        message,
        branch,
        end_if,
        prop,
        add,
        event,
        begin_custom,
        end_custom,
        begin_target,
        begin_group,
        end_group,
        source,
        end_source,
    ))
}

/// Classify one line.  Trailing whitespace is ignored.
pub fn classify(line: &str) -> Option<Directive<'_>> {
    directive_parser().parse(line.trim_end()).into_result().ok()
}

/// Split a configuration label `Foo - Win32 Debug` into `(platform,
/// configuration)`: `("Win32", "Debug")`.
pub fn split_label(label: &str) -> Option<(&str, &str)> {
    let (_, pair) = label.split_once(" - ")?;
    let (platform, configuration) = pair.split_once(' ')?;
    let configuration = configuration.trim();
    if platform.is_empty() || configuration.is_empty() {
        return None;
    }
    Some((platform, configuration))
}

/// The `"<platform> <configuration>"` lookup key of a branch label.
pub fn label_key(label: &str) -> Option<&str> {
    label.split_once(" - ").map(|(_, key)| key).filter(|k| !k.is_empty())
}
