//! Single pass over the lines of a `.dsp` file.
//!
//! The parser owns the [`Project`] being built and a [`ParseContext`] that
//! records where in the file it is: which configuration branch is open,
//! which source file is being declared, which folder groups are open and
//! whether a custom build step is being read.  Every line is classified by
//! [`classify`] and routed to the property bags selected by [`Targets`].

use crate::directive::{Directive, EventField, ToolLine, classify, label_key, split_label};
use crate::error::{ConvertError, ConvertResult};
use crate::filters::GroupStack;
use crate::flags::{compiler, librarian, linker, resource};
use crate::model::{ConfigurationType, Project, ProjectConfiguration, SourceFile};
use crate::options::{ConvertOptions, DecodePolicy};
use crate::targets::{TargetSet, Targets};
use crate::tokenize::{tokenize, unquote};

/// Message Visual C++ writes when a custom build step has no description.
const PLACEHOLDER_MESSAGE: &str = "Performing Custom Build Step";

/// Line separator for multi-line commands.
const NEWLINE: &str = "\r\n";

/// Position inside a `# Begin Custom Build` block.  A blank line switches
/// between the declarations and the command body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum CustomBuild {
    #[default]
    Outside,
    Declarations,
    Body,
}

impl CustomBuild {
    fn toggle(self) -> Self {
        match self {
            CustomBuild::Outside => CustomBuild::Outside,
            CustomBuild::Declarations => CustomBuild::Body,
            CustomBuild::Body => CustomBuild::Declarations,
        }
    }
}

/// Where the parser is in the file.
#[derive(Debug, Default)]
struct ParseContext {
    /// 1-based number of the line being processed.
    line: usize,
    signature_seen: bool,
    /// Configuration of the open `!IF` / `!ELSEIF` branch.
    branch: Option<usize>,
    /// Most recently resolved configuration; outlives its branch.
    last_resolved: Option<usize>,
    current_file: Option<SourceFile>,
    groups: GroupStack,
    custom_build: CustomBuild,
    in_target: bool,
}

struct DspParser<'o> {
    options: &'o ConvertOptions,
    project: Project,
    ctx: ParseContext,
}

/// Parse the text of a `.dsp` file.
///
/// Fails with [`ConvertError::InvalidInputFile`] when the first non-blank
/// line is not a project signature.  Decode errors abort the parse unless
/// the options select [`DecodePolicy::SkipAndWarn`].
pub fn parse(source: &str, options: &ConvertOptions) -> ConvertResult<Project> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut parser = DspParser { options, project: Project::default(), ctx: ParseContext::default() };

    for (index, line) in source.lines().enumerate() {
        parser.ctx.line = index + 1;
        match parser.line(line) {
            Ok(()) => {}
            Err(error) if options.decode_policy() == DecodePolicy::SkipAndWarn && error.line().is_some() => {
                tracing::warn!(%error, "line skipped");
            }
            Err(error) => return Err(error),
        }
    }
    parser.finish()
}

impl DspParser<'_> {
    /// The bags the current line writes to.
    fn targets(&mut self) -> Targets<'_> {
        let declared = (!self.project.configurations.is_empty()).then_some(0);
        let reference = self.ctx.branch.or(self.ctx.last_resolved).or(declared);
        Targets::new(
            &mut self.project.configurations,
            self.ctx.current_file.as_mut(),
            TargetSet::resolve(self.ctx.branch),
            reference,
            self.options,
        )
    }

    fn line(&mut self, line: &str) -> ConvertResult<()> {
        if line.trim().is_empty() {
            self.ctx.custom_build = self.ctx.custom_build.toggle();
            return Ok(());
        }

        if !self.ctx.signature_seen {
            return match classify(line) {
                Some(Directive::Signature(namespace)) => {
                    self.ctx.signature_seen = true;
                    self.project.root_namespace = namespace.to_string();
                    Ok(())
                }
                _ => Err(ConvertError::InvalidInputFile),
            };
        }

        if self.ctx.custom_build == CustomBuild::Body {
            return match classify(line) {
                Some(Directive::EndCustomBuild) => {
                    self.ctx.custom_build = CustomBuild::Outside;
                    Ok(())
                }
                _ => {
                    self.custom_build_body(line);
                    Ok(())
                }
            };
        }

        match classify(line) {
            Some(directive) => self.directive(directive),
            None => Ok(()),
        }
    }

    fn directive(&mut self, directive: Directive<'_>) -> ConvertResult<()> {
        let line = self.ctx.line;
        match directive {
            Directive::Signature(namespace) => self.project.root_namespace = namespace.to_string(),
            Directive::TargetType(code) => {
                let kind = strip_hex(code)
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .and_then(ConfigurationType::from_code)
                    .ok_or_else(|| ConvertError::InvalidTargetType { value: code.to_string(), line })?;
                self.project.configuration_type = Some(kind);
            }
            Directive::Message(label) => self.declare_configuration(label)?,
            Directive::Branch(label) => {
                let index = label_key(label)
                    .and_then(|key| self.project.configuration_index(key))
                    .ok_or_else(|| ConvertError::InvalidConfigurationLabel { label: label.to_string(), line })?;
                tracing::debug!(line, configuration = label, "enter branch");
                self.ctx.branch = Some(index);
                self.ctx.last_resolved = Some(index);
            }
            Directive::EndIf => self.ctx.branch = None,
            Directive::Prop(text) => self.property(text)?,
            Directive::Add { tool, flags } => {
                let mut targets = self.targets();
                match tool {
                    ToolLine::Cpp => compiler::decode(flags, line, &mut targets)?,
                    ToolLine::Link32 => linker::decode(flags, line, &mut targets)?,
                    ToolLine::Lib32 => librarian::decode(flags, line, &mut targets)?,
                    ToolLine::Rsc => resource::decode(flags, line, &mut targets)?,
                }
            }
            Directive::Event { field, text } => self.event(field, text),
            Directive::BeginCustomBuild(message) => {
                let message = message.map(str::trim).filter(|m| !m.is_empty() && *m != PLACEHOLDER_MESSAGE);
                if let Some(message) = message {
                    self.targets()
                        .for_each_configuration(|p| p.custom_build_step.message = Some(message.to_string()));
                }
                self.ctx.custom_build = CustomBuild::Declarations;
            }
            Directive::EndCustomBuild => self.ctx.custom_build = CustomBuild::Outside,
            Directive::BeginTarget => self.ctx.in_target = true,
            Directive::BeginGroup(name) => self.ctx.groups.open(name),
            Directive::EndGroup => {
                if !self.ctx.groups.close() {
                    tracing::warn!(line, "`# End Group` without an open group");
                }
            }
            Directive::Source(path) if self.ctx.in_target && self.ctx.custom_build == CustomBuild::Outside => {
                let filter = self.ctx.groups.current().map(str::to_string);
                let file = SourceFile::new(path, filter, self.project.configurations.len());
                tracing::debug!(line, path, kind = file.kind.element_name(), "source file");
                if let Some(unfinished) = self.ctx.current_file.replace(file) {
                    tracing::warn!(path = %unfinished.path, "source file never ended; dropped");
                }
                // A new file starts outside any branch.
                self.ctx.branch = None;
            }
            Directive::Source(_) => {}
            Directive::EndSourceFile => {
                if let Some(file) = self.ctx.current_file.take() {
                    self.project.files.push(file);
                }
                self.ctx.branch = None;
            }
        }
        Ok(())
    }

    fn declare_configuration(&mut self, label: &str) -> ConvertResult<()> {
        let invalid = || ConvertError::InvalidConfigurationLabel { label: label.to_string(), line: self.ctx.line };
        let (platform, configuration) = split_label(label).ok_or_else(invalid)?;
        let declared = ProjectConfiguration::new(configuration, platform);
        if self.project.configuration_index(&declared.key()).is_some() {
            return Err(invalid());
        }
        tracing::debug!(configuration = %declared.include(), "configuration declared");
        self.project.configurations.push(declared);
        Ok(())
    }

    /// `# PROP <name> <value>`.  `# PROP BASE` lines and unknown names are
    /// ignored.
    fn property(&mut self, text: &str) -> ConvertResult<()> {
        let tokens = tokenize(text);
        let Some((&name, rest)) = tokens.split_first() else {
            return Ok(());
        };
        let value = rest.first().copied().map(unquote).unwrap_or("");
        let line = self.ctx.line;
        let invalid = || ConvertError::argument(name, value, line);

        match name {
            "Use_MFC" => {
                let mfc = match value {
                    "0" => return Ok(()),
                    "1" | "5" => "Static",
                    "2" | "6" => "Dynamic",
                    _ => return Err(invalid()),
                };
                self.targets()
                    .for_each_configuration(|p| p.use_of_mfc = Some(mfc.to_string()));
            }
            "Use_Debug_Libraries" => match value {
                "0" => {}
                "1" => self.targets().for_each_configuration(|p| p.use_debug_libraries = Some(true)),
                _ => return Err(invalid()),
            },
            "Output_Dir" => self.targets().for_each_configuration(|p| p.out_dir = Some(value.to_string())),
            "Intermediate_Dir" => self.targets().for_each_configuration(|p| p.int_dir = Some(value.to_string())),
            "Default_Filter" => self.ctx.groups.set_extensions(value),
            "Exclude_From_Build" => match value {
                "0" => {}
                "1" => self.targets().for_each_compiler(|cl| cl.excluded_from_build = Some(true)),
                _ => return Err(invalid()),
            },
            _ => tracing::trace!(line, property = name, "property ignored"),
        }
        Ok(())
    }

    fn event(&mut self, field: EventField, text: &str) {
        let command = text.replace('\t', NEWLINE);
        let mut targets = self.targets();
        match field {
            EventField::PreLinkDescription => {
                targets.for_each_configuration(|p| p.pre_link_event.message = Some(text.to_string()));
            }
            EventField::PreLinkCommands => {
                targets.for_each_configuration(|p| p.pre_link_event.command = Some(command.clone()));
            }
            EventField::PostBuildDescription => {
                targets.for_each_configuration(|p| p.post_build_event.message = Some(text.to_string()));
            }
            EventField::PostBuildCommands => {
                targets.for_each_configuration(|p| p.post_build_event.command = Some(command.clone()));
            }
        }
    }

    /// A line of the custom build body: a tab-indented command, or the
    /// `"<output>" : <dependencies>` rule line.
    fn custom_build_body(&mut self, line: &str) {
        if let Some(command) = line.strip_prefix('\t') {
            self.targets().for_each_configuration(|p| {
                let step = &mut p.custom_build_step;
                step.command = Some(match step.command.take() {
                    Some(existing) if !existing.is_empty() => format!("{existing}{NEWLINE}{command}"),
                    _ => command.to_string(),
                });
            });
            return;
        }
        match line.find(" : ") {
            Some(colon) if colon > 0 => {
                let outputs = line[..colon].trim_matches('"');
                self.targets()
                    .for_each_configuration(|p| p.custom_build_step.outputs = Some(outputs.to_string()));
            }
            _ => tracing::trace!(line = self.ctx.line, "custom build line without outputs skipped"),
        }
    }

    fn finish(mut self) -> ConvertResult<Project> {
        if !self.ctx.signature_seen {
            return Err(ConvertError::InvalidInputFile);
        }
        if let Some(file) = self.ctx.current_file.take() {
            tracing::warn!(path = %file.path, "source file never ended; dropped");
        }
        self.project.filters = self.ctx.groups.finish();
        tracing::debug!(
            configurations = self.project.configurations.len(),
            files = self.project.files.len(),
            filters = self.project.filters.len(),
            "parsed project"
        );
        Ok(self.project)
    }
}

/// The hex digits of a `0x`-prefixed target type code.
fn strip_hex(code: &str) -> Option<&str> {
    code.strip_prefix("0x")
        .or_else(|| code.strip_prefix("0X"))
        .filter(|digits| !digits.is_empty())
}
