//! `# ADD RSC` lines (`rc.exe`).
//!
//! Switches are single letters (plus `/fo`) matched case-insensitively.  The
//! value may be attached or follow as the next token.

use crate::error::{ConvertError, ConvertResult, Tool};
use crate::flags::{Cursor, Token, strip_prefix_ci};
use crate::targets::Targets;
use crate::tokenize::tokenize;

const DEFAULT_OUTPUT: &str = "$(IntDir)%(Filename).res";

/// Decode the flag text of one resource compiler line.
pub fn decode(flags: &str, line: usize, targets: &mut Targets<'_>) -> ConvertResult<()> {
    let mut cursor = Cursor::new(tokenize(flags), Tool::ResourceCompiler, line);
    while let Some(token) = cursor.next_token() {
        match token {
            Token::Switch { flag, raw } => switch(flag, raw, &mut cursor, targets)?,
            Token::Bare(arg) => {
                return Err(ConvertError::argument(Tool::ResourceCompiler.program(), arg, line));
            }
        }
    }
    Ok(())
}

fn switch<'t>(flag: &'t str, raw: &'t str, cursor: &mut Cursor<'t>, targets: &mut Targets<'_>) -> ConvertResult<()> {
    let Some(first) = flag.chars().next() else {
        return Err(cursor.invalid(None, flag));
    };
    let rest = &flag[first.len_utf8()..];

    if let Some(file) = strip_prefix_ci(flag, "fo") {
        let file = cursor.argument("/fo", file)?;
        if file != DEFAULT_OUTPUT {
            set!(targets.for_each_resource, resource_output_file_name, file);
        }
        return Ok(());
    }

    match first.to_ascii_lowercase() {
        'c' => {
            let page = cursor.argument("/c", rest)?;
            add!(targets.for_each_resource, additional_options, format!("/c{page}"));
        }
        'd' => {
            let name = cursor.argument("/d", rest)?;
            add!(targets.for_each_resource, preprocessor_definitions, name);
        }
        'i' => {
            let dir = cursor.argument("/i", rest)?;
            add!(targets.for_each_resource, additional_include_directories, dir);
        }
        'l' => {
            let value = cursor.argument("/l", rest)?;
            culture(value, cursor, targets)?;
        }
        'u' => {
            let name = cursor.argument("/u", rest)?;
            add!(targets.for_each_resource, undefine_preprocessor_definitions, name);
        }
        'n' if rest.is_empty() => set!(targets.for_each_resource, null_terminate_strings, true),
        'v' if rest.is_empty() => set!(targets.for_each_resource, show_progress, true),
        'x' if rest.is_empty() => set!(targets.for_each_resource, ignore_standard_include_path, true),
        'w' if rest.is_empty() => add!(targets.for_each_resource, additional_options, raw),
        'r' if rest.is_empty() => {}
        _ => return Err(cursor.invalid(None, flag)),
    }
    Ok(())
}

/// `/l <hex>`: written as `0x0407` unless it is the host culture.
fn culture(value: &str, cursor: &Cursor<'_>, targets: &mut Targets<'_>) -> ConvertResult<()> {
    let digits = strip_prefix_ci(value, "0x").unwrap_or(value);
    let code = u32::from_str_radix(digits, 16).map_err(|_| ConvertError::InvalidFlagArgument {
        tool: Tool::ResourceCompiler,
        flag: "/l".to_string(),
        argument: value.to_string(),
        line: cursor.line(),
    })?;
    if code != targets.options().culture() {
        set!(targets.for_each_resource, culture, format!("0x{code:04x}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProjectConfiguration, ResourceCompile, SourceFile};
    use crate::options::ConvertOptions;
    use crate::targets::TargetSet;

    fn run_with(options: &ConvertOptions, flags: &str) -> ConvertResult<ResourceCompile> {
        let mut configs = vec![ProjectConfiguration::new("Release", "Win32")];
        let mut targets = Targets::new(&mut configs, None, TargetSet::All, Some(0), options);
        decode(flags, 50, &mut targets)?;
        Ok(configs.remove(0).properties.resource_compile)
    }

    fn rc(flags: &str) -> ResourceCompile {
        run_with(&ConvertOptions::default(), flags).expect("decode")
    }

    fn error(flags: &str) -> String {
        run_with(&ConvertOptions::default(), flags)
            .expect_err("should fail")
            .to_string()
    }

    #[test]
    fn default_culture_is_omitted() {
        assert_eq!(rc("/l 0x409 /d NDEBUG").culture, None);
        assert_eq!(rc("/l0x407").culture.as_deref(), Some("0x0407"));
        assert_eq!(rc("/L 809").culture.as_deref(), Some("0x0809"));
    }

    #[test]
    fn host_culture_is_configurable() {
        let options = ConvertOptions::new().default_culture(0x0407);
        let bag = run_with(&options, "/l 0x407").expect("decode");
        assert_eq!(bag.culture, None);
        let bag = run_with(&options, "/l 0x409").expect("decode");
        assert_eq!(bag.culture.as_deref(), Some("0x0409"));
    }

    #[test]
    fn bad_culture_is_invalid_argument() {
        assert_eq!(error("/l english"), "Invalid rc.exe /l argument [english] - Line 50");
    }

    #[test]
    fn definitions_and_directories() {
        let bag = rc(r#"/d "_DEBUG" /dAFX /i "..\res" /u OLD"#);
        assert_eq!(bag.preprocessor_definitions.iter().collect::<Vec<_>>(), vec!["_DEBUG", "AFX"]);
        assert!(bag.additional_include_directories.contains(r"..\res"));
        assert!(bag.undefine_preprocessor_definitions.contains("OLD"));
    }

    #[test]
    fn output_file() {
        assert_eq!(rc(r#"/fo"$(IntDir)%(Filename).res""#).resource_output_file_name, None);
        assert_eq!(rc("/fo Release/app.res").resource_output_file_name.as_deref(), Some("Release/app.res"));
    }

    #[test]
    fn switches() {
        let bag = rc("/n /v /x /w /r /c 1252");
        assert_eq!(bag.null_terminate_strings, Some(true));
        assert_eq!(bag.show_progress, Some(true));
        assert_eq!(bag.ignore_standard_include_path, Some(true));
        assert_eq!(bag.additional_options.iter().collect::<Vec<_>>(), vec!["/w", "/c1252"]);
    }

    #[test]
    fn file_scope_targets_resource_variant() {
        let options = ConvertOptions::default();
        let mut configs = vec![ProjectConfiguration::new("Release", "Win32")];
        let mut file = SourceFile::new(r".\app.rc", None, 1);
        let mut targets = Targets::new(&mut configs, Some(&mut file), TargetSet::All, Some(0), &options);
        decode("/d EXTRA", 1, &mut targets).expect("decode");
        assert!(configs[0].properties.resource_compile.preprocessor_definitions.is_empty());
        assert_eq!(
            file.variants[0].properties(),
            vec![("PreprocessorDefinitions", "EXTRA;%(PreprocessorDefinitions)".to_string())]
        );
    }

    #[test]
    fn errors() {
        assert_eq!(error("app.rc"), "Invalid rc.exe argument [app.rc] - Line 50");
        assert_eq!(error("/nx"), "Invalid rc.exe flag [nx] - Line 50");
        assert_eq!(error("/d"), "Invalid rc.exe /d argument [] - Line 50");
    }
}
