//! `# ADD LIB32` lines (`lib.exe`).
//!
//! Switch names are matched case-insensitively and bare tokens are input
//! libraries, as for the linker.

use crate::error::{ConvertResult, Tool};
use crate::flags::{Cursor, DefaultLibraries, Subsystem, Token, linker, machine, nodefaultlib, subsystem};
use crate::targets::Targets;
use crate::tokenize::{tokenize, unquote};

/// Decode the flag text of one librarian line.
pub fn decode(flags: &str, line: usize, targets: &mut Targets<'_>) -> ConvertResult<()> {
    let mut cursor = Cursor::new(tokenize(flags), Tool::Librarian, line);
    let mut had_nologo = false;

    while let Some(token) = cursor.next_token() {
        match token {
            Token::Switch { flag, .. } if flag.eq_ignore_ascii_case("nologo") => had_nologo = true,
            Token::Switch { flag, raw } => switch(flag, raw, &cursor, targets)?,
            Token::Bare(library) => add!(targets.for_each_lib, additional_dependencies, unquote(library)),
        }
    }

    if !targets.has_file() && !had_nologo {
        set!(targets.for_each_lib, suppress_startup_banner, false);
    }
    Ok(())
}

fn switch(flag: &str, raw: &str, cursor: &Cursor<'_>, targets: &mut Targets<'_>) -> ConvertResult<()> {
    let lower = flag.to_ascii_lowercase();
    let value = |prefix: &str| unquote(&flag[prefix.len()..]);
    let has = |prefix: &str| lower.len() > prefix.len() && lower.starts_with(prefix);

    match lower.as_str() {
        "def" => add!(targets.for_each_lib, additional_options, raw),
        _ if has("def:") => set!(targets.for_each_lib, module_definition_file, value("def:")),
        l if l.starts_with("def") => return Err(cursor.invalid(Some("/def"), &flag["def".len()..])),
        _ if has("export:") => add!(targets.for_each_lib, export_named_functions, value("export:")),
        _ if has("include:") => set!(targets.for_each_lib, force_symbol_references, value("include:")),
        _ if has("libpath:") => add!(targets.for_each_lib, additional_library_directories, value("libpath:")),
        _ if has("machine:") => {
            if let Some(target) = machine(&flag["machine:".len()..], targets.is_default_platform(), cursor)? {
                set!(targets.for_each_lib, target_machine, target);
            }
        }
        _ if has("name:") => set!(targets.for_each_lib, name, value("name:")),
        l if l.starts_with("nodefaultlib") => match nodefaultlib(&flag["nodefaultlib".len()..], cursor)? {
            DefaultLibraries::IgnoreAll => set!(targets.for_each_lib, ignore_all_default_libraries, true),
            DefaultLibraries::Ignore(library) => {
                add!(targets.for_each_lib, ignore_specific_default_libraries, library);
            }
        },
        _ if has("out:") => {
            let file = value("out:");
            if file != linker::DEFAULT_OUTPUT_FILE {
                set!(targets.for_each_lib, output_file, file);
            }
        }
        _ if has("remove:") => add!(targets.for_each_lib, remove_objects, value("remove:")),
        _ if has("subsystem:") => match subsystem(&flag["subsystem:".len()..], cursor)? {
            Subsystem::Named(name) => set!(targets.for_each_lib, sub_system, name),
            Subsystem::Versioned => add!(targets.for_each_lib, additional_options, raw),
        },
        "verbose" => set!(targets.for_each_lib, verbose, true),
        _ if has("extract:") => add!(targets.for_each_lib, additional_options, raw),
        l if l.starts_with("list") || l == "convert" || l == "link50compat" || l.starts_with("debugtype:") => {
            tracing::trace!(flag = raw, "librarian switch dropped");
        }
        _ => return Err(cursor.invalid(None, raw)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Lib, ProjectConfiguration};
    use crate::options::ConvertOptions;
    use crate::targets::TargetSet;

    fn run_on(mut configs: Vec<ProjectConfiguration>, flags: &str) -> ConvertResult<Lib> {
        let options = ConvertOptions::default();
        let mut targets = Targets::new(&mut configs, None, TargetSet::All, Some(0), &options);
        decode(flags, 30, &mut targets)?;
        Ok(configs.remove(0).properties.lib)
    }

    fn lib(flags: &str) -> Lib {
        run_on(vec![ProjectConfiguration::new("Release", "Win32")], flags).expect("decode")
    }

    fn error(flags: &str) -> String {
        run_on(vec![ProjectConfiguration::new("Release", "Win32")], flags)
            .expect_err("should fail")
            .to_string()
    }

    #[test]
    fn nologo_rule() {
        assert_eq!(lib("").suppress_startup_banner, Some(false));
        assert_eq!(lib("/NOLOGO").suppress_startup_banner, None);
    }

    #[test]
    fn output_and_default_output() {
        assert_eq!(lib(r#"/nologo /out:"Release\core.lib""#).output_file.as_deref(), Some(r"Release\core.lib"));
        assert_eq!(lib("/nologo /out:$(OutDir)$(TargetName)$(TargetExt)").output_file, None);
    }

    #[test]
    fn module_definition_forms() {
        assert_eq!(lib("/nologo /def:core.def").module_definition_file.as_deref(), Some("core.def"));
        assert!(lib("/nologo /def").additional_options.contains("/def"));
        assert_eq!(error("/defx"), "Invalid lib.exe /def flag [x] - Line 30");
    }

    #[test]
    fn bare_tokens_and_default_libraries() {
        let bag = lib("/nologo kernel32.lib zlib.lib /nodefaultlib:libc.lib");
        assert_eq!(bag.additional_dependencies.len(), 2);
        assert_eq!(
            bag.properties(),
            vec![
                ("AdditionalDependencies", "zlib.lib;%(AdditionalDependencies)".to_string()),
                ("IgnoreSpecificDefaultLibraries", "libc.lib;%(IgnoreSpecificDefaultLibraries)".to_string()),
            ]
        );
    }

    #[test]
    fn machine_and_subsystem() {
        assert_eq!(lib("/nologo /machine:I386").target_machine, None);
        let bag = run_on(vec![ProjectConfiguration::new("Release", "x64")], "/nologo /machine:x86").expect("decode");
        assert_eq!(bag.target_machine.as_deref(), Some("MachineX86"));

        assert_eq!(lib("/nologo /subsystem:native").sub_system.as_deref(), Some("Native"));
        assert!(lib("/nologo /SUBSYSTEM:windows,5.01").additional_options.contains("/SUBSYSTEM:windows,5.01"));
    }

    #[test]
    fn lists_and_scalars() {
        let bag = lib("/nologo /export:Init /export:Run /remove:a.obj /include:_main /name:core /libpath:lib /verbose");
        assert_eq!(bag.export_named_functions.iter().collect::<Vec<_>>(), vec!["Init", "Run"]);
        assert!(bag.remove_objects.contains("a.obj"));
        assert_eq!(bag.force_symbol_references.as_deref(), Some("_main"));
        assert_eq!(bag.name.as_deref(), Some("core"));
        assert!(bag.additional_library_directories.contains("lib"));
        assert_eq!(bag.verbose, Some(true));
    }

    #[test]
    fn dropped_and_verbatim_switches() {
        let bag = lib("/nologo /list /convert /debugtype:cv /link50compat /extract:a.obj");
        assert_eq!(bag.additional_options.iter().collect::<Vec<_>>(), vec!["/extract:a.obj"]);
        assert_eq!(bag.properties().len(), 1);
    }

    #[test]
    fn unknown_switch() {
        assert_eq!(error("/ltcg"), "Invalid lib.exe flag [/ltcg] - Line 30");
    }
}
