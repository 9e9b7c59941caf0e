//! `# ADD LINK32` lines (`link.exe`).
//!
//! Switch names are matched case-insensitively.  Bare tokens are libraries to
//! link against.  Settings land on the configuration-level `Link` bag of the
//! targeted configurations; `link.exe` has no per-file settings.

use crate::error::{ConvertResult, Tool};
use crate::flags::{
    Cursor, DefaultLibraries, Subsystem, Token, machine, nodefaultlib, split_sizes, strip_prefix_ci, subsystem, value_ci,
};
use crate::targets::Targets;
use crate::tokenize::{tokenize, unquote};

pub(crate) const DEFAULT_OUTPUT_FILE: &str = "$(OutDir)$(TargetName)$(TargetExt)";
const DEFAULT_IMPORT_LIBRARY: &str = "$(OutDir)$(TargetName).lib";
const DEFAULT_PROGRAM_DATABASE: &str = "$(OutDir)$(TargetName).pdb";

/// Switches that no longer exist; matched by prefix unless listed as exact.
const OBSOLETE_PREFIXES: [&str; 6] = ["comment:", "debugtype:", "gpsize:", "pdbtype:", "warn:", "windowsce:"];
const OBSOLETE_EXACT: [&str; 5] = ["exetype:dynamic", "link50compat", "vxd", "ws:aggresive", "ws:aggressive"];

/// Decode the flag text of one linker line.
pub fn decode(flags: &str, line: usize, targets: &mut Targets<'_>) -> ConvertResult<()> {
    let mut cursor = Cursor::new(tokenize(flags), Tool::Linker, line);
    let mut had_nologo = false;

    while let Some(token) = cursor.next_token() {
        match token {
            Token::Switch { flag, .. } if flag.eq_ignore_ascii_case("nologo") => had_nologo = true,
            Token::Switch { flag, raw } => switch(flag, raw, &cursor, targets)?,
            Token::Bare(library) => add!(targets.for_each_link, additional_dependencies, unquote(library)),
        }
    }

    if !targets.has_file() && !had_nologo {
        set!(targets.for_each_link, suppress_startup_banner, false);
    }
    Ok(())
}

fn switch(flag: &str, raw: &str, cursor: &Cursor<'_>, targets: &mut Targets<'_>) -> ConvertResult<()> {
    let lower = flag.to_ascii_lowercase();
    let value = |prefix: &str| unquote(&flag[prefix.len()..]);
    let has = |prefix: &str| lower.len() > prefix.len() && lower.starts_with(prefix);

    match lower.as_str() {
        _ if has("align:") => set!(targets.for_each_link, section_alignment, value("align:")),
        _ if has("base:") => set!(targets.for_each_link, base_address, value("base:")),
        "debug" => set!(targets.for_each_link, generate_debug_information, true),
        _ if has("def:") => set!(targets.for_each_link, module_definition_file, value("def:")),
        _ if has("delay:") => match &lower["delay:".len()..] {
            "nobind" => set!(targets.for_each_link, support_nobind_of_delay_loaded_dll, true),
            "unload" => set!(targets.for_each_link, support_unload_of_delay_loaded_dll, true),
            _ => return Err(cursor.invalid(Some("/delay:"), &flag["delay:".len()..])),
        },
        _ if has("delayload:") => add!(targets.for_each_link, delay_load_dlls, value("delayload:")),
        l if l.starts_with("driver") => {
            let driver = match &l["driver".len()..] {
                "" => "Driver",
                ":uponly" => "UpOnly",
                ":wdm" => "WDM",
                _ => return Err(cursor.invalid(Some("/driver"), &flag["driver".len()..])),
            };
            set!(targets.for_each_link, driver, driver);
        }
        _ if has("entry:") => set!(targets.for_each_link, entry_point_symbol, value("entry:")),
        l if l.starts_with("fixed") => {
            let fixed = match &l["fixed".len()..] {
                "" => true,
                ":no" => false,
                _ => return Err(cursor.invalid(Some("/fixed"), &flag["fixed".len()..])),
            };
            set!(targets.for_each_link, fixed_base_address, fixed);
        }
        l if l.starts_with("force") => {
            let force = match &l["force".len()..] {
                "" => "Enabled",
                ":multiple" => "MultiplyDefinedSymbolOnly",
                ":unresolved" => "UndefinedSymbolOnly",
                _ => return Err(cursor.invalid(Some("/force"), &flag["force".len()..])),
            };
            set!(targets.for_each_link, force_file_output, force);
        }
        _ if has("heap:") => {
            let (reserve, commit) = split_sizes(&flag["heap:".len()..]);
            set!(targets.for_each_link, heap_reserve_size, reserve);
            if let Some(commit) = commit {
                set!(targets.for_each_link, heap_commit_size, commit);
            }
        }
        _ if has("implib:") => {
            let library = value("implib:");
            if library != DEFAULT_IMPORT_LIBRARY {
                set!(targets.for_each_link, import_library, library);
            }
        }
        _ if has("include:") => add!(targets.for_each_link, force_symbol_references, value("include:")),
        _ if has("incremental:") => match &lower["incremental:".len()..] {
            "yes" if !targets.is_debug() => set!(targets.for_each_link, link_incremental, true),
            "yes" => {}
            "no" => set!(targets.for_each_link, link_incremental, false),
            _ => return Err(cursor.invalid(Some("/incremental:"), &flag["incremental:".len()..])),
        },
        l if l.starts_with("largeaddressaware") => {
            let aware = match &l["largeaddressaware".len()..] {
                "" => true,
                ":no" => false,
                _ => {
                    return Err(cursor.invalid(Some("/largeaddressaware"), &flag["largeaddressaware".len()..]));
                }
            };
            set!(targets.for_each_link, large_address_aware, aware);
        }
        _ if has("libpath:") => add!(targets.for_each_link, additional_library_directories, value("libpath:")),
        _ if has("machine:") => {
            if let Some(target) = machine(&flag["machine:".len()..], targets.is_default_platform(), cursor)? {
                set!(targets.for_each_link, target_machine, target);
            }
        }
        l if l.starts_with("map") => map(flag, cursor, targets)?,
        _ if has("merge:") => set!(targets.for_each_link, merge_sections, value("merge:")),
        l if l.starts_with("nodefaultlib") => match nodefaultlib(&flag["nodefaultlib".len()..], cursor)? {
            DefaultLibraries::IgnoreAll => set!(targets.for_each_link, ignore_all_default_libraries, true),
            DefaultLibraries::Ignore(library) => {
                add!(targets.for_each_link, ignore_specific_default_libraries, library);
            }
        },
        "noentry" => set!(targets.for_each_link, no_entry_point, true),
        _ if has("opt:") => optimization(&flag["opt:".len()..], raw, cursor, targets)?,
        _ if has("order:@") => set!(targets.for_each_link, function_order, value("order:@")),
        _ if has("out:") => {
            let file = value("out:");
            if file != DEFAULT_OUTPUT_FILE {
                set!(targets.for_each_link, output_file, file);
            }
        }
        _ if has("pdb:") => {
            let file = value("pdb:");
            if !file.eq_ignore_ascii_case("none") && file != DEFAULT_PROGRAM_DATABASE {
                set!(targets.for_each_link, program_database_file, file);
            }
        }
        "profile" => set!(targets.for_each_link, profile, true),
        "release" => set!(targets.for_each_link, set_checksum, true),
        _ if has("section:") => set!(targets.for_each_link, specify_section_attributes, value("section:")),
        _ if has("stack:") => {
            let (reserve, commit) = split_sizes(&flag["stack:".len()..]);
            set!(targets.for_each_link, stack_reserve_size, reserve);
            if let Some(commit) = commit {
                set!(targets.for_each_link, stack_commit_size, commit);
            }
        }
        _ if has("stub:") => set!(targets.for_each_link, msdos_stub_file_name, value("stub:")),
        _ if has("subsystem:") => match subsystem(&flag["subsystem:".len()..], cursor)? {
            Subsystem::Named(name) => set!(targets.for_each_link, sub_system, name),
            Subsystem::Versioned => add!(targets.for_each_link, additional_options, raw),
        },
        _ if has("swaprun:") => match &lower["swaprun:".len()..] {
            "cd" => set!(targets.for_each_link, swap_run_from_cd, true),
            "net" => set!(targets.for_each_link, swap_run_from_net, true),
            _ => return Err(cursor.invalid(Some("/swaprun:"), &flag["swaprun:".len()..])),
        },
        l if l.starts_with("verbose") => {
            let progress = match &l["verbose".len()..] {
                "" => "LinkVerbose",
                ":lib" => "LinkVerboseLib",
                _ => return Err(cursor.invalid(Some("/verbose"), &flag["verbose".len()..])),
            };
            set!(targets.for_each_link, show_progress, progress);
        }
        _ if has("version:") => set!(targets.for_each_link, version, value("version:")),
        _ if has("defaultlib:") || has("export:") => add!(targets.for_each_link, additional_options, raw),
        "dll" => {}
        l if OBSOLETE_EXACT.contains(&l) || OBSOLETE_PREFIXES.iter().any(|p| l.starts_with(p)) => {
            tracing::trace!(flag = raw, "obsolete linker switch dropped");
        }
        _ => return Err(cursor.invalid(None, raw)),
    }
    Ok(())
}

/// `/map[:file]` and `/mapinfo:<what>`.
fn map(flag: &str, cursor: &Cursor<'_>, targets: &mut Targets<'_>) -> ConvertResult<()> {
    if let Some(info) = value_ci(flag, "mapinfo:") {
        match info.to_ascii_lowercase().as_str() {
            "exports" => set!(targets.for_each_link, map_exports, true),
            "fixups" | "lines" => {}
            _ => return Err(cursor.invalid(Some("/mapinfo:"), info)),
        }
        return Ok(());
    }

    let rest = &flag["map".len()..];
    let file = match rest.strip_prefix(':') {
        Some(file) => unquote(file),
        None if rest.is_empty() => "",
        None => return Err(cursor.invalid(Some("/map"), rest)),
    };
    set!(targets.for_each_link, generate_map_file, true);
    if !file.is_empty() {
        set!(targets.for_each_link, map_file_name, file);
    }
    Ok(())
}

/// `/opt:<what>`.
fn optimization(what: &str, raw: &str, cursor: &Cursor<'_>, targets: &mut Targets<'_>) -> ConvertResult<()> {
    if let Some(rest) = strip_prefix_ci(what, "icf") {
        match rest {
            "" => set!(targets.for_each_link, enable_comdat_folding, true),
            iterations if iterations.starts_with(',') => {
                add!(targets.for_each_link, additional_options, raw.replace(',', "="));
            }
            _ => return Err(cursor.invalid(Some("/opt:"), what)),
        }
        return Ok(());
    }
    match what.to_ascii_lowercase().as_str() {
        "noicf" => set!(targets.for_each_link, enable_comdat_folding, false),
        "noref" => set!(targets.for_each_link, optimize_references, false),
        "ref" => set!(targets.for_each_link, optimize_references, true),
        "win98" | "nowin98" => {}
        _ => return Err(cursor.invalid(Some("/opt:"), what)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Link, ProjectConfiguration, SourceFile};
    use crate::options::ConvertOptions;
    use crate::targets::TargetSet;

    fn run_on(mut configs: Vec<ProjectConfiguration>, flags: &str) -> ConvertResult<Link> {
        let options = ConvertOptions::default();
        let mut targets = Targets::new(&mut configs, None, TargetSet::All, Some(0), &options);
        decode(flags, 12, &mut targets)?;
        Ok(configs.remove(0).properties.link)
    }

    fn link(flags: &str) -> Link {
        run_on(vec![ProjectConfiguration::new("Release", "Win32")], flags).expect("decode")
    }

    fn error(flags: &str) -> String {
        run_on(vec![ProjectConfiguration::new("Release", "Win32")], flags)
            .expect_err("should fail")
            .to_string()
    }

    #[test]
    fn machine_ix86_depends_on_platform() {
        assert_eq!(link("/nologo /MACHINE:IX86").target_machine, None);

        let other = vec![ProjectConfiguration::new("Release", "x64")];
        let bag = run_on(other, "/nologo /MACHINE:IX86").expect("decode");
        assert_eq!(bag.target_machine.as_deref(), Some("MachineX86"));
        assert!(bag.properties().contains(&("TargetMachine", "MachineX86".to_string())));
    }

    #[test]
    fn libraries_and_default_libraries() {
        let bag = link("kernel32.lib user32.lib ws2_32.lib \"my lib.lib\" /nologo");
        assert_eq!(bag.additional_dependencies.len(), 4);
        assert_eq!(
            bag.properties(),
            vec![(
                "AdditionalDependencies",
                "ws2_32.lib;my lib.lib;%(AdditionalDependencies)".to_string()
            )]
        );
    }

    #[test]
    fn nologo_rule() {
        assert_eq!(link("kernel32.lib").suppress_startup_banner, Some(false));
        assert_eq!(link("/NOLOGO").suppress_startup_banner, None);
    }

    #[test]
    fn banner_untouched_at_file_scope() {
        let options = ConvertOptions::default();
        let mut configs = vec![ProjectConfiguration::new("Release", "Win32")];
        let mut file = SourceFile::new(r".\a.cpp", None, 1);
        let mut targets = Targets::new(&mut configs, Some(&mut file), TargetSet::All, Some(0), &options);
        decode("/debug", 1, &mut targets).expect("decode");
        let bag = &configs[0].properties.link;
        assert_eq!(bag.suppress_startup_banner, None);
        assert_eq!(bag.generate_debug_information, Some(true));
    }

    #[test]
    fn subsystem_and_versioned_subsystem() {
        assert_eq!(link("/nologo /subsystem:windows").sub_system.as_deref(), Some("Windows"));
        let bag = link("/nologo /subsystem:console,4.0");
        assert_eq!(bag.sub_system, None);
        assert!(bag.additional_options.contains("/subsystem:console,4.0"));
        assert_eq!(error("/subsystem:efi"), "Invalid link.exe /subsystem: flag [efi] - Line 12");
    }

    #[test]
    fn default_output_paths_are_omitted() {
        let bag = link(
            r#"/nologo /out:"$(OutDir)$(TargetName)$(TargetExt)" /implib:"$(OutDir)$(TargetName).lib" /pdb:none"#,
        );
        assert!(bag.properties().is_empty());

        let bag = link(r#"/nologo /out:"Release/app.exe" /pdb:"Release/app.pdb""#);
        assert_eq!(bag.output_file.as_deref(), Some("Release/app.exe"));
        assert_eq!(bag.program_database_file.as_deref(), Some("Release/app.pdb"));
    }

    #[test]
    fn incremental_relative_to_debug_setting() {
        assert_eq!(link("/nologo /incremental:yes").link_incremental, Some(true));
        assert_eq!(link("/nologo /incremental:no").link_incremental, Some(false));

        let mut debug = ProjectConfiguration::new("Debug", "Win32");
        debug.properties.use_debug_libraries = Some(true);
        let bag = run_on(vec![debug], "/nologo /incremental:yes").expect("decode");
        assert_eq!(bag.link_incremental, None);
    }

    #[test]
    fn map_files() {
        let bag = link("/nologo /map");
        assert_eq!(bag.generate_map_file, Some(true));
        assert_eq!(bag.map_file_name, None);

        let bag = link(r#"/nologo /map:"out.map" /mapinfo:exports /mapinfo:lines"#);
        assert_eq!(bag.map_file_name.as_deref(), Some("out.map"));
        assert_eq!(bag.map_exports, Some(true));

        assert_eq!(error("/mapx"), "Invalid link.exe /map flag [x] - Line 12");
        assert_eq!(error("/mapinfo:bogus"), "Invalid link.exe /mapinfo: flag [bogus] - Line 12");
    }

    #[test]
    fn optimization_switches() {
        let bag = link("/nologo /opt:ref /opt:noicf");
        assert_eq!(bag.optimize_references, Some(true));
        assert_eq!(bag.enable_comdat_folding, Some(false));

        let bag = link("/nologo /OPT:ICF,4");
        assert_eq!(bag.enable_comdat_folding, None);
        assert!(bag.additional_options.contains("/OPT:ICF=4"));

        assert!(link("/nologo /opt:nowin98").properties().is_empty());
    }

    #[test]
    fn sizes_with_commit() {
        let bag = link("/nologo /stack:0x100000,0x1000 /heap:0x200000");
        assert_eq!(bag.stack_reserve_size.as_deref(), Some("0x100000"));
        assert_eq!(bag.stack_commit_size.as_deref(), Some("0x1000"));
        assert_eq!(bag.heap_reserve_size.as_deref(), Some("0x200000"));
        assert_eq!(bag.heap_commit_size, None);
    }

    #[test]
    fn switch_families() {
        let bag = link("/nologo /fixed:no /force:multiple /driver:wdm /largeaddressaware /verbose:lib /swaprun:cd");
        assert_eq!(bag.fixed_base_address, Some(false));
        assert_eq!(bag.force_file_output.as_deref(), Some("MultiplyDefinedSymbolOnly"));
        assert_eq!(bag.driver.as_deref(), Some("WDM"));
        assert_eq!(bag.large_address_aware, Some(true));
        assert_eq!(bag.show_progress.as_deref(), Some("LinkVerboseLib"));
        assert_eq!(bag.swap_run_from_cd, Some(true));
        assert_eq!(link("/nologo /largeaddressaware:no").large_address_aware, Some(false));
    }

    #[test]
    fn nodefaultlib_forms() {
        let bag = link("/nologo /nodefaultlib:\"libcmt.lib\" /NODEFAULTLIB:msvcrt.lib");
        let libs: Vec<_> = bag.ignore_specific_default_libraries.iter().collect();
        assert_eq!(libs, vec!["libcmt.lib", "msvcrt.lib"]);
        assert_eq!(link("/nologo /nodefaultlib").ignore_all_default_libraries, Some(true));
    }

    #[test]
    fn obsolete_and_verbatim_switches() {
        let bag = link("/nologo /dll /pdbtype:sept /debugtype:cv /link50compat /ws:aggressive /defaultlib:x.lib");
        let options: Vec<_> = bag.additional_options.iter().collect();
        assert_eq!(options, vec!["/defaultlib:x.lib"]);
        assert_eq!(bag.properties().len(), 1);
    }

    #[test]
    fn unknown_switch_reports_whole_token() {
        assert_eq!(error("/bogus"), "Invalid link.exe flag [/bogus] - Line 12");
        assert_eq!(error("/delay:never"), "Invalid link.exe /delay: flag [never] - Line 12");
    }
}
