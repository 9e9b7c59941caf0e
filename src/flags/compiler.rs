//! `# ADD CPP` lines (`cl.exe`).
//!
//! Switch names are case-sensitive.  Arguments of `/D`, `/I`, `/U`, `/FI`,
//! `/Fa` and `/W` may follow in the next token.

use crate::error::{ConvertError, ConvertResult, Tool};
use crate::flags::{Cursor, Token};
use crate::targets::Targets;
use crate::tokenize::{tokenize, unquote};

const DEFAULT_ASSEMBLER_LISTING: &str = "$(IntDir)";
const DEFAULT_PDB: &str = "$(IntDir)vc$(PlatformToolsetVersion).pdb";
const DEFAULT_OBJECT_FILE: &str = "$(IntDir)";
const DEFAULT_PCH_OUTPUT: &str = "$(IntDir)$(TargetName).pch";
const DEFAULT_BROWSE_FILE: &str = "$(IntDir)";
const DEFAULT_PCH_HEADER: &str = "stdafx.h";

/// Decode the flag text of one compiler line.
pub fn decode(flags: &str, line: usize, targets: &mut Targets<'_>) -> ConvertResult<()> {
    let mut cursor = Cursor::new(tokenize(flags), Tool::Compiler, line);
    let mut had_nologo = false;

    while let Some(token) = cursor.next_token() {
        match token {
            Token::Switch { flag: "nologo", .. } => had_nologo = true,
            Token::Switch { flag, raw } => switch(flag, raw, &mut cursor, targets)?,
            Token::Bare(arg) => {
                return Err(ConvertError::argument(Tool::Compiler.program(), arg, line));
            }
        }
    }

    // The banner is suppressed by default; a project-wide line without
    // /nologo asks for it explicitly.
    if !targets.has_file() && !had_nologo {
        set!(targets.for_each_compiler, suppress_startup_banner, false);
    }
    Ok(())
}

fn switch<'t>(flag: &'t str, raw: &'t str, cursor: &mut Cursor<'t>, targets: &mut Targets<'_>) -> ConvertResult<()> {
    match flag {
        "C" => set!(targets.for_each_compiler, preprocess_keep_comments, true),
        d if d.starts_with('D') => define(cursor.argument("/D", &d[1..])?, targets),
        eh if eh.len() > 2 && eh.starts_with("EH") => match &eh[2..] {
            "sc" => {}
            "a" => set!(targets.for_each_compiler, exception_handling, "Async"),
            "s" => set!(targets.for_each_compiler, exception_handling, "SyncCThrow"),
            other => return Err(cursor.invalid(Some("/EH"), other)),
        },
        "EP" => set!(targets.for_each_compiler, preprocess_suppress_line_numbers, true),
        f if f.starts_with('F') => file_switch(&f[1..], raw, cursor, targets)?,
        g if g.len() > 1 && g.starts_with('G') => code_generation(&g[1..], raw, cursor, targets)?,
        i if i.starts_with('I') => {
            let dir = cursor.argument("/I", &i[1..])?;
            add!(targets.for_each_compiler, additional_include_directories, dir);
        }
        m if m.len() > 1 && m.starts_with('M') => runtime_library(&m[1..], cursor, targets)?,
        o if o.len() > 1 && o.starts_with('O') => optimization(&o[1..], cursor, targets)?,
        "P" => set!(targets.for_each_compiler, preprocess_to_file, true),
        t if t.len() == 2 && t.starts_with('T') => match &t[1..] {
            "C" | "c" => set!(targets.for_each_compiler, compile_as, "CompileAsC"),
            "P" | "p" => set!(targets.for_each_compiler, compile_as, "CompileAsCpp"),
            other => return Err(cursor.invalid(Some("/T"), other)),
        },
        u if u.starts_with('U') => {
            let name = cursor.argument("/U", &u[1..])?;
            add!(targets.for_each_compiler, undefine_preprocessor_definitions, name);
        }
        "u" => set!(targets.for_each_compiler, undefine_all_preprocessor_definitions, true),
        w if w.starts_with('W') => {
            let level = cursor.argument("/W", &w[1..])?;
            warning_level(level, cursor, targets)?;
        }
        "w" => set!(targets.for_each_compiler, warning_level, "TurnOffAllWarnings"),
        "X" => set!(targets.for_each_compiler, ignore_standard_include_path, true),
        y if y.len() > 1 && y.starts_with('Y') => precompiled_header(&y[1..], cursor, targets)?,
        z if z.len() > 1 && z.starts_with('Z') => language(&z[1..], raw, cursor, targets)?,
        "E" | "J" | "LD" | "LDd" | "vd0" | "vd1" | "vmb" | "vmg" | "vmm" | "vms" | "vmv" => {
            add!(targets.for_each_compiler, additional_options, raw);
        }
        "link" => {
            add!(targets.for_each_compiler, additional_options, raw);
            if let Some(next) = cursor.next_raw() {
                add!(targets.for_each_compiler, additional_options, next);
            }
        }
        "c" => {}
        "H" | "V" => cursor.skip(),
        hv if hv.starts_with('H') || hv.starts_with('V') => {}
        "noBool" | "QI0f" | "QI0f-" | "QIfdiv" | "QIfdiv-" | "Qlf" => {
            tracing::trace!(flag = raw, "obsolete compiler switch dropped");
        }
        other => return Err(cursor.invalid(None, other)),
    }
    Ok(())
}

/// `/D`: `_MBCS` and `_UNICODE` select the character set of the targeted
/// configurations instead of becoming definitions.
fn define(name: &str, targets: &mut Targets<'_>) {
    match name {
        "_MBCS" => targets.for_each_configuration(|p| p.character_set = Some("MultiByte".into())),
        "_UNICODE" => targets.for_each_configuration(|p| p.character_set = Some("Unicode".into())),
        _ => {
            add!(targets.for_each_compiler, preprocessor_definitions, name);
            if name == "_AFXEXT" {
                add!(targets.for_each_compiler, preprocessor_definitions, "_WINDLL");
            }
        }
    }
}

/// `/F<x>` output-file switches.  `rest` is the text after `F`.
fn file_switch<'t>(
    rest: &'t str,
    raw: &'t str,
    cursor: &mut Cursor<'t>,
    targets: &mut Targets<'_>,
) -> ConvertResult<()> {
    match rest {
        "A" => set!(targets.for_each_compiler, assembler_output, "AssemblyCode"),
        "Ac" => set!(targets.for_each_compiler, assembler_output, "AssemblyAndMachineCode"),
        "Acs" => set!(targets.for_each_compiler, assembler_output, "All"),
        "As" => set!(targets.for_each_compiler, assembler_output, "AssemblyAndSourceCode"),
        a if a.starts_with('a') => {
            let location = cursor.argument("/Fa", &a[1..])?;
            if location != DEFAULT_ASSEMBLER_LISTING {
                set!(targets.for_each_compiler, assembler_listing_location, location);
            }
        }
        d if d.len() > 1 && d.starts_with('d') => {
            let pdb = unquote(&d[1..]);
            if pdb != DEFAULT_PDB {
                set!(targets.for_each_compiler, program_data_base_file_name, pdb);
            }
        }
        i if i.starts_with('I') => {
            let header = cursor.argument("/FI", &i[1..])?;
            add!(targets.for_each_compiler, forced_include_files, header);
        }
        o if o.len() > 1 && o.starts_with('o') => {
            let object = unquote(&o[1..]);
            if object != DEFAULT_OBJECT_FILE {
                set!(targets.for_each_compiler, object_file_name, object);
            }
        }
        p if p.len() > 1 && p.starts_with('p') => {
            let pch = unquote(&p[1..]);
            if pch != DEFAULT_PCH_OUTPUT {
                set!(targets.for_each_compiler, precompiled_header_output_file, pch);
            }
        }
        r if r.starts_with('R') || r.starts_with('r') => {
            set!(targets.for_each_compiler, browse_information, true);
            let file = unquote(&r[1..]);
            if !file.is_empty() && file != DEFAULT_BROWSE_FILE {
                set!(targets.for_each_compiler, browse_information_file, file);
            }
        }
        "" => {
            // `/F <stack size>`
            let size = cursor.argument("/F", "")?;
            add!(targets.for_each_compiler, additional_options, format!("/F{size}"));
        }
        em if em.len() > 1 && (em.starts_with('e') || em.starts_with('m')) => {
            add!(targets.for_each_compiler, additional_options, raw);
        }
        n if unquote(n).parse::<u64>().is_ok() => add!(targets.for_each_compiler, additional_options, raw),
        "D" => {}
        other => return Err(cursor.invalid(Some("/F"), other)),
    }
    Ok(())
}

/// `/G<x>` code generation switches.
fn code_generation(rest: &str, raw: &str, cursor: &mut Cursor<'_>, targets: &mut Targets<'_>) -> ConvertResult<()> {
    match rest {
        "d" | "X" => {}
        "F" | "f" => set!(targets.for_each_compiler, string_pooling, true),
        "R" => set!(targets.for_each_compiler, runtime_type_info, true),
        "R-" => set!(targets.for_each_compiler, runtime_type_info, false),
        "r" => set!(targets.for_each_compiler, calling_convention, "FastCall"),
        "z" => set!(targets.for_each_compiler, calling_convention, "StdCall"),
        "T" => set!(targets.for_each_compiler, enable_fiber_safe_optimizations, true),
        "X-" => set!(targets.for_each_compiler, exception_handling, "false"),
        "y" => set!(targets.for_each_compiler, function_level_linking, true),
        "Z" => set!(targets.for_each_compiler, basic_runtime_checks, "StackFrameRuntimeCheck"),
        "A" | "h" => add!(targets.for_each_compiler, additional_options, raw),
        s if s.len() > 1 && s.starts_with('s') && s[1..].parse::<u64>().is_ok() => {
            add!(targets.for_each_compiler, additional_options, raw);
        }
        "e" | "m" | "m-" | "3" | "4" | "5" | "6" | "B" | "D" | "i" | "i-" => {
            tracing::trace!(flag = raw, "obsolete compiler switch dropped");
        }
        other => return Err(cursor.invalid(Some("/G"), other)),
    }
    Ok(())
}

/// `/M<x>`: the runtime matching the configuration's debug setting is the
/// toolset default.
fn runtime_library(rest: &str, cursor: &mut Cursor<'_>, targets: &mut Targets<'_>) -> ConvertResult<()> {
    let debug = targets.is_debug();
    match rest {
        "D" if debug => set!(targets.for_each_compiler, runtime_library, "MultiThreadedDLL"),
        "Dd" if !debug => set!(targets.for_each_compiler, runtime_library, "MultiThreadedDebugDLL"),
        "D" | "Dd" => {}
        "T" => set!(targets.for_each_compiler, runtime_library, "MultiThreaded"),
        "Td" => set!(targets.for_each_compiler, runtime_library, "MultiThreadedDebug"),
        "L" | "Ld" => {}
        other => return Err(cursor.invalid(Some("/M"), other)),
    }
    Ok(())
}

/// `/O<x>`.  `/O2` and `/Od` are the release and debug defaults.
fn optimization(rest: &str, cursor: &mut Cursor<'_>, targets: &mut Targets<'_>) -> ConvertResult<()> {
    let debug = targets.is_debug();
    let default_platform = targets.is_default_platform();
    match rest {
        "1" => set!(targets.for_each_compiler, optimization, "MinSpace"),
        "2" if debug => set!(targets.for_each_compiler, optimization, "MaxSpeed"),
        "d" if !debug => set!(targets.for_each_compiler, optimization, "Disabled"),
        "2" | "d" => {}
        "b0" => set!(targets.for_each_compiler, inline_function_expansion, "Disabled"),
        "b1" => set!(targets.for_each_compiler, inline_function_expansion, "OnlyExplicitInline"),
        "b2" => set!(targets.for_each_compiler, inline_function_expansion, "AnySuitable"),
        "i" => set!(targets.for_each_compiler, intrinsic_functions, true),
        "s" => set!(targets.for_each_compiler, favor_size_or_speed, "Size"),
        "t" => set!(targets.for_each_compiler, favor_size_or_speed, "Speed"),
        "x" => set!(targets.for_each_compiler, optimization, "Full"),
        "y" => set!(targets.for_each_compiler, omit_frame_pointers, true),
        "y-" if !default_platform => set!(targets.for_each_compiler, omit_frame_pointers, false),
        "y-" => {}
        "g" | "a" | "p" | "p-" | "w" => {}
        other => return Err(cursor.invalid(Some("/O"), other)),
    }
    Ok(())
}

/// `/W<n>` and `/WX`.
fn warning_level(level: &str, cursor: &mut Cursor<'_>, targets: &mut Targets<'_>) -> ConvertResult<()> {
    match level {
        "1" => {}
        "0" => set!(targets.for_each_compiler, warning_level, "TurnOffAllWarnings"),
        "2" | "3" | "4" => set!(targets.for_each_compiler, warning_level, format!("Level{level}")),
        "X" => set!(targets.for_each_compiler, treat_warning_as_error, true),
        other => return Err(cursor.invalid(Some("/W"), other)),
    }
    Ok(())
}

fn split_first(s: &str) -> Option<(char, &str)> {
    let c = s.chars().next()?;
    Some((c, &s[c.len_utf8()..]))
}

/// `/Yc`, `/Yu` with an optional header name.
fn precompiled_header(rest: &str, cursor: &mut Cursor<'_>, targets: &mut Targets<'_>) -> ConvertResult<()> {
    let Some((kind, header)) = split_first(rest) else {
        return Err(cursor.invalid(Some("/Y"), rest));
    };
    let mode = match kind {
        'c' => "Create",
        'u' => "Use",
        'd' | 'X' => return Ok(()),
        _ => return Err(cursor.invalid(Some("/Y"), rest)),
    };
    set!(targets.for_each_compiler, precompiled_header, mode);

    let header = unquote(header);
    if !header.is_empty() && header != DEFAULT_PCH_HEADER {
        set!(targets.for_each_compiler, precompiled_header_file, header);
    }
    Ok(())
}

/// `/Z<x>` debug-information and language switches.
fn language(rest: &str, raw: &str, cursor: &mut Cursor<'_>, targets: &mut Targets<'_>) -> ConvertResult<()> {
    let debug = targets.is_debug();
    let Some((kind, tail)) = split_first(rest) else {
        return Err(cursor.invalid(Some("/Z"), rest));
    };
    match kind {
        '7' => set!(targets.for_each_compiler, debug_information_format, "OldStyle"),
        'a' => set!(targets.for_each_compiler, disable_language_extensions, true),
        'I' if !debug => set!(targets.for_each_compiler, debug_information_format, "EditAndContinue"),
        'i' if debug => set!(targets.for_each_compiler, debug_information_format, "ProgramDatabase"),
        'I' | 'i' => {}
        'l' => set!(targets.for_each_compiler, omit_default_lib_name, true),
        'p' => match tail {
            "" => {}
            "1" => set!(targets.for_each_compiler, struct_member_alignment, "1byte"),
            "2" | "4" | "8" | "16" => set!(targets.for_each_compiler, struct_member_alignment, format!("{tail}bytes")),
            other => return Err(cursor.invalid(Some("/Zp"), other)),
        },
        'm' if !tail.is_empty() && tail.parse::<u64>().is_ok() => {
            add!(targets.for_each_compiler, additional_options, raw);
        }
        's' => add!(targets.for_each_compiler, additional_options, raw),
        'e' | 'd' | 'g' | 'n' => {}
        _ => return Err(cursor.invalid(Some("/Z"), rest)),
    }
    Ok(())
}
