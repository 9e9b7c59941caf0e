//! dsp2vcxproj command-line tool.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use dsp2vcxproj::{ConvertError, ConvertOptions, DecodePolicy, convert_file, logging};

#[derive(Parser)]
#[command(name = "dsp2vcxproj")]
#[command(about = "Convert a Visual C++ 6 .dsp project into .vcxproj and .vcxproj.filters", long_about = None)]
struct Cli {
    /// The .dsp file to convert
    input: Option<PathBuf>,

    /// Resource culture of the build host; `/l` values equal to it are omitted
    #[arg(long, env = "DSP2VCXPROJ_CULTURE", default_value = "0x0409", value_parser = parse_culture)]
    culture: u32,

    /// Platform whose toolset defaults need no override
    #[arg(long, env = "DSP2VCXPROJ_PLATFORM", default_value = "Win32")]
    platform: String,

    /// Skip lines that fail to decode instead of stopping
    #[arg(long)]
    lenient: bool,

    /// More diagnostics on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_culture(text: &str) -> Result<u32, String> {
    let digits = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")).unwrap_or(text);
    u32::from_str_radix(digits, 16).map_err(|e| format!("not a hexadecimal culture code: {e}"))
}

fn run(cli: Cli) -> Result<()> {
    let input = cli.input.ok_or_else(|| anyhow!("Need DSP file as argument."))?;
    let policy = if cli.lenient { DecodePolicy::SkipAndWarn } else { DecodePolicy::FailFast };
    let options = ConvertOptions::new()
        .default_platform(cli.platform)
        .default_culture(cli.culture)
        .policy(policy);

    match convert_file(&input, &options) {
        Ok((project, filters)) => {
            tracing::info!(project = %project.display(), filters = %filters.display(), "conversion finished");
            Ok(())
        }
        Err(ConvertError::Io(err)) => {
            Err(err).with_context(|| format!("Failed to convert {}", input.display()))
        }
        Err(err) => Err(err.into()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn culture_accepts_prefixed_and_bare_hex() {
        assert_eq!(parse_culture("0x0407"), Ok(0x0407));
        assert_eq!(parse_culture("409"), Ok(0x0409));
        assert!(parse_culture("english").is_err());
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["dsp2vcxproj", "calc.dsp"]).expect("args");
        assert_eq!(cli.input, Some(PathBuf::from("calc.dsp")));
        assert_eq!(cli.platform, "Win32");
        assert!(!cli.lenient);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn missing_input_is_an_error() {
        let cli = Cli::try_parse_from(["dsp2vcxproj"]).expect("args");
        let err = run(cli).expect_err("no input");
        assert_eq!(err.to_string(), "Need DSP file as argument.");
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from(["dsp2vcxproj", "-vv", "--lenient", "--culture", "0x407", "a.dsp"]).expect("args");
        assert_eq!(cli.verbose, 2);
        assert!(cli.lenient);
        assert_eq!(cli.culture, 0x0407);
    }
}
