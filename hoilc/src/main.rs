//! `hoilc` — compile one HOIL module to a `.coil` MIL binary.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use hoil_diag::Diagnostics;

/// Compile a HOIL source file to a .coil MIL binary.
#[derive(Parser)]
#[command(name = "hoilc", version, about = "Compile a HOIL module to .coil")]
struct Args {
    /// Output path. Defaults to the input file's stem with a .coil extension.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Print per-phase progress to stderr.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// HOIL source file to compile.
    input: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();
    if args.verbose {
        tracing_subscriber::fmt().with_env_filter("debug").init();
    } else {
        tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();
    }

    let source = match std::fs::read_to_string(&args.input) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{}: error: could not read input: {err}", args.input.display());
            return ExitCode::from(1);
        }
    };

    let filename = args.input.display().to_string();
    let output = args.output.clone().unwrap_or_else(|| default_output_path(&args.input));

    match compile(&source, &filename, args.verbose) {
        Ok(bytes) => match std::fs::write(&output, bytes) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("{filename}: error: could not write '{}': {err}", output.display());
                ExitCode::from(1)
            }
        },
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn default_output_path(input: &std::path::Path) -> PathBuf {
    let stem = input.file_stem().map(std::ffi::OsStr::to_owned).unwrap_or_else(|| input.as_os_str().to_owned());
    let mut out = PathBuf::from(stem);
    out.set_extension("coil");
    out
}

/// Drive lexer (implicitly, inside the parser) → parser → checker → codegen. Returns the
/// formatted `file:line:col: error: message` diagnostic on the first failure of any phase.
fn compile(source: &str, filename: &str, verbose: bool) -> Result<Vec<u8>, String> {
    if verbose {
        eprintln!("{filename}: parsing");
    }
    let mut parse_diag = Diagnostics::new();
    let mut module = hoil_parser::parse_module(source, filename, &mut parse_diag).ok_or_else(|| format_diag(&parse_diag, filename))?;

    if verbose {
        eprintln!("{filename}: resolving and type-checking");
    }
    let mut check_diag = Diagnostics::new();
    if !hoil_check::check_module(&mut module, &mut check_diag) {
        return Err(format_diag(&check_diag, filename));
    }

    if verbose {
        eprintln!("{filename}: generating code");
    }
    let mut codegen_diag = Diagnostics::new();
    hoil_codegen::generate_module(&module, &mut codegen_diag).ok_or_else(|| format_diag(&codegen_diag, filename))
}

fn format_diag(diag: &Diagnostics, filename: &str) -> String {
    match diag.first() {
        Some(d) => d.to_string(),
        None => format!("{filename}: error: unknown failure"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_path_swaps_extension() {
        assert_eq!(default_output_path(std::path::Path::new("foo.hoil")), PathBuf::from("foo.coil"));
        assert_eq!(default_output_path(std::path::Path::new("dir/bar.hoil")), PathBuf::from("bar.coil"));
    }

    #[test]
    fn compile_reports_a_formatted_diagnostic_on_a_syntax_error() {
        let err = compile("MODULE", "t.hoil", false).unwrap_err();
        assert!(err.starts_with("t.hoil:"), "{err}");
    }

    #[test]
    fn compile_succeeds_on_a_minimal_module() {
        let bytes = compile(
            r#"
            MODULE "e";
            FUNCTION main() -> i32 {
            entry:
                RET 0;
            }
            "#,
            "t.hoil",
            false,
        )
        .unwrap();
        assert_eq!(&bytes[0..4], &mil_format::MAGIC.to_le_bytes());
    }
}
