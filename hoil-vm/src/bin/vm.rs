//! `vm` — run a compiled `.coil` program and report its exit status.

use std::process::ExitCode;

use clap::Parser;

/// Execute a `.coil` MIL image.
#[derive(Parser)]
#[command(name = "vm", version, about = "Run a compiled .coil program")]
struct Args {
    /// Input is a binary .coil file (the only format currently supported; reserved for a future
    /// text disassembly input).
    #[arg(short = 'b', long = "binary", default_value_t = true)]
    binary: bool,

    /// Print instruction_count, stack_used, memory_used, and call-stack depth to stderr after
    /// the program exits.
    #[arg(short = 's', long = "stats")]
    stats: bool,

    /// Path to the .coil file to run.
    file: std::path::PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    if !args.binary {
        eprintln!("vm: text-mode input is not supported, only binary .coil files");
        return ExitCode::from(1);
    }

    let program = match hoil_vm::load(&args.file) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("vm: {err}");
            return ExitCode::from(1);
        }
    };

    let mut vm = hoil_vm::Vm::new(program);
    let result = vm.run();

    if args.stats {
        eprintln!(
            "instructions={} stack_used={} memory_used={} call_depth={}",
            vm.instruction_count(),
            vm.stack_used(),
            vm.memory_used(),
            vm.call_depth(),
        );
    }

    match result {
        Ok(exit_code) => {
            let code = (exit_code & 0xFF) as u8;
            ExitCode::from(code)
        }
        Err(err) => {
            eprintln!("vm: {err}");
            ExitCode::from(1)
        }
    }
}
