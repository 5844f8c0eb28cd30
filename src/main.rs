//! loracat - LoRA weight file catalog
//!
//! Entry point for the loracat CLI application.

use clap::Parser;
use loracat::{
    cli::Cli,
    error::{hints_for, ExitCode, StructuredError},
    logging::init_logging,
};

fn main() {
    let cli = Cli::parse();
    let json_errors = cli.json_errors;

    init_logging(cli.verbose, cli.quiet);

    match loracat::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = ExitCode::for_error(&err);

            if json_errors {
                let structured = StructuredError::new(&err, exit_code);
                if let Ok(json) = serde_json::to_string_pretty(&structured) {
                    eprintln!("{}", json);
                } else {
                    eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
                }
            } else {
                eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
                for hint in hints_for(&err) {
                    eprintln!("  hint: {}", hint);
                }
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}
