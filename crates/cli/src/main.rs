use std::process::ExitCode;

fn main() -> ExitCode {
    scs_cli::run()
}
