use std::process::ExitCode;

fn main() -> ExitCode {
    tripgenie_cli::run()
}
