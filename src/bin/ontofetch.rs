use std::process::ExitCode;

fn main() -> ExitCode {
    ontofetch::cli::main()
}
