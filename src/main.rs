use std::process::ExitCode;

fn main() -> ExitCode {
    match macro_time_machine::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
