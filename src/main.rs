use std::process::ExitCode;

fn main() -> ExitCode {
    match repo_etl::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
