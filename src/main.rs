use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    careboard_lib::init_tracing();

    match careboard_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Careboard stopped: {e}");
            ExitCode::FAILURE
        }
    }
}
