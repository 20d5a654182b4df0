use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    triage_webhook_lib::init_tracing();

    match triage_webhook_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
