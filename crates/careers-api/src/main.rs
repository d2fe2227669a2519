#[tokio::main]
async fn main() {
    if let Err(err) = careers_api::run().await {
        tracing::error!(error = %err, "careers-api failed");
        std::process::exit(1);
    }
}
