#[tokio::main]
async fn main() {
    if let Err(e) = artery_party::run().await {
        tracing::error!("{e}");
        eprintln!("artery-party: {e}");
        std::process::exit(1);
    }
}
