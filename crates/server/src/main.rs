#[tokio::main]
async fn main() -> anyhow::Result<()> {
    smarttravel_server::run().await
}
