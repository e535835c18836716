mod sensor;
mod server;
mod sink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    server::run().await
}
