#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tax_api::run().await
}
