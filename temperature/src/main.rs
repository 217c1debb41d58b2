use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    temperature_api::run_server().await
}
