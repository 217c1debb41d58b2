use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    zipcode_api::run_server().await
}
