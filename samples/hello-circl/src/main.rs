mod scenarios;

use circl_cve_client::{ClientConfig, Context, ServiceClient};

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = ClientConfig::load().map_err(|e| e.to_string())?;
    let client = ServiceClient::new(config);
    let ctx = Context::background();

    scenarios::lookup::run(&client, &ctx).await?;
    scenarios::batch::run(&client, &ctx).await?;

    Ok(())
}
