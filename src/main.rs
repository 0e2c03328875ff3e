use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = qbo_bridge::args::parse();
    qbo_bridge::cli::main(args).await
}
