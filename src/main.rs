#[tokio::main]
async fn main() -> std::io::Result<()> {
    hungry_bubbles::run_with_config().await
}
