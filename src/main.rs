#[tokio::main]
async fn main() {
    grounds_client::run().await;
}
