#[tokio::main]
async fn main() {
    let code = drainq::app::startup::startup().await;
    std::process::exit(code);
}
