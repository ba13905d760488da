#[tokio::main]
async fn main() {
    if let Err(e) = glucosight_lib::run().await {
        eprintln!("glucosight: {e}");
        std::process::exit(1);
    }
}
