use docker_image_promoter::cli::{Args, Runner};

#[tokio::main]
async fn main() {
    let args = Args::parse_args();
    let runner = Runner::new(args);
    if let Err(e) = runner.run().await {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}
