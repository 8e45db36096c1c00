use anyhow::Result;
use tracing::info;
use wpconv_cli::CliEngine;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    info!("wpconv starting");

    let stdin = std::io::stdin();
    let mut engine = CliEngine::new();
    engine.run(stdin.lock());

    Ok(())
}
