// src/main.rs

use cargo_watch_plus::logging::Verbosity;
use cargo_watch_plus::{cli, logging, run};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("cargo-watch-plus error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(Verbosity::from(&args))?;
    run(args).await?;
    Ok(())
}
