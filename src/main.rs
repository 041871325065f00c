use clap::Parser as _;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Keep stdout clean for the baked document; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    swap_stylesheets::run(swap_stylesheets::CliArgs::parse()).await
}
