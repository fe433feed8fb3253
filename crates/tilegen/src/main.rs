use clap::Parser;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = tilegen::cli::Args::parse();
    tilegen::cli::run(args)
}
