use query_engine::{EngineResult, cli::CliCommand, logger::Logger, opt::EngineOpt};
use std::process;
use structopt::StructOpt;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::info!("Encountered error during initialization:");

        if err.render_as_json().is_err() {
            eprintln!("{err}");
        }

        process::exit(1);
    }
}

async fn run() -> EngineResult<()> {
    let opts = EngineOpt::from_args();

    let mut logger = Logger::new("arango-graphql");
    logger.log_format(opts.log_format());
    logger.log_queries(opts.log_queries);

    if let Err(err) = logger.install() {
        eprintln!("Could not install the logger: {err}");
    }

    let output = CliCommand::from_opt(&opts)?.execute(&opts).await?;
    println!("{output}");

    Ok(())
}
