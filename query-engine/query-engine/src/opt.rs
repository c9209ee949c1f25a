use crate::LogFormat;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt, Clone)]
#[structopt(name = "arango-graphql", about = "GraphQL queries over ArangoDB graphs")]
pub struct EngineOpt {
    /// Path to the TOML configuration file.
    #[structopt(long, short = "c", parse(from_os_str))]
    pub config: Option<PathBuf>,

    /// Schema file or directory of `*.graphqls` files. Overrides `schema_location`.
    #[structopt(long, short = "s", parse(from_os_str))]
    pub schema: Option<PathBuf>,

    /// Set the log format.
    #[structopt(long = "log-format", default_value = "text")]
    pub log_format: String,

    /// Log the generated AQL queries.
    #[structopt(long)]
    pub log_queries: bool,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(Debug, StructOpt, Clone)]
pub enum Command {
    /// Executes a GraphQL query and prints the response.
    Execute {
        /// The GraphQL query document.
        #[structopt(long, short = "q")]
        query: String,

        /// Variables of the query as a JSON object.
        #[structopt(long)]
        variables: Option<String>,

        /// The operation to run if the document contains several.
        #[structopt(long)]
        operation_name: Option<String>,
    },
    /// Creates the database, collections and indexes the schema needs.
    Provision,
    /// Prints the collections and indexes the schema needs, without touching the database.
    Plan,
}

impl EngineOpt {
    pub fn log_format(&self) -> LogFormat {
        match self.log_format.as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}
