use crate::{
    EngineError, EngineResult,
    config::EngineConfig,
    context::{self, EngineContext},
    opt::{Command, EngineOpt},
};
use query_core::GraphQLRequest;
use schema_core::ProvisioningPlan;
use serde_json::{Map, Value};

pub struct ExecuteRequest {
    query: String,
    variables: Map<String, Value>,
    operation_name: Option<String>,
}

pub enum CliCommand {
    Execute(ExecuteRequest),
    Provision,
    Plan,
}

impl CliCommand {
    /// Create a CLI command from an `EngineOpt` instance.
    pub fn from_opt(opts: &EngineOpt) -> EngineResult<CliCommand> {
        match &opts.command {
            Command::Execute {
                query,
                variables,
                operation_name,
            } => Ok(CliCommand::Execute(ExecuteRequest {
                query: query.clone(),
                variables: parse_variables(variables.as_deref())?,
                operation_name: operation_name.clone(),
            })),
            Command::Provision => Ok(CliCommand::Provision),
            Command::Plan => Ok(CliCommand::Plan),
        }
    }

    /// Runs the command and returns what it prints.
    pub async fn execute(self, opts: &EngineOpt) -> EngineResult<String> {
        let config = EngineConfig::load(opts.config.as_deref())?;
        let settings = config.arangodb;
        let location = opts.schema.clone().unwrap_or_else(|| settings.schema_location.clone());
        let model = context::load_schema(&location)?;

        match self {
            CliCommand::Plan => {
                let plan = ProvisioningPlan::calculate(&model);
                Ok(serde_json::to_string_pretty(&plan)?)
            }
            CliCommand::Execute(request) => {
                let cx = EngineContext::new(&settings, model, context::connect(&settings).await?).await?;

                let mut graphql = GraphQLRequest::new(request.query).with_variables(request.variables);
                graphql.operation_name = request.operation_name;

                let response = cx.handler().handle(graphql).await;
                Ok(serde_json::to_string(&response)?)
            }
            CliCommand::Provision => {
                let cx = EngineContext::new(&settings, model, context::connect(&settings).await?).await?;

                if !cx.provisioned() {
                    cx.object_creator().run().await?;
                }

                Ok(format!("Database `{}` is provisioned.", settings.connection.database))
            }
        }
    }
}

fn parse_variables(input: Option<&str>) -> EngineResult<Map<String, Value>> {
    let Some(input) = input else {
        return Ok(Map::new());
    };

    match serde_json::from_str(input) {
        Ok(Value::Object(variables)) => Ok(variables),
        Ok(other) => Err(EngineError::InvalidVariables(format!("expected a JSON object, got `{other}`"))),
        Err(err) => Err(EngineError::InvalidVariables(err.to_string())),
    }
}
