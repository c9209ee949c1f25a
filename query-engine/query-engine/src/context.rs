use crate::{EngineError, EngineResult, config::ArangoSettings};
use arango_client::{ArangoTransport, HttpTransport};
use graph_schema::{DirectiveModel, TypeDiscriminatorRegistry};
use query_core::{DataFetcher, QueryGeneratorChain, RequestHandler, TraversalQueryExecutor};
use schema_core::{DatabaseObjectCreator, ProvisioningPlan};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::Arc,
};

const SCHEMA_EXTENSION: &str = "graphqls";

/// All immutable state of the process. Built once, before the first request.
pub struct EngineContext {
    model: Arc<DirectiveModel>,
    transport: Arc<dyn ArangoTransport>,
    database: String,
    handler: RequestHandler,
    provisioned: bool,
}

impl fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EngineContext { .. }")
    }
}

impl EngineContext {
    /// Wires the engine together. With `auto_create` the database objects are
    /// provisioned before the context is returned, so no request can reach the
    /// fetcher earlier. Without it no [DatabaseObjectCreator] exists at all.
    pub async fn new(
        settings: &ArangoSettings,
        model: DirectiveModel,
        transport: Arc<dyn ArangoTransport>,
    ) -> EngineResult<Self> {
        let registry = TypeDiscriminatorRegistry::new(&model)?;
        let model = Arc::new(model);
        let database = settings.connection.database.clone();

        let executor = TraversalQueryExecutor::new(transport.clone()).with_timeout(settings.query_timeout());

        let fetcher = DataFetcher::new(
            model.clone(),
            Arc::new(registry),
            QueryGeneratorChain::default(),
            executor,
            database.clone(),
        );

        let provisioned = if settings.auto_create {
            let mut creator = DatabaseObjectCreator::new(
                transport.clone(),
                database.clone(),
                ProvisioningPlan::calculate(&model),
            );

            creator.run().await?;
            true
        } else {
            false
        };

        tracing::info!(database = %database, provisioned, "Engine context ready.");

        Ok(Self {
            model,
            transport,
            database,
            handler: RequestHandler::new(Arc::new(fetcher)),
            provisioned,
        })
    }

    pub fn model(&self) -> &DirectiveModel {
        &self.model
    }

    pub fn handler(&self) -> &RequestHandler {
        &self.handler
    }

    /// Whether the startup provisioning ran.
    pub fn provisioned(&self) -> bool {
        self.provisioned
    }

    /// A creator for an explicit provisioning run.
    pub fn object_creator(&self) -> DatabaseObjectCreator {
        DatabaseObjectCreator::new(
            self.transport.clone(),
            self.database.clone(),
            ProvisioningPlan::calculate(&self.model),
        )
    }
}

/// Builds the HTTP transport, discovering coordinators when configured to.
pub async fn connect(settings: &ArangoSettings) -> EngineResult<Arc<dyn ArangoTransport>> {
    let mut transport = HttpTransport::new(&settings.connection)?;

    if settings.connection.acquire_host_list {
        transport.acquire_host_list().await?;
    }

    Ok(Arc::new(transport))
}

/// Loads the schema from a file or from all `*.graphqls` files of a directory.
pub fn load_schema(location: &Path) -> EngineResult<DirectiveModel> {
    let files = schema_files(location)?;
    Ok(graph_schema::parse_schema_files(&files)?)
}

fn schema_files(location: &Path) -> EngineResult<Vec<(String, String)>> {
    let read = |path: &Path| {
        fs::read_to_string(path).map_err(|source| EngineError::SchemaLocation {
            path: path.to_owned(),
            source,
        })
    };

    if location.is_file() {
        return Ok(vec![(location.display().to_string(), read(location)?)]);
    }

    let entries = fs::read_dir(location).map_err(|source| EngineError::SchemaLocation {
        path: location.to_owned(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == SCHEMA_EXTENSION))
        .collect();

    if paths.is_empty() {
        return Err(EngineError::EmptySchemaLocation(location.to_owned()));
    }

    paths.sort();

    paths
        .into_iter()
        .map(|path| Ok((path.display().to_string(), read(&path)?)))
        .collect()
}
