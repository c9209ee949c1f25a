use crate::{ProvisioningError, ProvisioningPlan, ProvisioningResult};
use arango_client::{ArangoTransport, SYSTEM_DATABASE};
use std::{fmt, sync::Arc};

/// The provisioning phases, in the only order they may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProvisioningPhase {
    Database,
    Collections,
    Indexes,
}

impl fmt::Display for ProvisioningPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisioningPhase::Database => f.write_str("database"),
            ProvisioningPhase::Collections => f.write_str("collections"),
            ProvisioningPhase::Indexes => f.write_str("indexes"),
        }
    }
}

/// Creates the database objects of a [ProvisioningPlan]. Objects that exist
/// already are left alone, so every phase can run again safely.
pub struct DatabaseObjectCreator {
    transport: Arc<dyn ArangoTransport>,
    database: String,
    plan: ProvisioningPlan,
    completed: Option<ProvisioningPhase>,
}

impl fmt::Debug for DatabaseObjectCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseObjectCreator")
            .field("database", &self.database)
            .field("plan", &self.plan)
            .field("completed", &self.completed)
            .finish()
    }
}

impl DatabaseObjectCreator {
    pub fn new(transport: Arc<dyn ArangoTransport>, database: impl Into<String>, plan: ProvisioningPlan) -> Self {
        Self {
            transport,
            database: database.into(),
            plan,
            completed: None,
        }
    }

    pub fn plan(&self) -> &ProvisioningPlan {
        &self.plan
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// The last phase that ran to completion.
    pub fn completed_phase(&self) -> Option<ProvisioningPhase> {
        self.completed
    }

    /// Runs all three phases in order.
    #[tracing::instrument(skip(self), fields(database = %self.database))]
    pub async fn run(&mut self) -> ProvisioningResult<()> {
        self.create_database().await?;
        self.create_collections().await?;
        self.create_indexes().await?;

        tracing::info!("Provisioning finished.");

        Ok(())
    }

    pub async fn create_database(&mut self) -> ProvisioningResult<()> {
        if self.database == SYSTEM_DATABASE {
            tracing::debug!("Using the system database, nothing to create.");
            return self.complete(ProvisioningPhase::Database);
        }

        match self.transport.create_database(&self.database).await {
            Ok(()) => tracing::info!(database = %self.database, "Created database."),
            Err(err) if err.is_duplicate_name() => {
                tracing::debug!(database = %self.database, "Database exists already.")
            }
            Err(err) => {
                let operation = format!("create database `{}`", self.database);
                return Err(ProvisioningError::transport(operation, err));
            }
        }

        self.complete(ProvisioningPhase::Database)
    }

    pub async fn create_collections(&mut self) -> ProvisioningResult<()> {
        self.require(ProvisioningPhase::Collections)?;

        for collection in &self.plan.collections {
            let existing = self
                .transport
                .collection_kind(&self.database, &collection.name)
                .await
                .map_err(|err| {
                    ProvisioningError::transport(format!("inspect collection `{}`", collection.name), err)
                })?;

            match existing {
                Some(kind) if kind == collection.kind => {
                    tracing::debug!(collection = %collection.name, "Collection exists already.");
                    continue;
                }
                Some(kind) => {
                    return Err(ProvisioningError::CollectionKindMismatch {
                        collection: collection.name.clone(),
                        expected: collection.kind,
                        existing: kind,
                    });
                }
                None => (),
            }

            match self
                .transport
                .create_collection(&self.database, &collection.name, collection.kind)
                .await
            {
                Ok(()) => tracing::info!(collection = %collection.name, kind = %collection.kind, "Created collection."),
                Err(err) if err.is_duplicate_name() => {
                    tracing::debug!(collection = %collection.name, "Collection was created concurrently.")
                }
                Err(err) => {
                    let operation = format!("create {} collection `{}`", collection.kind, collection.name);
                    return Err(ProvisioningError::transport(operation, err));
                }
            }
        }

        self.complete(ProvisioningPhase::Collections)
    }

    pub async fn create_indexes(&mut self) -> ProvisioningResult<()> {
        self.require(ProvisioningPhase::Indexes)?;

        for collection in &self.plan.collections {
            for index in &collection.indexes {
                match self.transport.ensure_index(&self.database, &collection.name, index).await {
                    Ok(()) => {
                        tracing::debug!(collection = %collection.name, fields = ?index.fields, "Ensured index.")
                    }
                    Err(err) if err.is_duplicate_name() => (),
                    Err(err) => {
                        let operation = format!("create index on `{}` ({})", collection.name, index.fields.join(", "));
                        return Err(ProvisioningError::transport(operation, err));
                    }
                }
            }
        }

        self.complete(ProvisioningPhase::Indexes)
    }

    /// Fails unless the phase before `phase` has completed.
    fn require(&self, phase: ProvisioningPhase) -> ProvisioningResult<()> {
        let required = match phase {
            ProvisioningPhase::Database => return Ok(()),
            ProvisioningPhase::Collections => ProvisioningPhase::Database,
            ProvisioningPhase::Indexes => ProvisioningPhase::Collections,
        };

        match self.completed {
            Some(completed) if completed >= required => Ok(()),
            _ => Err(ProvisioningError::PhaseOrder { phase, required }),
        }
    }

    fn complete(&mut self, phase: ProvisioningPhase) -> ProvisioningResult<()> {
        self.completed = self.completed.max(Some(phase));
        Ok(())
    }
}
