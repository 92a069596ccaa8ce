//! DynamoDB snapshot table.

use crate::config::{ConfigError, StoreConfig, ThroughputConfig};
use crate::error::TableError;
use crate::item;
use crate::snapshot::{Snapshot, SnapshotKey};
use crate::table::{SnapshotTable, TableStatus};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::config::Credentials;
use aws_sdk_dynamodb::error::{BuildError, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::{
    self as ddb, AttributeDefinition, KeySchemaElement, KeyType, ProvisionedThroughput,
    ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use std::error::Error as StdError;
use std::fmt::Debug;

/// Error codes the service uses for transient capacity failures.
const THROTTLING_CODES: &[&str] = &[
    "ThrottlingException",
    "ProvisionedThroughputExceededException",
    "RequestLimitExceeded",
];

/// A [`SnapshotTable`] backed by a DynamoDB table.
#[derive(Debug, Clone)]
pub struct DynamoTable {
    client: Client,
    table_name: String,
    throughput: ThroughputConfig,
}

impl DynamoTable {
    /// Builds an SDK client from `config`.
    ///
    /// Static credentials from the config take precedence; otherwise the
    /// default AWS provider chain (environment, profile, IMDS) is used.
    pub async fn connect(config: &StoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint.clone());
        }

        if let Some((key, secret)) = config.static_credentials() {
            loader =
                loader.credentials_provider(Credentials::new(key, secret, None, None, "dynasnap"));
        }

        let sdk_config = loader.load().await;
        tracing::debug!(
            "DynamoDB client for table {} (region {}, endpoint {})",
            config.table_name,
            config.region,
            config.endpoint.as_deref().unwrap_or("default")
        );

        Ok(Self::from_client(
            Client::new(&sdk_config),
            config.table_name.clone(),
            config.throughput,
        ))
    }

    /// Wraps an existing client.
    pub fn from_client(
        client: Client,
        table_name: impl Into<String>,
        throughput: ThroughputConfig,
    ) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            throughput,
        }
    }

    /// Returns the underlying SDK client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn key_schema(&self) -> Result<(Vec<AttributeDefinition>, Vec<KeySchemaElement>), BuildError> {
        let attributes = vec![
            AttributeDefinition::builder()
                .attribute_name(item::AGGREGATE_ID)
                .attribute_type(ScalarAttributeType::S)
                .build()?,
            AttributeDefinition::builder()
                .attribute_name(item::REVISION)
                .attribute_type(ScalarAttributeType::N)
                .build()?,
        ];
        let keys = vec![
            KeySchemaElement::builder()
                .attribute_name(item::AGGREGATE_ID)
                .key_type(KeyType::Hash)
                .build()?,
            KeySchemaElement::builder()
                .attribute_name(item::REVISION)
                .key_type(KeyType::Range)
                .build()?,
        ];
        Ok((attributes, keys))
    }
}

/// Maps an SDK failure to a table error, flagging throttling as retryable.
fn service_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> TableError
where
    E: ProvideErrorMetadata + StdError + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    let throttled = err
        .as_service_error()
        .and_then(|e| e.code())
        .is_some_and(|code| THROTTLING_CODES.contains(&code));

    if throttled {
        TableError::throttled(operation, err)
    } else {
        TableError::service(operation, err)
    }
}

#[async_trait]
impl SnapshotTable for DynamoTable {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn create_table(&self) -> Result<(), TableError> {
        let (attributes, keys) = self
            .key_schema()
            .map_err(|e| TableError::service("CreateTable", e))?;
        let throughput = ProvisionedThroughput::builder()
            .read_capacity_units(self.throughput.read_capacity_units)
            .write_capacity_units(self.throughput.write_capacity_units)
            .build()
            .map_err(|e| TableError::service("CreateTable", e))?;

        let result = self
            .client
            .create_table()
            .table_name(&self.table_name)
            .set_attribute_definitions(Some(attributes))
            .set_key_schema(Some(keys))
            .provisioned_throughput(throughput)
            .send()
            .await;

        match result {
            Ok(_) => {
                tracing::info!("Created table {}", self.table_name);
                Ok(())
            }
            Err(err) => {
                let exists = err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_in_use_exception());
                tracing::warn!("CreateTable {} rejected: {}", self.table_name, err);
                if exists {
                    Err(TableError::TableExists(self.table_name.clone()))
                } else {
                    Err(service_error("CreateTable", err))
                }
            }
        }
    }

    async fn delete_table(&self) -> Result<(), TableError> {
        let result = self
            .client
            .delete_table()
            .table_name(&self.table_name)
            .send()
            .await;

        match result {
            Ok(_) => {
                tracing::info!("Deleted table {}", self.table_name);
                Ok(())
            }
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception());
                tracing::warn!("DeleteTable {} rejected: {}", self.table_name, err);
                if missing {
                    Err(TableError::TableNotFound(self.table_name.clone()))
                } else {
                    Err(service_error("DeleteTable", err))
                }
            }
        }
    }

    async fn table_status(&self) -> Result<Option<TableStatus>, TableError> {
        let result = self
            .client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception()) =>
            {
                return Ok(None)
            }
            Err(err) => return Err(service_error("DescribeTable", err)),
        };

        let status = match output.table().and_then(|t| t.table_status()) {
            Some(ddb::TableStatus::Creating) => TableStatus::Creating,
            Some(ddb::TableStatus::Active) => TableStatus::Active,
            Some(ddb::TableStatus::Updating) => TableStatus::Updating,
            Some(ddb::TableStatus::Deleting) => TableStatus::Deleting,
            Some(other) => TableStatus::Other(other.as_str().to_string()),
            None => TableStatus::Other("UNKNOWN".to_string()),
        };
        Ok(Some(status))
    }

    async fn put_item(&self, snapshot: &Snapshot) -> Result<(), TableError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item::to_item(snapshot)))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception());
                tracing::warn!("PutItem {} rejected: {}", snapshot.key(), err);
                if missing {
                    Err(TableError::TableNotFound(self.table_name.clone()))
                } else {
                    Err(service_error("PutItem", err))
                }
            }
        }
    }

    async fn get_item(&self, key: &SnapshotKey) -> Result<Option<Snapshot>, TableError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(item::key_attributes(key)))
            .consistent_read(true)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception());
                tracing::warn!("GetItem {} rejected: {}", key, err);
                return if missing {
                    Err(TableError::TableNotFound(self.table_name.clone()))
                } else {
                    Err(service_error("GetItem", err))
                };
            }
        };

        output.item().map(item::from_item).transpose()
    }
}
