use std::{env, time::Duration};

use keebdb_core::storage::{TableDefinition, Throughput};
use keebdb_core::{Keyboard, Record};

use crate::storage::dynamodb::AwsConfig;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Keyboards table name (default: "keebdb-keyboards")
    pub table_name: String,
    /// Provisioned read capacity units (default: 5)
    pub read_capacity: i64,
    /// Provisioned write capacity units (default: 5)
    pub write_capacity: i64,
    /// How long to wait for a new table to turn active, in seconds (default: 300)
    pub provision_timeout_secs: u64,
    /// Delay between two status checks while waiting, in milliseconds (default: 2,000)
    pub provision_poll_ms: u64,
    /// DynamoDB endpoint and region
    pub aws: AwsConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `KEEBDB_TABLE_NAME` - Table name (default: "keebdb-keyboards")
    /// - `KEEBDB_READ_CAPACITY` - Read capacity units (default: 5)
    /// - `KEEBDB_WRITE_CAPACITY` - Write capacity units (default: 5)
    /// - `KEEBDB_PROVISION_TIMEOUT_SECS` - Provisioning wait bound (default: 300)
    /// - `KEEBDB_PROVISION_POLL_MS` - Provisioning poll interval (default: 2,000)
    /// - `AWS_ENDPOINT_URL` - Custom DynamoDB endpoint (default: none)
    /// - `AWS_REGION` - AWS region (default: "us-east-1")
    ///
    /// Unparseable or non-positive numbers fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let positive = |key: &str, default: u64| {
            var(key)
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };
        let capacity = |key: &str| i64::try_from(positive(key, 5)).unwrap_or(5);

        Self {
            table_name: var("KEEBDB_TABLE_NAME")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "keebdb-keyboards".to_string()),
            read_capacity: capacity("KEEBDB_READ_CAPACITY"),
            write_capacity: capacity("KEEBDB_WRITE_CAPACITY"),
            provision_timeout_secs: positive("KEEBDB_PROVISION_TIMEOUT_SECS", 300),
            provision_poll_ms: positive("KEEBDB_PROVISION_POLL_MS", 2_000),
            aws: AwsConfig {
                endpoint_url: var("AWS_ENDPOINT_URL"),
                region: var("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            },
        }
    }

    pub fn throughput(&self) -> Throughput {
        Throughput {
            read_capacity_units: self.read_capacity,
            write_capacity_units: self.write_capacity,
        }
    }

    /// Definition of the keyboards table.
    pub fn table_definition(&self) -> TableDefinition {
        TableDefinition::new(&self.table_name, Keyboard::key_schema())
            .with_throughput(self.throughput())
    }

    pub fn provision_timeout(&self) -> Duration {
        Duration::from_secs(self.provision_timeout_secs)
    }

    pub fn provision_poll_interval(&self) -> Duration {
        Duration::from_millis(self.provision_poll_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
