//! Replica configuration and catalog snapshots shared by the integration tests

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

pub const REPLICA_CONFIG: &str = r#"
sampling:
  bernoulli:
    value: 10
    units: probability
include_outliers: false
max_number_of_outliers: 100
general_relations:
  databases:
    - pattern: DEV
      schemas:
        - pattern: SOURCE_SYSTEM
          relations: ['.*']
specified_relations:
  - database: DEV
    schema: SOURCE_SYSTEM
    relation: ORDER_ITEMS
    unsampled: true
    relationships:
      bidirectional:
        - relation: ORDERS
          local_attribute: ORDER_ID
          remote_attribute: ID
  - database: DEV
    schema: SOURCE_SYSTEM
    relation: USER_COOKIES
    relationships:
      bidirectional:
        - database: ''
          schema: ''
          relation: USERS
          local_attribute: USER_ID
          remote_attribute: ID
      directional: []
  - database: DEV
    schema: SOURCE_SYSTEM
    relation: ORDERS
    relationships:
      directional:
        - relation: USERS
          local_attribute: USER_ID
          remote_attribute: ID
  - database: DEV
    schema: SOURCE_SYSTEM
    relation: USERS
    relationships:
      directional:
        - database: DEV
          schema: EXTERNAL
          relation: ADDRESSES
          local_attribute: ADDRESS_ID
          remote_attribute: ID
"#;

pub const CATALOG_YAML: &str = r#"
relations:
  - database: DEV
    schema: SOURCE_SYSTEM
    name: USERS
    attributes:
      - { name: ID, data_type: bigint }
      - { name: ADDRESS_ID, data_type: bigint }
  - database: DEV
    schema: SOURCE_SYSTEM
    name: USER_COOKIES
    attributes:
      - { name: USER_ID, data_type: bigint }
      - { name: COOKIE, data_type: varchar }
  - database: DEV
    schema: SOURCE_SYSTEM
    name: ORDERS
    attributes:
      - { name: ID, data_type: bigint }
      - { name: USER_ID, data_type: bigint }
  - database: DEV
    schema: SOURCE_SYSTEM
    name: ORDER_ITEMS
    attributes:
      - { name: ORDER_ID, data_type: bigint }
  - database: DEV
    schema: SOURCE_SYSTEM
    name: PRODUCTS
  - database: DEV
    schema: SOURCE_SYSTEM
    name: USER_SUMMARY
    materialization: view
  - database: DEV
    schema: EXTERNAL
    name: ADDRESSES
    attributes:
      - { name: ID, data_type: bigint }
  - database: PROD
    schema: SOURCE_SYSTEM
    name: USERS
"#;

/// Files for one run, removed when dropped
pub struct Workspace {
    pub dir: TempDir,
    pub config: PathBuf,
    pub catalog: PathBuf,
}

impl Workspace {
    pub fn new(config: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("replica.yml");
        let catalog_path = dir.path().join("catalog.yml");
        fs::write(&config_path, config).unwrap();
        fs::write(&catalog_path, CATALOG_YAML).unwrap();
        Self {
            dir,
            config: config_path,
            catalog: catalog_path,
        }
    }

    /// Writes the catalog again as JSON and returns its path
    pub fn json_catalog(&self) -> PathBuf {
        let yaml: serde_yaml::Value = serde_yaml::from_str(CATALOG_YAML).unwrap();
        let path = self.dir.path().join("catalog.json");
        fs::write(&path, serde_json::to_string_pretty(&yaml).unwrap()).unwrap();
        path
    }
}
