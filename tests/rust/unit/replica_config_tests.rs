//! Replica configuration parsing and validation

#[cfg(test)]
mod replica_config_tests {
    use std::io::Write;

    use samplegraph::catalog::{CatalogError, Configuration, SampleMethod, SampleUnits};
    use samplegraph::dependency_graph::Direction;

    const FULL_CONFIG: &str = r#"
sampling:
  bernoulli:
    value: 1500
    units: rows
include_outliers: true
max_number_of_outliers: 25
general_relations:
  databases:
    - pattern: DEV
      schemas:
        - pattern: SOURCE_SYSTEM
          relations: ['.*']
        - pattern: EXTERNAL
          relations: ['ADDRESSES', 'USER_.*']
specified_relations:
  - database: DEV
    schema: SOURCE_SYSTEM
    relation: ORDER_ITEMS
    unsampled: true
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
      directional:
        - database: DEV
          schema: EXTERNAL
          relation: ADDRESSES
          local_attribute: ADDRESS_ID
          remote_attribute: ID
"#;

    #[test]
    fn test_full_config_parses() {
        let config = Configuration::from_yaml_str(FULL_CONFIG).unwrap();

        assert_eq!(config.sampling, SampleMethod::bernoulli_rows(1500));
        assert!(config.include_outliers);
        assert_eq!(config.max_number_of_outliers, 25);
        assert_eq!(config.general_relations.databases[0].schemas.len(), 2);
        assert_eq!(config.specified_relations.len(), 2);
        assert!(config.specified_relations[0].unsampled);

        let relationships: Vec<_> = config.specified_relations[1]
            .relationships
            .iter()
            .map(|(direction, spec)| (direction, spec.relation.as_str()))
            .collect();
        assert_eq!(
            relationships,
            vec![
                (Direction::Bidirectional, "USERS"),
                (Direction::Directional, "ADDRESSES"),
            ]
        );
    }

    #[test]
    fn test_sum_patterns_lists_defaults_then_specified() {
        let config = Configuration::from_yaml_str(FULL_CONFIG).unwrap();
        let patterns: Vec<String> = config
            .sum_patterns()
            .iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(
            patterns,
            vec![
                "DEV.SOURCE_SYSTEM..*",
                "DEV.EXTERNAL.ADDRESSES",
                "DEV.EXTERNAL.USER_.*",
                "DEV.SOURCE_SYSTEM.ORDER_ITEMS",
                "DEV.SOURCE_SYSTEM.USER_COOKIES",
            ]
        );
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Configuration::from_yaml_str("specified_relations: []").unwrap();
        assert_eq!(config.sampling, SampleMethod::default());
        assert!(!config.include_outliers);
        assert_eq!(config.max_number_of_outliers, 100);
        assert!(config.sum_patterns().is_empty());
    }

    #[test]
    fn test_default_sampling_alias() {
        let config = Configuration::from_yaml_str(
            "default_sampling:\n  databases:\n    - pattern: DEV\n      schemas:\n        - pattern: S\n          relations: ['A']\n",
        )
        .unwrap();
        assert_eq!(config.sum_patterns().len(), 1);
    }

    #[test]
    fn test_probability_units_default() {
        let config =
            Configuration::from_yaml_str("sampling:\n  bernoulli:\n    value: 5\n").unwrap();
        match config.sampling {
            SampleMethod::Bernoulli { value, units } => {
                assert_eq!(value, 5.0);
                assert_eq!(units, SampleUnits::Probability);
            }
        }
    }

    #[test]
    fn test_relationship_without_attributes_is_rejected() {
        let yaml = FULL_CONFIG.replace("local_attribute: USER_ID", "local_attribute: ''");
        let err = Configuration::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidConfig { .. }));
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let yaml = FULL_CONFIG.replace("relations: ['.*']", "relations: ['[']");
        let err = Configuration::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPattern { .. }));
    }

    #[test]
    fn test_malformed_yaml_is_a_parse_error() {
        let err = Configuration::from_yaml_str("sampling: [unterminated").unwrap_err();
        assert!(matches!(err, CatalogError::ConfigParseError { .. }));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL_CONFIG.as_bytes()).unwrap();
        let config = Configuration::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.specified_relations.len(), 2);
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Configuration::from_yaml_file(dir.path().join("missing.yml")).unwrap_err();
        assert!(matches!(err, CatalogError::ConfigReadError { .. }));
    }
}
