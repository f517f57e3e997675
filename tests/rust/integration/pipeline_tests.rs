//! End-to-end planning over the shared replica fixture

#[cfg(test)]
mod pipeline_tests {
    use std::sync::Arc;

    use samplegraph::catalog::{Catalog, Configuration, Materialization};
    use samplegraph::dependency_graph::{Direction, GraphError};
    use samplegraph::query_generator::SnowflakeDialect;
    use samplegraph::sample_plan::{PlanError, Planner, SamplePlan};

    use crate::fixtures::{Workspace, REPLICA_CONFIG};

    async fn plan_for(workspace: &Workspace, workers: usize, analyze: bool) -> SamplePlan {
        let config = Configuration::from_yaml_file(&workspace.config).unwrap();
        let catalog = Catalog::from_file(&workspace.catalog).unwrap();
        Planner::new(Arc::new(SnowflakeDialect))
            .with_workers(workers)
            .with_analyze(analyze)
            .plan(&config, catalog)
            .await
            .unwrap()
    }

    fn compiled<'p>(plan: &'p SamplePlan, relation: &str) -> &'p str {
        &plan
            .relation(relation)
            .unwrap_or_else(|| panic!("{} missing from plan", relation))
            .compiled_query
    }

    #[tokio::test]
    async fn test_plan_includes_filtered_relations_and_dependencies() {
        let workspace = Workspace::new(REPLICA_CONFIG);
        let plan = plan_for(&workspace, 4, false).await;

        let mut names: Vec<_> = plan.relations().map(|r| r.relation.clone()).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "DEV.EXTERNAL.ADDRESSES",
                "DEV.SOURCE_SYSTEM.ORDERS",
                "DEV.SOURCE_SYSTEM.ORDER_ITEMS",
                "DEV.SOURCE_SYSTEM.PRODUCTS",
                "DEV.SOURCE_SYSTEM.USERS",
                "DEV.SOURCE_SYSTEM.USER_COOKIES",
                "DEV.SOURCE_SYSTEM.USER_SUMMARY",
            ]
        );
        assert!(plan.relation("PROD.SOURCE_SYSTEM.USERS").is_none());
    }

    #[tokio::test]
    async fn test_partitions_put_isolates_first() {
        let workspace = Workspace::new(REPLICA_CONFIG);
        let plan = plan_for(&workspace, 4, false).await;

        // ORDER_ITEMS is unsampled, so its relationship adds no edge
        let sizes: Vec<_> = plan.partitions.iter().map(|p| p.relations.len()).collect();
        assert_eq!(sizes, vec![1, 1, 1, 4]);

        let connected = &plan.partitions[3];
        assert_eq!(connected.relations[0].relation, "DEV.EXTERNAL.ADDRESSES");
        assert_eq!(connected.relations[1].relation, "DEV.SOURCE_SYSTEM.USERS");
        assert_eq!(connected.edges.len(), 3);
        assert!(connected
            .edges
            .iter()
            .all(|e| e.direction == Direction::Bidirectional));
    }

    #[tokio::test]
    async fn test_statements_follow_relation_kind() {
        let workspace = Workspace::new(REPLICA_CONFIG);
        let plan = plan_for(&workspace, 4, false).await;

        let view = plan.relation("DEV.SOURCE_SYSTEM.USER_SUMMARY").unwrap();
        assert_eq!(view.materialization, Materialization::View);
        assert!(view.compiled_query.contains("GET_DDL('view', 'DEV.SOURCE_SYSTEM.USER_SUMMARY')"));

        let unsampled = compiled(&plan, "DEV.SOURCE_SYSTEM.ORDER_ITEMS");
        assert!(!unsampled.contains("SAMPLE"));
        assert!(!unsampled.contains("WHERE"));

        let isolated = compiled(&plan, "DEV.SOURCE_SYSTEM.PRODUCTS");
        assert!(isolated.contains("SAMPLE BERNOULLI (10)"));
        assert!(!isolated.contains("WHERE"));
    }

    #[tokio::test]
    async fn test_constrained_relations_reference_their_neighbours() {
        let workspace = Workspace::new(REPLICA_CONFIG);
        let plan = plan_for(&workspace, 4, false).await;

        // Root of the component: constrained by its child and resampled
        let addresses = compiled(&plan, "DEV.EXTERNAL.ADDRESSES");
        assert!(addresses.contains("ID IN (SELECT ADDRESS_ID FROM DEV.SOURCE_SYSTEM.USERS)"));
        assert!(addresses.contains("SAMPLEGRAPH_DIRECTIONAL_SAMPLE_DEV_EXTERNAL_ADDRESSES"));

        // Children of bidirectional edges are not sampled a second time
        let cookies = compiled(&plan, "DEV.SOURCE_SYSTEM.USER_COOKIES");
        assert!(cookies.contains("USER_ID IN"));
        // USERS is embedded as compiled, which in turn embeds ADDRESSES
        assert!(cookies.contains("ADDRESS_ID IN"));
        assert!(cookies.contains("SAMPLEGRAPH_DIRECTIONAL_SAMPLE_DEV_EXTERNAL_ADDRESSES"));
        assert!(!cookies.contains("SAMPLEGRAPH_DIRECTIONAL_SAMPLE_DEV_SOURCE_SYSTEM_USER_COOKIES"));

        let users = compiled(&plan, "DEV.SOURCE_SYSTEM.USERS");
        assert!(users.contains("ID IN (SELECT USER_ID FROM DEV.SOURCE_SYSTEM.ORDERS)"));
        assert!(users.contains("ID IN (SELECT USER_ID FROM DEV.SOURCE_SYSTEM.USER_COOKIES)"));
        assert!(users.contains("ADDRESS_ID IN"));
        assert!(!users.contains("SAMPLEGRAPH_DIRECTIONAL_SAMPLE_DEV_SOURCE_SYSTEM_USERS"));
    }

    #[tokio::test]
    async fn test_worker_count_does_not_change_plan() {
        let workspace = Workspace::new(REPLICA_CONFIG);
        let sequential = plan_for(&workspace, 1, false).await;
        let parallel = plan_for(&workspace, 8, false).await;
        assert_eq!(sequential, parallel);
    }

    #[tokio::test]
    async fn test_json_catalog_matches_yaml_catalog() {
        let workspace = Workspace::new(REPLICA_CONFIG);
        let from_yaml = plan_for(&workspace, 2, false).await;

        let config = Configuration::from_yaml_file(&workspace.config).unwrap();
        let catalog = Catalog::from_file(workspace.json_catalog()).unwrap();
        let from_json = Planner::new(Arc::new(SnowflakeDialect))
            .with_workers(2)
            .plan(&config, catalog)
            .await
            .unwrap();

        assert_eq!(from_yaml, from_json);
    }

    #[tokio::test]
    async fn test_analyze_wraps_every_sampled_statement() {
        let workspace = Workspace::new(REPLICA_CONFIG);
        let plan = plan_for(&workspace, 4, true).await;

        for relation in plan.relations() {
            if relation.materialization == Materialization::View {
                assert_eq!(relation.compiled_query, relation.core_query);
                continue;
            }
            assert!(
                relation.compiled_query.contains("population_size"),
                "{} was not wrapped",
                relation.relation
            );
            assert!(relation.compiled_query.contains(relation.core_query.trim()));
        }
    }

    #[tokio::test]
    async fn test_cycle_is_rejected() {
        let cyclic = format!(
            "{}{}",
            REPLICA_CONFIG,
            r#"
  - database: DEV
    schema: EXTERNAL
    relation: ADDRESSES
    relationships:
      bidirectional:
        - database: DEV
          schema: SOURCE_SYSTEM
          relation: USER_COOKIES
          local_attribute: ID
          remote_attribute: USER_ID
"#
        );
        let workspace = Workspace::new(&cyclic);
        let config = Configuration::from_yaml_file(&workspace.config).unwrap();
        let catalog = Catalog::from_file(&workspace.catalog).unwrap();

        let err = Planner::new(Arc::new(SnowflakeDialect))
            .plan(&config, catalog)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PlanError::Graph(GraphError::CycleDetected { .. })
        ));
    }

    #[tokio::test]
    async fn test_ambiguous_dependency_is_rejected() {
        let ambiguous = REPLICA_CONFIG.replace(
            "        - database: DEV\n          schema: EXTERNAL\n          relation: ADDRESSES",
            "        - database: '.*'\n          schema: '.*'\n          relation: USERS",
        );
        let workspace = Workspace::new(&ambiguous);
        let config = Configuration::from_yaml_file(&workspace.config).unwrap();
        let catalog = Catalog::from_file(&workspace.catalog).unwrap();

        let err = Planner::new(Arc::new(SnowflakeDialect))
            .plan(&config, catalog)
            .await
            .unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("ambiguous"));
    }
}
