//! Nested block schemas for the cluster profile.

use crate::schema::{Attribute, AttributeFlags, AttributeType, Block, NestedBlock, Validator};

fn required_float() -> Attribute {
    Attribute::optional_float64().required()
}

fn string_map() -> Attribute {
    Attribute::new(
        AttributeType::map(AttributeType::String),
        AttributeFlags::optional(),
    )
}

fn positive_int() -> Attribute {
    Attribute::required_int64().with_validator(Validator::IntAtLeast(1))
}

pub(super) fn compute_profile() -> NestedBlock {
    NestedBlock::list_exactly_one(
        Block::new().with_block(
            "node",
            NestedBlock::list(
                Block::new()
                    .with_attribute("count", positive_int())
                    .with_attribute("type", Attribute::required_string().not_empty())
                    .with_attribute("vm_size", Attribute::required_string().not_empty()),
            )
            .with_min_items(1),
        ),
    )
}

pub(super) fn cluster_profile() -> NestedBlock {
    NestedBlock::list_exactly_one(
        Block::new()
            .with_attribute("cluster_version", Attribute::required_string().not_empty())
            .with_attribute("oss_version", Attribute::required_string().not_empty())
            .with_block("authorization_profile", authorization_profile())
            .with_block("autoscale_profile", autoscale_profile())
            .with_block("flink_profile", flink_profile())
            .with_block("identity_profile", identity_profile())
            .with_block("kafka_profile", kafka_profile())
            .with_block("log_analytics_profile", log_analytics_profile())
            .with_block("managed_identity_profile", managed_identity_profile())
            .with_block(
                "cluster_access_profile",
                NestedBlock::list_max_one(
                    Block::new()
                        .with_attribute("internal_ingress_enabled", Attribute::required_bool()),
                ),
            )
            .with_block(
                "prometheus_profile",
                NestedBlock::list_max_one(
                    Block::new().with_attribute("enabled", Attribute::required_bool()),
                ),
            )
            .with_block("ranger_profile", ranger_profile())
            .with_block("script_action_profile", script_action_profile())
            .with_block("secrets_profile", secrets_profile())
            .with_block("service_configs_profiles", service_configs_profiles())
            .with_block("spark_profile", spark_profile())
            .with_block(
                "ssh_profile",
                NestedBlock::list_max_one(
                    Block::new()
                        .with_attribute("count", positive_int())
                        .with_attribute("vm_size", Attribute::optional_string()),
                ),
            )
            .with_block("trino_profile", trino_profile()),
    )
}

fn authorization_profile() -> NestedBlock {
    NestedBlock::list_exactly_one(
        Block::new()
            .with_attribute("group_ids", Attribute::string_list())
            .with_attribute("user_ids", Attribute::string_list()),
    )
}

fn autoscale_profile() -> NestedBlock {
    let comparison_rule = NestedBlock::list_exactly_one(
        Block::new()
            .with_attribute(
                "operator",
                Attribute::required_string().one_of(&[
                    "greaterThan",
                    "greaterThanOrEqual",
                    "lessThan",
                    "lessThanOrEqual",
                ]),
            )
            .with_attribute("threshold", required_float()),
    );

    let load_based = Block::new()
        .with_attribute("min_nodes", Attribute::required_int64())
        .with_attribute("max_nodes", Attribute::required_int64())
        .with_attribute("poll_interval", Attribute::optional_int64())
        .with_attribute("cooldown_period", Attribute::optional_int64())
        .with_block(
            "scaling_rules",
            NestedBlock::list(
                Block::new()
                    .with_attribute(
                        "action_type",
                        Attribute::required_string().one_of(&["scaleup", "scaledown"]),
                    )
                    .with_attribute("evaluation_count", Attribute::required_int64())
                    .with_attribute("scaling_metric", Attribute::required_string().not_empty())
                    .with_block("comparison_rule", comparison_rule),
            )
            .with_min_items(1),
        );

    let schedule_based = Block::new()
        .with_attribute("default_count", Attribute::required_int64())
        .with_attribute("time_zone", Attribute::required_string().not_empty())
        .with_block(
            "schedule",
            NestedBlock::list(
                Block::new()
                    .with_attribute("count", Attribute::required_int64())
                    .with_attribute(
                        "days",
                        Attribute::new(
                            AttributeType::list(AttributeType::String),
                            AttributeFlags::required(),
                        ),
                    )
                    .with_attribute("start_time", Attribute::required_string().not_empty())
                    .with_attribute("end_time", Attribute::required_string().not_empty()),
            )
            .with_min_items(1),
        );

    NestedBlock::list_max_one(
        Block::new()
            .with_attribute("autoscale_enabled", Attribute::required_bool())
            .with_attribute(
                "autoscale_type",
                Attribute::optional_string().one_of(&["LoadBased", "ScheduleBased"]),
            )
            .with_attribute("graceful_decommission_timeout", Attribute::optional_int64())
            .with_block("load_based_config", NestedBlock::list_max_one(load_based))
            .with_block("schedule_based_config", NestedBlock::list_max_one(schedule_based)),
    )
}

fn compute_resource() -> Block {
    Block::new()
        .with_attribute("cpu", required_float())
        .with_attribute("memory", Attribute::required_int64())
}

fn flink_profile() -> NestedBlock {
    NestedBlock::list_max_one(
        Block::new()
            .with_attribute(
                "deployment_mode",
                Attribute::optional_string().one_of(&["Application", "Session"]),
            )
            .with_attribute("num_replicas", Attribute::optional_int64())
            .with_block(
                "catalog_option",
                NestedBlock::list_max_one(
                    Block::new()
                        .with_attribute(
                            "metastore_db_connection_authentication_mode",
                            Attribute::optional_string().one_of(&["IdentityAuth", "SqlAuth"]),
                        )
                        .with_attribute(
                            "metastore_db_connection_password",
                            Attribute::optional_string().sensitive(),
                        )
                        .with_attribute(
                            "metastore_db_connection_url",
                            Attribute::required_string().not_empty(),
                        )
                        .with_attribute(
                            "metastore_db_connection_user_name",
                            Attribute::optional_string(),
                        ),
                ),
            )
            .with_block("history_server", NestedBlock::list_max_one(compute_resource()))
            .with_block("job_manager", NestedBlock::list_exactly_one(compute_resource()))
            .with_block("task_manager", NestedBlock::list_exactly_one(compute_resource()))
            .with_block(
                "job_spec",
                NestedBlock::list_max_one(
                    Block::new()
                        .with_attribute("jar_name", Attribute::required_string().not_empty())
                        .with_attribute(
                            "job_jar_directory",
                            Attribute::required_string().not_empty(),
                        )
                        .with_attribute(
                            "upgrade_mode",
                            Attribute::required_string().one_of(&[
                                "LAST_STATE_UPDATE",
                                "STATELESS_UPDATE",
                                "UPDATE",
                            ]),
                        )
                        .with_attribute("save_point_name", Attribute::optional_string())
                        .with_attribute("args", Attribute::optional_string())
                        .with_attribute("entry_class", Attribute::optional_string()),
                ),
            )
            .with_block(
                "storage",
                NestedBlock::list_exactly_one(
                    Block::new()
                        .with_attribute("storage_url", Attribute::required_string().not_empty())
                        .with_attribute("storage_key", Attribute::optional_string().sensitive()),
                ),
            ),
    )
}

fn identity_profile() -> NestedBlock {
    NestedBlock::list_max_one(
        Block::new()
            .with_attribute(
                "msi_client_id",
                Attribute::required_string().with_validator(Validator::Uuid),
            )
            .with_attribute(
                "msi_object_id",
                Attribute::required_string().with_validator(Validator::Uuid),
            )
            .with_attribute("msi_resource_id", Attribute::required_string().not_empty()),
    )
}

fn kafka_profile() -> NestedBlock {
    NestedBlock::list_max_one(
        Block::new()
            .with_block(
                "disk_storage",
                NestedBlock::list_exactly_one(
                    Block::new()
                        .with_attribute("disk_size", Attribute::required_int64())
                        .with_attribute(
                            "disk_type",
                            Attribute::required_string().one_of(&[
                                "Premium_SSD_LRS",
                                "Premium_SSD_v2_LRS",
                                "Premium_SSD_ZRS",
                                "Standard_HDD_LRS",
                                "Standard_SSD_LRS",
                                "Standard_SSD_ZRS",
                            ]),
                        ),
                ),
            )
            .with_attribute("kraft_enabled", Attribute::optional_bool())
            .with_attribute("public_endpoint_enabled", Attribute::optional_bool())
            .with_attribute("remote_storage_uri", Attribute::optional_string()),
    )
}

fn log_analytics_profile() -> NestedBlock {
    NestedBlock::list_max_one(
        Block::new()
            .with_attribute("enabled", Attribute::required_bool())
            .with_attribute("metrics_enabled", Attribute::optional_bool())
            .with_block(
                "application_logs",
                NestedBlock::list_max_one(
                    Block::new()
                        .with_attribute("std_error_enabled", Attribute::optional_bool())
                        .with_attribute("std_out_enabled", Attribute::optional_bool()),
                ),
            ),
    )
}

fn managed_identity_profile() -> NestedBlock {
    NestedBlock::list_max_one(
        Block::new().with_block(
            "identities",
            NestedBlock::list(
                Block::new()
                    .with_attribute(
                        "client_id",
                        Attribute::required_string().with_validator(Validator::Uuid),
                    )
                    .with_attribute(
                        "object_id",
                        Attribute::required_string().with_validator(Validator::Uuid),
                    )
                    .with_attribute("resource_id", Attribute::required_string().not_empty())
                    .with_attribute(
                        "type",
                        Attribute::required_string().one_of(&["cluster", "user", "internal"]),
                    ),
            )
            .with_min_items(1),
        ),
    )
}

fn ranger_profile() -> NestedBlock {
    let database = Block::new()
        .with_attribute("host", Attribute::required_string().not_empty())
        .with_attribute("name", Attribute::required_string().not_empty())
        .with_attribute("password_secret_ref", Attribute::optional_string())
        .with_attribute("username", Attribute::optional_string());

    NestedBlock::list_max_one(
        Block::new()
            .with_block(
                "ranger_admin",
                NestedBlock::list_exactly_one(
                    Block::new()
                        .with_attribute(
                            "admins",
                            Attribute::new(
                                AttributeType::list(AttributeType::String),
                                AttributeFlags::required(),
                            ),
                        )
                        .with_block("database", NestedBlock::list_exactly_one(database)),
                ),
            )
            .with_block(
                "ranger_user_sync",
                NestedBlock::list_exactly_one(
                    Block::new()
                        .with_attribute("enabled", Attribute::optional_bool())
                        .with_attribute("groups", Attribute::string_list())
                        .with_attribute(
                            "mode",
                            Attribute::optional_string().one_of(&["static", "automatic"]),
                        )
                        .with_attribute("user_mapping_location", Attribute::optional_string())
                        .with_attribute("users", Attribute::string_list()),
                ),
            )
            .with_attribute("storage_account", Attribute::optional_string()),
    )
}

fn script_action_profile() -> NestedBlock {
    NestedBlock::list(
        Block::new()
            .with_attribute("name", Attribute::required_string().not_empty())
            .with_attribute(
                "services",
                Attribute::new(
                    AttributeType::list(AttributeType::String),
                    AttributeFlags::required(),
                ),
            )
            .with_attribute("type", Attribute::required_string().not_empty())
            .with_attribute("url", Attribute::required_string().not_empty())
            .with_attribute("parameters", Attribute::optional_string())
            .with_attribute("should_persist", Attribute::required_bool())
            .with_attribute("timeout_in_minutes", Attribute::required_int64()),
    )
}

fn secrets_profile() -> NestedBlock {
    NestedBlock::list_max_one(
        Block::new()
            .with_attribute("key_vault_resource_id", Attribute::required_string().not_empty())
            .with_block(
                "secrets",
                NestedBlock::list(
                    Block::new()
                        .with_attribute(
                            "key_vault_object_name",
                            Attribute::required_string().not_empty(),
                        )
                        .with_attribute(
                            "type",
                            Attribute::required_string().one_of(&["Key", "Secret", "Certificate"]),
                        )
                        .with_attribute("reference_name", Attribute::required_string().not_empty())
                        .with_attribute("version", Attribute::optional_string()),
                ),
            ),
    )
}

fn service_configs_profiles() -> NestedBlock {
    let file = Block::new()
        .with_attribute("file_name", Attribute::required_string().not_empty())
        .with_attribute("content", Attribute::optional_string())
        .with_attribute("encoding", Attribute::optional_string().one_of(&["Base64", "None"]))
        .with_attribute("path", Attribute::optional_string())
        .with_attribute("values", string_map());

    NestedBlock::list(
        Block::new()
            .with_attribute("service_name", Attribute::required_string().not_empty())
            .with_block(
                "configs",
                NestedBlock::list(
                    Block::new()
                        .with_attribute("component", Attribute::required_string().not_empty())
                        .with_block("files", NestedBlock::list(file).with_min_items(1)),
                )
                .with_min_items(1),
            ),
    )
}

fn spark_profile() -> NestedBlock {
    NestedBlock::list_max_one(
        Block::new()
            .with_attribute("default_storage_url", Attribute::optional_string())
            .with_block(
                "metastore_spec",
                NestedBlock::list_max_one(
                    Block::new()
                        .with_attribute(
                            "db_connection_authentication_mode",
                            Attribute::optional_string().one_of(&["IdentityAuth", "SqlAuth"]),
                        )
                        .with_attribute("db_name", Attribute::required_string().not_empty())
                        .with_attribute("db_password_secret_name", Attribute::optional_string())
                        .with_attribute("db_server_host", Attribute::required_string().not_empty())
                        .with_attribute("db_user_name", Attribute::optional_string())
                        .with_attribute("key_vault_id", Attribute::optional_string())
                        .with_attribute("thrift_url", Attribute::optional_string()),
                ),
            ),
    )
}

fn trino_debug() -> NestedBlock {
    NestedBlock::list_max_one(
        Block::new()
            .with_attribute("enabled", Attribute::optional_bool())
            .with_attribute("port", Attribute::optional_int64())
            .with_attribute("suspend", Attribute::optional_bool()),
    )
}

fn trino_profile() -> NestedBlock {
    let hive = Block::new()
        .with_attribute("catalog_name", Attribute::required_string().not_empty())
        .with_attribute(
            "metastore_db_connection_authentication_mode",
            Attribute::optional_string().one_of(&["IdentityAuth", "SqlAuth"]),
        )
        .with_attribute(
            "metastore_db_connection_password",
            Attribute::optional_string().sensitive(),
        )
        .with_attribute("metastore_db_connection_url", Attribute::required_string().not_empty())
        .with_attribute("metastore_db_connection_user_name", Attribute::optional_string())
        .with_attribute("metastore_warehouse_dir", Attribute::required_string().not_empty());

    NestedBlock::list_max_one(
        Block::new()
            .with_block(
                "catalog_options",
                NestedBlock::list_max_one(
                    Block::new().with_block("hive", NestedBlock::list(hive).with_min_items(1)),
                ),
            )
            .with_block(
                "coordinator",
                NestedBlock::list_max_one(
                    Block::new()
                        .with_block("debug", trino_debug())
                        .with_attribute("high_availability_enabled", Attribute::optional_bool()),
                ),
            )
            .with_block(
                "worker",
                NestedBlock::list_max_one(Block::new().with_block("debug", trino_debug())),
            )
            .with_block(
                "user_plugins_spec",
                NestedBlock::list_max_one(
                    Block::new().with_block(
                        "plugins",
                        NestedBlock::list(
                            Block::new()
                                .with_attribute("enabled", Attribute::optional_bool())
                                .with_attribute("name", Attribute::optional_string())
                                .with_attribute("path", Attribute::optional_string()),
                        ),
                    ),
                ),
            )
            .with_block(
                "user_telemetry_spec",
                NestedBlock::list_max_one(
                    Block::new()
                        .with_attribute("hive_catalog_name", Attribute::optional_string())
                        .with_attribute("hive_catalog_schema", Attribute::optional_string())
                        .with_attribute("partition_retention_in_days", Attribute::optional_int64())
                        .with_attribute("path", Attribute::optional_string()),
                ),
            ),
    )
}
