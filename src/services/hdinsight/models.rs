//! Configuration models for the cluster profile and their ARM shapes.
//!
//! Each `*Model` is the snake_case block as it appears in configuration and
//! state. The matching unsuffixed type is the camelCase API object. The
//! `From` impls between the two are the expand and flatten steps.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::resources::common::{non_empty, non_zero};

fn one<'a, T, U: From<&'a T>>(input: &'a [T]) -> Option<U> {
    input.first().map(U::from)
}

fn many<'a, T, U: From<&'a T>>(input: &'a [T]) -> Vec<U> {
    input.iter().map(U::from).collect()
}

fn block<T, U: From<T>>(input: Option<T>) -> Vec<U> {
    input.map(U::from).into_iter().collect()
}

fn blocks<T, U: From<T>>(input: Vec<T>) -> Vec<U> {
    input.into_iter().map(U::from).collect()
}

fn non_empty_list(input: &[String]) -> Option<Vec<String>> {
    (!input.is_empty()).then(|| input.to_vec())
}

// Compute profile

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ComputeProfileModel {
    pub node: Vec<NodeModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct NodeModel {
    pub count: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub vm_size: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct ComputeProfile {
    #[serde(default)]
    pub nodes: Vec<NodeProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NodeProfile {
    #[serde(default)]
    pub count: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub vm_size: String,
}

impl From<&ComputeProfileModel> for ComputeProfile {
    fn from(m: &ComputeProfileModel) -> Self {
        Self {
            nodes: m
                .node
                .iter()
                .map(|n| NodeProfile {
                    count: n.count,
                    kind: n.kind.clone(),
                    vm_size: n.vm_size.clone(),
                })
                .collect(),
        }
    }
}

impl From<ComputeProfile> for ComputeProfileModel {
    fn from(a: ComputeProfile) -> Self {
        Self {
            node: a
                .nodes
                .into_iter()
                .map(|n| NodeModel {
                    count: n.count,
                    kind: n.kind,
                    vm_size: n.vm_size,
                })
                .collect(),
        }
    }
}

// Cluster profile

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ClusterProfileModel {
    pub cluster_version: String,
    pub oss_version: String,
    pub authorization_profile: Vec<AuthorizationProfileModel>,
    pub autoscale_profile: Vec<AutoscaleProfileModel>,
    pub flink_profile: Vec<FlinkProfileModel>,
    pub identity_profile: Vec<IdentityProfileModel>,
    pub kafka_profile: Vec<KafkaProfileModel>,
    pub log_analytics_profile: Vec<LogAnalyticsProfileModel>,
    pub managed_identity_profile: Vec<ManagedIdentityProfileModel>,
    pub cluster_access_profile: Vec<ClusterAccessProfileModel>,
    pub prometheus_profile: Vec<PrometheusProfileModel>,
    pub ranger_profile: Vec<RangerProfileModel>,
    pub script_action_profile: Vec<ScriptActionProfileModel>,
    pub secrets_profile: Vec<SecretsProfileModel>,
    pub service_configs_profiles: Vec<ServiceConfigsProfileModel>,
    pub spark_profile: Vec<SparkProfileModel>,
    pub ssh_profile: Vec<SshProfileModel>,
    pub trino_profile: Vec<TrinoProfileModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClusterProfile {
    #[serde(default)]
    pub cluster_version: String,
    #[serde(default)]
    pub oss_version: String,
    #[serde(default)]
    pub authorization_profile: AuthorizationProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscale_profile: Option<AutoscaleProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flink_profile: Option<FlinkProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_profile: Option<IdentityProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kafka_profile: Option<KafkaProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_analytics_profile: Option<LogAnalyticsProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_identity_profile: Option<ManagedIdentityProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_access_profile: Option<ClusterAccessProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prometheus_profile: Option<PrometheusProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranger_profile: Option<RangerProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_action_profiles: Option<Vec<ScriptActionProfile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets_profile: Option<SecretsProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_configs_profiles: Option<Vec<ServiceConfigsProfile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spark_profile: Option<SparkProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_profile: Option<SshProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trino_profile: Option<TrinoProfile>,
}

/// The part of the cluster profile a PATCH may change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdatableClusterProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_profile: Option<AuthorizationProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoscale_profile: Option<AutoscaleProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_analytics_profile: Option<LogAnalyticsProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prometheus_profile: Option<PrometheusProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranger_profile: Option<RangerProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_action_profiles: Option<Vec<ScriptActionProfile>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secrets_profile: Option<SecretsProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_configs_profiles: Option<Vec<ServiceConfigsProfile>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_profile: Option<SshProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trino_profile: Option<TrinoProfile>,
}

impl From<&ClusterProfileModel> for ClusterProfile {
    fn from(m: &ClusterProfileModel) -> Self {
        Self {
            cluster_version: m.cluster_version.clone(),
            oss_version: m.oss_version.clone(),
            authorization_profile: one(&m.authorization_profile).unwrap_or_default(),
            autoscale_profile: one(&m.autoscale_profile),
            flink_profile: one(&m.flink_profile),
            identity_profile: one(&m.identity_profile),
            kafka_profile: one(&m.kafka_profile),
            log_analytics_profile: one(&m.log_analytics_profile),
            managed_identity_profile: one(&m.managed_identity_profile),
            cluster_access_profile: one(&m.cluster_access_profile),
            prometheus_profile: one(&m.prometheus_profile),
            ranger_profile: one(&m.ranger_profile),
            script_action_profiles: (!m.script_action_profile.is_empty())
                .then(|| many(&m.script_action_profile)),
            secrets_profile: one(&m.secrets_profile),
            service_configs_profiles: (!m.service_configs_profiles.is_empty())
                .then(|| many(&m.service_configs_profiles)),
            spark_profile: one(&m.spark_profile),
            ssh_profile: one(&m.ssh_profile),
            trino_profile: one(&m.trino_profile),
        }
    }
}

impl From<&ClusterProfileModel> for UpdatableClusterProfile {
    fn from(m: &ClusterProfileModel) -> Self {
        Self {
            authorization_profile: one(&m.authorization_profile),
            autoscale_profile: one(&m.autoscale_profile),
            log_analytics_profile: one(&m.log_analytics_profile),
            prometheus_profile: one(&m.prometheus_profile),
            ranger_profile: one(&m.ranger_profile),
            script_action_profiles: (!m.script_action_profile.is_empty())
                .then(|| many(&m.script_action_profile)),
            secrets_profile: one(&m.secrets_profile),
            service_configs_profiles: (!m.service_configs_profiles.is_empty())
                .then(|| many(&m.service_configs_profiles)),
            ssh_profile: one(&m.ssh_profile),
            trino_profile: one(&m.trino_profile),
        }
    }
}

impl From<ClusterProfile> for ClusterProfileModel {
    fn from(a: ClusterProfile) -> Self {
        Self {
            cluster_version: a.cluster_version,
            oss_version: a.oss_version,
            authorization_profile: vec![a.authorization_profile.into()],
            autoscale_profile: block(a.autoscale_profile),
            flink_profile: block(a.flink_profile),
            identity_profile: block(a.identity_profile),
            kafka_profile: block(a.kafka_profile),
            log_analytics_profile: block(a.log_analytics_profile),
            managed_identity_profile: block(a.managed_identity_profile),
            cluster_access_profile: block(a.cluster_access_profile),
            prometheus_profile: block(a.prometheus_profile),
            ranger_profile: block(a.ranger_profile),
            script_action_profile: blocks(a.script_action_profiles.unwrap_or_default()),
            secrets_profile: block(a.secrets_profile),
            service_configs_profiles: blocks(a.service_configs_profiles.unwrap_or_default()),
            spark_profile: block(a.spark_profile),
            ssh_profile: block(a.ssh_profile),
            trino_profile: block(a.trino_profile),
        }
    }
}

// Authorization

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AuthorizationProfileModel {
    pub group_ids: Vec<String>,
    pub user_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthorizationProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ids: Option<Vec<String>>,
}

impl From<&AuthorizationProfileModel> for AuthorizationProfile {
    fn from(m: &AuthorizationProfileModel) -> Self {
        Self {
            group_ids: non_empty_list(&m.group_ids),
            user_ids: non_empty_list(&m.user_ids),
        }
    }
}

impl From<AuthorizationProfile> for AuthorizationProfileModel {
    fn from(a: AuthorizationProfile) -> Self {
        Self {
            group_ids: a.group_ids.unwrap_or_default(),
            user_ids: a.user_ids.unwrap_or_default(),
        }
    }
}

// Autoscale

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AutoscaleProfileModel {
    pub autoscale_enabled: bool,
    pub autoscale_type: String,
    pub graceful_decommission_timeout: i64,
    pub load_based_config: Vec<LoadBasedConfigModel>,
    pub schedule_based_config: Vec<ScheduleBasedConfigModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct LoadBasedConfigModel {
    pub min_nodes: i64,
    pub max_nodes: i64,
    pub poll_interval: i64,
    pub cooldown_period: i64,
    pub scaling_rules: Vec<ScalingRuleModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ScalingRuleModel {
    pub action_type: String,
    pub evaluation_count: i64,
    pub scaling_metric: String,
    pub comparison_rule: Vec<ComparisonRuleModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ComparisonRuleModel {
    pub operator: String,
    pub threshold: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ScheduleBasedConfigModel {
    pub default_count: i64,
    pub time_zone: String,
    pub schedule: Vec<ScheduleModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ScheduleModel {
    pub count: i64,
    pub days: Vec<String>,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AutoscaleProfile {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscale_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graceful_decommission_timeout: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_based_config: Option<LoadBasedConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_based_config: Option<ScheduleBasedConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoadBasedConfig {
    #[serde(default)]
    pub min_nodes: i64,
    #[serde(default)]
    pub max_nodes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_period: Option<i64>,
    #[serde(default)]
    pub scaling_rules: Vec<ScalingRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScalingRule {
    #[serde(default)]
    pub action_type: String,
    #[serde(default)]
    pub evaluation_count: i64,
    #[serde(default)]
    pub scaling_metric: String,
    #[serde(default)]
    pub comparison_rule: ComparisonRule,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct ComparisonRule {
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub threshold: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScheduleBasedConfig {
    #[serde(default)]
    pub default_count: i64,
    #[serde(default)]
    pub time_zone: String,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Schedule {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
}

impl From<&AutoscaleProfileModel> for AutoscaleProfile {
    fn from(m: &AutoscaleProfileModel) -> Self {
        Self {
            enabled: m.autoscale_enabled,
            autoscale_type: non_empty(&m.autoscale_type),
            graceful_decommission_timeout: non_zero(m.graceful_decommission_timeout),
            load_based_config: m.load_based_config.first().map(|l| LoadBasedConfig {
                min_nodes: l.min_nodes,
                max_nodes: l.max_nodes,
                poll_interval: non_zero(l.poll_interval),
                cooldown_period: non_zero(l.cooldown_period),
                scaling_rules: l
                    .scaling_rules
                    .iter()
                    .map(|r| ScalingRule {
                        action_type: r.action_type.clone(),
                        evaluation_count: r.evaluation_count,
                        scaling_metric: r.scaling_metric.clone(),
                        comparison_rule: r
                            .comparison_rule
                            .first()
                            .map(|c| ComparisonRule {
                                operator: c.operator.clone(),
                                threshold: c.threshold,
                            })
                            .unwrap_or_default(),
                    })
                    .collect(),
            }),
            schedule_based_config: m.schedule_based_config.first().map(|s| ScheduleBasedConfig {
                default_count: s.default_count,
                time_zone: s.time_zone.clone(),
                schedules: s
                    .schedule
                    .iter()
                    .map(|s| Schedule {
                        count: s.count,
                        days: s.days.clone(),
                        start_time: s.start_time.clone(),
                        end_time: s.end_time.clone(),
                    })
                    .collect(),
            }),
        }
    }
}

impl From<AutoscaleProfile> for AutoscaleProfileModel {
    fn from(a: AutoscaleProfile) -> Self {
        Self {
            autoscale_enabled: a.enabled,
            autoscale_type: a.autoscale_type.unwrap_or_default(),
            graceful_decommission_timeout: a.graceful_decommission_timeout.unwrap_or_default(),
            load_based_config: a
                .load_based_config
                .map(|l| LoadBasedConfigModel {
                    min_nodes: l.min_nodes,
                    max_nodes: l.max_nodes,
                    poll_interval: l.poll_interval.unwrap_or_default(),
                    cooldown_period: l.cooldown_period.unwrap_or_default(),
                    scaling_rules: l
                        .scaling_rules
                        .into_iter()
                        .map(|r| ScalingRuleModel {
                            action_type: r.action_type,
                            evaluation_count: r.evaluation_count,
                            scaling_metric: r.scaling_metric,
                            comparison_rule: vec![ComparisonRuleModel {
                                operator: r.comparison_rule.operator,
                                threshold: r.comparison_rule.threshold,
                            }],
                        })
                        .collect(),
                })
                .into_iter()
                .collect(),
            schedule_based_config: a
                .schedule_based_config
                .map(|s| ScheduleBasedConfigModel {
                    default_count: s.default_count,
                    time_zone: s.time_zone,
                    schedule: s
                        .schedules
                        .into_iter()
                        .map(|s| ScheduleModel {
                            count: s.count,
                            days: s.days,
                            start_time: s.start_time,
                            end_time: s.end_time,
                        })
                        .collect(),
                })
                .into_iter()
                .collect(),
        }
    }
}

// Flink

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct FlinkProfileModel {
    pub deployment_mode: String,
    pub num_replicas: i64,
    pub catalog_option: Vec<FlinkCatalogOptionModel>,
    pub history_server: Vec<ComputeResourceModel>,
    pub job_manager: Vec<ComputeResourceModel>,
    pub task_manager: Vec<ComputeResourceModel>,
    pub job_spec: Vec<JobSpecModel>,
    pub storage: Vec<FlinkStorageModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct FlinkCatalogOptionModel {
    pub metastore_db_connection_authentication_mode: String,
    pub metastore_db_connection_password: String,
    pub metastore_db_connection_url: String,
    pub metastore_db_connection_user_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ComputeResourceModel {
    pub cpu: f64,
    pub memory: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct JobSpecModel {
    pub jar_name: String,
    pub job_jar_directory: String,
    pub upgrade_mode: String,
    pub save_point_name: String,
    pub args: String,
    pub entry_class: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct FlinkStorageModel {
    pub storage_url: String,
    pub storage_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FlinkProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_replicas: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_options: Option<FlinkCatalogOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_server: Option<ComputeResource>,
    #[serde(default)]
    pub job_manager: ComputeResource,
    #[serde(default)]
    pub task_manager: ComputeResource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_spec: Option<FlinkJobProfile>,
    #[serde(default)]
    pub storage: FlinkStorageProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct FlinkCatalogOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hive: Option<FlinkHiveCatalogOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FlinkHiveCatalogOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metastore_db_connection_authentication_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metastore_db_connection_password_secret: Option<String>,
    #[serde(rename = "metastoreDbConnectionURL", default)]
    pub metastore_db_connection_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metastore_db_connection_user_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct ComputeResource {
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub memory: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FlinkJobProfile {
    #[serde(default)]
    pub jar_name: String,
    #[serde(default)]
    pub job_jar_directory: String,
    #[serde(default)]
    pub upgrade_mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_point_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_class: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FlinkStorageProfile {
    #[serde(default)]
    pub storage_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl From<&ComputeResourceModel> for ComputeResource {
    fn from(m: &ComputeResourceModel) -> Self {
        Self {
            cpu: m.cpu,
            memory: m.memory,
        }
    }
}

impl From<ComputeResource> for ComputeResourceModel {
    fn from(a: ComputeResource) -> Self {
        Self {
            cpu: a.cpu,
            memory: a.memory,
        }
    }
}

impl From<&FlinkProfileModel> for FlinkProfile {
    fn from(m: &FlinkProfileModel) -> Self {
        Self {
            deployment_mode: non_empty(&m.deployment_mode),
            num_replicas: non_zero(m.num_replicas),
            catalog_options: m.catalog_option.first().map(|c| FlinkCatalogOptions {
                hive: Some(FlinkHiveCatalogOption {
                    metastore_db_connection_authentication_mode: non_empty(
                        &c.metastore_db_connection_authentication_mode,
                    ),
                    metastore_db_connection_password_secret: non_empty(
                        &c.metastore_db_connection_password,
                    ),
                    metastore_db_connection_url: c.metastore_db_connection_url.clone(),
                    metastore_db_connection_user_name: non_empty(
                        &c.metastore_db_connection_user_name,
                    ),
                }),
            }),
            history_server: one(&m.history_server),
            job_manager: one(&m.job_manager).unwrap_or_default(),
            task_manager: one(&m.task_manager).unwrap_or_default(),
            job_spec: m.job_spec.first().map(|j| FlinkJobProfile {
                jar_name: j.jar_name.clone(),
                job_jar_directory: j.job_jar_directory.clone(),
                upgrade_mode: j.upgrade_mode.clone(),
                save_point_name: non_empty(&j.save_point_name),
                args: non_empty(&j.args),
                entry_class: non_empty(&j.entry_class),
            }),
            storage: m
                .storage
                .first()
                .map(|s| FlinkStorageProfile {
                    storage_uri: s.storage_url.clone(),
                    key: non_empty(&s.storage_key),
                })
                .unwrap_or_default(),
        }
    }
}

impl From<FlinkProfile> for FlinkProfileModel {
    fn from(a: FlinkProfile) -> Self {
        Self {
            deployment_mode: a.deployment_mode.unwrap_or_default(),
            num_replicas: a.num_replicas.unwrap_or_default(),
            catalog_option: a
                .catalog_options
                .and_then(|c| c.hive)
                .map(|h| FlinkCatalogOptionModel {
                    metastore_db_connection_authentication_mode: h
                        .metastore_db_connection_authentication_mode
                        .unwrap_or_default(),
                    metastore_db_connection_password: h
                        .metastore_db_connection_password_secret
                        .unwrap_or_default(),
                    metastore_db_connection_url: h.metastore_db_connection_url,
                    metastore_db_connection_user_name: h
                        .metastore_db_connection_user_name
                        .unwrap_or_default(),
                })
                .into_iter()
                .collect(),
            history_server: block(a.history_server),
            job_manager: vec![a.job_manager.into()],
            task_manager: vec![a.task_manager.into()],
            job_spec: a
                .job_spec
                .map(|j| JobSpecModel {
                    jar_name: j.jar_name,
                    job_jar_directory: j.job_jar_directory,
                    upgrade_mode: j.upgrade_mode,
                    save_point_name: j.save_point_name.unwrap_or_default(),
                    args: j.args.unwrap_or_default(),
                    entry_class: j.entry_class.unwrap_or_default(),
                })
                .into_iter()
                .collect(),
            storage: vec![FlinkStorageModel {
                storage_url: a.storage.storage_uri,
                storage_key: a.storage.key.unwrap_or_default(),
            }],
        }
    }
}

// Identity

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct IdentityProfileModel {
    pub msi_client_id: String,
    pub msi_object_id: String,
    pub msi_resource_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IdentityProfile {
    #[serde(default)]
    pub msi_client_id: String,
    #[serde(default)]
    pub msi_object_id: String,
    #[serde(default)]
    pub msi_resource_id: String,
}

impl From<&IdentityProfileModel> for IdentityProfile {
    fn from(m: &IdentityProfileModel) -> Self {
        Self {
            msi_client_id: m.msi_client_id.clone(),
            msi_object_id: m.msi_object_id.clone(),
            msi_resource_id: m.msi_resource_id.clone(),
        }
    }
}

impl From<IdentityProfile> for IdentityProfileModel {
    fn from(a: IdentityProfile) -> Self {
        Self {
            msi_client_id: a.msi_client_id,
            msi_object_id: a.msi_object_id,
            msi_resource_id: a.msi_resource_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ManagedIdentityProfileModel {
    pub identities: Vec<ManagedIdentityModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ManagedIdentityModel {
    pub client_id: String,
    pub object_id: String,
    pub resource_id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ManagedIdentityProfile {
    #[serde(default)]
    pub identity_list: Vec<ManagedIdentitySpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ManagedIdentitySpec {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub object_id: String,
    #[serde(default)]
    pub resource_id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl From<&ManagedIdentityProfileModel> for ManagedIdentityProfile {
    fn from(m: &ManagedIdentityProfileModel) -> Self {
        Self {
            identity_list: m
                .identities
                .iter()
                .map(|i| ManagedIdentitySpec {
                    client_id: i.client_id.clone(),
                    object_id: i.object_id.clone(),
                    resource_id: i.resource_id.clone(),
                    kind: i.kind.clone(),
                })
                .collect(),
        }
    }
}

impl From<ManagedIdentityProfile> for ManagedIdentityProfileModel {
    fn from(a: ManagedIdentityProfile) -> Self {
        Self {
            identities: a
                .identity_list
                .into_iter()
                .map(|i| ManagedIdentityModel {
                    client_id: i.client_id,
                    object_id: i.object_id,
                    resource_id: i.resource_id,
                    kind: i.kind,
                })
                .collect(),
        }
    }
}

// Kafka

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct KafkaProfileModel {
    pub disk_storage: Vec<DiskStorageModel>,
    pub kraft_enabled: bool,
    pub public_endpoint_enabled: bool,
    pub remote_storage_uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct DiskStorageModel {
    pub disk_size: i64,
    pub disk_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KafkaProfile {
    #[serde(default)]
    pub disk_storage: DiskStorageProfile,
    #[serde(rename = "enableKRaft", default, skip_serializing_if = "Option::is_none")]
    pub enable_kraft: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_public_endpoints: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_storage_uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DiskStorageProfile {
    #[serde(default)]
    pub data_disk_size: i64,
    #[serde(default)]
    pub data_disk_type: String,
}

impl From<&KafkaProfileModel> for KafkaProfile {
    fn from(m: &KafkaProfileModel) -> Self {
        Self {
            disk_storage: m
                .disk_storage
                .first()
                .map(|d| DiskStorageProfile {
                    data_disk_size: d.disk_size,
                    data_disk_type: d.disk_type.clone(),
                })
                .unwrap_or_default(),
            enable_kraft: Some(m.kraft_enabled),
            enable_public_endpoints: Some(m.public_endpoint_enabled),
            remote_storage_uri: non_empty(&m.remote_storage_uri),
        }
    }
}

impl From<KafkaProfile> for KafkaProfileModel {
    fn from(a: KafkaProfile) -> Self {
        Self {
            disk_storage: vec![DiskStorageModel {
                disk_size: a.disk_storage.data_disk_size,
                disk_type: a.disk_storage.data_disk_type,
            }],
            kraft_enabled: a.enable_kraft.unwrap_or_default(),
            public_endpoint_enabled: a.enable_public_endpoints.unwrap_or_default(),
            remote_storage_uri: a.remote_storage_uri.unwrap_or_default(),
        }
    }
}

// Log analytics, cluster access, prometheus

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct LogAnalyticsProfileModel {
    pub enabled: bool,
    pub metrics_enabled: bool,
    pub application_logs: Vec<ApplicationLogsModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ApplicationLogsModel {
    pub std_error_enabled: bool,
    pub std_out_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LogAnalyticsProfile {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_logs: Option<ApplicationLogs>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApplicationLogs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_error_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_out_enabled: Option<bool>,
}

impl From<&LogAnalyticsProfileModel> for LogAnalyticsProfile {
    fn from(m: &LogAnalyticsProfileModel) -> Self {
        Self {
            enabled: m.enabled,
            metrics_enabled: Some(m.metrics_enabled),
            application_logs: m.application_logs.first().map(|l| ApplicationLogs {
                std_error_enabled: Some(l.std_error_enabled),
                std_out_enabled: Some(l.std_out_enabled),
            }),
        }
    }
}

impl From<LogAnalyticsProfile> for LogAnalyticsProfileModel {
    fn from(a: LogAnalyticsProfile) -> Self {
        Self {
            enabled: a.enabled,
            metrics_enabled: a.metrics_enabled.unwrap_or_default(),
            application_logs: a
                .application_logs
                .map(|l| ApplicationLogsModel {
                    std_error_enabled: l.std_error_enabled.unwrap_or_default(),
                    std_out_enabled: l.std_out_enabled.unwrap_or_default(),
                })
                .into_iter()
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ClusterAccessProfileModel {
    pub internal_ingress_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClusterAccessProfile {
    #[serde(default)]
    pub enable_internal_ingress: bool,
}

impl From<&ClusterAccessProfileModel> for ClusterAccessProfile {
    fn from(m: &ClusterAccessProfileModel) -> Self {
        Self {
            enable_internal_ingress: m.internal_ingress_enabled,
        }
    }
}

impl From<ClusterAccessProfile> for ClusterAccessProfileModel {
    fn from(a: ClusterAccessProfile) -> Self {
        Self {
            internal_ingress_enabled: a.enable_internal_ingress,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PrometheusProfileModel {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct PrometheusProfile {
    #[serde(default)]
    pub enabled: bool,
}

impl From<&PrometheusProfileModel> for PrometheusProfile {
    fn from(m: &PrometheusProfileModel) -> Self {
        Self { enabled: m.enabled }
    }
}

impl From<PrometheusProfile> for PrometheusProfileModel {
    fn from(a: PrometheusProfile) -> Self {
        Self { enabled: a.enabled }
    }
}

// Ranger

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct RangerProfileModel {
    pub ranger_admin: Vec<RangerAdminModel>,
    pub ranger_user_sync: Vec<RangerUserSyncModel>,
    pub storage_account: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct RangerAdminModel {
    pub admins: Vec<String>,
    pub database: Vec<RangerDatabaseModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct RangerDatabaseModel {
    pub host: String,
    pub name: String,
    pub password_secret_ref: String,
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct RangerUserSyncModel {
    pub enabled: bool,
    pub groups: Vec<String>,
    pub mode: String,
    pub user_mapping_location: String,
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RangerProfile {
    #[serde(default)]
    pub ranger_admin: RangerAdminSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranger_audit: Option<RangerAuditSpec>,
    #[serde(default)]
    pub ranger_usersync: RangerUsersyncSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct RangerAdminSpec {
    #[serde(default)]
    pub admins: Vec<String>,
    #[serde(default)]
    pub database: RangerDatabase,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RangerDatabase {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_secret_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RangerAuditSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_account: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RangerUsersyncSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_mapping_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<String>>,
}

impl From<&RangerProfileModel> for RangerProfile {
    fn from(m: &RangerProfileModel) -> Self {
        Self {
            ranger_admin: m
                .ranger_admin
                .first()
                .map(|a| RangerAdminSpec {
                    admins: a.admins.clone(),
                    database: a
                        .database
                        .first()
                        .map(|d| RangerDatabase {
                            host: d.host.clone(),
                            name: d.name.clone(),
                            password_secret_ref: non_empty(&d.password_secret_ref),
                            username: non_empty(&d.username),
                        })
                        .unwrap_or_default(),
                })
                .unwrap_or_default(),
            ranger_audit: non_empty(&m.storage_account).map(|storage_account| RangerAuditSpec {
                storage_account: Some(storage_account),
            }),
            ranger_usersync: m
                .ranger_user_sync
                .first()
                .map(|u| RangerUsersyncSpec {
                    enabled: Some(u.enabled),
                    groups: non_empty_list(&u.groups),
                    mode: non_empty(&u.mode),
                    user_mapping_location: non_empty(&u.user_mapping_location),
                    users: non_empty_list(&u.users),
                })
                .unwrap_or_default(),
        }
    }
}

impl From<RangerProfile> for RangerProfileModel {
    fn from(a: RangerProfile) -> Self {
        let db = a.ranger_admin.database;
        let sync = a.ranger_usersync;
        Self {
            ranger_admin: vec![RangerAdminModel {
                admins: a.ranger_admin.admins,
                database: vec![RangerDatabaseModel {
                    host: db.host,
                    name: db.name,
                    password_secret_ref: db.password_secret_ref.unwrap_or_default(),
                    username: db.username.unwrap_or_default(),
                }],
            }],
            ranger_user_sync: vec![RangerUserSyncModel {
                enabled: sync.enabled.unwrap_or_default(),
                groups: sync.groups.unwrap_or_default(),
                mode: sync.mode.unwrap_or_default(),
                user_mapping_location: sync.user_mapping_location.unwrap_or_default(),
                users: sync.users.unwrap_or_default(),
            }],
            storage_account: a
                .ranger_audit
                .and_then(|r| r.storage_account)
                .unwrap_or_default(),
        }
    }
}

// Script actions

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ScriptActionProfileModel {
    pub name: String,
    pub services: Vec<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub parameters: String,
    pub should_persist: bool,
    pub timeout_in_minutes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScriptActionProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_persist: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_in_minutes: Option<i64>,
}

impl From<&ScriptActionProfileModel> for ScriptActionProfile {
    fn from(m: &ScriptActionProfileModel) -> Self {
        Self {
            name: m.name.clone(),
            services: m.services.clone(),
            kind: m.kind.clone(),
            url: m.url.clone(),
            parameters: non_empty(&m.parameters),
            should_persist: Some(m.should_persist),
            timeout_in_minutes: Some(m.timeout_in_minutes),
        }
    }
}

impl From<ScriptActionProfile> for ScriptActionProfileModel {
    fn from(a: ScriptActionProfile) -> Self {
        Self {
            name: a.name,
            services: a.services,
            kind: a.kind,
            url: a.url,
            parameters: a.parameters.unwrap_or_default(),
            should_persist: a.should_persist.unwrap_or_default(),
            timeout_in_minutes: a.timeout_in_minutes.unwrap_or_default(),
        }
    }
}

// Secrets

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SecretsProfileModel {
    pub key_vault_resource_id: String,
    pub secrets: Vec<SecretModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SecretModel {
    pub key_vault_object_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub reference_name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SecretsProfile {
    #[serde(default)]
    pub key_vault_resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<Vec<SecretReference>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SecretReference {
    #[serde(default)]
    pub key_vault_object_name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub reference_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl From<&SecretsProfileModel> for SecretsProfile {
    fn from(m: &SecretsProfileModel) -> Self {
        Self {
            key_vault_resource_id: m.key_vault_resource_id.clone(),
            secrets: (!m.secrets.is_empty()).then(|| {
                m.secrets
                    .iter()
                    .map(|s| SecretReference {
                        key_vault_object_name: s.key_vault_object_name.clone(),
                        kind: s.kind.clone(),
                        reference_name: s.reference_name.clone(),
                        version: non_empty(&s.version),
                    })
                    .collect()
            }),
        }
    }
}

impl From<SecretsProfile> for SecretsProfileModel {
    fn from(a: SecretsProfile) -> Self {
        Self {
            key_vault_resource_id: a.key_vault_resource_id,
            secrets: a
                .secrets
                .unwrap_or_default()
                .into_iter()
                .map(|s| SecretModel {
                    key_vault_object_name: s.key_vault_object_name,
                    kind: s.kind,
                    reference_name: s.reference_name,
                    version: s.version.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

// Service configs

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ServiceConfigsProfileModel {
    pub service_name: String,
    pub configs: Vec<ServiceConfigModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ServiceConfigModel {
    pub component: String,
    pub files: Vec<ConfigFileModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ConfigFileModel {
    pub file_name: String,
    pub content: String,
    pub encoding: String,
    pub path: String,
    pub values: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServiceConfigsProfile {
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub configs: Vec<ServiceConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct ServiceConfig {
    #[serde(default)]
    pub component: String,
    #[serde(default)]
    pub files: Vec<ConfigFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigFile {
    #[serde(default)]
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<HashMap<String, String>>,
}

impl From<&ServiceConfigsProfileModel> for ServiceConfigsProfile {
    fn from(m: &ServiceConfigsProfileModel) -> Self {
        Self {
            service_name: m.service_name.clone(),
            configs: m
                .configs
                .iter()
                .map(|c| ServiceConfig {
                    component: c.component.clone(),
                    files: c
                        .files
                        .iter()
                        .map(|f| ConfigFile {
                            file_name: f.file_name.clone(),
                            content: non_empty(&f.content),
                            encoding: non_empty(&f.encoding),
                            path: non_empty(&f.path),
                            values: (!f.values.is_empty()).then(|| f.values.clone()),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl From<ServiceConfigsProfile> for ServiceConfigsProfileModel {
    fn from(a: ServiceConfigsProfile) -> Self {
        Self {
            service_name: a.service_name,
            configs: a
                .configs
                .into_iter()
                .map(|c| ServiceConfigModel {
                    component: c.component,
                    files: c
                        .files
                        .into_iter()
                        .map(|f| ConfigFileModel {
                            file_name: f.file_name,
                            content: f.content.unwrap_or_default(),
                            encoding: f.encoding.unwrap_or_default(),
                            path: f.path.unwrap_or_default(),
                            values: f.values.unwrap_or_default(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

// Spark

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SparkProfileModel {
    pub default_storage_url: String,
    pub metastore_spec: Vec<MetastoreSpecModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct MetastoreSpecModel {
    pub db_connection_authentication_mode: String,
    pub db_name: String,
    pub db_password_secret_name: String,
    pub db_server_host: String,
    pub db_user_name: String,
    pub key_vault_id: String,
    pub thrift_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SparkProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_storage_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metastore_spec: Option<SparkMetastoreSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SparkMetastoreSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_connection_authentication_mode: Option<String>,
    #[serde(default)]
    pub db_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_password_secret_name: Option<String>,
    #[serde(default)]
    pub db_server_host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_vault_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thrift_url: Option<String>,
}

impl From<&SparkProfileModel> for SparkProfile {
    fn from(m: &SparkProfileModel) -> Self {
        Self {
            default_storage_url: non_empty(&m.default_storage_url),
            metastore_spec: m.metastore_spec.first().map(|s| SparkMetastoreSpec {
                db_connection_authentication_mode: non_empty(&s.db_connection_authentication_mode),
                db_name: s.db_name.clone(),
                db_password_secret_name: non_empty(&s.db_password_secret_name),
                db_server_host: s.db_server_host.clone(),
                db_user_name: non_empty(&s.db_user_name),
                key_vault_id: non_empty(&s.key_vault_id),
                thrift_url: non_empty(&s.thrift_url),
            }),
        }
    }
}

impl From<SparkProfile> for SparkProfileModel {
    fn from(a: SparkProfile) -> Self {
        Self {
            default_storage_url: a.default_storage_url.unwrap_or_default(),
            metastore_spec: a
                .metastore_spec
                .map(|s| MetastoreSpecModel {
                    db_connection_authentication_mode: s
                        .db_connection_authentication_mode
                        .unwrap_or_default(),
                    db_name: s.db_name,
                    db_password_secret_name: s.db_password_secret_name.unwrap_or_default(),
                    db_server_host: s.db_server_host,
                    db_user_name: s.db_user_name.unwrap_or_default(),
                    key_vault_id: s.key_vault_id.unwrap_or_default(),
                    thrift_url: s.thrift_url.unwrap_or_default(),
                })
                .into_iter()
                .collect(),
        }
    }
}

// SSH

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SshProfileModel {
    pub count: i64,
    pub vm_size: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SshProfile {
    #[serde(default)]
    pub count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_size: Option<String>,
}

impl From<&SshProfileModel> for SshProfile {
    fn from(m: &SshProfileModel) -> Self {
        Self {
            count: m.count,
            vm_size: non_empty(&m.vm_size),
        }
    }
}

impl From<SshProfile> for SshProfileModel {
    fn from(a: SshProfile) -> Self {
        Self {
            count: a.count,
            vm_size: a.vm_size.unwrap_or_default(),
        }
    }
}

// Trino

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct TrinoProfileModel {
    pub catalog_options: Vec<TrinoCatalogOptionsModel>,
    pub coordinator: Vec<TrinoCoordinatorModel>,
    pub worker: Vec<TrinoWorkerModel>,
    pub user_plugins_spec: Vec<TrinoUserPluginsModel>,
    pub user_telemetry_spec: Vec<TrinoUserTelemetryModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct TrinoCatalogOptionsModel {
    pub hive: Vec<HiveCatalogModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct HiveCatalogModel {
    pub catalog_name: String,
    pub metastore_db_connection_authentication_mode: String,
    pub metastore_db_connection_password: String,
    pub metastore_db_connection_url: String,
    pub metastore_db_connection_user_name: String,
    pub metastore_warehouse_dir: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct TrinoCoordinatorModel {
    pub debug: Vec<TrinoDebugModel>,
    pub high_availability_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct TrinoWorkerModel {
    pub debug: Vec<TrinoDebugModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct TrinoDebugModel {
    pub enabled: bool,
    pub port: i64,
    pub suspend: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct TrinoUserPluginsModel {
    pub plugins: Vec<TrinoPluginModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct TrinoPluginModel {
    pub enabled: bool,
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct TrinoUserTelemetryModel {
    pub hive_catalog_name: String,
    pub hive_catalog_schema: String,
    pub partition_retention_in_days: i64,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrinoProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_options: Option<TrinoCatalogOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinator: Option<TrinoCoordinator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<TrinoWorker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_plugins_spec: Option<TrinoUserPlugins>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_telemetry_spec: Option<TrinoUserTelemetry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct TrinoCatalogOptions {
    #[serde(default)]
    pub hive: Vec<HiveCatalogOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HiveCatalogOption {
    #[serde(default)]
    pub catalog_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metastore_db_connection_authentication_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metastore_db_connection_password_secret: Option<String>,
    #[serde(rename = "metastoreDbConnectionURL", default)]
    pub metastore_db_connection_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metastore_db_connection_user_name: Option<String>,
    #[serde(default)]
    pub metastore_warehouse_dir: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrinoCoordinator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<TrinoDebugConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_availability_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct TrinoWorker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<TrinoDebugConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct TrinoDebugConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspend: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct TrinoUserPlugins {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<TrinoUserPlugin>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct TrinoUserPlugin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct TrinoUserTelemetry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<TrinoTelemetryConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrinoTelemetryConfig {
    #[serde(rename = "hivecatalogName", default, skip_serializing_if = "Option::is_none")]
    pub hive_catalog_name: Option<String>,
    #[serde(rename = "hivecatalogSchema", default, skip_serializing_if = "Option::is_none")]
    pub hive_catalog_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_retention_in_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl From<&TrinoDebugModel> for TrinoDebugConfig {
    fn from(m: &TrinoDebugModel) -> Self {
        Self {
            enable: Some(m.enabled),
            port: non_zero(m.port),
            suspend: Some(m.suspend),
        }
    }
}

impl From<TrinoDebugConfig> for TrinoDebugModel {
    fn from(a: TrinoDebugConfig) -> Self {
        Self {
            enabled: a.enable.unwrap_or_default(),
            port: a.port.unwrap_or_default(),
            suspend: a.suspend.unwrap_or_default(),
        }
    }
}

impl From<&TrinoProfileModel> for TrinoProfile {
    fn from(m: &TrinoProfileModel) -> Self {
        Self {
            catalog_options: m.catalog_options.first().map(|c| TrinoCatalogOptions {
                hive: c
                    .hive
                    .iter()
                    .map(|h| HiveCatalogOption {
                        catalog_name: h.catalog_name.clone(),
                        metastore_db_connection_authentication_mode: non_empty(
                            &h.metastore_db_connection_authentication_mode,
                        ),
                        metastore_db_connection_password_secret: non_empty(
                            &h.metastore_db_connection_password,
                        ),
                        metastore_db_connection_url: h.metastore_db_connection_url.clone(),
                        metastore_db_connection_user_name: non_empty(
                            &h.metastore_db_connection_user_name,
                        ),
                        metastore_warehouse_dir: h.metastore_warehouse_dir.clone(),
                    })
                    .collect(),
            }),
            coordinator: m.coordinator.first().map(|c| TrinoCoordinator {
                debug: one(&c.debug),
                high_availability_enabled: Some(c.high_availability_enabled),
            }),
            worker: m.worker.first().map(|w| TrinoWorker {
                debug: one(&w.debug),
            }),
            user_plugins_spec: m.user_plugins_spec.first().map(|u| TrinoUserPlugins {
                plugins: Some(
                    u.plugins
                        .iter()
                        .map(|p| TrinoUserPlugin {
                            enabled: Some(p.enabled),
                            name: non_empty(&p.name),
                            path: non_empty(&p.path),
                        })
                        .collect(),
                ),
            }),
            user_telemetry_spec: m.user_telemetry_spec.first().map(|t| TrinoUserTelemetry {
                storage: Some(TrinoTelemetryConfig {
                    hive_catalog_name: non_empty(&t.hive_catalog_name),
                    hive_catalog_schema: non_empty(&t.hive_catalog_schema),
                    partition_retention_in_days: non_zero(t.partition_retention_in_days),
                    path: non_empty(&t.path),
                }),
            }),
        }
    }
}

impl From<TrinoProfile> for TrinoProfileModel {
    fn from(a: TrinoProfile) -> Self {
        Self {
            catalog_options: a
                .catalog_options
                .map(|c| TrinoCatalogOptionsModel {
                    hive: c
                        .hive
                        .into_iter()
                        .map(|h| HiveCatalogModel {
                            catalog_name: h.catalog_name,
                            metastore_db_connection_authentication_mode: h
                                .metastore_db_connection_authentication_mode
                                .unwrap_or_default(),
                            metastore_db_connection_password: h
                                .metastore_db_connection_password_secret
                                .unwrap_or_default(),
                            metastore_db_connection_url: h.metastore_db_connection_url,
                            metastore_db_connection_user_name: h
                                .metastore_db_connection_user_name
                                .unwrap_or_default(),
                            metastore_warehouse_dir: h.metastore_warehouse_dir,
                        })
                        .collect(),
                })
                .into_iter()
                .collect(),
            coordinator: a
                .coordinator
                .map(|c| TrinoCoordinatorModel {
                    debug: block(c.debug),
                    high_availability_enabled: c.high_availability_enabled.unwrap_or_default(),
                })
                .into_iter()
                .collect(),
            worker: a
                .worker
                .map(|w| TrinoWorkerModel {
                    debug: block(w.debug),
                })
                .into_iter()
                .collect(),
            user_plugins_spec: a
                .user_plugins_spec
                .map(|u| TrinoUserPluginsModel {
                    plugins: u
                        .plugins
                        .unwrap_or_default()
                        .into_iter()
                        .map(|p| TrinoPluginModel {
                            enabled: p.enabled.unwrap_or_default(),
                            name: p.name.unwrap_or_default(),
                            path: p.path.unwrap_or_default(),
                        })
                        .collect(),
                })
                .into_iter()
                .collect(),
            user_telemetry_spec: a
                .user_telemetry_spec
                .and_then(|t| t.storage)
                .map(|s| TrinoUserTelemetryModel {
                    hive_catalog_name: s.hive_catalog_name.unwrap_or_default(),
                    hive_catalog_schema: s.hive_catalog_schema.unwrap_or_default(),
                    partition_retention_in_days: s.partition_retention_in_days.unwrap_or_default(),
                    path: s.path.unwrap_or_default(),
                })
                .into_iter()
                .collect(),
        }
    }
}
