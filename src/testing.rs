//! Test harness for the provider.
//!
//! [`ProviderTester`] drives a [`ProviderService`] the way the Hemmer
//! engine does (plan, then apply, then refresh) without a gRPC server.
//! [`fake_arm::FakeArm`] stands in for Resource Manager.

pub(crate) mod fake_arm;

use serde_json::{json, Value};

use crate::error::ProviderError;
use crate::schema::Diagnostic;
use crate::server::ProviderService;
use crate::types::{ImportedResource, PlanResult};

/// Drives a provider through engine-shaped call sequences.
pub(crate) struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    pub(crate) fn new(provider: P) -> Self {
        Self { provider }
    }

    pub(crate) fn provider(&self) -> &P {
        &self.provider
    }

    /// Configure the provider, failing on any error diagnostic.
    pub(crate) async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    pub(crate) async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    pub(crate) async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, prior_state, proposed_state.clone(), proposed_state)
            .await
    }

    pub(crate) async fn read(
        &self,
        resource_type: &str,
        state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.read(resource_type, state).await
    }

    pub(crate) async fn import(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    /// Plan a create, apply it, then refresh.
    pub(crate) async fn apply_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self.plan(resource_type, None, config).await?;
        assert_plan_creates(&plan);
        let created = self.provider.create(resource_type, plan.planned_state).await?;
        self.read(resource_type, created).await
    }

    /// Plan an in-place update, apply it, then refresh.
    pub(crate) async fn apply_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan = self
            .plan(resource_type, Some(prior_state.clone()), config)
            .await?;
        assert_plan_updates_in_place(&plan);
        let updated = self
            .provider
            .update(resource_type, prior_state, plan.planned_state)
            .await?;
        self.read(resource_type, updated).await
    }

    /// Plan a destroy and apply it.
    pub(crate) async fn apply_delete(
        &self,
        resource_type: &str,
        state: Value,
    ) -> Result<(), ProviderError> {
        let plan = self.plan(resource_type, Some(state.clone()), Value::Null).await?;
        assert!(plan.planned_state.is_null(), "destroy plan should have a null planned state");
        self.provider.delete(resource_type, state).await
    }
}

/// A failed call that may have produced diagnostics instead of an error.
#[derive(Debug)]
pub(crate) enum TestError {
    Diagnostics(Vec<Diagnostic>),
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "{} error diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  {}", diag.summary)?;
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {attr})")?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
            TestError::Provider(e) => write!(f, "provider error: {e}"),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics
        .into_iter()
        .filter(Diagnostic::is_error)
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

pub(crate) fn assert_plan_creates(plan: &PlanResult) {
    assert!(plan.has_changes(), "expected a create plan to have changes");
    assert!(!plan.requires_replace, "expected a create, not a replace");
}

pub(crate) fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(
        !plan.requires_replace,
        "expected an in-place update, but {:?} forces replacement",
        plan.changed_paths()
    );
}

pub(crate) fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let found = diagnostics
        .iter()
        .any(|d| d.is_error() && d.summary.contains(substring));
    assert!(
        found,
        "expected an error containing {substring:?}, got {:?}",
        diagnostics.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Provider configuration pointing at `arm`.
pub(crate) fn provider_config(arm: &fake_arm::FakeArm) -> Value {
    json!({
        "subscription_id": fake_arm::SUBSCRIPTION_ID,
        "access_token": "fake-token",
        "resource_manager_endpoint": arm.uri(),
        "poll_interval_seconds": 1
    })
}

#[cfg(test)]
mod tests {
    use super::fake_arm::{FakeArm, SUBSCRIPTION_ID};
    use super::*;
    use crate::provider::AzureProvider;
    use crate::resourceids::CustomLocationId;

    const CUSTOM_LOCATION: &str = "azurerm_extended_custom_locations";

    fn custom_location() -> Value {
        json!({
            "name": "cl1",
            "resource_group_name": "rg1",
            "location": "westeurope",
            "cluster_extension_ids": ["/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Kubernetes/connectedClusters/k1/providers/Microsoft.KubernetesConfiguration/extensions/vmware"],
            "host_resource_id": "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Kubernetes/connectedClusters/k1",
            "namespace": "ns1",
            "tags": {"env": "test"}
        })
    }

    async fn configured(arm: &FakeArm) -> ProviderTester<AzureProvider> {
        let tester = ProviderTester::new(AzureProvider::new());
        tester.configure(provider_config(arm)).await.unwrap();
        tester
    }

    #[tokio::test]
    async fn test_configure_reports_missing_subscription() {
        let tester = ProviderTester::new(AzureProvider::new());
        let diagnostics = tester
            .provider()
            .configure(json!({"subscription_id": "", "environment": "mars", "access_token": "t"}))
            .await
            .unwrap();
        assert_error_contains(&diagnostics, "subscription_id is required");
        assert_error_contains(&diagnostics, "unknown environment");
    }

    #[tokio::test]
    async fn test_calls_before_configure_fail() {
        let tester = ProviderTester::new(AzureProvider::new());
        let err = tester.read(CUSTOM_LOCATION, json!({"id": "x"})).await.unwrap_err();
        assert!(matches!(err, ProviderError::FailedPrecondition(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_custom_location_lifecycle() {
        let arm = FakeArm::start_with_async_operations().await;
        let tester = configured(&arm).await;
        let id = CustomLocationId::new(SUBSCRIPTION_ID, "rg1", "cl1").to_string();

        tester
            .validate_resource_config(CUSTOM_LOCATION, custom_location())
            .await
            .unwrap();

        let state = tester.apply_create(CUSTOM_LOCATION, custom_location()).await.unwrap();
        assert_eq!(state["id"], id);
        assert_eq!(state["host_type"], "Kubernetes");
        assert_eq!(state["tags"]["env"], "test");

        let plan = tester
            .plan(CUSTOM_LOCATION, Some(state.clone()), state.clone())
            .await
            .unwrap();
        assert!(!plan.has_changes(), "{:?}", plan.changed_paths());

        let mut renamed = state.clone();
        renamed["display_name"] = json!("Renamed");
        let state = tester.apply_update(CUSTOM_LOCATION, state, renamed).await.unwrap();
        assert_eq!(state["display_name"], "Renamed");

        let mut moved = state.clone();
        moved["namespace"] = json!("ns2");
        let plan = tester.plan(CUSTOM_LOCATION, Some(state.clone()), moved).await.unwrap();
        assert!(plan.requires_replace);

        let imported = tokio_test::assert_ok!(tester.import(CUSTOM_LOCATION, &id).await);
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].state["namespace"], "ns1");

        tester.apply_delete(CUSTOM_LOCATION, state.clone()).await.unwrap();
        assert!(arm.get(&id).is_none());
        assert_eq!(tester.read(CUSTOM_LOCATION, state).await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_create_of_existing_resource_requires_import() {
        let arm = FakeArm::start().await;
        let tester = configured(&arm).await;
        let id = CustomLocationId::new(SUBSCRIPTION_ID, "rg1", "cl1").to_string();
        arm.insert(&id, json!({"location": "westeurope", "properties": {}}));

        let err = tester
            .apply_create(CUSTOM_LOCATION, custom_location())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::AlreadyExists(_)), "{err:?}");
        assert!(err.message().contains(&id));
    }

    #[tokio::test]
    async fn test_import_of_missing_resource() {
        let arm = FakeArm::start().await;
        let tester = configured(&arm).await;
        let id = CustomLocationId::new(SUBSCRIPTION_ID, "rg1", "gone").to_string();

        let err = tester.import(CUSTOM_LOCATION, &id).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));

        let err = tester.import(CUSTOM_LOCATION, "/not/an/id").await.unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_plan_rejects_invalid_config() {
        let arm = FakeArm::start().await;
        let tester = configured(&arm).await;
        let mut config = custom_location();
        config["host_type"] = json!("VMware");

        let err = tester.plan(CUSTOM_LOCATION, None, config).await.unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
        assert!(err.message().contains("host_type"));
    }
}
