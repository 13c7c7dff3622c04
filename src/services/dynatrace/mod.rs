//! Dynatrace observability monitors.

mod single_sign_on;

use crate::resources::{Resource, ServiceRegistration};

use single_sign_on::SingleSignOnResource;

pub(crate) const API_VERSION: &str = "2023-04-27";

pub(crate) struct Registration;

impl ServiceRegistration for Registration {
    fn name(&self) -> &'static str {
        "Dynatrace"
    }

    fn website_categories(&self) -> Vec<&'static str> {
        vec!["Dynatrace"]
    }

    fn resources(&self) -> Vec<Box<dyn Resource>> {
        vec![Box::new(SingleSignOnResource)]
    }
}
