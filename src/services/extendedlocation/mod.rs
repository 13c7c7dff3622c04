//! Azure Arc custom locations.

mod custom_location;

use crate::resources::{Resource, ServiceRegistration};

use custom_location::CustomLocationResource;

pub(crate) const API_VERSION: &str = "2021-08-15";

pub(crate) struct Registration;

impl ServiceRegistration for Registration {
    fn name(&self) -> &'static str {
        "ExtendedLocation"
    }

    fn website_categories(&self) -> Vec<&'static str> {
        vec!["Extended Location"]
    }

    fn resources(&self) -> Vec<Box<dyn Resource>> {
        vec![Box::new(CustomLocationResource)]
    }
}
