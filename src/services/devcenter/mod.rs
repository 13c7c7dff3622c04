//! Microsoft Dev Box.

mod dev_box_definition;

use crate::resources::{Resource, ServiceRegistration};

use dev_box_definition::DevBoxDefinitionResource;

pub(crate) const API_VERSION: &str = "2023-04-01";

pub(crate) struct Registration;

impl ServiceRegistration for Registration {
    fn name(&self) -> &'static str {
        "Dev Center"
    }

    fn website_categories(&self) -> Vec<&'static str> {
        vec!["Dev Center"]
    }

    fn resources(&self) -> Vec<Box<dyn Resource>> {
        vec![Box::new(DevBoxDefinitionResource)]
    }
}
