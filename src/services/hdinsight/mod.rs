//! HDInsight on AKS cluster pools.

mod blocks;
mod cluster;
mod models;

use crate::resources::{Resource, ServiceRegistration};

use cluster::ClusterResource;

pub(crate) const API_VERSION: &str = "2024-05-01";

pub(crate) struct Registration;

impl ServiceRegistration for Registration {
    fn name(&self) -> &'static str {
        "HDInsight"
    }

    fn website_categories(&self) -> Vec<&'static str> {
        vec!["HDInsight"]
    }

    fn resources(&self) -> Vec<Box<dyn Resource>> {
        vec![Box::new(ClusterResource)]
    }
}
