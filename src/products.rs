//! Named intermediate products shared between build rounds
//!
//! A task declares what it consumes during `prepare`; producers publish data
//! under the same name before the task executes.

use crate::error::ToolError;
use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

pub const EXCLUSIVES_GROUPS: &str = "exclusives_groups";
pub const JAR_PRODUCTS: &str = "jar_products";

#[derive(Default)]
pub struct Products {
    data: HashMap<String, Arc<dyn Any + Send + Sync>>,
    required: BTreeSet<String>,
}

impl Products {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_data(&mut self, name: &str) {
        self.required.insert(name.to_string());
    }

    /// Publish a product, replacing any previous value under `name`
    pub fn safe_create_data<T: Any + Send + Sync>(&mut self, name: &str, value: T) {
        self.data.insert(name.to_string(), Arc::new(value));
    }

    /// Fetch a product by name and type
    ///
    /// # Errors
    ///
    /// `ToolError::Configuration` when the product is missing or was published
    /// with a different type; both indicate rounds running out of order.
    pub fn get_data<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, ToolError> {
        let value = self.data.get(name).cloned().ok_or_else(|| {
            ToolError::configuration(format!("Product {} was never produced", name))
        })?;

        value.downcast::<T>().map_err(|_| {
            ToolError::configuration(format!(
                "Product {} is not a {}",
                name,
                std::any::type_name::<T>()
            ))
        })
    }

    /// Required products that nothing has published yet
    pub fn missing_requirements(&self) -> Vec<&str> {
        self.required
            .iter()
            .filter(|name| !self.data.contains_key(name.as_str()))
            .map(String::as_str)
            .collect()
    }
}
