//! Target registry

use super::BuildUnit;
use crate::error::ToolError;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of build targets, in registration order
#[derive(Clone, Default)]
pub struct TargetRegistry {
    targets: Vec<Arc<dyn BuildUnit>>,
    address_index: HashMap<String, usize>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, target: Arc<dyn BuildUnit>) -> Result<(), ToolError> {
        let address = target.address().to_string();
        if self.address_index.contains_key(&address) {
            return Err(ToolError::configuration(format!(
                "Target {} is declared more than once",
                address
            )));
        }

        self.address_index.insert(address, self.targets.len());
        self.targets.push(target);
        Ok(())
    }

    /// Targets matching `predicate`, in registration order
    pub fn targets<P>(&self, predicate: P) -> Vec<Arc<dyn BuildUnit>>
    where
        P: Fn(&dyn BuildUnit) -> bool,
    {
        self.targets
            .iter()
            .filter(|target| predicate(target.as_ref()))
            .cloned()
            .collect()
    }

    pub fn get(&self, address: &str) -> Option<&Arc<dyn BuildUnit>> {
        self.address_index
            .get(address)
            .map(|&idx| &self.targets[idx])
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Target;
    use std::path::PathBuf;

    fn registry() -> TargetRegistry {
        let mut registry = TargetRegistry::new();
        registry
            .register(Arc::new(Target::new(
                "src/java/acme:lib",
                vec![PathBuf::from("src/java/acme/Lib.java")],
            )))
            .unwrap();
        registry
            .register(Arc::new(
                Target::new("gen:thrift", vec![PathBuf::from("gen/T.java")]).synthetic(),
            ))
            .unwrap();
        registry
    }

    #[test]
    fn test_targets_filters_in_order() {
        let registry = registry();
        let all = registry.targets(|_| true);
        let addresses: Vec<&str> = all.iter().map(|t| t.address()).collect();
        assert_eq!(addresses, vec!["src/java/acme:lib", "gen:thrift"]);

        let real = registry.targets(|t| !t.is_synthetic());
        assert_eq!(real.len(), 1);
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let mut registry = registry();
        let result = registry.register(Arc::new(Target::new("gen:thrift", vec![])));
        assert!(matches!(result, Err(ToolError::Configuration(_))));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_get() {
        let registry = registry();
        assert!(registry.get("gen:thrift").is_some());
        assert!(registry.get("missing:target").is_none());
    }
}
