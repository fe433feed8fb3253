use tilegen_common::GenerateError;

use crate::Manifest;

/// Callback appending operations to the manifest.
pub type RegisterFn = Box<dyn Fn(&mut Manifest) -> Result<(), GenerateError>>;

/// Named registration callbacks, split into a high priority and a default registry.
///
/// High priority callbacks run first. A default callback whose name is claimed by a high
/// priority one never runs.
#[derive(Default)]
pub struct OperationRegistry {
    high_priority: Vec<(String, RegisterFn)>,
    default: Vec<(String, RegisterFn)>,
}

/// Registration callbacks in execution order.
pub struct ResolvedRegistrations<'a> {
    pub callbacks: Vec<(&'a str, &'a RegisterFn)>,
    /// Default registrations overridden by a high priority one.
    pub skipped: Vec<&'a str>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a default callback, replacing any default callback of the same name in place.
    pub fn register<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&mut Manifest) -> Result<(), GenerateError> + 'static,
    {
        insert(&mut self.default, name, Box::new(func));
    }

    /// Registers a callback overriding the default callback of the same name.
    pub fn register_high_priority<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&mut Manifest) -> Result<(), GenerateError> + 'static,
    {
        insert(&mut self.high_priority, name, Box::new(func));
    }

    pub fn resolve(&self) -> ResolvedRegistrations<'_> {
        let mut callbacks: Vec<_> = self
            .high_priority
            .iter()
            .map(|(name, func)| (name.as_str(), func))
            .collect();
        let mut skipped = Vec::new();

        for (name, func) in self.default.iter() {
            if self.high_priority.iter().any(|(claimed, _)| claimed == name) {
                skipped.push(name.as_str());
            } else {
                callbacks.push((name.as_str(), func));
            }
        }

        ResolvedRegistrations { callbacks, skipped }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.high_priority
            .iter()
            .chain(self.default.iter())
            .map(|(name, _)| name.as_str())
    }
}

impl core::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names = |list: &Vec<(String, RegisterFn)>| {
            list.iter().map(|(name, _)| name.clone()).collect::<Vec<_>>()
        };

        f.debug_struct("OperationRegistry")
            .field("high_priority", &names(&self.high_priority))
            .field("default", &names(&self.default))
            .finish()
    }
}

fn insert(list: &mut Vec<(String, RegisterFn)>, name: &str, func: RegisterFn) {
    match list.iter_mut().find(|(existing, _)| existing == name) {
        Some(entry) => entry.1 = func,
        None => list.push((name.to_string(), func)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn noop(_: &mut Manifest) -> Result<(), GenerateError> {
        Ok(())
    }

    #[test]
    fn high_priority_claims_default_name() {
        let mut registry = OperationRegistry::new();
        registry.register("basic_matmul", noop);
        registry.register("grouped_matmul", noop);
        registry.register_high_priority("basic_matmul", noop);

        let resolved = registry.resolve();
        let order: Vec<_> = resolved.callbacks.iter().map(|(name, _)| *name).collect();

        assert_eq!(order, vec!["basic_matmul", "grouped_matmul"]);
        assert_eq!(resolved.skipped, vec!["basic_matmul"]);
    }

    #[test]
    fn reregistration_keeps_position() {
        let mut registry = OperationRegistry::new();
        registry.register("a", noop);
        registry.register("b", noop);
        registry.register("a", noop);

        let names: Vec<_> = registry.names().collect();

        assert_eq!(names, vec!["a", "b"]);
    }
}
