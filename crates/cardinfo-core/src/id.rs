use uuid::Uuid;

// ids must be unique across every call in the process
pub trait IdProvider {
    fn generate(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4;

impl IdProvider for UuidV4 {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

impl<F> IdProvider for F
where
    F: Fn() -> String,
{
    fn generate(&self) -> String {
        self()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use crate::id::{IdProvider, UuidV4};

    #[test]
    fn uuid_ids_are_distinct_and_hyphenated() {
        let first = UuidV4.generate();
        let second = UuidV4.generate();
        assert_ne!(first, second);
        assert_eq!(first.len(), 36);
        assert_eq!(first.matches('-').count(), 4);
    }

    #[test]
    fn closures_act_as_providers() {
        let counter = Cell::new(0);
        let provider = || {
            counter.set(counter.get() + 1);
            format!("id-{}", counter.get())
        };
        assert_eq!(provider.generate(), "id-1");
        assert_eq!(provider.generate(), "id-2");
    }
}
