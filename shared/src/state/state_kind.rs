use std::{
    any::{type_name, TypeId},
    fmt,
};

/// Identifies a registered record type at runtime
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StateKind {
    type_id: TypeId,
    name: &'static str,
}

impl StateKind {
    pub fn of<R: 'static>() -> Self {
        let full_name = type_name::<R>();
        let name = full_name.rsplit("::").next().unwrap_or(full_name);
        Self {
            type_id: TypeId::of::<R>(),
            name,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Short type name, used in log output and errors
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
