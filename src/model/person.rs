use crate::registry::{FieldDescriptor, IdentifierValue};
use std::fmt::Display;
use uuid::Uuid;

pub const PEOPLE: &str = "people";

/// Type-safe identifier for people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PersonId(pub Uuid);

impl From<Uuid> for PersonId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl IdentifierValue for PersonId {
    fn to_identifier(&self) -> Option<String> {
        Some(self.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub email: Option<String>,
}

impl Person {
    pub fn new(id: impl Into<PersonId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::identifier("id", |p: &Person| p.id),
            FieldDescriptor::attribute("name", |p: &Person| p.name.clone()),
            FieldDescriptor::attribute("email", |p: &Person| p.email.clone()).with_wire_name("email-address"),
        ]
    }
}

crate::impl_resource!(Person);
