use serde::{Deserialize, Serialize};

use taller_core::{ClientId, DomainError, EmployeeId, Entity, SupplierId};

/// Party kind: client, supplier, or employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    Client,
    Supplier,
    Employee,
}

/// Typed reference to the party a payment or balance belongs to.
///
/// Each kind keeps its own identifier space; the variant tag carries the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "id")]
pub enum PartyRef {
    Client(ClientId),
    Supplier(SupplierId),
    Employee(EmployeeId),
}

impl PartyRef {
    pub fn kind(&self) -> PartyKind {
        match self {
            PartyRef::Client(_) => PartyKind::Client,
            PartyRef::Supplier(_) => PartyKind::Supplier,
            PartyRef::Employee(_) => PartyKind::Employee,
        }
    }
}

impl core::fmt::Display for PartyRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PartyRef::Client(id) => write!(f, "client/{id}"),
            PartyRef::Supplier(id) => write!(f, "supplier/{id}"),
            PartyRef::Employee(id) => write!(f, "employee/{id}"),
        }
    }
}

/// Contact information for a party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Registry record for a client, supplier, or employee.
///
/// Parties carry no lifecycle of their own; their running balance lives in the
/// balance store and is never written from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    id: PartyRef,
    name: String,
    contact: ContactInfo,
}

impl Party {
    pub fn new(
        id: PartyRef,
        name: impl Into<String>,
        contact: ContactInfo,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("party name must not be empty"));
        }
        Ok(Self { id, name, contact })
    }

    pub fn kind(&self) -> PartyKind {
        self.id.kind()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }
}

impl Entity for Party {
    type Id = PartyRef;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
