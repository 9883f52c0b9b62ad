use crate::core::sequence::{ProteinSequence, SequenceError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionRole {
    /// Active region retained after signal-peptide cleavage of the parent protein.
    SecretoryDomain,
    /// High-affinity fragment of a receptor interface.
    ReceptorBinding,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Unknown region role '{0}'. Expected 'secretory-domain' or 'receptor-binding'.")]
pub struct UnknownRegionRole(pub String);

impl RegionRole {
    pub fn as_str(self) -> &'static str {
        match self {
            RegionRole::SecretoryDomain => "secretory-domain",
            RegionRole::ReceptorBinding => "receptor-binding",
        }
    }
}

impl fmt::Display for RegionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionRole {
    type Err = UnknownRegionRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "secretory-domain" | "secretory" => Ok(RegionRole::SecretoryDomain),
            "receptor-binding" | "binding" => Ok(RegionRole::ReceptorBinding),
            _ => Err(UnknownRegionRole(s.to_string())),
        }
    }
}

/// A known source fragment that seeds candidate generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRegion {
    id: String,
    sequence: ProteinSequence,
    role: RegionRole,
    species: String,
}

impl ReferenceRegion {
    pub fn new(
        id: impl Into<String>,
        sequence: &str,
        role: RegionRole,
        species: impl Into<String>,
    ) -> Result<Self, SequenceError> {
        Ok(Self {
            id: id.into(),
            sequence: ProteinSequence::new(sequence)?,
            role,
            species: species.into(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sequence(&self) -> &ProteinSequence {
        &self.sequence
    }

    pub fn role(&self) -> RegionRole {
        self.role
    }

    pub fn species(&self) -> &str {
        &self.species
    }
}
