//! Persisted stack model and the submission seam.

use serde::{Deserialize, Serialize};
use stackctl_common::error::Result;
use stackctl_common::types::{ProjectId, ServiceKey, StackId, StackServiceId};

use crate::membership::MembershipEntry;
use crate::resolver::StackComposition;

/// One member of a stack as recorded by the remote system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedMember {
    /// Identifier assigned to this member.
    pub id: StackServiceId,
    /// Service type of this member.
    pub service: ServiceKey,
}

/// A stack as recorded by the remote system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedStack {
    /// Identifier assigned to the stack.
    pub id: StackId,
    /// Root service key.
    pub key: ServiceKey,
    /// Stack name.
    pub name: String,
    /// Members with their assigned identifiers.
    #[serde(default)]
    pub services: Vec<PersistedMember>,
}

/// Persists a composed stack on behalf of a project.
pub trait StackSubmission {
    /// Submits `composition` and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns `StackctlError::Submission` if the remote system rejects the
    /// stack, or a transport error if it cannot be reached.
    fn submit(&self, project: &ProjectId, composition: StackComposition) -> Result<PersistedStack>;
}

impl StackComposition {
    /// Returns a copy of this composition with identifiers filled in from
    /// `persisted`, matched by service key.
    ///
    /// Members the persisted record does not mention keep `assigned_id: None`.
    #[must_use]
    pub fn with_assigned_ids(&self, persisted: &PersistedStack) -> Self {
        let members = self
            .members
            .iter()
            .map(|member| MembershipEntry {
                service_key: member.service_key.clone(),
                assigned_id: persisted
                    .services
                    .iter()
                    .find(|p| p.service == member.service_key)
                    .map(|p| p.id.clone()),
            })
            .collect();
        Self {
            root_key: self.root_key.clone(),
            name: self.name.clone(),
            members,
        }
    }
}
