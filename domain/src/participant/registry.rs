//! Read-only participant catalog.

use super::entities::Participant;
use crate::core::error::DomainError;
use std::collections::HashMap;

/// Static catalog of participants, keyed by id.
///
/// Built once at startup and shared behind an `Arc`; never mutated afterwards,
/// so lookups need no locking.
#[derive(Debug, Clone, Default)]
pub struct ParticipantRegistry {
    by_id: HashMap<String, Participant>,
    /// Load order, used for listing
    order: Vec<String>,
}

impl ParticipantRegistry {
    /// Build a registry, rejecting duplicate ids.
    pub fn new(participants: Vec<Participant>) -> Result<Self, DomainError> {
        let mut registry = Self::default();
        for participant in participants {
            if registry.by_id.contains_key(participant.id()) {
                return Err(DomainError::InvalidParticipant(format!(
                    "duplicate participant id '{}'",
                    participant.id()
                )));
            }
            registry.order.push(participant.id().to_string());
            registry
                .by_id
                .insert(participant.id().to_string(), participant);
        }
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.by_id.get(id)
    }

    /// All participants in load order.
    pub fn list(&self) -> Vec<&Participant> {
        self.order.iter().filter_map(|id| self.by_id.get(id)).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Check a requested roster: non-empty, every id known and active.
    pub fn resolve_roster(&self, ids: &[String]) -> Result<Vec<&Participant>, DomainError> {
        if ids.is_empty() {
            return Err(DomainError::EmptyRoster);
        }
        ids.iter()
            .map(|id| match self.by_id.get(id) {
                None => Err(DomainError::UnknownParticipant(id.clone())),
                Some(p) if !p.is_active() => Err(DomainError::InactiveParticipant(id.clone())),
                Some(p) => Ok(p),
            })
            .collect()
    }

    /// Display name for an id, falling back to the id itself.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.by_id.get(id).map(|p| p.name()).unwrap_or(id)
    }
}
