//! Rule output: one primary resource plus the resources it had to create.
//!
//! A rule assembles its output in two steps. Child bundles and newly created satellites are
//! collected into [`Satellites`]; once the primary resource is complete, both are sealed into
//! a [`ResourceBundle`] with the primary at position 0. Merging a child moves every resource
//! of the child bundle, primary first, so a parent never holds a reference whose target it
//! does not also hold.

use fhir::{Reference, Resource, ResourceId};
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq)]
pub struct ResourceBundle {
    entries: Vec<Resource>,
}

impl ResourceBundle {
    /// Seals a bundle. Satellites keep their merge order after the primary.
    pub fn new(primary: impl Into<Resource>, satellites: Satellites) -> Self {
        let primary = primary.into();
        let mut entries = Vec::with_capacity(satellites.resources.len() + 1);
        let primary_id = primary.id().clone();
        entries.push(primary);
        entries.extend(
            satellites
                .resources
                .into_iter()
                .filter(|resource| *resource.id() != primary_id),
        );
        Self { entries }
    }

    /// A bundle holding only its primary.
    pub fn single(primary: impl Into<Resource>) -> Self {
        Self::new(primary, Satellites::new())
    }

    pub fn primary(&self) -> &Resource {
        &self.entries[0]
    }

    pub fn primary_id(&self) -> &ResourceId {
        self.primary().id()
    }

    pub fn primary_reference(&self) -> Reference {
        self.primary_id().reference()
    }

    pub fn satellites(&self) -> &[Resource] {
        &self.entries[1..]
    }

    pub fn entries(&self) -> &[Resource] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// A bundle always holds its primary.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, id: &ResourceId) -> Option<&Resource> {
        self.entries.iter().find(|resource| resource.id() == id)
    }

    pub fn into_entries(self) -> Vec<Resource> {
        self.entries
    }

    /// Renders the bundle as a FHIR `collection` bundle.
    pub fn into_fhir_bundle(self) -> fhir::Bundle {
        fhir::Bundle::collection(self.entries)
    }
}

/// Resources collected by a rule before its primary is complete.
///
/// Adding a resource whose identity is already present is a no-op, so a shared child (such as
/// one practitioner asserting several conditions) is held once.
#[derive(Clone, Debug, Default)]
pub struct Satellites {
    resources: Vec<Resource>,
    seen: HashSet<ResourceId>,
}

impl Satellites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a newly created resource and returns a reference to it.
    pub fn add(&mut self, resource: impl Into<Resource>) -> Reference {
        let resource = resource.into();
        let reference = resource.reference();
        self.push(resource);
        reference
    }

    /// Merges every resource of a child bundle and returns a reference to its primary.
    pub fn merge(&mut self, child: ResourceBundle) -> Reference {
        let reference = child.primary_reference();
        for resource in child.entries {
            self.push(resource);
        }
        reference
    }

    /// Merges a child rule's output. `None` contributes nothing and yields no reference.
    pub fn absorb(&mut self, child: Option<ResourceBundle>) -> Option<Reference> {
        child.map(|bundle| self.merge(bundle))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.seen.contains(id)
    }

    fn push(&mut self, resource: Resource) {
        if self.seen.insert(resource.id().clone()) {
            self.resources.push(resource);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ConversionContext;
    use fhir::{Organization, Patient, Practitioner, ResourceKind};

    #[test]
    fn primary_comes_first_and_satellites_keep_merge_order() {
        let mut ctx = ConversionContext::standalone();
        let organization = Organization::new(ctx.next_id(ResourceKind::Organization));
        let practitioner = Practitioner::new(ctx.next_id(ResourceKind::Practitioner));
        let patient = Patient::new(ctx.next_id(ResourceKind::Patient));
        let patient_id = patient.id().clone();

        let mut satellites = Satellites::new();
        satellites.add(organization.clone());
        satellites.add(practitioner.clone());
        let bundle = ResourceBundle::new(patient, satellites);

        assert_eq!(bundle.primary_id(), &patient_id);
        assert_eq!(bundle.len(), 3);
        assert_eq!(bundle.satellites()[0].id(), organization.id());
        assert_eq!(bundle.satellites()[1].id(), practitioner.id());
    }

    #[test]
    fn merge_moves_whole_child_and_returns_primary_reference() {
        let mut ctx = ConversionContext::standalone();
        let organization = Organization::new(ctx.next_id(ResourceKind::Organization));
        let mut child_satellites = Satellites::new();
        child_satellites.add(organization.clone());
        let practitioner = Practitioner::new(ctx.next_id(ResourceKind::Practitioner));
        let child = ResourceBundle::new(practitioner.clone(), child_satellites);

        let mut satellites = Satellites::new();
        let reference = satellites.merge(child);
        assert_eq!(reference, practitioner.id().reference());
        assert_eq!(satellites.len(), 2);
        assert!(satellites.contains(organization.id()));
    }

    #[test]
    fn absorbing_nothing_adds_nothing() {
        let mut satellites = Satellites::new();
        assert!(satellites.absorb(None).is_none());
        assert!(satellites.is_empty());
    }

    #[test]
    fn duplicate_identities_are_held_once() {
        let mut ctx = ConversionContext::standalone();
        let practitioner = Practitioner::new(ctx.next_id(ResourceKind::Practitioner));
        let mut satellites = Satellites::new();
        let first = satellites.add(practitioner.clone());
        let second = satellites.merge(ResourceBundle::single(practitioner));
        assert_eq!(first, second);
        assert_eq!(satellites.len(), 1);
    }

    #[test]
    fn merging_is_associative() {
        let mut ctx = ConversionContext::standalone();
        let a = Organization::new(ctx.next_id(ResourceKind::Organization));
        let b = Organization::new(ctx.next_id(ResourceKind::Organization));
        let c = Organization::new(ctx.next_id(ResourceKind::Organization));

        // (a <- b) <- c
        let mut inner = Satellites::new();
        inner.add(b.clone());
        let ab = ResourceBundle::new(a.clone(), inner);
        let mut outer = Satellites::new();
        outer.merge(ab);
        outer.add(c.clone());
        let left: Vec<_> = outer.resources.iter().map(|r| r.id().clone()).collect();

        // a <- (b <- c)
        let mut inner = Satellites::new();
        inner.add(c.clone());
        let bc = ResourceBundle::new(b.clone(), inner);
        let mut outer = Satellites::new();
        outer.add(a.clone());
        outer.merge(bc);
        let right: Vec<_> = outer.resources.iter().map(|r| r.id().clone()).collect();

        assert_eq!(left, right);
    }
}
