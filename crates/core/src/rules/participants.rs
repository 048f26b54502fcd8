//! People, organizations, places and things.
//!
//! Practitioner rules return a bundle because a practitioner may bring its managing
//! organization along. The other rules here produce a single resource with no references of
//! its own; callers add it to their satellites directly.

use crate::bundle::{ResourceBundle, Satellites};
use crate::context::ConversionContext;
use crate::transformer::{is_absent, mapped, ResourceTransformer};
use cda::entities::{
    AssignedAuthor, AssignedEntity, Author, CustodianOrganization, Entity, Organization,
    ParticipantRole, Performer2, Person,
};
use cda::statements::Supply;
use cda::{present, present_items, Ad, Cd, Ii, Tel};
use fhir::{Device, Group, Location, Practitioner, PractitionerRole, ResourceKind, Substance};

/// The fields assigned authors and assigned entities share.
struct Assignment<'a> {
    ids: &'a [Ii],
    code: Option<&'a Cd>,
    addrs: &'a [Ad],
    telecoms: &'a [Tel],
    person: Option<&'a Person>,
    organization: Option<&'a Organization>,
}

impl ResourceTransformer {
    /// `AssignedAuthor` → Practitioner, with its represented organization.
    pub fn transform_assigned_author(
        &self,
        ctx: &mut ConversionContext,
        author: &AssignedAuthor,
    ) -> Option<ResourceBundle> {
        if is_absent(author, "assignedAuthor") {
            return None;
        }
        Some(self.practitioner(
            ctx,
            Assignment {
                ids: &author.ids,
                code: author.code.as_ref(),
                addrs: &author.addrs,
                telecoms: &author.telecoms,
                person: author.assigned_person.as_ref(),
                organization: author.represented_organization.as_ref(),
            },
        ))
    }

    /// `AssignedEntity` → Practitioner.
    ///
    /// Only the first represented organization becomes the managing organization.
    pub fn transform_assigned_entity(
        &self,
        ctx: &mut ConversionContext,
        entity: &AssignedEntity,
    ) -> Option<ResourceBundle> {
        if is_absent(entity, "assignedEntity") {
            return None;
        }
        Some(self.practitioner(
            ctx,
            Assignment {
                ids: &entity.ids,
                code: entity.code.as_ref(),
                addrs: &entity.addrs,
                telecoms: &entity.telecoms,
                person: entity.assigned_person.as_ref(),
                organization: entity.represented_organizations.first(),
            },
        ))
    }

    /// `Author` participation → Practitioner of its assigned author.
    pub fn transform_author(
        &self,
        ctx: &mut ConversionContext,
        author: &Author,
    ) -> Option<ResourceBundle> {
        if is_absent(author, "author") {
            return None;
        }
        let assigned = author.assigned_author.as_ref()?;
        self.transform_assigned_author(ctx, assigned)
    }

    /// `Performer2` participation → Practitioner of its assigned entity.
    pub fn transform_performer(
        &self,
        ctx: &mut ConversionContext,
        performer: &Performer2,
    ) -> Option<ResourceBundle> {
        if is_absent(performer, "performer") {
            return None;
        }
        let assigned = performer.assigned_entity.as_ref()?;
        self.transform_assigned_entity(ctx, assigned)
    }

    fn practitioner(&self, ctx: &mut ConversionContext, source: Assignment<'_>) -> ResourceBundle {
        let dtt = self.data_types();
        let mut practitioner = Practitioner::new(ctx.next_id(ResourceKind::Practitioner));
        let mut satellites = Satellites::new();

        practitioner.identifier = dtt.identifiers(source.ids);
        if let Some(person) = present(source.person) {
            practitioner.name = present_items(&person.names)
                .filter_map(|pn| dtt.human_name(pn))
                .last();
        }
        practitioner.address = present_items(source.addrs)
            .filter_map(|ad| dtt.address(ad))
            .collect();
        practitioner.telecom = present_items(source.telecoms)
            .filter_map(|tel| dtt.contact_point(tel))
            .collect();

        let role = PractitionerRole {
            role: self.concept(source.code),
            managing_organization: source
                .organization
                .and_then(|org| self.transform_organization(ctx, org))
                .map(|org| satellites.add(org)),
        };
        if role != PractitionerRole::default() {
            practitioner.practitioner_role.push(role);
        }

        ResourceBundle::new(practitioner, satellites)
    }

    /// `Organization` → Organization. Of several names, the last one is kept.
    ///
    /// Sub-fragment helper: returns the bare resource for the caller to add to its own
    /// satellites, so no bundle is built here.
    pub fn transform_organization(
        &self,
        ctx: &mut ConversionContext,
        organization: &Organization,
    ) -> Option<fhir::Organization> {
        if is_absent(organization, "organization") {
            return None;
        }
        let dtt = self.data_types();
        let mut target = fhir::Organization::new(ctx.next_id(ResourceKind::Organization));
        target.identifier = dtt.identifiers(&organization.ids);
        target.name = present_items(&organization.names)
            .filter_map(|on| dtt.organization_name(on))
            .last();
        target.telecom = present_items(&organization.telecoms)
            .filter_map(|tel| dtt.contact_point(tel))
            .collect();
        target.address = present_items(&organization.addrs)
            .filter_map(|ad| dtt.address(ad))
            .collect();
        Some(target)
    }

    /// `CustodianOrganization` → Organization.
    ///
    /// Sub-fragment helper: returns the bare resource for the caller to add to its own
    /// satellites, so no bundle is built here.
    pub fn transform_custodian_organization(
        &self,
        ctx: &mut ConversionContext,
        organization: &CustodianOrganization,
    ) -> Option<fhir::Organization> {
        if is_absent(organization, "representedCustodianOrganization") {
            return None;
        }
        let dtt = self.data_types();
        let mut target = fhir::Organization::new(ctx.next_id(ResourceKind::Organization));
        target.identifier = dtt.identifiers(&organization.ids);
        target.name = organization
            .name
            .as_ref()
            .and_then(|on| dtt.organization_name(on));
        target.telecom = present_items(&organization.telecoms)
            .filter_map(|tel| dtt.contact_point(tel))
            .collect();
        target.address = present_items(&organization.addrs)
            .filter_map(|ad| dtt.address(ad))
            .collect();
        Some(target)
    }

    /// `ParticipantRole` (service delivery location) → Location.
    ///
    /// Sub-fragment helper: returns the bare resource for the caller to add to its own
    /// satellites, so no bundle is built here.
    ///
    /// The name is the text of the playing entity's last name; the last address wins.
    pub fn transform_location(
        &self,
        ctx: &mut ConversionContext,
        role: &ParticipantRole,
    ) -> Option<Location> {
        if is_absent(role, "participantRole") {
            return None;
        }
        let dtt = self.data_types();
        let mut location = Location::new(ctx.next_id(ResourceKind::Location));
        location.identifier = dtt.identifiers(&role.ids);
        if let Some(entity) = present(role.playing_entity.as_ref()) {
            location.name = present_items(&entity.names)
                .filter_map(|pn| pn.text.as_deref().filter(|t| !t.is_empty()))
                .last()
                .map(str::to_owned);
        }
        location.telecom = present_items(&role.telecoms)
            .filter_map(|tel| dtt.contact_point(tel))
            .collect();
        location.address = present_items(&role.addrs)
            .filter_map(|ad| dtt.address(ad))
            .last();
        Some(location)
    }

    /// Coded substance → Substance.
    ///
    /// Sub-fragment helper: returns the bare resource for the caller to add to its own
    /// satellites, so no bundle is built here.
    pub fn transform_substance(&self, ctx: &mut ConversionContext, code: &Cd) -> Option<Substance> {
        if is_absent(code, "substance code") {
            return None;
        }
        let mut substance = Substance::new(ctx.next_id(ResourceKind::Substance));
        substance.code = self.data_types().codeable_concept(code);
        Some(substance)
    }

    /// Supply with a product instance participant → Device.
    ///
    /// Sub-fragment helper: returns the bare resource for the caller to add to its own
    /// satellites, so no bundle is built here.
    ///
    /// When several participants are product instances, the last one describes the device.
    /// A supply without a product instance yields nothing.
    pub fn transform_supply_device(
        &self,
        ctx: &mut ConversionContext,
        supply: &Supply,
    ) -> Option<Device> {
        if is_absent(supply, "supply") {
            return None;
        }
        let instance = present_items(&supply.participants)
            .filter_map(|participant| present(participant.participant_role.as_ref()))
            .filter(|role| role.is_product_instance())
            .last()?;

        let mut device = Device::new(ctx.next_id(ResourceKind::Device));
        device.identifier = self.data_types().identifiers(&instance.ids);
        device.type_code = present(instance.playing_device.as_ref())
            .and_then(|playing| self.concept(playing.code.as_ref()));
        Some(device)
    }

    /// `Entity` → Group.
    ///
    /// Sub-fragment helper: returns the bare resource for the caller to add to its own
    /// satellites, so no bundle is built here.
    ///
    /// Only entities describing a kind (determiner `KIND`) form a group; an instance yields
    /// nothing. Identifiers are copied only when marked displayable.
    pub fn transform_entity_group(
        &self,
        ctx: &mut ConversionContext,
        entity: &Entity,
    ) -> Option<Group> {
        if is_absent(entity, "entity") || !entity.is_kind() {
            return None;
        }
        let dtt = self.data_types();
        let vst = self.value_sets();
        let mut group = Group::new(ctx.next_id(ResourceKind::Group));
        group.identifier = present_items(&entity.ids)
            .filter(|ii| ii.displayable == Some(true))
            .filter_map(|ii| dtt.identifier(ii))
            .collect();
        group.group_type = entity
            .class_code
            .as_deref()
            .and_then(|code| mapped(vst.group_type(code), code, "EntityClassRoot"));
        group.actual = Some(false);
        group.code = self.concept(entity.code.as_ref());
        Some(group)
    }
}
