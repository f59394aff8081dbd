// Role Distributor - round-robin placement of one batch

use super::partition::PositionPools;
use super::Cursors;
use crate::domain::{AssignedVolunteer, Position, RoleClass, Volunteer, VolunteerId};
use serde::{Deserialize, Serialize};

/// Pool a volunteer draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoolKind {
    Restricted,
    General,
}

impl std::fmt::Display for PoolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolKind::Restricted => write!(f, "RESTRICTED"),
            PoolKind::General => write!(f, "GENERAL"),
        }
    }
}

/// Volunteer left without a position because its pool is empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnassignedVolunteer {
    pub volunteer_id: VolunteerId,
    pub name: String,
    pub role_class: RoleClass,
    pub pool: PoolKind,
}

/// Result of distributing one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distribution {
    /// In distribution order (restricted, secondary, general)
    pub assigned: Vec<AssignedVolunteer>,
    pub unassigned: Vec<UnassignedVolunteer>,
    /// Cursors after the last assignment
    pub cursors: Cursors,
}

/// Assigns positions to a batch of unassigned volunteers.
///
/// Classes are distributed in fixed order: restricted-role, then
/// secondary-role, then general; within a class, in the order given.
/// With role-mode on, restricted-role volunteers rotate through the
/// restricted pool while secondary and general volunteers share one cursor
/// over the general pool. With role-mode off every class rotates through the
/// general pool on a single cursor.
pub struct RoleDistributor<'a> {
    pools: &'a PositionPools,
    role_mode: bool,
}

impl<'a> RoleDistributor<'a> {
    pub fn new(pools: &'a PositionPools, role_mode: bool) -> Self {
        Self { pools, role_mode }
    }

    pub fn distribute(&self, batch: &[Volunteer], start: Cursors) -> Distribution {
        let mut cursors = start;
        let mut distribution = Distribution::default();

        let of_class = |class: RoleClass| batch.iter().filter(move |v| v.role_class() == class);

        if self.role_mode {
            for volunteer in of_class(RoleClass::Restricted) {
                self.place(
                    volunteer,
                    PoolKind::Restricted,
                    &mut cursors.restricted,
                    &mut distribution,
                );
            }
            for volunteer in of_class(RoleClass::Secondary).chain(of_class(RoleClass::General)) {
                self.place(
                    volunteer,
                    PoolKind::General,
                    &mut cursors.general,
                    &mut distribution,
                );
            }
        } else {
            let merged = of_class(RoleClass::Restricted)
                .chain(of_class(RoleClass::Secondary))
                .chain(of_class(RoleClass::General));
            for volunteer in merged {
                self.place(
                    volunteer,
                    PoolKind::General,
                    &mut cursors.general,
                    &mut distribution,
                );
            }
        }

        distribution.cursors = cursors;
        distribution
    }

    fn pool(&self, kind: PoolKind) -> &'a [Position] {
        match kind {
            PoolKind::Restricted => &self.pools.restricted,
            PoolKind::General => &self.pools.general,
        }
    }

    fn place(
        &self,
        volunteer: &Volunteer,
        kind: PoolKind,
        cursor: &mut usize,
        distribution: &mut Distribution,
    ) {
        match next_in_rotation(self.pool(kind), cursor) {
            Some(position) => distribution.assigned.push(AssignedVolunteer::from_parts(
                volunteer,
                volunteer.role_class(),
                position,
            )),
            None => distribution.unassigned.push(UnassignedVolunteer {
                volunteer_id: volunteer.id.clone(),
                name: volunteer.name.clone(),
                role_class: volunteer.role_class(),
                pool: kind,
            }),
        }
    }
}

/// `pool[cursor % len]`, advancing the cursor. None for an empty pool.
fn next_in_rotation<'p>(pool: &'p [Position], cursor: &mut usize) -> Option<&'p Position> {
    if pool.is_empty() {
        return None;
    }
    let position = &pool[*cursor % pool.len()];
    *cursor += 1;
    Some(position)
}
