//! Wanted state collected during one inspection

use crate::blacklist::Blacklist;
use crate::privilege::{Acl, Grant};
use crate::role::{Role, RoleSet};
use crate::Result;

/// Roles and grants generated so far
///
/// Blacklisted roles, and grants to them, are dropped on the way in.
pub struct Accumulator<'a> {
    blacklist: &'a Blacklist,
    roles: RoleSet,
    acl: Acl,
}

impl<'a> Accumulator<'a> {
    pub fn new(blacklist: &'a Blacklist) -> Self {
        Self {
            blacklist,
            roles: RoleSet::new(),
            acl: Acl::new(),
        }
    }

    pub fn add_role(&mut self, role: Role) -> Result<()> {
        if let Some(pattern) = self.blacklist.matches(&role.name) {
            tracing::debug!(role = %role.name, pattern, "Ignoring blacklisted role");
            return Ok(());
        }
        self.roles.insert(role)
    }

    pub fn add_grant(&mut self, grant: Grant) {
        if let Some(pattern) = self.blacklist.matches(&grant.role) {
            tracing::debug!(%grant, pattern, "Ignoring grant to blacklisted role");
            return;
        }
        self.acl.insert(grant);
    }

    pub fn finish(self) -> (RoleSet, Acl) {
        (self.roles, self.acl)
    }
}
