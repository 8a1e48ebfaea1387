//! [`MockInspector`] serves a fixed instance state.

use std::cell::RefCell;

use rolesync_core::{Acl, BoxError, Database, Inspector, PrivilegeMap, Role, RoleSet};

/// An inspector returning preset values and logging each method called.
///
/// Unless set with [`MockInspector::with_managed`], every existing role is
/// considered managed.
#[derive(Debug)]
pub struct MockInspector {
    pub databases: Vec<String>,
    pub me: String,
    pub superuser: bool,
    pub blacklist: Vec<String>,
    pub roles: Vec<Role>,
    pub managed: Option<Vec<String>>,
    pub schemas: Vec<Database>,
    pub grants: Acl,
    pub failing: Option<&'static str>,
    calls: RefCell<Vec<&'static str>>,
}

impl Default for MockInspector {
    fn default() -> Self {
        Self {
            databases: vec!["postgres".to_string()],
            me: "postgres".to_string(),
            superuser: true,
            blacklist: vec!["pg_*".to_string(), "postgres".to_string()],
            roles: Vec::new(),
            managed: None,
            schemas: Vec::new(),
            grants: Acl::new(),
            failing: None,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl MockInspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_databases(mut self, databases: &[&str]) -> Self {
        self.databases = databases.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_me(mut self, me: &str, superuser: bool) -> Self {
        self.me = me.to_string();
        self.superuser = superuser;
        self
    }

    pub fn with_blacklist(mut self, patterns: &[&str]) -> Self {
        self.blacklist = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    /// Restrict the managed roles to `names`
    pub fn with_managed(mut self, names: &[&str]) -> Self {
        self.managed = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn with_schemas(mut self, schemas: Vec<Database>) -> Self {
        self.schemas = schemas;
        self
    }

    pub fn with_grants(mut self, grants: Acl) -> Self {
        self.grants = grants;
        self
    }

    /// Make `method` return an error
    pub fn failing_on(mut self, method: &'static str) -> Self {
        self.failing = Some(method);
        self
    }

    /// Methods called so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn called(&self, method: &str) -> bool {
        self.calls.borrow().iter().any(|call| *call == method)
    }

    fn record(&self, method: &'static str) -> Result<(), BoxError> {
        self.calls.borrow_mut().push(method);
        match self.failing {
            Some(failing) if failing == method => Err(format!("{} is down", method).into()),
            _ => Ok(()),
        }
    }
}

impl Inspector for MockInspector {
    fn fetch_databases(&self) -> Result<Vec<String>, BoxError> {
        self.record("fetch_databases")?;
        Ok(self.databases.clone())
    }

    fn fetch_me(&self) -> Result<(String, bool), BoxError> {
        self.record("fetch_me")?;
        Ok((self.me.clone(), self.superuser))
    }

    fn fetch_roles_blacklist(&self) -> Result<Vec<String>, BoxError> {
        self.record("fetch_roles_blacklist")?;
        Ok(self.blacklist.clone())
    }

    fn fetch_roles(&self) -> Result<(RoleSet, RoleSet), BoxError> {
        self.record("fetch_roles")?;
        let all = RoleSet::from_roles(self.roles.iter().cloned())?;
        let managed = match &self.managed {
            Some(names) => {
                let mut managed = all.clone();
                managed.retain(|role| names.contains(&role.name));
                managed
            }
            None => all.clone(),
        };
        Ok((all, managed))
    }

    fn fetch_schemas(&self, _databases: &[String]) -> Result<Vec<Database>, BoxError> {
        self.record("fetch_schemas")?;
        Ok(self.schemas.clone())
    }

    /// Preset grants of known privileges to `roles`
    fn fetch_grants(
        &self,
        _databases: &[Database],
        privileges: &PrivilegeMap,
        roles: &RoleSet,
    ) -> Result<Acl, BoxError> {
        self.record("fetch_grants")?;
        Ok(self
            .grants
            .iter()
            .filter(|grant| {
                roles.contains(&grant.role) && privileges.get(&grant.privilege).is_some()
            })
            .cloned()
            .collect())
    }
}
