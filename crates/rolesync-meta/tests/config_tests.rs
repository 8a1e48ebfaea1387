//! Tests for configuration loading

use pretty_assertions::assert_eq;
use rolesync_directory::Scope;
use rolesync_meta::{
    Config, Error, OnUnexpectedDn, PrivilegeEntry, PrivilegeKind, RoleOptions, find_file,
};
use std::fs;
use tempfile::TempDir;

const FULL: &str = r#"
version: 1
postgres:
  roles_blacklist: [pg_*, postgres, rds_*]
privileges:
  ro:
  - __connect__
  - __usage_on_schemas__
  - __select_on_tables__
  ddl:
    type: nspacl
    grant: GRANT CREATE ON SCHEMA {schema} TO {role};
    revoke: REVOKE CREATE ON SCHEMA {schema} FROM {role};
sync_map:
- description: Static groups
  roles:
  - names: [readers, writers]
    options: NOLOGIN
- description: DBA from directory
  ldapsearch:
    base: ou=groups,dc=acme,dc=tld
    filter: (cn=dba)
    scope: one
    on_unexpected_dn: warn
    joins:
      member:
        attributes: [sAMAccountName]
    allow_missing_attributes: [member]
  role:
    name: "{member.sAMAccountName}"
    options: {LOGIN: true, CONNECTION_LIMIT: 4}
    parent: readers
    comment: "Member of {dn.cn}"
  grant:
    privilege: ro
    database: app
    role: readers
"#;

#[test]
fn test_load_full_configuration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rolesync.yml");
    fs::write(&path, FULL).unwrap();

    let config = Config::load(&find_file(None, dir.path()).unwrap()).unwrap();

    assert_eq!(config.postgres.roles_blacklist, vec!["pg_*", "postgres", "rds_*"]);
    assert_eq!(config.sync_map.len(), 2);
    assert!(matches!(config.privileges.get("ro"), Some(PrivilegeEntry::Group(m)) if m.len() == 3));
    match config.privileges.get("ddl") {
        Some(PrivilegeEntry::Definition(d)) => assert_eq!(d.kind, PrivilegeKind::Nspacl),
        other => panic!("unexpected ddl entry {:?}", other),
    }

    let statics = &config.sync_map[0];
    assert!(statics.ldapsearch.is_none());
    assert_eq!(statics.roles[0].names, vec!["readers", "writers"]);

    let dba = &config.sync_map[1];
    let search = dba.ldapsearch.as_ref().unwrap();
    assert_eq!(search.search.scope, Scope::One);
    assert_eq!(search.on_unexpected_dn, OnUnexpectedDn::Warn);
    assert_eq!(search.search.joins["member"].scope, Scope::Base);
    assert_eq!(search.search.allow_missing_attributes, vec!["member"]);
    assert_eq!(
        dba.roles[0].options,
        RoleOptions {
            login: true,
            connection_limit: 4,
            ..RoleOptions::default()
        }
    );
    assert_eq!(dba.grant[0].databases, vec!["app"]);
}

#[test]
fn test_missing_configuration() {
    let dir = TempDir::new().unwrap();
    let err = Config::load(&dir.path().join("rolesync.yml")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_malformed_yaml() {
    let err = Config::parse("sync_map: [").unwrap_err();
    assert!(matches!(err, Error::Yaml(_)));
}
