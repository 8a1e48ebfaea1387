//! End-to-end test of the library pipeline
//!
//! Loads the acme fixture configuration, queries an in-memory copy of the
//! acme directory and syncs against a mock instance: directory query with
//! joins -> projection -> rule expansion -> role diff -> grant
//! postprocessing -> grant diff.

use pretty_assertions::assert_eq;
use rolesync_core::{Acl, Database, Grant, PrivilegeMap, Role, Schema, SyncManager, SyncOptions};
use rolesync_directory::{DirectoryEntry, MemoryDirectory};
use rolesync_meta::{Config, RoleOptions};
use rolesync_test_utils::{MockInspector, RecordingExecutor};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/acme")
        .join(name)
}

fn person(uid: &str) -> DirectoryEntry {
    DirectoryEntry::new(format!("uid={},ou=people,dc=acme,dc=tld", uid))
        .with_attribute("objectClass", ["person"])
        .with_attribute("uid", [uid])
}

fn group(cn: &str, members: &[&str]) -> DirectoryEntry {
    let entry = DirectoryEntry::new(format!("cn={},ou=groups,dc=acme,dc=tld", cn))
        .with_attribute("objectClass", ["groupOfNames"])
        .with_attribute("cn", [cn]);
    if members.is_empty() {
        return entry;
    }
    entry.with_attribute(
        "member",
        members
            .iter()
            .map(|uid| format!("uid={},ou=people,dc=acme,dc=tld", uid)),
    )
}

fn directory() -> MemoryDirectory {
    [
        DirectoryEntry::new("ou=groups,dc=acme,dc=tld")
            .with_attribute("objectClass", ["organizationalUnit"]),
        group("readers", &["alice", "bob"]),
        group("writers", &["carol"]),
        group("empty", &[]),
        person("alice"),
        person("bob"),
        person("carol"),
    ]
    .into_iter()
    .collect()
}

fn app() -> Database {
    Database::new("app", "app")
        .with_schema(Schema::new("public", ["app"]))
        .with_schema(Schema::new("sales", ["app", "etl"]))
}

fn login() -> RoleOptions {
    RoleOptions {
        login: true,
        ..RoleOptions::default()
    }
}

fn instance() -> MockInspector {
    MockInspector::new()
        .with_databases(&["app"])
        .with_blacklist(&["pg_*", "postgres", "rds_*"])
        .with_roles([
            Role::new("postgres").with_options(RoleOptions {
                superuser: true,
                login: true,
                ..RoleOptions::default()
            }),
            Role::new("pg_monitor"),
            Role::new("bob"),
            Role::new("readers").with_comment("Managed by rolesync"),
            Role::new("legacy").with_options(login()),
        ])
        .with_schemas(vec![app()])
        .with_grants(Acl::from_iter([
            Grant::new("__connect__", "readers").on_database("app"),
            Grant::new("__connect__", "legacy").on_database("app"),
        ]))
}

#[test]
fn test_acme_sync() {
    let config = Config::load(&fixture("rolesync.yml")).unwrap();
    let directory = directory();
    let inspector = instance();
    let executor = RecordingExecutor::new();

    let count = SyncManager::new(&inspector, &executor)
        .with_directory(&directory)
        .with_privileges(PrivilegeMap::from_config(&config))
        .sync(&config.sync_map)
        .unwrap();

    let statements = executor.statements();
    assert_eq!(
        statements,
        vec![
            r#"CREATE ROLE "alice" WITH LOGIN NOSUPERUSER NOCREATEDB NOCREATEROLE INHERIT NOREPLICATION NOBYPASSRLS CONNECTION LIMIT -1;"#,
            r#"CREATE ROLE "carol" WITH LOGIN NOSUPERUSER NOCREATEDB NOCREATEROLE INHERIT NOREPLICATION NOBYPASSRLS CONNECTION LIMIT -1;"#,
            r#"CREATE ROLE "writers" WITH NOLOGIN NOSUPERUSER NOCREATEDB NOCREATEROLE INHERIT NOREPLICATION NOBYPASSRLS CONNECTION LIMIT -1;"#,
            r#"COMMENT ON ROLE "writers" IS 'Managed by rolesync';"#,
            r#"ALTER ROLE "bob" WITH LOGIN;"#,
            r#"GRANT "readers" TO "alice";"#,
            r#"GRANT "readers" TO "bob";"#,
            r#"GRANT "writers" TO "carol";"#,
            r#"REASSIGN OWNED BY "legacy" TO "postgres";"#,
            r#"DROP OWNED BY "legacy";"#,
            r#"DROP ROLE "legacy";"#,
            r#"ALTER DEFAULT PRIVILEGES FOR ROLE "app" IN SCHEMA "public" GRANT SELECT ON TABLES TO "readers";"#,
            r#"ALTER DEFAULT PRIVILEGES FOR ROLE "app" IN SCHEMA "sales" GRANT SELECT ON TABLES TO "readers";"#,
            r#"ALTER DEFAULT PRIVILEGES FOR ROLE "etl" IN SCHEMA "sales" GRANT SELECT ON TABLES TO "readers";"#,
            r#"GRANT SELECT ON ALL TABLES IN SCHEMA "public" TO "readers";"#,
            r#"GRANT SELECT ON ALL TABLES IN SCHEMA "sales" TO "readers";"#,
            r#"GRANT USAGE ON SCHEMA "public" TO "readers";"#,
            r#"GRANT USAGE ON SCHEMA "sales" TO "readers";"#,
        ]
    );
    assert_eq!(count, statements.len());
    assert_eq!(
        inspector.calls(),
        vec![
            "fetch_databases",
            "fetch_me",
            "fetch_roles_blacklist",
            "fetch_roles",
            "fetch_schemas",
            "fetch_grants",
        ]
    );
    let executed = executor.executed();
    assert_eq!(executed[8].dbname.as_deref(), Some("app"));
    assert_eq!(executed[9].dbname.as_deref(), Some("app"));
    assert_eq!(executed[10].dbname, None);
}

#[test]
fn test_acme_dry_run_counts_the_same() {
    let config = Config::load(&fixture("rolesync.yml")).unwrap();
    let directory = directory();
    let inspector = instance();
    let executor = RecordingExecutor::new();

    let count = SyncManager::new(&inspector, &executor)
        .with_directory(&directory)
        .with_privileges(PrivilegeMap::from_config(&config))
        .with_options(SyncOptions { dry_run: true })
        .sync(&config.sync_map)
        .unwrap();

    assert_eq!(count, 18);
    assert_eq!(executor.count(), 0);
}
