//! Tests for the Directory Query Engine

use pretty_assertions::assert_eq;
use rolesync_directory::{
    DirectoryEntry, Error, Join, MemoryDirectory, Scope, Search, SearchRow, query,
};
use rolesync_test_utils::ScriptedDirectory;
use std::collections::BTreeMap;

fn people_search() -> Search {
    Search {
        base: "ou=people,dc=global".to_string(),
        filter: "(objectClass=group)".to_string(),
        scope: Scope::Sub,
        attributes: vec!["cn".to_string(), "member".to_string()],
        ..Search::default()
    }
}

fn member_join(attributes: &[&str]) -> BTreeMap<String, Join> {
    BTreeMap::from([(
        "member".to_string(),
        Join {
            filter: "(objectClass=people)".to_string(),
            scope: Scope::Sub,
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
            ..Join::default()
        },
    )])
}

#[test]
fn test_query_skips_references_and_fills_allowed_missing() {
    let client = ScriptedDirectory::new().respond(vec![
        SearchRow::entry("dn=a", Vec::<(&str, Vec<&str>)>::new()),
        SearchRow::entry("dn=b", [("member", vec!["m"])]),
        SearchRow::Reference {
            uris: vec!["ldap://list_ref".to_string()],
        },
    ]);
    let search = Search {
        attributes: vec!["cn".to_string()],
        allow_missing_attributes: vec!["member".to_string()],
        ..people_search()
    };

    let entries = query(&client, &search).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].attribute("member").unwrap().len(), 0);
    assert_eq!(entries[1].attribute("member").unwrap(), ["m"]);
}

#[test]
fn test_query_undecodable_value_fails() {
    let client = ScriptedDirectory::new().respond(vec![
        SearchRow::entry("dn=ok", [("cn", vec![b"fine".to_vec()])]),
        SearchRow::entry("dn=a", [("a", vec![vec![0xbb_u8]])]),
    ]);

    let err = query(&client, &people_search()).unwrap_err();

    assert!(matches!(
        err,
        Error::Decode { ref dn, ref attribute } if dn == "dn=a" && attribute == "a"
    ));
}

#[test]
fn test_query_joins_pair_children_with_parents() {
    let client = ScriptedDirectory::new()
        .respond(vec![
            SearchRow::entry(
                "cn=A,ou=people,dc=global",
                [("cn", vec!["A"]), ("member", vec!["cn=P,ou=people,dc=global"])],
            ),
            SearchRow::entry(
                "cn=B,ou=people,dc=global",
                [("cn", vec!["B"]), ("member", vec!["cn=P,ou=people,dc=global"])],
            ),
        ])
        .respond(vec![SearchRow::entry(
            "cn=P,ou=people,dc=global",
            [("sAMAccountName", vec!["P"])],
        )]);
    let search = Search {
        joins: member_join(&["sAMAccountName"]),
        ..people_search()
    };

    let entries = query(&client, &search).unwrap();

    assert_eq!(client.call_count(), 2);
    let child =
        DirectoryEntry::new("cn=P,ou=people,dc=global").with_attribute("samaccountname", ["P"]);
    let expected = vec![
        DirectoryEntry::new("cn=A,ou=people,dc=global")
            .with_attribute("cn", ["A"])
            .with_attribute("member", ["cn=P,ou=people,dc=global"])
            .with_children("member", vec![child.clone()]),
        DirectoryEntry::new("cn=B,ou=people,dc=global")
            .with_attribute("cn", ["B"])
            .with_attribute("member", ["cn=P,ou=people,dc=global"])
            .with_children("member", vec![child]),
    ];
    assert_eq!(entries, expected);

    // The member value is used as the sub-search base.
    let calls = client.calls();
    assert_eq!(calls[1].base, "cn=P,ou=people,dc=global");
    assert_eq!(calls[1].filter, "(objectClass=people)");
}

#[test]
fn test_query_join_filtered_out_allowed() {
    let client = ScriptedDirectory::new()
        .respond(vec![SearchRow::entry(
            "cn=A,ou=people,dc=global",
            [("cn", vec!["A"]), ("member", vec!["cn=P,ou=people,dc=global"])],
        )])
        .respond(vec![]);
    let search = Search {
        joins: member_join(&["cn"]),
        allow_missing_attributes: vec!["member".to_string()],
        ..people_search()
    };

    let entries = query(&client, &search).unwrap();

    assert_eq!(client.call_count(), 2);
    assert_eq!(
        entries,
        vec![
            DirectoryEntry::new("cn=A,ou=people,dc=global")
                .with_attribute("cn", ["A"])
                .with_attribute("member", ["cn=P,ou=people,dc=global"])
                .with_children("member", vec![])
        ]
    );
}

#[test]
fn test_query_join_filtered_out_not_allowed() {
    let client = ScriptedDirectory::new()
        .respond(vec![SearchRow::entry(
            "cn=A,ou=people,dc=global",
            [("cn", vec!["A"]), ("member", vec!["cn=P,ou=people,dc=global"])],
        )])
        .respond(vec![]);
    let search = Search {
        joins: member_join(&["cn"]),
        ..people_search()
    };

    let entries = query(&client, &search).unwrap();

    assert_eq!(client.call_count(), 2);
    assert_eq!(
        entries,
        vec![
            DirectoryEntry::new("cn=A,ou=people,dc=global")
                .with_attribute("cn", ["A"])
                .with_attribute("member", ["cn=P,ou=people,dc=global"])
        ]
    );
}

#[test]
fn test_query_join_attribute_absent_allowed() {
    let client = ScriptedDirectory::new().respond(vec![SearchRow::entry(
        "cn=A,ou=people,dc=global",
        [("cn", vec!["A"])],
    )]);
    let search = Search {
        joins: member_join(&["sAMAccountName"]),
        allow_missing_attributes: vec!["member".to_string()],
        ..people_search()
    };

    let entries = query(&client, &search).unwrap();

    assert_eq!(client.call_count(), 1);
    assert_eq!(entries[0].children("member").unwrap().len(), 0);
}

#[test]
fn test_query_join_attribute_absent_fails() {
    let client = ScriptedDirectory::new().respond(vec![SearchRow::entry(
        "cn=A,ou=people,dc=global",
        [("cn", vec!["A"])],
    )]);
    let search = Search {
        joins: member_join(&["sAMAccountName"]),
        ..people_search()
    };

    let err = query(&client, &search).unwrap_err();

    assert!(err.to_string().contains("Missing attribute member"));
}

#[test]
fn test_query_bad_filter_is_wrapped() {
    let client = ScriptedDirectory::new().fail("Bad search filter");
    let search = Search {
        base: "dc=unit".to_string(),
        filter: "(broken".to_string(),
        ..Search::default()
    };

    let err = query(&client, &search).unwrap_err();

    assert_eq!(client.call_count(), 1);
    match err {
        Error::Search { base, filter, message } => {
            assert_eq!(base, "dc=unit");
            assert_eq!(filter, "(broken");
            assert_eq!(message, "Bad search filter");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_query_nested_joins_against_memory_directory() {
    let directory: MemoryDirectory = [
        DirectoryEntry::new("cn=dba,ou=groups,dc=acme")
            .with_attribute("objectClass", ["groupOfNames"])
            .with_attribute("member", ["cn=alice,ou=people,dc=acme"]),
        DirectoryEntry::new("cn=alice,ou=people,dc=acme")
            .with_attribute("objectClass", ["person"])
            .with_attribute("uid", ["alice"])
            .with_attribute("manager", ["cn=carol,ou=people,dc=acme"]),
        DirectoryEntry::new("cn=carol,ou=people,dc=acme")
            .with_attribute("objectClass", ["person"])
            .with_attribute("uid", ["carol"]),
    ]
    .into_iter()
    .collect();

    let search = Search {
        base: "ou=groups,dc=acme".to_string(),
        filter: "(objectClass=groupOfNames)".to_string(),
        attributes: vec!["member".to_string()],
        joins: BTreeMap::from([(
            "member".to_string(),
            Join {
                attributes: vec!["uid".to_string(), "manager".to_string()],
                joins: BTreeMap::from([(
                    "manager".to_string(),
                    Join {
                        attributes: vec!["uid".to_string()],
                        ..Join::default()
                    },
                )]),
                ..Join::default()
            },
        )]),
        ..Search::default()
    };

    let entries = query(&directory, &search).unwrap();

    assert_eq!(entries.len(), 1);
    let alice = &entries[0].children("member").unwrap()[0];
    assert_eq!(alice.attribute("uid").unwrap(), ["alice"]);
    let carol = &alice.children("manager").unwrap()[0];
    assert_eq!(carol.attribute("uid").unwrap(), ["carol"]);
}

#[test]
fn test_query_shared_join_values_search_once() {
    let client = ScriptedDirectory::new()
        .respond(vec![
            SearchRow::entry("cn=A", [("member", vec!["cn=P", "cn=Q"])]),
            SearchRow::entry("cn=B", [("member", vec!["cn=Q"])]),
        ])
        .respond(vec![SearchRow::entry("cn=P", [("uid", vec!["p"])])])
        .respond(vec![SearchRow::entry("cn=Q", [("uid", vec!["q"])])]);
    let search = Search {
        joins: BTreeMap::from([("member".to_string(), Join::default())]),
        ..Search::default()
    };

    let entries = query(&client, &search).unwrap();

    let bases: Vec<String> = client.calls().into_iter().map(|call| call.base).collect();
    assert_eq!(bases, ["", "cn=P", "cn=Q"]);
    assert_eq!(client.calls()[1].scope, Scope::Base);
    let a_children: Vec<&str> = entries[0]
        .children("member")
        .unwrap()
        .iter()
        .map(|child| child.dn.as_str())
        .collect();
    assert_eq!(a_children, ["cn=P", "cn=Q"]);
    assert_eq!(entries[1].children("member").unwrap()[0].dn, "cn=Q");
}
