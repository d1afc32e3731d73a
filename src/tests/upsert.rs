use super::{
    match_anchor, match_companion, upsert, upsert_with_changes, ChangeKind, Scope, Upserter,
};
use std::collections::HashSet;

fn triggers(names: &[&str]) -> HashSet<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

fn bundle() -> Vec<&'static str> {
    vec![
        "applications:\n",
        "  keystone:\n",
        "    charm: cs:~openstack-charmers/keystone\n",
        "    num_units: 1\n",
        "  nova:\n",
        "    charm: cs:~openstack-charmers/nova\n",
        "    channel: stable\n",
    ]
}

#[test]
fn test_insert_and_replace_in_bundle() {
    let result = upsert(&bundle(), &triggers(&["keystone", "nova"]), "candidate");

    assert_eq!(
        result,
        vec![
            "applications:\n",
            "  keystone:\n",
            "    charm: cs:~openstack-charmers/keystone\n",
            "    num_units: 1\n",
            "    channel: candidate\n",
            "  nova:\n",
            "    charm: cs:~openstack-charmers/nova\n",
            "    channel: candidate\n",
        ]
    );
}

#[test]
fn test_changes_are_reported() {
    let result = upsert_with_changes(&bundle(), &triggers(&["keystone", "nova"]), "candidate");

    assert_eq!(result.changes.len(), 2);

    let inserted = &result.changes[0];
    assert_eq!(inserted.line, 4);
    assert_eq!(inserted.charm, "keystone");
    assert_eq!(inserted.indent, "    ");
    assert_eq!(inserted.kind, ChangeKind::Inserted);

    let replaced = &result.changes[1];
    assert_eq!(replaced.line, 7);
    assert_eq!(replaced.charm, "nova");
    assert_eq!(
        replaced.kind,
        ChangeKind::Replaced {
            previous: "stable".to_string()
        }
    );
}

#[test]
fn test_no_trigger_leaves_document_identical() {
    let input = bundle();
    let result = upsert_with_changes(&input, &triggers(&["glance"]), "candidate");

    assert_eq!(result.lines, input);
    assert!(result.changes.is_empty());
}

#[test]
fn test_idempotent() {
    let set = triggers(&["keystone", "nova"]);
    let once = upsert(&bundle(), &set, "edge");
    let twice = upsert(&once, &set, "edge");

    assert_eq!(once, twice);
}

#[test]
fn test_only_triggered_block_changes() {
    let result = upsert(&bundle(), &triggers(&["keystone"]), "beta");

    assert_eq!(result[4], "    channel: beta\n");
    assert_eq!(result[7], "    channel: stable\n", "nova block must keep its channel");
    assert_eq!(result.len(), 8);
}

#[test]
fn test_insert_at_end_of_document() {
    let input = vec![
        "applications:\n",
        "  glance:\n",
        "    charm: cs:~openstack-charmers-next/glance\n",
        "    num_units: 3\n",
    ];
    let result = upsert(&input, &triggers(&["glance"]), "candidate");

    assert_eq!(result.len(), 5);
    assert_eq!(result[4], "    channel: candidate\n");
}

#[test]
fn test_insert_at_end_terminates_last_line() {
    let input = vec!["  glance:\n", "    charm: cs:~openstack-charmers/glance"];
    let result = upsert(&input, &triggers(&["glance"]), "candidate");

    assert_eq!(
        result,
        vec![
            "  glance:\n",
            "    charm: cs:~openstack-charmers/glance\n",
            "    channel: candidate\n",
        ]
    );
}

#[test]
fn test_deeper_channel_is_not_a_sibling() {
    let input = vec![
        "  keystone:\n",
        "    charm: cs:~openstack-charmers/keystone\n",
        "    options:\n",
        "      channel: foo\n",
        "  nova:\n",
    ];
    let result = upsert_with_changes(&input, &triggers(&["keystone"]), "stable");

    assert_eq!(result.lines[3], "      channel: foo\n");
    assert_eq!(result.lines[4], "    channel: stable\n");
    assert_eq!(result.lines[5], "  nova:\n");
    assert_eq!(result.changes.len(), 1);
    assert_eq!(result.changes[0].kind, ChangeKind::Inserted);
}

#[test]
fn test_comments_are_tolerated() {
    let input = vec![
        "  keystone:\n",
        "    charm: cs:~openstack-charmers/keystone  # pinned below\n",
        "    channel: stable # old\n",
    ];
    let result = upsert(&input, &triggers(&["keystone"]), "edge");

    assert_eq!(result[1], input[1]);
    assert_eq!(result[2], "    channel: edge\n");
    assert_eq!(result.len(), 3);
}

#[test]
fn test_unknown_namespace_is_ignored() {
    let input = vec![
        "  keystone:\n",
        "    charm: cs:keystone\n",
        "  nova:\n",
        "    charm: ch:nova\n",
    ];
    let result = upsert(&input, &triggers(&["keystone", "nova"]), "edge");

    assert_eq!(result, input);
}

#[test]
fn test_trigger_match_is_exact() {
    let input = vec![
        "  keystone:\n",
        "    charm: cs:~openstack-charmers/keystone-312\n",
        "  nova:\n",
        "    charm: cs:~openstack-charmers/Nova\n",
    ];
    let result = upsert(&input, &triggers(&["keystone", "nova"]), "edge");

    assert_eq!(result, input);
}

#[test]
fn test_crlf_lines_match() {
    let input = vec![
        "  keystone:\r\n",
        "    charm: cs:~openstack-charmers/keystone\r\n",
        "    channel: stable\r\n",
    ];
    let result = upsert(&input, &triggers(&["keystone"]), "beta");

    assert_eq!(result[2], "    channel: beta\n");
}

#[test]
fn test_top_level_anchor_runs_to_end() {
    // An empty indent is a prefix of every line, so only a top-level channel: closes it.
    let input = vec![
        "charm: cs:~openstack-charmers/octavia\n",
        "series: jammy\n",
        "options:\n",
        "  channel: nested\n",
    ];
    let result = upsert_with_changes(&input, &triggers(&["octavia"]), "candidate");

    assert_eq!(result.lines.len(), 5);
    assert_eq!(result.lines[3], "  channel: nested\n");
    assert_eq!(result.lines[4], "channel: candidate\n");
}

#[test]
fn test_adjacent_anchor_at_same_indent_takes_over_scope() {
    let input = vec![
        "  keystone:\n",
        "    charm: cs:~openstack-charmers/keystone\n",
        "    charm: cs:~openstack-charmers/nova\n",
        "    num_units: 1\n",
    ];
    let result = upsert_with_changes(&input, &triggers(&["keystone", "nova"]), "candidate");

    assert_eq!(result.changes.len(), 1);
    assert_eq!(result.changes[0].charm, "nova");
    assert_eq!(result.lines.len(), 5);
    assert_eq!(result.lines[4], "    channel: candidate\n");
}

#[test]
fn test_empty_document() {
    let input: Vec<&str> = Vec::new();
    assert!(upsert(&input, &triggers(&["keystone"]), "edge").is_empty());
}

#[test]
fn test_scope_transitions() {
    let set = triggers(&["keystone"]);
    let mut upserter = Upserter::new(&set, "candidate");
    assert_eq!(upserter.scope(), &Scope::Closed);

    upserter.feed("  keystone:\n");
    assert_eq!(upserter.scope(), &Scope::Closed);

    upserter.feed("    charm: cs:~openstack-charmers/keystone\n");
    assert_eq!(
        upserter.scope(),
        &Scope::Open {
            indent: "    ".to_string(),
            charm: "keystone".to_string()
        }
    );

    upserter.feed("    num_units: 1\n");
    assert!(matches!(upserter.scope(), Scope::Open { .. }));

    upserter.feed("  nova:\n");
    assert_eq!(upserter.scope(), &Scope::Closed);

    let result = upserter.finish();
    assert_eq!(result.lines[3], "    channel: candidate\n");
    assert_eq!(result.lines[4], "  nova:\n");
}

#[test]
fn test_line_matchers() {
    let anchor = match_anchor("\t charm: cs:~openstack-charmers-next/ceph-osd\n").unwrap();
    assert_eq!(anchor.indent, "\t ");
    assert_eq!(anchor.charm, "ceph-osd");

    let companion = match_companion("  channel:   latest/edge  # note").unwrap();
    assert_eq!(companion.indent, "  ");
    assert_eq!(companion.value, "latest/edge");

    assert!(match_anchor("    charm:cs:~openstack-charmers/nova\n").is_none());
    assert!(match_companion("    channel:\n").is_none());
    assert!(match_companion("    channel: a b\n").is_none());
}
