//! End-to-end tests for descriptor merging.
//!
//! Parses `web.xml` fixtures, merges them with and without a strategy
//! configuration and checks the serialized result.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;

use descriptor_merge::config::MergeConfig;
use descriptor_merge::grammar::{create_default_grammar, GrammarRegistry};
use descriptor_merge::merge::{merge_documents, DescriptorMerger, MergeStrategy};
use descriptor_merge::xml::{parse_document, write_document};
use descriptor_merge::{Document, Element, MergeError};

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("webapp")
}

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = fixture_dir().join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn parse_fixture(grammar: &GrammarRegistry, name: &str) -> Document {
    parse_document(&load_fixture(name), grammar, None)
        .unwrap_or_else(|e| panic!("Failed to parse {name}: {e}"))
}

fn child_names(element: &Element) -> Vec<&str> {
    element.children().iter().map(Element::name).collect()
}

/// `param-name=param-value` pairs of all context params, in document order.
fn context_params(root: &Element) -> Vec<String> {
    root.find_children("context-param")
        .map(|param| {
            format!(
                "{}={}",
                param.text_at("param-name").unwrap_or_default(),
                param.text_at("param-value").unwrap_or_default()
            )
        })
        .collect()
}

fn servlet<'a>(root: &'a Element, name: &str) -> &'a Element {
    root.find_children("servlet")
        .find(|servlet| servlet.text_at("servlet-name") == Some(name))
        .unwrap_or_else(|| panic!("servlet {name} not found"))
}

// =============================================================================
// Merging with the default strategy
// =============================================================================

#[test]
fn test_default_merge_follows_web_app_order() {
    let grammar = create_default_grammar();
    let base = parse_fixture(&grammar, "base.xml");
    let overlay = parse_fixture(&grammar, "overlay.xml");

    let merged = DescriptorMerger::new(&grammar)
        .merge_into(base, &[overlay])
        .unwrap();
    let root = merged.root_element();

    assert_eq!(
        child_names(&root),
        vec![
            "display-name",
            "context-param",
            "context-param",
            "filter",
            "servlet",
            "servlet",
            "servlet-mapping",
            "session-config",
            "welcome-file-list",
        ]
    );
    assert_eq!(context_params(&root), vec!["mode=debug", "locale=nl"]);
}

#[test]
fn test_default_merge_replaces_servlet_whole() {
    let grammar = create_default_grammar();
    let base = parse_fixture(&grammar, "base.xml");
    let overlay = parse_fixture(&grammar, "overlay.xml");

    let merged = DescriptorMerger::new(&grammar)
        .merge_into(base, &[overlay])
        .unwrap();
    let root = merged.root_element();
    let main = servlet(&root, "main");

    assert_eq!(
        child_names(main),
        vec!["servlet-name", "init-param", "load-on-startup"]
    );
    assert_eq!(main.text_at("init-param/param-value"), Some("off"));
}

#[test]
fn test_container_descent_merges_servlet() {
    let grammar = create_default_grammar();
    let base = parse_fixture(&grammar, "base.xml");
    let overlay = parse_fixture(&grammar, "overlay.xml");

    let merged = DescriptorMerger::new(&grammar)
        .with_container_descent(true)
        .merge_into(base, &[overlay])
        .unwrap();
    let root = merged.root_element();
    let main = servlet(&root, "main");

    assert_eq!(
        child_names(main),
        vec!["servlet-name", "servlet-class", "init-param", "load-on-startup"]
    );
    assert_eq!(
        main.text_at("servlet-class"),
        Some("com.example.shop.MainServlet")
    );
    assert_eq!(main.text_at("init-param/param-value"), Some("off"));
    assert_eq!(main.text_at("load-on-startup"), Some("1"));
}

#[test]
fn test_merge_keeps_doctype_and_reparses() {
    let grammar = create_default_grammar();
    let base = parse_fixture(&grammar, "base.xml");
    let overlay = parse_fixture(&grammar, "overlay.xml");

    let merged = DescriptorMerger::new(&grammar)
        .merge_into(base, &[overlay])
        .unwrap();
    let xml = write_document(&merged);

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE web-app PUBLIC"));
    assert!(xml.contains("<session-timeout>30</session-timeout>"));

    let reparsed = parse_document(&xml, &grammar, None).unwrap();
    assert_eq!(reparsed.root_element(), merged.root_element());
}

#[test]
fn test_overlays_apply_left_to_right() {
    let grammar = create_default_grammar();
    let base = parse_fixture(&grammar, "base.xml");
    let overlay = parse_fixture(&grammar, "overlay.xml");
    let tomcat = parse_fixture(&grammar, "tomcat.xml");

    let merged = DescriptorMerger::new(&grammar)
        .merge_into(base, &[overlay, tomcat])
        .unwrap();
    let root = merged.root_element();

    assert_eq!(root.find_children("servlet").count(), 3);
    // mime-mapping goes between session-config and welcome-file-list
    let names = child_names(&root);
    assert_eq!(&names[names.len() - 3..], ["session-config", "mime-mapping", "welcome-file-list"]);

    // welcome-file-list is single, so the last overlay replaces it
    let welcome_files: Vec<_> = root
        .find_child("welcome-file-list")
        .unwrap()
        .find_children("welcome-file")
        .filter_map(Element::text)
        .collect();
    assert_eq!(welcome_files, vec!["index.html"]);
}

// =============================================================================
// Merging with a strategy configuration
// =============================================================================

#[test]
fn test_configured_merge() {
    let grammar = create_default_grammar();
    let base = parse_fixture(&grammar, "base.xml");
    let overlay = parse_fixture(&grammar, "overlay.xml");
    let config = MergeConfig::load(&fixture_dir().join("merge.yaml")).unwrap();

    let merger = config
        .build_merger(&grammar, base.family(), Some(&fixture_dir()))
        .unwrap();
    let merged = merger.merge_into(base, &[overlay]).unwrap();
    let root = merged.root_element();

    // "mode" is preserved, every other context param is overwritten
    assert_eq!(context_params(&root), vec!["mode=production", "locale=nl"]);

    let main = servlet(&root, "main");
    assert_eq!(
        child_names(main),
        vec!["servlet-name", "servlet-class", "init-param", "load-on-startup"]
    );
    assert_eq!(main.text_at("init-param/param-name"), Some("cache"));
    assert_eq!(main.text_at("init-param/param-value"), Some("off"));
    assert_eq!(main.text_at("load-on-startup"), Some("1"));

    let admin = servlet(&root, "admin");
    assert_eq!(
        admin.text_at("servlet-class"),
        Some("com.example.shop.AdminServlet")
    );
}

#[test]
fn test_configured_family_must_match() {
    let grammar = create_default_grammar();
    let config = MergeConfig::from_yaml("family: application\n").unwrap();

    let result = config.build_merger(&grammar, "web-app", None);
    assert!(matches!(result, Err(MergeError::FamilyMismatch { .. })));
}

// =============================================================================
// Context-param strategies for elements on the left, right or both sides
// =============================================================================

const LEFT: &str = "<web-app><context-param><param-name>p</param-name><param-value>left</param-value></context-param></web-app>";
const RIGHT: &str = "<web-app><context-param><param-name>p</param-name><param-value>right</param-value></context-param></web-app>";
const EMPTY: &str = "<web-app/>";

fn merge_context_param(strategy: MergeStrategy, base: &str, overlay: &str) -> Vec<String> {
    let grammar = create_default_grammar();
    let base = parse_document(base, &grammar, None).unwrap();
    let overlay = parse_document(overlay, &grammar, None).unwrap();
    let merged = DescriptorMerger::new(&grammar)
        .with_strategy("context-param", strategy)
        .merge_into(base, &[overlay])
        .unwrap();
    context_params(&merged.root_element())
}

#[test]
fn test_preserve_context_param() {
    assert_eq!(merge_context_param(MergeStrategy::Preserve, LEFT, EMPTY), vec!["p=left"]);
    assert_eq!(merge_context_param(MergeStrategy::Preserve, EMPTY, RIGHT), vec!["p=right"]);
    assert_eq!(merge_context_param(MergeStrategy::Preserve, LEFT, RIGHT), vec!["p=left"]);
}

#[test]
fn test_overwrite_context_param() {
    assert_eq!(merge_context_param(MergeStrategy::Overwrite, LEFT, EMPTY), vec!["p=left"]);
    assert_eq!(merge_context_param(MergeStrategy::Overwrite, EMPTY, RIGHT), vec!["p=right"]);
    assert_eq!(merge_context_param(MergeStrategy::Overwrite, LEFT, RIGHT), vec!["p=right"]);
}

#[test]
fn test_ignore_context_param() {
    assert_eq!(merge_context_param(MergeStrategy::Ignore, LEFT, EMPTY), vec!["p=left"]);
    assert!(merge_context_param(MergeStrategy::Ignore, EMPTY, RIGHT).is_empty());
    assert_eq!(merge_context_param(MergeStrategy::Ignore, LEFT, RIGHT), vec!["p=left"]);
}

// =============================================================================
// Concatenation
// =============================================================================

#[test]
fn test_concat_keeps_every_element() {
    let grammar = create_default_grammar();
    let documents = [
        parse_fixture(&grammar, "base.xml"),
        parse_fixture(&grammar, "tomcat.xml"),
    ];

    let merged = merge_documents(&documents).unwrap();
    let root = merged.root_element();

    assert_eq!(root.children().len(), 8);
    assert_eq!(root.find_children("welcome-file-list").count(), 2);
    assert!(merged.doctype().is_some());
}

// =============================================================================
// Command line
// =============================================================================

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_descriptor-merge"))
}

#[test]
fn test_cli_merge_to_stdout() {
    let dir = fixture_dir();
    cli()
        .arg("merge")
        .arg(dir.join("base.xml"))
        .arg(dir.join("overlay.xml"))
        .arg("--config")
        .arg(dir.join("merge.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("<param-value>production</param-value>"))
        .stdout(predicate::str::contains("<load-on-startup>1</load-on-startup>"))
        .stderr(predicate::str::contains("Merging"));
}

#[test]
fn test_cli_merge_to_file() {
    let dir = fixture_dir();
    let out = tempfile::tempdir().unwrap();
    let output = out.path().join("web.xml");

    cli()
        .arg("merge")
        .arg(dir.join("base.xml"))
        .arg(dir.join("tomcat.xml"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let grammar = create_default_grammar();
    let merged = parse_document(&fs::read_to_string(&output).unwrap(), &grammar, None).unwrap();
    assert_eq!(merged.root_element().find_children("servlet").count(), 2);
}

#[test]
fn test_cli_concat() {
    let dir = fixture_dir();
    cli()
        .arg("concat")
        .arg(dir.join("base.xml"))
        .arg(dir.join("tomcat.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("<welcome-file>index.jsp</welcome-file>"))
        .stdout(predicate::str::contains("<welcome-file>index.html</welcome-file>"));
}

#[test]
fn test_cli_families() {
    cli()
        .arg("families")
        .assert()
        .success()
        .stdout(predicate::str::contains("web-app"))
        .stdout(predicate::str::contains("application"));
}

#[test]
fn test_cli_reports_unknown_document() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("beans.xml");
    fs::write(&base, "<beans/>").unwrap();

    cli()
        .arg("merge")
        .arg(&base)
        .arg(&base)
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}
