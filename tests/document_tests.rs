use quillq::document::node::{tags, Node, NodeKind, Style};
use quillq::document::tree::{AliasResolver, DocumentStore, PathElement};

#[test]
fn test_store_indexes_documents_in_order() {
    let store = DocumentStore::from_yaml("a: 1\n---\nb: 2\n---\nc: 3\n").unwrap();
    assert_eq!(store.len(), 3);
    let indices: Vec<usize> = store.iter().map(|doc| doc.index()).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn test_append_continues_indices() {
    let mut store = DocumentStore::from_yaml("a: 1\n").unwrap();
    let added = store.append_yaml("b: 2\n---\nc: 3\n").unwrap();
    assert_eq!(added, 2);
    assert_eq!(store.get(2).map(|doc| doc.index()), Some(2));
}

#[test]
fn test_anchor_registry_paths() {
    let yaml = "defaults: &defaults\n  adapter: postgres\nlist:\n  - &first one\n  - *first\n";
    let store = DocumentStore::from_yaml(yaml).unwrap();
    let doc = store.get(0).unwrap();
    let registry = doc.anchor_registry();

    assert_eq!(
        registry.get_anchor_path("defaults"),
        Some(&vec![PathElement::Key("defaults".to_string())])
    );
    assert_eq!(
        registry.get_anchor_path("first"),
        Some(&vec![PathElement::Key("list".to_string()), PathElement::Index(0)])
    );
    assert_eq!(registry.get_aliases_for("first").len(), 1);
}

#[test]
fn test_alias_resolves_to_anchored_node() {
    let store = DocumentStore::from_yaml("base: &b {x: 1}\nref: *b\n").unwrap();
    let doc = store.get(0).unwrap();
    let target = doc.resolve_alias("b").unwrap();
    assert_eq!(target.kind(), NodeKind::Mapping);
    assert_eq!(target.anchor(), Some("b"));
    assert!(doc.root().get("ref").unwrap().is_alias());
}

#[test]
fn test_anchors_are_scoped_per_document() {
    let store = DocumentStore::from_yaml("a: &x 1\n---\nb: 2\n").unwrap();
    let alias = Node::alias("x");
    assert!(store.resolver(0).resolve(&alias).is_some());
    assert!(store.resolver(1).resolve(&alias).is_none());
}

#[test]
fn test_redefined_anchor_keeps_earlier_aliases() {
    let yaml = "first: &x {k: 1}\nearly: *x\nsecond: &x {k: 2}\nlate: *x\n";
    let store = DocumentStore::from_yaml(yaml).unwrap();
    let doc = store.get(0).unwrap();
    let root = doc.root();

    let early = doc.resolve(root.get("early").unwrap()).unwrap();
    let late = doc.resolve(root.get("late").unwrap()).unwrap();
    assert_eq!(early.get("k").and_then(|n| n.scalar_value()), Some("1"));
    assert_eq!(late.get("k").and_then(|n| n.scalar_value()), Some("2"));
    assert_eq!(
        doc.anchor_registry().get_definition_path("x", 0),
        Some(&vec![PathElement::Key("first".to_string())])
    );
}

#[test]
fn test_anchor_names_survive_comments() {
    for yaml in [
        "foo: &foo # note\n  a: 1\nbar: *foo\n",
        "foo: &foo\n  # note\n  a: 1\nbar: *foo\n",
    ] {
        let store = DocumentStore::from_yaml(yaml).unwrap();
        let doc = store.get(0).unwrap();
        assert_eq!(doc.root().get("foo").and_then(|n| n.anchor()), Some("foo"));
        let target = doc.resolve(doc.root().get("bar").unwrap()).unwrap();
        assert_eq!(target.get("a").and_then(|n| n.scalar_value()), Some("1"));
    }
}

#[test]
fn test_styles_and_tags_are_read() {
    let yaml = "flow: {a: 1}\nblock:\n  a: 1\nquoted: \"2\"\nsingle: 'x'\ncustom: !thing value\nfloat: 1.5\n";
    let store = DocumentStore::from_yaml(yaml).unwrap();
    let root = store.get(0).unwrap().root();

    assert_eq!(root.get("flow").map(|n| n.style()), Some(Style::Flow));
    assert_eq!(root.get("block").map(|n| n.style()), Some(Style::Default));
    assert_eq!(root.get("quoted").map(|n| n.tag()), Some(tags::STR));
    assert_eq!(root.get("single").map(|n| n.style()), Some(Style::SingleQuoted));
    assert_eq!(root.get("custom").map(|n| n.tag()), Some("!thing"));
    assert_eq!(root.get("float").map(|n| n.tag()), Some(tags::FLOAT));
}

#[test]
fn test_empty_stream_has_no_documents() {
    let store = DocumentStore::from_yaml("").unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_invalid_yaml_is_reported() {
    assert!(DocumentStore::from_yaml("a: [1, 2").is_err());
}
