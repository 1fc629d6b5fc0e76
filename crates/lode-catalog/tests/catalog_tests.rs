//! Integration tests for the catalog engine.
//!
//! Every scenario runs over both reference backends; the engine's
//! behavior must not depend on which one is underneath (the backends
//! diverge only in what survives a failed operation, covered in
//! `concurrency_tests.rs`).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use lode_catalog::prelude::*;
use lode_core::{Tag, TransactionalBackend, ValueType, VersionId, WriteThroughBackend};

fn backends() -> Vec<(&'static str, Catalog)> {
    vec![
        (
            "transactional",
            Catalog::new(Arc::new(TransactionalBackend::new())),
        ),
        (
            "write-through",
            Catalog::new(Arc::new(WriteThroughBackend::new())),
        ),
    ]
}

fn no_tags() -> BTreeMap<String, Tag> {
    BTreeMap::new()
}

fn leaf_vec(catalog: &Catalog, kind: ItemKind, name: &str) -> Vec<VersionId> {
    catalog.leaves(kind, name).unwrap().into_iter().collect()
}

#[test]
fn node_version_round_trip_with_structure() {
    for (backend, catalog) in backends() {
        let node = catalog.create_node("testNode", no_tags()).unwrap();

        let structure = catalog.create_structure("testStructure", no_tags()).unwrap();
        let attributes: BTreeMap<String, ValueType> = [
            ("intfield".to_string(), ValueType::Integer),
            ("boolfield".to_string(), ValueType::Boolean),
            ("strfield".to_string(), ValueType::String),
        ]
        .into_iter()
        .collect();
        let schema = catalog
            .create_structure_version(structure.id, attributes.clone(), &[])
            .unwrap();

        let new = NewRichVersion::new()
            .with_tag(Tag::new("intfield", 1i32))
            .with_tag(Tag::new("strfield", "1"))
            .with_tag(Tag::new("boolfield", true))
            .with_structure_version(schema.id)
            .with_reference("http://www.google.com")
            .with_parameter("http", "GET");

        let created = catalog
            .create_node_version(node.id, new.clone(), &[])
            .unwrap();
        let retrieved = catalog.node_version(created.rich.id).unwrap();

        assert_eq!(retrieved, created, "round trip on {backend}");
        assert_eq!(retrieved.node_id, node.id);
        assert_eq!(retrieved.rich.structure_version_id, Some(schema.id));
        assert_eq!(
            retrieved.rich.reference.as_deref(),
            Some("http://www.google.com")
        );
        assert_eq!(
            retrieved.rich.reference_parameters.get("http").unwrap(),
            "GET"
        );
        assert_eq!(retrieved.rich.tags, new.tags);

        assert_eq!(
            leaf_vec(&catalog, ItemKind::Node, "testNode"),
            vec![created.rich.id]
        );
    }
}

#[test]
fn item_round_trip_carries_tags_and_source_key() {
    for (_backend, catalog) in backends() {
        let mut tags = no_tags();
        tags.insert("owner".to_string(), Tag::new("owner", "pipeline-7"));
        tags.insert("rows".to_string(), Tag::new("rows", 1_000_000i64));

        catalog.create_node("tagged", tags.clone()).unwrap();
        let item = catalog.item(ItemKind::Node, "tagged").unwrap();
        assert_eq!(item.tags, tags);
        assert_eq!(item.source_key, None);

        catalog
            .create_lineage_edge("stage-link", "etl.stage-link", no_tags())
            .unwrap();
        let lineage = catalog.item(ItemKind::LineageEdge, "stage-link").unwrap();
        assert_eq!(lineage.source_key.as_deref(), Some("etl.stage-link"));
    }
}

#[test]
fn chain_of_empty_parent_attaches_collapses_to_one_leaf() {
    for (backend, catalog) in backends() {
        let node = catalog.create_node("chain", no_tags()).unwrap();
        assert!(
            leaf_vec(&catalog, ItemKind::Node, "chain").is_empty(),
            "no versions yet on {backend}"
        );

        let mut last = None;
        for _ in 0..5 {
            last = Some(
                catalog
                    .create_node_version(node.id, NewRichVersion::new(), &[])
                    .unwrap()
                    .rich
                    .id,
            );
        }

        assert_eq!(
            leaf_vec(&catalog, ItemKind::Node, "chain"),
            vec![last.unwrap()]
        );
    }
}

#[test]
fn explicit_parents_replace_only_those_leaves() {
    for (_backend, catalog) in backends() {
        let node = catalog.create_node("n", no_tags()).unwrap();

        let v1 = catalog
            .create_node_version(node.id, NewRichVersion::new(), &[])
            .unwrap()
            .rich
            .id;
        assert_eq!(leaf_vec(&catalog, ItemKind::Node, "n"), vec![v1]);

        let v2 = catalog
            .create_node_version(node.id, NewRichVersion::new(), &[v1])
            .unwrap()
            .rich
            .id;
        assert_eq!(leaf_vec(&catalog, ItemKind::Node, "n"), vec![v2]);

        // A fork off v1: v2 stays a leaf because it was not a stated parent.
        let v3 = catalog
            .create_node_version(node.id, NewRichVersion::new(), &[v1])
            .unwrap()
            .rich
            .id;
        assert_eq!(leaf_vec(&catalog, ItemKind::Node, "n"), vec![v2, v3]);
    }
}

#[test]
fn parent_from_another_item_is_rejected() {
    for (_backend, catalog) in backends() {
        let ours = catalog.create_node("ours", no_tags()).unwrap();
        let theirs = catalog.create_node("theirs", no_tags()).unwrap();

        let foreign = catalog
            .create_node_version(theirs.id, NewRichVersion::new(), &[])
            .unwrap()
            .rich
            .id;

        let err = catalog
            .create_node_version(ours.id, NewRichVersion::new(), &[foreign])
            .unwrap_err();
        match err {
            CatalogError::InvalidParent {
                version_id,
                item_id,
            } => {
                assert_eq!(version_id, foreign);
                assert_eq!(item_id, ours.id);
            }
            other => panic!("expected InvalidParent, got {other}"),
        }
    }
}

#[test]
fn tag_type_conflicting_with_schema_is_rejected() {
    for (_backend, catalog) in backends() {
        let node = catalog.create_node("n", no_tags()).unwrap();
        let structure = catalog.create_structure("s", no_tags()).unwrap();
        let schema = catalog
            .create_structure_version(
                structure.id,
                [("intfield".to_string(), ValueType::Integer)]
                    .into_iter()
                    .collect(),
                &[],
            )
            .unwrap();

        let new = NewRichVersion::new()
            .with_tag(Tag::new("intfield", "not-an-int"))
            .with_structure_version(schema.id);

        let err = catalog.create_node_version(node.id, new, &[]).unwrap_err();
        match err {
            CatalogError::TypeMismatch { key, expected, actual } => {
                assert_eq!(key, "intfield");
                assert_eq!(expected, ValueType::Integer);
                assert_eq!(actual, ValueType::String);
            }
            other => panic!("expected TypeMismatch, got {other}"),
        }
    }
}

#[test]
fn undeclared_structure_version_is_schema_not_found() {
    for (_backend, catalog) in backends() {
        let node = catalog.create_node("n", no_tags()).unwrap();
        let bogus = VersionId::from_raw(999_999);

        let new = NewRichVersion::new().with_structure_version(bogus);
        let err = catalog.create_node_version(node.id, new, &[]).unwrap_err();
        assert!(
            matches!(err, CatalogError::SchemaNotFound { version_id } if version_id == bogus),
            "expected SchemaNotFound, got {err}"
        );
    }
}

#[test]
fn edge_version_round_trip() {
    for (_backend, catalog) in backends() {
        let n1 = catalog.create_node("n1", no_tags()).unwrap();
        let n2 = catalog.create_node("n2", no_tags()).unwrap();
        let from = catalog
            .create_node_version(n1.id, NewRichVersion::new(), &[])
            .unwrap()
            .rich
            .id;
        let to = catalog
            .create_node_version(n2.id, NewRichVersion::new(), &[])
            .unwrap()
            .rich
            .id;

        let edge = catalog.create_edge("e", no_tags()).unwrap();
        let created = catalog
            .create_edge_version(edge.id, from, to, NewRichVersion::new(), &[])
            .unwrap();

        let retrieved = catalog.edge_version(created.rich.id).unwrap();
        assert_eq!(retrieved, created);
        assert_eq!(retrieved.edge_id, edge.id);
        assert_eq!(retrieved.from_node_version_id, from);
        assert_eq!(retrieved.to_node_version_id, to);
    }
}

#[test]
fn graph_version_round_trip_and_empty_graph() {
    for (_backend, catalog) in backends() {
        let n1 = catalog.create_node("n1", no_tags()).unwrap();
        let n2 = catalog.create_node("n2", no_tags()).unwrap();
        let from = catalog
            .create_node_version(n1.id, NewRichVersion::new(), &[])
            .unwrap()
            .rich
            .id;
        let to = catalog
            .create_node_version(n2.id, NewRichVersion::new(), &[])
            .unwrap()
            .rich
            .id;
        let edge = catalog.create_edge("e", no_tags()).unwrap();
        let edge_version = catalog
            .create_edge_version(edge.id, from, to, NewRichVersion::new(), &[])
            .unwrap()
            .rich
            .id;

        let graph = catalog.create_graph("g", no_tags()).unwrap();
        let edges: BTreeSet<VersionId> = [edge_version].into_iter().collect();
        let created = catalog
            .create_graph_version(graph.id, edges.clone(), NewRichVersion::new(), &[])
            .unwrap();

        let retrieved = catalog.graph_version(created.rich.id).unwrap();
        assert_eq!(retrieved, created);
        assert_eq!(retrieved.graph_id, graph.id);
        assert_eq!(retrieved.edge_version_ids, edges);

        let empty = catalog
            .create_graph_version(graph.id, BTreeSet::new(), NewRichVersion::new(), &[])
            .unwrap();
        let retrieved = catalog.graph_version(empty.rich.id).unwrap();
        assert!(retrieved.edge_version_ids.is_empty());
    }
}

#[test]
fn structure_version_round_trip() {
    for (_backend, catalog) in backends() {
        let structure = catalog.create_structure("s", no_tags()).unwrap();
        let attributes: BTreeMap<String, ValueType> = [
            ("name".to_string(), ValueType::String),
            ("count".to_string(), ValueType::Long),
        ]
        .into_iter()
        .collect();

        let created = catalog
            .create_structure_version(structure.id, attributes.clone(), &[])
            .unwrap();
        let retrieved = catalog.structure_version(created.id).unwrap();

        assert_eq!(retrieved, created);
        assert_eq!(retrieved.structure_id, structure.id);
        assert_eq!(retrieved.attributes, attributes);
        assert_eq!(
            leaf_vec(&catalog, ItemKind::Structure, "s"),
            vec![created.id]
        );
    }
}

#[test]
fn lineage_edge_version_round_trip() {
    for (_backend, catalog) in backends() {
        let n1 = catalog.create_node("n1", no_tags()).unwrap();
        let n2 = catalog.create_node("n2", no_tags()).unwrap();
        let from = catalog
            .create_node_version(n1.id, NewRichVersion::new(), &[])
            .unwrap()
            .rich
            .id;
        let to = catalog
            .create_node_version(n2.id, NewRichVersion::new(), &[])
            .unwrap()
            .rich
            .id;

        let lineage_edge = catalog
            .create_lineage_edge("stage", "etl.stage", no_tags())
            .unwrap();
        let created = catalog
            .create_lineage_edge_version(lineage_edge.id, from, to, NewRichVersion::new(), &[])
            .unwrap();

        let retrieved = catalog.lineage_edge_version(created.rich.id).unwrap();
        assert_eq!(retrieved, created);
        assert_eq!(retrieved.lineage_edge_id, lineage_edge.id);
        assert_eq!(retrieved.from_rich_version_id, from);
        assert_eq!(retrieved.to_rich_version_id, to);
    }
}

#[test]
fn lineage_graph_version_round_trip() {
    for (_backend, catalog) in backends() {
        let n1 = catalog.create_node("n1", no_tags()).unwrap();
        let n2 = catalog.create_node("n2", no_tags()).unwrap();
        let from = catalog
            .create_node_version(n1.id, NewRichVersion::new(), &[])
            .unwrap()
            .rich
            .id;
        let to = catalog
            .create_node_version(n2.id, NewRichVersion::new(), &[])
            .unwrap()
            .rich
            .id;
        let lineage_edge = catalog
            .create_lineage_edge("stage", "etl.stage", no_tags())
            .unwrap();
        let lev = catalog
            .create_lineage_edge_version(lineage_edge.id, from, to, NewRichVersion::new(), &[])
            .unwrap()
            .rich
            .id;

        let lineage_graph = catalog
            .create_lineage_graph("pipeline", "etl.pipeline", no_tags())
            .unwrap();
        let edges: BTreeSet<VersionId> = [lev].into_iter().collect();
        let created = catalog
            .create_lineage_graph_version(
                lineage_graph.id,
                edges.clone(),
                NewRichVersion::new(),
                &[],
            )
            .unwrap();

        let retrieved = catalog.lineage_graph_version(created.rich.id).unwrap();
        assert_eq!(retrieved, created);
        assert_eq!(retrieved.lineage_graph_id, lineage_graph.id);
        assert_eq!(retrieved.lineage_edge_version_ids, edges);
    }
}

#[test]
fn transitive_closure_follows_edges_forward() {
    for (backend, catalog) in backends() {
        let version = |name: &str| {
            let item = catalog.create_node(name, no_tags()).unwrap();
            catalog
                .create_node_version(item.id, NewRichVersion::new(), &[])
                .unwrap()
                .rich
                .id
        };
        let a = version("a");
        let b = version("b");
        let c = version("c");

        let edge = |name: &str, from, to| {
            let item = catalog.create_edge(name, no_tags()).unwrap();
            catalog
                .create_edge_version(item.id, from, to, NewRichVersion::new(), &[])
                .unwrap();
        };
        edge("c-to-b", c, b);
        edge("b-to-a", b, a);

        let expect = |start, ids: &[VersionId]| {
            let closure = catalog.transitive_closure(start).unwrap();
            assert_eq!(
                closure,
                ids.iter().copied().collect::<BTreeSet<_>>(),
                "closure of {start} on {backend}"
            );
        };
        expect(c, &[a, b]);
        expect(b, &[a]);
        expect(a, &[]);
    }
}

#[test]
fn transitive_closure_terminates_on_cycles() {
    for (_backend, catalog) in backends() {
        let version = |name: &str| {
            let item = catalog.create_node(name, no_tags()).unwrap();
            catalog
                .create_node_version(item.id, NewRichVersion::new(), &[])
                .unwrap()
                .rich
                .id
        };
        let x = version("x");
        let y = version("y");

        for (name, from, to) in [("x-to-y", x, y), ("y-to-x", y, x)] {
            let item = catalog.create_edge(name, no_tags()).unwrap();
            catalog
                .create_edge_version(item.id, from, to, NewRichVersion::new(), &[])
                .unwrap();
        }

        // The cycle leads back to the start, so the start is reachable too.
        let closure = catalog.transitive_closure(x).unwrap();
        assert_eq!(closure, [x, y].into_iter().collect::<BTreeSet<_>>());
    }
}

#[test]
fn adjacent_lineage_returns_departing_edge_versions() {
    for (_backend, catalog) in backends() {
        let n1 = catalog.create_node("n1", no_tags()).unwrap();
        let n2 = catalog.create_node("n2", no_tags()).unwrap();
        let a = catalog
            .create_node_version(n1.id, NewRichVersion::new(), &[])
            .unwrap()
            .rich
            .id;
        let b = catalog
            .create_node_version(n2.id, NewRichVersion::new(), &[])
            .unwrap()
            .rich
            .id;

        let lineage_edge = catalog
            .create_lineage_edge("stage", "etl.stage", no_tags())
            .unwrap();
        let departing = catalog
            .create_lineage_edge_version(lineage_edge.id, a, b, NewRichVersion::new(), &[])
            .unwrap()
            .rich
            .id;

        let adjacent = catalog.adjacent_lineage(a).unwrap();
        assert_eq!(adjacent, [departing].into_iter().collect::<BTreeSet<_>>());
        assert!(catalog.adjacent_lineage(b).unwrap().is_empty());
    }
}

#[test]
fn missing_names_and_ids_surface_as_not_found() {
    for (_backend, catalog) in backends() {
        let err = catalog.item(ItemKind::Node, "missing").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }), "got {err}");

        let err = catalog.leaves(ItemKind::Graph, "missing").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }), "got {err}");

        let bogus = VersionId::from_raw(424_242);
        for err in [
            catalog.node_version(bogus).unwrap_err(),
            catalog.edge_version(bogus).unwrap_err(),
            catalog.graph_version(bogus).unwrap_err(),
            catalog.structure_version(bogus).unwrap_err(),
            catalog.lineage_edge_version(bogus).unwrap_err(),
            catalog.lineage_graph_version(bogus).unwrap_err(),
            catalog.rich_version(bogus).unwrap_err(),
        ] {
            assert!(matches!(err, CatalogError::NotFound { .. }), "got {err}");
        }
    }
}

#[test]
fn duplicate_names_collide_per_kind_only() {
    for (_backend, catalog) in backends() {
        catalog.create_node("shared", no_tags()).unwrap();

        let err = catalog.create_node("shared", no_tags()).unwrap_err();
        match err {
            CatalogError::DuplicateName { kind, name } => {
                assert_eq!(kind, ItemKind::Node);
                assert_eq!(name, "shared");
            }
            other => panic!("expected DuplicateName, got {other}"),
        }

        // The same name under a different kind is a different namespace.
        catalog.create_edge("shared", no_tags()).unwrap();
    }
}

#[test]
fn node_version_serializes_for_the_request_layer() {
    let catalog = Catalog::new(Arc::new(TransactionalBackend::new()));
    let node = catalog.create_node("n", no_tags()).unwrap();
    let created = catalog
        .create_node_version(
            node.id,
            NewRichVersion::new().with_tag(Tag::new("rows", 42i64)),
            &[],
        )
        .unwrap();

    let json = serde_json::to_string(&created).unwrap();
    let back: NodeVersion = serde_json::from_str(&json).unwrap();
    assert_eq!(back, created);
}
