//! End-to-end codec tests: write an annotation graph into the in-memory LDP
//! store, read it back, and check that the reassembled graph is isomorphic
//! to the original (same triple count, same variant structure, same scalar
//! fields), plus the store-shape guarantees along the way.

use oxigraph::model::NamedOrBlankNode;

use scholia::config::Config;
use scholia::graph::classify::{classify, BodyOrTarget, Selector};
use scholia::graph::{AnnotationGraph, WireFormat};
use scholia::ldp::mem::MemLdpStore;
use scholia::mapper::{ReadMapper, WriteMapper};
use scholia::repo::AnnotationRepo;
use scholia::search::graph_to_search_doc;

fn test_config() -> Config {
    let mut config = Config::default();
    config.base_uri = "http://annos.test/annotations".into();
    config.ldp.url = "http://store.test/rest/anno".into();
    config
}

fn parse(ttl: &str) -> AnnotationGraph {
    AnnotationGraph::from_wire(ttl.as_bytes(), WireFormat::Turtle).unwrap()
}

/// Write `ttl`, read it back, and return (original, reread, store, config).
fn round_trip(ttl: &str) -> (AnnotationGraph, AnnotationGraph, MemLdpStore, Config) {
    let config = test_config();
    let store = MemLdpStore::new(&config.ldp.url);
    let original = parse(ttl);
    let created = WriteMapper::new(&config, &store).create(&original).unwrap();
    let reread = ReadMapper::new(&config, &store).find(&created.id).unwrap();
    (original, reread, store, config)
}

fn classified_bodies(anno: &AnnotationGraph) -> Vec<BodyOrTarget> {
    anno.body_nodes()
        .into_iter()
        .filter_map(|t| NamedOrBlankNode::try_from(t).ok())
        .map(|n| classify(anno.graph(), &n))
        .collect()
}

fn classified_targets(anno: &AnnotationGraph) -> Vec<BodyOrTarget> {
    anno.target_nodes()
        .into_iter()
        .filter_map(|t| NamedOrBlankNode::try_from(t).ok())
        .map(|n| classify(anno.graph(), &n))
        .collect()
}

// ---------------------------------------------------------------------------
// The bookmarking example from the wire up
// ---------------------------------------------------------------------------

#[test]
fn bookmarking_example_writes_three_store_objects_and_reads_three_triples() {
    let config = test_config();
    let store = MemLdpStore::new(&config.ldp.url);
    let original = parse(
        r#"
        @prefix oa: <http://www.w3.org/ns/oa#> .
        [] a oa:Annotation ;
           oa:motivatedBy oa:bookmarking ;
           oa:hasTarget <http://purl.stanford.edu/kq131cs7229> .
        "#,
    );
    let created = WriteMapper::new(&config, &store).create(&original).unwrap();

    // Base resource + target container + one target resource; no body objects.
    assert_eq!(store.resource_count(), 3);
    assert!(created.body_ids.is_empty());
    assert_eq!(created.target_ids.len(), 1);

    let reread = ReadMapper::new(&config, &store).find(&created.id).unwrap();
    assert_eq!(reread.len(), 3);
    assert_eq!(
        reread.motivations()[0].as_str(),
        "http://www.w3.org/ns/oa#bookmarking"
    );
    assert_eq!(
        reread.target_uris()[0].as_str(),
        "http://purl.stanford.edu/kq131cs7229"
    );
    assert_eq!(
        reread.id_as_uri().unwrap().as_str(),
        format!("http://annos.test/annotations/{}", created.id)
    );
}

// ---------------------------------------------------------------------------
// Round-trip law: triple counts across the variant matrix
// ---------------------------------------------------------------------------

#[test]
fn round_trip_preserves_triple_count_for_every_variant() {
    let cases: &[(&str, &str)] = &[
        (
            "plain external uri",
            r#"
            @prefix oa: <http://www.w3.org/ns/oa#> .
            [] a oa:Annotation ;
               oa:motivatedBy oa:bookmarking ;
               oa:hasTarget <http://purl.stanford.edu/kq131cs7229> .
            "#,
        ),
        (
            "external reference with metadata",
            r#"
            @prefix oa: <http://www.w3.org/ns/oa#> .
            @prefix dc: <http://purl.org/dc/elements/1.1/> .
            [] a oa:Annotation ;
               oa:hasTarget <http://example.org/doc.html> .
            <http://example.org/doc.html> dc:format "text/html" .
            "#,
        ),
        (
            "content as text body",
            r#"
            @prefix oa: <http://www.w3.org/ns/oa#> .
            @prefix cnt: <http://www.w3.org/2011/content#> .
            @prefix dc: <http://purl.org/dc/elements/1.1/> .
            [] a oa:Annotation ;
               oa:motivatedBy oa:commenting ;
               oa:hasBody [
                   a cnt:ContentAsText ;
                   cnt:chars "I love this!" ;
                   dc:format "text/plain" ;
                   dc:language "en"
               ] ;
               oa:hasTarget <http://example.org/x> .
            "#,
        ),
        (
            "specific resource with text quote selector",
            r#"
            @prefix oa: <http://www.w3.org/ns/oa#> .
            [] a oa:Annotation ;
               oa:hasTarget [
                   a oa:SpecificResource ;
                   oa:hasSource <http://example.org/page.html> ;
                   oa:hasSelector [
                       a oa:TextQuoteSelector ;
                       oa:exact "quoted words" ;
                       oa:prefix "before " ;
                       oa:suffix " after"
                   ]
               ] .
            "#,
        ),
        (
            "choice of two text bodies",
            r#"
            @prefix oa: <http://www.w3.org/ns/oa#> .
            @prefix cnt: <http://www.w3.org/2011/content#> .
            [] a oa:Annotation ;
               oa:hasBody [
                   a oa:Choice ;
                   oa:default [ a cnt:ContentAsText ; cnt:chars "plain" ] ;
                   oa:item [ a cnt:ContentAsText ; cnt:chars "<b>html</b>" ]
               ] ;
               oa:hasTarget <http://example.org/x> .
            "#,
        ),
        (
            "annotated at survives on the base resource",
            r#"
            @prefix oa: <http://www.w3.org/ns/oa#> .
            [] a oa:Annotation ;
               oa:annotatedAt "2014-09-03T17:16:13Z" ;
               oa:hasTarget <http://example.org/x> .
            "#,
        ),
    ];

    for (name, ttl) in cases {
        let (original, reread, _, _) = round_trip(ttl);
        assert_eq!(
            reread.len(),
            original.len(),
            "triple count changed for case: {name}"
        );
    }
}

// ---------------------------------------------------------------------------
// Scalar preservation per variant
// ---------------------------------------------------------------------------

#[test]
fn content_as_text_scalars_survive() {
    let (_, reread, _, _) = round_trip(
        r#"
        @prefix oa: <http://www.w3.org/ns/oa#> .
        @prefix cnt: <http://www.w3.org/2011/content#> .
        @prefix dc: <http://purl.org/dc/elements/1.1/> .
        [] a oa:Annotation ;
           oa:hasBody [
               a cnt:ContentAsText ;
               cnt:chars "  whitespace kept  " ;
               dc:format "text/plain" ;
               dc:language "en"
           ] ;
           oa:hasTarget <http://example.org/x> .
        "#,
    );
    let bodies = classified_bodies(&reread);
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0].chars(), Some("  whitespace kept  "));
    assert_eq!(bodies[0].format(), Some("text/plain"));
    assert_eq!(bodies[0].language(), Some("en"));
}

#[test]
fn all_three_selector_kinds_survive() {
    let (_, reread, _, _) = round_trip(
        r#"
        @prefix oa: <http://www.w3.org/ns/oa#> .
        @prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
        @prefix dcterms: <http://purl.org/dc/terms/> .
        @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
        [] a oa:Annotation ;
           oa:hasTarget [
               a oa:SpecificResource ;
               oa:hasSource <http://example.org/a> ;
               oa:hasSelector [
                   a oa:FragmentSelector ;
                   rdf:value "xywh=0,0,200,200" ;
                   dcterms:conformsTo <http://www.w3.org/TR/media-frags/>
               ]
           ] , [
               a oa:SpecificResource ;
               oa:hasSource <http://example.org/b> ;
               oa:hasSelector [
                   a oa:TextPositionSelector ;
                   oa:start "4"^^xsd:nonNegativeInteger ;
                   oa:end "19"^^xsd:nonNegativeInteger
               ]
           ] , [
               a oa:SpecificResource ;
               oa:hasSource <http://example.org/c> ;
               oa:hasSelector [
                   a oa:TextQuoteSelector ;
                   oa:exact "exact words" ;
                   oa:prefix "pre " ;
                   oa:suffix " post"
               ]
           ] .
        "#,
    );
    let mut selectors: Vec<Selector> = classified_targets(&reread)
        .into_iter()
        .filter_map(|t| match t {
            BodyOrTarget::SpecificResource { selector, .. } => selector,
            _ => None,
        })
        .collect();
    assert_eq!(selectors.len(), 3);
    selectors.sort_by_key(|s| match s {
        Selector::Fragment { .. } => 0,
        Selector::TextPosition { .. } => 1,
        Selector::TextQuote { .. } => 2,
        Selector::Other { .. } => 3,
    });
    assert_eq!(
        selectors[0],
        Selector::Fragment {
            value: "xywh=0,0,200,200".into(),
            conforms_to: Some(oxigraph::model::NamedNode::new_unchecked(
                "http://www.w3.org/TR/media-frags/"
            )),
        }
    );
    assert_eq!(selectors[1], Selector::TextPosition { start: 4, end: 19 });
    assert_eq!(
        selectors[2],
        Selector::TextQuote {
            exact: "exact words".into(),
            prefix: Some("pre ".into()),
            suffix: Some(" post".into()),
        }
    );
}

#[test]
fn choice_structure_survives_with_kinds_intact() {
    let (_, reread, _, _) = round_trip(
        r#"
        @prefix oa: <http://www.w3.org/ns/oa#> .
        @prefix cnt: <http://www.w3.org/2011/content#> .
        [] a oa:Annotation ;
           oa:hasBody [
               a oa:Choice ;
               oa:default [ a cnt:ContentAsText ; cnt:chars "plain" ] ;
               oa:item <http://example.org/alt.html>
           ] ;
           oa:hasTarget <http://example.org/x> .
        "#,
    );
    let bodies = classified_bodies(&reread);
    match &bodies[0] {
        BodyOrTarget::Choice { default, items } => {
            assert_eq!(
                default.as_deref().and_then(|d| d.chars()),
                Some("plain")
            );
            assert_eq!(items.len(), 1);
            assert!(matches!(items[0], BodyOrTarget::PlainExternalUri(_)));
        }
        other => panic!("expected Choice body, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Deep nesting: skolemized nodes and the follow-up fetch path
// ---------------------------------------------------------------------------

#[test]
fn choice_of_specific_resources_round_trips_through_genid_follow_ups() {
    let ttl = r#"
        @prefix oa: <http://www.w3.org/ns/oa#> .
        @prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
        [] a oa:Annotation ;
           oa:hasTarget [
               a oa:Choice ;
               oa:default [
                   a oa:SpecificResource ;
                   oa:hasSource <http://example.org/full.jpg> ;
                   oa:hasSelector [
                       a oa:FragmentSelector ;
                       rdf:value "xywh=0,0,200,200"
                   ]
               ] ;
               oa:item <http://example.org/thumb.jpg>
           ] .
    "#;
    let (original, reread, _, _) = round_trip(ttl);
    assert_eq!(reread.len(), original.len());

    let targets = classified_targets(&reread);
    match &targets[0] {
        BodyOrTarget::Choice { default, items } => {
            match default.as_deref() {
                Some(BodyOrTarget::SpecificResource { source, selector }) => {
                    assert!(matches!(
                        source.as_deref(),
                        Some(BodyOrTarget::PlainExternalUri(_))
                    ));
                    assert_eq!(
                        selector,
                        &Some(Selector::Fragment {
                            value: "xywh=0,0,200,200".into(),
                            conforms_to: None,
                        })
                    );
                }
                other => panic!("expected SpecificResource default, got {other:?}"),
            }
            assert_eq!(items.len(), 1);
        }
        other => panic!("expected Choice target, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Container asymmetry and deletion containment
// ---------------------------------------------------------------------------

#[test]
fn annotation_without_targets_skips_the_target_container() {
    let config = test_config();
    let store = MemLdpStore::new(&config.ldp.url);
    let original = parse(
        r#"
        @prefix oa: <http://www.w3.org/ns/oa#> .
        @prefix cnt: <http://www.w3.org/2011/content#> .
        [] a oa:Annotation ;
           oa:motivatedBy oa:commenting ;
           oa:hasBody [ a cnt:ContentAsText ; cnt:chars "untethered" ] .
        "#,
    );
    let created = WriteMapper::new(&config, &store).create(&original).unwrap();
    let root_uri = format!("{}/{}", config.ldp.url, created.id);
    assert!(store.contains(&format!("{root_uri}/b")));
    assert!(!store.contains(&format!("{root_uri}/t")));

    let reread = ReadMapper::new(&config, &store).find(&created.id).unwrap();
    assert_eq!(reread.len(), original.len());
    assert!(reread.target_nodes().is_empty());
}

#[test]
fn deleting_a_target_sub_resource_keeps_the_container() {
    let config = test_config();
    let store = MemLdpStore::new(&config.ldp.url);
    let created = WriteMapper::new(&config, &store)
        .create(&parse(
            r#"
            @prefix oa: <http://www.w3.org/ns/oa#> .
            [] a oa:Annotation ;
               oa:hasTarget <http://example.org/a>, <http://example.org/b> .
            "#,
        ))
        .unwrap();
    let root_uri = format!("{}/{}", config.ldp.url, created.id);
    let container = format!("{root_uri}/t");
    let victim = format!("{container}/{}", created.target_ids[0]);

    use scholia::ldp::LdpStore;
    store.delete(&victim).unwrap();
    assert!(store.contains(&container));
    assert!(store.contains(&root_uri));
    assert!(store.contains(&format!("{container}/{}", created.target_ids[1])));
}

// ---------------------------------------------------------------------------
// Facade: lifecycle plus search projection off the read-back graph
// ---------------------------------------------------------------------------

#[test]
fn create_read_project_lifecycle_through_the_repo() {
    let config = test_config();
    let store = Box::new(MemLdpStore::new(&config.ldp.url));
    let repo = AnnotationRepo::with_store(config.clone(), store).unwrap();

    let created = repo
        .create(&parse(
            r#"
            @prefix oa: <http://www.w3.org/ns/oa#> .
            [] a oa:Annotation ;
               oa:motivatedBy oa:bookmarking ;
               oa:hasTarget <http://purl.stanford.edu/kq131cs7229> .
            "#,
        ))
        .unwrap();

    let reread = repo.find(&created.id).unwrap();
    let doc = graph_to_search_doc(&reread, &config).unwrap();
    assert_eq!(doc.id, created.id);
    assert_eq!(doc.motivation, vec!["bookmarking"]);
    assert_eq!(doc.body_type, vec!["no_body"]);
    assert!(doc.body_chars_exact.is_empty());
    assert_eq!(doc.target_url, vec!["http://purl.stanford.edu/kq131cs7229"]);

    repo.delete(&created.id).unwrap();
    assert!(repo.find(&created.id).is_err());
}
