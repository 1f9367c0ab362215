//! Serialising an element and converting the record back gives the element.

use gaffer_bridge::{
    convert_record, DirectedType, Edge, EdgeSeed, Element, ElementSerialiser, Entity, EntitySeed,
    JsonElementSerialiser, MapElementSerialiser, MatchedVertex, Properties, RawRecord,
};
use proptest::prelude::*;
use serde_json::Value;

fn value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        "[a-z]{1,8}".prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(Value::Null),
    ]
}

fn matched_vertex() -> impl Strategy<Value = Option<MatchedVertex>> {
    proptest::option::of(prop_oneof![
        Just(MatchedVertex::Source),
        Just(MatchedVertex::Destination)
    ])
}

fn directed_type() -> impl Strategy<Value = DirectedType> {
    prop_oneof![
        Just(DirectedType::Directed),
        Just(DirectedType::Undirected),
        Just(DirectedType::Either),
    ]
}

fn properties() -> impl Strategy<Value = Properties> {
    proptest::collection::btree_map("[a-z]{1,6}", value(), 0..4)
}

fn element() -> impl Strategy<Value = Element> {
    prop_oneof![
        ("[A-Za-z]{1,8}", value(), properties()).prop_map(|(group, vertex, properties)| {
            Element::Entity(Entity::new(group, vertex).with_properties(properties))
        }),
        (
            "[A-Za-z]{1,8}",
            value(),
            value(),
            any::<bool>(),
            properties(),
            matched_vertex(),
        )
            .prop_map(|(group, source, destination, directed, properties, matched)| {
                let mut edge = Edge::new(group, source, destination, directed)
                    .with_properties(properties);
                edge.matched_vertex = matched;
                Element::Edge(edge)
            }),
        value().prop_map(|vertex| Element::EntitySeed(EntitySeed::new(vertex))),
        (value(), value(), directed_type(), matched_vertex()).prop_map(
            |(source, destination, directed_type, matched)| {
                let mut seed = EdgeSeed::new(source, destination, directed_type);
                seed.matched_vertex = matched;
                Element::EdgeSeed(seed)
            }
        ),
    ]
}

proptest! {
    #[test]
    fn tagged_map_converts_back(element in element()) {
        let record = MapElementSerialiser.serialise(&element).expect("serialise");
        let converted = convert_record(&RawRecord::Map(record)).expect("convert");
        prop_assert_eq!(converted, element);
    }

    #[test]
    fn json_record_converts_back(element in element()) {
        let record = JsonElementSerialiser.serialise(&element).expect("serialise");
        let converted = convert_record(&RawRecord::Pair(record, Value::Null)).expect("convert");
        prop_assert_eq!(converted, element);
    }
}
