use dmr::{ModelNode, ModelType, ModelValue, Property};

fn sample() -> ModelNode {
    let mut node = ModelNode::new();
    node.get("name").unwrap().set("ExampleDS").unwrap();
    node.get("enabled").unwrap().set(true).unwrap();
    node.get("pool").unwrap().get("max").unwrap().set(20).unwrap();
    node.get("tags").unwrap().add("a").unwrap().add("b").unwrap();
    node.get("jndi").unwrap().set_expression("${env.JNDI:java:/ds}").unwrap();
    node.get("kind").unwrap().set(ModelType::Long).unwrap();
    node.get("raw").unwrap().set(vec![1u8, 2]).unwrap();
    node.get("pair").unwrap().set_property("k", 1).unwrap();
    node
}

#[test]
fn compact_output() {
    assert_eq!(
        sample().to_json_string(true),
        concat!(
            r#"{"name":"ExampleDS","enabled":true,"pool":{"max":20},"tags":["a","b"],"#,
            r#""jndi":{"EXPRESSION_VALUE":"${env.JNDI:java:/ds}"},"#,
            r#""kind":{"TYPE_MODEL_VALUE":"LONG"},"#,
            r#""raw":{"BYTES_VALUE":"AQI="},"#,
            r#""pair":{"PROPERTY_VALUE":{"k":1}}}"#,
        )
    );
}

#[test]
fn pretty_output_breaks_larger_containers() {
    let mut node = ModelNode::new();
    node.get("a").unwrap().set(1).unwrap();
    node.get("b").unwrap().get("c").unwrap().set("x").unwrap();
    assert_eq!(node.to_json_string(false), "{\n    \"a\" : 1,\n    \"b\" : {\"c\" : \"x\"}\n}");
}

#[test]
fn sentinels_survive_a_round_trip() {
    let node = sample();
    for compact in [true, false] {
        let text = node.to_json_string(compact);
        assert_eq!(ModelNode::from_json_str(&text).unwrap(), node, "compact = {compact}");
    }
}

#[test]
fn projection_is_lossy_for_numbers() {
    let mut node = ModelNode::new();
    node.get("long").unwrap().set(5i64).unwrap();
    node.get("nan").unwrap().set(f64::NAN).unwrap();
    node.get("one").unwrap().set(1.0).unwrap();
    let text = node.to_json_string(true);
    assert_eq!(text, r#"{"long":5,"nan":null,"one":1.0}"#);

    let back = ModelNode::from_json_str(&text).unwrap();
    assert_eq!(back.child("long").unwrap().model_type(), ModelType::Int);
    assert!(!back.child("nan").unwrap().is_defined());
    assert_eq!(back.child("one").unwrap().model_type(), ModelType::Double);
}

#[test]
fn ordinary_single_key_objects_stay_objects() {
    let node = ModelNode::from_json_str(r#"{"value":{"x":1}}"#).unwrap();
    assert_eq!(node.model_type(), ModelType::Object);
    assert_eq!(node.child("value").unwrap().model_type(), ModelType::Object);
}

#[test]
fn malformed_sentinels_are_errors() {
    assert!(ModelNode::from_json_str(r#"{"BYTES_VALUE":1}"#).is_err());
    assert!(ModelNode::from_json_str(r#"{"TYPE_MODEL_VALUE":"NOPE"}"#).is_err());
    assert!(ModelNode::from_json_str(r#"{"PROPERTY_VALUE":{"a":1,"b":2}}"#).is_err());
    assert!(ModelNode::from_json_str("{").is_err());
}

#[test]
fn property_list_in_json() {
    let list = ModelNode::from_value(ModelValue::List(vec![
        ModelNode::from(Property::shared("a", ModelNode::from(1))),
        ModelNode::from(Property::shared("b", ModelNode::from("x"))),
    ]));
    let text = list.to_json_string(true);
    assert_eq!(text, r#"[{"PROPERTY_VALUE":{"a":1}},{"PROPERTY_VALUE":{"b":"x"}}]"#);
    let props = ModelNode::from_json_str(&text).unwrap().as_property_list().unwrap();
    assert_eq!(props[1].name(), "b");
    assert_eq!(props[1].value().as_string(), "x");
}
