use dmr::dispatch::{ContentType, DispatchError, Dispatcher, Transport};
use dmr::helper::{fail_safe_get, fail_safe_list};
use dmr::{
    Composite, CompositeResult, ModelNode, ModelType, Operation, ResourceAddress, ADDRESS, OP,
    OPERATION_HEADERS, OUTCOME, RESULT, ROLES, STEPS, SUCCESS,
};

fn datasource() -> ResourceAddress {
    "/subsystem=datasources/data-source=ExampleDS".parse().unwrap()
}

// ── addresses ──

#[test]
fn address_text_and_segments() {
    let address = datasource();
    assert_eq!(address.to_string(), "/subsystem=datasources/data-source=ExampleDS");
    assert_eq!(address.size(), 2);
    assert_eq!(address.last_name().as_deref(), Some("data-source"));
    assert_eq!(address.first_value().as_deref(), Some("datasources"));
    assert_eq!(address.parent().to_string(), "/subsystem=datasources");
    assert!(address.starts_with(&address.parent()));
    assert!(!address.parent().starts_with(&address));
    assert_eq!(ResourceAddress::root().to_string(), "");
    assert!(ResourceAddress::root().parent().is_empty());
}

#[test]
fn address_parse_edge_cases() {
    assert_eq!("subsystem=ee/".parse::<ResourceAddress>().unwrap().to_string(), "/subsystem=ee");
    assert!("  ".parse::<ResourceAddress>().unwrap().is_empty());
    assert!("/".parse::<ResourceAddress>().unwrap().is_empty());
    assert!("/subsystem".parse::<ResourceAddress>().is_err());
    assert!("/subsystem=".parse::<ResourceAddress>().is_err());
    assert!("/a=b=c".parse::<ResourceAddress>().is_err());
}

#[test]
fn address_from_response_shapes() {
    let pairs = ModelNode::from_json_str(r#"[{"subsystem":"ee"},["service","default"]]"#).unwrap();
    let from_pairs = ResourceAddress::from_node(&pairs).unwrap();
    assert_eq!(from_pairs.to_string(), "/subsystem=ee/service=default");

    let object = ModelNode::from_json_str(r#"{"subsystem":"ee","service":"default"}"#).unwrap();
    let from_object = ResourceAddress::from_node(&object).unwrap();
    assert_eq!(from_object, from_pairs);

    assert!(ResourceAddress::from_node(&ModelNode::new()).unwrap().is_empty());
    assert!(ResourceAddress::from_node(&ModelNode::from(1)).is_err());
}

#[test]
fn address_replace_and_concatenate() {
    let renamed = datasource().replace_value("data-source", "OtherDS");
    assert_eq!(renamed.last_value().as_deref(), Some("OtherDS"));
    assert_eq!(datasource().last_value().as_deref(), Some("ExampleDS"));

    let mut profile: ResourceAddress = "/profile=full".parse().unwrap();
    profile.add_address(&datasource()).unwrap();
    assert_eq!(profile.to_string(), "/profile=full/subsystem=datasources/data-source=ExampleDS");
}

// ── operations ──

#[test]
fn operation_key_order_and_cli() {
    let op = Operation::builder(datasource(), "write-attribute")
        .param("name", "min-pool-size")
        .param("value", 5)
        .header("allow-resource-service-restart", true)
        .build()
        .unwrap();
    assert_eq!(
        op.keys().unwrap(),
        vec!["name", "value", OP, ADDRESS, OPERATION_HEADERS]
    );
    assert_eq!(
        op.as_cli(),
        "/subsystem=datasources/data-source=ExampleDS:write-attribute(name=min-pool-size,value=5)\
         {allow-resource-service-restart=true}"
    );
    assert_eq!(op.to_string(), op.as_cli());
}

#[test]
fn root_operation_cli() {
    let op = Operation::builder(ResourceAddress::root(), "read-children-names")
        .param("child-type", "subsystem")
        .build()
        .unwrap();
    assert_eq!(op.as_cli(), ":read-children-names(child-type=subsystem)");
}

#[test]
fn builder_reports_the_first_failure() {
    let payload = ModelNode::from("not an object");
    let result = Operation::builder(datasource(), "add").payload(payload).build();
    assert!(result.is_err());
}

#[test]
fn run_as_replaces_roles() {
    let op = Operation::builder(datasource(), "read-resource")
        .run_as(["Monitor", "Operator"])
        .build()
        .unwrap();
    let single = op.run_as(["Deployer"]).unwrap();
    let roles = single.child(OPERATION_HEADERS).unwrap().child(ROLES).unwrap();
    assert_eq!(roles.model_type(), ModelType::String);
    assert_eq!(roles.as_string(), "Deployer");
    assert_eq!(single.roles().iter().collect::<Vec<_>>(), vec!["Deployer"]);
}

#[test]
fn operation_survives_the_wire() {
    let op = Operation::builder(datasource(), "read-attribute")
        .param("name", "enabled")
        .resolve_expressions()
        .build()
        .unwrap();
    let decoded = ModelNode::from_base64(&op.to_base64_string().unwrap()).unwrap();
    let parsed = Operation::from_node(&decoded).unwrap();
    assert_eq!(parsed, op);
}

// ── composites ──

#[test]
fn composite_keeps_step_order() {
    let ops = ["a", "b", "c"].map(|name| {
        Operation::builder(datasource(), "read-attribute")
            .param("name", name)
            .build()
            .unwrap()
    });
    let [first, rest @ ..] = ops;
    let composite = Composite::new(first, rest).unwrap();
    assert_eq!(composite.size(), 3);
    assert_eq!(composite.name(), "composite");
    assert!(composite.address().is_empty());

    let steps = composite.child(STEPS).unwrap();
    let names: Vec<_> = (0..3)
        .map(|i| steps.child_index(i).unwrap().child("name").unwrap().as_string())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(composite.as_cli().lines().count(), 3);
    let params: Vec<_> = composite
        .iter()
        .map(|op| op.parameter().child("name").unwrap().as_string())
        .collect();
    assert_eq!(params, names);
}

#[test]
fn composite_run_as_touches_every_step() {
    let read = Operation::builder(datasource(), "read-resource").build().unwrap();
    let composite = Composite::new(read.clone(), [read]).unwrap().run_as(&["Auditor"]).unwrap();
    for step in &composite {
        assert_eq!(step.roles().first().map(String::as_str), Some("Auditor"));
    }
    assert_eq!(composite.child(STEPS).unwrap().as_int().unwrap(), 2);
}

#[test]
fn composite_result_lookup() {
    let response = ModelNode::from_json_str(
        r#"{"step-1":{"outcome":"success","result":1},"step-2":{"outcome":"success","result":"two"}}"#,
    )
    .unwrap();
    let result = CompositeResult::new(&response);
    assert_eq!(result.size(), 2);
    assert_eq!(result.step(0).child(RESULT).unwrap().as_int().unwrap(), 1);
    assert_eq!(result.step_named("step-2").child(RESULT).unwrap().as_string(), "two");
    assert!(!result.step(5).is_defined());
    assert_eq!(result.iter().count(), 2);
}

// ── dispatch ──

/// Answers every request with `{"outcome": "success", "result": <request>}`.
struct Echo;

impl Transport for Echo {
    fn execute(&self, body: &str, content: ContentType) -> Result<String, DispatchError> {
        let request = match content {
            ContentType::DmrEncoded => ModelNode::from_base64(body),
            ContentType::Json => ModelNode::from_json_str(body),
        }
        .map_err(|err| DispatchError::Transport(err.to_string()))?;
        let mut response = ModelNode::new();
        response.get(OUTCOME).unwrap().set(SUCCESS).unwrap();
        *response.get(RESULT).unwrap() = request;
        Ok(match content {
            ContentType::DmrEncoded => response.to_base64_string().unwrap(),
            ContentType::Json => response.to_json_string(true),
        })
    }
}

#[test]
fn dispatcher_round_trips_in_both_content_types() {
    let op = Operation::builder(datasource(), "read-resource")
        .param("recursive", true)
        .build()
        .unwrap();
    for content in [ContentType::DmrEncoded, ContentType::Json] {
        let dispatcher = Dispatcher::new(Echo).with_content_type(content);
        let result = dispatcher.execute(&op).unwrap();
        assert_eq!(&result, op.as_model_node(), "{content}");
        assert!(fail_safe_get(&result, "recursive").as_boolean().unwrap());
        assert_eq!(fail_safe_list(&result, "address").len(), 2);
    }
}
