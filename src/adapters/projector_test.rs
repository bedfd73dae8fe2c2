use super::projector::DescriptorProjector;
use crate::config::{GenerationSettings, Leniency};
use crate::domain::schema::ObjectSchema;
use crate::domain::{FieldDescriptor, SchemaNode, SchemaPath, SchemaRegistry};
use crate::error::SynthError;
use serde_json::json;

fn registry() -> SchemaRegistry {
    SchemaRegistry::from_openapi(&json!({
        "components": {
            "schemas": {
                "Order": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer" },
                        "total": { "type": "number" },
                        "paid": { "type": "boolean" },
                        "note": { "type": "string" },
                        "customer": { "$ref": "#/components/schemas/Customer" },
                        "tags": { "type": "array", "items": { "type": "string" } },
                        "legacy": { "type": "null" }
                    }
                },
                "Customer": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" }
                    }
                }
            }
        }
    }))
    .unwrap()
}

fn order(registry: &SchemaRegistry) -> &ObjectSchema {
    match registry.get("Order") {
        Some(SchemaNode::Object(object)) => object,
        other => panic!("Expected object schema, got {:?}", other),
    }
}

#[test]
fn test_project_schema() {
    let registry = registry();
    let settings = GenerationSettings::default();
    let projector = DescriptorProjector::new(&registry, &settings);

    let fields = projector
        .project_schema(order(&registry), &SchemaPath::schema("Order"))
        .unwrap();

    assert_eq!(fields.names(), vec!["id", "total", "paid", "note", "customer", "tags"]);
    assert_eq!(fields.get("id"), Some(&FieldDescriptor::Integer));
    assert_eq!(fields.get("total"), Some(&FieldDescriptor::Float));
    assert_eq!(fields.get("tags"), Some(&FieldDescriptor::list(FieldDescriptor::String)));

    let Some(FieldDescriptor::Nested { fields: customer }) = fields.get("customer") else {
        panic!("Expected nested customer descriptor");
    };
    assert_eq!(customer.names(), vec!["name"]);
}

#[test]
fn test_project_schema_strict() {
    let registry = registry();
    let settings = GenerationSettings {
        leniency: Leniency::Strict,
        ..Default::default()
    };
    let projector = DescriptorProjector::new(&registry, &settings);

    let err = projector
        .project_schema(order(&registry), &SchemaPath::schema("Order"))
        .unwrap_err();
    assert!(matches!(err, SynthError::UnsupportedType { ref path, .. } if path == "Order.legacy"));
}

#[test]
fn test_project_sample() {
    let sample = json!({
        "id": 12,
        "total": 3.5,
        "whole": 4.0,
        "name": "ABC",
        "ok": false,
        "lines": [{ "sku": "X", "qty": 1 }],
        "empty": [],
        "missing": null
    });

    let fields = DescriptorProjector::project_sample(sample.as_object().unwrap());

    assert_eq!(fields.names(), vec!["id", "total", "whole", "name", "ok", "lines"]);
    assert_eq!(fields.get("id"), Some(&FieldDescriptor::Integer));
    assert_eq!(fields.get("total"), Some(&FieldDescriptor::Float));
    assert_eq!(fields.get("whole"), Some(&FieldDescriptor::Float));
    assert_eq!(fields.get("ok"), Some(&FieldDescriptor::Boolean));

    let serialized = serde_json::to_value(&fields).unwrap();
    assert_eq!(
        serialized["lines"],
        json!({
            "type": "list",
            "items": {
                "type": "nested",
                "fields": {
                    "sku": { "type": "string" },
                    "qty": { "type": "integer" }
                }
            }
        })
    );
}

#[test]
fn test_project_value_scalars() {
    assert_eq!(DescriptorProjector::project_value(&json!("x")), Some(FieldDescriptor::String));
    assert_eq!(DescriptorProjector::project_value(&json!(-3)), Some(FieldDescriptor::Integer));
    assert_eq!(DescriptorProjector::project_value(&json!(0.25)), Some(FieldDescriptor::Float));
    assert_eq!(DescriptorProjector::project_value(&json!(null)), None);
    assert_eq!(
        DescriptorProjector::project_value(&json!([true, false])),
        Some(FieldDescriptor::list(FieldDescriptor::Boolean))
    );
}
