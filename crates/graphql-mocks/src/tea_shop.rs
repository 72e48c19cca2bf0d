use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{json, Value};

use crate::{FieldDefinition, MockSchema, ObjectType};

fn teas() -> Value {
    json!([
        {"name": "Sencha", "origin": "Japan", "caffeinated": true, "price": 4.5},
        {"name": "Earl Grey", "origin": "China", "caffeinated": true, "price": 3.0},
        {"name": "Rooibos", "origin": "South Africa", "caffeinated": false, "price": 3.5},
        {"name": "Darjeeling", "origin": "India", "caffeinated": true, "price": 5.0},
    ])
}

fn find_tea(name: Option<&Value>) -> Value {
    let Some(name) = name else {
        return Value::Null;
    };

    match teas() {
        Value::Array(teas) => teas
            .into_iter()
            .find(|tea| tea.get("name") == Some(name))
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// A tea shop: a catalog of teas to query and orders to place.
///
/// `customer` reads the `customer` property of the execution context and `greeting` the one of the
/// root value.
pub fn schema() -> MockSchema {
    let order_ids = AtomicU64::new(1);

    MockSchema::builder()
        .object(
            ObjectType::new("Query")
                .field("teas", FieldDefinition::new("[Tea!]!").resolver(|_| Ok(teas())))
                .field(
                    "tea",
                    FieldDefinition::new("Tea").resolver(|ctx| Ok(find_tea(ctx.arguments.get("name")))),
                )
                .field(
                    "specialOfTheDay",
                    FieldDefinition::new("Tea").resolver(|_| Err("The special of the day is sold out.".to_string())),
                )
                .field(
                    "customer",
                    FieldDefinition::new("String").resolver(|ctx| {
                        Ok(ctx
                            .context
                            .and_then(|context| context.get("customer"))
                            .cloned()
                            .unwrap_or(Value::Null))
                    }),
                )
                .field("greeting", FieldDefinition::new("String")),
        )
        .object(
            ObjectType::new("Tea")
                .field("name", FieldDefinition::new("String!"))
                .field("origin", FieldDefinition::new("String"))
                .field("caffeinated", FieldDefinition::new("Boolean!"))
                .field("price", FieldDefinition::new("Float!")),
        )
        .object(
            ObjectType::new("Mutation").field(
                "orderTea",
                FieldDefinition::new("Order").resolver(move |ctx| {
                    let tea = find_tea(ctx.arguments.get("name"));
                    if tea.is_null() {
                        return Err("We do not sell this tea.".to_string());
                    }
                    let quantity = ctx.arguments.get("quantity").and_then(Value::as_u64).unwrap_or(1);
                    let id = order_ids.fetch_add(1, Ordering::Relaxed);
                    Ok(json!({"id": id.to_string(), "tea": tea, "quantity": quantity}))
                }),
            ),
        )
        .object(
            ObjectType::new("Order")
                .field("id", FieldDefinition::new("ID!"))
                .field("tea", FieldDefinition::new("Tea!"))
                .field("quantity", FieldDefinition::new("Int!")),
        )
        .query("Query")
        .mutation("Mutation")
        .build()
}
