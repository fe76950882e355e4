//! JSON fixtures as host objects.
//!
//! Objects become [`JsonObject`] host objects, arrays become lists and
//! scalars become primitives. Conversion happens once at load time, so every
//! read of the same field yields the same reference and `===` behaves as it
//! would against live game objects.

use std::sync::Arc;

use serde_json::Value as Json;
use vigil_core::{
    errors::ErrorKind,
    stdlib::{EntityFinder, EntityKind, FinderQuery},
    values::{HostObject, PrimitiveHint, Value, coerce::loose_equals},
};

/// A JSON object exposed read-only to expressions.
#[derive(Debug)]
pub struct JsonObject {
    kind: String,
    fields: Vec<(Arc<str>, Value)>,
}

impl JsonObject {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| &**k == key).map(|(_, v)| v)
    }
}

impl HostObject for JsonObject {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.field(key).cloned()
    }

    fn keys(&self) -> Vec<Arc<str>> {
        self.fields.iter().map(|(k, _)| k.clone()).collect()
    }

    fn to_primitive(&self, _hint: PrimitiveHint) -> Option<Value> {
        self.field("name").or(self.field("id")).cloned()
    }
}

/// Convert a parsed JSON document. `kind` names top-level objects; nested
/// objects take their `kind` field, or `Object`.
pub fn from_json(json: &Json, kind: &str) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        Json::String(s) => Value::from(s.as_str()),
        Json::Array(items) => Value::list(items.iter().map(|item| from_json(item, "Object"))),
        Json::Object(map) => Value::Object(Arc::new(JsonObject::from_map(map, kind))),
    }
}

impl JsonObject {
    fn from_map(map: &serde_json::Map<String, Json>, kind: &str) -> Self {
        let kind = map
            .get("kind")
            .and_then(Json::as_str)
            .unwrap_or(kind)
            .to_string();
        let fields = map
            .iter()
            .map(|(k, v)| (Arc::from(k.as_str()), from_json(v, "Object")))
            .collect();
        Self { kind, fields }
    }
}

/// Entities loaded from a world file.
///
/// The file is an object of collections keyed by [`EntityKind::collection`],
/// for example `{"rooms": [{"id": "lobby"}], "livingPlayers": [...]}`.
#[derive(Debug, Default)]
pub struct JsonWorld {
    collections: Vec<(EntityKind, Vec<Arc<JsonObject>>)>,
}

const KINDS: [EntityKind; 14] = [
    EntityKind::Room,
    EntityKind::Fixture,
    EntityKind::Prefab,
    EntityKind::Recipe,
    EntityKind::RoomItem,
    EntityKind::Puzzle,
    EntityKind::Event,
    EntityKind::StatusEffect,
    EntityKind::Player,
    EntityKind::LivingPlayer,
    EntityKind::DeadPlayer,
    EntityKind::InventoryItem,
    EntityKind::Gesture,
    EntityKind::Flag,
];

impl JsonWorld {
    pub fn from_json(json: &Json) -> Self {
        let mut collections = Vec::new();
        for kind in KINDS {
            let Some(Json::Array(items)) = json.get(kind.collection()) else {
                continue;
            };
            let kind_name = format!("{:?}", kind);
            let entities = items
                .iter()
                .filter_map(Json::as_object)
                .map(|map| Arc::new(JsonObject::from_map(map, &kind_name)))
                .collect();
            collections.push((kind, entities));
        }
        Self { collections }
    }

    fn entities(&self, kind: EntityKind) -> &[Arc<JsonObject>] {
        self.collections
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, entities)| entities.as_slice())
            .unwrap_or_default()
    }

    fn matches(entity: &JsonObject, query: &FinderQuery) -> bool {
        query.finder.params.iter().all(|param| {
            let Some(wanted) = query.arg(param).filter(|v| !v.is_nullish()) else {
                return true;
            };
            // Identifiers may name an entity by id or by name.
            let candidates: &[&str] = match *param {
                "identifier" => &["identifier", "id", "name"],
                "id" => &["id", "name"],
                _ => std::slice::from_ref(param),
            };
            candidates
                .iter()
                .filter_map(|field| entity.field(field))
                .any(|value| loose_equals(value, wanted))
        })
    }

    fn lookup<'w>(&'w self, query: &'w FinderQuery) -> impl Iterator<Item = Value> + 'w {
        self.entities(query.kind())
            .iter()
            .filter(move |entity| Self::matches(entity, query))
            .map(|entity| Value::Object(entity.clone()))
    }
}

impl EntityFinder for JsonWorld {
    fn find_one(&self, query: &FinderQuery) -> Result<Option<Value>, ErrorKind> {
        Ok(self.lookup(query).next())
    }

    fn find_all(&self, query: &FinderQuery) -> Result<Vec<Value>, ErrorKind> {
        Ok(self.lookup(query).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vigil_core::{Sandbox, SandboxOptions, values::Primitive};

    fn sandbox() -> Sandbox {
        let world = json!({
            "rooms": [
                {"id": "lobby", "tags": ["bright"]},
                {"id": "cellar", "tags": ["dark"]}
            ],
            "livingPlayers": [
                {"name": "Ava", "location": "lobby", "isNPC": false},
                {"name": "Guard", "location": "cellar", "isNPC": true}
            ]
        });
        Sandbox::new(SandboxOptions::default()).with_finder(Arc::new(JsonWorld::from_json(&world)))
    }

    #[test]
    fn test_find_by_id() {
        let result = sandbox()
            .evaluate("findRoom('cellar').tags[0]", &Value::Null, &Value::Null)
            .unwrap();
        assert_eq!(result, Primitive::Str("dark".into()));
    }

    #[test]
    fn test_find_many_with_filters() {
        let sandbox = sandbox();
        let count = |text: &str| sandbox.evaluate(text, &Value::Null, &Value::Null).unwrap();
        assert_eq!(count("findLivingPlayers().length"), Primitive::Number(2.0));
        assert_eq!(
            count("findLivingPlayers(undefined, true).length"),
            Primitive::Number(1.0)
        );
        assert_eq!(
            count("findLivingPlayers(null, false, 'lobby')[0].name"),
            Primitive::Str("Ava".into())
        );
    }

    #[test]
    fn test_objects_keep_identity() {
        let container = from_json(&json!({"exits": {"north": "hall"}}), "Room");
        let result = sandbox()
            .evaluate("container.exits === container.exits", &container, &Value::Null)
            .unwrap();
        assert_eq!(result, Primitive::Bool(true));
    }

    #[test]
    fn test_world_objects_are_read_only() {
        let err = sandbox()
            .evaluate("findRoom('lobby').tags.push('x')", &Value::Null, &Value::Null)
            .unwrap_err();
        assert_eq!(err.category(), "MutationProhibited");
    }
}
