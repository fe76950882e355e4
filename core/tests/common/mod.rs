//! Live-object doubles shared by the integration tests.

#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use once_cell::sync::Lazy;
use vigil_core::{
    Sandbox, SandboxOptions,
    errors::ErrorKind,
    stdlib::{EntityFinder, EntityKind, FinderQuery},
    values::{Arity, ClosureFunction, HostObject, PropertyMap, Value, coerce::to_string},
};

/// A game entity with plain fields, a function-valued field, and methods
/// whose every invocation is counted.
#[derive(Debug)]
pub struct Entity {
    pub kind: &'static str,
    pub fields: Vec<(Arc<str>, Value)>,
    pub calls: AtomicUsize,
}

impl Entity {
    pub fn new(kind: &'static str, fields: impl IntoIterator<Item = (&'static str, Value)>) -> Self {
        Self {
            kind,
            fields: fields.into_iter().map(|(k, v)| (Arc::from(k), v)).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Methods every entity answers to. `unlock` and `sort` mutate in a real game.
pub const ENTITY_METHODS: &[&str] = &["describe", "unlock", "sort"];

impl HostObject for Entity {
    fn kind(&self) -> &str {
        self.kind
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.fields
            .iter()
            .find(|(k, _)| &**k == key)
            .map(|(_, v)| v.clone())
    }

    fn keys(&self) -> Vec<Arc<str>> {
        self.fields.iter().map(|(k, _)| k.clone()).collect()
    }

    fn methods(&self) -> &[&'static str] {
        ENTITY_METHODS
    }

    fn invoke(&self, method: &str, _args: &[Value]) -> Result<Value, ErrorKind> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match method {
            "describe" => Ok(Value::from(format!("a {}", self.kind.to_lowercase()))),
            other => Ok(Value::from(format!("{} ran", other))),
        }
    }
}

/// `hasAttribute(name)` over a fixed attribute list.
pub fn has_attribute(attributes: &'static [&'static str]) -> Value {
    Value::closure(ClosureFunction::new(
        "hasAttribute",
        Arity::exactly(1),
        move |args| {
            let wanted = to_string(&args[0]);
            Ok(Value::Bool(attributes.contains(&&*wanted)))
        },
    ))
}

pub fn chest() -> Arc<Entity> {
    let latch: PropertyMap = [("code", Value::from(1234.0))].into_iter().collect();
    Arc::new(Entity::new(
        "Fixture",
        [
            ("name", Value::from("oak chest")),
            ("weight", Value::from(40.0)),
            ("contents", Value::list([Value::from("coin"), Value::from("map")])),
            ("latch", Value::map(latch)),
            ("hasAttribute", has_attribute(&["concealed", "heavy"])),
        ],
    ))
}

pub fn hero() -> Arc<Entity> {
    Arc::new(Entity::new(
        "Player",
        [
            ("name", Value::from("Ava")),
            ("hp", Value::from(12.0)),
            ("statusString", Value::from("rested, fed")),
        ],
    ))
}

/// A small world: two rooms and one living player.
pub struct TestWorld {
    pub rooms: Vec<Arc<Entity>>,
    pub players: Vec<Arc<Entity>>,
    pub lookups: AtomicUsize,
}

impl TestWorld {
    pub fn new() -> Self {
        let room = |id: &'static str, tags: &[&'static str]| {
            Arc::new(Entity::new(
                "Room",
                [
                    ("id", Value::from(id)),
                    ("tags", Value::list(tags.iter().map(|t| Value::from(*t)))),
                ],
            ))
        };
        Self {
            rooms: vec![room("lobby", &[]), room("vault", &["locked", "dark"])],
            players: vec![hero()],
            lookups: AtomicUsize::new(0),
        }
    }

    fn pool(&self, kind: EntityKind) -> &[Arc<Entity>] {
        match kind {
            EntityKind::Room => &self.rooms,
            EntityKind::Player | EntityKind::LivingPlayer => &self.players,
            _ => &[],
        }
    }

    fn matching<'w>(&'w self, query: &'w FinderQuery) -> impl Iterator<Item = Value> + 'w {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let key = query.str_arg("id").or_else(|| query.str_arg("name"));
        self.pool(query.kind())
            .iter()
            .filter(move |entity| match &key {
                Some(key) => ["id", "name"]
                    .iter()
                    .filter_map(|field| entity.get(field))
                    .any(|value| to_string(&value) == *key),
                None => true,
            })
            .map(|entity| Value::Object(entity.clone()))
    }
}

impl EntityFinder for TestWorld {
    fn find_one(&self, query: &FinderQuery) -> Result<Option<Value>, ErrorKind> {
        Ok(self.matching(query).next())
    }

    fn find_all(&self, query: &FinderQuery) -> Result<Vec<Value>, ErrorKind> {
        Ok(self.matching(query).collect())
    }
}

pub static WORLD: Lazy<Arc<TestWorld>> = Lazy::new(|| Arc::new(TestWorld::new()));

pub static SANDBOX: Lazy<Sandbox> = Lazy::new(|| {
    let finder: Arc<dyn EntityFinder> = WORLD.clone();
    Sandbox::new(SandboxOptions::default()).with_finder(finder)
});

pub fn object(entity: &Arc<Entity>) -> Value {
    Value::Object(entity.clone())
}
