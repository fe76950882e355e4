//! Entity finder functions.
//!
//! A finder looks a game entity up by name or filter criteria. Its first
//! argument is always the calling container, injected by the grammar adapter
//! and checked by the evaluator. Lookups dispatch to the host's
//! [`EntityFinder`].

use std::sync::Arc;

use crate::{
    errors::ErrorKind,
    stdlib::RegistryBuilder,
    values::{
        Callable, Value,
        coerce::{to_string, truthy},
    },
};

/// Kinds of entity the game can look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Room,
    Fixture,
    Prefab,
    Recipe,
    RoomItem,
    Puzzle,
    Event,
    StatusEffect,
    Player,
    LivingPlayer,
    DeadPlayer,
    InventoryItem,
    Gesture,
    Flag,
}

impl EntityKind {
    /// Collection name, as used by world fixtures.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Room => "rooms",
            EntityKind::Fixture => "fixtures",
            EntityKind::Prefab => "prefabs",
            EntityKind::Recipe => "recipes",
            EntityKind::RoomItem => "roomItems",
            EntityKind::Puzzle => "puzzles",
            EntityKind::Event => "events",
            EntityKind::StatusEffect => "statusEffects",
            EntityKind::Player => "players",
            EntityKind::LivingPlayer => "livingPlayers",
            EntityKind::DeadPlayer => "deadPlayers",
            EntityKind::InventoryItem => "inventoryItems",
            EntityKind::Gesture => "gestures",
            EntityKind::Flag => "flags",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// The entity or `undefined`.
    One,
    /// A list, possibly empty.
    Many,
}

#[derive(Debug)]
pub struct FinderFunction {
    pub name: &'static str,
    pub kind: EntityKind,
    pub cardinality: Cardinality,
    /// Parameters after the implicit container.
    pub params: &'static [&'static str],
}

impl FinderFunction {
    /// Run the lookup. `args[0]` is the container; the caller has already
    /// checked it.
    pub fn call(&'static self, entities: &dyn EntityFinder, args: &[Value]) -> Result<Value, ErrorKind> {
        let Some((container, rest)) = args.split_first() else {
            return Err(ErrorKind::invalid_arguments(self.name, "missing container"));
        };
        if rest.len() > self.params.len() {
            return Err(ErrorKind::invalid_arguments(
                self.name,
                format!(
                    "expected at most {} arguments, got {}",
                    self.params.len(),
                    rest.len()
                ),
            ));
        }
        let query = FinderQuery {
            finder: self,
            container: container.clone(),
            args: rest.to_vec(),
        };
        tracing::debug!(finder = self.name, kind = ?self.kind, "entity lookup");
        match self.cardinality {
            Cardinality::One => Ok(entities.find_one(&query)?.unwrap_or(Value::Undefined)),
            Cardinality::Many => Ok(Value::from(entities.find_all(&query)?)),
        }
    }
}

/// One finder invocation, with arguments addressable by parameter name.
#[derive(Debug, Clone)]
pub struct FinderQuery {
    pub finder: &'static FinderFunction,
    pub container: Value,
    pub args: Vec<Value>,
}

impl FinderQuery {
    pub fn kind(&self) -> EntityKind {
        self.finder.kind
    }

    /// Argument bound to `param`. Omitted and `undefined` arguments are `None`.
    pub fn arg(&self, param: &str) -> Option<&Value> {
        let index = self.finder.params.iter().position(|p| *p == param)?;
        self.args
            .get(index)
            .filter(|v| !matches!(v, Value::Undefined))
    }

    /// Argument as a string filter. `null` counts as absent.
    pub fn str_arg(&self, param: &str) -> Option<Arc<str>> {
        self.arg(param)
            .filter(|v| !v.is_nullish())
            .map(to_string)
    }

    pub fn bool_arg(&self, param: &str) -> Option<bool> {
        self.arg(param).map(truthy)
    }
}

/// Host-side entity lookup. Returned values are wrapped in read-only views
/// before the expression sees them.
pub trait EntityFinder: Send + Sync {
    fn find_one(&self, query: &FinderQuery) -> Result<Option<Value>, ErrorKind>;

    fn find_all(&self, query: &FinderQuery) -> Result<Vec<Value>, ErrorKind>;
}

/// A world with nothing in it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEntities;

impl EntityFinder for NoEntities {
    fn find_one(&self, _query: &FinderQuery) -> Result<Option<Value>, ErrorKind> {
        Ok(None)
    }

    fn find_all(&self, _query: &FinderQuery) -> Result<Vec<Value>, ErrorKind> {
        Ok(Vec::new())
    }
}

macro_rules! finder {
    ($name:literal, $kind:ident, $cardinality:ident, [$($param:literal),*]) => {
        FinderFunction {
            name: $name,
            kind: EntityKind::$kind,
            cardinality: Cardinality::$cardinality,
            params: &[$($param),*],
        }
    };
}

pub static FINDERS: [FinderFunction; 28] = [
    finder!("findRoom", Room, One, ["id"]),
    finder!("findFixture", Fixture, One, ["name", "location"]),
    finder!("findObject", Fixture, One, ["name", "location"]),
    finder!("findPrefab", Prefab, One, ["id"]),
    finder!("findRoomItem", RoomItem, One, ["identifier", "location", "containerName"]),
    finder!("findItem", RoomItem, One, ["identifier", "location", "containerName"]),
    finder!("findPuzzle", Puzzle, One, ["name", "location"]),
    finder!("findEvent", Event, One, ["id"]),
    finder!("findStatusEffect", StatusEffect, One, ["id"]),
    finder!("findPlayer", Player, One, ["name"]),
    finder!("findLivingPlayer", LivingPlayer, One, ["name"]),
    finder!("findDeadPlayer", DeadPlayer, One, ["name"]),
    finder!(
        "findInventoryItem",
        InventoryItem,
        One,
        ["identifier", "player", "containerName", "equipmentSlotId"]
    ),
    finder!("findGesture", Gesture, One, ["id"]),
    finder!("findFlag", Flag, One, ["id", "evaluate"]),
    finder!("findRooms", Room, Many, ["id", "tag", "occupied"]),
    finder!(
        "findFixtures",
        Fixture,
        Many,
        ["name", "location", "accessible", "recipeTag"]
    ),
    finder!(
        "findPrefabs",
        Prefab,
        Many,
        ["id", "effectsString", "curesString", "equipmentSlotsString"]
    ),
    finder!(
        "findRecipes",
        Recipe,
        Many,
        ["type", "fixtureTag", "ingredientsString", "productsString"]
    ),
    finder!(
        "findRoomItems",
        RoomItem,
        Many,
        ["identifier", "location", "accessible", "containerName", "slotId"]
    ),
    finder!(
        "findPuzzles",
        Puzzle,
        Many,
        ["name", "location", "type", "accessible"]
    ),
    finder!(
        "findEvents",
        Event,
        Many,
        ["id", "ongoing", "roomTag", "effectsString", "refreshesString"]
    ),
    finder!(
        "findStatusEffects",
        StatusEffect,
        Many,
        ["id", "modifiedStatsString", "attributesString"]
    ),
    finder!(
        "findLivingPlayers",
        LivingPlayer,
        Many,
        ["name", "isNPC", "location", "hidingSpot", "statusString"]
    ),
    finder!("findDeadPlayers", DeadPlayer, Many, ["name", "isNPC"]),
    finder!(
        "findInventoryItems",
        InventoryItem,
        Many,
        ["identifier", "player", "containerName", "slotId", "equipmentSlotId"]
    ),
    finder!("findGestures", Gesture, Many, ["id"]),
    finder!("findFlags", Flag, Many, ["id"]),
];

pub(super) fn register(builder: &mut RegistryBuilder) {
    for finder in &FINDERS {
        builder.register(finder.name, Value::Function(Callable::Finder(finder)));
    }
}
