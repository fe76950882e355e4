//! Names no expression may read or call.

/// Property names rejected at every step of every member chain.
pub const BLOCKED_PROPERTIES: &[&str] = &[
    // Prototype chain.
    "__proto__",
    "prototype",
    "constructor",
    "__defineGetter__",
    "__defineSetter__",
    "__lookupGetter__",
    "__lookupSetter__",
    // Game model operations that change state.
    "addPlayer",
    "removePlayer",
    "joinChannel",
    "leaveChannel",
    "unlock",
    "lock",
    "setAccessible",
    "setInaccessible",
    "activate",
    "deactivate",
    "processRecipes",
    "findRecipe",
    "insertItem",
    "removeItem",
    "solve",
    "unsolve",
    "fail",
    "alreadySolved",
    "requirementsNotMet",
    "trigger",
    "end",
    "startTimer",
    "startEffectsTimer",
    "setPronouns",
    "queueMovement",
    "move",
    "calculateMoveTime",
    "regenerateStamina",
    "createMoveAppendString",
    "inflict",
    "cure",
    "recalculateStats",
    "recalculateStat",
    "use",
    "take",
    "steal",
    "drop",
    "give",
    "stash",
    "unstash",
    "equip",
    "fastEquip",
    "unequip",
    "fastUnequip",
    "craft",
    "uncraft",
    "attemptPuzzle",
    "gesture",
    "die",
    "removeFromWhispers",
    "sendDescription",
    "notify",
    "setOnline",
    "setOffline",
    // Live handles.
    "channel",
    "recipeInterval",
    "timer",
    "effectsTimer",
];

/// Function-valued properties that read back as a blocked mutator on any
/// wrapped object.
pub const BLOCKED_MUTATORS: &[&str] = &[
    "push",
    "pop",
    "shift",
    "unshift",
    "splice",
    "sort",
    "reverse",
    "fill",
    "copyWithin",
    "set",
    "add",
    "delete",
    "clear",
    "insert",
    "remove",
    "assign",
];

pub fn is_blocked_property(name: &str) -> bool {
    BLOCKED_PROPERTIES.contains(&name)
}

pub fn is_blocked_mutator(name: &str) -> bool {
    BLOCKED_MUTATORS.contains(&name)
}
