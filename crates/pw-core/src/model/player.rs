use std::any::Any;

use crate::context::Context;
use crate::id::GameObjectId;
use crate::model::{GameObject, Membership};
use crate::property::Property;

/// A named skill with an experience counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Experience {
    name: String,
    xp: i64,
}

impl Experience {
    /// A skill with no experience.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            xp: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn xp(&self) -> i64 {
        self.xp
    }

    /// Add `amount` experience. Negative amounts subtract.
    pub fn increment(&mut self, amount: i64) {
        self.xp += amount;
    }
}

/// A player: a game object with its own context, skills, and properties.
///
/// Properties attached to a player are subscribed to the player's context,
/// named `"<name> Context"`.
#[derive(Debug)]
pub struct Player {
    id: GameObjectId,
    name: String,
    membership: Membership,
    context: Context,
    skills: Vec<Experience>,
    properties: Vec<Property>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let context = Context::new(format!("{name} Context"));
        Self {
            id: GameObjectId::new(),
            name,
            membership: Membership::default(),
            context,
            skills: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The player's own context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// A copy of the player's skills.
    pub fn skills(&self) -> Vec<Experience> {
        self.skills.clone()
    }

    /// Mutable access to a skill by name.
    pub fn skill_mut(&mut self, name: &str) -> Option<&mut Experience> {
        self.skills.iter_mut().find(|s| s.name() == name)
    }

    pub fn attach_skill(&mut self, skill: Experience) {
        self.skills.push(skill);
    }

    /// A copy of the player's properties.
    pub fn properties(&self) -> Vec<Property> {
        self.properties.clone()
    }

    /// Keep `property` and move it into the player's context.
    pub fn attach_property(&mut self, property: Property) {
        property.change_context(&self.context);
        self.properties.push(property);
    }
}

impl GameObject for Player {
    fn id(&self) -> GameObjectId {
        self.id
    }

    fn membership(&self) -> &Membership {
        &self.membership
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
