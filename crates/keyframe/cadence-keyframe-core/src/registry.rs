//! Stock and user-registered player models, resolved by id.
//!
//! A registry is populated once through [`ModelRegistryBuilder`] and is
//! read-only afterwards. Readers that resolve `base` references take it as an
//! explicit argument.

use indexmap::IndexMap;
use log::debug;

use crate::model::{PlayerModel, PlayerPart, Shape, CUSTOM_COLOR};
use crate::object::Entity;

pub const SQUARE_MODEL_ID: &str = "0";
pub const CIRCLE_MODEL_ID: &str = "1";
pub const TRIANGLE_MODEL_ID: &str = "2";

#[derive(Debug, Clone, Default)]
pub struct ModelRegistryBuilder {
    models: IndexMap<String, PlayerModel>,
}

impl ModelRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model under its id. A later registration with the same id
    /// replaces the earlier one.
    pub fn register(mut self, model: PlayerModel) -> Self {
        if self.models.contains_key(&model.id) {
            debug!("replacing registered model {}", model.id);
        }
        self.models.insert(model.id.clone(), model);
        self
    }

    pub fn with_builtin(self) -> Self {
        builtin_models()
            .into_iter()
            .fold(self, |builder, model| builder.register(model))
    }

    pub fn build(self) -> ModelRegistry {
        ModelRegistry {
            models: self.models,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: IndexMap<String, PlayerModel>,
}

impl ModelRegistry {
    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder::new()
    }

    /// Registry holding only the stock models.
    pub fn with_builtin() -> Self {
        ModelRegistryBuilder::new().with_builtin().build()
    }

    pub fn get(&self, id: &str) -> Option<&PlayerModel> {
        self.models.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.models.contains_key(id)
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Deep copy of a registered model.
    pub fn instantiate(&self, id: &str, preserve_id: bool) -> Option<PlayerModel> {
        self.get(id).map(|m| m.copy(preserve_id))
    }
}

/// The models every installation ships with.
pub fn builtin_models() -> Vec<PlayerModel> {
    let square = PlayerModel {
        id: SQUARE_MODEL_ID.into(),
        name: "Square".into(),
        creator: "Default".into(),
        ..PlayerModel::default()
    };

    let mut circle = PlayerModel {
        id: CIRCLE_MODEL_ID.into(),
        name: "Circle".into(),
        creator: "Default".into(),
        ..PlayerModel::default()
    };
    circle.head.shape = Shape::new(1, 0);
    for (i, part) in circle.tail.iter_mut().enumerate() {
        part.shape = Shape::new(1, 0);
        let size = 1.0 - 0.2 * (i as f32 + 1.0);
        part.scale = [size, size];
    }

    let mut triangle = PlayerModel {
        id: TRIANGLE_MODEL_ID.into(),
        name: "Triangle".into(),
        creator: "Default".into(),
        ..PlayerModel::default()
    };
    triangle.head.shape = Shape::new(2, 0);
    triangle.head.rotation = 90.0;
    triangle.boost = PlayerPart {
        shape: Shape::new(2, 0),
        color: CUSTOM_COLOR,
        hex: "FF8800".into(),
        ..PlayerPart::default()
    };
    triangle.tail.truncate(2);

    vec![square, circle, triangle]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_are_stable() {
        let registry = ModelRegistry::with_builtin();
        let ids: Vec<_> = registry.ids().collect();
        assert_eq!(ids, vec![SQUARE_MODEL_ID, CIRCLE_MODEL_ID, TRIANGLE_MODEL_ID]);
    }

    #[test]
    fn instantiate_copies() {
        let registry = ModelRegistry::with_builtin();
        let kept = registry.instantiate(CIRCLE_MODEL_ID, true).unwrap();
        assert_eq!(&kept, registry.get(CIRCLE_MODEL_ID).unwrap());

        let fresh = registry.instantiate(CIRCLE_MODEL_ID, false).unwrap();
        assert_ne!(fresh.id, CIRCLE_MODEL_ID);
        assert_eq!(fresh.head, kept.head);

        assert!(registry.instantiate("nope", false).is_none());
    }

    #[test]
    fn later_registration_wins() {
        let mut replacement = PlayerModel::default();
        replacement.id = SQUARE_MODEL_ID.into();
        replacement.name = "Mine".into();
        let registry = ModelRegistry::builder()
            .with_builtin()
            .register(replacement)
            .build();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(SQUARE_MODEL_ID).unwrap().name, "Mine");
    }
}
