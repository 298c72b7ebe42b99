//! Level director
//!
//! The facade world systems and level hooks use to act on the world: spawn,
//! move, and despawn entities, always clamped to the owning level's
//! boundary. Borrowed per tick so structural level changes can never happen
//! mid-pass.

use crate::ecs::component::ComponentHandle;
use crate::ecs::components::TransformComponent;
use crate::ecs::entity::EntityId;
use crate::ecs::entity_manager::{EntityError, EntityManager};
use crate::foundation::math::{Aabb, Vec3};
use crate::level::level::LevelError;

/// Spawn/move/despawn mediator scoped to one level's boundary
pub struct LevelDirector<'a> {
    entities: &'a mut EntityManager,
    boundary: Aabb,
}

impl<'a> LevelDirector<'a> {
    pub(crate) fn new(entities: &'a mut EntityManager, boundary: Aabb) -> Self {
        Self { entities, boundary }
    }

    /// Boundary of the owning level
    #[must_use]
    pub fn boundary(&self) -> &Aabb {
        &self.boundary
    }

    /// The entity manager backing this level
    #[must_use]
    pub fn entities(&self) -> &EntityManager {
        self.entities
    }

    /// The entity manager backing this level, mutable
    pub fn entities_mut(&mut self) -> &mut EntityManager {
        self.entities
    }

    /// Create an entity from a configuration and place it at the given
    /// position, clamped to the level boundary.
    ///
    /// The spawned entity is guaranteed a transform component: if the
    /// configuration's prototypes did not provide one, a default transform
    /// is attached before placement.
    pub fn spawn(&mut self, config: &str, x: f32, y: f32, z: f32) -> Result<EntityId, LevelError> {
        Self::check_finite(x, y, z)?;
        let id = self.entities.create_entity_from_config(config)?;
        if let Some(entity) = self.entities.entity_mut(id) {
            if !entity.has_component::<TransformComponent>() {
                entity
                    .attach(ComponentHandle::new(TransformComponent::default()))
                    .map_err(EntityError::from)?;
            }
        }
        self.move_entity(id, x, y, z)?;
        Ok(id)
    }

    /// Move an entity, clamping the target position to the level boundary
    /// (inclusive). Rejects non-finite coordinates and identifiers that no
    /// longer resolve.
    pub fn move_entity(&mut self, id: EntityId, x: f32, y: f32, z: f32) -> Result<(), LevelError> {
        Self::check_finite(x, y, z)?;
        let entity = self
            .entities
            .entity(id)
            .ok_or(LevelError::UnknownEntity(id))?;
        let transform = entity
            .component::<TransformComponent>()
            .ok_or(LevelError::MissingTransform(id))?;

        let clamped = self.boundary.clamp_point(Vec3::new(x, y, z));
        transform.with_mut::<TransformComponent, _>(|t| t.position = clamped);
        Ok(())
    }

    /// Mark an entity destroyed. Physical removal is deferred to the next
    /// reap pass, so systems iterating this tick are unaffected.
    pub fn despawn(&mut self, id: EntityId) {
        self.entities.destroy_entity(id);
    }

    fn check_finite(x: f32, y: f32, z: f32) -> Result<(), LevelError> {
        if x.is_finite() && y.is_finite() && z.is_finite() {
            Ok(())
        } else {
            Err(LevelError::NonFiniteCoordinate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::HealthComponent;

    fn manager_with_marker_config() -> EntityManager {
        let mut entities = EntityManager::new();
        let components = entities.components_mut();
        components.register_factory(TransformComponent::default);
        components.register_factory(HealthComponent::default);
        components
            .register_prototype(
                "marker_transform",
                ComponentHandle::new(TransformComponent::default()),
            )
            .unwrap();
        components
            .register_prototype("pool", ComponentHandle::new(HealthComponent::new(10.0)))
            .unwrap();
        entities
            .register_configuration("marker", vec!["marker_transform".to_string()])
            .unwrap();
        entities
            .register_configuration("pool_only", vec!["pool".to_string()])
            .unwrap();
        entities
    }

    fn arena_boundary() -> Aabb {
        // 100 x 100 x 10 arena centered on the origin.
        Aabb::from_center_extents(Vec3::zeros(), Vec3::new(50.0, 50.0, 5.0))
    }

    #[test]
    fn spawn_clamps_to_the_level_boundary() {
        let mut entities = manager_with_marker_config();
        let id = {
            let mut director = LevelDirector::new(&mut entities, arena_boundary());
            director.spawn("marker", 1000.0, 0.0, 0.0).unwrap()
        };
        let position = entities
            .entity(id)
            .unwrap()
            .component::<TransformComponent>()
            .unwrap()
            .with::<TransformComponent, _>(|t| t.position)
            .unwrap();
        assert_eq!(position, Vec3::new(50.0, 0.0, 0.0));
    }

    #[test]
    fn spawn_supplies_a_transform_when_the_config_has_none() {
        let mut entities = manager_with_marker_config();
        let id = {
            let mut director = LevelDirector::new(&mut entities, arena_boundary());
            director.spawn("pool_only", 3.0, 4.0, 0.0).unwrap()
        };
        let entity = entities.entity(id).unwrap();
        assert!(entity.has_component::<TransformComponent>());
        assert!(entity.has_component::<HealthComponent>());
    }

    #[test]
    fn move_rejects_non_finite_coordinates() {
        let mut entities = manager_with_marker_config();
        let mut director = LevelDirector::new(&mut entities, arena_boundary());
        let id = director.spawn("marker", 0.0, 0.0, 0.0).unwrap();

        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let result = director.move_entity(id, bad, 0.0, 0.0);
            assert!(matches!(result, Err(LevelError::NonFiniteCoordinate)));
        }
    }

    #[test]
    fn move_rejects_stale_identifiers() {
        let mut entities = manager_with_marker_config();
        let mut director = LevelDirector::new(&mut entities, arena_boundary());
        let id = director.spawn("marker", 0.0, 0.0, 0.0).unwrap();

        director.despawn(id);
        director.entities_mut().reap_destroyed();
        let result = director.move_entity(id, 1.0, 1.0, 1.0);
        assert!(matches!(result, Err(LevelError::UnknownEntity(_))));
    }

    #[test]
    fn despawn_is_deferred_until_reap() {
        let mut entities = manager_with_marker_config();
        let mut director = LevelDirector::new(&mut entities, arena_boundary());
        let id = director.spawn("marker", 0.0, 0.0, 0.0).unwrap();

        director.despawn(id);
        assert!(director.entities().entity(id).is_some());
        assert_eq!(director.entities().alive_count(), 1);

        director.entities_mut().reap_destroyed();
        assert!(director.entities().entity(id).is_none());
    }
}
