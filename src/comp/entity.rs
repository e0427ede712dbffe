use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::BTreeMap;

use crate::error::SimError;

/// 實體 id，單調遞增且不回收
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Entity(u32);

impl Entity {
    pub fn id(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 可以掛在實體上的資料
pub trait Component: Any {}

type ComponentTable = HashMap<TypeId, Box<dyn Any>>;

/// 實體管理器
///
/// 每個實體每種組件最多一份，以 TypeId 索引。
/// 實體以 id 排序存放，id 單調遞增，所以迭代順序就是建立順序。
#[derive(Default)]
pub struct EntityManager {
    next_id: u32,
    entities: BTreeMap<Entity, ComponentTable>,
}

impl std::fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager")
            .field("next_id", &self.next_id)
            .field("entities", &self.entities.len())
            .finish()
    }
}

impl EntityManager {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// 指定第一個分配的 id，0 保留給「無實體」
    pub fn starting_at(first_id: u32) -> Self {
        Self {
            next_id: first_id.max(1),
            entities: BTreeMap::new(),
        }
    }

    /// 建立實體
    pub fn create_entity(&mut self) -> Result<Entity, SimError> {
        if self.next_id == u32::MAX {
            log::error!("實體 id 已用盡，無法再建立實體");
            return Err(SimError::IdentitySpaceExhausted);
        }
        let entity = Entity(self.next_id);
        self.next_id += 1;
        self.entities.insert(entity, ComponentTable::new());
        Ok(entity)
    }

    /// 移除實體與它所有的組件，回傳是否原本存在
    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        self.entities.remove(&entity).is_some()
    }

    /// 以數字 id 取得實體
    pub fn get_entity(&self, id: u32) -> Option<Entity> {
        let entity = Entity(id);
        self.entities.contains_key(&entity).then_some(entity)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// 依建立順序列出實體
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.keys().copied()
    }

    /// 掛上組件，已存在時回傳原本那份
    pub fn add_component<T: Component + Default>(&mut self, entity: Entity) -> Option<&mut T> {
        self.add_component_with(entity, T::default)
    }

    /// 掛上組件，只有在尚未存在時才呼叫 `init`
    pub fn add_component_with<T: Component>(
        &mut self,
        entity: Entity,
        init: impl FnOnce() -> T,
    ) -> Option<&mut T> {
        let table = self.entities.get_mut(&entity)?;
        table
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(init()))
            .downcast_mut::<T>()
    }

    /// 直接設定組件，覆蓋舊值
    pub fn insert_component<T: Component>(&mut self, entity: Entity, component: T) -> Option<&mut T> {
        let table = self.entities.get_mut(&entity)?;
        table.insert(TypeId::of::<T>(), Box::new(component));
        table.get_mut(&TypeId::of::<T>())?.downcast_mut::<T>()
    }

    /// 移除組件並回傳
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        let boxed = self.entities.get_mut(&entity)?.remove(&TypeId::of::<T>())?;
        boxed.downcast::<T>().ok().map(|b| *b)
    }

    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.entities
            .get(&entity)?
            .get(&TypeId::of::<T>())?
            .downcast_ref::<T>()
    }

    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.entities
            .get_mut(&entity)?
            .get_mut(&TypeId::of::<T>())?
            .downcast_mut::<T>()
    }

    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.entities
            .get(&entity)
            .map_or(false, |table| table.contains_key(&TypeId::of::<T>()))
    }

    /// 依建立順序列出擁有組件 T 的實體
    pub fn query<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.entities.iter().filter_map(|(entity, table)| {
            table
                .get(&TypeId::of::<T>())
                .and_then(|c| c.downcast_ref::<T>())
                .map(|c| (*entity, c))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Marker(u32);
    impl Component for Marker {}

    #[derive(Debug, Default, PartialEq)]
    struct Other;
    impl Component for Other {}

    #[test]
    fn test_ids_are_monotonic_and_not_reused() {
        let mut em = EntityManager::new();
        let a = em.create_entity().unwrap();
        let b = em.create_entity().unwrap();
        assert!(em.remove_entity(a));
        let c = em.create_entity().unwrap();
        assert!(a < b && b < c);
        assert_ne!(c, a);
        assert_eq!(em.get_entity(a.id()), None);
        assert_eq!(em.get_entity(c.id()), Some(c));
    }

    #[test]
    fn test_remove_entity_is_idempotent() {
        let mut em = EntityManager::new();
        let e = em.create_entity().unwrap();
        assert!(em.remove_entity(e));
        assert!(!em.remove_entity(e));
    }

    #[test]
    fn test_add_component_returns_existing() {
        let mut em = EntityManager::new();
        let e = em.create_entity().unwrap();
        em.add_component::<Marker>(e).unwrap().0 = 42;
        // 第二次掛上同型別不會新增一份
        assert_eq!(em.add_component::<Marker>(e).unwrap().0, 42);
        assert_eq!(em.add_component_with(e, || Marker(7)).unwrap().0, 42);
        assert_eq!(em.get_component::<Marker>(e), Some(&Marker(42)));
    }

    #[test]
    fn test_components_are_independent_per_type() {
        let mut em = EntityManager::new();
        let e = em.create_entity().unwrap();
        em.add_component::<Marker>(e);
        em.add_component::<Other>(e);
        assert_eq!(em.remove_component::<Marker>(e), Some(Marker(0)));
        assert!(em.get_component::<Marker>(e).is_none());
        assert!(em.has_component::<Other>(e));
    }

    #[test]
    fn test_removed_entity_has_no_components() {
        let mut em = EntityManager::new();
        let e = em.create_entity().unwrap();
        em.insert_component(e, Marker(3));
        em.remove_entity(e);
        assert!(em.get_component::<Marker>(e).is_none());
        assert!(em.add_component::<Marker>(e).is_none());
        assert_eq!(em.query::<Marker>().count(), 0);
    }

    #[test]
    fn test_identity_space_exhausted() {
        let mut em = EntityManager::starting_at(u32::MAX - 1);
        assert!(em.create_entity().is_ok());
        assert!(matches!(em.create_entity(), Err(SimError::IdentitySpaceExhausted)));
        // 失敗後不會破壞既有資料
        assert_eq!(em.len(), 1);
    }

    #[test]
    fn test_query_in_creation_order() {
        let mut em = EntityManager::new();
        let ids: Vec<_> = (0..4).map(|i| {
            let e = em.create_entity().unwrap();
            em.insert_component(e, Marker(i));
            e
        }).collect();
        let seen: Vec<_> = em.query::<Marker>().map(|(e, _)| e).collect();
        assert_eq!(seen, ids);
    }
}
