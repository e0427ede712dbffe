use hashbrown::HashMap;

use crate::error::SimError;

/// 可放入物件池的實例，需記得自己屬於哪個 key
pub trait Poolable: Default {
    fn pool_key(&self) -> &str;
}

/// 物件池介面
///
/// 取出的實例可能是重用的舊資料，呼叫端必須自行重設所有欄位
pub trait InstancePool<T> {
    fn acquire(&mut self, key: &str) -> T;
    fn release(&mut self, key: &str, instance: T);
    fn idle_count(&self, key: &str) -> usize;
}

/// 以 key 分組的簡單物件池
#[derive(Debug)]
pub struct ObjectPool<T> {
    free: HashMap<String, Vec<T>>,
    created: usize,
    reused: usize,
}

impl<T> Default for ObjectPool<T> {
    fn default() -> Self {
        Self {
            free: HashMap::new(),
            created: 0,
            reused: 0,
        }
    }
}

impl<T> ObjectPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新建的實例數
    pub fn created(&self) -> usize {
        self.created
    }

    /// 重用的實例數
    pub fn reused(&self) -> usize {
        self.reused
    }
}

impl<T: Poolable> InstancePool<T> for ObjectPool<T> {
    fn acquire(&mut self, key: &str) -> T {
        while let Some(instance) = self.free.get_mut(key).and_then(Vec::pop) {
            // 剛建立的實例 key 為空，視為相符
            let found = instance.pool_key();
            if found.is_empty() || found == key {
                self.reused += 1;
                return instance;
            }
            log::warn!(
                "{}",
                SimError::PoolKeyMismatch {
                    expected: key.to_string(),
                    found: found.to_string(),
                }
            );
        }
        self.created += 1;
        T::default()
    }

    fn release(&mut self, key: &str, instance: T) {
        self.free.entry_ref(key).or_default().push(instance);
    }

    fn idle_count(&self, key: &str) -> usize {
        self.free.get(key).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Shell {
        key: String,
        dirty: bool,
    }

    impl Poolable for Shell {
        fn pool_key(&self) -> &str {
            &self.key
        }
    }

    #[test]
    fn test_release_then_acquire_reuses() {
        let mut pool = ObjectPool::<Shell>::new();
        let mut a = pool.acquire("bullet");
        assert_eq!(pool.created(), 1);
        a.key = "bullet".into();
        a.dirty = true;
        pool.release("bullet", a);
        assert_eq!(pool.idle_count("bullet"), 1);

        // 重用的實例不保證乾淨
        let b = pool.acquire("bullet");
        assert!(b.dirty);
        assert_eq!(pool.reused(), 1);
        assert_eq!(pool.idle_count("bullet"), 0);
    }

    #[test]
    fn test_keys_are_separate() {
        let mut pool = ObjectPool::<Shell>::new();
        pool.release("a", Shell { key: "a".into(), dirty: true });
        let fresh = pool.acquire("b");
        assert!(!fresh.dirty);
        assert_eq!(pool.idle_count("a"), 1);
    }

    #[test]
    fn test_mismatched_instance_is_discarded() {
        let mut pool = ObjectPool::<Shell>::new();
        pool.release("a", Shell { key: "other".into(), dirty: true });
        let got = pool.acquire("a");
        assert!(!got.dirty);
        assert_eq!(pool.created(), 1);
        assert_eq!(pool.idle_count("a"), 0);
    }
}
