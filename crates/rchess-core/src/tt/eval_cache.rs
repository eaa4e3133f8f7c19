//! 評価キャッシュ

use super::MIN_TABLE_BYTES;
use crate::types::Value;

#[derive(Debug, Clone, Copy)]
struct EvalEntry {
    key: u64,
    value: Value,
    occupied: bool,
}

impl EvalEntry {
    const EMPTY: EvalEntry = EvalEntry { key: 0, value: Value::NONE, occupied: false };
}

/// 静的評価のダイレクトマップキャッシュ
///
/// 深さの概念はなく、`put`は常にスロットを上書きする。
pub struct EvaluationCache {
    entries: Vec<EvalEntry>,
    capacity: usize,
    used: u64,
    collisions: u64,
}

impl EvaluationCache {
    /// バイト予算からキャッシュを作る
    pub fn new(byte_size: usize) -> EvaluationCache {
        let byte_size = byte_size.max(MIN_TABLE_BYTES);
        let capacity = byte_size / std::mem::size_of::<EvalEntry>();
        EvaluationCache {
            entries: vec![EvalEntry::EMPTY; capacity],
            capacity,
            used: 0,
            collisions: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn used(&self) -> u64 {
        self.used
    }

    #[inline]
    pub fn collisions(&self) -> u64 {
        self.collisions
    }

    /// 評価値を書き込む（常に上書き）
    pub fn put(&mut self, key: u64, value: Value) {
        let index = (key % self.capacity as u64) as usize;
        let slot = &mut self.entries[index];
        if !slot.occupied {
            self.used += 1;
        } else if slot.key != key {
            self.collisions += 1;
        }
        *slot = EvalEntry { key, value, occupied: true };
    }

    /// キーが完全一致したときだけ値を返す
    pub fn get(&self, key: u64) -> Option<Value> {
        let index = (key % self.capacity as u64) as usize;
        let slot = &self.entries[index];
        if slot.occupied && slot.key == key {
            Some(slot.value)
        } else {
            None
        }
    }

    /// 全スロットを空にする（再割り当てはしない）
    pub fn clear(&mut self) {
        self.entries.fill(EvalEntry::EMPTY);
        self.used = 0;
        self.collisions = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_cache_put_get() {
        let mut cache = EvaluationCache::new(64 * 1024);
        assert!(cache.get(7).is_none());
        cache.put(7, Value::new(-25));
        assert_eq!(cache.get(7), Some(Value::new(-25)));
    }

    #[test]
    fn test_eval_cache_always_overwrites() {
        let mut cache = EvaluationCache::new(64 * 1024);
        cache.put(7, Value::new(-25));
        cache.put(7, Value::new(40));
        assert_eq!(cache.get(7), Some(Value::new(40)));

        // 別キーでも常に上書き
        let capacity = cache.capacity() as u64;
        cache.put(7 + capacity, Value::new(99));
        assert!(cache.get(7).is_none());
        assert_eq!(cache.get(7 + capacity), Some(Value::new(99)));
        assert_eq!(cache.collisions(), 1);
    }

    #[test]
    fn test_eval_cache_clear() {
        let mut cache = EvaluationCache::new(64 * 1024);
        cache.put(7, Value::new(1));
        cache.clear();
        assert!(cache.get(7).is_none());
        assert_eq!(cache.used(), 0);
    }
}
