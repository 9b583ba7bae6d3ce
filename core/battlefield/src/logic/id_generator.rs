//! 唯一 ID 產生邏輯

use crate::alias::ID;
use rand::random;
use std::collections::HashSet;

/// 從集合中產生唯一的隨機 ID，0 保留給尚未分配的狀態
pub fn generate_unique_id(used_ids: &mut HashSet<ID>) -> ID {
    loop {
        let new_id: ID = random();
        if new_id != 0 && used_ids.insert(new_id) {
            return new_id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_recorded() {
        let mut used = HashSet::new();
        let ids: HashSet<ID> = (0..1000).map(|_| generate_unique_id(&mut used)).collect();
        assert_eq!(ids.len(), 1000);
        assert_eq!(used, ids);
        assert!(!ids.contains(&0));
    }
}
