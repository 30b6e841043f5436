//! 分片 - 编排层
//!
//! 把有序的工作单元列表切成连续的块，每块交给一个会话工作者

/// 把 `items` 切成最多 `shard_count` 个连续分片
///
/// - 分片大小为 `ceil(len / shard_count)`，最后一片可能更短
/// - `shard_count` 为 0 时按 1 处理
/// - 空列表得到零个分片
/// - 各分片按顺序拼接后与输入完全一致
pub fn partition<T>(items: Vec<T>, shard_count: usize) -> Vec<Vec<T>> {
    if items.is_empty() {
        return Vec::new();
    }

    let shard_count = shard_count.max(1);
    let shard_size = items.len().div_ceil(shard_count);

    let mut shards = Vec::with_capacity(shard_count);
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        shards.push(iter.by_ref().take(shard_size).collect());
    }
    shards
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenation_reconstructs_input() {
        let items: Vec<usize> = (0..47).collect();
        let shards = partition(items.clone(), 20);

        assert!(shards.len() <= 20);
        assert!(shards.iter().all(|s| !s.is_empty()));
        let flat: Vec<usize> = shards.into_iter().flatten().collect();
        assert_eq!(flat, items);
    }

    #[test]
    fn test_shard_sizes() {
        let shards = partition((0..10).collect::<Vec<_>>(), 3);
        let sizes: Vec<usize> = shards.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 4, 2]);

        // ceil(5/4) = 2 → 只产生 3 片
        let shards = partition((0..5).collect::<Vec<_>>(), 4);
        assert_eq!(shards.len(), 3);
    }

    #[test]
    fn test_more_shards_than_items() {
        let shards = partition(vec!["a", "b"], 25);
        assert_eq!(shards, vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_edge_cases() {
        assert!(partition(Vec::<u8>::new(), 5).is_empty());
        assert_eq!(partition(vec![1, 2, 3], 0), vec![vec![1, 2, 3]]);
        assert_eq!(partition(vec![1, 2, 3], 1), vec![vec![1, 2, 3]]);
    }
}
