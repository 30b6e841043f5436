//! 工作单元处理上下文
//!
//! 封装"我是第几个分片、正在处理分片里的第几个单元"

use std::fmt::Display;

/// 工作单元处理上下文（只用于日志）
#[derive(Debug, Clone, Copy)]
pub struct ItemCtx {
    /// 分片编号（从1开始）
    pub shard_index: usize,
    /// 单元在分片中的位置（从1开始）
    pub item_index: usize,
    /// 分片大小
    pub shard_len: usize,
}

impl ItemCtx {
    pub fn new(shard_index: usize, item_index: usize, shard_len: usize) -> Self {
        Self {
            shard_index,
            item_index,
            shard_len,
        }
    }
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[分片 {} 单元 {}/{}]",
            self.shard_index, self.item_index, self.shard_len
        )
    }
}
