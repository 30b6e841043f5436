//! 结果汇总 - 业务能力层
//!
//! 所有工作者共享的只追加集合，汇合之后才被读取

use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::CaptureRecord;

/// 只追加的结果集合
///
/// clone 得到的是同一个集合的句柄；元素顺序没有意义
#[derive(Clone, Default)]
pub struct Aggregator {
    records: Arc<Mutex<Vec<CaptureRecord>>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CaptureRecord>> {
        // 追加是纯插入，锁被毒化时数据仍然有效
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, record: CaptureRecord) {
        self.lock().push(record);
    }

    pub fn extend(&self, records: impl IntoIterator<Item = CaptureRecord>) {
        self.lock().extend(records);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// 取出全部结果，集合被清空
    pub fn drain(&self) -> Vec<CaptureRecord> {
        std::mem::take(&mut *self.lock())
    }
}
