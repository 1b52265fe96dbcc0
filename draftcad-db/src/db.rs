use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::DbError;
use crate::handle::{Handle, HandleGenerator};
use crate::tags::{self, DxfTag, Tags};

/// 可从数据库整体删除的实体视图。包装类在移除前必须执行自身的
/// 资源释放（`destroy`），失败时错误原样上抛。
pub trait DatabaseEntity {
    /// 实体当前句柄；尚未注册的实体返回 `None`。
    fn handle(&self) -> Option<Handle>;

    /// 释放实体占有的附属资源并使其失效。只会被调用一次。
    fn destroy(&mut self) -> Result<(), DbError>;
}

/// 图纸文档的实体数据库：句柄到标签记录的纯键值映射，
/// 迭代顺序无意义。句柄生成器归本实例独占，跨文档不共享。
///
/// 并发约定：单线程可变结构，无内部锁；需要并发访问时由调用方
/// 在文档粒度上自行串行化。
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EntityDb {
    records: HashMap<Handle, Tags>,
    handles: HandleGenerator,
}

impl EntityDb {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            handles: HandleGenerator::new(),
        }
    }

    /// 文档载入时以持久化种子恢复生成器。
    pub fn with_generator(handles: HandleGenerator) -> Self {
        Self {
            records: HashMap::new(),
            handles,
        }
    }

    /// 按句柄查找记录，缺失即 `NotFound`。
    pub fn get(&self, handle: &Handle) -> Result<&Tags, DbError> {
        self.records
            .get(handle)
            .ok_or_else(|| DbError::not_found(handle.clone()))
    }

    pub fn get_mut(&mut self, handle: &Handle) -> Result<&mut Tags, DbError> {
        self.records
            .get_mut(handle)
            .ok_or_else(|| DbError::not_found(handle.clone()))
    }

    /// 缺失不视为错误的查找变体，返回调用方提供的缺省记录。
    pub fn get_or<'a>(&'a self, handle: &Handle, default: &'a Tags) -> &'a Tags {
        self.records.get(handle).unwrap_or(default)
    }

    /// 无条件写入。已知句柄的重复注册是合法操作，直接覆盖旧记录。
    pub fn insert(&mut self, handle: Handle, record: Tags) {
        self.records.insert(handle, record);
    }

    #[inline]
    pub fn contains(&self, handle: &Handle) -> bool {
        self.records.contains_key(handle)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn handles(&self) -> impl Iterator<Item = &Handle> {
        self.records.keys()
    }

    #[inline]
    pub fn records(&self) -> impl Iterator<Item = &Tags> {
        self.records.values()
    }

    #[inline]
    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut Tags> {
        self.records.values_mut()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&Handle, &Tags)> {
        self.records.iter()
    }

    /// 记录注册主入口。
    ///
    /// 内嵌句柄存在时原样采用（不查重，覆盖合法）；否则分配新句柄，
    /// 按类型名选句柄组码并把句柄标签插到 1 号位 —— 0 号位按惯例是
    /// 类型标签，缺失类型标签的无句柄记录属于调用方违约。
    pub fn add_record(&mut self, mut record: Tags) -> Result<Handle, DbError> {
        let handle = match record.handle() {
            Some(handle) => handle,
            None => {
                let dxftype = record
                    .dxftype()
                    .map(str::to_owned)
                    .ok_or_else(|| {
                        DbError::malformed(
                            "record without embedded handle must start with a type tag",
                        )
                    })?;
                let handle = self.next_unique_handle();
                let code = tags::handle_code_for(&dxftype);
                record.insert(1, DxfTag::text(code, handle.as_str()));
                debug!(handle = %handle, dxftype = %dxftype, "已为记录分配新句柄");
                handle
            }
        };
        self.records.insert(handle.clone(), record);
        Ok(handle)
    }

    /// 删除实体：先执行实体自身的 `destroy`（恰好一次，错误原样上抛），
    /// 再按句柄从映射中移除。
    pub fn delete_entity<E: DatabaseEntity>(&mut self, entity: &mut E) -> Result<(), DbError> {
        entity.destroy()?;
        let handle = entity
            .handle()
            .ok_or_else(|| DbError::malformed("entity exposes no handle"))?;
        self.delete_handle(&handle)?;
        Ok(())
    }

    /// 仅移除映射，不触发任何清理钩子；资源释放是调用方的前置责任。
    pub fn delete_handle(&mut self, handle: &Handle) -> Result<Tags, DbError> {
        self.records
            .remove(handle)
            .ok_or_else(|| DbError::not_found(handle.clone()))
    }

    /// 对库内全部记录执行二进制负载压缩。逐记录独立，处理顺序无关。
    pub fn compress_binary_data(&mut self) {
        for record in self.records.values_mut() {
            tags::compress_binary_data(record);
        }
    }

    /// 取下一个未占用句柄。生成器种子可能滞后（持久化值偏小或被改动），
    /// 其产出只作提示，键集合才是唯一性的裁决依据。
    pub fn next_unique_handle(&mut self) -> Handle {
        loop {
            let handle = self.handles.next_handle();
            if !self.records.contains_key(&handle) {
                return handle;
            }
            debug!(handle = %handle, "生成器种子滞后，句柄已被占用，跳过");
        }
    }

    /// 当前生成器种子，文档保存时写回。
    #[inline]
    pub fn handle_seed(&self) -> u64 {
        self.handles.seed()
    }

    pub fn reset_handle_seed(&mut self, seed: u64) {
        self.handles.reset(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagValue;

    fn line_record() -> Tags {
        Tags::with_dxftype("LINE")
    }

    #[test]
    fn get_or_returns_default_for_missing_handle() {
        let db = EntityDb::new();
        let default = line_record();
        let fetched = db.get_or(&Handle::from("99"), &default);
        assert_eq!(fetched, &default);
    }

    #[test]
    fn insert_overwrites_existing_record_silently() {
        // 刻意固化现状：重复注册不报错、直接覆盖（潜在设计风险，调用方自担）
        let mut db = EntityDb::new();
        let handle = Handle::from("A");
        db.insert(handle.clone(), line_record());
        db.insert(handle.clone(), Tags::with_dxftype("CIRCLE"));
        assert_eq!(db.len(), 1);
        assert_eq!(db.get(&handle).expect("present").dxftype(), Some("CIRCLE"));
    }

    #[test]
    fn add_record_without_type_tag_is_malformed() {
        let mut db = EntityDb::new();
        let record = Tags::from(vec![DxfTag::new(10, TagValue::Double(1.0))]);
        let err = db.add_record(record).unwrap_err();
        assert!(matches!(err, DbError::MalformedRecord { .. }));
        assert!(db.is_empty());
    }

    #[test]
    fn dimstyle_gets_legacy_handle_code() {
        let mut db = EntityDb::new();
        let handle = db
            .add_record(Tags::with_dxftype("DIMSTYLE"))
            .expect("add dimstyle");
        let record = db.get(&handle).expect("present");
        let tag = record.get(1).expect("handle tag at position 1");
        assert_eq!(tag.code, 105);
        assert_eq!(tag.value.as_text(), Some(handle.as_str()));
    }

    #[test]
    fn unique_handle_skips_keys_after_seed_rewind() {
        let mut db = EntityDb::new();
        db.insert(Handle::from("1"), line_record());
        db.insert(Handle::from("2"), line_record());
        // 人为回拨种子，模拟持久化值偏小的情况
        db.reset_handle_seed(1);
        assert_eq!(db.next_unique_handle().as_str(), "3");
    }
}
