use draftcad_core::geometry::Point3;
use serde::{Deserialize, Serialize};

use crate::handle::Handle;

/// 实体自身句柄所在的组码。
pub const HANDLE_CODE: i16 = 5;
/// 结构起始（类型名）标签的组码。
pub const STRUCTURE_CODE: i16 = 0;

/// 类型名到句柄组码的对照表，未列出的类型一律用组码 5。
/// DIMSTYLE 是历史遗留的唯一特例。
const HANDLE_CODE_OVERRIDES: &[(&str, i16)] = &[("DIMSTYLE", 105)];

/// 查询给定实体类型应使用的句柄组码。
pub fn handle_code_for(dxftype: &str) -> i16 {
    HANDLE_CODE_OVERRIDES
        .iter()
        .find(|(name, _)| *name == dxftype)
        .map(|(_, code)| *code)
        .unwrap_or(HANDLE_CODE)
}

/// 标签值。二进制块单独成一类，便于压缩扫描按类型识别。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TagValue {
    Text(String),
    Integer(i64),
    Double(f64),
    Point(Point3),
    Binary(Vec<u8>),
}

impl TagValue {
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Text(text) => Some(text),
            _ => None,
        }
    }

    #[inline]
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            TagValue::Binary(data) => Some(data),
            _ => None,
        }
    }
}

/// 单个 (组码, 值) 标签。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DxfTag {
    pub code: i16,
    pub value: TagValue,
}

impl DxfTag {
    pub fn new(code: i16, value: TagValue) -> Self {
        Self { code, value }
    }

    pub fn text(code: i16, value: impl Into<String>) -> Self {
        Self::new(code, TagValue::Text(value.into()))
    }

    pub fn binary(code: i16, data: impl Into<Vec<u8>>) -> Self {
        Self::new(code, TagValue::Binary(data.into()))
    }
}

/// 实体记录：有序标签列表。按惯例 0 号位是类型标签，
/// 句柄标签（组码 5 或 105）紧随其后位于 1 号位。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tags(Vec<DxfTag>);

impl Tags {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// 以类型标签起头构造记录，常见的新建实体入口。
    pub fn with_dxftype(dxftype: impl Into<String>) -> Self {
        Self(vec![DxfTag::text(STRUCTURE_CODE, dxftype)])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&DxfTag> {
        self.0.get(index)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &DxfTag> {
        self.0.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[DxfTag] {
        &self.0
    }

    pub fn push(&mut self, tag: DxfTag) {
        self.0.push(tag);
    }

    pub fn insert(&mut self, index: usize, tag: DxfTag) {
        self.0.insert(index, tag);
    }

    pub fn remove(&mut self, index: usize) -> DxfTag {
        self.0.remove(index)
    }

    /// 记录声明的实体类型名：首标签（组码 0）的文本值。
    pub fn dxftype(&self) -> Option<&str> {
        match self.0.first() {
            Some(tag) if tag.code == STRUCTURE_CODE => tag.value.as_text(),
            _ => None,
        }
    }

    /// 探测内嵌句柄：首个组码为 5 或 105 的文本标签。
    pub fn handle(&self) -> Option<Handle> {
        self.0.iter().find_map(|tag| {
            if tag.code == HANDLE_CODE || tag.code == 105 {
                tag.value.as_text().map(Handle::from)
            } else {
                None
            }
        })
    }
}

impl From<Vec<DxfTag>> for Tags {
    fn from(tags: Vec<DxfTag>) -> Self {
        Self(tags)
    }
}

impl FromIterator<DxfTag> for Tags {
    fn from_iter<I: IntoIterator<Item = DxfTag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a DxfTag;
    type IntoIter = std::slice::Iter<'a, DxfTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// 压缩二进制负载：把相邻且组码相同的二进制标签合并为单个标签。
/// 不含二进制标签的记录保持原样。
pub fn compress_binary_data(tags: &mut Tags) {
    if !tags
        .0
        .windows(2)
        .any(|pair| is_binary_pair(&pair[0], &pair[1]))
    {
        return;
    }
    let source = std::mem::take(&mut tags.0);
    let mut compressed: Vec<DxfTag> = Vec::with_capacity(source.len());
    for tag in source {
        if let Some(last) = compressed.last_mut() {
            if is_binary_pair(last, &tag) {
                if let (TagValue::Binary(accumulated), TagValue::Binary(chunk)) =
                    (&mut last.value, &tag.value)
                {
                    accumulated.extend_from_slice(chunk);
                    continue;
                }
            }
        }
        compressed.push(tag);
    }
    tags.0 = compressed;
}

fn is_binary_pair(left: &DxfTag, right: &DxfTag) -> bool {
    left.code == right.code
        && matches!(left.value, TagValue::Binary(_))
        && matches!(right.value, TagValue::Binary(_))
}
