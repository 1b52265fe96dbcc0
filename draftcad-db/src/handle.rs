use std::fmt;

use serde::{Deserialize, Serialize};

/// 实体句柄：单个数据库内唯一的标识符，持久化格式下呈现为十六进制字符串。
/// 句柄本身不透明，数据库只比较、不解释其内容。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle(String);

impl Handle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Handle {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Handle {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// 单调递增的句柄生成器。计数器可由持久化的种子值恢复，
/// 种子可能滞后于实际已用句柄，因此产出值不保证未被占用，
/// 唯一性由 `EntityDb` 对照自身键集合复核。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandleGenerator {
    next_value: u64,
}

impl HandleGenerator {
    pub fn new() -> Self {
        Self { next_value: 1 }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            next_value: seed.max(1),
        }
    }

    /// 生成下一个句柄（大写十六进制），并推进计数器。
    pub fn next_handle(&mut self) -> Handle {
        let handle = Handle::new(format!("{:X}", self.next_value));
        self.next_value += 1;
        handle
    }

    /// 当前种子值，供文档保存时写回持久化头变量。
    #[inline]
    pub fn seed(&self) -> u64 {
        self.next_value
    }

    /// 重置计数器，文档载入时用持久化种子恢复。
    pub fn reset(&mut self, seed: u64) {
        self.next_value = seed.max(1);
    }
}

impl Default for HandleGenerator {
    fn default() -> Self {
        Self::new()
    }
}
