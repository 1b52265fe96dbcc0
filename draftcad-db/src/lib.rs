pub mod db;
pub mod handle;
pub mod tags;

pub use db::{DatabaseEntity, EntityDb};
pub use handle::{Handle, HandleGenerator};
pub use tags::{compress_binary_data, DxfTag, TagValue, Tags};

pub mod errors {
    use thiserror::Error;

    use crate::handle::Handle;

    /// 数据库错误：句柄缺失与记录结构缺陷是仅有的两类失败，
    /// 二者都原样抛给文档层处理，数据库自身不做恢复。
    #[derive(Debug, Error)]
    pub enum DbError {
        #[error("handle {handle} not found in entity database")]
        NotFound { handle: Handle },
        #[error("malformed entity record: {reason}")]
        MalformedRecord { reason: String },
    }

    impl DbError {
        pub fn not_found(handle: Handle) -> Self {
            Self::NotFound { handle }
        }

        pub fn malformed(reason: impl Into<String>) -> Self {
            Self::MalformedRecord {
                reason: reason.into(),
            }
        }
    }
}
