use std::sync::Arc;

use crate::error::FormatError;
use crate::formatter::{FormatFactory, Formatter, TypedFormatFactory};
use crate::metadata::{ContentType, FormatDescriptor, TrustRequirement};
use crate::payload::Payload;
use crate::value::FormatValue;

const FORMAT: &str = "binary";

/// 原生二进制格式：对完整值域做不透明的序列化往返。
///
/// # 设计背景（Why）
/// - JSON 族表达不了时间戳与原始字节；该格式直接在值模型的 serde 表示上
///   做二进制编码，限制最少，可往返全部变体；
/// - 代价是安全姿态：反序列化不受信输入等于让对端决定进程内构造哪些
///   对象。该格式因此不进入默认集合，且描述符声明 `TrustedOnly`，注册
///   中心在解析阶段结构化拦截未授信调用方，外层必须有鉴权机制兜底。
///
/// # 契约说明（What）
/// - **build**：值树到 postcard 字节串；
/// - **parse**：字节串还原值树，任何截断或损坏以 `format.decode` 报告；
/// - MIME 固定为 `application/octet-stream`；默认不启用，仅限可信调用方。
#[derive(Debug, Clone)]
pub struct BinaryFormatter {
    descriptor: FormatDescriptor,
}

impl BinaryFormatter {
    /// 构建新的原生二进制格式实例。
    pub fn new() -> Self {
        Self {
            descriptor: descriptor(),
        }
    }

    /// 返回注册中心使用的工厂。
    pub fn factory() -> Arc<dyn FormatFactory> {
        Arc::new(TypedFormatFactory::new(descriptor(), |_ctx| {
            BinaryFormatter::new()
        }))
    }
}

impl Default for BinaryFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for BinaryFormatter {
    fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }

    fn build(&self, value: &FormatValue) -> Result<Payload, FormatError> {
        postcard::to_allocvec(value)
            .map(Payload::Binary)
            .map_err(|err| FormatError::encode(FORMAT, err))
    }

    fn parse(&self, payload: &Payload) -> Result<FormatValue, FormatError> {
        postcard::from_bytes(payload.as_bytes()).map_err(|err| FormatError::decode(FORMAT, err))
    }
}

fn descriptor() -> FormatDescriptor {
    FormatDescriptor::new(ContentType::new("application/octet-stream"))
        .with_active_by_default(false)
        .with_trust(TrustRequirement::TrustedOnly)
}
