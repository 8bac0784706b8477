use std::sync::Arc;

use crate::error::FormatError;
use crate::formatter::{FormatFactory, Formatter, TypedFormatFactory};
use crate::metadata::{ContentType, FormatDescriptor};
use crate::payload::Payload;
use crate::value::FormatValue;

const FORMAT: &str = "value";

/// 传输直写格式：面向简单、快速、极小开销的传输场景。
///
/// # 设计背景（Why）
/// - 某些端点只交换一个标量（令牌、计数、状态字），完整的结构化编码纯属
///   浪费；该格式把标量原样写上线，不做任何结构化包装；
/// - 限制同样明确：列表、映射与原始字节没有无歧义的直写形态，一律拒绝，
///   引导调用方换用结构化格式。
///
/// # 契约说明（What）
/// - **build**：文本原样透传；布尔、整数、浮点、时间戳按展示形态渲染；
///   空值渲染为空串；结构化取值以 `format.unsupported_value` 拒绝；
/// - **parse**：把线上负载强制为文本值；二进制负载必须是合法 UTF-8；
/// - MIME 固定为 `text/html`，参与默认集合。
#[derive(Debug, Clone)]
pub struct ValueFormatter {
    descriptor: FormatDescriptor,
}

impl ValueFormatter {
    /// 构建新的传输直写格式实例。
    pub fn new() -> Self {
        Self {
            descriptor: descriptor(),
        }
    }

    /// 返回注册中心使用的工厂。
    pub fn factory() -> Arc<dyn FormatFactory> {
        Arc::new(TypedFormatFactory::new(descriptor(), |_ctx| {
            ValueFormatter::new()
        }))
    }
}

impl Default for ValueFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for ValueFormatter {
    fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }

    fn build(&self, value: &FormatValue) -> Result<Payload, FormatError> {
        match value {
            FormatValue::Text(text) => Ok(Payload::Text(text.clone())),
            FormatValue::Null => Ok(Payload::Text(String::new())),
            FormatValue::Bool(b) => Ok(Payload::Text(b.to_string())),
            FormatValue::Integer(i) => Ok(Payload::Text(i.to_string())),
            FormatValue::Float(f) => Ok(Payload::Text(f.to_string())),
            FormatValue::Timestamp(ts) => Ok(Payload::Text(ts.to_rfc3339())),
            other => Err(FormatError::unsupported(
                FORMAT,
                format!(
                    "`{}` values need a structured format, the plain transport only carries scalars",
                    other.kind()
                ),
            )),
        }
    }

    fn parse(&self, payload: &Payload) -> Result<FormatValue, FormatError> {
        Ok(FormatValue::Text(payload.as_text(FORMAT)?.to_owned()))
    }
}

fn descriptor() -> FormatDescriptor {
    FormatDescriptor::new(ContentType::new("text/html"))
}
