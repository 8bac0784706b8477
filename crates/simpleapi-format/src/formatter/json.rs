use std::sync::Arc;

use crate::error::FormatError;
use crate::formatter::{FormatFactory, Formatter, TypedFormatFactory};
use crate::metadata::{ContentType, FormatDescriptor};
use crate::payload::Payload;
use crate::value::FormatValue;

const FORMAT: &str = "json";

/// JSON 格式策略，是客户端与多数 Javascript 框架的默认选择。
///
/// # 设计背景（Why）
/// - JSON 覆盖值模型中的常用子集，映射键序稳定保证输出确定性；
/// - 值模型中 JSON 表达不了的部分采取显式策略：时间戳降级为 RFC 3339
///   文本（解析回来即为文本，属于文档化的有损路径），原始字节直接拒绝，
///   引导调用方改用二进制格式。
///
/// # 契约说明（What）
/// - **build**：值树到紧凑 JSON 文本；非有限浮点以 `format.encode` 拒绝；
/// - **parse**：JSON 文本到值树；语法非法以 `format.decode` 报告；
/// - MIME 固定为 `application/json`，参与默认集合。
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    descriptor: FormatDescriptor,
}

impl JsonFormatter {
    /// 构建新的 JSON 格式实例。
    pub fn new() -> Self {
        Self {
            descriptor: descriptor(),
        }
    }

    /// 返回注册中心使用的工厂。
    pub fn factory() -> Arc<dyn FormatFactory> {
        Arc::new(TypedFormatFactory::new(descriptor(), |_ctx| {
            JsonFormatter::new()
        }))
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for JsonFormatter {
    fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }

    fn build(&self, value: &FormatValue) -> Result<Payload, FormatError> {
        to_json_text(value).map(Payload::Text)
    }

    fn parse(&self, payload: &Payload) -> Result<FormatValue, FormatError> {
        parse_json_text(payload.as_text(FORMAT)?)
    }
}

fn descriptor() -> FormatDescriptor {
    FormatDescriptor::new(ContentType::new("application/json"))
}

/// 将值树渲染为紧凑 JSON 文本，供 JSON 与 JSONP 两个格式共用。
pub(crate) fn to_json_text(value: &FormatValue) -> Result<String, FormatError> {
    let json = to_json(value)?;
    serde_json::to_string(&json).map_err(|err| FormatError::encode(FORMAT, err))
}

/// 解析 JSON 文本为值树，供 JSON 与 JSONP 两个格式共用。
pub(crate) fn parse_json_text(text: &str) -> Result<FormatValue, FormatError> {
    let json: serde_json::Value =
        serde_json::from_str(text).map_err(|err| FormatError::decode(FORMAT, err))?;
    Ok(from_json(json))
}

fn to_json(value: &FormatValue) -> Result<serde_json::Value, FormatError> {
    match value {
        FormatValue::Null => Ok(serde_json::Value::Null),
        FormatValue::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        FormatValue::Integer(i) => Ok(serde_json::Value::Number((*i).into())),
        FormatValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| {
                FormatError::encode(FORMAT, format!("non-finite float `{f}` has no JSON form"))
            }),
        FormatValue::Text(text) => Ok(serde_json::Value::String(text.clone())),
        // JSON 没有二进制类型；静默 base64 会让解析侧无从分辨文本与字节。
        FormatValue::Bytes(_) => Err(FormatError::unsupported(
            FORMAT,
            "raw bytes have no JSON representation, use the binary format",
        )),
        FormatValue::Timestamp(ts) => Ok(serde_json::Value::String(ts.to_rfc3339())),
        FormatValue::List(items) => {
            let mut array = Vec::with_capacity(items.len());
            for item in items {
                array.push(to_json(item)?);
            }
            Ok(serde_json::Value::Array(array))
        }
        FormatValue::Map(entries) => {
            let mut object = serde_json::Map::new();
            for (key, item) in entries {
                object.insert(key.clone(), to_json(item)?);
            }
            Ok(serde_json::Value::Object(object))
        }
    }
}

fn from_json(value: serde_json::Value) -> FormatValue {
    match value {
        serde_json::Value::Null => FormatValue::Null,
        serde_json::Value::Bool(b) => FormatValue::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                FormatValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                FormatValue::Float(f)
            } else {
                // 标准 Number 总能落入上面两个分支；该臂仅为穷尽性兜底。
                FormatValue::Null
            }
        }
        serde_json::Value::String(s) => FormatValue::Text(s),
        serde_json::Value::Array(items) => {
            FormatValue::List(items.into_iter().map(from_json).collect())
        }
        serde_json::Value::Object(entries) => FormatValue::Map(
            entries
                .into_iter()
                .map(|(key, item)| (key, from_json(item)))
                .collect(),
        ),
    }
}
