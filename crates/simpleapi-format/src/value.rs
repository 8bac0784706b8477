use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `FormatValue` 是格式化层统一的内存值模型。
///
/// # 设计背景（Why）
/// - 各格式策略需要一个与具体编码无关的值域：JSON 族只覆盖其中的子集，
///   原生二进制格式则要求全域往返，包括 JSON 无法表达的时间戳与原始字节；
/// - 映射使用 `BTreeMap` 保证键序稳定，使所有编码器在结构相等的输入上
///   产出确定性的字节序列。
///
/// # 契约说明（What）
/// - **标量**：`Null`、`Bool`、`Integer`（`i64`）、`Float`（`f64`）、`Text`；
/// - **扩展标量**：`Bytes`（原始二进制）、`Timestamp`（UTC 时间点）；
/// - **复合**：`List` 与键序稳定的 `Map`；
/// - 派生 serde 实现供原生二进制格式直接往返；文本格式（JSON/XML）自行
///   定义映射，不复用派生编码。
///
/// # 风险提示（Trade-offs）
/// - `Float` 含 `f64` 使整个枚举只能派生 `PartialEq`；比较含 NaN 的值树
///   时调用方需自行注意自反性缺失。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FormatValue {
    /// 空值。
    Null,
    /// 布尔量。
    Bool(bool),
    /// 带符号整数。
    Integer(i64),
    /// 双精度浮点数。
    Float(f64),
    /// UTF-8 文本。
    Text(String),
    /// 原始二进制字节串。
    Bytes(Vec<u8>),
    /// UTC 时间戳。
    Timestamp(DateTime<Utc>),
    /// 有序序列。
    List(Vec<FormatValue>),
    /// 键序稳定的映射。
    Map(BTreeMap<String, FormatValue>),
}

impl FormatValue {
    /// 以文本构造值，便于调用方书写字面量。
    pub fn text(value: impl Into<String>) -> Self {
        FormatValue::Text(value.into())
    }

    /// 返回变体的稳定名称，用于错误描述与日志。
    pub fn kind(&self) -> &'static str {
        match self {
            FormatValue::Null => "null",
            FormatValue::Bool(_) => "bool",
            FormatValue::Integer(_) => "integer",
            FormatValue::Float(_) => "float",
            FormatValue::Text(_) => "text",
            FormatValue::Bytes(_) => "bytes",
            FormatValue::Timestamp(_) => "timestamp",
            FormatValue::List(_) => "list",
            FormatValue::Map(_) => "map",
        }
    }

}

impl From<bool> for FormatValue {
    fn from(value: bool) -> Self {
        FormatValue::Bool(value)
    }
}

impl From<i64> for FormatValue {
    fn from(value: i64) -> Self {
        FormatValue::Integer(value)
    }
}

impl From<f64> for FormatValue {
    fn from(value: f64) -> Self {
        FormatValue::Float(value)
    }
}

impl From<&str> for FormatValue {
    fn from(value: &str) -> Self {
        FormatValue::Text(value.to_owned())
    }
}

impl From<String> for FormatValue {
    fn from(value: String) -> Self {
        FormatValue::Text(value)
    }
}

impl From<Vec<FormatValue>> for FormatValue {
    fn from(value: Vec<FormatValue>) -> Self {
        FormatValue::List(value)
    }
}

impl From<BTreeMap<String, FormatValue>> for FormatValue {
    fn from(value: BTreeMap<String, FormatValue>) -> Self {
        FormatValue::Map(value)
    }
}
