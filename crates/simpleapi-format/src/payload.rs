use crate::error::FormatError;

/// `Payload` 表示一次编码操作产出的线上负载形态。
///
/// # 设计背景（Why）
/// - 文本格式（JSON、JSONP、XML、传输直写）产出 UTF-8 文本，原生二进制格式
///   产出不透明字节串；以闭合枚举承载两种形态，解析侧无需猜测字符集；
/// - API 层可直接依据变体决定响应体写出方式，与描述符中的 MIME 类型配合。
///
/// # 契约说明（What）
/// - `Text` 保证内容为合法 UTF-8；
/// - `Binary` 不承诺任何内部结构，仅由产出它的格式解释。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// UTF-8 文本负载。
    Text(String),
    /// 不透明二进制负载。
    Binary(Vec<u8>),
}

impl Payload {
    /// 以文本构造负载。
    pub fn text(value: impl Into<String>) -> Self {
        Payload::Text(value.into())
    }

    /// 以字节串构造负载。
    pub fn binary(value: impl Into<Vec<u8>>) -> Self {
        Payload::Binary(value.into())
    }

    /// 以文本视角读取负载。
    ///
    /// # 契约说明（What）
    /// - `Text` 直接借出；`Binary` 先做 UTF-8 校验，失败映射为携带
    ///   `format` 标识的解码错误；
    /// - `format` 由调用方传入自身格式名，保证错误归属清晰。
    pub fn as_text(&self, format: &'static str) -> Result<&str, FormatError> {
        match self {
            Payload::Text(text) => Ok(text),
            Payload::Binary(bytes) => std::str::from_utf8(bytes)
                .map_err(|err| FormatError::decode(format, format!("payload is not UTF-8: {err}"))),
        }
    }

    /// 以字节视角读取负载。
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Binary(bytes) => bytes,
        }
    }

    /// 负载字节长度。
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// 负载是否为空。
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}
