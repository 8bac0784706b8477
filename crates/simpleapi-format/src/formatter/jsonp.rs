use std::sync::Arc;

use crate::context::FormatContext;
use crate::error::FormatError;
use crate::formatter::json::{parse_json_text, to_json_text};
use crate::formatter::{FormatFactory, Formatter, TypedFormatFactory};
use crate::metadata::{ContentType, FormatDescriptor};
use crate::payload::Payload;
use crate::value::FormatValue;

/// 上下文未提供回调名时使用的缺省回调。
pub const DEFAULT_JSONP_CALLBACK: &str = "simpleapiCallback";

/// JSONP 格式策略，用于跨域请求场景。
///
/// # 设计背景（Why）
/// - 跨域脚本加载无法读取裸 JSON 响应，需要把负载包进调用方指定的回调
///   函数；回调名来自请求上下文，缺省为 [`DEFAULT_JSONP_CALLBACK`]；
/// - 包装只发生在响应方向：parse 与 JSON 格式完全一致，不做任何拆包。
///
/// # 契约说明（What）
/// - **build**：`<callback>(<json>)` 形态的文本负载；
/// - **parse**：等同 JSON 格式的解析；
/// - MIME 固定为 `application/javascript`，参与默认集合。
#[derive(Debug, Clone)]
pub struct JsonpFormatter {
    descriptor: FormatDescriptor,
    callback: Option<String>,
}

impl JsonpFormatter {
    /// 基于请求上下文构建 JSONP 格式实例，回调名在此一次性固定。
    pub fn new(ctx: &FormatContext) -> Self {
        Self {
            descriptor: descriptor(),
            callback: ctx.callback().map(str::to_owned),
        }
    }

    /// 返回注册中心使用的工厂。
    pub fn factory() -> Arc<dyn FormatFactory> {
        Arc::new(TypedFormatFactory::new(descriptor(), JsonpFormatter::new))
    }

    fn callback(&self) -> &str {
        self.callback.as_deref().unwrap_or(DEFAULT_JSONP_CALLBACK)
    }
}

impl Formatter for JsonpFormatter {
    fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }

    fn build(&self, value: &FormatValue) -> Result<Payload, FormatError> {
        let json = to_json_text(value)?;
        Ok(Payload::Text(format!("{}({})", self.callback(), json)))
    }

    fn parse(&self, payload: &Payload) -> Result<FormatValue, FormatError> {
        parse_json_text(payload.as_text("jsonp")?)
    }
}

fn descriptor() -> FormatDescriptor {
    FormatDescriptor::new(ContentType::new("application/javascript"))
}
