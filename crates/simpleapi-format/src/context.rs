use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// `FormatContext` 承载一次格式化操作的请求级上下文。
///
/// # 设计背景（Why）
/// - 格式实例按操作创建、用完即弃，构造时需要拿到两类请求级信息：
///   不透明的请求句柄与可选的回调函数名（仅 JSONP 使用）；
/// - 请求句柄由外层传输框架注入，本层只负责透传、从不解读其内容，
///   因此以 `Arc<dyn Any + Send + Sync>` 做类型擦除。
///
/// # 契约说明（What）
/// - **前置条件**：上下文由调用方为单次 build/parse 操作构造，不跨请求复用；
/// - **后置条件**：克隆仅复制 `Arc` 与回调名，开销恒定；
/// - 内建格式中只有 JSONP 消费 `callback`，自定义格式可按需读取 `request`。
#[derive(Clone, Default)]
pub struct FormatContext {
    request: Option<Arc<dyn Any + Send + Sync>>,
    callback: Option<String>,
}

impl FormatContext {
    /// 创建空上下文，适用于无请求信息的离线编解码场景。
    pub fn new() -> Self {
        Self::default()
    }

    /// 附加不透明请求句柄。
    pub fn with_request(mut self, request: Arc<dyn Any + Send + Sync>) -> Self {
        self.request = Some(request);
        self
    }

    /// 附加回调函数名。
    pub fn with_callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    /// 读取请求句柄；格式实现不应解读其内容，仅可向下游透传。
    pub fn request(&self) -> Option<&Arc<dyn Any + Send + Sync>> {
        self.request.as_ref()
    }

    /// 读取回调函数名。
    pub fn callback(&self) -> Option<&str> {
        self.callback.as_deref()
    }
}

impl fmt::Debug for FormatContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 请求句柄刻意不展开：内容属于外层框架，打印指针存在性即可。
        f.debug_struct("FormatContext")
            .field("request", &self.request.is_some())
            .field("callback", &self.callback)
            .finish()
    }
}
