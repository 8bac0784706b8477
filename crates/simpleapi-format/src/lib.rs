#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # simpleapi-format
//!
//! ## 教案意图（Why）
//! - **职责定位**：为 RPC 风格的 API 层提供可插拔的内容格式层：以短名
//!   （`json`、`jsonp`、`value`、`binary`、`xml`）索引格式策略，每个策略
//!   同时承担序列化（build）与反序列化（parse）；
//! - **架构价值**：API 层依据请求里的格式名从注册中心取得工厂、结合请求
//!   上下文实例化策略，自身不感知任何具体编码；新增格式只需注册新工厂，
//!   无需改动调度代码；
//! - **安全立场**：原生二进制反序列化是信任边界，注册中心在解析阶段做
//!   结构化门禁，而非依赖"默认不启用"的软约束。
//!
//! ## 使用方式（How）
//! - 请求路径：`FormatRegistry::global()` 取单例，`instantiate(name, trust, ctx)`
//!   获得一次性策略实例，再按方向调用 `build`/`parse` 或统一走 `dispatch`；
//! - 扩展路径：实现 [`Formatter`] 与（通常经由 [`TypedFormatFactory`]）
//!   [`FormatFactory`]，在开始服务流量前 `register`；
//! - 响应头：从描述符读取 MIME 类型透传给传输层。
//!
//! ## 契约说明（What）
//! - 注册名称全局唯一，未声明覆盖的同名注册立即失败；
//! - 默认集合恒为已注册名称中默认启用者的子集；
//! - 所有错误同步上报并携带稳定错误码，恢复策略（例如回退默认格式）
//!   属于调用方。
//!
//! ## 风险提示（Trade-offs）
//! - 策略实例按操作创建、用完即弃，框架不做实例池化；格式实现应保持
//!   构造轻量；
//! - 文本格式对值域的覆盖各不相同（JSON 拒绝原始字节、传输直写仅限
//!   标量），调用方需按数据形态选择格式，必要时参考各格式文档的降级
//!   说明。

/// 请求级构造上下文：不透明请求句柄与可选回调名。
pub mod context;
pub mod error;
pub mod formatter;
/// 格式的静态能力属性：内容类型、默认启用标记与信任要求。
pub mod metadata;
/// 线上负载形态：文本或不透明二进制。
pub mod payload;
pub mod registry;
/// 格式化层统一的内存值模型。
pub mod value;

pub use context::FormatContext;
pub use error::{FormatError, codes};
pub use formatter::{
    BinaryFormatter, DEFAULT_JSONP_CALLBACK, FormatAction, FormatFactory, FormatOp, FormatOutcome,
    Formatter, JsonFormatter, JsonpFormatter, QuickXmlValueCodec, TypedFormatFactory,
    ValueFormatter, XmlFormatter, XmlValueCodec,
};
pub use metadata::{ContentType, FormatDescriptor, TrustLevel, TrustRequirement};
pub use payload::Payload;
pub use registry::FormatRegistry;
pub use value::FormatValue;
