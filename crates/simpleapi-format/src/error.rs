//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 为格式化层对外暴露的错误语义提供集中定义，覆盖注册冲突、信任门禁、
//!   编解码失败等全部可观察故障；
//! - 每个变体绑定一个稳定错误码，方便日志、指标与告警系统做精确聚合。
//!
//! ## 设计要求（What）
//! - 所有错误类型实现 `thiserror::Error`，与 `std::error::Error` 生态兼容；
//! - 错误码遵循 `<领域>.<语义>` 命名约定，集中登记在 [`codes`] 命名空间；
//! - 错误同步上报给直接调用方，库内部不做重试或降级，恢复策略属于上层。
//!
//! ## 扩展建议（How）
//! - 新增变体时同步补充 [`codes`] 常量与 [`FormatError::code`] 的映射分支；
//! - 携带上下文字符串时避免塞入完整负载，防止日志泄露敏感内容。

use thiserror::Error;

/// 格式化层的稳定错误码集合。
///
/// # 契约说明（What）
/// - **使用前提**：错误码由 [`FormatError::code`] 统一产出，调用方不应
///   自行拼接字符串；
/// - **返回承诺**：码值一经发布即保持稳定，可安全用于告警规则与仪表盘。
pub mod codes {
    /// 注册时名称冲突且未声明覆盖。
    pub const DUPLICATE_NAME: &str = "format.duplicate_name";
    /// 按名称解析时未命中任何注册项。
    pub const UNKNOWN_FORMAT: &str = "format.unknown";
    /// 目标格式要求可信调用方，当前信任级别不足。
    pub const TRUST_REQUIRED: &str = "format.trust_required";
    /// 基础能力未被具体实现覆盖。
    pub const NOT_IMPLEMENTED: &str = "format.not_implemented";
    /// 动作字符串不在 build/parse 的闭集之内。
    pub const INVALID_ACTION: &str = "format.invalid_action";
    /// 底层编解码器报告负载损坏或语法非法。
    pub const DECODE: &str = "format.decode";
    /// 序列化过程自身失败。
    pub const ENCODE: &str = "format.encode";
    /// 取值超出该格式可表达的域。
    pub const UNSUPPORTED_VALUE: &str = "format.unsupported_value";
}

/// 格式化核心错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：聚合注册中心与各格式策略在关键路径上的异常，细粒度
///   枚举帮助调用方快速定位故障来源并选择恢复策略；
/// - **契约 (What)**：
///   - 所有变体满足 `Send + Sync + 'static`，可安全跨线程传播；
///   - [`code`](Self::code) 返回稳定错误码，用于机读聚合；
///   - 解码类失败必须以 [`Decode`](Self::Decode) 呈现，不允许被内部吞掉。
/// - **设计权衡 (Trade-offs)**：上下文以 `String` 保存，牺牲少量堆分配换取
///   可读性；若未来出现零分配诉求，可引入 `Arc<str>` 版本按需克隆。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum FormatError {
    /// 注册时发现同名格式已存在且未声明覆盖。
    ///
    /// - **意图 (Why)**：让重复注册成为显式决策，防止静默覆盖他人注册项。
    /// - **契约 (What)**：`name` 为冲突的格式名；调用方可改名或携带覆盖标记重试。
    #[error("format name `{name}` is already registered, pass the override flag to replace it")]
    DuplicateName {
        /// 冲突的格式名。
        name: String,
    },

    /// 按名称解析时没有命中任何注册项。
    ///
    /// - **意图 (Why)**：请求路径上的未知格式需要被明确报告，交由上层决定
    ///   回退到默认格式还是直接拒绝请求。
    /// - **契约 (What)**：`name` 为请求的格式名；`lookup` 不会产生该错误，
    ///   只有带门禁语义的 `resolve`/`instantiate` 会。
    #[error("no formatter is registered under name `{name}`")]
    UnknownFormat {
        /// 未注册的格式名。
        name: String,
    },

    /// 目标格式只对可信调用方开放。
    ///
    /// - **意图 (Why)**：原生二进制反序列化可执行任意构造逻辑，属于信任
    ///   边界而非普通错误场景，必须结构化拦截；
    /// - **契约 (What)**：`name` 为被拦截的格式名；调用方应在鉴权通过后以
    ///   更高信任级别重新解析，而不是绕过注册中心。
    #[error("formatter `{name}` only accepts trusted callers")]
    TrustRequired {
        /// 受信任门禁保护的格式名。
        name: String,
    },

    /// 基础能力方法未被具体格式覆盖。
    ///
    /// - **契约 (What)**：`operation` 为被调用的能力名（`build`/`parse`）；
    ///   出现该错误说明实现遗漏了必选方法，属于集成缺陷而非运行时波动。
    #[error("formatter capability `{operation}` is not implemented")]
    NotImplemented {
        /// 缺失实现的能力名。
        operation: &'static str,
    },

    /// 动作字符串不在闭集 `build`/`parse` 之内。
    ///
    /// - **意图 (Why)**：库内部动作始终是闭合枚举；该错误只会出现在解析
    ///   外部动作字符串的边界上。
    #[error("`{action}` is not a formatter action, expected `build` or `parse`")]
    InvalidAction {
        /// 非法的动作字符串。
        action: String,
    },

    /// 负载解码失败。
    ///
    /// - **契约 (What)**：`format` 为报告方的格式名，`detail` 携带底层编解码
    ///   器的原始描述；负载内容本身不回显，避免日志泄露。
    #[error("failed to decode `{format}` payload: {detail}")]
    Decode {
        /// 报告失败的格式名。
        format: &'static str,
        /// 底层错误描述。
        detail: String,
    },

    /// 序列化过程失败。
    #[error("failed to encode value as `{format}`: {detail}")]
    Encode {
        /// 报告失败的格式名。
        format: &'static str,
        /// 底层错误描述。
        detail: String,
    },

    /// 取值不在该格式可表达的域内。
    ///
    /// - **意图 (Why)**：把"格式天然表达不了"与"负载损坏"区分开，前者应
    ///   引导调用方换格式，后者应引导排查数据源。
    #[error("value cannot be represented by the `{format}` formatter: {detail}")]
    UnsupportedValue {
        /// 拒绝该值的格式名。
        format: &'static str,
        /// 超域原因。
        detail: String,
    },
}

impl FormatError {
    /// 返回与变体绑定的稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            FormatError::DuplicateName { .. } => codes::DUPLICATE_NAME,
            FormatError::UnknownFormat { .. } => codes::UNKNOWN_FORMAT,
            FormatError::TrustRequired { .. } => codes::TRUST_REQUIRED,
            FormatError::NotImplemented { .. } => codes::NOT_IMPLEMENTED,
            FormatError::InvalidAction { .. } => codes::INVALID_ACTION,
            FormatError::Decode { .. } => codes::DECODE,
            FormatError::Encode { .. } => codes::ENCODE,
            FormatError::UnsupportedValue { .. } => codes::UNSUPPORTED_VALUE,
        }
    }

    /// 以底层错误的展示文本构造解码失败。
    pub(crate) fn decode(format: &'static str, detail: impl ToString) -> Self {
        FormatError::Decode {
            format,
            detail: detail.to_string(),
        }
    }

    /// 以底层错误的展示文本构造编码失败。
    pub(crate) fn encode(format: &'static str, detail: impl ToString) -> Self {
        FormatError::Encode {
            format,
            detail: detail.to_string(),
        }
    }

    /// 构造超域错误。
    pub(crate) fn unsupported(format: &'static str, detail: impl ToString) -> Self {
        FormatError::UnsupportedValue {
            format,
            detail: detail.to_string(),
        }
    }
}
