use std::borrow::Cow;

/// `ContentType` 以 IANA `media-type` 约定描述负载的主语义。
///
/// # 设计背景（Why）
/// - API 层依据所选格式写响应头，标准化 MIME 类型可与各语言客户端生态兼容；
/// - 通过 `Cow<'static, str>` 兼容静态常量与运行时扩展类型，避免多余复制。
///
/// # 契约说明（What）
/// - **前置条件**：传入的媒体类型应满足 IANA `type/subtype` 格式，推荐全小写；
/// - **后置条件**：实例内部存储 `'static` 生命周期，可在注册表中长期缓存。
///
/// # 风险提示（Trade-offs）
/// - 为保持灵活性未做合法性校验；在边界系统使用自定义类型时调用方需自行把关。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContentType(Cow<'static, str>);

impl ContentType {
    /// 创建新的内容类型。
    pub fn new(value: impl Into<Cow<'static, str>>) -> Self {
        Self(value.into())
    }

    /// 返回底层字符串表示。
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `TrustRequirement` 声明格式对调用方信任级别的最低要求。
///
/// # 设计初衷（Why）
/// - 原生二进制反序列化路径可以执行负载内嵌的任意构造逻辑，"默认不启用"
///   不足以构成安全屏障；
/// - 将信任要求固化到描述符上，使注册中心能够在解析阶段结构化拦截，而非
///   依赖调用方自觉。
///
/// # 契约说明（What）
/// - `Open`：任何调用方都可解析；
/// - `TrustedOnly`：仅当调用方声明 [`TrustLevel::Trusted`] 时允许解析，
///   典型前提是外层已有鉴权机制兜底。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrustRequirement {
    /// 对所有调用方开放。
    Open,
    /// 仅对可信调用方开放。
    TrustedOnly,
}

/// `TrustLevel` 表达一次解析请求的调用方信任级别。
///
/// # 契约说明（What）
/// - 由 API 层依据鉴权结果选取：匿名或未认证流量使用 `Untrusted`，
///   通过认证的内部调用使用 `Trusted`；
/// - 级别仅在注册中心的门禁判定中消费，格式实现本身不感知。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrustLevel {
    /// 未经认证的调用方。
    Untrusted,
    /// 已通过外层鉴权的调用方。
    Trusted,
}

impl TrustLevel {
    /// 判断当前级别是否满足给定要求。
    pub fn satisfies(self, requirement: TrustRequirement) -> bool {
        match requirement {
            TrustRequirement::Open => true,
            TrustRequirement::TrustedOnly => matches!(self, TrustLevel::Trusted),
        }
    }
}

/// `FormatDescriptor` 聚合格式的静态能力属性，是注册与协商的最小识别单元。
///
/// # 设计背景（Why）
/// - MIME 类型、默认启用标记与信任要求均为变体级静态信息，与请求状态无关，
///   集中在一个不可变描述符中便于注册中心索引与响应头透传；
/// - 构建器风格的 `with_*` 方法让非默认属性的声明保持显式。
///
/// # 契约说明（What）
/// - **前置条件**：`content_type` 必须与实际产出负载匹配，否则消费方解码失败；
/// - **后置条件**：实例可安全克隆并跨线程共享；未调用 `with_*` 时，
///   默认"参与默认集合"且"对所有调用方开放"。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatDescriptor {
    content_type: ContentType,
    active_by_default: bool,
    trust: TrustRequirement,
}

impl FormatDescriptor {
    /// 构建新的描述符，默认参与默认集合且对所有调用方开放。
    pub fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            active_by_default: true,
            trust: TrustRequirement::Open,
        }
    }

    /// 声明该格式是否进入默认启用集合。
    pub fn with_active_by_default(mut self, active: bool) -> Self {
        self.active_by_default = active;
        self
    }

    /// 声明该格式的信任要求。
    pub fn with_trust(mut self, trust: TrustRequirement) -> Self {
        self.trust = trust;
        self
    }

    /// 获取内容类型。
    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// 该格式是否默认启用。
    pub fn active_by_default(&self) -> bool {
        self.active_by_default
    }

    /// 获取信任要求。
    pub fn trust(&self) -> TrustRequirement {
        self.trust
    }
}
