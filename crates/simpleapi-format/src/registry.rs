//! # FormatRegistry：格式工厂注册中心
//!
//! ## 核心意图（Why）
//! - 提供基于 `DashMap` 的并发安全存储，确保多线程环境下注册、查询与
//!   枚举具备原子语义；
//! - 作为进程级共享资源被 API 层在每个请求路径上访问，需保证读热点下的
//!   可扩展性，同时让应用在启动阶段注册自定义格式时得到确定性的冲突裁决。
//!
//! ## 行为契约（What）
//! - `register`：同名未声明覆盖时返回
//!   [`FormatError::DuplicateName`](crate::error::FormatError::DuplicateName)；
//! - `lookup`/`contains`：按名读取，键缺失不报错；
//! - `default_names`：默认启用格式的有序名称集合；
//! - `snapshot`：防御性拷贝，对副本的任何修改不回写注册中心；
//! - `resolve`/`instantiate`：带信任门禁的请求路径入口；
//! - 所有条目以 `Arc<str>` 为索引，保证名称零拷贝共享。
//!
//! ## 风险提示（Trade-offs）
//! - 未提供注销操作：格式集合只增不减，与进程级单例的生命周期一致；
//!   确需替换时使用覆盖注册。

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, warn};

use crate::context::FormatContext;
use crate::error::FormatError;
use crate::formatter::{
    BinaryFormatter, FormatFactory, Formatter, JsonFormatter, JsonpFormatter, ValueFormatter,
    XmlFormatter,
};
use crate::metadata::TrustLevel;

/// `FormatRegistry` 负责集中管理格式工厂。
///
/// # 教案式注释
/// - **意图 (Why)**：封装并发安全存储，避免上层直接操作底层映射；注册
///   冲突、信任门禁等裁决集中在此，调用方不可能绕过；
/// - **契约 (What)**：映射本身私有，唯一的写入口是 [`register`](Self::register)；
///   读入口按语义分层：无门禁的 `lookup` 与带门禁的 `resolve`；
/// - **风险 (Trade-offs)**：`DashMap` 的迭代视图不是全局一致快照；
///   `default_names`/`snapshot` 在并发注册进行中可能观察到中间状态，
///   对"启动期注册、运行期只读"的预期用法无影响。
#[derive(Default)]
pub struct FormatRegistry {
    entries: DashMap<Arc<str>, Arc<dyn FormatFactory>>,
}

impl FormatRegistry {
    /// 创建空的注册中心。
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建预装全部内建格式的注册中心。
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.install_builtins();
        registry
    }

    /// 返回进程级单例，首次访问时完成内建格式装载。
    ///
    /// # 契约说明（What）
    /// - 单例与进程同生命周期，不提供拆除；
    /// - 应用自定义格式应在开始服务流量前注册完毕，虽然运行期注册同样
    ///   线程安全，但请求路径观察到的格式集合会随之变化。
    pub fn global() -> &'static FormatRegistry {
        static GLOBAL: OnceLock<FormatRegistry> = OnceLock::new();
        GLOBAL.get_or_init(FormatRegistry::with_builtins)
    }

    /// 注册给定名称的格式工厂。
    ///
    /// # 教案式注释
    /// - **意图 (Why)**：让重复注册成为显式决策：未声明覆盖的同名注册是
    ///   集成错误，必须在启动阶段暴露而不是静默替换；
    /// - **契约 (What)**：
    ///   - `name`：格式短名，同时是请求路径上的选择键；
    ///   - `factory`：满足 [`FormatFactory`] 的工厂；契约符合性由类型系统
    ///     在编译期保证，无需运行时探测；
    ///   - `override_existing` 为 `false` 且名称已存在时返回
    ///     [`FormatError::DuplicateName`]；为 `true` 时原子替换并告警留痕；
    ///   - **后置条件**：成功后 `lookup(name)` 立即可见新工厂。
    pub fn register(
        &self,
        name: impl Into<Arc<str>>,
        factory: Arc<dyn FormatFactory>,
        override_existing: bool,
    ) -> Result<(), FormatError> {
        let name: Arc<str> = name.into();
        if override_existing {
            let replaced = self.entries.insert(name.clone(), factory).is_some();
            if replaced {
                warn!(format = %name, "replaced format registration via override");
            } else {
                debug!(format = %name, "registered format");
            }
            return Ok(());
        }

        match self.entries.entry(name.clone()) {
            Entry::Occupied(_) => Err(FormatError::DuplicateName {
                name: name.as_ref().to_owned(),
            }),
            Entry::Vacant(vacant) => {
                vacant.insert(factory);
                debug!(format = %name, "registered format");
                Ok(())
            }
        }
    }

    /// 按名称查询工厂；键缺失返回 `None`，从不报错。
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn FormatFactory>> {
        self.entries.get(name).map(|entry| entry.value().clone())
    }

    /// 名称是否已注册。
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// 返回默认启用格式的有序名称集合。
    ///
    /// 集合恒为已注册名称的子集，由描述符的默认启用标记过滤得出。
    pub fn default_names(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .filter(|entry| entry.value().descriptor().active_by_default())
            .map(|entry| entry.key().as_ref().to_owned())
            .collect()
    }

    /// 返回全部注册项的防御性拷贝。
    ///
    /// 副本持有工厂的共享引用，但对副本的增删改不会回写注册中心。
    pub fn snapshot(&self) -> BTreeMap<String, Arc<dyn FormatFactory>> {
        self.entries
            .iter()
            .map(|entry| (entry.key().as_ref().to_owned(), entry.value().clone()))
            .collect()
    }

    /// 带信任门禁的请求路径解析。
    ///
    /// # 教案式注释
    /// - **意图 (Why)**：原生二进制这类格式的安全屏障不能只靠"默认不
    ///   启用"；把信任判定放进解析入口，使未授信流量在结构上无法拿到
    ///   受限格式的工厂；
    /// - **契约 (What)**：未注册名称返回
    ///   [`FormatError::UnknownFormat`]；描述符要求可信而 `trust` 不足时
    ///   返回 [`FormatError::TrustRequired`] 并告警留痕。
    pub fn resolve(
        &self,
        name: &str,
        trust: TrustLevel,
    ) -> Result<Arc<dyn FormatFactory>, FormatError> {
        let factory = self.lookup(name).ok_or_else(|| FormatError::UnknownFormat {
            name: name.to_owned(),
        })?;
        if !trust.satisfies(factory.descriptor().trust()) {
            warn!(format = %name, "rejected untrusted caller for trust-gated format");
            return Err(FormatError::TrustRequired {
                name: name.to_owned(),
            });
        }
        Ok(factory)
    }

    /// 解析并实例化：请求路径的一步到位入口。
    pub fn instantiate(
        &self,
        name: &str,
        trust: TrustLevel,
        ctx: &FormatContext,
    ) -> Result<Box<dyn Formatter>, FormatError> {
        self.resolve(name, trust)?.instantiate(ctx)
    }

    /// 装载内建格式。
    ///
    /// 内建名称互不相同且映射为空，直接写入即可，不经过冲突裁决。
    fn install_builtins(&self) {
        self.entries
            .insert(Arc::from("json"), JsonFormatter::factory());
        self.entries
            .insert(Arc::from("jsonp"), JsonpFormatter::factory());
        self.entries
            .insert(Arc::from("value"), ValueFormatter::factory());
        self.entries
            .insert(Arc::from("binary"), BinaryFormatter::factory());
        self.entries.insert(Arc::from("xml"), XmlFormatter::factory());
    }
}
