//! 格式策略契约层：能力 trait、动作闭集与工厂适配器。
//!
//! # 教案意图（Why）
//! - 将"格式能做什么"（build/parse/dispatch 与静态属性）固化为对象安全
//!   契约，注册中心与 API 层只依赖该契约而非具体实现；
//! - 动作与其操作数以闭合枚举一体化表达，非法动作在类型层面不可构造。
//!
//! # 契约说明（What）
//! - [`Formatter`]：单个格式策略的能力面；
//! - [`FormatFactory`] / [`TypedFormatFactory`]：按请求上下文创建策略实例
//!   的对象安全工厂及其闭包适配器；
//! - [`FormatAction`]：外部动作字符串的唯一解析入口。

mod binary;
mod json;
mod jsonp;
mod value;
mod xml;

pub use binary::BinaryFormatter;
pub use json::JsonFormatter;
pub use jsonp::{DEFAULT_JSONP_CALLBACK, JsonpFormatter};
pub use value::ValueFormatter;
pub use xml::{QuickXmlValueCodec, XmlFormatter, XmlValueCodec};

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::context::FormatContext;
use crate::error::FormatError;
use crate::metadata::FormatDescriptor;
use crate::payload::Payload;
use crate::value::FormatValue;

/// `FormatAction` 是对外动作字符串的闭合枚举形态。
///
/// # 设计初衷（Why）
/// - 库内部的动作永远是该枚举，非法值无从构造；
/// - 外部来源（如查询参数）的字符串只能经由 [`FromStr`] 进入，未知取值在
///   边界上以 `format.invalid_action` 拒绝。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormatAction {
    /// 序列化方向。
    Build,
    /// 反序列化方向。
    Parse,
}

impl FormatAction {
    /// 返回动作的线上名称。
    pub fn as_str(self) -> &'static str {
        match self {
            FormatAction::Build => "build",
            FormatAction::Parse => "parse",
        }
    }
}

impl FromStr for FormatAction {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "build" => Ok(FormatAction::Build),
            "parse" => Ok(FormatAction::Parse),
            other => Err(FormatError::InvalidAction {
                action: other.to_owned(),
            }),
        }
    }
}

/// `FormatOp` 将动作与其操作数一体化表达。
///
/// # 设计初衷（Why）
/// - build 消费内存值、parse 消费线上负载，二者操作数类型不同；把动作与
///   操作数合并成一个闭合枚举后，"动作与数据不匹配"与"未知动作"两类
///   缺陷都在编译期被排除。
#[derive(Clone, Debug, PartialEq)]
pub enum FormatOp {
    /// 序列化给定值。
    Build(FormatValue),
    /// 反序列化给定负载。
    Parse(Payload),
}

impl FormatOp {
    /// 返回该操作对应的动作。
    pub fn action(&self) -> FormatAction {
        match self {
            FormatOp::Build(_) => FormatAction::Build,
            FormatOp::Parse(_) => FormatAction::Parse,
        }
    }
}

/// `FormatOutcome` 是 [`Formatter::dispatch`] 的统一返回形态。
#[derive(Clone, Debug, PartialEq)]
pub enum FormatOutcome {
    /// build 产出的线上负载。
    Payload(Payload),
    /// parse 产出的内存值。
    Value(FormatValue),
}

impl FormatOutcome {
    /// 取出负载形态，parse 结果返回 `None`。
    pub fn into_payload(self) -> Option<Payload> {
        match self {
            FormatOutcome::Payload(payload) => Some(payload),
            FormatOutcome::Value(_) => None,
        }
    }

    /// 取出值形态，build 结果返回 `None`。
    pub fn into_value(self) -> Option<FormatValue> {
        match self {
            FormatOutcome::Value(value) => Some(value),
            FormatOutcome::Payload(_) => None,
        }
    }
}

/// `Formatter` 是所有格式策略实现的统一能力契约。
///
/// # 设计背景（Why）
/// - 注册中心存放的是工厂，API 层拿到的是该 trait 的对象安全实例；
///   单一契约保证任意格式可被同一套调度代码驱动；
/// - `build`/`parse` 提供"未实现即报错"的缺省体：基础契约本身只为被
///   覆盖而存在，直接调用以 `format.not_implemented` 失败。
///
/// # 契约说明（What）
/// - **前置条件**：实例为单次操作创建，不跨请求共享；
/// - **后置条件**：`build` 在结构相等的输入上产出确定性负载；`parse` 把
///   负载还原为内存值，负载损坏时以 `format.decode` 报告；
/// - `dispatch` 是提供方法：按 [`FormatOp`] 路由到 build/parse，实现方
///   无需也不应重写它。
pub trait Formatter: Send + Sync + fmt::Debug {
    /// 返回该格式的静态能力描述符。
    fn descriptor(&self) -> &FormatDescriptor;

    /// 将内存值序列化为线上负载。
    fn build(&self, value: &FormatValue) -> Result<Payload, FormatError> {
        let _ = value;
        Err(FormatError::NotImplemented { operation: "build" })
    }

    /// 将线上负载反序列化为内存值。
    fn parse(&self, payload: &Payload) -> Result<FormatValue, FormatError> {
        let _ = payload;
        Err(FormatError::NotImplemented { operation: "parse" })
    }

    /// 按操作路由到 build 或 parse。
    fn dispatch(&self, op: FormatOp) -> Result<FormatOutcome, FormatError> {
        match op {
            FormatOp::Build(value) => self.build(&value).map(FormatOutcome::Payload),
            FormatOp::Parse(payload) => self.parse(&payload).map(FormatOutcome::Value),
        }
    }
}

/// `FormatFactory` 定义按请求上下文创建格式实例的对象安全契约。
///
/// # 设计初衷（Why）
/// - 注册中心以 trait 对象形式长期持有工厂，请求到来时再结合
///   [`FormatContext`] 生成一次性实例；
/// - 描述符挂在工厂上，使"枚举默认集合"等注册中心操作无需实例化格式。
///
/// # 契约说明（What）
/// - **前置条件**：传入的上下文仅对本次操作有效；
/// - **后置条件**：成功返回的实例满足 [`Formatter`] 全部契约，且其
///   描述符与工厂描述符一致。
pub trait FormatFactory: Send + Sync + fmt::Debug {
    /// 获取工厂支持的描述符。
    fn descriptor(&self) -> &FormatDescriptor;

    /// 基于请求上下文创建格式实例。
    fn instantiate(&self, ctx: &FormatContext) -> Result<Box<dyn Formatter>, FormatError>;
}

/// `TypedFormatFactory` 将返回具体 [`Formatter`] 的构造闭包包装为对象安全工厂。
///
/// # 设计初衷（Why）
/// - 具体格式以强类型实现构造逻辑，注册中心只消费对象层；该适配器把
///   二者桥接起来，避免每个格式手写一个工厂类型。
///
/// # 风险提示（Trade-offs）
/// - 闭包若捕获外部状态，需自行满足 `Send + Sync + 'static`，否则将无法
///   通过 trait 约束。
pub struct TypedFormatFactory<C, F>
where
    C: Formatter + 'static,
    F: Fn(&FormatContext) -> C + Send + Sync,
{
    descriptor: FormatDescriptor,
    constructor: F,
    _marker: PhantomData<C>,
}

impl<C, F> TypedFormatFactory<C, F>
where
    C: Formatter + 'static,
    F: Fn(&FormatContext) -> C + Send + Sync,
{
    /// 基于描述符与构造闭包创建工厂。
    pub fn new(descriptor: FormatDescriptor, constructor: F) -> Self {
        Self {
            descriptor,
            constructor,
            _marker: PhantomData,
        }
    }
}

impl<C, F> fmt::Debug for TypedFormatFactory<C, F>
where
    C: Formatter + 'static,
    F: Fn(&FormatContext) -> C + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedFormatFactory")
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

impl<C, F> FormatFactory for TypedFormatFactory<C, F>
where
    C: Formatter + 'static,
    F: Fn(&FormatContext) -> C + Send + Sync,
{
    fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }

    fn instantiate(&self, ctx: &FormatContext) -> Result<Box<dyn Formatter>, FormatError> {
        Ok(Box::new((self.constructor)(ctx)))
    }
}
