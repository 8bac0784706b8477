//! 通过公开 API 对注册中心与内建格式做契约回归。
//!
//! # 教案式说明
//! - **Why**：单元测试覆盖各模块内部分支，这里验证调用方真实走到的
//!   组合路径：单例装载、门禁解析、上下文实例化与动作调度。
//! - **How**：仅使用 crate 根导出的类型，任何需要内部可见性的断言都
//!   说明契约面泄漏，应回到单元测试解决。
//! - **What**：断言失败即对外契约被破坏，属于阻断性回归。

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use simpleapi_format::{
    ContentType, FormatAction, FormatContext, FormatDescriptor, FormatError, FormatFactory,
    FormatOp, FormatOutcome, FormatRegistry, FormatValue, Formatter, Payload, TrustLevel,
    TypedFormatFactory, codes,
};

fn sample_map() -> FormatValue {
    let mut map = BTreeMap::new();
    map.insert("a".to_owned(), FormatValue::Integer(1));
    FormatValue::Map(map)
}

/// 默认集合必须与对外宣告一致：二进制格式已注册但不在其中。
#[test]
fn builtin_defaults_match_announced_set() {
    let registry = FormatRegistry::global();
    let expected: BTreeSet<String> = ["json", "jsonp", "value", "xml"]
        .into_iter()
        .map(str::to_owned)
        .collect();
    assert_eq!(registry.default_names(), expected);
    assert!(registry.contains("binary"));
}

/// 每个注册项实例化后都要满足能力契约：描述符一致且可完成基本构建。
#[test]
fn every_registered_factory_yields_conforming_instances() {
    let registry = FormatRegistry::with_builtins();
    for (name, factory) in registry.snapshot() {
        let instance = factory
            .instantiate(&FormatContext::new())
            .unwrap_or_else(|err| panic!("`{name}` failed to instantiate: {err}"));
        assert_eq!(
            instance.descriptor(),
            factory.descriptor(),
            "`{name}` instance descriptor diverges from its factory"
        );
        // 文本标量落在全部内建格式的可表达域内，适合作统一探针。
        instance
            .build(&FormatValue::text("probe"))
            .unwrap_or_else(|err| panic!("`{name}` failed to build a text scalar: {err}"));
    }
}

/// JSONP 的包装行为从请求上下文一路贯通到调度出口。
#[test]
fn jsonp_wrapping_flows_through_dispatch() {
    let registry = FormatRegistry::global();

    let with_callback = registry
        .instantiate(
            "jsonp",
            TrustLevel::Untrusted,
            &FormatContext::new().with_callback("cb"),
        )
        .expect("jsonp instantiates");
    let outcome = with_callback
        .dispatch(FormatOp::Build(sample_map()))
        .expect("dispatch build");
    assert_eq!(
        outcome,
        FormatOutcome::Payload(Payload::text("cb({\"a\":1})"))
    );

    let without_callback = registry
        .instantiate("jsonp", TrustLevel::Untrusted, &FormatContext::new())
        .expect("jsonp instantiates");
    let payload = without_callback.build(&sample_map()).expect("build");
    assert_eq!(payload, Payload::text("simpleapiCallback({\"a\":1})"));
}

/// 二进制格式的门禁与全域往返在请求路径上同时成立。
#[test]
fn binary_gate_and_roundtrip_on_the_request_path() {
    let registry = FormatRegistry::global();

    let err = registry
        .instantiate("binary", TrustLevel::Untrusted, &FormatContext::new())
        .expect_err("untrusted caller is rejected");
    assert_eq!(err.code(), codes::TRUST_REQUIRED);

    let formatter = registry
        .instantiate("binary", TrustLevel::Trusted, &FormatContext::new())
        .expect("trusted caller passes");
    let mut map = BTreeMap::new();
    map.insert("raw".to_owned(), FormatValue::Bytes(vec![1, 2, 3]));
    let value = FormatValue::Map(map);
    let payload = formatter.build(&value).expect("build");
    assert_eq!(formatter.parse(&payload).expect("parse"), value);
}

/// 外部动作字符串只能经由闭集解析进入调度。
#[test]
fn action_strings_gate_the_dispatch_entry() {
    let registry = FormatRegistry::global();
    let formatter = registry
        .instantiate("json", TrustLevel::Untrusted, &FormatContext::new())
        .expect("json instantiates");

    let action: FormatAction = "parse".parse().expect("known action");
    let op = match action {
        FormatAction::Build => FormatOp::Build(sample_map()),
        FormatAction::Parse => FormatOp::Parse(Payload::text("{\"a\":1}")),
    };
    let outcome = formatter.dispatch(op).expect("dispatch parse");
    assert_eq!(outcome, FormatOutcome::Value(sample_map()));

    let err = "destroy".parse::<FormatAction>().expect_err("unknown action");
    assert_eq!(err.code(), codes::INVALID_ACTION);
}

/// 应用自定义格式：注册、冲突、覆盖的完整生命周期。
#[test]
fn custom_formats_follow_the_registration_lifecycle() {
    #[derive(Debug)]
    struct TagFormatter {
        descriptor: FormatDescriptor,
        tag: &'static str,
    }

    impl Formatter for TagFormatter {
        fn descriptor(&self) -> &FormatDescriptor {
            &self.descriptor
        }

        fn build(&self, _value: &FormatValue) -> Result<Payload, FormatError> {
            Ok(Payload::text(self.tag))
        }
    }

    fn tag_factory(tag: &'static str) -> Arc<dyn FormatFactory> {
        Arc::new(TypedFormatFactory::new(
            FormatDescriptor::new(ContentType::new("text/plain")),
            move |_ctx| TagFormatter {
                descriptor: FormatDescriptor::new(ContentType::new("text/plain")),
                tag,
            },
        ))
    }

    let registry = FormatRegistry::with_builtins();
    registry
        .register("tag", tag_factory("v1"), false)
        .expect("fresh name registers");
    assert!(registry.default_names().contains("tag"));

    let err = registry
        .register("tag", tag_factory("v2"), false)
        .expect_err("duplicate without override");
    assert_eq!(err.code(), codes::DUPLICATE_NAME);

    registry
        .register("tag", tag_factory("v2"), true)
        .expect("override replaces");
    let formatter = registry
        .instantiate("tag", TrustLevel::Untrusted, &FormatContext::new())
        .expect("instantiate");
    assert_eq!(
        formatter.build(&FormatValue::Null).expect("build"),
        Payload::text("v2")
    );
}

/// 快照是防御性拷贝：对副本的修改不影响后续查询。
#[test]
fn snapshot_is_a_defensive_copy() {
    let registry = FormatRegistry::with_builtins();
    let mut snapshot = registry.snapshot();
    snapshot.clear();
    assert!(registry.lookup("json").is_some());
    assert_eq!(registry.snapshot().len(), 5);
}
