//! 文本与二进制格式在代表性值树上的 build/parse 基准。

use std::collections::BTreeMap;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use simpleapi_format::{BinaryFormatter, FormatValue, Formatter, JsonFormatter, XmlFormatter};

fn representative_tree() -> FormatValue {
    let mut row = BTreeMap::new();
    row.insert("id".to_owned(), FormatValue::Integer(42));
    row.insert("name".to_owned(), FormatValue::text("article"));
    row.insert("score".to_owned(), FormatValue::Float(0.875));
    row.insert("published".to_owned(), FormatValue::Bool(true));
    let rows = (0..16)
        .map(|_| FormatValue::Map(row.clone()))
        .collect::<Vec<_>>();
    let mut root = BTreeMap::new();
    root.insert("rows".to_owned(), FormatValue::List(rows));
    root.insert("total".to_owned(), FormatValue::Integer(16));
    FormatValue::Map(root)
}

fn bench_roundtrip(c: &mut Criterion) {
    let value = representative_tree();
    let mut group = c.benchmark_group("format_roundtrip");

    let json = JsonFormatter::new();
    let json_payload = json.build(&value).expect("json build");
    group.bench_function("json_build", |b| {
        b.iter(|| json.build(black_box(&value)).expect("build"))
    });
    group.bench_function("json_parse", |b| {
        b.iter(|| json.parse(black_box(&json_payload)).expect("parse"))
    });

    let binary = BinaryFormatter::new();
    let binary_payload = binary.build(&value).expect("binary build");
    group.bench_function("binary_build", |b| {
        b.iter(|| binary.build(black_box(&value)).expect("build"))
    });
    group.bench_function("binary_parse", |b| {
        b.iter(|| binary.parse(black_box(&binary_payload)).expect("parse"))
    });

    let xml = XmlFormatter::new();
    let xml_payload = xml.build(&value).expect("xml build");
    group.bench_function("xml_build", |b| {
        b.iter(|| xml.build(black_box(&value)).expect("build"))
    });
    group.bench_function("xml_parse", |b| {
        b.iter(|| xml.parse(black_box(&xml_payload)).expect("parse"))
    });

    group.finish();
}

criterion_group!(benches, bench_roundtrip);
criterion_main!(benches);
