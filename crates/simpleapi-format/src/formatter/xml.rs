use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::FormatError;
use crate::formatter::{FormatFactory, Formatter, TypedFormatFactory};
use crate::metadata::{ContentType, FormatDescriptor};
use crate::payload::Payload;
use crate::value::FormatValue;

const FORMAT: &str = "xml";
const VALUE_TAG: &str = "value";
const ENTRY_TAG: &str = "entry";

/// `XmlValueCodec` 是值树与 XML 文档之间的注入式映射契约。
///
/// # 设计初衷（Why）
/// - 对象到 XML 的映射属于外部协作者：格式策略只关心 dumps/loads 两个
///   操作，具体元素方案可被整体替换（例如对接既有网关的私有 schema）；
/// - 缺省实现 [`QuickXmlValueCodec`] 满足开箱即用，替换方只需实现本契约
///   并通过 [`XmlFormatter::with_codec`] 注入。
///
/// # 契约说明（What）
/// - `dumps` 与 `loads` 必须互逆：`loads(dumps(v)) == v` 对全部值域成立；
/// - 两个方向的失败分别以 `format.encode` / `format.decode` 报告。
pub trait XmlValueCodec: Send + Sync {
    /// 将值树渲染为 XML 文档文本。
    fn dumps(&self, value: &FormatValue) -> Result<String, FormatError>;

    /// 将 XML 文档文本还原为值树。
    fn loads(&self, text: &str) -> Result<FormatValue, FormatError>;
}

/// 基于 quick-xml 事件流的缺省值树映射。
///
/// # 行为概览（How）
/// - 每个取值渲染为 `<value type="...">` 元素；映射条目渲染为携带
///   `key` 属性的 `<entry>` 子元素；
/// - 字节串以十六进制文本承载，时间戳使用 RFC 3339；
/// - 解析为递归下降的事件拉取：不构建中间 DOM，内存占用与文档深度成正比。
///
/// # 风险提示（Trade-offs）
/// - 元素方案是本实现的私有约定；跨系统互通时应以 [`XmlValueCodec`]
///   注入对齐双方的 schema，而不是在外部模拟该约定。
#[derive(Debug, Default)]
pub struct QuickXmlValueCodec;

impl XmlValueCodec for QuickXmlValueCodec {
    fn dumps(&self, value: &FormatValue) -> Result<String, FormatError> {
        let mut writer = Writer::new(Vec::new());
        write_value(&mut writer, value)?;
        String::from_utf8(writer.into_inner()).map_err(|err| FormatError::encode(FORMAT, err))
    }

    fn loads(&self, text: &str) -> Result<FormatValue, FormatError> {
        let mut reader = Reader::from_str(text);
        loop {
            match read_event(&mut reader)? {
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => continue,
                Event::Text(t) => {
                    let content = t.unescape().map_err(|err| FormatError::decode(FORMAT, err))?;
                    if content.trim().is_empty() {
                        continue;
                    }
                    return Err(FormatError::decode(FORMAT, "stray text before root element"));
                }
                Event::Start(start) => return read_value_element(&mut reader, &start, false),
                Event::Empty(start) => return read_value_element(&mut reader, &start, true),
                Event::Eof => {
                    return Err(FormatError::decode(FORMAT, "document has no root element"));
                }
                other => {
                    return Err(FormatError::decode(
                        FORMAT,
                        format!("unexpected event before root element: {other:?}"),
                    ));
                }
            }
        }
    }
}

/// XML 格式策略。
///
/// # 契约说明（What）
/// - **build**/**parse**：委托注入的 [`XmlValueCodec`] 做整树映射；
/// - MIME 固定为 `text/xml`，参与默认集合。
#[derive(Clone)]
pub struct XmlFormatter {
    descriptor: FormatDescriptor,
    codec: Arc<dyn XmlValueCodec>,
}

impl XmlFormatter {
    /// 构建使用缺省映射的 XML 格式实例。
    pub fn new() -> Self {
        Self::with_codec(Arc::new(QuickXmlValueCodec))
    }

    /// 以注入的映射实现构建 XML 格式实例。
    pub fn with_codec(codec: Arc<dyn XmlValueCodec>) -> Self {
        Self {
            descriptor: descriptor(),
            codec,
        }
    }

    /// 返回注册中心使用的工厂。
    pub fn factory() -> Arc<dyn FormatFactory> {
        Arc::new(TypedFormatFactory::new(descriptor(), |_ctx| {
            XmlFormatter::new()
        }))
    }
}

impl Default for XmlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for XmlFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlFormatter")
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

impl Formatter for XmlFormatter {
    fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }

    fn build(&self, value: &FormatValue) -> Result<Payload, FormatError> {
        self.codec.dumps(value).map(Payload::Text)
    }

    fn parse(&self, payload: &Payload) -> Result<FormatValue, FormatError> {
        self.codec.loads(payload.as_text(FORMAT)?)
    }
}

fn descriptor() -> FormatDescriptor {
    FormatDescriptor::new(ContentType::new("text/xml"))
}

fn write_value(writer: &mut Writer<Vec<u8>>, value: &FormatValue) -> Result<(), FormatError> {
    match value {
        FormatValue::Null => {
            let mut start = BytesStart::new(VALUE_TAG);
            start.push_attribute(("type", "null"));
            writer
                .write_event(Event::Empty(start))
                .map_err(|err| FormatError::encode(FORMAT, err))
        }
        FormatValue::Bool(b) => write_scalar(writer, "bool", if *b { "true" } else { "false" }),
        FormatValue::Integer(i) => write_scalar(writer, "int", &i.to_string()),
        FormatValue::Float(f) => write_scalar(writer, "float", &f.to_string()),
        FormatValue::Text(text) => write_scalar(writer, "str", text),
        FormatValue::Bytes(bytes) => write_scalar(writer, "bytes", &hex::encode(bytes)),
        FormatValue::Timestamp(ts) => write_scalar(writer, "timestamp", &ts.to_rfc3339()),
        FormatValue::List(items) => {
            write_open(writer, "list")?;
            for item in items {
                write_value(writer, item)?;
            }
            write_close(writer)
        }
        FormatValue::Map(entries) => {
            write_open(writer, "map")?;
            for (key, item) in entries {
                let mut entry = BytesStart::new(ENTRY_TAG);
                entry.push_attribute(("key", key.as_str()));
                writer
                    .write_event(Event::Start(entry))
                    .map_err(|err| FormatError::encode(FORMAT, err))?;
                write_value(writer, item)?;
                writer
                    .write_event(Event::End(BytesEnd::new(ENTRY_TAG)))
                    .map_err(|err| FormatError::encode(FORMAT, err))?;
            }
            write_close(writer)
        }
    }
}

fn write_open(writer: &mut Writer<Vec<u8>>, ty: &str) -> Result<(), FormatError> {
    let mut start = BytesStart::new(VALUE_TAG);
    start.push_attribute(("type", ty));
    writer
        .write_event(Event::Start(start))
        .map_err(|err| FormatError::encode(FORMAT, err))
}

fn write_close(writer: &mut Writer<Vec<u8>>) -> Result<(), FormatError> {
    writer
        .write_event(Event::End(BytesEnd::new(VALUE_TAG)))
        .map_err(|err| FormatError::encode(FORMAT, err))
}

fn write_scalar(writer: &mut Writer<Vec<u8>>, ty: &str, text: &str) -> Result<(), FormatError> {
    write_open(writer, ty)?;
    if !text.is_empty() {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|err| FormatError::encode(FORMAT, err))?;
    }
    write_close(writer)
}

fn read_event<'i>(reader: &mut Reader<&'i [u8]>) -> Result<Event<'i>, FormatError> {
    reader
        .read_event()
        .map_err(|err| FormatError::decode(FORMAT, err))
}

/// 读取命名属性并返回其反转义后的文本，缺失时返回 `None`。
fn attr_string(start: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, FormatError> {
    match start
        .try_get_attribute(name)
        .map_err(|err| FormatError::decode(FORMAT, err))?
    {
        Some(attr) => attr
            .unescape_value()
            .map(|value| Some(value.into_owned()))
            .map_err(|err| FormatError::decode(FORMAT, err)),
        None => Ok(None),
    }
}

fn read_value_element(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
    is_empty: bool,
) -> Result<FormatValue, FormatError> {
    if start.name().as_ref() != VALUE_TAG.as_bytes() {
        return Err(FormatError::decode(
            FORMAT,
            format!(
                "expected `{VALUE_TAG}` element, found `{}`",
                String::from_utf8_lossy(start.name().as_ref())
            ),
        ));
    }
    let ty = attr_string(start, b"type")?.ok_or_else(|| {
        FormatError::decode(FORMAT, format!("`{VALUE_TAG}` element lacks a `type` attribute"))
    })?;

    if is_empty {
        return empty_value(&ty);
    }

    match ty.as_str() {
        "list" => read_list(reader),
        "map" => read_map(reader),
        scalar => read_scalar(reader, scalar),
    }
}

fn read_list(reader: &mut Reader<&[u8]>) -> Result<FormatValue, FormatError> {
    let mut items = Vec::new();
    loop {
        match read_event(reader)? {
            Event::Start(child) => items.push(read_value_element(reader, &child, false)?),
            Event::Empty(child) => items.push(read_value_element(reader, &child, true)?),
            Event::Text(t) => skip_whitespace(&t)?,
            Event::Comment(_) => continue,
            Event::End(end) if end.name().as_ref() == VALUE_TAG.as_bytes() => {
                return Ok(FormatValue::List(items));
            }
            Event::Eof => return Err(FormatError::decode(FORMAT, "list element is unterminated")),
            other => {
                return Err(FormatError::decode(
                    FORMAT,
                    format!("unexpected event inside list: {other:?}"),
                ));
            }
        }
    }
}

fn read_map(reader: &mut Reader<&[u8]>) -> Result<FormatValue, FormatError> {
    let mut entries = BTreeMap::new();
    loop {
        match read_event(reader)? {
            Event::Start(entry) if entry.name().as_ref() == ENTRY_TAG.as_bytes() => {
                let key = attr_string(&entry, b"key")?.ok_or_else(|| {
                    FormatError::decode(
                        FORMAT,
                        format!("`{ENTRY_TAG}` element lacks a `key` attribute"),
                    )
                })?;
                let value = read_entry_value(reader)?;
                entries.insert(key, value);
            }
            Event::Text(t) => skip_whitespace(&t)?,
            Event::Comment(_) => continue,
            Event::End(end) if end.name().as_ref() == VALUE_TAG.as_bytes() => {
                return Ok(FormatValue::Map(entries));
            }
            Event::Eof => return Err(FormatError::decode(FORMAT, "map element is unterminated")),
            other => {
                return Err(FormatError::decode(
                    FORMAT,
                    format!("unexpected event inside map: {other:?}"),
                ));
            }
        }
    }
}

/// 读取 `entry` 的唯一子取值并消费收尾标签。
fn read_entry_value(reader: &mut Reader<&[u8]>) -> Result<FormatValue, FormatError> {
    let value = loop {
        match read_event(reader)? {
            Event::Start(child) => break read_value_element(reader, &child, false)?,
            Event::Empty(child) => break read_value_element(reader, &child, true)?,
            Event::Text(t) => skip_whitespace(&t)?,
            Event::Comment(_) => continue,
            Event::Eof => {
                return Err(FormatError::decode(FORMAT, "map entry is missing its value"));
            }
            other => {
                return Err(FormatError::decode(
                    FORMAT,
                    format!("unexpected event inside map entry: {other:?}"),
                ));
            }
        }
    };
    loop {
        match read_event(reader)? {
            Event::Text(t) => skip_whitespace(&t)?,
            Event::Comment(_) => continue,
            Event::End(end) if end.name().as_ref() == ENTRY_TAG.as_bytes() => return Ok(value),
            Event::Eof => {
                return Err(FormatError::decode(FORMAT, "map entry is unterminated"));
            }
            other => {
                return Err(FormatError::decode(
                    FORMAT,
                    format!("unexpected trailing event inside map entry: {other:?}"),
                ));
            }
        }
    }
}

fn read_scalar(reader: &mut Reader<&[u8]>, ty: &str) -> Result<FormatValue, FormatError> {
    let mut text = String::new();
    loop {
        match read_event(reader)? {
            Event::Text(t) => {
                text.push_str(&t.unescape().map_err(|err| FormatError::decode(FORMAT, err))?);
            }
            Event::CData(c) => {
                let raw = c.into_inner();
                text.push_str(
                    std::str::from_utf8(&raw).map_err(|err| FormatError::decode(FORMAT, err))?,
                );
            }
            Event::Comment(_) => continue,
            Event::End(end) if end.name().as_ref() == VALUE_TAG.as_bytes() => {
                return scalar_value(ty, &text);
            }
            Event::Eof => {
                return Err(FormatError::decode(FORMAT, "scalar element is unterminated"));
            }
            other => {
                return Err(FormatError::decode(
                    FORMAT,
                    format!("unexpected event inside scalar: {other:?}"),
                ));
            }
        }
    }
}

fn empty_value(ty: &str) -> Result<FormatValue, FormatError> {
    match ty {
        "null" => Ok(FormatValue::Null),
        "str" => Ok(FormatValue::Text(String::new())),
        "list" => Ok(FormatValue::List(Vec::new())),
        "map" => Ok(FormatValue::Map(BTreeMap::new())),
        other => Err(FormatError::decode(
            FORMAT,
            format!("`{other}` value must not be an empty element"),
        )),
    }
}

fn scalar_value(ty: &str, text: &str) -> Result<FormatValue, FormatError> {
    match ty {
        "null" => {
            if text.is_empty() {
                Ok(FormatValue::Null)
            } else {
                Err(FormatError::decode(FORMAT, "null value carries text content"))
            }
        }
        "bool" => match text {
            "true" => Ok(FormatValue::Bool(true)),
            "false" => Ok(FormatValue::Bool(false)),
            other => Err(FormatError::decode(
                FORMAT,
                format!("`{other}` is not a boolean literal"),
            )),
        },
        "int" => text
            .parse::<i64>()
            .map(FormatValue::Integer)
            .map_err(|err| FormatError::decode(FORMAT, err)),
        "float" => text
            .parse::<f64>()
            .map(FormatValue::Float)
            .map_err(|err| FormatError::decode(FORMAT, err)),
        "str" => Ok(FormatValue::Text(text.to_owned())),
        "bytes" => hex::decode(text)
            .map(FormatValue::Bytes)
            .map_err(|err| FormatError::decode(FORMAT, err)),
        "timestamp" => DateTime::parse_from_rfc3339(text)
            .map(|ts| FormatValue::Timestamp(ts.with_timezone(&Utc)))
            .map_err(|err| FormatError::decode(FORMAT, err)),
        other => Err(FormatError::decode(
            FORMAT,
            format!("unknown value type `{other}`"),
        )),
    }
}

fn skip_whitespace(text: &BytesText<'_>) -> Result<(), FormatError> {
    let content = text
        .unescape()
        .map_err(|err| FormatError::decode(FORMAT, err))?;
    if content.trim().is_empty() {
        Ok(())
    } else {
        Err(FormatError::decode(
            FORMAT,
            "text content is only allowed inside scalar values",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;
    use chrono::TimeZone;

    fn sample_tree() -> FormatValue {
        let mut map = BTreeMap::new();
        map.insert("empty".to_owned(), FormatValue::Text(String::new()));
        map.insert(
            "escaped <&> text".to_owned(),
            FormatValue::text("a < b && c > d"),
        );
        map.insert("raw".to_owned(), FormatValue::Bytes(vec![0xca, 0xfe]));
        map.insert(
            "when".to_owned(),
            FormatValue::Timestamp(
                Utc.with_ymd_and_hms(2026, 7, 1, 8, 30, 0)
                    .single()
                    .expect("valid timestamp"),
            ),
        );
        map.insert(
            "rows".to_owned(),
            FormatValue::List(vec![
                FormatValue::Integer(-3),
                FormatValue::Float(2.5),
                FormatValue::Null,
                FormatValue::List(Vec::new()),
            ]),
        );
        FormatValue::Map(map)
    }

    #[test]
    fn roundtrip_preserves_full_value_domain() {
        let formatter = XmlFormatter::new();
        let value = sample_tree();
        let payload = formatter.build(&value).expect("build");
        let restored = formatter.parse(&payload).expect("parse");
        assert_eq!(restored, value);
    }

    #[test]
    fn scalar_rendering_matches_element_scheme() {
        let formatter = XmlFormatter::new();
        let payload = formatter.build(&FormatValue::Integer(7)).expect("build");
        assert_eq!(payload, Payload::text("<value type=\"int\">7</value>"));

        let payload = formatter.build(&FormatValue::Null).expect("build");
        assert_eq!(payload, Payload::text("<value type=\"null\"/>"));
    }

    #[test]
    fn map_entries_carry_keys_as_attributes() {
        let formatter = XmlFormatter::new();
        let mut map = BTreeMap::new();
        map.insert("a".to_owned(), FormatValue::Bool(true));
        let payload = formatter.build(&FormatValue::Map(map)).expect("build");
        assert_eq!(
            payload,
            Payload::text(
                "<value type=\"map\"><entry key=\"a\"><value type=\"bool\">true</value></entry></value>"
            )
        );
    }

    #[test]
    fn whitespace_between_elements_is_tolerated() {
        // Why: 手写或网关转发的文档常带缩进，结构间空白不应影响解析。
        let formatter = XmlFormatter::new();
        let document = "<value type=\"list\">\n  <value type=\"int\">1</value>\n  <value type=\"str\">two</value>\n</value>";
        let restored = formatter.parse(&Payload::text(document)).expect("parse");
        assert_eq!(
            restored,
            FormatValue::List(vec![FormatValue::Integer(1), FormatValue::text("two")])
        );
    }

    #[test]
    fn malformed_documents_surface_decode_errors() {
        let formatter = XmlFormatter::new();
        for document in [
            "",
            "<value type=\"map\">",
            "<value>7</value>",
            "<value type=\"int\">seven</value>",
            "<value type=\"rgb\">1</value>",
            "<other/>",
        ] {
            let err = formatter
                .parse(&Payload::text(document))
                .expect_err("malformed document");
            assert_eq!(err.code(), codes::DECODE, "document: {document:?}");
        }
    }

    #[test]
    fn injected_codec_replaces_the_default_mapping() {
        struct UpperCodec;

        impl XmlValueCodec for UpperCodec {
            fn dumps(&self, _value: &FormatValue) -> Result<String, FormatError> {
                Ok("<UPPER/>".to_owned())
            }

            fn loads(&self, text: &str) -> Result<FormatValue, FormatError> {
                Ok(FormatValue::text(text.to_uppercase()))
            }
        }

        let formatter = XmlFormatter::with_codec(Arc::new(UpperCodec));
        let payload = formatter.build(&FormatValue::Null).expect("build");
        assert_eq!(payload, Payload::text("<UPPER/>"));
        let restored = formatter.parse(&Payload::text("abc")).expect("parse");
        assert_eq!(restored, FormatValue::text("ABC"));
    }

    #[test]
    fn descriptor_declares_xml_mime() {
        let formatter = XmlFormatter::new();
        assert_eq!(formatter.descriptor().content_type().as_str(), "text/xml");
        assert!(formatter.descriptor().active_by_default());
    }
}
