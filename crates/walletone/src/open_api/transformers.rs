//!
//! Response body decoding: content type sniffing and XML to generic mapping conversion.
//!

use error_stack::{report, ResultExt};
use quick_xml::{events::Event, Reader};
use serde_json::{Map, Value};

use crate::errors::{CustomResult, ParsingError};

/// Key of the text of an element that also has attributes or children.
pub const XML_TEXT_KEY: &str = "#text";
const ARRAY_ROOT_PREFIX: &str = "ArrayOf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Xml,
    Json,
}

impl BodyFormat {
    /// Picks the decoder from a `Content-Type` header value. XML wins when both words appear.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("xml") {
            Some(Self::Xml)
        } else if content_type.contains("json") {
            Some(Self::Json)
        } else {
            None
        }
    }

    pub fn parse(self, body: &str) -> CustomResult<Value, ParsingError> {
        match self {
            Self::Json => serde_json::from_str(body)
                .change_context(ParsingError)
                .attach_printable("Unable to parse the JSON body"),
            Self::Xml => xml_to_value(body),
        }
    }
}

#[derive(Default)]
struct Element {
    name: String,
    fields: Map<String, Value>,
    text: String,
    /// Marked with `nil="true"` under any prefix, the DataContract form of null.
    nil: bool,
}

impl Element {
    fn into_value(self) -> Value {
        if self.nil {
            return Value::Null;
        }
        match (self.fields.is_empty(), self.text.is_empty()) {
            (true, true) => Value::Null,
            (true, false) => Value::String(self.text),
            (false, text_is_empty) => {
                let mut fields = self.fields;
                if !text_is_empty {
                    fields.insert(XML_TEXT_KEY.to_string(), Value::String(self.text));
                }
                Value::Object(fields)
            }
        }
    }

    /// Repeated child names collect into an array.
    fn add_child(&mut self, name: String, value: Value) {
        match self.fields.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.fields.insert(name, value);
            }
        }
    }
}

fn open_element(start: &quick_xml::events::BytesStart<'_>) -> CustomResult<Element, ParsingError> {
    let mut element = Element {
        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        ..Default::default()
    };
    for attribute in start.attributes() {
        let attribute = attribute
            .change_context(ParsingError)
            .attach_printable("Malformed XML attribute")?;
        let key = attribute.key;
        let value = attribute
            .unescape_value()
            .change_context(ParsingError)?
            .into_owned();

        if key.local_name().as_ref() == b"nil" {
            element.nil = value.trim() == "true";
            continue;
        }
        // Namespace declarations and schema attributes such as `i:type` carry no data.
        if key.as_namespace_binding().is_some() || key.prefix().is_some() {
            continue;
        }
        element.fields.insert(
            String::from_utf8_lossy(key.as_ref()).into_owned(),
            Value::String(value),
        );
    }
    Ok(element)
}

/// Converts an XML document into a generic mapping.
///
/// The root element is unwrapped: `<Balance><Amount>1</Amount></Balance>` becomes
/// `{"Amount": "1"}`. A root named `ArrayOf*` becomes the list of its children. Text stays text,
/// empty elements and elements marked `nil="true"` become `null`. Prefixed attributes are dropped.
pub fn xml_to_value(body: &str) -> CustomResult<Value, ParsingError> {
    let mut reader = Reader::from_str(body);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let event = reader
            .read_event()
            .change_context(ParsingError)
            .attach_printable_lazy(|| {
                format!("Malformed XML at position {}", reader.buffer_position())
            })?;

        match event {
            Event::Start(start) => stack.push(open_element(&start)?),
            Event::Empty(start) => {
                let element = open_element(&start)?;
                close_element(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| report!(ParsingError))
                    .attach_printable("Closing tag without an opening one")?;
                close_element(element, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                if let Some(element) = stack.last_mut() {
                    element
                        .text
                        .push_str(&text.unescape().change_context(ParsingError)?);
                }
            }
            Event::CData(data) => {
                if let Some(element) = stack.last_mut() {
                    element.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => {}
        }
    }

    if !stack.is_empty() {
        return Err(report!(ParsingError)).attach_printable("Unclosed XML elements");
    }

    let (name, value) = root
        .ok_or_else(|| report!(ParsingError))
        .attach_printable("XML document without a root element")?;

    Ok(if name.starts_with(ARRAY_ROOT_PREFIX) {
        into_list(value)
    } else {
        value
    })
}

fn close_element(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<(String, Value)>,
) -> CustomResult<(), ParsingError> {
    let name = element.name.clone();
    let value = element.into_value();
    match stack.last_mut() {
        Some(parent) => parent.add_child(name, value),
        None if root.is_none() => *root = Some((name, value)),
        None => {
            return Err(report!(ParsingError)).attach_printable("More than one XML root element")
        }
    }
    Ok(())
}

fn into_list(value: Value) -> Value {
    match value {
        Value::Null => Value::Array(Vec::new()),
        Value::Object(fields) if fields.len() == 1 => match fields.into_iter().next() {
            Some((_, Value::Array(items))) => Value::Array(items),
            Some((_, item)) => Value::Array(vec![item]),
            None => Value::Array(Vec::new()),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn content_type_sniffing() {
        assert_eq!(
            BodyFormat::from_content_type("application/json; charset=utf-8"),
            Some(BodyFormat::Json)
        );
        assert_eq!(
            BodyFormat::from_content_type("application/vnd.wallet.openapi.v1+json"),
            Some(BodyFormat::Json)
        );
        assert_eq!(BodyFormat::from_content_type("Text/XML"), Some(BodyFormat::Xml));
        assert_eq!(BodyFormat::from_content_type("text/plain"), None);
        assert_eq!(BodyFormat::from_content_type(""), None);
    }

    #[test]
    fn root_element_is_unwrapped() {
        let value = xml_to_value(
            r#"<?xml version="1.0" encoding="utf-8"?>
            <Balance xmlns="http://schemas.datacontract.org/2004/07/W1">
                <UserId>123456</UserId>
                <CurrencyId>643</CurrencyId>
                <Amount>100</Amount>
                <UpdateDate/>
            </Balance>"#,
        )
        .unwrap();

        assert_eq!(
            value,
            json!({
                "UserId": "123456",
                "CurrencyId": "643",
                "Amount": "100",
                "UpdateDate": null,
            })
        );
    }

    #[test]
    fn array_root_becomes_a_list() {
        let value = xml_to_value(
            "<ArrayOfBalance>\
                <Balance><CurrencyId>643</CurrencyId></Balance>\
                <Balance><CurrencyId>840</CurrencyId></Balance>\
            </ArrayOfBalance>",
        )
        .unwrap();
        assert_eq!(value, json!([{ "CurrencyId": "643" }, { "CurrencyId": "840" }]));

        let single = xml_to_value(
            "<ArrayOfBalance><Balance><CurrencyId>643</CurrencyId></Balance></ArrayOfBalance>",
        )
        .unwrap();
        assert_eq!(single, json!([{ "CurrencyId": "643" }]));

        assert_eq!(xml_to_value("<ArrayOfBalance/>").unwrap(), json!([]));
    }

    #[test]
    fn nil_elements_become_null() {
        let value = xml_to_value(
            r#"<Balance xmlns="http://schemas.datacontract.org/2004/07/W1" xmlns:i="http://www.w3.org/2001/XMLSchema-instance">
                <CurrencyId>643</CurrencyId>
                <Amount>100</Amount>
                <HoldAmount i:nil="true"/>
                <Overdraft xsi:nil="true"></Overdraft>
                <SafeAmount i:type="d:decimal">5</SafeAmount>
            </Balance>"#,
        )
        .unwrap();

        assert_eq!(
            value,
            json!({
                "CurrencyId": "643",
                "Amount": "100",
                "HoldAmount": null,
                "Overdraft": null,
                "SafeAmount": "5",
            })
        );

        let balance = crate::entities::BalanceResponse::from_value(value)
            .unwrap()
            .into_vec()
            .pop()
            .unwrap();
        assert_eq!(balance.amount, Some(rust_decimal::Decimal::from(100)));
        assert_eq!(balance.hold_amount, None);
    }

    #[test]
    fn attributes_and_entities() {
        let value =
            xml_to_value(r#"<Error code="42"><Message>a &amp; b</Message></Error>"#).unwrap();
        assert_eq!(value, json!({ "code": "42", "Message": "a & b" }));
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(xml_to_value("<Balance><Amount>1</Balance>").is_err());
        assert!(xml_to_value("<Balance><Amount>1</Amount>").is_err());
        assert!(xml_to_value("").is_err());
        assert!(xml_to_value("not xml at all").is_err());
        assert!(BodyFormat::Json.parse("{\"Amount\":").is_err());
    }
}
