//! Qt Creator persistent settings XML.
//!
//! Reads and writes the `<qtcreator>` document format shared with the SDK
//! installer:
//!
//! ```text
//! <qtcreator>
//!  <data>
//!   <variable>FileVersion</variable>
//!   <value type="int">1</value>
//!  </data>
//!  <data>
//!   <variable>Sdk0</variable>
//!   <valuemap type="QVariantMap">
//!    <value type="QString" key="MerSDK.Host">localhost</value>
//!    <valuelist type="QVariantList" key="MerSDK.Targets">...</valuelist>
//!   </valuemap>
//!  </data>
//! </qtcreator>
//! ```

use super::error::SettingsError;
use super::variant::{Value, ValueMap};
use chrono::Local;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Write;

const ROOT: &str = "qtcreator";

/// Open container while parsing
#[derive(Debug)]
enum Frame {
    List {
        key: Option<String>,
        items: Vec<Value>,
    },
    Map {
        key: Option<String>,
        entries: ValueMap,
    },
}

/// Parser state for the current `<data>` block
#[derive(Debug, Default)]
struct ParserState {
    seen_root: bool,
    variable: Option<String>,
    data_value: Option<Value>,
    scalar: Option<(Option<String>, String)>,
    stack: Vec<Frame>,
}

impl ParserState {
    fn finish_value(&mut self, key: Option<String>, value: Value) {
        match self.stack.last_mut() {
            Some(Frame::List { items, .. }) => items.push(value),
            Some(Frame::Map { entries, .. }) => match key {
                Some(k) => {
                    entries.insert(k, value);
                }
                None => tracing::warn!("settings map entry without key dropped"),
            },
            None => self.data_value = Some(value),
        }
    }

    fn close_frame(&mut self) {
        if let Some(frame) = self.stack.pop() {
            let (key, value) = match frame {
                Frame::List { key, items } => (key, Value::List(items)),
                Frame::Map { key, entries } => (key, Value::Map(entries)),
            };
            self.finish_value(key, value);
        }
    }
}

/// Parse a persistent settings document into its top-level variables.
pub fn parse_persistent_settings(xml: &str) -> Result<ValueMap, SettingsError> {
    let mut reader = Reader::from_str(xml);

    let mut result = ValueMap::new();
    let mut state = ParserState::default();
    let mut text_buf = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    ROOT => state.seen_root = true,
                    "data" => {
                        state.variable = None;
                        state.data_value = None;
                    }
                    "value" => {
                        state.scalar = Some((
                            get_attribute(e, "key"),
                            get_attribute(e, "type").unwrap_or_default(),
                        ));
                    }
                    "valuelist" => state.stack.push(Frame::List {
                        key: get_attribute(e, "key"),
                        items: Vec::new(),
                    }),
                    "valuemap" => state.stack.push(Frame::Map {
                        key: get_attribute(e, "key"),
                        entries: ValueMap::new(),
                    }),
                    _ => {}
                }
                text_buf.clear();
            }
            Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let key = get_attribute(e, "key");
                match name.as_str() {
                    "value" => {
                        let ty = get_attribute(e, "type").unwrap_or_default();
                        state.finish_value(key, scalar_value(&ty, ""));
                    }
                    "valuelist" => state.finish_value(key, Value::List(Vec::new())),
                    "valuemap" => state.finish_value(key, Value::Map(ValueMap::new())),
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    "variable" => state.variable = Some(text_buf.clone()),
                    "value" => {
                        if let Some((key, ty)) = state.scalar.take() {
                            state.finish_value(key, scalar_value(&ty, &text_buf));
                        }
                    }
                    "valuelist" | "valuemap" => state.close_frame(),
                    "data" => {
                        match (state.variable.take(), state.data_value.take()) {
                            (Some(variable), Some(value)) => {
                                result.insert(variable, value);
                            }
                            (variable, _) => {
                                tracing::warn!(?variable, "incomplete settings data block ignored")
                            }
                        }
                        state.stack.clear();
                    }
                    _ => {}
                }
                text_buf.clear();
            }
            Ok(Event::Text(ref e)) => {
                text_buf.push_str(&e.unescape().unwrap_or_default());
            }
            Ok(Event::CData(ref e)) => {
                text_buf.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SettingsError::Xml(e)),
            _ => {}
        }
    }

    if !state.seen_root {
        return Err(SettingsError::InvalidFormat(format!(
            "missing <{}> root element",
            ROOT
        )));
    }

    Ok(result)
}

/// Write top-level variables as a persistent settings document.
pub fn write_persistent_settings(values: &ValueMap, doctype: &str) -> Result<String, SettingsError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 1);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped(doctype)))?;
    let comment = format!(
        " Written by mersdk-core {}, {}. ",
        crate::VERSION,
        Local::now().format("%Y-%m-%dT%H:%M:%S")
    );
    writer.write_event(Event::Comment(BytesText::new(&comment)))?;
    writer.write_event(Event::Start(BytesStart::new(ROOT)))?;

    for (variable, value) in values {
        writer.write_event(Event::Start(BytesStart::new("data")))?;
        writer.write_event(Event::Start(BytesStart::new("variable")))?;
        writer.write_event(Event::Text(BytesText::new(variable)))?;
        writer.write_event(Event::End(BytesEnd::new("variable")))?;
        write_value(&mut writer, None, value)?;
        writer.write_event(Event::End(BytesEnd::new("data")))?;
    }

    writer.write_event(Event::End(BytesEnd::new(ROOT)))?;

    let result = writer.into_inner();
    let mut xml = String::from_utf8_lossy(&result).to_string();
    xml.push('\n');
    Ok(xml)
}

fn write_value<W: Write>(
    writer: &mut Writer<W>,
    key: Option<&str>,
    value: &Value,
) -> Result<(), SettingsError> {
    let tag = match value {
        Value::List(_) => "valuelist",
        Value::Map(_) => "valuemap",
        _ => "value",
    };
    let mut elem = BytesStart::new(tag);
    elem.push_attribute(("type", value.type_name()));
    if let Some(k) = key {
        elem.push_attribute(("key", k));
    }

    match value {
        Value::List(items) if items.is_empty() => writer.write_event(Event::Empty(elem))?,
        Value::List(items) => {
            writer.write_event(Event::Start(elem))?;
            for item in items {
                write_value(writer, None, item)?;
            }
            writer.write_event(Event::End(BytesEnd::new(tag)))?;
        }
        Value::Map(entries) if entries.is_empty() => writer.write_event(Event::Empty(elem))?,
        Value::Map(entries) => {
            writer.write_event(Event::Start(elem))?;
            for (k, v) in entries {
                write_value(writer, Some(k), v)?;
            }
            writer.write_event(Event::End(BytesEnd::new(tag)))?;
        }
        scalar => {
            let text = scalar_text(scalar);
            if text.is_empty() {
                writer.write_event(Event::Empty(elem))?;
            } else {
                writer.write_event(Event::Start(elem))?;
                writer.write_event(Event::Text(BytesText::new(&text)))?;
                writer.write_event(Event::End(BytesEnd::new(tag)))?;
            }
        }
    }

    Ok(())
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Int(i) => i.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::List(_) | Value::Map(_) => String::new(),
    }
}

fn scalar_value(ty: &str, text: &str) -> Value {
    match ty {
        "int" | "uint" | "qlonglong" | "qulonglong" => match text.trim().parse() {
            Ok(i) => Value::Int(i),
            Err(_) => Value::String(text.to_string()),
        },
        "bool" => match text.trim() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(text.to_string()),
        },
        _ => Value::String(text.to_string()),
    }
}

fn get_attribute(e: &BytesStart, name: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name.as_bytes() {
            return attr
                .unescape_value()
                .ok()
                .map(|v| v.to_string())
                .or_else(|| Some(String::from_utf8_lossy(&attr.value).to_string()));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE MerSDKs>
<!-- Written by QtCreator 3.0.1, 2014-03-05T10:00:00. -->
<qtcreator>
 <data>
  <variable>FileVersion</variable>
  <value type="int">1</value>
 </data>
 <data>
  <variable>InstallDir</variable>
  <value type="QString">/opt/SailfishOS</value>
 </data>
 <data>
  <variable>Sdk0</variable>
  <valuemap type="QVariantMap">
   <value type="bool" key="MerSDK.Headless">true</value>
   <value type="QString" key="MerSDK.Host">localhost</value>
   <value type="QString" key="MerSDK.SharedSrc"/>
   <valuelist type="QVariantList" key="MerSDK.Targets">
    <value type="QString">SailfishOS-armv7hl</value>
    <value type="QString">SailfishOS-i486</value>
   </valuelist>
   <value type="int" key="MerSDK.SshPort">2222</value>
  </valuemap>
 </data>
</qtcreator>
"#;

    #[test]
    fn test_parse_sample() {
        let values = parse_persistent_settings(SAMPLE).unwrap();
        assert_eq!(values.get("FileVersion"), Some(&Value::Int(1)));
        assert_eq!(
            values.get("InstallDir"),
            Some(&Value::String("/opt/SailfishOS".to_string()))
        );

        let sdk = values.get("Sdk0").and_then(Value::as_map).unwrap();
        assert_eq!(sdk.get("MerSDK.Headless"), Some(&Value::Bool(true)));
        assert_eq!(sdk.get("MerSDK.SshPort"), Some(&Value::Int(2222)));
        assert_eq!(sdk.get("MerSDK.SharedSrc"), Some(&Value::String(String::new())));
        assert_eq!(
            sdk.get("MerSDK.Targets").and_then(Value::to_string_list),
            Some(vec![
                "SailfishOS-armv7hl".to_string(),
                "SailfishOS-i486".to_string()
            ])
        );
    }

    #[test]
    fn test_write_then_parse_preserves_values() {
        let mut inner = ValueMap::new();
        inner.insert("name".to_string(), Value::from("a < b & \"c\""));
        inner.insert("empty".to_string(), Value::List(Vec::new()));
        inner.insert("nested".to_string(), Value::Map(ValueMap::new()));

        let mut values = ValueMap::new();
        values.insert("FileVersion".to_string(), Value::Int(1));
        values.insert("Flag".to_string(), Value::Bool(false));
        values.insert("Sdk0".to_string(), Value::Map(inner));

        let xml = write_persistent_settings(&values, "MerSDKs").unwrap();
        assert!(xml.contains("DOCTYPE") && xml.contains("MerSDKs"));
        assert!(xml.contains("Written by mersdk-core"));

        assert_eq!(parse_persistent_settings(&xml).unwrap(), values);
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let result = parse_persistent_settings("<settings><data/></settings>");
        assert!(matches!(result, Err(SettingsError::InvalidFormat(_))));
    }

    #[test]
    fn test_broken_xml_is_an_error() {
        let result = parse_persistent_settings("<qtcreator><data><variable>x</data>");
        assert!(result.is_err());
    }
}
