use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::AppResult;

/// Converts a value into the text carried by a workflow command.
///
/// Strings pass through untouched, `null` becomes empty, and everything else
/// is rendered as compact JSON.
pub fn to_command_value<T: Serialize + ?Sized>(value: &T) -> AppResult<String> {
    Ok(match serde_json::to_value(value)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

pub fn escape_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

pub fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// Ordered `key=value` pairs attached to an inline command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandProperties(Vec<(String, String)>);

impl CommandProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: &str) -> Self {
        Self::new().with("name", name)
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.push((key.to_string(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|(_, value)| value.is_empty())
    }
}

/// A single `::command key=value::message` line.
#[derive(Debug, Clone)]
pub struct Command<'a> {
    pub name: &'a str,
    pub properties: CommandProperties,
    pub message: &'a str,
}

impl<'a> Command<'a> {
    pub fn new(name: &'a str, properties: CommandProperties, message: &'a str) -> Self {
        Self {
            name,
            properties,
            message,
        }
    }
}

impl fmt::Display for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "::{}", self.name)?;

        if !self.properties.is_empty() {
            f.write_str(" ")?;
            let rendered = self
                .properties
                .0
                .iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(key, value)| format!("{key}={}", escape_property(value)))
                .collect::<Vec<_>>();
            f.write_str(&rendered.join(","))?;
        }

        write!(f, "::{}", escape_data(self.message))
    }
}

/// Location and title attached to `error`, `warning` and `notice` annotations.
#[derive(Debug, Clone, Default)]
pub struct AnnotationProperties {
    pub title: Option<String>,
    pub file: Option<String>,
    pub start_line: Option<u32>,
    pub end_line: Option<u32>,
    pub start_column: Option<u32>,
    pub end_column: Option<u32>,
}

impl AnnotationProperties {
    pub fn to_command_properties(&self) -> CommandProperties {
        let mut properties = CommandProperties::new();
        if let Some(title) = &self.title {
            properties = properties.with("title", title.as_str());
        }
        if let Some(file) = &self.file {
            properties = properties.with("file", file.as_str());
        }

        let numbers = [
            ("line", self.start_line),
            ("endLine", self.end_line),
            ("col", self.start_column),
            ("endColumn", self.end_column),
        ];
        for (key, value) in numbers {
            if let Some(value) = value {
                properties = properties.with(key, value.to_string());
            }
        }
        properties
    }
}
