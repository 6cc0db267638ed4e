//! Parsing of the NameNode `/jmx` document.
//!
//! The servlet returns `{"beans": [...]}` where every bean has a different set
//! of attributes, so the body is kept as an untyped [`serde_json::Value`] tree
//! and every lookup is checked.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::{DocumentError, FieldError};

/// `name` of the bean carrying the filesystem namespace metrics.
pub const FS_NAMESYSTEM_BEAN: &str = "Hadoop:service=NameNode,name=FSNamesystem";

const BEANS_KEY: &str = "beans";
const NAME_KEY: &str = "name";

/// The FSNamesystem attributes republished as gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeanField {
    MissingBlocks,
    CapacityTotal,
    BlocksTotal,
}

impl BeanField {
    pub const ALL: [BeanField; 3] = [
        BeanField::MissingBlocks,
        BeanField::CapacityTotal,
        BeanField::BlocksTotal,
    ];

    /// Attribute name in the bean, also used as the metric name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BeanField::MissingBlocks => "MissingBlocks",
            BeanField::CapacityTotal => "CapacityTotal",
            BeanField::BlocksTotal => "BlocksTotal",
        }
    }
}

impl fmt::Display for BeanField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values read from one FSNamesystem bean.
///
/// `values` holds the attributes that were present and numeric, `errors` the
/// ones that were not. Every [`BeanField`] ends up in exactly one of the two.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FsNamesystemReading {
    pub values: Vec<(BeanField, f64)>,
    pub errors: Vec<FieldError>,
}

impl FsNamesystemReading {
    pub fn value(&self, field: BeanField) -> Option<f64> {
        self.values
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| *value)
    }

    /// Reads every [`BeanField`] from a bean.
    pub fn from_bean(bean: &Map<String, Value>) -> Self {
        let mut reading = FsNamesystemReading::default();
        for field in BeanField::ALL {
            match read_number(bean, field) {
                Ok(value) => reading.values.push((field, value)),
                Err(e) => reading.errors.push(e),
            }
        }
        reading
    }
}

/// Parses a JMX body and reads the FSNamesystem bean out of it.
///
/// Returns `Ok(None)` when the document is well formed but carries no
/// FSNamesystem bean. When the bean shows up more than once, the last one wins.
pub fn extract_fs_namesystem(body: &str) -> Result<Option<FsNamesystemReading>, DocumentError> {
    let document: Value = serde_json::from_str(body)?;
    let beans = beans(&document)?;
    Ok(find_bean(beans, FS_NAMESYSTEM_BEAN).map(FsNamesystemReading::from_bean))
}

/// Returns the bean list of a JMX document.
pub fn beans(document: &Value) -> Result<&[Value], DocumentError> {
    let root = document.as_object().ok_or(DocumentError::NotAnObject)?;
    let beans = root.get(BEANS_KEY).ok_or(DocumentError::MissingBeans)?;
    beans
        .as_array()
        .map(Vec::as_slice)
        .ok_or(DocumentError::BeansNotAList)
}

/// Finds the last bean whose `name` equals `name`. Entries that are not
/// objects are skipped.
pub fn find_bean<'a>(beans: &'a [Value], name: &str) -> Option<&'a Map<String, Value>> {
    beans
        .iter()
        .rev()
        .filter_map(Value::as_object)
        .find(|bean| bean.get(NAME_KEY).and_then(Value::as_str) == Some(name))
}

fn read_number(bean: &Map<String, Value>, field: BeanField) -> Result<f64, FieldError> {
    let value = bean
        .get(field.as_str())
        .ok_or(FieldError::Missing(field))?;
    value.as_f64().ok_or(FieldError::NotNumeric {
        field,
        found: json_type(value),
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
