use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::{Number, Value};

use crate::{Error, Result};

/// A file-like value sent as one part of a multipart body.
pub struct Upload {
    reader: Box<dyn Read + Send>,
    file_name: Option<String>,
}

impl Upload {
    pub fn new<R>(reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        Upload {
            reader: Box::new(reader),
            file_name: None,
        }
    }

    /// Opens `path` and names the part after its file name.
    pub fn from_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let upload = Upload::new(File::open(path)?);
        Ok(match path.file_name() {
            Some(name) => upload.file_name(name.to_string_lossy()),
            None => upload,
        })
    }

    pub fn file_name<T: Into<String>>(self, file_name: T) -> Self {
        Upload {
            file_name: Some(file_name.into()),
            ..self
        }
    }

    pub(crate) fn into_parts(self) -> (Box<dyn Read + Send>, Option<String>) {
        (self.reader, self.file_name)
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// A single request parameter value.
#[derive(Debug)]
pub enum ParamValue {
    Text(String),
    Number(Number),
    Bool(bool),
    File(Upload),
    /// Anything else; rejected by [`classify`].
    Unsupported(Value),
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ParamValue {
                fn from(v: $t) -> Self {
                    ParamValue::Number(Number::from(v))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        match Number::from_f64(v) {
            Some(n) => ParamValue::Number(n),
            None => ParamValue::Unsupported(Value::Null),
        }
    }
}

impl From<Upload> for ParamValue {
    fn from(v: Upload) -> Self {
        ParamValue::File(v)
    }
}

impl From<File> for ParamValue {
    fn from(v: File) -> Self {
        ParamValue::File(Upload::new(v))
    }
}

impl From<Value> for ParamValue {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => ParamValue::Text(s),
            Value::Number(n) => ParamValue::Number(n),
            Value::Bool(b) => ParamValue::Bool(b),
            other => ParamValue::Unsupported(other),
        }
    }
}

/// Caller-supplied request parameters, keyed by name.
#[derive(Debug, Default)]
pub struct Params {
    inner: BTreeMap<String, ParamValue>,
}

impl Params {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds (or replaces) a parameter.
    pub fn insert<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.inner.insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K, V> std::iter::FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Params {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parameters split into plain form fields and file uploads.
#[derive(Debug, Default)]
pub struct ClassifiedParams {
    pub fields: BTreeMap<String, String>,
    pub files: BTreeMap<String, Upload>,
}

/// Splits `params` into fields and files.
///
/// Numbers render as plain decimal text and booleans as `true`/`false`.
/// Fails with [`Error::InvalidParameterType`] on the first unsupported value.
pub fn classify(params: Params) -> Result<ClassifiedParams> {
    let mut classified = ClassifiedParams::default();
    for (key, value) in params.inner {
        match value {
            ParamValue::File(upload) => {
                classified.files.insert(key, upload);
            }
            ParamValue::Text(s) => {
                classified.fields.insert(key, s);
            }
            ParamValue::Number(n) => {
                classified.fields.insert(key, n.to_string());
            }
            ParamValue::Bool(b) => {
                let rendered = if b { "true" } else { "false" };
                classified.fields.insert(key, rendered.to_string());
            }
            ParamValue::Unsupported(_) => return Err(Error::InvalidParameterType { key }),
        }
    }
    Ok(classified)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use serde_json::json;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn every_key_lands_in_exactly_one_side() {
        let params = Params::new()
            .insert("type", "photo")
            .insert("caption", String::from("hello"))
            .insert("offset", 20)
            .insert("tweet", false)
            .insert("data", Upload::new(Cursor::new(b"png".to_vec())));

        let classified = classify(params).unwrap();

        assert_eq!(classified.fields.len() + classified.files.len(), 5);
        for key in &["type", "caption", "offset", "tweet"] {
            assert!(classified.fields.contains_key(*key));
            assert!(!classified.files.contains_key(*key));
        }
        assert!(classified.files.contains_key("data"));
        assert!(!classified.fields.contains_key("data"));
    }

    #[test]
    fn booleans_render_lowercase() {
        let classified = classify(Params::new().insert("a", true).insert("b", false)).unwrap();
        assert_eq!(classified.fields["a"], "true");
        assert_eq!(classified.fields["b"], "false");
    }

    #[test]
    fn numbers_render_as_decimal_text() {
        let classified = classify(
            Params::new()
                .insert("limit", 50u32)
                .insert("before", -7i64)
                .insert("ratio", 0.5f64),
        )
        .unwrap();
        assert_eq!(classified.fields["limit"], "50");
        assert_eq!(classified.fields["before"], "-7");
        assert_eq!(classified.fields["ratio"], "0.5");
    }

    #[test]
    fn json_values_map_to_kinds() {
        let params: Params = vec![
            ("state", json!("draft")),
            ("limit", json!(3)),
            ("native_inline_images", json!(true)),
        ]
        .into_iter()
        .collect();
        let classified = classify(params).unwrap();
        assert_eq!(classified.fields["state"], "draft");
        assert_eq!(classified.fields["limit"], "3");
        assert_eq!(classified.fields["native_inline_images"], "true");
    }

    #[test]
    fn unsupported_value_is_rejected() {
        let params = Params::new()
            .insert("title", "ok")
            .insert("tags", json!(["a", "b"]));
        let err = classify(params).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameterType);
        match err {
            Error::InvalidParameterType { key } => assert_eq!(key, "tags"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn non_finite_float_is_rejected() {
        let err = classify(Params::new().insert("x", f64::NAN)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameterType);
    }

    #[test]
    fn empty_params_classify_to_nothing() {
        let classified = classify(Params::new()).unwrap();
        assert!(classified.fields.is_empty());
        assert!(classified.files.is_empty());
    }
}
