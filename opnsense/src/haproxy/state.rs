//! Typed access to planned and prior state objects.

use std::collections::BTreeSet;
use tfplug::types::{AttributePath, Dynamic, DynamicValue};

use super::decoder::CodecError;

/// Reads model fields out of a state object. Unknown or missing values are
/// errors: by apply time every attribute the model needs has been planned.
pub struct StateReader<'a> {
    state: &'a DynamicValue,
}

impl<'a> StateReader<'a> {
    pub fn new(state: &'a DynamicValue) -> Self {
        Self { state }
    }

    pub fn string(&self, name: &str) -> Result<String, CodecError> {
        let path = self.known(name)?;
        self.state
            .get_string(&path)
            .map_err(|source| invalid(name, source))
    }

    pub fn bool(&self, name: &str) -> Result<bool, CodecError> {
        let path = self.known(name)?;
        self.state
            .get_bool(&path)
            .map_err(|source| invalid(name, source))
    }

    pub fn int64(&self, name: &str) -> Result<i64, CodecError> {
        let path = self.known(name)?;
        self.state
            .get_i64(&path)
            .map_err(|source| invalid(name, source))
    }

    pub fn set(&self, name: &str) -> Result<BTreeSet<String>, CodecError> {
        let path = self.known(name)?;
        self.state
            .get_string_set(&path)
            .map_err(|source| invalid(name, source))
    }

    /// The `id` attribute, if the object has been created.
    pub fn id(&self) -> Option<String> {
        self.state
            .attribute("id")
            .and_then(Dynamic::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }

    fn known(&self, name: &str) -> Result<AttributePath, CodecError> {
        match self.state.attribute(name) {
            None | Some(Dynamic::Null) => Err(CodecError::MissingAttribute(name.to_string())),
            Some(Dynamic::Unknown) => Err(CodecError::UnknownValue(name.to_string())),
            Some(_) => Ok(AttributePath::new(name)),
        }
    }
}

fn invalid(name: &str, source: tfplug::TfplugError) -> CodecError {
    CodecError::InvalidAttribute {
        attribute: name.to_string(),
        source,
    }
}

/// Builds a state object one attribute at a time.
pub struct StateWriter {
    state: DynamicValue,
}

impl StateWriter {
    pub fn new() -> Self {
        Self {
            state: DynamicValue::object(),
        }
    }

    pub fn string(mut self, name: &str, value: &str) -> Result<Self, CodecError> {
        self.put(name, Dynamic::String(value.to_string()))?;
        Ok(self)
    }

    pub fn bool(mut self, name: &str, value: bool) -> Result<Self, CodecError> {
        self.put(name, Dynamic::Bool(value))?;
        Ok(self)
    }

    pub fn int64(mut self, name: &str, value: i64) -> Result<Self, CodecError> {
        self.put(name, Dynamic::Number(value as f64))?;
        Ok(self)
    }

    pub fn set(mut self, name: &str, value: &BTreeSet<String>) -> Result<Self, CodecError> {
        self.put(name, Dynamic::string_list(value.iter().cloned()))?;
        Ok(self)
    }

    pub fn finish(self) -> DynamicValue {
        self.state
    }

    fn put(&mut self, name: &str, value: Dynamic) -> Result<(), CodecError> {
        self.state
            .set_value(&AttributePath::new(name), value)
            .map_err(|source| invalid(name, source))
    }
}

impl Default for StateWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_and_reader_agree() {
        let set: BTreeSet<String> = ["a".to_string(), "b".to_string()].into();
        let state = StateWriter::new()
            .string("id", "uuid-1")
            .unwrap()
            .string("name", "web")
            .unwrap()
            .bool("enabled", true)
            .unwrap()
            .int64("port", -1)
            .unwrap()
            .set("bind", &set)
            .unwrap()
            .finish();

        let reader = StateReader::new(&state);
        assert_eq!(reader.id().as_deref(), Some("uuid-1"));
        assert_eq!(reader.string("name").unwrap(), "web");
        assert!(reader.bool("enabled").unwrap());
        assert_eq!(reader.int64("port").unwrap(), -1);
        assert_eq!(reader.set("bind").unwrap(), set);
    }

    #[test]
    fn reader_reports_missing_and_unknown() {
        let mut state = DynamicValue::object();
        state
            .set_value(&AttributePath::new("id"), Dynamic::Unknown)
            .unwrap();
        let reader = StateReader::new(&state);

        assert!(reader.id().is_none());
        assert!(matches!(
            reader.string("id"),
            Err(CodecError::UnknownValue(name)) if name == "id"
        ));
        assert!(matches!(
            reader.string("name"),
            Err(CodecError::MissingAttribute(name)) if name == "name"
        ));
    }

    #[test]
    fn reader_propagates_set_element_errors() {
        let mut state = DynamicValue::object();
        state
            .set_list(
                &AttributePath::new("bind"),
                vec![Dynamic::String("0.0.0.0:80".into()), Dynamic::Number(1.0)],
            )
            .unwrap();

        let err = StateReader::new(&state).set("bind").unwrap_err();
        assert!(matches!(err, CodecError::InvalidAttribute { ref attribute, .. } if attribute == "bind"));
    }

    #[test]
    fn reader_rejects_wrong_container() {
        let mut state = DynamicValue::object();
        state
            .set_string(&AttributePath::new("bind"), "0.0.0.0:80")
            .unwrap();
        assert!(StateReader::new(&state).set("bind").is_err());
    }
}
