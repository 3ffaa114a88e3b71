use super::{ComposerExt, TypeComposer};
use crate::{Result, ScalarFn, ScalarTypeId, SchemaComposer};

#[derive(Debug)]
pub struct ScalarTypeComposer<'a> {
    sc: &'a mut SchemaComposer,
    id: ScalarTypeId,
}

impl<'a> ScalarTypeComposer<'a> {
    pub(crate) fn new(sc: &'a mut SchemaComposer, id: ScalarTypeId) -> Self {
        ScalarTypeComposer { sc, id }
    }

    pub fn specified_by_url(&self) -> Option<&str> {
        self.sc.registry.records[self.id].kind.specified_by_url.as_deref()
    }

    pub fn set_specified_by_url(&mut self, url: Option<String>) {
        self.sc.registry.records[self.id].kind.specified_by_url = url;
        self.touch();
    }

    pub fn get_serialize(&self) -> Option<&ScalarFn> {
        self.sc.registry.records[self.id].kind.serialize.as_ref()
    }

    pub fn set_serialize(&mut self, serialize: Option<ScalarFn>) {
        self.sc.registry.records[self.id].kind.serialize = serialize;
        self.touch();
    }

    pub fn get_parse_value(&self) -> Option<&ScalarFn> {
        self.sc.registry.records[self.id].kind.parse_value.as_ref()
    }

    pub fn set_parse_value(&mut self, parse_value: Option<ScalarFn>) {
        self.sc.registry.records[self.id].kind.parse_value = parse_value;
        self.touch();
    }

    /// Serializes a value with the scalar's coercion, or returns it unchanged without one.
    pub fn serialize(&self, value: &serde_json::Value) -> Result<serde_json::Value, crate::ResolveError> {
        match self.get_serialize() {
            Some(serialize) => serialize.call(value),
            None => Ok(value.clone()),
        }
    }
}

impl TypeComposer for ScalarTypeComposer<'_> {
    type Id = ScalarTypeId;

    fn id(&self) -> ScalarTypeId {
        self.id
    }

    fn schema(&self) -> &SchemaComposer {
        self.sc
    }

    fn schema_mut(&mut self) -> &mut SchemaComposer {
        self.sc
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{OutputType, ResolveError};

    #[test]
    fn coercions_reach_the_output_type() {
        let mut sc = SchemaComposer::new();
        let mut date = sc.create_scalar("Date").unwrap();
        date.set_specified_by_url(Some("https://tools.ietf.org/html/rfc3339".into()));
        date.set_serialize(Some(ScalarFn::new(|value| match value.as_i64() {
            Some(days) => Ok(json!(format!("day {days}"))),
            None => Err(ResolveError::new("expected a day number")),
        })));

        assert_eq!(date.serialize(&json!(3)).unwrap(), json!("day 3"));
        assert!(date.serialize(&json!("x")).is_err());

        let OutputType::Scalar(output) = date.get_type().unwrap() else {
            unreachable!("scalar composers build scalars");
        };
        assert_eq!(output.specified_by_url.as_deref(), Some("https://tools.ietf.org/html/rfc3339"));
        assert!(output.serialize.is_some());
        assert!(output.parse_value.is_none());
    }
}
