//! # Decode Options

/// Default cap on decoded conditions.
pub const DEFAULT_MAX_CONDITIONS: usize = 4;

/// Default value of the "no filter" condition.
pub const DEFAULT_SENTINEL_NULL_VALUE: &str = "Null";

/// Options for configuring a [`crate::decoders::StructuredDecoder`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// The most conditions a query may decode to.
    pub max_conditions: usize,

    /// The value written into the "no filter" sentinel condition.
    pub sentinel_null_value: String,

    /// With more than one condition, restrict the connector to `AND`/`OR`.
    pub force_conn_for_multi: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_conditions: DEFAULT_MAX_CONDITIONS,
            sentinel_null_value: DEFAULT_SENTINEL_NULL_VALUE.to_string(),
            force_conn_for_multi: true,
        }
    }
}

impl DecodeOptions {
    /// Gets the configured condition cap.
    pub fn max_conditions(&self) -> usize {
        self.max_conditions
    }

    /// Sets the configured condition cap.
    pub fn set_max_conditions(
        &mut self,
        max_conditions: usize,
    ) {
        self.max_conditions = max_conditions;
    }

    /// Sets the configured condition cap and returns the builder.
    pub fn with_max_conditions(
        mut self,
        max_conditions: usize,
    ) -> Self {
        self.set_max_conditions(max_conditions);
        self
    }

    /// Gets the "no filter" condition value.
    pub fn sentinel_null_value(&self) -> &str {
        &self.sentinel_null_value
    }

    /// Sets the "no filter" condition value.
    pub fn set_sentinel_null_value<S: Into<String>>(
        &mut self,
        value: S,
    ) {
        self.sentinel_null_value = value.into();
    }

    /// Sets the "no filter" condition value and returns the builder.
    pub fn with_sentinel_null_value<S: Into<String>>(
        mut self,
        value: S,
    ) -> Self {
        self.set_sentinel_null_value(value);
        self
    }

    /// Is the multi-condition connector restricted to `AND`/`OR`?
    pub fn force_conn_for_multi(&self) -> bool {
        self.force_conn_for_multi
    }

    /// Sets the multi-condition connector restriction.
    pub fn set_force_conn_for_multi(
        &mut self,
        force: bool,
    ) {
        self.force_conn_for_multi = force;
    }

    /// Sets the multi-condition connector restriction and returns the builder.
    pub fn with_force_conn_for_multi(
        mut self,
        force: bool,
    ) -> Self {
        self.set_force_conn_for_multi(force);
        self
    }
}
