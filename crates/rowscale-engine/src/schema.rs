use crate::{
    error::{InputTypeError, ScaleError, SchemaMismatch},
    value::{Row, Value, ValueType},
};

/// Column names and types of a dataset, inferred from its first row.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value_type: ValueType,
}

impl Schema {
    #[must_use]
    pub fn infer(first: &Row) -> Self {
        let fields = first
            .iter()
            .map(|(name, value)| Field {
                name: name.to_owned(),
                value_type: value.value_type(),
            })
            .collect();
        Self { fields }
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> + '_ {
        self.fields.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|f| f.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Converts `row` into one number per schema column.
    ///
    /// Booleans become `0`/`1`; strings are turned into codes by `encode`,
    /// which receives the column index and the string. Columns present in
    /// `row` but not in the schema are ignored.
    ///
    /// # Errors
    ///
    /// - [`SchemaMismatch::MissingColumn`] if `row` lacks a schema column
    /// - [`InputTypeError::TypeChanged`] if a value's type differs from the schema
    /// - [`InputTypeError::NonFinite`] for NaN or infinite numbers
    /// - whatever `encode` returns
    #[expect(clippy::cast_precision_loss)]
    pub fn numeric_row<F>(
        &self,
        row_index: usize,
        row: &Row,
        mut encode: F,
    ) -> Result<Vec<f64>, ScaleError>
    where
        F: FnMut(usize, &str) -> Result<usize, ScaleError>,
    {
        self.fields
            .iter()
            .enumerate()
            .map(|(column, field)| {
                let value = row.get_hinted(column, &field.name).ok_or_else(|| {
                    ScaleError::SchemaMismatch(SchemaMismatch::MissingColumn {
                        row: row_index,
                        column: field.name.clone(),
                    })
                })?;
                if value.value_type() != field.value_type {
                    return Err(ScaleError::InvalidInputType(InputTypeError::TypeChanged {
                        row: row_index,
                        column: field.name.clone(),
                        expected: field.value_type,
                        found: value.value_type(),
                    }));
                }
                match value {
                    Value::Number(n) if n.is_finite() => Ok(*n),
                    Value::Number(_) => Err(ScaleError::InvalidInputType(
                        InputTypeError::NonFinite {
                            row: row_index,
                            column: field.name.clone(),
                        },
                    )),
                    Value::Bool(b) => Ok(f64::from(u8::from(*b))),
                    Value::Text(s) => encode(column, s).map(|code| code as f64),
                }
            })
            .collect()
    }
}
