// Validation utilities

use crate::data::{DataSet, DataType};

/// Validate that a dataset carries the expected columns with the expected
/// types. Used before deriving columns, so a schema drift fails loudly
/// instead of producing null-filled derived values.
pub fn validate_schema(
    dataset: &DataSet,
    expected_columns: &[(&str, DataType)],
) -> Result<(), String> {
    for (name, data_type) in expected_columns {
        match dataset.schema.get_field_by_name(name) {
            Some(field) if &field.data_type == data_type => {}
            Some(field) => {
                return Err(format!(
                    "column '{}' has type {:?}, expected {:?}",
                    name, field.data_type, data_type
                ))
            }
            None => return Err(format!("column '{}' not found", name)),
        }
    }

    Ok(())
}
