/// Arrow schema definitions for persisted inspection data.
pub mod inspections {
    use arrow::datatypes::{DataType, Field, Schema};

    /// Name of the table holding one row per inspection.
    pub const TABLE: &str = "inspections";

    /// Schema of the `inspections` table.
    ///
    /// Timestamps are microseconds since the Unix epoch. `sampling_point` and
    /// `standard_data` hold JSON text; `standard_data` is the scored criteria
    /// tree exactly as produced at creation time.
    pub fn inspection_schema() -> Schema {
        Schema::new(vec![
            Field::new("inspection_id", DataType::Utf8, false),
            Field::new("name", DataType::Utf8, false),
            Field::new("create_date_us", DataType::Int64, false),
            Field::new("sampling_date_us", DataType::Int64, true),
            Field::new("sampling_point", DataType::Utf8, false),
            Field::new("price", DataType::Utf8, false),
            Field::new("note", DataType::Utf8, false),
            Field::new("image_link", DataType::Utf8, true),
            Field::new("standard_id", DataType::Int64, false),
            Field::new("standard_name", DataType::Utf8, false),
            Field::new("standard_data", DataType::Utf8, false),
        ])
    }
}
