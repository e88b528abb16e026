use crate::markdown::header_row_index;
use crate::model::{ColumnSchema, ColumnType, Grid, TableSchema};

const SAMPLE_ROWS: usize = 5;

fn is_numeric(value: &str) -> bool {
    let trimmed = value.trim().replace(',', "");
    trimmed.parse::<f64>().is_ok()
}

fn infer_column_type<'a>(values: impl Iterator<Item = &'a String>) -> ColumnType {
    let (numeric, total) = values
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .fold((0_usize, 0_usize), |(numeric, total), value| {
            (numeric + usize::from(is_numeric(value)), total + 1)
        });

    // at least 80% of the non-empty samples
    if total > 0 && numeric * 5 >= total * 4 {
        ColumnType::Number
    } else {
        ColumnType::String
    }
}

/// Guesses a type per column from the rows right after the last header row.
#[must_use]
pub fn infer_schema(grid: &Grid, header_rows: &[usize]) -> TableSchema {
    if grid.is_empty() {
        return TableSchema::default();
    }

    let header_index = header_row_index(grid, header_rows);
    let samples = grid
        .iter()
        .skip(header_index + 1)
        .take(SAMPLE_ROWS)
        .collect::<Vec<_>>();

    let columns = grid[header_index]
        .iter()
        .enumerate()
        .map(|(index, name)| ColumnSchema {
            name: name.clone(),
            column_type: infer_column_type(samples.iter().filter_map(|row| row.get(index))),
        })
        .collect();

    TableSchema { columns }
}

#[cfg(test)]
mod tests {
    use super::infer_schema;
    use crate::model::ColumnType;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
            .collect()
    }

    #[test]
    fn classifies_numeric_columns_with_thousands_separators() {
        let grid = grid(&[
            &["Name", "Amount", "Notes"],
            &["Alice", "1,200", ""],
            &["Bob", "3.5", ""],
            &["Carol", "n/a", ""],
            &["Dan", "7", ""],
            &["Eve", "8", ""],
            &["Late", "late", ""],
        ]);
        let schema = infer_schema(&grid, &[0]);
        let types = schema
            .columns
            .iter()
            .map(|column| column.column_type)
            .collect::<Vec<_>>();
        assert_eq!(
            types,
            vec![ColumnType::String, ColumnType::Number, ColumnType::String]
        );
        assert_eq!(schema.columns[1].name, "Amount");
    }

    #[test]
    fn samples_only_rows_after_the_last_header_row() {
        let grid = grid(&[&["Group"], &["Count"], &["4"], &["5"]]);
        let schema = infer_schema(&grid, &[0, 1]);
        assert_eq!(schema.columns[0].name, "Count");
        assert_eq!(schema.columns[0].column_type, ColumnType::Number);
    }

    #[test]
    fn empty_grid_has_no_columns() {
        let schema = infer_schema(&Vec::new(), &[]);
        assert_eq!(
            serde_json::to_string(&schema).expect("schema should serialize"),
            r#"{"columns":[]}"#
        );
    }
}
