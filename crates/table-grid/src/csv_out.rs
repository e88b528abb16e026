use csv::WriterBuilder;

use crate::error::TableError;
use crate::model::Grid;

pub fn render_csv(grid: &Grid) -> Result<String, TableError> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::<u8>::new());
    for row in grid {
        writer.write_record(row)?;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|error| TableError::Csv(error.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::render_csv;

    #[test]
    fn keeps_header_rows_and_quotes_separators() {
        let grid = vec![
            vec!["Item".to_string(), "Amount".to_string()],
            vec!["Pens, blue".to_string(), "1,200".to_string()],
        ];
        let csv = render_csv(&grid).expect("csv should render");
        assert_eq!(csv, "Item,Amount\n\"Pens, blue\",\"1,200\"\n");
    }

    #[test]
    fn empty_grid_renders_empty_csv() {
        assert_eq!(render_csv(&Vec::new()).expect("csv should render"), "");
    }
}
