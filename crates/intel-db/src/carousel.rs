use intel_core::CarouselItem;

use crate::record::{map_records, ColumnSpec, Record, RowError};

pub const PROCEDURE: &str = "ICConsumerHomePageCarousel";
pub(crate) const STATEMENT: &str = "EXEC ICConsumerHomePageCarousel";

const CAROUSEL_ID: ColumnSpec = ColumnSpec::integer("CarouselId");
const CAROUSEL_NAME: ColumnSpec = ColumnSpec::text("CarouselName");
const CAROUSEL_IMAGE_URL: ColumnSpec = ColumnSpec::text("CarouselImageURL");
const CAROUSEL_LINK_TEXT: ColumnSpec = ColumnSpec::text("CarouselLinkText");
const CAROUSEL_URL: ColumnSpec = ColumnSpec::text("CarouselURL");
const CAROUSEL_DESCRIPTION: ColumnSpec = ColumnSpec::text("CarouselDescription");
const CAROUSEL_SEQUENCE: ColumnSpec = ColumnSpec::integer("CarouselSequence");

/// Every column the carousel mapper reads.
pub const COLUMNS: [ColumnSpec; 7] = [
    CAROUSEL_ID,
    CAROUSEL_NAME,
    CAROUSEL_IMAGE_URL,
    CAROUSEL_LINK_TEXT,
    CAROUSEL_URL,
    CAROUSEL_DESCRIPTION,
    CAROUSEL_SEQUENCE,
];

/// # Errors
///
/// Returns [`RowError`] if any column holds a value of the wrong kind.
pub fn map_row(record: &Record) -> Result<CarouselItem, RowError> {
    Ok(CarouselItem {
        carousel_id: record.integer(CAROUSEL_ID)?,
        carousel_name: record.text(CAROUSEL_NAME)?,
        carousel_image_url: record.text(CAROUSEL_IMAGE_URL)?,
        carousel_link_text: record.text(CAROUSEL_LINK_TEXT)?,
        carousel_url: record.text(CAROUSEL_URL)?,
        carousel_description: record.text(CAROUSEL_DESCRIPTION)?,
        carousel_sequence: record.integer(CAROUSEL_SEQUENCE)?,
    })
}

/// Maps readable rows and orders them by sequence (stable for ties).
#[must_use]
pub fn map_rows(records: Vec<Record>) -> Vec<CarouselItem> {
    let mut items = map_records(PROCEDURE, records, map_row);
    items.sort_by_key(|item| item.carousel_sequence);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Cell;

    fn slide(id: i64, name: &str, sequence: i64) -> Record {
        Record::new()
            .with("CarouselId", Cell::Int(id))
            .with("CarouselName", Cell::Text(name.to_string()))
            .with("CarouselImageURL", Cell::Text(format!("/img/{id}.png")))
            .with("CarouselLinkText", Cell::Text("Read more".to_string()))
            .with("CarouselURL", Cell::Text(format!("/slides/{id}")))
            .with("CarouselDescription", Cell::Null)
            .with("CarouselSequence", Cell::Int(sequence))
    }

    #[test]
    fn column_table_is_complete() {
        let names: Vec<_> = COLUMNS.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            [
                "CarouselId",
                "CarouselName",
                "CarouselImageURL",
                "CarouselLinkText",
                "CarouselURL",
                "CarouselDescription",
                "CarouselSequence",
            ]
        );
    }

    #[test]
    fn full_row_maps_every_field() {
        let item = map_row(&slide(4, "Oncology", 2)).unwrap();
        assert_eq!(item.carousel_id, 4);
        assert_eq!(item.carousel_name, "Oncology");
        assert_eq!(item.carousel_image_url, "/img/4.png");
        assert_eq!(item.carousel_url, "/slides/4");
        assert_eq!(item.carousel_description, "");
        assert_eq!(item.carousel_sequence, 2);
    }

    #[test]
    fn missing_columns_default() {
        let record = Record::new().with("CarouselName", Cell::Text("Only name".to_string()));
        let item = map_row(&record).unwrap();
        assert_eq!(item.carousel_id, 0);
        assert_eq!(item.carousel_link_text, "");
        assert_eq!(item.carousel_sequence, 0);
    }

    #[test]
    fn rows_are_ordered_by_sequence_and_bad_rows_skipped() {
        let broken = Record::new()
            .with("CarouselId", Cell::Text("seven".to_string()))
            .with("CarouselSequence", Cell::Int(0));
        let records = vec![slide(1, "Third", 3), broken, slide(2, "First", 1), slide(3, "Second", 2)];

        let items = map_rows(records);
        let names: Vec<_> = items.iter().map(|i| i.carousel_name.as_str()).collect();
        assert_eq!(names, ["First", "Second", "Third"]);
    }
}
