use crate::ledger::RecordSet;
use crate::models::{parse_yes_no, yes_no, Record};
use chrono::NaiveDate;
use csv::ByteRecord;
use serde::Serialize;
use std::io;
use tracing::warn;

pub const CSV_HEADER: [&str; 8] = [
    "name",
    "date",
    "break",
    "diet",
    "workout",
    "social",
    "diet_penalty",
    "score",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A score sheet row exactly as persisted. Flags are the strings `Yes`/`No`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRow {
    pub name: String,
    pub date: String,
    #[serde(rename = "break")]
    pub took_break: String,
    pub diet: String,
    pub workout: String,
    pub social: String,
    pub diet_penalty: String,
    pub score: String,
}

impl From<&Record> for RecordRow {
    fn from(record: &Record) -> Self {
        Self {
            name: record.name().to_string(),
            date: record.date().format(DATE_FORMAT).to_string(),
            took_break: yes_no(record.took_break()).to_string(),
            diet: yes_no(record.diet_ok()).to_string(),
            workout: yes_no(record.workout_ok()).to_string(),
            social: yes_no(record.social_ok()).to_string(),
            diet_penalty: record.diet_penalty().to_string(),
            score: record.score().to_string(),
        }
    }
}

impl TryFrom<&RecordRow> for Record {
    type Error = String;

    fn try_from(row: &RecordRow) -> Result<Self, Self::Error> {
        let name = row.name.trim();
        if name.is_empty() {
            return Err("empty name".to_string());
        }
        let date = NaiveDate::parse_from_str(row.date.trim(), DATE_FORMAT)
            .map_err(|err| format!("bad date '{}': {err}", row.date))?;

        Ok(Record {
            name: name.to_string(),
            date,
            took_break: flag("break", &row.took_break)?,
            diet_ok: flag("diet", &row.diet)?,
            workout_ok: flag("workout", &row.workout)?,
            social_ok: flag("social", &row.social)?,
            diet_penalty: whole_number("diet_penalty", &row.diet_penalty)?,
            score: whole_number("score", &row.score)?,
        })
    }
}

fn flag(field: &str, raw: &str) -> Result<bool, String> {
    parse_yes_no(raw).ok_or_else(|| format!("{field} is '{raw}', expected Yes or No"))
}

// Sheets edited by spreadsheet tools sometimes carry "3.0" for integers.
fn whole_number(field: &str, raw: &str) -> Result<i64, String> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(value);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value.is_finite() => Ok(value as i64),
        _ => Err(format!("{field} is '{raw}', expected a whole number")),
    }
}

/// A persisted row that did not decode, kept field for field so a full-sheet
/// write puts it back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndecodedRow {
    fields: Vec<Vec<u8>>,
}

impl UndecodedRow {
    pub fn new<I, F>(fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[u8]>,
    {
        Self {
            fields: fields.into_iter().map(|f| f.as_ref().to_vec()).collect(),
        }
    }

    pub fn fields(&self) -> &[Vec<u8>] {
        &self.fields
    }
}

/// Parses a CSV score sheet. Empty input is an empty sheet. Rows that do not
/// decode, including short, long and non-UTF-8 rows, are kept aside in the
/// set rather than rejected. Only a header missing one of the expected
/// columns fails the whole sheet.
pub fn decode_records(bytes: &[u8]) -> Result<RecordSet, csv::Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(RecordSet::default());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let header = reader.byte_headers()?;
    let width = header.len();
    let columns = column_positions(header)?;

    let mut records = Vec::new();
    let mut undecoded = Vec::new();
    for row in reader.byte_records() {
        let row = row?;
        match decode_row(&row, &columns, width) {
            Ok(record) => {
                if record.rescored() != record.score() {
                    warn!(
                        name = record.name(),
                        date = %record.date(),
                        stored = record.score(),
                        "stored score differs from current scoring rule"
                    );
                }
                records.push(record);
            }
            Err(reason) => {
                let line = row.position().map_or(0, |position| position.line());
                warn!(line, "skipping undecodable row: {reason}");
                undecoded.push(UndecodedRow::new(row.iter()));
            }
        }
    }

    Ok(RecordSet::with_undecoded(records, undecoded))
}

fn column_positions(header: &ByteRecord) -> Result<[usize; CSV_HEADER.len()], csv::Error> {
    let mut positions = [0; CSV_HEADER.len()];
    for (slot, column) in positions.iter_mut().zip(CSV_HEADER) {
        *slot = header
            .iter()
            .position(|field| field == column.as_bytes())
            .ok_or_else(|| {
                csv::Error::from(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("score sheet header has no '{column}' column"),
                ))
            })?;
    }
    Ok(positions)
}

fn decode_row(
    row: &ByteRecord,
    columns: &[usize; CSV_HEADER.len()],
    width: usize,
) -> Result<Record, String> {
    if row.len() != width {
        return Err(format!("expected {width} fields, found {}", row.len()));
    }

    let text = |slot: usize| -> Result<String, String> {
        let raw = row.get(columns[slot]).unwrap_or_default();
        std::str::from_utf8(raw)
            .map(str::to_string)
            .map_err(|_| format!("{} is not valid UTF-8", CSV_HEADER[slot]))
    };

    let stored = RecordRow {
        name: text(0)?,
        date: text(1)?,
        took_break: text(2)?,
        diet: text(3)?,
        workout: text(4)?,
        social: text(5)?,
        diet_penalty: text(6)?,
        score: text(7)?,
    };
    Record::try_from(&stored)
}

pub fn encode_records(set: &RecordSet) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for record in set.records() {
        writer.serialize(RecordRow::from(record))?;
    }
    for row in set.undecoded() {
        writer.write_record(row.fields())?;
    }
    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{DailyInputs, DietMistakes};
    use crate::stats::{aggregate, Period};

    const SHEET: &str = "name,date,break,diet,workout,social,diet_penalty,score\n\
Theju,2024-06-03,No,Yes,Yes,Yes,1,3\n\
Udaya,2024-06-03,No,No,No,No,4,-5\n\
Kavya,2024-06-04,Yes,No,No,No,0,0\n";

    #[test]
    fn decodes_yes_no_flags_to_booleans() {
        let set = decode_records(SHEET.as_bytes()).unwrap();
        assert_eq!(set.records().len(), 3);
        assert!(set.undecoded().is_empty());

        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let udaya = set.find("Udaya", date).unwrap();
        assert!(!udaya.diet_ok());
        assert!(!udaya.took_break());
        assert_eq!(udaya.diet_penalty(), 4);
        assert_eq!(udaya.score(), -5);

        let kavya = set
            .find("Kavya", NaiveDate::from_ymd_opt(2024, 6, 4).unwrap())
            .unwrap();
        assert!(kavya.took_break());
    }

    #[test]
    fn encodes_flags_as_yes_no_with_header() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let record = Record::scored(
            "Theju",
            date,
            &DailyInputs {
                took_break: false,
                diet_ok: true,
                workout_ok: true,
                social_ok: false,
                diet_mistakes: DietMistakes::default(),
            },
        );
        let bytes = encode_records(&RecordSet::new(vec![record])).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "name,date,break,diet,workout,social,diet_penalty,score\n\
Theju,2024-06-03,No,Yes,Yes,No,1,2\n"
        );
    }

    #[test]
    fn empty_and_header_only_sheets_are_empty() {
        assert!(decode_records(b"").unwrap().is_empty());
        assert!(decode_records(b"  \n").unwrap().is_empty());

        let header_only = encode_records(&RecordSet::default()).unwrap();
        assert_eq!(header_only, b"name,date,break,diet,workout,social,diet_penalty,score\n");
        assert!(decode_records(&header_only).unwrap().is_empty());
    }

    #[test]
    fn malformed_rows_are_kept_but_set_aside() {
        let sheet = "name,date,break,diet,workout,social,diet_penalty,score\n\
Teju,06/03/2024,No,Yes,Yes,Yes,1,3\n\
Teju,2024-06-04,No,yes,Yes,Yes,1,3\n\
Teju,2024-06-05,No,Yes,Yes,Yes,1,3\n";
        let set = decode_records(sheet.as_bytes()).unwrap();
        assert_eq!(set.records().len(), 1);
        assert_eq!(set.undecoded().len(), 2);

        let rewritten = String::from_utf8(encode_records(&set).unwrap()).unwrap();
        assert!(rewritten.contains("Teju,06/03/2024,No,Yes,Yes,Yes,1,3"));
        assert!(rewritten.contains("Teju,2024-06-04,No,yes,Yes,Yes,1,3"));
    }

    #[test]
    fn accepts_float_formatted_integers() {
        let sheet = "name,date,break,diet,workout,social,diet_penalty,score\n\
Teju,2024-06-03,No,No,Yes,Yes,2.0,0.0\n";
        let set = decode_records(sheet.as_bytes()).unwrap();
        let record = &set.records()[0];
        assert_eq!(record.diet_penalty(), 2);
        assert_eq!(record.score(), 0);
    }

    #[test]
    fn ragged_rows_survive_a_rewrite_and_stay_out_of_totals() {
        let sheet = "name,date,break,diet,workout,social,diet_penalty,score\n\
Teju,2024-06-03,No,Yes,Yes,Yes,1,3\n\
Teju,2024-06-03\n\
Teju,2024-06-03,No,Yes,Yes,Yes,1,3,extra\n";
        let set = decode_records(sheet.as_bytes()).unwrap();
        assert_eq!(set.records().len(), 1);
        assert_eq!(set.undecoded().len(), 2);

        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let board = aggregate(set.records(), Period::Day, date);
        assert_eq!(board.total_for("Teju"), Some(3));

        let rewritten = encode_records(&set).unwrap();
        let reloaded = decode_records(&rewritten).unwrap();
        assert_eq!(reloaded, set);
        let text = String::from_utf8(rewritten).unwrap();
        assert!(text.contains("\nTeju,2024-06-03\n"));
        assert!(text.contains("Teju,2024-06-03,No,Yes,Yes,Yes,1,3,extra\n"));
    }

    #[test]
    fn non_utf8_rows_are_kept_byte_for_byte() {
        let mut sheet = b"name,date,break,diet,workout,social,diet_penalty,score\n\
Udaya,2024-06-03,No,Yes,Yes,No,1,2\n"
            .to_vec();
        sheet.extend_from_slice(b"Te\xffju,2024-06-03,No,Yes,Yes,Yes,1,3\n");

        let set = decode_records(&sheet).unwrap();
        assert_eq!(set.records().len(), 1);
        assert_eq!(set.records()[0].name(), "Udaya");
        assert_eq!(set.undecoded().len(), 1);
        assert_eq!(set.undecoded()[0].fields()[0], b"Te\xffju".to_vec());

        let rewritten = encode_records(&set).unwrap();
        assert!(rewritten.ends_with(b"Te\xffju,2024-06-03,No,Yes,Yes,Yes,1,3\n"));
    }

    #[test]
    fn header_missing_a_column_is_a_parse_error() {
        let sheet = "name,date,break,diet,workout,social,score\nTeju,2024-06-03,No,Yes,Yes,Yes,3\n";
        assert!(decode_records(sheet.as_bytes()).is_err());
    }
}
