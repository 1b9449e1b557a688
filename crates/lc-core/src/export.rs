//! CSV export of the annotated collection.

use crate::entities::ObservedObject;
use crate::errors::CoreError;

/// Header row of the export document.
pub const CSV_HEADER: &str = "objectId,ra,dec,name,category,note,png";

/// File name offered for the export when none is given.
pub const DEFAULT_EXPORT_FILE: &str = "rubin_annotations.csv";

/// Render the collection as CSV, one row per object.
///
/// Every field is double-quoted and embedded quotes are doubled. Line breaks
/// in the note are flattened to spaces; missing coordinates and snapshots are
/// empty fields.
///
/// # Errors
///
/// Returns [`CoreError::Csv`] if the writer fails to serialize a record.
pub fn export_csv(objects: &[ObservedObject]) -> Result<String, CoreError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for object in objects {
        let ra = coordinate(object.ra);
        let dec = coordinate(object.dec);
        let note = flatten_lines(&object.annotations.note);
        writer.write_record([
            object.id.as_str(),
            ra.as_str(),
            dec.as_str(),
            object.annotations.name.as_str(),
            object.annotations.category.as_str(),
            note.as_str(),
            object.snapshot.as_deref().unwrap_or_default(),
        ])?;
    }

    let body = writer
        .into_inner()
        .map_err(|error| CoreError::Csv(error.into_error().into()))?;

    let mut document = String::with_capacity(CSV_HEADER.len() + 1 + body.len());
    document.push_str(CSV_HEADER);
    document.push('\n');
    document.push_str(&String::from_utf8_lossy(&body));
    Ok(document)
}

fn coordinate(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn flatten_lines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
