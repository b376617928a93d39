//! Reader for uploaded layout documents.
//!
//! A document is a JSON object whose `additionalData` member holds the
//! layout:
//!
//! ```json
//! { "additionalData": { "shapes": [
//!     { "name": "hw1", "type": "highway",
//!       "properties": { "x": 0, "y": 0, "width": 3000, "height": 600 } }
//! ] } }
//! ```

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use layview_core::{Layout, LayoutError};

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document has no 'additionalData' section")]
    MissingAdditionalData,

    #[error("Invalid layout: {0}")]
    Layout(#[from] LayoutError),
}

#[derive(Deserialize)]
struct Document {
    #[serde(rename = "additionalData")]
    additional_data: Option<serde_json::Value>,
}

fn into_layout(document: Document) -> Result<Layout, DocumentError> {
    let data = document
        .additional_data
        .ok_or(DocumentError::MissingAdditionalData)?;
    Ok(Layout::from_additional_data(data)?)
}

pub fn parse_str(json: &str) -> Result<Layout, DocumentError> {
    into_layout(serde_json::from_str(json)?)
}

pub fn read<R: Read>(reader: R) -> Result<Layout, DocumentError> {
    into_layout(serde_json::from_reader(reader)?)
}

pub fn read_file(path: &Path) -> Result<Layout, DocumentError> {
    let layout = read(BufReader::new(File::open(path)?))?;
    log::info!(
        "loaded {} shapes from {} as layout {}",
        layout.len(),
        path.display(),
        layout.id
    );
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use layview_core::ShapeType;
    use std::io::Write;

    const DOC: &str = r#"{
        "id": 7,
        "additionalData": {
            "shapes": [
                { "name": "hw1", "type": "highway",
                  "properties": { "x": 0, "y": 0, "width": 3000, "height": 600 } },
                { "name": "in1", "type": "intake", "parameters": { "rate": 3 },
                  "properties": { "x": 0, "y": 1000, "width": 400, "height": 2500 } }
            ]
        }
    }"#;

    #[test]
    fn test_parse_document() {
        let layout = parse_str(DOC).unwrap();
        assert_eq!(layout.len(), 2);
        let intake = layout.find_shape("in1").unwrap();
        assert_eq!(intake.shape_type, ShapeType::Intake);
        assert_eq!(intake.parameters["rate"], 3);
        assert!((intake.properties.height - 2500.0).abs() < 1e-10);
    }

    #[test]
    fn test_missing_additional_data() {
        assert!(matches!(
            parse_str(r#"{ "shapes": [] }"#),
            Err(DocumentError::MissingAdditionalData)
        ));
    }

    #[test]
    fn test_malformed_shape_reports_index() {
        let doc = r#"{ "additionalData": { "shapes": [
            { "name": "ok", "type": "delivery",
              "properties": { "x": 0, "y": 0, "width": 1, "height": 1 } },
            { "name": "bad", "type": "delivery" }
        ] } }"#;
        match parse_str(doc) {
            Err(DocumentError::Layout(LayoutError::InvalidShape { index, .. })) => assert_eq!(index, 1),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_str("{ not json"), Err(DocumentError::Json(_))));
    }

    #[test]
    fn test_read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOC.as_bytes()).unwrap();
        let layout = read_file(file.path()).unwrap();
        assert_eq!(layout.shapes()[0].name, "hw1");

        let missing = file.path().with_extension("missing");
        assert!(matches!(read_file(&missing), Err(DocumentError::Io(_))));
    }
}
