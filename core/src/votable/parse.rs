//! Streaming VOTable reader
//!
//! Handles the envelope VO services actually emit:
//! `VOTABLE > RESOURCE > (INFO | TABLE > (FIELD*, DATA > TABLEDATA > TR > TD*))`.
//! BINARY/BINARY2/FITS serializations are rejected explicitly rather than
//! silently returning empty tables.

use crate::error::{DalError, Result};
use crate::votable::field::{DataType, Field};
use crate::votable::value::Value;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

/// A parsed VOTable document
#[derive(Debug, Clone, Default)]
pub struct VoTable {
    /// INFO elements outside any RESOURCE
    pub infos: Vec<Info>,
    /// RESOURCE sections in document order (nested resources flattened)
    pub resources: Vec<Resource>,
}

/// A RESOURCE section
#[derive(Debug, Clone, Default)]
pub struct Resource {
    pub name: Option<String>,
    /// The `type` attribute, e.g. `results` in TAP responses
    pub resource_type: Option<String>,
    pub infos: Vec<Info>,
    pub tables: Vec<TableData>,
}

/// One TABLE with decoded TABLEDATA rows
#[derive(Debug, Clone, Default)]
pub struct TableData {
    pub name: Option<String>,
    pub fields: Vec<Field>,
    pub rows: Vec<Vec<Value>>,
}

/// An INFO element: name/value attributes plus optional element text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    pub name: String,
    pub value: String,
    pub content: Option<String>,
}

impl VoTable {
    /// Parse a VOTable document from raw bytes
    pub fn parse(bytes: &[u8]) -> Result<VoTable> {
        Parser::new().run(bytes)
    }

    /// Parse a VOTable document from a string
    pub fn parse_str(text: &str) -> Result<VoTable> {
        Self::parse(text.as_bytes())
    }

    /// The first table in document order, where query results live
    pub fn first_table(&self) -> Option<&TableData> {
        self.resources.iter().flat_map(|r| r.tables.iter()).next()
    }

    /// The QUERY_STATUS INFO, searched in resources first, then at top level
    pub fn query_status(&self) -> Option<&Info> {
        self.resources
            .iter()
            .flat_map(|r| r.infos.iter())
            .chain(self.infos.iter())
            .find(|info| info.name.eq_ignore_ascii_case("QUERY_STATUS"))
    }
}

impl TableData {
    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parser state over the quick-xml event stream
struct Parser {
    votable: VoTable,
    resource_stack: Vec<Resource>,
    table: Option<TableData>,
    row: Option<Vec<Value>>,
    pending_field: Option<Field>,
    pending_info: Option<Info>,
    in_field_description: bool,
    text: String,
    capturing: Capture,
}

#[derive(PartialEq)]
enum Capture {
    None,
    Cell,
    Info,
    Description,
}

impl Parser {
    fn new() -> Self {
        Self {
            votable: VoTable::default(),
            resource_stack: Vec::new(),
            table: None,
            row: None,
            pending_field: None,
            pending_info: None,
            in_field_description: false,
            text: String::new(),
            capturing: Capture::None,
        }
    }

    fn run(mut self, bytes: &[u8]) -> Result<VoTable> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => self.handle_start(&e, false)?,
                Event::Empty(e) => self.handle_start(&e, true)?,
                Event::End(e) => {
                    let name = local(e.local_name().as_ref());
                    self.handle_end(&name)?;
                }
                Event::Text(e) => self.handle_text(&e),
                Event::CData(e) => {
                    if self.capturing != Capture::None {
                        self.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if self.votable.resources.is_empty() && self.votable.infos.is_empty() {
            return Err(DalError::format("response contains no VOTABLE content").into());
        }

        Ok(self.votable)
    }

    fn handle_start(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<()> {
        let name = local(e.local_name().as_ref());
        match name.as_str() {
            "RESOURCE" => {
                let mut resource = Resource::default();
                for (key, value) in attributes(e) {
                    match key.as_str() {
                        "name" => resource.name = Some(value),
                        "type" => resource.resource_type = Some(value),
                        _ => {}
                    }
                }
                if empty {
                    self.votable.resources.push(resource);
                } else {
                    self.resource_stack.push(resource);
                }
            }
            "TABLE" => {
                let mut table = TableData::default();
                for (key, value) in attributes(e) {
                    if key == "name" {
                        table.name = Some(value);
                    }
                }
                if empty {
                    self.finish_table(table);
                } else {
                    self.table = Some(table);
                }
            }
            "FIELD" => {
                if self.table.is_some() {
                    let field = read_field(e);
                    if empty {
                        self.push_field(field);
                    } else {
                        self.pending_field = Some(field);
                    }
                }
            }
            "DESCRIPTION" => {
                if self.pending_field.is_some() && !empty {
                    self.in_field_description = true;
                    self.capturing = Capture::Description;
                    self.text.clear();
                }
            }
            "TR" => {
                if self.table.is_some() {
                    self.row = Some(Vec::new());
                    if empty {
                        self.handle_end("TR")?;
                    }
                }
            }
            "TD" => {
                if self.row.is_some() {
                    if empty {
                        self.finish_cell()?;
                    } else {
                        self.capturing = Capture::Cell;
                        self.text.clear();
                    }
                }
            }
            "INFO" => {
                let mut info = Info {
                    name: String::new(),
                    value: String::new(),
                    content: None,
                };
                for (key, value) in attributes(e) {
                    match key.as_str() {
                        "name" => info.name = value,
                        "value" => info.value = value,
                        _ => {}
                    }
                }
                if empty {
                    self.push_info(info);
                } else {
                    self.pending_info = Some(info);
                    self.capturing = Capture::Info;
                    self.text.clear();
                }
            }
            "BINARY" | "BINARY2" | "FITS" => {
                return Err(DalError::format(format!(
                    "{} serialization is not supported, request TABLEDATA output",
                    name
                ))
                .into());
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_end(&mut self, name: &str) -> Result<()> {
        match name {
            "RESOURCE" => {
                if let Some(resource) = self.resource_stack.pop() {
                    self.votable.resources.push(resource);
                }
            }
            "TABLE" => {
                if let Some(table) = self.table.take() {
                    self.finish_table(table);
                }
            }
            "FIELD" => {
                if let Some(field) = self.pending_field.take() {
                    self.push_field(field);
                }
            }
            "DESCRIPTION" => {
                if self.in_field_description {
                    let text = self.take_text();
                    if let Some(field) = self.pending_field.as_mut() {
                        if !text.is_empty() {
                            field.description = Some(text);
                        }
                    }
                    self.in_field_description = false;
                }
            }
            "TR" => {
                if let (Some(mut row), Some(table)) = (self.row.take(), self.table.as_mut()) {
                    // A short row means trailing cells were omitted
                    while row.len() < table.fields.len() {
                        row.push(Value::Null);
                    }
                    table.rows.push(row);
                }
            }
            "TD" => {
                if self.capturing == Capture::Cell {
                    self.finish_cell()?;
                }
            }
            "INFO" => {
                if let Some(mut info) = self.pending_info.take() {
                    let text = self.take_text();
                    if !text.is_empty() {
                        info.content = Some(text);
                    }
                    self.push_info(info);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_text(&mut self, e: &BytesText<'_>) {
        if self.capturing == Capture::None {
            return;
        }
        let text = e
            .unescape()
            .map(|cow| cow.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(e.as_ref()).into_owned());
        self.text.push_str(&text);
    }

    fn finish_cell(&mut self) -> Result<()> {
        let text = self.take_text();
        let (row, table) = match (self.row.as_mut(), self.table.as_ref()) {
            (Some(row), Some(table)) => (row, table),
            _ => return Ok(()),
        };
        let field = table.fields.get(row.len()).ok_or_else(|| {
            DalError::format(format!(
                "row has more cells than the {} declared fields",
                table.fields.len()
            ))
        })?;
        row.push(Value::decode_cell(&text, field)?);
        Ok(())
    }

    fn finish_table(&mut self, table: TableData) {
        match self.resource_stack.last_mut() {
            Some(resource) => resource.tables.push(table),
            None => {
                // TABLE outside RESOURCE is invalid, keep the data anyway
                let mut resource = Resource::default();
                resource.tables.push(table);
                self.votable.resources.push(resource);
            }
        }
    }

    fn push_field(&mut self, field: Field) {
        if let Some(table) = self.table.as_mut() {
            table.fields.push(field);
        }
    }

    fn push_info(&mut self, info: Info) {
        match self.resource_stack.last_mut() {
            Some(resource) => resource.infos.push(info),
            None => self.votable.infos.push(info),
        }
    }

    fn take_text(&mut self) -> String {
        self.capturing = Capture::None;
        let text = std::mem::take(&mut self.text);
        text.trim().to_string()
    }
}

fn local(name: &[u8]) -> String {
    String::from_utf8_lossy(name).to_ascii_uppercase()
}

fn attributes(e: &BytesStart<'_>) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map(|cow| cow.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        out.push((key, value));
    }
    out
}

fn read_field(e: &BytesStart<'_>) -> Field {
    let mut field = Field::new("", DataType::Char);
    for (key, value) in attributes(e) {
        match key.as_str() {
            "name" => field.name = value,
            "ID" | "id" => field.id = Some(value),
            "datatype" => field.datatype = DataType::from_name(&value),
            "arraysize" => field.arraysize = Some(value),
            "ucd" => field.ucd = Some(value),
            "utype" => field.utype = Some(value),
            "unit" => field.unit = Some(value),
            _ => {}
        }
    }
    field
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<VOTABLE version="1.1" xmlns="http://www.ivoa.net/xml/VOTable/v1.1">
  <RESOURCE type="results">
    <INFO name="QUERY_STATUS" value="OK"/>
    <TABLE name="stars">
      <FIELD name="id" datatype="char" arraysize="*" ucd="ID_MAIN">
        <DESCRIPTION>Primary designation</DESCRIPTION>
      </FIELD>
      <FIELD name="ra" datatype="double" ucd="POS_EQ_RA_MAIN" unit="deg"/>
      <FIELD name="dec" datatype="double" ucd="POS_EQ_DEC_MAIN" unit="deg"/>
      <FIELD name="nobs" datatype="int"/>
      <DATA>
        <TABLEDATA>
          <TR><TD>HD 1</TD><TD>10.5</TD><TD>-23.25</TD><TD>4</TD></TR>
          <TR><TD>HD 2 &amp; friends</TD><TD>11.0</TD><TD></TD></TR>
        </TABLEDATA>
      </DATA>
    </TABLE>
  </RESOURCE>
</VOTABLE>"#;

    #[test]
    fn test_parse_fields_and_rows() {
        let vot = VoTable::parse_str(SAMPLE).unwrap();
        let table = vot.first_table().unwrap();

        assert_eq!(table.fields.len(), 4);
        assert_eq!(table.fields[0].name, "id");
        assert_eq!(table.fields[0].ucd.as_deref(), Some("ID_MAIN"));
        assert_eq!(
            table.fields[0].description.as_deref(),
            Some("Primary designation")
        );
        assert_eq!(table.fields[1].unit.as_deref(), Some("deg"));

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0].as_str(), Some("HD 1"));
        assert_eq!(table.rows[0][1].as_f64(), Some(10.5));
        assert_eq!(table.rows[0][3].as_i64(), Some(4));
    }

    #[test]
    fn test_entities_and_short_rows() {
        let vot = VoTable::parse_str(SAMPLE).unwrap();
        let table = vot.first_table().unwrap();

        // &amp; decodes
        assert_eq!(table.rows[1][0].as_str(), Some("HD 2 & friends"));
        // empty TD decodes to null, omitted trailing TD is padded to null
        assert!(table.rows[1][2].is_null());
        assert!(table.rows[1][3].is_null());
    }

    #[test]
    fn test_query_status_ok() {
        let vot = VoTable::parse_str(SAMPLE).unwrap();
        let status = vot.query_status().unwrap();
        assert_eq!(status.value, "OK");
    }

    #[test]
    fn test_query_status_error_with_message() {
        let doc = r#"<VOTABLE><RESOURCE>
            <INFO name="QUERY_STATUS" value="ERROR">upstream exploded</INFO>
        </RESOURCE></VOTABLE>"#;
        let vot = VoTable::parse_str(doc).unwrap();
        let status = vot.query_status().unwrap();
        assert_eq!(status.value, "ERROR");
        assert_eq!(status.content.as_deref(), Some("upstream exploded"));
    }

    #[test]
    fn test_missing_data_section_is_empty_table() {
        let doc = r#"<VOTABLE><RESOURCE><TABLE>
            <FIELD name="x" datatype="double"/>
        </TABLE></RESOURCE></VOTABLE>"#;
        let vot = VoTable::parse_str(doc).unwrap();
        let table = vot.first_table().unwrap();
        assert_eq!(table.fields.len(), 1);
        assert!(table.is_empty());
    }

    #[test]
    fn test_excess_cells_are_rejected() {
        let doc = r#"<VOTABLE><RESOURCE><TABLE>
            <FIELD name="x" datatype="double"/>
            <DATA><TABLEDATA>
              <TR><TD>1.0</TD><TD>2.0</TD></TR>
            </TABLEDATA></DATA>
        </TABLE></RESOURCE></VOTABLE>"#;
        assert!(VoTable::parse_str(doc).is_err());
    }

    #[test]
    fn test_binary_serialization_is_rejected() {
        let doc = r#"<VOTABLE><RESOURCE><TABLE>
            <FIELD name="x" datatype="double"/>
            <DATA><BINARY><STREAM/></BINARY></DATA>
        </TABLE></RESOURCE></VOTABLE>"#;
        let err = VoTable::parse_str(doc).unwrap_err();
        assert!(err.to_string().contains("BINARY"));
    }

    #[test]
    fn test_not_xml_at_all() {
        assert!(VoTable::parse_str("<html>service is down</html>").is_err());
    }
}
