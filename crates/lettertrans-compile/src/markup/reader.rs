// Markup event reader with switchable diagnostics.
//
// Wraps `quick_xml::Reader` so that every well-formedness error becomes a
// `CompileError::Markup` carrying the byte position. With diagnostics
// enabled the error is also logged; the format probe runs with diagnostics
// suppressed so that flat sources never produce markup warnings.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::CompileError;

/// Whether markup errors are reported through the log as they happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostics {
    Enabled,
    Suppressed,
}

pub struct MarkupReader<'a> {
    reader: Reader<&'a [u8]>,
    diagnostics: Diagnostics,
}

impl<'a> MarkupReader<'a> {
    pub fn new(source: &'a str, diagnostics: Diagnostics) -> Self {
        Self {
            reader: Reader::from_str(source),
            diagnostics,
        }
    }

    /// Next markup event. Malformed input is reported as an error.
    pub fn next_event(&mut self) -> Result<Event<'a>, CompileError> {
        match self.reader.read_event() {
            Ok(event) => Ok(event),
            Err(e) => Err(self.error(e.to_string())),
        }
    }

    /// Build a markup error at the current position, logging it when
    /// diagnostics are enabled.
    pub fn error(&self, message: String) -> CompileError {
        let position = self.reader.buffer_position() as u64;
        if self.diagnostics == Diagnostics::Enabled {
            log::warn!("markup error at byte {position}: {message}");
        }
        CompileError::Markup { position, message }
    }

    /// Value of attribute `key` on `element`, unescaped.
    pub fn attribute(
        &self,
        element: &BytesStart<'_>,
        key: &str,
    ) -> Result<Option<String>, CompileError> {
        for attr in element.attributes() {
            let attr = attr.map_err(|e| self.error(e.to_string()))?;
            if attr.key.as_ref() == key.as_bytes() {
                let value = attr.unescape_value().map_err(|e| self.error(e.to_string()))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    /// Like [`MarkupReader::attribute`] but the attribute must be present.
    pub fn required_attribute(
        &self,
        element: &BytesStart<'_>,
        key: &'static str,
    ) -> Result<String, CompileError> {
        self.attribute(element, key)?
            .ok_or_else(|| CompileError::MissingAttribute {
                element: element_name(element),
                attribute: key,
            })
    }

    /// Consume events up to and including the end tag matching an already
    /// consumed start tag.
    pub fn skip_element(&mut self) -> Result<(), CompileError> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.next_event()? {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth -= 1,
                Event::Eof => return Err(self.error("unexpected end of document".to_string())),
                _ => {}
            }
        }
        Ok(())
    }
}

/// Local name of a start or empty element as an owned string.
pub fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

/// True for text made only of whitespace (indentation between elements).
pub fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

/// Check whether `source` is a well-formed markup document.
///
/// The whole source is scanned with diagnostics suppressed. It qualifies
/// when it has exactly one root element, balanced tags and no text outside
/// the root. This never fails: malformed input simply is not markup.
pub fn probe(source: &str) -> bool {
    let mut reader = MarkupReader::new(source, Diagnostics::Suppressed);
    let mut depth = 0usize;
    let mut roots = 0usize;
    loop {
        let event = match reader.next_event() {
            Ok(event) => event,
            Err(_) => return false,
        };
        match event {
            Event::Start(_) => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Event::End(_) => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            Event::Empty(_) => {
                if depth == 0 {
                    roots += 1;
                }
            }
            Event::Text(text) => {
                if depth == 0 && !is_blank(&text) {
                    return false;
                }
            }
            Event::CData(_) => {
                if depth == 0 {
                    return false;
                }
            }
            Event::Eof => return depth == 0 && roots == 1,
            _ => {}
        }
    }
}
