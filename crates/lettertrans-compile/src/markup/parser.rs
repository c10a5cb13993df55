// Markup dictionary parser: events to an owned dictionary model.
//
// Accepted structure:
//
//   <dictionary>
//     <alphabet>letters</alphabet>
//     <sdefs><sdef n="tag"/>...</sdefs>
//     <pardefs><pardef n="name"><e>...</e></pardef>...</pardefs>
//     <section id="main" type="standard"><e>...</e>...</section>
//   </dictionary>
//
// Entry content: <i>, <p><l/><r/></p> and <par n=""/>. Inside <i>, <l>
// and <r>: text, <s n=""/>, <b/>, <j/>, <m/> and <g>...</g>.

use quick_xml::events::{BytesStart, Event};

use crate::CompileError;
use crate::markup::reader::{Diagnostics, MarkupReader, element_name, is_blank};
use crate::options::Direction;

/// Parsed dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    pub letters: Vec<char>,
    /// Declared tag names, in declaration order.
    pub tags: Vec<String>,
    pub pardefs: Vec<Pardef>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pardef {
    pub name: String,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub id: String,
    /// Section type (`standard`, `inconditional`, `postblank`, `preblank`).
    pub kind: String,
    pub entries: Vec<Entry>,
}

/// One `<e>` element with its selection attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
    /// `r="LR"` or `r="RL"`: compile only in that direction.
    pub restriction: Option<Direction>,
    pub variant: Option<String>,
    pub alt: Option<String>,
    pub variant_left: Option<String>,
    pub variant_right: Option<String>,
    /// `i="yes"`: never compiled.
    pub ignore: bool,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Same content on both sides.
    Identity(Vec<Piece>),
    Pair { left: Vec<Piece>, right: Vec<Piece> },
    /// Reference to a paradigm by name.
    Paradigm(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Piece {
    Char(char),
    Tag(String),
    /// Morpheme boundary, kept only on request.
    Boundary,
}

/// Parse a markup dictionary.
pub fn parse(source: &str, diagnostics: Diagnostics) -> Result<Dictionary, CompileError> {
    let mut parser = Parser {
        reader: MarkupReader::new(source, diagnostics),
    };
    parser.document()
}

struct Parser<'a> {
    reader: MarkupReader<'a>,
}

impl<'a> Parser<'a> {
    fn unexpected(&self, element: &BytesStart<'_>, parent: &str) -> CompileError {
        let element = element_name(element);
        if element == "re" {
            return CompileError::Unsupported(element);
        }
        CompileError::UnexpectedElement {
            element,
            parent: parent.to_string(),
        }
    }

    fn stray_text(&self, parent: &str) -> CompileError {
        self.reader.error(format!("unexpected text in <{parent}>"))
    }

    fn document(&mut self) -> Result<Dictionary, CompileError> {
        loop {
            match self.reader.next_event()? {
                Event::Start(e) if e.name().as_ref() == b"dictionary" => return self.dictionary(),
                Event::Empty(e) if e.name().as_ref() == b"dictionary" => {
                    return Ok(Dictionary::default());
                }
                Event::Start(e) | Event::Empty(e) => return Err(self.unexpected(&e, "document")),
                Event::Text(t) if !is_blank(&t) => return Err(self.stray_text("document")),
                Event::Eof => {
                    return Err(self.reader.error("no <dictionary> element".to_string()));
                }
                _ => {}
            }
        }
    }

    fn dictionary(&mut self) -> Result<Dictionary, CompileError> {
        let mut dict = Dictionary::default();
        loop {
            match self.reader.next_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"alphabet" => dict.letters.extend(self.alphabet()?),
                    b"sdefs" => dict.tags.extend(self.sdefs()?),
                    b"pardefs" => dict.pardefs.extend(self.pardefs()?),
                    b"section" => {
                        let (id, kind) = self.section_attributes(&e)?;
                        let entries = self.entries("section")?;
                        dict.sections.push(Section { id, kind, entries });
                    }
                    _ => return Err(self.unexpected(&e, "dictionary")),
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"alphabet" | b"sdefs" | b"pardefs" => {}
                    b"section" => {
                        let (id, kind) = self.section_attributes(&e)?;
                        dict.sections.push(Section {
                            id,
                            kind,
                            entries: Vec::new(),
                        });
                    }
                    _ => return Err(self.unexpected(&e, "dictionary")),
                },
                Event::End(_) => return Ok(dict),
                Event::Text(t) if !is_blank(&t) => return Err(self.stray_text("dictionary")),
                Event::Eof => {
                    return Err(self.reader.error("unexpected end of document".to_string()));
                }
                _ => {}
            }
        }
    }

    fn section_attributes(&self, e: &BytesStart<'_>) -> Result<(String, String), CompileError> {
        let id = self.reader.required_attribute(e, "id")?;
        let kind = self
            .reader
            .attribute(e, "type")?
            .unwrap_or_else(|| "standard".to_string());
        Ok((id, kind))
    }

    fn alphabet(&mut self) -> Result<Vec<char>, CompileError> {
        let mut letters = Vec::new();
        loop {
            match self.reader.next_event()? {
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| self.reader.error(e.to_string()))?;
                    letters.extend(text.chars().filter(|c| !c.is_whitespace()));
                }
                Event::End(_) => return Ok(letters),
                Event::Start(e) | Event::Empty(e) => return Err(self.unexpected(&e, "alphabet")),
                Event::Eof => {
                    return Err(self.reader.error("unexpected end of document".to_string()));
                }
                _ => {}
            }
        }
    }

    fn sdefs(&mut self) -> Result<Vec<String>, CompileError> {
        let mut tags = Vec::new();
        loop {
            match self.reader.next_event()? {
                Event::Empty(e) if e.name().as_ref() == b"sdef" => {
                    tags.push(self.reader.required_attribute(&e, "n")?);
                }
                Event::Start(e) if e.name().as_ref() == b"sdef" => {
                    tags.push(self.reader.required_attribute(&e, "n")?);
                    self.reader.skip_element()?;
                }
                Event::Start(e) | Event::Empty(e) => return Err(self.unexpected(&e, "sdefs")),
                Event::End(_) => return Ok(tags),
                Event::Text(t) if !is_blank(&t) => return Err(self.stray_text("sdefs")),
                Event::Eof => {
                    return Err(self.reader.error("unexpected end of document".to_string()));
                }
                _ => {}
            }
        }
    }

    fn pardefs(&mut self) -> Result<Vec<Pardef>, CompileError> {
        let mut pardefs = Vec::new();
        loop {
            match self.reader.next_event()? {
                Event::Start(e) if e.name().as_ref() == b"pardef" => {
                    let name = self.reader.required_attribute(&e, "n")?;
                    let entries = self.entries("pardef")?;
                    pardefs.push(Pardef { name, entries });
                }
                Event::Empty(e) if e.name().as_ref() == b"pardef" => {
                    let name = self.reader.required_attribute(&e, "n")?;
                    pardefs.push(Pardef {
                        name,
                        entries: Vec::new(),
                    });
                }
                Event::Start(e) | Event::Empty(e) => return Err(self.unexpected(&e, "pardefs")),
                Event::End(_) => return Ok(pardefs),
                Event::Text(t) if !is_blank(&t) => return Err(self.stray_text("pardefs")),
                Event::Eof => {
                    return Err(self.reader.error("unexpected end of document".to_string()));
                }
                _ => {}
            }
        }
    }

    /// Entries of a `<section>` or `<pardef>`, up to its end tag.
    fn entries(&mut self, parent: &str) -> Result<Vec<Entry>, CompileError> {
        let mut entries = Vec::new();
        loop {
            match self.reader.next_event()? {
                Event::Start(e) if e.name().as_ref() == b"e" => {
                    let mut entry = self.entry_attributes(&e)?;
                    entry.items = self.entry_items()?;
                    entries.push(entry);
                }
                Event::Empty(e) if e.name().as_ref() == b"e" => {
                    entries.push(self.entry_attributes(&e)?);
                }
                Event::Start(e) | Event::Empty(e) => return Err(self.unexpected(&e, parent)),
                Event::End(_) => return Ok(entries),
                Event::Text(t) if !is_blank(&t) => return Err(self.stray_text(parent)),
                Event::Eof => {
                    return Err(self.reader.error("unexpected end of document".to_string()));
                }
                _ => {}
            }
        }
    }

    fn entry_attributes(&self, e: &BytesStart<'_>) -> Result<Entry, CompileError> {
        let restriction = match self.reader.attribute(e, "r")?.as_deref() {
            None => None,
            Some("LR") => Some(Direction::Forward),
            Some("RL") => Some(Direction::Reverse),
            Some(other) => {
                return Err(self
                    .reader
                    .error(format!("invalid restriction r=\"{other}\" (expected LR or RL)")));
            }
        };
        Ok(Entry {
            restriction,
            variant: self.reader.attribute(e, "v")?,
            alt: self.reader.attribute(e, "alt")?,
            variant_left: self.reader.attribute(e, "vl")?,
            variant_right: self.reader.attribute(e, "vr")?,
            ignore: self.reader.attribute(e, "i")?.as_deref() == Some("yes"),
            items: Vec::new(),
        })
    }

    fn entry_items(&mut self) -> Result<Vec<Item>, CompileError> {
        let mut items = Vec::new();
        loop {
            match self.reader.next_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"i" => items.push(Item::Identity(self.pieces("i")?)),
                    b"p" => items.push(self.pair()?),
                    b"par" => {
                        items.push(Item::Paradigm(self.reader.required_attribute(&e, "n")?));
                        self.reader.skip_element()?;
                    }
                    _ => return Err(self.unexpected(&e, "e")),
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"i" => items.push(Item::Identity(Vec::new())),
                    b"p" => items.push(Item::Pair {
                        left: Vec::new(),
                        right: Vec::new(),
                    }),
                    b"par" => items.push(Item::Paradigm(self.reader.required_attribute(&e, "n")?)),
                    _ => return Err(self.unexpected(&e, "e")),
                },
                Event::End(_) => return Ok(items),
                Event::Text(t) if !is_blank(&t) => return Err(self.stray_text("e")),
                Event::Eof => {
                    return Err(self.reader.error("unexpected end of document".to_string()));
                }
                _ => {}
            }
        }
    }

    fn pair(&mut self) -> Result<Item, CompileError> {
        let mut left = Vec::new();
        let mut right = Vec::new();
        loop {
            match self.reader.next_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"l" => left = self.pieces("l")?,
                    b"r" => right = self.pieces("r")?,
                    _ => return Err(self.unexpected(&e, "p")),
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"l" => left.clear(),
                    b"r" => right.clear(),
                    _ => return Err(self.unexpected(&e, "p")),
                },
                Event::End(_) => return Ok(Item::Pair { left, right }),
                Event::Text(t) if !is_blank(&t) => return Err(self.stray_text("p")),
                Event::Eof => {
                    return Err(self.reader.error("unexpected end of document".to_string()));
                }
                _ => {}
            }
        }
    }

    /// Symbol content of `<i>`, `<l>`, `<r>` or `<g>`, up to its end tag.
    fn pieces(&mut self, parent: &str) -> Result<Vec<Piece>, CompileError> {
        let mut pieces = Vec::new();
        loop {
            match self.reader.next_event()? {
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| self.reader.error(e.to_string()))?;
                    pieces.extend(text.chars().map(Piece::Char));
                }
                Event::CData(t) => {
                    let text = String::from_utf8_lossy(&t).into_owned();
                    pieces.extend(text.chars().map(Piece::Char));
                }
                Event::Start(e) if e.name().as_ref() == b"g" => {
                    pieces.push(Piece::Char('#'));
                    pieces.extend(self.pieces("g")?);
                }
                Event::Start(e) => {
                    let piece = self.void_piece(&e, parent)?;
                    self.reader.skip_element()?;
                    pieces.extend(piece);
                }
                Event::Empty(e) => pieces.extend(self.void_piece(&e, parent)?),
                Event::End(_) => return Ok(pieces),
                Event::Eof => {
                    return Err(self.reader.error("unexpected end of document".to_string()));
                }
                _ => {}
            }
        }
    }

    /// Pieces written as elements without content.
    fn void_piece(&self, e: &BytesStart<'_>, parent: &str) -> Result<Option<Piece>, CompileError> {
        match e.name().as_ref() {
            b"s" => Ok(Some(Piece::Tag(self.reader.required_attribute(e, "n")?))),
            b"b" => Ok(Some(Piece::Char(' '))),
            b"j" => Ok(Some(Piece::Char('+'))),
            b"g" => Ok(Some(Piece::Char('#'))),
            b"m" => Ok(Some(Piece::Boundary)),
            _ => Err(self.unexpected(e, parent)),
        }
    }
}
