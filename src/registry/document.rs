//! Reading and appending `toolchains.xml` documents.
//!
//! Appends never re-serialize the document: the new `<toolchain>` fragment is
//! spliced in front of the closing root tag, so comments, attributes, and
//! toolchains this crate does not understand survive byte for byte.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::toolchain::RegisteredToolchain;

/// Name of the registry's root element.
pub const ROOT_ELEMENT: &str = "toolchains";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const CHILD_INDENT: &str = "  ";

/// Parse every `<toolchain>` element of a registry document.
pub fn parse_toolchains(xml: &str) -> Result<Vec<RegisteredToolchain>, String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut toolchains = Vec::new();
    let mut current: Option<RegisteredToolchain> = None;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = element_name(&e);
                if path.is_empty() {
                    check_root(&name)?;
                    saw_root = true;
                }
                if path.len() == 1 && name == "toolchain" {
                    current = Some(empty_toolchain());
                }
                // <vendor></vendor> carries no text event; any text overwrites this
                if let Some(tc) = current.as_mut() {
                    if path.len() == 3 && path[2] == "provides" {
                        tc.provides.insert(name.clone(), String::new());
                    }
                }
                path.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = element_name(&e);
                if path.is_empty() {
                    check_root(&name)?;
                    saw_root = true;
                }
                // <vendor/> provides an empty value
                if let Some(tc) = current.as_mut() {
                    if path.len() == 3 && path[2] == "provides" {
                        tc.provides.insert(name, String::new());
                    }
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| err.to_string())?;
                if let Some(tc) = current.as_mut() {
                    assign_text(tc, &path, &text);
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                if let Some(tc) = current.as_mut() {
                    assign_text(tc, &path, &text);
                }
            }
            Ok(Event::End(_)) => {
                if path.len() == 2 {
                    if let Some(tc) = current.take() {
                        toolchains.push(tc);
                    }
                }
                path.pop();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(format!(
                    "error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
        }
    }

    if !saw_root {
        return Err(format!("missing <{}> root element", ROOT_ELEMENT));
    }
    if let Some(open) = path.last() {
        return Err(format!("unexpected end of document inside <{}>", open));
    }

    Ok(toolchains)
}

/// Produce a new document with `toolchain` appended.
///
/// With no existing document a fresh one is created.
pub fn append_toolchain(
    existing: Option<&str>,
    toolchain: &RegisteredToolchain,
) -> Result<String, String> {
    let fragment = indent(&render_toolchain(toolchain));

    let Some(xml) = existing else {
        return Ok(format!(
            "{}\n<{}>\n{}</{}>\n",
            XML_DECLARATION, ROOT_ELEMENT, fragment, ROOT_ELEMENT
        ));
    };

    let mut out = String::with_capacity(xml.len() + fragment.len() + 32);
    match locate_root_end(xml)? {
        RootEnd::Closing(close) => {
            out.push_str(&xml[..close]);
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&fragment);
            out.push_str(&xml[close..]);
        }
        RootEnd::SelfClosing { start, end } => {
            let open = xml[start..end].trim_end_matches('>').trim_end_matches('/');
            out.push_str(&xml[..start]);
            out.push_str(open.trim_end());
            out.push_str(">\n");
            out.push_str(&fragment);
            out.push_str(&format!("</{}>", ROOT_ELEMENT));
            out.push_str(&xml[end..]);
        }
    }
    Ok(out)
}

/// Render a `<toolchain>` element, one child per line.
///
/// `version` and `vendor` come first in `provides`.
pub fn render_toolchain(toolchain: &RegisteredToolchain) -> String {
    let mut provides: Vec<(&String, &String)> = Vec::with_capacity(toolchain.provides.len());
    for key in ["version", "vendor"] {
        if let Some(entry) = toolchain.provides.get_key_value(key) {
            provides.push(entry);
        }
    }
    provides.extend(
        toolchain
            .provides
            .iter()
            .filter(|(k, _)| k.as_str() != "version" && k.as_str() != "vendor"),
    );

    let mut out = String::from("<toolchain>\n");
    out.push_str(&format!("  <type>{}</type>\n", escape(toolchain.kind.as_str())));
    out.push_str("  <provides>\n");
    for (key, value) in provides {
        out.push_str(&format!("    <{}>{}</{}>\n", key, escape(value.as_str()), key));
    }
    out.push_str("  </provides>\n");
    out.push_str("  <configuration>\n");
    out.push_str(&format!(
        "    <jdkHome>{}</jdkHome>\n",
        escape(toolchain.install_path.to_string_lossy().as_ref())
    ));
    out.push_str("  </configuration>\n");
    out.push_str("</toolchain>\n");
    out
}

enum RootEnd {
    /// Byte offset of `</toolchains>`.
    Closing(usize),
    /// Byte range of `<toolchains/>`.
    SelfClosing { start: usize, end: usize },
}

fn locate_root_end(xml: &str) -> Result<RootEnd, String> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if depth == 0 {
                    check_root(&element_name(&e))?;
                }
                depth += 1;
            }
            Ok(Event::Empty(e)) if depth == 0 => {
                check_root(&element_name(&e))?;
                let end = reader.buffer_position();
                let start = xml[..end]
                    .rfind('<')
                    .ok_or_else(|| "unterminated root element".to_string())?;
                return Ok(RootEnd::SelfClosing { start, end });
            }
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let end = reader.buffer_position();
                    let start = xml[..end]
                        .rfind("</")
                        .ok_or_else(|| "unterminated root element".to_string())?;
                    return Ok(RootEnd::Closing(start));
                }
            }
            Ok(Event::Eof) => return Err(format!("missing <{}> root element", ROOT_ELEMENT)),
            Ok(_) => {}
            Err(e) => {
                return Err(format!(
                    "error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
        }
    }
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn check_root(name: &str) -> Result<(), String> {
    if name == ROOT_ELEMENT {
        Ok(())
    } else {
        Err(format!(
            "expected <{}> root element, found <{}>",
            ROOT_ELEMENT, name
        ))
    }
}

fn empty_toolchain() -> RegisteredToolchain {
    RegisteredToolchain {
        kind: String::new(),
        provides: BTreeMap::new(),
        install_path: PathBuf::new(),
    }
}

// path is [toolchains, toolchain, ...]
fn assign_text(tc: &mut RegisteredToolchain, path: &[String], text: &str) {
    match path.get(2..).unwrap_or_default() {
        [leaf] if leaf == "type" => tc.kind = text.to_string(),
        [section, key] if section == "provides" => {
            tc.provides.insert(key.clone(), text.to_string());
        }
        [section, key] if section == "configuration" && key == "jdkHome" => {
            tc.install_path = PathBuf::from(text);
        }
        _ => {}
    }
}

fn indent(fragment: &str) -> String {
    fragment
        .lines()
        .map(|line| format!("{}{}\n", CHILD_INDENT, line))
        .collect()
}
