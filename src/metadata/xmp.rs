use img_parts::Bytes;
use img_parts::jpeg::Jpeg;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;

const XMP_HEADER: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
const PACKET_OPEN: &[u8] = b"<x:xmpmeta";
const PACKET_CLOSE: &[u8] = b"</x:xmpmeta>";

/// Canonical prefixes by namespace URI, so keys do not depend on the
/// prefix a particular writer chose.
const KNOWN_NAMESPACES: &[(&str, &str)] = &[
    ("http://www.w3.org/1999/02/22-rdf-syntax-ns#", "rdf"),
    ("http://www.w3.org/XML/1998/namespace", "xml"),
    ("http://purl.org/dc/elements/1.1/", "dc"),
    ("http://ns.adobe.com/xap/1.0/", "xmp"),
    ("http://ns.adobe.com/xap/1.0/rights/", "xmpRights"),
    ("http://ns.adobe.com/photoshop/1.0/", "photoshop"),
    ("http://ns.adobe.com/exif/1.0/", "exif"),
    ("http://ns.adobe.com/tiff/1.0/", "tiff"),
    ("http://www.metadataworkinggroup.com/schemas/regions/", "mwg-rs"),
    ("http://www.metadataworkinggroup.com/schemas/keywords/", "mwg-kw"),
    ("http://ns.adobe.com/xmp/sType/Area#", "stArea"),
    ("http://ns.adobe.com/xap/1.0/sType/Dimensions#", "stDim"),
    ("http://www.digikam.org/ns/1.0/", "digiKam"),
    ("http://ns.microsoft.com/photo/1.0/", "MicrosoftPhoto"),
    ("http://ns.microsoft.com/photo/1.2/", "MP"),
    ("http://ns.adobe.com/lightroom/1.0/", "lr"),
    ("http://ns.acdsee.com/iptc/1.0/", "acdsee"),
    ("http://iptc.org/std/Iptc4xmpExt/2008-02-29/", "iptcExt"),
    ("http://iptc.org/std/Iptc4xmpCore/1.0/xmlns/", "Iptc4xmpCore"),
];

/// Read the XMP packet of an in-memory image as flattened `(key, raw)` pairs.
pub(crate) fn read_xmp(bytes: &[u8]) -> Vec<(String, String)> {
    let Some(packet) = find_packet(bytes) else {
        return Vec::new();
    };
    match parse_packet(&packet) {
        Ok(entries) => {
            log::debug!("Read {} XMP properties", entries.len());
            entries
        }
        Err(e) => {
            log::debug!("Malformed XMP packet: {e}");
            Vec::new()
        }
    }
}

/// Locate the XMP packet: the JPEG APP1 segment when the buffer is a JPEG,
/// otherwise the first `<x:xmpmeta>` element anywhere in the file (PNG iTXt,
/// WebP `XMP ` chunk, TIFF tag 700 all store it uncompressed).
fn find_packet(bytes: &[u8]) -> Option<Vec<u8>> {
    if let Ok(jpeg) = Jpeg::from_bytes(Bytes::copy_from_slice(bytes)) {
        let segment = jpeg
            .segments()
            .iter()
            .find(|s| s.marker() == 0xE1 && s.contents().starts_with(XMP_HEADER));
        if let Some(segment) = segment {
            return Some(segment.contents()[XMP_HEADER.len()..].to_vec());
        }
    }

    let start = find(bytes, PACKET_OPEN)?;
    let end = find(&bytes[start..], PACKET_CLOSE)? + start + PACKET_CLOSE.len();
    Some(bytes[start..end].to_vec())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Minimal element tree; XMP packets are small enough to hold in memory.
#[derive(Debug, Default)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn from_start(start: &BytesStart) -> Result<Self, quick_xml::Error> {
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attrs.push((key, value));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attrs,
            ..Default::default()
        })
    }
}

fn parse_tree(xml: &[u8]) -> Result<Element, quick_xml::Error> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack = vec![Element::default()];

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => stack.push(Element::from_start(e)?),
            Event::Empty(ref e) => {
                let element = Element::from_start(e)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(element);
                }
            }
            Event::End(_) => close_top(&mut stack),
            Event::Text(ref t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(ref c) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    while stack.len() > 1 {
        close_top(&mut stack);
    }
    Ok(stack.pop().unwrap_or_default())
}

fn close_top(stack: &mut Vec<Element>) {
    if stack.len() < 2 {
        return;
    }
    if let Some(element) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(element);
        }
    }
}

/// Prefix → URI declarations found anywhere in the packet.
struct Namespaces {
    declared: HashMap<String, String>,
}

impl Namespaces {
    fn collect(root: &Element) -> Self {
        let mut declared = HashMap::new();
        let mut pending = vec![root];
        while let Some(element) = pending.pop() {
            for (key, value) in &element.attrs {
                if let Some(prefix) = key.strip_prefix("xmlns:") {
                    declared
                        .entry(prefix.to_string())
                        .or_insert_with(|| value.clone());
                }
            }
            pending.extend(element.children.iter());
        }
        Self { declared }
    }

    /// Normalize a `prefix:local` name to its canonical prefix.
    fn qname(&self, raw: &str) -> String {
        let Some((prefix, local)) = raw.split_once(':') else {
            return raw.to_string();
        };
        let canonical = self
            .declared
            .get(prefix)
            .and_then(|uri| {
                KNOWN_NAMESPACES
                    .iter()
                    .find(|(known, _)| known == uri)
                    .map(|(_, p)| *p)
            })
            .unwrap_or(prefix);
        format!("{canonical}:{local}")
    }

    fn is_property_attr(&self, raw: &str) -> bool {
        if raw == "xmlns" || raw.starts_with("xmlns:") {
            return false;
        }
        let qname = self.qname(raw);
        raw.contains(':') && !qname.starts_with("rdf:") && !qname.starts_with("xml:")
    }
}

fn parse_packet(xml: &[u8]) -> Result<Vec<(String, String)>, quick_xml::Error> {
    let root = parse_tree(xml)?;
    let ns = Namespaces::collect(&root);
    let mut out = Vec::new();

    let Some(rdf) = find_element(&root, &ns, "rdf:RDF") else {
        return Ok(out);
    };
    for description in rdf
        .children
        .iter()
        .filter(|c| ns.qname(&c.name) == "rdf:Description")
    {
        for (key, value) in &description.attrs {
            if ns.is_property_attr(key) {
                out.push((top_level_key(&ns.qname(key)), value.clone()));
            }
        }
        for child in &description.children {
            property(&top_level_key(&ns.qname(&child.name)), child, &ns, &mut out);
        }
    }
    Ok(out)
}

fn find_element<'a>(element: &'a Element, ns: &Namespaces, qname: &str) -> Option<&'a Element> {
    if ns.qname(&element.name) == qname {
        return Some(element);
    }
    element
        .children
        .iter()
        .find_map(|child| find_element(child, ns, qname))
}

/// `dc:title` → `Xmp.dc.title`
fn top_level_key(qname: &str) -> String {
    match qname.split_once(':') {
        Some((prefix, local)) => format!("Xmp.{prefix}.{local}"),
        None => format!("Xmp.{qname}"),
    }
}

fn attr<'a>(element: &'a Element, ns: &Namespaces, qname: &str) -> Option<&'a str> {
    element
        .attrs
        .iter()
        .find(|(k, _)| ns.qname(k) == qname)
        .map(|(_, v)| v.as_str())
}

fn is_resource(element: &Element, ns: &Namespaces) -> bool {
    attr(element, ns, "rdf:parseType") == Some("Resource")
}

fn is_simple(element: &Element, ns: &Namespaces) -> bool {
    element.children.is_empty()
        && !is_resource(element, ns)
        && !element.attrs.iter().any(|(k, _)| ns.is_property_attr(k))
}

fn property(path: &str, element: &Element, ns: &Namespaces, out: &mut Vec<(String, String)>) {
    if let Some(resource) = attr(element, ns, "rdf:resource") {
        out.push((path.to_string(), resource.to_string()));
        return;
    }

    let container = element.children.iter().find(|c| {
        matches!(
            ns.qname(&c.name).as_str(),
            "rdf:Bag" | "rdf:Seq" | "rdf:Alt"
        )
    });
    if let Some(container) = container {
        array(path, container, ns, out);
    } else if is_simple(element, ns) {
        out.push((path.to_string(), element.text.clone()));
    } else {
        structure(path, element, ns, out);
    }
}

fn array(path: &str, container: &Element, ns: &Namespaces, out: &mut Vec<(String, String)>) {
    let items: Vec<&Element> = container
        .children
        .iter()
        .filter(|c| ns.qname(&c.name) == "rdf:li")
        .collect();

    if items.iter().all(|li| is_simple(li, ns)) {
        let value = if ns.qname(&container.name) == "rdf:Alt" {
            items
                .iter()
                .find(|li| attr(li, ns, "xml:lang") == Some("x-default"))
                .or(items.first())
                .map(|li| li.text.clone())
                .unwrap_or_default()
        } else {
            items
                .iter()
                .map(|li| li.text.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        out.push((path.to_string(), value));
        return;
    }

    for (i, li) in items.iter().enumerate() {
        let item_path = format!("{path}[{}]", i + 1);
        if is_simple(li, ns) {
            out.push((item_path, li.text.clone()));
        } else {
            structure(&item_path, li, ns, out);
        }
    }
}

/// Flatten struct fields as `<path>/<qname>`. Fields may be attributes,
/// child elements, or both, optionally wrapped in an `rdf:Description`.
fn structure(path: &str, element: &Element, ns: &Namespaces, out: &mut Vec<(String, String)>) {
    let inner = element
        .children
        .iter()
        .find(|c| ns.qname(&c.name) == "rdf:Description");

    let mut field_attrs: Vec<&(String, String)> = element.attrs.iter().collect();
    let fields: &[Element] = match inner {
        Some(description) => {
            field_attrs.extend(description.attrs.iter());
            &description.children
        }
        None => &element.children,
    };

    for (key, value) in field_attrs {
        if ns.is_property_attr(key) {
            out.push((format!("{path}/{}", ns.qname(key)), value.clone()));
        }
    }
    for field in fields {
        property(&format!("{path}/{}", ns.qname(&field.name)), field, ns, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use img_parts::jpeg::JpegSegment;

    const PACKET: &str = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
 <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about=""
    xmlns:dc="http://purl.org/dc/elements/1.1/"
    xmlns:mwg-rs="http://www.metadataworkinggroup.com/schemas/regions/"
    xmlns:stArea="http://ns.adobe.com/xmp/sType/Area#"
    xmlns:stDim="http://ns.adobe.com/xap/1.0/sType/Dimensions#"
    xmlns:acdsee="http://ns.acdsee.com/iptc/1.0/"
    acdsee:caption="Family picnic">
   <dc:title><rdf:Alt>
     <rdf:li xml:lang="fr-FR">Pique-nique</rdf:li>
     <rdf:li xml:lang="x-default">Picnic</rdf:li>
   </rdf:Alt></dc:title>
   <dc:subject><rdf:Bag>
     <rdf:li>family</rdf:li>
     <rdf:li>summer &amp; sun</rdf:li>
   </rdf:Bag></dc:subject>
   <mwg-rs:Regions rdf:parseType="Resource">
    <mwg-rs:AppliedToDimensions stDim:w="400" stDim:h="300" stDim:unit="pixel"/>
    <mwg-rs:RegionList>
     <rdf:Bag>
      <rdf:li>
       <rdf:Description mwg-rs:Name="Alice" mwg-rs:Type="Face">
        <mwg-rs:Area stArea:x="0.25" stArea:y="0.5" stArea:w="0.1" stArea:h="0.2" stArea:unit="normalized"/>
       </rdf:Description>
      </rdf:li>
      <rdf:li rdf:parseType="Resource">
       <mwg-rs:Name>Bob</mwg-rs:Name>
       <mwg-rs:Type>Face</mwg-rs:Type>
       <mwg-rs:Area rdf:parseType="Resource">
        <stArea:x>0.75</stArea:x>
        <stArea:y>0.5</stArea:y>
        <stArea:w>0.2</stArea:w>
        <stArea:h>0.4</stArea:h>
       </mwg-rs:Area>
      </rdf:li>
     </rdf:Bag>
    </mwg-rs:RegionList>
   </mwg-rs:Regions>
  </rdf:Description>
 </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#;

    fn lookup<'a>(entries: &'a [(String, String)], key: &str) -> Option<&'a str> {
        entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    // ── parse_packet ─────────────────────────────────────────────────

    #[test]
    fn simple_and_attribute_properties() {
        let entries = parse_packet(PACKET.as_bytes()).unwrap();
        assert_eq!(lookup(&entries, "Xmp.acdsee.caption"), Some("Family picnic"));
        assert_eq!(lookup(&entries, "Xmp.dc.title"), Some("Picnic"));
        assert_eq!(lookup(&entries, "Xmp.dc.subject"), Some("family, summer & sun"));
    }

    #[test]
    fn region_list_attribute_style() {
        let entries = parse_packet(PACKET.as_bytes()).unwrap();
        let base = "Xmp.mwg-rs.Regions/mwg-rs:RegionList[1]";
        assert_eq!(lookup(&entries, &format!("{base}/mwg-rs:Name")), Some("Alice"));
        assert_eq!(lookup(&entries, &format!("{base}/mwg-rs:Type")), Some("Face"));
        assert_eq!(lookup(&entries, &format!("{base}/mwg-rs:Area/stArea:x")), Some("0.25"));
        assert_eq!(
            lookup(&entries, &format!("{base}/mwg-rs:Area/stArea:unit")),
            Some("normalized")
        );
    }

    #[test]
    fn region_list_element_style() {
        let entries = parse_packet(PACKET.as_bytes()).unwrap();
        let base = "Xmp.mwg-rs.Regions/mwg-rs:RegionList[2]";
        assert_eq!(lookup(&entries, &format!("{base}/mwg-rs:Name")), Some("Bob"));
        assert_eq!(lookup(&entries, &format!("{base}/mwg-rs:Area/stArea:h")), Some("0.4"));
        assert!(lookup(&entries, "Xmp.mwg-rs.Regions/mwg-rs:RegionList[3]/mwg-rs:Name").is_none());
    }

    #[test]
    fn struct_fields_from_empty_element() {
        let entries = parse_packet(PACKET.as_bytes()).unwrap();
        assert_eq!(
            lookup(&entries, "Xmp.mwg-rs.Regions/mwg-rs:AppliedToDimensions/stDim:w"),
            Some("400")
        );
    }

    #[test]
    fn prefixes_are_normalized_by_uri() {
        let xml = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
<r:RDF xmlns:r="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
 <r:Description xmlns:elements="http://purl.org/dc/elements/1.1/">
  <elements:description>Hello</elements:description>
 </r:Description>
</r:RDF></x:xmpmeta>"#;
        let entries = parse_packet(xml.as_bytes()).unwrap();
        assert_eq!(lookup(&entries, "Xmp.dc.description"), Some("Hello"));
    }

    #[test]
    fn packet_without_rdf_is_empty() {
        let entries = parse_packet(b"<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"/>").unwrap();
        assert!(entries.is_empty());
    }

    // ── find_packet ──────────────────────────────────────────────────

    #[test]
    fn packet_found_by_scanning() {
        let mut bytes = b"\x89PNG\r\n\x1a\n....iTXtXML:com.adobe.xmp\0\0\0\0\0".to_vec();
        bytes.extend_from_slice(PACKET.as_bytes());
        bytes.extend_from_slice(b"....IEND");

        let packet = find_packet(&bytes).unwrap();
        assert!(packet.starts_with(PACKET_OPEN));
        assert!(packet.ends_with(PACKET_CLOSE));
    }

    #[test]
    fn packet_found_in_jpeg_app1() {
        let img = image::RgbImage::new(8, 8);
        let mut encoded = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut encoded), image::ImageFormat::Jpeg)
            .unwrap();

        let mut jpeg = Jpeg::from_bytes(Bytes::from(encoded)).unwrap();
        let mut contents = XMP_HEADER.to_vec();
        contents.extend_from_slice(PACKET.as_bytes());
        jpeg.segments_mut()
            .insert(0, JpegSegment::new_with_contents(0xE1, Bytes::from(contents)));
        let bytes = jpeg.encoder().bytes();

        let entries = read_xmp(&bytes);
        assert_eq!(lookup(&entries, "Xmp.dc.title"), Some("Picnic"));
    }

    #[test]
    fn no_packet_no_entries() {
        assert!(read_xmp(b"plain bytes with no metadata").is_empty());
    }
}
