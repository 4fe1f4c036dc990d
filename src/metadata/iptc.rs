use img_parts::Bytes;
use img_parts::jpeg::Jpeg;

const IPTC_HEADER: &[u8] = b"Photoshop 3.0\0";
const IPTC_8BIM: &[u8] = b"8BIM";
const IIM_RESOURCE_ID: u16 = 0x0404;
const IIM_TAG_MARKER: u8 = 0x1C;

/// Application record (2:xx) datasets, named as exiv2 names them.
const DATASETS: &[(u8, &str)] = &[
    (5, "ObjectName"),
    (7, "EditStatus"),
    (10, "Urgency"),
    (15, "Category"),
    (20, "SuppCategory"),
    (25, "Keywords"),
    (40, "SpecialInstructions"),
    (55, "DateCreated"),
    (60, "TimeCreated"),
    (80, "Byline"),
    (85, "BylineTitle"),
    (90, "City"),
    (92, "SubLocation"),
    (95, "ProvinceState"),
    (100, "CountryCode"),
    (101, "CountryName"),
    (103, "TransmissionReference"),
    (105, "Headline"),
    (110, "Credit"),
    (115, "Source"),
    (116, "Copyright"),
    (118, "Contact"),
    (120, "Caption"),
    (122, "Writer"),
];

/// Read IPTC-IIM datasets from a JPEG's Photoshop APP13 segment.
///
/// Repeatable datasets (keywords, categories) are joined with `", "`.
pub(crate) fn read_iptc(bytes: &[u8]) -> Vec<(String, String)> {
    let Ok(jpeg) = Jpeg::from_bytes(Bytes::copy_from_slice(bytes)) else {
        return Vec::new();
    };
    let Some(segment) = jpeg
        .segments()
        .iter()
        .find(|s| s.marker() == 0xED && s.contents().starts_with(IPTC_HEADER))
    else {
        return Vec::new();
    };
    let Some(iim) = find_iim_resource(segment.contents()) else {
        return Vec::new();
    };

    let entries = parse_iim(iim);
    log::debug!("Read {} IPTC datasets", entries.len());
    entries
}

/// Walk the 8BIM image resource blocks and return the IPTC-IIM payload.
fn find_iim_resource(data: &[u8]) -> Option<&[u8]> {
    let mut pos = IPTC_HEADER.len();
    while pos + 12 <= data.len() {
        if &data[pos..pos + 4] != IPTC_8BIM {
            return None;
        }
        let resource_id = u16::from_be_bytes([data[pos + 4], data[pos + 5]]);
        // Pascal string name, padded to an even length including its length byte
        let pascal_len = data[pos + 6] as usize;
        let pascal_padded = if (pascal_len + 1) % 2 == 0 {
            pascal_len + 1
        } else {
            pascal_len + 2
        };
        let data_start = pos + 6 + pascal_padded;
        if data_start + 4 > data.len() {
            return None;
        }
        let data_len = u32::from_be_bytes([
            data[data_start],
            data[data_start + 1],
            data[data_start + 2],
            data[data_start + 3],
        ]) as usize;
        let payload_start = data_start + 4;
        let payload_end = payload_start.checked_add(data_len)?;
        if payload_end > data.len() {
            return None;
        }

        if resource_id == IIM_RESOURCE_ID {
            return Some(&data[payload_start..payload_end]);
        }

        pos = if data_len % 2 == 0 {
            payload_end
        } else {
            payload_end + 1
        };
    }
    None
}

/// Decode `0x1C record dataset length value` records of the application record.
fn parse_iim(data: &[u8]) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = Vec::new();
    let mut pos = 0;

    while pos + 5 <= data.len() && data[pos] == IIM_TAG_MARKER {
        let record = data[pos + 1];
        let dataset = data[pos + 2];
        let mut len = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as usize;
        let mut start = pos + 5;

        // Extended dataset: low 15 bits give the size of the length field
        if len & 0x8000 != 0 {
            let size = len & 0x7FFF;
            if size > 4 || start + size > data.len() {
                break;
            }
            len = data[start..start + size]
                .iter()
                .fold(0usize, |acc, b| (acc << 8) | *b as usize);
            start += size;
        }

        let Some(end) = start.checked_add(len).filter(|end| *end <= data.len()) else {
            break;
        };

        if record == 2 {
            if let Some((_, name)) = DATASETS.iter().find(|(id, _)| *id == dataset) {
                let key = format!("Iptc.Application2.{name}");
                let value = String::from_utf8_lossy(&data[start..end])
                    .trim_end_matches('\0')
                    .to_string();
                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, existing)) => {
                        existing.push_str(", ");
                        existing.push_str(&value);
                    }
                    None => entries.push((key, value)),
                }
            }
        }

        pos = end;
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use img_parts::jpeg::JpegSegment;

    fn dataset(record: u8, id: u8, value: &str) -> Vec<u8> {
        let mut out = vec![IIM_TAG_MARKER, record, id];
        out.extend_from_slice(&(value.len() as u16).to_be_bytes());
        out.extend_from_slice(value.as_bytes());
        out
    }

    fn resource(id: u16, payload: &[u8]) -> Vec<u8> {
        let mut out = IPTC_8BIM.to_vec();
        out.extend_from_slice(&id.to_be_bytes());
        out.extend_from_slice(&[0x00, 0x00]); // empty pascal name, padded
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    fn app13(iim: &[u8]) -> Vec<u8> {
        let mut out = IPTC_HEADER.to_vec();
        out.extend(resource(0x03ED, b"odd"));
        out.extend(resource(IIM_RESOURCE_ID, iim));
        out
    }

    fn sample_iim() -> Vec<u8> {
        let mut iim = vec![IIM_TAG_MARKER, 2, 0, 0, 2, 0, 4];
        iim.extend(dataset(2, 25, "family"));
        iim.extend(dataset(2, 120, "On the beach"));
        iim.extend(dataset(2, 25, "summer"));
        iim.extend(dataset(1, 90, "\x1b%G"));
        iim
    }

    #[test]
    fn iim_records_are_named_and_joined() {
        let entries = parse_iim(&sample_iim());
        assert_eq!(
            entries,
            vec![
                ("Iptc.Application2.Keywords".to_string(), "family, summer".to_string()),
                ("Iptc.Application2.Caption".to_string(), "On the beach".to_string()),
            ]
        );
    }

    #[test]
    fn extended_length_dataset() {
        let mut iim = vec![IIM_TAG_MARKER, 2, 120, 0x80, 0x02, 0x00, 0x05];
        iim.extend_from_slice(b"hello");
        let entries = parse_iim(&iim);
        assert_eq!(entries[0].1, "hello");
    }

    #[test]
    fn truncated_dataset_stops_parsing() {
        let mut iim = dataset(2, 5, "Title");
        iim.extend_from_slice(&[IIM_TAG_MARKER, 2, 120, 0x00, 0x40, b'x']);
        let entries = parse_iim(&iim);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "Iptc.Application2.ObjectName");
    }

    #[test]
    fn resource_walk_skips_other_blocks() {
        let data = app13(b"\x1c\x02\x05\x00\x01T");
        assert_eq!(find_iim_resource(&data), Some(&b"\x1c\x02\x05\x00\x01T"[..]));
    }

    #[test]
    fn resource_walk_rejects_garbage() {
        let mut data = IPTC_HEADER.to_vec();
        data.extend_from_slice(b"not a resource block at all");
        assert_eq!(find_iim_resource(&data), None);
    }

    #[test]
    fn read_from_jpeg_segment() {
        let img = image::RgbImage::new(8, 8);
        let mut encoded = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut encoded), image::ImageFormat::Jpeg)
            .unwrap();

        let mut jpeg = Jpeg::from_bytes(Bytes::from(encoded)).unwrap();
        jpeg.segments_mut().insert(
            0,
            JpegSegment::new_with_contents(0xED, Bytes::from(app13(&sample_iim()))),
        );
        let bytes = jpeg.encoder().bytes();

        let entries = read_iptc(&bytes);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn non_jpeg_has_no_iptc() {
        assert!(read_iptc(b"\x89PNG\r\n\x1a\n").is_empty());
    }
}
