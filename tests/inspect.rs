use binpeek::{Collaborators, Format, Value, inspect};

fn png_image() -> Vec<u8> {
    let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
    png.extend_from_slice(&13u32.to_be_bytes());
    png.extend_from_slice(b"IHDR");
    png.extend_from_slice(&16u32.to_be_bytes());
    png.extend_from_slice(&8u32.to_be_bytes());
    png.extend_from_slice(&[8, 6, 0, 0, 0]);
    png.extend_from_slice(&0x1234_5678u32.to_be_bytes());
    png.extend_from_slice(&0u32.to_be_bytes());
    png.extend_from_slice(b"IEND");
    png.extend_from_slice(&0xAE42_6082u32.to_be_bytes());
    png
}

fn mp3_with_cover(cover: &[u8]) -> Vec<u8> {
    let mut body = vec![0, 0, 0, 0];
    body.extend_from_slice(b"image/png\0");
    body.push(3);
    body.push(0);
    body.extend_from_slice(cover);

    let mut frame = b"APIC".to_vec();
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(&[0, 0]);
    frame.extend(body);

    let mut data = b"ID3\x03\x00\x00".to_vec();
    let size = frame.len() as u32;
    data.extend_from_slice(&[
        ((size >> 21) & 0x7F) as u8,
        ((size >> 14) & 0x7F) as u8,
        ((size >> 7) & 0x7F) as u8,
        (size & 0x7F) as u8,
    ]);
    data.extend(frame);
    // first bytes of an MPEG audio frame
    data.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
    data
}

#[test]
fn sniffed_mp3_walks_embedded_png() {
    let data = mp3_with_cover(&png_image());
    assert_eq!(Format::sniff(&data), Some(Format::Mp3));

    let decoded = inspect(&data, Format::Mp3, &Collaborators::default());
    assert!(decoded.status.is_complete());

    let apic = decoded.report.child("APIC").unwrap();
    assert!(
        apic.value()
            .and_then(Value::as_text)
            .is_some_and(|uri| uri.starts_with("data:image/png;base64,iVBORw0KGgo"))
    );

    let png = apic.child("PNG structure").unwrap();
    let ihdr = png.child("IHDR").unwrap();
    assert_eq!(ihdr.value(), Some(&Value::Number(13)));
    assert_eq!(ihdr.child_value("Width"), Some(&Value::Number(16)));
    assert_eq!(ihdr.child_value("Height"), Some(&Value::Number(8)));
    assert_eq!(ihdr.child_value("CRC"), Some(&Value::from("12345678")));
    assert!(png.child("IEND").is_some());
}

#[test]
fn text_rendering_is_indented() {
    let data = mp3_with_cover(b"not an image");
    let decoded = inspect(&data, Format::Mp3, &Collaborators::default());
    let text = decoded.report.to_string();

    assert!(text.starts_with("ID3 structure\n"));
    assert!(text.contains("\n  APIC: data:image/png;base64,"));
    assert!(text.contains("\n    Description: \n"));
}
