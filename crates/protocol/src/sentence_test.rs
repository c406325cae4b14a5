use super::*;

#[test]
fn test_render_known_checksum_vector() {
    let sentence = NmeaSentence::new(
        1,
        1,
        None,
        'A',
        "15Muq70001G?tRrM5M4P8?v4080u".to_string(),
        0,
    );
    assert_eq!(sentence.checksum, 0x28);
    assert_eq!(
        sentence.render(),
        "!AIVDM,1,1,,A,15Muq70001G?tRrM5M4P8?v4080u,0*28"
    );
}

#[test]
fn test_render_has_no_trailing_crlf() {
    let sentence = NmeaSentence::new(1, 1, None, 'A', "0".to_string(), 0);
    let rendered = sentence.render();
    assert!(!rendered.ends_with('\r'));
    assert!(!rendered.ends_with('\n'));
}

#[test]
fn test_message_id_renders_empty_when_absent() {
    let sentence = NmeaSentence::new(1, 1, None, 'B', "w".to_string(), 2);
    assert!(sentence.render().starts_with("!AIVDM,1,1,,B,"));
}

#[test]
fn test_message_id_renders_digit_when_present() {
    let sentence = NmeaSentence::new(2, 1, Some(7), 'A', "0".to_string(), 0);
    assert!(sentence.render().starts_with("!AIVDM,2,1,7,A,"));
}

#[test]
fn test_checksum_is_uppercase_two_digit_hex() {
    // Payload chosen so the checksum lands below 0x10
    for payload in ["0", "1", "w", "015", "GENERIC"] {
        let sentence = NmeaSentence::new(1, 1, None, 'A', payload.to_string(), 0);
        let rendered = sentence.render();
        let (_, suffix) = rendered.split_once('*').unwrap();
        assert_eq!(suffix.len(), 2);
        assert_eq!(suffix, suffix.to_uppercase());
        assert_eq!(
            u8::from_str_radix(suffix, 16).unwrap(),
            sentence.checksum,
        );
    }
}

#[test]
fn test_display_matches_render() {
    let sentence = NmeaSentence::new(2, 2, Some(3), 'B', "Pwh".to_string(), 4);
    assert_eq!(sentence.to_string(), sentence.render());
}
