//! End-to-end integration tests for the subtitle-scan → font-catalog →
//! match-and-register pipeline.

use std::fs;

use subfont::loader::Loader;
use subfont::registrar::test_doubles::RecordingRegistrar;
use subfont::registrar::Latin1Decoder;

fn utf16be(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|u| u.to_be_bytes()).collect()
}

fn build_otf(face: &str, version: Option<&str>) -> Vec<u8> {
    let mut records = vec![(1u16, face)];
    if let Some(v) = version {
        records.push((5, v));
    }
    let mut strings = Vec::new();
    let mut name_records = Vec::new();
    for (name_id, text) in &records {
        let encoded = utf16be(text);
        name_records.push((*name_id, strings.len() as u16, encoded.len() as u16));
        strings.extend(encoded);
    }
    let mut name_table = Vec::new();
    name_table.extend_from_slice(&0u16.to_be_bytes());
    name_table.extend_from_slice(&(name_records.len() as u16).to_be_bytes());
    let header_size = 6 + name_records.len() * 12;
    name_table.extend_from_slice(&(header_size as u16).to_be_bytes());
    for (name_id, off, len) in &name_records {
        name_table.extend_from_slice(&3u16.to_be_bytes()); // platform: Windows
        name_table.extend_from_slice(&0u16.to_be_bytes());
        name_table.extend_from_slice(&0x0409u16.to_be_bytes());
        name_table.extend_from_slice(&name_id.to_be_bytes());
        name_table.extend_from_slice(&(*len).to_be_bytes());
        name_table.extend_from_slice(&(*off).to_be_bytes());
    }
    name_table.extend_from_slice(&strings);

    let mut font = Vec::new();
    font.extend_from_slice(b"OTTO");
    font.extend_from_slice(&1u16.to_be_bytes());
    font.extend_from_slice(&0u16.to_be_bytes());
    font.extend_from_slice(&0u16.to_be_bytes());
    font.extend_from_slice(&0u16.to_be_bytes());
    let table_offset = 12 + 16;
    font.extend_from_slice(b"name");
    font.extend_from_slice(&0u32.to_be_bytes());
    font.extend_from_slice(&(table_offset as u32).to_be_bytes());
    font.extend_from_slice(&(name_table.len() as u32).to_be_bytes());
    font.extend_from_slice(&name_table);
    font
}

#[test]
fn dialogue_override_drives_end_to_end_match_and_register() {
    let dir = tempfile::tempdir().unwrap();
    let subs_dir = dir.path().join("subs");
    let fonts_dir = dir.path().join("fonts");
    fs::create_dir_all(&subs_dir).unwrap();
    fs::create_dir_all(&fonts_dir).unwrap();

    let ass = "[Events]\n\
         Format: Layer,Start,End,Style,Name,MarginL,MarginR,MarginV,Effect,Text\n\
         Dialogue: 0,0,1,Default,,0,0,0,,Hello {\\fn Comic}world{\\fn0} end.\n";
    fs::write(subs_dir.join("movie.ass"), ass).unwrap();
    fs::write(fonts_dir.join("comic.otf"), build_otf("Comic", Some("1.0"))).unwrap();

    let registrar = Box::new(RecordingRegistrar::default());
    let mut loader = Loader::new(registrar, Box::new(Latin1Decoder));
    loader.add_subs(&subs_dir).unwrap();
    loader.scan_fonts(&fonts_dir, None).unwrap();
    let report = loader.load_fonts().unwrap();

    assert_eq!(report.summary.loaded, 1);
    assert_eq!(report.summary.subs, 1);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].face, "Comic");
    assert_eq!(report.records[0].file.as_deref(), Some("comic.otf"));
}

#[test]
fn cache_round_trip_survives_a_fresh_loader() {
    let dir = tempfile::tempdir().unwrap();
    let fonts_dir = dir.path().join("fonts");
    fs::create_dir_all(&fonts_dir).unwrap();
    fs::write(fonts_dir.join("a.otf"), build_otf("FaceA", Some("1.0"))).unwrap();
    fs::write(fonts_dir.join("b.otf"), build_otf("FaceB", Some("2.1"))).unwrap();

    let mut builder = Loader::new(Box::new(RecordingRegistrar::default()), Box::new(Latin1Decoder));
    builder.scan_fonts(&fonts_dir, None).unwrap();
    builder.save_cache("fonts.cache").unwrap();

    let mut reader = Loader::new(Box::new(RecordingRegistrar::default()), Box::new(Latin1Decoder));
    reader.scan_fonts(&fonts_dir, Some("fonts.cache")).unwrap();
    // A catalog loaded straight from cache still matches candidates.
    let subs_dir = dir.path().join("subs2");
    fs::create_dir_all(&subs_dir).unwrap();
    fs::write(
        subs_dir.join("s.ass"),
        "[V4+ Styles]\nStyle: Default,FaceB,20,&H00FFFFFF\n",
    )
    .unwrap();
    reader.add_subs(&subs_dir).unwrap();
    let report = reader.load_fonts().unwrap();

    assert_eq!(report.summary.loaded, 1);
    assert_eq!(report.records[0].file.as_deref(), Some("b.otf"));
}

#[test]
fn cancellation_before_loading_leaves_nothing_installed() {
    let dir = tempfile::tempdir().unwrap();
    let fonts_dir = dir.path().join("fonts");
    fs::create_dir_all(&fonts_dir).unwrap();
    fs::write(fonts_dir.join("a.otf"), build_otf("FaceA", None)).unwrap();

    let mut loader = Loader::new(Box::new(RecordingRegistrar::default()), Box::new(Latin1Decoder));
    let subs_dir = dir.path().join("subs");
    fs::create_dir_all(&subs_dir).unwrap();
    fs::write(subs_dir.join("s.ass"), "[V4+ Styles]\nStyle: Default,FaceA,20,&H00FFFFFF\n").unwrap();
    loader.add_subs(&subs_dir).unwrap();
    loader.scan_fonts(&fonts_dir, None).unwrap();
    loader.cancel();

    let err = loader.load_fonts().unwrap_err();
    assert!(matches!(err, subfont::Error::Cancelled));
}
