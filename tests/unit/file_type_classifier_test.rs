//! Unit tests for the file-type classifier: catalog lookup, file-type
//! matching and custom (MIME / extension / glob) matching.

use download_status::services::file_type_classifier::{
    lookup_by_name, matches_custom_types, matches_file_types,
};
use download_status::types::download::DownloadItem;
use download_status::types::file_type::{FileType, FILE_TYPE_CATALOG};
use rstest::rstest;

fn download(filename: &str, mime: &str) -> DownloadItem {
    let mut item = DownloadItem::new(1, "https://example.com/file", filename);
    item.mime = mime.to_string();
    item
}

fn custom(types: &[&str]) -> Vec<String> {
    types.iter().map(|t| t.to_string()).collect()
}

#[test]
fn test_catalog_categories_in_order() {
    let names: Vec<&str> = FILE_TYPE_CATALOG.iter().map(|c| c.name).collect();
    assert_eq!(
        names,
        vec!["Images", "Video", "Documents", "Archives", "File Sharing"]
    );
}

#[test]
fn test_lookup_by_name() {
    let jpg = lookup_by_name("JPG").unwrap();
    assert_eq!(jpg.mimes, vec!["image/jpeg"]);
    assert_eq!(jpg.extensions, vec!["jpg", "jpeg"]);

    assert!(lookup_by_name("jpg").is_none());
    assert!(lookup_by_name("Unknown").is_none());
}

#[test]
fn test_wmv_has_two_mime_types() {
    let wmv = lookup_by_name("WMV").unwrap();
    assert_eq!(wmv.mimes, vec!["video/x-ms-asf", "application/vnd.ms-asf"]);
}

#[rstest]
#[case("/downloads/photo.png", "", true)]
#[case("/downloads/photo.jpeg", "", true)]
#[case("/downloads/anything", "image/png", true)]
#[case("/downloads/notes.txt", "text/plain", false)]
#[case("/downloads/photo.PNG", "", false)]
#[case("/downloads/no_extension", "", false)]
fn test_matches_file_types(#[case] filename: &str, #[case] mime: &str, #[case] expected: bool) {
    let types = vec![
        lookup_by_name("PNG").unwrap().clone(),
        lookup_by_name("JPG").unwrap().clone(),
    ];
    assert_eq!(matches_file_types(&download(filename, mime), &types), expected);
}

#[test]
fn test_matches_file_types_empty_list() {
    assert!(!matches_file_types(&download("/a/b.png", "image/png"), &[]));
}

#[test]
fn test_matches_file_types_uses_last_extension() {
    let gzip = vec![lookup_by_name("GZip").unwrap().clone()];
    assert!(matches_file_types(&download("/src/release.tar.gz", ""), &gzip));
}

#[test]
fn test_matches_file_types_with_custom_file_type() {
    let iso = vec![FileType::new("ISO", &["application/x-iso9660-image"], &["iso"])];
    assert!(matches_file_types(&download("C:\\isos\\disk.iso", ""), &iso));
}

#[rstest]
#[case("/downloads/setup.exe", "", &["exe"], true)]
#[case("/downloads/blob", "application/octet-stream", &["application/octet-stream"], true)]
#[case("/downloads/report.pdf", "", &["*.pdf"], true)]
#[case("/downloads/deep/dir/report.pdf", "", &["report.*"], true)]
#[case("C:\\Users\\Test\\Downloads\\report.pdf", "", &["*.pdf"], true)]
#[case("/downloads/report.pdf", "", &["/downloads/*.pdf"], true)]
#[case("/elsewhere/report.pdf", "", &["/downloads/*.pdf"], false)]
#[case("/downloads/sub/linux.iso", "", &["/downloads/*.iso"], false)]
#[case("/downloads/sub/linux.iso", "", &["/downloads/**/*.iso"], true)]
#[case("C:\\Users\\Test\\Downloads\\sub\\report.pdf", "", &["C:/Users/Test/Downloads/*.pdf"], false)]
#[case("/downloads/report.pdf", "", &["*.doc", "exe"], false)]
#[case("/downloads/report.pdf", "", &[], false)]
fn test_matches_custom_types(
    #[case] filename: &str,
    #[case] mime: &str,
    #[case] types: &[&str],
    #[case] expected: bool,
) {
    assert_eq!(
        matches_custom_types(&download(filename, mime), &custom(types)),
        expected
    );
}

#[test]
fn test_matches_custom_types_ignores_invalid_patterns() {
    let types = custom(&["[", "*.zip"]);
    assert!(matches_custom_types(&download("/d/a.zip", ""), &types));
    assert!(!matches_custom_types(&download("/d/a.rar", ""), &types));
}
