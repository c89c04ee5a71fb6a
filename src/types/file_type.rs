use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A named file type recognized by MIME type or extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileType {
    pub name: String,
    pub mimes: Vec<String>,
    pub extensions: Vec<String>,
}

impl FileType {
    pub fn new(name: &str, mimes: &[&str], extensions: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            mimes: mimes.iter().map(|m| m.to_string()).collect(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// A display category grouping related file types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTypeCategory {
    pub name: &'static str,
    pub file_types: Vec<FileType>,
}

/// Static catalog of known file types, grouped by category in display order.
pub static FILE_TYPE_CATALOG: Lazy<Vec<FileTypeCategory>> = Lazy::new(|| {
    vec![
        FileTypeCategory {
            name: "Images",
            file_types: vec![
                FileType::new("PNG", &["image/png"], &["png"]),
                FileType::new("JPG", &["image/jpeg"], &["jpg", "jpeg"]),
                FileType::new("GIF", &["image/gif"], &["gif"]),
                FileType::new("BMP", &["image/bmp"], &["bmp"]),
            ],
        },
        FileTypeCategory {
            name: "Video",
            file_types: vec![
                FileType::new("MP4", &["video/mp4"], &["mp4"]),
                FileType::new("WebM", &["video/webm"], &["webm"]),
                FileType::new(
                    "WMV",
                    &["video/x-ms-asf", "application/vnd.ms-asf"],
                    &["wmv"],
                ),
            ],
        },
        FileTypeCategory {
            name: "Documents",
            file_types: vec![
                FileType::new("Text", &["text/plain"], &["txt"]),
                FileType::new("HTML", &["text/html"], &["htm", "html"]),
                FileType::new(
                    "Word",
                    &[
                        "application/msword",
                        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                    ],
                    &["doc", "docx"],
                ),
                FileType::new(
                    "Excel",
                    &[
                        "application/vnd.ms-excel",
                        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                    ],
                    &["xls", "xlsx"],
                ),
            ],
        },
        FileTypeCategory {
            name: "Archives",
            file_types: vec![
                FileType::new("Zip", &["application/zip"], &["zip"]),
                FileType::new("7Zip", &["application/x-7z-compressed"], &["7zip"]),
                FileType::new("Tar", &["application/x-tar"], &["tar"]),
                FileType::new("GZip", &["application/gzip"], &["gz"]),
                FileType::new("Rar", &["application/x-rar-compressed"], &["rar"]),
                FileType::new("BZip", &["application/x-bzip2"], &["bz2"]),
            ],
        },
        FileTypeCategory {
            name: "File Sharing",
            file_types: vec![
                FileType::new("Torrent", &["application/x-bittorrent"], &["torrent"]),
                FileType::new("NZB", &["application/x-nzb"], &["nzb"]),
            ],
        },
    ]
});
