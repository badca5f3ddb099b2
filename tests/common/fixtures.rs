//! Shard payloads used across end-to-end tests.

#![allow(dead_code)]

/// Two singers whose ids start with "h".
pub const H_SHARD_V1: &str = r#"[
    {
        "id": "hanami",
        "names": {"en": "Hanami", "ja": "花見"},
        "owners": ["Studio H"],
        "authors": ["Aki"],
        "homepage_url": "https://example.com/hanami",
        "variants": [
            {"id": "hanami_cv", "names": {"en": "Hanami CV"}, "file_url": "https://example.com/hanami_cv.zip", "tags": ["cv"]}
        ]
    },
    {
        "id": "hoshi",
        "names": {"en": "Hoshi"},
        "owners": ["Hoshi Project"],
        "authors": [],
        "variants": [
            {"id": "hoshi_vcv", "names": {"en": "Hoshi VCV"}, "download_page_url": "https://example.com/hoshi"}
        ]
    }
]"#;

/// `hanami` gets a new owner and a new singer `haru` is appended.
pub const H_SHARD_V2: &str = r#"[
    {
        "id": "hanami",
        "names": {"en": "Hanami", "ja": "花見"},
        "owners": ["Studio H", "New Owner"],
        "authors": ["Aki"],
        "variants": [
            {"id": "hanami_cv", "names": {"en": "Hanami CV"}, "file_url": "https://example.com/hanami_cv_v2.zip", "tags": ["cv"]}
        ]
    },
    {
        "id": "hoshi",
        "names": {"en": "Hoshi"},
        "owners": ["Hoshi Project"],
        "authors": [],
        "variants": [
            {"id": "hoshi_vcv", "names": {"en": "Hoshi VCV"}, "download_page_url": "https://example.com/hoshi"}
        ]
    },
    {
        "id": "haru",
        "names": {"en": "Haru"},
        "owners": [],
        "authors": ["Ren"],
        "variants": [
            {"id": "haru_act1", "names": {"en": "Haru Act 1"}, "file_url": "https://example.com/haru.zip"}
        ]
    }
]"#;

pub const M_SHARD: &str = r#"[
    {
        "id": "mizore",
        "names": {"en": "Mizore"},
        "variants": [
            {"id": "mizore_std", "names": {"en": "Mizore"}, "file_url": "https://example.com/mizore.zip"}
        ]
    }
]"#;

pub const O_SOFTWARE_SHARD: &str = r#"[
    {"id": "openutau", "names": {"en": "OpenUtau"}, "category": "host", "developers": ["stakira"], "homepage_url": "https://www.openutau.com"},
    {"id": "oto_helper", "names": {"en": "Oto Helper"}, "category": "utility"}
]"#;

pub fn manifest_json(singers: &[(&str, i64)], softwares: &[(&str, i64)]) -> String {
    let entries = |list: &[(&str, i64)]| {
        list.iter()
            .map(|(file, ts)| format!(r#"{{"file": "{}", "ts": {}}}"#, file, ts))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        r#"{{"singers": [{}], "softwares": [{}]}}"#,
        entries(singers),
        entries(softwares)
    )
}
