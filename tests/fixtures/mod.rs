//! Canned backend payloads, shaped like the gateway's real responses.

#![allow(dead_code)]

pub const SEPARATION_ACCEPTED: &str = r#"{"code": 0, "message": "ok", "taskId": 99}"#;

pub const SEPARATION_REJECTED: &str = r#"{"code": 40001, "message": "quota exceeded", "taskId": null}"#;

pub const TASK_PROCESSING: &str = r#"{
    "taskId": 42,
    "status": "PROCESSING",
    "progress": 30,
    "vocalUrl": null,
    "instUrl": null,
    "trackUrls": null,
    "errorMsg": null
}"#;

pub const TASK_SUCCESS_PAIR: &str = r#"{
    "taskId": 42,
    "status": "SUCCESS",
    "progress": 100,
    "vocalUrl": "https://cdn.example/42/vocals.wav",
    "instUrl": "https://cdn.example/42/accompaniment.wav",
    "trackUrls": null,
    "errorMsg": null
}"#;

pub const TASK_SUCCESS_STEMS: &str = r#"{
    "taskId": 43,
    "status": "SUCCESS",
    "progress": 100,
    "vocalUrl": null,
    "instUrl": null,
    "trackUrls": [
        "https://cdn.example/43/vocals.wav",
        "https://cdn.example/43/drums.wav",
        "https://cdn.example/43/bass.wav",
        "https://cdn.example/43/other.wav"
    ],
    "errorMsg": null
}"#;

pub const TASK_SUCCESS_INST_ONLY: &str = r#"{
    "taskId": 48,
    "status": "SUCCESS",
    "progress": 100,
    "vocalUrl": null,
    "instUrl": "https://cdn.example/48/accompaniment.wav",
    "trackUrls": [],
    "errorMsg": null
}"#;

pub const TASK_FAILED: &str = r#"{
    "taskId": 44,
    "status": "FAILED",
    "progress": 0,
    "errorMsg": "model crashed"
}"#;

pub const MEDIA_PROCESSING: &str = r#"{
    "code": 0,
    "message": "ok",
    "data": {"id": 501, "url": null, "status": 1, "progress": 0.45}
}"#;

pub const MEDIA_DONE: &str = r#"{
    "code": 0,
    "message": "ok",
    "data": {
        "id": 502,
        "url": "https://cdn.example/media/502.mp4",
        "status": 0,
        "progress": 1.0,
        "width": 1920,
        "height": 1080,
        "durationSec": 12.5
    }
}"#;

pub const MEDIA_MISSING: &str = r#"{"code": 0, "message": "ok", "data": null}"#;

pub const SIDE_PANEL: &str = r#"{
    "user": {"id": 7, "username": "mira", "email": "mira@example.com", "city": "Lisbon"},
    "weather": {"temp": 21, "text": "Sunny"},
    "almanac": {
        "date": "2026-10-19",
        "weekday": "Monday",
        "lunarText": "ninth month, 29th day",
        "yi": ["travel"],
        "ji": ["moving"]
    },
    "quote": "Keep going."
}"#;
