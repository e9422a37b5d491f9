use super::*;

const PROBE: &str = r#"{
    "streams": [
        {"codec_type": "video", "width": 640, "height": 360,
         "r_frame_rate": "30000/1001", "avg_frame_rate": "30000/1001", "nb_frames": "120"}
    ]
}"#;

#[test]
fn parses_dimensions_rate_and_count() {
    let info = parse_probe_json(Path::new("a.mp4"), PROBE.as_bytes()).unwrap();
    assert_eq!(
        info.canvas,
        Canvas {
            width: 640,
            height: 360
        }
    );
    assert_eq!(info.fps, Fps { num: 30000, den: 1001 });
    assert_eq!(info.frame_count, Some(120));
}

#[test]
fn falls_back_to_average_rate() {
    let json = r#"{"streams": [{"codec_type": "video", "width": 4, "height": 4,
        "r_frame_rate": "0/0", "avg_frame_rate": "25/1"}]}"#;
    let info = parse_probe_json(Path::new("a.mp4"), json.as_bytes()).unwrap();
    assert_eq!(info.fps, Fps { num: 25, den: 1 });
    assert_eq!(info.frame_count, None);
}

#[test]
fn missing_video_stream_is_an_io_error() {
    let json = r#"{"streams": [{"codec_type": "audio"}]}"#;
    let err = parse_probe_json(Path::new("a.wav"), json.as_bytes()).unwrap_err();
    assert!(err.is_io());
}

#[test]
fn missing_file_is_an_io_error() {
    let err = probe_video(Path::new("definitely/not/here.mp4")).unwrap_err();
    assert!(err.is_io());
}

#[test]
fn display_matrix_quarter_turn_swaps_dimensions() {
    let json = r#"{"streams": [{"codec_type": "video", "width": 640, "height": 480,
        "r_frame_rate": "30/1",
        "side_data_list": [{"side_data_type": "Display Matrix",
            "displaymatrix": "\n00000000:            0       65536           0\n",
            "rotation": -90}]}]}"#;
    let info = parse_probe_json(Path::new("phone.mp4"), json.as_bytes()).unwrap();
    assert_eq!(info.rotation, 270);
    assert_eq!(
        info.canvas,
        Canvas {
            width: 480,
            height: 640
        }
    );
}

#[test]
fn legacy_rotate_tag_is_honored_and_half_turns_keep_dimensions() {
    let tagged = r#"{"streams": [{"codec_type": "video", "width": 1920, "height": 1080,
        "r_frame_rate": "25/1", "tags": {"rotate": "90", "language": "und"}}]}"#;
    let info = parse_probe_json(Path::new("a.mov"), tagged.as_bytes()).unwrap();
    assert_eq!(info.rotation, 90);
    assert_eq!((info.canvas.width, info.canvas.height), (1080, 1920));

    let flipped = r#"{"streams": [{"codec_type": "video", "width": 1920, "height": 1080,
        "r_frame_rate": "25/1", "side_data_list": [{"rotation": 180}]}]}"#;
    let info = parse_probe_json(Path::new("b.mp4"), flipped.as_bytes()).unwrap();
    assert_eq!(info.rotation, 180);
    assert_eq!((info.canvas.width, info.canvas.height), (1920, 1080));
}
